//! Barrier stubs exported by the host's collector runtime
//!
//! The host exports each entry point as `ZBarrierSetRuntime_<name>`; the
//! table here is keyed by the bare `<name>`.

use crate::error::{BarrierError, Result};
use hsgen_util::FxHashMap;
use std::fmt;

/// Word kinds in a stub's calling convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Managed reference
    Object,
    /// Raw machine address
    Address,
    /// 64-bit integer
    Long,
    /// No value
    Void,
}

/// Argument and return kinds of a stub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubSignature {
    pub args: &'static [ValueKind],
    pub ret: ValueKind,
}

const LOAD_SIGNATURE: StubSignature = StubSignature {
    args: &[ValueKind::Object, ValueKind::Address],
    ret: ValueKind::Object,
};

const STORE_SIGNATURE: StubSignature = StubSignature {
    args: &[ValueKind::Address],
    ret: ValueKind::Void,
};

const ARRAY_SIGNATURE: StubSignature = StubSignature {
    args: &[ValueKind::Address, ValueKind::Long],
    ret: ValueKind::Void,
};

/// Barrier entry points of the colored-pointer collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BarrierStub {
    LoadBarrierOnOopFieldPreloaded,
    LoadBarrierOnWeakOopFieldPreloaded,
    WeakLoadBarrierOnWeakOopFieldPreloaded,
    WeakLoadBarrierOnPhantomOopFieldPreloaded,
    StoreBarrierOnOopFieldWithHealing,
    StoreBarrierOnOopFieldWithoutHealing,
    StoreBarrierOnNativeOopFieldWithoutHealing,
    LoadBarrierOnOopArray,
}

impl BarrierStub {
    pub const ALL: &'static [BarrierStub] = &[
        BarrierStub::LoadBarrierOnOopFieldPreloaded,
        BarrierStub::LoadBarrierOnWeakOopFieldPreloaded,
        BarrierStub::WeakLoadBarrierOnWeakOopFieldPreloaded,
        BarrierStub::WeakLoadBarrierOnPhantomOopFieldPreloaded,
        BarrierStub::StoreBarrierOnOopFieldWithHealing,
        BarrierStub::StoreBarrierOnOopFieldWithoutHealing,
        BarrierStub::StoreBarrierOnNativeOopFieldWithoutHealing,
        BarrierStub::LoadBarrierOnOopArray,
    ];

    /// Runtime symbol name, without the `ZBarrierSetRuntime_` prefix
    pub const fn name(self) -> &'static str {
        match self {
            BarrierStub::LoadBarrierOnOopFieldPreloaded => "load_barrier_on_oop_field_preloaded",
            BarrierStub::LoadBarrierOnWeakOopFieldPreloaded => {
                "load_barrier_on_weak_oop_field_preloaded"
            }
            BarrierStub::WeakLoadBarrierOnWeakOopFieldPreloaded => {
                "weak_load_barrier_on_weak_oop_field_preloaded"
            }
            BarrierStub::WeakLoadBarrierOnPhantomOopFieldPreloaded => {
                "weak_load_barrier_on_phantom_oop_field_preloaded"
            }
            BarrierStub::StoreBarrierOnOopFieldWithHealing => {
                "store_barrier_on_oop_field_with_healing"
            }
            BarrierStub::StoreBarrierOnOopFieldWithoutHealing => {
                "store_barrier_on_oop_field_without_healing"
            }
            BarrierStub::StoreBarrierOnNativeOopFieldWithoutHealing => {
                "store_barrier_on_native_oop_field_without_healing"
            }
            BarrierStub::LoadBarrierOnOopArray => "load_barrier_on_oop_array",
        }
    }

    pub fn from_name(name: &str) -> Option<BarrierStub> {
        BarrierStub::ALL
            .iter()
            .copied()
            .find(|stub| stub.name() == name)
    }

    pub const fn signature(self) -> StubSignature {
        match self {
            BarrierStub::LoadBarrierOnOopFieldPreloaded
            | BarrierStub::LoadBarrierOnWeakOopFieldPreloaded
            | BarrierStub::WeakLoadBarrierOnWeakOopFieldPreloaded
            | BarrierStub::WeakLoadBarrierOnPhantomOopFieldPreloaded => LOAD_SIGNATURE,
            BarrierStub::StoreBarrierOnOopFieldWithHealing
            | BarrierStub::StoreBarrierOnOopFieldWithoutHealing
            | BarrierStub::StoreBarrierOnNativeOopFieldWithoutHealing => STORE_SIGNATURE,
            BarrierStub::LoadBarrierOnOopArray => ARRAY_SIGNATURE,
        }
    }
}

impl fmt::Display for BarrierStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callable target of a barrier stub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignCallDescriptor {
    stub: BarrierStub,
    address: u64,
}

impl ForeignCallDescriptor {
    pub fn stub(&self) -> BarrierStub {
        self.stub
    }

    pub fn name(&self) -> &'static str {
        self.stub.name()
    }

    /// Entry address in the host, never 0
    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn signature(&self) -> StubSignature {
        self.stub.signature()
    }
}

/// Host barrier stubs available to the emitter
///
/// Built once at start-up and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StubTable {
    entries: FxHashMap<BarrierStub, ForeignCallDescriptor>,
}

impl StubTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the host's stub-name to address listing
    ///
    /// Entries with address 0 are treated as not exported.
    ///
    /// # Errors
    ///
    /// `UnknownStub` for a name no barrier stub has.
    pub fn from_addresses<I, K>(addresses: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        let mut table = Self::new();
        for (name, address) in addresses {
            let name = name.as_ref();
            let stub = BarrierStub::from_name(name)
                .ok_or_else(|| BarrierError::UnknownStub(name.to_string()))?;
            if address == 0 {
                log::debug!("barrier stub {} exported as null, leaving it out", stub);
                continue;
            }
            table.insert(stub, address);
        }
        Ok(table)
    }

    /// Register `stub` at `address`, replacing any previous entry
    pub fn insert(&mut self, stub: BarrierStub, address: u64) {
        self.entries
            .insert(stub, ForeignCallDescriptor { stub, address });
    }

    /// # Errors
    ///
    /// `MissingStub` if the host did not export `stub`.
    pub fn get(&self, stub: BarrierStub) -> Result<&ForeignCallDescriptor> {
        self.entries
            .get(&stub)
            .ok_or(BarrierError::MissingStub(stub.name()))
    }

    pub fn contains(&self, stub: BarrierStub) -> bool {
        self.entries.contains_key(&stub)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stubs the host did not export, in declaration order
    pub fn missing(&self) -> Vec<BarrierStub> {
        BarrierStub::ALL
            .iter()
            .copied()
            .filter(|stub| !self.contains(*stub))
            .collect()
    }

    /// Exported stubs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ForeignCallDescriptor> + '_ {
        BarrierStub::ALL
            .iter()
            .filter_map(|stub| self.entries.get(stub))
    }
}
