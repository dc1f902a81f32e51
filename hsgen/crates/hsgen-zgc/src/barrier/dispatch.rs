//! Colored-Pointer Barrier Set
//!
//! Maps classified accesses onto the collector's runtime stubs.
//!
//! Read side:
//! ```text
//!   Read            → load_barrier_on_oop_field_preloaded
//!   ReferenceGet    → load_barrier_on_weak_oop_field_preloaded
//!   WeakRefersTo    → weak_load_barrier_on_weak_oop_field_preloaded
//!   PhantomRefersTo → weak_load_barrier_on_phantom_oop_field_preloaded
//! ```
//!
//! Write side, for `Field`, `Array` and `PostInitWrite` alike:
//! ```text
//!   Atomic → store_barrier_on_oop_field_with_healing
//!   Native → store_barrier_on_native_oop_field_without_healing
//!   Plain  → store_barrier_on_oop_field_without_healing
//! ```
//!
//! Every other kind reaching a stub family is rejected with
//! `UnexpectedBarrierType`.

use super::kind::{BarrierRequest, BarrierType, LocationClass, StoreKind};
use super::policy::{BarrierPolicy, GenericBarrierPolicy};
use super::stubs::{BarrierStub, ForeignCallDescriptor, StubTable};
use crate::error::{BarrierError, Result};
use std::sync::Arc;

/// Barrier set of the colored-pointer collector
///
/// Holds the shared, immutable stub table and the generic classification it
/// refines. Cheap to clone; every compilation may hold its own.
#[derive(Debug, Clone)]
pub struct ZBarrierSet<P = GenericBarrierPolicy> {
    policy: P,
    stubs: Arc<StubTable>,
}

impl ZBarrierSet<GenericBarrierPolicy> {
    pub fn new(stubs: Arc<StubTable>) -> Self {
        Self::with_policy(GenericBarrierPolicy::default(), stubs)
    }
}

impl<P: BarrierPolicy> ZBarrierSet<P> {
    pub fn with_policy(policy: P, stubs: Arc<StubTable>) -> Self {
        Self { policy, stubs }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn stubs(&self) -> &StubTable {
        &self.stubs
    }

    /// Barrier kind for a load from `location`
    ///
    /// Oop handles are always read through the load barrier whatever the
    /// generic policy says.
    pub fn read_barrier_for(&self, location: LocationClass, is_object: bool) -> BarrierType {
        match location {
            LocationClass::Handle => BarrierType::Read,
            _ => self.policy.read_barrier_type(location, is_object),
        }
    }

    /// Barrier kind for a store to `location`
    pub fn write_barrier_for(&self, location: LocationClass, is_object: bool) -> BarrierType {
        self.policy.write_barrier_type(location, is_object)
    }

    /// Load barrier stub for a read kind
    ///
    /// # Errors
    ///
    /// `UnexpectedBarrierType` for anything but the four read kinds,
    /// `MissingStub` if the host did not export the selected stub.
    pub fn read_barrier_stub(&self, kind: BarrierType) -> Result<&ForeignCallDescriptor> {
        let stub = match kind {
            BarrierType::Read => BarrierStub::LoadBarrierOnOopFieldPreloaded,
            BarrierType::ReferenceGet => BarrierStub::LoadBarrierOnWeakOopFieldPreloaded,
            BarrierType::WeakRefersTo => BarrierStub::WeakLoadBarrierOnWeakOopFieldPreloaded,
            BarrierType::PhantomRefersTo => BarrierStub::WeakLoadBarrierOnPhantomOopFieldPreloaded,
            other => return Err(unexpected(other)),
        };
        self.stubs.get(stub)
    }

    /// Store barrier stub for a write kind and store semantics
    ///
    /// # Errors
    ///
    /// `UnexpectedBarrierType` for any kind other than `Field`, `Array` and
    /// `PostInitWrite`, whatever `store` is; `MissingStub` if the host did
    /// not export the selected stub.
    pub fn write_barrier_stub(
        &self,
        kind: BarrierType,
        store: StoreKind,
    ) -> Result<&ForeignCallDescriptor> {
        match kind {
            BarrierType::Field | BarrierType::Array | BarrierType::PostInitWrite => {}
            other => return Err(unexpected(other)),
        }
        let stub = match store {
            StoreKind::Atomic => BarrierStub::StoreBarrierOnOopFieldWithHealing,
            StoreKind::Native => BarrierStub::StoreBarrierOnNativeOopFieldWithoutHealing,
            StoreKind::Plain => BarrierStub::StoreBarrierOnOopFieldWithoutHealing,
        };
        self.stubs.get(stub)
    }

    /// Stub for bulk reference array copies
    pub fn array_copy_stub(&self) -> Result<&ForeignCallDescriptor> {
        self.stubs.get(BarrierStub::LoadBarrierOnOopArray)
    }

    /// Classify `request` and select its stub
    ///
    /// Returns `Ok(None)` when the access needs no barrier.
    pub fn dispatch(&self, request: &BarrierRequest) -> Result<Option<&ForeignCallDescriptor>> {
        let target = match *request {
            BarrierRequest::Read {
                location,
                is_object,
            } => match self.read_barrier_for(location, is_object) {
                BarrierType::None => None,
                kind => Some(self.read_barrier_stub(kind)?),
            },
            BarrierRequest::Write {
                location,
                is_object,
                store,
            } => match self.write_barrier_for(location, is_object) {
                BarrierType::None => None,
                kind => Some(self.write_barrier_stub(kind, store)?),
            },
        };
        log::trace!(
            "barrier for {:?}: {}",
            request,
            target.map_or("none", ForeignCallDescriptor::name)
        );
        Ok(target)
    }
}

fn unexpected(kind: BarrierType) -> BarrierError {
    log::error!("unexpected barrier type {:?}", kind);
    BarrierError::UnexpectedBarrierType(kind)
}
