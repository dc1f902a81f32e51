//! Generic barrier classification
//!
//! Collector-independent rules deciding which accesses need a barrier at all.
//! A collector's barrier set layers its own overrides on top.

use super::kind::{BarrierType, LocationClass};

/// Classifies loads and stores into barrier kinds
pub trait BarrierPolicy {
    fn read_barrier_type(&self, location: LocationClass, is_object: bool) -> BarrierType;

    fn write_barrier_type(&self, location: LocationClass, is_object: bool) -> BarrierType;
}

/// Non-colored defaults shared by every collector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericBarrierPolicy {
    /// Stores into freshly allocated objects get their barriers later, in
    /// bulk, instead of one per store
    pub deferred_init_barriers: bool,
}

impl GenericBarrierPolicy {
    pub fn new(deferred_init_barriers: bool) -> Self {
        Self {
            deferred_init_barriers,
        }
    }
}

impl BarrierPolicy for GenericBarrierPolicy {
    fn read_barrier_type(&self, location: LocationClass, is_object: bool) -> BarrierType {
        if !is_object {
            return BarrierType::None;
        }
        match location {
            LocationClass::ReferenceReferent => BarrierType::ReferenceGet,
            _ => BarrierType::None,
        }
    }

    fn write_barrier_type(&self, location: LocationClass, is_object: bool) -> BarrierType {
        if !is_object {
            return BarrierType::None;
        }
        match location {
            LocationClass::Field | LocationClass::ReferenceReferent => BarrierType::Field,
            LocationClass::Array => BarrierType::Array,
            LocationClass::Init if self.deferred_init_barriers => BarrierType::None,
            LocationClass::Init => BarrierType::PostInitWrite,
            LocationClass::Handle => BarrierType::None,
            LocationClass::Any => BarrierType::Unknown,
        }
    }
}
