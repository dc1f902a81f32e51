//! Barrier Module - classification and stub selection
//!
//! - `kind` - barrier kinds, location classes and access requests
//! - `policy` - the collector-agnostic classification every GC shares
//! - `stubs` - host barrier entry points and their call signatures
//! - `dispatch` - the colored-pointer barrier set tying the three together

pub mod dispatch;
pub mod kind;
pub mod policy;
pub mod stubs;

pub use dispatch::ZBarrierSet;
pub use kind::{BarrierRequest, BarrierType, LocationClass, StoreKind};
pub use policy::{BarrierPolicy, GenericBarrierPolicy};
pub use stubs::{BarrierStub, ForeignCallDescriptor, StubSignature, StubTable, ValueKind};
