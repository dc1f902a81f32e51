//! # hsgen-zgc - Colored-Pointer Barrier Dispatch
//!
//! The colored-pointer collector keeps GC metadata in otherwise unused bits
//! of every reference. Compiled code must therefore route heap accesses
//! through the collector's runtime:
//!
//! - loads check the color and, when it is bad, call a *load barrier* stub
//!   that remaps or marks the object and heals the field
//! - stores of references call a *store barrier* stub so the collector can
//!   track remembered-set and marking invariants
//!
//! This crate decides, for one memory access, which of the host's barrier
//! stubs the emitter has to call.
//!
//! ```text
//!  BarrierRequest                 ZBarrierSet                   StubTable
//! ┌───────────────┐  classify  ┌───────────────────┐  lookup  ┌──────────────────────┐
//! │ read / write  │ ─────────▶ │ handle → Read     │ ───────▶ │ BarrierStub → addr   │
//! │ location      │            │ else BarrierPolicy│          │ (host exported)      │
//! │ store kind    │            │ BarrierType→stub  │          └──────────────────────┘
//! └───────────────┘            └───────────────────┘                    │
//!                                                                       ▼
//!                                                          &ForeignCallDescriptor
//! ```
//!
//! Everything here is pure: the only state is an immutable stub table built
//! once at start-up. Barrier kinds outside a stub family are a programming
//! error in the caller and are reported, never defaulted.

pub mod barrier;
pub mod error;

pub use barrier::{
    BarrierPolicy, BarrierRequest, BarrierStub, BarrierType, ForeignCallDescriptor,
    GenericBarrierPolicy, LocationClass, StoreKind, StubSignature, StubTable, ValueKind,
    ZBarrierSet,
};
pub use error::{BarrierError, Result};
