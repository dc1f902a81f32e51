//! LIR (Low-level Intermediate Representation) support for the host backend
//!
//! Provides the pieces of the low-level representation that encode host
//! contracts: stack frame layout and the per-method stack of lock-record
//! slots used by the host's lightweight locking protocol.

pub mod error;
pub mod frame;
pub mod lock_stack;

pub use error::{FrameError, Result};
pub use frame::{FrameLayout, FrameMap, SlotKind, StackFrame, StackSlot, MAX_FRAME_SIZE};
pub use lock_stack::{LockDepth, LockStack};
