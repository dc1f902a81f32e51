//! # hsgen-mark - Patch-Point Registry
//!
//! Generated code is installed into the host runtime's code cache by a
//! host-owned installer. The installer does not parse machine code; instead
//! the emitter tags the instructions it must touch with a *mark*, and the
//! installer patches each tagged operand with per-method metadata (entry
//! points, deopt handlers, safepoint polls, GC base addresses).
//!
//! ## Lifecycle
//!
//! ```text
//!  compiler start-up (single thread)          compilations (many threads)
//! ┌──────────────────────────────────┐      ┌────────────────────────────┐
//! │ host constant table              │      │ registry.is_bound(mark)    │
//! │   "CodeInstaller::POLL_FAR" = 14 │ ───▶ │ registry.value(mark)?      │
//! │ MarkRegistry::populate / bind    │      │ MarkRecorder::record(..)   │
//! └──────────────────────────────────┘      └────────────────────────────┘
//!        each entry written once                  read-only, lock-free
//! ```
//!
//! The set of marks is closed ([`Mark::ALL`]). A [`MarkRegistry`] holds one
//! bind-once cell per mark; it is a plain value, shared between compilation
//! threads through an `Arc` once binding has finished.
//!
//! ## Example
//!
//! ```rust
//! use hsgen_mark::{Mark, MarkRegistry};
//!
//! let registry = MarkRegistry::new();
//! registry.bind(Mark::EntryBarrierPatch, 0x10)?;
//!
//! assert!(registry.is_bound(Mark::EntryBarrierPatch));
//! assert_eq!(registry.value(Mark::EntryBarrierPatch)?, 0x10);
//! assert!(!registry.is_bound(Mark::PollFar));
//! # Ok::<(), hsgen_mark::MarkError>(())
//! ```

pub mod error;
pub mod mark;
pub mod recorder;
pub mod registry;

pub use error::{MarkError, Result};
pub use mark::{Mark, MarkGroup, MarkPlacement};
pub use recorder::{MarkRecorder, MarkSite, SiteId};
pub use registry::MarkRegistry;
