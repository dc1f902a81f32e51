//! hsgen-util - Core Utilities and Foundation Types
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! Small, dependency-light building blocks shared by the backend crates.
//!
//! TYPED INDICES:
//! --------------
//! Per-compilation tables (lock slots, recorded code sites) are dense arrays
//! addressed by small integers. Wrapping those integers in newtypes keeps a
//! lock depth from being used to index, say, a table of call sites:
//!
//! ```text
//! IndexVec<LockDepth, StackSlot>
//! ┌─────────┬─────────┬─────────┬─────────┐
//! │ depth 0 │ depth 1 │ depth 2 │ depth 3 │   contiguous Vec<T>
//! └─────────┴─────────┴─────────┴─────────┘
//!      ▲
//!      └── LockDepth(u32) ── Idx::index() ──> usize
//! ```
//!
//! The wrapper is zero-cost: `IndexVec<I, T>` has the layout of `Vec<T>`.
//!
//! HASHING:
//! --------
//! Keys used in the backend are small enums and integers. `FxHashMap` is
//! re-exported so that every crate agrees on one fast, non-DoS-resistant
//! hasher for those tables.

pub mod index_vec;

pub use index_vec::{Idx, IndexVec};

/// Hash map with the Fx hasher, used for small internal keys.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Hash set with the Fx hasher.
pub type FxHashSet<T> = rustc_hash::FxHashSet<T>;

#[doc(hidden)]
pub use static_assertions as __static_assertions;
