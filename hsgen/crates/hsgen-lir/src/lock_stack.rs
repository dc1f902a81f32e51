//! Lock Stack - lock-record slots indexed by monitor nesting depth
//!
//! The host's lightweight locking protocol needs one lock record per nesting
//! level of `monitorenter`. After lock elimination the depths observed while
//! lowering a method can be non-contiguous (0, 1, 3 with 2 optimized away),
//! but the low-level instruction list addresses lock records positionally and
//! does not tolerate absent entries. So the rule is: no holes, ever.
//!
//! ```text
//! slot_for(0)  slot_for(1)  slot_for(3)
//!     │            │            │
//!     ▼            ▼            ▼
//! ┌────────┬────────┬────────┬────────┐
//! │ slot 0 │ slot 1 │ slot 2 │ slot 3 │
//! └────────┴────────┴────────┴────────┘
//!                        ▲
//!                        └── materialized for depth 3, never read again
//! ```
//!
//! Slots materialized only to fill a gap are never referenced by the rest of
//! the compilation; the physical stack allocator is free to coalesce them.
//! They are kept on purpose.

use crate::error::Result;
use crate::frame::{FrameMap, SlotKind, StackSlot};
use hsgen_util::{define_idx, Idx, IndexVec};

define_idx!(
    /// Monitor nesting depth, starting at 0 for the outermost lock
    LockDepth
);

/// Lock-record slots of one method compilation
///
/// Created empty when compilation of a method begins and dropped with the
/// compilation's intermediate state. Never shared between compilations.
#[derive(Debug, Default, Clone)]
pub struct LockStack {
    slots: IndexVec<LockDepth, StackSlot>,
}

impl LockStack {
    pub fn new() -> Self {
        Self {
            slots: IndexVec::new(),
        }
    }

    /// Slot for the lock record at `depth`, allocating it if needed
    ///
    /// If fewer than `depth + 1` slots exist, the stack grows to exactly
    /// `depth + 1`, requesting one fresh lock-record slot from `frame` for
    /// every new depth in ascending order. Existing slots are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Whatever `frame` reports, unmodified. Slots allocated before the
    /// failure stay in place, so the stack remains hole-free.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hsgen_lir::{FrameLayout, LockDepth, LockStack, StackFrame};
    ///
    /// let mut frame = StackFrame::new(FrameLayout::default());
    /// let mut locks = LockStack::new();
    ///
    /// let outer = locks.slot_for(&mut frame, LockDepth(0))?;
    /// let inner = locks.slot_for(&mut frame, LockDepth(3))?;
    ///
    /// assert_eq!(locks.len(), 4);
    /// assert_eq!(locks.slot_for(&mut frame, LockDepth(0))?, outer);
    /// assert_ne!(outer, inner);
    /// # Ok::<(), hsgen_lir::FrameError>(())
    /// ```
    pub fn slot_for<F>(&mut self, frame: &mut F, depth: LockDepth) -> Result<StackSlot>
    where
        F: FrameMap + ?Sized,
    {
        self.slots.try_grow_to(depth, |new_depth| -> Result<StackSlot> {
            let slot = frame.allocate_stack_slot(SlotKind::LockRecord)?;
            log::trace!(
                "lock slot for depth {} at offset {}",
                new_depth.index(),
                slot.offset()
            );
            Ok(slot)
        })?;
        Ok(self.slots[depth])
    }

    /// Slot for `depth` if it was already allocated
    pub fn slot(&self, depth: LockDepth) -> Option<StackSlot> {
        self.slots.get(depth).copied()
    }

    /// Number of depths with a slot, i.e. one past the deepest depth seen
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(depth, slot)` pairs from the outermost lock inward
    pub fn iter(&self) -> impl Iterator<Item = (LockDepth, StackSlot)> + '_ {
        self.slots
            .iter_enumerated()
            .map(|(depth, slot)| (depth, *slot))
    }

    pub fn slots(&self) -> &[StackSlot] {
        self.slots.as_slice()
    }

    pub fn into_slots(self) -> Vec<StackSlot> {
        self.slots.into_raw()
    }
}
