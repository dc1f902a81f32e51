//! Stack Frame Management
//!
//! Owns physical stack-offset assignment for one compiled method: local
//! variables, spill slots and lock-record slots. Offsets are measured from
//! the frame pointer and grow downward.
//!
//! ```text
//!   higher addresses
//! ┌──────────────────────┐ ◀─ rbp + 8   return address
//! │ saved rbp            │ ◀─ rbp
//! ├──────────────────────┤
//! │ locals (8 bytes each)│
//! ├──────────────────────┤ ◀─ rbp - spill_base_offset
//! │ spill / lock slots   │    allocated on demand
//! └──────────────────────┘ ◀─ rbp - frame_size (16-byte aligned)
//! ```

use crate::error::{FrameError, Result};

/// Largest frame a slot offset can address; offsets are 32-bit displacements
pub const MAX_FRAME_SIZE: u32 = i32::MAX as u32;

/// Saved frame pointer, padded to the 16-byte frame alignment
const SAVED_FP_AREA: i64 = 16;

/// Host-dictated limits for frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Size of one lock record (the host's `BasicLock`)
    pub lock_slot_size: u32,
    /// Largest frame the host accepts
    pub max_frame_size: u32,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            lock_slot_size: 8,
            max_frame_size: 64 * 1024,
        }
    }
}

/// What a stack slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Register allocator spill
    Spill,
    /// Lock record for one monitor nesting level
    LockRecord,
}

/// Handle to an allocated stack slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackSlot {
    offset: i32,
    size: u32,
    kind: SlotKind,
}

impl StackSlot {
    /// Distance below the frame pointer of the slot's lowest byte
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Frame-pointer relative displacement for addressing the slot
    pub fn displacement(&self) -> i32 {
        -self.offset
    }
}

/// Allocator of physical stack slots
///
/// The lock stack only needs this one operation; tests substitute their own
/// implementations.
pub trait FrameMap {
    fn allocate_stack_slot(&mut self, kind: SlotKind) -> Result<StackSlot>;
}

/// Stack frame layout for a function
#[derive(Debug, Clone)]
pub struct StackFrame {
    layout: FrameLayout,
    /// Total frame size in bytes
    frame_size: u32,
    /// Offset to first local variable
    locals_base_offset: i32,
    /// Offset to spill slots
    spill_base_offset: i32,
    /// Bytes of spill area handed out so far
    next_spill_offset: i32,
    /// Local variable offsets
    local_offsets: Vec<i32>,
    slots: Vec<StackSlot>,
}

impl StackFrame {
    /// Frame with no locals
    pub fn new(layout: FrameLayout) -> Self {
        Self::with_locals(layout, 0)
    }

    /// Frame with `local_count` 8-byte locals laid out below the saved rbp
    pub fn with_locals(layout: FrameLayout, local_count: usize) -> Self {
        let mut local_offsets = Vec::with_capacity(local_count);
        let mut size = SAVED_FP_AREA;
        for _ in 0..local_count {
            size += 8;
            local_offsets.push(clamp_offset(size));
        }

        Self {
            layout,
            frame_size: u32::try_from(align16(size)).unwrap_or(u32::MAX),
            locals_base_offset: clamp_offset(SAVED_FP_AREA),
            spill_base_offset: clamp_offset(size),
            next_spill_offset: 0,
            local_offsets,
            slots: Vec::new(),
        }
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Total frame size in bytes, always 16-byte aligned
    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    pub fn locals_base_offset(&self) -> i32 {
        self.locals_base_offset
    }

    /// Get the stack offset for a local variable
    pub fn local_offset(&self, local_index: usize) -> Option<i32> {
        self.local_offsets.get(local_index).copied()
    }

    /// Slots allocated so far, in allocation order
    pub fn slots(&self) -> &[StackSlot] {
        &self.slots
    }

    fn slot_size(&self, kind: SlotKind) -> u32 {
        match kind {
            SlotKind::Spill => 8,
            SlotKind::LockRecord => self.layout.lock_slot_size,
        }
    }
}

impl FrameMap for StackFrame {
    fn allocate_stack_slot(&mut self, kind: SlotKind) -> Result<StackSlot> {
        let size = self.slot_size(kind);
        let limit = self.layout.max_frame_size;
        if size == 0 || size > limit {
            return Err(FrameError::InvalidSlotSize(size));
        }

        // all inputs are at most u32::MAX, so none of this can overflow i64
        let offset = i64::from(self.spill_base_offset)
            + i64::from(self.next_spill_offset)
            + align8(i64::from(size));
        let required = align16(offset);
        let too_large = || {
            log::warn!(
                "frame of {} bytes exceeds host limit of {} bytes",
                required,
                limit
            );
            FrameError::FrameTooLarge {
                required: required.unsigned_abs(),
                limit,
            }
        };
        if required > i64::from(limit.min(MAX_FRAME_SIZE)) {
            return Err(too_large());
        }
        let offset = i32::try_from(offset).map_err(|_| too_large())?;
        let frame_size = u32::try_from(required).map_err(|_| too_large())?;

        self.next_spill_offset = offset - self.spill_base_offset;
        self.frame_size = frame_size;

        let slot = StackSlot { offset, size, kind };
        self.slots.push(slot);
        Ok(slot)
    }
}

fn align8(value: i64) -> i64 {
    (value + 7) & !7
}

fn align16(value: i64) -> i64 {
    (value + 15) & !15
}

fn clamp_offset(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
