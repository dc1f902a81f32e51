//! Mark definitions
//!
//! The closed set of relocation kinds the host installer understands. The
//! names are part of the binary contract: the host exports one constant per
//! mark under `CodeInstaller::<NAME>`.

use crate::error::{MarkError, Result};
use std::fmt;

/// Which part of the installer contract a mark belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkGroup {
    /// Well-known positions in the method body (entries, handlers)
    CodePosition,
    /// Call instructions the installer links to their targets
    CallSite,
    /// Safepoint poll instructions
    SafepointPoll,
    /// Instructions embedding a host address or constant
    HostConstant,
    /// Colored-pointer barrier instructions whose color immediates the
    /// host repatches when the collector flips phases
    BarrierRelocation,
}

/// Where the emitter records the mark relative to the tagged instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkPlacement {
    /// Code offset of the first byte of the instruction
    BeforeInstruction,
    /// Code offset just past the instruction; the patched operand ends there
    AfterInstruction,
}

macro_rules! define_marks {
    ($($variant:ident = $name:literal, $group:ident, $placement:ident, $optional:literal;)*) => {
        /// A relocatable patch point understood by the host installer
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Mark {
            $($variant,)*
        }

        impl Mark {
            /// Every mark, in declaration order
            pub const ALL: &'static [Mark] = &[$(Mark::$variant,)*];

            /// Number of marks
            pub const COUNT: usize = Self::ALL.len();

            /// The mark's contract name, e.g. `POLL_FAR`
            pub const fn name(self) -> &'static str {
                match self {
                    $(Mark::$variant => $name,)*
                }
            }

            pub const fn group(self) -> MarkGroup {
                match self {
                    $(Mark::$variant => MarkGroup::$group,)*
                }
            }

            pub const fn placement(self) -> MarkPlacement {
                match self {
                    $(Mark::$variant => MarkPlacement::$placement,)*
                }
            }

            /// Whether a host may legitimately omit this mark
            pub const fn is_optional(self) -> bool {
                match self {
                    $(Mark::$variant => $optional,)*
                }
            }

            /// Look a mark up by its contract name
            pub fn from_name(name: &str) -> Result<Mark> {
                match name {
                    $($name => Ok(Mark::$variant),)*
                    _ => Err(MarkError::UnknownName(name.to_string())),
                }
            }
        }
    };
}

define_marks! {
    VerifiedEntry = "VERIFIED_ENTRY", CodePosition, BeforeInstruction, false;
    UnverifiedEntry = "UNVERIFIED_ENTRY", CodePosition, BeforeInstruction, false;
    OsrEntry = "OSR_ENTRY", CodePosition, BeforeInstruction, false;
    ExceptionHandlerEntry = "EXCEPTION_HANDLER_ENTRY", CodePosition, BeforeInstruction, false;
    DeoptHandlerEntry = "DEOPT_HANDLER_ENTRY", CodePosition, BeforeInstruction, false;
    DeoptMhHandlerEntry = "DEOPT_MH_HANDLER_ENTRY", CodePosition, BeforeInstruction, false;
    FrameComplete = "FRAME_COMPLETE", CodePosition, AfterInstruction, false;
    EntryBarrierPatch = "ENTRY_BARRIER_PATCH", CodePosition, AfterInstruction, true;
    InvokeInterface = "INVOKEINTERFACE", CallSite, BeforeInstruction, false;
    InvokeVirtual = "INVOKEVIRTUAL", CallSite, BeforeInstruction, false;
    InvokeStatic = "INVOKESTATIC", CallSite, BeforeInstruction, false;
    InvokeSpecial = "INVOKESPECIAL", CallSite, BeforeInstruction, false;
    InlineInvoke = "INLINE_INVOKE", CallSite, BeforeInstruction, false;
    PollNear = "POLL_NEAR", SafepointPoll, BeforeInstruction, false;
    PollReturnNear = "POLL_RETURN_NEAR", SafepointPoll, BeforeInstruction, false;
    PollFar = "POLL_FAR", SafepointPoll, BeforeInstruction, false;
    PollReturnFar = "POLL_RETURN_FAR", SafepointPoll, BeforeInstruction, false;
    CardTableAddress = "CARD_TABLE_ADDRESS", HostConstant, AfterInstruction, false;
    NarrowKlassBaseAddress = "NARROW_KLASS_BASE_ADDRESS", HostConstant, AfterInstruction, false;
    NarrowOopBaseAddress = "NARROW_OOP_BASE_ADDRESS", HostConstant, AfterInstruction, false;
    CrcTableAddress = "CRC_TABLE_ADDRESS", HostConstant, AfterInstruction, false;
    LogOfHeapRegionGrainBytes = "LOG_OF_HEAP_REGION_GRAIN_BYTES", HostConstant, AfterInstruction, false;
    VerifyOops = "VERIFY_OOPS", HostConstant, AfterInstruction, false;
    VerifyOopBits = "VERIFY_OOP_BITS", HostConstant, AfterInstruction, false;
    VerifyOopMask = "VERIFY_OOP_MASK", HostConstant, AfterInstruction, false;
    VerifyOopCountAddress = "VERIFY_OOP_COUNT_ADDRESS", HostConstant, AfterInstruction, false;
    ZLoadGoodBeforeShl = "Z_BARRIER_RELOCATION_FORMAT_LOAD_GOOD_BEFORE_SHL", BarrierRelocation, AfterInstruction, false;
    ZLoadBadAfterTest = "Z_BARRIER_RELOCATION_FORMAT_LOAD_BAD_AFTER_TEST", BarrierRelocation, AfterInstruction, false;
    ZMarkBadAfterTest = "Z_BARRIER_RELOCATION_FORMAT_MARK_BAD_AFTER_TEST", BarrierRelocation, AfterInstruction, false;
    ZStoreGoodAfterCmp = "Z_BARRIER_RELOCATION_FORMAT_STORE_GOOD_AFTER_CMP", BarrierRelocation, AfterInstruction, false;
    ZStoreBadAfterTest = "Z_BARRIER_RELOCATION_FORMAT_STORE_BAD_AFTER_TEST", BarrierRelocation, AfterInstruction, false;
    ZStoreGoodAfterOr = "Z_BARRIER_RELOCATION_FORMAT_STORE_GOOD_AFTER_OR", BarrierRelocation, AfterInstruction, false;
    ZStoreGoodAfterMov = "Z_BARRIER_RELOCATION_FORMAT_STORE_GOOD_AFTER_MOV", BarrierRelocation, AfterInstruction, false;
}

impl Mark {
    /// Position of this mark in [`Mark::ALL`]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Key under which the host exports this mark's value
    pub fn constant_key(self) -> String {
        format!("CodeInstaller::{}", self.name())
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
