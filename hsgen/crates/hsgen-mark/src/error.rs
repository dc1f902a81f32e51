//! Error Module - Patch-Point Registry Error Types
//!
//! Every variant here signals a compiler-internal bug or a host that does not
//! match what the compiler was built against. None of them is retried.

use crate::mark::Mark;
use thiserror::Error;

/// Error type for mark binding and lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkError {
    /// A mark was bound a second time
    ///
    /// **When returned:** `bind` on a mark that already holds a value
    ///
    /// **Recovery strategy:** None. Double initialization of the registry is a bug
    #[error("Mark {mark} is already bound to {existing:#x}; refusing to rebind to {attempted:#x}")]
    AlreadyBound {
        mark: Mark,
        existing: i64,
        attempted: i64,
    },

    /// The value of an unbound mark was requested
    ///
    /// **When returned:** `value` before the host supplied the mark
    ///
    /// **Recovery strategy:** None. Callers that can cope with a missing
    /// capability must ask `is_bound` first
    #[error("Unavailable mark: {0}")]
    Unavailable(Mark),

    /// The host does not export a required mark
    ///
    /// **When returned:** `populate` finds no constant for a non-optional mark
    #[error("Unsupported mark {mark}: host does not export {key}")]
    Unsupported { mark: Mark, key: String },

    /// A mark site was recorded behind an earlier one
    ///
    /// **When returned:** `MarkRecorder::record` with a decreasing code offset
    #[error("Mark {mark} recorded at offset {offset}, before previous site at offset {previous}")]
    OutOfOrder {
        mark: Mark,
        offset: u32,
        previous: u32,
    },

    /// A name does not correspond to any mark
    #[error("Unknown mark name: {0}")]
    UnknownName(String),
}

impl MarkError {
    /// Check if this error indicates a bug in the compiler rather than a
    /// mismatched host
    pub fn is_bug(&self) -> bool {
        matches!(
            self,
            MarkError::AlreadyBound { .. } | MarkError::Unavailable(_) | MarkError::OutOfOrder { .. }
        )
    }
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, MarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display_names_mark() {
        let err = MarkError::Unavailable(Mark::PollFar);
        assert_eq!(err.to_string(), "Unavailable mark: POLL_FAR");
    }

    #[test]
    fn test_already_bound_display() {
        let err = MarkError::AlreadyBound {
            mark: Mark::VerifiedEntry,
            existing: 0x10,
            attempted: 0x20,
        };
        assert_eq!(
            err.to_string(),
            "Mark VERIFIED_ENTRY is already bound to 0x10; refusing to rebind to 0x20"
        );
    }

    #[test]
    fn test_is_bug() {
        assert!(MarkError::Unavailable(Mark::OsrEntry).is_bug());
        assert!(!MarkError::UnknownName("X".to_string()).is_bug());
        assert!(!MarkError::Unsupported {
            mark: Mark::CrcTableAddress,
            key: Mark::CrcTableAddress.constant_key(),
        }
        .is_bug());
    }
}
