//! Error Module - Barrier Dispatch Error Types
//!
//! # Error Categories
//!
//! ## Dispatch Errors
//! - `UnexpectedBarrierType` - barrier kind outside the requested stub family
//!
//! ## Configuration Errors
//! - `MissingStub` - host did not export a barrier entry point
//! - `UnknownStub` - host description names a stub this compiler does not know

use crate::barrier::BarrierType;
use thiserror::Error;

/// Error type for barrier classification and stub lookup
///
/// # Examples
///
/// ```rust
/// use hsgen_zgc::{BarrierError, BarrierType};
///
/// fn describe(err: &BarrierError) -> &'static str {
///     match err {
///         BarrierError::UnexpectedBarrierType(_) => "abort this compilation",
///         BarrierError::MissingStub(_) | BarrierError::UnknownStub(_) => "host mismatch",
///     }
/// }
///
/// let err = BarrierError::UnexpectedBarrierType(BarrierType::Unknown);
/// assert_eq!(describe(&err), "abort this compilation");
/// assert!(err.is_bug());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarrierError {
    /// A barrier kind was passed to a stub family that has no entry for it
    ///
    /// **When returned:** `read_barrier_stub` with a non-read kind, or
    /// `write_barrier_stub` with a kind other than field, array or
    /// post-init write
    ///
    /// **Recovery strategy:** None. The enclosing compilation must abort
    #[error("unexpected barrier type: {0:?}")]
    UnexpectedBarrierType(BarrierType),

    /// The host did not export a barrier stub the emitter needs
    ///
    /// **When returned:** looking up a stub that was absent or had address 0
    /// in the host description
    ///
    /// **Recovery strategy:** None. The host and compiler disagree on the
    /// collector's runtime interface
    #[error("Missing barrier stub: {0}")]
    MissingStub(&'static str),

    /// The host description names a stub no barrier maps to
    ///
    /// **When returned:** `StubTable::from_addresses` with an unknown name
    #[error("Unknown barrier stub: {0}")]
    UnknownStub(String),
}

impl BarrierError {
    /// Check if this error indicates a bug in the compiler
    pub fn is_bug(&self) -> bool {
        matches!(self, BarrierError::UnexpectedBarrierType(_))
    }
}

/// Result type alias for barrier operations
pub type Result<T> = std::result::Result<T, BarrierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_barrier_type_display() {
        let err = BarrierError::UnexpectedBarrierType(BarrierType::AsNoKeepaliveWrite);
        assert_eq!(
            err.to_string(),
            "unexpected barrier type: AsNoKeepaliveWrite"
        );
    }

    #[test]
    fn test_missing_stub_is_not_a_bug() {
        let err = BarrierError::MissingStub("load_barrier_on_oop_array");
        assert!(!err.is_bug());
        assert!(err.to_string().contains("load_barrier_on_oop_array"));
    }
}
