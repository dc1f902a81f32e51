//! Frame layout errors

use thiserror::Error;

/// Error type for stack slot allocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The frame would exceed the host's maximum frame size
    #[error("Frame too large: {required} bytes required, host limit is {limit} bytes")]
    FrameTooLarge { required: u64, limit: u32 },

    /// A slot of this size cannot be laid out
    #[error("Invalid stack slot size: {0} bytes")]
    InvalidSlotSize(u32),
}

/// Result type alias for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
