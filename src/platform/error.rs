//! Platform error types
//!
//! This module defines error types for flash device operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, FlashError>;

/// Flash device errors
///
/// Platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Read operation failed
    ReadFailed,
    /// Write operation failed
    WriteFailed,
    /// Erase operation failed
    EraseFailed,
    /// Address or length outside the device
    OutOfBounds,
    /// Address or size not aligned to an erase block boundary
    NotAligned,
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashError::ReadFailed => write!(f, "flash read failed"),
            FlashError::WriteFailed => write!(f, "flash write failed"),
            FlashError::EraseFailed => write!(f, "flash erase failed"),
            FlashError::OutOfBounds => write!(f, "address outside the device"),
            FlashError::NotAligned => write!(f, "address not block-aligned"),
        }
    }
}
