//! Store error types
//!
//! Provides error types for store operations.

use crate::platform::error::FlashError;
use core::fmt;

/// Result type for store operations
pub type Result<T> = core::result::Result<T, StoreError>;

/// Errors from store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Flash device operation failed
    Flash(FlashError),
    /// No live record exists for the requested unit id
    NotFound,
    /// Reserved or unusable unit id passed as a key
    InvalidId,
    /// No end-of-log offset could be established (sector never formatted,
    /// or its contents do not parse as a record log)
    NotFormatted,
    /// Appending the record would run past the end of the sector
    Full,
}

impl From<FlashError> for StoreError {
    fn from(err: FlashError) -> Self {
        StoreError::Flash(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Flash(e) => write!(f, "flash error: {}", e),
            StoreError::NotFound => write!(f, "unit not found"),
            StoreError::InvalidId => write!(f, "invalid unit id"),
            StoreError::NotFormatted => write!(f, "store not formatted"),
            StoreError::Full => write!(f, "sector full"),
        }
    }
}
