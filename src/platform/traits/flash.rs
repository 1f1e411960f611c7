//! Flash device abstraction

use crate::platform::error::Result;

/// Interface to a block-erasable flash device
///
/// Addresses are absolute byte offsets from the start of the device. The
/// usual NOR semantics apply: erased cells read as 0xFF and writes can only
/// clear bits (1 → 0), so rewriting a location without an intervening erase
/// ANDs into whatever is already stored there.
pub trait FlashInterface {
    /// Read `buf.len()` bytes starting at `address`
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `address`
    ///
    /// The target range must have been erased for the cells to read back
    /// as `data`.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `address`
    ///
    /// Both `address` and `size` must be multiples of [`block_size`]
    /// (erasure happens a full block at a time).
    ///
    /// [`block_size`]: FlashInterface::block_size
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Erase block size in bytes
    fn block_size(&self) -> u32;

    /// Total device capacity in bytes
    fn capacity(&self) -> u32;
}
