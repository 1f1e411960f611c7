//! Log store engine
//!
//! Stores variable-length units keyed by integer id in a single erase
//! sector, as an append-only record log:
//!
//! ```text
//! ┌───────────────────────────────┐
//! │ Magic: b"past"                │  Offset: 0
//! ├───────────────────────────────┤
//! │ Record: id u32 LE             │  Offset: 4
//! │         length u32 LE         │
//! │         payload [u8; length]  │
//! │         (pad to 4 bytes)      │
//! ├───────────────────────────────┤
//! │ ...                           │
//! ├───────────────────────────────┤
//! │ Erased cells (0xFF)           │  <- end offset, next append point
//! └───────────────────────────────┘
//! ```
//!
//! Overwriting a unit appends a new record and zeroes the old record's id
//! in place (tombstoning). Lookup is a forward linear scan, so at most one
//! record per id is ever reachable. Tombstoned space is only reclaimed by
//! [`LogStore::format`], which erases the whole sector; a store that fills
//! up keeps failing appends until it is reformatted.
//!
//! One execution context owns a store instance; no operation may run
//! concurrently with another against the same sector.

pub mod error;
pub mod record;
pub mod units;

pub use error::{Result, StoreError};
pub use record::{RecordHeader, RecordState, UnitId};
pub use record::{HEADER_LEN, ID_GUARD_MASK, RECORD_HEADER_LEN, STORE_MAGIC};
pub use record::{UNIT_ID_END, UNIT_ID_INVALID};

use crate::platform::traits::FlashInterface;
use core::fmt::Write;
use record::align4;

/// Bytes per hex row in [`LogStore::dump`] output
const DUMP_BYTES_PER_LINE: u32 = 16;

/// Occupancy snapshot of the record log
///
/// Produced by [`LogStore::stats`] from one full record walk. Used and free
/// byte counts refer to the sector, not to live data: tombstoned records
/// still count as used until the next format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreStats {
    /// Bytes occupied by the header and all records, live or tombstoned
    pub used_bytes: u32,
    /// Bytes still available for appends
    pub free_bytes: u32,
    /// Records reachable by id lookup
    pub live_units: u32,
    /// Records superseded or erased in place
    pub tombstoned_units: u32,
    /// The record walk stopped on an id that parses as neither a record
    /// nor the end-of-log sentinel. Lookups treat that point as the end of
    /// the log, so units appended after it are unreachable.
    pub corruption_suspected: bool,
}

/// Log-structured unit store over one flash sector
///
/// The handle owns the flash device and the cached end-of-log offset, so
/// independent instances can manage different sectors (or different mock
/// devices in tests).
pub struct LogStore<F: FlashInterface> {
    /// Flash device
    flash: F,
    /// Sector base address
    base: u32,
    /// Sector size, taken from the device's erase block size
    sector_size: u32,
    /// Next append address; `None` until a locate scan establishes it
    end_addr: Option<u32>,
}

impl<F: FlashInterface> LogStore<F> {
    /// Create a store over the sector starting at `base`
    ///
    /// `base` must be aligned to the device's erase block size. No flash
    /// access happens here; the end offset is established lazily.
    pub fn new(flash: F, base: u32) -> Self {
        let sector_size = flash.block_size();
        Self {
            flash,
            base,
            sector_size,
            end_addr: None,
        }
    }

    /// Sector size in bytes
    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// Check whether the sector holds a store
    ///
    /// Refreshes the cached end offset with a locate scan, then compares
    /// the sector header against the magic. True only if the magic matches
    /// and the scan established an end offset. This is a query, not an
    /// error path: a blank or foreign sector simply reports false.
    pub fn is_valid(&mut self) -> bool {
        self.end_addr = self.find_unit(UNIT_ID_END).unwrap_or(None);

        let mut magic = [0u8; 4];
        if self.flash.read(self.base, &mut magic).is_err() {
            return false;
        }
        magic == STORE_MAGIC && self.end_addr.is_some()
    }

    /// Erase the sector and write a fresh store header
    ///
    /// Destroys every stored unit unconditionally. This is the only
    /// operation that reclaims tombstoned space. On any failure the cached
    /// end offset is left cleared.
    pub fn format(&mut self) -> Result<()> {
        crate::log_info!("formatting store sector at {:#x}", self.base);
        self.end_addr = None;
        self.flash.erase(self.base, self.sector_size)?;
        self.flash.write(self.base, &STORE_MAGIC)?;

        let end = self
            .find_unit(UNIT_ID_END)?
            .ok_or(StoreError::NotFormatted)?;
        self.end_addr = Some(end);
        Ok(())
    }

    /// Bytes occupied by the header and the record log
    ///
    /// Lazily establishes the end offset if not yet cached. Returns 0 when
    /// no end offset can be established. The value never shrinks while the
    /// store lives; erasing units does not free space.
    pub fn size(&mut self) -> u32 {
        if self.end_addr.is_none() {
            self.end_addr = self.find_unit(UNIT_ID_END).unwrap_or(None);
        }
        match self.end_addr {
            Some(end) => end - self.base,
            None => 0,
        }
    }

    /// Read a unit's payload into `buf`
    ///
    /// Copies at most `buf.len()` bytes and returns the number copied. A
    /// buffer shorter than the stored payload silently truncates; sizing
    /// the buffer is the caller's job.
    pub fn read_unit(&mut self, id: UnitId, buf: &mut [u8]) -> Result<usize> {
        check_unit_id(id)?;
        let addr = self.find_unit(id)?.ok_or(StoreError::NotFound)?;

        let stored = self.read_u32(addr + 4)? as usize;
        let count = stored.min(buf.len());
        self.flash.read(addr + RECORD_HEADER_LEN, &mut buf[..count])?;
        Ok(count)
    }

    /// Write a unit, superseding any previous record for the same id
    ///
    /// Appends a new record at the end of the log, then tombstones the old
    /// record if one exists. The append is three device writes (id, length,
    /// payload); a failure mid-sequence aborts without rollback and can
    /// leave a partial record that invalidates the store until the next
    /// format.
    pub fn write_unit(&mut self, id: UnitId, data: &[u8]) -> Result<()> {
        check_unit_id(id)?;

        if self.end_addr.is_none() {
            self.end_addr = self.find_unit(UNIT_ID_END)?;
        }
        let end = self.end_addr.ok_or(StoreError::NotFormatted)?;

        let needed = RECORD_HEADER_LEN as u64 + data.len() as u64;
        if end as u64 + needed > self.sector_end() as u64 {
            return Err(StoreError::Full);
        }

        let old_addr = self.find_unit(id)?;

        crate::log_debug!("appending unit {} at {:#x}", id, end);
        self.flash.write(end, &id.to_le_bytes())?;
        self.flash.write(end + 4, &(data.len() as u32).to_le_bytes())?;
        self.flash.write(end + RECORD_HEADER_LEN, data)?;
        self.end_addr = Some(align4(end + RECORD_HEADER_LEN + data.len() as u32));

        if let Some(old) = old_addr {
            crate::log_debug!("tombstoning unit {} at {:#x}", id, old);
            self.flash.write(old, &UNIT_ID_INVALID.to_le_bytes())?;
        }
        Ok(())
    }

    /// Erase a unit by tombstoning its live record
    ///
    /// The record's bytes stay on the medium and its space is not
    /// reclaimed; [`size`](Self::size) does not shrink.
    pub fn erase_unit(&mut self, id: UnitId) -> Result<()> {
        check_unit_id(id)?;
        let addr = self.find_unit(id)?.ok_or(StoreError::NotFound)?;

        crate::log_debug!("tombstoning unit {} at {:#x}", id, addr);
        self.flash.write(addr, &UNIT_ID_INVALID.to_le_bytes())?;
        Ok(())
    }

    /// Log the raw sector contents as hex rows
    ///
    /// Diagnostic only. Ignores record structure; rows that fail to read
    /// are skipped silently.
    pub fn dump(&mut self) {
        let mut row = [0u8; DUMP_BYTES_PER_LINE as usize];
        let mut offset = 0;
        while offset < self.sector_size {
            if self.flash.read(self.base + offset, &mut row).is_ok() {
                let mut line: heapless::String<64> = heapless::String::new();
                let _ = write!(line, "{:08x}:", self.base + offset);
                for byte in row.iter() {
                    let _ = write!(line, " {:02x}", byte);
                }
                crate::log_debug!("{}", line.as_str());
            }
            offset += DUMP_BYTES_PER_LINE;
        }
    }

    /// Walk the record log and report occupancy
    ///
    /// Unlike [`is_valid`](Self::is_valid) this does not look at the magic;
    /// it reports whatever the record walk finds, including the
    /// [`corruption_suspected`](StoreStats::corruption_suspected) signal
    /// that lookups deliberately fold into "end of log".
    pub fn stats(&mut self) -> Result<StoreStats> {
        let mut live = 0;
        let mut tombstoned = 0;
        let mut corruption_suspected = false;

        let mut addr = self.base + HEADER_LEN;
        loop {
            if addr.saturating_add(RECORD_HEADER_LEN) > self.sector_end() {
                break;
            }
            let mut buf = [0u8; RecordHeader::SIZE];
            self.flash.read(addr, &mut buf)?;
            let Some(header) = RecordHeader::from_bytes(&buf) else {
                break;
            };

            if header.is_end() {
                break;
            }
            if header.looks_corrupt() {
                corruption_suspected = true;
                break;
            }
            match header.state() {
                RecordState::Live => live += 1,
                RecordState::Tombstoned => tombstoned += 1,
            }
            addr = header.next_addr(addr);
        }

        let used = addr.min(self.sector_end()) - self.base;
        Ok(StoreStats {
            used_bytes: used,
            free_bytes: self.sector_size - used,
            live_units: live,
            tombstoned_units: tombstoned,
            corruption_suspected,
        })
    }

    /// Access the flash device (for diagnostics and tests)
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Consume the store and return the flash device
    pub fn into_flash(self) -> F {
        self.flash
    }

    /// First address past the sector
    fn sector_end(&self) -> u32 {
        self.base + self.sector_size
    }

    /// Locate the record for `id` with a forward linear scan
    ///
    /// Starts just after the header and visits every record in append
    /// order. Tombstones carry id 0 and never match a real target, so the
    /// first match is the live record. Scanning for [`UNIT_ID_END`] yields
    /// the end-of-log offset instead.
    ///
    /// The scan stops with "not found" at an id whose guard bits are set
    /// (uninitialized or foreign cells) and at the sector edge. An id cell
    /// past the edge would read as erased, so when the target is the end
    /// sentinel the edge itself is the answer.
    fn find_unit(&mut self, id: UnitId) -> Result<Option<u32>> {
        let mut addr = self.base + HEADER_LEN;
        loop {
            if addr.saturating_add(4) > self.sector_end() {
                return Ok((id == UNIT_ID_END).then_some(addr));
            }

            let cur_id = self.read_u32(addr)?;
            if cur_id == id {
                return Ok(Some(addr));
            }
            if cur_id == UNIT_ID_END {
                return Ok(None);
            }
            if cur_id & ID_GUARD_MASK != 0 {
                // scan ran astray
                return Ok(None);
            }

            if addr.saturating_add(RECORD_HEADER_LEN) > self.sector_end() {
                return Ok(None);
            }
            let length = self.read_u32(addr + 4)?;
            addr = RecordHeader { id: cur_id, length }.next_addr(addr);
        }
    }

    /// Read one little-endian u32 from flash
    fn read_u32(&mut self, addr: u32) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.flash.read(addr, &mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }
}

/// Reject ids that can never name a unit
///
/// 0 marks tombstones, 0xFFFFFFFF is the end sentinel, and an id with guard
/// bits set would stop every later scan dead, truncating the log for all
/// units appended after it.
fn check_unit_id(id: UnitId) -> Result<()> {
    if id == UNIT_ID_INVALID || id & ID_GUARD_MASK != 0 {
        return Err(StoreError::InvalidId);
    }
    Ok(())
}
