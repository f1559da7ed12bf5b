// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! The core EEPROM emulation implementation.

use core::cell::Cell;

use crate::error_codes::ErrorCode;
use crate::flash_controller::FlashController;
use crate::success_codes::SuccessCode;

/// Page status: erased and ready to become the transfer target.
pub const PAGE_ERASED: u16 = 0xFFFF;
/// Page status: transfer target, filling with copied records.
pub const PAGE_RECEIVE: u16 = 0xEEEE;
/// Page status: the active page holding the current data set.
pub const PAGE_VALID: u16 = 0x0000;

/// The value reported for addresses that were never written.
///
/// This doubles as the erased-cell pattern, so a store cannot distinguish
/// "never written" from "written as `0xFFFF`"; `update()` treats both the
/// same.
pub const DEFAULT_DATA: u16 = 0xFFFF;

/// An erased flash half-word.
const ERASED_HALFWORD: u16 = 0xFFFF;

/// Bytes per record slot: a 16-bit address followed by a 16-bit value.
const RECORD_SIZE: usize = 4;

/// Bytes reserved at the page base for the status half-word. The second
/// half-word of the first slot is kept erased so records stay word aligned.
const HEADER_SIZE: usize = 4;

/// Placement of the two flash pages backing a store.
#[derive(Clone, Copy)]
pub struct PageConfig {
    /// Base byte address of the first page.
    pub page_base_0: usize,
    /// Base byte address of the second page.
    pub page_base_1: usize,
    /// Size in bytes of each page.
    pub page_size: usize,
    /// Highest writable address. Must be below `0xFFFF`, which marks an
    /// erased record slot.
    pub max_address: u16,
}

impl PageConfig {
    /// Describe a pair of `page_size`-byte pages for a store to live on.
    pub const fn new(
        page_base_0: usize,
        page_base_1: usize,
        page_size: usize,
        max_address: u16,
    ) -> PageConfig {
        PageConfig {
            page_base_0,
            page_base_1,
            page_size,
            max_address,
        }
    }

    fn validate(&self) -> Result<(), ErrorCode> {
        // Room for the header and at least one record, in whole slots.
        if self.page_size < HEADER_SIZE + RECORD_SIZE || self.page_size % RECORD_SIZE != 0 {
            return Err(ErrorCode::InvalidConfig);
        }
        if self.page_base_0 % RECORD_SIZE != 0 || self.page_base_1 % RECORD_SIZE != 0 {
            return Err(ErrorCode::InvalidConfig);
        }
        // The pages must fit in the address space and must not overlap.
        let end_0 = self
            .page_base_0
            .checked_add(self.page_size)
            .ok_or(ErrorCode::InvalidConfig)?;
        let end_1 = self
            .page_base_1
            .checked_add(self.page_size)
            .ok_or(ErrorCode::InvalidConfig)?;
        if self.page_base_0 < end_1 && self.page_base_1 < end_0 {
            return Err(ErrorCode::InvalidConfig);
        }
        if self.max_address == ERASED_HALFWORD {
            return Err(ErrorCode::InvalidConfig);
        }
        Ok(())
    }
}

/// The struct that runs the EEPROM emulation on top of a flash controller.
///
/// One page is VALID and holds the data set as an append-only log of
/// records; the other is kept erased. When the log fills up the live
/// records are compacted onto the spare page and the pages swap roles.
pub struct EmuKv<C: FlashController> {
    /// The backing flash driver.
    pub controller: C,
    config: PageConfig,
    /// Base address of the VALID page, resolved by `init()`. `None` until
    /// the store has been initialised.
    valid_page: Cell<Option<usize>>,
}

impl<C: FlashController> EmuKv<C> {
    /// Create a new store on `controller` over the pages in `config`.
    ///
    /// No flash is touched until [`EmuKv::init`] runs.
    pub fn new(controller: C, config: PageConfig) -> EmuKv<C> {
        EmuKv {
            controller,
            config,
            valid_page: Cell::new(None),
        }
    }

    /// Initialise the store from whatever the two pages contain.
    ///
    /// Blank flash is formatted into an empty store. A page pair left behind
    /// by an interrupted transfer is repaired: a VALID page always wins and
    /// a leftover RECEIVE page is erased, while an orphaned RECEIVE page
    /// whose sibling is already erased is promoted to VALID (the source page
    /// is only erased after the copy has completed, so the copy is whole).
    ///
    /// Returns `Written` if flash was modified, `Complete` otherwise.
    /// States that cannot be resolved without guessing fail with
    /// `NoValidPage` and leave flash untouched; `format()` is the explicit
    /// way out.
    pub fn init(&self) -> Result<SuccessCode, ErrorCode> {
        self.config.validate()?;
        self.valid_page.set(None);

        let base_0 = self.config.page_base_0;
        let base_1 = self.config.page_base_1;
        let status_0 = self.controller.read_halfword(base_0)?;
        let status_1 = self.controller.read_halfword(base_1)?;

        match (status_0, status_1) {
            (PAGE_ERASED, PAGE_ERASED) => {
                // First use: build the empty store.
                self.check_erase_page(base_0)?;
                self.check_erase_page(base_1)?;
                self.controller.program_halfword(base_0, PAGE_VALID)?;
                self.valid_page.set(Some(base_0));
                Ok(SuccessCode::Written)
            }
            (PAGE_VALID, PAGE_VALID) => Err(ErrorCode::NoValidPage),
            (PAGE_VALID, PAGE_ERASED) => {
                let erased = self.check_erase_page(base_1)?;
                self.valid_page.set(Some(base_0));
                if erased {
                    Ok(SuccessCode::Written)
                } else {
                    Ok(SuccessCode::Complete)
                }
            }
            (PAGE_ERASED, PAGE_VALID) => {
                let erased = self.check_erase_page(base_0)?;
                self.valid_page.set(Some(base_1));
                if erased {
                    Ok(SuccessCode::Written)
                } else {
                    Ok(SuccessCode::Complete)
                }
            }
            (PAGE_VALID, PAGE_RECEIVE) => {
                // Transfer died before the source page was retired. The
                // valid page still holds everything; drop the partial copy.
                self.check_erase_page(base_1)?;
                self.valid_page.set(Some(base_0));
                Ok(SuccessCode::Written)
            }
            (PAGE_RECEIVE, PAGE_VALID) => {
                self.check_erase_page(base_0)?;
                self.valid_page.set(Some(base_1));
                Ok(SuccessCode::Written)
            }
            (PAGE_RECEIVE, PAGE_ERASED) => {
                // Transfer died after the source page was erased: the copy
                // had completed. Finish the job by promoting the target.
                self.check_erase_page(base_1)?;
                self.controller.program_halfword(base_0, PAGE_VALID)?;
                self.valid_page.set(Some(base_0));
                Ok(SuccessCode::Written)
            }
            (PAGE_ERASED, PAGE_RECEIVE) => {
                self.check_erase_page(base_0)?;
                self.controller.program_halfword(base_1, PAGE_VALID)?;
                self.valid_page.set(Some(base_1));
                Ok(SuccessCode::Written)
            }
            (PAGE_VALID, _) => {
                // Illegal status on the sibling page, reclaim it.
                self.check_erase_page(base_1)?;
                self.valid_page.set(Some(base_0));
                Ok(SuccessCode::Written)
            }
            (_, PAGE_VALID) => {
                self.check_erase_page(base_0)?;
                self.valid_page.set(Some(base_1));
                Ok(SuccessCode::Written)
            }
            (_, _) => Err(ErrorCode::NoValidPage),
        }
    }

    /// Read the current value stored for `address`.
    ///
    /// Addresses that were never written read as [`DEFAULT_DATA`].
    pub fn read(&self, address: u16) -> Result<u16, ErrorCode> {
        let valid = self.valid_page.get().ok_or(ErrorCode::NotInitialised)?;
        if address > self.config.max_address {
            return Err(ErrorCode::BadAddress);
        }
        match self.find_record(valid, address)? {
            Some(value) => Ok(value),
            None => Ok(DEFAULT_DATA),
        }
    }

    /// Store `value` for `address`, unconditionally appending a record.
    ///
    /// If the active page is full the live records are first compacted onto
    /// the spare page. Prefer [`EmuKv::update`] for values that rarely
    /// change; it skips the append when the value already matches.
    pub fn write(&self, address: u16, value: u16) -> Result<SuccessCode, ErrorCode> {
        let valid = self.valid_page.get().ok_or(ErrorCode::NotInitialised)?;
        if address > self.config.max_address {
            return Err(ErrorCode::BadAddress);
        }
        self.append_or_transfer(valid, address, value)
    }

    /// Store `value` for `address` unless the stored value already matches,
    /// in which case nothing is written and `SameValue` is returned.
    ///
    /// An address that was never written compares as [`DEFAULT_DATA`].
    pub fn update(&self, address: u16, value: u16) -> Result<SuccessCode, ErrorCode> {
        let valid = self.valid_page.get().ok_or(ErrorCode::NotInitialised)?;
        if address > self.config.max_address {
            return Err(ErrorCode::BadAddress);
        }
        let current = match self.find_record(valid, address)? {
            Some(value) => value,
            None => DEFAULT_DATA,
        };
        if current == value {
            return Ok(SuccessCode::SameValue);
        }
        self.append_or_transfer(valid, address, value)
    }

    /// Erase both pages and bring up an empty store with page 0 VALID.
    ///
    /// Works on an uninitialised store as well; this is the recovery path
    /// after `init()` reports `NoValidPage`. Pages that already read blank
    /// are not erased again.
    pub fn format(&self) -> Result<SuccessCode, ErrorCode> {
        self.config.validate()?;
        self.valid_page.set(None);
        self.check_erase_page(self.config.page_base_0)?;
        self.check_erase_page(self.config.page_base_1)?;
        self.controller
            .program_halfword(self.config.page_base_0, PAGE_VALID)?;
        self.valid_page.set(Some(self.config.page_base_0));
        Ok(SuccessCode::Written)
    }

    /// Number of distinct addresses currently stored.
    pub fn count(&self) -> Result<usize, ErrorCode> {
        let valid = self.valid_page.get().ok_or(ErrorCode::NotInitialised)?;
        let end = valid + self.config.page_size;
        let mut total = 0;
        let mut slot = valid + HEADER_SIZE;
        while slot < end {
            let record_address = self.controller.read_halfword(slot)?;
            if record_address != ERASED_HALFWORD && !self.superseded(valid, slot, record_address)? {
                total += 1;
            }
            slot += RECORD_SIZE;
        }
        Ok(total)
    }

    /// Maximum number of records one page can hold.
    ///
    /// Writes past this many *distinct* addresses fail with `FlashFull`;
    /// rewrites of existing addresses only cost log space until the next
    /// transfer compacts them.
    pub fn maxcount(&self) -> usize {
        self.config.page_size.saturating_sub(HEADER_SIZE) / RECORD_SIZE
    }

    /// Append a record to the active page, falling back to a page transfer
    /// when the log is full.
    fn append_or_transfer(
        &self,
        valid: usize,
        address: u16,
        value: u16,
    ) -> Result<SuccessCode, ErrorCode> {
        match self.find_free_slot(valid)? {
            Some(slot) => self.write_record(slot, address, value)?,
            None => self.page_transfer(valid, address, value)?,
        }
        Ok(SuccessCode::Written)
    }

    /// Compact the live records onto the spare page, carrying the write
    /// that triggered the transfer, then retire the full page.
    fn page_transfer(&self, old_base: usize, address: u16, value: u16) -> Result<(), ErrorCode> {
        let new_base = if old_base == self.config.page_base_0 {
            self.config.page_base_1
        } else {
            self.config.page_base_0
        };

        // The spare page is normally blank already. It is not after an
        // earlier transfer attempt failed partway through; reclaim it.
        self.check_erase_page(new_base)?;
        self.controller.program_halfword(new_base, PAGE_RECEIVE)?;

        // The in-flight record goes down first so it survives even if the
        // compaction below is cut short.
        self.write_record(new_base + HEADER_SIZE, address, value)?;

        // Walk the old log newest first; the first occurrence of an address
        // is its current value, older ones are superseded and anything
        // already carried over is skipped.
        let mut copy_to = new_base + HEADER_SIZE + RECORD_SIZE;
        let new_end = new_base + self.config.page_size;
        let first = old_base + HEADER_SIZE;
        let mut slot = old_base + self.config.page_size;
        while slot > first {
            slot -= RECORD_SIZE;
            let record_address = self.controller.read_halfword(slot)?;
            if record_address == ERASED_HALFWORD || record_address == address {
                continue;
            }
            if self.find_record(new_base, record_address)?.is_some() {
                continue;
            }
            if copy_to >= new_end {
                // Every slot of the target is taken and live records
                // remain: more distinct addresses than a page can hold.
                // The old page stays in charge.
                return Err(ErrorCode::FlashFull);
            }
            let record_value = self.controller.read_halfword(slot + 2)?;
            self.write_record(copy_to, record_address, record_value)?;
            copy_to += RECORD_SIZE;
        }

        // Point of no return: retire the source, then activate the copy.
        self.controller.erase_page(old_base)?;
        self.controller.program_halfword(new_base, PAGE_VALID)?;
        self.valid_page.set(Some(new_base));
        Ok(())
    }

    /// Program one record into `slot`.
    fn write_record(&self, slot: usize, address: u16, value: u16) -> Result<(), ErrorCode> {
        // The address half-word commits the record, so it must land last. A
        // power cut between the two programs leaves a dead slot that scans
        // ignore and never reuse.
        self.controller.program_halfword(slot + 2, value)?;
        self.controller.program_halfword(slot, address)?;
        Ok(())
    }

    /// Newest-first scan for the latest value recorded for `address`.
    fn find_record(&self, page_base: usize, address: u16) -> Result<Option<u16>, ErrorCode> {
        let first = page_base + HEADER_SIZE;
        let mut slot = page_base + self.config.page_size;
        while slot > first {
            slot -= RECORD_SIZE;
            if self.controller.read_halfword(slot)? == address {
                let value = self.controller.read_halfword(slot + 2)?;
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Oldest-first scan for the next slot an append can use: both
    /// half-words erased. A slot with a programmed value but no committed
    /// address is a torn write; it is dead, not free.
    fn find_free_slot(&self, page_base: usize) -> Result<Option<usize>, ErrorCode> {
        let end = page_base + self.config.page_size;
        let mut slot = page_base + HEADER_SIZE;
        while slot < end {
            let record_address = self.controller.read_halfword(slot)?;
            let record_value = self.controller.read_halfword(slot + 2)?;
            if record_address == ERASED_HALFWORD && record_value == ERASED_HALFWORD {
                return Ok(Some(slot));
            }
            slot += RECORD_SIZE;
        }
        Ok(None)
    }

    /// Whether a newer slot in the page records the same address.
    fn superseded(&self, page_base: usize, slot: usize, address: u16) -> Result<bool, ErrorCode> {
        let end = page_base + self.config.page_size;
        let mut newer = slot + RECORD_SIZE;
        while newer < end {
            if self.controller.read_halfword(newer)? == address {
                return Ok(true);
            }
            newer += RECORD_SIZE;
        }
        Ok(false)
    }

    /// Erase `page_base` unless it already reads fully erased. Returns
    /// whether an erase was performed.
    fn check_erase_page(&self, page_base: usize) -> Result<bool, ErrorCode> {
        if self.page_blank(page_base)? {
            return Ok(false);
        }
        self.controller.erase_page(page_base)?;
        Ok(true)
    }

    /// Whether every half-word of the page reads erased. The whole page is
    /// checked, not just the status header: a page whose header was lost to
    /// a power cut can still carry stale record data.
    fn page_blank(&self, page_base: usize) -> Result<bool, ErrorCode> {
        let mut offset = 0;
        while offset < self.config.page_size {
            if self.controller.read_halfword(page_base + offset)? != ERASED_HALFWORD {
                return Ok(false);
            }
            offset += 2;
        }
        Ok(true)
    }
}
