// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! Blocking driver for the flash program and erase controller (FPEC).
//!
//! The FPEC programs main flash one 16-bit half-word at a time and erases
//! one page at a time, which is exactly the interface the EEPROM emulation
//! layer wants. Wiring the two together on a medium-density part, using the
//! last two pages of a 64 KiB device:
//!
//! ```rust,ignore
//! use emukv::{EmuKv, PageConfig};
//! use stm32f1xx::flash::{Flash, PAGE_SIZE_MEDIUM_DENSITY};
//!
//! let config = PageConfig::new(
//!     0x0800_F800,
//!     0x0800_FC00,
//!     PAGE_SIZE_MEDIUM_DENSITY,
//!     0x00FF,
//! );
//! let eeprom = EmuKv::new(Flash::new(), config);
//! eeprom.init()?;
//! eeprom.write(0x0001, 0xABCD)?;
//! ```
//!
//! Programs and erases busy-wait on the FPEC and stall any fetch from
//! flash while they run, so keep them out of interrupt handlers and
//! time-critical paths. A page erase takes tens of milliseconds.

use emukv::error_codes::ErrorCode;
use emukv::flash_controller::FlashController;
use tock_registers::interfaces::{Readable, ReadWriteable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

use crate::static_ref::StaticRef;

register_structs! {
    /// flash program and erase controller
    FlashRegisters {
        /// Flash access control register
        (0x000 => acr: ReadWrite<u32, AccessControl::Register>),
        /// FPEC key register
        (0x004 => keyr: WriteOnly<u32, Key::Register>),
        /// Flash OPTKEY register
        (0x008 => optkeyr: WriteOnly<u32, Key::Register>),
        /// Flash status register
        (0x00C => sr: ReadWrite<u32, Status::Register>),
        /// Flash control register
        (0x010 => cr: ReadWrite<u32, Control::Register>),
        /// Flash address register
        (0x014 => ar: WriteOnly<u32, Address::Register>),
        (0x018 => _reserved0),
        /// Option byte register
        (0x01C => obr: ReadOnly<u32, OptionByte::Register>),
        /// Write protection register
        (0x020 => wrpr: ReadOnly<u32, WriteProtect::Register>),
        (0x024 => @END),
    }
}

register_bitfields![u32,
    AccessControl [
        /// Prefetch buffer status
        PRFTBS OFFSET(5) NUMBITS(1) [],
        /// Prefetch buffer enable
        PRFTBE OFFSET(4) NUMBITS(1) [],
        /// Flash half cycle access enable
        HLFCYA OFFSET(3) NUMBITS(1) [],
        /// Latency
        LATENCY OFFSET(0) NUMBITS(3) []
    ],
    Key [
        /// FPEC key
        KEYR OFFSET(0) NUMBITS(32) []
    ],
    Status [
        /// End of operation
        EOP OFFSET(5) NUMBITS(1) [],
        /// Write protection error
        WRPRTERR OFFSET(4) NUMBITS(1) [],
        /// Programming error
        PGERR OFFSET(2) NUMBITS(1) [],
        /// Busy
        BSY OFFSET(0) NUMBITS(1) []
    ],
    Control [
        /// End of operation interrupt enable
        EOPIE OFFSET(12) NUMBITS(1) [],
        /// Error interrupt enable
        ERRIE OFFSET(10) NUMBITS(1) [],
        /// Option bytes write enable
        OPTWRE OFFSET(9) NUMBITS(1) [],
        /// Lock
        LOCK OFFSET(7) NUMBITS(1) [],
        /// Start
        STRT OFFSET(6) NUMBITS(1) [],
        /// Option byte erase
        OPTER OFFSET(5) NUMBITS(1) [],
        /// Option byte programming
        OPTPG OFFSET(4) NUMBITS(1) [],
        /// Mass erase
        MER OFFSET(2) NUMBITS(1) [],
        /// Page erase
        PER OFFSET(1) NUMBITS(1) [],
        /// Programming
        PG OFFSET(0) NUMBITS(1) []
    ],
    Address [
        /// Flash address
        FAR OFFSET(0) NUMBITS(32) []
    ],
    OptionByte [
        /// Data byte 1
        DATA1 OFFSET(18) NUMBITS(8) [],
        /// Data byte 0
        DATA0 OFFSET(10) NUMBITS(8) [],
        /// nRST_STDBY
        NRST_STDBY OFFSET(4) NUMBITS(1) [],
        /// nRST_STOP
        NRST_STOP OFFSET(3) NUMBITS(1) [],
        /// WDG_SW
        WDG_SW OFFSET(2) NUMBITS(1) [],
        /// Read protection
        RDPRT OFFSET(1) NUMBITS(1) [],
        /// Option byte error
        OPTERR OFFSET(0) NUMBITS(1) []
    ],
    WriteProtect [
        /// Write protect
        WRP OFFSET(0) NUMBITS(32) []
    ]
];

const FLASH_BASE: StaticRef<FlashRegisters> =
    unsafe { StaticRef::new(0x4002_2000 as *const FlashRegisters) };

const KEY1: u32 = 0x4567_0123;
const KEY2: u32 = 0xCDEF_89AB;

/// Page size on low- and medium-density parts (up to 128 KiB of flash).
pub const PAGE_SIZE_MEDIUM_DENSITY: usize = 1024;
/// Page size on high-density, XL-density and connectivity line parts.
pub const PAGE_SIZE_HIGH_DENSITY: usize = 2048;

/// The flash program and erase controller.
pub struct Flash {
    registers: StaticRef<FlashRegisters>,
}

impl Flash {
    pub const fn new() -> Flash {
        Flash {
            registers: FLASH_BASE,
        }
    }

    /// Whether the FPEC currently rejects program and erase requests.
    /// It comes out of reset locked.
    pub fn is_locked(&self) -> bool {
        self.registers.cr.is_set(Control::LOCK)
    }

    /// Open the FPEC with the magic key sequence. CR writes are ignored
    /// while the lock is set.
    pub fn unlock(&self) {
        self.registers.keyr.write(Key::KEYR.val(KEY1));
        self.registers.keyr.write(Key::KEYR.val(KEY2));
    }

    /// Relock the FPEC. Only a reset or the key sequence reopens it.
    pub fn lock(&self) {
        self.registers.cr.modify(Control::LOCK::SET);
    }

    fn wait_while_busy(&self) {
        while self.registers.sr.is_set(Status::BSY) {}
    }

    /// Collect the flags the finished operation left in SR and clear them
    /// for the next one. EOP only sets on success, so a bare flag-less
    /// completion is reported as a failure too.
    fn end_of_operation(&self, failure: ErrorCode) -> Result<(), ErrorCode> {
        let sr = self.registers.sr.extract();
        // EOP, WRPRTERR and PGERR are write-one-to-clear.
        self.registers
            .sr
            .write(Status::EOP::SET + Status::WRPRTERR::SET + Status::PGERR::SET);

        if sr.is_set(Status::WRPRTERR) || sr.is_set(Status::PGERR) {
            return Err(failure);
        }
        if sr.is_set(Status::EOP) {
            Ok(())
        } else {
            Err(failure)
        }
    }
}

impl FlashController for Flash {
    fn read_halfword(&self, address: usize) -> Result<u16, ErrorCode> {
        // Main flash is memory mapped; reads do not involve the FPEC.
        let value = unsafe { core::ptr::read_volatile(address as *const u16) };
        Ok(value)
    }

    fn program_halfword(&self, address: usize, value: u16) -> Result<(), ErrorCode> {
        if self.is_locked() {
            self.unlock();
        }
        self.wait_while_busy();

        self.registers.cr.modify(Control::PG::SET);
        // With PG set, a half-word store to any main flash address starts
        // the programming sequence.
        unsafe {
            core::ptr::write_volatile(address as *mut u16, value);
        }
        self.wait_while_busy();

        let result = self.end_of_operation(ErrorCode::WriteFail);
        self.registers.cr.modify(Control::PG::CLEAR);
        result
    }

    fn erase_page(&self, page_base: usize) -> Result<(), ErrorCode> {
        if self.is_locked() {
            self.unlock();
        }
        self.wait_while_busy();

        self.registers.cr.modify(Control::PER::SET);
        self.registers.ar.write(Address::FAR.val(page_base as u32));
        self.registers.cr.modify(Control::STRT::SET);
        // BSY is set one cycle after STRT.
        self.wait_while_busy();

        let result = self.end_of_operation(ErrorCode::EraseFail);
        self.registers.cr.modify(Control::PER::CLEAR);
        result
    }
}
