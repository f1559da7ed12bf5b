// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! # EmuKV
//!
//! EmuKV (EEPROM-emulation Key Value store) keeps a small set of 16-bit
//! address -> 16-bit value pairs on two raw pages of on-chip flash, giving
//! firmware the freely rewritable words an external EEPROM part would
//! provide. Values survive reset and power loss.
//!
//! ## Goals of EmuKV
//!
//! EmuKV is designed with these main goals (in order)
//!
//! * Fully implemented in no_std Rust
//! * Power loss resilient
//! * Wear leveling across the page pair
//! * No unsafe code
//! * No external crates in use (not including unit tests)
//!
//! EmuKV also makes some assumptions about the flash underneath it
//!
//! * The media is synchronous: programs and erases block until done
//! * Programming can only clear bits (erase sets a page back to all 1s)
//! * Programming granularity is the 16-bit half-word
//!
//! ## How EmuKV works
//!
//! Flash cannot rewrite a word in place, so every store to an address
//! appends a new record instead. One page is the active log and carries the
//! `VALID` status; its sibling is kept erased. Each page starts with a
//! status half-word and the rest is record slots:
//!
//! | Offset | Contents                          |
//! |--------|-----------------------------------|
//! | 0      | page status half-word             |
//! | 2      | reserved, kept erased             |
//! | 4      | record 0: address half-word       |
//! | 6      | record 0: value half-word         |
//! | 8      | record 1: address half-word       |
//! | ...    | records appended in write order   |
//!
//! A read scans the log newest first, so the latest record for an address
//! wins. When the log fills up, the live value of every address is copied
//! onto the sibling page (marked `RECEIVE` while filling), the full page is
//! erased and the copy becomes `VALID`. Page statuses only ever transition
//! by clearing bits (`0xFFFF` erased, `0xEEEE` receiving, `0x0000` valid),
//! so no status change needs an erase.
//!
//! Within a record the value half-word is programmed before the address
//! half-word. The address commits the record: a slot whose address reads
//! erased is invisible, whatever its value half-word holds. Together with
//! the status ordering above this means a power cut at any instant leaves
//! the pair in a state `init()` can repair without losing committed data.
//!
//! ## Using EmuKV
//!
//! Implement [`FlashController`] for the flash driver, then hand it to
//! [`EmuKv`] together with the location of the two pages:
//!
//! ```rust
//! use std::cell::RefCell;
//!
//! use emukv::error_codes::ErrorCode;
//! use emukv::flash_controller::FlashController;
//! use emukv::{EmuKv, PageConfig};
//!
//! // A toy controller over an in-memory array, 2 pages of 64 bytes.
//! struct ArrayFlash {
//!     mem: RefCell<[u8; 128]>,
//! }
//!
//! impl FlashController for ArrayFlash {
//!     fn read_halfword(&self, address: usize) -> Result<u16, ErrorCode> {
//!         let mem = self.mem.borrow();
//!         Ok(u16::from_le_bytes([mem[address], mem[address + 1]]))
//!     }
//!
//!     fn program_halfword(&self, address: usize, value: u16) -> Result<(), ErrorCode> {
//!         let mut mem = self.mem.borrow_mut();
//!         let bytes = value.to_le_bytes();
//!         mem[address] &= bytes[0];
//!         mem[address + 1] &= bytes[1];
//!         Ok(())
//!     }
//!
//!     fn erase_page(&self, page_base: usize) -> Result<(), ErrorCode> {
//!         let mut mem = self.mem.borrow_mut();
//!         for byte in mem[page_base..page_base + 64].iter_mut() {
//!             *byte = 0xFF;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let flash = ArrayFlash { mem: RefCell::new([0xFF; 128]) };
//! let store = EmuKv::new(flash, PageConfig::new(0, 64, 64, 0x00FF));
//!
//! store.init().unwrap();
//! store.write(0x0001, 0xABCD).unwrap();
//! assert_eq!(store.read(0x0001), Ok(0xABCD));
//! ```

#![no_std]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod emukv;
pub mod error_codes;
pub mod flash_controller;
pub mod success_codes;

#[doc(inline)]
pub use crate::emukv::{EmuKv, PageConfig, DEFAULT_DATA};
#[doc(inline)]
pub use crate::error_codes::ErrorCode;
#[doc(inline)]
pub use crate::flash_controller::FlashController;
#[doc(inline)]
pub use crate::success_codes::SuccessCode;

#[cfg(test)]
#[macro_use]
extern crate std;
