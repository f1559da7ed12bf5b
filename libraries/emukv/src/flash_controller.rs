// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! The interface between the store and the flash hardware underneath it.

use crate::error_codes::ErrorCode;

/// The `FlashController` is implemented by the flash driver the store runs
/// on top of, either real silicon or an in-memory array for tests.
///
/// All addresses are absolute byte addresses and 2-byte aligned. The store
/// only programs half-words inside the two pages it was configured with and
/// only erases those two pages.
///
/// A skeleton implementation looks like this:
///
/// ```rust
/// use emukv::error_codes::ErrorCode;
/// use emukv::flash_controller::FlashController;
///
/// struct FlashCtrl {}
///
/// impl FlashController for FlashCtrl {
///     fn read_halfword(&self, address: usize) -> Result<u16, ErrorCode> {
///         // TODO: read the half-word at `address`
///         unimplemented!()
///     }
///
///     fn program_halfword(&self, address: usize, value: u16) -> Result<(), ErrorCode> {
///         // TODO: program `value` at `address`
///         unimplemented!()
///     }
///
///     fn erase_page(&self, page_base: usize) -> Result<(), ErrorCode> {
///         // TODO: erase the page starting at `page_base`
///         unimplemented!()
///     }
/// }
/// ```
pub trait FlashController {
    /// Read the half-word at `address`.
    ///
    /// On chips with memory-mapped flash this is a volatile load.
    fn read_halfword(&self, address: usize) -> Result<u16, ErrorCode>;

    /// Program the half-word at `address` to `value`.
    ///
    /// Flash programming can only clear bits. The store relies on that:
    /// page status words are rewritten in place without an erase, and
    /// programming `0xFFFF` leaves the cell untouched.
    fn program_halfword(&self, address: usize, value: u16) -> Result<(), ErrorCode>;

    /// Erase the page starting at `page_base`, returning every bit in it
    /// to 1.
    fn erase_page(&self, page_base: usize) -> Result<(), ErrorCode>;
}
