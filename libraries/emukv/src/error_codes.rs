// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! The standard error codes used by EmuKV.

/// Standard error codes.
///
/// These are the valid errors returned from the public API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// The store has not been initialised, or `init()` failed
    NotInitialised,
    /// The address is above the configured maximum
    BadAddress,
    /// The page configuration is unusable
    InvalidConfig,
    /// Unable to read from flash
    ReadFail,
    /// Unable to write to flash
    WriteFail,
    /// Unable to erase flash
    EraseFail,
    /// Neither page holds a usable data set
    NoValidPage,
    /// The store holds more live addresses than one page can fit
    FlashFull,
}
