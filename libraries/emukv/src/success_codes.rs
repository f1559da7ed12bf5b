// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! The standard success codes used by EmuKV.

/// Standard success codes.
///
/// These are the valid success codes returned from the public API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuccessCode {
    /// Operation completed without modifying flash
    Complete,
    /// The write operation completed successfully
    Written,
    /// The stored value already matched, nothing was written
    SameValue,
}
