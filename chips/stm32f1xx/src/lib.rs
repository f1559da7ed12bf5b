// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! Peripheral implementations for the STM32F1xx MCU family.

#![no_std]

pub mod flash;
pub mod static_ref;

pub use crate::static_ref::StaticRef;
