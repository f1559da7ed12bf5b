// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! A fixed-capacity circular FIFO queue with owned storage.
//!
//! This crate backs the byte queues between interrupt handlers and main-line
//! code: a serial receive interrupt enqueues on one side while the
//! application dequeues on the other. The buffer itself does no locking; it
//! is safe for exactly one producer and one consumer, and the caller is
//! responsible for keeping the two from running concurrently (on a
//! single-core microcontroller, by masking the producing interrupt around
//! the consuming access).
//!
//! Storage is heap allocated so a queue can be sized at run time and resized
//! by re-initializing it, which peripherals use to grow their buffers before
//! enabling high-bandwidth transfers.

#![no_std]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

extern crate alloc;

pub mod queue;
pub mod ring_buffer;

#[doc(inline)]
pub use crate::queue::Queue;
#[doc(inline)]
pub use crate::ring_buffer::RingBuffer;
