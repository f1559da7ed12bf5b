// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! Implementation of a ring buffer.
//!
//! Two insert primitives with different overflow behavior are provided.
//! [`Queue::enqueue`] rejects the new element when the buffer is full and
//! returns `false`, so unread data is never silently lost; this is the
//! default for receive paths. [`Queue::push`] instead overwrites the oldest
//! element and hands it back, for callers that want the freshest data.

use alloc::boxed::Box;
use alloc::vec;

use crate::queue;

/// A fixed-capacity circular FIFO queue with owned, heap-allocated storage.
///
/// `head` marks the oldest live element and `count` how many are live, so
/// every allocated slot can hold data when the buffer is full.
pub struct RingBuffer<T> {
    ring: Box<[T]>,
    head: usize,
    count: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create an empty buffer that can hold `capacity` elements.
    ///
    /// A requested capacity of zero is bumped to one so the wrap-around
    /// arithmetic always has a nonzero divisor.
    pub fn new(capacity: usize) -> RingBuffer<T> {
        RingBuffer {
            ring: vec![T::default(); capacity.max(1)].into_boxed_slice(),
            head: 0,
            count: 0,
        }
    }

    /// Reset the buffer to empty, reallocating the storage if `capacity`
    /// differs from the current allocation.
    ///
    /// Contents are never preserved, even when the capacity is unchanged.
    pub fn initialize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        if capacity != self.ring.len() {
            self.ring = vec![T::default(); capacity].into_boxed_slice();
        }
        self.head = 0;
        self.count = 0;
    }

    /// Returns the number of elements the allocation can hold.
    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    /// Returns the number of elements that can be enqueued until the ring
    /// buffer is full.
    pub fn available_len(&self) -> usize {
        self.ring.len() - self.count
    }

    /// Returns up to 2 slices that together form the contents of the ring
    /// buffer.
    ///
    /// Returns:
    /// - `(None, None)` if the buffer is empty.
    /// - `(Some(slice), None)` if the contents are contiguous.
    /// - `(Some(left), Some(right))` if the contents wrap around the end of
    ///   the storage. In that case the logical contents of the buffer is
    ///   `[left, right].concat()` (although physically the "left" slice is
    ///   stored after the "right" slice).
    pub fn as_slices(&self) -> (Option<&[T]>, Option<&[T]>) {
        if self.count == 0 {
            return (None, None);
        }
        let tail = (self.head + self.count) % self.ring.len();
        if self.head < tail {
            (Some(&self.ring[self.head..tail]), None)
        } else {
            let (left, right) = self.ring.split_at(self.head);
            (
                Some(right),
                if tail == 0 { None } else { Some(&left[..tail]) },
            )
        }
    }
}

impl<T: Copy + Default> queue::Queue<T> for RingBuffer<T> {
    fn has_elements(&self) -> bool {
        self.count != 0
    }

    fn is_full(&self) -> bool {
        self.count == self.ring.len()
    }

    fn len(&self) -> usize {
        self.count
    }

    fn enqueue(&mut self, val: T) -> bool {
        if self.count == self.ring.len() {
            // Full, the new element is dropped rather than clobbering
            // unread data.
            false
        } else {
            let tail = (self.head + self.count) % self.ring.len();
            self.ring[tail] = val;
            self.count += 1;
            true
        }
    }

    fn push(&mut self, val: T) -> Option<T> {
        let displaced = if self.count == self.ring.len() {
            let val = self.ring[self.head];
            self.head = (self.head + 1) % self.ring.len();
            self.count -= 1;
            Some(val)
        } else {
            None
        };

        let tail = (self.head + self.count) % self.ring.len();
        self.ring[tail] = val;
        self.count += 1;
        displaced
    }

    fn dequeue(&mut self) -> Option<T> {
        if self.has_elements() {
            let val = self.ring[self.head];
            self.head = (self.head + 1) % self.ring.len();
            self.count -= 1;
            Some(val)
        } else {
            None
        }
    }

    fn empty(&mut self) {
        self.head = 0;
        self.count = 0;
    }
}
