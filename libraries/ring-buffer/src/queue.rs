// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Pillar Contributors 2026.

//! Interface for queue structures.

/// Operations shared by fixed-capacity FIFO queues.
pub trait Queue<T> {
    /// Returns true if there are any items in the queue, false otherwise.
    fn has_elements(&self) -> bool;

    /// Returns true if the queue is full, false otherwise.
    fn is_full(&self) -> bool;

    /// Returns how many elements are in the queue.
    fn len(&self) -> usize;

    /// If the queue isn't full, add a new element to the back of the queue.
    /// Returns whether the element was added.
    fn enqueue(&mut self, val: T) -> bool;

    /// Add a new element to the back of the queue, popping out an element
    /// from the front if the queue is full.
    fn push(&mut self, val: T) -> Option<T>;

    /// Remove the element from the front of the queue.
    fn dequeue(&mut self) -> Option<T>;

    /// Empty the queue completely.
    fn empty(&mut self);
}
