// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A free-list object pool with a typed reset contract.
//!
//! Objects implement [`Recycle`]: [`Recycle::reinit`] runs on every
//! [`Pool::pop`], [`Recycle::teardown`] on every [`Pool::push`]. Pooled objects
//! are therefore always in their torn-down state while stored.
//!
//! ```
//! use understory_drag::pool::{Pool, Recycle};
//!
//! #[derive(Default)]
//! struct Scratch { owner: u32, items: Vec<u32> }
//!
//! impl Recycle for Scratch {
//!     type Init = u32;
//!     fn reinit(&mut self, owner: u32) { self.owner = owner; }
//!     fn teardown(&mut self) { self.owner = 0; self.items.clear(); }
//! }
//!
//! let mut pool = Pool::<Scratch>::new(2, 0);
//! let mut s = pool.pop(7);
//! assert_eq!(s.owner, 7);
//! s.items.push(1);
//! pool.push(s);
//! assert_eq!(pool.available(), 2);
//! ```

use alloc::vec::Vec;

/// Reset contract for pooled objects.
pub trait Recycle: Default {
    /// Data needed to prepare an object for use.
    type Init;

    /// Prepare a fresh or recycled object for use.
    fn reinit(&mut self, init: Self::Init);

    /// Return the object to its idle state before it is stored.
    fn teardown(&mut self);
}

/// A stack of ready-to-use objects.
#[derive(Debug)]
pub struct Pool<T> {
    stack: Vec<T>,
    size: usize,
    max_size: usize,
}

impl<T: Recycle> Pool<T> {
    /// Create a pool pre-filled with `size` objects.
    ///
    /// A `max_size` of zero means unbounded; a `max_size` smaller than `size`
    /// is also treated as unbounded.
    pub fn new(size: usize, max_size: usize) -> Self {
        let max_size = if size > max_size { 0 } else { max_size };
        let mut stack = Vec::with_capacity(size);
        stack.resize_with(size, T::default);
        Self {
            stack,
            size,
            max_size,
        }
    }

    /// Take an object, creating one if the pool is empty, and prepare it.
    pub fn pop(&mut self, init: T::Init) -> T {
        let mut obj = self.stack.pop().unwrap_or_default();
        obj.reinit(init);
        obj
    }

    /// Tear an object down and store it, unless the pool is full.
    pub fn push(&mut self, mut obj: T) {
        obj.teardown();
        if self.max_size == 0 || self.stack.len() < self.max_size {
            self.stack.push(obj);
            self.size = self.size.max(self.stack.len());
        }
    }

    /// Grow the pool by `add` objects, or by 25% of its size when `add` is zero.
    pub fn increase(&mut self, add: usize) {
        let add = if add > 0 { add } else { self.size / 4 };
        let in_use = self.size.saturating_sub(self.stack.len());
        self.size += add;
        let target = self.size - in_use;
        if self.max_size != 0 && target > self.max_size {
            self.max_size = target;
        }
        self.stack.resize_with(target.max(self.stack.len()), T::default);
    }

    /// Objects ready to pop.
    pub fn available(&self) -> usize {
        self.stack.len()
    }

    /// Nominal size: stored plus handed-out objects.
    pub fn size(&self) -> usize {
        self.size
    }
}
