// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element shared state, kept in an arena beside the element tree.
//!
//! Sessions never stash fields on host elements. Instead, state that several
//! sessions must agree on (pressed/moved/available flags, propagation blocking,
//! the cached bounding box) lives in an [`ElementMeta`] record, allocated on
//! first use and freed explicitly when an element is detached.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Rect;
use smallvec::SmallVec;

/// Handle to an [`ElementMeta`] slot.
///
/// A small generational handle: a freed slot is reused with a bumped
/// generation, so stale keys never alias a different element's record.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MetaKey(u32, u32);

impl MetaKey {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// How an element is attached to the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The element drags itself.
    Element,
    /// The element delegates drags to matching descendants.
    Delegator,
}

/// Shared state for one element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementMeta<E> {
    /// A contact is down on this element.
    pub pressed: bool,
    /// No session currently owns the element; cleared from press until the
    /// release settles.
    pub drag_available: bool,
    /// The element has actually been displaced in the current drag.
    pub moved: bool,
    /// A pointer id currently drives this element.
    pub has_pointer: bool,
    /// Descendants whose drags currently block this element.
    pub drag_preventers: SmallVec<[E; 2]>,
    /// Ancestors this element blocks while it is pressed.
    pub drag_preventeds: SmallVec<[E; 4]>,
    /// Cached page-relative bounding box.
    pub offset: Option<Rect>,
    /// Set when the element itself is attached to the engine.
    pub role: Option<Role>,
}

impl<E> Default for ElementMeta<E> {
    fn default() -> Self {
        Self {
            pressed: false,
            drag_available: true,
            moved: false,
            has_pointer: false,
            drag_preventers: SmallVec::new(),
            drag_preventeds: SmallVec::new(),
            offset: None,
            role: None,
        }
    }
}

impl<E> ElementMeta<E> {
    /// Returns `true` if the record carries nothing worth keeping.
    pub fn is_idle(&self) -> bool {
        !self.pressed
            && self.drag_available
            && !self.moved
            && !self.has_pointer
            && self.drag_preventers.is_empty()
            && self.drag_preventeds.is_empty()
            && self.role.is_none()
    }
}

#[derive(Clone, Debug)]
struct Slot<E> {
    generation: u32,
    element: Option<E>,
    meta: ElementMeta<E>,
}

/// Arena of [`ElementMeta`] records keyed by element identity.
#[derive(Clone, Debug)]
pub struct ElementStore<E> {
    slots: Vec<Slot<E>>,
    free: Vec<u32>,
    index: HashMap<E, MetaKey>,
}

impl<E> Default for ElementStore<E> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<E: Copy + Eq + Hash> ElementStore<E> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no records are live.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Key of the record for `el`, if one exists.
    pub fn key(&self, el: E) -> Option<MetaKey> {
        self.index.get(&el).copied()
    }

    /// Returns `true` while `key` refers to a live record.
    pub fn is_alive(&self, key: MetaKey) -> bool {
        self.slots
            .get(key.idx())
            .is_some_and(|s| s.generation == key.1 && s.element.is_some())
    }

    /// Record for `el`, if one exists.
    pub fn get(&self, el: E) -> Option<&ElementMeta<E>> {
        let key = self.key(el)?;
        self.slots.get(key.idx()).map(|s| &s.meta)
    }

    /// Mutable record for `el`, if one exists.
    pub fn get_mut(&mut self, el: E) -> Option<&mut ElementMeta<E>> {
        let key = self.key(el)?;
        self.slots.get_mut(key.idx()).map(|s| &mut s.meta)
    }

    /// Record for `el`, allocating a default one on first use.
    pub fn entry(&mut self, el: E) -> &mut ElementMeta<E> {
        let key = match self.index.get(&el) {
            Some(key) => *key,
            None => self.alloc(el),
        };
        &mut self.slots[key.idx()].meta
    }

    fn alloc(&mut self, el: E) -> MetaKey {
        let key = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.element = Some(el);
            slot.meta = ElementMeta::default();
            MetaKey(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 1,
                element: Some(el),
                meta: ElementMeta::default(),
            });
            MetaKey(idx, 1)
        };
        self.index.insert(el, key);
        key
    }

    /// Free the record for `el`, returning it.
    pub fn free(&mut self, el: E) -> Option<ElementMeta<E>> {
        let key = self.index.remove(&el)?;
        let slot = &mut self.slots[key.idx()];
        slot.element = None;
        self.free.push(key.0);
        Some(core::mem::take(&mut slot.meta))
    }

    /// Free the record for `el` if it no longer carries any state.
    pub fn free_if_idle(&mut self, el: E) -> bool {
        if self.get(el).is_some_and(ElementMeta::is_idle) {
            self.free(el);
            true
        } else {
            false
        }
    }

    /// Returns `true` if `el` has a record and is pressed.
    pub fn is_pressed(&self, el: E) -> bool {
        self.get(el).is_some_and(|m| m.pressed)
    }
}
