// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element slots behind [`ElementHandle`]s.

use alloc::vec::Vec;

use crate::ElementHandle;

/// Known elements, indexed by handle.
///
/// A released slot stays empty and its handle is never handed out again, so
/// a stale handle resolves to nothing instead of to some other element.
#[derive(Debug)]
pub(crate) struct HandleTable<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: PartialEq + Clone> HandleTable<T> {
    /// The handle `tag` if it still names `el`.
    ///
    /// `tag` is whatever handle the element claims to carry; it is only
    /// trusted when the slot holds that same element.
    pub(crate) fn lookup(&self, tag: Option<ElementHandle>, el: &T) -> Option<ElementHandle> {
        let handle = tag?;
        (self.get(handle) == Some(el)).then_some(handle)
    }

    /// Handle of `el`, taking a fresh slot unless `tag` still names it.
    ///
    /// The flag is `true` when the handle is new and the element must be
    /// tagged with it.
    pub(crate) fn assign(&mut self, tag: Option<ElementHandle>, el: &T) -> (ElementHandle, bool) {
        if let Some(handle) = self.lookup(tag, el) {
            return (handle, false);
        }
        let handle = ElementHandle(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        self.slots.push(Some(el.clone()));
        (handle, true)
    }

    pub(crate) fn get(&self, handle: ElementHandle) -> Option<&T> {
        self.slots.get(handle.index())?.as_ref()
    }

    /// Empty the slot behind `handle`, returning its element.
    pub(crate) fn release(&mut self, handle: ElementHandle) -> Option<T> {
        self.slots.get_mut(handle.index())?.take()
    }

    /// Number of occupied slots.
    pub(crate) fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_reuses_a_matching_tag() {
        let mut table = HandleTable::default();
        let (a, fresh) = table.assign(None, &"a");
        assert!(fresh);
        assert_eq!(table.assign(Some(a), &"a"), (a, false));
        assert_eq!(table.live(), 1);
    }

    #[test]
    fn copied_tag_does_not_alias_another_element() {
        let mut table = HandleTable::default();
        let (a, _) = table.assign(None, &"a");
        // An element cloned with its attribute carries `a`'s tag.
        assert_eq!(table.lookup(Some(a), &"b"), None);
        let (b, fresh) = table.assign(Some(a), &"b");
        assert!(fresh);
        assert_ne!(a, b);
    }

    #[test]
    fn lookup_never_grows_the_table() {
        let table = HandleTable::<&str>::default();
        assert_eq!(table.lookup(None, &"stray"), None);
        assert_eq!(table.lookup(Some(ElementHandle(7)), &"stray"), None);
        assert_eq!(table.live(), 0);
    }

    #[test]
    fn released_handles_stay_dead() {
        let mut table = HandleTable::default();
        let (a, _) = table.assign(None, &"a");
        assert_eq!(table.release(a), Some("a"));
        assert_eq!(table.get(a), None);
        assert_eq!(table.lookup(Some(a), &"a"), None);
        assert_eq!(table.release(a), None);

        let (again, fresh) = table.assign(Some(a), &"a");
        assert!(fresh);
        assert_ne!(again, a);
        assert_eq!(table.live(), 1);
    }
}
