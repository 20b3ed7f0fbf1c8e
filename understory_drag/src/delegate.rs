// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag target resolution and propagation blocking.
//!
//! Nested draggables must not start conflicting drags. When a candidate is
//! granted, it walks up to its delegator (or the root) and registers itself as
//! a *preventer* on every draggable ancestor, recording each one as
//! *prevented* on itself. An ancestor with preventers cannot start; a
//! candidate under a pressed ancestor is refused. [`free_propagation`] undoes
//! the registration when the candidate's drag ends.

use core::hash::Hash;

use crate::host::{Host, closest_inside};
use crate::store::{ElementStore, Role};
use crate::types::StartRejection;

/// Start-time facts about one attachment.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Grant<'a, E> {
    /// The attached element.
    pub(crate) attached: E,
    /// Delegate selector, if the attachment delegates.
    pub(crate) delegate: Option<&'a str>,
    /// Grip selector.
    pub(crate) holder: Option<&'a str>,
    /// Default unholdable selector, when applied.
    pub(crate) default_unholdables: Option<&'a str>,
    /// User unholdable selector.
    pub(crate) unholdables: Option<&'a str>,
    /// Skip propagation blocking.
    pub(crate) skip_blocking: bool,
}

/// Resolve the element a start on `target` would drag, and register it for
/// propagation blocking.
pub(crate) fn grant<H: Host>(
    host: &H,
    store: &mut ElementStore<H::Element>,
    g: &Grant<'_, H::Element>,
    target: H::Element,
) -> Result<H::Element, StartRejection> {
    let candidate = match g.delegate {
        Some(selector) => {
            closest_inside(host, target, g.attached, selector).ok_or(StartRejection::NoTarget)?
        }
        None => g.attached,
    };

    if let Some(meta) = store.get(candidate) {
        if meta.pressed || !meta.drag_available {
            return Err(StartRejection::Unavailable);
        }
        if !meta.drag_preventers.is_empty() {
            return Err(StartRejection::PreventedByDescendant);
        }
    }

    if !is_holdable(host, candidate, target, g) {
        return Err(StartRejection::Unholdable);
    }

    if !g.skip_blocking {
        let top = g.delegate.map(|_| g.attached);
        block_propagation(host, store, candidate, top, g.delegate)?;
    }
    Ok(candidate)
}

/// A start on `target` inside `el` is holdable if no unholdable element lies
/// between them, and, with a holder, if some element from `target` up to
/// `el` matches the holder.
fn is_holdable<H: Host>(
    host: &H,
    el: H::Element,
    target: H::Element,
    g: &Grant<'_, H::Element>,
) -> bool {
    let unholdable = |n: H::Element| {
        [g.default_unholdables, g.unholdables]
            .into_iter()
            .flatten()
            .any(|sel| host.matches(n, sel))
    };
    let mut in_holder = g.holder.is_none();
    let mut node = Some(target);
    while let Some(n) = node {
        if let Some(holder) = g.holder {
            in_holder |= host.matches(n, holder);
        }
        if n == el {
            break;
        }
        if unholdable(n) {
            return false;
        }
        node = host.parent(n);
    }
    in_holder
}

fn is_draggable<H: Host>(
    host: &H,
    store: &ElementStore<H::Element>,
    el: H::Element,
    delegate: Option<&str>,
) -> bool {
    match delegate {
        Some(selector) => host.matches(el, selector),
        None => store.get(el).is_some_and(|m| m.role == Some(Role::Element)),
    }
}

/// Register `candidate` as a preventer on every draggable ancestor below
/// `top`, failing if one of them is pressed.
pub(crate) fn block_propagation<H: Host>(
    host: &H,
    store: &mut ElementStore<H::Element>,
    candidate: H::Element,
    top: Option<H::Element>,
    delegate: Option<&str>,
) -> Result<(), StartRejection> {
    let mut node = host.parent(candidate);
    while let Some(n) = node {
        if Some(n) == top {
            break;
        }
        if is_draggable(host, store, n, delegate) {
            if store.is_pressed(n) {
                free_propagation(store, candidate);
                log::debug!("start on {candidate:?} blocked by pressed ancestor {n:?}");
                return Err(StartRejection::BlockedByAncestor);
            }
            let ancestor = store.entry(n);
            if !ancestor.drag_preventers.contains(&candidate) {
                ancestor.drag_preventers.push(candidate);
            }
            store.entry(candidate).drag_preventeds.push(n);
        }
        node = host.parent(n);
    }
    Ok(())
}

/// Release every registration `el` made in [`block_propagation`].
pub(crate) fn free_propagation<E: Copy + Eq + Hash>(store: &mut ElementStore<E>, el: E) {
    let Some(meta) = store.get_mut(el) else {
        return;
    };
    let prevented = core::mem::take(&mut meta.drag_preventeds);
    for ancestor in prevented {
        if let Some(a) = store.get_mut(ancestor) {
            a.drag_preventers.retain(|p| *p != el);
        }
        store.free_if_idle(ancestor);
    }
}
