// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input dispatch: start filtering, contact routing, and listener bookkeeping.
//!
//! A session fixes its [`InputFamily`] on the accepted start event. From then
//! on only events of that family reach it, and only the contact it recorded:
//! - touch and pointer sessions follow one contact id;
//! - mouse sessions take every sample while pressed.

use core::hash::Hash;

use hashbrown::HashMap;

use crate::host::Host;
use crate::types::{
    Button, Contact, ContactId, EventKind, EventScope, InputEvent, InputFamily, Phase,
    StartRejection,
};

bitflags::bitflags! {
    /// Phases a session is listening for.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub(crate) struct Phases: u8 {
        const MOVE   = 0b001;
        const END    = 0b010;
        const CANCEL = 0b100;
    }
}

impl Phases {
    fn phase_list(self) -> impl Iterator<Item = Phase> {
        [
            (Self::MOVE, Phase::Move),
            (Self::END, Phase::End),
            (Self::CANCEL, Phase::Cancel),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, phase)| phase)
    }
}

/// Check a start event and pick the contact that would drive the session.
///
/// Touch starts may carry several changed touches; the first one wins.
/// Only the middle and secondary buttons refuse a start; extra buttons
/// (back, forward, ...) drag like the primary one.
pub(crate) fn start_contact<E>(event: &InputEvent<E>) -> Result<Contact, StartRejection> {
    if event.family != InputFamily::Touch
        && matches!(event.button, Button::Middle | Button::Secondary)
    {
        return Err(StartRejection::SecondaryButton);
    }
    event
        .contacts
        .first()
        .copied()
        .ok_or(StartRejection::NoTarget)
}

/// The sample of `event` that belongs to a session of `family` driven by `id`.
pub(crate) fn match_contact<E>(
    event: &InputEvent<E>,
    family: InputFamily,
    id: Option<ContactId>,
) -> Option<Contact> {
    if event.family != family {
        return None;
    }
    match family {
        InputFamily::Mouse => event.contacts.first().copied(),
        InputFamily::Touch | InputFamily::Pointer => {
            event.contacts.iter().find(|c| c.id == id).copied()
        }
    }
}

/// Reference-counted listener registrations.
///
/// Several sessions share the document-scoped listeners; the host only sees
/// the first acquire and the last release of each `(scope, kind)` pair.
#[derive(Debug)]
pub(crate) struct ListenerRegistry<E> {
    counts: HashMap<(EventScope<E>, EventKind), u32>,
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<E: Copy + Eq + Hash> ListenerRegistry<E> {
    pub(crate) fn acquire<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        scope: EventScope<E>,
        kind: EventKind,
    ) {
        let count = self.counts.entry((scope, kind)).or_insert(0);
        *count += 1;
        if *count == 1 {
            host.listen(scope, kind);
        }
    }

    pub(crate) fn release<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        scope: EventScope<E>,
        kind: EventKind,
    ) {
        let Some(count) = self.counts.get_mut(&(scope, kind)) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&(scope, kind));
            host.unlisten(scope, kind);
        }
    }

    /// Acquire the input listeners for `phases` of `family`.
    pub(crate) fn acquire_phases<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        scope: EventScope<E>,
        family: InputFamily,
        phases: Phases,
    ) {
        for phase in phases.phase_list() {
            if let Some(kind) = EventKind::input(family, phase) {
                self.acquire(host, scope, kind);
            }
        }
    }

    /// Release the input listeners for `phases` of `family`.
    pub(crate) fn release_phases<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        scope: EventScope<E>,
        family: InputFamily,
        phases: Phases,
    ) {
        for phase in phases.phase_list() {
            if let Some(kind) = EventKind::input(family, phase) {
                self.release(host, scope, kind);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn count(&self, scope: EventScope<E>, kind: EventKind) -> u32 {
        self.counts.get(&(scope, kind)).copied().unwrap_or(0)
    }
}
