// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle callbacks.
//!
//! Hooks run synchronously inside the engine call that triggered them and see
//! the session read-only. They must not call back into the engine that is
//! running them.

use alloc::rc::Rc;
use core::fmt;

use crate::session::DragSession;

/// A lifecycle callback.
pub type Hook<E> = Rc<dyn Fn(&DragSession<E>)>;

/// Transition a hook is attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// An element was attached.
    Init,
    /// A start was accepted.
    PointerStart,
    /// The first qualifying move began the drag.
    DragStart,
    /// Every qualifying move.
    Drag,
    /// Qualifying moves, at most once per `frequency`.
    DragWithFreq,
    /// Release of a drag that moved, before revert.
    BeforePointerUp,
    /// The session settled back to idle.
    AfterPointerUp,
}

/// The hooks of one attachment.
#[derive(Clone)]
pub struct Hooks<E> {
    on_init: Option<Hook<E>>,
    on_pointer_start: Option<Hook<E>>,
    on_drag_start: Option<Hook<E>>,
    on_drag: Option<Hook<E>>,
    on_drag_with_freq: Option<Hook<E>>,
    before_pointer_up: Option<Hook<E>>,
    after_pointer_up: Option<Hook<E>>,
}

impl<E> Default for Hooks<E> {
    fn default() -> Self {
        Self {
            on_init: None,
            on_pointer_start: None,
            on_drag_start: None,
            on_drag: None,
            on_drag_with_freq: None,
            before_pointer_up: None,
            after_pointer_up: None,
        }
    }
}

impl<E> fmt::Debug for Hooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for kind in [
            HookKind::Init,
            HookKind::PointerStart,
            HookKind::DragStart,
            HookKind::Drag,
            HookKind::DragWithFreq,
            HookKind::BeforePointerUp,
            HookKind::AfterPointerUp,
        ] {
            if self.slot(kind).is_some() {
                set.entry(&kind);
            }
        }
        set.finish()
    }
}

impl<E> Hooks<E> {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook for `kind`.
    #[must_use]
    pub fn on(mut self, kind: HookKind, hook: impl Fn(&DragSession<E>) + 'static) -> Self {
        *self.slot_mut(kind) = Some(Rc::new(hook));
        self
    }

    /// Returns `true` if a hook is set for `kind`.
    pub fn has(&self, kind: HookKind) -> bool {
        self.slot(kind).is_some()
    }

    pub(crate) fn fire(&self, kind: HookKind, session: &DragSession<E>) {
        if let Some(hook) = self.slot(kind) {
            hook(session);
        }
    }

    fn slot(&self, kind: HookKind) -> &Option<Hook<E>> {
        match kind {
            HookKind::Init => &self.on_init,
            HookKind::PointerStart => &self.on_pointer_start,
            HookKind::DragStart => &self.on_drag_start,
            HookKind::Drag => &self.on_drag,
            HookKind::DragWithFreq => &self.on_drag_with_freq,
            HookKind::BeforePointerUp => &self.before_pointer_up,
            HookKind::AfterPointerUp => &self.after_pointer_up,
        }
    }

    fn slot_mut(&mut self, kind: HookKind) -> &mut Option<Hook<E>> {
        match kind {
            HookKind::Init => &mut self.on_init,
            HookKind::PointerStart => &mut self.on_pointer_start,
            HookKind::DragStart => &mut self.on_drag_start,
            HookKind::Drag => &mut self.on_drag,
            HookKind::DragWithFreq => &mut self.on_drag_with_freq,
            HookKind::BeforePointerUp => &mut self.before_pointer_up,
            HookKind::AfterPointerUp => &mut self.after_pointer_up,
        }
    }
}
