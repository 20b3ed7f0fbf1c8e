// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: attachments, session routing, timers, and the render loop.

use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::str::FromStr;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::context::{DragContext, PoolConfig};
use crate::delegate::{Grant, free_propagation, grant};
use crate::error::ControlError;
use crate::hooks::{HookKind, Hooks};
use crate::host::{Host, TimerId};
use crate::input::{ListenerRegistry, match_contact, start_contact};
use crate::options::{OptionValue, Options};
use crate::pool::{Pool, Recycle};
use crate::session::{DragSession, Env, SessionInit, SessionState, Step, TimerTable};
use crate::store::{ElementMeta, ElementStore, Role};
use crate::types::{
    EventKind, EventResponse, EventScope, InputEvent, InputFamily, Phase, StartRejection,
};

/// A runtime control applied to an attachment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Accept starts again.
    Enable,
    /// Silently reject starts; in-flight drags continue.
    Disable,
    /// Detach: abort in-flight drags and release every resource.
    Destroy,
}

impl FromStr for Control {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "destroy" => Ok(Self::Destroy),
            _ => Err(ControlError::UnknownControl(s.to_string())),
        }
    }
}

struct Attachment<E> {
    options: Rc<Options<E>>,
    hooks: Rc<Hooks<E>>,
    enabled: bool,
    role: Role,
    start_kinds: SmallVec<[EventKind; 2]>,
    /// Idle session of a self-dragging element.
    initial: Option<DragSession<E>>,
}

/// Drives drags for every attached element of one host.
///
/// The host forwards native events to [`Engine::handle_event`], fired timers
/// to [`Engine::handle_timer`], animation frames to [`Engine::handle_frame`],
/// and window scrolls to [`Engine::handle_window_scroll`].
pub struct Engine<H: Host> {
    host: H,
    ctx: DragContext,
    store: ElementStore<H::Element>,
    attachments: HashMap<H::Element, Attachment<H::Element>>,
    active: HashMap<H::Element, DragSession<H::Element>>,
    pool: Option<Pool<DragSession<H::Element>>>,
    listeners: ListenerRegistry<H::Element>,
    timers: TimerTable<H::Element>,
    cycles: u64,
    frame_pending: bool,
    last_touch_end: Option<f64>,
}

impl<H: Host + core::fmt::Debug> core::fmt::Debug for Engine<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("host", &self.host)
            .field("attachments", &self.attachments.len())
            .field("active", &self.active.len())
            .field("frame_pending", &self.frame_pending)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Engine<H> {
    /// Create an engine with the default [`DragContext`].
    pub fn new(host: H) -> Self {
        Self::with_context(host, DragContext::default())
    }

    /// Create an engine with an explicit context.
    pub fn with_context(host: H, ctx: DragContext) -> Self {
        Self {
            host,
            ctx,
            store: ElementStore::new(),
            attachments: HashMap::new(),
            active: HashMap::new(),
            pool: None,
            listeners: ListenerRegistry::default(),
            timers: TimerTable::default(),
            cycles: 0,
            frame_pending: false,
            last_touch_end: None,
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The engine context.
    pub fn context(&self) -> &DragContext {
        &self.ctx
    }

    fn env(&mut self) -> Env<'_, H> {
        Env {
            host: &mut self.host,
            store: &mut self.store,
            listeners: &mut self.listeners,
            timers: &mut self.timers,
            ctx: &mut self.ctx,
        }
    }

    /// Enable dragging on every element of a selection.
    ///
    /// Elements that already have dragging are left untouched. Returns how many
    /// elements were newly attached.
    pub fn enable_dragging(
        &mut self,
        elements: impl IntoIterator<Item = H::Element>,
        options: Options<H::Element>,
        hooks: Hooks<H::Element>,
    ) -> usize {
        let delegated = options.delegate.is_some();
        let options = Rc::new(options);
        let hooks = Rc::new(hooks);
        let elements: Vec<_> = elements.into_iter().collect();

        let auto = PoolConfig::auto_size(delegated, elements.len());
        match &mut self.pool {
            None => {
                let size = self.ctx.pool.init_size.unwrap_or(auto);
                self.pool = Some(Pool::new(size, self.ctx.pool.max_size));
            }
            Some(pool) if self.ctx.pool.auto_increase => pool.increase(auto),
            Some(_) => {}
        }

        elements
            .into_iter()
            .filter(|el| self.attach(*el, Rc::clone(&options), Rc::clone(&hooks)))
            .count()
    }

    /// Attach one element; returns `false` if it was already attached.
    fn attach(
        &mut self,
        el: H::Element,
        options: Rc<Options<H::Element>>,
        hooks: Rc<Hooks<H::Element>>,
    ) -> bool {
        if self.attachments.contains_key(&el) {
            return false;
        }
        let role = if options.delegate.is_some() {
            Role::Delegator
        } else {
            Role::Element
        };
        self.store.entry(el).role = Some(role);
        self.host.set_touch_action_none(el);
        let class = match role {
            Role::Element => &self.ctx.element_class,
            Role::Delegator => &self.ctx.delegator_class,
        };
        self.host.add_class(el, class);

        let mut start_kinds = SmallVec::new();
        if self.host.capabilities().pointer_events {
            start_kinds.push(EventKind::Input(InputFamily::Pointer, Phase::Start));
        } else {
            start_kinds.push(EventKind::Input(InputFamily::Mouse, Phase::Start));
            start_kinds.push(EventKind::Input(InputFamily::Touch, Phase::Start));
        }
        for kind in &start_kinds {
            self.listeners
                .acquire(&mut self.host, EventScope::Element(el), *kind);
        }

        let mut session = DragSession::default();
        session.reinit(SessionInit {
            attached: el,
            element: el,
            delegated: false,
            options: Rc::clone(&options),
            hooks: Rc::clone(&hooks),
            cycle: 0,
        });
        hooks.fire(HookKind::Init, &session);
        session.teardown();

        log::debug!("attached {el:?} as {role:?}");
        self.attachments.insert(
            el,
            Attachment {
                options,
                hooks,
                enabled: true,
                role,
                start_kinds,
                initial: (role == Role::Element).then_some(session),
            },
        );
        true
    }

    /// Returns `true` if `el` has dragging attached.
    pub fn is_attached(&self, el: H::Element) -> bool {
        self.attachments.contains_key(&el)
    }

    /// The in-flight session moving `el`, if any.
    pub fn session(&self, el: H::Element) -> Option<&DragSession<H::Element>> {
        self.active.get(&el)
    }

    /// Shared state of `el`, if it has any.
    pub fn element_state(&self, el: H::Element) -> Option<&ElementMeta<H::Element>> {
        self.store.get(el)
    }

    /// Sessions waiting in the pool.
    pub fn pooled_sessions(&self) -> usize {
        self.pool.as_ref().map_or(0, Pool::available)
    }

    /// Handle a native input event delivered from `scope`.
    pub fn handle_event(
        &mut self,
        scope: EventScope<H::Element>,
        event: &InputEvent<H::Element>,
    ) -> EventResponse {
        let response = match event.phase {
            Phase::Start => match self.handle_start(scope, event) {
                Ok(response) => response,
                Err(reason) => {
                    log::debug!("start on {:?} rejected: {reason:?}", event.target);
                    EventResponse::rejected(reason)
                }
            },
            Phase::Move | Phase::End | Phase::Cancel => self.route(scope, event),
        };
        self.sync_frame();
        response
    }

    fn touch_active(&self) -> bool {
        self.active.values().any(|s| {
            s.family() == Some(InputFamily::Touch)
                && matches!(s.state(), SessionState::Pressed | SessionState::Dragging)
        })
    }

    fn handle_start(
        &mut self,
        scope: EventScope<H::Element>,
        event: &InputEvent<H::Element>,
    ) -> Result<EventResponse, StartRejection> {
        let EventScope::Element(attached) = scope else {
            return Err(StartRejection::NoTarget);
        };
        let att = self
            .attachments
            .get(&attached)
            .ok_or(StartRejection::NoTarget)?;
        if !att.enabled {
            return Err(StartRejection::Disabled);
        }
        if event.family == InputFamily::Mouse {
            let recent = self
                .last_touch_end
                .is_some_and(|t| event.time_stamp - t < self.ctx.ghost_mouse_window_ms);
            if recent || self.touch_active() {
                return Err(StartRejection::GhostMouse);
            }
        }
        let contact = start_contact(event)?;

        let options = Rc::clone(&att.options);
        let hooks = Rc::clone(&att.hooks);
        let g = Grant {
            attached,
            delegate: options.delegate.as_deref(),
            holder: options.holder.as_deref(),
            default_unholdables: options
                .unhold_defaults
                .then_some(self.ctx.unholdables.as_str()),
            unholdables: options.unholdables.as_deref(),
            skip_blocking: options.stop_propagation,
        };
        let el = grant(&self.host, &mut self.store, &g, event.target)?;
        if self.active.contains_key(&el) {
            free_propagation(&mut self.store, el);
            return Err(StartRejection::ContactBusy);
        }

        let delegated = options.delegate.is_some();
        self.cycles += 1;
        let init = SessionInit {
            attached,
            element: el,
            delegated,
            options: Rc::clone(&options),
            hooks,
            cycle: self.cycles,
        };
        let mut session = if delegated {
            self.pool
                .get_or_insert_with(|| Pool::new(0, 0))
                .pop(init)
        } else {
            let mut s = self
                .attachments
                .get_mut(&attached)
                .and_then(|a| a.initial.take())
                .unwrap_or_default();
            s.reinit(init);
            s
        };
        session.press(&mut self.env(), event.family, contact);
        self.active.insert(el, session);

        Ok(EventResponse {
            prevent_default: options.prevent_default && event.cancelable,
            stop_propagation: options.stop_propagation,
            started: true,
            rejection: None,
        })
    }

    fn route(
        &mut self,
        scope: EventScope<H::Element>,
        event: &InputEvent<H::Element>,
    ) -> EventResponse {
        let targets: SmallVec<[_; 4]> = self
            .active
            .iter()
            .filter(|(_, s)| s.scope() == Some(scope))
            .filter_map(|(el, s)| {
                let contact = match_contact(event, s.family()?, s.contact())?;
                Some((*el, contact))
            })
            .collect();

        let mut response = EventResponse::default();
        for (el, contact) in targets {
            let Some(mut session) = self.active.remove(&el) else {
                continue;
            };
            response.merge(EventResponse {
                prevent_default: session.options().prevent_default && event.cancelable,
                stop_propagation: session.options().stop_propagation,
                ..EventResponse::default()
            });
            let step = match event.phase {
                Phase::Move => {
                    session.on_move(&mut self.env(), contact, event.time_stamp);
                    Step::Continue
                }
                Phase::End | Phase::Cancel => {
                    if event.family == InputFamily::Touch {
                        self.last_touch_end = Some(event.time_stamp);
                    }
                    session.release(&mut self.env())
                }
                Phase::Start => Step::Continue,
            };
            self.settle(el, session, step);
        }
        response
    }

    fn settle(&mut self, el: H::Element, session: DragSession<H::Element>, step: Step) {
        match step {
            Step::Continue => {
                self.active.insert(el, session);
            }
            Step::Finished => self.recycle(el, session),
        }
    }

    fn recycle(&mut self, el: H::Element, mut session: DragSession<H::Element>) {
        if session.is_delegated() {
            self.pool
                .get_or_insert_with(|| Pool::new(0, 0))
                .push(session);
            self.store.free_if_idle(el);
            return;
        }
        session.teardown();
        if let Some(att) = session_owner(&mut self.attachments, el) {
            att.initial = Some(session);
        }
    }

    /// A timer scheduled through [`Host::set_timeout`] fired.
    ///
    /// Unknown or stale ids are ignored.
    pub fn handle_timer(&mut self, id: TimerId) {
        let Some(entry) = self.timers.take(id) else {
            return;
        };
        let Some(mut session) = self.active.remove(&entry.element) else {
            return;
        };
        if session.cycle() != entry.cycle {
            self.active.insert(entry.element, session);
            return;
        }
        let step = session.on_timer(&mut self.env(), id, entry.kind);
        self.settle(entry.element, session, step);
        self.sync_frame();
    }

    /// An animation frame requested through [`Host::request_frame`] fired.
    pub fn handle_frame(&mut self, now: f64) {
        self.frame_pending = false;
        let rendering: SmallVec<[_; 4]> = self
            .active
            .iter()
            .filter(|(_, s)| s.is_rendering())
            .map(|(el, _)| *el)
            .collect();
        for el in rendering {
            if let Some(mut session) = self.active.remove(&el) {
                session.frame(&mut self.env(), now);
                self.active.insert(el, session);
            }
        }
        self.sync_frame();
    }

    /// The window scrolled.
    pub fn handle_window_scroll(&mut self) {
        let dragging: SmallVec<[_; 4]> = self.active.keys().copied().collect();
        for el in dragging {
            if let Some(mut session) = self.active.remove(&el) {
                session.on_window_scroll(&mut self.env());
                self.active.insert(el, session);
            }
        }
        self.sync_frame();
    }

    fn sync_frame(&mut self) {
        let wanted = self.active.values().any(DragSession::is_rendering);
        if wanted && !self.frame_pending {
            self.host.request_frame();
            self.frame_pending = true;
        } else if !wanted && self.frame_pending {
            self.host.cancel_frame();
            self.frame_pending = false;
        }
    }

    /// Read an option of an attached element.
    pub fn option(
        &self,
        el: H::Element,
        name: &str,
    ) -> Result<OptionValue<H::Element>, ControlError> {
        let att = self
            .attachments
            .get(&el)
            .ok_or(ControlError::NotAttached)?;
        att.options.get(name)
    }

    /// Write an option of an attached element.
    ///
    /// In-flight drags keep the options they started with.
    pub fn set_option(
        &mut self,
        el: H::Element,
        name: &str,
        value: OptionValue<H::Element>,
    ) -> Result<(), ControlError> {
        let att = self
            .attachments
            .get_mut(&el)
            .ok_or(ControlError::NotAttached)?;
        Rc::make_mut(&mut att.options).set(name, value)
    }

    /// Read an option from the first attached element of a selection.
    pub fn option_for(
        &self,
        elements: &[H::Element],
        name: &str,
    ) -> Result<OptionValue<H::Element>, ControlError> {
        let el = elements
            .iter()
            .find(|el| self.is_attached(**el))
            .ok_or(ControlError::NotAttached)?;
        self.option(*el, name)
    }

    /// Write an option on every attached element of a selection; returns how
    /// many were updated.
    pub fn set_option_for(
        &mut self,
        elements: &[H::Element],
        name: &str,
        value: &OptionValue<H::Element>,
    ) -> Result<usize, ControlError> {
        let mut updated = 0;
        for el in elements {
            if self.is_attached(*el) {
                self.set_option(*el, name, value.clone())?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Apply a control to an attached element.
    pub fn invoke(&mut self, el: H::Element, control: Control) -> Result<(), ControlError> {
        let att = self
            .attachments
            .get_mut(&el)
            .ok_or(ControlError::NotAttached)?;
        match control {
            Control::Enable => att.enabled = true,
            Control::Disable => att.enabled = false,
            Control::Destroy => self.destroy(el),
        }
        Ok(())
    }

    /// Apply a control by name (`"enable"`, `"disable"`, `"destroy"`).
    pub fn invoke_named(&mut self, el: H::Element, name: &str) -> Result<(), ControlError> {
        self.invoke(el, name.parse()?)
    }

    /// Apply a control to every attached element of a selection; returns how
    /// many were affected.
    pub fn invoke_for(&mut self, elements: &[H::Element], control: Control) -> usize {
        elements
            .iter()
            .filter(|el| self.invoke(**el, control).is_ok())
            .count()
    }

    fn destroy(&mut self, el: H::Element) {
        let Some(att) = self.attachments.remove(&el) else {
            return;
        };
        for kind in &att.start_kinds {
            self.listeners
                .release(&mut self.host, EventScope::Element(el), *kind);
        }
        let class = match att.role {
            Role::Element => &self.ctx.element_class,
            Role::Delegator => &self.ctx.delegator_class,
        };
        self.host.remove_class(el, class);

        let owned: SmallVec<[_; 4]> = self
            .active
            .iter()
            .filter(|(_, s)| s.attached() == Some(el))
            .map(|(k, _)| *k)
            .collect();
        for key in owned {
            if let Some(mut session) = self.active.remove(&key) {
                session.abort(&mut self.env());
                if session.is_delegated() {
                    self.recycle(key, session);
                }
            }
        }
        self.store.free(el);
        self.sync_frame();
        log::debug!("destroyed {el:?}");
    }
}

fn session_owner<E: Copy + Eq + core::hash::Hash>(
    attachments: &mut HashMap<E, Attachment<E>>,
    el: E,
) -> Option<&mut Attachment<E>> {
    attachments
        .get_mut(&el)
        .filter(|att| att.role == Role::Element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_parse_by_name() {
        assert_eq!("enable".parse(), Ok(Control::Enable));
        assert_eq!("disable".parse(), Ok(Control::Disable));
        assert_eq!("destroy".parse(), Ok(Control::Destroy));
        assert_eq!(
            "explode".parse::<Control>(),
            Err(ControlError::UnknownControl("explode".into()))
        );
    }
}
