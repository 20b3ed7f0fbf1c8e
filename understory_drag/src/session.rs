// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-drag state machine.
//!
//! ```text
//! Idle ──start──▶ Pressed ──first qualifying move──▶ Dragging ──end/cancel──▶ Releasing ──settle──▶ Idle
//!                    │                                                                  ▲
//!                    └────────────────── end/cancel without movement ──────────────────┘
//! ```
//!
//! A move qualifies once both gates are open: the delay timer has fired (or no
//! delay is set) and the pointer has travelled past `distance` (or none is
//! set). Moves compute the next [`Motion`]; animation frames write it.
//!
//! Sessions are recycled. Every press starts a new *cycle*, and timers carry
//! the cycle they were scheduled for, so a timer can never act on a later
//! drag of a recycled session.

use alloc::rc::Rc;
use alloc::string::ToString;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size, Vec2};

use crate::context::DragContext;
use crate::delegate::free_propagation;
use crate::hooks::{HookKind, Hooks};
use crate::host::{
    Host, MoveMode, PositionScheme, Scroller, TimerId, Transition, closest, is_inside, page_rect,
};
use crate::input::{ListenerRegistry, Phases};
use crate::motion::{
    Constraints, FrameThrottle, Metrics, Motion, ScrollRegion, clamp, grid_aligned_bounds,
    next_position, scroll_step,
};
use crate::options::{Container, Grid, Options, ScrollMode, ScrollTarget, ZMode};
use crate::pool::Recycle;
use crate::store::ElementStore;
use crate::track::PointerTrack;
use crate::types::{Contact, ContactId, EventKind, EventScope, InputFamily};

/// Settle delay used when a revert cannot be animated.
pub const FALLBACK_SETTLE_MS: f64 = 30.0;

/// Coarse lifecycle state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Not driving any contact.
    #[default]
    Idle,
    /// A contact is down; the gates are not yet satisfied.
    Pressed,
    /// The element follows the contact.
    Dragging,
    /// Released; waiting for the revert or settle delay.
    Releasing,
}

/// Phase marker exposed to hooks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Process {
    /// A start was accepted.
    PointerDown,
    /// The drag is being set up.
    DragInit,
    /// The element is following the contact.
    DragMove,
    /// The drag has finished.
    DragEnd,
}

/// Timer purposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TimerKind {
    Delay,
    TimeOut,
    Settle,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TimerEntry<E> {
    pub(crate) element: E,
    pub(crate) cycle: u64,
    pub(crate) kind: TimerKind,
}

/// Engine-wide timer bookkeeping.
#[derive(Debug)]
pub(crate) struct TimerTable<E> {
    next: u64,
    entries: HashMap<TimerId, TimerEntry<E>>,
}

impl<E> Default for TimerTable<E> {
    fn default() -> Self {
        Self {
            next: 1,
            entries: HashMap::new(),
        }
    }
}

impl<E: Copy> TimerTable<E> {
    pub(crate) fn schedule<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        entry: TimerEntry<E>,
        ms: f64,
    ) -> TimerId {
        let id = TimerId(self.next);
        self.next += 1;
        self.entries.insert(id, entry);
        host.set_timeout(id, ms);
        id
    }

    pub(crate) fn cancel<H: Host<Element = E>>(&mut self, host: &mut H, id: TimerId) {
        if self.entries.remove(&id).is_some() {
            host.clear_timeout(id);
        }
    }

    pub(crate) fn take(&mut self, id: TimerId) -> Option<TimerEntry<E>> {
        self.entries.remove(&id)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a session touches outside itself.
pub(crate) struct Env<'a, H: Host> {
    pub(crate) host: &'a mut H,
    pub(crate) store: &'a mut ElementStore<H::Element>,
    pub(crate) listeners: &'a mut ListenerRegistry<H::Element>,
    pub(crate) timers: &'a mut TimerTable<H::Element>,
    pub(crate) ctx: &'a mut DragContext,
}

/// What the engine should do with a session after a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Finished,
}

/// Data a session needs for one cycle.
#[derive(Clone, Debug)]
pub struct SessionInit<E> {
    /// The attached element.
    pub attached: E,
    /// The element that moves.
    pub element: E,
    /// The attachment delegates to `element`.
    pub delegated: bool,
    /// Option snapshot for this cycle.
    pub options: Rc<Options<E>>,
    /// Hooks of the attachment.
    pub hooks: Rc<Hooks<E>>,
    /// Cycle number.
    pub cycle: u64,
}

/// One drag, from press to settle.
///
/// Hooks receive a shared reference and can inspect the drag through the
/// accessors below.
#[derive(Debug)]
pub struct DragSession<E> {
    attached: Option<E>,
    element: Option<E>,
    delegated: bool,
    options: Rc<Options<E>>,
    hooks: Rc<Hooks<E>>,
    cycle: u64,

    state: SessionState,
    process: Option<Process>,
    family: Option<InputFamily>,
    scope: Option<EventScope<E>>,
    phases: Phases,
    contact: Option<ContactId>,
    track: PointerTrack,
    pointer_client: Option<Point>,
    distanced: bool,
    delayed: bool,

    metrics: Metrics,
    move_mode: MoveMode,
    transitions: bool,
    constraints: Constraints,
    motion: Option<Motion>,
    dirty: bool,
    container: Option<Rect>,
    scroller: Option<Scroller<E>>,
    scroll_origin: Vec2,
    scroll_shift: Vec2,
    tracks_window_scroll: bool,
    z_before: Option<i32>,
    transition_set: bool,

    rendering: bool,
    throttle: FrameThrottle,
    delay_timer: Option<TimerId>,
    timeout_timer: Option<TimerId>,
    settle_timer: Option<TimerId>,
    freq_stamp: f64,
}

impl<E> Default for DragSession<E> {
    fn default() -> Self {
        Self {
            attached: None,
            element: None,
            delegated: false,
            options: Rc::new(Options::default()),
            hooks: Rc::new(Hooks::default()),
            cycle: 0,
            state: SessionState::Idle,
            process: None,
            family: None,
            scope: None,
            phases: Phases::empty(),
            contact: None,
            track: PointerTrack::default(),
            pointer_client: None,
            distanced: false,
            delayed: false,
            metrics: Metrics::default(),
            move_mode: MoveMode::default(),
            transitions: false,
            constraints: Constraints::default(),
            motion: None,
            dirty: false,
            container: None,
            scroller: None,
            scroll_origin: Vec2::ZERO,
            scroll_shift: Vec2::ZERO,
            tracks_window_scroll: false,
            z_before: None,
            transition_set: false,
            rendering: false,
            throttle: FrameThrottle::default(),
            delay_timer: None,
            timeout_timer: None,
            settle_timer: None,
            freq_stamp: 0.0,
        }
    }
}

impl<E> Recycle for DragSession<E> {
    type Init = SessionInit<E>;

    fn reinit(&mut self, init: SessionInit<E>) {
        self.attached = Some(init.attached);
        self.element = Some(init.element);
        self.delegated = init.delegated;
        self.options = init.options;
        self.hooks = init.hooks;
        self.cycle = init.cycle;
    }

    fn teardown(&mut self) {
        *self = Self::default();
    }
}

impl<E: Copy> DragSession<E> {
    /// The attached element.
    pub fn attached(&self) -> Option<E> {
        self.attached
    }

    /// The element being dragged.
    pub fn element(&self) -> Option<E> {
        self.element
    }

    /// Whether the drag was delegated by an ancestor.
    pub fn is_delegated(&self) -> bool {
        self.delegated
    }

    /// Frozen options of this drag.
    pub fn options(&self) -> &Options<E> {
        &self.options
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Phase marker.
    pub fn process(&self) -> Option<Process> {
        self.process
    }

    /// Input family fixed at press.
    pub fn family(&self) -> Option<InputFamily> {
        self.family
    }

    /// Contact driving the drag; `None` for mouse input.
    pub fn contact(&self) -> Option<ContactId> {
        self.contact
    }

    /// Latest pointer sample in page coordinates.
    pub fn pointer(&self) -> Option<Point> {
        self.track.current()
    }

    /// Press-time geometry.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Latest computed position: a translation in transform modes, a page
    /// position in offset mode.
    pub fn position(&self) -> Option<Point> {
        self.motion.map(|m| m.position)
    }

    /// Latest page-relative bounds of the dragged element.
    pub fn bounds(&self) -> Option<Rect> {
        self.motion.map(|m| m.bounds)
    }

    /// Resolved container bounds.
    pub fn container(&self) -> Option<Rect> {
        self.container
    }

    /// Positioning mode in effect.
    pub fn move_mode(&self) -> MoveMode {
        self.move_mode
    }

    pub(crate) fn cycle(&self) -> u64 {
        self.cycle
    }

    pub(crate) fn scope(&self) -> Option<EventScope<E>> {
        self.scope
    }

    pub(crate) fn is_rendering(&self) -> bool {
        self.rendering
    }
}

impl<E: Copy + Eq + Hash + core::fmt::Debug> DragSession<E> {
    fn fire(&self, kind: HookKind) {
        let hooks = Rc::clone(&self.hooks);
        hooks.fire(kind, self);
    }

    fn schedule<H: Host<Element = E>>(
        &self,
        env: &mut Env<'_, H>,
        kind: TimerKind,
        ms: f64,
    ) -> Option<TimerId> {
        let element = self.element?;
        Some(env.timers.schedule(
            env.host,
            TimerEntry {
                element,
                cycle: self.cycle,
                kind,
            },
            ms,
        ))
    }

    fn cancel_timers<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) {
        for id in [
            self.delay_timer.take(),
            self.timeout_timer.take(),
            self.settle_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            env.timers.cancel(env.host, id);
        }
    }

    /// Idle → Pressed.
    pub(crate) fn press<H: Host<Element = E>>(
        &mut self,
        env: &mut Env<'_, H>,
        family: InputFamily,
        contact: Contact,
    ) {
        let Some(el) = self.element else {
            return;
        };
        let opts = Rc::clone(&self.options);
        let meta = env.store.entry(el);
        meta.pressed = true;
        meta.drag_available = false;
        meta.has_pointer = family == InputFamily::Pointer;

        let caps = env.host.capabilities();
        self.move_mode = caps.move_mode;
        self.transitions = caps.transitions;

        let mut scheme = env.host.position_scheme(el);
        if scheme == PositionScheme::Static {
            env.host.set_position_scheme(el, PositionScheme::Relative);
            scheme = PositionScheme::Relative;
        }
        let page_scroll = env.host.page_scroll();
        let origin = page_rect(&*env.host, env.host.client_rect(el));
        env.store.entry(el).offset = Some(origin);
        self.metrics = Metrics::capture(
            origin,
            env.host.translation(el),
            page_scroll,
            contact.page,
            opts.hold_offset,
            scheme,
        );

        self.track.start(contact.page);
        self.pointer_client = Some(contact.page - page_scroll);
        self.distanced = opts.distance.is_none_or(|d| d <= 0.0);
        self.delayed = opts.delay.ms().is_none();
        self.throttle = FrameThrottle::new(opts.render_fps);

        let scope = EventScope::for_family(family, el);
        self.state = SessionState::Pressed;
        self.process = Some(Process::PointerDown);
        self.family = Some(family);
        self.contact = contact.id;
        self.scope = Some(scope);
        self.phases = Phases::all();
        env.listeners
            .acquire_phases(env.host, scope, family, self.phases);

        if let Some(ms) = opts.delay.ms() {
            self.delay_timer = self.schedule(env, TimerKind::Delay, ms);
        }
        if let Some(ms) = opts.time_out {
            self.timeout_timer = self.schedule(env, TimerKind::TimeOut, ms);
        }
        log::debug!("press on {el:?} via {family:?} at {:?}", contact.page);
        self.fire(HookKind::PointerStart);
    }

    /// A sample of the driving contact.
    pub(crate) fn on_move<H: Host<Element = E>>(
        &mut self,
        env: &mut Env<'_, H>,
        contact: Contact,
        time_stamp: f64,
    ) {
        if !matches!(self.state, SessionState::Pressed | SessionState::Dragging)
            || !self.phases.contains(Phases::MOVE)
        {
            return;
        }
        if self.track.update(contact.page).is_none() {
            return;
        }
        self.pointer_client = Some(contact.page - env.host.page_scroll());
        if !self.distanced {
            if let Some(d) = self.options.distance {
                self.distanced = self.track.exceeds(contact.page, d);
            }
        }
        if !(self.distanced && self.delayed) {
            return;
        }

        let first = self.state == SessionState::Pressed;
        if first {
            self.begin_drag(env, time_stamp);
        }
        self.compute(env);
        log::trace!("move {:?} to {:?}", self.element, self.position());
        if first {
            self.write(env);
            self.fire(HookKind::DragStart);
        }
        self.fire(HookKind::Drag);
        if let Some(freq) = self.options.frequency {
            if time_stamp - self.freq_stamp >= freq {
                self.freq_stamp = time_stamp;
                self.fire(HookKind::DragWithFreq);
            }
        }
    }

    /// Pressed → Dragging.
    fn begin_drag<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>, time_stamp: f64) {
        let Some(el) = self.element else {
            return;
        };
        let opts = Rc::clone(&self.options);
        self.state = SessionState::Dragging;
        self.process = Some(Process::DragInit);
        env.store.entry(el).moved = true;

        match opts.z_mode {
            ZMode::Swap => {
                self.z_before = env.host.z_index(el);
                let z = env.ctx.next_z();
                env.host.set_z_index(el, Some(z));
            }
            ZMode::Fixed(z) => env.host.set_z_index(el, Some(z)),
        }

        let grid = match &opts.grid {
            Grid::Off => None,
            Grid::Cells(cell) => Some(*cell),
            Grid::Element(g) => Some(env.host.client_rect(*g).size()),
        }
        .filter(|cell| cell.width > 0.0 || cell.height > 0.0);
        self.constraints = Constraints {
            axis: opts.axis,
            grid,
            mode: self.move_mode,
            shift: Vec2::ZERO,
        };
        self.container = self.resolve_container(&*env.host, &opts);
        self.scroller = self.resolve_scroller(&*env.host, &opts);
        self.scroll_origin = match self.scroller {
            Some(Scroller::Element(s)) => env.host.scroll_metrics(s).offset,
            _ => Vec2::ZERO,
        };
        if self.container.is_some() && self.scroller.is_some() {
            env.listeners
                .acquire(env.host, EventScope::Window, EventKind::Scroll);
            self.tracks_window_scroll = true;
        }
        if let Some(id) = self.timeout_timer.take() {
            env.timers.cancel(env.host, id);
        }
        self.freq_stamp = time_stamp;
        self.rendering = true;
        self.process = Some(Process::DragMove);
        log::debug!("drag start on {el:?}");
    }

    fn resolve_container<H: Host<Element = E>>(&self, host: &H, opts: &Options<E>) -> Option<Rect> {
        let el = self.element?;
        let inner = |e: E| page_rect(host, host.inner_rect(e));
        let rect = match &opts.container {
            Container::None => return None,
            Container::Parent => inner(host.parent(el)?),
            Container::Closest(sel) => inner(closest(host, host.parent(el)?, sel)?),
            Container::Document => Rect::from_origin_size(Point::ZERO, host.document_size()),
            Container::Window => {
                Rect::from_origin_size(host.page_scroll().to_point(), host.viewport_size())
            }
            Container::Element(e) => inner(*e),
        };
        Some(match self.constraints.grid {
            Some(cell) => grid_aligned_bounds(rect, self.metrics.origin, cell),
            None => rect,
        })
    }

    fn resolve_scroller<H: Host<Element = E>>(
        &self,
        host: &H,
        opts: &Options<E>,
    ) -> Option<Scroller<E>> {
        let el = self.element?;
        match &opts.scroll {
            ScrollTarget::None => None,
            ScrollTarget::Window => Some(Scroller::Window),
            ScrollTarget::Parent => host.parent(el).map(Scroller::Element),
            ScrollTarget::Closest(sel) => host
                .parent(el)
                .and_then(|p| closest(host, p, sel))
                .map(Scroller::Element),
            ScrollTarget::Element(e) => Some(Scroller::Element(*e)),
        }
    }

    /// Recompute the next frame from the latest pointer sample.
    fn compute<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) {
        let (Some(el), Some(client)) = (self.element, self.pointer_client) else {
            return;
        };
        let page_scroll = env.host.page_scroll();
        let mut c = self.constraints;
        if self.move_mode.is_transform() {
            c.shift = self.scroll_shift;
            if self.metrics.scheme == PositionScheme::Fixed {
                c.shift -= page_scroll - self.metrics.page_scroll;
            }
        }
        let mut motion = next_position(&self.metrics, client + page_scroll, &c);
        if let Some(container) = self.container {
            motion = clamp(motion, container, self.options.container_sides, c.axis);
        }
        env.store.entry(el).offset = Some(motion.bounds);
        self.motion = Some(motion);
        self.dirty = true;
    }

    fn write<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) {
        let (Some(el), Some(motion)) = (self.element, self.motion) else {
            return;
        };
        if self.move_mode.is_transform() {
            env.host
                .write_translation(el, motion.position.to_vec2(), self.move_mode);
        } else {
            env.host.write_page_offset(el, motion.position);
        }
        self.dirty = false;
    }

    /// One display refresh.
    pub(crate) fn frame<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>, now: f64) {
        if !self.rendering || !self.throttle.ready(now) {
            return;
        }
        self.auto_scroll(env);
        if self.dirty {
            self.write(env);
        }
    }

    fn auto_scroll<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) {
        let (Some(scroller), Some(el)) = (self.scroller, self.element) else {
            return;
        };
        let opts = Rc::clone(&self.options);
        let region = match scroller {
            Scroller::Window => {
                let offset = env.host.page_scroll();
                let viewport = env.host.viewport_size();
                let document = env.host.document_size();
                ScrollRegion {
                    view: Rect::from_origin_size(offset.to_point(), viewport),
                    offset,
                    max: Vec2::new(
                        (document.width - viewport.width).max(0.0),
                        (document.height - viewport.height).max(0.0),
                    ),
                }
            }
            Scroller::Element(s) => {
                let m = env.host.scroll_metrics(s);
                ScrollRegion {
                    view: page_rect(&*env.host, env.host.inner_rect(s)),
                    offset: m.offset,
                    max: m.max_offset(),
                }
            }
        };
        let probe = match opts.scroll_mode {
            ScrollMode::Pointer => match self.pointer_client {
                Some(client) => Rect::from_origin_size(client + env.host.page_scroll(), Size::ZERO),
                None => return,
            },
            ScrollMode::Element => match self.motion {
                Some(m) => m.bounds,
                None => return,
            },
        };
        let step = scroll_step(probe, &region, opts.scroll_sensitivity, opts.scroll_speed);
        if step == Vec2::ZERO {
            return;
        }
        env.host.scroll_by(scroller, step);
        if let Scroller::Element(s) = scroller {
            let inside = is_inside(&*env.host, el, s);
            if inside && self.move_mode.is_transform() && self.constraints.grid.is_none() {
                self.scroll_shift = env.host.scroll_metrics(s).offset - self.scroll_origin;
            }
        }
        log::trace!("auto-scroll {scroller:?} by {step:?}");
        self.compute(env);
    }

    /// The window scrolled while this session tracks container bounds.
    pub(crate) fn on_window_scroll<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) {
        if self.state != SessionState::Dragging || !self.tracks_window_scroll {
            return;
        }
        let opts = Rc::clone(&self.options);
        self.container = self.resolve_container(&*env.host, &opts);
        self.compute(env);
    }

    /// End or cancel of the driving contact.
    pub(crate) fn release<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) -> Step {
        if !matches!(self.state, SessionState::Pressed | SessionState::Dragging) {
            return Step::Continue;
        }
        let Some(el) = self.element else {
            return Step::Finished;
        };
        self.unpress(env, el);
        if self.state == SessionState::Pressed {
            log::debug!("release on {el:?} without drag");
            self.state = SessionState::Idle;
            self.restore_available(env, el);
            return Step::Finished;
        }

        self.rendering = false;
        if self.dirty {
            self.write(env);
        }
        env.store.entry(el).moved = false;
        self.state = SessionState::Releasing;
        self.fire(HookKind::BeforePointerUp);

        let opts = Rc::clone(&self.options);
        let Some((ms, easing)) = opts.revert.timing() else {
            self.finish(env);
            return Step::Finished;
        };
        let settle = if self.transitions {
            let transition = Transition {
                duration_ms: ms,
                easing: easing.to_string(),
            };
            env.host.set_transition(el, Some(&transition));
            self.transition_set = true;
            ms
        } else {
            FALLBACK_SETTLE_MS
        };
        self.motion = Some(Motion {
            position: self.metrics.rest_position(self.move_mode),
            bounds: self.metrics.origin,
        });
        self.write(env);
        env.store.entry(el).offset = Some(self.metrics.origin);
        self.settle_timer = self.schedule(env, TimerKind::Settle, settle);
        log::debug!("revert {el:?} over {settle} ms");
        Step::Continue
    }

    /// Drop the contact: propagation, flags, listeners and pending gates.
    fn unpress<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>, el: E) {
        free_propagation(env.store, el);
        let meta = env.store.entry(el);
        meta.pressed = false;
        meta.has_pointer = false;
        if let (Some(scope), Some(family)) = (self.scope, self.family) {
            env.listeners
                .release_phases(env.host, scope, family, self.phases);
        }
        self.phases = Phases::empty();
        for id in [self.delay_timer.take(), self.timeout_timer.take()]
            .into_iter()
            .flatten()
        {
            env.timers.cancel(env.host, id);
        }
    }

    fn restore_available<H: Host<Element = E>>(&self, env: &mut Env<'_, H>, el: E) {
        let meta = env.store.entry(el);
        meta.drag_available = true;
        meta.moved = false;
    }

    /// Releasing → Idle.
    pub(crate) fn finish<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) {
        let Some(el) = self.element else {
            return;
        };
        if let Some(id) = self.settle_timer.take() {
            env.timers.cancel(env.host, id);
        }
        self.clean_styles(env, el);
        self.process = Some(Process::DragEnd);
        self.restore_available(env, el);
        self.state = SessionState::Idle;
        log::debug!("drag end on {el:?}");
        self.fire(HookKind::AfterPointerUp);
    }

    fn clean_styles<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>, el: E) {
        if core::mem::take(&mut self.transition_set) {
            env.host.set_transition(el, None);
        }
        if self.options.z_mode == ZMode::Swap
            && self.process.is_some_and(|p| p != Process::PointerDown)
        {
            env.host.set_z_index(el, self.z_before.take());
        }
        if core::mem::take(&mut self.tracks_window_scroll) {
            env.listeners
                .release(env.host, EventScope::Window, EventKind::Scroll);
        }
    }

    /// A timer scheduled by this session fired.
    pub(crate) fn on_timer<H: Host<Element = E>>(
        &mut self,
        env: &mut Env<'_, H>,
        id: TimerId,
        kind: TimerKind,
    ) -> Step {
        match kind {
            TimerKind::Delay if self.delay_timer == Some(id) => {
                self.delay_timer = None;
                self.delayed = true;
            }
            TimerKind::TimeOut if self.timeout_timer == Some(id) => {
                self.timeout_timer = None;
                if self.state == SessionState::Pressed {
                    if let (Some(scope), Some(family)) = (self.scope, self.family) {
                        env.listeners
                            .release_phases(env.host, scope, family, Phases::MOVE);
                    }
                    self.phases.remove(Phases::MOVE);
                    log::debug!("press on {:?} timed out", self.element);
                }
            }
            TimerKind::Settle if self.settle_timer == Some(id) => {
                self.settle_timer = None;
                self.finish(env);
                return Step::Finished;
            }
            _ => {}
        }
        Step::Continue
    }

    /// Tear down an in-flight session without hooks.
    pub(crate) fn abort<H: Host<Element = E>>(&mut self, env: &mut Env<'_, H>) {
        let Some(el) = self.element else {
            return;
        };
        if matches!(self.state, SessionState::Pressed | SessionState::Dragging) {
            self.unpress(env, el);
        }
        self.cancel_timers(env);
        self.rendering = false;
        self.clean_styles(env, el);
        self.restore_available(env, el);
        self.state = SessionState::Idle;
        log::debug!("aborted session on {el:?}");
    }
}
