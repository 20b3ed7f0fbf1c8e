// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Host`] implementation over `web_sys`.

use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use js_sys::{Function, Reflect};
use kurbo::{Point, Rect, Size, Vec2};
use understory_drag::{
    Button, Capabilities, DragContext, Engine, EventKind, EventScope, Host, InputEvent,
    InputFamily, MoveMode, Phase, PositionScheme, ScrollMetrics, Scroller, TimerId, Transition,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    AddEventListenerOptions, CssStyleDeclaration, Document, Element, Event, EventTarget,
    HtmlElement, MouseEvent, PointerEvent, TouchEvent, Window,
};

use crate::ElementHandle;
use crate::css;
use crate::handles::HandleTable;

/// Attribute carrying an element's handle.
pub const HANDLE_ATTRIBUTE: &str = "data-understory-drag-id";

/// Target of a move, end, or cancel event on an element the host never
/// tagged. Those phases route by contact, so the target is never resolved.
const UNTRACKED: ElementHandle = ElementHandle(u32::MAX);

pub(crate) type SharedEngine = Rc<RefCell<Engine<WebHost>>>;
type WeakEngine = Weak<RefCell<Engine<WebHost>>>;

type Listener = Closure<dyn FnMut(Event)>;
type TimerCallback = Closure<dyn FnMut()>;
type FrameCallback = Closure<dyn FnMut(f64)>;

/// The browser document as seen by the drag engine.
///
/// Element handles are assigned to attached elements and to the elements a
/// press walks through, and recorded in the [`HANDLE_ATTRIBUTE`] attribute, so
/// one page should run a single host.
pub struct WebHost {
    window: Window,
    document: Document,
    engine: WeakEngine,
    caps: Capabilities,
    elements: RefCell<HandleTable<Element>>,
    listeners: HashMap<(EventScope<ElementHandle>, EventKind), Listener>,
    timers: HashMap<TimerId, (i32, TimerCallback)>,
    frame: Option<FrameCallback>,
    frame_handle: Option<i32>,
    /// Callbacks unregistered while one of them may still be running; dropped
    /// on the next dispatch.
    graveyard: Vec<Graveyard>,
}

enum Graveyard {
    Listener(#[expect(dead_code, reason = "kept alive until the next dispatch")] Listener),
    Timer(#[expect(dead_code, reason = "kept alive until the next dispatch")] TimerCallback),
}

impl fmt::Debug for WebHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebHost")
            .field("caps", &self.caps)
            .field("elements", &self.elements.borrow().live())
            .field("listeners", &self.listeners.len())
            .field("timers", &self.timers.len())
            .field("frame_handle", &self.frame_handle)
            .finish_non_exhaustive()
    }
}

impl WebHost {
    fn new(window: Window, document: Document, engine: WeakEngine) -> Self {
        let caps = detect_capabilities(&window);
        log::debug!("browser capabilities: {caps:?}");
        Self {
            window,
            document,
            engine,
            caps,
            elements: RefCell::default(),
            listeners: HashMap::new(),
            timers: HashMap::new(),
            frame: None,
            frame_handle: None,
            graveyard: Vec::new(),
        }
    }

    /// Create an engine bound to the current window.
    pub(crate) fn engine(ctx: DragContext) -> Option<SharedEngine> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Rc::new_cyclic(|weak| {
            RefCell::new(Engine::with_context(
                Self::new(window, document, weak.clone()),
                ctx,
            ))
        }))
    }

    /// Handle of `el`, assigning one on first sight.
    pub fn handle_for(&self, el: &Element) -> ElementHandle {
        let (handle, fresh) = self.elements.borrow_mut().assign(tag(el), el);
        if fresh
            && el
                .set_attribute(HANDLE_ATTRIBUTE, &handle.0.to_string())
                .is_err()
        {
            log::warn!("could not tag element with {HANDLE_ATTRIBUTE}");
        }
        handle
    }

    /// Handle of `el` if it already has one.
    pub fn lookup(&self, el: &Element) -> Option<ElementHandle> {
        self.elements.borrow().lookup(tag(el), el)
    }

    /// The element behind a handle.
    pub fn element(&self, handle: ElementHandle) -> Option<Element> {
        self.elements.borrow().get(handle).cloned()
    }

    /// Drop the element behind `handle` and strip its tag.
    pub(crate) fn forget(&self, handle: ElementHandle) {
        let released = self.elements.borrow_mut().release(handle);
        if let Some(el) = released {
            let _ = el.remove_attribute(HANDLE_ATTRIBUTE);
            log::trace!("released {handle:?}");
        }
    }

    fn html(&self, handle: ElementHandle) -> Option<HtmlElement> {
        self.element(handle)?.dyn_into::<HtmlElement>().ok()
    }

    fn inline_style(&self, handle: ElementHandle) -> Option<CssStyleDeclaration> {
        self.html(handle).map(|h| h.style())
    }

    fn computed(&self, handle: ElementHandle, property: &str) -> Option<String> {
        let el = self.element(handle)?;
        let style = self.window.get_computed_style(&el).ok()??;
        style.get_property_value(property).ok()
    }

    fn set_style(&self, handle: ElementHandle, property: &str, value: Option<&str>) {
        let Some(style) = self.inline_style(handle) else {
            return;
        };
        let result = match value {
            Some(v) => style.set_property(property, v),
            None => style.remove_property(property).map(drop),
        };
        if result.is_err() {
            log::warn!("failed to write `{property}` on {handle:?}");
        }
    }

    fn target(&self, scope: EventScope<ElementHandle>) -> Option<EventTarget> {
        match scope {
            EventScope::Document => Some(self.document.clone().into()),
            EventScope::Window => Some(self.window.clone().into()),
            EventScope::Element(h) => self.element(h).map(Into::into),
        }
    }

    fn bury_timer(&mut self, id: TimerId) {
        if let Some((_, callback)) = self.timers.remove(&id) {
            self.graveyard.push(Graveyard::Timer(callback));
        }
    }

    /// Translate a native event for the engine.
    fn translate(&self, kind: EventKind, event: &Event) -> Option<InputEvent<ElementHandle>> {
        let EventKind::Input(family, phase) = kind else {
            return None;
        };
        let target = event.target()?.dyn_into::<Element>().ok()?;
        // Only starts resolve their target against the tree.
        let target = match phase {
            Phase::Start => self.handle_for(&target),
            _ => self.lookup(&target).unwrap_or(UNTRACKED),
        };
        let time_stamp = event.time_stamp();
        let ev = match family {
            InputFamily::Pointer => {
                let ev = event.dyn_ref::<PointerEvent>()?;
                InputEvent::pointer(phase, target, ev.pointer_id(), page_point(ev), time_stamp)
                    .with_button(Button::from_dom(ev.button()))
            }
            InputFamily::Mouse => {
                let ev = event.dyn_ref::<MouseEvent>()?;
                InputEvent::mouse(phase, target, page_point(ev), time_stamp)
                    .with_button(Button::from_dom(ev.button()))
            }
            InputFamily::Touch => {
                let ev = event.dyn_ref::<TouchEvent>()?;
                let touches = ev.changed_touches();
                let contacts = (0..touches.length()).filter_map(|i| touches.get(i)).map(|t| {
                    let page = Point::new(f64::from(t.page_x()), f64::from(t.page_y()));
                    (t.identifier(), page)
                });
                InputEvent::touch(phase, target, contacts, time_stamp)
            }
        };
        Some(ev.with_cancelable(event.cancelable()))
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        let keys: Vec<_> = self.listeners.keys().copied().collect();
        for (scope, kind) in keys {
            self.unlisten(scope, kind);
        }
        for (_, (handle, _)) in self.timers.drain() {
            self.window.clear_timeout_with_handle(handle);
        }
        self.cancel_frame();
    }
}

fn tag(el: &Element) -> Option<ElementHandle> {
    el.get_attribute(HANDLE_ATTRIBUTE)?.parse().ok().map(ElementHandle)
}

fn page_point(ev: &MouseEvent) -> Point {
    Point::new(f64::from(ev.page_x()), f64::from(ev.page_y()))
}

fn detect_capabilities(window: &Window) -> Capabilities {
    let supports = |value: &str| web_sys::css::supports_with_value("transform", value).unwrap_or(false);
    let transitions = web_sys::css::supports_with_value("transition", "none").unwrap_or(false);
    let pointer_events = Reflect::has(window, &"PointerEvent".into()).unwrap_or(false);
    Capabilities {
        move_mode: MoveMode::detect(
            supports("translate3d(0px, 0px, 0px)"),
            supports("translate(0px, 0px)"),
        ),
        transitions,
        pointer_events,
    }
}

/// Run `f` against the engine unless it is gone or already borrowed.
fn with_engine(engine: &WeakEngine, f: impl FnOnce(&mut Engine<WebHost>)) {
    let Some(engine) = engine.upgrade() else {
        return;
    };
    let Ok(mut engine) = engine.try_borrow_mut() else {
        log::warn!("dropping re-entrant browser callback");
        return;
    };
    engine.host_mut().graveyard.clear();
    f(&mut engine);
}

fn dispatch(engine: &WeakEngine, scope: EventScope<ElementHandle>, kind: EventKind, event: &Event) {
    with_engine(engine, |engine| {
        if kind == EventKind::Scroll {
            engine.handle_window_scroll();
            return;
        }
        let Some(input) = engine.host().translate(kind, event) else {
            return;
        };
        let response = engine.handle_event(scope, &input);
        if response.prevent_default {
            event.prevent_default();
        }
        if response.stop_propagation {
            event.stop_propagation();
        }
    });
}

fn rect_from_dom(r: &web_sys::DomRect) -> Rect {
    Rect::new(r.left(), r.top(), r.right(), r.bottom())
}

impl Host for WebHost {
    type Element = ElementHandle;

    fn parent(&self, el: ElementHandle) -> Option<ElementHandle> {
        let parent = self.element(el)?.parent_element()?;
        Some(self.handle_for(&parent))
    }

    fn matches(&self, el: ElementHandle, selector: &str) -> bool {
        self.element(el)
            .and_then(|e| e.matches(selector).ok())
            .unwrap_or(false)
    }

    fn client_rect(&self, el: ElementHandle) -> Rect {
        self.element(el)
            .map(|e| rect_from_dom(&e.get_bounding_client_rect()))
            .unwrap_or_default()
    }

    fn inner_rect(&self, el: ElementHandle) -> Rect {
        let Some(e) = self.element(el) else {
            return Rect::ZERO;
        };
        let outer = rect_from_dom(&e.get_bounding_client_rect());
        let origin = outer.origin()
            + Vec2::new(f64::from(e.client_left()), f64::from(e.client_top()));
        Rect::from_origin_size(
            origin,
            Size::new(f64::from(e.client_width()), f64::from(e.client_height())),
        )
    }

    fn translation(&self, el: ElementHandle) -> Vec2 {
        self.computed(el, "transform")
            .map(|t| css::parse_translation(&t))
            .unwrap_or(Vec2::ZERO)
    }

    fn position_scheme(&self, el: ElementHandle) -> PositionScheme {
        self.computed(el, "position")
            .map(|p| css::parse_position(&p))
            .unwrap_or_default()
    }

    fn page_scroll(&self) -> Vec2 {
        Vec2::new(
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }

    fn document_client_offset(&self) -> Vec2 {
        self.document
            .document_element()
            .map(|d| Vec2::new(f64::from(d.client_left()), f64::from(d.client_top())))
            .unwrap_or(Vec2::ZERO)
    }

    fn viewport_size(&self) -> Size {
        self.document
            .document_element()
            .map(|d| Size::new(f64::from(d.client_width()), f64::from(d.client_height())))
            .unwrap_or(Size::ZERO)
    }

    fn document_size(&self) -> Size {
        self.document
            .document_element()
            .map(|d| Size::new(f64::from(d.scroll_width()), f64::from(d.scroll_height())))
            .unwrap_or(Size::ZERO)
    }

    fn scroll_metrics(&self, el: ElementHandle) -> ScrollMetrics {
        let Some(e) = self.element(el) else {
            return ScrollMetrics::default();
        };
        let outer = self
            .html(el)
            .map(|h| Size::new(f64::from(h.offset_width()), f64::from(h.offset_height())))
            .unwrap_or(Size::ZERO);
        ScrollMetrics {
            offset: Vec2::new(f64::from(e.scroll_left()), f64::from(e.scroll_top())),
            client: Size::new(f64::from(e.client_width()), f64::from(e.client_height())),
            scroll: Size::new(f64::from(e.scroll_width()), f64::from(e.scroll_height())),
            outer,
        }
    }

    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn write_translation(&mut self, el: ElementHandle, translation: Vec2, mode: MoveMode) {
        self.set_style(el, "transform", Some(&css::transform_value(translation, mode)));
    }

    fn write_page_offset(&mut self, el: ElementHandle, pos: Point) {
        let current = self.client_rect(el).origin() + self.page_scroll();
        let left = self.computed(el, "left").map_or(0.0, |v| css::parse_px(&v));
        let top = self.computed(el, "top").map_or(0.0, |v| css::parse_px(&v));
        let next = Vec2::new(left, top) + (pos - current);
        self.set_style(el, "left", Some(&alloc::format!("{}px", next.x)));
        self.set_style(el, "top", Some(&alloc::format!("{}px", next.y)));
    }

    fn set_position_scheme(&mut self, el: ElementHandle, scheme: PositionScheme) {
        self.set_style(el, "position", Some(css::position_value(scheme)));
    }

    fn z_index(&self, el: ElementHandle) -> Option<i32> {
        self.inline_style(el)?
            .get_property_value("z-index")
            .ok()?
            .parse()
            .ok()
    }

    fn set_z_index(&mut self, el: ElementHandle, z: Option<i32>) {
        let value = z.map(|z| z.to_string());
        self.set_style(el, "z-index", value.as_deref());
    }

    fn set_transition(&mut self, el: ElementHandle, transition: Option<&Transition>) {
        let value = transition.map(|t| css::transition_value(t, self.caps.move_mode));
        self.set_style(el, "transition", value.as_deref());
    }

    fn add_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.element(el) {
            let _ = e.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.element(el) {
            let _ = e.class_list().remove_1(class);
        }
    }

    fn set_touch_action_none(&mut self, el: ElementHandle) {
        self.set_style(el, "touch-action", Some("none"));
    }

    fn scroll_by(&mut self, target: Scroller<ElementHandle>, delta: Vec2) {
        match target {
            Scroller::Window => self.window.scroll_by_with_x_and_y(delta.x, delta.y),
            Scroller::Element(h) => {
                if let Some(e) = self.element(h) {
                    e.scroll_by_with_x_and_y(delta.x, delta.y);
                }
            }
        }
    }

    fn listen(&mut self, scope: EventScope<ElementHandle>, kind: EventKind) {
        let Some(name) = kind.dom_name() else {
            return;
        };
        let Some(target) = self.target(scope) else {
            return;
        };
        let engine = self.engine.clone();
        let listener = Listener::new(move |event: Event| dispatch(&engine, scope, kind, &event));
        let options = AddEventListenerOptions::new();
        // Touch moves must stay cancelable to suppress native panning.
        options.set_passive(false);
        if target
            .add_event_listener_with_callback_and_add_event_listener_options(
                name,
                listener.as_ref().unchecked_ref(),
                &options,
            )
            .is_err()
        {
            log::warn!("failed to listen for `{name}` on {scope:?}");
            return;
        }
        if let Some(old) = self.listeners.insert((scope, kind), listener) {
            self.graveyard.push(Graveyard::Listener(old));
        }
    }

    fn unlisten(&mut self, scope: EventScope<ElementHandle>, kind: EventKind) {
        let Some(listener) = self.listeners.remove(&(scope, kind)) else {
            return;
        };
        if let (Some(name), Some(target)) = (kind.dom_name(), self.target(scope)) {
            let function: &Function = listener.as_ref().unchecked_ref();
            let _ = target.remove_event_listener_with_callback(name, function);
        }
        self.graveyard.push(Graveyard::Listener(listener));
    }

    fn set_timeout(&mut self, id: TimerId, ms: f64) {
        let engine = self.engine.clone();
        let callback = TimerCallback::new(move || {
            with_engine(&engine, |engine| {
                engine.host_mut().bury_timer(id);
                engine.handle_timer(id);
            });
        });
        #[expect(clippy::cast_possible_truncation, reason = "timeouts are short")]
        let delay = ms.max(0.0).round() as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay,
            ) {
            Ok(handle) => {
                self.timers.insert(id, (handle, callback));
            }
            Err(_) => log::warn!("failed to schedule timer {id:?}"),
        }
    }

    fn clear_timeout(&mut self, id: TimerId) {
        if let Some((handle, _)) = self.timers.get(&id) {
            self.window.clear_timeout_with_handle(*handle);
        }
        self.bury_timer(id);
    }

    fn request_frame(&mut self) {
        if self.frame_handle.is_some() {
            return;
        }
        let frame = self.frame.get_or_insert_with(|| {
            let engine = self.engine.clone();
            FrameCallback::new(move |now: f64| {
                with_engine(&engine, |engine| {
                    engine.host_mut().frame_handle = None;
                    engine.handle_frame(now);
                });
            })
        });
        match self
            .window
            .request_animation_frame(frame.as_ref().unchecked_ref())
        {
            Ok(handle) => self.frame_handle = Some(handle),
            Err(_) => log::warn!("requestAnimationFrame failed"),
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.frame_handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }
}
