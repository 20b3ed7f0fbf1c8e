// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted in-memory host for integration tests.
//!
//! Element `0` is the document body. Layout boxes are stored in page
//! coordinates; client rectangles subtract the page scroll and add the current
//! translation, like a browser would report them.

#![allow(dead_code, reason = "each test binary uses a different subset")]
#![allow(unreachable_pub, reason = "shared test module")]

use std::collections::{BTreeMap, HashSet};

use kurbo::{Point, Rect, Size, Vec2};
use understory_drag::{
    Capabilities, Engine, EventKind, EventResponse, EventScope, Host, InputEvent, InputFamily,
    MoveMode, Phase, PositionScheme, ScrollMetrics, Scroller, TimerId, Transition,
};

#[derive(Clone, Debug)]
pub struct Node {
    pub parent: Option<u32>,
    pub tag: &'static str,
    pub classes: Vec<String>,
    /// Untransformed border box, page coordinates.
    pub layout: Rect,
    pub translation: Vec2,
    pub scheme: PositionScheme,
    pub z: Option<i32>,
    pub transition: Option<Transition>,
    pub touch_action_none: bool,
    pub scroll: ScrollMetrics,
}

#[derive(Debug)]
pub struct FakeHost {
    pub nodes: Vec<Node>,
    pub caps: Capabilities,
    pub page_scroll: Vec2,
    pub viewport: Size,
    pub document: Size,
    pub listeners: HashSet<(EventScope<u32>, EventKind)>,
    pub timers: BTreeMap<TimerId, f64>,
    pub frame_requested: bool,
    pub writes: Vec<(u32, Point)>,
}

impl FakeHost {
    pub fn new() -> Self {
        let body = Node {
            parent: None,
            tag: "body",
            classes: Vec::new(),
            layout: Rect::new(0.0, 0.0, 1000.0, 1000.0),
            translation: Vec2::ZERO,
            scheme: PositionScheme::Static,
            z: None,
            transition: None,
            touch_action_none: false,
            scroll: ScrollMetrics::default(),
        };
        Self {
            nodes: vec![body],
            caps: Capabilities::default(),
            page_scroll: Vec2::ZERO,
            viewport: Size::new(1000.0, 1000.0),
            document: Size::new(1000.0, 1000.0),
            listeners: HashSet::new(),
            timers: BTreeMap::new(),
            frame_requested: false,
            writes: Vec::new(),
        }
    }

    /// Add an element; `desc` is a tag followed by `.class` parts, e.g. `div.item`.
    pub fn add(&mut self, parent: u32, desc: &str, layout: Rect) -> u32 {
        let mut parts = desc.split('.');
        let tag = match parts.next() {
            Some("button") => "button",
            Some("input") => "input",
            _ => "div",
        };
        self.nodes.push(Node {
            parent: Some(parent),
            tag,
            classes: parts.map(String::from).collect(),
            layout,
            translation: Vec2::ZERO,
            scheme: PositionScheme::Static,
            z: None,
            transition: None,
            touch_action_none: false,
            scroll: ScrollMetrics::default(),
        });
        u32::try_from(self.nodes.len() - 1).unwrap()
    }

    pub fn node(&self, el: u32) -> &Node {
        &self.nodes[el as usize]
    }

    pub fn node_mut(&mut self, el: u32) -> &mut Node {
        &mut self.nodes[el as usize]
    }

    /// Rendered top-left corner in page coordinates.
    pub fn rendered(&self, el: u32) -> Point {
        let n = self.node(el);
        n.layout.origin() + n.translation
    }

    pub fn is_listening(&self, scope: EventScope<u32>, kind: EventKind) -> bool {
        self.listeners.contains(&(scope, kind))
    }

    fn matches_simple(&self, el: u32, selector: &str) -> bool {
        let n = self.node(el);
        match selector.strip_prefix('.') {
            Some(class) => n.classes.iter().any(|c| c == class),
            None => n.tag == selector,
        }
    }
}

impl Host for FakeHost {
    type Element = u32;

    fn parent(&self, el: u32) -> Option<u32> {
        self.node(el).parent
    }

    fn matches(&self, el: u32, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .any(|s| self.matches_simple(el, s))
    }

    fn client_rect(&self, el: u32) -> Rect {
        let n = self.node(el);
        n.layout + n.translation - self.page_scroll
    }

    fn inner_rect(&self, el: u32) -> Rect {
        self.client_rect(el)
    }

    fn translation(&self, el: u32) -> Vec2 {
        self.node(el).translation
    }

    fn position_scheme(&self, el: u32) -> PositionScheme {
        self.node(el).scheme
    }

    fn page_scroll(&self) -> Vec2 {
        self.page_scroll
    }

    fn document_client_offset(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn document_size(&self) -> Size {
        self.document
    }

    fn scroll_metrics(&self, el: u32) -> ScrollMetrics {
        self.node(el).scroll
    }

    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn write_translation(&mut self, el: u32, translation: Vec2, _mode: MoveMode) {
        self.node_mut(el).translation = translation;
        self.writes.push((el, translation.to_point()));
    }

    fn write_page_offset(&mut self, el: u32, pos: Point) {
        let n = self.node_mut(el);
        n.layout = Rect::from_origin_size(pos - n.translation, n.layout.size());
        self.writes.push((el, pos));
    }

    fn set_position_scheme(&mut self, el: u32, scheme: PositionScheme) {
        self.node_mut(el).scheme = scheme;
    }

    fn z_index(&self, el: u32) -> Option<i32> {
        self.node(el).z
    }

    fn set_z_index(&mut self, el: u32, z: Option<i32>) {
        self.node_mut(el).z = z;
    }

    fn set_transition(&mut self, el: u32, transition: Option<&Transition>) {
        self.node_mut(el).transition = transition.cloned();
    }

    fn add_class(&mut self, el: u32, class: &str) {
        self.node_mut(el).classes.push(class.to_string());
    }

    fn remove_class(&mut self, el: u32, class: &str) {
        self.node_mut(el).classes.retain(|c| c != class);
    }

    fn set_touch_action_none(&mut self, el: u32) {
        self.node_mut(el).touch_action_none = true;
    }

    fn scroll_by(&mut self, target: Scroller<u32>, delta: Vec2) {
        match target {
            Scroller::Window => {
                let max = Vec2::new(
                    (self.document.width - self.viewport.width).max(0.0),
                    (self.document.height - self.viewport.height).max(0.0),
                );
                let next = self.page_scroll + delta;
                self.page_scroll = Vec2::new(next.x.clamp(0.0, max.x), next.y.clamp(0.0, max.y));
            }
            Scroller::Element(el) => {
                let s = &mut self.node_mut(el).scroll;
                let max = s.max_offset();
                let next = s.offset + delta;
                s.offset = Vec2::new(next.x.clamp(0.0, max.x), next.y.clamp(0.0, max.y));
            }
        }
    }

    fn listen(&mut self, scope: EventScope<u32>, kind: EventKind) {
        assert!(self.listeners.insert((scope, kind)), "listening twice");
    }

    fn unlisten(&mut self, scope: EventScope<u32>, kind: EventKind) {
        assert!(self.listeners.remove(&(scope, kind)), "not listening");
    }

    fn set_timeout(&mut self, id: TimerId, ms: f64) {
        self.timers.insert(id, ms);
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn cancel_frame(&mut self) {
        self.frame_requested = false;
    }
}

pub type TestEngine = Engine<FakeHost>;

/// Pointer start on `target`, delivered to the listener of `attached`.
pub fn pointer_down(
    engine: &mut TestEngine,
    attached: u32,
    target: u32,
    id: i32,
    at: (f64, f64),
    t: f64,
) -> EventResponse {
    let ev = InputEvent::pointer(Phase::Start, target, id, at.into(), t);
    engine.handle_event(EventScope::Element(attached), &ev)
}

/// Document-scoped pointer move/end/cancel.
pub fn pointer(engine: &mut TestEngine, phase: Phase, id: i32, at: (f64, f64), t: f64) -> EventResponse {
    let ev = InputEvent::pointer(phase, 0, id, at.into(), t);
    engine.handle_event(EventScope::Document, &ev)
}

/// Touch event on `el`, which is both target and listener scope.
pub fn touch(
    engine: &mut TestEngine,
    phase: Phase,
    el: u32,
    id: i32,
    at: (f64, f64),
    t: f64,
) -> EventResponse {
    let ev = InputEvent::touch(phase, el, [(id, at.into())], t);
    engine.handle_event(EventScope::Element(el), &ev)
}

/// Mouse start on `el`.
pub fn mouse_down(engine: &mut TestEngine, el: u32, at: (f64, f64), t: f64) -> EventResponse {
    let ev = InputEvent::mouse(Phase::Start, el, at.into(), t);
    engine.handle_event(EventScope::Element(el), &ev)
}

/// Run one animation frame if one was requested.
pub fn frame(engine: &mut TestEngine, now: f64) {
    if std::mem::take(&mut engine.host_mut().frame_requested) {
        engine.handle_frame(now);
    }
}

/// Fire every pending timer, oldest first; returns their durations.
pub fn fire_timers(engine: &mut TestEngine) -> Vec<f64> {
    let pending: Vec<_> = std::mem::take(&mut engine.host_mut().timers)
        .into_iter()
        .collect();
    for (id, _) in &pending {
        engine.handle_timer(*id);
    }
    pending.into_iter().map(|(_, ms)| ms).collect()
}

pub fn start_kind(family: InputFamily) -> EventKind {
    EventKind::Input(family, Phase::Start)
}

/// A body with one 50×50 box at `(x, y)`.
pub fn single_box(x: f64, y: f64) -> (FakeHost, u32) {
    let mut host = FakeHost::new();
    let el = host.add(0, "div.box", Rect::new(x, y, x + 50.0, y + 50.0));
    (host, el)
}
