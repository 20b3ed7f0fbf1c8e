// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal in-crate host for unit tests: a fixed element tree with one class
//! per node and a log of listener edges. Geometry is all zero.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};

use crate::host::{
    Capabilities, Host, MoveMode, PositionScheme, ScrollMetrics, Scroller, TimerId, Transition,
};
use crate::types::{EventKind, EventScope};

#[derive(Default)]
pub(crate) struct Tree {
    /// `(parent, class)` per element index.
    pub(crate) nodes: Vec<(Option<u32>, &'static str)>,
    /// `(listening, scope, kind)` per listener edge.
    pub(crate) log: Vec<(bool, EventScope<u32>, EventKind)>,
}

impl Tree {
    pub(crate) fn new(nodes: &[(Option<u32>, &'static str)]) -> Self {
        Self {
            nodes: nodes.to_vec(),
            log: Vec::new(),
        }
    }
}

impl Host for Tree {
    type Element = u32;
    fn parent(&self, el: u32) -> Option<u32> {
        self.nodes.get(el as usize).and_then(|n| n.0)
    }
    fn matches(&self, el: u32, selector: &str) -> bool {
        let Some((_, class)) = self.nodes.get(el as usize) else {
            return false;
        };
        selector
            .split(',')
            .map(str::trim)
            .any(|s| s.strip_prefix('.').unwrap_or(s) == *class)
    }
    fn client_rect(&self, _: u32) -> Rect {
        Rect::ZERO
    }
    fn inner_rect(&self, _: u32) -> Rect {
        Rect::ZERO
    }
    fn translation(&self, _: u32) -> Vec2 {
        Vec2::ZERO
    }
    fn position_scheme(&self, _: u32) -> PositionScheme {
        PositionScheme::Relative
    }
    fn page_scroll(&self) -> Vec2 {
        Vec2::ZERO
    }
    fn document_client_offset(&self) -> Vec2 {
        Vec2::ZERO
    }
    fn viewport_size(&self) -> Size {
        Size::ZERO
    }
    fn document_size(&self) -> Size {
        Size::ZERO
    }
    fn scroll_metrics(&self, _: u32) -> ScrollMetrics {
        ScrollMetrics::default()
    }
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
    fn write_translation(&mut self, _: u32, _: Vec2, _: MoveMode) {}
    fn write_page_offset(&mut self, _: u32, _: Point) {}
    fn set_position_scheme(&mut self, _: u32, _: PositionScheme) {}
    fn z_index(&self, _: u32) -> Option<i32> {
        None
    }
    fn set_z_index(&mut self, _: u32, _: Option<i32>) {}
    fn set_transition(&mut self, _: u32, _: Option<&Transition>) {}
    fn add_class(&mut self, _: u32, _: &str) {}
    fn remove_class(&mut self, _: u32, _: &str) {}
    fn set_touch_action_none(&mut self, _: u32) {}
    fn scroll_by(&mut self, _: Scroller<u32>, _: Vec2) {}
    fn listen(&mut self, scope: EventScope<u32>, kind: EventKind) {
        self.log.push((true, scope, kind));
    }
    fn unlisten(&mut self, scope: EventScope<u32>, kind: EventKind) {
        self.log.push((false, scope, kind));
    }
    fn set_timeout(&mut self, _: TimerId, _: f64) {}
    fn clear_timeout(&mut self, _: TimerId) {}
    fn request_frame(&mut self) {}
    fn cancel_frame(&mut self) {}
}
