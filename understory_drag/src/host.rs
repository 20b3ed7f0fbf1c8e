// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host interface: everything the engine needs from the DOM (or any other
//! element tree) behind one trait.
//!
//! The engine never touches elements directly. It asks the [`Host`] for
//! geometry, writes positions and styles through it, and asks it to install
//! listeners, timers, and animation frames. Hosts call back into
//! [`Engine`](crate::Engine) with the resulting events.
//!
//! Coordinates follow the DOM conventions:
//! - "client" rectangles are relative to the viewport (`getBoundingClientRect`);
//! - "page" positions are relative to the document origin (`pageX`/`pageY`).

use alloc::string::String;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Point, Rect, Size, Vec2};

use crate::types::{EventKind, EventScope};

/// How the environment positions a dragged element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MoveMode {
    /// `translate3d(x, y, 0)` transforms.
    #[default]
    Transform3d,
    /// `translate(x, y)` transforms.
    Transform2d,
    /// Absolute `left`/`top` offsets.
    Offset,
}

impl MoveMode {
    /// Returns `true` for the transform-based modes.
    pub const fn is_transform(self) -> bool {
        matches!(self, Self::Transform3d | Self::Transform2d)
    }

    /// Pick the best mode supported by the environment: 3D transforms, then 2D
    /// transforms, then plain offsets.
    pub const fn detect(has_3d: bool, has_2d: bool) -> Self {
        if has_3d {
            Self::Transform3d
        } else if has_2d {
            Self::Transform2d
        } else {
            Self::Offset
        }
    }
}

/// Environment capabilities, resolved once by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Positioning mode.
    pub move_mode: MoveMode,
    /// CSS transitions are available (animated revert).
    pub transitions: bool,
    /// Pointer Events are available; otherwise mouse + touch are used.
    pub pointer_events: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            move_mode: MoveMode::Transform3d,
            transitions: true,
            pointer_events: true,
        }
    }
}

/// Computed CSS `position` of an element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum PositionScheme {
    /// `static`: cannot be moved until switched to `relative`.
    #[default]
    Static,
    /// `relative`.
    Relative,
    /// `absolute`.
    Absolute,
    /// `fixed`: viewport-relative, unaffected by page scroll.
    Fixed,
    /// `sticky`.
    Sticky,
}

/// Scroll state of a scrollable element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// `scrollLeft`/`scrollTop`.
    pub offset: Vec2,
    /// `clientWidth`/`clientHeight`.
    pub client: Size,
    /// `scrollWidth`/`scrollHeight`.
    pub scroll: Size,
    /// `offsetWidth`/`offsetHeight`.
    pub outer: Size,
}

impl ScrollMetrics {
    /// Largest reachable scroll offset on each axis.
    pub fn max_offset(&self) -> Vec2 {
        Vec2::new(
            (self.scroll.width - self.client.width).max(0.0),
            (self.scroll.height - self.client.height).max(0.0),
        )
    }
}

/// Something the engine can scroll.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scroller<E> {
    /// The page.
    Window,
    /// A scrollable element.
    Element(E),
}

/// A CSS transition applied to animate a revert.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// CSS easing function.
    pub easing: String,
}

/// Handle for a timer scheduled through [`Host::set_timeout`].
///
/// Ids are never reused within one engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    /// Raw id, for hosts that need to key their own tables.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The element tree, geometry provider, style sink, and scheduler the engine
/// runs against.
pub trait Host {
    /// Stable element identity.
    type Element: Copy + Eq + Hash + Debug;

    // --- tree ---

    /// Parent element, or `None` at the root.
    fn parent(&self, el: Self::Element) -> Option<Self::Element>;
    /// Whether `el` matches a selector.
    fn matches(&self, el: Self::Element, selector: &str) -> bool;

    // --- geometry ---

    /// Viewport-relative border box.
    fn client_rect(&self, el: Self::Element) -> Rect;
    /// Viewport-relative padding box (border box minus borders).
    fn inner_rect(&self, el: Self::Element) -> Rect;
    /// Translation component of the element's current transform.
    fn translation(&self, el: Self::Element) -> Vec2;
    /// Computed `position`.
    fn position_scheme(&self, el: Self::Element) -> PositionScheme;
    /// Window scroll offset.
    fn page_scroll(&self) -> Vec2;
    /// `clientLeft`/`clientTop` of the document element.
    fn document_client_offset(&self) -> Vec2;
    /// Viewport size (`clientWidth`/`clientHeight` of the document element).
    fn viewport_size(&self) -> Size;
    /// Full document size.
    fn document_size(&self) -> Size;
    /// Scroll metrics of an element.
    fn scroll_metrics(&self, el: Self::Element) -> ScrollMetrics;
    /// Environment capabilities.
    fn capabilities(&self) -> Capabilities;

    // --- writes ---

    /// Set the element's transform to a pure translation.
    fn write_translation(&mut self, el: Self::Element, translation: Vec2, mode: MoveMode);
    /// Position the element so its border box starts at a page position.
    fn write_page_offset(&mut self, el: Self::Element, pos: Point);
    /// Override the computed `position`.
    fn set_position_scheme(&mut self, el: Self::Element, scheme: PositionScheme);
    /// Inline `z-index`, if any.
    fn z_index(&self, el: Self::Element) -> Option<i32>;
    /// Set or clear the inline `z-index`.
    fn set_z_index(&mut self, el: Self::Element, z: Option<i32>);
    /// Set or clear the inline transition.
    fn set_transition(&mut self, el: Self::Element, transition: Option<&Transition>);
    /// Add a class name.
    fn add_class(&mut self, el: Self::Element, class: &str);
    /// Remove a class name.
    fn remove_class(&mut self, el: Self::Element, class: &str);
    /// Disable native touch panning on the element.
    fn set_touch_action_none(&mut self, el: Self::Element);
    /// Scroll the page or an element by a delta.
    fn scroll_by(&mut self, target: Scroller<Self::Element>, delta: Vec2);

    // --- scheduling ---

    /// Start delivering `kind` events from `scope` to the engine.
    fn listen(&mut self, scope: EventScope<Self::Element>, kind: EventKind);
    /// Stop delivering `kind` events from `scope`.
    fn unlisten(&mut self, scope: EventScope<Self::Element>, kind: EventKind);
    /// Call [`Engine::handle_timer`](crate::Engine::handle_timer) with `id` after `ms`.
    fn set_timeout(&mut self, id: TimerId, ms: f64);
    /// Cancel a pending timer.
    fn clear_timeout(&mut self, id: TimerId);
    /// Call [`Engine::handle_frame`](crate::Engine::handle_frame) on the next display refresh.
    fn request_frame(&mut self);
    /// Cancel a pending frame request.
    fn cancel_frame(&mut self);
}

/// Page-relative box of an element: its client rect shifted by page scroll
/// and the document element's client offset.
pub(crate) fn page_rect<H: Host>(host: &H, client: Rect) -> Rect {
    client + (host.page_scroll() - host.document_client_offset())
}

/// Walk from `el` toward the root and return the first node matching
/// `selector`.
pub(crate) fn closest<H: Host>(host: &H, el: H::Element, selector: &str) -> Option<H::Element> {
    let mut node = Some(el);
    while let Some(n) = node {
        if host.matches(n, selector) {
            return Some(n);
        }
        node = host.parent(n);
    }
    None
}

/// Like [`closest`], but stops before reaching `top`.
pub(crate) fn closest_inside<H: Host>(
    host: &H,
    el: H::Element,
    top: H::Element,
    selector: &str,
) -> Option<H::Element> {
    let mut node = Some(el);
    while let Some(n) = node {
        if n == top {
            return None;
        }
        if host.matches(n, selector) {
            return Some(n);
        }
        node = host.parent(n);
    }
    None
}

/// Returns `true` if `ancestor` is a proper ancestor of `el`.
pub(crate) fn is_inside<H: Host>(host: &H, el: H::Element, ancestor: H::Element) -> bool {
    let mut node = host.parent(el);
    while let Some(n) = node {
        if n == ancestor {
            return true;
        }
        node = host.parent(n);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_mode_prefers_3d() {
        assert_eq!(MoveMode::detect(true, true), MoveMode::Transform3d);
        assert_eq!(MoveMode::detect(false, true), MoveMode::Transform2d);
        assert_eq!(MoveMode::detect(false, false), MoveMode::Offset);
        assert!(!MoveMode::Offset.is_transform());
    }

    #[test]
    fn scroll_metrics_extents() {
        let m = ScrollMetrics {
            offset: Vec2::new(10.0, 0.0),
            client: Size::new(100.0, 100.0),
            scroll: Size::new(300.0, 100.0),
            outer: Size::new(100.0, 100.0),
        };
        assert_eq!(m.max_offset(), Vec2::new(200.0, 0.0));
    }
}
