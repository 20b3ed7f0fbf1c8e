// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constraint and motion math.
//!
//! Everything here is a pure function of the press-time [`Metrics`] and the
//! current pointer sample, so it is tested without a host. Constraints apply
//! in a fixed order:
//! 1. axis lock,
//! 2. grid snap (or hold-offset adjustment when no grid is set),
//! 3. positioning mode (transform translation or page offset),
//! 4. container clamping,
//! 5. auto-scroll, driven separately by [`scroll_step`].

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size, Vec2};

use crate::host::{MoveMode, PositionScheme};
use crate::options::{Axis, HoldOffset, Sides};

/// Geometry captured when a contact goes down.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    /// Page-relative border box at press.
    pub origin: Rect,
    /// Transform translation at press.
    pub translation: Vec2,
    /// Window scroll at press.
    pub page_scroll: Vec2,
    /// Pointer position at press.
    pub press: Point,
    /// Pointer offset from the box's top-left corner at press.
    pub grab: Vec2,
    /// Where the pointer is pinned relative to the box's top-left corner.
    pub hold: Vec2,
    /// Computed `position` at press.
    pub scheme: PositionScheme,
}

impl Metrics {
    /// Capture metrics for a press at `press` on a box at `origin`.
    pub fn capture(
        origin: Rect,
        translation: Vec2,
        page_scroll: Vec2,
        press: Point,
        hold: Option<HoldOffset>,
        scheme: PositionScheme,
    ) -> Self {
        let grab = press - origin.origin();
        Self {
            origin,
            translation,
            page_scroll,
            press,
            grab,
            hold: hold_offset(hold, origin.size(), grab),
            scheme,
        }
    }

    /// The resting position, in the units of `mode`.
    pub fn rest_position(&self, mode: MoveMode) -> Point {
        if mode.is_transform() {
            self.translation.to_point()
        } else {
            self.origin.origin()
        }
    }
}

/// A computed frame: what to write and where the box ends up.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Motion {
    /// Translation (transform modes) or page position (offset mode).
    pub position: Point,
    /// Page-relative border box after the move.
    pub bounds: Rect,
}

/// Per-drag inputs of [`next_position`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Constraints {
    /// Movement axis.
    pub axis: Axis,
    /// Grid cell, if snapping.
    pub grid: Option<Size>,
    /// Positioning mode.
    pub mode: MoveMode,
    /// Extra displacement from scroll compensation.
    pub shift: Vec2,
}

/// Resolve a hold offset against the element size.
///
/// Unset axes keep the grab point; non-finite results become zero.
pub fn hold_offset(hold: Option<HoldOffset>, size: Size, grab: Vec2) -> Vec2 {
    let Some(hold) = hold else {
        return grab;
    };
    let resolve = |value: Option<f64>, extent: f64, fallback: f64| match value {
        None => fallback,
        Some(v) => {
            let v = if hold.percent { v * extent / 100.0 } else { v };
            if v.is_finite() { v } else { 0.0 }
        }
    };
    Vec2::new(
        resolve(hold.left, size.width, grab.x),
        resolve(hold.top, size.height, grab.y),
    )
}

/// Snap one axis: nothing until past a whole cell, then whole cells.
pub fn snap(delta: f64, cell: f64) -> f64 {
    if cell > 0.0 && delta.abs() > cell {
        (delta / cell).round() * cell
    } else if cell > 0.0 {
        0.0
    } else {
        delta
    }
}

/// Compute the unclamped frame for a pointer at `pointer`.
pub fn next_position(metrics: &Metrics, pointer: Point, c: &Constraints) -> Motion {
    let raw = pointer - metrics.press;
    let mut delta = match c.grid {
        Some(cell) => Vec2::new(snap(raw.x, cell.width), snap(raw.y, cell.height)),
        None => raw - (metrics.hold - metrics.grab),
    };
    if !c.axis.allows_x() {
        delta.x = 0.0;
    }
    if !c.axis.allows_y() {
        delta.y = 0.0;
    }
    // The shift only corrects the written position; `bounds` stays where the
    // element sits on the page, which is what containment compares against.
    Motion {
        position: metrics.rest_position(c.mode) + delta + c.shift,
        bounds: metrics.origin + delta,
    }
}

/// Clamp a frame into `container`, side by side (left, right, top, bottom).
///
/// Sides on a locked axis are skipped.
pub fn clamp(mut motion: Motion, container: Rect, sides: Sides, axis: Axis) -> Motion {
    let nudge = |motion: &mut Motion, d: Vec2| {
        motion.position += d;
        motion.bounds = motion.bounds + d;
    };
    if axis.allows_x() {
        if sides.contains(Sides::LEFT) && motion.bounds.x0 <= container.x0 {
            let d = Vec2::new(container.x0 - motion.bounds.x0, 0.0);
            nudge(&mut motion, d);
        }
        if sides.contains(Sides::RIGHT) && motion.bounds.x1 >= container.x1 {
            let d = Vec2::new(container.x1 - motion.bounds.x1, 0.0);
            nudge(&mut motion, d);
        }
    }
    if axis.allows_y() {
        if sides.contains(Sides::TOP) && motion.bounds.y0 <= container.y0 {
            let d = Vec2::new(0.0, container.y0 - motion.bounds.y0);
            nudge(&mut motion, d);
        }
        if sides.contains(Sides::BOTTOM) && motion.bounds.y1 >= container.y1 {
            let d = Vec2::new(0.0, container.y1 - motion.bounds.y1);
            nudge(&mut motion, d);
        }
    }
    motion
}

/// Shrink `container` so a box starting at `origin` can only stop on whole
/// grid steps.
pub fn grid_aligned_bounds(container: Rect, origin: Rect, cell: Size) -> Rect {
    let inset = |edge: f64, from: f64, step: f64| {
        if step > 0.0 { ((edge - from) % step).abs() } else { 0.0 }
    };
    Rect::new(
        container.x0 + inset(container.x0, origin.x0, cell.width),
        container.y0 + inset(container.y0, origin.y0, cell.height),
        container.x1 - inset(container.x1, origin.x1, cell.width),
        container.y1 - inset(container.y1, origin.y1, cell.height),
    )
}

/// A scrollable region seen from the page.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScrollRegion {
    /// Visible rectangle.
    pub view: Rect,
    /// Current scroll offset.
    pub offset: Vec2,
    /// Largest scroll offset.
    pub max: Vec2,
}

/// Scroll delta for one tick when `probe` is near an edge of `region`.
///
/// Never scrolls past the region's extents. The leading edge (left, top) wins
/// when both edges are within reach.
pub fn scroll_step(probe: Rect, region: &ScrollRegion, sensitivity: f64, speed: f64) -> Vec2 {
    let axis = |offset: f64, max: f64, lead: f64, trail: f64| {
        if offset > 0.0 && lead < sensitivity {
            -speed.min(offset)
        } else if offset < max && trail < sensitivity {
            speed.min(max - offset)
        } else {
            0.0
        }
    };
    let v = region.view;
    Vec2::new(
        axis(region.offset.x, region.max.x, probe.x0 - v.x0, v.x1 - probe.x1),
        axis(region.offset.y, region.max.y, probe.y0 - v.y0, v.y1 - probe.y1),
    )
}

/// Leaky-bucket frame limiter.
///
/// The render loop keeps running at display rate; this only decides which
/// frames write.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameThrottle {
    interval: Option<f64>,
    last: Option<f64>,
}

impl FrameThrottle {
    /// Limit to `fps` writes per second; `None` or a non-positive rate is
    /// unlimited.
    pub fn new(fps: Option<f64>) -> Self {
        Self {
            interval: fps.filter(|f| *f > 0.0).map(|f| 1000.0 / f),
            last: None,
        }
    }

    /// Returns `true` if the frame at `now` should write.
    pub fn ready(&mut self, now: f64) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };
        let Some(last) = self.last else {
            self.last = Some(now);
            return true;
        };
        let elapsed = now - last;
        if elapsed > interval {
            self.last = Some(now - elapsed % interval);
            true
        } else {
            false
        }
    }
}
