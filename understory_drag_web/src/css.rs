// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS value parsing and formatting shared by the DOM host.

use alloc::format;
use alloc::string::String;

use kurbo::Vec2;
use understory_drag::{MoveMode, PositionScheme, Transition};

/// Translation part of a computed `transform` value.
///
/// Understands `none`, `matrix(a, b, c, d, tx, ty)` and the sixteen-value
/// `matrix3d(...)` form; anything else reads as no translation.
pub(crate) fn parse_translation(transform: &str) -> Vec2 {
    let transform = transform.trim();
    let (args, tx, ty) = if let Some(rest) = transform.strip_prefix("matrix3d(") {
        (rest, 12, 13)
    } else if let Some(rest) = transform.strip_prefix("matrix(") {
        (rest, 4, 5)
    } else {
        return Vec2::ZERO;
    };
    let args = args.trim_end_matches(')');
    let value = |i: usize| {
        args.split(',')
            .nth(i)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    Vec2::new(value(tx), value(ty))
}

/// Pixel length such as `12.5px`; `auto` and unparsable values read as zero.
pub(crate) fn parse_px(value: &str) -> f64 {
    value
        .trim()
        .trim_end_matches("px")
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .unwrap_or(0.0)
}

/// Inline `transform` for a translation.
pub(crate) fn transform_value(translation: Vec2, mode: MoveMode) -> String {
    match mode {
        MoveMode::Transform2d => format!("translate({}px, {}px)", translation.x, translation.y),
        MoveMode::Transform3d | MoveMode::Offset => {
            format!("translate3d({}px, {}px, 0)", translation.x, translation.y)
        }
    }
}

/// Inline `transition` animating whichever properties the move mode writes.
pub(crate) fn transition_value(transition: &Transition, mode: MoveMode) -> String {
    let Transition {
        duration_ms,
        easing,
    } = transition;
    if mode.is_transform() {
        format!("transform {duration_ms}ms {easing}")
    } else {
        format!("left {duration_ms}ms {easing}, top {duration_ms}ms {easing}")
    }
}

pub(crate) fn parse_position(value: &str) -> PositionScheme {
    match value.trim() {
        "relative" => PositionScheme::Relative,
        "absolute" => PositionScheme::Absolute,
        "fixed" => PositionScheme::Fixed,
        "sticky" => PositionScheme::Sticky,
        _ => PositionScheme::Static,
    }
}

pub(crate) const fn position_value(scheme: PositionScheme) -> &'static str {
    match scheme {
        PositionScheme::Static => "static",
        PositionScheme::Relative => "relative",
        PositionScheme::Absolute => "absolute",
        PositionScheme::Fixed => "fixed",
        PositionScheme::Sticky => "sticky",
    }
}
