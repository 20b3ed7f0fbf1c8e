// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag configuration.
//!
//! [`Options`] is resolved once per attachment by overriding
//! [`Options::default`]. Each overloaded setting is its own sum type rather than
//! a loosely typed field, e.g. [`Container`] instead of "bool, string, or
//! element".
//!
//! Options can also be read and written by name at runtime through
//! [`Options::get`] and [`Options::set`], using the option names of the
//! original configuration surface (`"axis"`, `"zMode"`, `"containerSides"`, ...).
//!
//! ```
//! use understory_drag::options::{Axis, OptionValue, Options};
//!
//! let mut opts = Options::<u32>::default().with_axis(Axis::X).with_distance(10.0);
//! assert_eq!(opts.get("axis"), Ok(OptionValue::Axis(Axis::X)));
//!
//! opts.set("distance", OptionValue::Distance(None)).unwrap();
//! assert_eq!(opts.distance, None);
//! assert!(opts.set("axis", OptionValue::Distance(None)).is_err());
//! ```

use alloc::string::{String, ToString};
use core::str::FromStr;

use kurbo::Size;

use crate::error::ControlError;

/// Revert duration used by [`Revert::On`].
pub const DEFAULT_REVERT_MS: f64 = 300.0;
/// Revert easing used when none is given.
pub const DEFAULT_REVERT_EASING: &str = "ease-in-out";
/// Hold time used by [`Delay::On`].
pub const DEFAULT_DELAY_MS: f64 = 300.0;

/// Movement axis restriction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal only.
    X,
    /// Vertical only.
    Y,
    /// Free movement.
    #[default]
    Both,
}

impl Axis {
    /// Horizontal movement is allowed.
    pub const fn allows_x(self) -> bool {
        !matches!(self, Self::Y)
    }

    /// Vertical movement is allowed.
    pub const fn allows_y(self) -> bool {
        !matches!(self, Self::X)
    }
}

/// Z-index policy while dragging.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ZMode {
    /// Pin the element to this z-index; it is left in place after the drag.
    Fixed(i32),
    /// Raise above every previously dragged element, restore afterwards.
    #[default]
    Swap,
}

/// Containment bounds for the dragged element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Container<E> {
    /// Unbounded.
    #[default]
    None,
    /// The drag element's parent.
    Parent,
    /// The closest ancestor matching a selector.
    Closest(String),
    /// The whole document.
    Document,
    /// The visible viewport.
    Window,
    /// A specific element.
    Element(E),
}

bitflags::bitflags! {
    /// Container sides that constrain movement.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        /// Left edge.
        const LEFT   = 0b0001;
        /// Top edge.
        const TOP    = 0b0010;
        /// Right edge.
        const RIGHT  = 0b0100;
        /// Bottom edge.
        const BOTTOM = 0b1000;
    }
}

impl Default for Sides {
    fn default() -> Self {
        Self::all()
    }
}

impl Sides {
    /// Build from a `[left, top, right, bottom]` enable mask.
    pub fn from_mask(mask: [bool; 4]) -> Self {
        let mut sides = Self::empty();
        sides.set(Self::LEFT, mask[0]);
        sides.set(Self::TOP, mask[1]);
        sides.set(Self::RIGHT, mask[2]);
        sides.set(Self::BOTTOM, mask[3]);
        sides
    }
}

/// Auto-scroll target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ScrollTarget<E> {
    /// No auto-scroll.
    None,
    /// Scroll the page.
    #[default]
    Window,
    /// The drag element's parent.
    Parent,
    /// The closest ancestor matching a selector.
    Closest(String),
    /// A specific element.
    Element(E),
}

/// What the auto-scroll edge test measures.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollMode {
    /// The live pointer position.
    #[default]
    Pointer,
    /// The dragged element's bounds.
    Element,
}

/// Where the pointer is pinned on the element while dragging.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HoldOffset {
    /// Horizontal offset from the element's left edge; `None` keeps the grab point.
    pub left: Option<f64>,
    /// Vertical offset from the element's top edge; `None` keeps the grab point.
    pub top: Option<f64>,
    /// Interpret `left`/`top` as percentages of the element size.
    pub percent: bool,
}

/// Snap-back after release.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Revert {
    /// Stay where dropped.
    #[default]
    Off,
    /// Revert over [`DEFAULT_REVERT_MS`].
    On,
    /// Revert over a duration in milliseconds.
    Ms(f64),
    /// Revert with an explicit duration and easing.
    Eased {
        /// Duration; [`DEFAULT_REVERT_MS`] when `None`.
        ms: Option<f64>,
        /// CSS easing function.
        easing: String,
    },
}

impl Revert {
    /// Duration and easing, or `None` when reverting is off.
    pub fn timing(&self) -> Option<(f64, &str)> {
        match self {
            Self::Off => None,
            Self::On => Some((DEFAULT_REVERT_MS, DEFAULT_REVERT_EASING)),
            Self::Ms(ms) => Some((*ms, DEFAULT_REVERT_EASING)),
            Self::Eased { ms, easing } => Some((ms.unwrap_or(DEFAULT_REVERT_MS), easing.as_str())),
        }
    }
}

/// Minimum hold time before a drag may begin.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Delay {
    /// No delay.
    #[default]
    Off,
    /// Wait [`DEFAULT_DELAY_MS`].
    On,
    /// Wait this many milliseconds.
    Ms(f64),
}

impl Delay {
    /// Delay duration, if any.
    pub fn ms(self) -> Option<f64> {
        match self {
            Self::Off => None,
            Self::On => Some(DEFAULT_DELAY_MS),
            Self::Ms(ms) => Some(ms),
        }
    }
}

/// Snap increment.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Grid<E> {
    /// No snapping.
    #[default]
    Off,
    /// Fixed cell size.
    Cells(Size),
    /// Cell size taken from an element's box at drag start.
    Element(E),
}

/// Surrogate element to drag instead of the original.
///
/// Accepted and stored, but surrogate dragging is not performed: the original
/// element is always the one moved. The default is [`Helper::Original`], so
/// reading the option back before setting it yields `Original`. Surrogates
/// produced by a callback have no variant here; a host that needs one builds
/// the element itself and attaches the drag to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Helper {
    /// Drag the element itself.
    #[default]
    Original,
    /// A sized surrogate.
    Surrogate,
    /// A clone of the element.
    Clone,
    /// A surrogate built from HTML.
    Html(String),
}

/// Per-attachment drag configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Options<E> {
    /// Selector of descendants the attached element delegates drags to.
    pub delegate: Option<String>,
    /// Movement axis.
    pub axis: Axis,
    /// Z-index policy.
    pub z_mode: ZMode,
    /// Containment.
    pub container: Container<E>,
    /// Container sides that apply.
    pub container_sides: Sides,
    /// Auto-scroll target.
    pub scroll: ScrollTarget<E>,
    /// Auto-scroll edge test.
    pub scroll_mode: ScrollMode,
    /// Pixels scrolled per tick.
    pub scroll_speed: f64,
    /// Distance from an edge that triggers scrolling.
    pub scroll_sensitivity: f64,
    /// Grip selector: drags may only start inside it.
    pub holder: Option<String>,
    /// Pointer pin point.
    pub hold_offset: Option<HoldOffset>,
    /// Extra selector whose matches veto drag start.
    pub unholdables: Option<String>,
    /// Apply the default unholdable selector as well.
    pub unhold_defaults: bool,
    /// Snap-back after release.
    pub revert: Revert,
    /// Minimum hold time.
    pub delay: Delay,
    /// Minimum travel in pixels.
    pub distance: Option<f64>,
    /// Stop listening for moves if none qualifies within this many milliseconds.
    pub time_out: Option<f64>,
    /// Interval of the `on_drag_with_freq` hook.
    pub frequency: Option<f64>,
    /// Snap increment.
    pub grid: Grid<E>,
    /// Surrogate element.
    pub helper: Helper,
    /// Render frame-rate cap.
    pub render_fps: Option<f64>,
    /// Call the native `stopPropagation` on handled events.
    pub stop_propagation: bool,
    /// Call the native `preventDefault` on handled events.
    pub prevent_default: bool,
}

impl<E> Default for Options<E> {
    fn default() -> Self {
        Self {
            delegate: None,
            axis: Axis::Both,
            z_mode: ZMode::Swap,
            container: Container::None,
            container_sides: Sides::all(),
            scroll: ScrollTarget::Window,
            scroll_mode: ScrollMode::Pointer,
            scroll_speed: 20.0,
            scroll_sensitivity: 20.0,
            holder: None,
            hold_offset: None,
            unholdables: None,
            unhold_defaults: true,
            revert: Revert::Off,
            delay: Delay::Off,
            distance: None,
            time_out: None,
            frequency: None,
            grid: Grid::Off,
            helper: Helper::Original,
            render_fps: None,
            stop_propagation: false,
            prevent_default: true,
        }
    }
}

impl<E> Options<E> {
    /// Delegate drags to descendants matching `selector`.
    #[must_use]
    pub fn with_delegate(mut self, selector: impl Into<String>) -> Self {
        self.delegate = Some(selector.into());
        self
    }

    /// Restrict the movement axis.
    #[must_use]
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Set the z-index policy.
    #[must_use]
    pub fn with_z_mode(mut self, z_mode: ZMode) -> Self {
        self.z_mode = z_mode;
        self
    }

    /// Constrain movement to a container.
    #[must_use]
    pub fn with_container(mut self, container: Container<E>) -> Self {
        self.container = container;
        self
    }

    /// Select which container sides apply.
    #[must_use]
    pub fn with_container_sides(mut self, sides: Sides) -> Self {
        self.container_sides = sides;
        self
    }

    /// Set the auto-scroll target.
    #[must_use]
    pub fn with_scroll(mut self, scroll: ScrollTarget<E>) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set the auto-scroll edge test.
    #[must_use]
    pub fn with_scroll_mode(mut self, mode: ScrollMode) -> Self {
        self.scroll_mode = mode;
        self
    }

    /// Set auto-scroll speed and trigger distance.
    #[must_use]
    pub fn with_scroll_tuning(mut self, speed: f64, sensitivity: f64) -> Self {
        self.scroll_speed = speed;
        self.scroll_sensitivity = sensitivity;
        self
    }

    /// Only start drags inside elements matching `selector`.
    #[must_use]
    pub fn with_holder(mut self, selector: impl Into<String>) -> Self {
        self.holder = Some(selector.into());
        self
    }

    /// Pin the pointer to a point on the element.
    #[must_use]
    pub fn with_hold_offset(mut self, hold: HoldOffset) -> Self {
        self.hold_offset = Some(hold);
        self
    }

    /// Add a selector whose matches veto drag start.
    #[must_use]
    pub fn with_unholdables(mut self, selector: impl Into<String>) -> Self {
        self.unholdables = Some(selector.into());
        self
    }

    /// Set the snap-back behavior.
    #[must_use]
    pub fn with_revert(mut self, revert: Revert) -> Self {
        self.revert = revert;
        self
    }

    /// Require a minimum hold time.
    #[must_use]
    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = delay;
        self
    }

    /// Require a minimum travel distance.
    #[must_use]
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Give up on a press that does not start dragging in time.
    #[must_use]
    pub fn with_time_out(mut self, ms: f64) -> Self {
        self.time_out = Some(ms);
        self
    }

    /// Fire `on_drag_with_freq` at most once per interval.
    #[must_use]
    pub fn with_frequency(mut self, ms: f64) -> Self {
        self.frequency = Some(ms);
        self
    }

    /// Snap to a grid.
    #[must_use]
    pub fn with_grid(mut self, grid: Grid<E>) -> Self {
        self.grid = grid;
        self
    }

    /// Cap the render frame rate.
    #[must_use]
    pub fn with_render_fps(mut self, fps: f64) -> Self {
        self.render_fps = Some(fps);
        self
    }

    /// Toggle native `stopPropagation`/`preventDefault`.
    #[must_use]
    pub fn with_native_suppression(mut self, stop_propagation: bool, prevent_default: bool) -> Self {
        self.stop_propagation = stop_propagation;
        self.prevent_default = prevent_default;
        self
    }
}

macro_rules! option_names {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Name of a configurable option.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum OptionName {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl OptionName {
            /// All option names.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// The option's configuration name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }

        impl FromStr for OptionName {
            type Err = ControlError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)*
                    _ => Err(ControlError::UnknownOption(s.to_string())),
                }
            }
        }
    };
}

option_names! {
    Delegate => "delegate",
    Axis => "axis",
    ZMode => "zMode",
    Container => "container",
    ContainerSides => "containerSides",
    Scroll => "scroll",
    ScrollMode => "scrollMode",
    ScrollSpeed => "scrollSpeed",
    ScrollSensitivity => "scrollSensitivity",
    Holder => "holder",
    HoldOffset => "holdOffset",
    Unholdables => "unholdables",
    UnholdDefaults => "unholdDefaults",
    Revert => "revert",
    Delay => "delay",
    Distance => "distance",
    TimeOut => "timeOut",
    Frequency => "frequency",
    Grid => "grid",
    Helper => "helper",
    RenderFps => "renderFps",
    StopPropagation => "stopPropagation",
    PreventDefault => "preventDefault",
}

/// A typed option value for runtime get/set.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "each variant carries the option of the same name")]
pub enum OptionValue<E> {
    Delegate(Option<String>),
    Axis(Axis),
    ZMode(ZMode),
    Container(Container<E>),
    ContainerSides(Sides),
    Scroll(ScrollTarget<E>),
    ScrollMode(ScrollMode),
    ScrollSpeed(f64),
    ScrollSensitivity(f64),
    Holder(Option<String>),
    HoldOffset(Option<HoldOffset>),
    Unholdables(Option<String>),
    UnholdDefaults(bool),
    Revert(Revert),
    Delay(Delay),
    Distance(Option<f64>),
    TimeOut(Option<f64>),
    Frequency(Option<f64>),
    Grid(Grid<E>),
    Helper(Helper),
    RenderFps(Option<f64>),
    StopPropagation(bool),
    PreventDefault(bool),
}

impl<E: Clone> Options<E> {
    /// Read an option by name.
    pub fn get(&self, name: &str) -> Result<OptionValue<E>, ControlError> {
        Ok(self.get_named(name.parse()?))
    }

    /// Read an option.
    pub fn get_named(&self, name: OptionName) -> OptionValue<E> {
        use OptionValue as V;
        match name {
            OptionName::Delegate => V::Delegate(self.delegate.clone()),
            OptionName::Axis => V::Axis(self.axis),
            OptionName::ZMode => V::ZMode(self.z_mode),
            OptionName::Container => V::Container(self.container.clone()),
            OptionName::ContainerSides => V::ContainerSides(self.container_sides),
            OptionName::Scroll => V::Scroll(self.scroll.clone()),
            OptionName::ScrollMode => V::ScrollMode(self.scroll_mode),
            OptionName::ScrollSpeed => V::ScrollSpeed(self.scroll_speed),
            OptionName::ScrollSensitivity => V::ScrollSensitivity(self.scroll_sensitivity),
            OptionName::Holder => V::Holder(self.holder.clone()),
            OptionName::HoldOffset => V::HoldOffset(self.hold_offset),
            OptionName::Unholdables => V::Unholdables(self.unholdables.clone()),
            OptionName::UnholdDefaults => V::UnholdDefaults(self.unhold_defaults),
            OptionName::Revert => V::Revert(self.revert.clone()),
            OptionName::Delay => V::Delay(self.delay),
            OptionName::Distance => V::Distance(self.distance),
            OptionName::TimeOut => V::TimeOut(self.time_out),
            OptionName::Frequency => V::Frequency(self.frequency),
            OptionName::Grid => V::Grid(self.grid.clone()),
            OptionName::Helper => V::Helper(self.helper.clone()),
            OptionName::RenderFps => V::RenderFps(self.render_fps),
            OptionName::StopPropagation => V::StopPropagation(self.stop_propagation),
            OptionName::PreventDefault => V::PreventDefault(self.prevent_default),
        }
    }

    /// Write an option by name.
    pub fn set(&mut self, name: &str, value: OptionValue<E>) -> Result<(), ControlError> {
        self.set_named(name.parse()?, value)
    }

    /// Write an option; the value variant must match `name`.
    pub fn set_named(&mut self, name: OptionName, value: OptionValue<E>) -> Result<(), ControlError> {
        use OptionValue as V;
        match (name, value) {
            (OptionName::Delegate, V::Delegate(v)) => self.delegate = v,
            (OptionName::Axis, V::Axis(v)) => self.axis = v,
            (OptionName::ZMode, V::ZMode(v)) => self.z_mode = v,
            (OptionName::Container, V::Container(v)) => self.container = v,
            (OptionName::ContainerSides, V::ContainerSides(v)) => self.container_sides = v,
            (OptionName::Scroll, V::Scroll(v)) => self.scroll = v,
            (OptionName::ScrollMode, V::ScrollMode(v)) => self.scroll_mode = v,
            (OptionName::ScrollSpeed, V::ScrollSpeed(v)) => self.scroll_speed = v,
            (OptionName::ScrollSensitivity, V::ScrollSensitivity(v)) => {
                self.scroll_sensitivity = v;
            }
            (OptionName::Holder, V::Holder(v)) => self.holder = v,
            (OptionName::HoldOffset, V::HoldOffset(v)) => self.hold_offset = v,
            (OptionName::Unholdables, V::Unholdables(v)) => self.unholdables = v,
            (OptionName::UnholdDefaults, V::UnholdDefaults(v)) => self.unhold_defaults = v,
            (OptionName::Revert, V::Revert(v)) => self.revert = v,
            (OptionName::Delay, V::Delay(v)) => self.delay = v,
            (OptionName::Distance, V::Distance(v)) => self.distance = v,
            (OptionName::TimeOut, V::TimeOut(v)) => self.time_out = v,
            (OptionName::Frequency, V::Frequency(v)) => self.frequency = v,
            (OptionName::Grid, V::Grid(v)) => self.grid = v,
            (OptionName::Helper, V::Helper(v)) => self.helper = v,
            (OptionName::RenderFps, V::RenderFps(v)) => self.render_fps = v,
            (OptionName::StopPropagation, V::StopPropagation(v)) => self.stop_propagation = v,
            (OptionName::PreventDefault, V::PreventDefault(v)) => self.prevent_default = v,
            (name, _) => {
                return Err(ControlError::TypeMismatch {
                    option: name.as_str(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let opts = Options::<u32>::default();
        assert_eq!(opts.axis, Axis::Both);
        assert_eq!(opts.z_mode, ZMode::Swap);
        assert_eq!(opts.container, Container::None);
        assert_eq!(opts.container_sides, Sides::all());
        assert_eq!(opts.scroll, ScrollTarget::Window);
        assert_eq!(opts.scroll_mode, ScrollMode::Pointer);
        assert_eq!(opts.scroll_speed, 20.0);
        assert_eq!(opts.scroll_sensitivity, 20.0);
        assert!(opts.unhold_defaults);
        assert!(opts.prevent_default);
        assert!(!opts.stop_propagation);
        assert_eq!(opts.helper, Helper::Original);
    }

    #[test]
    fn every_name_round_trips() {
        let opts = Options::<u32>::default();
        for name in OptionName::ALL {
            assert_eq!(name.as_str().parse::<OptionName>(), Ok(*name));
            let mut copy = opts.clone();
            let value = opts.get_named(*name);
            assert!(copy.set_named(*name, value).is_ok(), "{name:?} accepts its own value");
            assert_eq!(copy, opts);
        }
    }

    #[test]
    fn unknown_and_mismatched_values_are_rejected() {
        let mut opts = Options::<u32>::default();
        assert_eq!(
            opts.get("nope"),
            Err(ControlError::UnknownOption("nope".into()))
        );
        assert_eq!(
            opts.set("zMode", OptionValue::Axis(Axis::X)),
            Err(ControlError::TypeMismatch { option: "zMode" })
        );
        assert_eq!(opts.z_mode, ZMode::Swap);
    }

    #[test]
    fn revert_timing() {
        assert_eq!(Revert::Off.timing(), None);
        assert_eq!(Revert::On.timing(), Some((300.0, "ease-in-out")));
        assert_eq!(Revert::Ms(120.0).timing(), Some((120.0, "ease-in-out")));
        let eased = Revert::Eased {
            ms: None,
            easing: "linear".into(),
        };
        assert_eq!(eased.timing(), Some((300.0, "linear")));
    }

    #[test]
    fn sides_from_mask() {
        let sides = Sides::from_mask([true, false, true, false]);
        assert_eq!(sides, Sides::LEFT | Sides::RIGHT);
        assert_eq!(Sides::default(), Sides::all());
    }

    #[test]
    fn axis_locks() {
        assert!(Axis::X.allows_x() && !Axis::X.allows_y());
        assert!(!Axis::Y.allows_x() && Axis::Y.allows_y());
        assert!(Axis::Both.allows_x() && Axis::Both.allows_y());
    }
}
