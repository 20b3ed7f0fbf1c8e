// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input vocabulary shared by the engine and its hosts.
//!
//! Hosts translate native events into [`InputEvent`]s. The three browser input
//! models collapse into one abstract sequence: an [`InputFamily`] plus a
//! [`Phase`] (`Start`, `Move`, `End`, `Cancel`).

use kurbo::Point;
use smallvec::SmallVec;

/// Which native input model produced an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputFamily {
    /// Pointer Events (`pointerdown`, `pointermove`, ...).
    Pointer,
    /// Touch Events (`touchstart`, `touchmove`, ...).
    Touch,
    /// Mouse Events (`mousedown`, `mousemove`, ...).
    Mouse,
}

/// Abstract lifecycle phase of an input event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A contact went down.
    Start,
    /// A contact moved.
    Move,
    /// A contact was released.
    End,
    /// The environment aborted the contact.
    Cancel,
}

/// A concrete event type a host may be asked to listen for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An input event of one family and phase.
    Input(InputFamily, Phase),
    /// Window scroll notifications.
    Scroll,
}

impl EventKind {
    /// The input kind for `family` and `phase`.
    ///
    /// Returns `None` for mouse cancel, which has no native counterpart.
    pub const fn input(family: InputFamily, phase: Phase) -> Option<Self> {
        match (family, phase) {
            (InputFamily::Mouse, Phase::Cancel) => None,
            _ => Some(Self::Input(family, phase)),
        }
    }

    /// The DOM event type name for this kind, if it has one.
    pub const fn dom_name(self) -> Option<&'static str> {
        use InputFamily::*;
        use Phase::*;
        Some(match self {
            Self::Input(Pointer, Start) => "pointerdown",
            Self::Input(Pointer, Move) => "pointermove",
            Self::Input(Pointer, End) => "pointerup",
            Self::Input(Pointer, Cancel) => "pointercancel",
            Self::Input(Touch, Start) => "touchstart",
            Self::Input(Touch, Move) => "touchmove",
            Self::Input(Touch, End) => "touchend",
            Self::Input(Touch, Cancel) => "touchcancel",
            Self::Input(Mouse, Start) => "mousedown",
            Self::Input(Mouse, Move) => "mousemove",
            Self::Input(Mouse, End) => "mouseup",
            Self::Input(Mouse, Cancel) => return None,
            Self::Scroll => "scroll",
        })
    }
}

/// Where a listener is installed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventScope<E> {
    /// The whole document.
    Document,
    /// The browsing window.
    Window,
    /// A single element.
    Element(E),
}

impl<E: Copy> EventScope<E> {
    /// The scope move/end/cancel listeners use for a session of `family`.
    ///
    /// Touch events always target the element the touch started on, so touch
    /// sessions listen on the drag element; pointer and mouse sessions listen on
    /// the document to keep receiving events once the pointer leaves the element.
    pub fn for_family(family: InputFamily, drag_element: E) -> Self {
        match family {
            InputFamily::Touch => Self::Element(drag_element),
            InputFamily::Pointer | InputFamily::Mouse => Self::Document,
        }
    }
}

/// Identity of a touch point or pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContactId(pub i32);

/// One contact sample carried by an event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Touch identifier or pointer id; `None` for mouse input.
    pub id: Option<ContactId>,
    /// Page-relative position.
    pub page: Point,
}

/// Mouse button that triggered a start event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Button {
    /// Primary button (or touch/pen contact).
    #[default]
    Primary,
    /// Middle button (`button == 1`).
    Middle,
    /// Secondary button (`button == 2`).
    Secondary,
    /// Any other button index.
    Other(i16),
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    pub const fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// A host-normalized input event.
#[derive(Clone, Debug, PartialEq)]
pub struct InputEvent<E> {
    /// Input model that produced the event.
    pub family: InputFamily,
    /// Lifecycle phase.
    pub phase: Phase,
    /// The element the event actually targets (the innermost hit element).
    pub target: E,
    /// Button for mouse/pointer starts.
    pub button: Button,
    /// Changed contacts: every changed touch, or the single pointer/mouse sample.
    pub contacts: SmallVec<[Contact; 2]>,
    /// Event time stamp in milliseconds.
    pub time_stamp: f64,
    /// Whether the native event can be default-prevented.
    pub cancelable: bool,
}

impl<E> InputEvent<E> {
    /// A pointer event for one pointer id.
    pub fn pointer(phase: Phase, target: E, id: i32, page: Point, time_stamp: f64) -> Self {
        Self::single(
            InputFamily::Pointer,
            phase,
            target,
            Some(ContactId(id)),
            page,
            time_stamp,
        )
    }

    /// A mouse event.
    pub fn mouse(phase: Phase, target: E, page: Point, time_stamp: f64) -> Self {
        Self::single(InputFamily::Mouse, phase, target, None, page, time_stamp)
    }

    /// A touch event carrying the given changed touches.
    pub fn touch(
        phase: Phase,
        target: E,
        touches: impl IntoIterator<Item = (i32, Point)>,
        time_stamp: f64,
    ) -> Self {
        Self {
            family: InputFamily::Touch,
            phase,
            target,
            button: Button::Primary,
            contacts: touches
                .into_iter()
                .map(|(id, page)| Contact {
                    id: Some(ContactId(id)),
                    page,
                })
                .collect(),
            time_stamp,
            cancelable: true,
        }
    }

    fn single(
        family: InputFamily,
        phase: Phase,
        target: E,
        id: Option<ContactId>,
        page: Point,
        time_stamp: f64,
    ) -> Self {
        let mut contacts = SmallVec::new();
        contacts.push(Contact { id, page });
        Self {
            family,
            phase,
            target,
            button: Button::Primary,
            contacts,
            time_stamp,
            cancelable: true,
        }
    }

    /// Set the triggering button.
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    /// Set whether the native event is cancelable.
    #[must_use]
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }
}

/// Why a start event did not begin a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StartRejection {
    /// Middle or secondary mouse button.
    SecondaryButton,
    /// Compatibility mouse event synthesized after a touch.
    GhostMouse,
    /// No delegated descendant matched.
    NoTarget,
    /// The attachment is disabled.
    Disabled,
    /// A matching ancestor is currently pressed.
    BlockedByAncestor,
    /// A descendant drag currently prevents this element.
    PreventedByDescendant,
    /// The element is mid-drag or settling.
    Unavailable,
    /// The press landed on an unholdable element or outside the holder.
    Unholdable,
    /// Another contact already drives this element.
    ContactBusy,
}

/// What the host should do with the native event after the engine handled it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventResponse {
    /// Call the native `preventDefault`.
    pub prevent_default: bool,
    /// Call the native `stopPropagation`.
    pub stop_propagation: bool,
    /// A start event began a new session.
    pub started: bool,
    /// Set when a start event was rejected.
    pub rejection: Option<StartRejection>,
}

impl EventResponse {
    pub(crate) fn rejected(reason: StartRejection) -> Self {
        Self {
            rejection: Some(reason),
            ..Self::default()
        }
    }

    pub(crate) fn merge(&mut self, other: Self) {
        self.prevent_default |= other.prevent_default;
        self.stop_propagation |= other.stop_propagation;
        self.started |= other.started;
        if self.rejection.is_none() {
            self.rejection = other.rejection;
        }
    }
}
