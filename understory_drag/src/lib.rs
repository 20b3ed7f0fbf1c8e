// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drag --heading-base-level=0

//! Understory Drag: a pointer-drag engine for element trees.
//!
//! The engine tracks pointer, touch, and mouse input on attached elements and
//! repositions the dragged element in real time, honoring axis locks,
//! snap-to-grid, containment, edge auto-scroll, and revert-on-release.
//!
//! It never touches a document directly. Everything environment-specific sits
//! behind the [`Host`] trait: geometry reads, style writes, listeners, timers,
//! and animation frames. A browser host lives in `understory_drag_web`; tests
//! use an in-memory host.
//!
//! ## Components
//!
//! - [`types`]: the normalized input vocabulary ([`InputEvent`], [`Phase`], ...).
//! - [`options`]: per-attachment configuration, one sum type per overloaded setting.
//! - [`session`]: the per-drag state machine (`Idle → Pressed → Dragging → Releasing`).
//! - [`motion`]: pure constraint math (axis, grid, hold offset, clamping, auto-scroll).
//! - [`store`]: shared per-element state in a generational arena.
//! - [`pool`]: the session pool with a typed reset contract.
//! - [`Engine`]: attachments, dispatch, timers, and the render loop.
//!
//! ## Driving the engine
//!
//! 1. Create an [`Engine`] over a host and call [`Engine::enable_dragging`].
//!    The engine asks the host to listen for start events on each element.
//! 2. Forward every native event the host listens for to
//!    [`Engine::handle_event`], honoring the returned [`EventResponse`].
//! 3. Forward fired timers to [`Engine::handle_timer`], animation frames to
//!    [`Engine::handle_frame`], and window scrolls to
//!    [`Engine::handle_window_scroll`].
//!
//! Moves compute positions; frames write them. The first qualifying move of a
//! drag also writes immediately.
//!
//! ## Configuration
//!
//! ```rust
//! use kurbo::Size;
//! use understory_drag::options::{Axis, Container, Grid, OptionValue, Options, Revert};
//!
//! let opts = Options::<u32>::default()
//!     .with_axis(Axis::X)
//!     .with_container(Container::Parent)
//!     .with_grid(Grid::Cells(Size::new(20.0, 20.0)))
//!     .with_revert(Revert::On);
//!
//! assert_eq!(opts.get("axis"), Ok(OptionValue::Axis(Axis::X)));
//! assert_eq!(opts.revert.timing(), Some((300.0, "ease-in-out")));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod context;
mod delegate;
mod engine;
mod error;
mod hooks;
mod host;
mod input;
pub mod motion;
pub mod options;
pub mod pool;
pub mod session;
pub mod store;
pub mod track;
pub mod types;

#[cfg(test)]
mod testing;

pub use context::{DEFAULT_UNHOLDABLES, DragContext, PoolConfig};
pub use engine::{Control, Engine};
pub use error::ControlError;
pub use hooks::{Hook, HookKind, Hooks};
pub use host::{
    Capabilities, Host, MoveMode, PositionScheme, ScrollMetrics, Scroller, TimerId, Transition,
};
pub use session::{DragSession, Process, SessionState};
pub use types::{
    Button, Contact, ContactId, EventKind, EventResponse, EventScope, InputEvent, InputFamily,
    Phase, StartRejection,
};
