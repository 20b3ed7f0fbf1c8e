// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drag_web --heading-base-level=0

//! Browser host for the Understory drag engine.
//!
//! This crate wires [`understory_drag::Engine`] to the DOM through `web_sys` when
//! targeting `wasm32`: native pointer, mouse, and touch listeners feed the
//! engine, element positions are written as inline `transform` (or
//! `left`/`top`) styles, and timers and animation frames go through the window.
//!
//! ```no_run
//! #[cfg(target_arch = "wasm32")]
//! fn make_draggable(items: &[web_sys::Element]) -> Option<understory_drag_web::WebDragger> {
//!     use understory_drag::{Hooks, options::Options};
//!
//!     let dragger = understory_drag_web::WebDragger::new()?;
//!     dragger.enable_dragging(items, Options::default(), Hooks::new());
//!     Some(dragger)
//! }
//! ```
//!
//! Notes:
//! - Elements are identified by a numeric handle stored in the
//!   `data-understory-drag-id` attribute. Run one dragger per document.
//!   Handles are assigned to attached elements and to the elements a press
//!   walks through; destroying an attachment releases its handle.
//! - Hooks run while the engine is borrowed; they must not call back into the
//!   [`WebDragger`].
//! - On other targets only [`ElementHandle`] is available.

#![no_std]

extern crate alloc;

#[cfg(any(target_arch = "wasm32", test))]
mod css;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(any(target_arch = "wasm32", test))]
mod handles;

#[cfg(target_arch = "wasm32")]
pub use dom::{HANDLE_ATTRIBUTE, WebHost};

/// Identity of a DOM element known to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u32);

impl ElementHandle {
    #[cfg(any(target_arch = "wasm32", test))]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(target_arch = "wasm32")]
mod dragger {
    use alloc::vec::Vec;

    use understory_drag::options::{OptionValue, Options};
    use understory_drag::{Control, ControlError, DragContext, Engine, Hooks};
    use web_sys::Element;

    use crate::ElementHandle;
    use crate::dom::{SharedEngine, WebHost};

    /// Drag support for a browser document.
    ///
    /// Dropping the dragger removes every listener, timer, and frame request
    /// it installed.
    #[derive(Debug)]
    pub struct WebDragger {
        engine: SharedEngine,
    }

    impl WebDragger {
        /// Bind to the current window with the default context.
        ///
        /// Returns `None` outside a browser window.
        pub fn new() -> Option<Self> {
            Self::with_context(DragContext::default())
        }

        /// Bind to the current window.
        pub fn with_context(ctx: DragContext) -> Option<Self> {
            WebHost::engine(ctx).map(|engine| Self { engine })
        }

        fn handles(&self, elements: &[Element]) -> Vec<ElementHandle> {
            let engine = self.engine.borrow();
            elements.iter().map(|e| engine.host().handle_for(e)).collect()
        }

        /// Handles of the elements of `elements` the host already knows.
        fn known(&self, elements: &[Element]) -> Vec<ElementHandle> {
            let engine = self.engine.borrow();
            elements
                .iter()
                .filter_map(|e| engine.host().lookup(e))
                .collect()
        }

        /// Enable dragging on `elements`; returns how many were newly attached.
        pub fn enable_dragging(
            &self,
            elements: &[Element],
            options: Options<ElementHandle>,
            hooks: Hooks<ElementHandle>,
        ) -> usize {
            let handles = self.handles(elements);
            self.engine
                .borrow_mut()
                .enable_dragging(handles, options, hooks)
        }

        /// Apply `"enable"`, `"disable"`, or `"destroy"` to every attached
        /// element of `elements`.
        ///
        /// Destroyed elements lose their handle.
        pub fn invoke(&self, elements: &[Element], name: &str) -> Result<usize, ControlError> {
            let control: Control = name.parse()?;
            let handles = self.known(elements);
            let mut engine = self.engine.borrow_mut();
            let count = engine.invoke_for(&handles, control);
            if control == Control::Destroy {
                for handle in handles {
                    if !engine.is_attached(handle) {
                        engine.host().forget(handle);
                    }
                }
            }
            Ok(count)
        }

        /// Read an option from the first attached element of `elements`.
        pub fn option(
            &self,
            elements: &[Element],
            name: &str,
        ) -> Result<OptionValue<ElementHandle>, ControlError> {
            let handles = self.known(elements);
            self.engine.borrow().option_for(&handles, name)
        }

        /// Write an option on every attached element of `elements`.
        pub fn set_option(
            &self,
            elements: &[Element],
            name: &str,
            value: &OptionValue<ElementHandle>,
        ) -> Result<usize, ControlError> {
            let handles = self.known(elements);
            self.engine
                .borrow_mut()
                .set_option_for(&handles, name, value)
        }

        /// Handle of `el`, for options that name elements.
        pub fn handle(&self, el: &Element) -> ElementHandle {
            self.engine.borrow().host().handle_for(el)
        }

        /// Run `f` with the engine.
        pub fn with_engine<R>(&self, f: impl FnOnce(&mut Engine<WebHost>) -> R) -> R {
            f(&mut self.engine.borrow_mut())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use dragger::WebDragger;
