// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-scoped engine configuration and counters.

use alloc::string::String;

/// Default selector of elements a drag may never start from.
pub const DEFAULT_UNHOLDABLES: &str = "input, textarea, button, select, option, .mdl-unholdable";

/// Session pool sizing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Initial number of pooled sessions; `None` derives it from the first
    /// attachment (see [`PoolConfig::auto_size`]).
    pub init_size: Option<usize>,
    /// Upper bound on stored sessions; zero means unbounded.
    pub max_size: usize,
    /// Grow the pool by the auto size on every later attachment.
    pub auto_increase: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            init_size: None,
            max_size: 0,
            auto_increase: true,
        }
    }
}

impl PoolConfig {
    /// Pool growth suggested by an attachment of `elements` elements.
    ///
    /// A delegator can spawn many concurrent drags, so it asks for a fixed
    /// 25; plain elements ask for `n + n / 4`.
    pub const fn auto_size(delegated: bool, elements: usize) -> usize {
        if delegated { 25 } else { elements + elements / 4 }
    }
}

/// Configuration and state shared by every session of one engine.
#[derive(Clone, Debug)]
pub struct DragContext {
    /// Next z-index handed out by [`ZMode::Swap`](crate::options::ZMode::Swap).
    pub z_counter: i32,
    /// Session pool sizing.
    pub pool: PoolConfig,
    /// Selector applied when an attachment keeps `unhold_defaults`.
    pub unholdables: String,
    /// Class added to self-dragging elements.
    pub element_class: String,
    /// Class added to delegating containers.
    pub delegator_class: String,
    /// Window after a touch ends during which mouse starts are ignored.
    pub ghost_mouse_window_ms: f64,
}

impl Default for DragContext {
    fn default() -> Self {
        Self {
            z_counter: 900,
            pool: PoolConfig::default(),
            unholdables: DEFAULT_UNHOLDABLES.into(),
            element_class: "mdl-dragger-element".into(),
            delegator_class: "mdl-dragger-delegator".into(),
            ghost_mouse_window_ms: 500.0,
        }
    }
}

impl DragContext {
    /// Take the next z-index; the counter never decreases.
    pub fn next_z(&mut self) -> i32 {
        let z = self.z_counter;
        self.z_counter = self.z_counter.saturating_add(1);
        z
    }
}
