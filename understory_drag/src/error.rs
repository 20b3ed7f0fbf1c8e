// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by the runtime control surface.

use alloc::string::String;
use core::fmt;

/// Error returned by option access and control invocation by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// No option has this name.
    UnknownOption(String),
    /// The value's type does not fit the named option.
    TypeMismatch {
        /// Option that rejected the value.
        option: &'static str,
    },
    /// No control has this name.
    UnknownControl(String),
    /// The element has no dragging attached.
    NotAttached,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOption(name) => write!(f, "unknown option `{name}`"),
            Self::TypeMismatch { option } => {
                write!(f, "value does not fit option `{option}`")
            }
            Self::UnknownControl(name) => write!(f, "unknown control `{name}`"),
            Self::NotAttached => f.write_str("element has no dragging attached"),
        }
    }
}

impl core::error::Error for ControlError {}
