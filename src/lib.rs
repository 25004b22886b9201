//! escher: a tiling and floating X11 window manager.
//!
//! The crate is split into pure state/geometry code (no X calls), the layout
//! engine, and an [XConn][crate::x::XConn] boundary trait with an x11rb backed
//! implementation. The binary wires a static [core::Config] plus key and mouse
//! binding tables into a [core::WindowManager] and runs the event loop.
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate tracing;

#[macro_use]
pub mod macros;

pub mod core;
pub mod layout;
pub mod pure;
pub mod rules;
pub mod status;
pub mod util;
pub mod x;
pub mod x11rb;

use std::ops::Deref;

pub use crate::core::{Config, WindowManager};
pub use pure::geometry::{Point, Rect};

/// An X11 ID for a given resource
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub(crate) u32);

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A window manager error
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Another window manager already holds SubstructureRedirect on the root
    /// window.
    #[error("another window manager is already running")]
    WmAlreadyRunning,

    /// A string property on a window was invalid utf8
    #[error(transparent)]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An error from the underlying x11rb connection
    #[error(transparent)]
    X11rb(#[from] crate::x11rb::X11rbError),

    /// Wrapper around IO errors encountered when inspecting process state
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An attempt to spawn an external process failed
    #[error("unable to spawn {cmd}: {err}")]
    Spawn {
        /// The command that was run
        cmd: String,
        /// The underlying error
        err: String,
    },
}

/// A Result where the error type is a window manager [Error]
pub type Result<T> = std::result::Result<T, Error>;
