//! Backend agnostic X event types.
//!
//! Backends translate their raw wire events into [XEvent]s; anything a
//! backend cannot express in these terms gets handled (or dropped) on the
//! backend side.
use crate::{
    core::bindings::{KeyCode, ModMask, MouseButton},
    pure::geometry::Rect,
    Xid,
};
use bitflags::bitflags;

/// Wrapper around the event types we need to handle in the main event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    /// A mouse button was pressed
    ButtonPress(ButtonEvent),
    /// A mouse button was released
    ButtonRelease(ButtonEvent),
    /// An EWMH client message from another client
    ClientMessage(ClientMessage),
    /// The root window geometry changed
    ConfigureNotify(ConfigureEvent),
    /// A window asked to be moved / resized / restacked
    ConfigureRequest(ConfigureRequest),
    /// A window was destroyed
    Destroy(Xid),
    /// The pointer entered a window. Backends only forward enters that
    /// represent a real crossing onto the window or the root.
    Enter(Xid),
    /// Part of a window was exposed and wants redrawing
    Expose(Xid),
    /// A window gained input focus
    FocusIn(Xid),
    /// A grabbed key was pressed
    KeyPress(KeyCode),
    /// The keyboard mapping changed, key grabs need refreshing
    MappingNotify,
    /// A window asked to be mapped
    MapRequest(Xid),
    /// The pointer moved
    Motion(MotionEvent),
    /// A window property changed
    PropertyNotify(PropertyEvent),
    /// The physical screen layout changed
    ScreenChange,
    /// A window was unmapped
    UnmapNotify {
        win: Xid,
        /// Synthetic unmaps are a client withdrawing itself (ICCCM 4.1.4)
        from_send_event: bool,
    },
}

/// A mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// The window the press landed on
    pub win: Xid,
    pub button: MouseButton,
    /// Raw modifier state, not yet cleaned of lock masks
    pub mask: ModMask,
    /// Position within the event window
    pub x: i32,
    pub y: i32,
    /// Position relative to the root window
    pub x_root: i32,
    pub y_root: i32,
}

/// Pointer motion, reported relative to the root window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    pub win: Xid,
    pub x_root: i32,
    pub y_root: i32,
    /// Server timestamp, used to throttle drag updates
    pub time: u32,
}

/// A configure notify for an existing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureEvent {
    pub win: Xid,
    pub rect: Rect,
}

bitflags! {
    /// Which fields of a [ConfigureRequest] the client actually set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConfigureMask: u16 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const WIDTH = 1 << 2;
        const HEIGHT = 1 << 3;
        const BORDER_WIDTH = 1 << 4;
    }
}

/// A client request to alter its own geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub win: Xid,
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    pub border_width: u32,
    pub mask: ConfigureMask,
}

impl ConfigureRequest {
    /// Pure position change: width and height untouched.
    pub fn is_move_only(&self) -> bool {
        self.mask.intersects(ConfigureMask::X | ConfigureMask::Y)
            && !self
                .mask
                .intersects(ConfigureMask::WIDTH | ConfigureMask::HEIGHT)
    }
}

/// An EWMH client message, with the message type resolved to its atom name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    pub win: Xid,
    pub atom: String,
    /// The first five data words (format 32 payload)
    pub data: [u32; 5],
}

/// A property change, with the property resolved to its atom name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    pub win: Xid,
    pub atom: String,
    /// Property deletions are ignored by every handler
    pub is_delete: bool,
}
