//! Logic for interacting with the X server
use crate::{
    core::bindings::{KeyCode, ModMask, MouseState},
    pure::{
        geometry::{Point, Rect},
        hints::SizeHints,
    },
    Result, Xid,
};

pub mod atom;
pub mod event;

pub use atom::Atom;
pub use event::XEvent;

/// Placeholder for windows that refuse to tell us anything about themselves.
pub const BROKEN: &str = "broken";

/// The ICCCM WM_STATE values we set on managed windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn,
    Normal,
    Iconic,
}

impl From<WmState> for u32 {
    fn from(s: WmState) -> u32 {
        match s {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }
}

/// Map state of a window as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Unmapped,
    Unviewable,
    Viewable,
}

/// The subset of window attributes the manager inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub rect: Rect,
    pub border_width: i32,
    pub override_redirect: bool,
    pub map_state: MapState,
}

/// Parsed WM_HINTS fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmHintsData {
    pub urgent: bool,
    /// The client participates in input focus handling
    pub accepts_input: bool,
}

/// Pointer shapes used while interacting with clients and the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Normal,
    Move,
    /// Over a clickable status block
    Hand,
    /// Resizing from the named corner
    Resize(Corner),
}

/// The window corner a resize drag is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Pick the corner nearest to a point within a window of size `w` x `h`.
    pub fn nearest(x: i32, y: i32, w: u32, h: u32) -> Self {
        let left = x < w as i32 / 2;
        let top = y < h as i32 / 2;

        match (left, top) {
            (true, true) => Corner::TopLeft,
            (false, true) => Corner::TopRight,
            (true, false) => Corner::BottomLeft,
            (false, false) => Corner::BottomRight,
        }
    }
}

/// One drawing cell of the bar: a filled background with optional text and
/// an optional occupancy marker in the top left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarCell {
    pub x: i32,
    pub w: u32,
    /// Foreground (text) pixel value
    pub fg: u32,
    /// Background pixel value
    pub bg: u32,
    pub text: Option<String>,
    /// Draw the small occupancy square
    pub marker: bool,
}

/// A handle on a running X connection used for issuing requests.
///
/// This is the seam the window manager logic is written against: the pure
/// state machinery never talks X directly, and tests drive the manager with
/// a stub implementation. The one production implementation lives in
/// [crate::x11rb].
pub trait XConn {
    /// The root window of the screen being managed.
    fn root(&self) -> Xid;
    /// The total extent of the X screen.
    fn screen_rect(&self) -> Result<Rect>;
    /// Per-monitor rectangles, deduplicated, in monitor order.
    fn monitor_rects(&self) -> Result<Vec<Rect>>;
    /// Claim substructure redirection on the root window.
    ///
    /// Fails with [crate::Error::WmAlreadyRunning] when another window
    /// manager holds it.
    fn become_wm(&self) -> Result<()>;
    /// Block until the next event arrives.
    fn next_event(&self) -> Result<XEvent>;
    /// Flush pending requests to the server.
    fn flush(&self);
    /// Round trip to the server, then drop any queued pointer enter events.
    ///
    /// Restacking and resize drags shuffle windows under the pointer; the
    /// resulting crossing events would steal focus.
    fn sync_and_drain_enters(&self) -> Result<()>;
    /// The modifier currently mapped to NumLock.
    fn numlock_mask(&self) -> Result<ModMask>;

    /// Replace all key grabs on the root with the given set.
    fn grab_keys(&self, keys: &[KeyCode]) -> Result<()>;
    /// Replace the button grabs on a client window.
    ///
    /// Unfocused clients additionally grab plain clicks so that
    /// click-to-focus works; `focused` drops that extra grab.
    fn grab_buttons(&self, win: Xid, states: &[MouseState], focused: bool) -> Result<()>;
    /// Drop every button grab on a client window.
    fn ungrab_buttons(&self, win: Xid) -> Result<()>;
    /// Subscribe to the input events we track on managed clients (enter,
    /// focus, property and structure changes).
    fn set_client_event_mask(&self, win: Xid) -> Result<()>;
    /// Grab the pointer for a drag interaction.
    fn grab_pointer(&self, cursor: Cursor) -> Result<()>;
    fn ungrab_pointer(&self) -> Result<()>;
    /// Current pointer position relative to the root.
    fn query_pointer(&self) -> Result<Point>;
    /// Warp the pointer to a position within `win`.
    fn warp_pointer(&self, win: Xid, x: i32, y: i32) -> Result<()>;
    /// Replay a grabbed button press through to the client it landed on.
    fn allow_click_replay(&self) -> Result<()>;
    /// Set the cursor shown over a window we own.
    fn set_cursor(&self, win: Xid, cursor: Cursor) -> Result<()>;

    fn window_attributes(&self, win: Xid) -> Result<WindowAttributes>;
    fn map(&self, win: Xid) -> Result<()>;
    fn unmap(&self, win: Xid) -> Result<()>;
    /// Forcibly disconnect a client that ignores the delete protocol.
    fn kill(&self, win: Xid) -> Result<()>;
    fn move_window(&self, win: Xid, x: i32, y: i32) -> Result<()>;
    fn move_resize(&self, win: Xid, r: Rect) -> Result<()>;
    fn set_border_width(&self, win: Xid, bw: u32) -> Result<()>;
    /// Border colour as an argb pixel value.
    fn set_border_color(&self, win: Xid, color: u32) -> Result<()>;
    fn raise(&self, win: Xid) -> Result<()>;
    /// Stack `win` directly below `sibling`.
    fn stack_below(&self, win: Xid, sibling: Xid) -> Result<()>;
    fn set_input_focus(&self, win: Xid) -> Result<()>;
    /// Send a WM_PROTOCOLS message if the client advertises support for it.
    /// Returns whether it was sent.
    fn send_protocol(&self, win: Xid, proto: Atom) -> Result<bool>;
    /// Send a synthetic ConfigureNotify describing the client's geometry.
    fn send_configure_notify(&self, win: Xid, r: Rect, bw: i32) -> Result<()>;
    /// Forward a configure request from an unmanaged window untouched.
    fn configure_unmanaged(&self, ev: &event::ConfigureRequest) -> Result<()>;

    fn get_text_prop(&self, win: Xid, atom: Atom) -> Result<Option<String>>;
    /// WM_CLASS as (instance, class).
    fn get_wm_class(&self, win: Xid) -> Result<Option<(String, String)>>;
    fn get_size_hints(&self, win: Xid) -> Result<SizeHints>;
    fn get_wm_hints(&self, win: Xid) -> Result<Option<WmHintsData>>;
    /// Clear or set the urgency bit in WM_HINTS.
    fn set_urgency_hint(&self, win: Xid, urgent: bool) -> Result<()>;
    fn get_transient_for(&self, win: Xid) -> Result<Option<Xid>>;
    /// _NET_WM_WINDOW_TYPE as an atom name.
    fn get_window_type(&self, win: Xid) -> Result<Option<String>>;
    /// Whether _NET_WM_STATE currently includes the fullscreen atom.
    fn is_fullscreen_prop_set(&self, win: Xid) -> Result<bool>;
    /// Motif decoration hints: `Some(false)` asks for no border.
    fn get_motif_decorations(&self, win: Xid) -> Result<Option<bool>>;
    /// _NET_WM_PID.
    fn get_pid(&self, win: Xid) -> Result<Option<u32>>;
    fn get_wm_state(&self, win: Xid) -> Result<Option<WmState>>;
    fn set_wm_state(&self, win: Xid, state: WmState) -> Result<()>;

    fn set_prop_cardinal(&self, win: Xid, prop: Atom, vals: &[u32]) -> Result<()>;
    fn set_prop_window(&self, win: Xid, prop: Atom, vals: &[Xid]) -> Result<()>;
    fn append_prop_window(&self, win: Xid, prop: Atom, val: Xid) -> Result<()>;
    fn prepend_prop_window(&self, win: Xid, prop: Atom, val: Xid) -> Result<()>;
    fn set_prop_string(&self, win: Xid, prop: Atom, val: &str) -> Result<()>;
    /// Set a list of atoms (e.g. _NET_SUPPORTED, _NET_WM_STATE).
    fn set_prop_atoms(&self, win: Xid, prop: Atom, vals: &[Atom]) -> Result<()>;
    fn delete_prop(&self, win: Xid, prop: Atom) -> Result<()>;

    /// The raw id of a known atom, for comparing against client message
    /// data words.
    fn atom_id(&self, atom: Atom) -> Result<u32>;

    /// All direct children of the root window, bottom to top.
    fn existing_clients(&self) -> Result<Vec<Xid>>;

    /// Create the tiny unmapped window advertised via
    /// _NET_SUPPORTING_WM_CHECK.
    fn create_check_window(&self) -> Result<Xid>;
    /// Resolve a keysym to its current keycode, if it is mapped at all.
    fn keycode_for_keysym(&self, keysym: u32) -> Result<Option<u8>>;

    /// Create an override-redirect bar window at the given position.
    fn create_bar_window(&self, r: Rect) -> Result<Xid>;
    fn destroy_window(&self, win: Xid) -> Result<()>;
    /// Rendered width of `txt` in the bar font, without padding.
    fn text_width(&self, txt: &str) -> Result<u32>;
    /// Render a frame of bar cells into the given bar window.
    fn draw_bar(&self, win: Xid, cells: &[BarCell], w: u32, h: u32) -> Result<()>;
}

/// Extension helpers layered on top of the raw [XConn] operations.
pub trait XConnExt: XConn {
    /// The title of a window, preferring the EWMH name over WM_NAME.
    fn window_title(&self, win: Xid) -> Result<String> {
        match self.get_text_prop(win, Atom::NetWmName)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Ok(self
                .get_text_prop(win, Atom::WmName)?
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| BROKEN.to_string())),
        }
    }

    /// Collect the properties placement rules match against.
    fn window_props(&self, win: Xid) -> Result<crate::rules::WindowProps> {
        let (instance, class) = self
            .get_wm_class(win)?
            .unwrap_or_else(|| (BROKEN.to_string(), BROKEN.to_string()));

        Ok(crate::rules::WindowProps {
            class,
            instance,
            title: self.window_title(win)?,
            role: self
                .get_text_prop(win, Atom::WmWindowRole)?
                .unwrap_or_default(),
            win_type: self.get_window_type(win)?,
        })
    }

    /// Politely ask a client to close, falling back to a forced kill for
    /// clients without the delete protocol.
    fn close_client(&self, win: Xid) -> Result<()> {
        if !self.send_protocol(win, Atom::WmDeleteWindow)? {
            self.kill(win)?;
        }

        Ok(())
    }
}

impl<T: XConn> XConnExt for T {}
