//! Core data structures and the top level window manager event loop.
pub mod actions;
pub mod bar;
pub mod bindings;
pub(crate) mod handlers;
pub(crate) mod ops;
pub mod swallow;

use crate::{
    core::bindings::{ClickInfo, KeyCode, KeyHandler, ModMask, MouseBinding},
    layout::Layout,
    pure::{
        client::{ClientArena, ClientId},
        floatpos::FloatSpec,
        geometry::Rect,
        monitor::{Gaps, Monitor},
    },
    rules::Rule,
    status::{StatusSignaller, StatusText},
    x::{Atom, XConn, XEvent},
    Result, Xid,
};
use std::{collections::HashMap, path::PathBuf};
use strum::IntoEnumIterator;

/// Scheme index for unfocused elements.
pub const SCHEME_NORM: usize = 0;
/// Scheme index for the focused client / selected tags.
pub const SCHEME_SEL: usize = 1;
/// Scheme index for focused floating clients.
pub const SCHEME_FLOAT: usize = 2;

/// A foreground / background / border colour triple, all argb pixel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub fg: u32,
    pub bg: u32,
    pub border: u32,
}

/// User facing configuration.
///
/// Everything is plain data: construct one, override the fields you care
/// about and hand it to [WindowManager::new].
#[derive(Debug, Clone)]
pub struct Config {
    /// Client border width in pixels
    pub border_px: u32,
    /// Edge snapping distance for mouse moves, in pixels
    pub snap: i32,
    pub show_bar: bool,
    pub top_bar: bool,
    /// Bar height in pixels
    pub bar_h: i32,
    /// Vertical padding between the bar and the window area
    pub bar_v_pad: i32,
    /// Horizontal padding inside the bar
    pub bar_side_pad: i32,
    /// Respect ICCCM size hints for tiled clients
    pub resize_hints: bool,
    /// Keep focus on fullscreen clients
    pub lock_fullscreen: bool,
    /// Allow floating terminals to swallow their children
    pub swallow_floating: bool,
    /// Only show tags that are occupied or selected
    pub hide_vacant_tags: bool,
    pub mfact: f32,
    pub n_master: u32,
    pub gaps: Gaps,
    /// Drop outer gaps when a single client is tiled
    pub smart_gaps: bool,
    pub tags: Vec<String>,
    pub rules: Vec<Rule>,
    /// The layout table; slots two deep are cycled per monitor
    pub layouts: Vec<Layout>,
    /// Colour schemes: normal, selected, floating, then status schemes
    pub colors: Vec<ColorScheme>,
    /// Default grid dimensions for grid placement specs
    pub float_pos_grid: (i32, i32),
    /// Placement for floating clients with no position of their own
    pub default_float_pos: FloatSpec,
    /// Pid file of the status generator to send click signals to
    pub status_lockfile: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            border_px: 1,
            snap: 32,
            show_bar: true,
            top_bar: true,
            bar_h: 24,
            bar_v_pad: 0,
            bar_side_pad: 0,
            resize_hints: false,
            lock_fullscreen: true,
            swallow_floating: false,
            hide_vacant_tags: false,
            mfact: 0.55,
            n_master: 1,
            gaps: Gaps::new(10, 10, 10, 10),
            smart_gaps: false,
            tags: (1..=9).map(|n| n.to_string()).collect(),
            rules: Vec::new(),
            layouts: Layout::iter().collect(),
            colors: vec![
                ColorScheme {
                    fg: 0xffbbbbbb,
                    bg: 0xff222222,
                    border: 0xff444444,
                },
                ColorScheme {
                    fg: 0xffeeeeee,
                    bg: 0xff005577,
                    border: 0xff005577,
                },
                ColorScheme {
                    fg: 0xffeeeeee,
                    bg: 0xff222222,
                    border: 0xff335577,
                },
            ],
            float_pos_grid: (5, 5),
            default_float_pos: FloatSpec::default(),
            status_lockfile: PathBuf::from("/var/local/statusblocks/statusblocks.pid"),
        }
    }
}

impl Config {
    /// The bitmask covering every configured tag.
    pub fn tag_mask(&self) -> u32 {
        crate::pure::tag_mask(self.tags.len())
    }
}

/// Mutable internal state for the window manager.
///
/// Separated from [WindowManager] so that key and mouse handlers can borrow
/// it mutably while the binding tables stay immutably borrowed.
#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub clients: ClientArena,
    pub monitors: Vec<Monitor>,
    /// Index of the focused monitor
    pub sel_mon: usize,
    /// Full extent of the X screen
    pub screen: Rect,
    pub numlock: ModMask,
    /// Parsed root window status text
    pub status: StatusText,
    /// Signal number of the status block under the pointer (0 = none)
    pub status_signal: u8,
    pub(crate) status_hand_cursor: bool,
    pub(crate) signaller: StatusSignaller,
    /// Click geometry of each monitor's bar, refreshed on every draw
    pub(crate) bar_regions: Vec<bar::BarRegions>,
    pub(crate) check_win: Xid,
    /// Monitor the pointer was last seen over while crossing the root
    pub(crate) last_motion_mon: Option<usize>,
    /// Button states grabbed on client windows, from the mouse bindings
    pub(crate) client_grabs: Vec<bindings::MouseState>,
    pub(crate) running: bool,
}

impl State {
    fn new(config: Config) -> Self {
        let signaller = StatusSignaller::new(&config.status_lockfile);

        Self {
            config,
            clients: ClientArena::new(),
            monitors: Vec::new(),
            sel_mon: 0,
            screen: Rect::default(),
            numlock: ModMask::empty(),
            status: StatusText::default(),
            status_signal: 0,
            status_hand_cursor: false,
            signaller,
            bar_regions: Vec::new(),
            check_win: Xid(0),
            last_motion_mon: None,
            client_grabs: Vec::new(),
            running: true,
        }
    }

    /// The currently focused monitor.
    pub fn sel_monitor(&self) -> &Monitor {
        &self.monitors[self.sel_mon]
    }

    pub fn sel_monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.sel_mon]
    }

    /// The focused client, if there is one.
    pub fn sel_client(&self) -> Option<ClientId> {
        self.sel_monitor().sel
    }

    /// Ask the event loop to exit after the current event.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

/// A top level window manager, generic over its X connection.
pub struct WindowManager<X: XConn> {
    x: X,
    pub state: State,
    key_bindings: HashMap<(ModMask, u32), KeyHandler<X>>,
    /// Keycode -> binding key lookup, rebuilt when the keyboard map changes
    resolved_keys: HashMap<KeyCode, (ModMask, u32)>,
    mouse_bindings: Vec<MouseBinding<X>>,
}

impl<X: XConn> WindowManager<X> {
    /// Claim the X server and set up all initial state.
    ///
    /// Key bindings are given as (modifier, keysym) pairs and resolved to
    /// keycodes against the current keyboard mapping.
    pub fn new(
        x: X,
        config: Config,
        key_bindings: HashMap<(ModMask, u32), KeyHandler<X>>,
        mouse_bindings: Vec<MouseBinding<X>>,
    ) -> Result<Self> {
        x.become_wm()?;

        let mut state = State::new(config);
        state.client_grabs = mouse_bindings
            .iter()
            .filter(|b| b.target == bindings::ClickTarget::ClientWin)
            .map(|b| b.state)
            .collect();

        let mut wm = Self {
            x,
            state,
            key_bindings,
            resolved_keys: HashMap::new(),
            mouse_bindings,
        };
        wm.setup()?;

        Ok(wm)
    }

    fn setup(&mut self) -> Result<()> {
        let (state, x) = (&mut self.state, &self.x);

        state.screen = x.screen_rect()?;
        state.numlock = x.numlock_mask()?;
        ops::update_geometry(state, x)?;
        ops::update_status(state, x)?;
        ops::update_bars(state, x)?;

        // advertise EWMH support
        let root = x.root();
        let check = x.create_check_window()?;
        state.check_win = check;
        x.set_prop_window(check, Atom::NetSupportingWmCheck, &[check])?;
        x.set_prop_string(check, Atom::NetWmName, "escher")?;
        x.set_prop_window(root, Atom::NetSupportingWmCheck, &[check])?;
        let supported: Vec<Atom> = Atom::iter().collect();
        x.set_prop_atoms(root, Atom::NetSupported, &supported)?;
        x.delete_prop(root, Atom::NetClientList)?;
        x.delete_prop(root, Atom::NetClientListStacking)?;

        let n_tags = state.config.tags.len() as u32;
        x.set_prop_cardinal(root, Atom::NetNumberOfDesktops, &[n_tags])?;
        x.set_prop_cardinal(root, Atom::NetDesktopViewport, &[0, 0])?;
        let names = state.config.tags.join("\0");
        x.set_prop_string(root, Atom::NetDesktopNames, &names)?;
        ops::update_current_desktop(state, x)?;

        self.resolve_keys()?;
        self.grab()?;

        ops::scan(&mut self.state, &self.x)?;
        ops::focus(&mut self.state, &self.x, None)?;
        ops::arrange(&mut self.state, &self.x, None)?;

        Ok(())
    }

    fn resolve_keys(&mut self) -> Result<()> {
        self.resolved_keys.clear();
        for &(mask, sym) in self.key_bindings.keys() {
            match self.x.keycode_for_keysym(sym)? {
                Some(code) => {
                    self.resolved_keys.insert(KeyCode::new(mask, code), (mask, sym));
                }
                None => warn!(keysym = sym, "keysym is not mapped to any keycode"),
            }
        }

        Ok(())
    }

    fn grab(&self) -> Result<()> {
        let codes: Vec<KeyCode> = self.resolved_keys.keys().copied().collect();
        self.x.grab_keys(&codes)
    }

    /// Run the event loop until a binding or fatal error stops it.
    pub fn run(&mut self) -> Result<()> {
        info!("entering main event loop");

        while self.state.running {
            match self.x.next_event() {
                Ok(event) => {
                    trace!(?event, "got event from X server");
                    self.handle_xevent(event)?;
                    self.x.flush();
                }
                Err(e) => {
                    error!(%e, "error pulling next x event");
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn handle_xevent(&mut self, event: XEvent) -> Result<()> {
        let (state, x) = (&mut self.state, &self.x);

        match event {
            XEvent::ButtonPress(ev) => {
                if let Some(info) = handlers::button_press(state, x, &ev)? {
                    self.run_mouse_bindings(&info)?;
                }
            }
            XEvent::ButtonRelease(_) => (),
            XEvent::ClientMessage(m) => handlers::client_message(state, x, &m)?,
            XEvent::ConfigureNotify(ev) => handlers::configure_notify(state, x, &ev)?,
            XEvent::ConfigureRequest(ev) => handlers::configure_request(state, x, &ev)?,
            XEvent::Destroy(win) => handlers::destroy_notify(state, x, win)?,
            XEvent::Enter(win) => handlers::enter_notify(state, x, win)?,
            XEvent::Expose(win) => handlers::expose(state, x, win)?,
            XEvent::FocusIn(win) => handlers::focus_in(state, x, win)?,
            XEvent::KeyPress(k) => self.key_press(k)?,
            XEvent::MappingNotify => {
                self.resolve_keys()?;
                self.grab()?;
            }
            XEvent::MapRequest(win) => handlers::map_request(state, x, win)?,
            XEvent::Motion(ev) => handlers::motion_notify(state, x, &ev)?,
            XEvent::PropertyNotify(ev) => handlers::property_notify(state, x, &ev)?,
            XEvent::ScreenChange => handlers::screen_change(state, x)?,
            XEvent::UnmapNotify {
                win,
                from_send_event,
            } => handlers::unmap_notify(state, x, win, from_send_event)?,
        }

        Ok(())
    }

    fn key_press(&mut self, k: KeyCode) -> Result<()> {
        let clean = KeyCode::new(k.mask.clean(self.state.numlock), k.code);
        if let Some(key) = self.resolved_keys.get(&clean) {
            if let Some(handler) = self.key_bindings.get_mut(key) {
                trace!(?clean, "running keybinding");
                return handler(&mut self.state, &self.x);
            }
        }

        Ok(())
    }

    fn run_mouse_bindings(&mut self, info: &ClickInfo) -> Result<()> {
        for b in self.mouse_bindings.iter_mut() {
            if b.target == info.target
                && b.state.button == info.button
                && b.state.mask.clean(self.state.numlock) == info.mask
            {
                (b.handler)(&mut self.state, &self.x, info)?;
            }
        }

        Ok(())
    }
}
