//! The main x11rb based [XConn] implementation.
use crate::{
    core::bindings::{KeyCode, ModMask, MouseButton, MouseState},
    pure::{
        geometry::{Point, Rect},
        hints::SizeHints,
    },
    x::{
        event::ConfigureRequest, Atom, BarCell, Corner, Cursor, MapState, WindowAttributes,
        WmHintsData, WmState, XConn, XEvent,
    },
    x11rb::{event::convert_event, Result as X11Result, X11rbError},
    Error, Result, Xid,
};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
};
use strum::IntoEnumIterator;
use x11rb::{
    connection::Connection,
    properties::{WmClass, WmHints, WmSizeHints},
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::{
            AtomEnum, ButtonIndex, ChangeWindowAttributesAux, Char2b, ClientMessageEvent,
            ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _, CreateGCAux,
            CreateWindowAux, EventMask, Grab, GrabMode, InputFocus, ModMask as XModMask, PropMode,
            Rectangle, StackMode, WindowClass, CONFIGURE_NOTIFY_EVENT,
        },
        ErrorKind, Event,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    CURRENT_TIME, NONE,
};

/// X11 keysym for Num_Lock.
const XK_NUM_LOCK: u32 = 0xff7f;

/// Glyph indices into the standard X cursor font.
const XC_LEFT_PTR: u16 = 68;
const XC_FLEUR: u16 = 52;
const XC_HAND2: u16 = 60;
const XC_TOP_LEFT: u16 = 134;
const XC_TOP_RIGHT: u16 = 136;
const XC_BOTTOM_LEFT: u16 = 12;
const XC_BOTTOM_RIGHT: u16 = 14;

/// The core X font used for bar text.
const BAR_FONT: &str = "fixed";

/// Bit set in WM_HINTS flags for the urgency hint.
const URGENCY_HINT: u32 = 1 << 8;

/// _MOTIF_WM_HINTS field layout.
const MOTIF_FLAG_DECORATIONS: u32 = 1 << 1;
const MOTIF_DECOR_ALL: u32 = 1 << 0;
const MOTIF_DECOR_BORDER: u32 = 1 << 1;
const MOTIF_DECOR_TITLE: u32 = 1 << 3;

/// An [XConn] backed by an x11rb [Connection].
#[derive(Debug)]
pub struct X11rbConnection<C: Connection> {
    conn: C,
    root: Xid,
    atoms: HashMap<Atom, u32>,
    /// Reverse atom lookup, populated lazily as events arrive
    atom_names: RefCell<HashMap<u32, String>>,
    /// Events pulled off the wire while draining crossing events
    pending: RefCell<VecDeque<XEvent>>,
    gc: u32,
    font: u32,
    font_ascent: i16,
    font_descent: i16,
    cursor_normal: u32,
    cursor_move: u32,
    cursor_hand: u32,
    cursor_corners: [u32; 4],
}

impl X11rbConnection<RustConnection> {
    /// Connect to the X server using the DISPLAY environment variable.
    pub fn new() -> Result<Self> {
        let (conn, _) = RustConnection::connect(None).map_err(X11rbError::from)?;

        Self::new_for_connection(conn)
    }
}

impl<C: Connection> X11rbConnection<C> {
    pub fn new_for_connection(conn: C) -> Result<Self> {
        let root = Xid(conn.setup().roots[0].root);

        let cookies: Vec<_> = Atom::iter()
            .map(|a| Ok((a, conn.intern_atom(false, a.as_ref().as_bytes())?)))
            .collect::<X11Result<_>>()?;
        let atoms = cookies
            .into_iter()
            .map(|(a, c)| Ok((a, c.reply()?.atom)))
            .collect::<X11Result<HashMap<_, _>>>()?;

        conn.extension_information(randr::X11_EXTENSION_NAME)?
            .ok_or(X11rbError::MissingRandRSupport)?;
        conn.randr_select_input(*root, randr::NotifyMask::SCREEN_CHANGE)?;

        let font = conn.generate_id()?;
        conn.open_font(font, BAR_FONT.as_bytes())?;
        let fq = conn.query_font(font)?.reply()?;
        let gc = conn.generate_id()?;
        conn.create_gc(gc, *root, &CreateGCAux::new().font(font))?;

        let cursor_font = conn.generate_id()?;
        conn.open_font(cursor_font, "cursor".as_bytes())?;
        let glyph_cursor = |glyph: u16| -> X11Result<u32> {
            let id = conn.generate_id()?;
            conn.create_glyph_cursor(
                id,
                cursor_font,
                cursor_font,
                glyph,
                glyph + 1,
                0,
                0,
                0,
                0xffff,
                0xffff,
                0xffff,
            )?;
            Ok(id)
        };
        let cursor_normal = glyph_cursor(XC_LEFT_PTR)?;
        let cursor_move = glyph_cursor(XC_FLEUR)?;
        let cursor_hand = glyph_cursor(XC_HAND2)?;
        let cursor_corners = [
            glyph_cursor(XC_TOP_LEFT)?,
            glyph_cursor(XC_TOP_RIGHT)?,
            glyph_cursor(XC_BOTTOM_LEFT)?,
            glyph_cursor(XC_BOTTOM_RIGHT)?,
        ];
        conn.close_font(cursor_font)?;

        Ok(Self {
            conn,
            root,
            atoms,
            atom_names: RefCell::new(HashMap::new()),
            pending: RefCell::new(VecDeque::new()),
            gc,
            font,
            font_ascent: fq.font_ascent,
            font_descent: fq.font_descent,
            cursor_normal,
            cursor_move,
            cursor_hand,
            cursor_corners,
        })
    }

    pub(crate) fn known_atom(&self, atom: Atom) -> u32 {
        self.atoms.get(&atom).copied().unwrap_or(NONE)
    }

    /// The name of an atom, preferring the static table over a round trip.
    pub(crate) fn atom_name(&self, id: u32) -> Result<String> {
        if let Some((a, _)) = self.atoms.iter().find(|&(_, &v)| v == id) {
            return Ok(a.as_ref().to_string());
        }
        if let Some(name) = self.atom_names.borrow().get(&id) {
            return Ok(name.clone());
        }

        let name = String::from_utf8_lossy(&self.conn.get_atom_name(id)?.reply()?.name).to_string();
        self.atom_names.borrow_mut().insert(id, name.clone());

        Ok(name)
    }

    fn cursor_id(&self, cursor: Cursor) -> u32 {
        match cursor {
            Cursor::Normal => self.cursor_normal,
            Cursor::Move => self.cursor_move,
            Cursor::Hand => self.cursor_hand,
            Cursor::Resize(Corner::TopLeft) => self.cursor_corners[0],
            Cursor::Resize(Corner::TopRight) => self.cursor_corners[1],
            Cursor::Resize(Corner::BottomLeft) => self.cursor_corners[2],
            Cursor::Resize(Corner::BottomRight) => self.cursor_corners[3],
        }
    }

    fn prop_u32s(&self, win: Xid, prop: u32, ty: AtomEnum, len: u32) -> Result<Vec<u32>> {
        let reply = self.conn.get_property(false, *win, prop, ty, 0, len)?.reply()?;

        Ok(reply
            .value32()
            .map(|it| it.collect())
            .unwrap_or_default())
    }

    /// The modifier combinations a grab has to be repeated for so that lock
    /// keys do not mask it.
    fn lock_variants(&self) -> Result<[XModMask; 4]> {
        let numlock = XModMask::from(self.numlock_mask()?.bits());

        Ok([
            0u16.into(),
            XModMask::LOCK,
            numlock,
            numlock | XModMask::LOCK,
        ])
    }
}

impl<C: Connection> XConn for X11rbConnection<C> {
    fn root(&self) -> Xid {
        self.root
    }

    fn screen_rect(&self) -> Result<Rect> {
        let geo = self.conn.get_geometry(*self.root)?.reply()?;

        Ok(Rect::new(0, 0, geo.width as u32, geo.height as u32))
    }

    fn monitor_rects(&self) -> Result<Vec<Rect>> {
        let reply = self.conn.randr_get_monitors(*self.root, true)?.reply()?;
        let mut rects: Vec<Rect> = Vec::with_capacity(reply.monitors.len());
        for m in reply.monitors.iter() {
            let r = Rect::new(m.x as i32, m.y as i32, m.width as u32, m.height as u32);
            if !rects.contains(&r) {
                rects.push(r);
            }
        }
        if rects.is_empty() {
            rects.push(self.screen_rect()?);
        }

        Ok(rects)
    }

    fn become_wm(&self) -> Result<()> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::BUTTON_PRESS
            | EventMask::POINTER_MOTION
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::PROPERTY_CHANGE;
        let aux = ChangeWindowAttributesAux::new()
            .event_mask(mask)
            .cursor(self.cursor_normal);

        match self.conn.change_window_attributes(*self.root, &aux)?.check() {
            Ok(()) => Ok(()),
            Err(x11rb::errors::ReplyError::X11Error(e))
                if e.error_kind == ErrorKind::Access =>
            {
                Err(Error::WmAlreadyRunning)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn next_event(&self) -> Result<XEvent> {
        loop {
            if let Some(ev) = self.pending.borrow_mut().pop_front() {
                return Ok(ev);
            }
            let raw = self.conn.wait_for_event()?;
            if let Some(ev) = convert_event(self, raw)? {
                return Ok(ev);
            }
        }
    }

    fn flush(&self) {
        let _ = self.conn.flush();
    }

    fn sync_and_drain_enters(&self) -> Result<()> {
        self.conn.get_input_focus()?.reply()?;
        while let Some(raw) = self.conn.poll_for_event()? {
            if matches!(raw, Event::EnterNotify(_)) {
                continue;
            }
            if let Some(ev) = convert_event(self, raw)? {
                self.pending.borrow_mut().push_back(ev);
            }
        }

        Ok(())
    }

    fn numlock_mask(&self) -> Result<ModMask> {
        let code = match self.keycode_for_keysym(XK_NUM_LOCK)? {
            Some(code) => code,
            None => return Ok(ModMask::empty()),
        };
        let reply = self.conn.get_modifier_mapping()?.reply()?;
        let per = reply.keycodes_per_modifier() as usize;

        for (i, chunk) in reply.keycodes.chunks(per).enumerate() {
            if chunk.contains(&code) {
                return Ok(ModMask::from_bits_truncate(1 << i));
            }
        }

        Ok(ModMask::empty())
    }

    fn grab_keys(&self, keys: &[KeyCode]) -> Result<()> {
        let variants = self.lock_variants()?;
        self.conn.ungrab_key(Grab::ANY, *self.root, XModMask::ANY)?;

        for k in keys {
            let mask = XModMask::from(k.mask.bits());
            for &extra in variants.iter() {
                self.conn.grab_key(
                    true,
                    *self.root,
                    mask | extra,
                    k.code,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )?;
            }
        }

        Ok(())
    }

    fn grab_buttons(&self, win: Xid, states: &[MouseState], focused: bool) -> Result<()> {
        let variants = self.lock_variants()?;
        self.conn.ungrab_button(ButtonIndex::ANY, *win, XModMask::ANY)?;

        if !focused {
            // sync grab of any button so a click can both focus and be
            // replayed through to the client
            self.conn.grab_button(
                false,
                *win,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                XModMask::ANY,
            )?;
        }

        for s in states {
            let button = button_index(s.button);
            let mask = XModMask::from(s.mask.bits());
            for &extra in variants.iter() {
                self.conn.grab_button(
                    false,
                    *win,
                    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    NONE,
                    NONE,
                    button,
                    mask | extra,
                )?;
            }
        }

        Ok(())
    }

    fn ungrab_buttons(&self, win: Xid) -> Result<()> {
        self.conn.ungrab_button(ButtonIndex::ANY, *win, XModMask::ANY)?;

        Ok(())
    }

    fn set_client_event_mask(&self, win: Xid) -> Result<()> {
        let mask = EventMask::ENTER_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY;
        self.conn
            .change_window_attributes(*win, &ChangeWindowAttributesAux::new().event_mask(mask))?;

        Ok(())
    }

    fn grab_pointer(&self, cursor: Cursor) -> Result<()> {
        self.conn
            .grab_pointer(
                false,
                *self.root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                self.cursor_id(cursor),
                CURRENT_TIME,
            )?
            .reply()?;

        Ok(())
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;

        Ok(())
    }

    fn query_pointer(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(*self.root)?.reply()?;

        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    fn warp_pointer(&self, win: Xid, x: i32, y: i32) -> Result<()> {
        self.conn
            .warp_pointer(NONE, *win, 0, 0, 0, 0, x as i16, y as i16)?;

        Ok(())
    }

    fn allow_click_replay(&self) -> Result<()> {
        self.conn
            .allow_events(x11rb::protocol::xproto::Allow::REPLAY_POINTER, CURRENT_TIME)?;

        Ok(())
    }

    fn set_cursor(&self, win: Xid, cursor: Cursor) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().cursor(self.cursor_id(cursor));
        self.conn.change_window_attributes(*win, &aux)?;

        Ok(())
    }

    fn window_attributes(&self, win: Xid) -> Result<WindowAttributes> {
        let attrs = self.conn.get_window_attributes(*win)?.reply()?;
        let geo = self.conn.get_geometry(*win)?.reply()?;
        let map_state = match attrs.map_state {
            x11rb::protocol::xproto::MapState::UNMAPPED => MapState::Unmapped,
            x11rb::protocol::xproto::MapState::UNVIEWABLE => MapState::Unviewable,
            _ => MapState::Viewable,
        };

        Ok(WindowAttributes {
            rect: Rect::new(geo.x as i32, geo.y as i32, geo.width as u32, geo.height as u32),
            border_width: geo.border_width as i32,
            override_redirect: attrs.override_redirect,
            map_state,
        })
    }

    fn map(&self, win: Xid) -> Result<()> {
        self.conn.map_window(*win)?;

        Ok(())
    }

    fn unmap(&self, win: Xid) -> Result<()> {
        self.conn.unmap_window(*win)?;

        Ok(())
    }

    fn kill(&self, win: Xid) -> Result<()> {
        self.conn.kill_client(*win)?;

        Ok(())
    }

    fn move_window(&self, win: Xid, x: i32, y: i32) -> Result<()> {
        self.conn
            .configure_window(*win, &ConfigureWindowAux::new().x(x).y(y))?;

        Ok(())
    }

    fn move_resize(&self, win: Xid, r: Rect) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(r.x)
            .y(r.y)
            .width(r.w)
            .height(r.h);
        self.conn.configure_window(*win, &aux)?;

        Ok(())
    }

    fn set_border_width(&self, win: Xid, bw: u32) -> Result<()> {
        self.conn
            .configure_window(*win, &ConfigureWindowAux::new().border_width(bw))?;

        Ok(())
    }

    fn set_border_color(&self, win: Xid, color: u32) -> Result<()> {
        self.conn
            .change_window_attributes(*win, &ChangeWindowAttributesAux::new().border_pixel(color))?;

        Ok(())
    }

    fn raise(&self, win: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.conn.configure_window(*win, &aux)?;

        Ok(())
    }

    fn stack_below(&self, win: Xid, sibling: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .sibling(*sibling)
            .stack_mode(StackMode::BELOW);
        self.conn.configure_window(*win, &aux)?;

        Ok(())
    }

    fn set_input_focus(&self, win: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, *win, CURRENT_TIME)?;

        Ok(())
    }

    fn send_protocol(&self, win: Xid, proto: Atom) -> Result<bool> {
        let protocols = self.prop_u32s(win, self.known_atom(Atom::WmProtocols), AtomEnum::ATOM, 32)?;
        let target = self.known_atom(proto);
        if !protocols.contains(&target) {
            return Ok(false);
        }

        let ev = ClientMessageEvent::new(
            32,
            *win,
            self.known_atom(Atom::WmProtocols),
            [target, CURRENT_TIME, 0, 0, 0],
        );
        self.conn.send_event(false, *win, EventMask::NO_EVENT, ev)?;

        Ok(true)
    }

    fn send_configure_notify(&self, win: Xid, r: Rect, bw: i32) -> Result<()> {
        let ev = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: *win,
            window: *win,
            above_sibling: NONE,
            x: r.x as i16,
            y: r.y as i16,
            width: r.w as u16,
            height: r.h as u16,
            border_width: bw.max(0) as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, *win, EventMask::STRUCTURE_NOTIFY, ev)?;

        Ok(())
    }

    fn configure_unmanaged(&self, ev: &ConfigureRequest) -> Result<()> {
        use crate::x::event::ConfigureMask;

        let mut aux = ConfigureWindowAux::new();
        if ev.mask.contains(ConfigureMask::X) {
            aux = aux.x(ev.x);
        }
        if ev.mask.contains(ConfigureMask::Y) {
            aux = aux.y(ev.y);
        }
        if ev.mask.contains(ConfigureMask::WIDTH) {
            aux = aux.width(ev.w);
        }
        if ev.mask.contains(ConfigureMask::HEIGHT) {
            aux = aux.height(ev.h);
        }
        if ev.mask.contains(ConfigureMask::BORDER_WIDTH) {
            aux = aux.border_width(ev.border_width);
        }
        self.conn.configure_window(*ev.win, &aux)?;

        Ok(())
    }

    fn get_text_prop(&self, win: Xid, atom: Atom) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(false, *win, self.known_atom(atom), AtomEnum::ANY, 0, 1024)?
            .reply()?;
        if reply.value.is_empty() {
            return Ok(None);
        }
        let raw: Vec<u8> = reply.value.into_iter().take_while(|&b| b != 0).collect();

        Ok(Some(String::from_utf8(raw)?))
    }

    fn get_wm_class(&self, win: Xid) -> Result<Option<(String, String)>> {
        let reply = match WmClass::get(&self.conn, *win)?.reply_unchecked()? {
            Some(r) => r,
            None => return Ok(None),
        };
        let instance = String::from_utf8_lossy(reply.instance()).to_string();
        let class = String::from_utf8_lossy(reply.class()).to_string();

        Ok(Some((instance, class)))
    }

    fn get_size_hints(&self, win: Xid) -> Result<SizeHints> {
        let hints = match WmSizeHints::get_normal_hints(&self.conn, *win)?.reply_unchecked()? {
            Some(h) => h,
            None => return Ok(SizeHints::default()),
        };
        let aspect = hints.aspect.map(|(min, max)| {
            (
                (min.numerator, min.denominator),
                (max.numerator, max.denominator),
            )
        });

        Ok(SizeHints::from_raw(
            hints.base_size,
            hints.min_size,
            hints.max_size,
            hints.size_increment,
            aspect,
        ))
    }

    fn get_wm_hints(&self, win: Xid) -> Result<Option<WmHintsData>> {
        let hints = match WmHints::get(&self.conn, *win)?.reply_unchecked()? {
            Some(h) => h,
            None => return Ok(None),
        };

        Ok(Some(WmHintsData {
            urgent: hints.urgent,
            accepts_input: hints.input.unwrap_or(true),
        }))
    }

    fn set_urgency_hint(&self, win: Xid, urgent: bool) -> Result<()> {
        let mut raw = self.prop_u32s(win, u32::from(AtomEnum::WM_HINTS), AtomEnum::WM_HINTS, 9)?;
        raw.resize(9, 0);
        if urgent {
            raw[0] |= URGENCY_HINT;
        } else {
            raw[0] &= !URGENCY_HINT;
        }
        self.conn.change_property32(
            PropMode::REPLACE,
            *win,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            &raw,
        )?;

        Ok(())
    }

    fn get_transient_for(&self, win: Xid) -> Result<Option<Xid>> {
        let vals = self.prop_u32s(
            win,
            u32::from(AtomEnum::WM_TRANSIENT_FOR),
            AtomEnum::WINDOW,
            1,
        )?;

        Ok(vals.first().filter(|&&w| w != NONE).map(|&w| Xid(w)))
    }

    fn get_window_type(&self, win: Xid) -> Result<Option<String>> {
        let vals = self.prop_u32s(win, self.known_atom(Atom::NetWmWindowType), AtomEnum::ATOM, 32)?;

        match vals.first() {
            Some(&id) => Ok(Some(self.atom_name(id)?)),
            None => Ok(None),
        }
    }

    fn is_fullscreen_prop_set(&self, win: Xid) -> Result<bool> {
        let vals = self.prop_u32s(win, self.known_atom(Atom::NetWmState), AtomEnum::ATOM, 32)?;

        Ok(vals.contains(&self.known_atom(Atom::NetWmStateFullscreen)))
    }

    fn get_motif_decorations(&self, win: Xid) -> Result<Option<bool>> {
        let atom = self.known_atom(Atom::MotifWmHints);
        let vals = self.prop_u32s(win, atom, AtomEnum::ANY, 5)?;
        if vals.len() < 3 || vals[0] & MOTIF_FLAG_DECORATIONS == 0 {
            return Ok(None);
        }
        let decorated =
            vals[2] & (MOTIF_DECOR_ALL | MOTIF_DECOR_BORDER | MOTIF_DECOR_TITLE) != 0;

        Ok(Some(decorated))
    }

    fn get_pid(&self, win: Xid) -> Result<Option<u32>> {
        let vals = self.prop_u32s(win, self.known_atom(Atom::NetWmPid), AtomEnum::CARDINAL, 1)?;

        Ok(vals.first().copied().filter(|&p| p != 0))
    }

    fn get_wm_state(&self, win: Xid) -> Result<Option<WmState>> {
        let atom = self.known_atom(Atom::WmState);
        let vals = self.prop_u32s(win, atom, AtomEnum::ANY, 2)?;

        Ok(match vals.first() {
            Some(0) => Some(WmState::Withdrawn),
            Some(1) => Some(WmState::Normal),
            Some(3) => Some(WmState::Iconic),
            _ => None,
        })
    }

    fn set_wm_state(&self, win: Xid, state: WmState) -> Result<()> {
        let atom = self.known_atom(Atom::WmState);
        self.conn
            .change_property32(PropMode::REPLACE, *win, atom, atom, &[state.into(), NONE])?;

        Ok(())
    }

    fn set_prop_cardinal(&self, win: Xid, prop: Atom, vals: &[u32]) -> Result<()> {
        self.conn.change_property32(
            PropMode::REPLACE,
            *win,
            self.known_atom(prop),
            AtomEnum::CARDINAL,
            vals,
        )?;

        Ok(())
    }

    fn set_prop_window(&self, win: Xid, prop: Atom, vals: &[Xid]) -> Result<()> {
        let raw: Vec<u32> = vals.iter().map(|w| **w).collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            *win,
            self.known_atom(prop),
            AtomEnum::WINDOW,
            &raw,
        )?;

        Ok(())
    }

    fn append_prop_window(&self, win: Xid, prop: Atom, val: Xid) -> Result<()> {
        self.conn.change_property32(
            PropMode::APPEND,
            *win,
            self.known_atom(prop),
            AtomEnum::WINDOW,
            &[*val],
        )?;

        Ok(())
    }

    fn prepend_prop_window(&self, win: Xid, prop: Atom, val: Xid) -> Result<()> {
        self.conn.change_property32(
            PropMode::PREPEND,
            *win,
            self.known_atom(prop),
            AtomEnum::WINDOW,
            &[*val],
        )?;

        Ok(())
    }

    fn set_prop_string(&self, win: Xid, prop: Atom, val: &str) -> Result<()> {
        self.conn.change_property8(
            PropMode::REPLACE,
            *win,
            self.known_atom(prop),
            self.known_atom(Atom::UTF8String),
            val.as_bytes(),
        )?;

        Ok(())
    }

    fn set_prop_atoms(&self, win: Xid, prop: Atom, vals: &[Atom]) -> Result<()> {
        let raw: Vec<u32> = vals.iter().map(|&a| self.known_atom(a)).collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            *win,
            self.known_atom(prop),
            AtomEnum::ATOM,
            &raw,
        )?;

        Ok(())
    }

    fn delete_prop(&self, win: Xid, prop: Atom) -> Result<()> {
        self.conn.delete_property(*win, self.known_atom(prop))?;

        Ok(())
    }

    fn atom_id(&self, atom: Atom) -> Result<u32> {
        Ok(self.known_atom(atom))
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        let reply = self.conn.query_tree(*self.root)?.reply()?;

        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn create_check_window(&self) -> Result<Xid> {
        let id = self.conn.generate_id()?;
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            id,
            *self.root,
            -1,
            -1,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new().override_redirect(1),
        )?;

        Ok(Xid(id))
    }

    fn keycode_for_keysym(&self, keysym: u32) -> Result<Option<u8>> {
        let setup = self.conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let reply = self
            .conn
            .get_keyboard_mapping(min, max - min + 1)?
            .reply()?;
        let per = reply.keysyms_per_keycode as usize;
        if per == 0 {
            return Ok(None);
        }

        for (i, chunk) in reply.keysyms.chunks(per).enumerate() {
            if chunk.first() == Some(&keysym) {
                return Ok(Some(min + i as u8));
            }
        }

        Ok(None)
    }

    fn create_bar_window(&self, r: Rect) -> Result<Xid> {
        let id = self.conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .override_redirect(1)
            .background_pixel(self.conn.setup().roots[0].black_pixel)
            .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE | EventMask::POINTER_MOTION)
            .cursor(self.cursor_normal);
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            id,
            *self.root,
            r.x as i16,
            r.y as i16,
            r.w as u16,
            r.h as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        Ok(Xid(id))
    }

    fn destroy_window(&self, win: Xid) -> Result<()> {
        self.conn.destroy_window(*win)?;

        Ok(())
    }

    fn text_width(&self, txt: &str) -> Result<u32> {
        let chars: Vec<Char2b> = txt
            .bytes()
            .map(|b| Char2b { byte1: 0, byte2: b })
            .collect();
        let reply = self.conn.query_text_extents(self.font, &chars)?.reply()?;

        Ok(reply.overall_width.max(0) as u32)
    }

    fn draw_bar(&self, win: Xid, cells: &[BarCell], _w: u32, h: u32) -> Result<()> {
        use x11rb::protocol::xproto::ChangeGCAux;

        let baseline = (h as i16 + self.font_ascent - self.font_descent) / 2;

        for cell in cells {
            self.conn
                .change_gc(self.gc, &ChangeGCAux::new().foreground(cell.bg))?;
            let rect = Rectangle {
                x: cell.x as i16,
                y: 0,
                width: cell.w as u16,
                height: h as u16,
            };
            self.conn.poly_fill_rectangle(*win, self.gc, &[rect])?;

            if cell.marker {
                self.conn
                    .change_gc(self.gc, &ChangeGCAux::new().foreground(cell.fg))?;
                let side = (h / 9).max(2) as u16;
                let marker = Rectangle {
                    x: cell.x as i16 + 1,
                    y: 1,
                    width: side,
                    height: side,
                };
                self.conn.poly_fill_rectangle(*win, self.gc, &[marker])?;
            }

            if let Some(text) = &cell.text {
                if text.is_empty() {
                    continue;
                }
                let tw = self.text_width(text)?;
                let tx = cell.x + (cell.w.saturating_sub(tw) / 2) as i32;
                self.conn.change_gc(
                    self.gc,
                    &ChangeGCAux::new().foreground(cell.fg).background(cell.bg),
                )?;
                // image_text8 requests cap out at 255 glyphs
                let bytes: Vec<u8> = text.bytes().take(255).collect();
                self.conn
                    .image_text8(*win, self.gc, tx as i16, baseline, &bytes)?;
            }
        }
        let _ = self.conn.flush();

        Ok(())
    }
}

fn button_index(b: MouseButton) -> ButtonIndex {
    match b {
        MouseButton::Left => ButtonIndex::M1,
        MouseButton::Middle => ButtonIndex::M2,
        MouseButton::Right => ButtonIndex::M3,
        MouseButton::ScrollUp => ButtonIndex::M4,
        MouseButton::ScrollDown => ButtonIndex::M5,
    }
}
