//! The verbs of the window manager: focus movement, arrangement, monitor
//! bookkeeping and the client property updates driven by X events.
//!
//! Everything here is a free function over `(&mut State, &impl XConn)` so
//! that key and mouse handlers can call straight into them while the
//! binding tables remain borrowed.
use crate::{
    core::{bar, swallow, State, SCHEME_FLOAT, SCHEME_NORM, SCHEME_SEL},
    layout::{LayoutClient, LayoutCtx},
    pure::{
        client::{Client, ClientId},
        floatpos::FloatSpec,
        geometry::{Point, Rect},
        hints::{apply_size_hints, HintContext},
        monitor::Monitor,
    },
    rules::apply_rules,
    status::{StatusText, DEFAULT_STATUS},
    x::{Atom, WindowAttributes, WmState, XConn, XConnExt},
    Result, Xid,
};

// -- lookups ------------------------------------------------------------

pub(crate) fn win_to_client(state: &State, win: Xid) -> Option<ClientId> {
    state.clients.id_for_win(win)
}

/// The monitor a rectangle mostly overlaps, falling back to the selected
/// monitor for rects off every screen.
pub(crate) fn rect_to_mon(state: &State, r: Rect) -> usize {
    let mut best = (state.sel_mon, 0u64);
    for (i, m) in state.monitors.iter().enumerate() {
        let area = r.intersection_area(&m.screen);
        if area > best.1 {
            best = (i, area);
        }
    }

    best.0
}

pub(crate) fn point_to_mon(state: &State, p: Point) -> usize {
    rect_to_mon(state, Rect::new(p.x, p.y, 1, 1))
}

/// The monitor owning a window: bars and clients map directly, anything
/// else resolves through the pointer position.
pub(crate) fn win_to_mon<X: XConn>(state: &State, x: &X, win: Xid) -> usize {
    if win == x.root() {
        if let Ok(p) = x.query_pointer() {
            return point_to_mon(state, p);
        }
    }
    for (i, m) in state.monitors.iter().enumerate() {
        if m.bar_win == win {
            return i;
        }
    }
    if let Some(id) = win_to_client(state, win) {
        if let Some(c) = state.clients.get(id) {
            return c.monitor;
        }
    }

    state.sel_mon
}

/// Next (positive) or previous (negative) monitor, wrapping.
pub(crate) fn dir_to_mon(state: &State, dir: i32) -> usize {
    let n = state.monitors.len();
    if dir > 0 {
        (state.sel_mon + 1) % n
    } else {
        (state.sel_mon + n - 1) % n
    }
}

// -- geometry -----------------------------------------------------------

/// Move / resize a client, respecting size hints and screen bounds.
pub(crate) fn resize<X: XConn>(
    state: &mut State,
    x: &X,
    id: ClientId,
    r: Rect,
    interactive: bool,
) -> Result<()> {
    let c = match state.clients.get(id) {
        Some(c) => c,
        None => return Ok(()),
    };
    let m = &state.monitors[c.monitor];
    let layout_floats = state.config.layouts[m.active_layout()].is_floating();
    let ctx = HintContext {
        screen: state.screen,
        window_area: m.window_area,
        bar_h: state.config.bar_h,
        apply_hints: !c.ignore_size_hints
            && (state.config.resize_hints || c.is_floating || layout_floats),
    };

    let (nx, ny, nw, nh, changed) = apply_size_hints(
        &c.hints,
        c.rect,
        c.bw,
        r.x,
        r.y,
        r.w as i32,
        r.h as i32,
        interactive,
        &ctx,
    );
    if changed {
        resize_client(state, x, id, Rect::new(nx, ny, nw.max(1) as u32, nh.max(1) as u32))?;
    }

    Ok(())
}

/// Apply a geometry unconditionally and tell the client about it.
pub(crate) fn resize_client<X: XConn>(
    state: &mut State,
    x: &X,
    id: ClientId,
    r: Rect,
) -> Result<()> {
    let (win, bw) = match state.clients.get_mut(id) {
        Some(c) => {
            c.old_rect = c.rect;
            c.rect = r;
            (c.win, c.bw)
        }
        None => return Ok(()),
    };

    x.move_resize(win, r)?;
    x.set_border_width(win, bw.max(0) as u32)?;
    x.send_configure_notify(win, r, bw)?;

    Ok(())
}

/// Place a floating client according to a placement spec.
///
/// Spec-placed clients opt out of size hint handling so the requested
/// geometry is honoured exactly.
pub(crate) fn apply_float_spec(state: &mut State, id: ClientId, spec: &FloatSpec) {
    let (wa, cur, bw) = match state.clients.get(id) {
        Some(c) => (state.monitors[c.monitor].window_area, c.rect, c.bw),
        None => return,
    };
    let r = spec.resolve(wa, cur, bw, state.config.float_pos_grid);

    if let Some(c) = state.clients.get_mut(id) {
        c.rect = r;
        c.ignore_size_hints = true;
    }
}

// -- focus --------------------------------------------------------------

/// Focus a client, or whatever is most recently usable when passed `None`.
#[tracing::instrument(level = "trace", skip(state, x))]
pub(crate) fn focus<X: XConn>(state: &mut State, x: &X, id: Option<ClientId>) -> Result<()> {
    let tagset = state.sel_monitor().active_tagset();
    let id = id
        .filter(|&i| state.clients.get(i).is_some_and(|c| c.is_visible_on(tagset)))
        .or_else(|| state.sel_monitor().top_of_stack(&state.clients));

    let old = state.sel_client();
    if old.is_some() && old != id {
        if let Some(o) = old {
            unfocus(state, x, o, false)?;
        }
    }

    match id {
        Some(i) => {
            let (mon, win, urgent, floating, never_focus) = match state.clients.get(i) {
                Some(c) => (c.monitor, c.win, c.is_urgent, c.is_floating, c.never_focus),
                None => return Ok(()),
            };
            if mon != state.sel_mon {
                state.sel_mon = mon;
            }
            if urgent {
                set_urgent(state, x, i, false)?;
            }
            let m = &mut state.monitors[mon];
            m.detach_stack(i, &state.clients);
            m.attach_stack(i);
            m.sel = Some(i);

            grab_client_buttons(state, x, i, true)?;
            let scheme = if floating { SCHEME_FLOAT } else { SCHEME_SEL };
            x.set_border_color(win, state.config.colors[scheme].border)?;
            if !never_focus {
                x.set_input_focus(win)?;
                x.set_prop_window(x.root(), Atom::NetActiveWindow, &[win])?;
            }
            x.send_protocol(win, Atom::WmTakeFocus)?;
        }
        None => {
            x.set_input_focus(x.root())?;
            x.delete_prop(x.root(), Atom::NetActiveWindow)?;
            state.sel_monitor_mut().sel = None;
        }
    }

    bar::draw_all(state, x)?;

    Ok(())
}

pub(crate) fn unfocus<X: XConn>(
    state: &mut State,
    x: &X,
    id: ClientId,
    set_focus_root: bool,
) -> Result<()> {
    let win = match state.clients.get(id) {
        Some(c) => c.win,
        None => return Ok(()),
    };

    grab_client_buttons(state, x, id, false)?;
    x.set_border_color(win, state.config.colors[SCHEME_NORM].border)?;
    if set_focus_root {
        x.set_input_focus(x.root())?;
        x.delete_prop(x.root(), Atom::NetActiveWindow)?;
    }

    Ok(())
}

pub(crate) fn grab_client_buttons<X: XConn>(
    state: &State,
    x: &X,
    id: ClientId,
    focused: bool,
) -> Result<()> {
    if let Some(c) = state.clients.get(id) {
        x.grab_buttons(c.win, &state.client_grabs, focused)?;
    }

    Ok(())
}

pub(crate) fn set_urgent<X: XConn>(
    state: &mut State,
    x: &X,
    id: ClientId,
    urgent: bool,
) -> Result<()> {
    if let Some(c) = state.clients.get_mut(id) {
        c.is_urgent = urgent;
        x.set_urgency_hint(c.win, urgent)?;
    }

    Ok(())
}

// -- arrangement --------------------------------------------------------

/// Re-arrange one monitor, or every monitor when passed `None`.
#[tracing::instrument(level = "trace", skip(state, x))]
pub(crate) fn arrange<X: XConn>(state: &mut State, x: &X, mon: Option<usize>) -> Result<()> {
    match mon {
        Some(m) => {
            show_hide(state, x, m)?;
            arrange_monitor(state, x, m)?;
            restack(state, x, m)?;
        }
        None => {
            for m in 0..state.monitors.len() {
                show_hide(state, x, m)?;
            }
            for m in 0..state.monitors.len() {
                arrange_monitor(state, x, m)?;
            }
        }
    }

    Ok(())
}

/// Park hidden clients far off screen and bring visible ones back.
fn show_hide<X: XConn>(state: &mut State, x: &X, mon: usize) -> Result<()> {
    let tagset = state.monitors[mon].active_tagset();
    let layout_floats = {
        let m = &state.monitors[mon];
        state.config.layouts[m.active_layout()].is_floating()
    };
    let stack = state.monitors[mon].stack.clone();

    for &id in stack.iter() {
        let (visible, rect, floating, fullscreen) = match state.clients.get(id) {
            Some(c) => (c.is_visible_on(tagset), c.rect, c.is_floating, c.is_fullscreen),
            None => continue,
        };
        if visible {
            x.move_window(state.clients.get(id).map(|c| c.win).unwrap_or(Xid(0)), rect.x, rect.y)?;
            if (layout_floats || floating) && !fullscreen {
                resize(state, x, id, rect, false)?;
            }
        }
    }
    for &id in stack.iter().rev() {
        if let Some(c) = state.clients.get(id) {
            if !c.is_visible_on(tagset) {
                x.move_window(c.win, -2 * c.width(), c.rect.y)?;
            }
        }
    }

    Ok(())
}

fn arrange_monitor<X: XConn>(state: &mut State, x: &X, mon: usize) -> Result<()> {
    let layout = {
        let m = &state.monitors[mon];
        state.config.layouts[m.active_layout()]
    };
    let n_visible = state.monitors[mon].visible(&state.clients).count();
    state.monitors[mon].lt_symbol = layout.arrange_symbol(n_visible);

    if layout.is_floating() {
        return Ok(());
    }

    let clients: Vec<LayoutClient> = state.monitors[mon]
        .tiled(&state.clients)
        .filter_map(|id| {
            state.clients.get(id).map(|c| LayoutClient {
                id,
                cfact: c.cfact,
                bw: c.bw,
            })
        })
        .collect();

    let m = &state.monitors[mon];
    let ctx = LayoutCtx {
        work_area: m.window_area,
        gaps: m.gaps,
        gaps_enabled: m.enable_gaps,
        smart_gaps: state.config.smart_gaps,
        n_master: m.n_master,
        mfact: m.mfact,
        bar_h: state.config.bar_h,
    };

    for (id, r) in layout.arrange(&ctx, &clients) {
        resize(state, x, id, r, false)?;
    }

    Ok(())
}

/// Redraw the bar and fix the stacking order: the selected floater on top,
/// tiled clients below the bar.
pub(crate) fn restack<X: XConn>(state: &mut State, x: &X, mon: usize) -> Result<()> {
    bar::draw(state, x, mon)?;

    let sel = state.monitors[mon].sel;
    let sel = match sel {
        Some(s) => s,
        None => return Ok(()),
    };

    let layout_floats = {
        let m = &state.monitors[mon];
        state.config.layouts[m.active_layout()].is_floating()
    };
    let sel_floating = state.clients.get(sel).is_some_and(|c| c.is_floating);
    if sel_floating || layout_floats {
        if let Some(c) = state.clients.get(sel) {
            x.raise(c.win)?;
        }
    }

    if !layout_floats {
        let tagset = state.monitors[mon].active_tagset();
        let mut sibling = state.monitors[mon].bar_win;
        for &id in state.monitors[mon].stack.clone().iter() {
            if let Some(c) = state.clients.get(id) {
                if c.is_visible_on(tagset) && !c.is_floating {
                    x.stack_below(c.win, sibling)?;
                    sibling = c.win;
                }
            }
        }
    }

    x.sync_and_drain_enters()?;

    Ok(())
}

// -- monitor movement ---------------------------------------------------

pub(crate) fn send_to_monitor<X: XConn>(
    state: &mut State,
    x: &X,
    id: ClientId,
    target: usize,
) -> Result<()> {
    let from = match state.clients.get(id) {
        Some(c) if c.monitor != target => c.monitor,
        _ => return Ok(()),
    };

    unfocus(state, x, id, true)?;
    state.monitors[from].detach(id);
    state.monitors[from].detach_stack(id, &state.clients);

    let tags = state.monitors[target].active_tagset();
    let floating = match state.clients.get_mut(id) {
        Some(c) => {
            c.monitor = target;
            c.tags = tags;
            c.is_floating
        }
        None => return Ok(()),
    };

    state.monitors[target].attach_below(id, &state.clients);
    state.monitors[target].attach_stack(id);
    update_client_desktop(state, x, id)?;

    if floating {
        let spec = state.config.default_float_pos;
        apply_float_spec(state, id, &spec);
        if let Some(c) = state.clients.get(id) {
            let r = c.rect;
            resize_client(state, x, id, r)?;
        }
    }

    focus(state, x, None)?;
    arrange(state, x, None)?;

    Ok(())
}

// -- fullscreen ---------------------------------------------------------

pub(crate) fn set_fullscreen<X: XConn>(
    state: &mut State,
    x: &X,
    id: ClientId,
    fullscreen: bool,
) -> Result<()> {
    let (win, currently, mon) = match state.clients.get(id) {
        Some(c) => (c.win, c.is_fullscreen, c.monitor),
        None => return Ok(()),
    };

    if fullscreen && !currently {
        x.set_prop_atoms(win, Atom::NetWmState, &[Atom::NetWmStateFullscreen])?;
        let screen = state.monitors[mon].screen;
        if let Some(c) = state.clients.get_mut(id) {
            c.is_fullscreen = true;
            c.old_state = c.is_floating;
            c.old_bw = c.bw;
            c.bw = 0;
            c.is_floating = true;
        }
        resize_client(state, x, id, screen)?;
        x.raise(win)?;
    } else if !fullscreen && currently {
        x.set_prop_atoms(win, Atom::NetWmState, &[])?;
        let old = match state.clients.get_mut(id) {
            Some(c) => {
                c.is_fullscreen = false;
                c.is_floating = c.old_state;
                c.bw = c.old_bw;
                c.rect = c.old_rect;
                c.old_rect
            }
            None => return Ok(()),
        };
        resize_client(state, x, id, old)?;
        arrange(state, x, Some(mon))?;
    }

    Ok(())
}

// -- client property updates --------------------------------------------

pub(crate) fn update_title<X: XConn>(state: &mut State, x: &X, id: ClientId) -> Result<()> {
    if let Some(c) = state.clients.get_mut(id) {
        c.name = x.window_title(c.win)?;
    }

    Ok(())
}

pub(crate) fn update_size_hints<X: XConn>(state: &mut State, x: &X, id: ClientId) -> Result<()> {
    if let Some(c) = state.clients.get_mut(id) {
        c.hints = x.get_size_hints(c.win)?;
        c.update_fixed();
    }

    Ok(())
}

pub(crate) fn update_wm_hints<X: XConn>(state: &mut State, x: &X, id: ClientId) -> Result<()> {
    let sel = state.sel_client();
    if let Some(c) = state.clients.get_mut(id) {
        if let Some(h) = x.get_wm_hints(c.win)? {
            if Some(id) == sel && h.urgent {
                // the focused client has our attention already
                x.set_urgency_hint(c.win, false)?;
            } else {
                c.is_urgent = h.urgent;
            }
            c.never_focus = !h.accepts_input;
        }
    }

    Ok(())
}

pub(crate) fn update_window_type<X: XConn>(state: &mut State, x: &X, id: ClientId) -> Result<()> {
    let win = match state.clients.get(id) {
        Some(c) => c.win,
        None => return Ok(()),
    };

    if x.is_fullscreen_prop_set(win)? {
        set_fullscreen(state, x, id, true)?;
    }
    if x.get_window_type(win)? == Some(Atom::NetWindowTypeDialog.as_ref().to_string()) {
        if let Some(c) = state.clients.get_mut(id) {
            c.is_floating = true;
        }
    }

    Ok(())
}

pub(crate) fn update_motif_hints<X: XConn>(state: &mut State, x: &X, id: ClientId) -> Result<()> {
    let (win, cur_bw, rect) = match state.clients.get(id) {
        Some(c) => (c.win, c.bw, c.rect),
        None => return Ok(()),
    };

    if let Some(decorated) = x.get_motif_decorations(win)? {
        let bw = if decorated {
            state.config.border_px as i32
        } else {
            0
        };
        if bw != cur_bw {
            if let Some(c) = state.clients.get_mut(id) {
                c.bw = bw;
            }
            resize_client(state, x, id, rect)?;
        }
    }

    Ok(())
}

// -- monitors, bars and root properties ---------------------------------

/// Re-sync our monitor list with the physical screen layout.
///
/// New monitors are appended; clients on vanished monitors migrate to the
/// first one. Returns whether anything changed.
pub(crate) fn update_geometry<X: XConn>(state: &mut State, x: &X) -> Result<bool> {
    state.screen = x.screen_rect()?;
    let rects = x.monitor_rects()?;
    let mut dirty = false;

    for (i, &r) in rects.iter().enumerate() {
        match state.monitors.get_mut(i) {
            Some(m) => {
                if m.screen != r {
                    m.screen = r;
                    m.update_bar_pos(state.config.bar_h, state.config.bar_v_pad);
                    dirty = true;
                }
            }
            None => {
                let cfg = &state.config;
                let mut m = Monitor::new(
                    i,
                    r,
                    cfg.tags.len(),
                    cfg.n_master,
                    cfg.mfact,
                    cfg.show_bar,
                    cfg.top_bar,
                    cfg.gaps,
                );
                m.lt_symbol = cfg.layouts[0].symbol().to_string();
                m.update_bar_pos(cfg.bar_h, cfg.bar_v_pad);
                state.monitors.push(m);
                state.bar_regions.push(bar::BarRegions::default());
                dirty = true;
            }
        }
    }

    while state.monitors.len() > rects.len() {
        let dead = match state.monitors.pop() {
            Some(m) => m,
            None => break,
        };
        state.bar_regions.pop();
        dirty = true;

        for id in dead.clients.iter().copied().collect::<Vec<_>>() {
            let tags = state.monitors[0].active_tagset();
            if let Some(c) = state.clients.get_mut(id) {
                c.monitor = 0;
                c.tags = tags;
            }
            state.monitors[0].attach_below(id, &state.clients);
            state.monitors[0].attach_stack(id);
            update_client_desktop(state, x, id)?;
        }
        if dead.bar_win != Xid(0) {
            x.destroy_window(dead.bar_win)?;
        }
    }

    if dirty {
        state.sel_mon = state.sel_mon.min(state.monitors.len() - 1);
    }

    Ok(dirty)
}

/// Create missing bar windows and push every bar to its current position.
pub(crate) fn update_bars<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let bar_h = state.config.bar_h;
    for m in state.monitors.iter_mut() {
        let r = Rect::new(
            m.window_area.x,
            m.bar_y,
            m.window_area.w,
            bar_h.max(1) as u32,
        );
        if m.bar_win == Xid(0) {
            m.bar_win = x.create_bar_window(r)?;
            x.map(m.bar_win)?;
        } else {
            x.move_resize(m.bar_win, r)?;
        }
    }

    Ok(())
}

pub(crate) fn update_status<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let raw = x
        .get_text_prop(x.root(), Atom::WmName)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());
    state.status = StatusText::parse(&raw);

    if !state.monitors.is_empty() {
        bar::draw(state, x, state.sel_mon)?;
    }

    Ok(())
}

/// Rebuild _NET_CLIENT_LIST (attach order) and the stacking variant
/// (focus order) from scratch.
pub(crate) fn update_client_list<X: XConn>(state: &State, x: &X) -> Result<()> {
    let root = x.root();

    let mut wins = Vec::with_capacity(state.clients.len());
    for m in state.monitors.iter() {
        for &id in m.clients.iter() {
            if let Some(c) = state.clients.get(id) {
                wins.push(c.win);
            }
        }
    }
    x.set_prop_window(root, Atom::NetClientList, &wins)?;

    let mut stacked = Vec::with_capacity(state.clients.len());
    for m in state.monitors.iter() {
        for &id in m.stack.iter().rev() {
            if let Some(c) = state.clients.get(id) {
                stacked.push(c.win);
            }
        }
    }
    x.set_prop_window(root, Atom::NetClientListStacking, &stacked)?;

    Ok(())
}

/// Mirror a client's tag assignment into _NET_WM_DESKTOP for pagers.
pub(crate) fn update_client_desktop<X: XConn>(state: &State, x: &X, id: ClientId) -> Result<()> {
    if let Some(c) = state.clients.get(id) {
        let desktop = if c.tags == 0 {
            0
        } else {
            31 - c.tags.leading_zeros()
        };
        x.set_prop_cardinal(c.win, Atom::NetWmDesktop, &[desktop])?;
    }

    Ok(())
}

pub(crate) fn update_current_desktop<X: XConn>(state: &State, x: &X) -> Result<()> {
    let tagset = state.sel_monitor().active_tagset();
    let desktop = if tagset == 0 {
        0
    } else {
        31 - tagset.leading_zeros()
    };
    x.set_prop_cardinal(x.root(), Atom::NetCurrentDesktop, &[desktop])?;

    Ok(())
}

// -- managing clients ---------------------------------------------------

/// Adopt the windows that already exist when the manager starts.
pub(crate) fn scan<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let wins = x.existing_clients()?;
    let mut transients = Vec::new();

    for win in wins {
        let attrs = match x.window_attributes(win) {
            Ok(a) => a,
            Err(_) => continue,
        };
        if attrs.override_redirect {
            continue;
        }
        if x.get_transient_for(win)?.is_some() {
            transients.push((win, attrs));
            continue;
        }
        if should_adopt(x, win, &attrs)? {
            manage(state, x, win, &attrs)?;
        }
    }
    // transients are managed last so their parents already exist
    for (win, attrs) in transients {
        if should_adopt(x, win, &attrs)? {
            manage(state, x, win, &attrs)?;
        }
    }

    Ok(())
}

fn should_adopt<X: XConn>(x: &X, win: Xid, attrs: &WindowAttributes) -> Result<bool> {
    Ok(attrs.map_state == crate::x::MapState::Viewable
        || x.get_wm_state(win)? == Some(WmState::Iconic))
}

/// Bring a new window under management.
#[tracing::instrument(level = "trace", skip(state, x, attrs))]
pub(crate) fn manage<X: XConn>(
    state: &mut State,
    x: &X,
    win: Xid,
    attrs: &WindowAttributes,
) -> Result<()> {
    let mut c = Client::new(win, attrs.rect, attrs.border_width, x.get_pid(win)?);
    c.name = x.window_title(win)?;
    c.monitor = state.sel_mon;

    let trans = x.get_transient_for(win)?.and_then(|t| win_to_client(state, t));
    let mut float_spec = None;
    let mut term = None;

    match trans.and_then(|t| state.clients.get(t)) {
        Some(parent) => {
            c.monitor = parent.monitor;
            c.tags = parent.tags;
        }
        None => {
            let out = apply_rules(&state.config.rules, &x.window_props(win)?);
            c.is_floating = out.is_floating;
            c.is_terminal = out.is_terminal;
            c.no_swallow = out.no_swallow;
            c.tags = out.tags;
            if let Some(m) = out.monitor.filter(|&m| m < state.monitors.len()) {
                c.monitor = m;
            }
            float_spec = out.float_pos;
            term = swallow::term_for(state, &c);
        }
    }
    let mask = state.config.tag_mask();
    c.tags = if c.tags & mask != 0 {
        c.tags & mask
    } else {
        state.monitors[c.monitor].active_tagset()
    };

    // keep the new window on its monitor, clear of the bar
    let m = &state.monitors[c.monitor];
    if c.rect.x + c.width() > m.window_area.right() {
        c.rect.x = m.window_area.right() - c.width();
    }
    if c.rect.y + c.height() > m.window_area.bottom() {
        c.rect.y = m.window_area.bottom() - c.height();
    }
    c.rect.x = c.rect.x.max(m.window_area.x);
    c.rect.y = c.rect.y.max(m.window_area.y);
    c.bw = state.config.border_px as i32;

    let mon = c.monitor;
    let id = state.clients.insert(c);

    x.set_border_width(win, state.config.border_px)?;
    x.set_border_color(win, state.config.colors[SCHEME_NORM].border)?;
    if let Some(c) = state.clients.get(id) {
        x.send_configure_notify(win, c.rect, c.bw)?;
    }

    update_window_type(state, x, id)?;
    update_size_hints(state, x, id)?;
    update_wm_hints(state, x, id)?;
    update_motif_hints(state, x, id)?;

    if let Some(spec) = float_spec {
        apply_float_spec(state, id, &spec);
        if let Some(c) = state.clients.get_mut(id) {
            c.is_floatpos = true;
        }
    }

    let layout_floats = {
        let m = &state.monitors[mon];
        state.config.layouts[m.active_layout()].is_floating()
    };
    let needs_default_pos = state.clients.get(id).is_some_and(|c| {
        ((c.is_floating && !c.is_fullscreen) || c.is_fixed || layout_floats) && !c.is_floatpos
    });
    if needs_default_pos {
        let spec = state.config.default_float_pos;
        apply_float_spec(state, id, &spec);
    }

    x.set_client_event_mask(win)?;
    grab_client_buttons(state, x, id, false)?;

    let floating = match state.clients.get_mut(id) {
        Some(c) => {
            c.is_floating = c.is_floating || trans.is_some() || c.is_fixed;
            c.old_state = c.is_floating;
            c.save_float_rect();
            c.is_floating
        }
        None => false,
    };
    if floating {
        x.raise(win)?;
    }

    state.monitors[mon].attach_below(id, &state.clients);
    state.monitors[mon].attach_stack(id);

    let root = x.root();
    x.append_prop_window(root, Atom::NetClientList, win)?;
    x.prepend_prop_window(root, Atom::NetClientListStacking, win)?;
    x.set_prop_cardinal(win, Atom::IsFloating, &[floating as u32])?;
    update_client_desktop(state, x, id)?;

    // map far off screen first so the client never flashes at a stale
    // position before the arrange lands
    if let Some(c) = state.clients.get(id) {
        let parked = Rect::new(c.rect.x + 2 * state.screen.w as i32, c.rect.y, c.rect.w, c.rect.h);
        x.move_resize(win, parked)?;
    }
    x.set_wm_state(win, WmState::Normal)?;

    if mon == state.sel_mon {
        if let Some(old) = state.sel_client() {
            unfocus(state, x, old, false)?;
        }
    }
    state.monitors[mon].sel = Some(id);

    arrange(state, x, Some(mon))?;
    x.map(win)?;

    if let Some(t) = term {
        swallow::swallow(state, x, t, id)?;
    }
    focus(state, x, None)?;
    info!(%win, name = ?state.clients.get(id).map(|c| c.name.clone()), "managed new client");

    Ok(())
}

/// Stop managing a client, restoring its pre-managed state when the window
/// still exists.
#[tracing::instrument(level = "trace", skip(state, x))]
pub(crate) fn unmanage<X: XConn>(
    state: &mut State,
    x: &X,
    id: ClientId,
    destroyed: bool,
) -> Result<()> {
    if state.clients.get(id).and_then(|c| c.swallowing).is_some() {
        swallow::unswallow(state, x, id)?;
        return Ok(());
    }

    let (win, mon, old_bw) = match state.clients.get(id) {
        Some(c) => (c.win, c.monitor, c.old_bw),
        None => return Ok(()),
    };

    // the hidden half of a swallow going away means the terminal process
    // died: the visible client carries on with its swallow link cleared
    if let Some(host) = state.clients.swallowing_win(win) {
        state.clients.remove(id);
        let host_mon = match state.clients.get_mut(host) {
            Some(h) => {
                h.swallowing = None;
                h.monitor
            }
            None => state.sel_mon,
        };
        for m in state.monitors.iter_mut() {
            m.pertag.forget_client(id);
        }
        arrange(state, x, Some(host_mon))?;
        focus(state, x, None)?;
        return Ok(());
    }

    state.monitors[mon].detach(id);
    state.monitors[mon].detach_stack(id, &state.clients);
    for m in state.monitors.iter_mut() {
        m.pertag.forget_client(id);
    }

    if !destroyed {
        x.set_border_width(win, old_bw.max(0) as u32)?;
        x.ungrab_buttons(win)?;
        x.set_wm_state(win, WmState::Withdrawn)?;
    }
    state.clients.remove(id);

    focus(state, x, None)?;
    update_client_list(state, x)?;
    arrange(state, x, Some(mon))?;

    Ok(())
}
