//! Per-event handlers driven by the main event loop.
use crate::{
    core::{actions, bar, ops, State},
    pure::geometry::{Point, Rect},
    x::{
        event::{ButtonEvent, ClientMessage, ConfigureEvent, ConfigureMask, ConfigureRequest,
               MotionEvent, PropertyEvent},
        Atom, Corner, Cursor, WmState, XConn, XEvent,
    },
    Result, Xid,
};

use super::bindings::{ClickInfo, ClickTarget};

/// Minimum interval between processed drag motion events (~60fps).
const DRAG_INTERVAL_MS: u32 = 1000 / 60;

pub(crate) fn button_press<X: XConn>(
    state: &mut State,
    x: &X,
    ev: &ButtonEvent,
) -> Result<Option<ClickInfo>> {
    let mon = ops::win_to_mon(state, x, ev.win);
    if mon != state.sel_mon {
        if let Some(sel) = state.sel_client() {
            ops::unfocus(state, x, sel, true)?;
        }
        state.sel_mon = mon;
        ops::focus(state, x, None)?;
    }

    let mask = ev.mask.clean(state.numlock);
    let mut info = ClickInfo::new(ClickTarget::RootWin, ev.button, mask);

    if ev.win == state.monitors[mon].bar_win {
        info = bar::route_click(state, x, mon, ev.x, info);
        if info.target == ClickTarget::StatusText {
            state.status_signal = info.signal.unwrap_or(0);
        }
    } else if let Some(id) = ops::win_to_client(state, ev.win) {
        ops::focus(state, x, Some(id))?;
        ops::restack(state, x, state.sel_mon)?;
        x.allow_click_replay()?;
        info.target = ClickTarget::ClientWin;
    }

    Ok(Some(info))
}

pub(crate) fn client_message<X: XConn>(
    state: &mut State,
    x: &X,
    msg: &ClientMessage,
) -> Result<()> {
    let id = match ops::win_to_client(state, msg.win) {
        Some(id) => id,
        None => return Ok(()),
    };

    if msg.atom == Atom::NetWmState.as_ref() {
        let fullscreen = x.atom_id(Atom::NetWmStateFullscreen)?;
        if msg.data[1] == fullscreen || msg.data[2] == fullscreen {
            let currently = state.clients.get(id).is_some_and(|c| c.is_fullscreen);
            // data[0]: 0 = remove, 1 = add, 2 = toggle
            let on = msg.data[0] == 1 || (msg.data[0] == 2 && !currently);
            ops::set_fullscreen(state, x, id, on)?;
        }
    } else if msg.atom == Atom::NetActiveWindow.as_ref() {
        // activation requests from unfocused windows only raise the
        // urgency hint, they never steal focus
        let already = state.clients.get(id).is_some_and(|c| c.is_urgent);
        if state.sel_client() != Some(id) && !already {
            ops::set_urgent(state, x, id, true)?;
        }
    }

    Ok(())
}

pub(crate) fn configure_notify<X: XConn>(
    state: &mut State,
    x: &X,
    ev: &ConfigureEvent,
) -> Result<()> {
    if ev.win != x.root() {
        return Ok(());
    }

    let dirty = state.screen.w != ev.rect.w || state.screen.h != ev.rect.h;
    state.screen.w = ev.rect.w;
    state.screen.h = ev.rect.h;

    if ops::update_geometry(state, x)? || dirty {
        refit_screens(state, x)?;
    }

    Ok(())
}

pub(crate) fn screen_change<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    if ops::update_geometry(state, x)? {
        refit_screens(state, x)?;
    }

    Ok(())
}

fn refit_screens<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let fullscreen: Vec<_> = state
        .clients
        .iter()
        .filter(|(_, c)| c.is_fullscreen)
        .map(|(id, c)| (id, c.monitor))
        .collect();
    for (id, mon) in fullscreen {
        let r = state.monitors[mon].screen;
        ops::resize_client(state, x, id, r)?;
    }
    ops::update_bars(state, x)?;
    ops::focus(state, x, None)?;
    ops::arrange(state, x, None)?;

    Ok(())
}

pub(crate) fn configure_request<X: XConn>(
    state: &mut State,
    x: &X,
    ev: &ConfigureRequest,
) -> Result<()> {
    let id = match ops::win_to_client(state, ev.win) {
        Some(id) => id,
        None => return x.configure_unmanaged(ev),
    };

    let mon = match state.clients.get(id) {
        Some(c) => c.monitor,
        None => return Ok(()),
    };
    let layout_floats = state.config.layouts[state.monitors[mon].active_layout()].is_floating();

    if ev.mask.contains(ConfigureMask::BORDER_WIDTH) {
        if let Some(c) = state.clients.get_mut(id) {
            c.bw = ev.border_width as i32;
        }
        return Ok(());
    }

    let floating = state.clients.get(id).is_some_and(|c| c.is_floating);
    if floating || layout_floats {
        let m = state.monitors[mon].screen;
        if let Some(c) = state.clients.get_mut(id) {
            if ev.mask.contains(ConfigureMask::X) {
                c.old_rect.x = c.rect.x;
                c.rect.x = m.x + ev.x;
            }
            if ev.mask.contains(ConfigureMask::Y) {
                c.old_rect.y = c.rect.y;
                c.rect.y = m.y + ev.y;
            }
            if ev.mask.contains(ConfigureMask::WIDTH) {
                c.old_rect.w = c.rect.w;
                c.rect.w = ev.w;
            }
            if ev.mask.contains(ConfigureMask::HEIGHT) {
                c.old_rect.h = c.rect.h;
                c.rect.h = ev.h;
            }
            // floating windows pushed off screen get recentered
            if c.rect.x + c.width() > m.x + m.w as i32 && c.is_floating {
                c.rect.x = m.x + (m.w as i32 / 2 - c.width() / 2);
            }
            if c.rect.y + c.height() > m.y + m.h as i32 && c.is_floating {
                c.rect.y = m.y + (m.h as i32 / 2 - c.height() / 2);
            }
        }
        if ev.is_move_only() {
            if let Some(c) = state.clients.get(id) {
                x.send_configure_notify(c.win, c.rect, c.bw)?;
            }
        }
        let tagset = state.monitors[mon].active_tagset();
        if let Some(c) = state.clients.get(id) {
            if c.is_visible_on(tagset) {
                x.move_resize(c.win, c.rect)?;
            }
        }
    } else if let Some(c) = state.clients.get(id) {
        x.send_configure_notify(c.win, c.rect, c.bw)?;
    }

    Ok(())
}

pub(crate) fn destroy_notify<X: XConn>(state: &mut State, x: &X, win: Xid) -> Result<()> {
    if let Some(id) = ops::win_to_client(state, win) {
        ops::unmanage(state, x, id, true)?;
    }

    Ok(())
}

pub(crate) fn enter_notify<X: XConn>(state: &mut State, x: &X, win: Xid) -> Result<()> {
    let id = ops::win_to_client(state, win);
    let mon = match id.and_then(|i| state.clients.get(i)) {
        Some(c) => c.monitor,
        None => ops::win_to_mon(state, x, win),
    };

    if mon != state.sel_mon {
        if let Some(sel) = state.sel_client() {
            ops::unfocus(state, x, sel, true)?;
        }
        state.sel_mon = mon;
    } else if id.is_none() || id == state.sel_client() {
        return Ok(());
    }
    ops::focus(state, x, id)?;

    Ok(())
}

pub(crate) fn expose<X: XConn>(state: &mut State, x: &X, win: Xid) -> Result<()> {
    let mon = ops::win_to_mon(state, x, win);
    bar::draw(state, x, mon)
}

pub(crate) fn focus_in<X: XConn>(state: &mut State, x: &X, win: Xid) -> Result<()> {
    // some clients grab focus for themselves; drag it back
    if let Some(c) = state.sel_client().and_then(|id| state.clients.get(id)) {
        if c.win != win {
            x.set_input_focus(c.win)?;
        }
    }

    Ok(())
}

pub(crate) fn map_request<X: XConn>(state: &mut State, x: &X, win: Xid) -> Result<()> {
    if ops::win_to_client(state, win).is_some() {
        return Ok(());
    }
    let attrs = match x.window_attributes(win) {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    if attrs.override_redirect {
        return Ok(());
    }

    ops::manage(state, x, win, &attrs)
}

pub(crate) fn motion_notify<X: XConn>(state: &mut State, x: &X, ev: &MotionEvent) -> Result<()> {
    if ev.win != x.root() {
        // hovering the bar flips the cursor over clickable status blocks
        for mon in 0..state.monitors.len() {
            if state.monitors[mon].bar_win == ev.win {
                let bar_x = ev.x_root - state.monitors[mon].window_area.x;
                return bar::update_status_cursor(state, x, mon, bar_x);
            }
        }
        return Ok(());
    }

    let mon = ops::point_to_mon(state, Point::new(ev.x_root, ev.y_root));
    if state.last_motion_mon.is_some_and(|m| m != mon) {
        if let Some(sel) = state.sel_client() {
            ops::unfocus(state, x, sel, true)?;
        }
        state.sel_mon = mon;
        ops::focus(state, x, None)?;
    }
    state.last_motion_mon = Some(mon);

    Ok(())
}

pub(crate) fn property_notify<X: XConn>(
    state: &mut State,
    x: &X,
    ev: &PropertyEvent,
) -> Result<()> {
    if ev.win == x.root() && ev.atom == Atom::WmName.as_ref() {
        return ops::update_status(state, x);
    }
    if ev.is_delete {
        return Ok(());
    }
    let id = match ops::win_to_client(state, ev.win) {
        Some(id) => id,
        None => return Ok(()),
    };

    if ev.atom == Atom::WmTransientFor.as_ref() {
        let floating = state.clients.get(id).is_some_and(|c| c.is_floating);
        if !floating {
            let trans = x.get_transient_for(ev.win)?;
            if trans.and_then(|t| ops::win_to_client(state, t)).is_some() {
                let mon = match state.clients.get_mut(id) {
                    Some(c) => {
                        c.is_floating = true;
                        c.monitor
                    }
                    None => return Ok(()),
                };
                ops::arrange(state, x, Some(mon))?;
            }
        }
    } else if ev.atom == Atom::WmNormalHints.as_ref() {
        ops::update_size_hints(state, x, id)?;
    } else if ev.atom == Atom::WmHints.as_ref() {
        ops::update_wm_hints(state, x, id)?;
        bar::draw_all(state, x)?;
    } else if ev.atom == Atom::WmName.as_ref() || ev.atom == Atom::NetWmName.as_ref() {
        ops::update_title(state, x, id)?;
        if state.sel_client() == Some(id) {
            bar::draw(state, x, state.sel_mon)?;
        }
    } else if ev.atom == Atom::NetWmWindowType.as_ref() {
        ops::update_window_type(state, x, id)?;
    } else if ev.atom == Atom::MotifWmHints.as_ref() {
        ops::update_motif_hints(state, x, id)?;
    }

    Ok(())
}

pub(crate) fn unmap_notify<X: XConn>(
    state: &mut State,
    x: &X,
    win: Xid,
    from_send_event: bool,
) -> Result<()> {
    if let Some(id) = ops::win_to_client(state, win) {
        if from_send_event {
            x.set_wm_state(win, WmState::Withdrawn)?;
        } else {
            ops::unmanage(state, x, id, false)?;
        }
    }

    Ok(())
}

// -- interactive drags --------------------------------------------------

/// Drag the focused client with the pointer until the button is released.
pub(crate) fn move_drag<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let id = match state.sel_client() {
        Some(id) => id,
        None => return Ok(()),
    };
    let orig = match state.clients.get(id) {
        Some(c) if !c.is_fullscreen => c.rect,
        _ => return Ok(()),
    };

    let mon = state.sel_mon;
    ops::restack(state, x, mon)?;
    x.grab_pointer(Cursor::Move)?;
    let grab = x.query_pointer()?;
    let snap = state.config.snap;
    let mut last_time = 0u32;

    loop {
        match x.next_event()? {
            XEvent::ButtonRelease(_) => break,
            XEvent::ConfigureRequest(ev) => configure_request(state, x, &ev)?,
            XEvent::Expose(w) => expose(state, x, w)?,
            XEvent::MapRequest(w) => map_request(state, x, w)?,
            XEvent::Destroy(w) => {
                destroy_notify(state, x, w)?;
                if state.clients.get(id).is_none() {
                    break;
                }
            }
            XEvent::Motion(ev) => {
                if ev.time.wrapping_sub(last_time) <= DRAG_INTERVAL_MS {
                    continue;
                }
                last_time = ev.time;

                let c = match state.clients.get(id) {
                    Some(c) => c,
                    None => break,
                };
                let wa = state.monitors[mon].window_area;
                let (cw, ch) = (c.width(), c.height());
                let mut nx = orig.x + ev.x_root - grab.x;
                let mut ny = orig.y + ev.y_root - grab.y;

                if (wa.x - nx).abs() < snap {
                    nx = wa.x;
                } else if (wa.right() - (nx + cw)).abs() < snap {
                    nx = wa.right() - cw;
                }
                if (wa.y - ny).abs() < snap {
                    ny = wa.y;
                } else if (wa.bottom() - (ny + ch)).abs() < snap {
                    ny = wa.bottom() - ch;
                }

                let layout_floats =
                    state.config.layouts[state.monitors[mon].active_layout()].is_floating();
                let moved_past_snap =
                    (nx - c.rect.x).abs() > snap || (ny - c.rect.y).abs() > snap;
                if !c.is_floating && !layout_floats && moved_past_snap {
                    actions::toggle_floating(state, x)?;
                }
                let floating = state.clients.get(id).is_some_and(|c| c.is_floating);
                if layout_floats || floating {
                    let r = match state.clients.get(id) {
                        Some(c) => Rect::new(nx, ny, c.rect.w, c.rect.h),
                        None => break,
                    };
                    ops::resize(state, x, id, r, true)?;
                }
            }
            _ => (),
        }
    }
    x.ungrab_pointer()?;

    finish_drag(state, x, id)
}

/// Resize the focused client by dragging its nearest corner.
pub(crate) fn resize_drag<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let id = match state.sel_client() {
        Some(id) => id,
        None => return Ok(()),
    };
    let (orig, bw, win) = match state.clients.get(id) {
        Some(c) if !c.is_fullscreen => (c.rect, c.bw, c.win),
        _ => return Ok(()),
    };

    let mon = state.sel_mon;
    ops::restack(state, x, mon)?;

    let p = x.query_pointer()?;
    let corner = Corner::nearest(p.x - orig.x, p.y - orig.y, orig.w, orig.h);
    x.grab_pointer(Cursor::Resize(corner))?;
    let (cx, cy) = match corner {
        Corner::TopLeft => (-bw, -bw),
        Corner::TopRight => (orig.w as i32 + bw - 1, -bw),
        Corner::BottomLeft => (-bw, orig.h as i32 + bw - 1),
        Corner::BottomRight => (orig.w as i32 + bw - 1, orig.h as i32 + bw - 1),
    };
    x.warp_pointer(win, cx, cy)?;

    let from_left = matches!(corner, Corner::TopLeft | Corner::BottomLeft);
    let from_top = matches!(corner, Corner::TopLeft | Corner::TopRight);
    let right_edge = orig.x + orig.w as i32 + 2 * bw - 1;
    let bottom_edge = orig.y + orig.h as i32 + 2 * bw - 1;
    let snap = state.config.snap;
    let mut last_time = 0u32;

    loop {
        match x.next_event()? {
            XEvent::ButtonRelease(_) => break,
            XEvent::ConfigureRequest(ev) => configure_request(state, x, &ev)?,
            XEvent::Expose(w) => expose(state, x, w)?,
            XEvent::MapRequest(w) => map_request(state, x, w)?,
            XEvent::Destroy(w) => {
                destroy_notify(state, x, w)?;
                if state.clients.get(id).is_none() {
                    break;
                }
            }
            XEvent::Motion(ev) => {
                if ev.time.wrapping_sub(last_time) <= DRAG_INTERVAL_MS {
                    continue;
                }
                last_time = ev.time;

                let nx = if from_left { ev.x_root } else { orig.x };
                let ny = if from_top { ev.y_root } else { orig.y };
                let nw = if from_left {
                    right_edge - nx - 2 * bw + 1
                } else {
                    ev.x_root - orig.x - 2 * bw + 1
                }
                .max(1);
                let nh = if from_top {
                    bottom_edge - ny - 2 * bw + 1
                } else {
                    ev.y_root - orig.y - 2 * bw + 1
                }
                .max(1);

                let c = match state.clients.get(id) {
                    Some(c) => c,
                    None => break,
                };
                let layout_floats =
                    state.config.layouts[state.monitors[mon].active_layout()].is_floating();
                let resized_past_snap =
                    (nw - c.rect.w as i32).abs() > snap || (nh - c.rect.h as i32).abs() > snap;
                if !c.is_floating && !layout_floats && resized_past_snap {
                    actions::toggle_floating(state, x)?;
                }
                let floating = state.clients.get(id).is_some_and(|c| c.is_floating);
                if layout_floats || floating {
                    ops::resize(state, x, id, Rect::new(nx, ny, nw as u32, nh as u32), true)?;
                }
            }
            _ => (),
        }
    }
    x.ungrab_pointer()?;
    x.sync_and_drain_enters()?;

    finish_drag(state, x, id)
}

/// After a drag: hand the client over when it was dropped on another
/// monitor.
fn finish_drag<X: XConn>(
    state: &mut State,
    x: &X,
    id: crate::pure::client::ClientId,
) -> Result<()> {
    let r = match state.clients.get(id) {
        Some(c) => c.rect,
        None => return Ok(()),
    };
    let target = ops::rect_to_mon(state, r);
    if target != state.sel_mon {
        ops::send_to_monitor(state, x, id, target)?;
        state.sel_mon = target;
        ops::focus(state, x, None)?;
    }

    Ok(())
}
