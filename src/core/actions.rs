//! User facing actions, intended to be bound to keys and mouse buttons.
//!
//! Every action takes `(&mut State, &impl XConn)` so it can be wrapped with
//! the `key_handler!` macro and stored in a binding table.
use crate::{
    core::{bindings::ClickInfo, handlers, ops, State},
    pure::{client::ClientId, monitor::Gaps},
    x::{Atom, XConn, XConnExt},
    Result,
};

/// Exit the main event loop.
pub fn quit<X: XConn>(state: &mut State, _x: &X) -> Result<()> {
    state.quit();

    Ok(())
}

/// Close the focused client.
pub fn kill_client<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    if let Some(c) = state.sel_client().and_then(|id| state.clients.get(id)) {
        x.close_client(c.win)?;
    }

    Ok(())
}

// -- focus movement -----------------------------------------------------

/// Move focus through the visible clients, wrapping at either end.
pub fn focus_stack<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    let sel = match state.sel_client() {
        Some(s) => s,
        None => return Ok(()),
    };
    let locked = state.config.lock_fullscreen
        && state.clients.get(sel).is_some_and(|c| c.is_fullscreen);
    if locked {
        return Ok(());
    }

    let visible: Vec<ClientId> = state.sel_monitor().visible(&state.clients).collect();
    let i = match visible.iter().position(|&c| c == sel) {
        Some(i) => i,
        None => return Ok(()),
    };
    let n = visible.len();
    let next = if dir > 0 { (i + 1) % n } else { (i + n - 1) % n };

    ops::focus(state, x, Some(visible[next]))?;
    ops::restack(state, x, state.sel_mon)
}

/// Focus the first client in the master area.
pub fn focus_master<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    if state.sel_monitor().n_master < 1 {
        return Ok(());
    }
    let first = state.sel_monitor().tiled(&state.clients).next();
    if let Some(first) = first {
        ops::focus(state, x, Some(first))?;
    }

    Ok(())
}

/// Swap the focused client with the master, or swap back to the previous
/// master when it already is the master.
pub fn zoom<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let mon = state.sel_mon;
    let layout_floats = state.config.layouts[state.monitors[mon].active_layout()].is_floating();
    let sel = match state.sel_client() {
        Some(s) => s,
        None => return Ok(()),
    };
    if layout_floats || state.clients.get(sel).is_some_and(|c| c.is_floating) {
        return Ok(());
    }

    let tiled: Vec<ClientId> = state.monitors[mon].tiled(&state.clients).collect();
    let mut c = sel;
    if tiled.first() == Some(&c) {
        // already master: swap back with the bookmarked previous master
        let prev = state.monitors[mon]
            .pertag
            .prev_zoom()
            .filter(|p| tiled.contains(p) && tiled.first() != Some(p));
        match prev {
            Some(p) => c = p,
            None => {
                state.monitors[mon].pertag.set_prev_zoom(None);
                c = match tiled.get(1) {
                    Some(&next) => next,
                    None => return Ok(()),
                };
            }
        }
    }

    let old_master = tiled.first().copied();
    if old_master != Some(c) {
        state.monitors[mon].pertag.set_prev_zoom(old_master);
    }
    state.monitors[mon].detach(c);
    state.monitors[mon].attach(c);

    ops::focus(state, x, Some(c))?;
    ops::arrange(state, x, Some(mon))
}

/// Rotate clients within the master area, the stack area, or all of them.
///
/// `arg` of +/-1 rotates the group the focused client sits in; +/-2
/// rotates every visible tiled client. Focus stays at the same position.
pub fn inplace_rotate<X: XConn>(state: &mut State, x: &X, arg: i32) -> Result<()> {
    let mon = state.sel_mon;
    let sel = match state.sel_client() {
        Some(s) => s,
        None => return Ok(()),
    };
    if state.clients.get(sel).is_some_and(|c| c.is_floating) {
        return Ok(());
    }

    let tiled: Vec<ClientId> = state.monitors[mon].tiled(&state.clients).collect();
    let selidx = match tiled.iter().position(|&c| c == sel) {
        Some(i) => i,
        None => return Ok(()),
    };
    let n_master = state.monitors[mon].n_master as usize;
    let (mhead, mtail) = (tiled.first().copied(), tiled.get(n_master.wrapping_sub(1)).copied());
    let (shead, stail) = (tiled.get(n_master).copied(), tiled.last().copied());

    let moved = match (arg, selidx < n_master) {
        (2, _) => mhead.zip(stail).map(|(h, t)| (h, t, false)),
        (-2, _) => stail.zip(mhead).map(|(t, h)| (t, h, true)),
        (1, false) => shead.zip(stail).map(|(h, t)| (h, t, false)),
        (-1, false) => stail.zip(shead).map(|(t, h)| (t, h, true)),
        (1, true) => mhead.zip(mtail).map(|(h, t)| (h, t, false)),
        (-1, true) => mtail.zip(mhead).map(|(t, h)| (t, h, true)),
        _ => None,
    };
    if let Some((anchor, id, after)) = moved {
        state.monitors[mon].insert_relative(anchor, id, after);
    }

    // focus whichever client now occupies the original position
    let tiled: Vec<ClientId> = state.monitors[mon].tiled(&state.clients).collect();
    if let Some(&c) = tiled.get(selidx) {
        ops::focus(state, x, Some(c))?;
    }
    ops::arrange(state, x, Some(mon))
}

// -- monitors -----------------------------------------------------------

pub fn focus_mon<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    if state.monitors.len() < 2 {
        return Ok(());
    }
    let target = ops::dir_to_mon(state, dir);
    if target == state.sel_mon {
        return Ok(());
    }

    if let Some(sel) = state.sel_client() {
        ops::unfocus(state, x, sel, false)?;
    }
    state.sel_mon = target;
    ops::focus(state, x, None)?;
    ops::update_current_desktop(state, x)
}

/// Send the focused client to the next / previous monitor.
pub fn tag_mon<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    if state.monitors.len() < 2 {
        return Ok(());
    }
    if let Some(sel) = state.sel_client() {
        let target = ops::dir_to_mon(state, dir);
        ops::send_to_monitor(state, x, sel, target)?;
    }

    Ok(())
}

// -- tags ---------------------------------------------------------------

/// Switch the focused monitor to the view described by `mask`.
pub fn view_tagset<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let n_tags = state.config.tags.len();
    let prev_bar = state.sel_monitor().show_bar;
    if !state.sel_monitor_mut().view(mask, n_tags) {
        return Ok(());
    }
    if state.sel_monitor().show_bar != prev_bar {
        let (bar_h, v_pad) = (state.config.bar_h, state.config.bar_v_pad);
        state.sel_monitor_mut().update_bar_pos(bar_h, v_pad);
        ops::update_bars(state, x)?;
    }

    ops::focus(state, x, None)?;
    ops::arrange(state, x, Some(state.sel_mon))?;
    ops::update_current_desktop(state, x)
}

/// View a single tag by index.
pub fn view<X: XConn>(state: &mut State, x: &X, tag: usize) -> Result<()> {
    view_tagset(state, x, 1 << tag)
}

/// Toggle tags in and out of the current view.
pub fn toggle_view<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let n_tags = state.config.tags.len();
    let prev_bar = state.sel_monitor().show_bar;
    if !state.sel_monitor_mut().toggle_view(mask, n_tags) {
        return Ok(());
    }
    if state.sel_monitor().show_bar != prev_bar {
        let (bar_h, v_pad) = (state.config.bar_h, state.config.bar_v_pad);
        state.sel_monitor_mut().update_bar_pos(bar_h, v_pad);
        ops::update_bars(state, x)?;
    }

    ops::focus(state, x, None)?;
    ops::arrange(state, x, Some(state.sel_mon))?;
    ops::update_current_desktop(state, x)
}

/// Move the focused client to the tags in `mask`.
pub fn tag<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let mask = mask & state.config.tag_mask();
    if mask == 0 {
        return Ok(());
    }
    if let Some(sel) = state.sel_client() {
        if let Some(c) = state.clients.get_mut(sel) {
            c.tags = mask;
        }
        ops::update_client_desktop(state, x, sel)?;
        ops::focus(state, x, None)?;
        ops::arrange(state, x, Some(state.sel_mon))?;
    }

    Ok(())
}

/// Toggle the tags in `mask` on the focused client, refusing to leave it
/// tagless.
pub fn toggle_tag<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let sel = match state.sel_client() {
        Some(s) => s,
        None => return Ok(()),
    };
    let new_tags = match state.clients.get(sel) {
        Some(c) => c.tags ^ (mask & state.config.tag_mask()),
        None => return Ok(()),
    };
    if new_tags == 0 {
        return Ok(());
    }

    if let Some(c) = state.clients.get_mut(sel) {
        c.tags = new_tags;
    }
    ops::update_client_desktop(state, x, sel)?;
    ops::focus(state, x, None)?;
    ops::arrange(state, x, Some(state.sel_mon))
}

/// Move the focused client to a tag and follow it there.
pub fn tag_view<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let mask = mask & state.config.tag_mask();
    if mask == 0 {
        return Ok(());
    }
    if let Some(sel) = state.sel_client() {
        if let Some(c) = state.clients.get_mut(sel) {
            c.tags = mask;
        }
        ops::update_client_desktop(state, x, sel)?;
        view_tagset(state, x, mask)?;
    }

    Ok(())
}

/// Circularly shift `mask` through the low `n` tag bits.
fn rotate_tagset(mask: u32, n: usize, by: i32) -> u32 {
    let n = n as u32;
    let by = by.rem_euclid(n as i32) as u32;
    if by == 0 {
        return mask & ((1 << n) - 1);
    }

    ((mask << by) | (mask >> (n - by))) & ((1 << n) - 1)
}

/// View the next / previous occupied tagset in the given direction.
pub fn shift_view<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    let n = state.config.tags.len();
    let occupied = state.monitors[state.sel_mon]
        .clients
        .iter()
        .filter_map(|&id| state.clients.get(id))
        .fold(0u32, |acc, c| acc | c.tags);

    let mut shifted = state.sel_monitor().active_tagset();
    for _ in 0..n {
        shifted = rotate_tagset(shifted, n, dir.signum());
        if occupied == 0 || shifted & occupied != 0 {
            break;
        }
    }

    view_tagset(state, x, shifted)
}

/// Shift the focused client one tag over and follow it.
pub fn shift_client<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    let sel = match state.sel_client() {
        Some(s) => s,
        None => return Ok(()),
    };
    let n = state.config.tags.len();
    let shifted = match state.clients.get(sel) {
        Some(c) => rotate_tagset(c.tags, n, dir.signum()),
        None => return Ok(()),
    };
    if shifted == 0 {
        return Ok(());
    }

    if let Some(c) = state.clients.get_mut(sel) {
        c.tags = shifted;
    }
    ops::update_client_desktop(state, x, sel)?;
    view_tagset(state, x, shifted)
}

// -- layout -------------------------------------------------------------

/// Select a layout by table index, or re-toggle the last two with `None`.
pub fn set_layout<X: XConn>(state: &mut State, x: &X, layout: Option<usize>) -> Result<()> {
    if layout.is_some_and(|i| i >= state.config.layouts.len()) {
        return Ok(());
    }
    state.sel_monitor_mut().set_layout(layout);

    let mon = state.sel_mon;
    let active = state.config.layouts[state.monitors[mon].active_layout()];
    state.monitors[mon].lt_symbol = active.symbol().to_string();

    if state.sel_client().is_some() {
        ops::arrange(state, x, Some(mon))
    } else {
        crate::core::bar::draw(state, x, mon)
    }
}

/// Step forwards / backwards through the layout table, wrapping.
pub fn cycle_layout<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    let n = state.config.layouts.len() as i32;
    let cur = state.sel_monitor().active_layout() as i32;
    let next = (cur + dir.signum() + n) % n;

    set_layout(state, x, Some(next as usize))
}

pub fn inc_n_master<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    state.sel_monitor_mut().inc_n_master(delta);
    ops::arrange(state, x, Some(state.sel_mon))
}

pub fn set_mfact<X: XConn>(state: &mut State, x: &X, f: f32) -> Result<()> {
    let layout_floats =
        state.config.layouts[state.sel_monitor().active_layout()].is_floating();
    if layout_floats {
        return Ok(());
    }
    state.sel_monitor_mut().set_mfact(f);
    ops::arrange(state, x, Some(state.sel_mon))
}

/// Adjust the focused client's size factor within its layout area.
///
/// `0.0` resets the focused client; `1.0` resets every visible client.
pub fn set_cfact<X: XConn>(state: &mut State, x: &X, arg: f32) -> Result<()> {
    let sel = match state.sel_client() {
        Some(s) => s,
        None => return Ok(()),
    };
    let layout_floats =
        state.config.layouts[state.sel_monitor().active_layout()].is_floating();
    if layout_floats {
        return Ok(());
    }

    if arg == 1.0 {
        let visible: Vec<ClientId> = state.sel_monitor().tiled(&state.clients).collect();
        for id in visible {
            if let Some(c) = state.clients.get_mut(id) {
                c.cfact = 1.0;
            }
        }
    } else {
        let cur = state.clients.get(sel).map(|c| c.cfact).unwrap_or(1.0);
        let f = if arg == 0.0 { 1.0 } else { arg + cur };
        if !(0.25..=4.0).contains(&f) {
            return Ok(());
        }
        if let Some(c) = state.clients.get_mut(sel) {
            c.cfact = f;
        }
    }

    ops::arrange(state, x, Some(state.sel_mon))
}

/// Toggle the focused client between floating and tiled.
pub fn toggle_floating<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let sel = match state.sel_client() {
        Some(s) => s,
        None => return Ok(()),
    };
    if state.clients.get(sel).is_some_and(|c| c.is_fullscreen) {
        return Ok(());
    }

    let (floating, win) = match state.clients.get_mut(sel) {
        Some(c) => {
            c.is_floating = !c.is_floating || c.is_fixed;
            (c.is_floating, c.win)
        }
        None => return Ok(()),
    };

    if floating {
        let r = state.clients.get(sel).map(|c| c.float_rect);
        if let Some(r) = r {
            ops::resize(state, x, sel, r, false)?;
        }
    } else if let Some(c) = state.clients.get_mut(sel) {
        c.save_float_rect();
    }
    x.set_prop_cardinal(win, Atom::IsFloating, &[floating as u32])?;

    ops::arrange(state, x, Some(state.sel_mon))
}

/// Toggle fullscreen on the focused client.
pub fn toggle_fullscreen<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    if let Some(sel) = state.sel_client() {
        let on = !state.clients.get(sel).is_some_and(|c| c.is_fullscreen);
        ops::set_fullscreen(state, x, sel, on)?;
    }

    Ok(())
}

// -- bar and gaps -------------------------------------------------------

pub fn toggle_bar<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    state.sel_monitor_mut().toggle_bar();
    let (bar_h, v_pad) = (state.config.bar_h, state.config.bar_v_pad);
    state.sel_monitor_mut().update_bar_pos(bar_h, v_pad);
    ops::update_bars(state, x)?;
    ops::arrange(state, x, Some(state.sel_mon))
}

fn adjust_gaps<X: XConn>(state: &mut State, x: &X, gaps: Gaps) -> Result<()> {
    state.sel_monitor_mut().set_gaps(gaps);
    ops::arrange(state, x, Some(state.sel_mon))
}

/// Grow or shrink every gap at once.
pub fn inc_gaps<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    let g = state.sel_monitor().gaps;
    adjust_gaps(
        state,
        x,
        Gaps::new(g.oh + delta, g.ov + delta, g.ih + delta, g.iv + delta),
    )
}

pub fn inc_inner_gaps<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    let g = state.sel_monitor().gaps;
    adjust_gaps(state, x, Gaps::new(g.oh, g.ov, g.ih + delta, g.iv + delta))
}

pub fn inc_outer_gaps<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    let g = state.sel_monitor().gaps;
    adjust_gaps(state, x, Gaps::new(g.oh + delta, g.ov + delta, g.ih, g.iv))
}

pub fn inc_inner_h_gaps<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    let g = state.sel_monitor().gaps;
    adjust_gaps(state, x, Gaps::new(g.oh, g.ov, g.ih + delta, g.iv))
}

pub fn inc_inner_v_gaps<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    let g = state.sel_monitor().gaps;
    adjust_gaps(state, x, Gaps::new(g.oh, g.ov, g.ih, g.iv + delta))
}

pub fn inc_outer_h_gaps<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    let g = state.sel_monitor().gaps;
    adjust_gaps(state, x, Gaps::new(g.oh + delta, g.ov, g.ih, g.iv))
}

pub fn inc_outer_v_gaps<X: XConn>(state: &mut State, x: &X, delta: i32) -> Result<()> {
    let g = state.sel_monitor().gaps;
    adjust_gaps(state, x, Gaps::new(g.oh, g.ov + delta, g.ih, g.iv))
}

/// Restore the configured gap sizes.
pub fn default_gaps<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let g = state.config.gaps;
    adjust_gaps(state, x, g)
}

pub fn toggle_gaps<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    state.sel_monitor_mut().toggle_gaps();
    ops::arrange(state, x, Some(state.sel_mon))
}

// -- mouse --------------------------------------------------------------

/// Start an interactive move of the focused client.
pub fn move_mouse<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    handlers::move_drag(state, x)
}

/// Start an interactive resize of the focused client.
pub fn resize_mouse<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    handlers::resize_drag(state, x)
}

/// Forward a status bar click to the status generator process.
pub fn sig_status<X: XConn>(state: &mut State, _x: &X, info: &ClickInfo) -> Result<()> {
    let signal = info.signal.unwrap_or(state.status_signal);
    if signal == 0 {
        return Ok(());
    }

    state.signaller.send(signal, info.button.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(0b0000_0001, 1, 0b0000_0010; "single bit left")]
    #[test_case(0b1_0000_0000, 1, 0b0000_0001; "wraps high bit")]
    #[test_case(0b0000_0001, -1, 0b1_0000_0000; "single bit right wraps")]
    #[test_case(0b0000_0101, 1, 0b0000_1010; "multiple bits")]
    #[test_case(0b0000_0101, 0, 0b0000_0101; "zero shift")]
    #[test]
    fn tagset_rotation(mask: u32, by: i32, expected: u32) {
        assert_eq!(rotate_tagset(mask, 9, by), expected);
    }
}
