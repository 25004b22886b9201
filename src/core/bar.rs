//! Building bar frames and routing clicks on them.
//!
//! The bar is drawn as a flat list of [BarCell]s: tags on the left, then
//! the layout symbol, the focused window title in the middle and the status
//! text right aligned. Every draw also records the pixel extents of those
//! regions so button presses can be routed without re-measuring.
use crate::{
    core::{
        bindings::{ClickInfo, ClickTarget},
        State, SCHEME_NORM, SCHEME_SEL,
    },
    x::{BarCell, Cursor, XConn},
    Result, Xid,
};

/// Pixel extents of the clickable bar regions, refreshed on every draw.
#[derive(Debug, Default, Clone)]
pub(crate) struct BarRegions {
    /// (x, width) of each tag indicator; hidden vacant tags have width 0
    tags: Vec<(i32, u32)>,
    layout: (i32, u32),
    title: (i32, u32),
    status: (i32, u32),
}

/// Horizontal padding applied around each piece of bar text.
fn pad(state: &State) -> u32 {
    (state.config.bar_h / 2).max(2) as u32
}

/// Redraw the bar for one monitor.
pub(crate) fn draw<X: XConn>(state: &mut State, x: &X, mon: usize) -> Result<()> {
    let bar_h = state.config.bar_h.max(1) as u32;
    let bar_w = state.monitors[mon].window_area.w;
    let pad = pad(state);
    let mut cells = Vec::new();
    let mut regions = BarRegions::default();

    // occupancy and urgency per tag on this monitor
    let (mut occupied, mut urgent) = (0u32, 0u32);
    for &id in state.monitors[mon].clients.iter() {
        if let Some(c) = state.clients.get(id) {
            occupied |= c.tags;
            if c.is_urgent {
                urgent |= c.tags;
            }
        }
    }
    let sel_tag_bits = state.monitors[mon]
        .sel
        .and_then(|id| state.clients.get(id))
        .map(|c| c.tags)
        .unwrap_or(0);

    let tagset = state.monitors[mon].active_tagset();
    let mut cx = 0i32;

    for (i, tag) in state.config.tags.iter().enumerate() {
        let bit = 1 << i;
        if state.config.hide_vacant_tags && occupied & bit == 0 && tagset & bit == 0 {
            regions.tags.push((cx, 0));
            continue;
        }

        let w = x.text_width(tag)? + pad;
        let selected = tagset & bit != 0;
        let sc = state.config.colors[if selected { SCHEME_SEL } else { SCHEME_NORM }];
        // urgent tags are drawn inverted
        let (fg, bg) = if urgent & bit != 0 {
            (sc.bg, sc.fg)
        } else {
            (sc.fg, sc.bg)
        };
        cells.push(BarCell {
            x: cx,
            w,
            fg,
            bg,
            text: Some(tag.clone()),
            marker: occupied & bit != 0 && sel_tag_bits & bit != 0,
        });
        regions.tags.push((cx, w));
        cx += w as i32;
    }

    let norm = state.config.colors[SCHEME_NORM];
    let symbol = state.monitors[mon].lt_symbol.clone();
    let lt_w = x.text_width(&symbol)? + pad;
    cells.push(BarCell {
        x: cx,
        w: lt_w,
        fg: norm.fg,
        bg: norm.bg,
        text: Some(symbol),
        marker: false,
    });
    regions.layout = (cx, lt_w);
    cx += lt_w as i32;

    // status only shows on the focused monitor
    let mut status_w = 0;
    if mon == state.sel_mon {
        status_w = x.text_width(state.status.plain())? + 2 * state.config.bar_side_pad as u32;
        let mut sx = bar_w.saturating_sub(status_w) as i32 + state.config.bar_side_pad;
        for seg in state.status.segments().to_vec() {
            let w = x.text_width(&seg.text)?;
            let sc = state.config.colors[seg.scheme.min(state.config.colors.len() - 1)];
            cells.push(BarCell {
                x: sx,
                w,
                fg: sc.fg,
                bg: sc.bg,
                text: Some(seg.text),
                marker: false,
            });
            sx += w as i32;
        }
    }
    regions.status = (bar_w.saturating_sub(status_w) as i32, status_w);

    let title_w = (bar_w as i32 - cx - status_w as i32).max(0) as u32;
    let (title, title_scheme, title_marker) = match state.monitors[mon]
        .sel
        .and_then(|id| state.clients.get(id))
    {
        Some(c) => (
            Some(c.name.clone()),
            if mon == state.sel_mon {
                SCHEME_SEL
            } else {
                SCHEME_NORM
            },
            c.is_floating,
        ),
        None => (None, SCHEME_NORM, false),
    };
    let sc = state.config.colors[title_scheme];
    cells.push(BarCell {
        x: cx,
        w: title_w,
        fg: sc.fg,
        bg: sc.bg,
        text: title,
        marker: title_marker,
    });
    regions.title = (cx, title_w);

    let bar_win = state.monitors[mon].bar_win;
    if bar_win != Xid(0) {
        x.draw_bar(bar_win, &cells, bar_w, bar_h)?;
    }
    state.bar_regions[mon] = regions;

    Ok(())
}

pub(crate) fn draw_all<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    for mon in 0..state.monitors.len() {
        draw(state, x, mon)?;
    }

    Ok(())
}

/// Resolve a click at bar-relative `click_x` into its target region.
pub(crate) fn route_click<X: XConn>(
    state: &State,
    x: &X,
    mon: usize,
    click_x: i32,
    mut info: ClickInfo,
) -> ClickInfo {
    let r = &state.bar_regions[mon];

    for (i, &(tx, tw)) in r.tags.iter().enumerate() {
        if tw > 0 && click_x >= tx && click_x < tx + tw as i32 {
            info.target = ClickTarget::TagBar;
            info.tag = Some(i);
            return info;
        }
    }
    if click_x >= r.layout.0 && click_x < r.layout.0 + r.layout.1 as i32 {
        info.target = ClickTarget::LayoutSymbol;
        return info;
    }
    if mon == state.sel_mon && r.status.1 > 0 && click_x >= r.status.0 {
        info.target = ClickTarget::StatusText;
        let rel = click_x - r.status.0 - state.config.bar_side_pad;
        info.signal = state
            .status
            .signal_at(rel, |s| x.text_width(s).unwrap_or(0) as i32);
        return info;
    }
    info.target = ClickTarget::WinTitle;

    info
}

/// Flip the pointer between the hand and normal cursors as it crosses
/// clickable status blocks.
pub(crate) fn update_status_cursor<X: XConn>(
    state: &mut State,
    x: &X,
    mon: usize,
    bar_x: i32,
) -> Result<()> {
    let r = &state.bar_regions[mon];
    let over_signal = mon == state.sel_mon
        && r.status.1 > 0
        && bar_x >= r.status.0
        && state
            .status
            .signal_at(
                bar_x - r.status.0 - state.config.bar_side_pad,
                |s| x.text_width(s).unwrap_or(0) as i32,
            )
            .is_some();

    if over_signal != state.status_hand_cursor {
        state.status_hand_cursor = over_signal;
        let cursor = if over_signal {
            Cursor::Hand
        } else {
            Cursor::Normal
        };
        x.set_cursor(state.monitors[mon].bar_win, cursor)?;
    }

    Ok(())
}
