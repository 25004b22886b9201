//! Tiled layout algorithms.
//!
//! Layouts are pure: they take the monitor work area, the effective gaps and
//! the tiled clients in attach order and return target geometries. Applying
//! size hints and talking to the server is the caller's problem.
//!
//! All arithmetic deliberately mirrors integer truncation: client sizes are
//! computed as truncated fractions of the available span and the lost
//! remainder pixels are handed back one each to the first clients, so every
//! column and row fills its span exactly.
use crate::pure::{
    client::ClientId,
    geometry::Rect,
    monitor::Gaps,
};
use strum::EnumIter;

/// The per-client inputs a layout cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutClient {
    pub id: ClientId,
    /// Relative size factor within the client's area
    pub cfact: f32,
    /// Border width, subtracted from the computed geometry
    pub bw: i32,
}

/// Monitor-level inputs shared by every layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutCtx {
    /// The monitor work area being arranged into
    pub work_area: Rect,
    /// Configured gap sizes (before enable / smart adjustments)
    pub gaps: Gaps,
    /// Whether gaps are enabled on the current tag
    pub gaps_enabled: bool,
    /// Drop outer gaps when only a single client is tiled
    pub smart_gaps: bool,
    /// Number of clients in the master area
    pub n_master: u32,
    /// Fraction of the work area given to the master area
    pub mfact: f32,
    /// Bar height, used as the minimum useful client dimension
    pub bar_h: i32,
}

impl LayoutCtx {
    /// The gaps actually applied for `n` tiled clients.
    fn effective_gaps(&self, n: usize) -> Gaps {
        let e = self.gaps_enabled as i32;
        let oe = if self.smart_gaps && n == 1 { 0 } else { e };

        Gaps {
            oh: self.gaps.oh * oe,
            ov: self.gaps.ov * oe,
            ih: self.gaps.ih * e,
            iv: self.gaps.iv * e,
        }
    }
}

/// The available layout algorithms.
///
/// [Layout::Floating] arranges nothing: clients keep whatever geometry they
/// have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Layout {
    /// Master column left, stack column right
    Tile,
    /// No arrangement at all
    Floating,
    /// Every client fullscreen within the work area
    Monocle,
    /// Master row on top, stack row along the bottom
    BottomStack,
    /// Near-square grid without gaps between cells
    GaplessGrid,
    /// Successive halving towards the bottom right corner
    Dwindle,
    /// Master centered, stack split onto both sides
    CenteredMaster,
    /// Master floating centered above a horizontal stack
    CenteredFloatingMaster,
}

impl Layout {
    /// The bar symbol for this layout.
    pub fn symbol(&self) -> &'static str {
        match self {
            Layout::Tile => "[]=",
            Layout::Floating => "><>",
            Layout::Monocle => "[M]",
            Layout::BottomStack => "TTT",
            Layout::GaplessGrid => ":::",
            Layout::Dwindle => "[\\]",
            Layout::CenteredMaster => "|M|",
            Layout::CenteredFloatingMaster => ">M>",
        }
    }

    /// The symbol shown while this layout is arranged: monocle advertises
    /// the number of visible clients.
    pub fn arrange_symbol(&self, n_visible: usize) -> String {
        match self {
            Layout::Monocle if n_visible > 0 => format!("[{n_visible}]"),
            _ => self.symbol().to_string(),
        }
    }

    /// Whether clients under this layout float freely.
    pub fn is_floating(&self) -> bool {
        matches!(self, Layout::Floating)
    }

    /// Compute target geometries for the given tiled clients.
    pub fn arrange(&self, ctx: &LayoutCtx, clients: &[LayoutClient]) -> Vec<(ClientId, Rect)> {
        if clients.is_empty() {
            return Vec::new();
        }
        let g = ctx.effective_gaps(clients.len());

        match self {
            Layout::Floating => Vec::new(),
            Layout::Tile => tile(ctx, g, clients),
            Layout::Monocle => monocle(ctx, g, clients),
            Layout::BottomStack => bottom_stack(ctx, g, clients),
            Layout::GaplessGrid => gapless_grid(ctx, g, clients),
            Layout::Dwindle => dwindle(ctx, g, clients),
            Layout::CenteredMaster => centered_master(ctx, g, clients),
            Layout::CenteredFloatingMaster => centered_floating_master(ctx, g, clients),
        }
    }
}

// Negative spans can fall out of degenerate inputs (tiny monitors, huge
// gaps); geometries are floored at 1x1 rather than rejected.
fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect {
    Rect::new(x, y, w.max(1) as u32, h.max(1) as u32)
}

/// Split clients into master / stack groups and compute, for each group,
/// the total size factor and the remainder pixels left over after handing
/// each client its truncated share of `msize` / `ssize`.
fn facts(clients: &[LayoutClient], n_master: usize, msize: i32, ssize: i32) -> (f32, f32, i32, i32) {
    let (mut mfacts, mut sfacts) = (0.0f32, 0.0f32);
    for (i, c) in clients.iter().enumerate() {
        if i < n_master {
            mfacts += c.cfact;
        } else {
            sfacts += c.cfact;
        }
    }

    let (mut mtotal, mut stotal) = (0i32, 0i32);
    for (i, c) in clients.iter().enumerate() {
        if i < n_master {
            mtotal += (msize as f32 * (c.cfact / mfacts)) as i32;
        } else {
            stotal += (ssize as f32 * (c.cfact / sfacts)) as i32;
        }
    }

    (mfacts, sfacts, msize - mtotal, ssize - stotal)
}

fn tile(ctx: &LayoutCtx, g: Gaps, clients: &[LayoutClient]) -> Vec<(ClientId, Rect)> {
    let wa = ctx.work_area;
    let (n, n_master) = (clients.len() as i32, ctx.n_master as i32);

    let mx = wa.x + g.ov;
    let mut my = wa.y + g.oh;
    let mut sy = my;
    let mh = wa.h as i32 - 2 * g.oh - g.ih * (n.min(n_master) - 1);
    let sh = wa.h as i32 - 2 * g.oh - g.ih * (n - n_master - 1);
    let mut mw = wa.w as i32 - 2 * g.ov;
    let mut sw = mw;
    let mut sx = mx;

    if n_master > 0 && n > n_master {
        sw = ((mw - g.iv) as f32 * (1.0 - ctx.mfact)) as i32;
        mw = mw - g.iv - sw;
        sx = mx + mw + g.iv;
    }

    let (mfacts, sfacts, mrest, srest) = facts(clients, n_master as usize, mh, sh);

    let mut out = Vec::with_capacity(clients.len());
    for (i, c) in clients.iter().enumerate() {
        if (i as i32) < n_master {
            let h = (mh as f32 * (c.cfact / mfacts)) as i32
                + ((i as i32) < mrest) as i32
                - 2 * c.bw;
            out.push((c.id, rect(mx, my, mw - 2 * c.bw, h)));
            my += h + 2 * c.bw + g.ih;
        } else {
            let h = (sh as f32 * (c.cfact / sfacts)) as i32
                + ((i as i32 - n_master) < srest) as i32
                - 2 * c.bw;
            out.push((c.id, rect(sx, sy, sw - 2 * c.bw, h)));
            sy += h + 2 * c.bw + g.ih;
        }
    }

    out
}

fn monocle(ctx: &LayoutCtx, g: Gaps, clients: &[LayoutClient]) -> Vec<(ClientId, Rect)> {
    let wa = ctx.work_area;

    clients
        .iter()
        .map(|c| {
            (
                c.id,
                rect(
                    wa.x + g.ov,
                    wa.y + g.oh,
                    wa.w as i32 - 2 * c.bw - 2 * g.ov,
                    wa.h as i32 - 2 * c.bw - 2 * g.oh,
                ),
            )
        })
        .collect()
}

fn bottom_stack(ctx: &LayoutCtx, g: Gaps, clients: &[LayoutClient]) -> Vec<(ClientId, Rect)> {
    let wa = ctx.work_area;
    let (n, n_master) = (clients.len() as i32, ctx.n_master as i32);

    let mut mx = wa.x + g.ov;
    let my = wa.y + g.oh;
    let mut sy = my;
    let mut mh = wa.h as i32 - 2 * g.oh;
    let mut sh = mh;
    let mw = wa.w as i32 - 2 * g.ov - g.iv * (n.min(n_master) - 1);
    let sw = wa.w as i32 - 2 * g.ov - g.iv * (n - n_master - 1);
    let mut sx = mx;

    if n_master > 0 && n > n_master {
        sh = ((mh - g.ih) as f32 * (1.0 - ctx.mfact)) as i32;
        mh = mh - g.ih - sh;
        sy = my + mh + g.ih;
    }

    let (mfacts, sfacts, mrest, srest) = facts(clients, n_master as usize, mw, sw);

    let mut out = Vec::with_capacity(clients.len());
    for (i, c) in clients.iter().enumerate() {
        if (i as i32) < n_master {
            let w = (mw as f32 * (c.cfact / mfacts)) as i32
                + ((i as i32) < mrest) as i32
                - 2 * c.bw;
            out.push((c.id, rect(mx, my, w, mh - 2 * c.bw)));
            mx += w + 2 * c.bw + g.iv;
        } else {
            let w = (sw as f32 * (c.cfact / sfacts)) as i32
                + ((i as i32 - n_master) < srest) as i32
                - 2 * c.bw;
            out.push((c.id, rect(sx, sy, w, sh - 2 * c.bw)));
            sx += w + 2 * c.bw + g.iv;
        }
    }

    out
}

fn gapless_grid(ctx: &LayoutCtx, g: Gaps, clients: &[LayoutClient]) -> Vec<(ClientId, Rect)> {
    let wa = ctx.work_area;
    let n = clients.len() as i32;

    let mut cols = 0;
    while cols <= n / 2 {
        if cols * cols >= n {
            break;
        }
        cols += 1;
    }
    if n == 5 {
        // a 2:3 split reads better than the 1:2:2 the general rule gives
        cols = 2;
    }
    let mut rows = n / cols;

    let mut ch = (wa.h as i32 - 2 * g.oh - g.ih * (rows - 1)) / rows;
    let cw = (wa.w as i32 - 2 * g.ov - g.iv * (cols - 1)) / cols;
    let mut rrest = (wa.h as i32 - 2 * g.oh - g.ih * (rows - 1)) - ch * rows;
    let crest = (wa.w as i32 - 2 * g.ov - g.iv * (cols - 1)) - cw * cols;
    let mut x = wa.x + g.ov;
    let y = wa.y + g.oh;

    let (mut cn, mut rn) = (0i32, 0i32);
    let mut out = Vec::with_capacity(clients.len());
    for (i, c) in clients.iter().enumerate() {
        // leftover clients deepen the trailing columns by one row
        if (i as i32) / rows + 1 > cols - n % cols {
            rows = n / cols + 1;
            ch = (wa.h as i32 - 2 * g.oh - g.ih * (rows - 1)) / rows;
            rrest = (wa.h as i32 - 2 * g.oh - g.ih * (rows - 1)) - ch * rows;
        }
        out.push((
            c.id,
            rect(
                x,
                y + rn * (ch + g.ih) + rn.min(rrest),
                cw + (cn < crest) as i32 - 2 * c.bw,
                ch + (rn < rrest) as i32 - 2 * c.bw,
            ),
        ));
        rn += 1;
        if rn >= rows {
            rn = 0;
            x += cw + g.ih + (cn < crest) as i32;
            cn += 1;
        }
    }

    out
}

fn dwindle(ctx: &LayoutCtx, g: Gaps, clients: &[LayoutClient]) -> Vec<(ClientId, Rect)> {
    let wa = ctx.work_area;
    let n = clients.len() as i32;

    let mut nx = wa.x + g.ov;
    let mut ny = wa.y + g.oh;
    let mut nw = wa.w as i32 - 2 * g.ov;
    let mut nh = wa.h as i32 - 2 * g.oh;
    let (mut hrest, mut wrest) = (0i32, 0i32);
    let mut splitting = true;
    let mut i = 0i32;

    let mut out = Vec::with_capacity(clients.len());
    for c in clients {
        if splitting {
            // stop halving once the next slot would be unusably small
            if (i % 2 == 1 && (nh - g.ih) / 2 <= ctx.bar_h + 2 * c.bw)
                || (i % 2 == 0 && (nw - g.iv) / 2 <= ctx.bar_h + 2 * c.bw)
            {
                splitting = false;
            }
            if splitting && i < n - 1 {
                if i % 2 == 1 {
                    let nv = (nh - g.ih) / 2;
                    hrest = nh - 2 * nv - g.ih;
                    nh = nv;
                } else {
                    let nv = (nw - g.iv) / 2;
                    wrest = nw - 2 * nv - g.iv;
                    nw = nv;
                }
            }

            // remainder pixels travel with the spiral: the third step also
            // widens by the horizontal remainder, the fourth gives it back
            match i % 4 {
                0 => {
                    ny += nh + g.ih;
                    nh += hrest;
                }
                1 => {
                    nx += nw + g.iv;
                    nw += wrest;
                }
                2 => {
                    ny += nh + g.ih;
                    nh += hrest;
                    if i < n - 1 {
                        nw += wrest;
                    }
                }
                _ => {
                    nx += nw + g.iv;
                    nw -= wrest;
                }
            }

            if i == 0 {
                if n != 1 {
                    let span = wa.w as i32 - g.iv - 2 * g.ov;
                    nw = (span as f32 - span as f32 * (1.0 - ctx.mfact)) as i32;
                    wrest = 0;
                }
                ny = wa.y + g.oh;
            } else if i == 1 {
                nw = wa.w as i32 - nw - g.iv - 2 * g.ov;
            }
            i += 1;
        }

        out.push((c.id, rect(nx, ny, nw - 2 * c.bw, nh - 2 * c.bw)));
    }

    out
}

fn centered_master(ctx: &LayoutCtx, g: Gaps, clients: &[LayoutClient]) -> Vec<(ClientId, Rect)> {
    let wa = ctx.work_area;
    let (n, n_master) = (clients.len() as i32, ctx.n_master as i32);

    let mut mx = wa.x + g.ov;
    let mut my = wa.y + g.oh;
    let mh = wa.h as i32
        - 2 * g.oh
        - g.ih * ((if n_master == 0 { n } else { n.min(n_master) }) - 1);
    let mut mw = wa.w as i32 - 2 * g.ov;
    let lh = wa.h as i32 - 2 * g.oh - g.ih * ((n - n_master) / 2 - 1);
    let rh = wa.h as i32
        - 2 * g.oh
        - g.ih * ((n - n_master) / 2 - if (n - n_master) % 2 == 1 { 0 } else { 1 });

    let (mut lx, mut ly) = (0, 0);
    let (mut rx, mut ry) = (0, 0);
    let (mut lw, mut rw) = (0, 0);

    if n_master > 0 && n > n_master {
        if n - n_master > 1 {
            // stack flanks the master on both sides
            mw = ((wa.w as i32 - 2 * g.ov - 2 * g.iv) as f32 * ctx.mfact) as i32;
            lw = (wa.w as i32 - mw - 2 * g.ov - 2 * g.iv) / 2;
            rw = (wa.w as i32 - mw - 2 * g.ov - 2 * g.iv) - lw;
            mx += lw + g.iv;
        } else {
            mw = ((mw - g.iv) as f32 * ctx.mfact) as i32;
            lw = 0;
            rw = wa.w as i32 - mw - g.iv - 2 * g.ov;
        }
        lx = wa.x + g.ov;
        ly = wa.y + g.oh;
        rx = mx + mw + g.iv;
        ry = wa.y + g.oh;
    }

    let (mut mfacts, mut lfacts, mut rfacts) = (0.0f32, 0.0f32, 0.0f32);
    for (i, c) in clients.iter().enumerate() {
        let i = i as i32;
        if n_master == 0 || i < n_master {
            mfacts += c.cfact;
        } else if (i - n_master) % 2 == 1 {
            lfacts += c.cfact;
        } else {
            rfacts += c.cfact;
        }
    }
    let (mut mtotal, mut ltotal, mut rtotal) = (0i32, 0i32, 0i32);
    for (i, c) in clients.iter().enumerate() {
        let i = i as i32;
        if n_master == 0 || i < n_master {
            mtotal += (mh as f32 * (c.cfact / mfacts)) as i32;
        } else if (i - n_master) % 2 == 1 {
            ltotal += (lh as f32 * (c.cfact / lfacts)) as i32;
        } else {
            rtotal += (rh as f32 * (c.cfact / rfacts)) as i32;
        }
    }
    let (mrest, lrest, rrest) = (mh - mtotal, lh - ltotal, rh - rtotal);

    let mut out = Vec::with_capacity(clients.len());
    for (i, c) in clients.iter().enumerate() {
        let i = i as i32;
        if n_master == 0 || i < n_master {
            let h = (mh as f32 * (c.cfact / mfacts)) as i32 + (i < mrest) as i32 - 2 * c.bw;
            out.push((c.id, rect(mx, my, mw - 2 * c.bw, h)));
            my += h + 2 * c.bw + g.ih;
        } else if (i - n_master) % 2 == 1 {
            let h = (lh as f32 * (c.cfact / lfacts)) as i32
                + ((i - 2 * n_master) < 2 * lrest) as i32
                - 2 * c.bw;
            out.push((c.id, rect(lx, ly, lw - 2 * c.bw, h)));
            ly += h + 2 * c.bw + g.ih;
        } else {
            let h = (rh as f32 * (c.cfact / rfacts)) as i32
                + ((i - 2 * n_master) < 2 * rrest) as i32
                - 2 * c.bw;
            out.push((c.id, rect(rx, ry, rw - 2 * c.bw, h)));
            ry += h + 2 * c.bw + g.ih;
        }
    }

    out
}

fn centered_floating_master(
    ctx: &LayoutCtx,
    g: Gaps,
    clients: &[LayoutClient],
) -> Vec<(ClientId, Rect)> {
    let wa = ctx.work_area;
    let (n, n_master) = (clients.len() as i32, ctx.n_master as i32);
    let (ww, wh) = (wa.w as i32, wa.h as i32);

    let mut mx = wa.x + g.ov;
    let mut my = wa.y + g.oh;
    let mut mh = wh - 2 * g.oh;
    let sh = mh;
    let mut mw = ww - 2 * g.ov - g.iv * (n - 1);
    let sw = ww - 2 * g.ov - g.iv * (n - n_master - 1);
    let mut sx = wa.x + g.ov;
    let sy = wa.y + g.oh;

    // master gaps tighten when it hovers over a stack
    let mut mivf = 1.0f32;
    if n_master > 0 && n > n_master {
        mivf = 0.8;
        if ww > wh {
            mw = (ww as f32 * ctx.mfact - g.iv as f32 * mivf * (n.min(n_master) - 1) as f32) as i32;
            mh = (wh as f32 * 0.9) as i32;
        } else {
            mw = (ww as f32 * 0.9 - g.iv as f32 * mivf * (n.min(n_master) - 1) as f32) as i32;
            mh = (wh as f32 * ctx.mfact) as i32;
        }
        mx = wa.x + (ww - mw) / 2;
        my = wa.y + (wh - mh - 2 * g.oh) / 2;
    }

    let (mfacts, sfacts, mrest, srest) = facts(clients, n_master as usize, mw, sw);

    let mut out = Vec::with_capacity(clients.len());
    for (i, c) in clients.iter().enumerate() {
        let i = i as i32;
        if i < n_master {
            let w = (mw as f32 * (c.cfact / mfacts)) as i32 + (i < mrest) as i32 - 2 * c.bw;
            out.push((c.id, rect(mx, my, w, mh - 2 * c.bw)));
            mx = (mx as f32 + (w + 2 * c.bw) as f32 + g.iv as f32 * mivf) as i32;
        } else {
            let w = (sw as f32 * (c.cfact / sfacts)) as i32
                + ((i - n_master) < srest) as i32
                - 2 * c.bw;
            out.push((c.id, rect(sx, sy, w, sh - 2 * c.bw)));
            sx += w + 2 * c.bw + g.iv;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use simple_test_case::test_case;
    use strum::IntoEnumIterator;

    fn ctx(w: u32, h: u32, gap: i32, n_master: u32, mfact: f32) -> LayoutCtx {
        LayoutCtx {
            work_area: Rect::new(0, 0, w, h),
            gaps: Gaps::new(gap, gap, gap, gap),
            gaps_enabled: true,
            smart_gaps: false,
            n_master,
            mfact,
            bar_h: 20,
        }
    }

    fn clients(n: usize) -> Vec<LayoutClient> {
        (0..n)
            .map(|i| LayoutClient {
                id: ClientId(i),
                cfact: 1.0,
                bw: 1,
            })
            .collect()
    }

    #[test]
    fn tile_known_arrangement() {
        let positions = Layout::Tile.arrange(&ctx(1280, 800, 10, 1, 0.55), &clients(3));

        assert_eq!(
            positions,
            vec![
                (ClientId(0), Rect::new(10, 10, 686, 778)),
                (ClientId(1), Rect::new(708, 10, 560, 383)),
                (ClientId(2), Rect::new(708, 405, 560, 383)),
            ]
        );
    }

    #[test]
    fn tile_stack_fills_column_exactly() {
        let c = ctx(1280, 800, 10, 1, 0.55);
        let positions = Layout::Tile.arrange(&c, &clients(4));
        let stack: Vec<_> = positions[1..].iter().map(|(_, r)| r).collect();

        let bottom = stack.last().map(|r| r.bottom() + 1).unwrap_or(0);
        // one border pixel on each side of the last client, then the gap
        assert_eq!(bottom + 1 + 10, 800);
        for w in stack.windows(2) {
            assert_eq!(w[1].y, w[0].bottom() + 1 + 1 + 10);
        }
    }

    #[test]
    fn monocle_covers_work_area() {
        let positions = Layout::Monocle.arrange(&ctx(1280, 800, 0, 1, 0.55), &clients(3));

        for (_, r) in positions {
            assert_eq!(r, Rect::new(0, 0, 1278, 798));
        }
    }

    #[test]
    fn smart_gaps_drop_outer_gap_for_single_client() {
        let mut c = ctx(1280, 800, 10, 1, 0.55);
        c.smart_gaps = true;

        let positions = Layout::Tile.arrange(&c, &clients(1));
        assert_eq!(positions[0].1, Rect::new(0, 0, 1278, 798));

        let positions = Layout::Tile.arrange(&c, &clients(2));
        assert_eq!(positions[0].1.x, 10);
    }

    #[test]
    fn disabled_gaps_are_ignored() {
        let mut c = ctx(1280, 800, 10, 1, 0.55);
        c.gaps_enabled = false;

        let positions = Layout::Tile.arrange(&c, &clients(2));
        assert_eq!(positions[0].1.x, 0);
    }

    #[test]
    fn bottom_stack_splits_vertically() {
        let positions = Layout::BottomStack.arrange(&ctx(1000, 600, 0, 1, 0.6), &clients(3));

        let (_, master) = positions[0];
        assert_eq!((master.x, master.y), (0, 0));
        // the stack gets 600 * 0.4 truncated to 239; the master the rest
        assert_eq!(master.h, 359);

        let (_, s1) = positions[1];
        let (_, s2) = positions[2];
        assert_eq!(s1.y, 361);
        assert_eq!(s1.y, s2.y);
        assert_eq!(s1.w + s2.w + 4, 1000);
    }

    #[test_case(4, 2; "four in two columns")]
    #[test_case(5, 2; "five prefers two columns")]
    #[test_case(9, 3; "nine in three columns")]
    #[test]
    fn grid_column_count(n: usize, cols: usize) {
        let positions = Layout::GaplessGrid.arrange(&ctx(1200, 900, 0, 1, 0.55), &clients(n));

        let mut xs: Vec<i32> = positions.iter().map(|(_, r)| r.x).collect();
        xs.sort_unstable();
        xs.dedup();

        assert_eq!(xs.len(), cols);
    }

    #[test]
    fn grid_rows_fill_height() {
        let positions = Layout::GaplessGrid.arrange(&ctx(1200, 900, 0, 1, 0.55), &clients(4));

        // two columns of two rows each
        for col in [0, 2] {
            let h: u32 = positions[col..col + 2].iter().map(|(_, r)| r.h + 2).sum();
            assert_eq!(h, 900);
        }
    }

    #[test]
    fn dwindle_first_client_takes_mfact() {
        let positions = Layout::Dwindle.arrange(&ctx(1000, 800, 0, 1, 0.5), &clients(3));

        let (_, first) = positions[0];
        assert_eq!((first.x, first.y), (0, 0));
        assert_eq!(first.w, 498); // half minus borders
        assert_eq!(first.h, 798);

        // remaining clients descend into the right hand half
        let (_, second) = positions[1];
        assert_eq!(second.x, 500);
        let (_, third) = positions[2];
        assert!(third.y > second.y);
    }

    #[test]
    fn dwindle_odd_width_remainder_follows_the_spiral() {
        let cs: Vec<LayoutClient> = (0..4)
            .map(|i| LayoutClient {
                id: ClientId(i),
                cfact: 1.0,
                bw: 0,
            })
            .collect();
        let positions = Layout::Dwindle.arrange(&ctx(1281, 800, 0, 1, 0.5), &cs);

        // the spare pixel from halving the 641px right hand side lands on
        // the third client and is taken back from the fourth
        assert_eq!(positions[2].1, Rect::new(640, 400, 321, 400));
        assert_eq!(positions[3].1, Rect::new(961, 400, 320, 400));
    }

    #[test]
    fn centered_master_flanks_both_sides() {
        let positions = Layout::CenteredMaster.arrange(&ctx(1500, 900, 0, 1, 0.5), &clients(3));

        let (_, master) = positions[0];
        let (_, right) = positions[1];
        let (_, left) = positions[2];

        assert!(left.x < master.x);
        assert!(right.x > master.x);
        assert_eq!(master.x, 375);
    }

    #[test]
    fn centered_master_single_stack_goes_right() {
        let positions = Layout::CenteredMaster.arrange(&ctx(1500, 900, 0, 1, 0.5), &clients(2));

        let (_, master) = positions[0];
        let (_, stack) = positions[1];

        assert_eq!(master.x, 0);
        assert!(stack.x > master.x);
    }

    #[test]
    fn centered_floating_master_hovers_centered() {
        let positions =
            Layout::CenteredFloatingMaster.arrange(&ctx(1600, 900, 0, 1, 0.5), &clients(3));

        let (_, master) = positions[0];
        // 1600 * 0.5 wide, centered
        assert_eq!(master.x, 400);
        assert_eq!(master.w, 798);

        let (_, s1) = positions[1];
        let (_, s2) = positions[2];
        assert_eq!(s1.y, 0);
        assert_eq!(s1.w + s2.w + 4, 1600);
    }

    #[test]
    fn floating_arranges_nothing() {
        assert!(Layout::Floating
            .arrange(&ctx(1280, 800, 10, 1, 0.55), &clients(3))
            .is_empty());
    }

    #[test]
    fn monocle_symbol_shows_client_count() {
        assert_eq!(Layout::Monocle.arrange_symbol(3), "[3]");
        assert_eq!(Layout::Monocle.arrange_symbol(0), "[M]");
        assert_eq!(Layout::Tile.arrange_symbol(3), "[]=");
    }

    fn cfacts_from(raw: &[u8]) -> Vec<LayoutClient> {
        raw.iter()
            .enumerate()
            .map(|(i, &v)| LayoutClient {
                id: ClientId(i),
                cfact: 0.25 + (v % 16) as f32 * 0.25,
                bw: 1,
            })
            .collect()
    }

    #[quickcheck]
    fn tile_stack_is_pixel_exact_for_any_cfacts(raw: Vec<u8>) -> TestResult {
        if raw.is_empty() || raw.len() > 16 {
            return TestResult::discard();
        }
        let cs = cfacts_from(&raw);
        let c = ctx(1920, 1080, 8, 1, 0.55);
        let positions = Layout::Tile.arrange(&c, &cs);

        if positions.len() < 2 {
            return TestResult::passed();
        }

        // stack heights plus inner gaps must fill the column exactly
        let stack = &positions[1..];
        let total: i32 = stack.iter().map(|(_, r)| r.h as i32 + 2).sum::<i32>()
            + 8 * (stack.len() as i32 - 1);

        // heights, borders and inner gaps span the column between outer gaps
        TestResult::from_bool(total == 1080 - 2 * 8)
    }

    #[quickcheck]
    fn every_layout_handles_any_client_count(n: usize, n_master: u8) -> TestResult {
        if n > 32 {
            return TestResult::discard();
        }
        let c = ctx(1366, 768, 5, n_master as u32 % 4, 0.55);
        let cs = clients(n);

        for layout in Layout::iter() {
            for (_, r) in layout.arrange(&c, &cs) {
                if r.w == 0 || r.h == 0 {
                    return TestResult::failed();
                }
            }
        }

        TestResult::passed()
    }
}
