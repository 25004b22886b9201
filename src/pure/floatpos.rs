//! The floating placement mini-language.
//!
//! A placement spec is a space separated list of `<int><code>` tokens, two
//! per axis (position then size) or a single pair (position only, or size
//! only for `w`/`p` codes). Each axis is solved independently by
//! [resolve_axis]: a small
//! interpreter over the position/size code combinations with deliberate
//! fallthrough between the size codes.
//!
//! Position codes: `A` absolute, `a` absolute-relative, `x`/`y` client
//! relative (clamped into the work area), `X`/`Y` work-area relative,
//! `S`/`C`/`Z` fixed left/center/right positions that derive size from
//! position, `G` grid cell, `%` percentage (midpoint recentered).
//!
//! Size codes: `A` absolute, `a` relative, `%` percentage of the work area,
//! `w`/`h` relative to the current size, `W`/`H` literal.
use crate::pure::geometry::Rect;

/// Sentinel for "no size code": `S`/`C`/`Z` position codes derive the size
/// from the position and override any explicit size code with this.
const NO_CODE: char = '\0';

/// Resolve one axis of a placement spec.
///
/// `min_p` / `max_s` describe the usable span on this axis, `cp` / `cs` the
/// client's current position and size and `cbw` its border width. `defgrid`
/// is the grid dimension used when a `G` position gives no explicit one.
///
/// The returned size always has the border subtracted back out and is
/// floored at one pixel. Non-absolute positions are clamped so the client
/// stays within `[min_p, min_p + max_s]`; absolute positions may leave the
/// area, in which case only the size gets shrunk (and only when the size
/// code is not itself absolute).
pub fn resolve_axis(
    pos: i32,
    p_ch: char,
    size: i32,
    s_ch: char,
    min_p: i32,
    max_s: i32,
    cp: i32,
    cs: i32,
    cbw: i32,
    defgrid: i32,
) -> (i32, i32) {
    let abs_p = p_ch == 'A' || p_ch == 'a';
    let abs_s = s_ch == 'A' || s_ch == 'a';

    let (mut pos, mut size, mut s_ch) = (pos, size, s_ch);
    let mut cp = cp;
    let mut cs = cs + 2 * cbw;

    match p_ch {
        // absolute position
        'A' => cp = pos,
        // absolute relative position
        'a' => cp += pos,
        // client relative position
        'x' | 'y' => cp = (cp + pos).min(min_p + max_s),
        // client position relative to the work area
        'X' | 'Y' => cp = min_p + pos.min(max_s),
        // fixed client position: sticky edge / center / right hand edge.
        // Size is determined by the position, overriding any size code.
        'S' | 'C' | 'Z' => {
            if pos != -1 {
                pos = pos.clamp(0, max_s);
                cs = match p_ch {
                    'Z' => ((cp + cs) - (min_p + pos)).abs(),
                    'C' => ((cp + cs / 2) - (min_p + pos)).abs(),
                    _ => (cp - (min_p + pos)).abs(),
                };
                cp = min_p + pos;
                s_ch = NO_CODE;
            }
        }
        // grid position: snap to one of `pos` cells, addressed by absolute
        // cell index (size code P) or relative delta (size code p)
        'G' => {
            if pos <= 0 {
                pos = defgrid;
            }
            if size != 0 && pos >= 2 && (s_ch == 'p' || s_ch == 'P') {
                let delta = (max_s - cs) / (pos - 1);
                let rest = max_s - cs - delta * (pos - 1);
                let slack = |i: i32| if i > pos - rest { i + rest - pos + 1 } else { 0 };

                if s_ch == 'P' {
                    if size >= 1 && size <= pos {
                        cp = min_p + delta * (size - 1);
                    }
                } else {
                    let mut i = 0;
                    while i < pos && cp >= min_p + delta * i + slack(i) {
                        i += 1;
                    }
                    cp = min_p + delta * ((i + size).clamp(1, pos) - 1) + slack(i);
                }
            }
        }
        _ => (),
    }

    match s_ch {
        // absolute size
        'A' => cs = size,
        // absolute relative size
        'a' => cs = (cs + size).max(1),
        // %, w and h transform `size` and then share the literal W/H logic
        '%' | 'h' | 'w' | 'H' | 'W' => {
            let mut valid = true;
            if s_ch == '%' {
                if size <= 0 {
                    valid = false;
                } else {
                    // size as a percentage of the work area
                    size = max_s * size.min(100) / 100;
                }
            }
            if valid && (s_ch == 'w' || s_ch == 'h') {
                if size == 0 {
                    valid = false;
                } else {
                    // size relative to the current client size
                    size += cs;
                }
            }
            if valid {
                if p_ch == 'S' && cp + size > min_p + max_s {
                    size = min_p + max_s - cp;
                } else if size > max_s {
                    size = max_s;
                }

                if p_ch == 'C' {
                    // fixed center: expand or contract around it
                    let delta = size - cs;
                    if delta < 0 || cp - delta / 2 + size <= min_p + max_s {
                        cp -= delta / 2;
                    } else if cp - delta / 2 < min_p {
                        cp = min_p;
                    } else if delta != 0 {
                        cp = min_p + max_s;
                    }
                } else if p_ch == 'Z' {
                    cp -= size - cs;
                }

                cs = size;
            }
        }
        _ => (),
    }

    if p_ch == '%' {
        // client midpoint placed at a percentage of the work area
        cp = min_p + max_s * pos.clamp(0, 100) / 100 - cs / 2;
    }

    if !abs_p && cp < min_p {
        cp = min_p;
    }
    if cp + cs > min_p + max_s && !(abs_p && abs_s) {
        if abs_p || cp == min_p {
            cs = min_p + max_s - cp;
        } else {
            cp = min_p + max_s - cs;
        }
    }

    (cp, (cs - 2 * cbw).max(1))
}

/// A parsed placement spec covering both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatSpec {
    x: i32,
    x_ch: char,
    y: i32,
    y_ch: char,
    w: i32,
    w_ch: char,
    h: i32,
    h_ch: char,
}

impl Default for FloatSpec {
    /// Centered in the work area at the client's current size.
    fn default() -> Self {
        Self {
            x: 50,
            x_ch: '%',
            y: 50,
            y_ch: '%',
            w: 0,
            w_ch: NO_CODE,
            h: 0,
            h_ch: NO_CODE,
        }
    }
}

impl FloatSpec {
    /// Parse a spec string of two or four `<int><code>` tokens.
    ///
    /// With two tokens a `W`/`w` pair is a size resized around the client's
    /// current center, a `P`/`p` pair addresses the default grid and any
    /// other pair is a position keeping the current size. Four tokens give
    /// position then size per axis. Anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let fields: Vec<(i32, char)> = s.split_whitespace().map(parse_token).collect::<Option<_>>()?;

        match fields[..] {
            [(x, x_ch), (y, y_ch)] => match x_ch {
                'w' | 'W' => Some(Self {
                    x: -1,
                    x_ch: 'C',
                    y: -1,
                    y_ch: 'C',
                    w: x,
                    w_ch: x_ch,
                    h: y,
                    h_ch: y_ch,
                }),
                'p' | 'P' => Some(Self {
                    x: 0,
                    x_ch: 'G',
                    y: 0,
                    y_ch: 'G',
                    w: x,
                    w_ch: x_ch,
                    h: y,
                    h_ch: y_ch,
                }),
                _ => Some(Self {
                    x,
                    x_ch,
                    y,
                    y_ch,
                    w: 0,
                    w_ch: NO_CODE,
                    h: 0,
                    h_ch: NO_CODE,
                }),
            },
            [(x, x_ch), (y, y_ch), (w, w_ch), (h, h_ch)] => Some(Self {
                x,
                x_ch,
                y,
                y_ch,
                w,
                w_ch,
                h,
                h_ch,
            }),
            _ => None,
        }
    }

    /// Solve this spec against a work area for a client currently at `cur`
    /// with border width `bw`, snapping `G` positions to a `grid` of
    /// (columns, rows).
    pub fn resolve(&self, work_area: Rect, cur: Rect, bw: i32, grid: (i32, i32)) -> Rect {
        let (x, w) = resolve_axis(
            self.x,
            self.x_ch,
            self.w,
            self.w_ch,
            work_area.x,
            work_area.w as i32,
            cur.x,
            cur.w as i32,
            bw,
            grid.0,
        );
        let (y, h) = resolve_axis(
            self.y,
            self.y_ch,
            self.h,
            self.h_ch,
            work_area.y,
            work_area.h as i32,
            cur.y,
            cur.h as i32,
            bw,
            grid.1,
        );

        Rect::new(x, y, w as u32, h as u32)
    }
}

fn parse_token(tok: &str) -> Option<(i32, char)> {
    let code = tok.chars().last()?;
    if code.is_ascii_digit() {
        return None;
    }
    let num = &tok[..tok.len() - code.len_utf8()];
    let n = if num.is_empty() { 0 } else { num.parse().ok()? };

    Some((n, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    // A 1000px wide / 800px tall work area starting at the origin with a
    // client at (200, 100) sized 100x50 and no border.
    const WA: Rect = Rect::new(0, 0, 1000, 800);
    const CUR: Rect = Rect::new(200, 100, 100, 50);

    fn axis(pos: i32, p_ch: char, size: i32, s_ch: char) -> (i32, i32) {
        resolve_axis(pos, p_ch, size, s_ch, 0, 1000, 200, 100, 0, 5)
    }

    #[test_case(50, 'A', 300, 'A', (50, 300); "both absolute")]
    #[test_case(-50, 'A', 300, 'A', (-50, 300); "absolute allows offscreen")]
    #[test_case(30, 'a', 0, 'W', (230, 1); "relative position")]
    #[test_case(900, 'x', 0, 'W', (1000, 1); "client relative clamps into area")]
    #[test_case(250, 'X', 0, 'W', (250, 1); "area relative")]
    #[test_case(2000, 'X', 0, 'W', (1000, 1); "area relative caps offset")]
    #[test_case(0, 'S', 0, NO_CODE, (0, 200); "sticky left derives size")]
    #[test_case(500, 'Z', 0, NO_CODE, (500, 200); "right edge derives size")]
    #[test_case(0, 'X', 50, '%', (0, 500); "percent size")]
    #[test_case(0, 'X', 120, '%', (0, 1000); "percent size caps at 100")]
    #[test_case(0, 'X', 40, 'w', (0, 140); "relative size grows")]
    #[test_case(0, 'X', -40, 'w', (0, 60); "relative size shrinks")]
    #[test]
    fn axis_codes(pos: i32, p_ch: char, size: i32, s_ch: char, expected: (i32, i32)) {
        assert_eq!(axis(pos, p_ch, size, s_ch), expected);
    }

    #[test]
    fn percent_position_centers_midpoint() {
        let (p, s) = resolve_axis(50, '%', 50, '%', 0, 1000, 200, 100, 0, 5);

        assert_eq!(p + s / 2, 500);
        assert_eq!((p, s), (250, 500));
    }

    #[test]
    fn percent_placement_is_idempotent() {
        let (p1, s1) = resolve_axis(50, '%', 50, '%', 0, 1000, 200, 100, 0, 5);
        let (p2, s2) = resolve_axis(50, '%', 50, '%', 0, 1000, p1, s1, 0, 5);

        assert_eq!((p1, s1), (p2, s2));
    }

    #[test]
    fn border_width_is_subtracted_from_output() {
        let (_, s) = resolve_axis(0, 'X', 50, '%', 0, 1000, 200, 100, 2, 5);

        // 50% of 1000 minus both borders
        assert_eq!(s, 496);
    }

    #[test]
    fn grid_snaps_to_cell() {
        // 4 cells of a 1000px axis with a 100px client: delta = 300
        let (p, _) = resolve_axis(4, 'G', 3, 'P', 0, 1000, 200, 100, 0, 5);

        assert_eq!(p, 600);
    }

    #[test]
    fn non_absolute_results_stay_in_bounds() {
        let codes = ['a', 'x', 'X', 'S', 'C', 'Z', 'G', '%'];
        let sizes = [(10, 'A'), (50, '%'), (40, 'w'), (700, 'W'), (0, NO_CODE)];

        for p_ch in codes {
            for pos in [-500, 0, 120, 999, 5000] {
                for (size, s_ch) in sizes {
                    // absolute positions may place the client anywhere; the
                    // final clamp only ever shrinks their size
                    let abs_pos = p_ch == 'A' || p_ch == 'a';
                    let (p, s) = axis(pos, p_ch, size, s_ch);

                    if !abs_pos {
                        assert!(
                            p >= 0 && p + s <= 1000,
                            "({pos}, {p_ch:?}, {size}, {s_ch:?}) escaped: p={p} s={s}"
                        );
                    }
                }
            }
        }
    }

    #[test_case("50% 50%", Some((450, 375, 100, 50)); "position only pair keeps size")]
    #[test_case("50% 50% 80% 80%", Some((100, 80, 800, 640)); "full spec")]
    #[test_case("500W 400H", Some((0, 0, 500, 400)); "size only pair grows from center")]
    #[test_case("nonsense", None; "unparseable")]
    #[test_case("1A 2A 3A", None; "wrong token count")]
    #[test]
    fn parse_and_resolve(spec: &str, expected: Option<(i32, i32, u32, u32)>) {
        let parsed = FloatSpec::parse(spec);

        match expected {
            None => assert!(parsed.is_none()),
            Some((x, y, w, h)) => {
                let r = parsed.expect("should parse").resolve(WA, CUR, 0, (5, 5));
                assert_eq!(r, Rect::new(x, y, w, h));
            }
        }
    }

    #[test]
    fn size_only_pair_recenters_on_client() {
        let spec = FloatSpec::parse("300W 200H").expect("should parse");
        let r = spec.resolve(WA, CUR, 0, (5, 5));

        // the resized window keeps the client's current midpoint
        assert_eq!(r.x + r.w as i32 / 2, CUR.x + CUR.w as i32 / 2);
        assert_eq!(r.y + r.h as i32 / 2, CUR.y + CUR.h as i32 / 2);
    }
}
