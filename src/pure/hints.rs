//! ICCCM size hint handling.
//!
//! Proposed client geometry is always pushed through [apply_size_hints]
//! before hitting the X server: the solver clamps into validity rather than
//! failing, so layout arrangement stays total.
use crate::pure::geometry::Rect;

/// Parsed WM_NORMAL_HINTS for a client window.
///
/// All sizes are in pixels; zero means "not specified" throughout, matching
/// the way the hints are consumed below.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct SizeHints {
    /// Preferred base width / height
    pub base_w: i32,
    /// Preferred base height
    pub base_h: i32,
    /// Width resize increment
    pub inc_w: i32,
    /// Height resize increment
    pub inc_h: i32,
    /// Maximum width (0 = unbounded)
    pub max_w: i32,
    /// Maximum height (0 = unbounded)
    pub max_h: i32,
    /// Minimum width
    pub min_w: i32,
    /// Minimum height
    pub min_h: i32,
    /// Minimum aspect ratio, stored inverted as min.y / min.x
    pub min_aspect: f32,
    /// Maximum aspect ratio as max.x / max.y
    pub max_aspect: f32,
}

impl SizeHints {
    /// Build hints from the raw optional WM_NORMAL_HINTS fields, applying the
    /// ICCCM fallbacks: base defaults to min, min defaults to base.
    pub fn from_raw(
        base: Option<(i32, i32)>,
        min: Option<(i32, i32)>,
        max: Option<(i32, i32)>,
        inc: Option<(i32, i32)>,
        aspect: Option<((i32, i32), (i32, i32))>,
    ) -> Self {
        let (base_w, base_h) = base.or(min).unwrap_or((0, 0));
        let (min_w, min_h) = min.or(base).unwrap_or((0, 0));
        let (max_w, max_h) = max.unwrap_or((0, 0));
        let (inc_w, inc_h) = inc.unwrap_or((0, 0));
        let (min_aspect, max_aspect) = match aspect {
            Some(((min_x, min_y), (max_x, max_y))) if min_x > 0 && max_y > 0 => {
                (min_y as f32 / min_x as f32, max_x as f32 / max_y as f32)
            }
            _ => (0.0, 0.0),
        };

        Self {
            base_w,
            base_h,
            inc_w,
            inc_h,
            max_w,
            max_h,
            min_w,
            min_h,
            min_aspect,
            max_aspect,
        }
    }

    /// A client is fixed size when its max and min hints pin both dimensions.
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0 && self.max_h > 0 && self.max_w == self.min_w && self.max_h == self.min_h
    }
}

/// Everything [apply_size_hints] needs to know about the world around the
/// client being resized.
#[derive(Debug, Clone, Copy)]
pub struct HintContext {
    /// The full X screen extent
    pub screen: Rect,
    /// The client's monitor window area (after bar reservation)
    pub window_area: Rect,
    /// Bar height: doubles as the minimum practical client dimension
    pub bar_h: i32,
    /// Whether the ICCCM hint block applies (resizehints configured on, or
    /// the client is floating, or the layout is floating; and the client
    /// does not carry the ignore-hints marker)
    pub apply_hints: bool,
}

/// Clamp a proposed geometry against screen/monitor bounds and ICCCM hints.
///
/// `cur` is the client's current geometry and `bw` its border width.
/// Returns the adjusted `(x, y, w, h)` plus whether the result differs from
/// `cur` - callers skip the X resize entirely when nothing changed.
pub fn apply_size_hints(
    hints: &SizeHints,
    cur: Rect,
    bw: i32,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    interactive: bool,
    ctx: &HintContext,
) -> (i32, i32, i32, i32, bool) {
    let (mut x, mut y, mut w, mut h) = (x, y, w.max(1), h.max(1));

    // overshoot pulls back by the size the client is still drawn at
    let (cur_w, cur_h) = (cur.w as i32 + 2 * bw, cur.h as i32 + 2 * bw);

    if interactive {
        // dragged windows may hang off screen edges but must stay reachable
        let (sw, sh) = (ctx.screen.w as i32, ctx.screen.h as i32);
        if x > sw {
            x = sw - cur_w;
        }
        if y > sh {
            y = sh - cur_h;
        }
        if x + w + 2 * bw < 0 {
            x = 0;
        }
        if y + h + 2 * bw < 0 {
            y = 0;
        }
    } else {
        let wa = ctx.window_area;
        if x >= wa.right() {
            x = wa.right() - cur_w;
        }
        if y >= wa.bottom() {
            y = wa.bottom() - cur_h;
        }
        if x + w + 2 * bw <= wa.x {
            x = wa.x;
        }
        if y + h + 2 * bw <= wa.y {
            y = wa.y;
        }
    }
    if h < ctx.bar_h {
        h = ctx.bar_h;
    }
    if w < ctx.bar_h {
        w = ctx.bar_h;
    }

    if ctx.apply_hints {
        // see last two sentences in ICCCM 4.1.2.3
        let base_is_min = hints.base_w == hints.min_w && hints.base_h == hints.min_h;
        if !base_is_min {
            w -= hints.base_w;
            h -= hints.base_h;
        }
        if hints.min_aspect > 0.0 && hints.max_aspect > 0.0 {
            if hints.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * hints.max_aspect + 0.5) as i32;
            } else if hints.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * hints.min_aspect + 0.5) as i32;
            }
        }
        if base_is_min {
            // increment calculation requires this
            w -= hints.base_w;
            h -= hints.base_h;
        }
        if hints.inc_w > 0 {
            w -= w % hints.inc_w;
        }
        if hints.inc_h > 0 {
            h -= h % hints.inc_h;
        }
        w = (w + hints.base_w).max(hints.min_w);
        h = (h + hints.base_h).max(hints.min_h);
        if hints.max_w > 0 {
            w = w.min(hints.max_w);
        }
        if hints.max_h > 0 {
            h = h.min(hints.max_h);
        }
    }

    let changed = x != cur.x || y != cur.y || w != cur.w as i32 || h != cur.h as i32;

    (x, y, w, h, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn ctx(apply_hints: bool) -> HintContext {
        HintContext {
            screen: Rect::new(0, 0, 2000, 1200),
            window_area: Rect::new(0, 20, 2000, 1180),
            bar_h: 20,
            apply_hints,
        }
    }

    #[test]
    fn unhinted_geometry_passes_through() {
        let hints = SizeHints::default();
        let cur = Rect::new(0, 20, 100, 100);

        let (x, y, w, h, changed) =
            apply_size_hints(&hints, cur, 1, 50, 60, 300, 200, false, &ctx(false));

        assert_eq!((x, y, w, h), (50, 60, 300, 200));
        assert!(changed);
    }

    #[test]
    fn unchanged_geometry_reports_no_change() {
        let hints = SizeHints::default();
        let cur = Rect::new(50, 60, 300, 200);

        let (.., changed) = apply_size_hints(&hints, cur, 1, 50, 60, 300, 200, false, &ctx(false));

        assert!(!changed);
    }

    #[test_case(400, 200; "wide input")]
    #[test_case(200, 400; "tall input")]
    #[test_case(333, 777; "awkward input")]
    #[test]
    fn square_aspect_clamp(w: i32, h: i32) {
        let hints = SizeHints {
            min_aspect: 1.0,
            max_aspect: 1.0,
            ..Default::default()
        };
        let cur = Rect::new(0, 20, 1, 1);

        let (_, _, w, h, _) = apply_size_hints(&hints, cur, 0, 0, 20, w, h, false, &ctx(true));

        let ratio = w as f32 / h as f32;
        assert!((ratio - 1.0).abs() < 0.01, "ratio was {ratio}");
    }

    #[test]
    fn increments_snap_down() {
        let hints = SizeHints {
            inc_w: 7,
            inc_h: 13,
            ..Default::default()
        };
        let cur = Rect::new(0, 20, 1, 1);

        let (_, _, w, h, _) = apply_size_hints(&hints, cur, 0, 0, 20, 300, 200, false, &ctx(true));

        assert_eq!(w % 7, 0);
        assert_eq!(h % 13, 0);
    }

    #[test]
    fn max_hints_cap_size() {
        let hints = SizeHints {
            max_w: 150,
            max_h: 120,
            ..Default::default()
        };
        let cur = Rect::new(0, 20, 1, 1);

        let (_, _, w, h, _) = apply_size_hints(&hints, cur, 0, 0, 20, 300, 200, false, &ctx(true));

        assert_eq!((w, h), (150, 120));
    }

    #[test]
    fn bar_height_is_minimum_dimension() {
        let hints = SizeHints::default();
        let cur = Rect::new(0, 20, 100, 100);

        let (_, _, w, h, _) = apply_size_hints(&hints, cur, 0, 0, 20, 3, 5, false, &ctx(false));

        assert_eq!((w, h), (20, 20));
    }

    #[test]
    fn non_interactive_clamps_to_window_area() {
        let hints = SizeHints::default();
        let cur = Rect::new(0, 20, 100, 100);

        // entirely off the right hand edge of the monitor
        let (x, ..) = apply_size_hints(&hints, cur, 1, 5000, 20, 100, 100, false, &ctx(false));

        assert_eq!(x, 2000 - 102);
    }

    #[test]
    fn offscreen_pullback_uses_current_size() {
        let hints = SizeHints::default();
        let cur = Rect::new(0, 20, 100, 100);

        // the proposed resize to 300 wide does not affect how far the
        // off-screen position gets pulled back in
        let (x, ..) = apply_size_hints(&hints, cur, 1, 5000, 20, 300, 100, false, &ctx(false));

        assert_eq!(x, 2000 - 102);
    }

    #[test]
    fn interactive_allows_partial_offscreen() {
        let hints = SizeHints::default();
        let cur = Rect::new(0, 20, 100, 100);

        let (x, ..) = apply_size_hints(&hints, cur, 1, -50, 20, 100, 100, true, &ctx(false));

        assert_eq!(x, -50);
    }

    #[test]
    fn fixed_detection() {
        let fixed = SizeHints {
            min_w: 10,
            min_h: 20,
            max_w: 10,
            max_h: 20,
            ..Default::default()
        };
        let free = SizeHints {
            min_w: 10,
            min_h: 20,
            max_w: 100,
            max_h: 200,
            ..Default::default()
        };

        assert!(fixed.is_fixed());
        assert!(!free.is_fixed());
        assert!(!SizeHints::default().is_fixed());
    }

    #[test]
    fn from_raw_base_falls_back_to_min() {
        let hints = SizeHints::from_raw(None, Some((30, 40)), None, None, None);

        assert_eq!((hints.base_w, hints.base_h), (30, 40));
        assert_eq!((hints.min_w, hints.min_h), (30, 40));
    }
}
