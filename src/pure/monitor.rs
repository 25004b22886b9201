//! Per-monitor state: client ordering, the focus stack, tag views and the
//! per-tag settings that follow each view around.
use crate::{
    pure::{
        client::{ClientArena, ClientId},
        geometry::Rect,
    },
    Xid,
};

/// Gap sizes in pixels around and between tiled clients.
///
/// `oh` / `ov` are the outer gaps between clients and the monitor edges,
/// `ih` / `iv` the inner gaps between neighbouring clients.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Gaps {
    pub oh: i32,
    pub ov: i32,
    pub ih: i32,
    pub iv: i32,
}

impl Gaps {
    pub const fn new(oh: i32, ov: i32, ih: i32, iv: i32) -> Self {
        Self { oh, ov, ih, iv }
    }

    /// Gaps never go negative: decrements floor at zero.
    pub fn clamped(self) -> Self {
        Self {
            oh: self.oh.max(0),
            ov: self.ov.max(0),
            ih: self.ih.max(0),
            iv: self.iv.max(0),
        }
    }
}

/// Settings remembered separately for every tag.
///
/// Index 0 is the union view (all tags at once); indices 1..=n are the
/// individual tags. Whenever the view changes the monitor's live settings
/// are reloaded from the slot for the newly current tag.
#[derive(Debug, Clone)]
pub struct Pertag {
    /// Currently viewed tag (0 = union view)
    pub cur_tag: usize,
    /// Previously viewed tag, for the back-and-forth view toggle
    pub prev_tag: usize,
    n_masters: Vec<u32>,
    mfacts: Vec<f32>,
    show_bars: Vec<bool>,
    sel_lts: Vec<usize>,
    lt_idxs: Vec<[usize; 2]>,
    enable_gaps: Vec<bool>,
    gaps: Vec<Gaps>,
    prev_zooms: Vec<Option<ClientId>>,
}

impl Pertag {
    fn new(n_tags: usize, n_master: u32, mfact: f32, show_bar: bool, gaps: Gaps) -> Self {
        let n = n_tags + 1;

        Self {
            cur_tag: 1,
            prev_tag: 1,
            n_masters: vec![n_master; n],
            mfacts: vec![mfact; n],
            show_bars: vec![show_bar; n],
            sel_lts: vec![0; n],
            lt_idxs: vec![[0, 1]; n],
            enable_gaps: vec![true; n],
            gaps: vec![gaps; n],
            prev_zooms: vec![None; n],
        }
    }

    /// The previously zoomed client on the current tag.
    pub fn prev_zoom(&self) -> Option<ClientId> {
        self.prev_zooms[self.cur_tag]
    }

    pub fn set_prev_zoom(&mut self, id: Option<ClientId>) {
        self.prev_zooms[self.cur_tag] = id;
    }

    /// Drop any zoom bookmark pointing at a client being unmanaged.
    pub fn forget_client(&mut self, id: ClientId) {
        for slot in self.prev_zooms.iter_mut() {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

/// A physical monitor and the window management state scoped to it.
///
/// `clients` is the attach list driving layout order; `stack` is the focus
/// history, most recently focused first. Both hold handles into the shared
/// [ClientArena].
#[derive(Debug, Clone)]
pub struct Monitor {
    /// Stable monitor number used by placement rules
    pub num: usize,
    /// Symbol of the active layout, shown in the bar
    pub lt_symbol: String,
    /// Fraction of the work area given to the master column
    pub mfact: f32,
    /// Number of clients in the master area
    pub n_master: u32,
    /// Full monitor extent in screen coordinates
    pub screen: Rect,
    /// Usable area after bar reservation
    pub window_area: Rect,
    /// Y position of the bar window
    pub bar_y: i32,
    pub gaps: Gaps,
    pub enable_gaps: bool,
    pub show_bar: bool,
    pub top_bar: bool,
    /// Which of the two tagsets is live
    pub sel_tags: usize,
    /// Which of the two layout slots is live
    pub sel_lt: usize,
    /// Two tag views, toggled between for quick back-and-forth
    pub tagset: [u32; 2],
    /// Indices into the layout table for the two layout slots
    pub lt: [usize; 2],
    /// Attach order, drives layout placement
    pub clients: Vec<ClientId>,
    /// Focus history, most recent first
    pub stack: Vec<ClientId>,
    /// The focused client on this monitor
    pub sel: Option<ClientId>,
    /// The bar window owned by this monitor
    pub bar_win: Xid,
    pub pertag: Pertag,
}

impl Monitor {
    pub fn new(
        num: usize,
        screen: Rect,
        n_tags: usize,
        n_master: u32,
        mfact: f32,
        show_bar: bool,
        top_bar: bool,
        gaps: Gaps,
    ) -> Self {
        Self {
            num,
            lt_symbol: String::new(),
            mfact,
            n_master,
            screen,
            window_area: screen,
            bar_y: 0,
            gaps,
            enable_gaps: true,
            show_bar,
            top_bar,
            sel_tags: 0,
            sel_lt: 0,
            tagset: [1, 1],
            lt: [0, 1],
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            bar_win: Xid(0),
            pertag: Pertag::new(n_tags, n_master, mfact, show_bar, gaps),
        }
    }

    /// The tagset currently in view.
    pub fn active_tagset(&self) -> u32 {
        self.tagset[self.sel_tags]
    }

    /// The layout table index currently in effect.
    pub fn active_layout(&self) -> usize {
        self.lt[self.sel_lt]
    }

    /// Recompute the window area and bar position from the monitor extent.
    ///
    /// `v_pad` is the vertical padding between the bar and the window area.
    pub fn update_bar_pos(&mut self, bar_h: i32, v_pad: i32) {
        self.window_area = self.screen;
        if self.show_bar {
            self.window_area.h = (self.screen.h as i32 - bar_h - v_pad).max(1) as u32;
            if self.top_bar {
                self.bar_y = self.window_area.y;
                self.window_area.y += bar_h + v_pad;
            } else {
                self.bar_y = self.window_area.bottom() + v_pad;
            }
        } else {
            self.bar_y = -bar_h - v_pad;
        }
    }

    // -- client ordering ------------------------------------------------

    /// Attach at the head of the client list.
    pub fn attach(&mut self, id: ClientId) {
        self.clients.insert(0, id);
    }

    /// Attach below the selected client.
    ///
    /// When nothing is selected, or the selection floats, the client lands
    /// after the first tiled client sharing its tags instead so new windows
    /// never displace the master.
    pub fn attach_below(&mut self, id: ClientId, arena: &ClientArena) {
        let tags = arena.get(id).map(|c| c.tags).unwrap_or(0);
        let anchor = match self.sel.and_then(|s| arena.get(s)) {
            Some(s) if !s.is_floating => self.sel,
            _ => self
                .clients
                .iter()
                .copied()
                .find(|&o| arena.get(o).is_some_and(|c| !c.is_floating && c.tags & tags != 0)),
        };

        match anchor.and_then(|a| self.clients.iter().position(|&o| o == a)) {
            Some(i) => self.clients.insert(i + 1, id),
            None => self.attach(id),
        }
    }

    /// Remove from the client list.
    pub fn detach(&mut self, id: ClientId) {
        self.clients.retain(|&o| o != id);
    }

    /// Push onto the front of the focus stack.
    pub fn attach_stack(&mut self, id: ClientId) {
        self.stack.insert(0, id);
    }

    /// Remove from the focus stack, falling the selection back to the next
    /// visible client when the selected one leaves.
    pub fn detach_stack(&mut self, id: ClientId, arena: &ClientArena) {
        self.stack.retain(|&o| o != id);
        if self.sel == Some(id) {
            self.sel = self.top_of_stack(arena);
        }
    }

    /// The most recently focused client still visible on the current view.
    pub fn top_of_stack(&self, arena: &ClientArena) -> Option<ClientId> {
        let tagset = self.active_tagset();
        self.stack
            .iter()
            .copied()
            .find(|&id| arena.get(id).is_some_and(|c| c.is_visible_on(tagset)))
    }

    /// Clients visible on the current view, in attach order.
    pub fn visible<'a>(&'a self, arena: &'a ClientArena) -> impl Iterator<Item = ClientId> + 'a {
        let tagset = self.active_tagset();
        self.clients
            .iter()
            .copied()
            .filter(move |&id| arena.get(id).is_some_and(|c| c.is_visible_on(tagset)))
    }

    /// Visible non-floating clients, in attach order: the layout input.
    pub fn tiled<'a>(&'a self, arena: &'a ClientArena) -> impl Iterator<Item = ClientId> + 'a {
        let tagset = self.active_tagset();
        self.clients.iter().copied().filter(move |&id| {
            arena
                .get(id)
                .is_some_and(|c| c.is_visible_on(tagset) && !c.is_floating)
        })
    }

    /// Move `id` so that it sits directly before or after `anchor` in the
    /// client list.
    pub fn insert_relative(&mut self, anchor: ClientId, id: ClientId, after: bool) {
        if anchor == id {
            return;
        }
        self.detach(id);
        if let Some(i) = self.clients.iter().position(|&o| o == anchor) {
            let at = if after { i + 1 } else { i };
            self.clients.insert(at, id);
        }
    }

    // -- tag views ------------------------------------------------------

    /// Switch to the view given by `tagset_arg` (already masked).
    ///
    /// Passing the mask of every tag selects the union view; passing the
    /// current view is a no-op. Zero toggles back to the previous view.
    /// Returns false for the no-op case.
    pub fn view(&mut self, tagset_arg: u32, n_tags: usize) -> bool {
        if tagset_arg & crate::pure::tag_mask(n_tags) == self.active_tagset() {
            return false;
        }

        self.sel_tags ^= 1;
        if tagset_arg & crate::pure::tag_mask(n_tags) != 0 {
            self.tagset[self.sel_tags] = tagset_arg & crate::pure::tag_mask(n_tags);
            self.pertag.prev_tag = self.pertag.cur_tag;
            self.pertag.cur_tag = if tagset_arg == u32::MAX {
                0
            } else {
                tagset_arg.trailing_zeros() as usize + 1
            };
        } else {
            std::mem::swap(&mut self.pertag.prev_tag, &mut self.pertag.cur_tag);
        }

        self.load_pertag();

        true
    }

    /// Toggle tags in and out of the current view.
    ///
    /// Returns false when the toggle would empty the view.
    pub fn toggle_view(&mut self, tagset_arg: u32, n_tags: usize) -> bool {
        let mask = crate::pure::tag_mask(n_tags);
        let new_tagset = self.active_tagset() ^ (tagset_arg & mask);
        if new_tagset == 0 {
            return false;
        }

        if new_tagset == mask {
            self.pertag.prev_tag = self.pertag.cur_tag;
            self.pertag.cur_tag = 0;
        }
        // viewing a tagset that no longer includes the current tag hands
        // per-tag state over to the first tag still in view
        if new_tagset & (1 << (self.pertag.cur_tag.wrapping_sub(1))) == 0 || self.pertag.cur_tag == 0
        {
            if new_tagset != mask {
                self.pertag.prev_tag = self.pertag.cur_tag;
                self.pertag.cur_tag = new_tagset.trailing_zeros() as usize + 1;
            }
        }

        self.tagset[self.sel_tags] = new_tagset;
        self.load_pertag();

        true
    }

    /// Reload the live settings from the per-tag slot of the current tag.
    /// Returns true when the bar visibility changed and needs repositioning.
    pub fn load_pertag(&mut self) -> bool {
        let t = self.pertag.cur_tag;
        self.n_master = self.pertag.n_masters[t];
        self.mfact = self.pertag.mfacts[t];
        self.sel_lt = self.pertag.sel_lts[t];
        self.lt = self.pertag.lt_idxs[t];
        self.gaps = self.pertag.gaps[t];
        self.enable_gaps = self.pertag.enable_gaps[t];

        let bar_changed = self.show_bar != self.pertag.show_bars[t];
        self.show_bar = self.pertag.show_bars[t];

        bar_changed
    }

    // -- per-tag setters ------------------------------------------------

    /// Adjust the master area factor. `f` below 1.0 is a relative delta,
    /// above is absolute minus one. Out of range results are discarded.
    pub fn set_mfact(&mut self, f: f32) {
        let f = if f < 1.0 { f + self.mfact } else { f - 1.0 };
        if !(0.05..=0.95).contains(&f) {
            return;
        }
        self.mfact = f;
        self.pertag.mfacts[self.pertag.cur_tag] = f;
    }

    /// Grow or shrink the master client count, floored at zero.
    pub fn inc_n_master(&mut self, delta: i32) {
        self.n_master = (self.n_master as i32 + delta).max(0) as u32;
        self.pertag.n_masters[self.pertag.cur_tag] = self.n_master;
    }

    /// Select a layout, flipping to the other slot unless the requested
    /// layout is already active. `None` flips without changing either slot.
    pub fn set_layout(&mut self, layout: Option<usize>) {
        if layout.is_none() || layout != Some(self.active_layout()) {
            self.sel_lt ^= 1;
            self.pertag.sel_lts[self.pertag.cur_tag] = self.sel_lt;
        }
        if let Some(idx) = layout {
            self.lt[self.sel_lt] = idx;
            self.pertag.lt_idxs[self.pertag.cur_tag] = self.lt;
        }
    }

    pub fn set_gaps(&mut self, gaps: Gaps) {
        self.gaps = gaps.clamped();
        self.pertag.gaps[self.pertag.cur_tag] = self.gaps;
    }

    pub fn toggle_gaps(&mut self) {
        self.enable_gaps = !self.enable_gaps;
        self.pertag.enable_gaps[self.pertag.cur_tag] = self.enable_gaps;
    }

    pub fn toggle_bar(&mut self) {
        self.show_bar = !self.show_bar;
        self.pertag.show_bars[self.pertag.cur_tag] = self.show_bar;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pure::client::Client;
    use simple_test_case::test_case;

    const N_TAGS: usize = 9;

    fn monitor() -> Monitor {
        Monitor::new(
            0,
            Rect::new(0, 0, 1920, 1080),
            N_TAGS,
            1,
            0.55,
            true,
            true,
            Gaps::new(10, 10, 5, 5),
        )
    }

    fn add_client(m: &mut Monitor, arena: &mut ClientArena, win: u32, floating: bool) -> ClientId {
        let mut c = Client::new(Xid(win), Rect::new(0, 0, 100, 100), 1, None);
        c.tags = m.active_tagset();
        c.is_floating = floating;
        let id = arena.insert(c);
        m.attach_below(id, arena);
        m.attach_stack(id);
        m.sel = Some(id);

        id
    }

    #[test]
    fn per_tag_settings_round_trip() {
        let mut m = monitor();
        m.set_mfact(0.1); // relative: 0.55 -> 0.65
        m.inc_n_master(2);

        assert!(m.view(1 << 4, N_TAGS));
        assert_eq!(m.mfact, 0.55);
        assert_eq!(m.n_master, 1);

        m.set_mfact(1.3); // absolute: 0.3
        assert!(m.view(1, N_TAGS));
        assert!((m.mfact - 0.65).abs() < f32::EPSILON);
        assert_eq!(m.n_master, 3);

        assert!(m.view(1 << 4, N_TAGS));
        assert!((m.mfact - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn view_zero_returns_to_previous_view() {
        let mut m = monitor();
        assert!(m.view(1 << 2, N_TAGS));
        assert!(m.view(0, N_TAGS));

        assert_eq!(m.active_tagset(), 1);
        assert_eq!(m.pertag.cur_tag, 1);
        assert_eq!(m.pertag.prev_tag, 3);
    }

    #[test]
    fn view_of_current_tagset_is_a_noop() {
        let mut m = monitor();
        assert!(!m.view(1, N_TAGS));
    }

    #[test]
    fn union_view_uses_slot_zero() {
        let mut m = monitor();
        assert!(m.view(u32::MAX, N_TAGS));

        assert_eq!(m.active_tagset(), crate::pure::tag_mask(N_TAGS));
        assert_eq!(m.pertag.cur_tag, 0);
    }

    #[test]
    fn toggle_view_refuses_to_empty_the_view() {
        let mut m = monitor();
        assert!(!m.toggle_view(1, N_TAGS));
        assert_eq!(m.active_tagset(), 1);
    }

    #[test]
    fn toggle_view_moves_current_tag_when_it_leaves() {
        let mut m = monitor();
        assert!(m.toggle_view(1 << 3, N_TAGS)); // view tags 1 and 4
        assert_eq!(m.pertag.cur_tag, 1);

        assert!(m.toggle_view(1, N_TAGS)); // drop tag 1
        assert_eq!(m.active_tagset(), 1 << 3);
        assert_eq!(m.pertag.cur_tag, 4);
    }

    #[test]
    fn mfact_rejects_out_of_range() {
        let mut m = monitor();
        m.set_mfact(0.9); // 0.55 + 0.9 > 0.95

        assert!((m.mfact - 0.55).abs() < f32::EPSILON);
    }

    #[test]
    fn set_layout_keeps_slot_on_reselect() {
        let mut m = monitor();
        assert_eq!(m.active_layout(), 0);

        m.set_layout(Some(2));
        assert_eq!(m.active_layout(), 2);
        assert_eq!(m.sel_lt, 1);

        // re-selecting the active layout is a no-op
        m.set_layout(Some(2));
        assert_eq!(m.sel_lt, 1);
        assert_eq!(m.active_layout(), 2);

        // a bare flip returns to the previous slot
        m.set_layout(None);
        assert_eq!(m.sel_lt, 0);
        assert_eq!(m.active_layout(), 0);
    }

    #[test]
    fn attach_below_keeps_master_in_place() {
        let mut m = monitor();
        let mut arena = ClientArena::new();
        let a = add_client(&mut m, &mut arena, 1, false);
        let b = add_client(&mut m, &mut arena, 2, false);
        let c = add_client(&mut m, &mut arena, 3, false);

        // each new client lands after the selection
        assert_eq!(m.clients, vec![a, b, c]);
    }

    #[test]
    fn attach_below_with_floating_selection_lands_after_first_tiled() {
        let mut m = monitor();
        let mut arena = ClientArena::new();
        let a = add_client(&mut m, &mut arena, 1, false);
        let f = add_client(&mut m, &mut arena, 2, true);
        let b = add_client(&mut m, &mut arena, 3, false);

        assert_eq!(m.clients, vec![a, b, f]);
    }

    #[test]
    fn detach_stack_falls_back_to_next_visible() {
        let mut m = monitor();
        let mut arena = ClientArena::new();
        let a = add_client(&mut m, &mut arena, 1, false);
        let b = add_client(&mut m, &mut arena, 2, false);

        assert_eq!(m.sel, Some(b));
        m.detach_stack(b, &arena);

        assert_eq!(m.sel, Some(a));
        assert_eq!(m.stack, vec![a]);
    }

    #[test]
    fn tiled_skips_floating_and_hidden() {
        let mut m = monitor();
        let mut arena = ClientArena::new();
        let a = add_client(&mut m, &mut arena, 1, false);
        let _f = add_client(&mut m, &mut arena, 2, true);
        let b = add_client(&mut m, &mut arena, 3, false);
        if let Some(c) = arena.get_mut(b) {
            c.tags = 1 << 5; // not in view
        }

        assert_eq!(m.tiled(&arena).collect::<Vec<_>>(), vec![a]);
    }

    #[test_case(true, 0, 32; "top bar")]
    #[test_case(false, 1048, 0; "bottom bar")]
    #[test]
    fn bar_position(top: bool, expected_by: i32, expected_wy: i32) {
        let mut m = monitor();
        m.top_bar = top;
        m.update_bar_pos(32, 0);

        assert_eq!(m.bar_y, expected_by);
        assert_eq!(m.window_area.y, expected_wy);
        assert_eq!(m.window_area.h, 1048);
    }

    #[test]
    fn hidden_bar_parks_offscreen() {
        let mut m = monitor();
        m.show_bar = false;
        m.update_bar_pos(32, 4);

        assert_eq!(m.bar_y, -36);
        assert_eq!(m.window_area, m.screen);
    }

    #[test]
    fn insert_relative_moves_clients() {
        let mut m = monitor();
        let mut arena = ClientArena::new();
        let a = add_client(&mut m, &mut arena, 1, false);
        let b = add_client(&mut m, &mut arena, 2, false);
        let c = add_client(&mut m, &mut arena, 3, false);

        m.insert_relative(a, c, false);
        assert_eq!(m.clients, vec![c, a, b]);

        m.insert_relative(b, c, true);
        assert_eq!(m.clients, vec![a, b, c]);
    }
}
