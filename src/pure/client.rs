//! Managed client windows and the arena that owns them.
use crate::{
    pure::{geometry::Rect, hints::SizeHints},
    Xid,
};
use std::collections::HashMap;

/// A stable handle into the [ClientArena].
///
/// Handles stay valid until the client they name is removed; slots are then
/// reused so a stale handle may later point at a different client. All
/// internal bookkeeping (attach lists, focus stacks, swallow links) drops
/// its handles when the client is unmanaged, so this never bites in
/// practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub(crate) usize);

/// State tracked for each client window being managed.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    /// The X window being managed
    pub win: Xid,
    /// Current WM_NAME / _NET_WM_NAME
    pub name: String,
    /// Process id of the owning process, if the window advertises one
    pub pid: Option<u32>,
    /// The tags this client is visible on, as a bitmask
    pub tags: u32,
    /// Index of the monitor this client is assigned to
    pub monitor: usize,
    /// Current geometry (border excluded)
    pub rect: Rect,
    /// Geometry before the last move / resize
    pub old_rect: Rect,
    /// Saved floating geometry, restored when the client floats again
    pub float_rect: Rect,
    /// Current border width in pixels
    pub bw: i32,
    /// Border width the window had before being managed
    pub old_bw: i32,
    /// Relative size factor used by the tiled layouts
    pub cfact: f32,
    /// Parsed WM_NORMAL_HINTS
    pub hints: SizeHints,
    /// Min and max hints pin the size: always floats, never gets a resize
    pub is_fixed: bool,
    pub is_floating: bool,
    /// An explicit placement spec positioned this client
    pub is_floatpos: bool,
    pub is_urgent: bool,
    pub is_fullscreen: bool,
    /// Terminal clients may swallow the windows of their child processes
    pub is_terminal: bool,
    /// This client must never swallow or be swallowed
    pub no_swallow: bool,
    /// WM_HINTS asked us not to set input focus directly
    pub never_focus: bool,
    /// Size hints are skipped entirely for this client
    pub ignore_size_hints: bool,
    /// Floating state before entering fullscreen
    pub old_state: bool,
    /// The hidden client this one has swallowed, if any
    pub swallowing: Option<ClientId>,
}

impl Client {
    /// A freshly mapped window: everything defaults off and the geometry is
    /// taken from the window attributes.
    pub fn new(win: Xid, rect: Rect, old_bw: i32, pid: Option<u32>) -> Self {
        Self {
            win,
            name: String::new(),
            pid,
            tags: 0,
            monitor: 0,
            rect,
            old_rect: rect,
            float_rect: rect,
            bw: 0,
            old_bw,
            cfact: 1.0,
            hints: SizeHints::default(),
            is_fixed: false,
            is_floating: false,
            is_floatpos: false,
            is_urgent: false,
            is_fullscreen: false,
            is_terminal: false,
            no_swallow: false,
            never_focus: false,
            ignore_size_hints: false,
            old_state: false,
            swallowing: None,
        }
    }

    /// Whether this client shows on the given tagset.
    pub fn is_visible_on(&self, tagset: u32) -> bool {
        self.tags & tagset != 0
    }

    /// Total width including both borders.
    pub fn width(&self) -> i32 {
        self.rect.w as i32 + 2 * self.bw
    }

    /// Total height including both borders.
    pub fn height(&self) -> i32 {
        self.rect.h as i32 + 2 * self.bw
    }

    /// Record the current geometry as the floating geometry to restore.
    pub fn save_float_rect(&mut self) {
        self.float_rect = self.rect;
    }

    /// Re-derive the cached fixed flag after a WM_NORMAL_HINTS update.
    pub fn update_fixed(&mut self) {
        self.is_fixed = self.hints.is_fixed();
    }
}

/// Slot based storage for all managed clients.
///
/// Ordering concerns (attach lists, focus stacks) live on [Monitor]: the
/// arena only owns the client data and the window -> client index.
///
/// [Monitor]: crate::pure::monitor::Monitor
#[derive(Debug, Default, Clone)]
pub struct ClientArena {
    slots: Vec<Option<Client>>,
    by_win: HashMap<Xid, ClientId>,
}

impl ClientArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a client, reusing a free slot when one exists.
    pub fn insert(&mut self, client: Client) -> ClientId {
        let win = client.win;
        let id = match self.slots.iter().position(Option::is_none) {
            Some(i) => {
                self.slots[i] = Some(client);
                ClientId(i)
            }
            None => {
                self.slots.push(Some(client));
                ClientId(self.slots.len() - 1)
            }
        };
        self.by_win.insert(win, id);

        id
    }

    /// Drop a client, freeing its slot for reuse.
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        let client = self.slots.get_mut(id.0)?.take()?;
        if self.by_win.get(&client.win) == Some(&id) {
            self.by_win.remove(&client.win);
        }

        Some(client)
    }

    /// Hand ownership of an X window to a client, keeping the window index
    /// consistent. Swallowing swaps windows between clients this way.
    pub fn set_win(&mut self, id: ClientId, win: Xid) {
        if let Some(c) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
            let old = c.win;
            c.win = win;
            if self.by_win.get(&old) == Some(&id) {
                self.by_win.remove(&old);
            }
            self.by_win.insert(win, id);
        }
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    /// Look up the client managing a given X window.
    pub fn id_for_win(&self, win: Xid) -> Option<ClientId> {
        self.by_win.get(&win).copied()
    }

    /// The client that has swallowed the given window, if any.
    pub fn swallowing_win(&self, win: Xid) -> Option<ClientId> {
        self.iter().find_map(|(id, c)| {
            let inner = c.swallowing?;
            (self.get(inner)?.win == win).then_some(id)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClientId, &Client)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (ClientId(i), c)))
    }

    pub fn len(&self) -> usize {
        self.by_win.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_win.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(win: u32) -> Client {
        Client::new(Xid(win), Rect::new(0, 0, 100, 100), 1, None)
    }

    #[test]
    fn insert_and_lookup_by_window() {
        let mut arena = ClientArena::new();
        let id = arena.insert(client(42));

        assert_eq!(arena.id_for_win(Xid(42)), Some(id));
        assert_eq!(arena.get(id).map(|c| c.win), Some(Xid(42)));
    }

    #[test]
    fn removal_clears_window_index() {
        let mut arena = ClientArena::new();
        let id = arena.insert(client(42));
        let removed = arena.remove(id);

        assert_eq!(removed.map(|c| c.win), Some(Xid(42)));
        assert_eq!(arena.id_for_win(Xid(42)), None);
        assert!(arena.get(id).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn slots_are_reused() {
        let mut arena = ClientArena::new();
        let a = arena.insert(client(1));
        let _b = arena.insert(client(2));
        arena.remove(a);
        let c = arena.insert(client(3));

        assert_eq!(c, a);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn swallowing_window_lookup() {
        let mut arena = ClientArena::new();
        let inner = arena.insert(client(7));
        let term = arena.insert(client(8));
        if let Some(t) = arena.get_mut(term) {
            t.swallowing = Some(inner);
        }

        assert_eq!(arena.swallowing_win(Xid(7)), Some(term));
        assert_eq!(arena.swallowing_win(Xid(8)), None);
    }

    #[test]
    fn set_win_swap_keeps_index_consistent() {
        let mut arena = ClientArena::new();
        let a = arena.insert(client(1));
        let b = arena.insert(client(2));

        arena.set_win(a, Xid(2));
        arena.set_win(b, Xid(1));

        assert_eq!(arena.id_for_win(Xid(2)), Some(a));
        assert_eq!(arena.id_for_win(Xid(1)), Some(b));

        // removing one half of the swap leaves the other lookup intact
        arena.remove(b);
        assert_eq!(arena.id_for_win(Xid(2)), Some(a));
        assert_eq!(arena.id_for_win(Xid(1)), None);
    }

    #[test]
    fn visibility_follows_tag_bits() {
        let mut c = client(1);
        c.tags = 0b0101;

        assert!(c.is_visible_on(0b0001));
        assert!(c.is_visible_on(0b0110));
        assert!(!c.is_visible_on(0b1010));
    }
}
