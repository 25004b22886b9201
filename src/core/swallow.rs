//! Window swallowing: a terminal that spawns a graphical child hides
//! itself behind the child's window until the child exits.
use crate::{
    core::{ops, State},
    pure::client::{Client, ClientId},
    x::{WmState, XConn},
    Result,
};
use std::fs;

/// Parent pid of a process, read from /proc.
pub(crate) fn parent_pid(pid: u32) -> Option<u32> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    // the command field is parenthesised and may itself contain spaces
    let after_comm = stat.rsplit(')').next()?;
    after_comm.split_whitespace().nth(1)?.parse().ok()
}

/// Whether `child` is a descendant of `parent` in the process tree.
pub(crate) fn is_descendant(parent: u32, child: u32) -> bool {
    walk_ancestors(parent, child, parent_pid)
}

fn walk_ancestors<F: Fn(u32) -> Option<u32>>(parent: u32, mut child: u32, lookup: F) -> bool {
    while child != parent && child != 0 {
        child = lookup(child).unwrap_or(0);
    }

    child == parent
}

/// The terminal that should swallow a newly managed window, if any.
pub(crate) fn term_for(state: &State, new: &Client) -> Option<ClientId> {
    let child_pid = new.pid?;
    if new.is_terminal {
        return None;
    }

    state.clients.iter().find_map(|(id, c)| {
        let pid = c.pid?;
        (c.is_terminal && c.swallowing.is_none() && is_descendant(pid, child_pid)).then_some(id)
    })
}

/// Hide a terminal behind the window of its child process.
pub(crate) fn swallow<X: XConn>(
    state: &mut State,
    x: &X,
    term: ClientId,
    child: ClientId,
) -> Result<()> {
    let (no_swallow, child_terminal, child_floating, child_win) = match state.clients.get(child) {
        Some(c) => (c.no_swallow, c.is_terminal, c.is_floating, c.win),
        None => return Ok(()),
    };
    if no_swallow || child_terminal {
        return Ok(());
    }
    if child_floating && !state.config.swallow_floating {
        return Ok(());
    }

    let child_mon = match state.clients.get(child) {
        Some(c) => c.monitor,
        None => return Ok(()),
    };
    state.monitors[child_mon].detach(child);
    state.monitors[child_mon].detach_stack(child, &state.clients);
    x.set_wm_state(child_win, WmState::Withdrawn)?;

    let (term_win, term_mon, term_rect, term_bw) = match state.clients.get(term) {
        Some(t) => (t.win, t.monitor, t.rect, t.bw),
        None => return Ok(()),
    };
    x.unmap(term_win)?;

    // the terminal keeps its place in the lists and takes over the child's
    // window; the child's original window is parked on the swallow link
    if let Some(c) = state.clients.get_mut(child) {
        c.monitor = term_mon;
    }
    if let Some(t) = state.clients.get_mut(term) {
        t.swallowing = Some(child);
    }
    state.clients.set_win(child, term_win);
    state.clients.set_win(term, child_win);

    ops::update_title(state, x, term)?;
    x.move_resize(child_win, term_rect)?;
    ops::arrange(state, x, Some(term_mon))?;
    x.send_configure_notify(child_win, term_rect, term_bw)?;
    ops::update_client_list(state, x)?;
    info!(%child_win, "terminal swallowed client window");

    Ok(())
}

/// Give a swallowing terminal its own window back after the child exits.
pub(crate) fn unswallow<X: XConn>(state: &mut State, x: &X, term: ClientId) -> Result<()> {
    let swallowed = match state.clients.get(term).and_then(|t| t.swallowing) {
        Some(s) => s,
        None => return Ok(()),
    };
    let term_win = match state.clients.get(swallowed) {
        Some(c) => c.win,
        None => return Ok(()),
    };

    if let Some(t) = state.clients.get_mut(term) {
        t.swallowing = None;
    }
    state.clients.set_win(term, term_win);
    state.clients.remove(swallowed);
    for m in state.monitors.iter_mut() {
        m.pertag.forget_client(swallowed);
    }

    ops::set_fullscreen(state, x, term, false)?;
    ops::update_title(state, x, term)?;
    ops::arrange(state, x, None)?;
    x.map(term_win)?;
    if let Some(t) = state.clients.get(term) {
        let r = t.rect;
        ops::resize_client(state, x, term, r)?;
    }
    x.set_wm_state(term_win, WmState::Normal)?;
    ops::focus(state, x, None)?;
    ops::arrange(state, x, None)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tree(edges: &[(u32, u32)]) -> HashMap<u32, u32> {
        edges.iter().copied().collect()
    }

    #[test]
    fn descendant_walks_the_parent_chain() {
        // 100 -> 200 -> 300
        let t = tree(&[(300, 200), (200, 100), (100, 1)]);
        let lookup = |pid| t.get(&pid).copied();

        assert!(walk_ancestors(100, 300, lookup));
        assert!(walk_ancestors(200, 300, lookup));
        assert!(walk_ancestors(300, 300, lookup));
        assert!(!walk_ancestors(300, 100, lookup));
    }

    #[test]
    fn unrelated_processes_are_not_descendants() {
        let t = tree(&[(300, 200), (200, 1), (400, 1)]);
        let lookup = |pid| t.get(&pid).copied();

        assert!(!walk_ancestors(400, 300, lookup));
    }

    #[test]
    fn orphaned_chain_terminates() {
        let t = tree(&[(300, 200)]);
        let lookup = |pid| t.get(&pid).copied();

        // 200 has no recorded parent: the walk bottoms out at 0
        assert!(!walk_ancestors(100, 300, lookup));
    }
}
