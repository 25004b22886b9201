//! The escher binary: static configuration, binding tables, startup.
use escher::{
    core::{
        actions,
        bindings::{ClickInfo, ClickTarget, KeyHandler, ModMask, MouseBinding, MouseButton, MouseState},
        Config, State, WindowManager,
    },
    key_handler, map,
    pure::floatpos::FloatSpec,
    rules::Rule,
    spawn, util,
    x::XConn,
};
use nix::sys::{
    signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal},
    wait::{waitpid, WaitPidFlag, WaitStatus},
};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!("escher-", env!("CARGO_PKG_VERSION"));

const MODKEY: ModMask = ModMask::MOD4;
const SHIFT: ModMask = ModMask::SHIFT;
const CTRL: ModMask = ModMask::CTRL;

const TERMINAL: &str = "st";

// Keysyms for the non-ascii keys in the binding table. Ascii keys use
// their char codes directly.
const XK_RETURN: u32 = 0xff0d;
const XK_TAB: u32 = 0xff09;
const XK_LEFT: u32 = 0xff51;
const XK_RIGHT: u32 = 0xff53;

fn config() -> Config {
    Config {
        rules: vec![
            Rule {
                class: Some("St".to_string()),
                is_terminal: true,
                ..Default::default()
            },
            Rule {
                class: Some("Alacritty".to_string()),
                is_terminal: true,
                ..Default::default()
            },
            Rule {
                class: Some("Gimp".to_string()),
                is_floating: true,
                ..Default::default()
            },
            Rule {
                title: Some("Event Tester".to_string()),
                no_swallow: true,
                ..Default::default()
            },
            Rule {
                class: Some("scratchpad".to_string()),
                float_pos: FloatSpec::parse("50% 50% 60% 60%"),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

fn raw_key_bindings<X: XConn + 'static>() -> HashMap<(ModMask, u32), KeyHandler<X>> {
    let m = MODKEY;
    let mut keys: HashMap<(ModMask, u32), KeyHandler<X>> = map! {
        (m, 'p' as u32) => spawn!("dmenu_run"),
        (m | SHIFT, XK_RETURN) => spawn!(TERMINAL),
        (m, 'b' as u32) => key_handler!(actions::toggle_bar),
        (m, 'j' as u32) => key_handler!(|s: &mut State, x: &X| actions::focus_stack(s, x, 1)),
        (m, 'k' as u32) => key_handler!(|s: &mut State, x: &X| actions::focus_stack(s, x, -1)),
        (m | CTRL, 'm' as u32) => key_handler!(actions::focus_master),
        (m, 'i' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_n_master(s, x, 1)),
        (m, 'd' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_n_master(s, x, -1)),
        (m, 'h' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_mfact(s, x, -0.05)),
        (m, 'l' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_mfact(s, x, 0.05)),
        (m | SHIFT, 'h' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_cfact(s, x, 0.25)),
        (m | SHIFT, 'l' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_cfact(s, x, -0.25)),
        (m | SHIFT, 'o' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_cfact(s, x, 0.0)),
        (m, XK_RETURN) => key_handler!(actions::zoom),
        (m | SHIFT, 'j' as u32) => key_handler!(|s: &mut State, x: &X| actions::inplace_rotate(s, x, 1)),
        (m | SHIFT, 'k' as u32) => key_handler!(|s: &mut State, x: &X| actions::inplace_rotate(s, x, -1)),
        (m, XK_TAB) => key_handler!(|s: &mut State, x: &X| actions::view_tagset(s, x, 0)),
        (m | SHIFT, 'c' as u32) => key_handler!(actions::kill_client),
        (m, 't' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_layout(s, x, Some(0))),
        (m, 'f' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_layout(s, x, Some(1))),
        (m, 'm' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_layout(s, x, Some(2))),
        (m, ' ' as u32) => key_handler!(|s: &mut State, x: &X| actions::set_layout(s, x, None)),
        (m | CTRL, ',' as u32) => key_handler!(|s: &mut State, x: &X| actions::cycle_layout(s, x, -1)),
        (m | CTRL, '.' as u32) => key_handler!(|s: &mut State, x: &X| actions::cycle_layout(s, x, 1)),
        (m | SHIFT, ' ' as u32) => key_handler!(actions::toggle_floating),
        (m | SHIFT, 'f' as u32) => key_handler!(actions::toggle_fullscreen),
        (m, '0' as u32) => key_handler!(|s: &mut State, x: &X| actions::view_tagset(s, x, u32::MAX)),
        (m | SHIFT, '0' as u32) => key_handler!(|s: &mut State, x: &X| actions::tag(s, x, u32::MAX)),
        (m, ',' as u32) => key_handler!(|s: &mut State, x: &X| actions::focus_mon(s, x, -1)),
        (m, '.' as u32) => key_handler!(|s: &mut State, x: &X| actions::focus_mon(s, x, 1)),
        (m | SHIFT, ',' as u32) => key_handler!(|s: &mut State, x: &X| actions::tag_mon(s, x, -1)),
        (m | SHIFT, '.' as u32) => key_handler!(|s: &mut State, x: &X| actions::tag_mon(s, x, 1)),
        (m, XK_LEFT) => key_handler!(|s: &mut State, x: &X| actions::shift_view(s, x, -1)),
        (m, XK_RIGHT) => key_handler!(|s: &mut State, x: &X| actions::shift_view(s, x, 1)),
        (m | SHIFT, XK_LEFT) => key_handler!(|s: &mut State, x: &X| actions::shift_client(s, x, -1)),
        (m | SHIFT, XK_RIGHT) => key_handler!(|s: &mut State, x: &X| actions::shift_client(s, x, 1)),
        (m, '-' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_gaps(s, x, -2)),
        (m, '=' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_gaps(s, x, 2)),
        (m | SHIFT, '=' as u32) => key_handler!(actions::default_gaps),
        (m | SHIFT, '-' as u32) => key_handler!(actions::toggle_gaps),
        (m | CTRL, '-' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_inner_gaps(s, x, -2)),
        (m | CTRL, '=' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_inner_gaps(s, x, 2)),
        (m | CTRL | SHIFT, '-' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_outer_gaps(s, x, -2)),
        (m | CTRL | SHIFT, '=' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_outer_gaps(s, x, 2)),
        (m, '[' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_inner_h_gaps(s, x, -2)),
        (m, ']' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_inner_h_gaps(s, x, 2)),
        (m | SHIFT, '[' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_inner_v_gaps(s, x, -2)),
        (m | SHIFT, ']' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_inner_v_gaps(s, x, 2)),
        (m | CTRL, '[' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_outer_h_gaps(s, x, -2)),
        (m | CTRL, ']' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_outer_h_gaps(s, x, 2)),
        (m | CTRL | SHIFT, '[' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_outer_v_gaps(s, x, -2)),
        (m | CTRL | SHIFT, ']' as u32) => key_handler!(|s: &mut State, x: &X| actions::inc_outer_v_gaps(s, x, 2)),
        (m | SHIFT, 'q' as u32) => key_handler!(actions::quit),
    };

    for i in 0..9usize {
        let sym = '1' as u32 + i as u32;
        keys.insert(
            (m, sym),
            key_handler!(move |s: &mut State, x: &X| actions::view(s, x, i)),
        );
        keys.insert(
            (m | CTRL, sym),
            key_handler!(move |s: &mut State, x: &X| actions::toggle_view(s, x, 1 << i)),
        );
        keys.insert(
            (m | SHIFT, sym),
            key_handler!(move |s: &mut State, x: &X| actions::tag(s, x, 1 << i)),
        );
        keys.insert(
            (m | CTRL | SHIFT, sym),
            key_handler!(move |s: &mut State, x: &X| actions::toggle_tag(s, x, 1 << i)),
        );
    }

    keys
}

fn mouse_bindings<X: XConn + 'static>() -> Vec<MouseBinding<X>> {
    use ClickTarget::*;
    use MouseButton::*;

    let none = ModMask::empty();

    vec![
        MouseBinding::new(
            ClientWin,
            MouseState::new(Left, MODKEY),
            Box::new(|s: &mut State, x: &X, _: &ClickInfo| actions::move_mouse(s, x)),
        ),
        MouseBinding::new(
            ClientWin,
            MouseState::new(Middle, MODKEY),
            Box::new(|s: &mut State, x: &X, _: &ClickInfo| actions::toggle_floating(s, x)),
        ),
        MouseBinding::new(
            ClientWin,
            MouseState::new(Right, MODKEY),
            Box::new(|s: &mut State, x: &X, _: &ClickInfo| actions::resize_mouse(s, x)),
        ),
        MouseBinding::new(
            LayoutSymbol,
            MouseState::new(Left, none),
            Box::new(|s: &mut State, x: &X, _: &ClickInfo| actions::set_layout(s, x, None)),
        ),
        MouseBinding::new(
            LayoutSymbol,
            MouseState::new(Right, none),
            Box::new(|s: &mut State, x: &X, _: &ClickInfo| actions::cycle_layout(s, x, 1)),
        ),
        MouseBinding::new(
            WinTitle,
            MouseState::new(Left, none),
            Box::new(|s: &mut State, x: &X, _: &ClickInfo| actions::zoom(s, x)),
        ),
        MouseBinding::new(
            TagBar,
            MouseState::new(Left, none),
            Box::new(|s: &mut State, x: &X, i: &ClickInfo| match i.tag {
                Some(t) => actions::view(s, x, t),
                None => Ok(()),
            }),
        ),
        MouseBinding::new(
            TagBar,
            MouseState::new(Right, none),
            Box::new(|s: &mut State, x: &X, i: &ClickInfo| match i.tag {
                Some(t) => actions::toggle_view(s, x, 1 << t),
                None => Ok(()),
            }),
        ),
        MouseBinding::new(
            TagBar,
            MouseState::new(Left, MODKEY),
            Box::new(|s: &mut State, x: &X, i: &ClickInfo| match i.tag {
                Some(t) => actions::tag(s, x, 1 << t),
                None => Ok(()),
            }),
        ),
        MouseBinding::new(
            TagBar,
            MouseState::new(Right, MODKEY),
            Box::new(|s: &mut State, x: &X, i: &ClickInfo| match i.tag {
                Some(t) => actions::toggle_tag(s, x, 1 << t),
                None => Ok(()),
            }),
        ),
        MouseBinding::new(
            StatusText,
            MouseState::new(Left, none),
            Box::new(|s: &mut State, x: &X, i: &ClickInfo| actions::sig_status(s, x, i)),
        ),
        MouseBinding::new(
            StatusText,
            MouseState::new(Middle, none),
            Box::new(|s: &mut State, x: &X, i: &ClickInfo| actions::sig_status(s, x, i)),
        ),
        MouseBinding::new(
            StatusText,
            MouseState::new(Right, none),
            Box::new(|s: &mut State, x: &X, i: &ClickInfo| actions::sig_status(s, x, i)),
        ),
    ]
}

/// Stop terminated children from lingering as zombies and reap any that were
/// inherited from whatever launched us.
fn clean_up_children() {
    let action = SigAction::new(
        SigHandler::SigIgn,
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_NOCLDWAIT | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: installing SIG_IGN has no handler to race with
    if unsafe { sigaction(Signal::SIGCHLD, &action) }.is_err() {
        util::die("escher: unable to install SIGCHLD handler");
    }

    while let Ok(status) = waitpid(None, Some(WaitPidFlag::WNOHANG)) {
        if matches!(status, WaitStatus::StillAlive) {
            break;
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("-v") => util::die(VERSION),
        Some(_) => util::die("usage: escher [-v]"),
        None => (),
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    clean_up_children();

    let conn = match escher::x11rb::new_conn() {
        Ok(conn) => conn,
        Err(e) => util::die(&format!("escher: unable to connect to the X server: {e}")),
    };

    let mut wm = match WindowManager::new(conn, config(), raw_key_bindings(), mouse_bindings()) {
        Ok(wm) => wm,
        Err(e) => util::die(&format!("escher: startup failed: {e}")),
    };

    if let Err(e) = wm.run() {
        util::die(&format!("escher: fatal error: {e}"));
    }
}
