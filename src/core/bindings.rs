//! Key and mouse bindings.
use crate::{core::State, Result};
use bitflags::bitflags;

bitflags! {
    /// X modifier masks for key and button events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModMask: u16 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CTRL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
    }
}

impl ModMask {
    /// Strip Lock and NumLock and anything that is not a real modifier, so
    /// bindings fire regardless of lock state.
    pub fn clean(self, numlock: ModMask) -> ModMask {
        let significant = ModMask::SHIFT
            | ModMask::CTRL
            | ModMask::MOD1
            | ModMask::MOD2
            | ModMask::MOD3
            | ModMask::MOD4
            | ModMask::MOD5;

        (self - (numlock | ModMask::LOCK)) & significant
    }
}

/// A raw keycode plus the modifier state it was pressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode {
    pub mask: ModMask,
    pub code: u8,
}

impl KeyCode {
    pub fn new(mask: ModMask, code: u8) -> Self {
        Self { mask, code }
    }
}

/// The mouse buttons bindings can be hung off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
}

impl From<MouseButton> for u8 {
    fn from(b: MouseButton) -> u8 {
        match b {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
            MouseButton::ScrollUp => 4,
            MouseButton::ScrollDown => 5,
        }
    }
}

impl MouseButton {
    pub fn from_detail(detail: u8) -> Option<Self> {
        match detail {
            1 => Some(MouseButton::Left),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Right),
            4 => Some(MouseButton::ScrollUp),
            5 => Some(MouseButton::ScrollDown),
            _ => None,
        }
    }
}

/// A mouse button plus the modifier state it was pressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseState {
    pub button: MouseButton,
    pub mask: ModMask,
}

impl MouseState {
    pub fn new(button: MouseButton, mask: ModMask) -> Self {
        Self { button, mask }
    }
}

/// The region of the screen a button press landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    /// A tag indicator in the bar
    TagBar,
    /// The layout symbol in the bar
    LayoutSymbol,
    /// The focused window title area of the bar
    WinTitle,
    /// The status text area of the bar
    StatusText,
    /// A managed client window
    ClientWin,
    /// The root window itself
    RootWin,
}

/// Everything a mouse handler might want to know about the click that
/// triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickInfo {
    pub target: ClickTarget,
    /// Index of the clicked tag when the target is the tag bar
    pub tag: Option<usize>,
    /// Status block signal number when the target is the status text
    pub signal: Option<u8>,
    pub button: MouseButton,
    /// Modifier state of the click, already cleaned of lock masks
    pub mask: ModMask,
}

impl ClickInfo {
    pub fn new(target: ClickTarget, button: MouseButton, mask: ModMask) -> Self {
        Self {
            target,
            tag: None,
            signal: None,
            button,
            mask,
        }
    }
}

/// An action bound to a key press.
pub type KeyHandler<X> = Box<dyn FnMut(&mut State, &X) -> Result<()>>;

/// An action bound to a mouse press on a specific [ClickTarget].
pub type MouseHandler<X> = Box<dyn FnMut(&mut State, &X, &ClickInfo) -> Result<()>>;

/// A single mouse binding: target region, button + modifiers, action.
pub struct MouseBinding<X> {
    pub target: ClickTarget,
    pub state: MouseState,
    pub handler: MouseHandler<X>,
}

impl<X> MouseBinding<X> {
    pub fn new(target: ClickTarget, state: MouseState, handler: MouseHandler<X>) -> Self {
        Self {
            target,
            state,
            handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(
        ModMask::MOD4 | ModMask::LOCK,
        ModMask::MOD2,
        ModMask::MOD4;
        "lock stripped"
    )]
    #[test_case(
        ModMask::MOD4 | ModMask::MOD2,
        ModMask::MOD2,
        ModMask::MOD4;
        "numlock stripped"
    )]
    #[test_case(
        ModMask::SHIFT | ModMask::CTRL,
        ModMask::MOD2,
        ModMask::SHIFT | ModMask::CTRL;
        "real modifiers kept"
    )]
    #[test]
    fn clean_mask(raw: ModMask, numlock: ModMask, expected: ModMask) {
        assert_eq!(raw.clean(numlock), expected);
    }

    #[test]
    fn button_details_round_trip() {
        for detail in 1..=5u8 {
            let b = MouseButton::from_detail(detail).expect("known button");
            assert_eq!(u8::from(b), detail);
        }
        assert_eq!(MouseButton::from_detail(8), None);
    }
}
