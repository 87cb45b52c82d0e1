//! Mouse event masks and events.

use bitflags::bitflags;

bitflags! {
    /// Mouse events a program can ask for, five bits per button.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseMask: u32 {
        const B1_RELEASED       = 1 << 0;
        const B1_PRESSED        = 1 << 1;
        const B1_CLICKED        = 1 << 2;
        const B1_DOUBLE_CLICKED = 1 << 3;
        const B1_TRIPLE_CLICKED = 1 << 4;
        const B2_RELEASED       = 1 << 5;
        const B2_PRESSED        = 1 << 6;
        const B2_CLICKED        = 1 << 7;
        const B2_DOUBLE_CLICKED = 1 << 8;
        const B2_TRIPLE_CLICKED = 1 << 9;
        const B3_RELEASED       = 1 << 10;
        const B3_PRESSED        = 1 << 11;
        const B3_CLICKED        = 1 << 12;
        const B3_DOUBLE_CLICKED = 1 << 13;
        const B3_TRIPLE_CLICKED = 1 << 14;
        const B4_RELEASED       = 1 << 15;
        const B4_PRESSED        = 1 << 16;
        const B4_CLICKED        = 1 << 17;
        const B4_DOUBLE_CLICKED = 1 << 18;
        const B4_TRIPLE_CLICKED = 1 << 19;
        const B5_RELEASED       = 1 << 20;
        const B5_PRESSED        = 1 << 21;
        const B5_CLICKED        = 1 << 22;
        const B5_DOUBLE_CLICKED = 1 << 23;
        const B5_TRIPLE_CLICKED = 1 << 24;
        const CTRL              = 1 << 25;
        const SHIFT             = 1 << 26;
        const ALT               = 1 << 27;
        const POSITION          = 1 << 28;
        /// Every button event (not motion).
        const ALL               = (1 << 28) - 1;
    }
}

/// What happened to a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Released,
    Pressed,
    Clicked,
    DoubleClicked,
    TripleClicked,
}

impl MouseMask {
    /// Modifier bits reported alongside button events.
    pub const MODIFIERS: MouseMask = MouseMask::CTRL.union(MouseMask::SHIFT).union(MouseMask::ALT);

    /// The bit for `action` on `button` (1..=5). Out-of-range buttons
    /// give an empty mask.
    pub fn button(button: u8, action: ButtonAction) -> MouseMask {
        if !(1..=5).contains(&button) {
            return MouseMask::empty();
        }
        let offset = match action {
            ButtonAction::Released => 0,
            ButtonAction::Pressed => 1,
            ButtonAction::Clicked => 2,
            ButtonAction::DoubleClicked => 3,
            ButtonAction::TripleClicked => 4,
        };
        MouseMask::from_bits_truncate(1 << (5 * u32::from(button - 1) + offset))
    }

    /// Event bits without the modifier bits.
    pub fn events(self) -> MouseMask {
        self.difference(MouseMask::MODIFIERS)
    }
}

/// A mouse event popped by `Screen::get_mouse`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseEvent {
    /// Device id, 0 for the only mouse on ordinary terminals.
    pub id: i16,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub bstate: MouseMask,
}
