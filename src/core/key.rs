//! Key codes and input values returned by `Window::get_char`.
//!
//! Function keys use the classic curses numbering so code written against
//! other curses libraries reads the same.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// A function or keypad key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub i32);

impl Key {
    pub const DOWN: Key = Key(0o402);
    pub const UP: Key = Key(0o403);
    pub const LEFT: Key = Key(0o404);
    pub const RIGHT: Key = Key(0o405);
    pub const HOME: Key = Key(0o406);
    pub const BACKSPACE: Key = Key(0o407);
    pub const F0: Key = Key(0o410);
    pub const DL: Key = Key(0o510);
    pub const IL: Key = Key(0o511);
    pub const DC: Key = Key(0o512);
    pub const IC: Key = Key(0o513);
    pub const EIC: Key = Key(0o514);
    pub const CLEAR: Key = Key(0o515);
    pub const EOS: Key = Key(0o516);
    pub const EOL: Key = Key(0o517);
    pub const SF: Key = Key(0o520);
    pub const SR: Key = Key(0o521);
    pub const PAGE_DOWN: Key = Key(0o522);
    pub const PAGE_UP: Key = Key(0o523);
    pub const STAB: Key = Key(0o524);
    pub const CTAB: Key = Key(0o525);
    pub const CATAB: Key = Key(0o526);
    pub const ENTER: Key = Key(0o527);
    pub const PRINT: Key = Key(0o532);
    pub const LL: Key = Key(0o533);
    pub const A1: Key = Key(0o534);
    pub const A3: Key = Key(0o535);
    pub const B2: Key = Key(0o536);
    pub const C1: Key = Key(0o537);
    pub const C3: Key = Key(0o540);
    pub const BTAB: Key = Key(0o541);
    pub const BEG: Key = Key(0o542);
    pub const CANCEL: Key = Key(0o543);
    pub const CLOSE: Key = Key(0o544);
    pub const COMMAND: Key = Key(0o545);
    pub const COPY: Key = Key(0o546);
    pub const CREATE: Key = Key(0o547);
    pub const END: Key = Key(0o550);
    pub const EXIT: Key = Key(0o551);
    pub const FIND: Key = Key(0o552);
    pub const HELP: Key = Key(0o553);
    pub const MARK: Key = Key(0o554);
    pub const MESSAGE: Key = Key(0o555);
    pub const MOVE: Key = Key(0o556);
    pub const NEXT: Key = Key(0o557);
    pub const OPEN: Key = Key(0o560);
    pub const OPTIONS: Key = Key(0o561);
    pub const PREVIOUS: Key = Key(0o562);
    pub const REDO: Key = Key(0o563);
    pub const REFERENCE: Key = Key(0o564);
    pub const REFRESH: Key = Key(0o565);
    pub const REPLACE: Key = Key(0o566);
    pub const RESTART: Key = Key(0o567);
    pub const RESUME: Key = Key(0o570);
    pub const SAVE: Key = Key(0o571);
    pub const SBEG: Key = Key(0o572);
    pub const SCANCEL: Key = Key(0o573);
    pub const SCOMMAND: Key = Key(0o574);
    pub const SCOPY: Key = Key(0o575);
    pub const SCREATE: Key = Key(0o576);
    pub const SDC: Key = Key(0o577);
    pub const SDL: Key = Key(0o600);
    pub const SELECT: Key = Key(0o601);
    pub const SEND: Key = Key(0o602);
    pub const SEOL: Key = Key(0o603);
    pub const SEXIT: Key = Key(0o604);
    pub const SFIND: Key = Key(0o605);
    pub const SHELP: Key = Key(0o606);
    pub const SHOME: Key = Key(0o607);
    pub const SIC: Key = Key(0o610);
    pub const SLEFT: Key = Key(0o611);
    pub const SMESSAGE: Key = Key(0o612);
    pub const SMOVE: Key = Key(0o613);
    pub const SNEXT: Key = Key(0o614);
    pub const SOPTIONS: Key = Key(0o615);
    pub const SPREVIOUS: Key = Key(0o616);
    pub const SPRINT: Key = Key(0o617);
    pub const SREDO: Key = Key(0o620);
    pub const SREPLACE: Key = Key(0o621);
    pub const SRIGHT: Key = Key(0o622);
    pub const SRSUME: Key = Key(0o623);
    pub const SSAVE: Key = Key(0o624);
    pub const SSUSPEND: Key = Key(0o625);
    pub const SUNDO: Key = Key(0o626);
    pub const SUSPEND: Key = Key(0o627);
    pub const UNDO: Key = Key(0o630);
    /// A mouse event is waiting in `Screen::get_mouse`.
    pub const MOUSE: Key = Key(0o631);
    /// The terminal was resized.
    pub const RESIZE: Key = Key(0o632);
    pub const EVENT: Key = Key(0o633);
    pub const MAX: Key = Key(0o777);

    /// Function key `F<n>`, n in 0..=63.
    pub const fn f(n: u8) -> Key {
        Key(Key::F0.0 + n as i32)
    }

    /// The function-key number, if this is one.
    pub fn function_number(self) -> Option<u8> {
        let n = self.0 - Key::F0.0;
        (0..64).contains(&n).then_some(n as u8)
    }
}

/// One unit of keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    Char(char),
    Key(Key),
}

impl Input {
    pub fn name(self) -> String {
        key_name(self)
    }
}

impl From<char> for Input {
    fn from(ch: char) -> Self {
        Input::Char(ch)
    }
}

impl From<Key> for Input {
    fn from(key: Key) -> Self {
        Input::Key(key)
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&key_name(*self))
    }
}

fn key_names() -> &'static HashMap<Key, &'static str> {
    static NAMES: OnceLock<HashMap<Key, &'static str>> = OnceLock::new();
    NAMES.get_or_init(|| {
        HashMap::from([
            (Key::DOWN, "down"),
            (Key::UP, "up"),
            (Key::LEFT, "left"),
            (Key::RIGHT, "right"),
            (Key::HOME, "home"),
            (Key::END, "end"),
            (Key::BACKSPACE, "backspace"),
            (Key::ENTER, "enter"),
            (Key::DC, "delete"),
            (Key::IC, "insert"),
            (Key::BTAB, "back tab"),
            (Key::MOUSE, "mouse"),
            (Key::RESIZE, "resize"),
            (Key::PAGE_DOWN, "page down"),
            (Key::PAGE_UP, "page up"),
        ])
    })
}

/// A readable name for an input value: "tab", "enter", "F5", "page up",
/// or the character itself.
pub fn key_name(input: Input) -> String {
    match input {
        Input::Char('\t') => "tab".to_string(),
        Input::Char('\n') | Input::Char('\r') => "enter".to_string(),
        Input::Char('\x1b') => "escape".to_string(),
        Input::Char(ch) if (ch as u32) < 0x20 => {
            format!("^{}", char::from(ch as u8 + b'@'))
        }
        Input::Char(ch) => ch.to_string(),
        Input::Key(key) => {
            if let Some(name) = key_names().get(&key) {
                name.to_string()
            } else if let Some(n) = key.function_number() {
                format!("F{}", n)
            } else {
                format!("key {:#o}", key.0)
            }
        }
    }
}
