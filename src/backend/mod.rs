//! The boundary with the terminal.
//!
//! A `Backend` owns raw terminal I/O and capability knowledge. Windows,
//! pads and the virtual screen never touch the terminal directly: `Screen`
//! hands the backend the cells that changed since the last flush.
//!
//! - **term**: `CrosstermBackend`, the real terminal
//! - **memory**: `MemoryBackend`, a headless terminal for tests

pub mod memory;
pub mod term;

pub use memory::{MemoryBackend, MemoryProbe};
pub use term::CrosstermBackend;

use std::io;
use std::time::Duration;

use crate::core::{Attr, Key, MouseEvent, MouseMask};

/// Color as the terminal should paint it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TermColor {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl TermColor {
    pub fn to_crossterm(self) -> crossterm::style::Color {
        match self {
            TermColor::Default => crossterm::style::Color::Reset,
            TermColor::Indexed(n) => crossterm::style::Color::AnsiValue(n),
            TermColor::Rgb(r, g, b) => crossterm::style::Color::Rgb { r, g, b },
        }
    }
}

/// A fully resolved cell: glyph translated, color pair looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyledCell {
    /// `'\0'` marks the right half of a double-width glyph.
    pub ch: char,
    /// Display attributes only; the color pair is already in `fg`/`bg`.
    pub attr: Attr,
    pub fg: TermColor,
    pub bg: TermColor,
}

impl Default for StyledCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            attr: Attr::NORMAL,
            fg: TermColor::Default,
            bg: TermColor::Default,
        }
    }
}

/// Cursor visibility as understood by `Screen::cursor_set`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorVisibility {
    Invisible,
    #[default]
    Normal,
    VeryVisible,
}

impl CursorVisibility {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "invisible" | "hidden" | "0" => Some(Self::Invisible),
            "normal" | "1" => Some(Self::Normal),
            "very-visible" | "2" => Some(Self::VeryVisible),
            _ => None,
        }
    }
}

/// What the terminal can do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Number of colors; 0 for a monochrome terminal.
    pub colors: i16,
    /// Number of color pairs, pair 0 included.
    pub color_pairs: i16,
    pub can_change_color: bool,
    pub has_mouse: bool,
    /// Mouse events the terminal can report.
    pub mouse_events: MouseMask,
    /// Display attributes the terminal can render.
    pub attributes: Attr,
    pub baud_rate: u32,
    pub cursor_visibility: bool,
}

impl Default for Capabilities {
    /// An xterm-like terminal with eight colors and full mouse reporting.
    fn default() -> Self {
        Self {
            colors: 8,
            color_pairs: 64,
            can_change_color: false,
            has_mouse: true,
            mouse_events: MouseMask::ALL | MouseMask::POSITION,
            attributes: Attr::all().display(),
            baud_rate: 38400,
            cursor_visibility: true,
        }
    }
}

impl Capabilities {
    /// A terminal with no colors, no mouse and only the basic attributes.
    pub fn dumb() -> Self {
        Self {
            colors: 0,
            color_pairs: 0,
            can_change_color: false,
            has_mouse: false,
            mouse_events: MouseMask::empty(),
            attributes: Attr::REVERSE | Attr::UNDERLINE | Attr::BOLD | Attr::STANDOUT,
            baud_rate: 9600,
            cursor_visibility: false,
        }
    }
}

/// How the terminal's line discipline treats typed characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Every key reaches the program, interrupt and suspend keys included.
    #[default]
    Raw,
    /// Keys arrive one at a time; Ctrl-C, Ctrl-\ and Ctrl-Z raise signals.
    Cbreak,
    /// Input arrives a line at a time, after Enter. Signals as in cbreak.
    Cooked,
}

impl InputMode {
    /// The mode selected by the session's raw and cbreak flags. Raw wins.
    pub fn from_flags(raw: bool, cbreak: bool) -> Self {
        if raw {
            InputMode::Raw
        } else if cbreak {
            InputMode::Cbreak
        } else {
            InputMode::Cooked
        }
    }
}

/// Raw input as decoded by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A character, including control characters. Enter arrives as `'\r'`,
    /// backspace as `'\x7f'`, tab as `'\t'`.
    Char(char),
    /// A function or keypad key.
    Key(Key),
    Mouse(MouseEvent),
    /// New terminal size as `(lines, cols)`.
    Resize(i32, i32),
}

/// A terminal-control implementation.
///
/// None of these calls are made concurrently; `Screen` is single-threaded.
pub trait Backend {
    /// Enter curses mode.
    fn init(&mut self) -> io::Result<()>;

    /// Restore the terminal to the mode it had before `init`.
    fn teardown(&mut self) -> io::Result<()>;

    /// Current size as `(lines, cols)`.
    fn size(&self) -> io::Result<(i32, i32)>;

    fn capabilities(&self) -> Capabilities;

    /// Whether the terminal can report `key`.
    fn has_key(&self, key: Key) -> bool;

    /// Queue cells for output at screen positions `(y, x)`.
    fn draw(&mut self, cells: &[(i32, i32, StyledCell)]) -> io::Result<()>;

    /// Queue a full clear of the physical screen.
    fn clear(&mut self) -> io::Result<()>;

    fn move_cursor(&mut self, y: i32, x: i32) -> io::Result<()>;

    fn set_cursor_visibility(&mut self, visibility: CursorVisibility) -> io::Result<()>;

    /// Switch the terminal's line discipline.
    fn set_input_mode(&mut self, mode: InputMode) -> io::Result<()>;

    /// Write everything queued to the terminal.
    fn flush(&mut self) -> io::Result<()>;

    fn beep(&mut self) -> io::Result<()>;

    fn flash(&mut self) -> io::Result<()>;

    /// Wait up to `timeout` for input; `None` blocks until something
    /// arrives. Returns `Ok(None)` when the timeout expires.
    fn read_event(&mut self, timeout: Option<Duration>) -> io::Result<Option<Event>>;

    /// Start or stop reporting the given mouse events.
    fn set_mouse_mask(&mut self, mask: MouseMask) -> io::Result<()>;

    /// Maximum time between press and release for a click.
    fn set_mouse_interval(&mut self, interval: Duration);
}
