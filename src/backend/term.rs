//! Terminal backend using crossterm
//!
//! Puts the terminal into raw mode on the alternate screen, renders queued
//! cells with the fewest cursor moves and attribute changes it can, and
//! decodes keyboard and mouse input into curses key codes.
//!
//! Cbreak and cooked input start from crossterm's raw settings and turn
//! signal keys (and, for cooked, line buffering) back on through termios.
//! Other platforms stay raw.

use std::env;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, MoveTo, SetCursorStyle, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CtEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use tracing::debug;

use super::{Backend, Capabilities, CursorVisibility, Event, InputMode, StyledCell, TermColor};
use crate::core::{Attr, ButtonAction, Key, MouseEvent, MouseMask};

/// Set while a session owns the real terminal.
static LIVE: AtomicBool = AtomicBool::new(false);

/// Default click resolution, one sixth of a second.
pub const DEFAULT_MOUSE_INTERVAL: Duration = Duration::from_millis(166);

/// The real terminal.
pub struct CrosstermBackend {
    initialized: bool,
    out: Vec<u8>,
    mouse_captured: bool,
    input_mode: InputMode,
    clicks: ClickTracker,
    caps: Capabilities,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            initialized: false,
            out: Vec::with_capacity(65536),
            mouse_captured: false,
            input_mode: InputMode::Raw,
            clicks: ClickTracker::new(DEFAULT_MOUSE_INTERVAL),
            caps: detect_capabilities(
                &env::var("TERM").unwrap_or_default(),
                &env::var("COLORTERM").unwrap_or_default(),
            ),
        }
    }

    fn apply_attrs<W: Write>(out: &mut W, cell: &StyledCell) -> io::Result<()> {
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;

        let attr = cell.attr;
        if attr.intersects(Attr::BOLD) {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        if attr.contains(Attr::DIM) {
            queue!(out, SetAttribute(Attribute::Dim))?;
        }
        if attr.contains(Attr::UNDERLINE) {
            queue!(out, SetAttribute(Attribute::Underlined))?;
        }
        if attr.contains(Attr::BLINK) {
            queue!(out, SetAttribute(Attribute::SlowBlink))?;
        }
        if attr.intersects(Attr::REVERSE | Attr::STANDOUT) {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        if attr.contains(Attr::INVIS) {
            queue!(out, SetAttribute(Attribute::Hidden))?;
        }

        if cell.fg != TermColor::Default {
            queue!(out, SetForegroundColor(cell.fg.to_crossterm()))?;
        }
        if cell.bg != TermColor::Default {
            queue!(out, SetBackgroundColor(cell.bg.to_crossterm()))?;
        }
        Ok(())
    }
}

impl Backend for CrosstermBackend {
    fn init(&mut self) -> io::Result<()> {
        debug_assert!(
            !LIVE.load(Ordering::SeqCst),
            "a curses session already owns the terminal"
        );
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            DisableLineWrap,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        stdout.flush()?;

        self.initialized = true;
        self.input_mode = InputMode::Raw;
        LIVE.store(true, Ordering::SeqCst);
        debug!(caps = ?self.caps, "crossterm backend initialized");
        Ok(())
    }

    fn teardown(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        LIVE.store(false, Ordering::SeqCst);

        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show, EnableLineWrap);
        if self.mouse_captured {
            let _ = execute!(stdout, DisableMouseCapture);
            self.mouse_captured = false;
        }
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();

        // Raw mode last: everything above is best effort, this is not.
        terminal::disable_raw_mode()
    }

    fn size(&self) -> io::Result<(i32, i32)> {
        let (cols, rows) = terminal::size()?;
        Ok((i32::from(rows), i32::from(cols)))
    }

    fn capabilities(&self) -> Capabilities {
        self.caps.clone()
    }

    fn has_key(&self, key: Key) -> bool {
        const DECODED: &[Key] = &[
            Key::UP,
            Key::DOWN,
            Key::LEFT,
            Key::RIGHT,
            Key::HOME,
            Key::END,
            Key::PAGE_UP,
            Key::PAGE_DOWN,
            Key::IC,
            Key::DC,
            Key::BTAB,
            Key::SLEFT,
            Key::SRIGHT,
            Key::SHOME,
            Key::SEND,
            Key::SIC,
            Key::SDC,
            Key::MOUSE,
            Key::RESIZE,
        ];
        DECODED.contains(&key) || key.function_number().map_or(false, |n| (1..=24).contains(&n))
    }

    fn draw(&mut self, cells: &[(i32, i32, StyledCell)]) -> io::Result<()> {
        let mut last_pos: Option<(i32, i32)> = None;
        let mut last_style: Option<StyledCell> = None;

        for &(y, x, cell) in cells {
            if y < 0 || x < 0 || y > i32::from(u16::MAX) || x > i32::from(u16::MAX) {
                continue;
            }
            // Right half of a wide glyph; the terminal already covered it.
            if cell.ch == '\0' {
                continue;
            }
            if last_pos != Some((y, x)) {
                queue!(self.out, MoveTo(x as u16, y as u16))?;
            }

            let style = StyledCell { ch: ' ', ..cell };
            if last_style != Some(style) {
                Self::apply_attrs(&mut self.out, &cell)?;
                last_style = Some(style);
            }

            queue!(self.out, Print(cell.ch))?;
            let width = unicode_width::UnicodeWidthChar::width(cell.ch).unwrap_or(1).max(1);
            last_pos = Some((y, x + width as i32));
        }

        queue!(self.out, ResetColor, SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            ResetColor,
            SetAttribute(Attribute::Reset),
            Clear(ClearType::All)
        )
    }

    fn move_cursor(&mut self, y: i32, x: i32) -> io::Result<()> {
        let y = y.clamp(0, i32::from(u16::MAX)) as u16;
        let x = x.clamp(0, i32::from(u16::MAX)) as u16;
        queue!(self.out, MoveTo(x, y))
    }

    fn set_cursor_visibility(&mut self, visibility: CursorVisibility) -> io::Result<()> {
        match visibility {
            CursorVisibility::Invisible => queue!(self.out, Hide),
            CursorVisibility::Normal => queue!(self.out, SetCursorStyle::DefaultUserShape, Show),
            CursorVisibility::VeryVisible => {
                queue!(self.out, SetCursorStyle::BlinkingBlock, Show)
            }
        }
    }

    fn set_input_mode(&mut self, mode: InputMode) -> io::Result<()> {
        if !self.initialized {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "the terminal is not in curses mode",
            ));
        }
        if mode == self.input_mode {
            return Ok(());
        }
        // enable_raw_mode is a no-op while raw, so reset to the saved mode first.
        terminal::disable_raw_mode()?;
        terminal::enable_raw_mode()?;
        relax_line_discipline(mode)?;
        self.input_mode = mode;
        debug!("Input mode: {:?}", mode);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut stdout = io::BufWriter::with_capacity(65536, stdout.lock());

        // Synchronized update: the terminal shows the whole batch at once.
        write!(stdout, "\x1b[?2026h")?;
        stdout.write_all(&self.out)?;
        write!(stdout, "\x1b[?2026l")?;
        stdout.flush()?;

        self.out.clear();
        Ok(())
    }

    fn beep(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }

    fn flash(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x1b[?5h")?;
        stdout.flush()?;
        std::thread::sleep(Duration::from_millis(100));
        stdout.write_all(b"\x1b[?5l")?;
        stdout.flush()
    }

    fn read_event(&mut self, timeout: Option<Duration>) -> io::Result<Option<Event>> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if !event::poll(remaining)? {
                    return Ok(None);
                }
            }

            let translated = match event::read()? {
                CtEvent::Key(key) if key.kind != KeyEventKind::Release => translate_key(&key),
                CtEvent::Mouse(mouse) => self
                    .clicks
                    .translate(mouse.kind, mouse.modifiers, Instant::now())
                    .map(|bstate| {
                        Event::Mouse(MouseEvent {
                            id: 0,
                            x: i32::from(mouse.column),
                            y: i32::from(mouse.row),
                            z: 0,
                            bstate,
                        })
                    }),
                CtEvent::Resize(cols, rows) => Some(Event::Resize(i32::from(rows), i32::from(cols))),
                _ => None,
            };
            if translated.is_some() {
                return Ok(translated);
            }
        }
    }

    fn set_mouse_mask(&mut self, mask: MouseMask) -> io::Result<()> {
        let mut stdout = io::stdout();
        if mask.is_empty() && self.mouse_captured {
            execute!(stdout, DisableMouseCapture)?;
            self.mouse_captured = false;
        } else if !mask.is_empty() && !self.mouse_captured {
            execute!(stdout, EnableMouseCapture)?;
            self.mouse_captured = true;
        }
        Ok(())
    }

    fn set_mouse_interval(&mut self, interval: Duration) {
        self.clicks.interval = interval;
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

/// Guess capabilities from `TERM` and `COLORTERM`.
/// Give back the termios flags `mode` keeps on top of raw mode.
#[cfg(unix)]
fn relax_line_discipline(mode: InputMode) -> io::Result<()> {
    let flags = match mode {
        InputMode::Raw => return Ok(()),
        InputMode::Cbreak => libc::ISIG,
        InputMode::Cooked => libc::ISIG | libc::ICANON,
    };
    let fd = libc::STDIN_FILENO;
    // SAFETY: termios is plain data, filled in by tcgetattr before use.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        termios.c_lflag |= flags;
        if libc::tcsetattr(fd, libc::TCSANOW, &termios) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn relax_line_discipline(mode: InputMode) -> io::Result<()> {
    if mode != InputMode::Raw {
        debug!("Input mode {:?} is not available here; staying raw", mode);
    }
    Ok(())
}

fn detect_capabilities(term: &str, colorterm: &str) -> Capabilities {
    if term == "dumb" {
        return Capabilities::dumb();
    }
    let truecolor = matches!(colorterm, "truecolor" | "24bit");
    let colors: i16 = if truecolor || term.contains("256color") { 256 } else { 8 };
    Capabilities {
        colors,
        color_pairs: if colors >= 256 { 256 } else { 64 },
        can_change_color: truecolor,
        ..Capabilities::default()
    }
}

/// Decode a key press into a curses character or key code.
pub fn translate_key(event: &KeyEvent) -> Option<Event> {
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    let key = match event.code {
        KeyCode::Char(ch) if ctrl => return Some(Event::Char(control_char(ch))),
        KeyCode::Char(ch) => return Some(Event::Char(ch)),
        KeyCode::Enter => return Some(Event::Char('\r')),
        KeyCode::Backspace => return Some(Event::Char('\x7f')),
        KeyCode::Tab => return Some(Event::Char('\t')),
        KeyCode::Esc => return Some(Event::Char('\x1b')),
        KeyCode::BackTab => Key::BTAB,
        KeyCode::Up => Key::UP,
        KeyCode::Down => Key::DOWN,
        KeyCode::Left if shift => Key::SLEFT,
        KeyCode::Left => Key::LEFT,
        KeyCode::Right if shift => Key::SRIGHT,
        KeyCode::Right => Key::RIGHT,
        KeyCode::Home if shift => Key::SHOME,
        KeyCode::Home => Key::HOME,
        KeyCode::End if shift => Key::SEND,
        KeyCode::End => Key::END,
        KeyCode::PageUp => Key::PAGE_UP,
        KeyCode::PageDown => Key::PAGE_DOWN,
        KeyCode::Insert if shift => Key::SIC,
        KeyCode::Insert => Key::IC,
        KeyCode::Delete if shift => Key::SDC,
        KeyCode::Delete => Key::DC,
        KeyCode::F(n) => Key::f(n),
        _ => return None,
    };
    Some(Event::Key(key))
}

fn control_char(ch: char) -> char {
    match ch {
        'a'..='z' => char::from(ch as u8 - b'a' + 1),
        'A'..='Z' => char::from(ch as u8 - b'A' + 1),
        '@' | '`' | ' ' => '\0',
        '[' => '\x1b',
        '\\' => '\x1c',
        ']' => '\x1d',
        '^' | '~' => '\x1e',
        '_' | '?' => '\x1f',
        other => other,
    }
}

/// Turns press/release pairs into clicks.
///
/// A release within `interval` of its press is reported as a click, and
/// clicks following each other within `interval` as double and triple
/// clicks. A zero interval disables click detection.
pub struct ClickTracker {
    pub interval: Duration,
    pressed: [Option<Instant>; 3],
    last_click: [Option<(Instant, u8)>; 3],
}

impl ClickTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pressed: [None; 3],
            last_click: [None; 3],
        }
    }

    fn within(&self, earlier: Instant, now: Instant) -> bool {
        !self.interval.is_zero() && now.saturating_duration_since(earlier) <= self.interval
    }

    pub fn translate(
        &mut self,
        kind: MouseEventKind,
        modifiers: KeyModifiers,
        now: Instant,
    ) -> Option<MouseMask> {
        let state = match kind {
            MouseEventKind::Down(button) => {
                let slot = button_slot(button);
                self.pressed[slot] = Some(now);
                MouseMask::button(slot as u8 + 1, ButtonAction::Pressed)
            }
            MouseEventKind::Up(button) => {
                let slot = button_slot(button);
                let action = match self.pressed[slot].take() {
                    Some(at) if self.within(at, now) => {
                        let count = match self.last_click[slot] {
                            Some((prev, n)) if self.within(prev, now) => (n % 3) + 1,
                            _ => 1,
                        };
                        self.last_click[slot] = Some((now, count));
                        match count {
                            1 => ButtonAction::Clicked,
                            2 => ButtonAction::DoubleClicked,
                            _ => ButtonAction::TripleClicked,
                        }
                    }
                    _ => ButtonAction::Released,
                };
                MouseMask::button(slot as u8 + 1, action)
            }
            MouseEventKind::Drag(_) | MouseEventKind::Moved => MouseMask::POSITION,
            MouseEventKind::ScrollUp => MouseMask::B4_PRESSED,
            MouseEventKind::ScrollDown => MouseMask::B5_PRESSED,
            _ => return None,
        };

        let mut mods = MouseMask::empty();
        if modifiers.contains(KeyModifiers::CONTROL) {
            mods |= MouseMask::CTRL;
        }
        if modifiers.contains(KeyModifiers::SHIFT) {
            mods |= MouseMask::SHIFT;
        }
        if modifiers.contains(KeyModifiers::ALT) {
            mods |= MouseMask::ALT;
        }
        Some(state | mods)
    }
}

fn button_slot(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_char_keys() {
        let event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(translate_key(&event), Some(Event::Char('a')));

        // Ctrl+C
        let event = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(&event), Some(Event::Char('\x03')));

        let event = key_event(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(translate_key(&event), Some(Event::Char('\r')));
    }

    #[test]
    fn test_special_keys() {
        let event = key_event(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(translate_key(&event), Some(Event::Key(Key::UP)));

        let event = key_event(KeyCode::Left, KeyModifiers::SHIFT);
        assert_eq!(translate_key(&event), Some(Event::Key(Key::SLEFT)));

        let event = key_event(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(translate_key(&event), Some(Event::Key(Key::f(5))));

        let event = key_event(KeyCode::CapsLock, KeyModifiers::NONE);
        assert_eq!(translate_key(&event), None);
    }

    #[test]
    fn test_click_within_interval() {
        let mut tracker = ClickTracker::new(Duration::from_millis(200));
        let t0 = Instant::now();
        let left = MouseButton::Left;

        let down = tracker.translate(MouseEventKind::Down(left), KeyModifiers::NONE, t0);
        assert_eq!(down, Some(MouseMask::B1_PRESSED));

        let up = tracker.translate(
            MouseEventKind::Up(left),
            KeyModifiers::NONE,
            t0 + Duration::from_millis(50),
        );
        assert_eq!(up, Some(MouseMask::B1_CLICKED));

        tracker.translate(
            MouseEventKind::Down(left),
            KeyModifiers::NONE,
            t0 + Duration::from_millis(100),
        );
        let up = tracker.translate(
            MouseEventKind::Up(left),
            KeyModifiers::NONE,
            t0 + Duration::from_millis(150),
        );
        assert_eq!(up, Some(MouseMask::B1_DOUBLE_CLICKED));
    }

    #[test]
    fn test_slow_release_and_zero_interval() {
        let mut tracker = ClickTracker::new(Duration::from_millis(100));
        let t0 = Instant::now();
        let right = MouseButton::Right;

        tracker.translate(MouseEventKind::Down(right), KeyModifiers::NONE, t0);
        let up = tracker.translate(
            MouseEventKind::Up(right),
            KeyModifiers::SHIFT,
            t0 + Duration::from_millis(500),
        );
        assert_eq!(up, Some(MouseMask::B3_RELEASED | MouseMask::SHIFT));

        tracker.interval = Duration::ZERO;
        tracker.translate(MouseEventKind::Down(right), KeyModifiers::NONE, t0);
        let up = tracker.translate(MouseEventKind::Up(right), KeyModifiers::NONE, t0);
        assert_eq!(up, Some(MouseMask::B3_RELEASED));
    }

    #[test]
    fn test_scroll_and_motion() {
        let mut tracker = ClickTracker::new(DEFAULT_MOUSE_INTERVAL);
        let now = Instant::now();
        assert_eq!(
            tracker.translate(MouseEventKind::ScrollUp, KeyModifiers::NONE, now),
            Some(MouseMask::B4_PRESSED)
        );
        assert_eq!(
            tracker.translate(MouseEventKind::Moved, KeyModifiers::CONTROL, now),
            Some(MouseMask::POSITION | MouseMask::CTRL)
        );
    }

    #[test]
    fn test_detect_capabilities() {
        assert_eq!(detect_capabilities("dumb", ""), Capabilities::dumb());

        let caps = detect_capabilities("xterm-256color", "");
        assert_eq!(caps.colors, 256);
        assert_eq!(caps.color_pairs, 256);
        assert!(!caps.can_change_color);

        let caps = detect_capabilities("xterm", "truecolor");
        assert!(caps.can_change_color);

        let caps = detect_capabilities("vt220", "");
        assert_eq!((caps.colors, caps.color_pairs), (8, 64));
    }
}
