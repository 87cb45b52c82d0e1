//! Headless terminal.
//!
//! `MemoryBackend` keeps the "physical" screen as a grid of styled cells
//! and serves input from a script. A `MemoryProbe` obtained before the
//! backend is handed to `Screen::init` stays connected to the same state,
//! so tests can inspect what reached the terminal and feed it keystrokes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use super::{Backend, Capabilities, CursorVisibility, Event, InputMode, StyledCell};
use crate::core::{Key, MouseEvent, MouseMask};

struct Terminal {
    lines: i32,
    cols: i32,
    caps: Capabilities,
    screen: Vec<StyledCell>,
    pending: Vec<(i32, i32, StyledCell)>,
    pending_clear: bool,
    cursor: (i32, i32),
    pending_cursor: Option<(i32, i32)>,
    cursor_visibility: CursorVisibility,
    input_mode: InputMode,
    input: VecDeque<Event>,
    initialized: bool,
    torn_down: bool,
    fail_init: bool,
    flushes: usize,
    cells_written: usize,
    clears: usize,
    beeps: usize,
    flashes: usize,
    mouse_mask: MouseMask,
    mouse_interval: Duration,
}

impl Terminal {
    fn blank_screen(lines: i32, cols: i32) -> Vec<StyledCell> {
        vec![StyledCell::default(); lines.max(0) as usize * cols.max(0) as usize]
    }

    fn index(&self, y: i32, x: i32) -> Option<usize> {
        if y < 0 || x < 0 || y >= self.lines || x >= self.cols {
            return None;
        }
        Some((y * self.cols + x) as usize)
    }
}

/// A terminal that lives in memory.
pub struct MemoryBackend {
    state: Rc<RefCell<Terminal>>,
}

impl MemoryBackend {
    /// A `lines x cols` terminal with default (xterm-like) capabilities.
    pub fn new(lines: i32, cols: i32) -> Self {
        Self::with_capabilities(lines, cols, Capabilities::default())
    }

    pub fn with_capabilities(lines: i32, cols: i32, caps: Capabilities) -> Self {
        let terminal = Terminal {
            lines,
            cols,
            caps,
            screen: Terminal::blank_screen(lines, cols),
            pending: Vec::new(),
            pending_clear: false,
            cursor: (0, 0),
            pending_cursor: None,
            cursor_visibility: CursorVisibility::Normal,
            input_mode: InputMode::Raw,
            input: VecDeque::new(),
            initialized: false,
            torn_down: false,
            fail_init: false,
            flushes: 0,
            cells_written: 0,
            clears: 0,
            beeps: 0,
            flashes: 0,
            mouse_mask: MouseMask::empty(),
            mouse_interval: Duration::ZERO,
        };
        Self {
            state: Rc::new(RefCell::new(terminal)),
        }
    }

    /// Make `init` fail, as a terminal that cannot enter curses mode would.
    pub fn failing_init(self) -> Self {
        self.state.borrow_mut().fail_init = true;
        self
    }

    /// A handle onto this terminal's state.
    pub fn probe(&self) -> MemoryProbe {
        MemoryProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl Backend for MemoryBackend {
    fn init(&mut self) -> io::Result<()> {
        let mut term = self.state.borrow_mut();
        if term.fail_init {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "terminal does not support cursor addressing",
            ));
        }
        term.initialized = true;
        term.torn_down = false;
        Ok(())
    }

    fn teardown(&mut self) -> io::Result<()> {
        let mut term = self.state.borrow_mut();
        term.torn_down = true;
        term.mouse_mask = MouseMask::empty();
        Ok(())
    }

    fn size(&self) -> io::Result<(i32, i32)> {
        let term = self.state.borrow();
        Ok((term.lines, term.cols))
    }

    fn capabilities(&self) -> Capabilities {
        self.state.borrow().caps.clone()
    }

    fn has_key(&self, key: Key) -> bool {
        key != Key::EVENT && key.0 >= Key::DOWN.0 && key.0 <= Key::MAX.0
    }

    fn draw(&mut self, cells: &[(i32, i32, StyledCell)]) -> io::Result<()> {
        self.state.borrow_mut().pending.extend_from_slice(cells);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut term = self.state.borrow_mut();
        term.pending.clear();
        term.pending_clear = true;
        Ok(())
    }

    fn move_cursor(&mut self, y: i32, x: i32) -> io::Result<()> {
        self.state.borrow_mut().pending_cursor = Some((y, x));
        Ok(())
    }

    fn set_cursor_visibility(&mut self, visibility: CursorVisibility) -> io::Result<()> {
        self.state.borrow_mut().cursor_visibility = visibility;
        Ok(())
    }

    fn set_input_mode(&mut self, mode: InputMode) -> io::Result<()> {
        self.state.borrow_mut().input_mode = mode;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut term = self.state.borrow_mut();
        if term.pending_clear {
            term.screen = Terminal::blank_screen(term.lines, term.cols);
            term.pending_clear = false;
            term.clears += 1;
        }
        let pending = std::mem::take(&mut term.pending);
        for (y, x, cell) in pending {
            if let Some(i) = term.index(y, x) {
                term.screen[i] = cell;
                term.cells_written += 1;
            }
        }
        if let Some(cursor) = term.pending_cursor.take() {
            term.cursor = cursor;
        }
        term.flushes += 1;
        Ok(())
    }

    fn beep(&mut self) -> io::Result<()> {
        self.state.borrow_mut().beeps += 1;
        Ok(())
    }

    fn flash(&mut self) -> io::Result<()> {
        self.state.borrow_mut().flashes += 1;
        Ok(())
    }

    /// Pops the next scripted event. An exhausted script behaves like an
    /// expired timeout, even for blocking reads.
    fn read_event(&mut self, _timeout: Option<Duration>) -> io::Result<Option<Event>> {
        let mut term = self.state.borrow_mut();
        if let Some(Event::Resize(lines, cols)) = term.input.front().copied() {
            term.lines = lines;
            term.cols = cols;
            term.screen = Terminal::blank_screen(lines, cols);
        }
        Ok(term.input.pop_front())
    }

    fn set_mouse_mask(&mut self, mask: MouseMask) -> io::Result<()> {
        self.state.borrow_mut().mouse_mask = mask;
        Ok(())
    }

    fn set_mouse_interval(&mut self, interval: Duration) {
        self.state.borrow_mut().mouse_interval = interval;
    }
}

/// Inspection and scripting handle for a `MemoryBackend`.
#[derive(Clone)]
pub struct MemoryProbe {
    state: Rc<RefCell<Terminal>>,
}

impl MemoryProbe {
    pub fn push_event(&self, event: Event) {
        self.state.borrow_mut().input.push_back(event);
    }

    /// Script typed text, one `Event::Char` per character.
    pub fn type_str(&self, text: &str) {
        let mut term = self.state.borrow_mut();
        term.input.extend(text.chars().map(Event::Char));
    }

    pub fn push_mouse(&self, event: MouseEvent) {
        self.push_event(Event::Mouse(event));
    }

    /// The physical cell at `(y, x)`.
    pub fn cell(&self, y: i32, x: i32) -> Option<StyledCell> {
        let term = self.state.borrow();
        term.index(y, x).map(|i| term.screen[i])
    }

    /// Physical row `y` as text.
    pub fn line(&self, y: i32) -> String {
        let term = self.state.borrow();
        (0..term.cols)
            .filter_map(|x| term.index(y, x))
            .map(|i| term.screen[i].ch)
            .filter(|ch| *ch != '\0')
            .collect()
    }

    /// Every physical row as text.
    pub fn contents(&self) -> Vec<String> {
        let lines = self.state.borrow().lines;
        (0..lines).map(|y| self.line(y)).collect()
    }

    /// A copy of the whole physical screen.
    pub fn snapshot(&self) -> Vec<StyledCell> {
        self.state.borrow().screen.clone()
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.state.borrow().cursor
    }

    pub fn cursor_visibility(&self) -> CursorVisibility {
        self.state.borrow().cursor_visibility
    }

    /// The line discipline last requested by the session.
    pub fn input_mode(&self) -> InputMode {
        self.state.borrow().input_mode
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.borrow().torn_down
    }

    pub fn flush_count(&self) -> usize {
        self.state.borrow().flushes
    }

    pub fn cells_written(&self) -> usize {
        self.state.borrow().cells_written
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn beep_count(&self) -> usize {
        self.state.borrow().beeps
    }

    pub fn flash_count(&self) -> usize {
        self.state.borrow().flashes
    }

    pub fn mouse_mask(&self) -> MouseMask {
        self.state.borrow().mouse_mask
    }

    pub fn mouse_interval(&self) -> Duration {
        self.state.borrow().mouse_interval
    }

    /// Input events not consumed yet.
    pub fn pending_input(&self) -> usize {
        self.state.borrow().input.len()
    }
}
