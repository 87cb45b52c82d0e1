//! The curses session.
//!
//! `Screen` owns the terminal from `init` until `end` (or drop) and every
//! window, pad and cell buffer created in between. Window handles share
//! the session through an `Rc`, which keeps the whole API on one thread.
//!
//! # Refresh model
//!
//! ```text
//! window buffers ──nout_refresh──▶ virtual screen ──update──▶ backend
//!                                      (diffed against the last flush)
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use super::color::ColorRegistry;
use super::pad::{Pad, PadView};
use super::state::{fits, BufferId, Canvas, Delay, SyncMode, WinKind, WinState, WindowId};
use super::window::Window;
use crate::backend::{Backend, Capabilities, CursorVisibility, Event, InputMode, StyledCell};
use crate::config::Config;
use crate::core::grid;
use crate::core::{Attr, Cell, ChType, Color, Grid, Input, Key, MouseEvent, MouseMask};
use crate::error::{CursesError, Result};

/// Click resolution used until `mouse_interval` changes it.
const DEFAULT_MOUSE_INTERVAL_MS: i32 = 166;

/// The session-wide input settings.
///
/// A new session starts the way `initscr` leaves the terminal: neither
/// raw nor cbreak (so input is line-buffered), with echo and newline
/// translation on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputModes {
    pub raw: bool,
    pub cbreak: bool,
    pub echo: bool,
    /// Translate Enter (`'\r'`) into `'\n'`.
    pub nl: bool,
    /// Tenths of a second a blocking read waits before giving up.
    pub half_delay: Option<u8>,
}

impl Default for InputModes {
    fn default() -> Self {
        Self {
            raw: false,
            cbreak: false,
            echo: true,
            nl: true,
            half_delay: None,
        }
    }
}

impl InputModes {
    /// The line discipline these flags ask the terminal for.
    pub fn input_mode(&self) -> InputMode {
        InputMode::from_flags(self.raw, self.cbreak)
    }
}

/// Version string of this library.
pub fn curses_version() -> String {
    format!("tcurses {}", env!("CARGO_PKG_VERSION"))
}

fn missing_window(id: WindowId) -> CursesError {
    if cfg!(debug_assertions) {
        panic!("window {:?} used after delete", id);
    }
    CursesError::invalid("window has been deleted")
}

pub(crate) struct Curses {
    backend: Box<dyn Backend>,
    caps: Capabilities,
    lines: i32,
    cols: i32,
    windows: HashMap<WindowId, WinState>,
    buffers: HashMap<BufferId, Grid>,
    next_window: u32,
    next_buffer: u32,
    root: WindowId,
    colors: ColorRegistry,
    modes: InputModes,
    virtual_screen: Grid,
    physical: Vec<StyledCell>,
    force_repaint: bool,
    pending_cursor: Option<(i32, i32)>,
    mouse_mask: MouseMask,
    mouse_interval: i32,
    mouse_queue: VecDeque<MouseEvent>,
    cursor_visibility: CursorVisibility,
    ended: bool,
}

impl Curses {
    fn new(backend: Box<dyn Backend>, lines: i32, cols: i32) -> Self {
        let caps = backend.capabilities();
        let mut curses = Self {
            backend,
            caps,
            lines,
            cols,
            windows: HashMap::new(),
            buffers: HashMap::new(),
            next_window: 0,
            next_buffer: 0,
            root: WindowId(0),
            colors: ColorRegistry::default(),
            modes: InputModes::default(),
            virtual_screen: Grid::new(lines, cols, Cell::BLANK),
            physical: vec![StyledCell::default(); lines.max(0) as usize * cols.max(0) as usize],
            force_repaint: true,
            pending_cursor: None,
            mouse_mask: MouseMask::empty(),
            mouse_interval: DEFAULT_MOUSE_INTERVAL_MS,
            mouse_queue: VecDeque::new(),
            cursor_visibility: CursorVisibility::Normal,
            ended: false,
        };
        let buffer = curses.next_buffer_id();
        curses.buffers.insert(buffer, Grid::new(lines, cols, Cell::BLANK));
        curses.root = curses.register(WinState::new(WinKind::Window, buffer, lines, cols, (0, 0)));
        curses
    }

    fn check_live(&self) -> Result<()> {
        debug_assert!(!self.ended, "curses call after Screen::end");
        if self.ended {
            return Err(CursesError::invalid("the screen has been ended"));
        }
        Ok(())
    }

    fn next_buffer_id(&mut self) -> BufferId {
        let buffer = BufferId(self.next_buffer);
        self.next_buffer += 1;
        buffer
    }

    /// A window with a buffer of its own. Fails if the buffer cannot be
    /// allocated.
    fn insert_window(&mut self, kind: WinKind, rows: i32, cols: i32, beg: (i32, i32)) -> Result<WindowId> {
        let grid = Grid::try_new(rows, cols, Cell::BLANK)?;
        let buffer = self.next_buffer_id();
        self.buffers.insert(buffer, grid);
        Ok(self.register(WinState::new(kind, buffer, rows, cols, beg)))
    }

    fn register(&mut self, state: WinState) -> WindowId {
        let id = WindowId(self.next_window);
        self.next_window += 1;
        self.windows.insert(id, state);
        id
    }

    pub(crate) fn root(&self) -> WindowId {
        self.root
    }

    pub(crate) fn state(&self, id: WindowId) -> Result<&WinState> {
        self.check_live()?;
        self.windows.get(&id).ok_or_else(|| missing_window(id))
    }

    pub(crate) fn state_mut(&mut self, id: WindowId) -> Result<&mut WinState> {
        self.check_live()?;
        self.windows.get_mut(&id).ok_or_else(|| missing_window(id))
    }

    pub(crate) fn canvas(&mut self, id: WindowId) -> Result<Canvas<'_>> {
        self.check_live()?;
        let Curses {
            windows, buffers, ..
        } = self;
        let win = windows.get_mut(&id).ok_or_else(|| missing_window(id))?;
        let grid = buffers
            .get_mut(&win.buffer)
            .ok_or_else(|| missing_window(id))?;
        Ok(Canvas { win, grid })
    }

    // ---- creation --------------------------------------------------------

    pub(crate) fn new_window(&mut self, rows: i32, cols: i32, y: i32, x: i32) -> Result<WindowId> {
        self.check_live()?;
        let rows = if rows == 0 { self.lines.saturating_sub(y) } else { rows };
        let cols = if cols == 0 { self.cols.saturating_sub(x) } else { cols };
        if !fits((y, x), rows, cols, self.lines, self.cols) {
            return Err(CursesError::invalid(format!(
                "{}x{} window at ({}, {}) does not fit on a {}x{} screen",
                rows, cols, y, x, self.lines, self.cols
            )));
        }
        let id = self.insert_window(WinKind::Window, rows, cols, (y, x))?;
        debug!("New window {:?}: {}x{} at ({}, {})", id, rows, cols, y, x);
        Ok(id)
    }

    pub(crate) fn new_pad(&mut self, rows: i32, cols: i32) -> Result<WindowId> {
        self.check_live()?;
        if rows <= 0 || cols <= 0 {
            return Err(CursesError::invalid(format!(
                "pad size {}x{} must be positive",
                rows, cols
            )));
        }
        let id = self.insert_window(WinKind::Pad, rows, cols, (0, 0))?;
        debug!("New pad {:?}: {}x{}", id, rows, cols);
        Ok(id)
    }

    /// A window sharing `parent`'s cells at `rel` from its origin. A zero
    /// size extends to the parent's edge.
    pub(crate) fn new_child(
        &mut self,
        parent: WindowId,
        kind: WinKind,
        rows: i32,
        cols: i32,
        rel: (i32, i32),
    ) -> Result<WindowId> {
        let state = self.state(parent)?;
        if state.kind != kind {
            return Err(match kind {
                WinKind::Window => CursesError::invalid("use Pad::sub to divide a pad"),
                WinKind::Pad => CursesError::invalid("Pad::sub needs a pad"),
            });
        }
        let rows = if rows == 0 { state.rows.saturating_sub(rel.0) } else { rows };
        let cols = if cols == 0 { state.cols.saturating_sub(rel.1) } else { cols };
        state.check_contains(rel, rows, cols)?;
        let child = state.child(parent, rel, rows, cols);
        let id = self.register(child);
        debug!(
            "New sub-window {:?} of {:?}: {}x{} at +({}, {})",
            id, parent, rows, cols, rel.0, rel.1
        );
        Ok(id)
    }

    pub(crate) fn duplicate(&mut self, id: WindowId) -> Result<WindowId> {
        let state = self.state(id)?.clone();
        let grid = self
            .buffers
            .get(&state.buffer)
            .ok_or_else(|| missing_window(id))?
            .extract(state.offset.0, state.offset.1, state.rows, state.cols);
        let buffer = self.next_buffer_id();
        let copy = WinState {
            buffer,
            offset: (0, 0),
            parent: None,
            last_view: None,
            ..state
        };
        self.buffers.insert(buffer, grid);
        let dup = self.register(copy);
        debug!("Duplicated window {:?} as {:?}", id, dup);
        Ok(dup)
    }

    pub(crate) fn delete(&mut self, id: WindowId) -> Result<()> {
        let buffer = self.state(id)?.buffer;
        if id == self.root {
            return Err(CursesError::invalid("the root window cannot be deleted"));
        }
        if self.windows.values().any(|w| w.parent == Some(id)) {
            return Err(CursesError::invalid(
                "window still has sub-windows; delete them first",
            ));
        }
        self.windows.remove(&id);
        if !self.windows.values().any(|w| w.buffer == buffer) {
            self.buffers.remove(&buffer);
        }
        debug!("Deleted window {:?}", id);
        Ok(())
    }

    pub(crate) fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.state(id).ok().and_then(|s| s.parent)
    }

    fn ancestors(&self, id: WindowId) -> Vec<WindowId> {
        let mut out = Vec::new();
        let mut next = self.parent(id);
        while let Some(ancestor) = next {
            out.push(ancestor);
            next = self.windows.get(&ancestor).and_then(|s| s.parent);
        }
        out
    }

    // ---- geometry --------------------------------------------------------

    pub(crate) fn resize_window(&mut self, id: WindowId, rows: i32, cols: i32) -> Result<()> {
        let state = self.state(id)?;
        if rows <= 0 || cols <= 0 {
            return Err(CursesError::invalid(format!(
                "window size {}x{} must be positive",
                rows, cols
            )));
        }
        match state.parent {
            Some(parent) => {
                let rel = (state.beg.0 - self.state(parent)?.beg.0, state.beg.1 - self.state(parent)?.beg.1);
                self.state(parent)?.check_contains(rel, rows, cols)?;
            }
            None => {
                if self.windows.values().any(|w| w.parent == Some(id)) {
                    return Err(CursesError::invalid(
                        "cannot resize a window that has sub-windows",
                    ));
                }
                let (buffer, fill) = (state.buffer, state.blank());
                if let Some(grid) = self.buffers.get_mut(&buffer) {
                    grid.resize(rows, cols, fill)?;
                }
            }
        }
        self.state_mut(id)?.set_size(rows, cols);
        Ok(())
    }

    pub(crate) fn move_window(&mut self, id: WindowId, y: i32, x: i32) -> Result<()> {
        let state = self.state(id)?;
        if state.kind == WinKind::Pad {
            return Err(CursesError::invalid("pads have no screen position"));
        }
        if state.parent.is_some() || self.windows.values().any(|w| w.parent == Some(id)) {
            return Err(CursesError::invalid(
                "only windows that do not share their cells can be moved",
            ));
        }
        if !fits((y, x), state.rows, state.cols, self.lines, self.cols) {
            return Err(CursesError::invalid(format!(
                "a {}x{} window does not fit at ({}, {})",
                state.rows, state.cols, y, x
            )));
        }
        let state = self.state_mut(id)?;
        state.beg = (y, x);
        state.touch_all();
        Ok(())
    }

    // ---- synchronization -------------------------------------------------

    pub(crate) fn sync(&mut self, id: WindowId, mode: SyncMode) -> Result<()> {
        let state = self.state(id)?.clone();
        for ancestor in self.ancestors(id) {
            let Some(anc) = self.windows.get(&ancestor) else {
                continue;
            };
            let shift = (state.beg.0 - anc.beg.0, state.beg.1 - anc.beg.1);
            match mode {
                SyncMode::Up => {
                    let lines: Vec<i32> = (0..state.rows)
                        .filter(|y| state.is_line_touched(*y))
                        .map(|y| y + shift.0)
                        .collect();
                    if let Some(anc) = self.windows.get_mut(&ancestor) {
                        lines.into_iter().for_each(|y| anc.touch_line(y));
                    }
                }
                SyncMode::Down => {
                    let lines: Vec<i32> = (0..state.rows)
                        .filter(|y| anc.is_line_touched(y + shift.0))
                        .collect();
                    if let Some(win) = self.windows.get_mut(&id) {
                        lines.into_iter().for_each(|y| win.touch_line(y));
                    }
                }
                SyncMode::Cursor => {
                    if let Some(anc) = self.windows.get_mut(&ancestor) {
                        anc.cursor = (state.cursor.0 + shift.0, state.cursor.1 + shift.1);
                    }
                }
            }
        }
        Ok(())
    }

    /// Copy a rectangle of `src` into `dst`, both in window coordinates.
    /// With `overlay`, source cells showing the source background are
    /// skipped.
    pub(crate) fn copy_window(
        &mut self,
        src: WindowId,
        dst: WindowId,
        from: (i32, i32),
        to: (i32, i32),
        size: (i32, i32),
        overlay: bool,
    ) -> Result<()> {
        let src_state = self.state(src)?;
        if !fits(from, size.0, size.1, src_state.rows, src_state.cols) {
            return Err(CursesError::invalid("source rectangle is outside the source window"));
        }
        self.state(dst)?.check_contains(to, size.0, size.1)?;

        let skip = src_state.bkgd.ch;
        let mut cells = Vec::with_capacity(size.0 as usize * size.1 as usize);
        {
            let canvas = self.canvas(src)?;
            for dy in 0..size.0 {
                for dx in 0..size.1 {
                    cells.push((dy, dx, canvas.cell(from.0 + dy, from.1 + dx)));
                }
            }
        }
        let mut canvas = self.canvas(dst)?;
        for (dy, dx, cell) in cells {
            if overlay && cell.ch == skip {
                continue;
            }
            canvas.put(to.0 + dy, to.1 + dx, cell);
        }
        Ok(())
    }

    /// Copy the part of `src` that overlaps `dst` on screen.
    pub(crate) fn overlap_copy(&mut self, src: WindowId, dst: WindowId, overlay: bool) -> Result<()> {
        let (s, d) = (self.state(src)?, self.state(dst)?);
        let top = s.beg.0.max(d.beg.0);
        let left = s.beg.1.max(d.beg.1);
        let bottom = (s.beg.0 + s.rows).min(d.beg.0 + d.rows);
        let right = (s.beg.1 + s.cols).min(d.beg.1 + d.cols);
        if bottom <= top || right <= left {
            return Ok(());
        }
        let from = (top - s.beg.0, left - s.beg.1);
        let to = (top - d.beg.0, left - d.beg.1);
        self.copy_window(src, dst, from, to, (bottom - top, right - left), overlay)
    }

    // ---- refresh ---------------------------------------------------------

    /// Copy `size` cells of window `id` starting at `src` to the virtual
    /// screen at `dst`, line by line. Only touched lines are copied unless
    /// `all` is set; copied lines become clean.
    fn blit(&mut self, id: WindowId, src: (i32, i32), dst: (i32, i32), size: (i32, i32), all: bool) -> Result<()> {
        let Curses {
            windows,
            buffers,
            virtual_screen,
            ..
        } = self;
        let win = windows.get_mut(&id).ok_or_else(|| missing_window(id))?;
        let grid = buffers.get(&win.buffer).ok_or_else(|| missing_window(id))?;
        for dy in 0..size.0 {
            let line = src.0 + dy;
            if !all && !win.is_line_touched(line) {
                continue;
            }
            for dx in 0..size.1 {
                let cell = grid
                    .get(win.offset.0 + line, win.offset.1 + src.1 + dx)
                    .copied()
                    .unwrap_or(Cell::BLANK);
                virtual_screen.set(dst.0 + dy, dst.1 + dx, cell);
            }
            if let Some(t) = win.touched.get_mut(line as usize) {
                *t = false;
            }
        }
        Ok(())
    }

    pub(crate) fn nout_refresh(&mut self, id: WindowId) -> Result<()> {
        let state = self.state(id)?;
        if state.kind == WinKind::Pad {
            return Err(CursesError::invalid("pads are refreshed through Pad::refresh"));
        }
        let (beg, rows, cols, cursor) = (state.beg, state.rows, state.cols, state.cursor);
        let all = state.clear_ok;
        let rows = rows.min(self.lines - beg.0);
        let cols = cols.min(self.cols - beg.1);
        self.blit(id, (0, 0), beg, (rows, cols), all)?;

        let state = self.state_mut(id)?;
        state.untouch_all();
        if state.clear_ok {
            state.clear_ok = false;
            self.force_repaint = true;
        }
        self.pending_cursor = Some((beg.0 + cursor.0, beg.1 + cursor.1));
        Ok(())
    }

    pub(crate) fn pad_nout_refresh(&mut self, id: WindowId, view: PadView) -> Result<()> {
        let view = view.clamped();
        let state = self.state(id)?;
        if state.kind != WinKind::Pad {
            return Err(CursesError::invalid("not a pad"));
        }
        if view.bottom < view.top || view.right < view.left {
            return Err(CursesError::invalid(format!("empty pad viewport {:?}", view)));
        }
        if view.bottom >= self.lines || view.right >= self.cols {
            return Err(CursesError::invalid(format!(
                "pad viewport {:?} extends past a {}x{} screen",
                view, self.lines, self.cols
            )));
        }
        let size = (view.bottom - view.top + 1, view.right - view.left + 1);
        if !fits((view.pad_y, view.pad_x), size.0, size.1, state.rows, state.cols) {
            return Err(CursesError::invalid(format!(
                "pad viewport {:?} reads past a {}x{} pad",
                view, state.rows, state.cols
            )));
        }

        let all = state.clear_ok || state.last_view != Some(view);
        let cursor = state.cursor;
        self.blit(id, (view.pad_y, view.pad_x), (view.top, view.left), size, all)?;

        let state = self.state_mut(id)?;
        state.last_view = Some(view);
        if state.clear_ok {
            state.clear_ok = false;
            self.force_repaint = true;
        }
        let (cy, cx) = (cursor.0 - view.pad_y, cursor.1 - view.pad_x);
        if (0..size.0).contains(&cy) && (0..size.1).contains(&cx) {
            self.pending_cursor = Some((view.top + cy, view.left + cx));
        }
        Ok(())
    }

    fn style(&self, cell: Cell) -> StyledCell {
        let (fg, bg) = self.colors.resolve(cell.attr.pair());
        let ch = if cell.is_continuation() {
            '\0'
        } else {
            cell.chtype().glyph()
        };
        StyledCell {
            ch,
            attr: cell.attr.display().difference(Attr::ALTCHARSET) & self.caps.attributes,
            fg,
            bg,
        }
    }

    /// Send everything that differs from the last flush to the terminal.
    pub(crate) fn update(&mut self) -> Result<()> {
        self.check_live()?;
        if self.force_repaint {
            self.backend.clear()?;
            self.physical.fill(StyledCell::default());
            self.force_repaint = false;
        }

        let mut changes = Vec::new();
        for y in 0..self.lines {
            for x in 0..self.cols {
                let cell = self.virtual_screen.get(y, x).copied().unwrap_or(Cell::BLANK);
                let styled = self.style(cell);
                let index = (y * self.cols + x) as usize;
                if self.physical[index] != styled {
                    self.physical[index] = styled;
                    changes.push((y, x, styled));
                }
            }
        }
        if !changes.is_empty() {
            self.backend.draw(&changes)?;
        }
        if let Some((y, x)) = self.pending_cursor {
            self.backend.move_cursor(y, x)?;
        }
        self.backend.flush()?;
        trace!("Flushed {} cells", changes.len());
        Ok(())
    }

    pub(crate) fn refresh(&mut self, id: WindowId) -> Result<()> {
        self.nout_refresh(id)?;
        self.update()
    }

    // ---- input -----------------------------------------------------------

    fn read_timeout(&self, delay: Delay) -> Option<Duration> {
        match delay {
            Delay::NoDelay => Some(Duration::ZERO),
            Delay::Millis(ms) => Some(Duration::from_millis(u64::from(ms))),
            Delay::Blocking => self
                .modes
                .half_delay
                .map(|tenths| Duration::from_millis(u64::from(tenths) * 100)),
        }
    }

    /// Read one input for window `id`, echoing printable characters into
    /// it when `echo` is set.
    pub(crate) fn read_input(&mut self, id: WindowId, echo: bool) -> Result<Input> {
        let state = self.state(id)?;
        let (keypad, delay, kind) = (state.keypad, state.delay, state.kind);
        if kind == WinKind::Window && state.is_touched() {
            self.refresh(id)?;
        }
        let timeout = self.read_timeout(delay);

        loop {
            let event = match self.backend.read_event(timeout)? {
                Some(event) => event,
                None => return Err(CursesError::NoEvent),
            };
            match event {
                Event::Char(c) => {
                    let c = if c == '\r' && self.modes.nl { '\n' } else { c };
                    if echo && !c.is_control() {
                        self.canvas(id)?.add_ch(ChType::from(c))?;
                        if kind == WinKind::Window {
                            self.refresh(id)?;
                        }
                    }
                    return Ok(Input::Char(c));
                }
                Event::Key(key) if keypad => return Ok(Input::Key(key)),
                Event::Key(_) => return Ok(Input::Char('\x1b')),
                Event::Mouse(mouse) => {
                    if keypad && self.mouse_mask.events().intersects(mouse.bstate) {
                        self.mouse_queue.push_back(mouse);
                        return Ok(Input::Key(Key::MOUSE));
                    }
                    trace!("Ignored mouse event {:?}", mouse.bstate);
                }
                Event::Resize(lines, cols) => {
                    self.resize_term(lines, cols)?;
                    return Ok(Input::Key(Key::RESIZE));
                }
            }
        }
    }

    pub(crate) fn beep(&mut self) -> Result<()> {
        self.check_live()?;
        self.backend.beep()?;
        Ok(())
    }

    pub(crate) fn resize_term(&mut self, lines: i32, cols: i32) -> Result<()> {
        self.check_live()?;
        if lines <= 0 || cols <= 0 {
            return Err(CursesError::invalid(format!(
                "terminal size {}x{} must be positive",
                lines, cols
            )));
        }
        let physical = grid::filled(grid::area(lines, cols)?, StyledCell::default())?;
        let root = self.root;
        let (buffer, fill) = {
            let state = self.state(root)?;
            (state.buffer, state.blank())
        };
        if let Some(grid) = self.buffers.get_mut(&buffer) {
            grid.resize(lines, cols, fill)?;
        }
        self.virtual_screen.resize(lines, cols, Cell::BLANK)?;

        info!("Resize: {}x{}", cols, lines);
        self.lines = lines;
        self.cols = cols;
        self.physical = physical;
        self.force_repaint = true;
        self.state_mut(root)?.set_size(lines, cols);
        Ok(())
    }

    pub(crate) fn modes(&self) -> InputModes {
        self.modes
    }

    /// Change the input flags, handing the resulting line discipline to
    /// the backend. The flags stay unchanged if the backend refuses.
    fn update_modes(&mut self, change: impl FnOnce(&mut InputModes)) -> Result<()> {
        self.check_live()?;
        let mut next = self.modes;
        change(&mut next);
        self.backend.set_input_mode(next.input_mode())?;
        self.modes = next;
        Ok(())
    }

    pub(crate) fn colors(&self) -> &ColorRegistry {
        &self.colors
    }

    pub(crate) fn caps(&self) -> &Capabilities {
        &self.caps
    }

    fn end(&mut self) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        self.ended = true;
        self.mouse_queue.clear();
        self.backend.teardown()?;
        info!("Curses session ended");
        Ok(())
    }
}

/// An initialized terminal.
///
/// Dropping the `Screen` ends the session if `end` was not called.
pub struct Screen {
    curses: Rc<RefCell<Curses>>,
    stdscr: Window,
}

impl Screen {
    /// Enter curses mode on `backend`.
    ///
    /// Input starts line-buffered with echo on, as after `initscr`; call
    /// `cbreak` or `raw` for key-at-a-time input.
    pub fn init<B: Backend + 'static>(backend: B) -> Result<Screen> {
        let mut backend: Box<dyn Backend> = Box::new(backend);
        backend.init().map_err(CursesError::Init)?;
        let started = backend
            .set_input_mode(InputModes::default().input_mode())
            .and_then(|()| backend.size());
        let (lines, cols) = match started {
            Ok(size) => size,
            Err(e) => {
                if let Err(teardown) = backend.teardown() {
                    warn!("Teardown after failed init: {}", teardown);
                }
                return Err(CursesError::Init(e));
            }
        };

        let curses = Curses::new(backend, lines, cols);
        let root = curses.root();
        info!("Curses session started: {}x{}", cols, lines);
        let curses = Rc::new(RefCell::new(curses));
        let stdscr = Window::from_parts(root, Rc::clone(&curses));
        Ok(Screen { curses, stdscr })
    }

    /// Enter curses mode and apply a configuration.
    ///
    /// Settings the terminal cannot honor are logged and skipped.
    pub fn init_with<B: Backend + 'static>(backend: B, config: &Config) -> Result<Screen> {
        let screen = Screen::init(backend)?;
        let input = &config.input;
        screen.raw(input.raw)?;
        screen.cbreak(input.cbreak)?;
        screen.echo(input.echo);
        screen.nl(input.nl);
        if let Some(tenths) = input.half_delay {
            screen.half_delay(tenths)?;
        }
        screen.stdscr.keypad(input.keypad);

        if let Some(visibility) = config.cursor_visibility() {
            if let Err(e) = screen.cursor_set(visibility) {
                warn!("Cursor visibility not applied: {}", e);
            }
        }

        if config.display.start_color && screen.has_colors() {
            screen.start_color()?;
            for pair in &config.colors.pairs {
                let applied = match pair.colors() {
                    Some((fg, bg)) => screen.init_pair(pair.id, fg, bg),
                    None => Err(CursesError::invalid(format!(
                        "unknown color in {} / {}",
                        pair.fg, pair.bg
                    ))),
                };
                if let Err(e) = applied {
                    warn!("Color pair {} skipped: {}", pair.id, e);
                }
            }
        }

        let mask = config.mouse_mask();
        if !mask.is_empty() {
            if screen.has_mouse() {
                let granted = screen.mouse_mask(mask);
                debug!("Mouse mask requested {:?}, granted {:?}", mask, granted);
            } else {
                warn!("Mouse events configured but the terminal has no mouse");
            }
        }
        if let Some(ms) = config.mouse.interval_ms {
            screen.mouse_interval(ms);
        }
        Ok(screen)
    }

    /// The root window covering the whole screen.
    pub fn stdscr(&self) -> Window {
        self.stdscr.clone()
    }

    /// Leave curses mode and restore the terminal. Later calls do nothing.
    pub fn end(&self) -> Result<()> {
        self.curses.borrow_mut().end()
    }

    pub fn is_end(&self) -> bool {
        self.curses.borrow().ended
    }

    pub fn lines(&self) -> i32 {
        self.curses.borrow().lines
    }

    pub fn cols(&self) -> i32 {
        self.curses.borrow().cols
    }

    /// A new window of `rows x cols` at `(y, x)`. Zero sizes extend to the
    /// bottom or right edge of the screen.
    pub fn new_window(&self, rows: i32, cols: i32, y: i32, x: i32) -> Result<Window> {
        let id = self.curses.borrow_mut().new_window(rows, cols, y, x)?;
        Ok(Window::from_parts(id, Rc::clone(&self.curses)))
    }

    pub fn new_pad(&self, rows: i32, cols: i32) -> Result<Pad> {
        let id = self.curses.borrow_mut().new_pad(rows, cols)?;
        Ok(Pad::from_window(Window::from_parts(id, Rc::clone(&self.curses))))
    }

    /// Flush everything copied by `nout_refresh` calls in one write.
    pub fn update(&self) -> Result<()> {
        self.curses.borrow_mut().update()
    }

    // ---- colors ----------------------------------------------------------

    pub fn has_colors(&self) -> bool {
        self.curses.borrow().caps.colors > 0
    }

    pub fn can_change_color(&self) -> bool {
        self.curses.borrow().caps.can_change_color
    }

    /// Enable colors. Fails with `CapabilityAbsent` on a monochrome terminal.
    pub fn start_color(&self) -> Result<()> {
        let mut curses = self.curses.borrow_mut();
        curses.check_live()?;
        // Pairs registered so far survive a second call.
        if curses.colors.is_started() {
            return Ok(());
        }
        let caps = curses.caps.clone();
        curses.colors.start(&caps)?;
        debug!(
            "Colors started: {} colors, {} pairs",
            curses.colors.colors(),
            curses.colors.color_pairs()
        );
        Ok(())
    }

    /// `COLORS`, 0 until `start_color`.
    pub fn colors(&self) -> i16 {
        self.curses.borrow().colors.colors()
    }

    /// `COLOR_PAIRS`, 0 until `start_color`.
    pub fn color_pairs(&self) -> i16 {
        self.curses.borrow().colors.color_pairs()
    }

    /// Define color pair `pair`. Pair 0 is fixed and pairs at or beyond
    /// `color_pairs()` do not exist.
    pub fn init_pair(&self, pair: i16, fg: Color, bg: Color) -> Result<()> {
        let mut curses = self.curses.borrow_mut();
        curses.check_live()?;
        curses.colors.init_pair(pair, fg, bg)?;
        trace!("Pair {} = ({:?}, {:?})", pair, fg, bg);
        Ok(())
    }

    pub fn pair_content(&self, pair: i16) -> Result<(Color, Color)> {
        self.curses.borrow().colors.pair_content(pair)
    }

    /// Redefine a color, components on a 0..=1000 scale.
    pub fn init_color(&self, color: Color, r: i16, g: i16, b: i16) -> Result<()> {
        let mut curses = self.curses.borrow_mut();
        curses.check_live()?;
        curses.colors.init_color(color, r, g, b)
    }

    pub fn color_content(&self, color: Color) -> Result<(i16, i16, i16)> {
        self.curses.borrow().colors.color_content(color)
    }

    // ---- input modes -----------------------------------------------------

    pub fn input_modes(&self) -> InputModes {
        self.curses.borrow().modes
    }

    /// Deliver every key, interrupt and suspend keys included, as input.
    pub fn raw(&self, on: bool) -> Result<()> {
        self.curses.borrow_mut().update_modes(|m| m.raw = on)
    }

    /// Deliver keys as they are typed instead of a line at a time.
    /// Turning cbreak off also leaves half-delay mode.
    pub fn cbreak(&self, on: bool) -> Result<()> {
        self.curses.borrow_mut().update_modes(|m| {
            m.cbreak = on;
            if !on {
                m.half_delay = None;
            }
        })
    }

    pub fn echo(&self, on: bool) {
        self.curses.borrow_mut().modes.echo = on;
    }

    pub fn nl(&self, on: bool) {
        self.curses.borrow_mut().modes.nl = on;
    }

    /// Blocking reads give up after `tenths` tenths of a second
    /// (1 through 255). Implies cbreak.
    pub fn half_delay(&self, tenths: u8) -> Result<()> {
        if tenths == 0 {
            return Err(CursesError::invalid("half delay must be 1 through 255 tenths"));
        }
        self.curses.borrow_mut().update_modes(|m| {
            m.cbreak = true;
            m.half_delay = Some(tenths);
        })
    }

    pub fn has_key(&self, key: Key) -> bool {
        self.curses.borrow().backend.has_key(key)
    }

    // ---- mouse -----------------------------------------------------------

    pub fn has_mouse(&self) -> bool {
        self.curses.borrow().caps.has_mouse
    }

    /// Ask for mouse events. Returns the events that will be reported,
    /// the subset of `requested` the terminal supports.
    pub fn mouse_mask(&self, requested: MouseMask) -> MouseMask {
        let mut curses = self.curses.borrow_mut();
        let granted = if curses.caps.has_mouse {
            requested & curses.caps.mouse_events
        } else {
            MouseMask::empty()
        };
        if let Err(e) = curses.backend.set_mouse_mask(granted) {
            warn!("Mouse mask not applied: {}", e);
            return curses.mouse_mask;
        }
        curses.mouse_mask = granted;
        granted
    }

    /// Set the longest press-to-release time, in milliseconds, that still
    /// counts as a click. Returns the previous value; a negative value
    /// only queries.
    pub fn mouse_interval(&self, ms: i32) -> i32 {
        let mut curses = self.curses.borrow_mut();
        let previous = curses.mouse_interval;
        if ms >= 0 {
            curses.mouse_interval = ms;
            curses
                .backend
                .set_mouse_interval(Duration::from_millis(ms as u64));
        }
        previous
    }

    /// Pop the oldest mouse event reported through `Key::MOUSE`.
    pub fn get_mouse(&self) -> Result<MouseEvent> {
        let mut curses = self.curses.borrow_mut();
        curses.check_live()?;
        if !curses.caps.has_mouse {
            return Err(CursesError::unsupported("mouse"));
        }
        curses.mouse_queue.pop_front().ok_or(CursesError::NoEvent)
    }

    // ---- terminal --------------------------------------------------------

    pub fn beep(&self) -> Result<()> {
        self.curses.borrow_mut().beep()
    }

    pub fn flash(&self) -> Result<()> {
        let mut curses = self.curses.borrow_mut();
        curses.check_live()?;
        curses.backend.flash()?;
        Ok(())
    }

    /// Change the cursor's visibility, returning the previous setting.
    pub fn cursor_set(&self, visibility: CursorVisibility) -> Result<CursorVisibility> {
        let mut curses = self.curses.borrow_mut();
        curses.check_live()?;
        if !curses.caps.cursor_visibility {
            return Err(CursesError::unsupported("cursor visibility"));
        }
        curses.backend.set_cursor_visibility(visibility)?;
        Ok(std::mem::replace(&mut curses.cursor_visibility, visibility))
    }

    pub fn baud_rate(&self) -> u32 {
        self.curses.borrow().caps.baud_rate
    }

    pub fn is_term_resized(&self, lines: i32, cols: i32) -> bool {
        let curses = self.curses.borrow();
        lines != curses.lines || cols != curses.cols
    }

    /// Adopt a new terminal size: the root window and the virtual screen
    /// are resized and the next update repaints everything.
    pub fn resize_term(&self, lines: i32, cols: i32) -> Result<()> {
        self.curses.borrow_mut().resize_term(lines, cols)
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if let Err(e) = self.curses.borrow_mut().end() {
            warn!("Terminal teardown failed: {}", e);
        }
    }
}
