//! Per-window state and the cell-level drawing primitives.
//!
//! A `WinState` never owns cells. It points into a buffer kept by the
//! screen, at an offset, so sub-windows and derived windows write straight
//! into their parent's cells. `Canvas` pairs a window with its buffer for
//! the duration of one operation.

use unicode_width::UnicodeWidthChar;

use super::pad::PadView;
use super::position::At;
use crate::core::attr::{
    ACS_HLINE, ACS_LLCORNER, ACS_LRCORNER, ACS_ULCORNER, ACS_URCORNER, ACS_VLINE,
};
use crate::core::{Attr, Cell, ChType, Grid};
use crate::error::{CursesError, Result};

/// `'\0'` stands for the default line-drawing character.
fn line_char(ch: ChType, default: ChType) -> ChType {
    if ch.ch == '\0' {
        ChType::new(default.ch, default.attr | ch.attr)
    } else {
        ch
    }
}

/// Tab stops every 8 columns.
const TAB_WIDTH: i32 = 8;

/// Whether a `rows x cols` block at `(y, x)` lies inside a
/// `height x width` area. Computed in `i64` so huge or negative inputs
/// are rejected instead of wrapping.
pub(crate) fn fits(at: (i32, i32), rows: i32, cols: i32, height: i32, width: i32) -> bool {
    rows > 0
        && cols > 0
        && at.0 >= 0
        && at.1 >= 0
        && i64::from(at.0) + i64::from(rows) <= i64::from(height)
        && i64::from(at.1) + i64::from(cols) <= i64::from(width)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct WindowId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct BufferId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WinKind {
    Window,
    Pad,
}

/// How long `get_char` waits for input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delay {
    /// Wait until input arrives (or the half-delay expires).
    #[default]
    Blocking,
    /// Return immediately.
    NoDelay,
    Millis(u32),
}

impl Delay {
    /// Curses `timeout` convention: negative blocks, zero never waits.
    pub fn from_millis(ms: i32) -> Self {
        match ms {
            ms if ms < 0 => Delay::Blocking,
            0 => Delay::NoDelay,
            ms => Delay::Millis(ms as u32),
        }
    }
}

/// How `Window::sync` propagates state between a window and its ancestors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Touch the ancestors' lines this window has changed.
    Up,
    /// Touch this window wherever an ancestor is touched.
    Down,
    /// Move every ancestor's cursor to this window's cursor.
    Cursor,
}

/// The eight characters of a window border. A `'\0'` character selects
/// the default line-drawing character for that position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderChars {
    pub left: ChType,
    pub right: ChType,
    pub top: ChType,
    pub bottom: ChType,
    pub top_left: ChType,
    pub top_right: ChType,
    pub bottom_left: ChType,
    pub bottom_right: ChType,
}

impl Default for BorderChars {
    fn default() -> Self {
        Self {
            left: ACS_VLINE,
            right: ACS_VLINE,
            top: ACS_HLINE,
            bottom: ACS_HLINE,
            top_left: ACS_ULCORNER,
            top_right: ACS_URCORNER,
            bottom_left: ACS_LLCORNER,
            bottom_right: ACS_LRCORNER,
        }
    }
}

impl BorderChars {
    /// Default corners with the given vertical and horizontal sides.
    pub fn sides(vertical: ChType, horizontal: ChType) -> Self {
        Self {
            left: vertical,
            right: vertical,
            top: horizontal,
            bottom: horizontal,
            ..Self::default()
        }
    }

    fn resolved(&self) -> Self {
        let fallback = Self::default();
        let pick = |ch: ChType, default: ChType| if ch.ch == '\0' { default } else { ch };
        Self {
            left: pick(self.left, fallback.left),
            right: pick(self.right, fallback.right),
            top: pick(self.top, fallback.top),
            bottom: pick(self.bottom, fallback.bottom),
            top_left: pick(self.top_left, fallback.top_left),
            top_right: pick(self.top_right, fallback.top_right),
            bottom_left: pick(self.bottom_left, fallback.bottom_left),
            bottom_right: pick(self.bottom_right, fallback.bottom_right),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct WinState {
    pub kind: WinKind,
    pub buffer: BufferId,
    /// Where this window's `(0, 0)` lies in its buffer.
    pub offset: (i32, i32),
    /// Origin on the screen. For pads, the origin inside the outermost pad.
    pub beg: (i32, i32),
    pub rows: i32,
    pub cols: i32,
    pub cursor: (i32, i32),
    pub attr: Attr,
    pub bkgd: ChType,
    pub keypad: bool,
    pub scroll: bool,
    pub clear_ok: bool,
    pub delay: Delay,
    pub touched: Vec<bool>,
    pub parent: Option<WindowId>,
    pub last_view: Option<PadView>,
}

impl WinState {
    pub fn new(kind: WinKind, buffer: BufferId, rows: i32, cols: i32, beg: (i32, i32)) -> Self {
        Self {
            kind,
            buffer,
            offset: (0, 0),
            beg,
            rows,
            cols,
            cursor: (0, 0),
            attr: Attr::NORMAL,
            bkgd: ChType::BLANK,
            keypad: false,
            scroll: false,
            clear_ok: false,
            delay: Delay::Blocking,
            touched: vec![true; rows.max(0) as usize],
            parent: None,
            last_view: None,
        }
    }

    /// A window over the same buffer, `rel` cells from this one's origin.
    /// Attributes and background are inherited.
    pub fn child(&self, parent: WindowId, rel: (i32, i32), rows: i32, cols: i32) -> Self {
        Self {
            offset: (self.offset.0 + rel.0, self.offset.1 + rel.1),
            beg: (self.beg.0 + rel.0, self.beg.1 + rel.1),
            rows,
            cols,
            attr: self.attr,
            bkgd: self.bkgd,
            parent: Some(parent),
            ..WinState::new(self.kind, self.buffer, rows, cols, self.beg)
        }
    }

    /// Check that a `rows x cols` block at window position `rel` lies
    /// inside this window.
    pub fn check_contains(&self, rel: (i32, i32), rows: i32, cols: i32) -> Result<()> {
        if rows <= 0 || cols <= 0 {
            return Err(CursesError::invalid(format!(
                "window size {}x{} must be positive",
                rows, cols
            )));
        }
        if !fits(rel, rows, cols, self.rows, self.cols) {
            return Err(CursesError::invalid(format!(
                "{}x{} at ({}, {}) does not fit in a {}x{} window",
                rows, cols, rel.0, rel.1, self.rows, self.cols
            )));
        }
        Ok(())
    }

    pub fn contains(&self, y: i32, x: i32) -> bool {
        y >= 0 && x >= 0 && y < self.rows && x < self.cols
    }

    /// Whether the absolute position `(y, x)` falls inside this window.
    pub fn encloses(&self, y: i32, x: i32) -> bool {
        match (y.checked_sub(self.beg.0), x.checked_sub(self.beg.1)) {
            (Some(y), Some(x)) => self.contains(y, x),
            _ => false,
        }
    }

    pub fn touch_line(&mut self, y: i32) {
        if y < 0 {
            return;
        }
        if let Some(line) = self.touched.get_mut(y as usize) {
            *line = true;
        }
    }

    pub fn touch_all(&mut self) {
        self.touched.fill(true);
    }

    pub fn untouch_all(&mut self) {
        self.touched.fill(false);
    }

    pub fn is_touched(&self) -> bool {
        self.touched.iter().any(|t| *t)
    }

    pub fn is_line_touched(&self, y: i32) -> bool {
        y >= 0 && self.touched.get(y as usize).copied().unwrap_or(false)
    }

    /// Change the size, keeping the cursor inside and every line touched.
    pub fn set_size(&mut self, rows: i32, cols: i32) {
        self.rows = rows;
        self.cols = cols;
        self.cursor = (
            self.cursor.0.min(rows - 1).max(0),
            self.cursor.1.min(cols - 1).max(0),
        );
        self.touched = vec![true; rows.max(0) as usize];
    }

    /// The cell every blank position of this window shows.
    pub fn blank(&self) -> Cell {
        Cell::from(self.bkgd)
    }

    /// Combine a character with the running attributes and the
    /// background into the cell that gets stored.
    ///
    /// A plain blank takes the background character. Display attributes
    /// are the union of all three sources; the color pair is the first
    /// one set, looking at the character, then the window, then the
    /// background.
    pub fn render(&self, ch: ChType) -> Cell {
        let glyph = if ch.ch == ' ' && ch.attr.is_empty() {
            self.bkgd.ch
        } else {
            ch.ch
        };
        let pair = [ch.attr.pair(), self.attr.pair(), self.bkgd.attr.pair()]
            .into_iter()
            .find(|p| *p != 0)
            .unwrap_or(0);
        let display = ch.attr.display() | self.attr.display() | self.bkgd.attr.display();
        Cell {
            ch: glyph,
            attr: display.with_pair(pair),
        }
    }
}

/// A window bound to its buffer for one drawing operation.
pub(crate) struct Canvas<'a> {
    pub win: &'a mut WinState,
    pub grid: &'a mut Grid,
}

impl Canvas<'_> {
    /// The stored cell at window position `(y, x)`.
    pub fn cell(&self, y: i32, x: i32) -> Cell {
        let (oy, ox) = self.win.offset;
        self.grid.get(oy + y, ox + x).copied().unwrap_or(Cell::BLANK)
    }

    /// Store a cell and mark its line touched.
    pub fn put(&mut self, y: i32, x: i32, cell: Cell) {
        if !self.win.contains(y, x) {
            return;
        }
        let (oy, ox) = self.win.offset;
        self.grid.set(oy + y, ox + x, cell);
        self.win.touch_line(y);
    }

    pub fn move_to(&mut self, y: i32, x: i32) -> Result<()> {
        if !self.win.contains(y, x) {
            return Err(CursesError::invalid(format!(
                "position ({}, {}) is outside a {}x{} window",
                y, x, self.win.rows, self.win.cols
            )));
        }
        self.win.cursor = (y, x);
        Ok(())
    }

    /// Move to the position named by `at`, if any.
    pub fn seek(&mut self, at: At) -> Result<()> {
        match at.target() {
            Some((y, x)) => self.move_to(y, x),
            None => Ok(()),
        }
    }

    /// Write one character at the cursor with curses output semantics.
    pub fn add_ch(&mut self, ch: ChType) -> Result<()> {
        match ch.ch {
            '\n' => {
                self.clear_to_eol();
                self.newline()
            }
            '\r' => {
                self.win.cursor.1 = 0;
                Ok(())
            }
            '\t' => {
                let spaces = TAB_WIDTH - self.win.cursor.1 % TAB_WIDTH;
                let y = self.win.cursor.0;
                for _ in 0..spaces {
                    self.put_glyph(ChType::new(' ', ch.attr))?;
                    if self.win.cursor.1 == 0 || self.win.cursor.0 != y {
                        break;
                    }
                }
                Ok(())
            }
            '\x08' => {
                self.win.cursor.1 = (self.win.cursor.1 - 1).max(0);
                Ok(())
            }
            c if (c as u32) < 0x20 || c == '\x7f' => {
                let shown = if c == '\x7f' {
                    '?'
                } else {
                    char::from(c as u8 + b'@')
                };
                self.put_glyph(ChType::new('^', ch.attr))?;
                self.put_glyph(ChType::new(shown, ch.attr))
            }
            c @ '\u{80}'..='\u{9f}' => {
                self.put_glyph(ChType::new('~', ch.attr))?;
                self.put_glyph(ChType::new(char::from((c as u32 - 0x80) as u8 + b'@'), ch.attr))
            }
            _ => self.put_glyph(ch),
        }
    }

    /// Write a printable character and advance, wrapping at the right edge.
    fn put_glyph(&mut self, ch: ChType) -> Result<()> {
        let width = match ch.glyph().width() {
            Some(0) => return Ok(()),
            Some(w) => w as i32,
            None => 1,
        };
        if width > self.win.cols {
            return Err(CursesError::invalid(format!(
                "character {:?} is wider than the window",
                ch.ch
            )));
        }

        if self.win.cursor.1 + width > self.win.cols {
            let (y, x) = self.win.cursor;
            let blank = self.win.blank();
            for col in x..self.win.cols {
                self.put(y, col, blank);
            }
            self.wrap()?;
        }

        let (y, x) = self.win.cursor;
        self.split_wide_at(y, x);
        if width == 2 {
            self.split_wide_at(y, x + 1);
        }
        let cell = self.win.render(ch);
        self.put(y, x, cell);
        if width == 2 {
            self.put(y, x + 1, Cell::continuation(cell.attr));
        }

        if x + width >= self.win.cols {
            self.wrap()
        } else {
            self.win.cursor.1 = x + width;
            Ok(())
        }
    }

    /// Blank the other half of a wide character about to be overwritten
    /// at `(y, x)`.
    fn split_wide_at(&mut self, y: i32, x: i32) {
        let blank = self.win.blank();
        if self.cell(y, x).is_continuation() && x > 0 {
            self.put(y, x - 1, blank);
        }
        if x + 1 < self.win.cols && self.cell(y, x + 1).is_continuation() {
            self.put(y, x + 1, blank);
        }
    }

    /// Move to the start of the next line after filling the last column.
    /// At the bottom of a non-scrolling window the cursor stays on the
    /// last cell and the write is reported as failed.
    fn wrap(&mut self) -> Result<()> {
        let y = self.win.cursor.0;
        if y + 1 < self.win.rows {
            self.win.cursor = (y + 1, 0);
        } else if self.win.scroll {
            self.scroll_lines(1);
            self.win.cursor = (y, 0);
        } else {
            self.win.cursor = (y, self.win.cols - 1);
            return Err(CursesError::invalid(
                "wrote past the bottom-right corner of a window that does not scroll",
            ));
        }
        Ok(())
    }

    fn newline(&mut self) -> Result<()> {
        let y = self.win.cursor.0;
        if y + 1 < self.win.rows {
            self.win.cursor = (y + 1, 0);
        } else if self.win.scroll {
            self.scroll_lines(1);
            self.win.cursor = (y, 0);
        } else {
            return Err(CursesError::invalid(
                "newline on the last line of a window that does not scroll",
            ));
        }
        Ok(())
    }

    /// Write every character of `text`, stopping at the first failure.
    pub fn add_str(&mut self, text: &str) -> Result<()> {
        text.chars().try_for_each(|c| self.add_ch(ChType::from(c)))
    }

    pub fn clear_to_eol(&mut self) {
        let (y, x) = self.win.cursor;
        self.split_wide_at(y, x);
        let blank = self.win.blank();
        for col in x..self.win.cols {
            self.put(y, col, blank);
        }
    }

    pub fn clear_to_bottom(&mut self) {
        self.clear_to_eol();
        let blank = self.win.blank();
        for y in self.win.cursor.0 + 1..self.win.rows {
            for x in 0..self.win.cols {
                self.put(y, x, blank);
            }
        }
    }

    pub fn erase(&mut self) {
        let blank = self.win.blank();
        for y in 0..self.win.rows {
            for x in 0..self.win.cols {
                self.put(y, x, blank);
            }
        }
        self.win.touch_all();
        self.win.cursor = (0, 0);
    }

    /// Delete the character under the cursor, shifting the rest of the
    /// line left.
    pub fn del_ch(&mut self) {
        let (y, x) = self.win.cursor;
        let cols = self.win.cols;
        let span = if self.cell(y, x + 1).is_continuation() { 2 } else { 1 };
        for col in x..cols {
            let next = if col + span < cols {
                self.cell(y, col + span)
            } else {
                self.win.blank()
            };
            self.put(y, col, next);
        }
    }

    /// Shift the contents up by `n` lines (down when negative), filling
    /// with the background. Does not check the scroll flag.
    pub fn scroll_lines(&mut self, n: i32) {
        let rows = self.win.rows;
        let blank = self.win.blank();
        let order: Vec<i32> = if n >= 0 {
            (0..rows).collect()
        } else {
            (0..rows).rev().collect()
        };
        for y in order {
            let src = y.saturating_add(n);
            for x in 0..self.win.cols {
                let cell = if (0..rows).contains(&src) {
                    self.cell(src, x)
                } else {
                    blank
                };
                self.put(y, x, cell);
            }
        }
        self.win.touch_all();
    }

    pub fn scroll(&mut self, n: i32) -> Result<()> {
        if !self.win.scroll {
            return Err(CursesError::invalid("scrolling is not enabled for this window"));
        }
        self.scroll_lines(n);
        Ok(())
    }

    /// Draw `n` copies of `ch` rightwards from the cursor, clipped to the
    /// window. The cursor does not move.
    /// A `'\0'` character draws `ACS_HLINE` with the given attributes.
    pub fn hline(&mut self, ch: ChType, n: i32) {
        let (y, x) = self.win.cursor;
        let cell = self.win.render(line_char(ch, ACS_HLINE));
        for col in x..x.saturating_add(n).min(self.win.cols) {
            self.put(y, col, cell);
        }
    }

    pub fn vline(&mut self, ch: ChType, n: i32) {
        let (y, x) = self.win.cursor;
        let cell = self.win.render(line_char(ch, ACS_VLINE));
        for row in y..y.saturating_add(n).min(self.win.rows) {
            self.put(row, x, cell);
        }
    }

    pub fn border(&mut self, chars: &BorderChars) {
        let chars = chars.resolved();
        let (bottom, right) = (self.win.rows - 1, self.win.cols - 1);
        let render = |ch: ChType| self.win.render(ch);
        let (top, bot, left, rgt) = (
            render(chars.top),
            render(chars.bottom),
            render(chars.left),
            render(chars.right),
        );
        let corners = [
            (0, 0, render(chars.top_left)),
            (0, right, render(chars.top_right)),
            (bottom, 0, render(chars.bottom_left)),
            (bottom, right, render(chars.bottom_right)),
        ];
        for x in 1..right {
            self.put(0, x, top);
            self.put(bottom, x, bot);
        }
        for y in 1..bottom {
            self.put(y, 0, left);
            self.put(y, right, rgt);
        }
        for (y, x, cell) in corners {
            self.put(y, x, cell);
        }
    }

    /// Install a new background, re-rendering every cell that shows the
    /// old one.
    pub fn background(&mut self, bkgd: ChType) {
        let bkgd = normalize_background(bkgd);
        let old = self.win.bkgd;
        for y in 0..self.win.rows {
            for x in 0..self.win.cols {
                let cell = self.cell(y, x);
                let ch = if cell.ch == old.ch { bkgd.ch } else { cell.ch };
                let pair = if cell.attr.pair() == old.attr.pair() {
                    bkgd.attr.pair()
                } else {
                    cell.attr.pair()
                };
                let display = cell.attr.display().difference(old.attr.display()) | bkgd.attr.display();
                self.put(
                    y,
                    x,
                    Cell {
                        ch,
                        attr: display.with_pair(pair),
                    },
                );
            }
        }
        self.win.bkgd = bkgd;
    }

    /// Step back over the last `width` columns on the cursor's line and
    /// blank them, as line editing does for an erased character.
    pub fn rub_out(&mut self, width: i32) {
        let (y, x) = self.win.cursor;
        let start = (x - width).max(0);
        let blank = self.win.blank();
        for col in start..x {
            self.put(y, col, blank);
        }
        self.win.cursor = (y, start);
    }

    /// Characters of row `y`, wide characters counted once.
    pub fn row_text(&self, y: i32) -> String {
        let (oy, ox) = self.win.offset;
        self.grid.text(oy + y, ox, self.win.cols)
    }
}

/// A zero background character means a blank.
pub(crate) fn normalize_background(bkgd: ChType) -> ChType {
    if bkgd.ch == '\0' {
        ChType::new(' ', bkgd.attr)
    } else {
        bkgd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color_pair;

    fn window(rows: i32, cols: i32) -> (WinState, Grid) {
        (
            WinState::new(WinKind::Window, BufferId(0), rows, cols, (0, 0)),
            Grid::new(rows, cols, Cell::BLANK),
        )
    }

    fn text(win: &mut WinState, grid: &mut Grid, y: i32) -> String {
        Canvas { win, grid }.row_text(y)
    }

    #[test]
    fn test_add_str_advances_cursor() {
        let (mut win, mut grid) = window(3, 10);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.move_to(1, 2).unwrap();
        canvas.add_str("abc").unwrap();
        assert_eq!(canvas.win.cursor, (1, 5));
        assert_eq!(canvas.row_text(1), "  abc     ");
    }

    #[test]
    fn test_move_outside_fails() {
        let (mut win, mut grid) = window(3, 10);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        assert!(canvas.move_to(3, 0).unwrap_err().is_invalid_parameter());
        assert!(canvas.seek(At::Point(0, 10)).is_err());
        assert_eq!(canvas.win.cursor, (0, 0));
    }

    #[test]
    fn test_wraps_at_right_edge() {
        let (mut win, mut grid) = window(2, 4);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("abcdef").unwrap();
        assert_eq!(canvas.row_text(0), "abcd");
        assert_eq!(canvas.row_text(1), "ef  ");
        assert_eq!(canvas.win.cursor, (1, 2));
    }

    #[test]
    fn test_bottom_right_without_scroll() {
        let (mut win, mut grid) = window(2, 3);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        let err = canvas.add_str("abcdefgh").unwrap_err();
        assert!(err.is_invalid_parameter());
        assert_eq!(canvas.row_text(1), "def");
        assert_eq!(canvas.win.cursor, (1, 2));
    }

    #[test]
    fn test_bottom_right_with_scroll() {
        let (mut win, mut grid) = window(2, 3);
        win.scroll = true;
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("abcdefgh").unwrap();
        assert_eq!(canvas.row_text(0), "def");
        assert_eq!(canvas.row_text(1), "gh ");
        assert_eq!(canvas.win.cursor, (1, 2));
    }

    #[test]
    fn test_newline_clears_rest_of_line() {
        let (mut win, mut grid) = window(2, 6);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("xxxxxx").unwrap();
        canvas.move_to(0, 2).unwrap();
        canvas.add_str("a\nb").unwrap();
        assert_eq!(canvas.row_text(0), "xxa   ");
        assert_eq!(canvas.row_text(1), "b     ");
    }

    #[test]
    fn test_tab_and_carriage_return() {
        let (mut win, mut grid) = window(1, 20);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("ab\tc").unwrap();
        assert_eq!(canvas.win.cursor, (0, 9));
        canvas.add_str("\rZ").unwrap();
        assert_eq!(canvas.row_text(0).trim_end(), "Zb      c");
    }

    #[test]
    fn test_control_characters_shown_with_caret() {
        let (mut win, mut grid) = window(1, 6);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("\x01\x7f").unwrap();
        assert_eq!(canvas.row_text(0), "^A^?  ");
    }

    #[test]
    fn test_wide_characters() {
        let (mut win, mut grid) = window(2, 4);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("a漢字").unwrap();
        assert_eq!(canvas.win.cursor, (1, 2));
        assert_eq!(canvas.row_text(0), "a漢 ");
        assert_eq!(canvas.row_text(1), "字  ");
        assert!(canvas.cell(0, 2).is_continuation());

        // Overwriting the right half blanks the left half.
        canvas.move_to(0, 2).unwrap();
        canvas.add_str("b").unwrap();
        assert_eq!(canvas.row_text(0), "a b ");
    }

    #[test]
    fn test_running_attributes_are_stored() {
        let (mut win, mut grid) = window(1, 4);
        win.attr = Attr::BOLD | color_pair(2);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_ch('x' | Attr::UNDERLINE).unwrap();
        canvas.add_ch('y' | color_pair(5)).unwrap();
        let x = canvas.cell(0, 0);
        assert_eq!(x.attr.display(), Attr::BOLD | Attr::UNDERLINE);
        assert_eq!(x.attr.pair(), 2);
        assert_eq!(canvas.cell(0, 1).attr.pair(), 5);
    }

    #[test]
    fn test_del_ch_shifts_left() {
        let (mut win, mut grid) = window(1, 5);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("abcd").unwrap();
        canvas.move_to(0, 1).unwrap();
        canvas.del_ch();
        assert_eq!(canvas.row_text(0), "acd  ");
        assert_eq!(canvas.win.cursor, (0, 1));
    }

    #[test]
    fn test_scroll_requires_flag() {
        let (mut win, mut grid) = window(3, 2);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("aabbcc").unwrap_err();
        assert!(canvas.scroll(1).is_err());
        canvas.win.scroll = true;
        canvas.scroll(1).unwrap();
        assert_eq!(canvas.row_text(0), "bb");
        assert_eq!(canvas.row_text(2), "  ");
        canvas.scroll(-2).unwrap();
        assert_eq!(canvas.row_text(2), "bb");
        assert_eq!(canvas.row_text(0), "  ");
    }

    #[test]
    fn test_lines_leave_cursor() {
        let (mut win, mut grid) = window(3, 5);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.move_to(1, 1).unwrap();
        canvas.hline(ChType::from('-'), 10);
        canvas.vline(ChType::from('|'), 10);
        assert_eq!(canvas.row_text(1), " |---");
        assert_eq!(canvas.row_text(2), " |   ");
        assert_eq!(canvas.win.cursor, (1, 1));
    }

    #[test]
    fn test_border() {
        let (mut win, mut grid) = window(3, 4);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.border(&BorderChars::default());
        assert_eq!(canvas.row_text(0), "┌──┐");
        assert_eq!(canvas.row_text(1), "│  │");
        assert_eq!(canvas.row_text(2), "└──┘");

        canvas.border(&BorderChars::sides(ChType::from('|'), ChType::from('\0')));
        assert_eq!(canvas.row_text(1), "|  |");
        assert_eq!(canvas.row_text(2), "└──┘");
    }

    #[test]
    fn test_background_rerenders_blanks() {
        let (mut win, mut grid) = window(1, 4);
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.add_str("ab").unwrap();
        canvas.background('.' | color_pair(3));
        assert_eq!(canvas.row_text(0), "ab..");
        assert_eq!(canvas.cell(0, 0).attr.pair(), 3);

        canvas.move_to(0, 0).unwrap();
        canvas.clear_to_eol();
        assert_eq!(canvas.row_text(0), "....");
    }

    #[test]
    fn test_render_prefers_character_pair() {
        let (mut win, _) = window(1, 1);
        win.bkgd = ChType::new(' ', Attr::DIM | color_pair(1));
        assert_eq!(win.render(ChType::from('q')).attr, Attr::DIM | color_pair(1));
        win.attr = color_pair(4);
        assert_eq!(win.render(ChType::from('q')).attr.pair(), 4);
        assert_eq!(win.render('q' | color_pair(6)).attr.pair(), 6);
    }

    #[test]
    fn test_touch_tracking() {
        let (mut win, mut grid) = window(3, 3);
        win.untouch_all();
        assert!(!win.is_touched());
        let mut canvas = Canvas {
            win: &mut win,
            grid: &mut grid,
        };
        canvas.move_to(2, 0).unwrap();
        canvas.add_ch(ChType::from('z')).unwrap();
        assert!(win.is_line_touched(2));
        assert!(!win.is_line_touched(0));
        assert_eq!(text(&mut win, &mut grid, 2), "z  ");
    }

    #[test]
    fn test_child_offsets() {
        let (mut parent, _) = window(10, 10);
        parent.beg = (2, 3);
        let child = parent.child(WindowId(1), (1, 2), 4, 4);
        assert_eq!(child.beg, (3, 5));
        assert_eq!(child.offset, (1, 2));
        assert!(parent.check_contains((7, 0), 4, 4).is_err());
        assert!(parent.check_contains((6, 6), 4, 4).is_ok());
    }
}
