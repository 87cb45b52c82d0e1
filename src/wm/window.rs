//! Window handles.
//!
//! A `Window` is an id plus a share of the session. Cloning a handle does
//! not copy the window; `duplicate` does. Every positional operation takes
//! `at: impl Into<At>` first:
//!
//! ```text
//! win.print((), "here")        // at the cursor
//! win.print(3, "row 3")        // at (3, 0)
//! win.print((3, 7), "there")   // at (3, 7)
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use unicode_width::UnicodeWidthChar;

use super::position::At;
use super::screen::Curses;
use super::state::{normalize_background, BorderChars, Canvas, Delay, SyncMode, WinKind, WinState, WindowId};
use crate::core::attr::MAX_PAIR;
use crate::core::{Attr, ChType, Input, Key};
use crate::error::{CursesError, Result};

#[derive(Clone)]
pub struct Window {
    pub(crate) id: WindowId,
    pub(crate) curses: Rc<RefCell<Curses>>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window").field("id", &self.id.0).finish()
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.curses, &other.curses)
    }
}

fn check_pair(pair: i16) -> Result<()> {
    if !(0..=MAX_PAIR).contains(&pair) {
        return Err(CursesError::invalid(format!("color pair {} out of range", pair)));
    }
    Ok(())
}

impl Window {
    pub(crate) fn from_parts(id: WindowId, curses: Rc<RefCell<Curses>>) -> Self {
        Self { id, curses }
    }

    fn handle(&self, id: WindowId) -> Window {
        Window::from_parts(id, Rc::clone(&self.curses))
    }

    fn draw<T>(&self, f: impl FnOnce(&mut Canvas<'_>) -> Result<T>) -> Result<T> {
        let mut curses = self.curses.borrow_mut();
        let mut canvas = curses.canvas(self.id)?;
        f(&mut canvas)
    }

    fn get<T: Default>(&self, f: impl FnOnce(&WinState) -> T) -> T {
        self.curses.borrow().state(self.id).map(f).unwrap_or_default()
    }

    fn set(&self, f: impl FnOnce(&mut WinState)) {
        if let Ok(state) = self.curses.borrow_mut().state_mut(self.id) {
            f(state);
        }
    }

    // ---- hierarchy -------------------------------------------------------

    /// A sub-window at absolute screen position `(y, x)`, sharing this
    /// window's cells. It must lie entirely inside this window.
    pub fn sub(&self, rows: i32, cols: i32, y: i32, x: i32) -> Result<Window> {
        let mut curses = self.curses.borrow_mut();
        let beg = curses.state(self.id)?.beg;
        let rel = (y.saturating_sub(beg.0), x.saturating_sub(beg.1));
        let id = curses.new_child(self.id, WinKind::Window, rows, cols, rel)?;
        Ok(self.handle(id))
    }

    /// Like `sub`, with `(y, x)` relative to this window's origin.
    pub fn derived(&self, rows: i32, cols: i32, y: i32, x: i32) -> Result<Window> {
        let id = self
            .curses
            .borrow_mut()
            .new_child(self.id, WinKind::Window, rows, cols, (y, x))?;
        Ok(self.handle(id))
    }

    /// An independent copy of this window's cells and settings.
    pub fn duplicate(&self) -> Result<Window> {
        let id = self.curses.borrow_mut().duplicate(self.id)?;
        Ok(self.handle(id))
    }

    /// Release the window. Its sub-windows must be deleted first.
    pub fn delete(self) -> Result<()> {
        self.curses.borrow_mut().delete(self.id)?;
        Ok(())
    }

    pub fn parent(&self) -> Option<Window> {
        let parent = self.curses.borrow().parent(self.id)?;
        Some(self.handle(parent))
    }

    // ---- geometry --------------------------------------------------------

    pub fn resize(&self, rows: i32, cols: i32) -> Result<()> {
        self.curses.borrow_mut().resize_window(self.id, rows, cols)
    }

    /// Move the window's origin on screen.
    pub fn move_window(&self, y: i32, x: i32) -> Result<()> {
        self.curses.borrow_mut().move_window(self.id, y, x)
    }

    /// Size as `(rows, cols)`.
    pub fn max_yx(&self) -> (i32, i32) {
        self.get(|s| (s.rows, s.cols))
    }

    /// Origin as `(y, x)`.
    pub fn beg_yx(&self) -> (i32, i32) {
        self.get(|s| s.beg)
    }

    pub fn cursor_yx(&self) -> (i32, i32) {
        self.get(|s| s.cursor)
    }

    /// Whether screen position `(y, x)` lies inside the window.
    pub fn enclose(&self, y: i32, x: i32) -> bool {
        self.get(|s| s.encloses(y, x))
    }

    pub fn move_to(&self, y: i32, x: i32) -> Result<()> {
        self.draw(|c| c.move_to(y, x))
    }

    // ---- output ----------------------------------------------------------

    pub fn add_char(&self, at: impl Into<At>, ch: impl Into<ChType>) -> Result<()> {
        let at = at.into();
        let ch = ch.into();
        self.draw(|c| {
            c.seek(at)?;
            c.add_ch(ch)
        })
    }

    /// Write formatted text; `format_args!` works as well as `&str`.
    pub fn print(&self, at: impl Into<At>, text: impl fmt::Display) -> Result<()> {
        let at = at.into();
        let text = text.to_string();
        self.draw(|c| {
            c.seek(at)?;
            c.add_str(&text)
        })
    }

    /// Delete the character at the position, shifting the line left.
    pub fn del_char(&self, at: impl Into<At>) -> Result<()> {
        let at = at.into();
        self.draw(|c| {
            c.seek(at)?;
            c.del_ch();
            Ok(())
        })
    }

    /// Draw a horizontal line of `n` characters. The cursor ends at the
    /// line's start.
    pub fn hline(&self, at: impl Into<At>, ch: impl Into<ChType>, n: i32) -> Result<()> {
        let at = at.into();
        let ch = ch.into();
        self.draw(|c| {
            c.seek(at)?;
            c.hline(ch, n);
            Ok(())
        })
    }

    pub fn vline(&self, at: impl Into<At>, ch: impl Into<ChType>, n: i32) -> Result<()> {
        let at = at.into();
        let ch = ch.into();
        self.draw(|c| {
            c.seek(at)?;
            c.vline(ch, n);
            Ok(())
        })
    }

    pub fn border(&self, chars: &BorderChars) -> Result<()> {
        self.draw(|c| {
            c.border(chars);
            Ok(())
        })
    }

    /// Border with default corners; a `'\0'` side takes the default line.
    pub fn draw_box(&self, vertical: impl Into<ChType>, horizontal: impl Into<ChType>) -> Result<()> {
        self.border(&BorderChars::sides(vertical.into(), horizontal.into()))
    }

    /// The character and attributes stored at `(y, x)`.
    pub fn char_at(&self, y: i32, x: i32) -> Result<ChType> {
        self.draw(|c| {
            if !c.win.contains(y, x) {
                return Err(CursesError::invalid(format!("position ({}, {}) is outside the window", y, x)));
            }
            Ok(c.cell(y, x).chtype())
        })
    }

    /// Text of row `y`.
    pub fn row_text(&self, y: i32) -> Result<String> {
        self.draw(|c| {
            if !(0..c.win.rows).contains(&y) {
                return Err(CursesError::invalid(format!("row {} is outside the window", y)));
            }
            Ok(c.row_text(y))
        })
    }

    // ---- input -----------------------------------------------------------

    /// Read one key, refreshing the window first if it has changes.
    /// Returns `CursesError::NoEvent` when the timeout expires.
    pub fn get_char(&self, at: impl Into<At>) -> Result<Input> {
        let at = at.into();
        let mut curses = self.curses.borrow_mut();
        curses.canvas(self.id)?.seek(at)?;
        let echo = curses.modes().echo;
        curses.read_input(self.id, echo)
    }

    /// Read a line of at most `n` characters, ending at Enter.
    ///
    /// Backspace erases the previous character. Input beyond `n`
    /// characters is refused with a beep. Typed characters are echoed
    /// when echo is on.
    pub fn get_string(&self, at: impl Into<At>, n: usize) -> Result<String> {
        let at = at.into();
        let mut curses = self.curses.borrow_mut();
        curses.canvas(self.id)?.seek(at)?;
        let echo = curses.modes().echo;

        let mut line = String::new();
        let mut widths = Vec::new();
        loop {
            match curses.read_input(self.id, false)? {
                Input::Char('\n') | Input::Char('\r') | Input::Key(Key::ENTER) => break,
                Input::Char('\x7f') | Input::Char('\x08') | Input::Key(Key::BACKSPACE) | Input::Key(Key::LEFT) => {
                    if line.pop().is_some() {
                        let width = widths.pop().unwrap_or(1);
                        if echo {
                            curses.canvas(self.id)?.rub_out(width);
                        }
                    }
                }
                Input::Char(c) if !c.is_control() => {
                    if line.chars().count() >= n {
                        curses.beep()?;
                        continue;
                    }
                    line.push(c);
                    widths.push(c.width().unwrap_or(1) as i32);
                    if echo {
                        curses.canvas(self.id)?.add_ch(ChType::from(c))?;
                    }
                }
                _ => {}
            }
        }
        Ok(line)
    }

    /// Report function keys as `Input::Key` instead of an escape.
    pub fn keypad(&self, on: bool) {
        self.set(|s| s.keypad = on);
    }

    pub fn is_keypad(&self) -> bool {
        self.get(|s| s.keypad)
    }

    /// Input timeout in milliseconds: negative blocks, 0 does not wait.
    pub fn timeout(&self, ms: i32) {
        self.set(|s| s.delay = Delay::from_millis(ms));
    }

    pub fn nodelay(&self, on: bool) {
        self.set(|s| s.delay = if on { Delay::NoDelay } else { Delay::Blocking });
    }

    pub fn delay(&self) -> Delay {
        self.get(|s| s.delay)
    }

    // ---- attributes ------------------------------------------------------

    fn check_attr(&self, attr: Attr) -> Result<()> {
        let supported = self.curses.borrow().caps().attributes;
        let missing = attr.display().difference(supported);
        if !missing.is_empty() {
            return Err(CursesError::unsupported(missing.names()));
        }
        Ok(())
    }

    /// Turn on attributes for later output. A color pair in `attr`
    /// replaces the current one.
    pub fn attr_on(&self, attr: Attr) -> Result<()> {
        self.check_attr(attr)?;
        self.curses.borrow_mut().state_mut(self.id).map(|s| {
            s.attr = if attr.pair() != 0 {
                s.attr.with_pair(attr.pair()) | attr.display()
            } else {
                s.attr | attr
            };
        })
    }

    /// Turn off attributes. A color pair in `attr` clears the pair.
    pub fn attr_off(&self, attr: Attr) -> Result<()> {
        self.curses.borrow_mut().state_mut(self.id).map(|s| {
            let cleared = s.attr.difference(attr.display());
            s.attr = if attr.pair() != 0 { cleared.with_pair(0) } else { cleared };
        })
    }

    pub fn attr_set(&self, attr: Attr) -> Result<()> {
        self.check_attr(attr)?;
        self.curses.borrow_mut().state_mut(self.id).map(|s| s.attr = attr)
    }

    /// Running attributes, color pair included.
    pub fn attrs(&self) -> Attr {
        self.get(|s| s.attr)
    }

    pub fn color_on(&self, pair: i16) -> Result<()> {
        check_pair(pair)?;
        self.curses
            .borrow_mut()
            .state_mut(self.id)
            .map(|s| s.attr = s.attr.with_pair(pair))
    }

    pub fn color_off(&self, pair: i16) -> Result<()> {
        check_pair(pair)?;
        self.curses
            .borrow_mut()
            .state_mut(self.id)
            .map(|s| s.attr = s.attr.with_pair(0))
    }

    /// Use `pair` for later output; it must exist.
    pub fn color_set(&self, pair: i16) -> Result<()> {
        let mut curses = self.curses.borrow_mut();
        let pairs = curses.colors().color_pairs();
        if pair < 0 || (pair != 0 && pair >= pairs) {
            return Err(CursesError::invalid(format!(
                "color pair {} out of range 0..{}",
                pair, pairs
            )));
        }
        curses.state_mut(self.id).map(|s| s.attr = s.attr.with_pair(pair))
    }

    /// Set the background and apply it to every blank cell.
    pub fn background(&self, ch: impl Into<ChType>) -> Result<()> {
        let ch = ch.into();
        self.draw(|c| {
            c.background(ch);
            Ok(())
        })
    }

    /// Set the background for later output only.
    pub fn set_background_char(&self, ch: impl Into<ChType>) {
        let ch = normalize_background(ch.into());
        self.set(|s| s.bkgd = ch);
    }

    pub fn background_char(&self) -> ChType {
        self.get(|s| s.bkgd)
    }

    // ---- refresh ---------------------------------------------------------

    /// Copy changes to the screen and flush them.
    pub fn refresh(&self) -> Result<()> {
        self.curses.borrow_mut().refresh(self.id)
    }

    /// Copy changes to the virtual screen; `Screen::update` flushes.
    pub fn nout_refresh(&self) -> Result<()> {
        self.curses.borrow_mut().nout_refresh(self.id)
    }

    /// Mark every line changed.
    pub fn touch(&self) {
        self.set(|s| s.touch_all());
    }

    pub fn untouch(&self) {
        self.set(|s| s.untouch_all());
    }

    /// Whether the window has changes not yet copied to the screen.
    pub fn is_touched(&self) -> bool {
        self.get(|s| s.is_touched())
    }

    pub fn is_line_touched(&self, y: i32) -> bool {
        self.get(|s| s.is_line_touched(y))
    }

    pub fn sync(&self, mode: SyncMode) -> Result<()> {
        self.curses.borrow_mut().sync(self.id, mode)
    }

    /// Erase the window and repaint the whole screen on its next refresh.
    pub fn clear(&self) -> Result<()> {
        self.draw(|c| {
            c.erase();
            c.win.clear_ok = true;
            Ok(())
        })
    }

    pub fn clear_ok(&self, on: bool) {
        self.set(|s| s.clear_ok = on);
    }

    /// Whether the next refresh repaints the whole screen.
    pub fn is_cleared(&self) -> bool {
        self.get(|s| s.clear_ok)
    }

    /// Fill the window with its background and home the cursor.
    pub fn erase(&self) -> Result<()> {
        self.draw(|c| {
            c.erase();
            Ok(())
        })
    }

    pub fn clear_to_bottom(&self) -> Result<()> {
        self.draw(|c| {
            c.clear_to_bottom();
            Ok(())
        })
    }

    pub fn clear_to_eol(&self) -> Result<()> {
        self.draw(|c| {
            c.clear_to_eol();
            Ok(())
        })
    }

    /// Let output past the last line scroll the window.
    pub fn scroll_ok(&self, on: bool) {
        self.set(|s| s.scroll = on);
    }

    /// Scroll up `n` lines, or down when negative.
    pub fn scroll(&self, n: i32) -> Result<()> {
        self.draw(|c| c.scroll(n))
    }

    // ---- copying ---------------------------------------------------------

    fn same_session(&self, other: &Window) -> Result<()> {
        if !Rc::ptr_eq(&self.curses, &other.curses) {
            return Err(CursesError::invalid("windows belong to different screens"));
        }
        Ok(())
    }

    /// Copy a `size` block of `src` at `from` into this window at `to`.
    /// With `overlay`, blank source cells are skipped.
    pub fn copy_from(
        &self,
        src: &Window,
        from: (i32, i32),
        to: (i32, i32),
        size: (i32, i32),
        overlay: bool,
    ) -> Result<()> {
        self.same_session(src)?;
        self.curses
            .borrow_mut()
            .copy_window(src.id, self.id, from, to, size, overlay)
    }

    /// Copy the non-blank cells of `src` where the two overlap on screen.
    pub fn overlay(&self, src: &Window) -> Result<()> {
        self.same_session(src)?;
        self.curses.borrow_mut().overlap_copy(src.id, self.id, true)
    }

    /// Copy every cell of `src` where the two overlap on screen.
    pub fn overwrite(&self, src: &Window) -> Result<()> {
        self.same_session(src)?;
        self.curses.borrow_mut().overlap_copy(src.id, self.id, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Event, MemoryBackend, MemoryProbe};
    use crate::core::color_pair;
    use crate::wm::screen::Screen;

    fn screen(lines: i32, cols: i32) -> (Screen, MemoryProbe) {
        let backend = MemoryBackend::new(lines, cols);
        let probe = backend.probe();
        (Screen::init(backend).unwrap(), probe)
    }

    #[test]
    fn test_position_forms() {
        let (screen, _probe) = screen(5, 10);
        let win = screen.stdscr();
        win.print(3, "row").unwrap();
        assert_eq!(win.row_text(3).unwrap(), "row       ");
        assert_eq!(win.cursor_yx(), (3, 3));

        win.print((), "!").unwrap();
        assert_eq!(win.char_at(3, 3).unwrap().ch, '!');

        win.add_char((1, 4), 'x').unwrap();
        assert_eq!(win.cursor_yx(), (1, 5));
        win.add_char(At::Row(2), 'y').unwrap();
        assert_eq!(win.char_at(2, 0).unwrap().ch, 'y');
    }

    #[test]
    fn test_cursor_left_at_end_of_output() {
        let (screen, _probe) = screen(3, 10);
        let win = screen.stdscr();
        win.print((1, 2), format_args!("{}-{}", 4, 2)).unwrap();
        assert_eq!(win.cursor_yx(), (1, 5));
        assert_eq!(win.row_text(1).unwrap(), "  4-2     ");
    }

    #[test]
    fn test_bad_position_writes_nothing() {
        let (screen, _probe) = screen(3, 10);
        let win = screen.stdscr();
        win.move_to(1, 1).unwrap();
        assert!(win.print((3, 0), "x").unwrap_err().is_invalid_parameter());
        assert!(win.add_char((0, 10), 'x').unwrap_err().is_invalid_parameter());
        assert!(win.del_char(-1).unwrap_err().is_invalid_parameter());
        assert_eq!(win.cursor_yx(), (1, 1));
        for y in 0..3 {
            assert_eq!(win.row_text(y).unwrap().trim(), "");
        }
    }

    #[test]
    fn test_color_pair_with_attr_on_matches_color_on() {
        let (screen, _probe) = screen(2, 2);
        let a = screen.stdscr();
        let b = screen.new_window(1, 1, 0, 0).unwrap();
        a.attr_on(Attr::BOLD).unwrap();
        b.attr_on(Attr::BOLD).unwrap();

        a.attr_on(color_pair(3)).unwrap();
        b.color_on(3).unwrap();
        assert_eq!(a.attrs().bits(), b.attrs().bits());
        assert_eq!(a.attrs(), Attr::BOLD | color_pair(3));

        a.attr_off(color_pair(3)).unwrap();
        b.color_off(3).unwrap();
        assert_eq!(a.attrs().bits(), b.attrs().bits());
        assert_eq!(a.attrs(), Attr::BOLD);
    }

    #[test]
    fn test_color_set_requires_registered_range() {
        let (screen, _probe) = screen(2, 2);
        let win = screen.stdscr();
        assert!(win.color_set(1).unwrap_err().is_invalid_parameter());
        win.color_set(0).unwrap();
        screen.start_color().unwrap();
        win.color_set(5).unwrap();
        assert_eq!(win.attrs().pair(), 5);
        assert!(win.color_on(300).is_err());
    }

    #[test]
    fn test_out_of_bounds_sub_leaves_parent_unchanged() {
        let (screen, _probe) = screen(10, 10);
        let parent = screen.new_window(4, 4, 2, 2).unwrap();
        parent.print((1, 1), "ab").unwrap();
        let before = (
            parent.max_yx(),
            parent.cursor_yx(),
            (0..4).map(|y| parent.row_text(y).unwrap()).collect::<Vec<_>>(),
        );

        assert!(parent.sub(3, 3, 4, 4).unwrap_err().is_invalid_parameter());
        assert!(parent.sub(2, 2, 1, 1).unwrap_err().is_invalid_parameter());
        assert!(parent.derived(1, 5, 0, 0).unwrap_err().is_invalid_parameter());

        let after = (
            parent.max_yx(),
            parent.cursor_yx(),
            (0..4).map(|y| parent.row_text(y).unwrap()).collect::<Vec<_>>(),
        );
        assert_eq!(before, after);
        // No child was registered, so the parent can still be deleted.
        parent.delete().unwrap();
    }

    #[test]
    fn test_sub_and_derived_share_cells() {
        let (screen, _probe) = screen(10, 10);
        let parent = screen.new_window(6, 6, 2, 2).unwrap();
        let sub = parent.sub(2, 3, 3, 4).unwrap();
        let derived = parent.derived(2, 3, 1, 2).unwrap();
        assert_eq!(sub.beg_yx(), derived.beg_yx());
        assert_eq!(sub.parent(), Some(parent.clone()));

        sub.print((0, 0), "hi").unwrap();
        assert_eq!(parent.char_at(1, 2).unwrap().ch, 'h');
        assert_eq!(derived.char_at(0, 1).unwrap().ch, 'i');

        parent.print((2, 2), "Z").unwrap();
        assert_eq!(sub.char_at(1, 0).unwrap().ch, 'Z');
    }

    #[test]
    fn test_duplicate_is_independent() {
        let (screen, _probe) = screen(5, 5);
        let win = screen.new_window(2, 3, 1, 1).unwrap();
        win.print((0, 0), "abc").unwrap();
        win.attr_on(Attr::UNDERLINE).unwrap();
        let dup = win.duplicate().unwrap();
        assert_eq!(dup.parent(), None);
        assert_eq!(dup.attrs(), Attr::UNDERLINE);
        assert_eq!(dup.row_text(0).unwrap(), "abc");

        dup.print((0, 0), "X").unwrap();
        win.print((1, 0), "Y").unwrap();
        assert_eq!(win.char_at(0, 0).unwrap().ch, 'a');
        assert_eq!(dup.char_at(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn test_delete_rules() {
        let (screen, _probe) = screen(5, 5);
        let parent = screen.new_window(4, 4, 0, 0).unwrap();
        let child = parent.derived(2, 2, 1, 1).unwrap();
        assert!(parent.clone().delete().unwrap_err().is_invalid_parameter());
        child.delete().unwrap();
        parent.delete().unwrap();
        assert!(screen.stdscr().delete().unwrap_err().is_invalid_parameter());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "used after delete")]
    fn test_use_after_delete_panics_in_debug() {
        let (screen, _probe) = screen(5, 5);
        let win = screen.new_window(1, 1, 0, 0).unwrap();
        let stale = win.clone();
        win.delete().unwrap();
        let _ = stale.print((), "x");
    }

    #[test]
    fn test_batched_update_matches_sequential_refresh() {
        let draw = |screen: &Screen| {
            let a = screen.new_window(3, 6, 0, 0).unwrap();
            let b = screen.new_window(3, 6, 2, 3).unwrap();
            a.print((1, 1), "alpha").unwrap();
            b.attr_on(Attr::REVERSE).unwrap();
            b.print((0, 0), "beta").unwrap();
            b.print((2, 5), "!").unwrap_err();
            (a, b)
        };

        let (seq, seq_probe) = screen(6, 10);
        let (a, b) = draw(&seq);
        a.refresh().unwrap();
        b.refresh().unwrap();

        let (batch, batch_probe) = screen(6, 10);
        let (a, b) = draw(&batch);
        a.nout_refresh().unwrap();
        b.nout_refresh().unwrap();
        assert_eq!(batch_probe.flush_count(), 0);
        batch.update().unwrap();

        assert_eq!(seq_probe.snapshot(), batch_probe.snapshot());
        assert_eq!(seq_probe.cursor(), batch_probe.cursor());
        assert_eq!(seq_probe.flush_count(), 2);
        assert_eq!(batch_probe.flush_count(), 1);
        assert_eq!(batch_probe.line(2), "   beta   ");
    }

    #[test]
    fn test_refresh_cleans_window() {
        let (screen, probe) = screen(3, 5);
        let win = screen.stdscr();
        assert!(win.is_touched());
        win.refresh().unwrap();
        assert!(!win.is_touched());

        win.print((1, 0), "hey").unwrap();
        assert!(win.is_line_touched(1));
        assert!(!win.is_line_touched(0));
        let written = probe.cells_written();
        win.refresh().unwrap();
        assert_eq!(probe.cells_written() - written, 3);
        assert_eq!(probe.line(1), "hey  ");
        assert_eq!(probe.cursor(), (1, 3));
    }

    #[test]
    fn test_clear_ok_flag() {
        let (screen, _probe) = screen(2, 3);
        let win = screen.stdscr();
        assert!(!win.is_cleared());
        win.clear_ok(true);
        assert!(win.is_cleared());
        win.refresh().unwrap();
        assert!(!win.is_cleared());
        win.clear().unwrap();
        assert!(win.is_cleared());
    }

    #[test]
    fn test_clear_forces_full_repaint() {
        let (screen, probe) = screen(2, 3);
        let win = screen.stdscr();
        win.refresh().unwrap();
        let clears = probe.clear_count();
        win.print((), "abc").unwrap();
        win.refresh().unwrap();
        assert_eq!(probe.clear_count(), clears);
        win.clear().unwrap();
        win.refresh().unwrap();
        assert_eq!(probe.clear_count(), clears + 1);
        assert_eq!(probe.line(0), "   ");
    }

    #[test]
    fn test_sync_up_touches_ancestor() {
        let (screen, _probe) = screen(6, 6);
        let parent = screen.new_window(6, 6, 0, 0).unwrap();
        let child = parent.derived(2, 2, 3, 1).unwrap();
        parent.untouch();
        child.untouch();
        child.print((1, 0), "x").unwrap();
        assert!(!parent.is_touched());
        child.sync(SyncMode::Up).unwrap();
        assert!(parent.is_line_touched(4));
        assert!(!parent.is_line_touched(3));

        child.untouch();
        child.sync(SyncMode::Down).unwrap();
        assert!(child.is_line_touched(1));
        assert!(!child.is_line_touched(0));

        child.move_to(1, 1).unwrap();
        child.sync(SyncMode::Cursor).unwrap();
        assert_eq!(parent.cursor_yx(), (4, 2));
    }

    #[test]
    fn test_overlay_and_overwrite() {
        let (screen, _probe) = screen(6, 6);
        let back = screen.new_window(3, 3, 0, 0).unwrap();
        let front = screen.new_window(3, 3, 1, 1).unwrap();
        back.print((0, 0), "aaaaaaaaa").unwrap_err();
        front.print((0, 0), "b b").unwrap();

        back.overlay(&front).unwrap();
        assert_eq!(back.row_text(1).unwrap(), "aba");
        assert_eq!(back.row_text(2).unwrap(), "aaa");

        back.overwrite(&front).unwrap();
        assert_eq!(back.row_text(1).unwrap(), "ab ");
        assert_eq!(back.row_text(2).unwrap(), "a  ");

        let target = screen.new_window(2, 2, 4, 4).unwrap();
        target.copy_from(&front, (0, 0), (1, 0), (1, 2), false).unwrap();
        assert_eq!(target.row_text(1).unwrap(), "b ");
        assert!(target
            .copy_from(&front, (0, 0), (1, 1), (1, 2), false)
            .unwrap_err()
            .is_invalid_parameter());
    }

    #[test]
    fn test_move_and_resize() {
        let (screen, _probe) = screen(5, 8);
        let win = screen.new_window(2, 3, 0, 0).unwrap();
        win.move_window(3, 5).unwrap();
        assert_eq!(win.beg_yx(), (3, 5));
        assert!(win.enclose(4, 7));
        assert!(!win.enclose(2, 5));
        assert!(win.move_window(4, 0).is_err());

        win.print((1, 2), "z").unwrap_err();
        win.resize(4, 4).unwrap();
        assert_eq!(win.max_yx(), (4, 4));
        assert_eq!(win.char_at(1, 2).unwrap().ch, 'z');

        let child = win.derived(1, 1, 0, 0).unwrap();
        assert!(child.move_window(0, 0).is_err());
        assert!(child.resize(5, 1).is_err());
    }

    #[test]
    fn test_lines_with_position() {
        let (screen, _probe) = screen(4, 6);
        let win = screen.stdscr();
        win.hline((1, 1), '=', 3).unwrap();
        assert_eq!(win.row_text(1).unwrap(), " ===  ");
        assert_eq!(win.cursor_yx(), (1, 1));
        win.vline(At::Point(0, 5), crate::core::attr::ACS_VLINE, 10).unwrap();
        assert_eq!(win.char_at(3, 5).unwrap(), crate::core::attr::ACS_VLINE);
        win.draw_box('|', '-').unwrap();
        assert_eq!(win.row_text(0).unwrap(), "┌----┐");
        assert_eq!(win.row_text(2).unwrap(), "|    |");
    }

    #[test]
    fn test_nul_line_char_draws_default_line() {
        let (screen, _probe) = screen(3, 5);
        let win = screen.stdscr();
        win.hline((0, 0), '\0', 3).unwrap();
        assert_eq!(win.char_at(0, 0).unwrap(), crate::core::attr::ACS_HLINE);
        assert_eq!(win.row_text(0).unwrap(), "───  ");

        win.vline((0, 4), '\0' | Attr::BOLD, 3).unwrap();
        let ch = win.char_at(2, 4).unwrap();
        assert_eq!(ch.ch, crate::core::attr::ACS_VLINE.ch);
        assert!(ch.attr.contains(Attr::BOLD | Attr::ALTCHARSET));
        assert_eq!(win.row_text(2).unwrap().chars().count(), 5);
    }

    #[test]
    fn test_huge_counts_and_offsets_are_safe() {
        let (screen, _probe) = screen(3, 4);
        let win = screen.stdscr();
        assert!(win.derived(2, 2, i32::MAX, 0).unwrap_err().is_invalid_parameter());
        assert!(win.sub(2, 2, 0, i32::MIN).unwrap_err().is_invalid_parameter());
        assert!(win.derived(0, 0, 1, i32::MIN).unwrap_err().is_invalid_parameter());

        win.hline((0, 1), '-', i32::MAX).unwrap();
        assert_eq!(win.row_text(0).unwrap(), " ---");
        win.vline((0, 0), '|', i32::MAX).unwrap();
        assert_eq!(win.char_at(2, 0).unwrap().ch, '|');

        win.scroll_ok(true);
        win.scroll(i32::MAX).unwrap();
        win.scroll(i32::MIN).unwrap();
        assert_eq!(win.row_text(0).unwrap(), "    ");

        let other = screen.new_window(1, 1, 0, 0).unwrap();
        assert!(other.resize(i32::MAX, i32::MAX).unwrap_err().is_invalid_parameter());
        assert_eq!(other.max_yx(), (1, 1));
        assert!(other.move_window(i32::MAX, 0).unwrap_err().is_invalid_parameter());
        assert!(other
            .copy_from(&win, (i32::MAX, 0), (0, 0), (1, 1), false)
            .unwrap_err()
            .is_invalid_parameter());
    }

    #[test]
    fn test_scroll_window() {
        let (screen, _probe) = screen(3, 4);
        let win = screen.stdscr();
        for y in 0..3 {
            win.print(y, y).unwrap();
        }
        assert!(win.scroll(1).unwrap_err().is_invalid_parameter());
        win.scroll_ok(true);
        win.scroll(1).unwrap();
        assert_eq!(win.row_text(0).unwrap(), "1   ");
        assert_eq!(win.row_text(2).unwrap(), "    ");
    }

    #[test]
    fn test_attr_set_replaces_everything() {
        let (screen, _probe) = screen(1, 4);
        let win = screen.stdscr();
        win.attr_on(Attr::BOLD | color_pair(2)).unwrap();
        win.attr_set(Attr::UNDERLINE).unwrap();
        assert_eq!(win.attrs(), Attr::UNDERLINE);
        win.print((), "u").unwrap();
        assert_eq!(win.char_at(0, 0).unwrap().attr, Attr::UNDERLINE);
    }

    #[test]
    fn test_background() {
        let (screen, _probe) = screen(1, 4);
        let win = screen.stdscr();
        win.print((), "ab").unwrap();
        win.background('.' | Attr::DIM).unwrap();
        assert_eq!(win.row_text(0).unwrap(), "ab..");
        assert_eq!(win.char_at(0, 0).unwrap().attr, Attr::DIM);
        win.set_background_char('_');
        assert_eq!(win.background_char(), ChType::from('_'));
        assert_eq!(win.row_text(0).unwrap(), "ab..");
    }

    #[test]
    fn test_get_char_modes() {
        let (screen, probe) = screen(2, 5);
        let win = screen.stdscr();
        probe.push_event(Event::Key(Key::UP));
        assert_eq!(win.get_char(()).unwrap(), Input::Char('\x1b'));
        win.keypad(true);
        probe.push_event(Event::Key(Key::UP));
        assert_eq!(win.get_char(()).unwrap(), Input::Key(Key::UP));

        probe.push_event(Event::Char('\r'));
        assert_eq!(win.get_char(()).unwrap(), Input::Char('\n'));
        screen.nl(false);
        probe.push_event(Event::Char('\r'));
        assert_eq!(win.get_char(()).unwrap(), Input::Char('\r'));

        win.nodelay(true);
        assert_eq!(win.delay(), Delay::NoDelay);
        assert!(matches!(win.get_char(()), Err(CursesError::NoEvent)));
    }

    #[test]
    fn test_get_char_echo() {
        let (screen, probe) = screen(2, 5);
        let win = screen.stdscr();
        screen.echo(true);
        probe.type_str("q");
        assert_eq!(win.get_char((1, 1)).unwrap(), Input::Char('q'));
        assert_eq!(win.char_at(1, 1).unwrap().ch, 'q');
        assert_eq!(probe.line(1), " q   ");
    }

    #[test]
    fn test_get_string() {
        let (screen, probe) = screen(2, 10);
        let win = screen.stdscr();
        screen.echo(true);
        probe.type_str("hellx\x7fo!\n");
        assert_eq!(win.get_string((0, 2), 5).unwrap(), "hello");
        assert_eq!(win.row_text(0).unwrap(), "  hello   ");
        assert_eq!(probe.beep_count(), 1);

        probe.type_str("ab");
        assert!(matches!(win.get_string((), 5), Err(CursesError::NoEvent)));
    }
}
