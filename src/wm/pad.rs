//! Pads: windows not limited by the screen size.
//!
//! A pad is drawn on like any window (it derefs to `Window`) but reaches
//! the screen only through a `PadView`, which maps a pad position onto a
//! screen rectangle:
//!
//! ```text
//!        pad                           screen
//!  ┌──────────────────┐         ┌──────────────────┐
//!  │ (pad_y, pad_x)   │         │  (top, left)     │
//!  │   ┌────────┐     │  ────▶  │    ┌────────┐    │
//!  │   │  view  │     │         │    │        │    │
//!  │   └────────┘     │         │    └────────┘ (bottom, right)
//!  └──────────────────┘         └──────────────────┘
//! ```

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use super::state::WinKind;
use super::window::Window;
use crate::core::ChType;
use crate::error::Result;

/// Which part of a pad to show, and where.
///
/// `bottom` and `right` are inclusive screen coordinates. Negative values
/// are treated as 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadView {
    pub pad_y: i32,
    pub pad_x: i32,
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl PadView {
    pub fn new(pad_y: i32, pad_x: i32, top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            pad_y,
            pad_x,
            top,
            left,
            bottom,
            right,
        }
    }

    pub(crate) fn clamped(self) -> Self {
        Self {
            pad_y: self.pad_y.max(0),
            pad_x: self.pad_x.max(0),
            top: self.top.max(0),
            left: self.left.max(0),
            ..self
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct Pad {
    window: Window,
}

impl fmt::Debug for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pad").field("id", &self.window.id.0).finish()
    }
}

impl Deref for Pad {
    type Target = Window;

    fn deref(&self) -> &Window {
        &self.window
    }
}

impl Pad {
    pub(crate) fn from_window(window: Window) -> Self {
        Self { window }
    }

    /// The pad as a plain window handle.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Show `view` and flush.
    pub fn refresh(&self, view: PadView) -> Result<()> {
        let mut curses = self.window.curses.borrow_mut();
        curses.pad_nout_refresh(self.window.id, view)?;
        curses.update()
    }

    /// Copy `view` to the virtual screen without flushing.
    pub fn nout_refresh(&self, view: PadView) -> Result<()> {
        self.window
            .curses
            .borrow_mut()
            .pad_nout_refresh(self.window.id, view)
    }

    /// A pad sharing this pad's cells, `(y, x)` relative to its origin.
    pub fn sub(&self, rows: i32, cols: i32, y: i32, x: i32) -> Result<Pad> {
        let id = self
            .window
            .curses
            .borrow_mut()
            .new_child(self.window.id, WinKind::Pad, rows, cols, (y, x))?;
        Ok(Pad::from_window(Window::from_parts(
            id,
            Rc::clone(&self.window.curses),
        )))
    }

    /// Add a character and show it again through the last view used.
    pub fn echo_char(&self, ch: impl Into<ChType>) -> Result<()> {
        let ch = ch.into();
        let mut curses = self.window.curses.borrow_mut();
        curses.canvas(self.window.id)?.add_ch(ch)?;
        let last_view = curses.state(self.window.id)?.last_view;
        match last_view {
            Some(view) => {
                curses.pad_nout_refresh(self.window.id, view)?;
                curses.update()
            }
            None => Ok(()),
        }
    }

    pub fn delete(self) -> Result<()> {
        self.window.delete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, MemoryProbe};
    use crate::wm::screen::Screen;

    fn screen(lines: i32, cols: i32) -> (Screen, MemoryProbe) {
        let backend = MemoryBackend::new(lines, cols);
        let probe = backend.probe();
        (Screen::init(backend).unwrap(), probe)
    }

    fn numbered_pad(screen: &Screen) -> Pad {
        let pad = screen.new_pad(20, 30).unwrap();
        for y in 0..20 {
            pad.print(y, format_args!("line {:02}", y)).unwrap();
        }
        pad
    }

    #[test]
    fn test_pad_larger_than_screen() {
        let (screen, probe) = screen(4, 10);
        let pad = numbered_pad(&screen);
        assert_eq!(pad.max_yx(), (20, 30));
        pad.refresh(PadView::new(10, 0, 1, 2, 2, 8)).unwrap();
        assert_eq!(probe.line(0), "          ");
        assert_eq!(probe.line(1), "  line 10 ");
        assert_eq!(probe.line(2), "  line 11 ");
        assert_eq!(pad.row_text(11).unwrap().trim_end(), "line 11");
    }

    #[test]
    fn test_window_refresh_rejected_on_pad() {
        let (screen, _probe) = screen(4, 10);
        let pad = screen.new_pad(5, 5).unwrap();
        assert!(pad.window().refresh().unwrap_err().is_invalid_parameter());
        assert!(pad.nout_refresh(PadView::new(0, 0, 0, 0, 1, 1)).is_ok());
        assert!(pad.window().sub(1, 1, 0, 0).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_viewport_validation() {
        let (screen, _probe) = screen(4, 10);
        let pad = screen.new_pad(5, 5).unwrap();
        // Destination past the screen.
        assert!(pad.refresh(PadView::new(0, 0, 0, 0, 4, 4)).unwrap_err().is_invalid_parameter());
        // Source past the pad.
        assert!(pad.refresh(PadView::new(3, 0, 0, 0, 2, 4)).unwrap_err().is_invalid_parameter());
        // Inverted rectangle.
        assert!(pad.refresh(PadView::new(0, 0, 2, 0, 1, 4)).unwrap_err().is_invalid_parameter());
        // Negative origins clamp to zero.
        pad.refresh(PadView::new(-2, -2, -1, -1, 3, 4)).unwrap();
    }

    #[test]
    fn test_moving_viewport_recopies() {
        let (screen, probe) = screen(2, 10);
        let pad = numbered_pad(&screen);
        pad.refresh(PadView::new(0, 0, 0, 0, 1, 9)).unwrap();
        assert_eq!(probe.line(0), "line 00   ");
        pad.refresh(PadView::new(5, 0, 0, 0, 1, 9)).unwrap();
        assert_eq!(probe.line(0), "line 05   ");
        assert_eq!(probe.line(1), "line 06   ");
    }

    #[test]
    fn test_sub_pad_shares_cells() {
        let (screen, probe) = screen(3, 10);
        let pad = screen.new_pad(10, 10).unwrap();
        let sub = pad.sub(2, 4, 5, 3).unwrap();
        assert!(pad.sub(6, 4, 5, 3).unwrap_err().is_invalid_parameter());
        sub.print((0, 0), "sub").unwrap();
        assert_eq!(pad.char_at(5, 3).unwrap().ch, 's');
        assert_eq!(sub.parent(), Some(pad.window().clone()));

        sub.refresh(PadView::new(0, 0, 1, 1, 2, 4)).unwrap();
        assert_eq!(probe.line(1), " sub      ");
        assert!(pad.clone().delete().is_err());
        sub.delete().unwrap();
        pad.delete().unwrap();
    }

    #[test]
    fn test_echo_char() {
        let (screen, probe) = screen(2, 6);
        let pad = screen.new_pad(4, 20).unwrap();
        pad.echo_char('a').unwrap();
        assert_eq!(probe.flush_count(), 0);

        pad.refresh(PadView::new(0, 0, 0, 0, 1, 5)).unwrap();
        pad.echo_char('b').unwrap();
        assert_eq!(probe.flush_count(), 2);
        assert_eq!(probe.line(0), "ab    ");
        assert_eq!(probe.cursor(), (0, 2));
    }
}
