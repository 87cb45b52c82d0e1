//! Color pair registry
//!
//! Pair 0 is the terminal default and cannot be redefined. Pairs are
//! registered with `init_pair` and looked up when the virtual screen is
//! flushed, so redefining a pair recolors every cell already using it on
//! the next update.

use crate::backend::{Capabilities, TermColor};
use crate::core::attr::MAX_PAIR;
use crate::core::Color;
use crate::error::{CursesError, Result};

/// The stock eight-color palette on the 0..=1000 scale.
const BASE_PALETTE: [(i16, i16, i16); 8] = [
    (0, 0, 0),
    (680, 0, 0),
    (0, 680, 0),
    (680, 680, 0),
    (0, 0, 680),
    (680, 0, 680),
    (0, 680, 680),
    (680, 680, 680),
];

#[derive(Debug, Default)]
pub(crate) struct ColorRegistry {
    started: bool,
    colors: i16,
    can_change: bool,
    pairs: Vec<(Color, Color)>,
    redefined: Vec<Option<(i16, i16, i16)>>,
}

impl ColorRegistry {
    /// Enable colors with the terminal's limits.
    pub fn start(&mut self, caps: &Capabilities) -> Result<()> {
        if caps.colors <= 0 {
            return Err(CursesError::unsupported("colors"));
        }
        let pairs = caps.color_pairs.clamp(1, MAX_PAIR + 1);
        self.started = true;
        self.colors = caps.colors;
        self.can_change = caps.can_change_color;
        self.pairs = vec![(Color::DEFAULT, Color::DEFAULT); pairs as usize];
        self.redefined = vec![None; caps.colors as usize];
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// `COLORS`; 0 before colors are started.
    pub fn colors(&self) -> i16 {
        if self.started {
            self.colors
        } else {
            0
        }
    }

    /// `COLOR_PAIRS`; 0 before colors are started.
    pub fn color_pairs(&self) -> i16 {
        self.pairs.len() as i16
    }

    fn check_color(&self, color: Color) -> Result<()> {
        if color.is_default() || color.0 < self.colors() {
            Ok(())
        } else {
            Err(CursesError::invalid(format!(
                "color {} out of range (terminal has {})",
                color.0,
                self.colors()
            )))
        }
    }

    fn check_pair(&self, pair: i16) -> Result<()> {
        if pair <= 0 || pair > self.color_pairs() - 1 {
            return Err(CursesError::invalid(format!(
                "color pair {} out of range 1..{}",
                pair,
                self.color_pairs()
            )));
        }
        Ok(())
    }

    /// Register `pair` as `(fg, bg)`. Nothing changes on failure.
    pub fn init_pair(&mut self, pair: i16, fg: Color, bg: Color) -> Result<()> {
        self.check_pair(pair)?;
        self.check_color(fg)?;
        self.check_color(bg)?;
        self.pairs[pair as usize] = (fg, bg);
        Ok(())
    }

    pub fn pair_content(&self, pair: i16) -> Result<(Color, Color)> {
        if pair == 0 && self.started {
            return Ok(self.pairs[0]);
        }
        self.check_pair(pair)?;
        Ok(self.pairs[pair as usize])
    }

    pub fn init_color(&mut self, color: Color, r: i16, g: i16, b: i16) -> Result<()> {
        if !self.can_change {
            return Err(CursesError::unsupported("color redefinition"));
        }
        if color.is_default() || color.0 >= self.colors() {
            return Err(CursesError::invalid(format!("color {} out of range", color.0)));
        }
        if [r, g, b].iter().any(|c| !(0..=1000).contains(c)) {
            return Err(CursesError::invalid("color components must be within 0..=1000"));
        }
        self.redefined[color.0 as usize] = Some((r, g, b));
        Ok(())
    }

    pub fn color_content(&self, color: Color) -> Result<(i16, i16, i16)> {
        if color.is_default() || color.0 >= self.colors() {
            return Err(CursesError::invalid(format!("color {} out of range", color.0)));
        }
        let index = color.0 as usize;
        if let Some(rgb) = self.redefined[index] {
            return Ok(rgb);
        }
        Ok(if index < 8 {
            BASE_PALETTE[index]
        } else if index < 16 {
            let bright = |c: i16| if c > 0 { 1000 } else { 0 };
            let (r, g, b) = BASE_PALETTE[index - 8];
            (bright(r), bright(g), bright(b))
        } else {
            (0, 0, 0)
        })
    }

    /// Colors to paint a cell using `pair`. Unregistered pairs and pairs
    /// used before colors are started paint with the terminal defaults.
    pub fn resolve(&self, pair: i16) -> (TermColor, TermColor) {
        match self.pairs.get(pair.max(0) as usize) {
            Some(&(fg, bg)) if self.started => (self.paint(fg), self.paint(bg)),
            _ => (TermColor::Default, TermColor::Default),
        }
    }

    fn paint(&self, color: Color) -> TermColor {
        if color.is_default() {
            return TermColor::Default;
        }
        match self.redefined.get(color.0 as usize).copied().flatten() {
            Some((r, g, b)) => {
                let scale = |c: i16| (i32::from(c) * 255 / 1000) as u8;
                TermColor::Rgb(scale(r), scale(g), scale(b))
            }
            None => TermColor::Indexed(color.0 as u8),
        }
    }
}
