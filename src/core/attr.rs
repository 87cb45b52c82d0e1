//! Attributes, color pairs and characters.
//!
//! The bit layout follows the classic curses `chtype`:
//!
//! ```text
//! bits  0..8   character text (only used by ChType::from_raw / to_raw)
//! bits  8..16  color pair number
//! bits 16..25  display attributes
//! ```
//!
//! Because a color pair lives in the same bitmask as the display
//! attributes, `color_pair(n)` can be passed anywhere an `Attr` is taken.

use std::fmt;
use std::ops::BitOr;

use bitflags::bitflags;

bitflags! {
    /// Display attributes plus the color-pair field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attr: u32 {
        /// The color-pair field (8 bits). Not a single flag.
        const COLOR      = 0x0000_ff00;
        const STANDOUT   = 1 << 16;
        const UNDERLINE  = 1 << 17;
        const REVERSE    = 1 << 18;
        const BLINK      = 1 << 19;
        const DIM        = 1 << 20;
        const BOLD       = 1 << 21;
        const ALTCHARSET = 1 << 22;
        const INVIS      = 1 << 23;
        const PROTECT    = 1 << 24;
    }
}

/// Mask of the character-text bits in a raw `chtype`.
pub const A_CHARTEXT: u32 = 0x0000_00ff;

/// Largest pair number the bitmask can carry.
pub const MAX_PAIR: i16 = 255;

/// Attribute names, used in error messages.
static ATTR_NAMES: &[(Attr, &str)] = &[
    (Attr::STANDOUT, "standout"),
    (Attr::UNDERLINE, "underline"),
    (Attr::REVERSE, "reverse"),
    (Attr::BLINK, "blink"),
    (Attr::DIM, "dim"),
    (Attr::BOLD, "bold"),
    (Attr::ALTCHARSET, "altcharset"),
    (Attr::INVIS, "invis"),
    (Attr::PROTECT, "protect"),
];

impl Attr {
    pub const NORMAL: Attr = Attr::empty();

    /// The color pair stored in this bitmask (0 when none).
    pub const fn pair(self) -> i16 {
        ((self.bits() & Attr::COLOR.bits()) >> 8) as i16
    }

    /// The display attributes without the color-pair field.
    pub const fn display(self) -> Attr {
        Attr::from_bits_retain(self.bits() & !Attr::COLOR.bits())
    }

    /// Replace the color-pair field.
    pub const fn with_pair(self, pair: i16) -> Attr {
        Attr::from_bits_retain(self.display().bits() | color_pair(pair).bits())
    }

    /// Human-readable names, `|`-separated; "normal" for none.
    pub fn names(self) -> String {
        let mut parts: Vec<String> = ATTR_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| name.to_string())
            .collect();
        if self.pair() != 0 {
            parts.push(format!("color pair {}", self.pair()));
        }
        if parts.is_empty() {
            "normal".to_string()
        } else {
            parts.join("|")
        }
    }
}

/// Encode a color pair into the attribute bitmask.
///
/// Pure mapping: unregistered pairs are encoded all the same and simply
/// render with default colors.
pub const fn color_pair(pair: i16) -> Attr {
    Attr::from_bits_retain(((pair as u32) & 0xff) << 8)
}

/// A character together with its attributes and color pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChType {
    pub ch: char,
    pub attr: Attr,
}

impl ChType {
    pub const BLANK: ChType = ChType::new(' ', Attr::NORMAL);

    pub const fn new(ch: char, attr: Attr) -> Self {
        Self { ch, attr }
    }

    /// Alternate-charset character keyed by its VT100 letter.
    pub const fn acs(ch: char) -> Self {
        Self {
            ch,
            attr: Attr::ALTCHARSET,
        }
    }

    /// Decode a raw curses `chtype` (character in the low byte).
    pub fn from_raw(raw: u32) -> Self {
        Self {
            ch: char::from((raw & A_CHARTEXT) as u8),
            attr: Attr::from_bits_retain(raw & !A_CHARTEXT),
        }
    }

    /// Encode as a raw `chtype`; `None` when the character needs more
    /// than one byte.
    pub fn to_raw(self) -> Option<u32> {
        let code = self.ch as u32;
        (code <= A_CHARTEXT).then(|| code | self.attr.bits())
    }

    /// The character as it should appear on screen, with alternate-charset
    /// letters translated to their Unicode line-drawing glyphs.
    pub fn glyph(self) -> char {
        if self.attr.contains(Attr::ALTCHARSET) {
            acs_glyph(self.ch)
        } else {
            self.ch
        }
    }
}

impl Default for ChType {
    fn default() -> Self {
        Self::BLANK
    }
}

impl From<char> for ChType {
    fn from(ch: char) -> Self {
        Self::new(ch, Attr::NORMAL)
    }
}

/// A blank carrying `attr`, as passed to `Window::background`.
impl From<Attr> for ChType {
    fn from(attr: Attr) -> Self {
        Self::new(' ', attr)
    }
}

impl BitOr<Attr> for ChType {
    type Output = ChType;

    fn bitor(self, rhs: Attr) -> ChType {
        let attr = if rhs.pair() != 0 {
            self.attr.with_pair(rhs.pair()) | rhs.display()
        } else {
            self.attr | rhs
        };
        ChType::new(self.ch, attr)
    }
}

impl BitOr<Attr> for char {
    type Output = ChType;

    fn bitor(self, rhs: Attr) -> ChType {
        ChType::new(self, rhs)
    }
}

impl fmt::Display for ChType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

// Line-drawing characters, keyed by their VT100 alternate-charset letter.
pub const ACS_ULCORNER: ChType = ChType::acs('l');
pub const ACS_LLCORNER: ChType = ChType::acs('m');
pub const ACS_URCORNER: ChType = ChType::acs('k');
pub const ACS_LRCORNER: ChType = ChType::acs('j');
pub const ACS_LTEE: ChType = ChType::acs('t');
pub const ACS_RTEE: ChType = ChType::acs('u');
pub const ACS_BTEE: ChType = ChType::acs('v');
pub const ACS_TTEE: ChType = ChType::acs('w');
pub const ACS_HLINE: ChType = ChType::acs('q');
pub const ACS_VLINE: ChType = ChType::acs('x');
pub const ACS_PLUS: ChType = ChType::acs('n');
pub const ACS_S1: ChType = ChType::acs('o');
pub const ACS_S3: ChType = ChType::acs('p');
pub const ACS_S7: ChType = ChType::acs('r');
pub const ACS_S9: ChType = ChType::acs('s');
pub const ACS_DIAMOND: ChType = ChType::acs('`');
pub const ACS_CKBOARD: ChType = ChType::acs('a');
pub const ACS_DEGREE: ChType = ChType::acs('f');
pub const ACS_PLMINUS: ChType = ChType::acs('g');
pub const ACS_BOARD: ChType = ChType::acs('h');
pub const ACS_LANTERN: ChType = ChType::acs('i');
pub const ACS_BULLET: ChType = ChType::acs('~');
pub const ACS_LARROW: ChType = ChType::acs(',');
pub const ACS_RARROW: ChType = ChType::acs('+');
pub const ACS_DARROW: ChType = ChType::acs('.');
pub const ACS_UARROW: ChType = ChType::acs('-');
pub const ACS_BLOCK: ChType = ChType::acs('0');
pub const ACS_LEQUAL: ChType = ChType::acs('y');
pub const ACS_GEQUAL: ChType = ChType::acs('z');
pub const ACS_PI: ChType = ChType::acs('{');
pub const ACS_NEQUAL: ChType = ChType::acs('|');
pub const ACS_STERLING: ChType = ChType::acs('}');

/// Unicode rendering of a VT100 alternate-charset letter. Letters with no
/// mapping render as themselves.
pub fn acs_glyph(ch: char) -> char {
    match ch {
        'l' => '┌',
        'm' => '└',
        'k' => '┐',
        'j' => '┘',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'q' => '─',
        'x' => '│',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'r' => '⎼',
        's' => '⎽',
        '`' => '◆',
        'a' => '▒',
        'f' => '°',
        'g' => '±',
        'h' => '░',
        'i' => '␋',
        '~' => '·',
        ',' => '←',
        '+' => '→',
        '.' => '↓',
        '-' => '↑',
        '0' => '█',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        other => other,
    }
}

/// A terminal color number. Negative means the terminal's default color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(pub i16);

impl Color {
    pub const DEFAULT: Color = Color(-1);
    pub const BLACK: Color = Color(0);
    pub const RED: Color = Color(1);
    pub const GREEN: Color = Color(2);
    pub const YELLOW: Color = Color(3);
    pub const BLUE: Color = Color(4);
    pub const MAGENTA: Color = Color(5);
    pub const CYAN: Color = Color(6);
    pub const WHITE: Color = Color(7);

    /// Parse a color name ("blue", "default") or a number ("12").
    pub fn from_name(name: &str) -> Option<Color> {
        let color = match name.trim().to_ascii_lowercase().as_str() {
            "default" => Color::DEFAULT,
            "black" => Color::BLACK,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "yellow" => Color::YELLOW,
            "blue" => Color::BLUE,
            "magenta" => Color::MAGENTA,
            "cyan" => Color::CYAN,
            "white" => Color::WHITE,
            other => return other.parse::<i16>().ok().filter(|n| *n >= -1).map(Color),
        };
        Some(color)
    }

    pub fn is_default(self) -> bool {
        self.0 < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_pair_encoding() {
        assert_eq!(color_pair(0), Attr::NORMAL);
        assert_eq!(color_pair(3).pair(), 3);
        assert_eq!(color_pair(3).bits(), 3 << 8);
        assert!(color_pair(3).display().is_empty());
    }

    #[test]
    fn test_pair_combines_with_attributes() {
        let attr = Attr::BOLD | color_pair(5);
        assert_eq!(attr.pair(), 5);
        assert_eq!(attr.display(), Attr::BOLD);
        assert_eq!(attr.with_pair(2).pair(), 2);
        assert_eq!(attr.with_pair(0), Attr::BOLD);
    }

    #[test]
    fn test_attr_names() {
        assert_eq!(Attr::NORMAL.names(), "normal");
        assert_eq!((Attr::BOLD | Attr::UNDERLINE).names(), "underline|bold");
        assert_eq!(color_pair(4).names(), "color pair 4");
    }

    #[test]
    fn test_chtype_raw_roundtrip_layout() {
        let ch = ChType::from_raw(0x0040_0000 | b'q' as u32);
        assert_eq!(ch, ACS_HLINE);
        assert_eq!(ch.glyph(), '─');
        assert_eq!(ACS_HLINE.to_raw(), Some(4194417));
        assert_eq!(ChType::from('é').to_raw(), Some(0xe9));
        assert_eq!(ChType::from('─').to_raw(), None);
    }

    #[test]
    fn test_char_bitor_attr() {
        let ch = 'x' | Attr::BOLD | color_pair(2);
        assert_eq!(ch.ch, 'x');
        assert_eq!(ch.attr.display(), Attr::BOLD);
        assert_eq!(ch.attr.pair(), 2);

        // A later pair replaces the earlier one instead of mixing bits.
        let ch = ch | color_pair(1);
        assert_eq!(ch.attr.pair(), 1);
    }

    #[test]
    fn test_color_names() {
        assert_eq!(Color::from_name("Blue"), Some(Color::BLUE));
        assert_eq!(Color::from_name("default"), Some(Color::DEFAULT));
        assert_eq!(Color::from_name("42"), Some(Color(42)));
        assert_eq!(Color::from_name("-7"), None);
        assert_eq!(Color::from_name("mauve"), None);
    }
}
