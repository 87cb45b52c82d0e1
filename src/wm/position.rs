//! Optional leading coordinates for drawing and input calls.
//!
//! Every positional operation takes `at: impl Into<At>`:
//!
//! ```
//! use tcurses::At;
//!
//! assert_eq!(At::from(()), At::Cursor);        // current cursor
//! assert_eq!(At::from(7), At::Row(7));         // (7, 0)
//! assert_eq!(At::from((7, 3)), At::Point(7, 3));
//! assert_eq!(At::Row(7).target(), Some((7, 0)));
//! ```
//!
//! Supplying a position moves the cursor there first; the cursor is left
//! wherever the operation ends.

/// Where an operation starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum At {
    /// At the current cursor position.
    #[default]
    Cursor,
    /// At column 0 of the given row.
    Row(i32),
    /// At `(y, x)`.
    Point(i32, i32),
}

impl At {
    /// The `(y, x)` to move to first, or `None` to stay put.
    pub fn target(self) -> Option<(i32, i32)> {
        match self {
            At::Cursor => None,
            At::Row(y) => Some((y, 0)),
            At::Point(y, x) => Some((y, x)),
        }
    }
}

impl From<()> for At {
    fn from(_: ()) -> Self {
        At::Cursor
    }
}

impl From<i32> for At {
    fn from(y: i32) -> Self {
        At::Row(y)
    }
}

impl From<(i32, i32)> for At {
    fn from((y, x): (i32, i32)) -> Self {
        At::Point(y, x)
    }
}

impl From<Option<(i32, i32)>> for At {
    fn from(pos: Option<(i32, i32)>) -> Self {
        match pos {
            Some((y, x)) => At::Point(y, x),
            None => At::Cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets() {
        assert_eq!(At::Cursor.target(), None);
        assert_eq!(At::Row(4).target(), Some((4, 0)));
        assert_eq!(At::Point(4, 9).target(), Some((4, 9)));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(At::from(None), At::Cursor);
        assert_eq!(At::from(Some((1, 2))), At::Point(1, 2));
        assert_eq!(At::from(12), At::Row(12));
    }
}
