//! Value types shared by the whole library.
//!
//! - **attr**: attribute bitmask, color pairs, `ChType`, line-drawing characters
//! - **key**: key codes and `Input`
//! - **mouse**: mouse masks and events
//! - **grid**: cell storage used by window buffers and the virtual screen

pub mod attr;
pub mod grid;
pub mod key;
pub mod mouse;

pub use attr::{color_pair, Attr, ChType, Color};
pub use grid::{Cell, Grid};
pub use key::{key_name, Input, Key};
pub use mouse::{ButtonAction, MouseEvent, MouseMask};
