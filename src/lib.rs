//! tcurses - curses-style windows, pads, colors and input for terminals
//!
//! A `Screen` puts the terminal into curses mode and owns every window
//! created from it. Drawing goes to in-memory windows; `refresh` (or
//! `nout_refresh` followed by one `Screen::update`) sends only the cells
//! that changed to the terminal.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 Screen                   │
//! │  ┌────────┐  ┌────────┐  ┌────────────┐  │
//! │  │ stdscr │  │ Window │  │    Pad     │  │
//! │  └───┬────┘  └───┬────┘  └─────┬──────┘  │
//! │      └─── nout_refresh ────────┘         │
//! │                  ▼                       │
//! │           virtual screen                 │
//! │                  ▼ update                │
//! │   Backend (CrosstermBackend / Memory)    │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tcurses::{color_pair, Attr, Color, MemoryBackend, Screen};
//!
//! let backend = MemoryBackend::new(24, 80);
//! let probe = backend.probe();
//! let screen = Screen::init(backend)?;
//! screen.start_color()?;
//! screen.init_pair(1, Color::YELLOW, Color::BLUE)?;
//!
//! let win = screen.stdscr();
//! win.attr_on(Attr::BOLD | color_pair(1))?;
//! win.print((2, 4), "Hello")?;
//! win.print((), ", world")?;
//! win.refresh()?;
//!
//! assert!(probe.line(2).starts_with("    Hello, world"));
//! screen.end()?;
//! # Ok::<(), tcurses::CursesError>(())
//! ```

pub mod backend;
pub mod config;
pub mod core;
pub mod error;
pub mod wm;

pub use backend::{Backend, CrosstermBackend, CursorVisibility, InputMode, MemoryBackend, MemoryProbe};
pub use config::Config;
pub use self::core::{color_pair, key_name, Attr, ButtonAction, ChType, Color, Input, Key, MouseEvent, MouseMask};
pub use error::{CursesError, Result};
pub use wm::{curses_version, At, BorderChars, Delay, InputModes, Pad, PadView, Screen, SyncMode, Window};
