//! Windows, pads and the session that owns them.
//!
//! - **screen**: `Screen`, the initialized terminal and its refresh pipeline
//! - **window**: `Window` handles and every drawing operation
//! - **pad**: `Pad` and `PadView`
//! - **position**: `At`, the optional leading coordinates
//! - **color**: color-pair registry
//! - **state**: per-window state and cell-level primitives
//!
//! # Module Hierarchy
//!
//! ```text
//! wm/
//! ├── mod.rs       - Module exports
//! ├── screen.rs    - Screen (session, virtual screen, input)
//! ├── window.rs    - Window handles
//! ├── pad.rs       - Pads and viewports
//! ├── position.rs  - At
//! ├── color.rs     - ColorRegistry
//! └── state.rs     - WinState and Canvas
//! ```

mod color;
pub mod pad;
pub mod position;
pub mod screen;
mod state;
pub mod window;

pub use pad::{Pad, PadView};
pub use position::At;
pub use screen::{curses_version, InputModes, Screen};
pub use state::{BorderChars, Delay, SyncMode};
pub use window::Window;
