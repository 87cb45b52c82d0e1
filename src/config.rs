//! Session configuration for tcurses.
//!
//! The configuration file is optional and lives at `~/.tcurses/config.toml`.
//! Every field has a default, so a partial file is fine:
//!
//! ```toml
//! [input]
//! cbreak = true
//! echo = false
//! keypad = true
//! # half_delay = 5   # tenths of a second
//!
//! [display]
//! cursor = "invisible"   # invisible, normal, very-visible
//! start_color = true
//!
//! [[colors.pairs]]
//! id = 1
//! fg = "yellow"
//! bg = "blue"
//!
//! [mouse]
//! events = ["BUTTON1_CLICKED", "BUTTON3_PRESSED"]
//! interval_ms = 166
//!
//! [log]
//! level = "info"
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::CursorVisibility;
use crate::core::{Color, MouseMask};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub display: DisplayConfig,
    pub colors: ColorsConfig,
    pub mouse: MouseConfig,
    pub log: LogConfig,
}

/// Input mode settings applied at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub raw: bool,
    pub cbreak: bool,
    pub echo: bool,
    /// Translate Enter into a newline
    pub nl: bool,
    /// Decode function keys on the root window
    pub keypad: bool,
    /// Half-delay mode in tenths of a second (1..=255)
    pub half_delay: Option<u8>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            raw: false,
            cbreak: false,
            echo: true,
            nl: true,
            keypad: false,
            half_delay: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Cursor visibility name, left alone when unset
    pub cursor: Option<String>,
    pub start_color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cursor: None,
            start_color: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub pairs: Vec<PairConfig>,
}

/// One `init_pair` call, colors given by name or number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    pub id: i16,
    pub fg: String,
    pub bg: String,
}

impl PairConfig {
    /// Parsed `(fg, bg)`, or `None` when either name is unknown.
    pub fn colors(&self) -> Option<(Color, Color)> {
        Some((Color::from_name(&self.fg)?, Color::from_name(&self.bg)?))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    /// Event names such as `BUTTON1_CLICKED` or `ALL_MOUSE_EVENTS`
    pub events: Vec<String>,
    pub interval_ms: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    match Self::from_toml_str(&content) {
                        Ok(config) => return config,
                        Err(e) => warn!("Ignoring {}: {}", path.display(), e),
                    }
                }
            }
        }
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Directory holding the config file and the demo log
    pub fn dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".tcurses"))
    }

    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::dir().map(|dir| dir.join("config.toml"))
    }

    /// Get log file path, creating its directory
    pub fn log_path() -> Option<PathBuf> {
        let dir = Self::dir()?;
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir.join("tcurses.log"))
    }

    pub fn cursor_visibility(&self) -> Option<CursorVisibility> {
        let name = self.display.cursor.as_deref()?;
        let visibility = CursorVisibility::from_name(&name.trim().to_ascii_lowercase());
        if visibility.is_none() {
            warn!("Unknown cursor visibility: {}", name);
        }
        visibility
    }

    /// The union of the configured mouse events. Unknown names are skipped.
    pub fn mouse_mask(&self) -> MouseMask {
        self.mouse
            .events
            .iter()
            .filter_map(|name| {
                let mask = mouse_event_by_name(name);
                if mask.is_none() {
                    warn!("Unknown mouse event: {}", name);
                }
                mask
            })
            .fold(MouseMask::empty(), |acc, mask| acc | mask)
    }
}

fn mouse_event_by_name(name: &str) -> Option<MouseMask> {
    let name = name.trim().to_ascii_uppercase();
    match name.as_str() {
        "ALL_MOUSE_EVENTS" | "ALL" => Some(MouseMask::ALL),
        "REPORT_MOUSE_POSITION" | "POSITION" => Some(MouseMask::POSITION),
        "BUTTON_CTRL" => Some(MouseMask::CTRL),
        "BUTTON_SHIFT" => Some(MouseMask::SHIFT),
        "BUTTON_ALT" => Some(MouseMask::ALT),
        other => MouseMask::from_name(&other.replacen("BUTTON", "B", 1)),
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.input.nl);
        assert!(config.input.echo);
        assert!(!config.input.cbreak);
        assert!(config.display.start_color);
        assert_eq!(config.cursor_visibility(), None);
        assert!(config.mouse_mask().is_empty());
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [input]
            raw = true

            [display]
            cursor = "Very-Visible"
            "#,
        )
        .unwrap();
        assert!(config.input.raw);
        assert!(config.input.nl);
        assert_eq!(config.cursor_visibility(), Some(CursorVisibility::VeryVisible));
    }

    #[test]
    fn test_color_pairs() {
        let config = Config::from_toml_str(
            r#"
            [[colors.pairs]]
            id = 2
            fg = "Cyan"
            bg = "12"

            [[colors.pairs]]
            id = 3
            fg = "mauve"
            bg = "black"
            "#,
        )
        .unwrap();
        assert_eq!(config.colors.pairs.len(), 2);
        assert_eq!(config.colors.pairs[0].colors(), Some((Color::CYAN, Color(12))));
        assert_eq!(config.colors.pairs[1].colors(), None);
    }

    #[test]
    fn test_mouse_event_names() {
        let config = Config::from_toml_str(
            r#"
            [mouse]
            events = ["BUTTON1_CLICKED", "b3_pressed", "REPORT_MOUSE_POSITION", "BUTTON9_PRESSED"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.mouse_mask(),
            MouseMask::B1_CLICKED | MouseMask::B3_PRESSED | MouseMask::POSITION
        );

        let all = Config::from_toml_str("[mouse]\nevents = [\"ALL_MOUSE_EVENTS\"]").unwrap();
        assert_eq!(all.mouse_mask(), MouseMask::ALL);
    }

    #[test]
    fn test_malformed_file_reports_error() {
        assert!(Config::from_toml_str("[input]\nraw = \"yes\"").is_err());
        assert!(Config::from_toml_str("[[colors.pairs]]\nid = 1").is_err());
    }
}
