//! Shell configuration file.
//!
//! ```toml
//! [settings]
//! log_level = "debug"
//! json_notifications = false
//! nudge = 0.5
//!
//! [hotkeys]
//! F1 = "toggle-collision-meshes"
//! F2 = "toggle-stealth"
//! p = "save-position"
//! ```
//!
//! A `[hotkeys]` table replaces the default bindings entirely.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::KeyCode;
use serde::Deserialize;
use shinobi::Operation;
use strum::IntoEnumIterator;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_CONFIG_FILE: &str = "shinobi.toml";

/// Keys that quit the shell and cannot be bound
const RESERVED: [char; 1] = ['q'];

/// A bindable key: `F1`..`F12` or a single printable character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hotkey {
    Function(u8),
    Char(char),
}

impl Hotkey {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::F(n) => Some(Hotkey::Function(n)),
            KeyCode::Char(c) => Some(Hotkey::Char(c.to_ascii_lowercase())),
            _ => None,
        }
    }
}

impl FromStr for Hotkey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                let c = c.to_ascii_lowercase();
                if RESERVED.contains(&c) {
                    Err(format!("'{}' is reserved for quit", c))
                } else if c.is_whitespace() || c.is_control() {
                    Err("whitespace and control characters cannot be bound".to_string())
                } else {
                    Ok(Hotkey::Char(c))
                }
            }
            (Some('F' | 'f'), Some(_)) => match s[1..].parse::<u8>() {
                Ok(n @ 1..=12) => Ok(Hotkey::Function(n)),
                _ => Err(format!("unknown key name {:?}", s)),
            },
            _ => Err(format!("unknown key name {:?}", s)),
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hotkey::Function(n) => write!(f, "F{}", n),
            Hotkey::Char(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Level for the `shinobi` targets (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: Option<String>,
    /// Print notifications as JSON lines instead of colored text
    pub json_notifications: bool,
    /// Distance moved by `nudge-up` / `nudge-down`
    pub nudge: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    settings: Settings,
    hotkeys: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub settings: Settings,
    pub hotkeys: Vec<(Hotkey, Operation)>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            hotkeys: default_hotkeys(),
        }
    }
}

/// F1..F10 in operation order
fn default_hotkeys() -> Vec<(Hotkey, Operation)> {
    Operation::iter()
        .zip(1u8..)
        .map(|(op, n)| (Hotkey::Function(n), op))
        .collect()
}

impl ShellConfig {
    /// Load from `path`. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
            .map(Some)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).context("Failed to parse TOML")?;

        if let Some(level) = &raw.settings.log_level {
            LevelFilter::from_str(level)
                .map_err(|e| anyhow!("settings.log_level: {} ({:?})", e, level))?;
        }
        if let Some(step) = raw.settings.nudge.filter(|s| !(s.is_finite() && *s > 0.0)) {
            bail!("settings.nudge: must be a positive distance, got {}", step);
        }

        let hotkeys = match raw.hotkeys {
            Some(table) => parse_hotkeys(&table)?,
            None => default_hotkeys(),
        };

        Ok(Self {
            settings: raw.settings,
            hotkeys,
        })
    }

    pub fn lookup(&self, key: Hotkey) -> Option<Operation> {
        self.hotkeys
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, op)| *op)
    }
}

fn parse_hotkeys(table: &BTreeMap<String, String>) -> Result<Vec<(Hotkey, Operation)>> {
    let mut hotkeys: Vec<(Hotkey, Operation)> = Vec::with_capacity(table.len());

    for (key, name) in table {
        let hotkey = Hotkey::from_str(key).map_err(|e| anyhow!("hotkeys.{}: {}", key, e))?;
        let op = Operation::from_str(name)
            .map_err(|_| anyhow!("hotkeys.{}: unknown operation {:?}", key, name))?;

        if hotkeys.iter().any(|(bound, _)| *bound == hotkey) {
            bail!("hotkeys.{}: key {} is bound twice", key, hotkey);
        }
        hotkeys.push((hotkey, op));
    }

    hotkeys.sort_by_key(|(hotkey, _)| *hotkey);
    Ok(hotkeys)
}
