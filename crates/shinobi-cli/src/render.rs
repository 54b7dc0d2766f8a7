//! Terminal output for notifications and status.

use std::io::{self, Write};

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use shinobi::{FlagStates, Notification, NotificationSink, Operation, PositionReport};
use tracing::warn;

use crate::config::Hotkey;

const LABEL_WIDTH: usize = 18;

/// Prints notifications as colored lines or JSON lines
pub struct Renderer<W: Write> {
    out: W,
    json: bool,
}

impl Renderer<io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json)
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }
}

impl<W: Write> NotificationSink for Renderer<W> {
    fn notify(&mut self, notification: Notification) {
        let line = if self.json {
            match serde_json::to_string(&notification) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to serialize notification: {}", e);
                    return;
                }
            }
        } else {
            format_notification(&notification)
        };

        if let Err(e) = self.write_line(&line) {
            warn!("Failed to print notification: {}", e);
        }
    }
}

fn on_off(value: bool) -> String {
    if value {
        "ON".green().bold().to_string()
    } else {
        "OFF".red().to_string()
    }
}

/// The collision toggle reports world rendering, not the meshes themselves
pub fn format_notification(notification: &Notification) -> String {
    let state = on_off(notification.value);
    match notification.flag {
        Operation::ToggleCollisionMeshes => format!(
            "{:<LABEL_WIDTH$} world rendering {}",
            notification.flag.label(),
            state
        ),
        flag => format!("{:<LABEL_WIDTH$} {}", flag.label(), state),
    }
}

pub fn format_flags(states: &FlagStates) -> Vec<String> {
    [
        ("World Rendering", states.render_world),
        ("Debug Render #0", states.debug_render0),
        ("Debug Render #8", states.debug_render8),
        (Operation::ToggleStealth.label(), states.player_hide),
        (Operation::ToggleAi.label(), states.all_no_update_ai),
        (Operation::ToggleNoDamage.label(), states.all_no_damage),
        (Operation::ToggleConsume.label(), states.no_goods_consume),
        ("Resource Consume", states.no_resource_item_consume),
    ]
    .into_iter()
    .map(|(label, value)| format!("{:<LABEL_WIDTH$} {}", label, on_off(value)))
    .collect()
}

pub fn format_position(report: &PositionReport) -> Vec<String> {
    let current = match report.current {
        Some(position) => position.to_string(),
        None => "(unavailable)".dimmed().to_string(),
    };
    let saved = match report.saved {
        Some(position) => position.to_string(),
        None => "(none)".dimmed().to_string(),
    };
    vec![
        format!("{:<LABEL_WIDTH$} {}", "Position", current),
        format!("{:<LABEL_WIDTH$} {}", "Position [saved]", saved),
    ]
}

/// `IGT hh:mm:ss.cc`, as the in-game timer is usually shown
pub fn format_igt(igt: Option<u32>) -> String {
    let value = match igt {
        Some(ms) => {
            let centis = (ms % 1000) / 10;
            let total_seconds = ms / 1000;
            format!(
                "{:02}:{:02}:{:02}.{:02}",
                total_seconds / 3600,
                total_seconds / 60 % 60,
                total_seconds % 60,
                centis
            )
        }
        None => "(unavailable)".dimmed().to_string(),
    };
    format!("{:<LABEL_WIDTH$} {}", "IGT", value)
}

pub fn format_bindings(bindings: &[(Hotkey, Operation)]) -> Vec<String> {
    bindings
        .iter()
        .map(|(key, op)| format!("  {:>3}  {}", key.to_string().cyan(), op.label()))
        .collect()
}

#[derive(Serialize)]
struct StatusJson<'a> {
    flags: &'a FlagStates,
    position: &'a PositionReport,
    igt_ms: Option<u32>,
}

pub fn status_json(
    states: &FlagStates,
    report: &PositionReport,
    igt: Option<u32>,
) -> Result<String> {
    Ok(serde_json::to_string_pretty(&StatusJson {
        flags: states,
        position: report,
        igt_ms: igt,
    })?)
}
