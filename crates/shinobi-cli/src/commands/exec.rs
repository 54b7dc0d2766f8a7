//! Exec command implementation.

use anyhow::{Context, Result};
use shinobi::{CommandDispatcher, NotificationSink, Operation, ProcessProvider};
use tracing::warn;

use super::AttachOptions;
use crate::render::Renderer;

/// Run the exec command
pub fn run(options: AttachOptions, commands: &[String], json: bool) -> Result<()> {
    let mut dispatcher = super::attach(options)?;
    let mut renderer = Renderer::stdout(json);
    execute_all(&mut dispatcher, commands, &mut renderer)
}

/// Dispatch each command in order. A lost target is logged and the
/// remaining commands still run; other failures stop the sequence.
pub fn execute_all<P: ProcessProvider, S: NotificationSink>(
    dispatcher: &mut CommandDispatcher<P>,
    commands: &[String],
    sink: &mut S,
) -> Result<()> {
    for name in commands {
        if name.parse::<Operation>().is_err() {
            warn!("Unknown command {:?}, skipping", name);
        }

        match dispatcher.dispatch(name, sink) {
            Ok(()) => {}
            Err(e) if e.is_unavailable() => warn!("{}: {}", name, e),
            Err(e) => return Err(e).with_context(|| format!("Command {} failed", name)),
        }
    }
    Ok(())
}
