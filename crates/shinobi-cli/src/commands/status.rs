//! Status command implementation.

use anyhow::Result;
use tracing::debug;

use super::AttachOptions;
use crate::render;

/// Run the status command
pub fn run(options: AttachOptions, json: bool) -> Result<()> {
    let mut dispatcher = super::attach(options)?;

    let flags = dispatcher.query_flags()?;
    let position = dispatcher.query_position()?;
    let igt = dispatcher
        .query_igt()
        .map_err(|e| debug!("IGT unavailable: {}", e))
        .ok();

    if json {
        println!("{}", render::status_json(&flags, &position, igt)?);
        return Ok(());
    }

    println!("sekiro.exe {}", dispatcher.modifier().version());
    for line in render::format_flags(&flags)
        .into_iter()
        .chain(render::format_position(&position))
        .chain(std::iter::once(render::format_igt(igt)))
    {
        println!("  {}", line);
    }
    Ok(())
}
