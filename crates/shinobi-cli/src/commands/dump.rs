//! Dump command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use shinobi::{OffsetDump, ProcessBinding};

use super::AttachOptions;

/// Run the dump command
pub fn run(options: AttachOptions, output: Option<&Path>) -> Result<()> {
    let dispatcher = super::attach(options)?;
    let modifier = dispatcher.modifier();

    println!(
        "Found process (PID: {}, Base: 0x{:X}, Version: {})",
        modifier.binding().pid(),
        modifier.binding().base_address(),
        modifier.version()
    );

    let dump = OffsetDump::collect(modifier.table(), modifier.binding());

    match output {
        Some(path) => {
            dump.save(path)
                .with_context(|| format!("Failed to write dump to {}", path.display()))?;
            println!("Dump saved to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&dump)?),
    }

    Ok(())
}
