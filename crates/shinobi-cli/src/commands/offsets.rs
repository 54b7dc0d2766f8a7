//! Offsets command implementation.

use anyhow::{Result, anyhow};
use shinobi::memory::layout::DEFAULT_IMAGE_BASE;
use shinobi::{GameVersion, OffsetDump, OffsetTable};

/// Parse a hex address string (with or without 0x prefix).
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(s, 16).map_err(|e| anyhow!("Invalid hex address: {}", e))
}

/// Build the table for a version without attaching to the game
pub fn describe(version: Option<GameVersion>, base: Option<&str>) -> Result<OffsetDump> {
    let version = version.unwrap_or_else(GameVersion::latest);
    let base = base.map(parse_hex_address).transpose()?.unwrap_or(DEFAULT_IMAGE_BASE);
    let table = OffsetTable::new(version, base)?;
    Ok(OffsetDump::from_table(&table))
}

/// Run the offsets command
pub fn run(version: Option<GameVersion>, base: Option<&str>) -> Result<()> {
    let dump = describe(version, base)?;
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}
