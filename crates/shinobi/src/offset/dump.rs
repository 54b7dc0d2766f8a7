use std::fs;
use std::path::Path;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::error::Result;
use crate::memory::ReadMemory;
use crate::memory::layout::flag;
use crate::offset::{Field, OffsetTable, Target};

/// Offset dump for diagnostic purposes
#[derive(Debug, Clone, Serialize)]
pub struct OffsetDump {
    pub version: String,
    pub module_base: String,
    pub entries: Vec<EntryDump>,
}

/// One table entry, in hex string format
#[derive(Debug, Clone, Serialize)]
pub struct EntryDump {
    pub field: Field,
    /// Absolute address, or the chain as `[base, off, ...]`
    pub location: String,
    /// Final address after chain resolution (absent when not read from memory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    /// Bytes at the resolved address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
}

impl OffsetDump {
    /// Describe a table without touching memory
    pub fn from_table(table: &OffsetTable) -> Self {
        let entries = Field::iter()
            .map(|field| EntryDump {
                field,
                location: Self::location(&table.entry(field)),
                resolved: None,
                sample: None,
            })
            .collect();

        Self {
            version: table.version.to_string(),
            module_base: format!("0x{:X}", table.module_base),
            entries,
        }
    }

    /// Describe a table and sample memory at every entry
    pub fn collect<R: ReadMemory>(table: &OffsetTable, reader: &R) -> Self {
        let mut dump = Self::from_table(table);

        for entry in &mut dump.entries {
            match table.entry(entry.field).resolve(reader) {
                Ok(address) => {
                    entry.resolved = Some(format!("0x{:X}", address));
                    entry.sample = Some(Self::read_memory_hex(reader, address, flag::WORD));
                }
                Err(e) => entry.resolved = Some(format!("(unresolved: {})", e)),
            }
        }

        dump
    }

    fn location(target: &Target) -> String {
        match target {
            Target::Absolute(address) => format!("0x{:X}", address),
            Target::Chain(chain) => chain.to_string(),
        }
    }

    fn read_memory_hex<R: ReadMemory>(reader: &R, address: u64, size: usize) -> String {
        match reader.read_bytes(address, size) {
            Ok(bytes) => bytes
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => "(read failed)".to_string(),
        }
    }

    /// Save dump to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
