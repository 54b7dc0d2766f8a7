use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// A base address followed by dereference offsets.
///
/// Resolution reads a pointer at the current address, adds the next offset,
/// and repeats. The final address is never cached because the objects along
/// the chain can be freed and reallocated between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointerChain {
    base: u64,
    offsets: Vec<u64>,
}

impl PointerChain {
    /// Create a chain. At least one offset is required, otherwise it would be a
    /// plain absolute address.
    pub fn new(base: u64, offsets: impl Into<Vec<u64>>) -> Result<Self> {
        let offsets = offsets.into();
        if offsets.is_empty() {
            return Err(Error::InvalidOffset(format!(
                "pointer chain at {:#x} has no offsets",
                base
            )));
        }
        Ok(Self { base, offsets })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Walk the chain against live memory
    pub fn resolve<R: ReadMemory>(&self, reader: &R) -> Result<u64> {
        let mut address = self.base;
        for (depth, offset) in self.offsets.iter().enumerate() {
            let pointer = reader.read_pointer(address)?;
            if pointer == 0 {
                return Err(Error::NullPointer { depth, address });
            }
            address = pointer.wrapping_add(*offset);
        }
        trace!("Resolved chain {} -> {:#x}", self, address);
        Ok(address)
    }
}

impl std::fmt::Display for PointerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[0x{:X}", self.base)?;
        for offset in &self.offsets {
            write!(f, ", 0x{:X}", offset)?;
        }
        write!(f, "]")
    }
}
