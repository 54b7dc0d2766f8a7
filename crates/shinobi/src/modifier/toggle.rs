//! Bit 0 toggles on 32-bit flag words.

use tracing::{trace, warn};

use crate::error::Result;
use crate::memory::layout::flag::BIT;
use crate::memory::{ReadMemory, WriteMemory};

/// Invert bit 0, returning the new word and the new bit state
fn flip(word: u32) -> (u32, bool) {
    if word & BIT != 0 {
        (word & !BIT, false)
    } else {
        (word | BIT, true)
    }
}

/// Read-modify-write a single flag word. Returns the bit state after the write.
pub(crate) fn toggle_flag<M: ReadMemory + WriteMemory>(memory: &M, address: u64) -> Result<bool> {
    let word = memory.read_u32(address)?;
    let (next, state) = flip(word);
    memory.write_u32(address, next)?;
    trace!("Flag at 0x{:X}: 0x{:08X} -> 0x{:08X}", address, word, next);
    Ok(state)
}

/// Read bit 0 of a flag word without modifying it
pub(crate) fn read_flag<R: ReadMemory>(memory: &R, address: u64) -> Result<bool> {
    Ok(memory.read_u32(address)? & BIT != 0)
}

/// Toggle collision mesh rendering across the render-world word and the two
/// debug-render words.
///
/// If render-world bit 0 is set, meshes are turned on: clear it and set bit 0
/// of both debug words. Otherwise all three are inverted the other way.
/// Returns render-world bit 0 after the write.
///
/// All words are read before anything is written. When a write fails the
/// words already written are restored to their original values and the
/// write error is returned.
pub(crate) fn toggle_collision<M: ReadMemory + WriteMemory>(
    memory: &M,
    render_world: u64,
    debug_render0: u64,
    debug_render8: u64,
) -> Result<bool> {
    let addresses = [render_world, debug_render0, debug_render8];
    let original = [
        memory.read_u32(render_world)?,
        memory.read_u32(debug_render0)?,
        memory.read_u32(debug_render8)?,
    ];

    let next = if original[0] & BIT != 0 {
        [original[0] & !BIT, original[1] | BIT, original[2] | BIT]
    } else {
        [original[0] | BIT, original[1] & !BIT, original[2] & !BIT]
    };

    for (i, (&address, &value)) in addresses.iter().zip(next.iter()).enumerate() {
        if let Err(e) = memory.write_u32(address, value) {
            rollback(memory, &addresses[..i], &original[..i]);
            return Err(e);
        }
    }

    Ok(next[0] & BIT != 0)
}

fn rollback<W: WriteMemory>(memory: &W, addresses: &[u64], values: &[u32]) {
    for (&address, &value) in addresses.iter().zip(values).rev() {
        if let Err(e) = memory.write_u32(address, value) {
            warn!("Rollback of 0x{:X} failed: {}", address, e);
        }
    }
}
