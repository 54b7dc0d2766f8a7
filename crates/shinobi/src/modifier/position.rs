use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::memory::layout::position::{X, Y, Z};
use crate::memory::{ReadMemory, WriteMemory};

/// Player position in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Read x, y, z from `base`, `base + 4` and `base + 8`
    pub fn read<R: ReadMemory>(reader: &R, base: u64) -> Result<Self> {
        Ok(Self {
            x: reader.read_f32(base + X)?,
            y: reader.read_f32(base + Y)?,
            z: reader.read_f32(base + Z)?,
        })
    }

    /// Write x, y, z back to `base`.
    ///
    /// The live triple is read first. If a component write fails, the
    /// components already written get their live values back, so the player
    /// is never left at a mix of the two positions.
    pub fn write<M: ReadMemory + WriteMemory>(&self, memory: &M, base: u64) -> Result<()> {
        let live = Self::read(memory, base)?;
        let addresses = [base + X, base + Y, base + Z];
        let next = [self.x, self.y, self.z];

        for (i, (&address, &value)) in addresses.iter().zip(next.iter()).enumerate() {
            if let Err(e) = memory.write_f32(address, value) {
                let original = [live.x, live.y, live.z];
                for (&address, &value) in addresses[..i].iter().zip(&original[..i]).rev() {
                    if let Err(e) = memory.write_f32(address, value) {
                        warn!("Rollback of position at 0x{:X} failed: {}", address, e);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Add `delta` to the y component at `base`, returning the new value
pub(crate) fn shift_y<M: ReadMemory + WriteMemory>(
    memory: &M,
    base: u64,
    delta: f32,
) -> Result<f32> {
    let y = memory.read_f32(base + Y)? + delta;
    memory.write_f32(base + Y, y)?;
    Ok(y)
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x {:12.5}  y {:12.5}  z {:12.5}", self.x, self.y, self.z)
    }
}

/// Live position next to the saved snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionReport {
    /// None when the position chain can't be resolved (e.g. on the title screen)
    pub current: Option<Position>,
    pub saved: Option<Position>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemory;

    #[test]
    fn test_read_consecutive_floats() {
        let memory = MockMemory::builder()
            .f32_at(0x1000, 1.5)
            .f32_at(0x1004, -20.25)
            .f32_at(0x1008, 300.0)
            .build();

        let pos = Position::read(&memory, 0x1000).unwrap();
        assert_eq!(
            pos,
            Position {
                x: 1.5,
                y: -20.25,
                z: 300.0
            }
        );
    }

    #[test]
    fn test_write_consecutive_floats() {
        let memory = MockMemory::builder()
            .f32_at(0x2000, 0.0)
            .f32_at(0x2004, 0.0)
            .f32_at(0x2008, 0.0)
            .build();
        let pos = Position {
            x: 4.0,
            y: 5.0,
            z: 6.0,
        };
        pos.write(&memory, 0x2000).unwrap();

        assert_eq!(memory.written_addresses(), vec![0x2000, 0x2004, 0x2008]);
        assert_eq!(memory.get_f32(0x2004), 5.0);
    }

    #[test]
    fn test_failed_write_restores_live_position() {
        let memory = MockMemory::builder()
            .f32_at(0x2000, 1.0)
            .f32_at(0x2004, 2.0)
            .f32_at(0x2008, 3.0)
            .build();
        memory.fail_writes_at(0x2008);

        let target = Position {
            x: 40.0,
            y: 50.0,
            z: 60.0,
        };
        let err = target.write(&memory, 0x2000).unwrap_err();
        assert!(matches!(err, crate::error::Error::MemoryWriteFailed { address: 0x2008, .. }));

        assert_eq!(
            Position::read(&memory, 0x2000).unwrap(),
            Position {
                x: 1.0,
                y: 2.0,
                z: 3.0
            }
        );
        // x and y written, then restored newest first
        assert_eq!(
            memory.written_addresses(),
            vec![0x2000, 0x2004, 0x2004, 0x2000]
        );
    }

    #[test]
    fn test_unreadable_position_is_not_written() {
        let memory = MockMemory::builder().f32_at(0x2000, 1.0).build();
        let target = Position {
            x: 4.0,
            y: 5.0,
            z: 6.0,
        };
        assert!(target.write(&memory, 0x2000).is_err());
        assert_eq!(memory.writes(), 0);
    }
}
