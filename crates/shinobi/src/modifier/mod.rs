//! Game state modifier: the owner of the process binding.
//!
//! `GameStateModifier` holds:
//! - the binding to `sekiro.exe` and the provider used to reacquire it
//! - the offset table for the attached build
//! - the single position snapshot
//!
//! Besides the flag toggles it can quit out, save and restore the player
//! position, nudge the player vertically and read the in-game timer.
//!
//! ## Example
//!
//! ```ignore
//! use shinobi::{GameStateModifier, SystemProcessProvider};
//!
//! let mut modifier = GameStateModifier::attach(SystemProcessProvider)?;
//! modifier.ensure_attached()?;
//! let hidden = modifier.toggle_stealth()?;
//! ```

mod position;
mod toggle;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use position::{Position, PositionReport};

use crate::config::ModifierConfig;
use crate::error::{Error, Result};
use crate::memory::layout::quitout;
use crate::memory::{ProcessBinding, ProcessProvider, ReadMemory, TARGET_PROCESS, WriteMemory};
use crate::offset::{GameVersion, OffsetTable};

/// Bit 0 of every flag word in the table, read without modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlagStates {
    pub render_world: bool,
    pub debug_render0: bool,
    pub debug_render8: bool,
    pub player_hide: bool,
    pub all_no_update_ai: bool,
    pub all_no_damage: bool,
    pub no_goods_consume: bool,
    pub no_resource_item_consume: bool,
}

/// Owns the binding to the target process and applies patches through it
pub struct GameStateModifier<P: ProcessProvider> {
    provider: P,
    config: ModifierConfig,
    binding: P::Binding,
    table: OffsetTable,
    snapshot: Option<Position>,
}

impl<P: ProcessProvider> GameStateModifier<P> {
    /// Attach with default configuration (build detected from the executable)
    pub fn attach(provider: P) -> Result<Self> {
        Self::attach_with_config(provider, ModifierConfig::default())
    }

    /// Attach to the target process. Failure here is fatal for the caller:
    /// there is no retry at startup.
    pub fn attach_with_config(provider: P, config: ModifierConfig) -> Result<Self> {
        let binding = provider.attach(TARGET_PROCESS)?;
        let table = Self::build_table(&binding, &config)?;

        info!(
            "Attached to {} (PID: {}, base: 0x{:X}, version: {})",
            TARGET_PROCESS,
            binding.pid(),
            binding.base_address(),
            table.version
        );

        Ok(Self {
            provider,
            config,
            binding,
            table,
            snapshot: None,
        })
    }

    fn build_table(binding: &P::Binding, config: &ModifierConfig) -> Result<OffsetTable> {
        let version = Self::detect_version(binding, config)?;
        OffsetTable::new(version, binding.base_address())
    }

    fn detect_version(binding: &P::Binding, config: &ModifierConfig) -> Result<GameVersion> {
        let Some(forced) = config.version else {
            return GameVersion::try_from(binding.file_version()?);
        };

        if config.verify_version {
            match binding.file_version().and_then(GameVersion::try_from) {
                Ok(detected) if detected != forced => warn!(
                    "Forced version {} but executable reports {}; offsets may be wrong",
                    forced, detected
                ),
                Ok(_) => {}
                Err(e) => warn!("Could not verify forced version {}: {}", forced, e),
            }
        }
        Ok(forced)
    }

    /// Reattachment guard, run before every dispatched operation.
    ///
    /// A live binding costs one liveness check. A stale one gets exactly one
    /// reacquisition attempt; if that fails the caller must not touch memory.
    /// A process that comes back as a build without offsets counts as a failed
    /// reacquisition, and the old binding and table stay in place.
    pub fn ensure_attached(&mut self) -> Result<()> {
        if self.binding.is_alive() {
            return Ok(());
        }

        warn!(
            "Lost {} (PID: {}), reattaching...",
            TARGET_PROCESS,
            self.binding.pid()
        );

        let binding = self
            .provider
            .attach(TARGET_PROCESS)
            .map_err(|e| Error::TargetUnavailable(e.to_string()))?;
        let table = Self::build_table(&binding, &self.config).map_err(|e| {
            Error::TargetUnavailable(format!(
                "{} (PID: {}) is back but unusable: {}",
                TARGET_PROCESS,
                binding.pid(),
                e
            ))
        })?;

        info!(
            "Reattached to {} (PID: {}, base: 0x{:X}, version: {})",
            TARGET_PROCESS,
            binding.pid(),
            binding.base_address(),
            table.version
        );
        self.binding = binding;
        self.table = table;
        Ok(())
    }

    pub fn toggle_collision_meshes(&mut self) -> Result<bool> {
        toggle::toggle_collision(
            &self.binding,
            self.table.render_world,
            self.table.debug_render0,
            self.table.debug_render8,
        )
    }

    pub fn toggle_stealth(&mut self) -> Result<bool> {
        toggle::toggle_flag(&self.binding, self.table.player_hide)
    }

    pub fn toggle_ai(&mut self) -> Result<bool> {
        toggle::toggle_flag(&self.binding, self.table.all_no_update_ai)
    }

    pub fn toggle_no_damage(&mut self) -> Result<bool> {
        toggle::toggle_flag(&self.binding, self.table.all_no_damage)
    }

    pub fn toggle_consume(&mut self) -> Result<bool> {
        toggle::toggle_flag(&self.binding, self.table.no_goods_consume)
    }

    /// Request a return to the title screen
    pub fn quitout(&mut self) -> Result<()> {
        let address = self.table.quitout.resolve(&self.binding)?;
        self.binding.write_u8(address, quitout::TRIGGER)
    }

    /// Snapshot the player position, replacing any previous snapshot
    pub fn save_position(&mut self) -> Result<()> {
        let base = self.table.position.resolve(&self.binding)?;
        let position = Position::read(&self.binding, base)?;
        debug!("Saved position {}", position);
        self.snapshot = Some(position);
        Ok(())
    }

    /// Restore the snapshot at a freshly resolved address. No-op without one.
    pub fn load_position(&mut self) -> Result<()> {
        let Some(saved) = self.snapshot else {
            debug!("No saved position, nothing to load");
            return Ok(());
        };

        let base = self.table.position.resolve(&self.binding)?;
        saved.write(&self.binding, base)?;
        debug!("Loaded position {}", saved);
        Ok(())
    }

    /// Raise the player by the configured nudge step
    pub fn nudge_up(&mut self) -> Result<()> {
        self.nudge(self.config.nudge_step)
    }

    /// Lower the player by the configured nudge step
    pub fn nudge_down(&mut self) -> Result<()> {
        self.nudge(-self.config.nudge_step)
    }

    fn nudge(&mut self, delta: f32) -> Result<()> {
        let base = self.table.position.resolve(&self.binding)?;
        let y = position::shift_y(&self.binding, base, delta)?;
        debug!("Nudged y by {} to {}", delta, y);
        Ok(())
    }

    /// In-game time in milliseconds
    pub fn igt(&self) -> Result<u32> {
        let address = self.table.igt.resolve(&self.binding)?;
        self.binding.read_u32(address)
    }

    pub fn flag_states(&self) -> Result<FlagStates> {
        let read = |address| toggle::read_flag(&self.binding, address);
        Ok(FlagStates {
            render_world: read(self.table.render_world)?,
            debug_render0: read(self.table.debug_render0)?,
            debug_render8: read(self.table.debug_render8)?,
            player_hide: read(self.table.player_hide)?,
            all_no_update_ai: read(self.table.all_no_update_ai)?,
            all_no_damage: read(self.table.all_no_damage)?,
            no_goods_consume: read(self.table.no_goods_consume)?,
            no_resource_item_consume: read(self.table.no_resource_item_consume)?,
        })
    }

    pub fn position_report(&self) -> PositionReport {
        let current = self
            .table
            .position
            .resolve(&self.binding)
            .and_then(|base| Position::read(&self.binding, base))
            .map_err(|e| debug!("Current position unavailable: {}", e))
            .ok();

        PositionReport {
            current,
            saved: self.snapshot,
        }
    }

    pub fn snapshot(&self) -> Option<Position> {
        self.snapshot
    }

    pub fn binding(&self) -> &P::Binding {
        &self.binding
    }

    pub fn table(&self) -> &OffsetTable {
        &self.table
    }

    pub fn version(&self) -> GameVersion {
        self.table.version
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
