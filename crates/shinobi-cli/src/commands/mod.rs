//! CLI command implementations.

pub mod dump;
pub mod exec;
pub mod offsets;
pub mod run;
pub mod status;

use anyhow::{Context, Result};
use shinobi::{
    CommandDispatcher, GameStateModifier, GameVersion, ModifierConfig, SystemProcessProvider,
    TARGET_PROCESS,
};
use tracing::error;

/// Options shared by every command that attaches to the game
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachOptions {
    pub game_version: Option<GameVersion>,
    pub verify_version: bool,
    /// From `[settings] nudge`; the library default applies when unset
    pub nudge_step: Option<f32>,
}

impl AttachOptions {
    fn modifier_config(self) -> ModifierConfig {
        let mut builder = ModifierConfig::builder().verify_version(self.verify_version);
        if let Some(version) = self.game_version {
            builder = builder.version(version);
        }
        if let Some(step) = self.nudge_step {
            builder = builder.nudge_step(step);
        }
        builder.build()
    }
}

/// Attach to the game. Failure is fatal for every command.
pub fn attach(options: AttachOptions) -> Result<CommandDispatcher<SystemProcessProvider>> {
    let modifier =
        GameStateModifier::attach_with_config(SystemProcessProvider, options.modifier_config())
            .inspect_err(|e| {
                if e.is_version_mismatch() {
                    error!("Unsupported {} build: {}", TARGET_PROCESS, e);
                } else {
                    error!("Could not attach to {}: {}", TARGET_PROCESS, e);
                }
            })
            .with_context(|| format!("Failed to attach to {}", TARGET_PROCESS))?;

    Ok(CommandDispatcher::new(modifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_config_from_options() {
        let config = AttachOptions {
            game_version: Some(GameVersion::V1_03_0),
            verify_version: false,
            nudge_step: Some(2.5),
        }
        .modifier_config();
        assert_eq!(config.version, Some(GameVersion::V1_03_0));
        assert!(!config.verify_version);
        assert_eq!(config.nudge_step, 2.5);

        let config = AttachOptions {
            game_version: None,
            verify_version: true,
            nudge_step: None,
        }
        .modifier_config();
        assert_eq!(config, ModifierConfig::default());
    }
}
