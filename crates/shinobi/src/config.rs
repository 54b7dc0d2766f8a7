//! Configuration for the game state modifier.

use crate::offset::GameVersion;

/// Default vertical distance moved by one nudge
pub const DEFAULT_NUDGE_STEP: f32 = 1.0;

/// Configuration for GameStateModifier
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierConfig {
    /// Use this build's offset table instead of detecting it
    pub version: Option<GameVersion>,
    /// Compare a forced version against the executable's version resource
    pub verify_version: bool,
    /// Distance added to or taken from y by the nudge operations
    pub nudge_step: f32,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            version: None,
            verify_version: true,
            nudge_step: DEFAULT_NUDGE_STEP,
        }
    }
}

impl ModifierConfig {
    /// Create a new configuration builder
    pub fn builder() -> ModifierConfigBuilder {
        ModifierConfigBuilder::default()
    }
}

/// Builder for ModifierConfig
#[derive(Debug, Clone, Default)]
pub struct ModifierConfigBuilder {
    version: Option<GameVersion>,
    verify_version: Option<bool>,
    nudge_step: Option<f32>,
}

impl ModifierConfigBuilder {
    /// Force a game build
    pub fn version(mut self, version: GameVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Enable or disable the version resource check for a forced build
    pub fn verify_version(mut self, enabled: bool) -> Self {
        self.verify_version = Some(enabled);
        self
    }

    /// Distance moved by one nudge up or down
    pub fn nudge_step(mut self, step: f32) -> Self {
        self.nudge_step = Some(step);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ModifierConfig {
        let default = ModifierConfig::default();
        ModifierConfig {
            version: self.version.or(default.version),
            verify_version: self.verify_version.unwrap_or(default.verify_version),
            nudge_step: self.nudge_step.unwrap_or(default.nudge_step),
        }
    }
}
