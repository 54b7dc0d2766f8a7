//! Named operations and their dispatch.
//!
//! Every operation the shell can trigger is an [`Operation`]. Each one maps
//! to a [`Handler`] that declares whether it produces a boolean result (and
//! so a [`Notification`]) or runs for its side effect only.

mod dispatcher;
mod notification;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub use dispatcher::CommandDispatcher;
pub use notification::{Notification, NotificationSink};

use crate::error::Result;
use crate::memory::ProcessProvider;
use crate::modifier::GameStateModifier;

/// Operations addressable by name (`toggle-stealth`, `quitout`, ...)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    ToggleCollisionMeshes,
    ToggleStealth,
    ToggleAi,
    ToggleNoDamage,
    ToggleConsume,
    SavePosition,
    LoadPosition,
    Quitout,
    NudgeUp,
    NudgeDown,
}

impl Operation {
    /// Human-readable label for the shell
    pub fn label(self) -> &'static str {
        match self {
            Operation::ToggleCollisionMeshes => "Collision Meshes",
            Operation::ToggleStealth => "Stealth",
            Operation::ToggleAi => "AI Freeze",
            Operation::ToggleNoDamage => "No Damage",
            Operation::ToggleConsume => "Consume",
            Operation::Quitout => "Quitout",
            Operation::SavePosition => "Save Position",
            Operation::LoadPosition => "Load Position",
            Operation::NudgeUp => "Nudge Up",
            Operation::NudgeDown => "Nudge Down",
        }
    }

    pub fn handler<P: ProcessProvider>(self) -> Handler<P> {
        match self {
            Operation::ToggleCollisionMeshes => {
                Handler::Flag(GameStateModifier::toggle_collision_meshes)
            }
            Operation::ToggleStealth => Handler::Flag(GameStateModifier::toggle_stealth),
            Operation::ToggleAi => Handler::Flag(GameStateModifier::toggle_ai),
            Operation::ToggleNoDamage => Handler::Flag(GameStateModifier::toggle_no_damage),
            Operation::ToggleConsume => Handler::Flag(GameStateModifier::toggle_consume),
            Operation::Quitout => Handler::Action(GameStateModifier::quitout),
            Operation::SavePosition => Handler::Action(GameStateModifier::save_position),
            Operation::LoadPosition => Handler::Action(GameStateModifier::load_position),
            Operation::NudgeUp => Handler::Action(GameStateModifier::nudge_up),
            Operation::NudgeDown => Handler::Action(GameStateModifier::nudge_down),
        }
    }

    /// Whether the operation reports a notification
    pub fn is_flag(self) -> bool {
        !matches!(
            self,
            Operation::Quitout
                | Operation::SavePosition
                | Operation::LoadPosition
                | Operation::NudgeUp
                | Operation::NudgeDown
        )
    }
}

/// Result shape of an operation
pub enum Handler<P: ProcessProvider> {
    /// Produces the new flag state, reported as a notification
    Flag(fn(&mut GameStateModifier<P>) -> Result<bool>),
    /// Side effect only
    Action(fn(&mut GameStateModifier<P>) -> Result<()>),
}

impl<P: ProcessProvider> Clone for Handler<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ProcessProvider> Copy for Handler<P> {}

impl<P: ProcessProvider> std::fmt::Debug for Handler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Flag(_) => f.write_str("Handler::Flag"),
            Handler::Action(_) => f.write_str("Handler::Action"),
        }
    }
}
