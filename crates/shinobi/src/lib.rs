//! # shinobi
//!
//! Core library for the shinobi live memory patcher.
//!
//! This crate provides:
//! - Windows process memory access for a single named target (`sekiro.exe`)
//! - Versioned offset tables with static addresses and pointer chains
//! - Bit-flag toggles, position save/load/nudge and the in-game timer
//!   (`GameStateModifier`)
//! - Named command dispatch with flag-change notifications

pub mod command;
pub mod config;
pub mod error;
pub mod memory;
pub mod modifier;
pub mod offset;

pub use command::{CommandDispatcher, Handler, Notification, NotificationSink, Operation};
pub use config::{ModifierConfig, ModifierConfigBuilder};
pub use error::{Error, Result};
pub use memory::{
    ProcessBinding, ProcessHandle, ProcessProvider, ReadMemory, SystemProcessProvider,
    TARGET_PROCESS, WriteMemory,
};
pub use modifier::{FlagStates, GameStateModifier, Position, PositionReport};
pub use offset::{BaseAddresses, GameVersion, OffsetDump, OffsetTable, PointerChain, Target};
