use tracing::debug;

use super::{Handler, Notification, NotificationSink, Operation};
use crate::error::Result;
use crate::memory::ProcessProvider;
use crate::modifier::{FlagStates, GameStateModifier, PositionReport};

/// Runs commands against a modifier, one at a time.
///
/// Every operation goes through the reattachment guard first, then its
/// handler. Flag handlers report their result to the sink.
pub struct CommandDispatcher<P: ProcessProvider> {
    modifier: GameStateModifier<P>,
}

impl<P: ProcessProvider> CommandDispatcher<P> {
    pub fn new(modifier: GameStateModifier<P>) -> Self {
        Self { modifier }
    }

    /// Dispatch by name. Unknown names are ignored without touching the process.
    pub fn dispatch<S: NotificationSink>(&mut self, name: &str, sink: &mut S) -> Result<()> {
        match name.parse::<Operation>() {
            Ok(op) => self.execute(op, sink),
            Err(_) => {
                debug!("Ignoring unknown command {:?}", name);
                Ok(())
            }
        }
    }

    pub fn execute<S: NotificationSink>(&mut self, op: Operation, sink: &mut S) -> Result<()> {
        self.modifier.ensure_attached()?;

        match op.handler::<P>() {
            Handler::Flag(handler) => {
                let value = handler(&mut self.modifier)?;
                debug!("{} -> {}", op, value);
                sink.notify(Notification { flag: op, value });
            }
            Handler::Action(handler) => {
                handler(&mut self.modifier)?;
                debug!("{} done", op);
            }
        }
        Ok(())
    }

    pub fn query_flags(&mut self) -> Result<FlagStates> {
        self.modifier.ensure_attached()?;
        self.modifier.flag_states()
    }

    pub fn query_position(&mut self) -> Result<PositionReport> {
        self.modifier.ensure_attached()?;
        Ok(self.modifier.position_report())
    }

    /// In-game time in milliseconds
    pub fn query_igt(&mut self) -> Result<u32> {
        self.modifier.ensure_attached()?;
        self.modifier.igt()
    }

    pub fn modifier(&self) -> &GameStateModifier<P> {
        &self.modifier
    }

    pub fn modifier_mut(&mut self) -> &mut GameStateModifier<P> {
        &mut self.modifier
    }

    pub fn into_inner(self) -> GameStateModifier<P> {
        self.modifier
    }
}
