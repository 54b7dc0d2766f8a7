use std::sync::atomic::{AtomicBool, Ordering};

/// Shared quit flag, set by the keyboard monitor or the Ctrl+C handler.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    shutdown: AtomicBool,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
