//! Interactive hotkey shell.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use shinobi::{
    CommandDispatcher, NotificationSink, Operation, ProcessBinding, ProcessProvider,
    TARGET_PROCESS,
};
use tracing::{error, info, warn};

use super::AttachOptions;
use crate::config::ShellConfig;
use crate::input::{self, ShellEvent};
use crate::render::{self, Renderer};
use crate::shutdown::ShutdownSignal;

/// Run the interactive shell until Esc, `q` or Ctrl+C
pub fn run(options: AttachOptions, config: &ShellConfig, json: bool) -> Result<()> {
    let mut dispatcher = match super::attach(options) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            blocking_notice(&e);
            return Err(e);
        }
    };

    let shutdown = Arc::new(ShutdownSignal::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.trigger())
            .context("Failed to set Ctrl+C handler")?;
    }

    let binding = dispatcher.modifier().binding();
    println!(
        "Attached to {} (PID: {}, version {})",
        TARGET_PROCESS,
        binding.pid(),
        dispatcher.modifier().version()
    );
    for line in render::format_bindings(&config.hotkeys) {
        println!("{}", line);
    }
    println!("  Esc/q  Quit");

    let (events_tx, events_rx) = mpsc::channel();
    let monitor =
        input::spawn_keyboard_monitor(config.hotkeys.clone(), Arc::clone(&shutdown), events_tx);
    let mut renderer = Renderer::stdout(json);

    while !shutdown.is_shutdown() {
        match events_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(ShellEvent::Run(op)) => handle(&mut dispatcher, op, &mut renderer),
            Ok(ShellEvent::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    shutdown.trigger();
    if monitor.join().is_err() {
        warn!("Keyboard monitor panicked");
    }
    info!("Shutting down");
    Ok(())
}

/// Run one operation. Failures are reported and the shell keeps going.
fn handle<P: ProcessProvider, S: NotificationSink>(
    dispatcher: &mut CommandDispatcher<P>,
    op: Operation,
    sink: &mut S,
) {
    match dispatcher.execute(op, sink) {
        Ok(()) if !op.is_flag() => info!("{}", op.label()),
        Ok(()) => {}
        Err(e) if e.is_unavailable() => warn!("{}: {}", op.label(), e),
        Err(e) => error!("{} failed: {}", op.label(), e),
    }
}

/// Tell the operator why startup failed and wait for acknowledgement
fn blocking_notice(e: &anyhow::Error) {
    eprintln!();
    eprintln!("{:#}", e);
    eprintln!("Start the game first, then run shinobi again.");
    eprintln!("Press Enter to exit.");
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
