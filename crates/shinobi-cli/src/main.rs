mod commands;
mod config;
mod input;
mod render;
mod shutdown;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use shinobi::GameVersion;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commands::AttachOptions;
use config::{DEFAULT_CONFIG_FILE, ShellConfig};

#[derive(Parser)]
#[command(name = "shinobi")]
#[command(version, about = "Live practice patcher for Sekiro: Shadows Die Twice")]
struct Args {
    /// Shell configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Use this build's offsets instead of detecting the executable version
    #[arg(long, global = true, value_parser = parse_game_version)]
    game_version: Option<GameVersion>,

    /// Do not compare a forced --game-version against the executable
    #[arg(long, global = true)]
    no_verify_version: bool,

    /// Print notifications and status as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Attach and toggle with hotkeys (default)
    Run,
    /// Dispatch named commands once, in order
    Exec {
        /// Command names, e.g. toggle-stealth save-position
        #[arg(required = true)]
        commands: Vec<String>,
    },
    /// Print flag states and position
    Status,
    /// Print the offset table without attaching
    Offsets {
        /// Module base address (hex)
        #[arg(long)]
        base: Option<String>,
    },
    /// Attach and dump resolved offsets with memory samples
    Dump {
        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_game_version(s: &str) -> std::result::Result<GameVersion, String> {
    s.parse()
        .map_err(|_| format!("unknown version {} (supported: {})", s, GameVersion::supported()))
}

fn log_level(verbose: u8, configured: Option<&str>) -> String {
    match verbose {
        0 => configured.unwrap_or("info").to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Read the config before logging starts so its log level applies
    let loaded = ShellConfig::load(&args.config);
    let configured_level = match &loaded {
        Ok(Some(config)) => config.settings.log_level.clone(),
        _ => None,
    };

    let level = log_level(args.verbose, configured_level.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("shinobi={}", level).parse()?),
        )
        .init();

    let config = match loaded? {
        Some(config) => {
            info!("Loaded config from {}", args.config.display());
            config
        }
        None => {
            warn!(
                "Config {} not found, using default hotkeys",
                args.config.display()
            );
            ShellConfig::default()
        }
    };

    let options = AttachOptions {
        game_version: args.game_version,
        verify_version: !args.no_verify_version,
        nudge_step: config.settings.nudge,
    };
    let json = args.json || config.settings.json_notifications;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => commands::run::run(options, &config, json),
        Command::Exec { commands: names } => commands::exec::run(options, &names, json),
        Command::Status => commands::status::run(options, json),
        Command::Offsets { base } => commands::offsets::run(args.game_version, base.as_deref()),
        Command::Dump { output } => commands::dump::run(options, output.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_precedence() {
        assert_eq!(log_level(0, None), "info");
        assert_eq!(log_level(0, Some("warn")), "warn");
        assert_eq!(log_level(1, Some("warn")), "debug");
        assert_eq!(log_level(3, None), "trace");
    }

    #[test]
    fn test_parse_game_version() {
        assert_eq!(parse_game_version("1.05.0").unwrap(), GameVersion::V1_05_0);
        let err = parse_game_version("2.0").unwrap_err();
        assert!(err.contains("1.06.0"));
    }

    #[test]
    fn test_args_default_to_run() {
        let args = Args::try_parse_from(["shinobi"]).unwrap();
        assert!(args.command.is_none());

        let args =
            Args::try_parse_from(["shinobi", "exec", "toggle-ai", "--game-version", "1.02.0"])
                .unwrap();
        assert_eq!(args.game_version, Some(GameVersion::V1_02_0));
        match args.command {
            Some(Command::Exec { commands }) => assert_eq!(commands, vec!["toggle-ai"]),
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn test_exec_requires_commands() {
        assert!(Args::try_parse_from(["shinobi", "exec"]).is_err());
    }
}
