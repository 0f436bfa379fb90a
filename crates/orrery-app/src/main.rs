//! The `orrery` binary.

use std::process::ExitCode;

use clap::Parser;
use orrery_app::AppError;
use orrery_app::platform::PlatformDirs;
use orrery_app::{export, window};
use orrery_config::{CliArgs, Command, Config};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("orrery: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::from_override(args.config.as_deref())?;
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);

    if let Err(e) = orrery_log::init_logging(
        Some(&dirs.log_dir),
        cfg!(debug_assertions),
        Some(&config.debug.log_level),
    ) {
        eprintln!("orrery: logging unavailable: {e}");
    }
    tracing::info!(config = %dirs.config_dir.display(), "Orrery starting");

    match args.command() {
        Command::Galaxy => window::run_galaxy(config),
        Command::Planet(planet) => {
            let texture = export::export_planet(&planet)?;
            // The pinned options reproduce this exact planet.
            match serde_json::to_string(&texture.params.to_options()) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!("Could not serialize planet options: {e}"),
            }
            Ok(())
        }
        Command::Atlas(atlas) => export::export_atlas(&atlas).map(|_| ()),
    }
}
