// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nv_backlight::backlight::{BacklightManager, BacklightModule, MemoryBacklightService};
use nv_backlight::config::MachineConfig;
use nv_backlight::InitOutcome;

#[macro_use]
extern crate tracing;

fn setup_logs() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(format!(
        "warn,{}=info",
        env!("CARGO_CRATE_NAME")
    )));

    #[cfg(feature = "journald")]
    let journal_layer = tracing_journald::layer().ok();
    #[cfg(not(feature = "journald"))]
    let journal_layer: Option<tracing_subscriber::layer::Identity> = None;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(journal_layer)
        .init();
}

/// Drive a simulated GPU backlight
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Machine description (KDL); defaults to the one in the config dir
    machine: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the current brightness
    Get,
    /// Set the brightness level
    Set { value: u32 },
    /// Suspend and resume every backlight device
    SuspendResume,
}

fn load_machine(path: Option<PathBuf>) -> Result<MachineConfig> {
    if let Some(path) = path {
        return MachineConfig::load(&path);
    }

    match MachineConfig::default_path() {
        Some(path) if path.exists() => MachineConfig::load(&path),
        _ => {
            info!("no machine description found, using the built-in one");
            Ok(MachineConfig::builtin())
        }
    }
}

fn main() -> Result<()> {
    setup_logs();

    let args = Args::parse();
    let (gpu, probe) = load_machine(args.machine)?.into_gpu();

    let module = BacklightModule::ctor();
    let service = Arc::new(MemoryBacklightService::new());
    let mut backlight = BacklightManager::new(&module, service.clone(), Arc::new(probe));

    let outcome = backlight.init(&gpu).context("backlight init failed")?;
    let device = match (&outcome, backlight.backlight()) {
        (InitOutcome::Registered { .. }, Some(device)) => Arc::clone(device),
        _ => {
            println!("no backlight registered: {outcome:?}");
            backlight.exit();
            module.dtor();
            return Ok(());
        }
    };

    match args.command.unwrap_or(Command::Get) {
        Command::Get => {}
        Command::Set { value } => device.set_brightness(value)?,
        Command::SuspendResume => {
            let failed = service.suspend() + service.resume();
            if failed > 0 {
                error!("{} backlight updates failed across suspend/resume", failed);
            }
        }
    }

    println!(
        "{}: codec={} brightness={} actual={} max={}",
        device.name(),
        device.codec().name(),
        device.brightness(),
        device.actual_brightness(),
        device.max_brightness()
    );

    backlight.exit();
    module.dtor();
    Ok(())
}
