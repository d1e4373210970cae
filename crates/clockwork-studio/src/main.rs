mod app;
mod cli;
mod preset;

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use clockwork_engine::logging::{init_logging, LoggingConfig};
use clockwork_engine::time::FrameQueue;
use clockwork_engine::window::{HeadlessConfig, HeadlessRuntime, Runtime, RuntimeConfig};

use crate::app::StudioApp;
use crate::cli::{Cli, Command, RunArgs};
use crate::preset::Preset;

const EXAMPLE_PRESET: &str = "pomodoro.json";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    match cli.command {
        Command::Run(args) => run(&args),
        Command::Presets { dir, init } => presets(&dir, init),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let preset = match &args.preset {
        Some(path) => Preset::load(path)?,
        None => Preset::default(),
    }
    .with_args(args);
    let label = preset.label();
    log::info!("{label}: {}", preset.describe());

    let frames = Rc::new(FrameQueue::new());
    let timer = preset.build_timer(frames.clone())?;

    if args.headless {
        timer.display().subscribe(|text| {
            if !text.is_empty() {
                println!("{text}");
            }
        });
        timer.start();

        let config = HeadlessConfig {
            max_frames: args.max_frames,
            ..HeadlessConfig::with_fps(args.fps)
        };
        let count = HeadlessRuntime::run(config, frames, StudioApp::new(timer, label))
            .context("headless runtime failed")?;
        log::info!("ran {count} frame(s)");
    } else {
        timer.start();

        let config = RuntimeConfig {
            title: label.clone(),
            ..RuntimeConfig::default()
        };
        Runtime::run(config, frames, StudioApp::new(timer, label)).context("window runtime failed")?;
    }

    Ok(())
}

fn presets(dir: &Path, init: bool) -> Result<()> {
    let mut directory = clockwork_fs::open_directory(dir)
        .with_context(|| format!("cannot use preset directory {}", dir.display()))?;

    let has_presets = directory.files.iter().any(|f| f.extension() == Some("json"));
    if init && !has_presets {
        let mut entry = clockwork_fs::create_file(dir, EXAMPLE_PRESET)?;
        clockwork_fs::write_file_json(&mut entry, &Preset::pomodoro())?;
        log::info!("wrote {}", entry.location.display());
        directory = clockwork_fs::open_directory(dir)?;
    }

    let mut listed = 0;
    for entry in directory.files.iter().filter(|f| f.extension() == Some("json")) {
        match clockwork_fs::read_file_json::<Preset>(entry) {
            Ok(preset) => {
                println!(
                    "{:<32} {:>10}  {}",
                    entry.path,
                    clockwork_fs::format_size(entry.size),
                    preset.describe()
                );
                listed += 1;
            }
            Err(err) => log::warn!("skipping {}: {err}", entry.path),
        }
    }

    if listed == 0 {
        log::info!("no presets in {}", dir.display());
    }
    Ok(())
}
