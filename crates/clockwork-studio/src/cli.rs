use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "clockwork-studio",
    version,
    about = "Drive a frame-paced timer in a window or a terminal"
)]
pub struct Cli {
    /// Log filter in env_logger syntax; overrides RUST_LOG
    #[arg(long, value_name = "FILTER", global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a timer
    Run(RunArgs),

    /// List the JSON presets in a directory
    Presets {
        dir: PathBuf,

        /// Write an example preset first if the directory has none
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Load settings from a JSON preset; other flags override it
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    /// Starting value in seconds
    #[arg(short, long)]
    pub seconds: Option<f64>,

    /// Count down to zero instead of up
    #[arg(short = 'd', long)]
    pub count_down: bool,

    /// Show MM:SS instead of "current/total"
    #[arg(long)]
    pub clock: bool,

    /// Restart the countdown whenever it completes
    #[arg(long)]
    pub repeat: bool,

    /// Print display changes to stdout instead of opening a window
    #[arg(long)]
    pub headless: bool,

    /// Headless frame rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Headless: stop after this many frames
    #[arg(long, value_name = "N")]
    pub max_frames: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::parse_from([
            "clockwork-studio",
            "--log",
            "debug",
            "run",
            "-s",
            "90",
            "-d",
            "--clock",
            "--headless",
            "--max-frames",
            "10",
        ]);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.seconds, Some(90.0));
        assert!(args.count_down && args.clock && args.headless);
        assert!(!args.repeat);
        assert_eq!(args.fps, 60);
        assert_eq!(args.max_frames, Some(10));
    }

    #[test]
    fn parses_presets() {
        let cli = Cli::parse_from(["clockwork-studio", "presets", "some/dir", "--init"]);
        match cli.command {
            Command::Presets { dir, init } => {
                assert_eq!(dir, PathBuf::from("some/dir"));
                assert!(init);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
