//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod detect;
pub mod interactive;
mod split;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::detect::DetectionMethod;
use crate::split::{ConsoleProgress, DEFAULT_JOBS};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// SmartSprite - Detect and split sprite sheets into individual sprites
#[derive(Parser)]
#[command(name = "smartsprite")]
#[command(about = "SmartSprite - Detect sprites packed side by side and split them into PNG files")]
#[command(version)]
pub struct Cli {
    /// Show debug diagnostics (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run (interactive menu when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split every image in a folder, using the sprite config when present
    Split {
        /// Folder scanned (recursively) for source images
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Root of the sprite output tree
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Sprite config (relative paths resolve inside the input folder)
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Number of parallel workers
        #[arg(short, long, default_value_t = DEFAULT_JOBS)]
        jobs: usize,

        /// Detection method for files without a config entry
        #[arg(short, long, value_enum, default_value_t = DetectionMethod::Transparency)]
        method: DetectionMethod,

        /// Print progress as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Detect every image in a folder and write the sprite config only
    GenerateConfig {
        /// Folder scanned (recursively) for source images
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Config file to write (relative paths land inside the input folder)
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Detection method
        #[arg(short, long, value_enum, default_value_t = DetectionMethod::Transparency)]
        method: DetectionMethod,

        /// Number of parallel workers
        #[arg(short, long, default_value_t = DEFAULT_JOBS)]
        jobs: usize,

        /// Print progress as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Enter the sprite count of every image by hand
    Manual {
        /// Folder scanned (recursively) for source images
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Detection method used for the suggested counts
        #[arg(short, long, value_enum, default_value_t = DetectionMethod::Transparency)]
        method: DetectionMethod,
    },

    /// Print the detected sprite count of individual files
    Detect {
        /// Image files to analyse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Detection method
        #[arg(short, long, value_enum, default_value_t = DetectionMethod::Transparency)]
        method: DetectionMethod,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the mode menu
    Interactive,
}

/// Console reporter, colored when stdout is a terminal.
pub(crate) fn console_reporter(verbose: bool) -> ConsoleProgress {
    ConsoleProgress::new().with_colors(atty::is(atty::Stream::Stdout)).with_verbose(verbose)
}

/// Initialize the `log` backend.
///
/// `RUST_LOG` wins when set; otherwise warnings are shown, or everything
/// down to debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Split { input, output, config, jobs, method, json } => {
            split::run_split(&input, &output, &config, jobs, method, json, cli.verbose)
        }
        Commands::GenerateConfig { input, config, method, jobs, json } => {
            split::run_generate_config(&input, &config, method, jobs, json)
        }
        Commands::Manual { input, method } => {
            interactive::run_manual_command(&input, method, cli.verbose)
        }
        Commands::Detect { files, method, json } => detect::run_detect(&files, method, json),
        Commands::Interactive => interactive::run_menu(cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["smartsprite"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_split_defaults() {
        let cli = Cli::try_parse_from(["smartsprite", "split"]).unwrap();
        match cli.command {
            Some(Commands::Split { input, output, config, jobs, method, json }) => {
                assert_eq!(input, PathBuf::from("input"));
                assert_eq!(output, PathBuf::from("output"));
                assert_eq!(config, PathBuf::from("sprite_config.json"));
                assert_eq!(jobs, 4);
                assert_eq!(method, DetectionMethod::Transparency);
                assert!(!json);
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn test_method_value_names() {
        let cli =
            Cli::try_parse_from(["smartsprite", "detect", "a.png", "--method", "color-change"])
                .unwrap();
        match cli.command {
            Some(Commands::Detect { method, .. }) => assert_eq!(method, DetectionMethod::ColorChange),
            _ => panic!("expected detect"),
        }
    }

    #[test]
    fn test_detect_requires_files() {
        assert!(Cli::try_parse_from(["smartsprite", "detect"]).is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["smartsprite", "split", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
