//! Split command implementations (split, generate-config)

use std::path::Path;
use std::process::ExitCode;

use super::{console_reporter, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::detect::DetectionMethod;
use crate::split::{
    generate_config, JsonProgress, ParallelSplit, ProgressReporter, SplitContext, SplitRun,
};

fn reporter(json: bool, verbose: bool) -> Box<dyn ProgressReporter> {
    if json {
        Box::new(JsonProgress::new())
    } else {
        Box::new(console_reporter(verbose))
    }
}

/// Run the split command
pub fn run_split(
    input: &Path,
    output: &Path,
    config: &Path,
    jobs: usize,
    method: DetectionMethod,
    json: bool,
    verbose: bool,
) -> ExitCode {
    if jobs == 0 {
        eprintln!("Error: --jobs must be at least 1");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let context = SplitContext::new(input, output)
        .with_config_path(config)
        .with_jobs(jobs)
        .with_method(method)
        .with_verbose(verbose);
    let run = SplitRun::new(context).with_reporter(reporter(json, verbose));

    match run.run() {
        Ok(result) if result.is_success() => ExitCode::from(EXIT_SUCCESS),
        Ok(result) => {
            if !json {
                for failure in result.failures() {
                    eprintln!("Error: {}: {}", failure.key, failure.status);
                }
            }
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            eprintln!("Split error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the generate-config command
pub fn run_generate_config(
    input: &Path,
    config: &Path,
    method: DetectionMethod,
    jobs: usize,
    json: bool,
) -> ExitCode {
    if jobs == 0 {
        eprintln!("Error: --jobs must be at least 1");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let pool = ParallelSplit::new().with_jobs(jobs);
    match generate_config(input, config, method, &pool, reporter(json, false).as_ref()) {
        Ok(generated) => {
            if !json {
                println!(
                    "{} files, {} sprites in total. Edit the config to adjust counts per image.",
                    generated.len(),
                    generated.total_sprites()
                );
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
