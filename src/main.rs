//! SmartSprite - Command-line tool for splitting sprite sheets into sprites

use std::process::ExitCode;

use smartsprite::cli;

fn main() -> ExitCode {
    cli::run()
}
