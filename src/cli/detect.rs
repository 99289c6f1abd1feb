//! Detect command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use serde_json::json;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::detect::{detect_file, Detection, DetectionMethod};

/// Run the detect command
///
/// Detection itself never fails; files that could not be analysed report
/// the fallback count and make the command exit with an error code.
pub fn run_detect(files: &[PathBuf], method: DetectionMethod, json: bool) -> ExitCode {
    let mut fallbacks = 0;

    for path in files {
        let detection = detect_file(path, method);
        if detection.is_fallback() {
            fallbacks += 1;
        }

        if json {
            let mut value = json!({
                "file": path.display().to_string(),
                "method": method.as_str(),
                "sprite_count": detection.count(),
                "fallback": detection.is_fallback(),
            });
            match &detection {
                Detection::Detected { strategy, .. } => value["strategy"] = json!(strategy),
                Detection::Fallback { cause, .. } => value["error"] = json!(cause.to_string()),
            }
            println!("{}", value);
        } else {
            println!("{}: {}", path.display(), detection);
        }
    }

    if fallbacks > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
