//! Batch splitting of a whole input directory.
//!
//! The driver around [`crate::detect`] and [`crate::slice`]:
//! - **Discovery**: find images below the input directory
//! - **Config**: load per-file overrides, or generate them by detection
//! - **Execution**: split files on a bounded worker pool, reporting progress
//!
//! # Example
//!
//! ```ignore
//! use smartsprite::split::{ConsoleProgress, SplitContext, SplitRun};
//!
//! let context = SplitContext::new("input", "output").with_config_path("sprite_config.json");
//! let result = SplitRun::new(context)
//!     .with_reporter(Box::new(ConsoleProgress::new()))
//!     .run()?;
//! println!("{} files failed", result.failed_count());
//! ```

pub mod context;
pub mod discovery;
pub mod parallel;
pub mod pipeline;
pub mod progress;
pub mod result;

pub use context::*;
pub use discovery::*;
pub use parallel::*;
pub use pipeline::*;
pub use progress::{
    ConsoleProgress, JsonProgress, NullProgress, ProgressEvent, ProgressReporter, SplitTally,
};
pub use result::*;
