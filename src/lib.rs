//! SmartSprite - Library for detecting and splitting sprite sheets
//!
//! This library provides functionality to:
//! - Estimate how many sprites sit side by side in an image ([`detect`])
//! - Cut an image into equal-width column slices ([`slice`])
//! - Persist per-file sprite counts as a JSON config ([`config`])
//! - Split whole directory trees on a worker pool ([`split`])

pub mod cli;
pub mod config;
pub mod detect;
pub mod output;
pub mod slice;
pub mod split;
