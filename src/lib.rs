//! ffplan - plan ffmpeg commands from ffprobe output
//!
//! This library crate exposes configuration loading and per-file planning
//! for the CLI and integration tests.

pub mod config;
pub mod task;
