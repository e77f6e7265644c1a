//! ffplan-common: Shared types and path utilities.
//!
//! This crate provides the vocabulary shared by the rest of ffplan:
//!
//! - **Stream categories**: the five elementary stream kinds ffmpeg addresses
//!   with per-type specifiers (`v`, `a`, `s`, `d`, `t`)
//! - **Content categories**: the coarse kind of a file (video, audio, image, ...)
//! - **Path Utilities**: Functions to guess a file's content category by extension
//!
//! # Examples
//!
//! ```
//! use ffplan_common::{ContentCategory, StreamCategory};
//! use ffplan_common::paths::guess_content_category;
//! use std::path::Path;
//!
//! assert_eq!(StreamCategory::Audio.specifier(), 'a');
//! assert_eq!(
//!     guess_content_category(Path::new("movie.mkv")),
//!     Some(ContentCategory::Video)
//! );
//! ```

pub mod paths;
pub mod types;

pub use types::*;
