//! Media file probing.
//!
//! [`Prober`] runs ffprobe once per file and returns a [`MediaProbe`]: the
//! container format plus every stream, in the order ffprobe reported them.

mod ffprobe;
mod types;

pub use ffprobe::{Prober, DEFAULT_ALLOWED_CATEGORIES};
pub use types::{parse_frame_rate, FormatInfo, MediaProbe, StreamDescriptor};
