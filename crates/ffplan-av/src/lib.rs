//! # ffplan-av
//!
//! Plan ffmpeg commands for media files.
//!
//! This crate provides:
//! - [`Prober`]: run ffprobe and parse its JSON into a [`MediaProbe`]
//! - [`StreamMapper`]: turn a probe plus a [`StreamPolicy`] into an ordered
//!   ffmpeg argument vector, addressing streams by category-relative index
//! - [`ProgressParser`]: turn ffmpeg status lines into a percent that never
//!   goes backwards
//! - [`policies`]: ready-made policies (audio/video re-encoding, language,
//!   codec and bitmap subtitle removal)
//!
//! Nothing here runs ffmpeg; callers own the process.
//!
//! ## Example
//!
//! ```no_run
//! use ffplan_av::policies::AudioEncoderPolicy;
//! use ffplan_av::{Prober, ProgressParser, StreamMapper};
//!
//! let probe = Prober::new().probe("/media/movie.mkv")?;
//!
//! let mut mapper = StreamMapper::new(AudioEncoderPolicy::new("ac3"));
//! mapper.set_probe(&probe);
//! if mapper.streams_need_processing()? {
//!     mapper.set_input("/media/movie.mkv")?;
//!     mapper.set_output("/tmp/movie.mkv")?;
//!     let args = mapper.ffmpeg_args()?;
//!     println!("ffmpeg {}", args.join(" "));
//! }
//!
//! let mut progress = ProgressParser::for_probe(&probe);
//! println!("{}%", progress.update("frame=100 time=00:00:04.00").percent);
//! # Ok::<(), ffplan_av::Error>(())
//! ```

mod error;
pub mod mapper;
pub mod policies;
pub mod probe;
pub mod progress;
pub mod tools;

// Re-exports
pub use error::{Error, Result};
pub use mapper::{
    CommandOptions, FilterChain, Fragment, MapperState, OptionList, StreamMapper, StreamPlan,
    StreamPolicy,
};
pub use probe::{FormatInfo, MediaProbe, Prober, StreamDescriptor};
pub use progress::{ProgressParser, ProgressState};
pub use tools::{check_tools, find_on_path, inspect_tool, inspect_tool_at, resolve_tool, ToolStatus};
