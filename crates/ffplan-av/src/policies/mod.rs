//! Ready-made stream policies.
//!
//! Each policy implements [`StreamPolicy`]. [`PolicyConfig`] selects one by
//! name from configuration:
//!
//! ```
//! use ffplan_av::mapper::StreamPolicy;
//! use ffplan_av::policies::PolicyConfig;
//!
//! let config: PolicyConfig = serde_json::from_str(
//!     r#"{"kind": "audio_encoder", "codec": "ac3", "channel_bitrates": true}"#,
//! )?;
//! let policy = config.build();
//! assert_eq!(policy.name(), "audio_encoder");
//! # Ok::<(), serde_json::Error>(())
//! ```

mod audio;
mod codec;
mod language;
mod loudnorm;
mod stereo;
mod video;

pub use audio::{bitrate_for_channels, AudioEncoderPolicy};
pub use codec::{CodecRemovalPolicy, ImageSubtitlePolicy, IMAGE_SUBTITLE_CODECS};
pub use language::LanguageFilterPolicy;
pub use loudnorm::LoudnormPolicy;
pub use stereo::ExtraStereoPolicy;
pub use video::{EncoderFamily, VideoEncoder, VideoEncoderPolicy};

use serde::{Deserialize, Serialize};

use crate::mapper::StreamPolicy;
use crate::{Error, Result};

/// A policy selected by its `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    AudioEncoder(AudioEncoderPolicy),
    VideoEncoder(VideoEncoderPolicy),
    LanguageFilter(LanguageFilterPolicy),
    CodecRemoval(CodecRemovalPolicy),
    ImageSubtitles,
    ExtraStereo(ExtraStereoPolicy),
    Loudnorm(LoudnormPolicy),
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::VideoEncoder(VideoEncoderPolicy::default())
    }
}

impl PolicyConfig {
    /// The `kind` string for this policy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AudioEncoder(_) => "audio_encoder",
            Self::VideoEncoder(_) => "video_encoder",
            Self::LanguageFilter(_) => "language_filter",
            Self::CodecRemoval(_) => "codec_removal",
            Self::ImageSubtitles => "image_subtitles",
            Self::ExtraStereo(_) => "extra_stereo",
            Self::Loudnorm(_) => "loudnorm",
        }
    }

    /// Check the settings make a usable policy.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::AudioEncoder(p) => {
                if p.codec.trim().is_empty() {
                    return Err(Error::InvalidInput("audio_encoder: codec is empty".into()));
                }
                if p.encoder.trim().is_empty() {
                    return Err(Error::InvalidInput("audio_encoder: encoder is empty".into()));
                }
                if matches!(p.bitrate.as_deref(), Some(b) if b.trim().is_empty()) {
                    return Err(Error::InvalidInput("audio_encoder: bitrate is empty".into()));
                }
            }
            Self::VideoEncoder(p) => {
                if p.max_width == Some(0) {
                    return Err(Error::InvalidInput(
                        "video_encoder: max_width must be positive".into(),
                    ));
                }
                if p.quality.is_some_and(|q| q > 63) {
                    return Err(Error::InvalidInput(format!(
                        "video_encoder: quality {} is out of range 0-63",
                        p.quality.unwrap_or_default()
                    )));
                }
            }
            Self::LanguageFilter(p) => {
                let any = p
                    .audio_languages
                    .iter()
                    .chain(&p.subtitle_languages)
                    .any(|l| !l.trim().is_empty());
                if !any {
                    return Err(Error::InvalidInput(
                        "language_filter: no audio or subtitle languages configured".into(),
                    ));
                }
            }
            Self::CodecRemoval(p) => {
                if p.codecs.iter().all(|c| c.trim().is_empty()) {
                    return Err(Error::InvalidInput(
                        "codec_removal: no codecs configured".into(),
                    ));
                }
            }
            Self::ImageSubtitles => {}
            Self::ExtraStereo(p) => {
                if p.channels == Some(0) {
                    return Err(Error::InvalidInput(
                        "extra_stereo: channels must be positive".into(),
                    ));
                }
                if p.encoder.trim().is_empty() || p.bitrate.trim().is_empty() {
                    return Err(Error::InvalidInput(
                        "extra_stereo: encoder and bitrate must be set".into(),
                    ));
                }
            }
            Self::Loudnorm(p) => {
                if p.codecs.iter().all(|c| c.trim().is_empty()) {
                    return Err(Error::InvalidInput("loudnorm: no codecs configured".into()));
                }
                if p.encoder.trim().is_empty() {
                    return Err(Error::InvalidInput("loudnorm: encoder is empty".into()));
                }
                if let Some((name, value, (lo, hi))) = p.out_of_range() {
                    return Err(Error::InvalidInput(format!(
                        "loudnorm: {name} {value} is out of range {lo} to {hi}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the configured policy.
    pub fn build(&self) -> Box<dyn StreamPolicy> {
        match self {
            Self::AudioEncoder(p) => Box::new(p.clone()),
            Self::VideoEncoder(p) => Box::new(p.clone()),
            Self::LanguageFilter(p) => Box::new(p.clone()),
            Self::CodecRemoval(p) => Box::new(p.clone()),
            Self::ImageSubtitles => Box::new(ImageSubtitlePolicy),
            Self::ExtraStereo(p) => Box::new(p.clone()),
            Self::Loudnorm(p) => Box::new(p.clone()),
        }
    }
}
