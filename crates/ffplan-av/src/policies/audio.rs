//! Audio re-encoding.

use ffplan_common::StreamCategory;
use serde::{Deserialize, Serialize};

use crate::mapper::{Fragment, StreamPolicy};
use crate::probe::StreamDescriptor;
use crate::Result;

/// Re-encode audio streams into a target codec.
///
/// With `downmix_stereo`, streams of the target codec that carry more than
/// two channels are re-encoded too, and every re-encoded stream is mixed
/// down to stereo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioEncoderPolicy {
    /// Codec name streams should end up in, as ffprobe reports it.
    pub codec: String,
    /// ffmpeg encoder to use.
    pub encoder: String,
    /// Fixed bitrate such as `192k`. Takes precedence over
    /// `channel_bitrates`.
    pub bitrate: Option<String>,
    /// Derive the bitrate from the output channel count.
    pub channel_bitrates: bool,
    /// Mix multi-channel streams down to stereo.
    pub downmix_stereo: bool,
    /// Re-encode streams even when they are already in the target codec.
    pub force_transcode: bool,
    /// Encoder options used instead of the bitrate and channel settings.
    pub custom_options: Vec<String>,
}

impl Default for AudioEncoderPolicy {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            encoder: "aac".to_string(),
            bitrate: None,
            channel_bitrates: false,
            downmix_stereo: false,
            force_transcode: false,
            custom_options: Vec::new(),
        }
    }
}

impl AudioEncoderPolicy {
    /// Target `codec`, encoded with the encoder of the same name.
    pub fn new(codec: impl Into<String>) -> Self {
        let codec = codec.into();
        Self {
            encoder: codec.clone(),
            codec,
            ..Default::default()
        }
    }

    pub fn with_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = encoder.into();
        self
    }

    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = Some(bitrate.into());
        self
    }

    pub fn with_channel_bitrates(mut self, enabled: bool) -> Self {
        self.channel_bitrates = enabled;
        self
    }

    pub fn with_downmix_stereo(mut self, enabled: bool) -> Self {
        self.downmix_stereo = enabled;
        self
    }

    pub fn with_force_transcode(mut self, enabled: bool) -> Self {
        self.force_transcode = enabled;
        self
    }

    fn downmixes(&self, stream: &StreamDescriptor) -> bool {
        self.downmix_stereo && stream.channels.is_some_and(|c| c > 2)
    }
}

/// AC3-style bitrate for a channel count.
pub fn bitrate_for_channels(channels: u32) -> &'static str {
    match channels {
        0..=2 => "224k",
        3..=4 => "448k",
        _ => "640k",
    }
}

impl StreamPolicy for AudioEncoderPolicy {
    fn name(&self) -> &str {
        "audio_encoder"
    }

    fn categories(&self) -> &[StreamCategory] {
        &[StreamCategory::Audio]
    }

    fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
        if self.force_transcode {
            return true;
        }
        !stream.codec().eq_ignore_ascii_case(&self.codec) || self.downmixes(stream)
    }

    fn synthesize(&self, stream: &StreamDescriptor, index: usize) -> Result<Fragment> {
        let mut encoding = vec![format!("-c:a:{index}"), self.encoder.clone()];

        if !self.custom_options.is_empty() {
            encoding.extend(self.custom_options.iter().cloned());
        } else {
            let downmix = self.downmixes(stream);
            let bitrate = match (&self.bitrate, stream.channels) {
                (Some(fixed), _) => Some(fixed.clone()),
                (None, Some(channels)) if self.channel_bitrates => {
                    let out = if downmix { 2 } else { channels };
                    Some(bitrate_for_channels(out).to_string())
                }
                _ => None,
            };
            if let Some(bitrate) = bitrate {
                encoding.push(format!("-b:a:{index}"));
                encoding.push(bitrate);
            }
            if downmix {
                encoding.push(format!("-ac:a:{index}"));
                encoding.push("2".to_string());
            }
        }

        Ok(Fragment::new(
            ["-map".to_string(), format!("0:a:{index}")],
            encoding,
        ))
    }
}
