//! Extra stereo track for multi-channel audio.

use ffplan_common::StreamCategory;
use serde::{Deserialize, Serialize};

use crate::mapper::{CategoryCounters, Fragment, StreamPolicy};
use crate::probe::{MediaProbe, StreamDescriptor};
use crate::{Error, Result};

/// Add a stereo version of one multi-channel audio stream.
///
/// The source stream is kept and mapped a second time after the last audio
/// stream, re-encoded to two channels. Files that already carry a stereo
/// AAC track (commentary aside) are left alone.
///
/// Without `channels` or `codec` any stream with more than four channels
/// qualifies. The first qualifying stream is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraStereoPolicy {
    /// Required `language` tag of the source.
    pub language: Option<String>,
    /// Required channel count of the source.
    pub channels: Option<u32>,
    /// Required codec of the source.
    pub codec: Option<String>,
    /// Accept a source with no `language` tag when `language` is set.
    pub allow_untagged: bool,
    pub encoder: String,
    pub bitrate: String,
    /// Flag the new track as the default audio track.
    pub make_default: bool,
}

impl Default for ExtraStereoPolicy {
    fn default() -> Self {
        Self {
            language: None,
            channels: None,
            codec: None,
            allow_untagged: false,
            encoder: "aac".to_string(),
            bitrate: "128k".to_string(),
            make_default: true,
        }
    }
}

impl ExtraStereoPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Only use sources with exactly this layout.
    pub fn with_source(mut self, codec: impl Into<String>, channels: u32) -> Self {
        self.codec = Some(codec.into());
        self.channels = Some(channels);
        self
    }

    pub fn with_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = encoder.into();
        self
    }

    pub fn with_make_default(mut self, enabled: bool) -> Self {
        self.make_default = enabled;
        self
    }

    /// The audio stream to duplicate, with its category-relative index.
    pub fn source_stream<'a>(
        &self,
        media: &'a MediaProbe,
    ) -> Option<(usize, &'a StreamDescriptor)> {
        if self.has_stereo_track(media) {
            return None;
        }
        media
            .streams_of(StreamCategory::Audio)
            .enumerate()
            .find(|(_, stream)| self.qualifies(stream))
    }

    fn has_stereo_track(&self, media: &MediaProbe) -> bool {
        media
            .streams_of(StreamCategory::Audio)
            .filter(|s| !is_commentary(s))
            .any(|s| is_stereo_aac(s) && (s.language().is_none() || self.language_matches(s)))
    }

    fn qualifies(&self, stream: &StreamDescriptor) -> bool {
        let channels = match self.channels {
            Some(wanted) => stream.channels == Some(wanted),
            None => stream.channels.is_some_and(|c| c > 4),
        };
        let codec = self
            .codec
            .as_deref()
            .map_or(true, |c| stream.codec_name.eq_ignore_ascii_case(c.trim()));
        channels && codec && self.language_matches(stream)
    }

    fn language_matches(&self, stream: &StreamDescriptor) -> bool {
        match (self.language.as_deref(), stream.language()) {
            (None, _) => true,
            (Some(wanted), Some(tag)) => tag.eq_ignore_ascii_case(wanted.trim()),
            (Some(_), None) => self.allow_untagged,
        }
    }
}

fn is_commentary(stream: &StreamDescriptor) -> bool {
    stream
        .title()
        .is_some_and(|t| t.eq_ignore_ascii_case("commentary"))
}

fn is_stereo_aac(stream: &StreamDescriptor) -> bool {
    stream.codec() == "aac"
        && stream.channels == Some(2)
        && stream
            .channel_layout
            .as_deref()
            .map_or(true, |l| l.eq_ignore_ascii_case("stereo"))
}

impl StreamPolicy for ExtraStereoPolicy {
    fn name(&self) -> &str {
        "extra_stereo"
    }

    // Existing streams are always copied.
    fn categories(&self) -> &[StreamCategory] {
        &[]
    }

    fn needs_processing(&self, _stream: &StreamDescriptor) -> bool {
        false
    }

    fn synthesize(&self, stream: &StreamDescriptor, _index: usize) -> Result<Fragment> {
        Err(Error::contract(format!(
            "extra_stereo does not rewrite existing streams (stream #{})",
            stream.index
        )))
    }

    fn append_streams(
        &self,
        media: &MediaProbe,
        counters: &mut CategoryCounters,
    ) -> Result<Vec<Fragment>> {
        let Some((source, stream)) = self.source_stream(media) else {
            tracing::debug!("No audio stream needs a stereo copy");
            return Ok(Vec::new());
        };

        let out = counters.next(StreamCategory::Audio);
        tracing::debug!(
            "Stereo copy of stream #{} ({} {}ch) becomes a:{}",
            stream.index,
            stream.codec_name,
            stream.channels.unwrap_or_default(),
            out
        );

        let mut encoding = vec![
            format!("-c:a:{out}"),
            self.encoder.clone(),
            format!("-ac:a:{out}"),
            "2".to_string(),
            format!("-b:a:{out}"),
            self.bitrate.clone(),
        ];
        if self.make_default {
            encoding.extend([
                "-disposition:a".to_string(),
                "-default".to_string(),
                format!("-disposition:a:{out}"),
                "default".to_string(),
            ]);
        }

        Ok(vec![Fragment::new(
            ["-map".to_string(), format!("0:a:{source}")],
            encoding,
        )])
    }
}
