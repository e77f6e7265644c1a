//! Codec-based stream removal.

use ffplan_common::StreamCategory;
use serde::{Deserialize, Serialize};

use crate::mapper::{Fragment, StreamPolicy};
use crate::probe::StreamDescriptor;
use crate::Result;

/// Codecs ffmpeg can only render as bitmaps.
pub const IMAGE_SUBTITLE_CODECS: &[&str] = &[
    "dvbsub",
    "dvb_subtitle",
    "dvdsub",
    "dvd_subtitle",
    "pgssub",
    "hdmv_pgs_subtitle",
    "xsub",
];

/// Drop every stream, of any category, whose codec is listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecRemovalPolicy {
    pub codecs: Vec<String>,
}

impl CodecRemovalPolicy {
    pub fn new<I, S>(codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codecs: codecs.into_iter().map(Into::into).collect(),
        }
    }
}

impl StreamPolicy for CodecRemovalPolicy {
    fn name(&self) -> &str {
        "codec_removal"
    }

    fn categories(&self) -> &[StreamCategory] {
        &StreamCategory::ALL
    }

    fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
        let codec = stream.codec();
        self.codecs
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(&codec))
    }

    fn synthesize(&self, _stream: &StreamDescriptor, _index: usize) -> Result<Fragment> {
        Ok(Fragment::drop_stream())
    }
}

/// Drop bitmap subtitle streams (DVB, DVD, PGS, XSUB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSubtitlePolicy;

impl StreamPolicy for ImageSubtitlePolicy {
    fn name(&self) -> &str {
        "image_subtitles"
    }

    fn categories(&self) -> &[StreamCategory] {
        &[StreamCategory::Subtitle]
    }

    fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
        IMAGE_SUBTITLE_CODECS.contains(&stream.codec().as_str())
    }

    fn synthesize(&self, _stream: &StreamDescriptor, _index: usize) -> Result<Fragment> {
        Ok(Fragment::drop_stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(codec_type: &str, codec: &str) -> StreamDescriptor {
        StreamDescriptor {
            codec_type: codec_type.into(),
            codec_name: codec.into(),
            ..Default::default()
        }
    }

    #[test]
    fn removes_listed_codecs_in_any_category() {
        let policy = CodecRemovalPolicy::new(["dts", " MJPEG "]);
        assert!(policy.needs_processing(&stream("audio", "dts")));
        assert!(policy.needs_processing(&stream("video", "mjpeg")));
        assert!(!policy.needs_processing(&stream("audio", "aac")));
        assert_eq!(policy.categories().len(), 5);
    }

    #[test]
    fn image_subtitles_detected() {
        let policy = ImageSubtitlePolicy;
        assert!(policy.needs_processing(&stream("subtitle", "hdmv_pgs_subtitle")));
        assert!(policy.needs_processing(&stream("subtitle", "dvd_subtitle")));
        assert!(!policy.needs_processing(&stream("subtitle", "subrip")));
        assert!(!policy.needs_processing(&stream("subtitle", "ass")));
    }
}
