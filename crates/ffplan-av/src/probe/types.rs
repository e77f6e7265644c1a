//! Probe document types.
//!
//! These mirror the JSON ffprobe prints for `-show_format -show_streams`.
//! Stream order is kept exactly as ffprobe reports it; nothing here sorts.

use std::collections::BTreeMap;

use ffplan_common::StreamCategory;
use serde::{Deserialize, Serialize};

/// Codecs ffprobe reports as `video` that are really still images
/// (cover art, thumbnails).
const IMAGE_VIDEO_CODECS: &[&str] = &[
    "alias_pix",
    "apng",
    "brender_pix",
    "dds",
    "dpx",
    "exr",
    "fits",
    "gif",
    "mjpeg",
    "mjpegb",
    "pam",
    "pbm",
    "pcx",
    "pfm",
    "pgm",
    "pgmyuv",
    "pgx",
    "photocd",
    "pictor",
    "pixlet",
    "png",
    "ppm",
    "ptx",
    "sgi",
    "sunrast",
    "tiff",
    "vc1image",
    "wmv3image",
    "xbm",
    "xface",
    "xpm",
    "xwd",
];

/// A complete probe document: container format plus ordered streams.
///
/// Immutable once produced; the mapper and progress parser only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// Container-level attributes.
    pub format: FormatInfo,
    /// Streams in the order ffprobe reported them.
    #[serde(default)]
    pub streams: Vec<StreamDescriptor>,
}

impl MediaProbe {
    /// Container duration in seconds, when present and parseable.
    pub fn duration_secs(&self) -> Option<f64> {
        self.format.duration_secs()
    }

    /// Iterate over the streams of one category, in reported order.
    pub fn streams_of(
        &self,
        category: StreamCategory,
    ) -> impl Iterator<Item = &StreamDescriptor> + '_ {
        self.streams
            .iter()
            .filter(move |s| s.category() == Some(category))
    }

    /// The first stream categorised as video.
    pub fn first_video_stream(&self) -> Option<&StreamDescriptor> {
        self.streams_of(StreamCategory::Video).next()
    }

    /// The first video stream that carries moving pictures.
    ///
    /// Cover art and other still images are skipped.
    pub fn primary_video_stream(&self) -> Option<&StreamDescriptor> {
        self.streams_of(StreamCategory::Video)
            .find(|s| !s.is_cover_art())
    }

    /// Width and height of the primary video stream.
    pub fn video_resolution(&self) -> Option<(u32, u32)> {
        self.primary_video_stream().and_then(|s| s.resolution())
    }
}

/// Container format attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_long_name: Option<String>,
    /// Duration in seconds, as the decimal string ffprobe prints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_streams: Option<u32>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl FormatInfo {
    /// Duration in seconds, when present and parseable.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration.as_deref().and_then(|s| s.trim().parse().ok())
    }

    /// File size in bytes.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// One elementary stream as reported by ffprobe.
///
/// Type-specific fields are only present for the categories they apply to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Global index within the container.
    pub index: u32,
    /// Raw `codec_type` string; see [`StreamDescriptor::category`].
    #[serde(default)]
    pub codec_type: String,
    #[serde(default)]
    pub codec_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coded_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coded_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_fmt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub disposition: BTreeMap<String, u8>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl StreamDescriptor {
    /// The stream's category, or `None` for `unknown` and other values.
    pub fn category(&self) -> Option<StreamCategory> {
        self.codec_type.parse().ok()
    }

    /// Lowercased codec name.
    pub fn codec(&self) -> String {
        self.codec_name.to_lowercase()
    }

    /// Look up a tag, ignoring the case of its key.
    ///
    /// Matroska writes `language`, some muxers write `LANGUAGE`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The `language` tag.
    pub fn language(&self) -> Option<&str> {
        self.tag("language")
    }

    /// The `title` tag.
    pub fn title(&self) -> Option<&str> {
        self.tag("title")
    }

    /// Width and height, falling back to the coded dimensions.
    pub fn resolution(&self) -> Option<(u32, u32)> {
        let width = self.width.or(self.coded_width)?;
        let height = self.height.or(self.coded_height)?;
        Some((width, height))
    }

    /// Average frame rate, falling back to the real base frame rate.
    ///
    /// Returns `None` for `0/0` and other unusable rates.
    pub fn frame_rate(&self) -> Option<f64> {
        self.avg_frame_rate
            .as_deref()
            .and_then(parse_frame_rate)
            .or_else(|| self.r_frame_rate.as_deref().and_then(parse_frame_rate))
    }

    /// Bit rate in bits per second.
    pub fn bit_rate(&self) -> Option<u64> {
        self.bit_rate.as_deref().and_then(|s| s.trim().parse().ok())
    }

    /// Whether this "video" stream is actually a still image.
    pub fn is_image_codec(&self) -> bool {
        IMAGE_VIDEO_CODECS.contains(&self.codec().as_str())
    }

    /// An embedded still picture rather than a video track.
    pub fn is_cover_art(&self) -> bool {
        self.is_image_codec() || self.has_disposition("attached_pic")
    }

    /// Whether a disposition flag (e.g. `default`, `attached_pic`) is set.
    pub fn has_disposition(&self, flag: &str) -> bool {
        self.disposition.get(flag).copied().unwrap_or(0) == 1
    }
}

/// Parse an ffprobe rate such as `24000/1001` or `25`.
///
/// Zero, negative, and zero-denominator rates yield `None`.
pub fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let rate = match rate_str.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate_str.trim().parse().ok()?,
    };

    (rate.is_finite() && rate > 0.0).then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(codec_type: &str, codec_name: &str) -> StreamDescriptor {
        StreamDescriptor {
            codec_type: codec_type.to_string(),
            codec_name: codec_name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("24000/1001"), Some(23.976023976023978));
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("0/1"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
    }

    #[test]
    fn frame_rate_falls_back_to_r_frame_rate() {
        let mut s = stream("video", "h264");
        s.avg_frame_rate = Some("0/0".into());
        s.r_frame_rate = Some("25/1".into());
        assert_eq!(s.frame_rate(), Some(25.0));
    }

    #[test]
    fn category_parsing() {
        assert_eq!(stream("video", "h264").category(), Some(StreamCategory::Video));
        assert_eq!(stream("Audio", "aac").category(), Some(StreamCategory::Audio));
        assert_eq!(stream("unknown", "").category(), None);
    }

    #[test]
    fn tags_are_case_insensitive() {
        let mut s = stream("audio", "aac");
        s.tags.insert("LANGUAGE".into(), "eng".into());
        s.tags.insert("title".into(), "Commentary".into());
        assert_eq!(s.language(), Some("eng"));
        assert_eq!(s.title(), Some("Commentary"));
    }

    #[test]
    fn image_codecs_detected() {
        assert!(stream("video", "mjpeg").is_image_codec());
        assert!(stream("video", "PNG").is_image_codec());
        assert!(!stream("video", "hevc").is_image_codec());
    }

    #[test]
    fn resolution_prefers_display_dimensions() {
        let mut s = stream("video", "h264");
        s.coded_width = Some(1920);
        s.coded_height = Some(1088);
        assert_eq!(s.resolution(), Some((1920, 1088)));
        s.width = Some(1920);
        s.height = Some(1080);
        assert_eq!(s.resolution(), Some((1920, 1080)));
    }

    #[test]
    fn streams_of_keeps_order() {
        let probe = MediaProbe {
            format: FormatInfo::default(),
            streams: vec![
                StreamDescriptor { index: 0, ..stream("audio", "aac") },
                StreamDescriptor { index: 1, ..stream("video", "h264") },
                StreamDescriptor { index: 2, ..stream("audio", "ac3") },
            ],
        };
        let audio: Vec<u32> = probe.streams_of(StreamCategory::Audio).map(|s| s.index).collect();
        assert_eq!(audio, vec![0, 2]);
        assert_eq!(probe.first_video_stream().map(|s| s.index), Some(1));
    }

    #[test]
    fn primary_video_skips_cover_art() {
        let mut cover = StreamDescriptor { index: 1, ..stream("video", "png") };
        cover.disposition.insert("attached_pic".into(), 1);
        let mut tagged = StreamDescriptor { index: 2, ..stream("video", "h264") };
        tagged.disposition.insert("attached_pic".into(), 1);
        let movie = StreamDescriptor {
            index: 3,
            width: Some(1280),
            height: Some(720),
            ..stream("video", "h264")
        };

        let media = MediaProbe {
            format: FormatInfo::default(),
            streams: vec![
                StreamDescriptor { index: 0, ..stream("audio", "mp3") },
                cover,
                tagged,
                movie,
            ],
        };
        assert_eq!(media.first_video_stream().map(|s| s.index), Some(1));
        assert_eq!(media.primary_video_stream().map(|s| s.index), Some(3));
        assert_eq!(media.video_resolution(), Some((1280, 720)));

        let audio_only = MediaProbe {
            streams: media.streams[..3].to_vec(),
            ..media.clone()
        };
        assert!(audio_only.primary_video_stream().is_none());
    }
}
