//! Core type definitions for streams and files.
//!
//! All enums are serialized in lowercase to match the vocabulary ffprobe uses
//! in its `codec_type` field.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of an elementary stream inside a media container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamCategory {
    /// Video (including still-image "video" streams such as cover art).
    Video,
    /// Audio.
    Audio,
    /// Subtitles, text or bitmap.
    Subtitle,
    /// Opaque data streams (timecode tracks, chapters, ...).
    Data,
    /// Attachments (fonts, images embedded in Matroska).
    Attachment,
}

impl StreamCategory {
    /// All categories, in ffmpeg's conventional order.
    pub const ALL: [StreamCategory; 5] = [
        Self::Video,
        Self::Audio,
        Self::Subtitle,
        Self::Data,
        Self::Attachment,
    ];

    /// The letter ffmpeg uses in stream specifiers (`0:a:1`, `-c:s:0`).
    pub fn specifier(&self) -> char {
        match self {
            Self::Video => 'v',
            Self::Audio => 'a',
            Self::Subtitle => 's',
            Self::Data => 'd',
            Self::Attachment => 't',
        }
    }

    /// Position of this category in [`StreamCategory::ALL`].
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Video => 0,
            Self::Audio => 1,
            Self::Subtitle => 2,
            Self::Data => 3,
            Self::Attachment => 4,
        }
    }

    /// The lowercase name used by ffprobe.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for StreamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamCategory {
    type Err = String;

    /// Parse an ffprobe `codec_type` value, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "subtitle" => Ok(Self::Subtitle),
            "data" => Ok(Self::Data),
            "attachment" => Ok(Self::Attachment),
            other => Err(format!("unknown stream category: {other}")),
        }
    }
}

/// Coarse content category of a file, as guessed from its name.
///
/// This mirrors the top-level part of a MIME type (`video/x-matroska` is
/// [`ContentCategory::Video`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// Video files.
    Video,
    /// Audio files.
    Audio,
    /// Still images.
    Image,
    /// Text files, including sidecar subtitles.
    Text,
    /// Anything else with a known extension.
    Application,
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Image => write!(f, "image"),
            Self::Text => write!(f, "text"),
            Self::Application => write!(f, "application"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specifiers_match_ffmpeg() {
        let letters: String = StreamCategory::ALL.iter().map(|c| c.specifier()).collect();
        assert_eq!(letters, "vasdt");
    }

    #[test]
    fn ordinals_index_all() {
        for (i, category) in StreamCategory::ALL.iter().enumerate() {
            assert_eq!(category.ordinal(), i);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Video".parse::<StreamCategory>(), Ok(StreamCategory::Video));
        assert_eq!("AUDIO".parse::<StreamCategory>(), Ok(StreamCategory::Audio));
        assert!("unknown".parse::<StreamCategory>().is_err());
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&StreamCategory::Attachment).unwrap();
        assert_eq!(json, "\"attachment\"");
        let back: ContentCategory = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(back, ContentCategory::Image);
    }
}
