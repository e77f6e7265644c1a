//! Path utilities for guessing a file's content category by extension.
//!
//! The Prober uses these as a cheap pre-filter before spending a process
//! spawn on ffprobe. The tables follow the top-level MIME types a typical
//! system `mime.types` assigns to each extension.

use std::path::Path;

use crate::ContentCategory;

/// Extensions registered as `video/*`.
const VIDEO_EXTENSIONS: &[&str] = &[
    "3g2", "3gp", "asf", "avi", "divx", "f4v", "flv", "m2t", "m2ts", "m4v", "mkv", "mk3d", "mov",
    "mp4", "mpe", "mpeg", "mpg", "mts", "ogv", "qt", "ts", "vob", "webm", "wmv",
];

/// Extensions registered as `audio/*`.
const AUDIO_EXTENSIONS: &[&str] = &[
    "aac", "ac3", "aif", "aifc", "aiff", "amr", "ape", "dts", "eac3", "flac", "m4a", "m4b", "mka",
    "mp2", "mp3", "oga", "ogg", "opus", "ra", "wav", "weba", "wma", "wv",
];

/// Extensions registered as `image/*`.
const IMAGE_EXTENSIONS: &[&str] = &[
    "avif", "bmp", "gif", "heic", "heif", "ico", "jpe", "jpeg", "jpg", "png", "svg", "tif", "tiff",
    "webp",
];

/// Extensions registered as `text/*`, sidecar subtitles included.
const TEXT_EXTENSIONS: &[&str] = &[
    "ass", "csv", "idx", "json", "nfo", "srt", "ssa", "sub", "txt", "vtt", "xml",
];

/// Extensions registered as `application/*`.
const APPLICATION_EXTENSIONS: &[&str] = &["bin", "iso", "pdf", "rar", "sup", "tar", "zip"];

/// Guess the content category of a path from its extension.
///
/// Returns `None` when the path has no extension or the extension is not
/// known. Matching is case-insensitive.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ffplan_common::ContentCategory;
/// use ffplan_common::paths::guess_content_category;
///
/// assert_eq!(guess_content_category(Path::new("song.FLAC")), Some(ContentCategory::Audio));
/// assert_eq!(guess_content_category(Path::new("cover.jpg")), Some(ContentCategory::Image));
/// assert_eq!(guess_content_category(Path::new("no_extension")), None);
/// ```
pub fn guess_content_category(path: &Path) -> Option<ContentCategory> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let ext = ext.as_str();

    if VIDEO_EXTENSIONS.contains(&ext) {
        Some(ContentCategory::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Some(ContentCategory::Audio)
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        Some(ContentCategory::Image)
    } else if TEXT_EXTENSIONS.contains(&ext) {
        Some(ContentCategory::Text)
    } else if APPLICATION_EXTENSIONS.contains(&ext) {
        Some(ContentCategory::Application)
    } else {
        None
    }
}

/// Check if a path has an extension in one of the allowed categories.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ffplan_common::ContentCategory;
/// use ffplan_common::paths::is_allowed_content;
///
/// let allowed = [ContentCategory::Video, ContentCategory::Audio];
/// assert!(is_allowed_content(Path::new("/media/movie.mkv"), &allowed));
/// assert!(!is_allowed_content(Path::new("/media/poster.png"), &allowed));
/// ```
pub fn is_allowed_content(path: &Path, allowed: &[ContentCategory]) -> bool {
    guess_content_category(path)
        .map(|category| allowed.contains(&category))
        .unwrap_or(false)
}
