//! FFprobe-based media probing.

use super::types::{FormatInfo, MediaProbe, StreamDescriptor};
use crate::tools::resolve_tool;
use crate::{Error, Result};
use ffplan_common::paths::guess_content_category;
use ffplan_common::ContentCategory;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

const TOOL: &str = "ffprobe";

/// Content categories probed when the caller does not restrict them.
pub const DEFAULT_ALLOWED_CATEGORIES: &[ContentCategory] = &[
    ContentCategory::Video,
    ContentCategory::Audio,
    ContentCategory::Image,
];

/// Raw document shape; every member is optional so that shape problems can
/// be reported precisely instead of as a serde message.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamDescriptor>>,
    error: Option<FfprobeError>,
}

/// Body of the `error` member written by `-show_error`.
#[derive(Debug, Deserialize)]
struct FfprobeError {
    code: Option<i64>,
    string: Option<String>,
}

/// Probes media files by running ffprobe once per file.
///
/// A `Prober` holds only its configuration, so one instance can be shared
/// by many callers probing different files.
///
/// # Example
///
/// ```no_run
/// use ffplan_av::Prober;
/// use ffplan_common::ContentCategory;
///
/// let prober = Prober::new().with_allowed_categories([ContentCategory::Video]);
/// let probe = prober.probe("/media/movie.mkv")?;
/// println!("{} streams", probe.streams.len());
/// # Ok::<(), ffplan_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Prober {
    ffprobe_path: Option<PathBuf>,
    allowed_categories: Vec<ContentCategory>,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober {
    /// Create a prober that finds ffprobe on `PATH` and accepts video, audio
    /// and image files.
    pub fn new() -> Self {
        Self {
            ffprobe_path: None,
            allowed_categories: DEFAULT_ALLOWED_CATEGORIES.to_vec(),
        }
    }

    /// Use an explicit ffprobe executable.
    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = Some(path.into());
        self
    }

    /// Restrict probing to files whose guessed content category is listed.
    pub fn with_allowed_categories(
        mut self,
        categories: impl IntoIterator<Item = ContentCategory>,
    ) -> Self {
        self.allowed_categories = categories.into_iter().collect();
        self
    }

    /// The content categories this prober accepts.
    pub fn allowed_categories(&self) -> &[ContentCategory] {
        &self.allowed_categories
    }

    /// Probe a media file.
    ///
    /// There is no retry: probing is deterministic for a given file state.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if the path does not exist.
    /// - [`Error::CategoryNotAllowed`] if the extension is not in an allowed
    ///   content category.
    /// - [`Error::ToolNotFound`] / [`Error::ToolFailed`] if ffprobe cannot be
    ///   run, exits non-zero, or reports an error in its output.
    /// - [`Error::EmptyOutput`] if ffprobe prints nothing.
    /// - [`Error::ParseError`] if the output is not a probe document.
    pub fn probe(&self, path: impl AsRef<Path>) -> Result<MediaProbe> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("File does not exist - {:?}", path);
            return Err(Error::file_not_found(path));
        }

        let category = guess_content_category(path);
        if !category.is_some_and(|c| self.allowed_categories.contains(&c)) {
            tracing::debug!(
                "Skipping {:?}: content category {:?} not in {:?}",
                path,
                category,
                self.allowed_categories
            );
            return Err(Error::category_not_allowed(path, category));
        }

        let ffprobe = resolve_tool(TOOL, self.ffprobe_path.as_deref())?;
        tracing::debug!("Probing {:?} with {:?}", path, ffprobe);

        let output = Command::new(&ffprobe)
            .args([
                "-loglevel",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-show_error",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(TOOL)
                } else {
                    Error::Io(e)
                }
            })?;

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::parse_error(TOOL, format!("Invalid UTF-8: {}", e)))?;

        if stdout.trim().is_empty() {
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Error::tool_failed(
                    TOOL,
                    format!("exited with {}: {}", output.status, stderr.trim()),
                ));
            }
            return Err(Error::empty_output(TOOL));
        }

        let probe = parse_probe_document(&stdout)?;

        if !output.status.success() {
            return Err(Error::tool_failed(
                TOOL,
                format!("exited with {}", output.status),
            ));
        }

        tracing::debug!(
            "Probed {:?}: format={:?}, {} streams",
            path,
            probe.format.format_name,
            probe.streams.len()
        );

        Ok(probe)
    }
}

impl MediaProbe {
    /// Parse a probe document previously printed by ffprobe.
    ///
    /// Applies the same validation as [`Prober::probe`]: empty input, an
    /// embedded `error` member, a missing `format` member, and malformed JSON
    /// are all reported as typed errors.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Err(Error::empty_output(TOOL));
        }
        parse_probe_document(json)
    }
}

fn parse_probe_document(json: &str) -> Result<MediaProbe> {
    let raw: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| Error::parse_error(TOOL, e.to_string()))?;

    if let Some(err) = raw.error {
        let message = err.string.unwrap_or_else(|| "unknown error".to_string());
        return Err(Error::tool_failed(
            TOOL,
            match err.code {
                Some(code) => format!("{message} (code {code})"),
                None => message,
            },
        ));
    }

    let format = raw
        .format
        .ok_or_else(|| Error::parse_error(TOOL, "document has no 'format' member"))?;

    Ok(MediaProbe {
        format,
        streams: raw.streams.unwrap_or_default(),
    })
}
