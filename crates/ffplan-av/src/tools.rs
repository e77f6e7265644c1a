//! Locating ffprobe and ffmpeg.
//!
//! ffprobe is resolved before every run; ffmpeg is only reported on, since
//! ffplan never launches it.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// What `-version` revealed about one executable.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: String,
    /// `true` when the executable ran and exited cleanly.
    pub available: bool,
    /// Release string from the banner, e.g. `7.0` or `n6.1.1`.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Run `<name> -version` from `PATH`.
///
/// ```no_run
/// let status = ffplan_av::inspect_tool("ffmpeg");
/// println!("{}: {:?}", status.name, status.version);
/// ```
pub fn inspect_tool(name: &str) -> ToolStatus {
    inspect_tool_at(name, Path::new(name))
}

/// Run `<program> -version`, where `program` is a bare name or a path.
pub fn inspect_tool_at(name: &str, program: &Path) -> ToolStatus {
    let mut status = ToolStatus {
        name: name.to_string(),
        available: false,
        version: None,
        path: None,
    };

    let output = match Command::new(program).arg("-version").output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::debug!("{} -version exited with {}", name, output.status);
            return status;
        }
        Err(e) => {
            tracing::debug!("{} could not be started: {}", name, e);
            return status;
        }
    };

    status.available = true;
    status.version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .and_then(release_from_banner);
    status.path = if program.components().count() > 1 {
        Some(program.to_path_buf())
    } else {
        which::which(program).ok()
    };
    status
}

/// Pull the release out of `ffmpeg version 7.0 Copyright ...`.
fn release_from_banner(banner: &str) -> Option<String> {
    let mut words = banner.split_whitespace();
    words.find(|w| *w == "version")?;
    words.next().map(str::to_string)
}

/// Status of ffprobe then ffmpeg, using the configured paths when given.
pub fn check_tools(ffprobe: Option<&Path>, ffmpeg: Option<&Path>) -> Vec<ToolStatus> {
    [("ffprobe", ffprobe), ("ffmpeg", ffmpeg)]
        .into_iter()
        .map(|(name, configured)| {
            inspect_tool_at(name, configured.unwrap_or_else(|| Path::new(name)))
        })
        .collect()
}

/// Search `PATH` for an executable.
pub fn find_on_path(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// The executable to run for `name`.
///
/// A configured path is used when it exists. A configured path that is
/// missing is logged and `PATH` is searched instead.
pub fn resolve_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => return Ok(path.to_path_buf()),
        Some(path) => tracing::debug!(
            "configured {} path {} does not exist; searching PATH",
            name,
            path.display()
        ),
        None => {}
    }
    find_on_path(name)
}
