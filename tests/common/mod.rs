//! Shared fixtures for integration tests.
//!
//! Provides ffprobe documents for typical files and, on unix, a fake
//! `ffprobe` executable that prints a canned document.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ffplan_av::MediaProbe;

/// A 2-hour movie: HEVC video, three audio tracks, mixed subtitles, a font
/// attachment and cover art.
pub const MOVIE_PROBE: &str = r#"{
    "format": {
        "filename": "/movies/movie.mkv",
        "format_name": "matroska,webm",
        "duration": "7200.000000",
        "size": "15000000000",
        "tags": {"title": "Movie"}
    },
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080,
         "avg_frame_rate": "24/1", "disposition": {"default": 1, "attached_pic": 0}, "tags": {}},
        {"index": 1, "codec_type": "audio", "codec_name": "dts", "channels": 6,
         "tags": {"language": "eng", "title": "DTS 5.1"}},
        {"index": 2, "codec_type": "audio", "codec_name": "ac3", "channels": 2,
         "tags": {"language": "fre"}},
        {"index": 3, "codec_type": "subtitle", "codec_name": "subrip", "tags": {"language": "eng"}},
        {"index": 4, "codec_type": "audio", "codec_name": "aac", "channels": 2,
         "tags": {"language": "ger"}},
        {"index": 5, "codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle",
         "tags": {"language": "fre"}},
        {"index": 6, "codec_type": "attachment", "codec_name": "ttf", "tags": {"filename": "font.ttf"}},
        {"index": 7, "codec_type": "video", "codec_name": "mjpeg", "width": 600, "height": 900,
         "disposition": {"attached_pic": 1}, "tags": {}}
    ]
}"#;

/// A short clip with one stream per category in the target codecs.
pub const CLEAN_PROBE: &str = r#"{
    "format": {"format_name": "matroska,webm", "duration": "60.000000"},
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "hevc", "width": 1280, "height": 720,
         "avg_frame_rate": "25/1"},
        {"index": 1, "codec_type": "audio", "codec_name": "aac", "channels": 2,
         "tags": {"language": "eng"}}
    ]
}"#;

pub fn movie_probe() -> MediaProbe {
    MediaProbe::from_json(MOVIE_PROBE).expect("movie fixture parses")
}

pub fn clean_probe() -> MediaProbe {
    MediaProbe::from_json(CLEAN_PROBE).expect("clean fixture parses")
}

/// Write an empty media file with the given name.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").expect("write media stub");
    path
}

/// Write an executable shell script that prints `stdout` and exits with
/// `status`, standing in for ffprobe.
#[cfg(unix)]
pub fn fake_ffprobe(dir: &Path, stdout: &str, status: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let body_path = dir.join("ffprobe-output.json");
    std::fs::write(&body_path, stdout).expect("write fake output");

    let script = dir.join("ffprobe");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\ncat '{}'\nexit {}\n",
            body_path.display(),
            status
        ),
    )
    .expect("write fake ffprobe");

    let mut perms = std::fs::metadata(&script).expect("stat").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).expect("chmod");
    script
}

/// A config file selecting the fake ffprobe and a policy given as TOML.
pub fn write_config(dir: &Path, ffprobe: &Path, policy_toml: &str) -> PathBuf {
    let path = dir.join("ffplan.toml");
    std::fs::write(
        &path,
        format!(
            "[tools]\nffprobe_path = \"{}\"\n\n[policy]\n{}\n",
            ffprobe.display(),
            policy_toml
        ),
    )
    .expect("write config");
    path
}
