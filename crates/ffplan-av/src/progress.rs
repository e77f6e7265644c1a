//! Progress estimation from ffmpeg's status lines.
//!
//! ffmpeg writes lines such as
//! `frame= 1440 fps= 96 q=28.0 size=   10240kB time=00:01:00.00 bitrate=1398.1kbits/s speed=3.99x`
//! interleaved with arbitrary diagnostics. [`ProgressParser`] pulls each
//! marker out independently and keeps a percent that never goes backwards.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::probe::MediaProbe;

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"time=\s*(\d+):(\d+):(\d+(?:\.\d+)?)").expect("time regex"))
}

fn frame_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"frame=\s*(\d+)").expect("frame regex"))
}

fn speed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"speed=\s*(\d+(?:\.\d+)?)x?").expect("speed regex"))
}

fn bitrate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"bitrate=\s*(\d+(?:\.\d+)?[a-zA-Z]+/s)").expect("bitrate regex")
    })
}

fn size_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"size=\s*(\d+(?:\.\d+)?\s*[a-zA-Z]*)").expect("size regex"))
}

/// The latest progress snapshot for one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressState {
    /// Whole percent complete, 0 to 100. Never decreases.
    pub percent: u8,
    /// Elapsed output time in seconds, as last reported.
    pub time: f64,
    /// Highest frame number seen.
    pub frame: u64,
    /// Encoding speed as a multiple of real time.
    pub speed: Option<f64>,
    /// Output bitrate as printed, e.g. `1398.1kbits/s`.
    pub bitrate: Option<String>,
    /// Output size as printed, e.g. `10240kB`.
    pub size: Option<String>,
    /// `duration * fps`, when both were known at attach time.
    pub total_frames: Option<u64>,
}

/// Turns ffmpeg output lines into a monotonic progress estimate.
///
/// Never fails: unrecognised lines leave the state untouched.
#[derive(Debug, Clone, Default)]
pub struct ProgressParser {
    state: ProgressState,
    duration: Option<f64>,
}

impl ProgressParser {
    /// A parser with no baselines; percent can only come from lines once a
    /// probe is attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser already attached to `probe`.
    pub fn for_probe(probe: &MediaProbe) -> Self {
        let mut parser = Self::new();
        parser.attach(probe);
        parser
    }

    /// Reset the state and derive baselines from a probe.
    ///
    /// Duration comes from the container, frame rate from the first video
    /// stream that is not cover art. A missing or non-positive value is not an error; the parser
    /// falls back to time-based or no estimation.
    pub fn attach(&mut self, probe: &MediaProbe) {
        self.state = ProgressState::default();
        self.duration = probe.duration_secs().filter(|d| d.is_finite() && *d > 0.0);

        let fps = probe.primary_video_stream().and_then(|s| s.frame_rate());

        self.state.total_frames = match (self.duration, fps) {
            (Some(duration), Some(fps)) => Some((duration * fps) as u64).filter(|t| *t > 0),
            _ => None,
        };

        match (self.duration, self.state.total_frames) {
            (_, Some(total)) => tracing::debug!("Progress baseline: {} total frames", total),
            (Some(duration), None) => tracing::debug!(
                "No usable frame rate; estimating progress from time over {:.2}s",
                duration
            ),
            (None, None) => {
                tracing::warn!("Probe has no usable duration; progress percent will not advance")
            }
        }
    }

    /// The container duration captured at attach time.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Feed one line of ffmpeg output and return the updated state.
    pub fn update(&mut self, line: &str) -> &ProgressState {
        let mut moved = false;

        if let Some(caps) = time_regex().captures_iter(line).last() {
            let h: f64 = caps[1].parse().unwrap_or(0.0);
            let m: f64 = caps[2].parse().unwrap_or(0.0);
            let s: f64 = caps[3].parse().unwrap_or(0.0);
            self.state.time = h * 3600.0 + m * 60.0 + s;
            moved = true;
        }

        if let Some(frame) = last_capture(frame_regex(), line).and_then(|v| v.parse::<u64>().ok()) {
            if frame > self.state.frame {
                self.state.frame = frame;
            }
            moved = true;
        }

        if let Some(speed) = last_capture(speed_regex(), line).and_then(|v| v.parse::<f64>().ok())
        {
            self.state.speed = Some(speed);
        }

        if let Some(bitrate) = last_capture(bitrate_regex(), line) {
            self.state.bitrate = Some(bitrate.to_string());
        }

        if let Some(size) = last_capture(size_regex(), line) {
            self.state.size = Some(size.trim().to_string());
        }

        if moved {
            if let Some(percent) = self.estimate_percent() {
                if percent > self.state.percent {
                    self.state.percent = percent;
                }
            }
        }

        &self.state
    }

    /// Frame-based if possible, else time-based, else nothing.
    fn estimate_percent(&self) -> Option<u8> {
        let ratio = match (self.state.frame, self.state.total_frames) {
            (frame, Some(total)) if frame > 0 && total > 0 => frame as f64 / total as f64,
            _ => match self.duration {
                Some(duration) if self.state.time > 0.0 => self.state.time / duration,
                _ => return None,
            },
        };

        Some((ratio * 100.0).floor().clamp(0.0, 100.0) as u8)
    }
}

fn last_capture<'t>(re: &Regex, line: &'t str) -> Option<&'t str> {
    re.captures_iter(line)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(duration: &str, avg_frame_rate: Option<&str>) -> MediaProbe {
        let streams = match avg_frame_rate {
            Some(rate) => format!(
                r#"[{{"index": 0, "codec_type": "video", "codec_name": "h264", "avg_frame_rate": "{rate}"}}]"#
            ),
            None => r#"[{"index": 0, "codec_type": "audio", "codec_name": "flac"}]"#.to_string(),
        };
        MediaProbe::from_json(&format!(
            r#"{{"format": {{"duration": "{duration}"}}, "streams": {streams}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn baseline_from_duration_and_fps() {
        let parser = ProgressParser::for_probe(&probe("120.000000", Some("24/1")));
        assert_eq!(parser.state().total_frames, Some(2880));
        assert_eq!(parser.duration(), Some(120.0));
    }

    #[test]
    fn frame_based_percent() {
        let mut parser = ProgressParser::for_probe(&probe("120.0", Some("24/1")));
        let state = parser.update("frame= 1440 fps=96 q=28.0 size=   10240kB time=00:01:00.00 bitrate=1398.1kbits/s speed=3.99x");
        assert_eq!(state.percent, 50);
        assert_eq!(state.frame, 1440);
        assert_eq!(state.time, 60.0);
        assert_eq!(state.speed, Some(3.99));
        assert_eq!(state.bitrate.as_deref(), Some("1398.1kbits/s"));
        assert_eq!(state.size.as_deref(), Some("10240kB"));
    }

    #[test]
    fn frame_never_regresses() {
        let mut parser = ProgressParser::for_probe(&probe("120.0", Some("24/1")));
        parser.update("frame=700");
        let percent = parser.state().percent;
        let state = parser.update("frame=650");
        assert_eq!(state.frame, 700);
        assert_eq!(state.percent, percent);
    }

    #[test]
    fn time_based_fallback_without_fps() {
        let mut parser = ProgressParser::for_probe(&probe("200.0", None));
        assert_eq!(parser.state().total_frames, None);
        let state = parser.update("size=  512kB time=00:00:50.00 bitrate= 83.9kbits/s speed=10x");
        assert_eq!(state.percent, 25);
    }

    #[test]
    fn percent_never_decreases_when_time_jumps_back() {
        let mut parser = ProgressParser::for_probe(&probe("100.0", None));
        parser.update("time=00:00:40.00");
        let state = parser.update("time=00:00:10.00");
        assert_eq!(state.percent, 40);
    }

    #[test]
    fn percent_is_clamped() {
        let mut parser = ProgressParser::for_probe(&probe("10.0", None));
        assert_eq!(parser.update("time=00:00:12.50").percent, 100);
    }

    #[test]
    fn noise_leaves_state_unchanged() {
        let mut parser = ProgressParser::for_probe(&probe("120.0", Some("24/1")));
        parser.update("frame=240 time=00:00:10.00");
        let before = parser.state().clone();
        for line in [
            "",
            "Stream mapping:",
            "  Stream #0:0 -> #0:0 (h264 (native) -> hevc (libx265))",
            "[libx265 @ 0x55] frame I:      1, Avg QP:31.26",
            "\u{fffd}\u{0}garbage",
        ] {
            parser.update(line);
        }
        assert_eq!(parser.state(), &before);
    }

    #[test]
    fn no_baseline_means_no_percent() {
        let mut parser = ProgressParser::new();
        let state = parser.update("frame=100 time=00:00:04.00");
        assert_eq!(state.frame, 100);
        assert_eq!(state.percent, 0);
    }

    #[test]
    fn last_marker_on_line_wins() {
        let mut parser = ProgressParser::new();
        let state = parser.update("speed=1.5x speed=2.0x");
        assert_eq!(state.speed, Some(2.0));
    }

    #[test]
    fn cover_art_does_not_set_frame_total() {
        let media = MediaProbe::from_json(
            r#"{"format": {"duration": "200.0"}, "streams": [
                {"index": 0, "codec_type": "audio", "codec_name": "mp3"},
                {"index": 1, "codec_type": "video", "codec_name": "mjpeg",
                 "avg_frame_rate": "0/0", "r_frame_rate": "90000/1",
                 "disposition": {"default": 0, "attached_pic": 1}}
            ]}"#,
        )
        .unwrap();
        let mut parser = ProgressParser::for_probe(&media);
        assert_eq!(parser.state().total_frames, None);
        assert_eq!(parser.update("frame=    1 time=00:01:40.00").percent, 50);
    }

    #[test]
    fn real_video_after_cover_art_sets_frame_total() {
        let media = MediaProbe::from_json(
            r#"{"format": {"duration": "10.0"}, "streams": [
                {"index": 0, "codec_type": "video", "codec_name": "png",
                 "r_frame_rate": "90000/1"},
                {"index": 1, "codec_type": "video", "codec_name": "h264",
                 "avg_frame_rate": "25/1"}
            ]}"#,
        )
        .unwrap();
        let parser = ProgressParser::for_probe(&media);
        assert_eq!(parser.state().total_frames, Some(250));
    }
}
