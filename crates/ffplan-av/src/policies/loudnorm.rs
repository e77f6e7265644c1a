//! EBU R128 loudness normalisation.

use ffplan_common::StreamCategory;
use serde::{Deserialize, Serialize};

use crate::mapper::{Fragment, StreamPolicy};
use crate::probe::StreamDescriptor;
use crate::Result;

/// Run audio streams of the listed codecs through ffmpeg's `loudnorm`.
///
/// Normalised streams are re-encoded with `encoder`; everything else is
/// copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnormPolicy {
    pub codecs: Vec<String>,
    pub encoder: String,
    /// Integrated loudness target in LUFS.
    pub integrated: f64,
    /// Loudness range target in LU.
    pub range: f64,
    /// Maximum true peak in dBTP.
    pub true_peak: f64,
}

impl Default for LoudnormPolicy {
    fn default() -> Self {
        Self {
            codecs: vec!["aac".to_string()],
            encoder: "aac".to_string(),
            integrated: -24.0,
            range: 7.0,
            true_peak: -2.0,
        }
    }
}

impl LoudnormPolicy {
    pub const INTEGRATED_RANGE: (f64, f64) = (-70.0, -5.0);
    pub const RANGE_RANGE: (f64, f64) = (1.0, 20.0);
    pub const TRUE_PEAK_RANGE: (f64, f64) = (-9.0, 0.0);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets(mut self, integrated: f64, range: f64, true_peak: f64) -> Self {
        self.integrated = integrated;
        self.range = range;
        self.true_peak = true_peak;
        self
    }

    /// The audio filter applied to each matching stream.
    pub fn filter(&self) -> String {
        format!(
            "loudnorm=I={:.1}:LRA={:.1}:TP={:.1}",
            self.integrated, self.range, self.true_peak
        )
    }

    /// The first target outside its accepted bounds, with its value and
    /// bounds.
    pub fn out_of_range(&self) -> Option<(&'static str, f64, (f64, f64))> {
        [
            ("integrated", self.integrated, Self::INTEGRATED_RANGE),
            ("range", self.range, Self::RANGE_RANGE),
            ("true_peak", self.true_peak, Self::TRUE_PEAK_RANGE),
        ]
        .into_iter()
        .find(|&(_, value, (lo, hi))| !(lo..=hi).contains(&value))
    }
}

impl StreamPolicy for LoudnormPolicy {
    fn name(&self) -> &str {
        "loudnorm"
    }

    fn categories(&self) -> &[StreamCategory] {
        &[StreamCategory::Audio]
    }

    fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
        self.codecs
            .iter()
            .any(|c| stream.codec_name.eq_ignore_ascii_case(c.trim()))
    }

    fn synthesize(&self, _stream: &StreamDescriptor, index: usize) -> Result<Fragment> {
        Ok(Fragment::new(
            ["-map".to_string(), format!("0:a:{index}")],
            [
                format!("-c:a:{index}"),
                self.encoder.clone(),
                format!("-filter:a:{index}"),
                self.filter(),
            ],
        ))
    }
}
