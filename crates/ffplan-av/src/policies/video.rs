//! Video re-encoding with optional filtering.

use ffplan_common::StreamCategory;
use serde::{Deserialize, Serialize};

use crate::mapper::{CommandOptions, FilterChain, Fragment, StreamPolicy};
use crate::probe::StreamDescriptor;
use crate::Result;

/// Supported ffmpeg video encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoEncoder {
    Libx264,
    #[default]
    Libx265,
    H264Nvenc,
    HevcNvenc,
    H264Vaapi,
    HevcVaapi,
    H264Qsv,
    HevcQsv,
}

/// Encoder family; decides rate-control flags and hardware setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderFamily {
    Libx,
    Nvenc,
    Vaapi,
    Qsv,
}

impl VideoEncoder {
    pub const ALL: [VideoEncoder; 8] = [
        Self::Libx264,
        Self::Libx265,
        Self::H264Nvenc,
        Self::HevcNvenc,
        Self::H264Vaapi,
        Self::HevcVaapi,
        Self::H264Qsv,
        Self::HevcQsv,
    ];

    /// The ffmpeg encoder name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Libx264 => "libx264",
            Self::Libx265 => "libx265",
            Self::H264Nvenc => "h264_nvenc",
            Self::HevcNvenc => "hevc_nvenc",
            Self::H264Vaapi => "h264_vaapi",
            Self::HevcVaapi => "hevc_vaapi",
            Self::H264Qsv => "h264_qsv",
            Self::HevcQsv => "hevc_qsv",
        }
    }

    /// The codec this encoder produces, as ffprobe names it.
    pub fn codec(&self) -> &'static str {
        match self {
            Self::Libx264 | Self::H264Nvenc | Self::H264Vaapi | Self::H264Qsv => "h264",
            Self::Libx265 | Self::HevcNvenc | Self::HevcVaapi | Self::HevcQsv => "hevc",
        }
    }

    pub fn family(&self) -> EncoderFamily {
        match self {
            Self::Libx264 | Self::Libx265 => EncoderFamily::Libx,
            Self::H264Nvenc | Self::HevcNvenc => EncoderFamily::Nvenc,
            Self::H264Vaapi | Self::HevcVaapi => EncoderFamily::Vaapi,
            Self::H264Qsv | Self::HevcQsv => EncoderFamily::Qsv,
        }
    }

    fn default_preset(&self) -> Option<&'static str> {
        match self.family() {
            EncoderFamily::Libx | EncoderFamily::Qsv => Some("slow"),
            EncoderFamily::Nvenc => Some("p4"),
            EncoderFamily::Vaapi => None,
        }
    }

    fn default_quality(&self) -> u32 {
        match self {
            Self::Libx265 => 28,
            _ => 23,
        }
    }

    /// Filters the encoder needs at the end of the chain.
    pub fn hardware_filters(&self) -> &'static [&'static str] {
        match self.family() {
            EncoderFamily::Vaapi => &["format=nv12|vaapi,hwupload"],
            EncoderFamily::Qsv => &["hwupload=extra_hw_frames=64,format=qsv"],
            EncoderFamily::Libx | EncoderFamily::Nvenc => &[],
        }
    }
}

impl std::fmt::Display for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VideoEncoder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown video encoder: {s}"))
    }
}

const DEFAULT_VAAPI_DEVICE: &str = "/dev/dri/renderD128";

/// Re-encode video streams and optionally strip data/attachment streams.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoEncoderPolicy {
    pub encoder: VideoEncoder,
    /// Encoder preset; the encoder's default when unset.
    pub preset: Option<String>,
    /// CRF / CQ / global quality value.
    pub quality: Option<u32>,
    pub tune: Option<String>,
    pub profile: Option<String>,
    /// Re-encode even when the stream is already in the target codec.
    pub force_transcode: bool,
    /// Scale streams wider than this down to this width.
    pub max_width: Option<u32>,
    /// A crop value such as `1920:800:0:140`.
    pub crop: Option<String>,
    /// Extra software filters, applied after crop and scale.
    pub filters: Vec<String>,
    pub strip_data_streams: bool,
    pub strip_attachment_streams: bool,
    /// Render node for VAAPI encoders.
    pub vaapi_device: Option<String>,
    /// Encoder options used instead of preset and quality settings.
    pub custom_options: Vec<String>,
}

impl VideoEncoderPolicy {
    pub fn new(encoder: VideoEncoder) -> Self {
        Self {
            encoder,
            ..Default::default()
        }
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = Some(crop.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn with_force_transcode(mut self, enabled: bool) -> Self {
        self.force_transcode = enabled;
        self
    }

    pub fn with_strip_data_streams(mut self, enabled: bool) -> Self {
        self.strip_data_streams = enabled;
        self
    }

    pub fn with_strip_attachment_streams(mut self, enabled: bool) -> Self {
        self.strip_attachment_streams = enabled;
        self
    }

    /// Software filters for one stream: crop, then scale, then custom.
    fn software_filters(&self, stream: &StreamDescriptor) -> Vec<String> {
        let mut filters = Vec::new();
        if let Some(crop) = self.crop.as_deref().filter(|c| !c.trim().is_empty()) {
            filters.push(format!("crop={}", crop.trim()));
        }
        if let Some(width) = self.scale_width(stream) {
            filters.push(format!("scale={width}:-1"));
        }
        filters.extend(
            self.filters
                .iter()
                .map(|f| f.trim())
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        );
        filters
    }

    fn scale_width(&self, stream: &StreamDescriptor) -> Option<u32> {
        let max = self.max_width?;
        let (width, _) = stream.resolution()?;
        (width > max).then_some(max)
    }

    fn encoder_args(&self, index: usize) -> Vec<String> {
        let mut args = Vec::new();
        let preset = self
            .preset
            .clone()
            .or_else(|| self.encoder.default_preset().map(str::to_string));
        let quality = self.quality.unwrap_or(self.encoder.default_quality()).to_string();

        match self.encoder.family() {
            EncoderFamily::Libx => {
                if let Some(preset) = preset {
                    args.extend(["-preset".to_string(), preset]);
                }
                if let Some(tune) = &self.tune {
                    args.extend(["-tune".to_string(), tune.clone()]);
                }
                if let Some(profile) = &self.profile {
                    args.extend([format!("-profile:v:{index}"), profile.clone()]);
                }
                args.extend(["-crf".to_string(), quality]);
            }
            EncoderFamily::Nvenc => {
                if let Some(preset) = preset {
                    args.extend(["-preset".to_string(), preset]);
                }
                if let Some(profile) = &self.profile {
                    args.extend([format!("-profile:v:{index}"), profile.clone()]);
                }
                args.extend(["-cq".to_string(), quality]);
            }
            EncoderFamily::Vaapi => {
                args.extend(["-rc_mode".to_string(), "ICQ".to_string()]);
                args.extend(["-global_quality".to_string(), quality]);
            }
            EncoderFamily::Qsv => {
                if let Some(preset) = preset {
                    args.extend(["-preset".to_string(), preset]);
                }
                args.extend(["-global_quality".to_string(), quality]);
                args.extend(["-look_ahead".to_string(), "1".to_string()]);
            }
        }

        args
    }
}

impl StreamPolicy for VideoEncoderPolicy {
    fn name(&self) -> &str {
        "video_encoder"
    }

    fn categories(&self) -> &[StreamCategory] {
        &[
            StreamCategory::Video,
            StreamCategory::Data,
            StreamCategory::Attachment,
        ]
    }

    fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
        match stream.category() {
            Some(StreamCategory::Video) => {
                if stream.is_image_codec() {
                    return false;
                }
                if !self.software_filters(stream).is_empty() {
                    return true;
                }
                self.force_transcode || !stream.codec().eq_ignore_ascii_case(self.encoder.codec())
            }
            Some(StreamCategory::Data) => self.strip_data_streams,
            Some(StreamCategory::Attachment) => self.strip_attachment_streams,
            _ => false,
        }
    }

    fn synthesize(&self, stream: &StreamDescriptor, index: usize) -> Result<Fragment> {
        match stream.category() {
            Some(StreamCategory::Video) => {}
            Some(StreamCategory::Data) if self.strip_data_streams => {
                return Ok(Fragment::drop_stream())
            }
            Some(StreamCategory::Attachment) if self.strip_attachment_streams => {
                return Ok(Fragment::drop_stream())
            }
            Some(category) => return Ok(Fragment::copy(category, index)),
            None => {
                return Err(crate::Error::contract(format!(
                    "stream #{} has no category",
                    stream.index
                )))
            }
        }

        let mut chain = FilterChain::new(StreamCategory::Video, index);
        for filter in self.software_filters(stream) {
            chain.push(filter);
        }
        for filter in self.encoder.hardware_filters() {
            chain.push(filter);
        }

        let mut encoding = vec![format!("-c:v:{index}"), self.encoder.as_str().to_string()];
        if self.custom_options.is_empty() {
            encoding.extend(self.encoder_args(index));
        } else {
            encoding.extend(self.custom_options.iter().cloned());
        }

        let fragment = match chain.build() {
            Some(graph) => {
                Fragment::new(["-map".to_string(), graph.output_label], encoding)
                    .with_filter_graph(graph.graph)
            }
            None => Fragment::new(["-map".to_string(), format!("0:v:{index}")], encoding),
        };

        Ok(fragment)
    }

    fn configure(&self, options: &mut CommandOptions) {
        match self.encoder.family() {
            EncoderFamily::Vaapi => {
                let device = self.vaapi_device.as_deref().unwrap_or(DEFAULT_VAAPI_DEVICE);
                options.generic.set("-vaapi_device", device);
            }
            EncoderFamily::Qsv => {
                options.generic.set("-init_hw_device", "qsv=hw");
                options.generic.set("-filter_hw_device", "hw");
            }
            EncoderFamily::Libx | EncoderFamily::Nvenc => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(codec: &str, width: u32) -> StreamDescriptor {
        StreamDescriptor {
            codec_type: "video".into(),
            codec_name: codec.into(),
            width: Some(width),
            height: Some(width * 9 / 16),
            ..Default::default()
        }
    }

    fn data() -> StreamDescriptor {
        StreamDescriptor {
            codec_type: "data".into(),
            codec_name: "bin_data".into(),
            ..Default::default()
        }
    }

    #[test]
    fn encoder_names_round_trip() {
        for encoder in VideoEncoder::ALL {
            assert_eq!(encoder.as_str().parse::<VideoEncoder>(), Ok(encoder));
        }
        assert!("libvpx".parse::<VideoEncoder>().is_err());
    }

    #[test]
    fn target_codec_and_images_are_copied() {
        let policy = VideoEncoderPolicy::new(VideoEncoder::Libx265);
        assert!(!policy.needs_processing(&video("hevc", 1920)));
        assert!(policy.needs_processing(&video("h264", 1920)));
        assert!(!policy.needs_processing(&video("mjpeg", 600)));
        assert!(policy
            .with_force_transcode(true)
            .needs_processing(&video("hevc", 1920)));
    }

    #[test]
    fn libx_encoding() {
        let f = VideoEncoderPolicy::new(VideoEncoder::Libx265)
            .synthesize(&video("h264", 1920), 0)
            .unwrap();
        assert_eq!(f.mapping, ["-map", "0:v:0"]);
        assert_eq!(f.encoding, ["-c:v:0", "libx265", "-preset", "slow", "-crf", "28"]);
        assert_eq!(f.filter_graph, None);
    }

    #[test]
    fn scale_filter_only_when_wider() {
        let policy = VideoEncoderPolicy::new(VideoEncoder::Libx264).with_max_width(1280);
        assert!(policy.needs_processing(&video("h264", 1920)));
        assert!(!policy.needs_processing(&video("h264", 1280)));

        let f = policy.synthesize(&video("h264", 1920), 0).unwrap();
        assert_eq!(f.mapping, ["-map", "[0:vf:0-1]"]);
        assert_eq!(
            f.filter_graph.as_deref(),
            Some("[0:v:0]scale=1280:-1[0:vf:0-1]")
        );
    }

    #[test]
    fn vaapi_adds_hardware_filter_and_device() {
        let policy = VideoEncoderPolicy::new(VideoEncoder::HevcVaapi);
        let f = policy.synthesize(&video("h264", 1920), 1).unwrap();
        assert_eq!(
            f.filter_graph.as_deref(),
            Some("[0:v:1]format=nv12|vaapi,hwupload[0:vf:1-1]")
        );
        assert_eq!(
            f.encoding,
            ["-c:v:1", "hevc_vaapi", "-rc_mode", "ICQ", "-global_quality", "23"]
        );

        let mut options = CommandOptions::default();
        policy.configure(&mut options);
        assert_eq!(options.generic.get("-vaapi_device"), Some(DEFAULT_VAAPI_DEVICE));
    }

    #[test]
    fn qsv_configures_hw_device() {
        let mut options = CommandOptions::default();
        VideoEncoderPolicy::new(VideoEncoder::HevcQsv).configure(&mut options);
        assert_eq!(options.generic.get("-init_hw_device"), Some("qsv=hw"));
        assert_eq!(options.generic.get("-filter_hw_device"), Some("hw"));
    }

    #[test]
    fn data_streams_dropped_only_when_enabled() {
        let policy = VideoEncoderPolicy::new(VideoEncoder::Libx265);
        assert!(!policy.needs_processing(&data()));

        let policy = policy.with_strip_data_streams(true);
        assert!(policy.needs_processing(&data()));
        assert!(policy.synthesize(&data(), 0).unwrap().is_drop());
    }
}
