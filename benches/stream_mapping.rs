//! Benchmarks for stream mapping
//!
//! Measures plan building and argument assembly for files with many streams.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ffplan_av::policies::{AudioEncoderPolicy, LanguageFilterPolicy, VideoEncoderPolicy};
use ffplan_av::{FormatInfo, MediaProbe, StreamDescriptor, StreamMapper, StreamPolicy};

fn stream(index: u32, codec_type: &str, codec_name: &str, language: &str) -> StreamDescriptor {
    let mut s = StreamDescriptor {
        index,
        codec_type: codec_type.to_string(),
        codec_name: codec_name.to_string(),
        width: (codec_type == "video").then_some(3840),
        height: (codec_type == "video").then_some(2160),
        channels: (codec_type == "audio").then_some(6),
        ..Default::default()
    };
    s.tags.insert("language".to_string(), language.to_string());
    s
}

/// One video stream followed by `tracks` audio and `tracks` subtitle streams.
fn probe_with_tracks(tracks: u32) -> MediaProbe {
    let languages = ["eng", "fre", "ger", "spa"];
    let mut streams = vec![stream(0, "video", "h264", "und")];
    for i in 0..tracks {
        let lang = languages[i as usize % languages.len()];
        streams.push(stream(1 + i * 2, "audio", "dts", lang));
        streams.push(stream(2 + i * 2, "subtitle", "subrip", lang));
    }

    MediaProbe {
        format: FormatInfo {
            duration: Some("7200.0".to_string()),
            ..Default::default()
        },
        streams,
    }
}

fn build_args<P: StreamPolicy>(policy: P, probe: &MediaProbe) -> Vec<String> {
    let mut mapper = StreamMapper::new(policy);
    mapper.set_probe(probe);
    mapper.set_input("/movies/in.mkv").ok();
    mapper.set_output("/movies/out.mkv").ok();
    mapper.ffmpeg_args().unwrap_or_default()
}

fn bench_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("ffmpeg_args");

    for tracks in [2u32, 16, 64] {
        let probe = probe_with_tracks(tracks);

        group.bench_with_input(
            BenchmarkId::new("audio_encoder", tracks),
            &probe,
            |b, probe| {
                b.iter(|| {
                    build_args(
                        AudioEncoderPolicy::new("ac3").with_channel_bitrates(true),
                        black_box(probe),
                    )
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("language_filter", tracks),
            &probe,
            |b, probe| {
                b.iter(|| {
                    build_args(
                        LanguageFilterPolicy::new()
                            .with_audio_languages(["fre", "ger"])
                            .with_subtitle_languages(["spa"]),
                        black_box(probe),
                    )
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("video_encoder_scaled", tracks),
            &probe,
            |b, probe| {
                b.iter(|| {
                    build_args(
                        VideoEncoderPolicy::default()
                            .with_max_width(1920)
                            .with_crop("3840:1600:0:280"),
                        black_box(probe),
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_policies);
criterion_main!(benches);
