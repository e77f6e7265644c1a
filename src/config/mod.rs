mod types;

pub use types::*;

use anyhow::{Context, Result};
use ffplan_av::Prober;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./ffplan.toml",
        "~/.config/ffplan/config.toml",
        "/etc/ffplan/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.probe.allowed_categories.is_empty() {
        anyhow::bail!("probe.allowed_categories cannot be empty");
    }

    for (group, tokens) in [
        ("generic", &config.options.generic),
        ("main", &config.options.main),
        ("advanced", &config.options.advanced),
    ] {
        if tokens.iter().any(|t| t.trim().is_empty()) {
            anyhow::bail!("options.{} contains an empty token", group);
        }
    }

    config
        .policy
        .validate()
        .with_context(|| format!("Invalid [policy] of kind '{}'", config.policy.kind()))?;

    for (name, path) in [
        ("ffprobe", &config.tools.ffprobe_path),
        ("ffmpeg", &config.tools.ffmpeg_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}

/// A prober set up from the `[tools]` and `[probe]` sections.
pub fn build_prober(config: &Config) -> Prober {
    let prober =
        Prober::new().with_allowed_categories(config.probe.allowed_categories.iter().copied());
    match &config.tools.ffprobe_path {
        Some(path) => prober.with_ffprobe_path(path),
        None => prober,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffplan_av::policies::PolicyConfig;
    use ffplan_av::CommandOptions;
    use ffplan_common::ContentCategory;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [tools]
            ffprobe_path = "/usr/bin/ffprobe"

            [probe]
            allowed_categories = ["video"]

            [options]
            main = ["-map_metadata", "-1"]
            advanced = ["-max_muxing_queue_size", "9999"]
            replace_advanced = true

            [policy]
            kind = "audio_encoder"
            codec = "ac3"
            channel_bitrates = true
            "#,
        )
        .unwrap();

        assert_eq!(config.probe.allowed_categories, vec![ContentCategory::Video]);
        assert!(matches!(config.policy, PolicyConfig::AudioEncoder(ref p) if p.codec == "ac3"));
        validate_config(&config).unwrap();

        let mut options = CommandOptions::default();
        config.options.apply(&mut options);
        assert_eq!(options.main.as_slice(), ["-map_metadata", "-1"]);
        assert_eq!(options.advanced.as_slice(), ["-max_muxing_queue_size", "9999"]);
        assert_eq!(options.generic.as_slice(), ["-hide_banner", "-loglevel", "info"]);
    }

    #[test]
    fn test_options_override_default_keys() {
        let config: Config = toml::from_str(
            r#"
            [options]
            generic = ["-loglevel", "error"]
            advanced = ["-max_muxing_queue_size", "9999"]
            "#,
        )
        .unwrap();

        let mut options = CommandOptions::default();
        config.options.apply(&mut options);
        assert_eq!(options.generic.as_slice(), ["-hide_banner", "-loglevel", "error"]);
        assert_eq!(
            options.advanced.as_slice(),
            ["-strict", "-2", "-max_muxing_queue_size", "9999"]
        );
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.probe.allowed_categories.len(), 3);
        assert_eq!(config.policy.kind(), "video_encoder");
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_rejects_empty_language_filter() {
        let config: Config = toml::from_str(
            r#"
            [policy]
            kind = "language_filter"
            "#,
        )
        .unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_unknown_encoder() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [policy]
            kind = "video_encoder"
            encoder = "libvpx"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffplan.toml");
        std::fs::write(&path, "[policy]\nkind = \"image_subtitles\"\n").unwrap();

        let config = load_config_or_default(Some(&path)).unwrap();
        assert_eq!(config.policy, PolicyConfig::ImageSubtitles);
    }

    #[test]
    fn test_sample_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/ffplan.toml");
        let config = load_config(&path).unwrap();

        assert_matches::assert_matches!(
            config.policy,
            PolicyConfig::VideoEncoder(ref p) if p.max_width == Some(1920) && p.strip_data_streams
        );
        assert_eq!(
            config.probe.allowed_categories,
            vec![ContentCategory::Video, ContentCategory::Audio]
        );
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = load_config_or_default(Some(Path::new("/definitely/not/ffplan.toml")));
        assert!(result.is_err());
    }
}
