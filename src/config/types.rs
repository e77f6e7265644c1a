use ffplan_av::policies::PolicyConfig;
use ffplan_av::CommandOptions;
use ffplan_common::ContentCategory;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffprobe executable; searched on PATH when unset.
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    /// Explicit ffmpeg executable; only checked by `check-tools`.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Content categories worth running ffprobe on.
    #[serde(default = "default_allowed_categories")]
    pub allowed_categories: Vec<ContentCategory>,
}

fn default_allowed_categories() -> Vec<ContentCategory> {
    ffplan_av::probe::DEFAULT_ALLOWED_CATEGORIES.to_vec()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            allowed_categories: default_allowed_categories(),
        }
    }
}

/// Extra ffmpeg option tokens.
///
/// Tokens are merged into the built-in defaults: a key that is already
/// present gets the new value, anything else is added at the end. The
/// `replace_*` flags discard the defaults instead.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OptionsConfig {
    #[serde(default)]
    pub generic: Vec<String>,

    #[serde(default)]
    pub main: Vec<String>,

    #[serde(default)]
    pub advanced: Vec<String>,

    #[serde(default)]
    pub replace_main: bool,

    #[serde(default)]
    pub replace_advanced: bool,
}

impl OptionsConfig {
    /// Apply these settings on top of a mapper's options.
    pub fn apply(&self, options: &mut CommandOptions) {
        options.generic.merge(self.generic.iter().cloned());

        if self.replace_main {
            options.main.replace(self.main.iter().cloned());
        } else {
            options.main.merge(self.main.iter().cloned());
        }

        if self.replace_advanced {
            options.advanced.replace(self.advanced.iter().cloned());
        } else {
            options.advanced.merge(self.advanced.iter().cloned());
        }
    }
}
