//! Plan the ffmpeg invocation for a single file.
//!
//! Each call builds its own prober and mapper; nothing is shared between
//! files.

use std::path::Path;

use anyhow::{Context, Result};
use ffplan_av::{MediaProbe, StreamMapper};
use serde::Serialize;

use crate::config::{build_prober, Config};

/// What should happen to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TaskPlan {
    /// Every stream would be copied unchanged; don't run ffmpeg.
    Skip,
    /// Run ffmpeg with these arguments.
    Transcode { args: Vec<String> },
}

impl TaskPlan {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    pub fn args(&self) -> Option<&[String]> {
        match self {
            Self::Skip => None,
            Self::Transcode { args } => Some(args),
        }
    }
}

/// Probe `input` and plan the command that writes `output`.
pub fn plan_file(config: &Config, input: &Path, output: &Path) -> Result<TaskPlan> {
    let probe = build_prober(config)
        .probe(input)
        .with_context(|| format!("Failed to probe {:?}", input))?;

    plan_probe(config, &probe, input, output)
}

/// Plan the command for an already probed file.
pub fn plan_probe(
    config: &Config,
    probe: &MediaProbe,
    input: &Path,
    output: &Path,
) -> Result<TaskPlan> {
    let mut mapper = StreamMapper::new(config.policy.build());
    config.options.apply(mapper.options_mut());
    mapper.set_probe(probe);

    if !mapper
        .streams_need_processing()
        .context("Failed to build stream plan")?
    {
        tracing::info!("No streams in {:?} need processing", input);
        return Ok(TaskPlan::Skip);
    }

    mapper.set_input(input)?;
    mapper.set_output(output)?;
    let args = mapper
        .ffmpeg_args()
        .context("Failed to assemble ffmpeg arguments")?;

    tracing::debug!("ffmpeg {}", args.join(" "));
    Ok(TaskPlan::Transcode { args })
}
