//! ffmpeg stream mapping and command assembly.
//!
//! A [`StreamMapper`] walks a probe's streams in their reported order, asks a
//! [`StreamPolicy`] what to do with each one, and accumulates the result in a
//! [`StreamPlan`]. The final argument vector is always assembled as:
//!
//! ```text
//! generic  -i <input>  main  advanced [-filter_complex ..]  mapping  encoding  -y <output>
//! ```
//!
//! # Example
//!
//! ```
//! use ffplan_av::mapper::{Fragment, StreamMapper, StreamPolicy};
//! use ffplan_av::probe::{MediaProbe, StreamDescriptor};
//! use ffplan_common::StreamCategory;
//!
//! struct DropAudio;
//!
//! impl StreamPolicy for DropAudio {
//!     fn name(&self) -> &str { "drop_audio" }
//!     fn categories(&self) -> &[StreamCategory] { &[StreamCategory::Audio] }
//!     fn needs_processing(&self, _: &StreamDescriptor) -> bool { true }
//!     fn synthesize(&self, _: &StreamDescriptor, _: usize) -> ffplan_av::Result<Fragment> {
//!         Ok(Fragment::drop_stream())
//!     }
//! }
//!
//! let probe = MediaProbe::from_json(r#"{"format": {}, "streams": [
//!     {"index": 0, "codec_type": "video", "codec_name": "h264"},
//!     {"index": 1, "codec_type": "audio", "codec_name": "aac"}
//! ]}"#)?;
//!
//! let mut mapper = StreamMapper::new(DropAudio);
//! mapper.set_probe(&probe);
//! assert!(mapper.streams_need_processing()?);
//! assert_eq!(mapper.plan()?.mapping(), ["-map", "0:v:0"]);
//! # Ok::<(), ffplan_av::Error>(())
//! ```

mod filter;
mod options;
mod plan;
mod policy;

pub use filter::{FilterChain, FilterGraph};
pub use options::{CommandOptions, OptionList};
pub use plan::{CategoryCounters, StreamPlan};
pub use policy::{Fragment, StreamPolicy};

use std::path::{Path, PathBuf};

use crate::probe::MediaProbe;
use crate::{Error, Result};

/// Where a mapper is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperState {
    /// No probe attached yet.
    Unconfigured,
    /// A probe is attached but no plan has been built.
    Configured,
    /// The plan has been built.
    Planned,
    /// The argument vector has been emitted.
    Finalized,
}

/// Builds the ffmpeg argument vector for one file.
///
/// Create one mapper per file; nothing is shared between instances.
pub struct StreamMapper<'a, P: StreamPolicy> {
    policy: P,
    options: CommandOptions,
    probe: Option<&'a MediaProbe>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    plan: Option<StreamPlan>,
    finalized: bool,
}

impl<'a, P: StreamPolicy> StreamMapper<'a, P> {
    /// Create a mapper with the default options, then let the policy add its
    /// own.
    pub fn new(policy: P) -> Self {
        let mut options = CommandOptions::default();
        policy.configure(&mut options);

        Self {
            policy,
            options,
            probe: None,
            input: None,
            output: None,
            plan: None,
            finalized: false,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// Mutable access to the option groups.
    pub fn options_mut(&mut self) -> &mut CommandOptions {
        self.finalized = false;
        &mut self.options
    }

    /// Attach a probe document, discarding any plan built for a previous one.
    pub fn set_probe(&mut self, probe: &'a MediaProbe) {
        self.probe = Some(probe);
        self.plan = None;
        self.finalized = false;
    }

    /// Set the input file; relative paths are made absolute.
    pub fn set_input(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.input = Some(std::path::absolute(path.as_ref())?);
        self.finalized = false;
        Ok(())
    }

    /// Set the output file; relative paths are made absolute.
    pub fn set_output(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.output = Some(std::path::absolute(path.as_ref())?);
        self.finalized = false;
        Ok(())
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn state(&self) -> MapperState {
        if self.probe.is_none() {
            MapperState::Unconfigured
        } else if self.finalized {
            MapperState::Finalized
        } else if self.plan.is_some() {
            MapperState::Planned
        } else {
            MapperState::Configured
        }
    }

    /// The stream plan, built on first access.
    ///
    /// # Errors
    ///
    /// [`Error::ContractViolation`] if no probe is attached or the policy
    /// returns a malformed fragment; any error the policy itself returns.
    pub fn plan(&mut self) -> Result<&StreamPlan> {
        if self.plan.is_none() {
            let probe = self
                .probe
                .ok_or_else(|| Error::contract("no probe has been attached"))?;
            self.plan = Some(self.build_plan(probe)?);
        }

        self.plan
            .as_ref()
            .ok_or_else(|| Error::contract("stream plan missing after build"))
    }

    /// Whether any stream needs to be re-encoded, filtered or dropped.
    ///
    /// When this is `false` running ffmpeg would only copy every stream, so
    /// callers should skip the file.
    pub fn streams_need_processing(&mut self) -> Result<bool> {
        Ok(self.plan()?.needs_processing())
    }

    /// Whether the input's extension differs from `extension`.
    ///
    /// A leading dot on `extension` is ignored.
    pub fn container_needs_remuxing(&self, extension: &str) -> Result<bool> {
        let input = self
            .input
            .as_deref()
            .ok_or_else(|| Error::contract("input file has not been set"))?;
        let current = input
            .extension()
            .map(|e| e.to_string_lossy())
            .unwrap_or_default();
        Ok(!current.eq_ignore_ascii_case(extension.trim_start_matches('.')))
    }

    /// Assemble the full ffmpeg argument vector.
    ///
    /// # Errors
    ///
    /// [`Error::ContractViolation`] if the input or output file is unset, no
    /// probe is attached, or planning fails. No partial vector is returned.
    pub fn ffmpeg_args(&mut self) -> Result<Vec<String>> {
        let input = self
            .input
            .clone()
            .ok_or_else(|| Error::contract("input file has not been set"))?;
        let output = self
            .output
            .clone()
            .ok_or_else(|| Error::contract("output file has not been set"))?;

        self.plan()?;
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| Error::contract("stream plan missing after build"))?;
        let mut advanced = self.options.advanced.clone();
        if let Some(filter_complex) = plan.filter_complex() {
            advanced.set("-filter_complex", filter_complex);
        }

        let mut args = Vec::with_capacity(
            self.options.generic.len()
                + self.options.main.len()
                + advanced.len()
                + plan.mapping().len()
                + plan.encoding().len()
                + 4,
        );
        args.extend_from_slice(self.options.generic.as_slice());
        args.push("-i".to_string());
        args.push(input.to_string_lossy().into_owned());
        args.extend_from_slice(self.options.main.as_slice());
        args.extend_from_slice(advanced.as_slice());
        args.extend_from_slice(plan.mapping());
        args.extend_from_slice(plan.encoding());
        args.push("-y".to_string());
        args.push(output.to_string_lossy().into_owned());

        self.finalized = true;
        Ok(args)
    }

    fn build_plan(&self, probe: &MediaProbe) -> Result<StreamPlan> {
        let mut plan = StreamPlan::new();
        let evaluated = self.policy.categories();

        for stream in &probe.streams {
            let Some(category) = stream.category() else {
                tracing::debug!(
                    "Stream #{} has unsupported codec_type '{}'; not mapped",
                    stream.index,
                    stream.codec_type
                );
                continue;
            };

            let index = plan.next_index(category);

            if !evaluated.contains(&category) || !self.policy.needs_processing(stream) {
                plan.push(Fragment::copy(category, index));
                continue;
            }

            let fragment = self.policy.synthesize(stream, index)?;
            fragment.validate()?;

            tracing::debug!(
                "{}: stream #{} ({} {}:{}) {}",
                self.policy.name(),
                stream.index,
                stream.codec_name,
                category.specifier(),
                index,
                if fragment.is_drop() { "dropped" } else { "processed" }
            );

            plan.push(fragment);
            plan.mark_processing();
        }

        for fragment in self.policy.append_streams(probe, plan.counters_mut())? {
            fragment.validate()?;
            if fragment.is_drop() {
                continue;
            }
            tracing::debug!(
                "{}: adding output stream from {}",
                self.policy.name(),
                fragment.mapping.get(1).map(String::as_str).unwrap_or("?")
            );
            plan.push(fragment);
            plan.mark_processing();
        }

        tracing::info!(
            "Planned {} streams with {} (processing needed: {})",
            probe.streams.len(),
            self.policy.name(),
            plan.needs_processing()
        );

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::StreamDescriptor;
    use assert_matches::assert_matches;
    use ffplan_common::StreamCategory;

    /// Re-encodes every audio stream that isn't AAC.
    struct ToAac;

    impl StreamPolicy for ToAac {
        fn name(&self) -> &str {
            "to_aac"
        }

        fn categories(&self) -> &[StreamCategory] {
            &[StreamCategory::Audio]
        }

        fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
            stream.codec() != "aac"
        }

        fn synthesize(&self, _stream: &StreamDescriptor, index: usize) -> Result<Fragment> {
            Ok(Fragment::new(
                ["-map".to_string(), format!("0:a:{index}")],
                [format!("-c:a:{index}"), "aac".to_string()],
            ))
        }
    }

    fn stream(index: u32, codec_type: &str, codec_name: &str) -> StreamDescriptor {
        StreamDescriptor {
            index,
            codec_type: codec_type.to_string(),
            codec_name: codec_name.to_string(),
            ..Default::default()
        }
    }

    fn probe(streams: Vec<StreamDescriptor>) -> MediaProbe {
        MediaProbe {
            streams,
            ..Default::default()
        }
    }

    #[test]
    fn state_transitions() {
        let p = probe(vec![stream(0, "audio", "ac3")]);
        let mut mapper = StreamMapper::new(ToAac);
        assert_eq!(mapper.state(), MapperState::Unconfigured);

        mapper.set_probe(&p);
        assert_eq!(mapper.state(), MapperState::Configured);

        mapper.plan().unwrap();
        assert_eq!(mapper.state(), MapperState::Planned);

        mapper.set_input("/in/a.mkv").unwrap();
        mapper.set_output("/out/a.mkv").unwrap();
        mapper.ffmpeg_args().unwrap();
        assert_eq!(mapper.state(), MapperState::Finalized);

        mapper.set_probe(&p);
        assert_eq!(mapper.state(), MapperState::Configured);
    }

    #[test]
    fn unknown_codec_type_is_skipped_and_not_counted() {
        let p = probe(vec![
            stream(0, "unknown", "bin_data"),
            stream(1, "audio", "ac3"),
        ]);
        let mut mapper = StreamMapper::new(ToAac);
        mapper.set_probe(&p);
        let plan = mapper.plan().unwrap();
        assert_eq!(plan.mapping(), ["-map", "0:a:0"]);
        assert_eq!(plan.count(StreamCategory::Audio), 1);
    }

    #[test]
    fn plan_without_probe_is_contract_violation() {
        let mut mapper = StreamMapper::new(ToAac);
        assert_matches!(mapper.plan(), Err(Error::ContractViolation(_)));
    }

    #[test]
    fn empty_probe_needs_no_processing() {
        let p = probe(vec![]);
        let mut mapper = StreamMapper::new(ToAac);
        mapper.set_probe(&p);
        assert!(!mapper.streams_need_processing().unwrap());
    }

    #[test]
    fn remuxing_check() {
        let mut mapper = StreamMapper::new(ToAac);
        assert_matches!(
            mapper.container_needs_remuxing("mkv"),
            Err(Error::ContractViolation(_))
        );

        mapper.set_input("/media/movie.mkv").unwrap();
        assert!(!mapper.container_needs_remuxing("mkv").unwrap());
        assert!(!mapper.container_needs_remuxing(".mkv").unwrap());
        assert!(mapper.container_needs_remuxing("mp4").unwrap());
    }

    #[test]
    fn relative_paths_become_absolute() {
        let mut mapper = StreamMapper::new(ToAac);
        mapper.set_input("movie.mkv").unwrap();
        assert!(mapper.input().unwrap().is_absolute());
    }
}
