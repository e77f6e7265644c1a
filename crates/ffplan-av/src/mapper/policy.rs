//! The per-stream decision strategy plugged into the mapper.

use ffplan_common::StreamCategory;

use super::options::CommandOptions;
use super::plan::CategoryCounters;
use crate::probe::{MediaProbe, StreamDescriptor};
use crate::{Error, Result};

/// Decides, stream by stream, what the ffmpeg command should do.
///
/// The mapper only consults a policy for streams whose category is listed
/// in [`StreamPolicy::categories`]; every other stream is copied through.
pub trait StreamPolicy {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// The stream categories this policy evaluates.
    fn categories(&self) -> &[StreamCategory];

    /// Whether the stream must be changed (re-encoded, filtered or dropped).
    ///
    /// `false` means the stream is copied through untouched.
    fn needs_processing(&self, stream: &StreamDescriptor) -> bool;

    /// Build the directives for a stream that needs processing.
    ///
    /// `index` is the stream's position among streams of its own category,
    /// which is how ffmpeg addresses it (`0:a:2`, `-c:a:2`).
    fn synthesize(&self, stream: &StreamDescriptor, index: usize) -> Result<Fragment>;

    /// Contribute default options once, when the mapper is created.
    fn configure(&self, _options: &mut CommandOptions) {}

    /// Extra output streams, planned after every input stream.
    ///
    /// `counters` holds how many streams of each category were visited; a
    /// policy claims the output index of each stream it adds with
    /// [`CategoryCounters::next`].
    fn append_streams(
        &self,
        _probe: &MediaProbe,
        _counters: &mut CategoryCounters,
    ) -> Result<Vec<Fragment>> {
        Ok(Vec::new())
    }
}

impl<P: StreamPolicy + ?Sized> StreamPolicy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn categories(&self) -> &[StreamCategory] {
        (**self).categories()
    }

    fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
        (**self).needs_processing(stream)
    }

    fn synthesize(&self, stream: &StreamDescriptor, index: usize) -> Result<Fragment> {
        (**self).synthesize(stream, index)
    }

    fn configure(&self, options: &mut CommandOptions) {
        (**self).configure(options)
    }

    fn append_streams(
        &self,
        probe: &MediaProbe,
        counters: &mut CategoryCounters,
    ) -> Result<Vec<Fragment>> {
        (**self).append_streams(probe, counters)
    }
}

/// The directives a policy produces for one stream.
///
/// Both lists empty means "drop this stream". Otherwise both must be
/// non-empty, and the mapping list must consist of `-map <source>` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// `-map` directives.
    pub mapping: Vec<String>,
    /// Codec and parameter directives.
    pub encoding: Vec<String>,
    /// An optional filter graph, carried into `-filter_complex`.
    pub filter_graph: Option<String>,
}

impl Fragment {
    /// A fragment with the given mapping and encoding directives.
    pub fn new<M, E, S, T>(mapping: M, encoding: E) -> Self
    where
        M: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            mapping: mapping.into_iter().map(Into::into).collect(),
            encoding: encoding.into_iter().map(Into::into).collect(),
            filter_graph: None,
        }
    }

    /// Copy the stream through unchanged.
    pub fn copy(category: StreamCategory, index: usize) -> Self {
        let spec = category.specifier();
        Self::new(
            ["-map".to_string(), format!("0:{spec}:{index}")],
            [format!("-c:{spec}:{index}"), "copy".to_string()],
        )
    }

    /// Remove the stream from the output.
    pub fn drop_stream() -> Self {
        Self::default()
    }

    /// Attach a filter graph.
    pub fn with_filter_graph(mut self, graph: impl Into<String>) -> Self {
        self.filter_graph = Some(graph.into());
        self
    }

    /// Whether this fragment drops its stream.
    pub fn is_drop(&self) -> bool {
        self.mapping.is_empty() && self.encoding.is_empty()
    }

    /// Check the fragment's shape.
    ///
    /// # Errors
    ///
    /// [`Error::ContractViolation`] if exactly one list is empty, the mapping
    /// list is not made of `-map <source>` pairs, or a dropped stream carries
    /// a filter graph.
    pub fn validate(&self) -> Result<()> {
        match (self.mapping.is_empty(), self.encoding.is_empty()) {
            (true, true) => {
                if self.filter_graph.is_some() {
                    return Err(Error::contract(
                        "a dropped stream cannot carry a filter graph",
                    ));
                }
                return Ok(());
            }
            (false, true) => {
                return Err(Error::contract(
                    "fragment has stream mapping but no stream encoding",
                ))
            }
            (true, false) => {
                return Err(Error::contract(
                    "fragment has stream encoding but no stream mapping",
                ))
            }
            (false, false) => {}
        }

        let pairs_ok = self.mapping.len() % 2 == 0
            && self
                .mapping
                .chunks(2)
                .all(|pair| pair[0] == "-map" && !pair[1].is_empty());
        if !pairs_ok {
            return Err(Error::contract(format!(
                "stream mapping must be '-map <source>' pairs, got {:?}",
                self.mapping
            )));
        }

        if !self.encoding[0].starts_with('-') {
            return Err(Error::contract(format!(
                "stream encoding must start with an option, got {:?}",
                self.encoding
            )));
        }

        if matches!(self.filter_graph.as_deref(), Some(g) if g.trim().is_empty()) {
            return Err(Error::contract("filter graph is empty"));
        }

        Ok(())
    }
}
