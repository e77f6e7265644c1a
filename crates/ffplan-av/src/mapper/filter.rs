//! Labelled filter chains for `-filter_complex`.

use ffplan_common::StreamCategory;

/// Builds a single filter graph for one stream by chaining filters through
/// synthetic labels.
///
/// For the second video stream with `crop` then `scale`, the graph is
/// `[0:v:1]crop=..[0:vf:1-1];[0:vf:1-1]scale=..[0:vf:1-2]` and the stream is
/// then mapped from `[0:vf:1-2]` instead of `0:v:1`.
#[derive(Debug, Clone)]
pub struct FilterChain {
    category: StreamCategory,
    index: usize,
    filters: Vec<String>,
}

/// A finished chain: the graph text and the label to map from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGraph {
    /// The full graph expression.
    pub graph: String,
    /// The final label, brackets included, for use with `-map`.
    pub output_label: String,
}

impl FilterChain {
    /// Start a chain reading from the stream at `index` within `category`.
    pub fn new(category: StreamCategory, index: usize) -> Self {
        Self {
            category,
            index,
            filters: Vec::new(),
        }
    }

    /// Append a filter; blank filters are ignored.
    pub fn push(&mut self, filter: impl AsRef<str>) -> &mut Self {
        let filter = filter.as_ref().trim();
        if !filter.is_empty() {
            self.filters.push(filter.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Join the filters into one graph, or `None` if no filter was added.
    pub fn build(&self) -> Option<FilterGraph> {
        if self.filters.is_empty() {
            return None;
        }

        let spec = self.category.specifier();
        let mut label = format!("0:{}:{}", spec, self.index);
        let mut graph = String::new();

        for (count, filter) in self.filters.iter().enumerate() {
            if !graph.is_empty() {
                graph.push(';');
            }
            let next = format!("0:{}f:{}-{}", spec, self.index, count + 1);
            graph.push_str(&format!("[{label}]{filter}[{next}]"));
            label = next;
        }

        Some(FilterGraph {
            graph,
            output_label: format!("[{label}]"),
        })
    }
}
