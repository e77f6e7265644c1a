//! The accumulated stream plan.

use ffplan_common::StreamCategory;
use serde::Serialize;

use super::policy::Fragment;

/// Running per-category stream counters.
///
/// Every visited stream bumps its category's counter, whether it was copied,
/// re-encoded or dropped, so the counter always equals the category-relative
/// index ffmpeg itself assigns to the next stream of that category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounters([usize; 5]);

impl CategoryCounters {
    /// The current count for a category.
    pub fn get(&self, category: StreamCategory) -> usize {
        self.0[category.ordinal()]
    }

    /// Return the current count for a category, then increment it.
    pub fn next(&mut self, category: StreamCategory) -> usize {
        let slot = &mut self.0[category.ordinal()];
        let current = *slot;
        *slot += 1;
        current
    }
}

/// Ordered stream directives plus the counters used to build them.
///
/// Append-only while being built; a fresh plan is built per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamPlan {
    mapping: Vec<String>,
    encoding: Vec<String>,
    filter_graphs: Vec<String>,
    counters: CategoryCounters,
    needs_processing: bool,
}

impl StreamPlan {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim the category-relative index for the next stream of `category`.
    pub(crate) fn next_index(&mut self, category: StreamCategory) -> usize {
        self.counters.next(category)
    }

    pub(crate) fn counters_mut(&mut self) -> &mut CategoryCounters {
        &mut self.counters
    }

    /// Append a validated fragment.
    pub(crate) fn push(&mut self, fragment: Fragment) {
        self.mapping.extend(fragment.mapping);
        self.encoding.extend(fragment.encoding);
        if let Some(graph) = fragment.filter_graph {
            self.filter_graphs.push(graph);
        }
    }

    pub(crate) fn mark_processing(&mut self) {
        self.needs_processing = true;
    }

    /// All `-map` directives, in stream order.
    pub fn mapping(&self) -> &[String] {
        &self.mapping
    }

    /// All codec directives, in stream order.
    pub fn encoding(&self) -> &[String] {
        &self.encoding
    }

    /// Filter graphs contributed by individual streams.
    pub fn filter_graphs(&self) -> &[String] {
        &self.filter_graphs
    }

    /// The combined `-filter_complex` value, if any stream needs one.
    pub fn filter_complex(&self) -> Option<String> {
        (!self.filter_graphs.is_empty()).then(|| self.filter_graphs.join(";"))
    }

    /// How many streams of a category were visited.
    pub fn count(&self, category: StreamCategory) -> usize {
        self.counters.get(category)
    }

    pub fn counters(&self) -> CategoryCounters {
        self.counters
    }

    /// Whether at least one stream was re-encoded, filtered or dropped.
    pub fn needs_processing(&self) -> bool {
        self.needs_processing
    }
}
