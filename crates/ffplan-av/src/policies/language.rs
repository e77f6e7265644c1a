//! Language-based stream removal.

use ffplan_common::StreamCategory;
use serde::{Deserialize, Serialize};

use crate::mapper::{Fragment, StreamPolicy};
use crate::probe::StreamDescriptor;
use crate::Result;

/// Drop audio and subtitle streams tagged with one of the listed languages.
///
/// A stream matches when its `language` tag contains a listed value,
/// ignoring case, so `en` also matches `eng`. Streams without a language
/// tag are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageFilterPolicy {
    pub audio_languages: Vec<String>,
    pub subtitle_languages: Vec<String>,
}

impl LanguageFilterPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audio_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.audio_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subtitle_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtitle_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    fn languages_for(&self, category: Option<StreamCategory>) -> &[String] {
        match category {
            Some(StreamCategory::Audio) => &self.audio_languages,
            Some(StreamCategory::Subtitle) => &self.subtitle_languages,
            _ => &[],
        }
    }
}

impl StreamPolicy for LanguageFilterPolicy {
    fn name(&self) -> &str {
        "language_filter"
    }

    fn categories(&self) -> &[StreamCategory] {
        &[StreamCategory::Audio, StreamCategory::Subtitle]
    }

    fn needs_processing(&self, stream: &StreamDescriptor) -> bool {
        let Some(tag) = stream.language() else {
            tracing::debug!("Stream #{} has no 'language' tag; keeping it", stream.index);
            return false;
        };
        let tag = tag.to_lowercase();

        self.languages_for(stream.category())
            .iter()
            .map(|l| l.trim().to_lowercase())
            .any(|l| !l.is_empty() && tag.contains(&l))
    }

    fn synthesize(&self, _stream: &StreamDescriptor, _index: usize) -> Result<Fragment> {
        Ok(Fragment::drop_stream())
    }
}
