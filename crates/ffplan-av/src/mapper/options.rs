//! Ordered ffmpeg option lists.
//!
//! ffmpeg arguments are positional, so options are kept as a flat token
//! vector rather than a map: repeated flags and ordering survive intact.

use serde::{Deserialize, Serialize};

/// A flat, ordered list of ffmpeg option tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionList {
    tokens: Vec<String>,
}

impl OptionList {
    /// An empty option list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from raw tokens, kept exactly as given.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Set a bare flag such as `-sn`.
    ///
    /// A flag that is already present is moved to the end.
    pub fn set_flag(&mut self, flag: impl Into<String>) -> &mut Self {
        let flag = flag.into();
        self.tokens.retain(|t| *t != flag);
        self.tokens.push(flag);
        self
    }

    /// Set a key/value option such as `-loglevel info`.
    ///
    /// If the key is already present its value is replaced in place,
    /// otherwise the pair is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.tokens.iter().position(|t| *t == key) {
            Some(pos) if pos + 1 < self.tokens.len() => self.tokens[pos + 1] = value,
            Some(_) => self.tokens.push(value),
            None => {
                self.tokens.push(key);
                self.tokens.push(value);
            }
        }
        self
    }

    /// Layer user tokens over this list, key by key.
    ///
    /// A `-key` followed by a value (any token not starting with `-`, or a
    /// number such as `-1`) goes through [`set`](Self::set). Any other
    /// token goes through [`set_flag`](Self::set_flag).
    pub fn merge<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::<String>::into).peekable();
        while let Some(token) = tokens.next() {
            let takes_value = token.starts_with('-')
                && tokens.peek().is_some_and(|next| is_option_value(next));
            match tokens.next_if(|_| takes_value) {
                Some(value) => self.set(token, value),
                None => self.set_flag(token),
            };
        }
        self
    }

    /// Discard every token and use `tokens` instead.
    pub fn replace<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// The value following `key`, if the key is present.
    pub fn get(&self, key: &str) -> Option<&str> {
        let pos = self.tokens.iter().position(|t| t == key)?;
        self.tokens.get(pos + 1).map(String::as_str)
    }

    /// Whether a token equal to `flag` is present.
    pub fn contains(&self, flag: &str) -> bool {
        self.tokens.iter().any(|t| t == flag)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// The tokens in order.
    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }
}

fn is_option_value(token: &str) -> bool {
    !token.starts_with('-') || token.parse::<f64>().is_ok()
}

impl<S: Into<String>> FromIterator<S> for OptionList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}

/// The three option groups that surround the stream directives in an
/// ffmpeg command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOptions {
    /// Global options placed before `-i`.
    pub generic: OptionList,
    /// Options placed straight after the input file.
    pub main: OptionList,
    /// Options placed after the main options, before stream mapping.
    pub advanced: OptionList,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            generic: OptionList::from_tokens(["-hide_banner", "-loglevel", "info"]),
            main: OptionList::new(),
            advanced: OptionList::from_tokens(["-strict", "-2", "-max_muxing_queue_size", "4096"]),
        }
    }
}
