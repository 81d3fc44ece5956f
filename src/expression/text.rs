//! Full-text predicates.

use serde::{Deserialize, Serialize};

/// How the terms of a [`TextPredicate`] are matched against an analyzed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    /// Every analyzed token must match.
    All,
    /// At least `minimum_should_match` tokens must match.
    Any,
    /// Tokens must match as an exact phrase.
    Phrase,
    /// Every token must match, the last one as a prefix.
    BooleanPrefix,
    /// The term is parsed with the engine's query-string syntax.
    Parsed,
}

fn default_minimum_should_match() -> u32 {
    1
}

/// A relevance-scored full-text predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPredicate {
    pub field: String,
    pub term: String,
    pub match_type: MatchType,
    /// Only used by [`MatchType::Any`].
    #[serde(default = "default_minimum_should_match")]
    pub minimum_should_match: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expansions: Option<u32>,
}

impl TextPredicate {
    pub fn new(field: impl Into<String>, term: impl Into<String>, match_type: MatchType) -> Self {
        TextPredicate {
            field: field.into(),
            term: term.into(),
            match_type,
            minimum_should_match: default_minimum_should_match(),
            analyzer: None,
            fuzziness: None,
            prefix_length: None,
            max_expansions: None,
        }
    }

    pub fn with_minimum_should_match(mut self, minimum: u32) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Enable fuzzy matching, e.g. `"AUTO"` or `"2"`.
    pub fn with_fuzziness(mut self, fuzziness: impl Into<String>) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub fn with_prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = Some(prefix_length);
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: u32) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }
}

/// Finds documents similar to the given texts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoreLikeThis {
    pub fields: Vec<String>,
    pub like_texts: Vec<String>,
    #[serde(default)]
    pub unlike_texts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_query_terms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_term_freq: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_doc_freq: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_word_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_word_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,
}

impl MoreLikeThis {
    pub fn new<F, S>(fields: F, like_texts: impl IntoIterator<Item = S>) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MoreLikeThis {
            fields: fields.into_iter().map(Into::into).collect(),
            like_texts: like_texts.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_unlike_texts<S: Into<String>>(
        mut self,
        texts: impl IntoIterator<Item = S>,
    ) -> Self {
        self.unlike_texts = texts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_query_terms(mut self, value: u32) -> Self {
        self.max_query_terms = Some(value);
        self
    }

    pub fn with_min_term_freq(mut self, value: u32) -> Self {
        self.min_term_freq = Some(value);
        self
    }

    pub fn with_min_doc_freq(mut self, value: u32) -> Self {
        self.min_doc_freq = Some(value);
        self
    }

    pub fn with_min_word_length(mut self, value: u32) -> Self {
        self.min_word_length = Some(value);
        self
    }

    pub fn with_max_word_length(mut self, value: u32) -> Self {
        self.max_word_length = Some(value);
        self
    }

    pub fn with_minimum_should_match(mut self, value: impl Into<String>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }
}
