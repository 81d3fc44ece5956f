//! Wire bodies of backend query nodes.
//!
//! Field names follow the backend's native query DSL, so every body serializes
//! to exactly the JSON object the backend expects under its node kind (and,
//! for field-level queries, under the field name).

use serde::{Deserialize, Serialize};

use crate::expression::Script;

/// Boolean operator combining analyzed tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
}

/// How scores of matching nested documents combine into the parent score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    Avg,
    Max,
    Min,
    None,
    Sum,
}

/// How a function score combines with the query score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostMode {
    Multiply,
    Replace,
    Sum,
    Avg,
    Max,
    Min,
}

/// Body of nodes that carry nothing but a boost (`match_all`, `match_none`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoostBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermBody {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBody {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expansions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPhraseBody {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBoolPrefixBody {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStringBody {
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_leading_wildcard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixBody {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

/// Body shared by `regexp` and `wildcard` nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternBody {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

/// Body of a `bool` node.
///
/// Clause lists default to empty on input without requiring `Q: Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "Q: Deserialize<'de>"))]
pub struct BoolBody<Q> {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Q>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Q>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Q>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Q>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

impl<Q> BoolBody<Q> {
    pub fn new(boost: Option<f32>) -> Self {
        BoolBody {
            must: Vec::new(),
            must_not: Vec::new(),
            should: Vec::new(),
            filter: Vec::new(),
            minimum_should_match: None,
            boost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBody<Q> {
    pub path: String,
    pub query: Box<Q>,
    pub score_mode: ScoreMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisMaxBody<Q> {
    pub queries: Vec<Q>,
    pub tie_breaker: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptQueryBody {
    pub script: Script,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptScoreFunction {
    pub script: Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFunction {
    pub script_score: ScriptScoreFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionScoreBody<Q> {
    pub query: Box<Q>,
    pub boost_mode: BoostMode,
    pub functions: Vec<ScoreFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoreLikeThisBody {
    pub fields: Vec<String>,
    pub like: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlike: Vec<String>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}
