//! Backend query construction.
//!
//! The compiler never builds backend queries itself; it calls a [`QuerySink`]
//! for every node. A sink decides the representation of the compiled tree,
//! which lets a single compiler target client generations whose query types
//! are incompatible with each other.
//!
//! # Module Structure
//!
//! - `body`: wire bodies shared by every sink
//! - `dsl`: typed query tree of the current client generation
//! - `json`: raw request-body JSON of the legacy client generation

pub mod body;
pub mod dsl;
pub mod json;

use std::fmt::Debug;

use crate::backend::body::{
    BoolBody, DisMaxBody, FunctionScoreBody, MatchBody, MatchBoolPrefixBody, MatchPhraseBody,
    MoreLikeThisBody, NestedBody, PatternBody, PrefixBody, QueryStringBody, RangeBody,
    ScriptQueryBody, TermBody,
};

pub use dsl::{DslSink, Query};
pub use json::JsonSink;

/// Constructors for every backend query node the compiler emits.
///
/// Every node accepts an optional boost; `None` leaves the backend default.
pub trait QuerySink: Send + Sync {
    /// The compiled query representation.
    type Query: Clone + Debug;

    fn match_all(&self, boost: Option<f32>) -> Self::Query;

    /// A node matching no document.
    fn match_none(&self, boost: Option<f32>) -> Self::Query;

    fn term(&self, field: &str, body: TermBody) -> Self::Query;

    /// A `terms` leaf. The boost sits beside the field on the wire, so a
    /// boosted leaf cannot target a field named `boost`.
    fn terms(&self, field: &str, values: Vec<String>, boost: Option<f32>) -> Self::Query;

    fn match_query(&self, field: &str, body: MatchBody) -> Self::Query;

    fn match_phrase(&self, field: &str, body: MatchPhraseBody) -> Self::Query;

    fn match_bool_prefix(&self, field: &str, body: MatchBoolPrefixBody) -> Self::Query;

    /// Query-string nodes name their fields inside the body.
    fn query_string(&self, body: QueryStringBody) -> Self::Query;

    fn prefix(&self, field: &str, body: PrefixBody) -> Self::Query;

    fn regexp(&self, field: &str, body: PatternBody) -> Self::Query;

    fn wildcard(&self, field: &str, body: PatternBody) -> Self::Query;

    fn range(&self, field: &str, body: RangeBody) -> Self::Query;

    fn bool(&self, body: BoolBody<Self::Query>) -> Self::Query;

    fn nested(&self, body: NestedBody<Self::Query>) -> Self::Query;

    fn dis_max(&self, body: DisMaxBody<Self::Query>) -> Self::Query;

    fn script(&self, body: ScriptQueryBody) -> Self::Query;

    fn function_score(&self, body: FunctionScoreBody<Self::Query>) -> Self::Query;

    fn more_like_this(&self, body: MoreLikeThisBody) -> Self::Query;
}
