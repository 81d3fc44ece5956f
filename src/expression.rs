//! Backend-independent search expressions.
//!
//! Application code describes search criteria as an [`Expression`] tree. The
//! tree is immutable input for the [`compiler`](crate::compiler), which turns
//! it into the query DSL of a concrete search backend.
//!
//! # Module Structure
//!
//! - `value`: typed predicate arguments and value sets
//! - `text`: full-text and more-like-this predicates
//! - `script`: backend scripts
//! - `builder`: helper constructors and the boolean expression builder
//!
//! # Example
//!
//! ```
//! use docquery::expression::builder::{BoolExpressionBuilder, exact, match_text_all};
//!
//! let expression = BoolExpressionBuilder::new()
//!     .must(match_text_all("term", "heart attack"))
//!     .filter(exact("active", true))
//!     .build();
//! ```

pub mod builder;
pub mod script;
pub mod text;
pub mod value;

use serde::{Deserialize, Serialize};

pub use script::{Script, ScriptSource};
pub use text::{MatchType, MoreLikeThis, TextPredicate};
pub use value::{TermSet, Value, ValueSet};

/// A node of a search expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    /// Matches every document.
    MatchAll,
    /// Matches no document.
    MatchNone,
    /// Multiplies the score contribution of the inner expression.
    Boost {
        expression: Box<Expression>,
        boost: f32,
    },
    /// The field holds exactly this value.
    Exact { field: String, value: Value },
    /// The field value falls within the given bounds.
    Range(RangePredicate),
    /// The field holds any of the values.
    AnyOf { field: String, values: ValueSet },
    /// The field value starts with any of the prefixes.
    Prefix { field: String, prefixes: TermSet },
    Regexp {
        field: String,
        pattern: String,
        #[serde(default)]
        case_insensitive: bool,
    },
    Wildcard {
        field: String,
        pattern: String,
        #[serde(default)]
        case_insensitive: bool,
    },
    Text(TextPredicate),
    /// Evaluates the inner expression against the nested documents of a field.
    Nested {
        field: String,
        expression: Box<Expression>,
    },
    /// Parent-child joins are not translated by the compiler.
    HasParent {
        parent_type: String,
        expression: Box<Expression>,
    },
    Bool(BoolExpression),
    /// Scores each document by its best matching disjunct.
    DisMax {
        disjuncts: Vec<Expression>,
        tie_breaker: f32,
    },
    /// Filters documents with a script.
    ScriptQuery(Script),
    /// Replaces the score of the inner expression with a script's result.
    ScriptScore {
        expression: Box<Expression>,
        script: Script,
    },
    MoreLikeThis(MoreLikeThis),
}

impl Expression {
    /// Wrap this expression in a [`Expression::Boost`].
    pub fn with_boost(self, boost: f32) -> Self {
        Expression::Boost {
            expression: Box::new(self),
            boost,
        }
    }

    /// The field a single-field predicate targets.
    pub fn field(&self) -> Option<&str> {
        match self {
            Expression::Exact { field, .. }
            | Expression::AnyOf { field, .. }
            | Expression::Prefix { field, .. }
            | Expression::Regexp { field, .. }
            | Expression::Wildcard { field, .. }
            | Expression::Nested { field, .. } => Some(field),
            Expression::Range(range) => Some(&range.field),
            Expression::Text(text) => Some(&text.field),
            _ => None,
        }
    }
}

impl From<RangePredicate> for Expression {
    fn from(range: RangePredicate) -> Self {
        Expression::Range(range)
    }
}

impl From<TextPredicate> for Expression {
    fn from(text: TextPredicate) -> Self {
        Expression::Text(text)
    }
}

impl From<BoolExpression> for Expression {
    fn from(bool_expression: BoolExpression) -> Self {
        Expression::Bool(bool_expression)
    }
}

impl From<MoreLikeThis> for Expression {
    fn from(more_like_this: MoreLikeThis) -> Self {
        Expression::MoreLikeThis(more_like_this)
    }
}

/// A range predicate. Absent bounds are open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePredicate {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Value>,
    #[serde(default)]
    pub include_lower: bool,
    #[serde(default)]
    pub include_upper: bool,
}

impl RangePredicate {
    /// Create an unbounded range on a field.
    pub fn new(field: impl Into<String>) -> Self {
        RangePredicate {
            field: field.into(),
            lower: None,
            upper: None,
            include_lower: false,
            include_upper: false,
        }
    }

    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.lower = Some(value.into());
        self.include_lower = false;
        self
    }

    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.lower = Some(value.into());
        self.include_lower = true;
        self
    }

    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.upper = Some(value.into());
        self.include_upper = false;
        self
    }

    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.upper = Some(value.into());
        self.include_upper = true;
        self
    }
}

fn default_minimum_should_match() -> u32 {
    1
}

/// Boolean combination of expressions.
///
/// `must` and `filter` clauses are ANDed, `should` clauses are ORed with at
/// least `minimum_should_match` required, `must_not` clauses are excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolExpression {
    #[serde(default)]
    pub must: Vec<Expression>,
    #[serde(default)]
    pub must_not: Vec<Expression>,
    #[serde(default)]
    pub should: Vec<Expression>,
    #[serde(default)]
    pub filter: Vec<Expression>,
    #[serde(default = "default_minimum_should_match")]
    pub minimum_should_match: u32,
}

impl Default for BoolExpression {
    fn default() -> Self {
        BoolExpression {
            must: Vec::new(),
            must_not: Vec::new(),
            should: Vec::new(),
            filter: Vec::new(),
            minimum_should_match: default_minimum_should_match(),
        }
    }
}

impl BoolExpression {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.must_not.is_empty()
            && self.should.is_empty()
            && self.filter.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::builder::{exact, match_any, nested};
    use super::*;

    #[test]
    fn test_field() {
        assert_eq!(exact("id", "1").field(), Some("id"));
        assert_eq!(RangePredicate::new("age").gt(1).field, "age");
        assert_eq!(Expression::MatchAll.field(), None);
        assert_eq!(nested("members", Expression::MatchAll).field(), Some("members"));
    }

    #[test]
    fn test_with_boost() {
        let boosted = exact("id", "1").with_boost(2.0);
        match boosted {
            Expression::Boost { expression, boost } => {
                assert_eq!(boost, 2.0);
                assert_eq!(*expression, exact("id", "1"));
            }
            other => panic!("Expected boost, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let expression = Expression::Bool(BoolExpression {
            must: vec![exact("id", "1")],
            filter: vec![match_any("module", ["a", "b"])],
            ..Default::default()
        });

        let json = serde_json::to_value(&expression).unwrap();
        assert_eq!(json["type"], json!("bool"));
        assert_eq!(json["must"][0]["type"], json!("exact"));

        let back: Expression = serde_json::from_value(json).unwrap();
        assert_eq!(back, expression);
    }

    #[test]
    fn test_bool_defaults_from_json() {
        let expression: Expression =
            serde_json::from_value(json!({"type": "bool", "must": [{"type": "match_all"}]}))
                .unwrap();
        match expression {
            Expression::Bool(bool_expression) => {
                assert_eq!(bool_expression.must, vec![Expression::MatchAll]);
                assert_eq!(bool_expression.minimum_should_match, 1);
            }
            other => panic!("Expected bool, got {other:?}"),
        }
    }
}
