//! Helper constructors for [`Expression`] trees.

use crate::expression::{
    BoolExpression, Expression, MatchType, MoreLikeThis, RangePredicate, Script, TermSet,
    TextPredicate, Value, ValueSet,
};

pub fn match_all() -> Expression {
    Expression::MatchAll
}

pub fn match_none() -> Expression {
    Expression::MatchNone
}

/// The field holds exactly `value`.
pub fn exact(field: impl Into<String>, value: impl Into<Value>) -> Expression {
    Expression::Exact {
        field: field.into(),
        value: value.into(),
    }
}

/// The field holds any of `values`. An empty set matches nothing.
pub fn match_any<I, V>(field: impl Into<String>, values: I) -> Expression
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Expression::AnyOf {
        field: field.into(),
        values: values.into_iter().map(Into::into).collect::<ValueSet>(),
    }
}

pub fn range_gt(field: impl Into<String>, lower: impl Into<Value>) -> Expression {
    RangePredicate::new(field).gt(lower).into()
}

pub fn range_gte(field: impl Into<String>, lower: impl Into<Value>) -> Expression {
    RangePredicate::new(field).gte(lower).into()
}

pub fn range_lt(field: impl Into<String>, upper: impl Into<Value>) -> Expression {
    RangePredicate::new(field).lt(upper).into()
}

pub fn range_lte(field: impl Into<String>, upper: impl Into<Value>) -> Expression {
    RangePredicate::new(field).lte(upper).into()
}

/// The field lies within `lower..=upper`.
pub fn range_between(
    field: impl Into<String>,
    lower: impl Into<Value>,
    upper: impl Into<Value>,
) -> Expression {
    RangePredicate::new(field).gte(lower).lte(upper).into()
}

pub fn prefix_match(field: impl Into<String>, prefix: impl Into<String>) -> Expression {
    prefix_match_any(field, [prefix])
}

pub fn prefix_match_any<I, S>(field: impl Into<String>, prefixes: I) -> Expression
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expression::Prefix {
        field: field.into(),
        prefixes: prefixes.into_iter().map(Into::into).collect::<TermSet>(),
    }
}

pub fn regexp(
    field: impl Into<String>,
    pattern: impl Into<String>,
    case_insensitive: bool,
) -> Expression {
    Expression::Regexp {
        field: field.into(),
        pattern: pattern.into(),
        case_insensitive,
    }
}

pub fn wildcard(
    field: impl Into<String>,
    pattern: impl Into<String>,
    case_insensitive: bool,
) -> Expression {
    Expression::Wildcard {
        field: field.into(),
        pattern: pattern.into(),
        case_insensitive,
    }
}

pub fn match_text_all(field: impl Into<String>, term: impl Into<String>) -> Expression {
    TextPredicate::new(field, term, MatchType::All).into()
}

pub fn match_text_any(
    field: impl Into<String>,
    term: impl Into<String>,
    minimum_should_match: u32,
) -> Expression {
    TextPredicate::new(field, term, MatchType::Any)
        .with_minimum_should_match(minimum_should_match)
        .into()
}

pub fn match_text_phrase(field: impl Into<String>, term: impl Into<String>) -> Expression {
    TextPredicate::new(field, term, MatchType::Phrase).into()
}

pub fn match_boolean_prefix(field: impl Into<String>, term: impl Into<String>) -> Expression {
    TextPredicate::new(field, term, MatchType::BooleanPrefix).into()
}

pub fn match_text_parsed(field: impl Into<String>, term: impl Into<String>) -> Expression {
    TextPredicate::new(field, term, MatchType::Parsed).into()
}

/// Evaluate `expression` against the nested documents stored under `field`.
pub fn nested(field: impl Into<String>, expression: Expression) -> Expression {
    Expression::Nested {
        field: field.into(),
        expression: Box::new(expression),
    }
}

pub fn has_parent(parent_type: impl Into<String>, expression: Expression) -> Expression {
    Expression::HasParent {
        parent_type: parent_type.into(),
        expression: Box::new(expression),
    }
}

pub fn dis_max(disjuncts: impl IntoIterator<Item = Expression>, tie_breaker: f32) -> Expression {
    Expression::DisMax {
        disjuncts: disjuncts.into_iter().collect(),
        tie_breaker,
    }
}

/// Documents similar to `like_texts` over `fields`, with default tuning.
pub fn more_like_this<F, S>(fields: F, like_texts: impl IntoIterator<Item = S>) -> Expression
where
    F: IntoIterator<Item = S>,
    S: Into<String>,
{
    MoreLikeThis::new(fields, like_texts).into()
}

pub fn script_query(script: Script) -> Expression {
    Expression::ScriptQuery(script)
}

pub fn script_score(expression: Expression, script: Script) -> Expression {
    Expression::ScriptScore {
        expression: Box::new(expression),
        script,
    }
}

/// Builder for [`BoolExpression`] trees.
#[derive(Debug, Default)]
pub struct BoolExpressionBuilder {
    expression: BoolExpression,
}

impl BoolExpressionBuilder {
    pub fn new() -> Self {
        BoolExpressionBuilder {
            expression: BoolExpression::default(),
        }
    }

    /// Add a MUST clause.
    pub fn must(mut self, clause: Expression) -> Self {
        self.expression.must.push(clause);
        self
    }

    /// Add a MUST_NOT clause.
    pub fn must_not(mut self, clause: Expression) -> Self {
        self.expression.must_not.push(clause);
        self
    }

    /// Add a SHOULD clause.
    pub fn should(mut self, clause: Expression) -> Self {
        self.expression.should.push(clause);
        self
    }

    /// Add a FILTER clause (matches like MUST but does not affect scoring).
    pub fn filter(mut self, clause: Expression) -> Self {
        self.expression.filter.push(clause);
        self
    }

    /// Set how many SHOULD clauses must match when any are present.
    pub fn minimum_should_match(mut self, minimum: u32) -> Self {
        self.expression.minimum_should_match = minimum;
        self
    }

    pub fn build(self) -> Expression {
        Expression::Bool(self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_builder() {
        let expression = BoolExpressionBuilder::new()
            .must(exact("id", "1"))
            .should(exact("module", "a"))
            .should(exact("module", "b"))
            .must_not(match_none())
            .filter(match_any("status", [1, 2]))
            .minimum_should_match(2)
            .build();

        match expression {
            Expression::Bool(bool_expression) => {
                assert_eq!(bool_expression.must.len(), 1);
                assert_eq!(bool_expression.should.len(), 2);
                assert_eq!(bool_expression.must_not.len(), 1);
                assert_eq!(bool_expression.filter.len(), 1);
                assert_eq!(bool_expression.minimum_should_match, 2);
            }
            other => panic!("Expected bool, got {other:?}"),
        }
    }

    #[test]
    fn test_match_any_dedups_in_order() {
        match match_any("id", ["b", "a", "b"]) {
            Expression::AnyOf { values, .. } => {
                let terms: Vec<String> = values.iter().map(Value::to_term).collect();
                assert_eq!(terms, vec!["b", "a"]);
            }
            other => panic!("Expected any_of, got {other:?}"),
        }
    }

    #[test]
    fn test_range_helpers() {
        assert_eq!(
            range_between("effectiveTime", 20020131, 20210731),
            Expression::from(
                RangePredicate::new("effectiveTime")
                    .gte(20020131)
                    .lte(20210731)
            )
        );
        match range_gt("effectiveTime", 5) {
            Expression::Range(range) => {
                assert_eq!(range.lower, Some(Value::Int(5)));
                assert!(!range.include_lower);
                assert_eq!(range.upper, None);
            }
            other => panic!("Expected range, got {other:?}"),
        }
        match range_lte("effectiveTime", 9i64) {
            Expression::Range(range) => {
                assert_eq!(range.upper, Some(Value::Long(9)));
                assert!(range.include_upper);
                assert_eq!(range.lower, None);
            }
            other => panic!("Expected range, got {other:?}"),
        }
        assert_eq!(range_gte("a", 1), Expression::from(RangePredicate::new("a").gte(1)));
        assert_eq!(range_lt("a", 1), Expression::from(RangePredicate::new("a").lt(1)));
    }

    #[test]
    fn test_more_like_this_helper() {
        match more_like_this(["term"], ["heart attack"]) {
            Expression::MoreLikeThis(more_like_this) => {
                assert_eq!(more_like_this.fields, vec!["term"]);
                assert_eq!(more_like_this.like_texts, vec!["heart attack"]);
                assert!(more_like_this.unlike_texts.is_empty());
            }
            other => panic!("Expected more_like_this, got {other:?}"),
        }
    }

    #[test]
    fn test_text_helpers() {
        match match_text_any("term", "heart attack", 2) {
            Expression::Text(text) => {
                assert_eq!(text.match_type, MatchType::Any);
                assert_eq!(text.minimum_should_match, 2);
            }
            other => panic!("Expected text, got {other:?}"),
        }
    }
}
