//! Expression compilation.
//!
//! [`QueryCompiler`] walks an [`Expression`] tree once and builds the matching
//! backend query through a [`QuerySink`]. Alongside the query it reports
//! whether relevance scoring is required anywhere in the tree, so callers can
//! skip scoring for pure filters.
//!
//! # Module Structure
//!
//! - `optimizer`: clause-list rewriting applied to conjunctive bool clauses
//! - `text`: full-text predicate translation and query-string escaping
//!
//! # Example
//!
//! ```
//! use docquery::backend::DslSink;
//! use docquery::compiler::QueryCompiler;
//! use docquery::config::CompilerConfig;
//! use docquery::expression::builder::{BoolExpressionBuilder, exact, match_text_all};
//! use docquery::mapping::MappingSchema;
//!
//! let mapping = MappingSchema::builder("Concept")
//!     .add_field("active")
//!     .add_field("term")
//!     .build();
//! let config = CompilerConfig::default();
//! let compiler = QueryCompiler::new(DslSink, &mapping, &config).unwrap();
//!
//! let expression = BoolExpressionBuilder::new()
//!     .must(match_text_all("term", "heart attack"))
//!     .must(exact("active", true))
//!     .build();
//! let compiled = compiler.compile(&expression).unwrap();
//!
//! assert!(compiled.needs_scoring);
//! assert_eq!(
//!     compiled.to_json().unwrap(),
//!     serde_json::json!({"bool": {
//!         "must": [{"match": {"term": {"query": "heart attack", "operator": "and"}}}],
//!         "filter": [{"term": {"active": {"value": "true"}}}]
//!     }})
//! );
//! ```

pub mod optimizer;
pub mod text;

use log::warn;
use serde::Serialize;

use crate::backend::QuerySink;
use crate::backend::body::{
    BoolBody, BoostMode, DisMaxBody, FunctionScoreBody, MoreLikeThisBody, NestedBody,
    PatternBody, PrefixBody, RangeBody, ScoreFunction, ScoreMode, ScriptQueryBody,
    ScriptScoreFunction, TermBody,
};
use crate::config::CompilerConfig;
use crate::error::{QueryError, Result};
use crate::expression::{
    BoolExpression, Expression, MoreLikeThis, RangePredicate, Script, TermSet, Value, ValueSet,
};
use crate::mapping::DocumentMapping;

/// The `terms` wire format keeps the boost beside the field name.
const BOOST_FIELD: &str = "boost";

/// A compiled backend query.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery<Q> {
    pub query: Q,
    /// Whether any part of the query contributes a relevance score.
    pub needs_scoring: bool,
}

impl<Q> CompiledQuery<Q> {
    fn filter(query: Q) -> Self {
        CompiledQuery {
            query,
            needs_scoring: false,
        }
    }

    fn scored(query: Q) -> Self {
        CompiledQuery {
            query,
            needs_scoring: true,
        }
    }

    pub fn into_query(self) -> Q {
        self.query
    }
}

impl<Q: Serialize> CompiledQuery<Q> {
    /// The backend request body of the query.
    ///
    /// Parsed back from [`to_json_string`](Self::to_json_string), so `f32`
    /// boosts keep their shortest decimal form.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.to_json_string()?)?)
    }

    /// The backend request body as sent on the wire.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.query)?)
    }
}

/// Per-node compilation scope.
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    /// Dot-joined path of the enclosing nested fields, empty at the root.
    pub path: &'a str,
    /// Mapping of the documents at this scope.
    pub mapping: &'a dyn DocumentMapping,
    /// Boost for the node compiled in this context only.
    pub boost: Option<f32>,
}

impl<'a> CompileContext<'a> {
    pub fn root(mapping: &'a dyn DocumentMapping) -> Self {
        CompileContext {
            path: "",
            mapping,
            boost: None,
        }
    }

    /// Context for the children of the current node.
    fn child(self) -> Self {
        CompileContext {
            boost: None,
            ..self
        }
    }

    fn with_boost(self, boost: f32) -> Self {
        CompileContext {
            boost: Some(boost),
            ..self
        }
    }

    /// The full path of `field` at this scope.
    pub fn field_path(&self, field: &str) -> String {
        if self.path.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.path, field)
        }
    }
}

/// Compiles expressions against one document mapping.
///
/// The compiler holds no per-request state; one instance may serve any number
/// of concurrent compilations.
#[derive(Debug)]
pub struct QueryCompiler<'a, S> {
    sink: S,
    mapping: &'a dyn DocumentMapping,
    config: &'a CompilerConfig,
}

impl<'a, S: QuerySink> QueryCompiler<'a, S> {
    pub fn new(
        sink: S,
        mapping: &'a dyn DocumentMapping,
        config: &'a CompilerConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(QueryCompiler {
            sink,
            mapping,
            config,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn config(&self) -> &CompilerConfig {
        self.config
    }

    /// Compile `expression` into a backend query.
    pub fn compile(&self, expression: &Expression) -> Result<CompiledQuery<S::Query>> {
        self.visit(expression, CompileContext::root(self.mapping))
    }

    /// Compile `expression` within an explicit scope.
    pub fn compile_in(
        &self,
        expression: &Expression,
        ctx: CompileContext<'_>,
    ) -> Result<CompiledQuery<S::Query>> {
        self.visit(expression, ctx)
    }

    fn visit(
        &self,
        expression: &Expression,
        ctx: CompileContext<'_>,
    ) -> Result<CompiledQuery<S::Query>> {
        match expression {
            Expression::MatchAll => Ok(CompiledQuery::filter(self.sink.match_all(ctx.boost))),
            Expression::MatchNone => Ok(CompiledQuery::filter(self.sink.match_none(ctx.boost))),
            Expression::Boost { expression, boost } => {
                self.visit(expression, ctx.with_boost(*boost))
            }
            Expression::Exact { field, value } => Ok(CompiledQuery::filter(self.sink.term(
                &ctx.field_path(field),
                TermBody {
                    value: value.to_term(),
                    boost: ctx.boost,
                },
            ))),
            Expression::Range(range) => Ok(CompiledQuery::filter(self.range(range, ctx)?)),
            Expression::AnyOf { field, values } => {
                Ok(CompiledQuery::filter(self.terms(field, values, ctx)?))
            }
            Expression::Prefix { field, prefixes } => {
                Ok(CompiledQuery::filter(self.prefix(field, prefixes, ctx)))
            }
            Expression::Regexp {
                field,
                pattern,
                case_insensitive,
            } => Ok(CompiledQuery::filter(self.sink.regexp(
                &ctx.field_path(field),
                pattern_body(pattern, *case_insensitive, ctx.boost),
            ))),
            Expression::Wildcard {
                field,
                pattern,
                case_insensitive,
            } => Ok(CompiledQuery::filter(self.sink.wildcard(
                &ctx.field_path(field),
                pattern_body(pattern, *case_insensitive, ctx.boost),
            ))),
            Expression::Text(predicate) => {
                let field = ctx.field_path(&predicate.field);
                Ok(
                    match text::translate(&self.sink, &field, predicate, ctx.boost) {
                        Some(query) => CompiledQuery::scored(query),
                        None => CompiledQuery::filter(self.sink.match_none(ctx.boost)),
                    },
                )
            }
            Expression::Nested { field, expression } => self.nested(field, expression, ctx),
            Expression::HasParent { parent_type, .. } => Err(QueryError::unsupported(format!(
                "has_parent queries on '{parent_type}' are not supported"
            ))),
            Expression::Bool(bool_expression) => self.bool(bool_expression, ctx),
            Expression::DisMax {
                disjuncts,
                tie_breaker,
            } => {
                let queries = disjuncts
                    .iter()
                    .map(|disjunct| Ok(self.visit(disjunct, ctx.child())?.query))
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledQuery::scored(self.sink.dis_max(DisMaxBody {
                    queries,
                    tie_breaker: *tie_breaker,
                    boost: ctx.boost,
                })))
            }
            Expression::ScriptQuery(script) => {
                Ok(CompiledQuery::filter(self.sink.script(ScriptQueryBody {
                    script: script.clone(),
                    boost: ctx.boost,
                })))
            }
            Expression::ScriptScore { expression, script } => {
                self.script_score(expression, script, ctx)
            }
            Expression::MoreLikeThis(more_like_this) => Ok(CompiledQuery::scored(
                self.sink
                    .more_like_this(more_like_this_body(more_like_this, ctx.boost)),
            )),
        }
    }

    fn range(&self, range: &RangePredicate, ctx: CompileContext<'_>) -> Result<S::Query> {
        let mut body = RangeBody {
            boost: ctx.boost,
            ..Default::default()
        };
        if let Some(lower) = &range.lower {
            let bound = Some(lower.to_range_bound()?);
            if range.include_lower {
                body.gte = bound;
            } else {
                body.gt = bound;
            }
        }
        if let Some(upper) = &range.upper {
            let bound = Some(upper.to_range_bound()?);
            if range.include_upper {
                body.lte = bound;
            } else {
                body.lt = bound;
            }
        }
        Ok(self.sink.range(&ctx.field_path(&range.field), body))
    }

    /// A `terms` leaf, split into several leaves under a `bool` when the value
    /// set exceeds the backend's terms limit.
    ///
    /// Values that render to the same term are sent once.
    fn terms(&self, field: &str, values: &ValueSet, ctx: CompileContext<'_>) -> Result<S::Query> {
        let path = ctx.field_path(field);
        let terms: TermSet = values.iter().map(Value::to_term).collect();
        let terms: Vec<String> = terms.into_iter().collect();
        let max_terms_count = self.config.max_terms_count;
        if terms.len() <= max_terms_count {
            if path == BOOST_FIELD && ctx.boost.is_some() {
                return Err(QueryError::invalid_argument(
                    "a boosted terms query cannot target a field named 'boost'",
                ));
            }
            return Ok(self.sink.terms(&path, terms, ctx.boost));
        }

        warn!(
            "More than {} values ({}) in terms query on '{}' of '{}', splitting into chunks",
            max_terms_count,
            terms.len(),
            path,
            ctx.mapping.type_as_string()
        );
        let mut body = BoolBody::new(ctx.boost);
        body.should = terms
            .chunks(max_terms_count)
            .map(|chunk| self.sink.terms(&path, chunk.to_vec(), None))
            .collect();
        body.minimum_should_match = Some("1".to_string());
        Ok(self.sink.bool(body))
    }

    fn prefix(&self, field: &str, prefixes: &TermSet, ctx: CompileContext<'_>) -> S::Query {
        let path = ctx.field_path(field);
        match prefixes.len() {
            0 => self.sink.match_none(ctx.boost),
            1 => self.sink.prefix(
                &path,
                PrefixBody {
                    value: prefixes[0].clone(),
                    boost: ctx.boost,
                },
            ),
            _ => {
                let mut body = BoolBody::new(ctx.boost);
                body.should = prefixes
                    .iter()
                    .map(|prefix| {
                        self.sink.prefix(
                            &path,
                            PrefixBody {
                                value: prefix.clone(),
                                boost: None,
                            },
                        )
                    })
                    .collect();
                self.sink.bool(body)
            }
        }
    }

    fn nested(
        &self,
        field: &str,
        expression: &Expression,
        ctx: CompileContext<'_>,
    ) -> Result<CompiledQuery<S::Query>> {
        let path = ctx.field_path(field);
        let mapping = ctx.mapping.nested_mapping(field)?;
        let inner = self.visit(
            expression,
            CompileContext {
                path: &path,
                mapping,
                boost: None,
            },
        )?;
        let score_mode = if inner.needs_scoring {
            ScoreMode::Max
        } else {
            ScoreMode::None
        };
        Ok(CompiledQuery {
            query: self.sink.nested(NestedBody {
                path,
                query: Box::new(inner.query),
                score_mode,
                boost: ctx.boost,
            }),
            needs_scoring: inner.needs_scoring,
        })
    }

    fn bool(
        &self,
        expression: &BoolExpression,
        ctx: CompileContext<'_>,
    ) -> Result<CompiledQuery<S::Query>> {
        let mut body = BoolBody::new(ctx.boost);
        let mut needs_scoring = false;

        for clause in optimizer::reduce_term_filters(&expression.must, ctx.mapping) {
            let compiled = self.visit(&clause, ctx.child())?;
            if compiled.needs_scoring {
                needs_scoring = true;
                body.must.push(compiled.query);
            } else {
                body.filter.push(compiled.query);
            }
        }

        for clause in &expression.must_not {
            let compiled = self.visit(clause, ctx.child())?;
            needs_scoring |= compiled.needs_scoring;
            body.must_not.push(compiled.query);
        }

        for clause in &expression.should {
            let compiled = self.visit(clause, ctx.child())?;
            needs_scoring |= compiled.needs_scoring;
            body.should.push(compiled.query);
        }

        for clause in optimizer::reduce_term_filters(&expression.filter, ctx.mapping) {
            let compiled = self.visit(&clause, ctx.child())?;
            needs_scoring |= compiled.needs_scoring;
            body.filter.push(compiled.query);
        }

        if !expression.should.is_empty() {
            body.minimum_should_match = Some(expression.minimum_should_match.to_string());
        }

        Ok(CompiledQuery {
            query: self.sink.bool(body),
            needs_scoring,
        })
    }

    fn script_score(
        &self,
        expression: &Expression,
        script: &Script,
        ctx: CompileContext<'_>,
    ) -> Result<CompiledQuery<S::Query>> {
        let inner = self.visit(expression, ctx.child())?;
        Ok(CompiledQuery::scored(self.sink.function_score(
            FunctionScoreBody {
                query: Box::new(inner.query),
                boost_mode: BoostMode::Replace,
                functions: vec![ScoreFunction {
                    script_score: ScriptScoreFunction {
                        script: script.clone(),
                    },
                }],
                boost: ctx.boost,
            },
        )))
    }
}

fn pattern_body(pattern: &str, case_insensitive: bool, boost: Option<f32>) -> PatternBody {
    PatternBody {
        value: pattern.to_string(),
        case_insensitive: case_insensitive.then_some(true),
        boost,
    }
}

fn more_like_this_body(more_like_this: &MoreLikeThis, boost: Option<f32>) -> MoreLikeThisBody {
    MoreLikeThisBody {
        fields: more_like_this.fields.clone(),
        like: more_like_this.like_texts.clone(),
        unlike: more_like_this.unlike_texts.clone(),
        max_query_terms: more_like_this.max_query_terms,
        min_term_freq: more_like_this.min_term_freq,
        min_doc_freq: more_like_this.min_doc_freq,
        min_word_length: more_like_this.min_word_length,
        max_word_length: more_like_this.max_word_length,
        minimum_should_match: more_like_this.minimum_should_match.clone(),
        boost,
    }
}

/// Compile `expression` against `mapping` in one call.
pub fn compile<S: QuerySink>(
    sink: S,
    expression: &Expression,
    mapping: &dyn DocumentMapping,
    config: &CompilerConfig,
) -> Result<CompiledQuery<S::Query>> {
    QueryCompiler::new(sink, mapping, config)?.compile(expression)
}
