//! Typed query tree of the current backend client generation.
//!
//! [`Query`] serializes to the backend's native JSON query DSL and
//! deserializes back from it, so a compiled query survives a trip over the
//! wire unchanged:
//!
//! ```
//! use docquery::backend::dsl::Query;
//! use docquery::backend::body::TermBody;
//!
//! let query = Query::Term {
//!     field: "id".to_string(),
//!     body: TermBody { value: "138875005".to_string(), boost: Some(2.0) },
//! };
//! let json = serde_json::to_value(&query).unwrap();
//! assert_eq!(json, serde_json::json!({"term": {"id": {"value": "138875005", "boost": 2.0}}}));
//! assert_eq!(serde_json::from_value::<Query>(json).unwrap(), query);
//! ```

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::backend::QuerySink;
use crate::backend::body::{
    BoolBody, BoostBody, DisMaxBody, FunctionScoreBody, MatchBody, MatchBoolPrefixBody,
    MatchPhraseBody, MoreLikeThisBody, NestedBody, PatternBody, PrefixBody, QueryStringBody,
    RangeBody, ScriptQueryBody, TermBody,
};
use crate::error::Result;

const BOOST_KEY: &str = "boost";

/// A backend query node.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll(BoostBody),
    MatchNone(BoostBody),
    Term {
        field: String,
        body: TermBody,
    },
    Terms {
        field: String,
        values: Vec<String>,
        boost: Option<f32>,
    },
    Match {
        field: String,
        body: MatchBody,
    },
    MatchPhrase {
        field: String,
        body: MatchPhraseBody,
    },
    MatchBoolPrefix {
        field: String,
        body: MatchBoolPrefixBody,
    },
    QueryString(QueryStringBody),
    Prefix {
        field: String,
        body: PrefixBody,
    },
    Regexp {
        field: String,
        body: PatternBody,
    },
    Wildcard {
        field: String,
        body: PatternBody,
    },
    Range {
        field: String,
        body: RangeBody,
    },
    Bool(BoolBody<Query>),
    Nested(NestedBody<Query>),
    DisMax(DisMaxBody<Query>),
    Script(ScriptQueryBody),
    FunctionScore(FunctionScoreBody<Query>),
    MoreLikeThis(MoreLikeThisBody),
}

impl Query {
    /// The backend name of this node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Query::MatchAll(_) => "match_all",
            Query::MatchNone(_) => "match_none",
            Query::Term { .. } => "term",
            Query::Terms { .. } => "terms",
            Query::Match { .. } => "match",
            Query::MatchPhrase { .. } => "match_phrase",
            Query::MatchBoolPrefix { .. } => "match_bool_prefix",
            Query::QueryString(_) => "query_string",
            Query::Prefix { .. } => "prefix",
            Query::Regexp { .. } => "regexp",
            Query::Wildcard { .. } => "wildcard",
            Query::Range { .. } => "range",
            Query::Bool(_) => "bool",
            Query::Nested(_) => "nested",
            Query::DisMax(_) => "dis_max",
            Query::Script(_) => "script",
            Query::FunctionScore(_) => "function_score",
            Query::MoreLikeThis(_) => "more_like_this",
        }
    }

    /// The boost attached to this node, `None` when neutral.
    pub fn boost(&self) -> Option<f32> {
        match self {
            Query::MatchAll(body) | Query::MatchNone(body) => body.boost,
            Query::Term { body, .. } => body.boost,
            Query::Terms { boost, .. } => *boost,
            Query::Match { body, .. } => body.boost,
            Query::MatchPhrase { body, .. } => body.boost,
            Query::MatchBoolPrefix { body, .. } => body.boost,
            Query::QueryString(body) => body.boost,
            Query::Prefix { body, .. } => body.boost,
            Query::Regexp { body, .. } | Query::Wildcard { body, .. } => body.boost,
            Query::Range { body, .. } => body.boost,
            Query::Bool(body) => body.boost,
            Query::Nested(body) => body.boost,
            Query::DisMax(body) => body.boost,
            Query::Script(body) => body.boost,
            Query::FunctionScore(body) => body.boost,
            Query::MoreLikeThis(body) => body.boost,
        }
    }

    /// Parse a query from the backend's JSON representation.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Ok(parse_query(json)?)
    }
}

/// `{"<field>": <body>}`
struct FieldKeyed<'a, B>(&'a str, &'a B);

impl<B: Serialize> Serialize for FieldKeyed<'_, B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

/// `{"<field>": [<values>], "boost": <boost>}`
///
/// The boost shares the object with the field, so a boosted `terms` node
/// cannot target a field named `boost`.
struct TermsWire<'a> {
    field: &'a str,
    values: &'a [String],
    boost: Option<f32>,
}

impl Serialize for TermsWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.field == BOOST_KEY && self.boost.is_some() {
            return Err(<S::Error as serde::ser::Error>::custom(
                "a boosted terms query cannot target a field named 'boost'",
            ));
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(self.field, self.values)?;
        if let Some(boost) = self.boost {
            map.serialize_entry(BOOST_KEY, &boost)?;
        }
        map.end()
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let kind = self.kind();
        match self {
            Query::MatchAll(body) | Query::MatchNone(body) => map.serialize_entry(kind, body)?,
            Query::Term { field, body } => map.serialize_entry(kind, &FieldKeyed(field, body))?,
            Query::Terms {
                field,
                values,
                boost,
            } => map.serialize_entry(
                kind,
                &TermsWire {
                    field,
                    values,
                    boost: *boost,
                },
            )?,
            Query::Match { field, body } => map.serialize_entry(kind, &FieldKeyed(field, body))?,
            Query::MatchPhrase { field, body } => {
                map.serialize_entry(kind, &FieldKeyed(field, body))?
            }
            Query::MatchBoolPrefix { field, body } => {
                map.serialize_entry(kind, &FieldKeyed(field, body))?
            }
            Query::QueryString(body) => map.serialize_entry(kind, body)?,
            Query::Prefix { field, body } => map.serialize_entry(kind, &FieldKeyed(field, body))?,
            Query::Regexp { field, body } | Query::Wildcard { field, body } => {
                map.serialize_entry(kind, &FieldKeyed(field, body))?
            }
            Query::Range { field, body } => map.serialize_entry(kind, &FieldKeyed(field, body))?,
            Query::Bool(body) => map.serialize_entry(kind, body)?,
            Query::Nested(body) => map.serialize_entry(kind, body)?,
            Query::DisMax(body) => map.serialize_entry(kind, body)?,
            Query::Script(body) => map.serialize_entry(kind, body)?,
            Query::FunctionScore(body) => map.serialize_entry(kind, body)?,
            Query::MoreLikeThis(body) => map.serialize_entry(kind, body)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        parse_query(json).map_err(D::Error::custom)
    }
}

fn single_entry(
    json: serde_json::Value,
    what: &str,
) -> serde_json::Result<(String, serde_json::Value)> {
    let serde_json::Value::Object(object) = json else {
        return Err(serde_json::Error::custom(format!(
            "{what} must be a JSON object"
        )));
    };
    if object.len() != 1 {
        return Err(serde_json::Error::custom(format!(
            "{what} must have exactly one key, found {}",
            object.len()
        )));
    }
    object
        .into_iter()
        .next()
        .ok_or_else(|| serde_json::Error::custom(format!("{what} is empty")))
}

fn field_keyed<B: DeserializeOwned>(json: serde_json::Value) -> serde_json::Result<(String, B)> {
    let (field, body) = single_entry(json, "field query")?;
    Ok((field, serde_json::from_value(body)?))
}

fn parse_terms(json: serde_json::Value) -> serde_json::Result<Query> {
    let serde_json::Value::Object(mut object) = json else {
        return Err(serde_json::Error::custom("terms query must be a JSON object"));
    };
    // An array under `boost` is the value list of a field named `boost`.
    let boost = match object.get(BOOST_KEY) {
        Some(boost) if !boost.is_array() => {
            let boost = serde_json::from_value(boost.clone())?;
            object.remove(BOOST_KEY);
            boost
        }
        _ => None,
    };
    let (field, values) = field_keyed(serde_json::Value::Object(object))?;
    Ok(Query::Terms {
        field,
        values,
        boost,
    })
}

fn parse_query(json: serde_json::Value) -> serde_json::Result<Query> {
    let (kind, body) = single_entry(json, "query")?;
    let query = match kind.as_str() {
        "match_all" => Query::MatchAll(serde_json::from_value(body)?),
        "match_none" => Query::MatchNone(serde_json::from_value(body)?),
        "term" => {
            let (field, body) = field_keyed(body)?;
            Query::Term { field, body }
        }
        "terms" => parse_terms(body)?,
        "match" => {
            let (field, body) = field_keyed(body)?;
            Query::Match { field, body }
        }
        "match_phrase" => {
            let (field, body) = field_keyed(body)?;
            Query::MatchPhrase { field, body }
        }
        "match_bool_prefix" => {
            let (field, body) = field_keyed(body)?;
            Query::MatchBoolPrefix { field, body }
        }
        "query_string" => Query::QueryString(serde_json::from_value(body)?),
        "prefix" => {
            let (field, body) = field_keyed(body)?;
            Query::Prefix { field, body }
        }
        "regexp" => {
            let (field, body) = field_keyed(body)?;
            Query::Regexp { field, body }
        }
        "wildcard" => {
            let (field, body) = field_keyed(body)?;
            Query::Wildcard { field, body }
        }
        "range" => {
            let (field, body) = field_keyed(body)?;
            Query::Range { field, body }
        }
        "bool" => Query::Bool(serde_json::from_value(body)?),
        "nested" => Query::Nested(serde_json::from_value(body)?),
        "dis_max" => Query::DisMax(serde_json::from_value(body)?),
        "script" => Query::Script(serde_json::from_value(body)?),
        "function_score" => Query::FunctionScore(serde_json::from_value(body)?),
        "more_like_this" => Query::MoreLikeThis(serde_json::from_value(body)?),
        other => {
            return Err(serde_json::Error::custom(format!(
                "Unknown query kind '{other}'"
            )));
        }
    };
    Ok(query)
}

/// Sink producing [`Query`] trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct DslSink;

impl QuerySink for DslSink {
    type Query = Query;

    fn match_all(&self, boost: Option<f32>) -> Query {
        Query::MatchAll(BoostBody { boost })
    }

    fn match_none(&self, boost: Option<f32>) -> Query {
        Query::MatchNone(BoostBody { boost })
    }

    fn term(&self, field: &str, body: TermBody) -> Query {
        Query::Term {
            field: field.to_string(),
            body,
        }
    }

    fn terms(&self, field: &str, values: Vec<String>, boost: Option<f32>) -> Query {
        Query::Terms {
            field: field.to_string(),
            values,
            boost,
        }
    }

    fn match_query(&self, field: &str, body: MatchBody) -> Query {
        Query::Match {
            field: field.to_string(),
            body,
        }
    }

    fn match_phrase(&self, field: &str, body: MatchPhraseBody) -> Query {
        Query::MatchPhrase {
            field: field.to_string(),
            body,
        }
    }

    fn match_bool_prefix(&self, field: &str, body: MatchBoolPrefixBody) -> Query {
        Query::MatchBoolPrefix {
            field: field.to_string(),
            body,
        }
    }

    fn query_string(&self, body: QueryStringBody) -> Query {
        Query::QueryString(body)
    }

    fn prefix(&self, field: &str, body: PrefixBody) -> Query {
        Query::Prefix {
            field: field.to_string(),
            body,
        }
    }

    fn regexp(&self, field: &str, body: PatternBody) -> Query {
        Query::Regexp {
            field: field.to_string(),
            body,
        }
    }

    fn wildcard(&self, field: &str, body: PatternBody) -> Query {
        Query::Wildcard {
            field: field.to_string(),
            body,
        }
    }

    fn range(&self, field: &str, body: RangeBody) -> Query {
        Query::Range {
            field: field.to_string(),
            body,
        }
    }

    fn bool(&self, body: BoolBody<Query>) -> Query {
        Query::Bool(body)
    }

    fn nested(&self, body: NestedBody<Query>) -> Query {
        Query::Nested(body)
    }

    fn dis_max(&self, body: DisMaxBody<Query>) -> Query {
        Query::DisMax(body)
    }

    fn script(&self, body: ScriptQueryBody) -> Query {
        Query::Script(body)
    }

    fn function_score(&self, body: FunctionScoreBody<Query>) -> Query {
        Query::FunctionScore(body)
    }

    fn more_like_this(&self, body: MoreLikeThisBody) -> Query {
        Query::MoreLikeThis(body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::body::ScoreMode;

    #[test]
    fn test_terms_wire_shape() {
        let query = DslSink.terms("id", vec!["1".into(), "2".into()], Some(1.5));
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"terms": {"id": ["1", "2"], "boost": 1.5}})
        );
    }

    #[test]
    fn test_nested_wire_shape() {
        let inner = DslSink.match_all(None);
        let query = DslSink.nested(NestedBody {
            path: "members".into(),
            query: Box::new(inner),
            score_mode: ScoreMode::None,
            boost: None,
        });
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"nested": {"path": "members", "query": {"match_all": {}}, "score_mode": "none"}})
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Query::from_json(json!([])).is_err());
        assert!(Query::from_json(json!({})).is_err());
        assert!(Query::from_json(json!({"match_all": {}, "match_none": {}})).is_err());
        assert!(Query::from_json(json!({"span_near": {}})).is_err());
        let two_fields = json!({"term": {"a": {"value": "x"}, "b": {"value": "y"}}});
        assert!(Query::from_json(two_fields).is_err());
    }

    #[test]
    fn test_parse_terms_without_boost() {
        let query = Query::from_json(json!({"terms": {"status": ["a"]}})).unwrap();
        assert_eq!(
            query,
            Query::Terms {
                field: "status".into(),
                values: vec!["a".into()],
                boost: None
            }
        );
    }

    #[test]
    fn test_terms_on_field_named_boost() {
        let query = DslSink.terms("boost", vec!["high".into()], None);
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, json!({"terms": {"boost": ["high"]}}));
        assert_eq!(Query::from_json(json).unwrap(), query);

        let boosted = DslSink.terms("boost", vec!["high".into()], Some(2.0));
        assert!(serde_json::to_value(&boosted).is_err());
    }

    #[test]
    fn test_bool_clauses_default_to_empty() {
        let query = Query::from_json(json!({"bool": {"filter": [{"match_all": {}}]}})).unwrap();
        let mut expected = BoolBody::new(None);
        expected.filter.push(DslSink.match_all(None));
        assert_eq!(query, Query::Bool(expected));

        let empty = Query::from_json(json!({"bool": {}})).unwrap();
        assert_eq!(empty, Query::Bool(BoolBody::new(None)));
    }

    #[test]
    fn test_kind_and_boost() {
        let query = DslSink.prefix(
            "term",
            PrefixBody {
                value: "hea".into(),
                boost: Some(3.0),
            },
        );
        assert_eq!(query.kind(), "prefix");
        assert_eq!(query.boost(), Some(3.0));
        assert_eq!(DslSink.match_none(None).boost(), None);
    }
}
