//! Raw request-body JSON of the legacy backend client generation.
//!
//! The legacy client accepts queries as plain JSON objects. [`JsonSink`]
//! builds those objects directly and yields the same wire shapes as
//! [`DslSink`](crate::backend::DslSink), so both generations send identical
//! requests for the same expression, down to the bytes.

use log::warn;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::backend::QuerySink;
use crate::backend::body::{
    BoolBody, DisMaxBody, FunctionScoreBody, MatchBody, MatchBoolPrefixBody, MatchPhraseBody,
    MoreLikeThisBody, NestedBody, PatternBody, PrefixBody, QueryStringBody, RangeBody,
    ScriptQueryBody, TermBody,
};

/// Sink producing [`serde_json::Value`] query objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

/// `{"<key>": <value>}`
fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// `{"<kind>": {"<field>": <body>}}`
fn field_query(kind: &str, field: &str, body: impl Serialize) -> Value {
    keyed(kind, keyed(field, wire(&body)))
}

/// The JSON value of `body` as it reads on the wire.
///
/// Goes through the text form: `serde_json::to_value` widens `f32` fields to
/// `f64` (`0.1` becomes `0.10000000149011612`), while the text serializer
/// writes their shortest decimal form.
fn wire<T: Serialize + ?Sized>(body: &T) -> Value {
    serde_json::to_string(body)
        .and_then(|text| serde_json::from_str(&text))
        .unwrap_or_else(|err| {
            warn!("Failed to serialize query body: {}", err);
            Value::Null
        })
}

impl QuerySink for JsonSink {
    type Query = Value;

    fn match_all(&self, boost: Option<f32>) -> Value {
        keyed("match_all", boost_object(boost))
    }

    fn match_none(&self, boost: Option<f32>) -> Value {
        keyed("match_none", boost_object(boost))
    }

    fn term(&self, field: &str, body: TermBody) -> Value {
        field_query("term", field, body)
    }

    fn terms(&self, field: &str, values: Vec<String>, boost: Option<f32>) -> Value {
        let mut map = Map::new();
        map.insert(field.to_string(), json!(values));
        if let Some(boost) = boost {
            map.insert("boost".to_string(), wire(&boost));
        }
        keyed("terms", Value::Object(map))
    }

    fn match_query(&self, field: &str, body: MatchBody) -> Value {
        field_query("match", field, body)
    }

    fn match_phrase(&self, field: &str, body: MatchPhraseBody) -> Value {
        field_query("match_phrase", field, body)
    }

    fn match_bool_prefix(&self, field: &str, body: MatchBoolPrefixBody) -> Value {
        field_query("match_bool_prefix", field, body)
    }

    fn query_string(&self, body: QueryStringBody) -> Value {
        keyed("query_string", wire(&body))
    }

    fn prefix(&self, field: &str, body: PrefixBody) -> Value {
        field_query("prefix", field, body)
    }

    fn regexp(&self, field: &str, body: PatternBody) -> Value {
        field_query("regexp", field, body)
    }

    fn wildcard(&self, field: &str, body: PatternBody) -> Value {
        field_query("wildcard", field, body)
    }

    fn range(&self, field: &str, body: RangeBody) -> Value {
        field_query("range", field, body)
    }

    fn bool(&self, body: BoolBody<Value>) -> Value {
        keyed("bool", wire(&body))
    }

    fn nested(&self, body: NestedBody<Value>) -> Value {
        keyed("nested", wire(&body))
    }

    fn dis_max(&self, body: DisMaxBody<Value>) -> Value {
        keyed("dis_max", wire(&body))
    }

    fn script(&self, body: ScriptQueryBody) -> Value {
        keyed("script", wire(&body))
    }

    fn function_score(&self, body: FunctionScoreBody<Value>) -> Value {
        keyed("function_score", wire(&body))
    }

    fn more_like_this(&self, body: MoreLikeThisBody) -> Value {
        keyed("more_like_this", wire(&body))
    }
}

fn boost_object(boost: Option<f32>) -> Value {
    match boost {
        Some(boost) => keyed("boost", wire(&boost)),
        None => json!({}),
    }
}
