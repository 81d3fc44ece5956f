use docquery::backend::{DslSink, JsonSink, Query};
use docquery::compiler::compile;
use docquery::config::CompilerConfig;
use docquery::error::Result;
use docquery::expression::builder::{
    BoolExpressionBuilder, dis_max, exact, match_all, match_any, match_boolean_prefix,
    match_none, match_text_all, match_text_any, match_text_parsed, match_text_phrase, nested,
    prefix_match, prefix_match_any, regexp, script_query, script_score, wildcard,
};
use docquery::expression::{
    Expression, MatchType, MoreLikeThis, RangePredicate, Script, TextPredicate,
};
use docquery::mapping::MappingSchema;
use serde_json::json;

fn mapping() -> MappingSchema {
    MappingSchema::builder("Description")
        .add_field("id")
        .add_field("term")
        .add_field("typeId")
        .add_field("effectiveTime")
        .add_nested_field(
            "members",
            MappingSchema::builder("Member").add_field("refsetId").build(),
        )
        .build()
}

/// One expression per backend node kind.
fn every_kind() -> Vec<Expression> {
    vec![
        match_all(),
        match_none().with_boost(0.5),
        exact("id", "1").with_boost(2.0),
        match_any("typeId", ["a", "b"]).with_boost(1.5),
        match_text_all("term", "heart attack"),
        TextPredicate::new("term", "heart attack", MatchType::Any)
            .with_minimum_should_match(2)
            .with_analyzer("search")
            .with_fuzziness("AUTO")
            .with_prefix_length(1)
            .with_max_expansions(10)
            .into(),
        match_text_phrase("term", "heart attack").with_boost(3.0),
        match_boolean_prefix("term", "heart att"),
        match_text_parsed("term", "heart* AND (attack)"),
        prefix_match("term", "hea"),
        prefix_match_any("term", ["hea", "att"]),
        regexp("term", "hea.*", true),
        wildcard("term", "hea*", false).with_boost(1.2),
        RangePredicate::new("effectiveTime")
            .gte(20020131i64)
            .lt(20210731i64)
            .into(),
        BoolExpressionBuilder::new()
            .must(match_text_all("term", "heart"))
            .must_not(exact("id", "2"))
            .should(exact("typeId", "a"))
            .should(exact("typeId", "b"))
            .filter(exact("id", "1"))
            .minimum_should_match(1)
            .build()
            .with_boost(2.0),
        nested("members", exact("refsetId", "r")),
        dis_max([match_text_all("term", "heart"), exact("id", "1")], 0.25),
        script_query(Script::inline("doc['id'].size() > 0").with_lang("painless")),
        script_score(
            match_all(),
            Script::stored("rank")
                .with_option("cache", "true")
                .with_param("factor", 1.5),
        ),
        MoreLikeThis::new(["term"], ["heart attack"])
            .with_unlike_texts(["heart"])
            .with_max_query_terms(25)
            .with_min_term_freq(1)
            .with_min_doc_freq(2)
            .with_min_word_length(3)
            .with_max_word_length(20)
            .with_minimum_should_match("30%")
            .into(),
    ]
}

#[test]
fn test_typed_query_round_trip() -> Result<()> {
    let mapping = mapping();
    let config = CompilerConfig::default();
    for expression in every_kind() {
        let query = compile(DslSink, &expression, &mapping, &config)?.query;
        let json = serde_json::to_value(&query)?;
        let back: Query = serde_json::from_value(json.clone())?;
        assert_eq!(back, query, "round trip of {json}");
        assert_eq!(Query::from_json(json)?, query);
    }
    Ok(())
}

#[test]
fn test_client_generations_agree() -> Result<()> {
    let mapping = mapping();
    let config = CompilerConfig::default();
    for expression in every_kind() {
        let typed = compile(DslSink, &expression, &mapping, &config)?;
        let raw = compile(JsonSink, &expression, &mapping, &config)?;
        assert_eq!(typed.to_json()?, raw.query, "{expression:?}");
        assert_eq!(typed.to_json_string()?, raw.to_json_string()?);
        assert_eq!(typed.needs_scoring, raw.needs_scoring);
    }
    Ok(())
}

#[test]
fn test_generations_send_identical_bytes() -> Result<()> {
    let mapping = mapping();
    let config = CompilerConfig::default();
    let expression = exact("id", "1").with_boost(0.1);
    let typed = compile(DslSink, &expression, &mapping, &config)?;
    let raw = compile(JsonSink, &expression, &mapping, &config)?;
    let expected = r#"{"term":{"id":{"value":"1","boost":0.1}}}"#;
    assert_eq!(typed.to_json_string()?, expected);
    assert_eq!(raw.to_json_string()?, expected);
    assert_eq!(typed.to_json()?, raw.query);

    let expression = BoolExpressionBuilder::new()
        .must(match_text_all("term", "heart").with_boost(0.3))
        .filter(match_any("typeId", ["a"]).with_boost(0.7))
        .build();
    let typed = compile(DslSink, &expression, &mapping, &config)?;
    let raw = compile(JsonSink, &expression, &mapping, &config)?;
    assert_eq!(typed.to_json_string()?, raw.to_json_string()?);
    assert!(raw.to_json_string()?.contains(r#""boost":0.7"#));
    Ok(())
}

#[test]
fn test_chunked_generations_agree() -> Result<()> {
    let mapping = mapping();
    let config = CompilerConfig::new().with_max_terms_count(3);
    let expression = match_any("id", (0..10).map(|i| i.to_string()));
    let typed = compile(DslSink, &expression, &mapping, &config)?;
    let raw = compile(JsonSink, &expression, &mapping, &config)?;
    assert_eq!(typed.to_json()?, raw.query);
    assert_eq!(raw.query["bool"]["should"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[test]
fn test_native_wire_shapes() -> Result<()> {
    let mapping = mapping();
    let config = CompilerConfig::default();
    let typed = |expression: &Expression| -> Result<serde_json::Value> {
        compile(DslSink, expression, &mapping, &config)?.to_json()
    };

    assert_eq!(
        typed(&match_any("typeId", ["a", "b"]).with_boost(1.5))?,
        json!({"terms": {"typeId": ["a", "b"], "boost": 1.5}})
    );
    assert_eq!(
        typed(&wildcard("term", "hea*", true))?,
        json!({"wildcard": {"term": {"value": "hea*", "case_insensitive": true}}})
    );
    assert_eq!(
        typed(&match_text_any("term", "heart attack", 1))?,
        json!({"match": {"term": {
            "query": "heart attack",
            "operator": "or",
            "minimum_should_match": "1"
        }}})
    );
    assert_eq!(
        typed(&Expression::from(
            RangePredicate::new("effectiveTime").gt(1).lte(5)
        ))?,
        json!({"range": {"effectiveTime": {"gt": 1, "lte": 5}}})
    );
    assert_eq!(
        typed(&nested("members", match_text_all("refsetId", "r")))?,
        json!({"nested": {
            "path": "members",
            "score_mode": "max",
            "query": {"match": {"members.refsetId": {"query": "r", "operator": "and"}}}
        }})
    );
    assert_eq!(
        typed(&script_score(
            match_all(),
            Script::stored("rank").with_param("factor", 2)
        ))?,
        json!({"function_score": {
            "query": {"match_all": {}},
            "boost_mode": "replace",
            "functions": [{"script_score": {"script": {"id": "rank", "params": {"factor": 2}}}}]
        }})
    );
    Ok(())
}

#[test]
fn test_parse_native_request_body() -> Result<()> {
    let query = Query::from_json(json!({
        "bool": {
            "must": [{"match_phrase": {"term": {"query": "heart attack", "analyzer": "exact"}}}],
            "filter": [
                {"terms": {"id": ["1", "2"]}},
                {"range": {"effectiveTime": {"gte": "2002", "lt": "2021"}}}
            ],
            "should": [{"prefix": {"term": {"value": "hea", "boost": 2.0}}}],
            "minimum_should_match": "1",
            "boost": 1.5
        }
    }))?;

    match &query {
        Query::Bool(body) => {
            assert_eq!(body.must.len(), 1);
            assert_eq!(body.filter.len(), 2);
            assert_eq!(body.should[0].kind(), "prefix");
            assert_eq!(body.should[0].boost(), Some(2.0));
            assert_eq!(body.minimum_should_match.as_deref(), Some("1"));
        }
        other => panic!("Expected bool query, got {other:?}"),
    }
    assert_eq!(query.boost(), Some(1.5));
    Ok(())
}

#[test]
fn test_expression_json_round_trip() -> Result<()> {
    for expression in every_kind() {
        let json = serde_json::to_value(&expression)?;
        let back: Expression = serde_json::from_value(json)?;
        assert_eq!(back, expression);
    }
    Ok(())
}
