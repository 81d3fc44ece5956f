//! Full-text predicate translation.

use crate::backend::QuerySink;
use crate::backend::body::{
    MatchBody, MatchBoolPrefixBody, MatchPhraseBody, Operator, QueryStringBody,
};
use crate::expression::{MatchType, TextPredicate};

/// Characters with a meaning in the query-string syntax.
const RESERVED: &[char] = &[
    '\\', '+', '-', '=', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', ':', '/',
];

/// Escape a user term for a `query_string` query.
///
/// Reserved characters are backslash-escaped. The `*` and `?` wildcards are
/// kept. `<` and `>` cannot be escaped and are removed.
///
/// ```
/// use docquery::compiler::text::escape_query_string;
///
/// assert_eq!(escape_query_string("heart (disease)"), "heart \\(disease\\)");
/// assert_eq!(escape_query_string("a<b>c*"), "abc*");
/// ```
pub fn escape_query_string(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '<' | '>' => {}
            c if RESERVED.contains(&c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Translate a text predicate on `field` into a backend query.
///
/// Returns `None` when the term holds no searchable text.
pub(crate) fn translate<S: QuerySink>(
    sink: &S,
    field: &str,
    text: &TextPredicate,
    boost: Option<f32>,
) -> Option<S::Query> {
    if text.term.trim().is_empty() {
        return None;
    }

    let analyzer = text.analyzer.clone();
    let query = match text.match_type {
        MatchType::All => sink.match_query(
            field,
            MatchBody {
                query: text.term.clone(),
                analyzer,
                operator: Some(Operator::And),
                minimum_should_match: None,
                fuzziness: text.fuzziness.clone(),
                prefix_length: text.prefix_length,
                max_expansions: text.max_expansions,
                boost,
            },
        ),
        MatchType::Any => sink.match_query(
            field,
            MatchBody {
                query: text.term.clone(),
                analyzer,
                operator: Some(Operator::Or),
                minimum_should_match: Some(text.minimum_should_match.to_string()),
                fuzziness: text.fuzziness.clone(),
                prefix_length: text.prefix_length,
                max_expansions: text.max_expansions,
                boost,
            },
        ),
        MatchType::Phrase => sink.match_phrase(
            field,
            MatchPhraseBody {
                query: text.term.clone(),
                analyzer,
                boost,
            },
        ),
        MatchType::BooleanPrefix => sink.match_bool_prefix(
            field,
            MatchBoolPrefixBody {
                query: text.term.clone(),
                analyzer,
                operator: Some(Operator::And),
                boost,
            },
        ),
        MatchType::Parsed => sink.query_string(QueryStringBody {
            query: escape_query_string(&text.term),
            fields: vec![field.to_string()],
            analyzer,
            default_operator: Some(Operator::And),
            allow_leading_wildcard: Some(true),
            escape: Some(false),
            boost,
        }),
    };
    Some(query)
}
