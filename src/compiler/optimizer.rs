//! Clause-list optimization.

use std::borrow::Cow;

use indexmap::IndexMap;
use log::debug;

use crate::expression::{Expression, Value, ValueSet};
use crate::mapping::DocumentMapping;

/// Merge equality and set-membership clauses on the same single-valued field.
///
/// Conjunctive clauses on a field that holds one value per document can be
/// replaced by a single `AnyOf` over the intersection of their values. An
/// empty intersection yields an `AnyOf` that matches nothing. Collection
/// fields are left alone: there, each clause may match a different value.
///
/// Values are intersected by the term they compile to, since that is what the
/// backend compares. `"1"`, `1` and `1.0` are the same term; the value kept
/// is the one from the first clause.
///
/// Untouched clauses are borrowed and keep their relative order; merged
/// clauses are appended in the order their field first occurred.
pub fn reduce_term_filters<'e>(
    clauses: &'e [Expression],
    mapping: &dyn DocumentMapping,
) -> Vec<Cow<'e, Expression>> {
    let mut by_field: IndexMap<&str, Vec<usize>, ahash::RandomState> = IndexMap::default();
    for (index, clause) in clauses.iter().enumerate() {
        if let Expression::Exact { field, .. } | Expression::AnyOf { field, .. } = clause
            && mapping.is_selectable(field)
            && !mapping.is_collection(field)
        {
            by_field.entry(field.as_str()).or_default().push(index);
        }
    }
    by_field.retain(|_, indexes| indexes.len() > 1);

    if by_field.is_empty() {
        return clauses.iter().map(Cow::Borrowed).collect();
    }

    let mut merged_away = vec![false; clauses.len()];
    let mut merged = Vec::with_capacity(by_field.len());
    for (field, indexes) in &by_field {
        let mut common: Option<TermMap<'e>> = None;
        for &index in indexes {
            merged_away[index] = true;
            let terms = clause_terms(&clauses[index]);
            common = Some(match common {
                None => terms,
                Some(mut current) => {
                    current.retain(|term, _| terms.contains_key(term));
                    current
                }
            });
        }
        let values: ValueSet = common
            .unwrap_or_default()
            .into_values()
            .cloned()
            .collect();
        debug!(
            "Merged {} clauses on field '{}' of '{}' into {} values",
            indexes.len(),
            field,
            mapping.type_as_string(),
            values.len()
        );
        merged.push(Cow::Owned(Expression::AnyOf {
            field: (*field).to_string(),
            values,
        }));
    }

    clauses
        .iter()
        .zip(merged_away)
        .filter(|(_, away)| !away)
        .map(|(clause, _)| Cow::Borrowed(clause))
        .chain(merged)
        .collect()
}

/// Values of a clause keyed by their term, first occurrence kept.
type TermMap<'e> = IndexMap<String, &'e Value, ahash::RandomState>;

fn clause_terms(clause: &Expression) -> TermMap<'_> {
    let mut terms = TermMap::default();
    match clause {
        Expression::Exact { value, .. } => {
            terms.insert(value.to_term(), value);
        }
        Expression::AnyOf { values, .. } => {
            for value in values {
                terms.entry(value.to_term()).or_insert(value);
            }
        }
        _ => {}
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Value;
    use crate::expression::builder::{exact, match_any, match_text_all};
    use crate::mapping::MappingSchema;

    fn mapping() -> MappingSchema {
        MappingSchema::builder("Concept")
            .add_field("id")
            .add_field("module")
            .add_collection_field("ancestors")
            .build()
    }

    fn values(values: &[&str]) -> ValueSet {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn test_untouched_clauses_are_borrowed() {
        let clauses = vec![exact("id", "1"), exact("module", "2")];
        let reduced = reduce_term_filters(&clauses, &mapping());
        assert_eq!(reduced.len(), 2);
        assert!(reduced.iter().all(|clause| matches!(clause, Cow::Borrowed(_))));
    }

    #[test]
    fn test_merge_keeps_order() {
        let clauses = vec![
            match_any("id", ["1", "2", "3"]),
            match_text_all("term", "heart"),
            exact("module", "m"),
            match_any("id", ["2", "3", "4"]),
        ];
        let reduced = reduce_term_filters(&clauses, &mapping());
        let reduced: Vec<Expression> = reduced.into_iter().map(Cow::into_owned).collect();
        assert_eq!(
            reduced,
            vec![
                match_text_all("term", "heart"),
                exact("module", "m"),
                Expression::AnyOf {
                    field: "id".into(),
                    values: values(&["2", "3"]),
                },
            ]
        );
    }

    #[test]
    fn test_disjoint_exacts_match_nothing() {
        let clauses = vec![exact("id", "x"), exact("id", "y")];
        let reduced = reduce_term_filters(&clauses, &mapping());
        assert_eq!(
            reduced.into_iter().map(Cow::into_owned).collect::<Vec<_>>(),
            vec![Expression::AnyOf {
                field: "id".into(),
                values: ValueSet::default(),
            }]
        );
    }

    #[test]
    fn test_intersect_by_term() {
        let clauses = vec![
            exact("id", "1"),
            match_any("id", [Value::from(1), Value::from(2.0)]),
            match_any("id", [Value::from(1.0), Value::from(2i64)]),
        ];
        let reduced = reduce_term_filters(&clauses, &mapping());
        assert_eq!(
            reduced.into_iter().map(Cow::into_owned).collect::<Vec<_>>(),
            vec![Expression::AnyOf {
                field: "id".into(),
                values: values(&["1"]),
            }]
        );

        let clauses = vec![exact("id", 2.0), exact("id", 2)];
        let reduced = reduce_term_filters(&clauses, &mapping());
        assert_eq!(
            reduced.into_iter().map(Cow::into_owned).collect::<Vec<_>>(),
            vec![Expression::AnyOf {
                field: "id".into(),
                values: [Value::from(2.0)].into_iter().collect(),
            }]
        );
    }

    #[test]
    fn test_collection_and_unknown_fields_skipped() {
        let clauses = vec![
            exact("ancestors", "1"),
            exact("ancestors", "2"),
            exact("unknown", "1"),
            exact("unknown", "2"),
        ];
        let reduced = reduce_term_filters(&clauses, &mapping());
        assert_eq!(reduced.len(), 4);
        assert!(reduced.iter().all(|clause| matches!(clause, Cow::Borrowed(_))));
    }
}
