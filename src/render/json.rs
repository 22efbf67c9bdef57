//! Renders a [`Query`] into its canonical Elasticsearch Query DSL JSON shape.
//!
//! This is a pure recursive walk: no allocation beyond what the
//! resulting tree needs, no mutation, deterministic key order.

use crate::ast::{Operator, Query};
use serde_json::{Map, Value as Json, json};

/// Renders `query` into the JSON Elasticsearch Query DSL.
pub fn render(query: &Query) -> Json {
    match query {
        Query::MatchAll => json!({"match_all": {}}),
        Query::MatchNone => json!({"match_none": {}}),

        Query::Match {
            field,
            value,
            operator,
        } => {
            let inner = match operator {
                Operator::Or => value.to_json(),
                Operator::And => json!({"query": value.to_json(), "operator": "and"}),
            };
            json!({"match": {field.as_str(): inner}})
        }

        Query::MatchPhrase { field, value } => {
            json!({"match_phrase": {field.as_str(): value.to_json()}})
        }

        Query::MatchPhrasePrefix { field, value } => {
            json!({"match_phrase_prefix": {field.as_str(): value.to_json()}})
        }

        Query::MultiMatch {
            fields,
            value,
            match_type,
            operator,
        } => {
            let mut inner = Map::new();
            inner.insert("query".into(), value.to_json());
            inner.insert("fields".into(), json!(fields));
            if let Some(t) = match_type {
                inner.insert("type".into(), json!(t.as_str()));
            }
            if let Some(op) = operator {
                let op_str = match op {
                    Operator::And => "and",
                    Operator::Or => "or",
                };
                inner.insert("operator".into(), json!(op_str));
            }
            json!({"multi_match": Json::Object(inner)})
        }

        Query::Term { field, value } => {
            json!({"term": {field.as_str(): value.to_json()}})
        }

        Query::Exists { field } => json!({"exists": {"field": field}}),

        Query::Range {
            field,
            gt,
            gte,
            lt,
            lte,
            time_zone,
        } => {
            let mut bounds = Map::new();
            if let Some(v) = gt {
                bounds.insert("gt".into(), v.to_json());
            }
            if let Some(v) = gte {
                bounds.insert("gte".into(), v.to_json());
            }
            if let Some(v) = lt {
                bounds.insert("lt".into(), v.to_json());
            }
            if let Some(v) = lte {
                bounds.insert("lte".into(), v.to_json());
            }
            if let Some(tz) = time_zone {
                bounds.insert("time_zone".into(), json!(tz));
            }
            json!({"range": {field.as_str(): Json::Object(bounds)}})
        }

        Query::Wildcard { field, value } => {
            json!({"wildcard": {field.as_str(): {"value": value}}})
        }

        Query::Regexp { field, value } => {
            json!({"regexp": {field.as_str(): {"value": value}}})
        }

        Query::Fuzzy {
            field,
            value,
            fuzziness,
        } => {
            let mut inner = Map::new();
            inner.insert("value".into(), json!(value));
            if let Some(f) = fuzziness {
                inner.insert("fuzziness".into(), json!(f));
            }
            json!({"fuzzy": {field.as_str(): Json::Object(inner)}})
        }

        Query::Prefix { field, value } => {
            json!({"prefix": {field.as_str(): {"value": value}}})
        }

        Query::Nested {
            path,
            query,
            score_mode,
        } => {
            let mut inner = Map::new();
            inner.insert("path".into(), json!(path));
            inner.insert("query".into(), render(query));
            if let Some(mode) = score_mode {
                inner.insert("score_mode".into(), json!(mode.as_str()));
            }
            json!({"nested": Json::Object(inner)})
        }

        Query::QueryString { query } => json!({"query_string": {"query": query}}),

        Query::Bool {
            must,
            should,
            must_not,
            filter,
            minimum_should_match,
        } => {
            let mut inner = Map::new();
            render_clause(&mut inner, "must", must);
            render_clause(&mut inner, "should", should);
            render_clause(&mut inner, "must_not", must_not);
            render_clause(&mut inner, "filter", filter);
            if let Some(mm) = minimum_should_match {
                inner.insert("minimum_should_match".into(), json!(mm));
            }
            json!({"bool": Json::Object(inner)})
        }
    }
}

/// Renders one `bool` clause array, omitting it entirely when empty and
/// collapsing a single-entry clause to a bare value rather than a
/// one-element array (matching Elasticsearch's accepted canonical shape).
fn render_clause(out: &mut Map<String, Json>, name: &str, clauses: &[Query]) {
    match clauses {
        [] => {}
        [only] => {
            out.insert(name.into(), render(only));
        }
        many => {
            out.insert(name.into(), Json::Array(many.iter().map(render).collect()));
        }
    }
}
