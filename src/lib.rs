//! Parses the Kibana Query Language (KQL) and Apache Lucene classical
//! query syntax, and renders both into the JSON Elasticsearch Query
//! DSL. The KQL direction also runs in reverse: a [`Query`] tree can be
//! pretty-printed back to KQL source.
//!
//! # Parse KQL and render to the Query DSL
//!
//! ```
//! use kql_dsl::parse_kql;
//!
//! let query = parse_kql("NOT http.request.method: GET").unwrap();
//! let json = query.render();
//! assert_eq!(
//!     json,
//!     serde_json::json!({"bool": {"must_not": {"match": {"http.request.method": "GET"}}}})
//! );
//! ```
//!
//! # Parse Lucene syntax
//!
//! Lucene is validated structurally and handed to Elasticsearch's own
//! `query_string` query rather than re-implemented:
//!
//! ```
//! use kql_dsl::parse_lucene;
//!
//! let query = parse_lucene("a:b AND c:d").unwrap();
//! assert_eq!(
//!     query.render(),
//!     serde_json::json!({"query_string": {"query": "a:b AND c:d"}})
//! );
//! ```
//!
//! # Render a Query DSL document back to KQL
//!
//! ```
//! use kql_dsl::{parse_es, render_as_kql};
//!
//! let doc = serde_json::json!({
//!     "bool": {"filter": [{"match": {"a": "b"}}, {"match_phrase": {"c": "d"}}]}
//! });
//! let query = parse_es(&doc).unwrap();
//! assert_eq!(render_as_kql(&query).unwrap(), r#"a: b and c: "d""#);
//! ```
//!
//! # Diagnostics
//!
//! Every decode failure, from any of the three input paths, is a single
//! [`DecodeError`] carrying a byte offset plus 1-based line/column:
//!
//! ```
//! use kql_dsl::parse_kql;
//!
//! let err = parse_kql("double_it:: and_give_it_to_the_next_person").unwrap_err();
//! assert_eq!((err.line, err.column), (1, 11));
//! ```

pub mod ast;
pub mod decode;
pub mod diag;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod source;

pub use ast::{MultiMatchType, Operator, Query, ScoreMode, Value};
pub use diag::{DecodeError, Position};

impl Query {
    /// Renders this query into the JSON Elasticsearch Query DSL.
    pub fn render(&self) -> serde_json::Value {
        render::render_json(self)
    }
}

/// Parses `source` as KQL, following the Kuery PEG grammar.
///
/// Empty or whitespace-only input is a well-formed [`Query::MatchAll`].
pub fn parse_kql(source: &str) -> Result<Query, DecodeError> {
    parser::parse_kql(source)
}

/// Validates `source` as Lucene classical query syntax and wraps it as
/// a [`Query::QueryString`] escape hatch for Elasticsearch's own
/// `query_string` parser.
pub fn parse_lucene(source: &str) -> Result<Query, DecodeError> {
    parser::parse_lucene(source)
}

/// Decodes a JSON Elasticsearch Query DSL document into a [`Query`].
pub fn parse_es(value: &serde_json::Value) -> Result<Query, DecodeError> {
    decode::parse_es(value)
}

/// Renders `query` back to KQL source text.
///
/// Only variants reachable from `parse_kql` can be rendered this way;
/// anything else raises a [`DecodeError`] naming the unsupported variant.
pub fn render_as_kql(query: &Query) -> Result<String, DecodeError> {
    render::render_kql(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_round_trips_scenario_one() {
        let query = parse_kql("NOT http.request.method: GET").unwrap();
        assert_eq!(
            query.render(),
            serde_json::json!({"bool": {"must_not": {"match": {"http.request.method": "GET"}}}})
        );
    }

    #[test]
    fn facade_round_trips_scenario_four() {
        let doc = serde_json::json!({
            "bool": {"filter": [{"match": {"a": "b"}}, {"match_phrase": {"c": "d"}}]}
        });
        let query = parse_es(&doc).unwrap();
        assert_eq!(render_as_kql(&query).unwrap(), r#"a: b and c: "d""#);
    }

    #[test]
    fn empty_input_is_match_all() {
        assert_eq!(parse_kql("").unwrap(), Query::MatchAll);
    }
}
