//! Parsers that turn source text into a [`Query`](crate::ast::Query):
//! a full recursive-descent grammar for KQL, and a structural validator
//! for Lucene that defers to ElasticSearch's own `query_string` parser.

pub mod base;
pub mod kql;
pub mod lucene;

pub use kql::parse as parse_kql;
pub use lucene::parse as parse_lucene;
