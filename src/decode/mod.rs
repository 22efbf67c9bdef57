//! Decoding a JSON Elasticsearch Query DSL document into a [`Query`](crate::ast::Query).

pub mod es;

pub use es::parse as parse_es;
