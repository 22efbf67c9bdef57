//! Rendering a [`Query`](crate::ast::Query) back out to a concrete syntax:
//! the Elasticsearch Query DSL JSON shape, or KQL source text.

pub mod json;
pub mod kql;

pub use json::render as render_json;
pub use kql::render as render_kql;
