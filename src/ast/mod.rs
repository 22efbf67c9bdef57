//! AST foundation types and the query node structure.

mod query;

pub use query::{MultiMatchType, Operator, Query, ScoreMode, Value};
