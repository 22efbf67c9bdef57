//! The unified query AST: a strict subset of the Elasticsearch Query DSL
//! shared by the KQL parser, the Lucene parser, and the ES-DSL decoder.

use serde_json::Number;

/// The boolean combinator used by `match` and `multi_match` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

/// The `type` parameter of a `multi_match` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiMatchType {
    Phrase,
    PhrasePrefix,
    BestFields,
}

impl MultiMatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MultiMatchType::Phrase => "phrase",
            MultiMatchType::PhrasePrefix => "phrase_prefix",
            MultiMatchType::BestFields => "best_fields",
        }
    }
}

/// The `score_mode` parameter of a `nested` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    None,
    Avg,
    Sum,
    Max,
    Min,
}

impl ScoreMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreMode::None => "none",
            ScoreMode::Avg => "avg",
            ScoreMode::Sum => "sum",
            ScoreMode::Max => "max",
            ScoreMode::Min => "min",
        }
    }
}

/// A scalar value: a raw literal is promoted to a JSON number when it
/// parses losslessly as an integer or float, otherwise kept as a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
}

impl Value {
    /// Builds a `Value` from a raw literal, promoting to a JSON number
    /// when the text round-trips exactly through an integer, or parses
    /// cleanly as a finite float.
    pub fn from_literal(raw: &str) -> Value {
        if let Ok(i) = raw.parse::<i64>() {
            if i.to_string() == raw {
                return Value::Number(Number::from(i));
            }
        }
        if !raw.is_empty() {
            if let Ok(f) = raw.parse::<f64>() {
                if f.is_finite() {
                    if let Some(n) = Number::from_f64(f) {
                        return Value::Number(n);
                    }
                }
            }
        }
        Value::String(raw.to_string())
    }

    /// Builds a `Value` that is always a plain string, regardless of shape.
    pub fn text(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

/// The unified query AST. A strict subset of the Elasticsearch Query DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    MatchNone,
    Match {
        field: String,
        value: Value,
        operator: Operator,
    },
    MatchPhrase {
        field: String,
        value: Value,
    },
    MatchPhrasePrefix {
        field: String,
        value: Value,
    },
    MultiMatch {
        fields: Vec<String>,
        value: Value,
        match_type: Option<MultiMatchType>,
        operator: Option<Operator>,
    },
    Term {
        field: String,
        value: Value,
    },
    Exists {
        field: String,
    },
    Range {
        field: String,
        gt: Option<Value>,
        gte: Option<Value>,
        lt: Option<Value>,
        lte: Option<Value>,
        time_zone: Option<String>,
    },
    Wildcard {
        field: String,
        value: String,
    },
    Regexp {
        field: String,
        value: String,
    },
    Fuzzy {
        field: String,
        value: String,
        fuzziness: Option<String>,
    },
    Prefix {
        field: String,
        value: String,
    },
    Nested {
        path: String,
        query: Box<Query>,
        score_mode: Option<ScoreMode>,
    },
    QueryString {
        query: String,
    },
    Bool {
        must: Vec<Query>,
        should: Vec<Query>,
        must_not: Vec<Query>,
        filter: Vec<Query>,
        minimum_should_match: Option<i64>,
    },
}

impl Query {
    /// A leaf whose matching is exact: ANDing such nodes is placed under
    /// `filter` rather than `must`.
    pub fn is_filter_safe(&self) -> bool {
        matches!(self, Query::Range { .. } | Query::Term { .. } | Query::Exists { .. })
    }

    /// Builds a `Bool` query from its four clause lists, collapsing to
    /// `MatchAll` when every list is empty.
    pub fn bool_query(
        must: Vec<Query>,
        should: Vec<Query>,
        must_not: Vec<Query>,
        filter: Vec<Query>,
        minimum_should_match: Option<i64>,
    ) -> Query {
        if must.is_empty() && should.is_empty() && must_not.is_empty() && filter.is_empty() {
            Query::MatchAll
        } else {
            Query::Bool {
                must,
                should,
                must_not,
                filter,
                minimum_should_match,
            }
        }
    }

    /// `a AND b`: filter-safe pairs go under `filter`, otherwise `must`.
    /// Consecutive ANDs flatten into a single `Bool` rather than nesting.
    pub fn and(self, other: Query) -> Query {
        let other_safe = other.is_filter_safe();

        if let Query::Bool {
            must,
            should,
            must_not,
            filter,
            minimum_should_match: None,
        } = &self
        {
            if should.is_empty() && must_not.is_empty() {
                if !filter.is_empty() && must.is_empty() {
                    return if other_safe {
                        let mut filter = filter.clone();
                        filter.push(other);
                        Query::Bool {
                            must: vec![],
                            should: vec![],
                            must_not: vec![],
                            filter,
                            minimum_should_match: None,
                        }
                    } else {
                        let mut must = filter.clone();
                        must.push(other);
                        Query::Bool {
                            must,
                            should: vec![],
                            must_not: vec![],
                            filter: vec![],
                            minimum_should_match: None,
                        }
                    };
                }
                if !must.is_empty() && filter.is_empty() {
                    let mut must = must.clone();
                    must.push(other);
                    return Query::Bool {
                        must,
                        should: vec![],
                        must_not: vec![],
                        filter: vec![],
                        minimum_should_match: None,
                    };
                }
            }
        }

        let self_safe = self.is_filter_safe();
        if self_safe && other_safe {
            Query::Bool {
                must: vec![],
                should: vec![],
                must_not: vec![],
                filter: vec![self, other],
                minimum_should_match: None,
            }
        } else {
            Query::Bool {
                must: vec![self, other],
                should: vec![],
                must_not: vec![],
                filter: vec![],
                minimum_should_match: None,
            }
        }
    }

    /// `a OR b`. Consecutive ORs flatten into a single `should` list.
    pub fn or(self, other: Query) -> Query {
        if let Query::Bool {
            must,
            should,
            must_not,
            filter,
            minimum_should_match: Some(1),
        } = &self
        {
            if must.is_empty() && must_not.is_empty() && filter.is_empty() {
                let mut should = should.clone();
                should.push(other);
                return Query::Bool {
                    must: vec![],
                    should,
                    must_not: vec![],
                    filter: vec![],
                    minimum_should_match: Some(1),
                };
            }
        }

        Query::Bool {
            must: vec![],
            should: vec![self, other],
            must_not: vec![],
            filter: vec![],
            minimum_should_match: Some(1),
        }
    }

    /// `NOT a`.
    pub fn negate(self) -> Query {
        Query::Bool {
            must: vec![],
            should: vec![],
            must_not: vec![self],
            filter: vec![],
            minimum_should_match: None,
        }
    }
}
