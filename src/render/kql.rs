//! Renders a [`Query`] back to KQL source text.
//!
//! Only the variants reachable from `parse_kql` can be rendered this
//! way; anything else (a `term`, a `regexp`, a `multi_match`, ...) comes
//! from the Lucene escape hatch or the ES-DSL decoder and has no KQL
//! spelling, so rendering it raises a [`DecodeError`].
//!
//! Parenthesization follows the same precedence as the grammar: `or`
//! binds loosest, then `and`, then `not`, with field expressions and
//! range comparisons binding tightest of all.

use crate::ast::{Query, ScoreMode};
use crate::diag::DecodeError;
use crate::lexer::RESERVED;

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_ATOM: u8 = 4;

/// Renders `query` as KQL source text.
pub fn render(query: &Query) -> Result<String, DecodeError> {
    render_node(query, None).map(|(text, _)| text)
}

/// Renders one node, returning its text alongside the precedence level
/// a caller must compare against before wrapping it in parentheses.
/// `strip` is the absolute field-path prefix of an enclosing `nested`
/// query, stripped from leaf field names rendered underneath it.
fn render_node(query: &Query, strip: Option<&str>) -> Result<(String, u8), DecodeError> {
    match query {
        Query::MatchAll => Ok(("*".to_string(), PREC_ATOM)),

        Query::Match { field, value, .. } => {
            let field = strip_prefix(field, strip);
            let value_text = render_value(value);
            if field == "*" {
                Ok((value_text, PREC_ATOM))
            } else {
                Ok((format!("{}: {}", render_field(&field), value_text), PREC_ATOM))
            }
        }

        Query::MatchPhrase { field, value } => {
            let field = strip_prefix(field, strip);
            let value_text = render_phrase(value.as_str().unwrap_or_default());
            if field == "*" {
                Ok((value_text, PREC_ATOM))
            } else {
                Ok((format!("{}: {}", render_field(&field), value_text), PREC_ATOM))
            }
        }

        Query::Wildcard { field, value } => {
            let field = strip_prefix(field, strip);
            Ok((format!("{}: {}", render_field(&field), value), PREC_ATOM))
        }

        Query::QueryString { query } => Ok((render_literal(query), PREC_ATOM)),

        Query::Range {
            field,
            gt,
            gte,
            lt,
            lte,
            time_zone,
        } => {
            if time_zone.is_some() {
                return Err(not_representable("a range with a time_zone"));
            }
            let bounds: Vec<(&str, &crate::ast::Value)> = [("gt", gt), ("gte", gte), ("lt", lt), ("lte", lte)]
                .into_iter()
                .filter_map(|(op, v)| v.as_ref().map(|v| (op, v)))
                .collect();
            let (op, value) = match bounds.as_slice() {
                [one] => *one,
                _ => return Err(not_representable("a range with zero or multiple bounds")),
            };
            let op_text = match op {
                "gt" => ">",
                "gte" => ">=",
                "lt" => "<",
                _ => "<=",
            };
            let field = strip_prefix(field, strip);
            Ok((
                format!("{} {} {}", render_field(&field), op_text, render_value(value)),
                PREC_ATOM,
            ))
        }

        Query::Nested {
            path,
            query,
            score_mode,
        } => {
            if !matches!(score_mode, None | Some(ScoreMode::None)) {
                return Err(not_representable("a nested query with a non-default score_mode"));
            }
            let field = strip_prefix(path, strip);
            let (inner, _) = render_node(query, Some(path.as_str()))?;
            Ok((format!("{}: {{ {} }}", render_field(&field), inner), PREC_ATOM))
        }

        Query::Bool {
            must,
            should,
            must_not,
            filter,
            ..
        } => render_bool(must, should, must_not, filter, strip),

        other => Err(not_representable(&variant_name(other))),
    }
}

fn render_bool(
    must: &[Query],
    should: &[Query],
    must_not: &[Query],
    filter: &[Query],
    strip: Option<&str>,
) -> Result<(String, u8), DecodeError> {
    let mut parts: Vec<(String, u8)> = Vec::new();

    for clause in must.iter().chain(filter.iter()) {
        parts.push(render_node(clause, strip)?);
    }

    for clause in must_not {
        let (text, prec) = render_node(clause, strip)?;
        parts.push((format!("not {}", wrap_if(&text, prec, PREC_NOT)), PREC_NOT));
    }

    if !should.is_empty() {
        let mut or_parts = Vec::with_capacity(should.len());
        for clause in should {
            let (text, prec) = render_node(clause, strip)?;
            or_parts.push(wrap_if(&text, prec, PREC_OR));
        }
        parts.push((or_parts.join(" or "), PREC_OR));
    }

    match parts.len() {
        0 => Ok(("*".to_string(), PREC_ATOM)),
        1 => Ok(parts.into_iter().next().unwrap()),
        _ => {
            let joined = parts
                .iter()
                .map(|(text, prec)| wrap_if(text, *prec, PREC_AND))
                .collect::<Vec<_>>()
                .join(" and ");
            Ok((joined, PREC_AND))
        }
    }
}

fn wrap_if(text: &str, prec: u8, min_prec: u8) -> String {
    if prec < min_prec {
        format!("({text})")
    } else {
        text.to_string()
    }
}

fn strip_prefix(field: &str, strip: Option<&str>) -> String {
    match strip {
        Some(path) => {
            let prefix = format!("{path}.");
            field.strip_prefix(prefix.as_str()).unwrap_or(field).to_string()
        }
        None => field.to_string(),
    }
}

fn render_field(field: &str) -> String {
    field.split('.').map(render_segment).collect::<Vec<_>>().join(".")
}

fn render_segment(segment: &str) -> String {
    if segment == "*" || !needs_quoting(segment) {
        segment.to_string()
    } else {
        format!("\"{}\"", escape(segment))
    }
}

fn render_value(value: &crate::ast::Value) -> String {
    match value {
        crate::ast::Value::Number(n) => n.to_string(),
        crate::ast::Value::String(s) => render_literal(s),
    }
}

fn render_literal(text: &str) -> String {
    if needs_quoting(text) || text.contains('*') {
        render_phrase(text)
    } else {
        text.to_string()
    }
}

fn render_phrase(text: &str) -> String {
    format!("\"{}\"", escape(text))
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| c.is_whitespace() || RESERVED.contains(&c) || c == '\\')
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

fn variant_name(query: &Query) -> String {
    match query {
        Query::MatchAll => "match_all",
        Query::MatchNone => "match_none",
        Query::Match { .. } => "match",
        Query::MatchPhrase { .. } => "match_phrase",
        Query::MatchPhrasePrefix { .. } => "match_phrase_prefix",
        Query::MultiMatch { .. } => "multi_match",
        Query::Term { .. } => "term",
        Query::Exists { .. } => "exists",
        Query::Range { .. } => "range",
        Query::Wildcard { .. } => "wildcard",
        Query::Regexp { .. } => "regexp",
        Query::Fuzzy { .. } => "fuzzy",
        Query::Prefix { .. } => "prefix",
        Query::Nested { .. } => "nested",
        Query::QueryString { .. } => "query_string",
        Query::Bool { .. } => "bool",
    }
    .to_string()
}

fn not_representable(what: &str) -> DecodeError {
    DecodeError::without_position(format!("{what} is not representable in KQL"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Operator, Value};

    fn match_(field: &str, value: &str) -> Query {
        Query::Match {
            field: field.into(),
            value: Value::text(value),
            operator: Operator::Or,
        }
    }

    #[test]
    fn match_all_renders_star() {
        assert_eq!(render(&Query::MatchAll).unwrap(), "*");
    }

    #[test]
    fn value_only_match_has_no_field_prefix() {
        let q = Query::Match {
            field: "*".into(),
            value: Value::text("fast*"),
            operator: Operator::Or,
        };
        assert_eq!(render(&q).unwrap(), "fast*");
    }

    #[test]
    fn plain_field_value_round_trips() {
        let q = match_("http.request.method", "GET");
        assert_eq!(render(&q).unwrap(), "http.request.method: GET");
    }

    #[test]
    fn value_needing_quoting_is_quoted() {
        let q = match_("a", "b c");
        assert_eq!(render(&q).unwrap(), "a: \"b c\"");
    }

    #[test]
    fn and_chain_joins_with_and() {
        let q = match_("a", "1").and(match_("b", "2"));
        assert_eq!(render(&q).unwrap(), "a: 1 and b: 2");
    }

    #[test]
    fn or_chain_joins_with_or() {
        let q = match_("a", "1").or(match_("b", "2"));
        assert_eq!(render(&q).unwrap(), "a: 1 or b: 2");
    }

    #[test]
    fn negated_match_renders_not() {
        let q = match_("http.request.method", "GET").negate();
        assert_eq!(render(&q).unwrap(), "not http.request.method: GET");
    }

    #[test]
    fn or_inside_and_is_parenthesized() {
        let or_chain = match_("a", "1").or(match_("b", "2"));
        let q = or_chain.and(match_("c", "3"));
        assert_eq!(render(&q).unwrap(), "(a: 1 or b: 2) and c: 3");
    }

    #[test]
    fn and_inside_or_needs_no_parens() {
        let and_chain = match_("a", "1").and(match_("b", "2"));
        let q = and_chain.or(match_("c", "3"));
        assert_eq!(render(&q).unwrap(), "a: 1 and b: 2 or c: 3");
    }

    #[test]
    fn double_negation_needs_no_parens() {
        let q = match_("a", "1").negate().negate();
        assert_eq!(render(&q).unwrap(), "not not a: 1");
    }

    #[test]
    fn filter_only_bool_from_decoder_renders_as_and_chain() {
        let q = Query::Bool {
            must: vec![],
            should: vec![],
            must_not: vec![],
            filter: vec![
                match_("a", "b"),
                Query::MatchPhrase {
                    field: "c".into(),
                    value: Value::text("d"),
                },
            ],
            minimum_should_match: None,
        };
        assert_eq!(render(&q).unwrap(), "a: b and c: \"d\"");
    }

    #[test]
    fn nested_strips_path_prefix_from_inner_fields() {
        let q = Query::Nested {
            path: "identity".into(),
            query: Box::new(Query::MatchPhrase {
                field: "identity.first_name".into(),
                value: Value::text("John"),
            }),
            score_mode: Some(ScoreMode::None),
        };
        assert_eq!(render(&q).unwrap(), "identity: { first_name: \"John\" }");
    }

    #[test]
    fn range_renders_comparison_operator() {
        let q = Query::Range {
            field: "status".into(),
            gt: None,
            gte: Some(Value::from_literal("400")),
            lt: None,
            lte: None,
            time_zone: None,
        };
        assert_eq!(render(&q).unwrap(), "status >= 400");
    }

    #[test]
    fn range_with_multiple_bounds_is_not_representable() {
        let q = Query::Range {
            field: "status".into(),
            gt: Some(Value::from_literal("100")),
            gte: None,
            lt: Some(Value::from_literal("200")),
            lte: None,
            time_zone: None,
        };
        assert!(render(&q).is_err());
    }

    #[test]
    fn wildcard_field_value_renders_raw() {
        let q = Query::Wildcard {
            field: "foo.*.bar".into(),
            value: "f*b".into(),
        };
        assert_eq!(render(&q).unwrap(), "foo.*.bar: f*b");
    }

    #[test]
    fn field_needing_quoting_is_quoted() {
        let q = match_("a b", "c");
        assert_eq!(render(&q).unwrap(), "\"a b\": c");
    }

    #[test]
    fn term_is_not_representable() {
        let q = Query::Term {
            field: "a".into(),
            value: Value::text("b"),
        };
        let err = render(&q).unwrap_err();
        assert!(err.message.contains("not representable in KQL"));
    }

    #[test]
    fn regexp_is_not_representable() {
        let q = Query::Regexp {
            field: "a".into(),
            value: "b.*".into(),
        };
        assert!(render(&q).is_err());
    }
}
