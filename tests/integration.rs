//! End-to-end coverage of the three decode paths (`parse_kql`,
//! `parse_lucene`, `parse_es`) and the reverse `render_as_kql` path,
//! exercising the literal scenarios and boundary behaviors the crate
//! is built against.

use kql_dsl::{parse_es, parse_kql, parse_lucene, render_as_kql};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn scenario_not_wraps_must_not() {
    let query = parse_kql("NOT http.request.method: GET").unwrap();
    assert_eq!(
        query.render(),
        json!({"bool": {"must_not": {"match": {"http.request.method": "GET"}}}})
    );
}

#[test]
fn scenario_nested_curly_braces() {
    let query = parse_kql(r#"identity: { first_name: "John" }"#).unwrap();
    assert_eq!(
        query.render(),
        json!({
            "nested": {
                "path": "identity",
                "query": {"match_phrase": {"identity.first_name": "John"}},
                "score_mode": "none",
            }
        })
    );
}

#[test]
fn scenario_lucene_escape_hatch() {
    let query = parse_lucene("a:b AND c:d").unwrap();
    assert_eq!(query.render(), json!({"query_string": {"query": "a:b AND c:d"}}));
}

#[test]
fn scenario_render_decoded_filter_chain_as_kql() {
    let doc = json!({
        "bool": {"filter": [{"match": {"a": "b"}}, {"match_phrase": {"c": "d"}}]}
    });
    let query = parse_es(&doc).unwrap();
    assert_eq!(render_as_kql(&query).unwrap(), r#"a: b and c: "d""#);
}

#[test]
fn scenario_double_colon_reports_exact_position() {
    let err = parse_kql("double_it:: and_give_it_to_the_next_person").unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(err.column, 11);
}

#[test]
fn scenario_range_promotes_numeric_literal() {
    let query = parse_kql("status: >= 400").unwrap();
    assert_eq!(query.render(), json!({"range": {"status": {"gte": 400}}}));
}

#[test]
fn boundary_empty_input_is_match_all() {
    assert_eq!(parse_kql("").unwrap(), kql_dsl::Query::MatchAll);
}

#[test]
fn boundary_whitespace_only_is_match_all() {
    assert_eq!(parse_kql("   \n\t  ").unwrap(), kql_dsl::Query::MatchAll);
}

#[test]
fn boundary_unterminated_quoted_string_errors_at_opening_quote() {
    let source = r#"message: "unterminated"#;
    let err = parse_kql(source).unwrap_err();
    assert_eq!(err.offset as usize, source.find('"').unwrap());
}

#[test]
fn boundary_unmatched_open_paren_errors_at_the_paren() {
    let err = parse_kql("(a: 1 or b: 2").unwrap_err();
    assert_eq!(err.offset, 0);
}

#[test]
fn boundary_wildcard_in_field_name_is_preserved() {
    let query = parse_kql("foo.*.bar: x").unwrap();
    assert_eq!(query.render(), json!({"match": {"foo.*.bar": "x"}}));
}

#[test]
fn round_trip_kql_and_operator_chain() {
    let source = "a: 1 and b: 2 and c: 3";
    let query = parse_kql(source).unwrap();
    assert_eq!(render_as_kql(&query).unwrap(), source);
}

#[test]
fn round_trip_kql_or_operator_chain() {
    let source = "a: 1 or b: 2";
    let query = parse_kql(source).unwrap();
    assert_eq!(render_as_kql(&query).unwrap(), source);
}

#[test]
fn round_trip_kql_negation() {
    let source = "not a: 1";
    let query = parse_kql(source).unwrap();
    assert_eq!(render_as_kql(&query).unwrap(), source);
}

#[test]
fn round_trip_kql_nested_query() {
    let source = r#"identity: { first_name: "John" }"#;
    let query = parse_kql(source).unwrap();
    assert_eq!(render_as_kql(&query).unwrap(), source);
}

#[test]
fn round_trip_kql_to_ast_to_json_is_deterministic() {
    let source = "a: 1 and (b: 2 or c: 3) and NOT d: 4";
    let first = parse_kql(source).unwrap().render();
    let second = parse_kql(source).unwrap().render();
    assert_eq!(first, second);
}

#[test]
fn lucene_structural_errors_report_unmatched_delimiters() {
    assert!(parse_lucene("(a:b AND c:d").is_err());
    assert!(parse_lucene(r#"title:"unterminated"#).is_err());
}

#[test]
fn es_decoder_rejects_unknown_keys() {
    assert!(parse_es(&json!({"span_near": {}})).is_err());
}

#[test]
fn render_as_kql_rejects_variants_not_reachable_from_kql() {
    let term = kql_dsl::Query::Term {
        field: "a".into(),
        value: kql_dsl::Value::text("b"),
    };
    let err = render_as_kql(&term).unwrap_err();
    assert!(err.message.contains("not representable in KQL"));
}
