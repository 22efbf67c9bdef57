//! Decodes a JSON Elasticsearch Query DSL document into a [`Query`].
//!
//! This is the inverse of [`crate::render::render_json`], used so the
//! KQL renderer can be demonstrated against hand-authored Query DSL
//! documents rather than only trees produced by `parse_kql`. Unknown
//! top-level keys, and any shape the renderer would never itself
//! produce, are decode errors.

use crate::ast::{MultiMatchType, Operator, Query, ScoreMode, Value};
use crate::diag::DecodeError;
use serde_json::{Map, Value as Json};

/// Decodes `value`, a single-key JSON object naming one Query DSL
/// variant, into a [`Query`].
pub fn parse(value: &Json) -> Result<Query, DecodeError> {
    let (key, body) = single_entry(value)?;

    match key.as_str() {
        "match_all" => Ok(Query::MatchAll),
        "match_none" => Ok(Query::MatchNone),
        "match" => decode_match(body),
        "match_phrase" => {
            let (field, value) = decode_field_value(body)?;
            Ok(Query::MatchPhrase { field, value })
        }
        "match_phrase_prefix" => {
            let (field, value) = decode_field_value(body)?;
            Ok(Query::MatchPhrasePrefix { field, value })
        }
        "multi_match" => decode_multi_match(body),
        "term" => {
            let (field, value) = decode_field_value(body)?;
            Ok(Query::Term { field, value })
        }
        "exists" => decode_exists(body),
        "range" => decode_range(body),
        "wildcard" => {
            let (field, value) = decode_string_leaf(body)?;
            Ok(Query::Wildcard { field, value })
        }
        "regexp" => {
            let (field, value) = decode_string_leaf(body)?;
            Ok(Query::Regexp { field, value })
        }
        "fuzzy" => decode_fuzzy(body),
        "prefix" => {
            let (field, value) = decode_string_leaf(body)?;
            Ok(Query::Prefix { field, value })
        }
        "nested" => decode_nested(body),
        "query_string" => decode_query_string(body),
        "bool" => decode_bool(body),
        other => Err(DecodeError::without_position(format!(
            "unknown Query DSL key '{other}'"
        ))),
    }
}

fn single_entry(value: &Json) -> Result<(String, &Json), DecodeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected a JSON object"))?;
    let mut entries = obj.iter();
    let (key, body) = entries
        .next()
        .ok_or_else(|| DecodeError::without_position("expected a non-empty JSON object"))?;
    if entries.next().is_some() {
        return Err(DecodeError::without_position(
            "expected exactly one top-level key",
        ));
    }
    Ok((key.clone(), body))
}

fn field_entry(body: &Json) -> Result<(String, &Json), DecodeError> {
    let obj = body
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected a field object"))?;
    let mut entries = obj.iter();
    let (field, raw) = entries
        .next()
        .ok_or_else(|| DecodeError::without_position("expected a field name"))?;
    if entries.next().is_some() {
        return Err(DecodeError::without_position("expected exactly one field"));
    }
    Ok((field.clone(), raw))
}

fn json_to_value(value: &Json) -> Result<Value, DecodeError> {
    match value {
        Json::String(s) => Ok(Value::text(s.clone())),
        Json::Number(n) => Ok(Value::Number(n.clone())),
        Json::Bool(b) => Ok(Value::text(b.to_string())),
        _ => Err(DecodeError::without_position(
            "expected a string, number, or boolean value",
        )),
    }
}

fn decode_field_value(body: &Json) -> Result<(String, Value), DecodeError> {
    let (field, raw) = field_entry(body)?;
    Ok((field, json_to_value(raw)?))
}

fn decode_match(body: &Json) -> Result<Query, DecodeError> {
    let (field, raw) = field_entry(body)?;
    if let Some(obj) = raw.as_object() {
        let query = obj
            .get("query")
            .ok_or_else(|| DecodeError::without_position("match object missing 'query'"))?;
        let operator = match obj.get("operator").and_then(Json::as_str) {
            Some("and") => Operator::And,
            Some("or") | None => Operator::Or,
            Some(other) => {
                return Err(DecodeError::without_position(format!(
                    "unknown match operator '{other}'"
                )));
            }
        };
        Ok(Query::Match {
            field,
            value: json_to_value(query)?,
            operator,
        })
    } else {
        Ok(Query::Match {
            field,
            value: json_to_value(raw)?,
            operator: Operator::Or,
        })
    }
}

fn decode_multi_match(body: &Json) -> Result<Query, DecodeError> {
    let obj = body
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected a multi_match object"))?;
    let value = json_to_value(
        obj.get("query")
            .ok_or_else(|| DecodeError::without_position("multi_match missing 'query'"))?,
    )?;
    let fields = obj
        .get("fields")
        .and_then(Json::as_array)
        .ok_or_else(|| DecodeError::without_position("multi_match missing 'fields'"))?
        .iter()
        .map(|f| {
            f.as_str()
                .map(String::from)
                .ok_or_else(|| DecodeError::without_position("multi_match field must be a string"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let match_type = match obj.get("type").and_then(Json::as_str) {
        Some("phrase") => Some(MultiMatchType::Phrase),
        Some("phrase_prefix") => Some(MultiMatchType::PhrasePrefix),
        Some("best_fields") => Some(MultiMatchType::BestFields),
        Some(other) => {
            return Err(DecodeError::without_position(format!(
                "unknown multi_match type '{other}'"
            )));
        }
        None => None,
    };
    let operator = match obj.get("operator").and_then(Json::as_str) {
        Some("and") => Some(Operator::And),
        Some("or") => Some(Operator::Or),
        Some(other) => {
            return Err(DecodeError::without_position(format!(
                "unknown multi_match operator '{other}'"
            )));
        }
        None => None,
    };
    Ok(Query::MultiMatch {
        fields,
        value,
        match_type,
        operator,
    })
}

fn decode_exists(body: &Json) -> Result<Query, DecodeError> {
    let obj = body
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected an exists object"))?;
    let field = obj
        .get("field")
        .and_then(Json::as_str)
        .ok_or_else(|| DecodeError::without_position("exists missing 'field'"))?
        .to_string();
    Ok(Query::Exists { field })
}

fn decode_range(body: &Json) -> Result<Query, DecodeError> {
    let (field, bounds_json) = field_entry(body)?;
    let bounds: &Map<String, Json> = bounds_json
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected a range bounds object"))?;

    let bound = |key: &str| -> Result<Option<Value>, DecodeError> {
        bounds.get(key).map(json_to_value).transpose()
    };
    let gt = bound("gt")?;
    let gte = bound("gte")?;
    let lt = bound("lt")?;
    let lte = bound("lte")?;
    let time_zone = bounds.get("time_zone").and_then(Json::as_str).map(String::from);

    if gt.is_none() && gte.is_none() && lt.is_none() && lte.is_none() {
        return Err(DecodeError::without_position(
            "range requires at least one bound",
        ));
    }

    Ok(Query::Range {
        field,
        gt,
        gte,
        lt,
        lte,
        time_zone,
    })
}

fn decode_string_leaf(body: &Json) -> Result<(String, String), DecodeError> {
    let (field, raw) = field_entry(body)?;
    let value = if let Some(obj) = raw.as_object() {
        obj.get("value")
            .and_then(Json::as_str)
            .ok_or_else(|| DecodeError::without_position("expected a 'value' string"))?
            .to_string()
    } else {
        raw.as_str()
            .ok_or_else(|| DecodeError::without_position("expected a string value"))?
            .to_string()
    };
    Ok((field, value))
}

fn decode_fuzzy(body: &Json) -> Result<Query, DecodeError> {
    let (field, raw) = field_entry(body)?;
    if let Some(obj) = raw.as_object() {
        let value = obj
            .get("value")
            .and_then(Json::as_str)
            .ok_or_else(|| DecodeError::without_position("fuzzy missing 'value'"))?
            .to_string();
        let fuzziness = obj.get("fuzziness").map(|v| match v {
            Json::String(s) => s.clone(),
            other => other.to_string(),
        });
        Ok(Query::Fuzzy {
            field,
            value,
            fuzziness,
        })
    } else {
        let value = raw
            .as_str()
            .ok_or_else(|| DecodeError::without_position("expected a string value"))?
            .to_string();
        Ok(Query::Fuzzy {
            field,
            value,
            fuzziness: None,
        })
    }
}

fn decode_nested(body: &Json) -> Result<Query, DecodeError> {
    let obj = body
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected a nested object"))?;
    let path = obj
        .get("path")
        .and_then(Json::as_str)
        .ok_or_else(|| DecodeError::without_position("nested missing 'path'"))?
        .to_string();
    let inner = obj
        .get("query")
        .ok_or_else(|| DecodeError::without_position("nested missing 'query'"))?;
    let query = Box::new(parse(inner)?);
    let score_mode = match obj.get("score_mode").and_then(Json::as_str) {
        Some("none") => Some(ScoreMode::None),
        Some("avg") => Some(ScoreMode::Avg),
        Some("sum") => Some(ScoreMode::Sum),
        Some("max") => Some(ScoreMode::Max),
        Some("min") => Some(ScoreMode::Min),
        Some(other) => {
            return Err(DecodeError::without_position(format!(
                "unknown score_mode '{other}'"
            )));
        }
        None => None,
    };
    Ok(Query::Nested {
        path,
        query,
        score_mode,
    })
}

fn decode_query_string(body: &Json) -> Result<Query, DecodeError> {
    let obj = body
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected a query_string object"))?;
    let query = obj
        .get("query")
        .and_then(Json::as_str)
        .ok_or_else(|| DecodeError::without_position("query_string missing 'query'"))?
        .to_string();
    Ok(Query::QueryString { query })
}

fn decode_bool(body: &Json) -> Result<Query, DecodeError> {
    let obj = body
        .as_object()
        .ok_or_else(|| DecodeError::without_position("expected a bool object"))?;
    let must = decode_clause_list(obj.get("must"))?;
    let should = decode_clause_list(obj.get("should"))?;
    let must_not = decode_clause_list(obj.get("must_not"))?;
    let filter = decode_clause_list(obj.get("filter"))?;
    let minimum_should_match = obj.get("minimum_should_match").and_then(Json::as_i64);
    Ok(Query::bool_query(must, should, must_not, filter, minimum_should_match))
}

fn decode_clause_list(value: Option<&Json>) -> Result<Vec<Query>, DecodeError> {
    match value {
        None => Ok(vec![]),
        Some(Json::Array(items)) => items.iter().map(parse).collect(),
        Some(single) => Ok(vec![parse(single)?]),
    }
}
