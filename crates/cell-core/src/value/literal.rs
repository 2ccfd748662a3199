//! Parsing of default-value source text into JSON values.

use serde_json::Value as Json;
use thiserror::Error;

/// Numbers at or above this magnitude are kept as floats.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error("Illegal format")]
    IllegalFormat,
    #[error("Illegal format: {0}")]
    Json(String),
}

/// Parse the text of a literal: booleans, numbers, single or double quoted
/// strings, and JSON arrays or objects. Leading and trailing whitespace is
/// ignored.
pub fn parse_literal(text: &str) -> Result<Json, LiteralError> {
    let text = text.trim();
    match text {
        "true" => return Ok(Json::Bool(true)),
        "false" => return Ok(Json::Bool(false)),
        _ => {}
    }
    if let Some(number) = parse_number(text) {
        return Ok(number);
    }
    for quote in ['\'', '"'] {
        if text.starts_with(quote) {
            return parse_quoted(text, quote).map(Json::String);
        }
    }
    if text.starts_with('[') || text.starts_with('{') {
        return serde_json::from_str(text).map_err(|err| LiteralError::Json(err.to_string()));
    }
    Err(LiteralError::IllegalFormat)
}

fn parse_number(text: &str) -> Option<Json> {
    let first = text.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        Some(Json::from(value as i64))
    } else {
        serde_json::Number::from_f64(value).map(Json::Number)
    }
}

fn parse_quoted(text: &str, quote: char) -> Result<String, LiteralError> {
    let inner = text
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .ok_or(LiteralError::IllegalFormat)?;
    if inner.contains('\n') {
        return Err(LiteralError::IllegalFormat);
    }
    Ok(inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_scalars() {
        assert_eq!(parse_literal(" true "), Ok(json!(true)));
        assert_eq!(parse_literal("false"), Ok(json!(false)));
        assert_eq!(parse_literal("42"), Ok(json!(42)));
        assert_eq!(parse_literal("-7"), Ok(json!(-7)));
        assert_eq!(parse_literal("1.5"), Ok(json!(1.5)));
        assert_eq!(parse_literal("3.0"), Ok(json!(3)));
        assert_eq!(parse_literal("'abc'"), Ok(json!("abc")));
        assert_eq!(parse_literal("\"abc\""), Ok(json!("abc")));
    }

    #[test]
    fn parses_json_containers() {
        assert_eq!(parse_literal("[1, 2, 3]"), Ok(json!([1, 2, 3])));
        assert_eq!(parse_literal("{\"a\": 1}"), Ok(json!({"a": 1})));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(parse_literal("foo"), Err(LiteralError::IllegalFormat));
        assert_eq!(parse_literal("'abc"), Err(LiteralError::IllegalFormat));
        assert_eq!(parse_literal(""), Err(LiteralError::IllegalFormat));
        assert_eq!(parse_literal("Infinity"), Err(LiteralError::IllegalFormat));
        assert!(matches!(parse_literal("{a: 1}"), Err(LiteralError::Json(_))));
    }
}
