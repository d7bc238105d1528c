pub mod chain;
pub mod commit;
pub mod demo;
pub mod prove;
pub mod status;
pub mod verify;

use anyhow::Context;
use catena_kernel::Value;

/// Parse a directive input value: bare integers, booleans, and `nil` for
/// convenience, JSON for everything else.
pub fn parse_value(input: &str) -> anyhow::Result<Value> {
    let trimmed = input.trim();
    if trimmed == "nil" {
        return Ok(Value::Nil);
    }
    if trimmed == "true" {
        return Ok(Value::Bool(true));
    }
    if trimmed == "false" {
        return Ok(Value::Bool(false));
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Num(n));
    }
    serde_json::from_str(trimmed).with_context(|| format!("cannot parse input value `{input}`"))
}

/// Render a value the way the transcript shows it.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Num(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Pair(a, b) => format!("({} . {})", render_value(a), render_value(b)),
        Value::Closure(_) => "<closure>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_forms() {
        assert_eq!(parse_value("9").unwrap(), Value::Num(9));
        assert_eq!(parse_value("-3").unwrap(), Value::Num(-3));
        assert_eq!(parse_value("true").unwrap(), Value::Bool(true));
        assert_eq!(parse_value("nil").unwrap(), Value::Nil);
        assert!(parse_value("not a value").is_err());
    }

    #[test]
    fn test_render_pairs() {
        let value = Value::pair(Value::Num(1), Value::pair(Value::Num(2), Value::Nil));
        assert_eq!(render_value(&value), "(1 . (2 . nil))");
    }
}
