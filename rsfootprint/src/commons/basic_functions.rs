use serde_json::Value;

/// Render a JSON value the way a Python list literal prints it.
/// `["1", "2"]` becomes `['1', '2']`, `[1, 2.5]` becomes `[1, 2.5]`.
pub fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(python_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), python_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

// Single quotes unless the text holds one and no double quote,
// with the escapes Python's repr uses
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push(delimiter);
    for ch in s.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c < ' ' || ('\u{7f}'..='\u{9f}').contains(&c) => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_python_repr_strings() {
        assert_eq!(python_repr(&json!(["1", "2"])), "['1', '2']");
    }

    #[test]
    fn test_python_repr_numbers_and_nesting() {
        assert_eq!(python_repr(&json!([1, 2.5, [3]])), "[1, 2.5, [3]]");
        assert_eq!(python_repr(&json!([true, null])), "[True, None]");
        assert_eq!(python_repr(&json!([])), "[]");
    }

    #[test]
    fn test_python_repr_quotes() {
        assert_eq!(python_repr(&json!(["l'eau"])), "[\"l'eau\"]");
        assert_eq!(python_repr(&json!({"a": 1})), "{'a': 1}");
    }

    #[test]
    fn test_python_repr_escapes() {
        assert_eq!(python_repr(&json!(["a\nb"])), r"['a\nb']");
        assert_eq!(python_repr(&json!(["tab\there"])), r"['tab\there']");
        assert_eq!(python_repr(&json!(["it's\\x"])), r#"["it's\\x"]"#);
        assert_eq!(python_repr(&json!(["both ' and \""])), r#"['both \' and "']"#);
        assert_eq!(python_repr(&json!(["bell\u{7}"])), r"['bell\x07']");
    }
}
