// src/domain/logic.rs

use serde_json::{Number, Value};

/// Groups the integer part of a JSON number with commas.
/// `500000` -> `500,000`, `1234.5` -> `1,234.5`.
pub fn group_thousands(n: &Number) -> String {
    let text = n.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.find(['.', 'e', 'E']) {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}{frac_part}")
}

/// Renders a loosely typed JSON scalar as cell text. `null` and missing become "".
pub fn value_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Joins a list-of-strings fact. Anything that is not a list yields "".
pub fn join_list(v: Option<&Value>) -> String {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| value_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Drops a unit word (e.g. "Days", "monthly") and surrounding whitespace.
pub fn strip_word(text: &str, word: &str) -> String {
    text.replace(word, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(v: Value) -> Number {
        match v {
            Value::Number(n) => n,
            _ => panic!("not a number"),
        }
    }

    #[test]
    fn groups_integers_and_floats() {
        assert_eq!(group_thousands(&num(json!(500000))), "500,000");
        assert_eq!(group_thousands(&num(json!(999))), "999");
        assert_eq!(group_thousands(&num(json!(1000))), "1,000");
        assert_eq!(group_thousands(&num(json!(-1234567))), "-1,234,567");
        assert_eq!(group_thousands(&num(json!(1234.5))), "1,234.5");
    }

    #[test]
    fn join_list_ignores_non_lists() {
        assert_eq!(join_list(Some(&json!(["Dishwasher", "Range"]))), "Dishwasher, Range");
        assert_eq!(join_list(Some(&json!("Dishwasher"))), "");
        assert_eq!(join_list(Some(&Value::Null)), "");
        assert_eq!(join_list(None), "");
    }

    #[test]
    fn value_text_renders_scalars() {
        assert_eq!(value_text(Some(&json!("abc"))), "abc");
        assert_eq!(value_text(Some(&json!(7))), "7");
        assert_eq!(value_text(Some(&Value::Null)), "");
    }
}
