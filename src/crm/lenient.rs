//! Typed reads from untyped CRM JSON.
//!
//! Every adapter field goes through these helpers, so the defaulting policy
//! lives in one place: a value of the wrong type is treated exactly like a
//! missing one.

use serde_json::{Map, Value};

/// A raw CRM record.
pub type Record = Map<String, Value>;

pub trait Lenient {
    /// Numeric field as an integer. Floats are truncated, strings are ignored.
    fn int(&self, key: &str) -> Option<i64>;

    /// Non-blank string field, trimmed.
    fn text(&self, key: &str) -> Option<&str>;

    fn flag(&self, key: &str) -> Option<bool>;

    fn nested(&self, key: &str) -> Option<&Record>;

    /// Phone numbers arrive either as a string or as a list of strings.
    fn phone(&self, key: &str) -> Option<&str>;

    /// First key that yields a number.
    fn first_int(&self, keys: &[&str]) -> Option<i64> {
        keys.iter().find_map(|key| self.int(key))
    }

    /// First key that yields a non-blank string.
    fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.text(key))
    }
}

impl Lenient for Record {
    fn int(&self, key: &str) -> Option<i64> {
        as_int(self.get(key)?)
    }

    fn text(&self, key: &str) -> Option<&str> {
        as_text(self.get(key)?)
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    fn nested(&self, key: &str) -> Option<&Record> {
        self.get(key)?.as_object()
    }

    fn phone(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Value::Array(values) => values.iter().find_map(as_text),
            other => as_text(other),
        }
    }
}

fn as_int(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

fn as_text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Owned string or the placeholder.
pub fn text_or(value: Option<&str>, placeholder: &str) -> String {
    value.unwrap_or(placeholder).to_string()
}

/// `last first middle`, skipping empty parts, or the placeholder when all are empty.
pub fn full_name(last: &str, first: &str, middle: &str, placeholder: &str) -> String {
    let name = [last, first, middle]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        placeholder.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn int_accepts_only_numbers() {
        let r = record(json!({"a": 42, "b": 42.9, "c": "42", "d": null, "e": -3}));
        assert_eq!(r.int("a"), Some(42));
        assert_eq!(r.int("b"), Some(42));
        assert_eq!(r.int("c"), None);
        assert_eq!(r.int("d"), None);
        assert_eq!(r.int("e"), Some(-3));
        assert_eq!(r.int("missing"), None);
    }

    #[test]
    fn text_skips_blank_and_mistyped_values() {
        let r = record(json!({"a": " Yoga ", "b": "", "c": 5, "d": "   "}));
        assert_eq!(r.text("a"), Some("Yoga"));
        assert_eq!(r.text("b"), None);
        assert_eq!(r.text("c"), None);
        assert_eq!(r.text("d"), None);
        assert_eq!(r.first_text(&["b", "c", "a"]), Some("Yoga"));
    }

    #[test]
    fn phone_takes_first_string_of_a_list() {
        let r = record(json!({"list": [1, "", "+79001234567"], "plain": "+7900"}));
        assert_eq!(r.phone("list"), Some("+79001234567"));
        assert_eq!(r.phone("plain"), Some("+7900"));
    }

    #[test]
    fn full_name_skips_empty_parts() {
        assert_eq!(full_name("Ivanova", "Anna", "", "Coach"), "Ivanova Anna");
        assert_eq!(full_name("", "Anna", "Petrovna", "Coach"), "Anna Petrovna");
        assert_eq!(full_name(" ", "", "", "Coach"), "Coach");
    }
}
