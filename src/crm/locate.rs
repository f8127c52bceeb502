use serde_json::Value;

use super::lenient::Record;

/// Envelope keys every endpoint may use, in priority order.
pub const ENVELOPE_KEYS: [&str; 2] = ["items", "data"];

/// Finds the record list inside a CRM envelope.
///
/// Tries `items`, `data`, then the resource aliases, and returns the first one
/// that holds a list. An envelope that is itself a list is the record list.
/// Nothing found is an empty slice, not an error.
pub fn locate<'a>(envelope: &'a Value, aliases: &[&str]) -> &'a [Value] {
    match envelope {
        Value::Array(values) => values,
        Value::Object(map) => ENVELOPE_KEYS
            .iter()
            .chain(aliases)
            .find_map(|key| map.get(*key)?.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

/// Located entries that are JSON objects, in source order.
pub fn records<'a>(envelope: &'a Value, aliases: &[&str]) -> impl Iterator<Item = &'a Record> {
    locate(envelope, aliases).iter().filter_map(Value::as_object)
}
