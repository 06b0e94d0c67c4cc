use std::borrow::Cow;

/// Decodes HTML entities until the text stops changing, so decoding an
/// already-decoded value is a no-op. Every pass that changes the text makes it
/// strictly shorter, so the loop terminates at any nesting depth.
pub fn unescape(text: &str) -> String {
    let mut current = Cow::Borrowed(text);
    while current.contains('&') {
        let decoded = html_escape::decode_html_entities(current.as_ref());
        if decoded.len() >= current.len() {
            break;
        }
        current = Cow::Owned(decoded.into_owned());
    }
    current.into_owned()
}

/// Decodes every string in a JSON tree in place.
pub fn unescape_value(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) => {
            if s.contains('&') {
                *s = unescape(s);
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(unescape_value),
        serde_json::Value::Object(map) => map.values_mut().for_each(unescape_value),
        _ => {}
    }
}
