//! Request data and the pure helpers that turn it into URLs.
//!
//! `QueryData` is what callers pass in: an ordered key/value list where a
//! value may be absent. `omit_undefined` drops the absent entries and yields
//! `Params`, which feeds both path substitution and the query string (GET)
//! or the JSON body (everything else).

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Cleaned request data. Insertion order is preserved.
pub type Params = Map<String, Value>;

/// Text substituted for a placeholder whose key is missing.
pub const MISSING_PLACEHOLDER: &str = "undefined";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z0-9_]+)").expect("placeholder pattern is valid"));

/// Caller-supplied request data. `None` marks an absent value; JSON `null`
/// is a real value and is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryData {
    entries: Vec<(String, Option<Value>)>,
}

impl QueryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert` for a present value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    /// Builder form of `insert` for a value that may be absent.
    pub fn with_optional<V: Into<Value>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key, value.map(Into::into));
        self
    }

    /// Set `key`. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Option<Value>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Build from any value that serializes to a JSON object. Fields skipped
    /// by serde never appear; `null` fields are kept as `null`.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        match serde_json::to_value(value).map_err(|e| ApiError::Serialization(e.to_string()))? {
            Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, Some(v))).collect()),
            Value::Null => Ok(Self::new()),
            other => Err(ApiError::Serialization(format!(
                "request data must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Value>)> for QueryData {
    fn from_iter<I: IntoIterator<Item = (K, Option<Value>)>>(iter: I) -> Self {
        let mut data = QueryData::new();
        for (k, v) in iter {
            data.insert(k, v);
        }
        data
    }
}

impl From<Params> for QueryData {
    fn from(params: Params) -> Self {
        params.into_iter().map(|(k, v)| (k, Some(v))).collect()
    }
}

/// Drop every entry whose value is absent.
pub fn omit_undefined(data: QueryData) -> Params {
    data.entries
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
}

/// Replace every `:name` token in `path` with `params[name]` as text.
///
/// Values are inserted verbatim, without percent-encoding. A name with no
/// entry in `params` becomes the literal `undefined`. Tokens are matched
/// whole, so `:id` never rewrites the prefix of `:idx` (a plain global
/// `:id` replacement would turn `/a/:id/:idx` into `/a/5/5x`).
pub fn replace_url_params(path: &str, params: &Params) -> String {
    PLACEHOLDER
        .replace_all(path, |caps: &Captures<'_>| match params.get(&caps[1]) {
            Some(value) => value_to_string(value),
            None => MISSING_PLACEHOLDER.to_string(),
        })
        .into_owned()
}

/// Placeholder names in `path`, deduplicated, in order of first appearance.
pub fn placeholder_names(path: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(path) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// `application/x-www-form-urlencoded` serialization of `params`.
pub fn stringify_query(params: &Params) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, &value_to_string(value));
    }
    serializer.finish()
}

/// Text form of a value as used in paths and query strings.
///
/// Strings are used as is, numbers drop a zero fraction (`2.0` -> `2`),
/// arrays join their elements with `,` (`null` elements become empty) and
/// objects collapse to `[object Object]`.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn omit_undefined_drops_absent_values_only() {
        let data = QueryData::new()
            .with("a", 1)
            .with_optional::<i64>("b", None)
            .with("c", Value::Null);
        let clean = omit_undefined(data);
        assert_eq!(Value::Object(clean), json!({"a": 1, "c": null}));
    }

    #[test]
    fn insert_replaces_existing_key_in_place() {
        let data = QueryData::new().with("a", 1).with("b", 2).with("a", 3);
        let keys: Vec<&str> = data.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(data.get("a"), Some(&Some(json!(3))));
    }

    #[test]
    fn replaces_repeated_placeholders() {
        let p = params(json!({"a": "1", "b": "2"}));
        assert_eq!(replace_url_params("/x/:a/:b/:a/:b", &p), "/x/1/2/1/2");
    }

    #[test]
    fn missing_placeholder_becomes_undefined() {
        let p = params(json!({}));
        assert_eq!(replace_url_params("/items/:id", &p), "/items/undefined");
    }

    #[test]
    fn placeholder_prefix_does_not_leak_into_longer_name() {
        let p = params(json!({"id": 5, "idx": 9}));
        assert_eq!(replace_url_params("/a/:id/:idx", &p), "/a/5/9");
    }

    #[test]
    fn substitution_is_not_escaped() {
        let p = params(json!({"name": "a b/c"}));
        assert_eq!(replace_url_params("/files/:name", &p), "/files/a b/c");
    }

    #[test]
    fn placeholder_names_are_deduplicated() {
        assert_eq!(placeholder_names("/:a/:b/:a"), vec!["a", "b"]);
        assert!(placeholder_names("/plain").is_empty());
    }

    #[test]
    fn query_is_form_urlencoded_in_order() {
        let p = params(json!({"id": 5, "q": "x y&z", "flag": true}));
        assert_eq!(stringify_query(&p), "id=5&q=x+y%26z&flag=true");
    }

    #[test]
    fn empty_query_is_empty_string() {
        assert_eq!(stringify_query(&Params::new()), "");
    }

    #[test]
    fn value_text_forms() {
        assert_eq!(value_to_string(&json!("s")), "s");
        assert_eq!(value_to_string(&json!(5)), "5");
        assert_eq!(value_to_string(&json!(2.0)), "2");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!(1e16)), "10000000000000000");
        assert_eq!(value_to_string(&json!(1e20)), "100000000000000000000");
        assert_eq!(value_to_string(&json!(null)), "null");
        assert_eq!(value_to_string(&json!([1, null, "a"])), "1,,a");
        assert_eq!(value_to_string(&json!({"k": 1})), "[object Object]");
    }

    #[test]
    fn from_serialize_reads_struct_fields() {
        #[derive(Serialize)]
        struct Filter {
            q: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            page: Option<u32>,
        }
        let data = QueryData::from_serialize(&Filter { q: "x".to_string(), page: None }).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("q"), Some(&Some(json!("x"))));
    }

    #[test]
    fn from_serialize_rejects_non_objects() {
        let err = QueryData::from_serialize(&[1, 2]).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
        assert!(QueryData::from_serialize(&()).unwrap().is_empty());
    }
}
