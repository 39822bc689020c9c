//! Ordered parameter containers.

use crate::error::{RequestError, Result};
use armature_xss::{Params, Value};
use serde::Serialize;

/// Nesting deeper than this is ignored when parsing bracketed keys.
pub const MAX_NESTING_DEPTH: usize = 64;

/// An insertion-ordered map of request parameters.
///
/// Values are [`Value`] trees, so `a[]=1&a[]=2` and JSON bodies keep their
/// structure. Keys keep the order in which they were first set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterBag {
    parameters: Params,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// Bracketed keys nest: `a[]=x` appends to a list, `a[b][c]=x` builds
    /// maps. A leading `?` is ignored.
    pub fn from_query_string(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| RequestError::Query(format!("Failed to parse query string: {}", e)))?;

        Ok(Self::from_pairs(pairs))
    }

    /// Parse a form-encoded request body.
    pub fn from_form_body(body: &[u8]) -> Result<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| RequestError::Query(format!("Failed to parse form data: {}", e)))?;

        Ok(Self::from_pairs(pairs))
    }

    /// Parse a JSON object body.
    pub fn from_json(body: &str) -> Result<Self> {
        match serde_json::from_str::<serde_json::Value>(body)? {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect()),
            other => Err(RequestError::Parse(format!(
                "Expected a JSON object body, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut parameters = Params::new();
        for (key, value) in pairs {
            insert_nested(&mut parameters, &key, Value::String(value));
        }
        Self { parameters }
    }

    /// All parameters.
    pub fn all(&self) -> &Params {
        &self.parameters
    }

    pub fn keys(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// The value for `key`, or `default` when the key is absent.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.parameters
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.parameters.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.parameters.shift_remove(key)
    }

    /// Merge parameters in. Existing keys are overwritten in place.
    pub fn add(&mut self, parameters: impl IntoIterator<Item = (String, Value)>) {
        self.parameters.extend(parameters);
    }

    /// Replace every parameter.
    pub fn replace(&mut self, parameters: Params) {
        self.parameters = parameters;
    }

    pub fn count(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.parameters.iter()
    }

    /// The ASCII letters of the value.
    pub fn get_alpha(&self, key: &str) -> String {
        self.filtered_text(key, |c| c.is_ascii_alphabetic())
    }

    /// The ASCII letters and digits of the value.
    pub fn get_alnum(&self, key: &str) -> String {
        self.filtered_text(key, |c| c.is_ascii_alphanumeric())
    }

    /// The digits of the value.
    pub fn get_digits(&self, key: &str) -> String {
        self.filtered_text(key, |c| c.is_ascii_digit())
    }

    /// The value as an integer. Strings contribute their leading integer part.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.parameters.get(key) {
            Some(Value::Int(i)) => *i,
            Some(Value::Float(f)) => *f as i64,
            Some(Value::Bool(b)) => i64::from(*b),
            Some(Value::String(s)) => leading_int(s),
            _ => 0,
        }
    }

    /// The value as a boolean: `1`, `true`, `on` and `yes` are true.
    pub fn get_boolean(&self, key: &str) -> bool {
        match self.parameters.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Int(i)) => *i == 1,
            Some(Value::Float(f)) => *f == 1.0,
            Some(Value::String(s)) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            ),
            _ => false,
        }
    }

    fn filtered_text(&self, key: &str, keep: impl Fn(char) -> bool) -> String {
        match self.parameters.get(key) {
            Some(value) if !value.is_array() => {
                value.to_text().chars().filter(|&c| keep(c)).collect()
            }
            _ => String::new(),
        }
    }

    /// Drop top-level parameters whose value is `Null`.
    pub fn remove_nulls(&mut self) {
        self.parameters.retain(|_, value| !value.is_null());
    }

    pub fn without_nulls(mut self) -> Self {
        self.remove_nulls();
        self
    }

    pub fn into_params(self) -> Params {
        self.parameters
    }
}

impl From<Params> for ParameterBag {
    fn from(parameters: Params) -> Self {
        Self { parameters }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            parameters: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterBag {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

impl IntoIterator for ParameterBag {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.into_iter()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);

    text[..digits_end].parse().unwrap_or(0)
}

/// Split `a[b][]` into `a` and `["b", ""]`.
///
/// Keys starting with `[` or without a complete bracket pair stay literal.
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    if open == 0 {
        return (key, Vec::new());
    }

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        if segments.len() == MAX_NESTING_DEPTH {
            break;
        }
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }

    if segments.is_empty() {
        (key, Vec::new())
    } else {
        (&key[..open], segments)
    }
}

fn insert_nested(parameters: &mut Params, key: &str, value: Value) {
    let (base, segments) = split_key(key);

    let mut current = parameters;
    let mut name = base.to_string();
    for segment in segments {
        let child = child_params(current, name);
        name = if segment.is_empty() {
            next_index(child).to_string()
        } else {
            segment.to_string()
        };
        current = child;
    }

    current.insert(name, value);
}

/// The map stored under `name`, replacing any scalar found there.
fn child_params(parameters: &mut Params, name: String) -> &mut Params {
    let slot = parameters
        .entry(name)
        .or_insert_with(|| Value::Array(Params::new()));
    if !slot.is_array() {
        *slot = Value::Array(Params::new());
    }
    match slot {
        Value::Array(child) => child,
        _ => unreachable!("slot holds an array"),
    }
}

/// One past the largest integer key, used for `key[]` appends.
fn next_index(parameters: &Params) -> u64 {
    parameters
        .keys()
        .filter_map(|key| key.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
}
