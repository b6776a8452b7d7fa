//! Data sources: named value providers that elements populate themselves from.
//!
//! A form keeps an ordered list of sources. When an element is attached, or
//! the list changes, each element asks the sources in order for the value
//! under its name and takes the first answer (see [`resolve`]).

use std::fmt;

use crate::request::{Method, Request};
use crate::value::{Value, ValueMap};

/// A named value provider.
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Returns the value for an element name, `None` if absent.
    fn value(&self, name: &str) -> Option<Value>;

    /// Whether this source represents an actual form submission.
    ///
    /// An element consulting a submit source that has no value for it treats
    /// the field as answered with nothing instead of falling back to later
    /// (default) sources.
    fn is_submit(&self) -> bool {
        false
    }

    /// Whether this source can tell an explicit null from an absent value.
    fn is_null_aware(&self) -> bool {
        false
    }

    /// For null-aware sources: whether the name is present, even as null.
    fn has_value(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Returns an uploaded file record for the name.
    fn upload(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Which sources an element kind is willing to take its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter {
    /// All sources.
    Any,
    /// Only non-submit sources (static content).
    DefaultsOnly,
    /// Only submit sources (buttons).
    SubmitOnly,
}

impl SourceFilter {
    fn accepts(self, ds: &dyn DataSource) -> bool {
        match self {
            Self::Any => true,
            Self::DefaultsOnly => !ds.is_submit(),
            Self::SubmitOnly => ds.is_submit(),
        }
    }
}

/// Outcome of walking the data sources for one name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A source answered; the value may be `None` for an explicit null or
    /// a submission that did not contain the field.
    Found(Option<Value>),
    /// No source had anything to say.
    Unresolved,
}

/// Walks `sources` in order and returns the first qualifying answer.
///
/// A source qualifies if it yields a value, if it is a submit source, or if
/// it is null-aware and claims to hold the name.
pub fn resolve(sources: &[&dyn DataSource], name: &str, filter: SourceFilter) -> Resolution {
    for ds in sources.iter().filter(|ds| filter.accepts(**ds)) {
        if let Some(value) = ds.value(name) {
            return Resolution::Found(Some(value));
        }
        if ds.is_submit() || (ds.is_null_aware() && ds.has_value(name)) {
            return Resolution::Found(None);
        }
    }
    Resolution::Unresolved
}

/// A source backed by a JSON object, used for defaults, constants and
/// manual submissions.
///
/// It is null-aware: `{"field": null}` overrides values of later sources
/// with nothing.
#[derive(Debug, Clone, Default)]
pub struct ArrayDataSource {
    values: serde_json::Map<String, serde_json::Value>,
    submit: bool,
}

impl ArrayDataSource {
    /// Creates a source from a JSON object; other JSON values give an
    /// empty source.
    pub fn new(values: serde_json::Value) -> Self {
        let values = match values {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            values,
            submit: false,
        }
    }

    /// Creates a source that counts as a form submission.
    pub fn submitted(values: serde_json::Value) -> Self {
        Self {
            submit: true,
            ..Self::new(values)
        }
    }

    /// Returns the raw JSON entry for a bracketed name.
    fn lookup(&self, name: &str) -> Option<&serde_json::Value> {
        let tokens = crate::value::name_tokens(name);
        let (first, rest) = tokens.split_first()?;
        let mut current = self.values.get(*first)?;
        for token in rest {
            current = match current {
                serde_json::Value::Object(map) => map.get(*token)?,
                serde_json::Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Sets a top-level value.
    pub fn set(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.values.insert(name.into(), value);
    }
}

impl DataSource for ArrayDataSource {
    fn value(&self, name: &str) -> Option<Value> {
        self.lookup(name).and_then(Value::from_json)
    }

    fn is_submit(&self) -> bool {
        self.submit
    }

    fn is_null_aware(&self) -> bool {
        true
    }

    fn has_value(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn upload(&self, name: &str) -> Option<Value> {
        if !self.submit {
            return None;
        }
        let value = self.value(name)?;
        value.as_map()?.contains_key("error").then_some(value)
    }
}

/// The payload of the triggering request for one method.
#[derive(Debug, Clone)]
pub struct SubmitDataSource {
    method: Method,
    values: ValueMap,
    files: ValueMap,
}

impl SubmitDataSource {
    /// Wraps the parameters of `request` relevant to `method`.
    pub fn new(request: &Request, method: Method) -> Self {
        let files = match method {
            Method::Post => request.files.clone(),
            Method::Get => ValueMap::new(),
        };
        Self {
            method,
            values: request.payload(method).clone(),
            files,
        }
    }

    /// The method whose payload this source exposes.
    pub fn method(&self) -> Method {
        self.method
    }
}

impl DataSource for SubmitDataSource {
    fn value(&self, name: &str) -> Option<Value> {
        self.values.get_path(name).cloned()
    }

    fn is_submit(&self) -> bool {
        true
    }

    fn upload(&self, name: &str) -> Option<Value> {
        self.files.get_path(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_non_null_source_wins() {
        let a = ArrayDataSource::new(json!({"name": "A"}));
        let b = ArrayDataSource::new(json!({"name": "B"}));
        let sources: Vec<&dyn DataSource> = vec![&a, &b];
        assert_eq!(
            resolve(&sources, "name", SourceFilter::Any),
            Resolution::Found(Some(Value::from("A")))
        );
    }

    #[test]
    fn test_explicit_null_stops_resolution() {
        let a = ArrayDataSource::new(json!({"name": null}));
        let b = ArrayDataSource::new(json!({"name": "B"}));
        let sources: Vec<&dyn DataSource> = vec![&a, &b];
        assert_eq!(
            resolve(&sources, "name", SourceFilter::Any),
            Resolution::Found(None)
        );
        assert_eq!(
            resolve(&sources, "other", SourceFilter::Any),
            Resolution::Unresolved
        );
    }

    #[test]
    fn test_submit_source_answers_missing_fields() {
        let request = Request::post().body_param("a", "1");
        let submit = SubmitDataSource::new(&request, Method::Post);
        let defaults = ArrayDataSource::new(json!({"b": "default"}));
        let sources: Vec<&dyn DataSource> = vec![&submit, &defaults];
        assert_eq!(
            resolve(&sources, "b", SourceFilter::Any),
            Resolution::Found(None)
        );
        assert_eq!(
            resolve(&sources, "b", SourceFilter::DefaultsOnly),
            Resolution::Found(Some(Value::from("default")))
        );
    }

    #[test]
    fn test_array_source_bracket_names() {
        let ds = ArrayDataSource::new(json!({"user": {"tags": ["x", "y"]}}));
        assert_eq!(ds.value("user[tags][1]"), Some(Value::from("y")));
        assert!(ds.value("user[missing]").is_none());
        assert!(!ds.has_value("user[missing]"));
    }
}
