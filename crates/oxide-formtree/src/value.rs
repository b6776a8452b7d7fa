//! Submitted and aggregated form values.
//!
//! Browsers submit flat `name=value` pairs, but bracketed names such as
//! `user[address][city]` or `tags[]` describe nested structures. A [`Value`]
//! is therefore either a string scalar or an ordered [`ValueMap`] whose keys
//! are integer indices or names, mirroring the shape the request decoder and
//! the container value aggregation produce.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A key of a [`ValueMap`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integer index, as produced by `name[]` or `name[3]`.
    Index(i64),
    /// Named key.
    Name(String),
}

impl Key {
    /// Parses a key token, turning canonical decimal integers into indices.
    ///
    /// `"3"` and `"-1"` become indices, while `"03"`, `"+1"` or `"a"` stay names.
    pub fn parse(token: &str) -> Self {
        let digits = token.strip_prefix('-').unwrap_or(token);
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'))
            && token != "-0";
        if canonical {
            if let Ok(index) = token.parse::<i64>() {
                return Self::Index(index);
            }
        }
        Self::Name(token.to_string())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => f.write_str(n),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Self::Index(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

/// Splits an element name into its bracket tokens.
///
/// `a[b][]` yields `["a", "b", ""]`. A name without brackets, or one starting
/// with a bracket, is a single token.
pub fn name_tokens(name: &str) -> Vec<&str> {
    match name.find('[') {
        Some(pos) if pos > 0 => {
            let mut tokens = vec![&name[..pos]];
            let mut rest = &name[pos..];
            while let Some(stripped) = rest.strip_prefix('[') {
                match stripped.find(']') {
                    Some(end) => {
                        tokens.push(&stripped[..end]);
                        rest = &stripped[end + 1..];
                    }
                    None => {
                        tokens.push(stripped);
                        rest = "";
                    }
                }
            }
            tokens
        }
        _ => vec![name],
    }
}

/// Rebuilds a bracketed name from tokens: `["a", "b", ""]` gives `a[b][]`.
pub fn join_name_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i == 0 {
            out.push_str(token.as_ref());
        } else {
            out.push('[');
            out.push_str(token.as_ref());
            out.push(']');
        }
    }
    out
}

/// An ordered map of form values.
///
/// Insertion order is preserved and overwriting an existing key keeps its
/// position. Integer keys are never renumbered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: Vec<(Key, Value)>,
}

impl ValueMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a direct child.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let key = key.into();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Looks up a direct child mutably.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Value> {
        let key = key.into();
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Whether a direct child with this key exists.
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or overwrites a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.get_mut(key.clone()) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// The index `push` would use: one past the largest integer key, or 0.
    pub fn next_index(&self) -> i64 {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                Key::Index(i) => Some(*i),
                Key::Name(_) => None,
            })
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Appends a value under the next integer index.
    pub fn push(&mut self, value: impl Into<Value>) {
        let index = self.next_index();
        self.entries.push((Key::Index(index), value.into()));
    }

    /// Removes a direct child.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<Value> {
        let key = key.into();
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Keeps only the entries matching the predicate.
    pub fn retain(&mut self, mut f: impl FnMut(&Key, &Value) -> bool) {
        self.entries.retain(|(k, v)| f(k, v));
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Whether the keys are exactly `0..len` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| matches!(k, Key::Index(idx) if usize::try_from(*idx) == Ok(i)))
    }

    /// Reads a value through a bracketed element name (`a[b][c]`).
    pub fn get_path(&self, name: &str) -> Option<&Value> {
        let tokens = name_tokens(name);
        let (last, parents) = tokens.split_last()?;
        let mut map = self;
        for token in parents {
            map = map.get(*token)?.as_map()?;
        }
        map.get(*last)
    }

    /// Whether a bracketed element name resolves to a value.
    pub fn has_path(&self, name: &str) -> bool {
        self.get_path(name).is_some()
    }

    /// Returns the nested map under `key`, creating it (or replacing a scalar)
    /// if necessary.
    pub fn map_entry(&mut self, key: impl Into<Key>) -> &mut ValueMap {
        let key = key.into();
        let pos = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => {
                if !matches!(self.entries[pos].1, Value::Map(_)) {
                    self.entries[pos].1 = Value::Map(ValueMap::new());
                }
                pos
            }
            None => {
                self.entries.push((key, Value::Map(ValueMap::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[pos].1 {
            Value::Map(map) => map,
            Value::Str(_) => unreachable!("entry was just converted to a map"),
        }
    }

    /// Writes a value through a bracketed element name, appending on `[]`.
    pub fn insert_path(&mut self, name: &str, value: impl Into<Value>) {
        let tokens = name_tokens(name);
        let Some((last, parents)) = tokens.split_last() else {
            return;
        };
        let mut map = self;
        for token in parents {
            map = map.map_entry(*token);
        }
        if last.is_empty() && !parents.is_empty() {
            map.push(value);
        } else {
            map.insert(*last, value);
        }
    }

    /// Recursive merge: nested maps are merged key by key, any other
    /// collision lets `other` win. Integer keys keep their original values.
    #[must_use]
    pub fn merge(mut self, other: &ValueMap) -> ValueMap {
        for (key, value) in other.iter() {
            let scalar_here = matches!(self.get(key.clone()), Some(Value::Str(_)));
            match value {
                Value::Map(nested) if !scalar_here => {
                    let base = match self.get(key.clone()) {
                        Some(Value::Map(existing)) => existing.clone(),
                        _ => ValueMap::new(),
                    };
                    self.insert(key.clone(), base.merge(nested));
                }
                _ => {
                    self.insert(key.clone(), value.clone());
                }
            }
        }
        self
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A form value: a string scalar or an ordered map.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A scalar as submitted by the browser.
    Str(String),
    /// A nested structure or a list (integer keys).
    Map(ValueMap),
}

impl Value {
    /// Builds a list value with keys `0..n`.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut map = ValueMap::new();
        for item in items {
            map.push(item);
        }
        Self::Map(map)
    }

    /// Returns the scalar content, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Map(_) => None,
        }
    }

    /// Returns the nested map, if any.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(m) => Some(m),
            Self::Str(_) => None,
        }
    }

    /// Consumes the value returning its map, if any.
    pub fn into_map(self) -> Option<ValueMap> {
        match self {
            Self::Map(m) => Some(m),
            Self::Str(_) => None,
        }
    }

    /// Whether this is an empty string or an empty map.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Map(m) => m.is_empty(),
        }
    }

    /// Flattens a scalar or the scalar members of a map into strings.
    pub fn scalars(&self) -> Vec<&str> {
        match self {
            Self::Str(s) => vec![s.as_str()],
            Self::Map(m) => m.values().filter_map(Value::as_str).collect(),
        }
    }

    /// Applies `f` to every scalar, recursing into maps.
    #[must_use]
    pub fn map_scalars(&self, f: &dyn Fn(&str) -> String) -> Value {
        match self {
            Self::Str(s) => Self::Str(f(s)),
            Self::Map(m) => Self::Map(
                m.iter()
                    .map(|(k, v)| (k.clone(), v.map_scalars(f)))
                    .collect(),
            ),
        }
    }

    /// Converts JSON into a form value. `null` has no form representation.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        use serde_json::Value as Json;
        match json {
            Json::Null => None,
            Json::Bool(true) => Some(Self::Str("1".to_string())),
            Json::Bool(false) => Some(Self::Str(String::new())),
            Json::Number(n) => Some(Self::Str(n.to_string())),
            Json::String(s) => Some(Self::Str(s.clone())),
            Json::Array(items) => {
                let mut map = ValueMap::new();
                for (i, item) in items.iter().enumerate() {
                    if let Some(v) = Self::from_json(item) {
                        map.insert(i, v);
                    }
                }
                Some(Self::Map(map))
            }
            Json::Object(obj) => Some(Self::Map(
                obj.iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (Key::parse(k), v)))
                    .collect(),
            )),
        }
    }

    /// Converts into JSON; list-shaped maps become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Self::Map(m)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Map(m) => m.serialize(serializer),
        }
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_list() && !self.is_empty() {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for v in self.values() {
                seq.serialize_element(v)?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (k, v) in self.iter() {
                map.serialize_entry(&k.to_string(), v)?;
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("0"), Key::Index(0));
        assert_eq!(Key::parse("42"), Key::Index(42));
        assert_eq!(Key::parse("-3"), Key::Index(-3));
        assert_eq!(Key::parse("03"), Key::Name("03".to_string()));
        assert_eq!(Key::parse("a1"), Key::Name("a1".to_string()));
        assert_eq!(Key::parse(""), Key::Name(String::new()));
    }

    #[test]
    fn test_name_tokens() {
        assert_eq!(name_tokens("a"), vec!["a"]);
        assert_eq!(name_tokens("a[b][c]"), vec!["a", "b", "c"]);
        assert_eq!(name_tokens("a[b][]"), vec!["a", "b", ""]);
        assert_eq!(name_tokens("[x]"), vec!["[x]"]);
        assert_eq!(join_name_tokens(&["a", "b", ""]), "a[b][]");
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut map = ValueMap::new().with("a", "1").with("b", "2");
        map.insert("a", "3");
        let keys: Vec<String> = map.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::from("3")));
    }

    #[test]
    fn test_push_uses_next_index() {
        let mut map = ValueMap::new().with(5_i64, "x").with("name", "y");
        map.push("z");
        assert_eq!(map.get(6_i64), Some(&Value::from("z")));
    }

    #[test]
    fn test_paths() {
        let mut map = ValueMap::new();
        map.insert_path("user[address][city]", "Oslo");
        map.insert_path("tags[]", "a");
        map.insert_path("tags[]", "b");
        assert_eq!(
            map.get_path("user[address][city]").and_then(Value::as_str),
            Some("Oslo")
        );
        assert_eq!(map.get_path("tags[1]").and_then(Value::as_str), Some("b"));
        assert!(map.get_path("user[missing]").is_none());
        assert!(map.get_path("tags[0][deeper]").is_none());
    }

    #[test]
    fn test_merge_preserves_integer_keys() {
        let acc = ValueMap::new().with(1_i64, "x");
        let child = ValueMap::new().with(0_i64, "a").with(2_i64, "b");
        let merged = acc.merge(&child);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(0_i64), Some(&Value::from("a")));
        assert_eq!(merged.get(1_i64), Some(&Value::from("x")));
        assert_eq!(merged.get(2_i64), Some(&Value::from("b")));
    }

    #[test]
    fn test_merge_nested_and_collisions() {
        let acc = ValueMap::new()
            .with("a", ValueMap::new().with("x", "1"))
            .with("s", "scalar");
        let other = ValueMap::new()
            .with("a", ValueMap::new().with("y", "2"))
            .with("s", ValueMap::new().with("k", "v"));
        let merged = acc.merge(&other);
        let a = merged.get("a").and_then(Value::as_map).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(
            merged.get("s"),
            Some(&Value::Map(ValueMap::new().with("k", "v")))
        );
    }

    #[test]
    fn test_json_round_shapes() {
        let value = Value::from_json(&json!({"a": [1, true, null], "b": {"3": "x"}})).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get_path("a[0]").and_then(Value::as_str), Some("1"));
        assert_eq!(map.get_path("a[1]").and_then(Value::as_str), Some("1"));
        assert!(map.get_path("a[2]").is_none());
        assert_eq!(map.get_path("b[3]").and_then(Value::as_str), Some("x"));
        assert_eq!(
            Value::list(["p", "q"]).to_json(),
            json!(["p", "q"])
        );
        assert_eq!(
            Value::Map(ValueMap::new().with(1_i64, "p")).to_json(),
            json!({"1": "p"})
        );
    }
}
