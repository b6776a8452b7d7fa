//! Ordered, case-insensitive HTML attribute storage.

/// Outcome of a write to an [`Attributes`] store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum AttrWrite {
    /// The change was applied to the store.
    Applied,
    /// The key is watched: nothing was stored and the owner must handle the
    /// change itself. `value` is `None` for removals.
    Watched { name: String, value: Option<String> },
}

/// Ordered attribute map with lowercased keys.
///
/// Keys listed as watched are never written through [`Attributes::set`] or
/// [`Attributes::remove`]; the write is handed back to the owning node which
/// redirects it into a validating setter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
    watched: Vec<&'static str>,
}

impl Attributes {
    /// Creates an empty store without watched keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that watches the given keys.
    pub fn watching(watched: &[&'static str]) -> Self {
        Self {
            entries: Vec::new(),
            watched: watched.to_vec(),
        }
    }

    /// Builder method to set an attribute, bypassing watched keys.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_raw(&key.into(), value.into());
        self
    }

    /// Adds a key to the watched set.
    pub fn watch(&mut self, key: &'static str) {
        if !self.watched.contains(&key) {
            self.watched.push(key);
        }
    }

    /// Whether writes to this key are intercepted.
    pub fn is_watched(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.watched.iter().any(|w| *w == key)
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets an attribute unless the key is watched.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> AttrWrite {
        let key = key.to_ascii_lowercase();
        let value = value.into();
        if self.watched.iter().any(|w| *w == key) {
            return AttrWrite::Watched {
                name: key,
                value: Some(value),
            };
        }
        self.insert_raw(&key, value);
        AttrWrite::Applied
    }

    /// Removes an attribute unless the key is watched.
    pub fn remove(&mut self, key: &str) -> AttrWrite {
        let key = key.to_ascii_lowercase();
        if self.watched.iter().any(|w| *w == key) {
            return AttrWrite::Watched { name: key, value: None };
        }
        self.remove_raw(&key);
        AttrWrite::Applied
    }

    /// Sets several attributes, collecting the intercepted writes.
    pub fn merge<K, V, I>(&mut self, attrs: I) -> Vec<AttrWrite>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        attrs
            .into_iter()
            .map(|(k, v)| self.set(k.as_ref(), v))
            .filter(|w| *w != AttrWrite::Applied)
            .collect()
    }

    /// Replaces every unwatched attribute; watched keys present in `attrs`
    /// are returned for the owner to apply.
    pub fn replace_all<K, V, I>(&mut self, attrs: I) -> Vec<AttrWrite>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let watched = self.watched.clone();
        self.entries.retain(|(k, _)| watched.iter().any(|w| w == k));
        self.merge(attrs)
    }

    /// Writes an attribute regardless of the watched set.
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes an attribute regardless of the watched set.
    pub fn remove_raw(&mut self, key: &str) -> Option<String> {
        let key = key.to_ascii_lowercase();
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterates over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_keys() {
        let mut attrs = Attributes::new();
        assert_eq!(attrs.set("Class", "a"), AttrWrite::Applied);
        assert_eq!(attrs.set("CLASS", "b"), AttrWrite::Applied);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("class"), Some("b"));
    }

    #[test]
    fn test_watched_keys_are_intercepted() {
        let mut attrs = Attributes::watching(&["name", "id"]);
        let write = attrs.set("NAME", "user");
        assert_eq!(
            write,
            AttrWrite::Watched {
                name: "name".to_string(),
                value: Some("user".to_string())
            }
        );
        assert_eq!(attrs.get("name"), None);

        attrs.insert_raw("id", "x");
        assert_eq!(
            attrs.remove("id"),
            AttrWrite::Watched {
                name: "id".to_string(),
                value: None
            }
        );
        assert_eq!(attrs.get("id"), Some("x"));
    }

    #[test]
    fn test_replace_all_keeps_watched() {
        let mut attrs = Attributes::watching(&["id"]);
        attrs.insert_raw("id", "keep");
        attrs.insert_raw("class", "old");
        let pending = attrs.replace_all([("size", "10"), ("id", "new")]);
        assert_eq!(attrs.get("id"), Some("keep"));
        assert_eq!(attrs.get("class"), None);
        assert_eq!(attrs.get("size"), Some("10"));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let attrs = Attributes::new().with("b", "1").with("a", "2");
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
