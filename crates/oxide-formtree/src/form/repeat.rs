//! Repeats: a prototype subtree shown once per index.
//!
//! The prototype exists once in the arena. Serving an index renames every
//! descendant (`name` becomes `name[idx]`, `id` becomes `id_idx`) and
//! re-reads the data sources; the values found are kept per index so that
//! [`Form::value`] never has to rename anything.

use tracing::debug;

use super::Form;
use crate::container::{indexed_name, is_valid_index, IndexSnapshot, RepeatState};
use crate::datasource::{resolve, DataSource, Resolution, SourceFilter};
use crate::error::{FormError, Result};
use crate::node::NodeKey;
use crate::value::{name_tokens, Value};

impl Form {
    pub(crate) fn repeat_state(&self, key: NodeKey) -> Option<&RepeatState> {
        self.nodes.get(key.0)?.container_state()?.repeat.as_ref()
    }

    fn repeat_state_mut(&mut self, key: NodeKey) -> Option<&mut RepeatState> {
        self.nodes.get_mut(key.0)?.container_state_mut()?.repeat.as_mut()
    }

    /// Current indexes of a repeat; empty for other nodes.
    pub fn indexes(&self, key: NodeKey) -> &[String] {
        self.repeat_state(key)
            .map_or(&[], |state| state.indexes.as_slice())
    }

    /// Sets the indexes of a repeat explicitly. Indexes are made of ASCII
    /// letters, digits and underscores.
    pub fn set_indexes<S: Into<String>>(
        &mut self,
        key: NodeKey,
        indexes: impl IntoIterator<Item = S>,
    ) -> Result<()> {
        let indexes: Vec<String> = indexes.into_iter().map(Into::into).collect();
        if let Some(bad) = indexes.iter().find(|i| !is_valid_index(i)) {
            return Err(FormError::InvalidArgument(format!(
                "invalid repeat index {bad:?}"
            )));
        }
        let description = self.describe(key);
        let state = self
            .repeat_state_mut(key)
            .ok_or_else(|| FormError::InvalidArgument(format!("{description} is not a repeat")))?;
        state.indexes = indexes;
        self.take_snapshots(key);
        Ok(())
    }

    /// Errors found for one index by the last validation.
    pub fn repeat_errors(&self, key: NodeKey, index: &str) -> &[(NodeKey, String)] {
        self.repeat_state(key)
            .and_then(|state| state.errors.get(index))
            .map_or(&[], Vec::as_slice)
    }

    /// Name whose submitted keys give the indexes: the configured index
    /// field, or the first name token of the prototype's first named element.
    pub fn index_field(&self, key: NodeKey) -> Option<String> {
        let state = self.repeat_state(key)?;
        if let Some(field) = &state.index_field {
            return Some(field.clone());
        }
        self.leaves(key).into_iter().find_map(|leaf| {
            let name = match state.applied.get(&leaf) {
                Some((name, _)) => name.as_deref(),
                None => self.nodes[leaf.0].name(),
            }?;
            name_tokens(name).first().map(|t| (*t).to_string())
        })
    }

    /// Re-reads the indexes from the data sources and the values of every
    /// index.
    pub(crate) fn refresh_repeat(&mut self, key: NodeKey) {
        self.load_indexes(key);
        self.take_snapshots(key);
    }

    /// Refreshes the repeats whose values depend on `key`'s filters.
    pub(crate) fn refresh_repeats_touching(&mut self, key: NodeKey) {
        let mut repeats: Vec<NodeKey> = self.repeat_at_or_above(key).into_iter().collect();
        repeats.extend(
            self.descendants(key)
                .into_iter()
                .filter(|k| self.repeat_state(*k).is_some()),
        );
        repeats.dedup();
        for repeat in repeats {
            self.take_snapshots(repeat);
        }
    }

    fn load_indexes(&mut self, key: NodeKey) {
        if !self.is_attached(key) {
            return;
        }
        let Some(field) = self.index_field(key) else {
            return;
        };
        let sources: Vec<&dyn DataSource> = self.datasources.iter().map(|ds| &**ds).collect();
        let indexes = match resolve(&sources, &field, SourceFilter::Any) {
            Resolution::Found(Some(Value::Map(map))) => map
                .keys()
                .map(ToString::to_string)
                .filter(|k| is_valid_index(k))
                .collect(),
            Resolution::Found(_) => Vec::new(),
            Resolution::Unresolved => return,
        };
        debug!(repeat = %key, field = %field, ?indexes, "repeat indexes loaded");
        if let Some(state) = self.repeat_state_mut(key) {
            state.indexes = indexes;
        }
    }

    fn take_snapshots(&mut self, key: NodeKey) {
        let indexes = self.indexes(key).to_vec();
        let mut snapshots = Vec::with_capacity(indexes.len());
        for index in indexes {
            self.serve_index(key, &index);
            snapshots.push(IndexSnapshot {
                raw: self.child_values(key, false),
                filtered: self.child_values(key, true),
            });
        }
        self.apply_index(key, None);
        if let Some(state) = self.repeat_state_mut(key) {
            state.snapshots = snapshots;
        }
    }

    /// Applies an index and loads the prototype's values for it.
    pub(crate) fn serve_index(&mut self, key: NodeKey, index: &str) {
        self.apply_index(key, Some(index));
        for child in self.children(key).to_vec() {
            self.update_subtree(child);
        }
    }

    /// Renames the prototype for an index, or restores the base names and
    /// ids with `None`.
    pub(crate) fn apply_index(&mut self, key: NodeKey, index: Option<&str>) {
        match index {
            Some(index) => {
                for node_key in self.descendants(key) {
                    let base = match self.repeat_state(key).and_then(|s| s.applied.get(&node_key)) {
                        Some(base) => base.clone(),
                        None => {
                            let node = &self.nodes[node_key.0];
                            (node.name().map(str::to_string), node.id().to_string())
                        }
                    };
                    let node = &mut self.nodes[node_key.0];
                    if let Some(name) = &base.0 {
                        node.attributes.insert_raw("name", indexed_name(name, index));
                    }
                    node.attributes.insert_raw("id", format!("{}_{index}", base.1));
                    if let Some(state) = self.repeat_state_mut(key) {
                        state.applied.entry(node_key).or_insert(base);
                    }
                }
            }
            None => {
                let applied = self
                    .repeat_state_mut(key)
                    .map(|state| std::mem::take(&mut state.applied))
                    .unwrap_or_default();
                for (node_key, (name, id)) in applied {
                    let node = &mut self.nodes[node_key.0];
                    if let Some(name) = name {
                        node.attributes.insert_raw("name", name);
                    }
                    node.attributes.insert_raw("id", id);
                }
            }
        }
        self.invalidate_lookup(key);
    }
}
