//! Value resolution from data sources and value aggregation.

use std::collections::HashMap;

use super::Form;
use crate::datasource::{resolve, DataSource};
use crate::elements::{self, ElementState};
use crate::node::{NodeKey, NodeKind};
use crate::value::{name_tokens, Value, ValueMap};

impl Form {
    /// The node's unfiltered value.
    pub fn raw_value(&self, key: NodeKey) -> Option<Value> {
        let node = self.nodes.get(key.0)?;
        match node.kind {
            NodeKind::Repeat => self.repeat_value(key, false),
            kind if kind.is_container() => self.container_value(key, false),
            _ => elements::raw_value(node),
        }
    }

    /// The node's value after filters.
    ///
    /// Element values pass through the recursive filters of every enclosing
    /// container (outermost first), then their own recursive filters, then
    /// their plain filters. Containers aggregate the filtered values of their
    /// children and apply their plain filters only.
    pub fn value(&self, key: NodeKey) -> Option<Value> {
        let node = self.nodes.get(key.0)?;
        let mut value = match node.kind {
            NodeKind::Repeat => self.repeat_value(key, true)?,
            kind if kind.is_container() => self.container_value(key, true)?,
            _ => self.filter_recursive(key, elements::raw_value(node)?),
        };
        for filter in &node.filters {
            value = filter.apply(value);
        }
        Some(value)
    }

    fn filter_recursive(&self, key: NodeKey, mut value: Value) -> Value {
        let mut chain = vec![key];
        let mut current = self.nodes[key.0].container;
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.nodes[ancestor.0].container;
        }
        for k in chain.into_iter().rev() {
            for filter in &self.nodes[k.0].recursive_filters {
                value = filter.apply(&value);
            }
        }
        value
    }

    fn container_value(&self, key: NodeKey, filtered: bool) -> Option<Value> {
        let map = self.child_values(key, filtered);
        let node = &self.nodes[key.0];
        let value = match (node.kind, node.name()) {
            (NodeKind::Group, Some(name)) => {
                let mut value = Value::Map(map);
                for token in name_tokens(name) {
                    value = value.into_map()?.remove(token)?;
                }
                value
            }
            _ => Value::Map(map),
        };
        (!value.is_empty()).then_some(value)
    }

    fn repeat_value(&self, key: NodeKey, filtered: bool) -> Option<Value> {
        let state = self.nodes[key.0].container_state()?.repeat.as_ref()?;
        let merged = state.snapshots.iter().fold(ValueMap::new(), |acc, snapshot| {
            acc.merge(if filtered {
                &snapshot.filtered
            } else {
                &snapshot.raw
            })
        });
        (!merged.is_empty()).then_some(Value::Map(merged))
    }

    /// Aggregates the values of a container's children.
    ///
    /// Unnamed containers and fieldsets merge their map into the result;
    /// everything else is stored under its name, where `a[b]` nests and a
    /// trailing `[]` counts up from 0 per name.
    pub(crate) fn child_values(&self, key: NodeKey, filtered: bool) -> ValueMap {
        let mut values = ValueMap::new();
        let mut force_keys: HashMap<String, i64> = HashMap::new();
        for &child in self.children(key) {
            let value = if filtered {
                self.value(child)
            } else {
                self.raw_value(child)
            };
            let Some(value) = value else {
                continue;
            };
            let node = &self.nodes[child.0];
            let prepends_name = !node.kind.is_container()
                || (node.kind == NodeKind::Group && node.name().is_some());
            if !prepends_name {
                if let Value::Map(map) = value {
                    values = values.merge(&map);
                }
                continue;
            }
            if let Some(name) = elements::value_name(node) {
                insert_named(&mut values, &mut force_keys, name, value);
            }
        }
        values
    }

    /// Refreshes a node's value from the data sources.
    ///
    /// Containers refresh their whole subtree. Nodes inside a repeat refresh
    /// the repeat instead, since their values are held per index.
    pub fn update_value(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key.0) else {
            return;
        };
        if let Some(repeat) = node.container.and_then(|c| self.repeat_at_or_above(c)) {
            self.refresh_repeat(repeat);
            return;
        }
        self.update_subtree(key);
    }

    pub(crate) fn update_subtree(&mut self, key: NodeKey) {
        let kind = self.nodes[key.0].kind;
        if kind == NodeKind::Repeat {
            self.refresh_repeat(key);
        } else if kind.is_container() {
            for child in self.children(key).to_vec() {
                self.update_subtree(child);
            }
        } else {
            self.update_element(key);
        }
    }

    fn update_element(&mut self, key: NodeKey) {
        if !self.is_attached(key) {
            return;
        }
        let node = &self.nodes[key.0];
        let Some(name) = elements::lookup_name(node).map(str::to_string) else {
            return;
        };
        let kind = node.kind;

        if kind == NodeKind::File {
            let mut answered = false;
            let mut upload = None;
            for ds in self.datasources.iter().filter(|ds| ds.is_submit()) {
                answered = true;
                if let Some(found) = ds.upload(&name) {
                    upload = Some(found);
                    break;
                }
            }
            if answered {
                if let Some(ElementState::File(state)) = self.nodes[key.0].element_mut() {
                    state.upload = upload;
                }
            }
            return;
        }

        let sources: Vec<&dyn DataSource> = self.datasources.iter().map(|ds| &**ds).collect();
        let resolution = resolve(&sources, &name, elements::source_filter(kind));
        elements::apply_resolution(&mut self.nodes[key.0], resolution);
    }
}

fn insert_named(
    values: &mut ValueMap,
    force_keys: &mut HashMap<String, i64>,
    name: &str,
    value: Value,
) {
    let tokens = name_tokens(name);
    let Some((last, parents)) = tokens.split_last() else {
        return;
    };
    let mut map = values;
    for token in parents {
        map = map.map_entry(*token);
    }
    if last.is_empty() && !parents.is_empty() {
        let counter = force_keys.entry(name.to_string()).or_insert(0);
        map.insert(*counter, value);
        *counter += 1;
    } else {
        map.insert(*last, value);
    }
}
