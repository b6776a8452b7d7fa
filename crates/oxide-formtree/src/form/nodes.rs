//! Per-node accessors and mutators.

use tracing::debug;

use super::Form;
use crate::attributes::{AttrWrite, Attributes};
use crate::datasource::Resolution;
use crate::elements::{self, ElementState, SelectOption};
use crate::error::{FormError, Result};
use crate::node::{AttachedRule, Filter, NodeKey, NodeKind, ScalarFilter};
use crate::rules::{Rule, RuleId, RunMode};
use crate::value::{Value, ValueMap};
use crate::view::NodeView;

impl Form {
    /// Kind of a node.
    pub fn kind(&self, key: NodeKey) -> Option<NodeKind> {
        self.nodes.get(key.0).map(|n| n.kind)
    }

    /// A node's id.
    pub fn id(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key.0).map(|n| n.id())
    }

    /// A node's name.
    pub fn name(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key.0)?.name()
    }

    /// A node's label.
    pub fn label(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key.0)?.label.as_deref()
    }

    /// A single attribute.
    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.nodes.get(key.0)?.attributes.get(name)
    }

    /// All attributes of a node.
    pub fn attributes(&self, key: NodeKey) -> Option<&Attributes> {
        self.nodes.get(key.0).map(|n| &n.attributes)
    }

    /// The validation error recorded on a node.
    pub fn error(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key.0)?.error.as_deref()
    }

    /// Whether the node is frozen.
    pub fn is_frozen(&self, key: NodeKey) -> bool {
        self.nodes.get(key.0).is_some_and(|n| n.frozen)
    }

    /// Whether a frozen node keeps submitting its value.
    pub fn is_persistent_freeze(&self, key: NodeKey) -> bool {
        self.nodes.get(key.0).is_some_and(|n| n.persistent_freeze)
    }

    /// Whether any attached rule is a "required" rule.
    pub fn is_required(&self, key: NodeKey) -> bool {
        self.nodes
            .get(key.0)
            .is_some_and(|n| n.rules.iter().any(|r| r.rule.is_required()))
    }

    /// Read handle used by renderers.
    pub fn view(&self, key: NodeKey) -> Option<NodeView<'_>> {
        self.nodes.get(key.0)?;
        Some(NodeView::new(self, key))
    }

    /// Short human-readable description for error messages.
    pub fn describe(&self, key: NodeKey) -> String {
        self.nodes
            .get(key.0)
            .map_or_else(|| format!("unknown node {key}"), |n| n.describe())
    }

    /// Changes a node's name. Children of a group follow its new name.
    pub fn set_name(&mut self, key: NodeKey, name: impl Into<String>) -> Result<()> {
        self.node(key)?;
        self.rename(key, name.into());
        self.update_value(key);
        Ok(())
    }

    /// Changes a node's id. A rejected id leaves the previous one in place.
    pub fn set_id(&mut self, key: NodeKey, id: &str) -> Result<()> {
        if key == self.root {
            return Err(FormError::ReadOnlyAttribute("id".to_string()));
        }
        self.node(key)?;
        self.ids.reserve(id)?;
        self.nodes[key.0].attributes.insert_raw("id", id);
        self.invalidate_lookup(key);
        Ok(())
    }

    /// Sets the label.
    pub fn set_label(&mut self, key: NodeKey, label: impl Into<String>) -> Result<()> {
        self.node_mut(key)?.label = Some(label.into());
        Ok(())
    }

    /// Sets an attribute. `id`, `name` and kind-specific keys go through
    /// their validating setters.
    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: impl Into<String>) -> Result<()> {
        let write = self.node_mut(key)?.attributes.set(name, value);
        self.apply_write(key, write)
    }

    /// Removes an attribute. `id` and `name` can never be removed.
    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<()> {
        let write = self.node_mut(key)?.attributes.remove(name);
        self.apply_write(key, write)
    }

    /// Sets several attributes.
    pub fn merge_attributes<K, V, I>(&mut self, key: NodeKey, attrs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let writes = self.node_mut(key)?.attributes.merge(attrs);
        writes
            .into_iter()
            .try_for_each(|write| self.apply_write(key, write))
    }

    /// Replaces every attribute except the watched ones, which are only
    /// changed if `attrs` mentions them.
    pub fn replace_attributes<K, V, I>(&mut self, key: NodeKey, attrs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let writes = self.node_mut(key)?.attributes.replace_all(attrs);
        writes
            .into_iter()
            .try_for_each(|write| self.apply_write(key, write))
    }

    fn apply_write(&mut self, key: NodeKey, write: AttrWrite) -> Result<()> {
        let AttrWrite::Watched { name, value } = write else {
            return Ok(());
        };
        match (name.as_str(), value) {
            ("id" | "name", None) => Err(FormError::RequiredAttribute(name)),
            ("id", Some(id)) => self.set_id(key, &id),
            ("name", Some(new_name)) => self.set_name(key, new_name),
            (_, value) => {
                let node = self.node_mut(key)?;
                if !elements::on_watched_attribute(node, &name, value.clone())? {
                    match value {
                        Some(v) => node.attributes.insert_raw(&name, v),
                        None => {
                            node.attributes.remove_raw(&name);
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Sets a value programmatically.
    ///
    /// A container distributes a map value to its elements by name; elements
    /// whose name is missing from the map keep their value. A named group
    /// takes its value without its own name level, as [`Form::value`]
    /// returns it.
    pub fn set_value(&mut self, key: NodeKey, value: Option<Value>) -> Result<()> {
        let kind = self.node(key)?.kind;
        if !kind.is_container() {
            elements::set_value(self.node_mut(key)?, value);
            return Ok(());
        }
        let mut map = match value {
            Some(Value::Map(map)) => map,
            _ => ValueMap::new(),
        };
        if kind == NodeKind::Group {
            if let Some(name) = self.name(key) {
                let mut wrapped = ValueMap::new();
                wrapped.insert_path(name, map);
                map = wrapped;
            }
        }
        for leaf in self.leaves(key) {
            let node = &mut self.nodes[leaf.0];
            let found = elements::lookup_name(node).and_then(|name| map.get_path(name).cloned());
            if let Some(found) = found {
                elements::apply_resolution(node, Resolution::Found(Some(found)));
            }
        }
        Ok(())
    }

    /// Records an error; an empty message clears it.
    pub fn set_error(&mut self, key: NodeKey, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.node_mut(key)?.error = (!message.is_empty()).then_some(message);
        Ok(())
    }

    /// Whether the node can be frozen at all.
    pub fn is_freezable(&self, key: NodeKey) -> bool {
        self.nodes.get(key.0).is_some_and(|n| {
            n.kind.is_freezable()
                && !matches!(n.element(), Some(ElementState::Custom(c)) if !c.is_freezable())
        })
    }

    /// Freezes or unfreezes a node (and a container's descendants) and
    /// returns the previous state. `None` only queries.
    ///
    /// Non-freezable nodes are left alone.
    pub fn toggle_frozen(&mut self, key: NodeKey, target: Option<bool>) -> Result<bool> {
        let previous = self.node(key)?.frozen;
        if let Some(target) = target {
            let mut keys = vec![key];
            keys.extend(self.descendants(key));
            for k in keys {
                if self.is_freezable(k) {
                    self.nodes[k.0].frozen = target;
                }
            }
        }
        Ok(previous)
    }

    /// Sets whether frozen values are still submitted through a hidden
    /// field, returning the previous setting. `None` only queries.
    pub fn persistent_freeze(&mut self, key: NodeKey, target: Option<bool>) -> Result<bool> {
        let previous = self.node(key)?.persistent_freeze;
        if let Some(target) = target {
            let mut keys = vec![key];
            keys.extend(self.descendants(key));
            for k in keys {
                self.nodes[k.0].persistent_freeze = target;
            }
        }
        Ok(previous)
    }

    /// Adds a filter applied to the node's value.
    pub fn add_filter(&mut self, key: NodeKey, filter: Filter) -> Result<()> {
        self.node_mut(key)?.filters.push(filter);
        self.refresh_repeats_touching(key);
        Ok(())
    }

    /// Adds a filter applied to every scalar of the value; on a container it
    /// applies to each descendant element instead.
    pub fn add_recursive_filter(&mut self, key: NodeKey, filter: ScalarFilter) -> Result<()> {
        self.node_mut(key)?.recursive_filters.push(filter);
        self.refresh_repeats_touching(key);
        Ok(())
    }

    /// Attaches a server-side rule.
    pub fn add_rule(&mut self, key: NodeKey, rule: Rule) -> Result<RuleId> {
        self.add_rule_with(key, rule, RunMode::Server)
    }

    /// Attaches a rule with an explicit run mode.
    pub fn add_rule_with(&mut self, key: NodeKey, mut rule: Rule, mode: RunMode) -> Result<RuleId> {
        self.node(key)?;
        rule.bind(key);
        rule.check_owners(self, key)?;
        let id = RuleId(self.next_rule);
        self.next_rule += 1;
        debug!(node = %key, rule = rule.name(), ?mode, "rule attached");
        self.nodes[key.0].rules.push(AttachedRule { id, rule, mode });
        Ok(id)
    }

    /// Detaches a rule, returning it.
    pub fn remove_rule(&mut self, key: NodeKey, id: RuleId) -> Result<Rule> {
        let description = self.describe(key);
        let rules = &mut self.node_mut(key)?.rules;
        let pos = rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| FormError::NotFound(format!("rule {} on {description}", id.0)))?;
        Ok(rules.remove(pos).rule)
    }

    /// Rules attached to a node, in evaluation order.
    pub fn rules(&self, key: NodeKey) -> Vec<(RuleId, &Rule, RunMode)> {
        self.nodes.get(key.0).map_or_else(Vec::new, |n| {
            n.rules.iter().map(|r| (r.id, &r.rule, r.mode)).collect()
        })
    }

    /// Adds an option (or option group) to a select.
    pub fn add_option(&mut self, key: NodeKey, option: SelectOption) -> Result<()> {
        let description = self.describe(key);
        match self.node_mut(key)?.element_mut() {
            Some(ElementState::Select(state)) => {
                state.add_option(option);
                Ok(())
            }
            _ => Err(FormError::InvalidArgument(format!(
                "{description} does not take options"
            ))),
        }
    }
}
