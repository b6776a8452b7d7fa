//! Tree structure: creating nodes, moving them between containers and
//! looking them up.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::Form;
use crate::attributes::Attributes;
use crate::container::{prefix_name, strip_prefix, ContainerState, RepeatState};
use crate::definition::{DefKind, NodeDef};
use crate::elements::{self, ButtonState, ElementState, FileState, SelectState, StaticState, TextareaState};
use crate::error::{FormError, Result};
use crate::node::{NodeData, NodeKey, NodeKind, Payload};

/// Where [`Form::attach`] inserts a child.
#[derive(Debug, Clone, Copy)]
enum Position {
    Start,
    End,
    Before(NodeKey),
}

impl Form {
    pub(crate) fn node(&self, key: NodeKey) -> Result<&NodeData> {
        self.nodes.get(key.0).ok_or(FormError::UnknownNode(key.0))
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Result<&mut NodeData> {
        self.nodes.get_mut(key.0).ok_or(FormError::UnknownNode(key.0))
    }

    /// Creates a detached node (and its children) from a definition.
    ///
    /// The node lives in this form's arena but takes no value from the data
    /// sources until it is attached to a container rooted in the form.
    pub fn create(&mut self, def: NodeDef) -> Result<NodeKey> {
        let kind = def.kind();
        let NodeDef {
            shape,
            name,
            id,
            label,
            attributes,
            value,
            children,
        } = def;

        let mut attrs = Attributes::watching(elements::watched_attributes(kind));
        let mut id = id;
        let mut name = name;
        for (key, val) in attributes {
            match key.to_ascii_lowercase().as_str() {
                "id" => {
                    id.get_or_insert(val);
                }
                "name" => {
                    name.get_or_insert(val);
                }
                "type" => {}
                other => attrs.insert_raw(other, val),
            }
        }
        let id = match id {
            Some(id) => {
                self.ids.reserve(&id)?;
                id
            }
            None => self.ids.generate(name.as_deref().unwrap_or_default()),
        };
        attrs.insert_raw("id", id);
        if let Some(name) = name {
            attrs.insert_raw("name", name);
        }

        let payload = match shape {
            DefKind::Input(_) => Payload::Element(ElementState::Input),
            DefKind::Textarea => Payload::Element(ElementState::Textarea(TextareaState::default())),
            DefKind::Checkbox | DefKind::Radio => Payload::Element(ElementState::Checkable),
            DefKind::Select {
                options,
                intrinsic_validation,
            } => {
                let mut state = SelectState {
                    intrinsic_validation,
                    ..SelectState::default()
                };
                for option in options {
                    state.add_option(option);
                }
                Payload::Element(ElementState::Select(state))
            }
            DefKind::Button { content, .. } => Payload::Element(ElementState::Button(ButtonState {
                submitted: None,
                content,
            })),
            DefKind::Static { content, tag } => {
                Payload::Element(ElementState::Static(StaticState { content, tag }))
            }
            DefKind::File { messages } => Payload::Element(ElementState::File(FileState {
                upload: None,
                messages,
            })),
            DefKind::Custom(element) => Payload::Element(ElementState::Custom(element)),
            DefKind::Fieldset | DefKind::Group => Payload::Container(ContainerState::new()),
            DefKind::Repeat {
                index_field,
                indexes,
            } => Payload::Container(ContainerState {
                repeat: Some(RepeatState {
                    index_field,
                    indexes,
                    ..RepeatState::default()
                }),
                ..ContainerState::new()
            }),
        };

        let mut node = NodeData::new(kind, attrs, payload);
        node.label = label;
        elements::init_attributes(&mut node);
        let container_value = match value {
            Some(v) if kind.is_container() => Some(v),
            Some(v) => {
                elements::set_value(&mut node, Some(v));
                None
            }
            None => None,
        };
        self.nodes.push(node);
        let key = NodeKey(self.nodes.len() - 1);
        debug!(node = %key, kind = %kind, id = %self.nodes[key.0].id(), "node created");

        for child in children {
            let child = self.create(child)?;
            self.append_child(key, child)?;
        }
        if let Some(value) = container_value {
            self.set_value(key, Some(value))?;
        }
        Ok(key)
    }

    /// Creates a node and appends it to `parent`.
    pub fn add(&mut self, parent: NodeKey, def: NodeDef) -> Result<NodeKey> {
        self.node(parent)?;
        let key = self.create(def)?;
        self.append_child(parent, key)?;
        Ok(key)
    }

    /// Appends `child` to `parent`, detaching it from its current container.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.attach(parent, child, Position::End)
    }

    /// Inserts `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.attach(parent, child, Position::Start)
    }

    /// Inserts `child` before `reference`, or appends it when `reference` is
    /// `None`. The reference must be a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        reference: Option<NodeKey>,
    ) -> Result<()> {
        match reference {
            Some(reference) => self.attach(parent, child, Position::Before(reference)),
            None => self.attach(parent, child, Position::End),
        }
    }

    fn attach(&mut self, parent: NodeKey, child: NodeKey, at: Position) -> Result<()> {
        self.node(child)?;
        let parent_node = self.node(parent)?;
        if !parent_node.kind.is_container() {
            return Err(FormError::NotAContainer(parent_node.describe()));
        }
        if child == self.root {
            return Err(FormError::RootNotAttachable);
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                let err = FormError::Cycle {
                    parent: self.describe(parent),
                    child: self.describe(child),
                };
                warn!(error = %err, "rejected attach");
                return Err(err);
            }
            ancestor = self.nodes[current.0].container;
        }
        if let Position::Before(reference) = at {
            if reference == child && self.nodes[child.0].container == Some(parent) {
                return Ok(());
            }
            if self.node(reference)?.container != Some(parent) {
                return Err(FormError::NotFound(format!(
                    "{} is not a child of {}",
                    self.describe(reference),
                    self.describe(parent)
                )));
            }
        }

        self.detach(child);
        let elements = self.children(parent);
        let index = match at {
            Position::Start => 0,
            Position::End => elements.len(),
            Position::Before(reference) => elements
                .iter()
                .position(|k| *k == reference)
                .unwrap_or(elements.len()),
        };
        if let Some(state) = self.nodes[parent.0].container_state_mut() {
            state.elements.insert(index, child);
        }
        self.nodes[child.0].container = Some(parent);

        if self.nodes[parent.0].kind == NodeKind::Group {
            if let Some(prefix) = self.nodes[parent.0].name().map(str::to_string) {
                self.retarget_names(child, None, Some(&prefix));
            }
        }
        self.invalidate_lookup(parent);
        self.update_value(child);
        if self.root_of(child) == self.root {
            self.notify_added(child);
        }
        Ok(())
    }

    /// Detaches `child` from `parent`. The node stays in the arena and can be
    /// attached again.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        if self.node(child)?.container != Some(parent) {
            return Err(FormError::NotFound(format!(
                "{} is not a child of {}",
                self.describe(child),
                self.describe(parent)
            )));
        }
        self.detach(child);
        Ok(())
    }

    /// Removes a node from its container, if any.
    pub(crate) fn detach(&mut self, child: NodeKey) {
        let Some(parent) = self.nodes[child.0].container else {
            return;
        };
        if let Some(state) = self.nodes[parent.0].container_state_mut() {
            state.elements.retain(|k| *k != child);
        }
        self.nodes[child.0].container = None;
        if self.nodes[parent.0].kind == NodeKind::Group {
            if let Some(prefix) = self.nodes[parent.0].name().map(str::to_string) {
                self.retarget_names(child, Some(&prefix), None);
            }
        }
        self.invalidate_lookup(parent);
        if let Some(repeat) = self.repeat_at_or_above(parent) {
            self.refresh_repeat(repeat);
        }
    }

    /// Moves a subtree's names from one group prefix to another. Unnamed
    /// containers pass the change on to their children.
    pub(crate) fn retarget_names(&mut self, key: NodeKey, old: Option<&str>, new: Option<&str>) {
        match self.nodes[key.0].name().map(str::to_string) {
            Some(name) => {
                let base = old.map_or_else(|| name.clone(), |old| strip_prefix(old, &name));
                let renamed = new.map_or_else(|| base.clone(), |new| prefix_name(new, &base));
                self.rename(key, renamed);
            }
            None => {
                for child in self.children(key).to_vec() {
                    self.retarget_names(child, old, new);
                }
            }
        }
    }

    /// Writes a name, carrying a group's children along.
    pub(crate) fn rename(&mut self, key: NodeKey, name: String) {
        let node = &mut self.nodes[key.0];
        let old = node.name().map(str::to_string);
        let name = if node.kind == NodeKind::Select
            && node.attributes.contains("multiple")
            && !name.ends_with("[]")
        {
            format!("{name}[]")
        } else {
            name
        };
        node.attributes.insert_raw("name", name.as_str());
        if node.kind == NodeKind::Group {
            for child in self.children(key).to_vec() {
                self.retarget_names(child, old.as_deref(), Some(&name));
            }
        }
    }

    /// Drops the id lookup of `from` and every container above it.
    pub(crate) fn invalidate_lookup(&mut self, from: NodeKey) {
        let mut current = Some(from);
        while let Some(key) = current {
            let node = &mut self.nodes[key.0];
            if let Some(state) = node.container_state_mut() {
                state.lookup.take();
            }
            current = node.container;
        }
    }

    /// The topmost ancestor of a node (the node itself if detached).
    pub fn root_of(&self, key: NodeKey) -> NodeKey {
        let mut current = key;
        while let Some(parent) = self.nodes.get(current.0).and_then(|n| n.container) {
            current = parent;
        }
        current
    }

    /// Whether the node is part of the tree rooted in this form.
    pub fn is_attached(&self, key: NodeKey) -> bool {
        self.root_of(key) == self.root
    }

    /// The enclosing container.
    pub fn container_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key.0)?.container
    }

    /// Direct children of a container; empty for elements.
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(key.0)
            .and_then(NodeData::container_state)
            .map_or(&[], |state| state.elements.as_slice())
    }

    /// Position of `child` among `parent`'s children.
    pub fn child_index(&self, parent: NodeKey, child: NodeKey) -> Result<usize> {
        self.children(parent)
            .iter()
            .position(|k| *k == child)
            .ok_or_else(|| {
                FormError::NotFound(format!(
                    "{} is not a child of {}",
                    self.describe(child),
                    self.describe(parent)
                ))
            })
    }

    /// All descendants, depth-first in document order.
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.collect_descendants(key, &mut out);
        out
    }

    fn collect_descendants(&self, key: NodeKey, out: &mut Vec<NodeKey>) {
        for &child in self.children(key) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Element (non-container) descendants, depth-first.
    pub fn leaves(&self, key: NodeKey) -> Vec<NodeKey> {
        self.descendants(key)
            .into_iter()
            .filter(|k| !self.nodes[k.0].kind.is_container())
            .collect()
    }

    /// Finds a descendant of `container` by id.
    ///
    /// The id map is built on first use and dropped by any change below the
    /// container.
    pub fn element_by_id(&self, container: NodeKey, id: &str) -> Option<NodeKey> {
        let state = self.nodes.get(container.0)?.container_state()?;
        state
            .lookup
            .get_or_init(|| self.build_lookup(container))
            .get(id)
            .copied()
    }

    fn build_lookup(&self, container: NodeKey) -> HashMap<String, NodeKey> {
        let mut lookup = HashMap::new();
        for key in self.descendants(container) {
            lookup
                .entry(self.nodes[key.0].id().to_string())
                .or_insert(key);
        }
        lookup
    }

    /// Finds an element anywhere in the form by id.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.element_by_id(self.root, id)
    }

    /// Like [`Form::get_element_by_id`], failing when there is no such element.
    pub fn require_element_by_id(&self, id: &str) -> Result<NodeKey> {
        self.get_element_by_id(id)
            .ok_or_else(|| FormError::NotFound(format!("element with id {id:?}")))
    }

    /// Descendants of `container` with exactly this name.
    pub fn elements_by_name(&self, container: NodeKey, name: &str) -> Vec<NodeKey> {
        self.descendants(container)
            .into_iter()
            .filter(|k| self.nodes[k.0].name() == Some(name))
            .collect()
    }

    /// The nearest repeat that is `key` or one of its ancestors.
    pub(crate) fn repeat_at_or_above(&self, key: NodeKey) -> Option<NodeKey> {
        let mut current = Some(key);
        while let Some(k) = current {
            let node = &self.nodes[k.0];
            if node.kind == NodeKind::Repeat {
                return Some(k);
            }
            current = node.container;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Form {
        Form::builder().id("t").track_submit(false).build().unwrap()
    }

    #[test]
    fn test_reparenting_detaches_first() {
        let mut form = form();
        let a = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let b = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let text = form.add(a, NodeDef::text("x")).unwrap();

        form.append_child(b, text).unwrap();
        assert!(form.children(a).is_empty());
        assert_eq!(form.children(b), &[text]);
        assert_eq!(form.container_of(text), Some(b));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut form = form();
        let outer = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let inner = form.add(outer, NodeDef::fieldset()).unwrap();
        let err = form.append_child(inner, outer).unwrap_err();
        assert!(matches!(err, FormError::Cycle { .. }));
        assert_eq!(form.container_of(outer), Some(form.root()));
        assert!(matches!(
            form.append_child(inner, form.root()),
            Err(FormError::RootNotAttachable)
        ));
    }

    #[test]
    fn test_leaf_is_not_a_container() {
        let mut form = form();
        let text = form.add(form.root(), NodeDef::text("x")).unwrap();
        let other = form.create(NodeDef::text("y")).unwrap();
        assert!(matches!(
            form.append_child(text, other),
            Err(FormError::NotAContainer(_))
        ));
    }

    #[test]
    fn test_insert_positions() {
        let mut form = form();
        let fs = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let a = form.add(fs, NodeDef::text("a")).unwrap();
        let b = form.create(NodeDef::text("b")).unwrap();
        let c = form.create(NodeDef::text("c")).unwrap();
        form.insert_before(fs, b, Some(a)).unwrap();
        form.prepend_child(fs, c).unwrap();
        assert_eq!(form.children(fs), &[c, b, a]);
        assert_eq!(form.child_index(fs, a).unwrap(), 2);

        let stray = form.create(NodeDef::text("s")).unwrap();
        let outsider = form.add(form.root(), NodeDef::text("o")).unwrap();
        assert!(matches!(
            form.insert_before(fs, stray, Some(outsider)),
            Err(FormError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_requires_ownership() {
        let mut form = form();
        let fs = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let a = form.add(form.root(), NodeDef::text("a")).unwrap();
        assert!(matches!(
            form.remove_child(fs, a),
            Err(FormError::NotFound(_))
        ));
        form.remove_child(form.root(), a).unwrap();
        assert_eq!(form.container_of(a), None);
        assert!(!form.is_attached(a));
    }

    #[test]
    fn test_group_prefixes_names() {
        let mut form = form();
        let group = form.add(form.root(), NodeDef::group("address")).unwrap();
        let city = form.add(group, NodeDef::text("city")).unwrap();
        let tags = form.add(group, NodeDef::select("tags").multiple()).unwrap();
        assert_eq!(form.name(city), Some("address[city]"));
        assert_eq!(form.name(tags), Some("address[tags][]"));

        form.set_name(group, "home").unwrap();
        assert_eq!(form.name(city), Some("home[city]"));

        form.remove_child(group, city).unwrap();
        assert_eq!(form.name(city), Some("city"));
    }

    #[test]
    fn test_nested_groups() {
        let mut form = form();
        let outer = form.create(NodeDef::group("a")).unwrap();
        let inner = form.create(NodeDef::group("b")).unwrap();
        let leaf = form.add(inner, NodeDef::text("c")).unwrap();
        assert_eq!(form.name(leaf), Some("b[c]"));
        form.append_child(outer, inner).unwrap();
        assert_eq!(form.name(inner), Some("a[b]"));
        assert_eq!(form.name(leaf), Some("a[b][c]"));
    }

    #[test]
    fn test_lookup_follows_mutations() {
        let mut form = form();
        let fs = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let a = form.add(fs, NodeDef::text("a").id("field-a")).unwrap();
        assert_eq!(form.get_element_by_id("field-a"), Some(a));

        form.remove_child(fs, a).unwrap();
        assert_eq!(form.get_element_by_id("field-a"), None);

        form.append_child(fs, a).unwrap();
        form.set_id(a, "renamed").unwrap();
        assert_eq!(form.get_element_by_id("field-a"), None);
        assert_eq!(form.element_by_id(fs, "renamed"), Some(a));
        assert!(form.require_element_by_id("nope").is_err());
    }

    #[test]
    fn test_elements_by_name_and_leaves() {
        let mut form = form();
        let fs = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let r1 = form.add(fs, NodeDef::radio("pick", "1")).unwrap();
        let r2 = form.add(fs, NodeDef::radio("pick", "2")).unwrap();
        assert_eq!(form.elements_by_name(form.root(), "pick"), vec![r1, r2]);
        assert_eq!(form.leaves(fs), vec![r1, r2]);
        assert_eq!(form.descendants(form.root()).len(), 3);
    }
}
