//! Read-only handles on nodes, handed to renderers.

use crate::attributes::Attributes;
use crate::elements::{ElementState, FileState, SelectOption};
use crate::form::Form;
use crate::node::{NodeKey, NodeKind};
use crate::value::Value;

/// A node of a form, seen from a renderer.
///
/// Views borrow the form; names and ids reflect the repeat index being
/// rendered, if any.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    form: &'a Form,
    key: NodeKey,
}

impl std::fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeView")
            .field("key", &self.key)
            .field("kind", &self.kind())
            .field("id", &self.id())
            .finish()
    }
}

impl<'a> NodeView<'a> {
    pub(crate) fn new(form: &'a Form, key: NodeKey) -> Self {
        Self { form, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn form(&self) -> &'a Form {
        self.form
    }

    pub fn kind(&self) -> NodeKind {
        self.form.nodes[self.key.0].kind
    }

    pub fn id(&self) -> &'a str {
        self.form.nodes[self.key.0].id()
    }

    pub fn name(&self) -> Option<&'a str> {
        self.form.nodes[self.key.0].name()
    }

    pub fn label(&self) -> Option<&'a str> {
        self.form.nodes[self.key.0].label.as_deref()
    }

    pub fn attributes(&self) -> &'a Attributes {
        &self.form.nodes[self.key.0].attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes().get(name)
    }

    /// Filtered value.
    pub fn value(&self) -> Option<Value> {
        self.form.value(self.key)
    }

    /// Unfiltered value.
    pub fn raw_value(&self) -> Option<Value> {
        self.form.raw_value(self.key)
    }

    pub fn error(&self) -> Option<&'a str> {
        self.form.nodes[self.key.0].error.as_deref()
    }

    pub fn is_frozen(&self) -> bool {
        self.form.nodes[self.key.0].frozen
    }

    pub fn is_persistent_freeze(&self) -> bool {
        self.form.nodes[self.key.0].persistent_freeze
    }

    pub fn is_required(&self) -> bool {
        self.form.is_required(self.key)
    }

    /// Whether the node renders as a hidden field.
    pub fn is_hidden(&self) -> bool {
        crate::elements::is_hidden(self.kind())
    }

    /// Whether a checkbox or radio is checked.
    pub fn is_checked(&self) -> bool {
        self.attributes().contains("checked")
    }

    /// Options of a select; empty for other kinds.
    pub fn options(&self) -> &'a [SelectOption] {
        match self.form.nodes[self.key.0].element() {
            Some(ElementState::Select(state)) => &state.options,
            _ => &[],
        }
    }

    /// Whether a select currently selects `value`.
    pub fn is_selected(&self, value: &str) -> bool {
        match self.form.nodes[self.key.0].element() {
            Some(ElementState::Select(state)) => state.is_selected(value),
            _ => false,
        }
    }

    /// Content of a `<button>` or a static element.
    pub fn content(&self) -> Option<&'a str> {
        match self.form.nodes[self.key.0].element()? {
            ElementState::Button(state) => state.content.as_deref(),
            ElementState::Static(state) => state.content.as_deref(),
            _ => None,
        }
    }

    /// Wrapping tag of a static element.
    pub fn tag(&self) -> Option<&'a str> {
        match self.form.nodes[self.key.0].element()? {
            ElementState::Static(state) => state.tag.as_deref(),
            _ => None,
        }
    }

    /// Text of a textarea.
    pub fn text_value(&self) -> Option<&'a str> {
        match self.form.nodes[self.key.0].element()? {
            ElementState::Textarea(state) => state.value.as_deref(),
            _ => None,
        }
    }

    /// Markup produced by a custom element.
    pub fn custom_html(&self) -> Option<String> {
        let node = &self.form.nodes[self.key.0];
        match node.element()? {
            ElementState::Custom(custom) => Some(custom.html(&node.attributes)),
            _ => None,
        }
    }

    /// Type name of a custom element.
    pub fn custom_type(&self) -> Option<&'a str> {
        match self.form.nodes[self.key.0].element()? {
            ElementState::Custom(custom) => Some(custom.type_name()),
            _ => None,
        }
    }

    /// Upload state of a file element.
    pub fn file(&self) -> Option<&'a FileState> {
        match self.form.nodes[self.key.0].element()? {
            ElementState::File(state) => Some(state),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<NodeView<'a>> {
        self.form
            .children(self.key)
            .iter()
            .map(|&child| NodeView::new(self.form, child))
            .collect()
    }

    /// The enclosing container, if attached.
    pub fn container(&self) -> Option<NodeView<'a>> {
        self.form
            .container_of(self.key)
            .map(|key| NodeView::new(self.form, key))
    }
}

#[cfg(test)]
mod tests {
    use crate::definition::NodeDef;
    use crate::form::Form;
    use crate::node::NodeKind;

    #[test]
    fn test_view_reads_element_state() {
        let mut form = Form::builder().id("v").track_submit(false).build().unwrap();
        let select = form
            .add(
                form.root(),
                NodeDef::select("color")
                    .label("Color")
                    .options([("r", "Red"), ("g", "Green")])
                    .value("g"),
            )
            .unwrap();
        let notes = form
            .add(form.root(), NodeDef::textarea("notes").value("hi"))
            .unwrap();

        let view = form.view(select).unwrap();
        assert_eq!(view.kind(), NodeKind::Select);
        assert_eq!(view.label(), Some("Color"));
        assert_eq!(view.options().len(), 2);
        assert!(view.is_selected("g"));
        assert!(!view.is_selected("r"));
        assert_eq!(view.container().map(|c| c.key()), Some(form.root()));

        assert_eq!(form.view(notes).unwrap().text_value(), Some("hi"));
        assert_eq!(form.view(form.root()).unwrap().children().len(), 2);
    }
}
