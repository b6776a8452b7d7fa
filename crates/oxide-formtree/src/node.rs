//! Node storage shared by every element and container.
//!
//! Nodes live in an arena owned by their [`Form`](crate::Form) and are
//! addressed by [`NodeKey`]. The back-link to the enclosing container is a
//! plain key, so it can never keep a container alive and is cleared as part
//! of the same call that detaches the node.

use std::fmt;
use std::sync::Arc;

use crate::attributes::Attributes;
use crate::container::ContainerState;
use crate::elements::ElementState;
use crate::rules::{Rule, RuleId, RunMode};
use crate::value::Value;

/// Handle to a node inside a form's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) usize);

impl NodeKey {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// `<input>` flavours that hold a free-text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputType {
    /// `type="text"`
    Text,
    /// `type="password"`
    Password,
    /// `type="email"`
    Email,
    /// `type="number"`
    Number,
    /// `type="search"`
    Search,
    /// `type="tel"`
    Tel,
    /// `type="url"`
    Url,
    /// `type="hidden"`
    Hidden,
}

impl InputType {
    /// The `type` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Email => "email",
            Self::Number => "number",
            Self::Search => "search",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Hidden => "hidden",
        }
    }
}

/// Button flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonType {
    /// `<button>` element.
    Button,
    /// `<input type="submit">`
    Submit,
    /// `<input type="reset">`
    Reset,
    /// `<input type="button">`
    InputButton,
}

impl ButtonType {
    /// Registry type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Submit => "submit",
            Self::Reset => "reset",
            Self::InputButton => "inputbutton",
        }
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Single-line `<input>`.
    Input(InputType),
    /// `<textarea>`
    Textarea,
    /// `<input type="checkbox">`
    Checkbox,
    /// `<input type="radio">`
    Radio,
    /// `<select>`
    Select,
    /// Buttons.
    Button(ButtonType),
    /// Static content.
    Static,
    /// `<input type="file">`
    File,
    /// Application-defined element.
    Custom,
    /// Root of the tree.
    Form,
    /// `<fieldset>`: groups children without affecting their names.
    Fieldset,
    /// Group: prefixes children names with its own.
    Group,
    /// Repeated prototype.
    Repeat,
}

impl NodeKind {
    /// Whether nodes of this kind hold children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Form | Self::Fieldset | Self::Group | Self::Repeat)
    }

    /// Whether the node can be frozen at all.
    pub fn is_freezable(self) -> bool {
        !matches!(
            self,
            Self::Input(InputType::Hidden) | Self::Button(_) | Self::Static | Self::File
        )
    }

    /// Registry-style type name.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Input(t) => t.as_str(),
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Button(b) => b.as_str(),
            Self::Static => "static",
            Self::File => "file",
            Self::Custom => "custom",
            Self::Form => "form",
            Self::Fieldset => "fieldset",
            Self::Group => "group",
            Self::Repeat => "repeat",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A post-processing step applied to a node's raw value.
#[derive(Clone)]
pub struct Filter(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl Filter {
    /// Wraps a closure.
    pub fn new(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// A filter applied to every scalar of a value, and to every descendant
/// element's value when added to a container.
#[derive(Clone)]
pub struct ScalarFilter(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl ScalarFilter {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Trims surrounding whitespace.
    pub fn trim() -> Self {
        Self::new(|s| s.trim().to_string())
    }

    pub(crate) fn apply(&self, value: &Value) -> Value {
        value.map_scalars(&*self.0)
    }
}

impl fmt::Debug for ScalarFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarFilter(..)")
    }
}

/// A rule attached to a node together with where it runs.
#[derive(Debug, Clone)]
pub(crate) struct AttachedRule {
    pub(crate) id: RuleId,
    pub(crate) rule: Rule,
    pub(crate) mode: RunMode,
}

/// What a node holds besides the common data.
#[derive(Debug)]
pub(crate) enum Payload {
    Element(ElementState),
    Container(ContainerState),
}

/// Per-node data common to all kinds.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) attributes: Attributes,
    pub(crate) label: Option<String>,
    pub(crate) payload: Payload,
    pub(crate) rules: Vec<AttachedRule>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) recursive_filters: Vec<ScalarFilter>,
    pub(crate) frozen: bool,
    pub(crate) persistent_freeze: bool,
    pub(crate) error: Option<String>,
    pub(crate) container: Option<NodeKey>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind, attributes: Attributes, payload: Payload) -> Self {
        Self {
            kind,
            attributes,
            label: None,
            payload,
            rules: Vec::new(),
            filters: Vec::new(),
            recursive_filters: Vec::new(),
            frozen: false,
            persistent_freeze: false,
            error: None,
            container: None,
        }
    }

    pub(crate) fn id(&self) -> &str {
        self.attributes.get("id").unwrap_or_default()
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.attributes.get("name")
    }

    pub(crate) fn is_disabled(&self) -> bool {
        self.attributes.contains("disabled")
    }

    pub(crate) fn container_state(&self) -> Option<&ContainerState> {
        match &self.payload {
            Payload::Container(c) => Some(c),
            Payload::Element(_) => None,
        }
    }

    pub(crate) fn container_state_mut(&mut self) -> Option<&mut ContainerState> {
        match &mut self.payload {
            Payload::Container(c) => Some(c),
            Payload::Element(_) => None,
        }
    }

    pub(crate) fn element(&self) -> Option<&ElementState> {
        match &self.payload {
            Payload::Element(e) => Some(e),
            Payload::Container(_) => None,
        }
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut ElementState> {
        match &mut self.payload {
            Payload::Element(e) => Some(e),
            Payload::Container(_) => None,
        }
    }

    /// Label used in error messages: the id.
    pub(crate) fn describe(&self) -> String {
        format!("{} {:?}", self.kind, self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freezable_kinds() {
        assert!(NodeKind::Input(InputType::Text).is_freezable());
        assert!(NodeKind::Select.is_freezable());
        assert!(!NodeKind::Input(InputType::Hidden).is_freezable());
        assert!(!NodeKind::Button(ButtonType::Submit).is_freezable());
        assert!(!NodeKind::Static.is_freezable());
    }

    #[test]
    fn test_scalar_filter_recurses() {
        let value = Value::list([" a ", "b "]);
        let trimmed = ScalarFilter::trim().apply(&value);
        assert_eq!(trimmed, Value::list(["a", "b"]));
    }
}
