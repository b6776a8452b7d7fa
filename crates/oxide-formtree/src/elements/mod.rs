//! Leaf element kinds.
//!
//! Each kind owns a small typed state struct; the attributes, label, rules
//! and filters common to all nodes live in [`NodeData`]. The functions here
//! dispatch value access and data-source updates per kind.

mod button;
mod checkable;
mod custom;
mod file;
mod select;
mod text;

pub use custom::CustomElement;
pub use file::{upload_error_message, FileState};
pub use select::SelectOption;

pub(crate) use button::{ButtonState, StaticState};
pub(crate) use select::SelectState;
pub(crate) use text::TextareaState;

use crate::datasource::{Resolution, SourceFilter};
use crate::error::{FormError, Result};
use crate::node::{ButtonType, InputType, NodeData, NodeKind, Payload};
use crate::value::Value;

/// Kind-specific state of a leaf element.
#[derive(Debug)]
pub(crate) enum ElementState {
    /// Value lives in the `value` attribute.
    Input,
    Textarea(TextareaState),
    /// Checked state lives in the `checked` attribute.
    Checkable,
    Select(SelectState),
    Button(ButtonState),
    Static(StaticState),
    File(FileState),
    Custom(Box<dyn CustomElement>),
}

/// Attribute keys intercepted for a node kind.
pub(crate) fn watched_attributes(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::Input(_) => &["id", "name", "type", "value"],
        NodeKind::Checkbox | NodeKind::Radio | NodeKind::File => &["id", "name", "type"],
        NodeKind::Button(ButtonType::Submit | ButtonType::Reset | ButtonType::InputButton) => {
            &["id", "name", "type"]
        }
        NodeKind::Select => &["id", "name", "multiple"],
        NodeKind::Form => &["id", "method"],
        _ => &["id", "name"],
    }
}

/// Which data sources a kind reads from.
pub(crate) fn source_filter(kind: NodeKind) -> SourceFilter {
    match kind {
        NodeKind::Static => SourceFilter::DefaultsOnly,
        NodeKind::Button(_) => SourceFilter::SubmitOnly,
        _ => SourceFilter::Any,
    }
}

/// Name used to look the element up in data sources.
///
/// Multiple selects and checkbox lists carry a trailing `[]` in their
/// markup name that the submitted structure does not have.
pub(crate) fn lookup_name(node: &NodeData) -> Option<&str> {
    let name = node.name()?;
    match node.kind {
        NodeKind::Select | NodeKind::Checkbox => Some(name.strip_suffix("[]").unwrap_or(name)),
        _ => Some(name),
    }
}

/// Name under which the value is stored by container aggregation.
pub(crate) fn value_name(node: &NodeData) -> Option<&str> {
    let name = node.name()?;
    match node.kind {
        NodeKind::Select => Some(name.strip_suffix("[]").unwrap_or(name)),
        _ => Some(name),
    }
}

/// The unfiltered value of a leaf.
pub(crate) fn raw_value(node: &NodeData) -> Option<Value> {
    let state = node.element()?;
    match state {
        ElementState::Input => text::input_raw_value(node),
        ElementState::Textarea(state) => state.raw_value(node),
        ElementState::Checkable => checkable::raw_value(node),
        ElementState::Select(state) => state.raw_value(node),
        ElementState::Button(state) => state.raw_value(node),
        ElementState::Static(_) => None,
        ElementState::File(state) => state.raw_value(node),
        ElementState::Custom(custom) => custom.raw_value(&node.attributes),
    }
}

/// Sets a leaf's value programmatically.
pub(crate) fn set_value(node: &mut NodeData, value: Option<Value>) {
    let NodeData {
        attributes,
        payload,
        kind,
        ..
    } = node;
    let Payload::Element(state) = payload else {
        return;
    };
    match state {
        ElementState::Input => text::input_set_value(attributes, value),
        ElementState::Textarea(state) => state.set_value(value),
        ElementState::Checkable => checkable::set_value(attributes, *kind, value),
        ElementState::Select(state) => state.set_value(value),
        // Buttons and file inputs only take their value from a submission.
        ElementState::Button(_) | ElementState::File(_) => {}
        ElementState::Static(state) => state.set_content(value),
        ElementState::Custom(custom) => custom.set_value(attributes, value),
    }
}

/// Applies the outcome of a data-source walk.
pub(crate) fn apply_resolution(node: &mut NodeData, resolution: Resolution) {
    let Resolution::Found(value) = resolution else {
        return;
    };
    if let Payload::Element(ElementState::Button(state)) = &mut node.payload {
        state.submitted = value;
        return;
    }
    if node.kind == NodeKind::Checkbox && node.name().is_some_and(|n| n.ends_with("[]")) {
        checkable::set_from_list(&mut node.attributes, value.as_ref());
        return;
    }
    set_value(node, value);
}

/// Handles a change to a watched attribute that is specific to the kind.
///
/// Returns `Ok(false)` when the key is not handled here (id and name are
/// handled by the form).
pub(crate) fn on_watched_attribute(
    node: &mut NodeData,
    name: &str,
    value: Option<String>,
) -> Result<bool> {
    match (node.kind, name) {
        (_, "type") | (NodeKind::Form, "method") => {
            Err(FormError::ReadOnlyAttribute(name.to_string()))
        }
        (NodeKind::Input(_), "value") => {
            set_value(node, value.map(Value::Str));
            Ok(true)
        }
        (NodeKind::Select, "multiple") => {
            select::toggle_multiple(&mut node.attributes, value);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Initializes kind-specific attributes of a freshly created element.
pub(crate) fn init_attributes(node: &mut NodeData) {
    match node.kind {
        NodeKind::Input(t) => node.attributes.insert_raw("type", t.as_str()),
        NodeKind::Checkbox => {
            node.attributes.insert_raw("type", "checkbox");
            if !node.attributes.contains("value") {
                node.attributes.insert_raw("value", "1");
            }
        }
        NodeKind::Radio => node.attributes.insert_raw("type", "radio"),
        NodeKind::File => node.attributes.insert_raw("type", "file"),
        NodeKind::Button(ButtonType::Submit) => node.attributes.insert_raw("type", "submit"),
        NodeKind::Button(ButtonType::Reset) => node.attributes.insert_raw("type", "reset"),
        NodeKind::Button(ButtonType::InputButton) => node.attributes.insert_raw("type", "button"),
        NodeKind::Select if node.attributes.contains("multiple") => {
            let value = node.attributes.get("multiple").map(str::to_string);
            select::toggle_multiple(&mut node.attributes, value);
        }
        _ => {}
    }
}

/// Whether an input kind renders as a hidden field.
pub(crate) fn is_hidden(kind: NodeKind) -> bool {
    kind == NodeKind::Input(InputType::Hidden)
}
