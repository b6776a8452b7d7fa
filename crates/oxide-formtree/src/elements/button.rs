//! Buttons and static content.

use crate::node::NodeData;
use crate::value::Value;

/// A button's value exists only when the button itself was used to submit
/// the form.
#[derive(Debug, Clone, Default)]
pub(crate) struct ButtonState {
    pub(crate) submitted: Option<Value>,
    /// Content of a `<button>` element.
    pub(crate) content: Option<String>,
}

impl ButtonState {
    pub(crate) fn raw_value(&self, node: &NodeData) -> Option<Value> {
        if node.is_disabled() {
            return None;
        }
        self.submitted.clone()
    }
}

/// Markup or text shown as part of the form.
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticState {
    pub(crate) content: Option<String>,
    /// Wrapping tag, if any.
    pub(crate) tag: Option<String>,
}

impl StaticState {
    pub(crate) fn set_content(&mut self, value: Option<Value>) {
        self.content = value.map(|v| match v {
            Value::Str(s) => s,
            map @ Value::Map(_) => map.to_string(),
        });
    }
}
