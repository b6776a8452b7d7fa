//! Free-text elements: `<input>` flavours and `<textarea>`.

use crate::attributes::Attributes;
use crate::node::NodeData;
use crate::value::Value;

pub(crate) fn input_raw_value(node: &NodeData) -> Option<Value> {
    if node.is_disabled() {
        return None;
    }
    node.attributes.get("value").map(Value::from)
}

pub(crate) fn input_set_value(attributes: &mut Attributes, value: Option<Value>) {
    // Inputs hold a single scalar; anything else clears the field.
    let text = match value {
        Some(Value::Str(s)) => s,
        _ => String::new(),
    };
    attributes.insert_raw("value", text);
}

/// Value of a `<textarea>`, kept out of the attributes since it renders as
/// element content.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextareaState {
    pub(crate) value: Option<String>,
}

impl TextareaState {
    pub(crate) fn raw_value(&self, node: &NodeData) -> Option<Value> {
        if node.is_disabled() {
            return None;
        }
        self.value.as_deref().map(Value::from)
    }

    pub(crate) fn set_value(&mut self, value: Option<Value>) {
        self.value = match value {
            Some(Value::Str(s)) => Some(s),
            Some(Value::Map(_)) => Some(String::new()),
            None => None,
        };
    }
}
