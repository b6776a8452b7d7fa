//! Checkboxes and radio buttons.
//!
//! The `value` attribute is what gets submitted when the element is checked;
//! the checked state itself is the `checked` attribute.

use crate::attributes::Attributes;
use crate::node::{NodeData, NodeKind};
use crate::value::{Value, ValueMap};

pub(crate) fn raw_value(node: &NodeData) -> Option<Value> {
    if node.is_disabled() || !node.attributes.contains("checked") {
        return None;
    }
    node.attributes.get("value").map(Value::from)
}

pub(crate) fn set_value(attributes: &mut Attributes, kind: NodeKind, value: Option<Value>) {
    let own = attributes.get("value").unwrap_or_default();
    let checked = match &value {
        Some(Value::Str(s)) => s == own,
        // A checkbox list may be assigned the whole list of checked values.
        Some(Value::Map(m)) if kind == NodeKind::Checkbox => contains_scalar(m, own),
        _ => false,
    };
    set_checked(attributes, checked);
}

/// Checks the box when a submitted list contains its value.
pub(crate) fn set_from_list(attributes: &mut Attributes, value: Option<&Value>) {
    let own = attributes.get("value").unwrap_or_default();
    let checked = match value {
        Some(Value::Map(m)) => contains_scalar(m, own),
        Some(Value::Str(s)) => s == own,
        None => false,
    };
    set_checked(attributes, checked);
}

fn set_checked(attributes: &mut Attributes, checked: bool) {
    if checked {
        attributes.insert_raw("checked", "checked");
    } else {
        attributes.remove_raw("checked");
    }
}

fn contains_scalar(map: &ValueMap, needle: &str) -> bool {
    map.values().filter_map(Value::as_str).any(|s| s == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_by_matching_value() {
        let mut attrs = Attributes::new().with("value", "yes");
        set_value(&mut attrs, NodeKind::Checkbox, Some(Value::from("yes")));
        assert!(attrs.contains("checked"));
        set_value(&mut attrs, NodeKind::Checkbox, Some(Value::from("no")));
        assert!(!attrs.contains("checked"));
    }

    #[test]
    fn test_list_membership() {
        let mut attrs = Attributes::new().with("value", "b");
        set_from_list(&mut attrs, Some(&Value::list(["a", "b"])));
        assert!(attrs.contains("checked"));
        set_from_list(&mut attrs, None);
        assert!(!attrs.contains("checked"));
    }
}
