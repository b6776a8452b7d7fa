//! `<select>` elements with options and option groups.

use crate::attributes::Attributes;
use crate::node::NodeData;
use crate::value::Value;

/// An entry of a select's option tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOption {
    /// An `<option>`.
    Item {
        /// Display text.
        text: String,
        /// Submitted value.
        value: String,
        /// Other attributes (`disabled`, `class`, ...).
        attributes: Attributes,
    },
    /// An `<optgroup>`.
    Group {
        /// Group label.
        label: String,
        /// Other attributes.
        attributes: Attributes,
        /// Options inside the group.
        options: Vec<SelectOption>,
    },
}

impl SelectOption {
    /// Creates an option.
    pub fn item(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Item {
            text: text.into(),
            value: value.into(),
            attributes: Attributes::new(),
        }
    }

    /// Creates an option group.
    pub fn group(label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self::Group {
            label: label.into(),
            attributes: Attributes::new(),
            options,
        }
    }

    /// Builder method to add an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Item { attributes, .. } | Self::Group { attributes, .. } => {
                attributes.insert_raw(&key.into(), value.into());
            }
        }
        self
    }

    /// Builder method to disable the option.
    #[must_use]
    pub fn disabled(self) -> Self {
        self.attr("disabled", "disabled")
    }

    /// Builder method to pre-select the option.
    #[must_use]
    pub fn selected(self) -> Self {
        self.attr("selected", "selected")
    }

    fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a str, &'a Attributes)) {
        match self {
            Self::Item {
                value, attributes, ..
            } => f(value, attributes),
            Self::Group { options, .. } => options.iter().for_each(|o| o.visit(f)),
        }
    }
}

/// Option tree and current selection.
#[derive(Debug, Clone)]
pub(crate) struct SelectState {
    pub(crate) options: Vec<SelectOption>,
    /// Selected values in selection order.
    pub(crate) values: Vec<String>,
    pub(crate) intrinsic_validation: bool,
}

impl Default for SelectState {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            values: Vec::new(),
            intrinsic_validation: true,
        }
    }
}

impl SelectState {
    /// Adds an option, moving a `selected` attribute into the selection.
    pub(crate) fn add_option(&mut self, mut option: SelectOption) {
        self.take_selected(&mut option);
        self.options.push(option);
    }

    fn take_selected(&mut self, option: &mut SelectOption) {
        match option {
            SelectOption::Item {
                value, attributes, ..
            } => {
                if attributes.remove_raw("selected").is_some() && !self.values.contains(value) {
                    self.values.push(value.clone());
                }
            }
            SelectOption::Group { options, .. } => {
                for o in options.iter_mut() {
                    self.take_selected(o);
                }
            }
        }
    }

    /// Values of enabled options in document order.
    pub(crate) fn possible_values(&self) -> Vec<&str> {
        let mut possible = Vec::new();
        for option in &self.options {
            option.visit(&mut |value, attributes| {
                if !attributes.contains("disabled") {
                    possible.push(value);
                }
            });
        }
        possible
    }

    fn option_count(&self) -> usize {
        let mut count = 0;
        for option in &self.options {
            option.visit(&mut |_, _| count += 1);
        }
        count
    }

    pub(crate) fn raw_value(&self, node: &NodeData) -> Option<Value> {
        if node.is_disabled() || self.values.is_empty() {
            return None;
        }
        let possible = self.possible_values();
        if self.intrinsic_validation && (self.option_count() == 0 || possible.is_empty()) {
            return None;
        }
        let selected: Vec<&String> = self
            .values
            .iter()
            .filter(|v| !self.intrinsic_validation || possible.contains(&v.as_str()))
            .collect();
        if selected.is_empty() {
            return None;
        }
        if node.attributes.contains("multiple") {
            return Some(Value::list(selected));
        }
        if let [only] = selected.as_slice() {
            return Some(Value::from(*only));
        }
        // Several options claim to be selected: browsers submit the last one
        // in document order.
        let mut last = None;
        for option in &self.options {
            option.visit(&mut |value, _| {
                if selected.iter().any(|s| s.as_str() == value) {
                    last = Some(value);
                }
            });
        }
        last.map(Value::from)
    }

    pub(crate) fn set_value(&mut self, value: Option<Value>) {
        self.values = match value {
            None => Vec::new(),
            Some(v) => v.scalars().into_iter().map(str::to_string).collect(),
        };
    }

    /// Whether an option value is part of the current selection.
    pub(crate) fn is_selected(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Sets or removes `multiple`, keeping the `[]` name suffix in step.
pub(crate) fn toggle_multiple(attributes: &mut Attributes, value: Option<String>) {
    let name = attributes.get("name").map(str::to_string);
    match value {
        Some(v) => {
            attributes.insert_raw("multiple", v);
            if let Some(name) = name.filter(|n| !n.ends_with("[]")) {
                attributes.insert_raw("name", format!("{name}[]"));
            }
        }
        None => {
            attributes.remove_raw("multiple");
            if let Some(base) = name.as_deref().and_then(|n| n.strip_suffix("[]")) {
                attributes.insert_raw("name", base);
            }
        }
    }
}
