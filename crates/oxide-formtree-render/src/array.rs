//! Renders a form into a serializable structure.

use std::collections::BTreeMap;

use serde::Serialize;

use oxide_formtree::{JavascriptBuilder, NodeView, Renderer, Value};

use crate::default::kind_name;
use crate::error::Result;
use crate::widgets::element_html;

/// One rendered node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementArray {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Element markup; empty for containers.
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub required: bool,
    pub frozen: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementArray>,
}

/// The rendered form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormArray {
    pub id: String,
    pub attributes: BTreeMap<String, String>,
    /// Errors by element id; filled only when errors are grouped.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    /// Markup of hidden elements.
    pub hidden: Vec<String>,
    pub elements: Vec<ElementArray>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javascript: Option<serde_json::Value>,
}

/// Collects a form into a [`FormArray`].
#[derive(Debug, Default)]
pub struct ArrayRenderer {
    group_errors: bool,
    array: FormArray,
    stack: Vec<ElementArray>,
    javascript: JavascriptBuilder,
}

impl ArrayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves errors out of the elements into [`FormArray::errors`].
    #[must_use]
    pub fn group_errors(mut self, group: bool) -> Self {
        self.group_errors = group;
        self
    }

    pub fn array(&self) -> &FormArray {
        &self.array
    }

    pub fn into_array(self) -> FormArray {
        self.array
    }

    /// The rendered form as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.array)?)
    }

    fn node(&mut self, view: &NodeView<'_>, html: String) -> ElementArray {
        let required = view.is_required();
        self.array.required |= required && !view.is_frozen();
        let mut error = view.error().map(str::to_string);
        if self.group_errors {
            if let Some(message) = error.take() {
                self.array.errors.insert(view.id().to_string(), message);
            }
        }
        ElementArray {
            id: view.id().to_string(),
            kind: kind_name(view).to_string(),
            name: view.name().map(str::to_string),
            label: view.label().map(str::to_string),
            value: if view.kind().is_container() {
                None
            } else {
                view.value()
            },
            html,
            error,
            required,
            frozen: view.is_frozen(),
            elements: Vec::new(),
        }
    }

    fn push(&mut self, element: ElementArray) {
        match self.stack.last_mut() {
            Some(parent) => parent.elements.push(element),
            None => self.array.elements.push(element),
        }
    }

    fn close(&mut self, view: &NodeView<'_>) {
        let Some(mut container) = self.stack.pop() else {
            return;
        };
        // Errors are known only after the children were rendered.
        let closed = self.node(view, String::new());
        container.error = closed.error;
        self.push(container);
    }
}

impl Renderer for ArrayRenderer {
    fn start_form(&mut self, form: &NodeView<'_>) {
        self.array = FormArray {
            id: form.id().to_string(),
            attributes: form
                .attributes()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..FormArray::default()
        };
        self.stack.clear();
        self.javascript = JavascriptBuilder::new();
    }

    fn finish_form(&mut self, form: &NodeView<'_>) {
        if let Some(error) = form.error() {
            self.array
                .errors
                .insert(form.id().to_string(), error.to_string());
        }
        if !self.javascript.is_empty() {
            self.array.javascript = Some(self.javascript.to_json());
        }
    }

    fn start_container(&mut self, container: &NodeView<'_>) {
        let mut node = self.node(container, String::new());
        node.error = None;
        self.stack.push(node);
    }

    fn finish_container(&mut self, container: &NodeView<'_>) {
        self.close(container);
    }

    fn start_group(&mut self, group: &NodeView<'_>) {
        self.start_container(group);
    }

    fn finish_group(&mut self, group: &NodeView<'_>) {
        self.close(group);
    }

    fn render_element(&mut self, element: &NodeView<'_>) {
        let node = self.node(element, element_html(element));
        self.push(node);
    }

    fn render_hidden(&mut self, element: &NodeView<'_>) {
        self.array.hidden.push(element_html(element));
    }

    fn javascript_builder(&mut self) -> Option<&mut JavascriptBuilder> {
        Some(&mut self.javascript)
    }
}
