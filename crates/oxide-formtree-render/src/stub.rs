//! Renderer that collects only what templates usually need separately.

use oxide_formtree::{NodeView, Renderer};

use crate::widgets::element_html;

/// Collects errors, hidden fields and whether any element is required,
/// leaving the markup of everything else to the application.
#[derive(Debug, Default)]
pub struct StubRenderer {
    errors: Vec<(String, String)>,
    hidden: Vec<String>,
    required: bool,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(element id, message)` pairs in document order.
    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    /// Markup of the hidden elements.
    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// Whether a required element that is not frozen was rendered.
    pub fn has_required(&self) -> bool {
        self.required
    }

    fn collect(&mut self, view: &NodeView<'_>) {
        if view.is_required() && !view.is_frozen() {
            self.required = true;
        }
        if let Some(error) = view.error() {
            self.errors.push((view.id().to_string(), error.to_string()));
        }
    }
}

impl Renderer for StubRenderer {
    fn start_form(&mut self, _form: &NodeView<'_>) {
        self.errors.clear();
        self.hidden.clear();
        self.required = false;
    }

    fn finish_form(&mut self, form: &NodeView<'_>) {
        self.collect(form);
    }

    fn start_container(&mut self, _container: &NodeView<'_>) {}

    fn finish_container(&mut self, container: &NodeView<'_>) {
        self.collect(container);
    }

    fn start_group(&mut self, _group: &NodeView<'_>) {}

    fn finish_group(&mut self, group: &NodeView<'_>) {
        self.collect(group);
    }

    fn render_element(&mut self, element: &NodeView<'_>) {
        self.collect(element);
    }

    fn render_hidden(&mut self, element: &NodeView<'_>) {
        self.hidden.push(element_html(element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_formtree::{ArrayDataSource, Form, NodeDef, Rule};
    use serde_json::json;

    #[test]
    fn test_collects_errors_hidden_and_required() {
        let mut form = Form::builder().id("stub").build().unwrap();
        form.submit_manually(ArrayDataSource::submitted(json!({"a": ""})));
        let root = form.root();
        let a = form.add(root, NodeDef::text("a").id("a")).unwrap();
        form.add(root, NodeDef::hidden("h").value("1")).unwrap();
        form.add_rule(a, Rule::required("Fill a").unwrap()).unwrap();
        assert!(!form.validate());

        let mut stub = StubRenderer::new();
        form.render(&mut stub);
        assert_eq!(stub.errors(), &[("a".to_string(), "Fill a".to_string())]);
        assert_eq!(stub.hidden().len(), 2);
        assert!(stub.has_required());
    }
}
