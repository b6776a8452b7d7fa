//! The renderer visitor and client-side rule collection.
//!
//! [`Form::render`](crate::Form::render) walks the tree in document order and
//! calls a [`Renderer`] for every node. Containers are bracketed by a
//! start/finish pair; leaves get a single call. Renderers that support
//! client-side validation expose a [`JavascriptBuilder`], which the form fills
//! with the descriptors of its client rules before finishing.

use serde::Serialize;

use crate::view::NodeView;

/// Visitor driven by [`Form::render`](crate::Form::render).
pub trait Renderer {
    fn start_form(&mut self, form: &NodeView<'_>);

    fn finish_form(&mut self, form: &NodeView<'_>);

    /// Fieldsets and repeats.
    fn start_container(&mut self, container: &NodeView<'_>);

    fn finish_container(&mut self, container: &NodeView<'_>);

    fn start_group(&mut self, group: &NodeView<'_>);

    fn finish_group(&mut self, group: &NodeView<'_>);

    fn render_element(&mut self, element: &NodeView<'_>);

    fn render_hidden(&mut self, element: &NodeView<'_>);

    /// Collector for client-side rules, if the renderer outputs any.
    fn javascript_builder(&mut self) -> Option<&mut JavascriptBuilder> {
        None
    }
}

/// A rule exported to client-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRule {
    /// Id of the element the error is shown on.
    pub owner_id: String,
    /// Descriptor of the check, e.g. `required("name")`.
    pub callback: String,
    pub message: String,
    /// Ids of the elements whose changes re-run the rule.
    pub triggers: Vec<String>,
    /// Whether the rule also runs when a trigger loses focus.
    pub on_blur: bool,
}

/// Collects the client rules of one form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JavascriptBuilder {
    form_id: String,
    rules: Vec<ClientRule>,
}

impl JavascriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_form_id(&mut self, id: impl Into<String>) {
        self.form_id = id.into();
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn add_rule(&mut self, rule: ClientRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[ClientRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The collected rules as a JSON document.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "form": self.form_id,
            "rules": self.rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_json() {
        let mut builder = JavascriptBuilder::new();
        assert!(builder.is_empty());
        builder.set_form_id("f");
        builder.add_rule(ClientRule {
            owner_id: "name".to_string(),
            callback: "required(\"name\")".to_string(),
            message: "Required".to_string(),
            triggers: vec!["name".to_string()],
            on_blur: true,
        });
        let json = builder.to_json();
        assert_eq!(json["form"], "f");
        assert_eq!(json["rules"][0]["owner_id"], "name");
        assert_eq!(json["rules"][0]["on_blur"], true);
    }
}
