//! # oxide-formtree-cli
//!
//! Builds [`Form`]s from JSON definitions, submits JSON data to them and
//! reports the outcome. The `formtree` binary is a thin layer over this
//! library.
//!
//! ```rust
//! use oxide_formtree::Registry;
//! use oxide_formtree_cli::{build_form, FormDefinition, Report};
//! use serde_json::json;
//!
//! let definition: FormDefinition = serde_json::from_value(json!({
//!     "id": "signup",
//!     "elements": [{
//!         "type": "text", "name": "user",
//!         "rules": [{"type": "required", "message": "Pick a user name"}]
//!     }]
//! }))
//! .unwrap();
//!
//! let mut form = build_form(&definition, &Registry::new()).unwrap();
//! let report = Report::submit(&mut form, json!({"user": ""}));
//! assert!(!report.valid);
//! assert_eq!(report.errors["user"], "Pick a user name");
//! ```

mod definition;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use oxide_formtree::{
    ArrayDataSource, Form, FormError, NodeDef, NodeKey, NodeKind, Registry, Result, Value,
};

pub use definition::{ElementDefinition, FormDefinition, ModeDefinition, RuleDefinition};

/// Builds a form from its definition, creating elements and rules through
/// `registry`.
///
/// Rules are attached once every element exists, so a rule may refer to
/// elements defined after its owner.
pub fn build_form(definition: &FormDefinition, registry: &Registry) -> Result<Form> {
    let mut builder = Form::builder()
        .id(definition.id.as_str())
        .track_submit(definition.track_submit);
    if let Some(method) = &definition.method {
        builder = builder.method(method);
    }
    if let Some(action) = &definition.action {
        builder = builder.action(action.as_str());
    }
    for (key, value) in &definition.attributes {
        builder = builder.attr(key.as_str(), value.as_str());
    }
    let mut form = builder.build()?;
    if let Some(defaults) = &definition.defaults {
        form.add_data_source(ArrayDataSource::new(defaults.clone()));
    }

    let root = form.root();
    let mut pending = Vec::new();
    for element in &definition.elements {
        let key = form.add(root, node_def(element, registry)?)?;
        collect_rules(&form, key, element, &mut pending);
    }
    for (owner, rule) in pending {
        let created = registry.create_rule(&rule.kind, &form, owner, rule.message.as_str(), &rule.config)?;
        form.add_rule_with(owner, created, rule.mode.into())?;
    }
    debug!(form_id = %form.form_id(), "built form from definition");
    Ok(form)
}

fn node_def(element: &ElementDefinition, registry: &Registry) -> Result<NodeDef> {
    let config = serde_json::Value::Object(element.config.clone());
    let mut def = registry.create_element(&element.kind, element.name.as_deref(), &config)?;
    if let Some(id) = &element.id {
        def = def.id(id.as_str());
    }
    if let Some(label) = &element.label {
        def = def.label(label.as_str());
    }
    for (key, value) in &element.attributes {
        def = def.attr(key.as_str(), value.as_str());
    }
    if let Some(value) = element.value.as_ref().and_then(Value::from_json) {
        def = def.value(value);
    }
    if !element.elements.is_empty() && !def.kind().is_container() {
        return Err(FormError::NotAContainer(
            element.name.clone().unwrap_or_else(|| element.kind.clone()),
        ));
    }
    for child in &element.elements {
        let child = node_def(child, registry)?;
        match def.prototype_mut() {
            Some(prototype) => prototype.push_child(child),
            None => def.push_child(child),
        }
    }
    Ok(def)
}

/// Pairs every rule definition with the node created for its element. The
/// created tree mirrors the definition, a repeat holding its children in
/// its prototype.
fn collect_rules<'a>(
    form: &Form,
    key: NodeKey,
    element: &'a ElementDefinition,
    out: &mut Vec<(NodeKey, &'a RuleDefinition)>,
) {
    out.extend(element.rules.iter().map(|rule| (key, rule)));
    let parent = if form.kind(key) == Some(NodeKind::Repeat) {
        match form.children(key).first() {
            Some(&prototype) => prototype,
            None => return,
        }
    } else {
        key
    };
    let children = form.children(parent).to_vec();
    for (child, definition) in children.into_iter().zip(&element.elements) {
        collect_rules(form, child, definition, out);
    }
}

/// Outcome of validating submitted data.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub valid: bool,
    /// Error messages by element id. Errors inside repeats are keyed by the
    /// id the element has for that index.
    pub errors: BTreeMap<String, String>,
    /// The form value.
    pub values: serde_json::Value,
}

impl Report {
    /// Submits `data` to `form`, validates it and collects the outcome.
    pub fn submit(form: &mut Form, data: serde_json::Value) -> Self {
        form.submit_manually(ArrayDataSource::submitted(data));
        let valid = form.validate();
        Self::collect(form, valid)
    }

    /// Collects errors and values of a validated form.
    pub fn collect(form: &Form, valid: bool) -> Self {
        let mut errors = BTreeMap::new();
        let root = form.root();
        if let Some(error) = form.error(root) {
            errors.insert(form.form_id().to_string(), error.to_string());
        }
        for key in form.descendants(root) {
            if let (Some(id), Some(error)) = (form.id(key), form.error(key)) {
                errors.insert(id.to_string(), error.to_string());
            }
            if form.kind(key) == Some(NodeKind::Repeat) {
                for index in form.indexes(key) {
                    for (node, message) in form.repeat_errors(key, index) {
                        let id = form.id(*node).unwrap_or_default();
                        errors.insert(format!("{id}_{index}"), message.clone());
                    }
                }
            }
        }
        let values = serde_json::to_value(form.values()).unwrap_or_default();
        Self {
            valid,
            errors,
            values,
        }
    }
}
