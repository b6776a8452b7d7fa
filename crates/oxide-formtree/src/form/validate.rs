//! Server-side validation.

use std::collections::HashMap;

use tracing::{debug, info};

use super::Form;
use crate::elements::ElementState;
use crate::node::{NodeKey, NodeKind};
use crate::rules::Rule;

impl Form {
    /// Validates the whole form.
    ///
    /// A form that was not submitted is never valid. Errors recorded by an
    /// earlier call are kept, so a node that already failed stays failed.
    pub fn validate(&mut self) -> bool {
        if !self.is_submitted() {
            debug!(form_id = %self.form_id(), "form not submitted, skipping validation");
            return false;
        }
        let valid = self.validate_node(self.root);
        let errors = self.nodes.iter().filter(|n| n.error.is_some()).count();
        info!(form_id = %self.form_id(), valid, errors, "form validated");
        valid
    }

    /// Validates one node and, for containers, everything below it.
    pub fn validate_node(&mut self, key: NodeKey) -> bool {
        let Some(node) = self.nodes.get(key.0) else {
            return false;
        };
        match node.kind {
            NodeKind::Repeat => self.validate_repeat(key),
            kind if kind.is_container() => self.validate_container(key),
            _ => self.validate_element(key),
        }
    }

    fn validate_element(&mut self, key: NodeKey) -> bool {
        let intrinsic = match self.nodes[key.0].element() {
            Some(ElementState::File(state)) => state.intrinsic_error(),
            _ => None,
        };
        if let Some(message) = intrinsic {
            self.nodes[key.0].error.get_or_insert(message);
        }
        self.run_rules(key)
    }

    /// Children first, then the container's own rules, then a sweep for
    /// errors those rules recorded on descendants.
    fn validate_container(&mut self, key: NodeKey) -> bool {
        let mut valid = true;
        for child in self.children(key).to_vec() {
            valid &= self.validate_node(child);
        }
        valid &= self.run_rules(key);
        valid && self.descendants_valid(key)
    }

    fn validate_repeat(&mut self, key: NodeKey) -> bool {
        let indexes = self.indexes(key).to_vec();
        let children = self.children(key).to_vec();
        let descendants = self.descendants(key);
        let mut valid = true;
        let mut errors = HashMap::new();
        for index in indexes {
            self.serve_index(key, &index);
            self.clear_errors(&descendants);
            for &child in &children {
                valid &= self.validate_node(child);
            }
            let found: Vec<(NodeKey, String)> = descendants
                .iter()
                .filter_map(|d| self.nodes[d.0].error.clone().map(|e| (*d, e)))
                .collect();
            if !found.is_empty() {
                debug!(repeat = %key, index = %index, errors = found.len(), "repeat index invalid");
                errors.insert(index, found);
            }
        }
        self.apply_index(key, None);
        self.clear_errors(&descendants);
        if let Some(state) = self
            .nodes[key.0]
            .container_state_mut()
            .and_then(|c| c.repeat.as_mut())
        {
            state.errors = errors;
        }
        valid &= self.run_rules(key);
        valid && self.descendants_valid(key)
    }

    fn clear_errors(&mut self, keys: &[NodeKey]) {
        for key in keys {
            self.nodes[key.0].error = None;
        }
    }

    fn descendants_valid(&self, key: NodeKey) -> bool {
        self.descendants(key)
            .iter()
            .all(|d| self.nodes[d.0].error.is_none())
    }

    /// Runs the server-side rules of a node until one records an error.
    fn run_rules(&mut self, key: NodeKey) -> bool {
        let rules: Vec<Rule> = self.nodes[key.0]
            .rules
            .iter()
            .filter(|r| r.mode.on_server())
            .map(|r| r.rule.clone())
            .collect();
        for rule in rules {
            if self.nodes[key.0].error.is_some() {
                break;
            }
            let outcome = rule.evaluate(self, key);
            if !outcome.passed {
                debug!(node = %key, rule = rule.name(), "rule failed");
            }
            for (owner, message) in outcome.errors {
                if let Some(node) = self.nodes.get_mut(owner.0) {
                    node.error.get_or_insert(message);
                }
            }
        }
        self.nodes[key.0].error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::datasource::ArrayDataSource;
    use crate::definition::NodeDef;
    use crate::rules::{CompareOp, Operand};
    use serde_json::json;

    fn submitted(data: serde_json::Value) -> Form {
        let mut form = Form::builder().id("val").build().unwrap();
        form.submit_manually(ArrayDataSource::submitted(data));
        form
    }

    #[test]
    fn test_unsubmitted_form_is_invalid() {
        let mut form = Form::builder().id("val").build().unwrap();
        form.add(form.root(), NodeDef::text("a")).unwrap();
        assert!(!form.validate());
    }

    #[test]
    fn test_required_field() {
        let mut form = submitted(json!({"name": ""}));
        let name = form.add(form.root(), NodeDef::text("name")).unwrap();
        form.add_rule(name, Rule::required("Name is required").unwrap())
            .unwrap();
        assert!(!form.validate());
        assert_eq!(form.error(name), Some("Name is required"));

        let mut form = submitted(json!({"name": "Ann"}));
        let name = form.add(form.root(), NodeDef::text("name")).unwrap();
        form.add_rule(name, Rule::required("Name is required").unwrap())
            .unwrap();
        assert!(form.validate());
        assert_eq!(form.error(name), None);
    }

    #[test]
    fn test_first_error_stops_later_rules() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut form = submitted(json!({"nick": "x"}));
        let nick = form.add(form.root(), NodeDef::text("nick")).unwrap();
        form.add_rule(nick, Rule::min_length("Too short", 3)).unwrap();
        let counter = Arc::clone(&calls);
        form.add_rule(
            nick,
            Rule::callback("never", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        )
        .unwrap();
        assert!(!form.validate());
        assert_eq!(form.error(nick), Some("Too short"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chained_rule_message() {
        let mut form = submitted(json!({"nick": "ab"}));
        let nick = form.add(form.root(), NodeDef::text("nick")).unwrap();
        let rule = Rule::required("Required")
            .unwrap()
            .and_(Rule::min_length("At least 3", 3))
            .unwrap();
        form.add_rule(nick, rule).unwrap();
        assert!(!form.validate());
        assert_eq!(form.error(nick), Some("At least 3"));
    }

    #[test]
    fn test_container_rule_can_flag_descendant() {
        let mut form = submitted(json!({"pass": "a", "confirm": "b"}));
        let fs = form.add(form.root(), NodeDef::fieldset()).unwrap();
        let pass = form.add(fs, NodeDef::password("pass")).unwrap();
        let confirm = form.add(fs, NodeDef::password("confirm")).unwrap();
        let rule = Rule::compare("Passwords differ", CompareOp::Eq, Operand::Element(pass))
            .for_owner(confirm);
        form.add_rule(confirm, rule).unwrap();
        assert!(!form.validate());
        assert_eq!(form.error(confirm), Some("Passwords differ"));
        assert_eq!(form.error(pass), None);
    }

    #[test]
    fn test_empty_message_failure_keeps_node_valid() {
        let mut form = submitted(json!({"a": "x"}));
        let a = form.add(form.root(), NodeDef::text("a")).unwrap();
        form.add_rule(a, Rule::min_length("", 5)).unwrap();
        assert!(form.validate());
    }

    #[test]
    fn test_client_only_rules_skip_server() {
        let mut form = submitted(json!({"a": ""}));
        let a = form.add(form.root(), NodeDef::text("a")).unwrap();
        form.add_rule_with(a, Rule::nonempty("x", 1), crate::rules::RunMode::Client)
            .unwrap();
        assert!(form.validate());
    }

    #[test]
    fn test_repeat_errors_per_index() {
        let mut form = submitted(json!({"title": {"0": "ok", "1": ""}}));
        let repeat = form
            .add(
                form.root(),
                NodeDef::repeat(NodeDef::fieldset().child(NodeDef::text("title").id("title"))),
            )
            .unwrap();
        let title = form.get_element_by_id("title").unwrap();
        form.add_rule(title, Rule::required("Title needed").unwrap())
            .unwrap();
        assert!(!form.validate());
        assert!(form.repeat_errors(repeat, "0").is_empty());
        assert_eq!(
            form.repeat_errors(repeat, "1"),
            &[(title, "Title needed".to_string())]
        );
        assert_eq!(form.name(title), Some("title"));
    }
}
