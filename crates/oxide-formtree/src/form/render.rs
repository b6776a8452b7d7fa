//! Driving a [`Renderer`] over the tree.

use tracing::debug;

use super::Form;
use crate::elements;
use crate::node::{NodeKey, NodeKind};
use crate::render::{ClientRule, Renderer};
use crate::view::NodeView;

impl Form {
    /// Renders the form.
    ///
    /// Repeats are rendered once per index, with the errors found for that
    /// index by the last validation. Client rules of every node that is not
    /// frozen go to the renderer's [`JavascriptBuilder`] before
    /// [`Renderer::finish_form`] runs.
    ///
    /// [`JavascriptBuilder`]: crate::render::JavascriptBuilder
    pub fn render(&mut self, renderer: &mut dyn Renderer) {
        let root = self.root;
        renderer.start_form(&NodeView::new(self, root));
        let mut client_rules = self.client_rules(root);
        for child in self.children(root).to_vec() {
            self.render_subtree(child, renderer, &mut client_rules);
        }
        if let Some(builder) = renderer.javascript_builder() {
            builder.set_form_id(self.form_id());
            for rule in client_rules {
                builder.add_rule(rule);
            }
        }
        debug!(form_id = %self.form_id(), "form rendered");
        renderer.finish_form(&NodeView::new(self, root));
    }

    fn render_subtree(
        &mut self,
        key: NodeKey,
        renderer: &mut dyn Renderer,
        client_rules: &mut Vec<ClientRule>,
    ) {
        let kind = self.nodes[key.0].kind;
        if kind != NodeKind::Repeat {
            client_rules.extend(self.client_rules(key));
        }
        match kind {
            NodeKind::Repeat => self.render_repeat(key, renderer, client_rules),
            NodeKind::Group => {
                renderer.start_group(&NodeView::new(self, key));
                for child in self.children(key).to_vec() {
                    self.render_subtree(child, renderer, client_rules);
                }
                renderer.finish_group(&NodeView::new(self, key));
            }
            kind if kind.is_container() => {
                renderer.start_container(&NodeView::new(self, key));
                for child in self.children(key).to_vec() {
                    self.render_subtree(child, renderer, client_rules);
                }
                renderer.finish_container(&NodeView::new(self, key));
            }
            kind if elements::is_hidden(kind) => renderer.render_hidden(&NodeView::new(self, key)),
            _ => renderer.render_element(&NodeView::new(self, key)),
        }
    }

    fn render_repeat(
        &mut self,
        key: NodeKey,
        renderer: &mut dyn Renderer,
        client_rules: &mut Vec<ClientRule>,
    ) {
        renderer.start_container(&NodeView::new(self, key));
        let children = self.children(key).to_vec();
        for index in self.indexes(key).to_vec() {
            self.serve_index(key, &index);
            let errors = self.repeat_errors(key, &index).to_vec();
            for (node, message) in &errors {
                self.nodes[node.0].error = Some(message.clone());
            }
            for &child in &children {
                self.render_subtree(child, renderer, client_rules);
            }
            for (node, _) in &errors {
                self.nodes[node.0].error = None;
            }
        }
        self.apply_index(key, None);
        client_rules.extend(self.client_rules(key));
        renderer.finish_container(&NodeView::new(self, key));
    }

    /// Client-side descriptors of the rules attached to one node.
    pub fn client_rules(&self, key: NodeKey) -> Vec<ClientRule> {
        let Some(node) = self.nodes.get(key.0) else {
            return Vec::new();
        };
        if node.frozen {
            return Vec::new();
        }
        node.rules
            .iter()
            .filter(|attached| attached.mode.on_client())
            .filter_map(|attached| {
                let callback = attached.rule.javascript(self, key)?;
                let owner = attached.rule.owner().unwrap_or(key);
                let mut triggers: Vec<String> = Vec::new();
                for trigger in attached.rule.owners(key) {
                    let ids: Vec<NodeKey> = if self.nodes[trigger.0].kind.is_container() {
                        self.leaves(trigger)
                    } else {
                        vec![trigger]
                    };
                    for id in ids.iter().map(|k| self.nodes[k.0].id().to_string()) {
                        if !triggers.contains(&id) {
                            triggers.push(id);
                        }
                    }
                }
                Some(ClientRule {
                    owner_id: self.nodes[owner.0].id().to_string(),
                    callback,
                    message: attached.rule.message().to_string(),
                    triggers,
                    on_blur: attached.mode.on_blur(),
                })
            })
            .collect()
    }
}
