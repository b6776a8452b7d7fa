//! The form: root container and owner of the node arena.
//!
//! A [`Form`] owns every node created through it. Nodes are addressed by
//! [`NodeKey`] and may be detached from the tree without being destroyed;
//! they live as long as the form does.

mod builder;
mod nodes;
mod render;
mod repeat;
mod tree;
mod validate;
mod values;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

pub use builder::FormBuilder;

use crate::datasource::DataSource;
use crate::ids::IdSource;
use crate::node::{NodeData, NodeKey};
use crate::request::Method;
use crate::value::{Value, ValueMap};

/// Prefix of the hidden tracking field name, followed by the form id.
pub const TRACK_VAR_PREFIX: &str = "_qf__";

/// Top-level value keys starting with this prefix are bookkeeping and never
/// part of [`Form::values`].
pub const INTERNAL_PREFIX: &str = "_qf";

/// Prefix of the tracking field's element id.
pub const TRACK_ID_PREFIX: &str = "qf:";

/// Why a form considers itself submitted (or not).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataReason {
    /// The tracking field was present in the request payload.
    pub track_var_found: bool,
    /// The form uses GET and the query string was not empty.
    pub get_not_empty: bool,
    /// The form uses POST and the body or uploaded files were not empty.
    pub post_not_empty: bool,
    /// Data was supplied through [`Form::submit_manually`].
    pub manual_submit: bool,
}

/// Handle returned by [`Form::on_node_added`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

type Observer = Arc<dyn Fn(&Form, NodeKey) + Send + Sync>;

/// A form and its element tree.
pub struct Form {
    pub(crate) nodes: Vec<NodeData>,
    root: NodeKey,
    method: Method,
    ids: IdSource,
    datasources: Vec<Box<dyn DataSource>>,
    track_submit: bool,
    reason: DataReason,
    observers: Vec<(ObserverHandle, Observer)>,
    next_observer: u64,
    next_rule: u64,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("id", &self.form_id())
            .field("method", &self.method)
            .field("nodes", &self.nodes.len())
            .field("datasources", &self.datasources)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Starts building a form.
    pub fn builder() -> FormBuilder {
        FormBuilder::new()
    }

    /// The root container.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// The form's id attribute.
    pub fn form_id(&self) -> &str {
        self.nodes[self.root.0].id()
    }

    /// Submission method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Name of the hidden field used to recognise submissions of this form.
    pub fn track_var_name(&self) -> String {
        format!("{TRACK_VAR_PREFIX}{}", self.form_id())
    }

    /// Whether submissions are recognised through the tracking field.
    pub fn tracks_submit(&self) -> bool {
        self.track_submit
    }

    /// The factors behind the submission decision.
    pub fn data_reason(&self) -> DataReason {
        self.reason
    }

    /// Whether any data source represents a submission.
    pub fn is_submitted(&self) -> bool {
        self.datasources.iter().any(|ds| ds.is_submit())
    }

    /// Attached data sources, in resolution order.
    pub fn data_sources(&self) -> &[Box<dyn DataSource>] {
        &self.datasources
    }

    /// Appends a data source and refreshes every element's value.
    pub fn add_data_source(&mut self, source: impl DataSource + 'static) {
        debug!(form_id = %self.form_id(), submit = source.is_submit(), "data source added");
        self.datasources.push(Box::new(source));
        self.update_value(self.root);
    }

    /// Replaces all data sources and refreshes every element's value.
    pub fn set_data_sources(&mut self, sources: Vec<Box<dyn DataSource>>) {
        debug!(form_id = %self.form_id(), count = sources.len(), "data sources replaced");
        self.datasources = sources;
        self.update_value(self.root);
    }

    /// Replaces all data sources with `source`, as if the form had been
    /// submitted with it. `source` should be a submit source for
    /// [`Form::is_submitted`] to report `true`.
    pub fn submit_manually(&mut self, source: impl DataSource + 'static) {
        info!(form_id = %self.form_id(), "form submitted manually");
        self.reason.manual_submit = true;
        self.datasources = vec![Box::new(source)];
        self.update_value(self.root);
    }

    /// The form's filtered value, without bookkeeping fields.
    pub fn values(&self) -> ValueMap {
        self.value(self.root)
            .and_then(Value::into_map)
            .unwrap_or_default()
    }

    /// Registers a hook called with every node attached anywhere in the
    /// tree.
    pub fn on_node_added(
        &mut self,
        observer: impl Fn(&Form, NodeKey) + Send + Sync + 'static,
    ) -> ObserverHandle {
        let handle = ObserverHandle(self.next_observer);
        self.next_observer += 1;
        self.observers.push((handle, Arc::new(observer)));
        handle
    }

    /// Unregisters a hook; returns whether it was registered.
    pub fn remove_observer(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(h, _)| *h != handle);
        self.observers.len() != before
    }

    fn notify_added(&self, key: NodeKey) {
        for (_, observer) in &self.observers {
            observer(self, key);
        }
    }
}

/// Removes bookkeeping keys from a form value.
pub(crate) fn strip_internal(value: Value) -> Value {
    match value {
        Value::Map(mut map) => {
            map.retain(|key, _| !key.to_string().starts_with(INTERNAL_PREFIX));
            Value::Map(map)
        }
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::ArrayDataSource;
    use crate::definition::NodeDef;
    use crate::request::Request;
    use serde_json::json;

    #[test]
    fn test_strip_internal() {
        let value = Value::Map(ValueMap::new().with("_qf__f", "").with("name", "x"));
        let stripped = strip_internal(value);
        assert_eq!(stripped.as_map().map(ValueMap::len), Some(1));
    }

    #[test]
    fn test_tracking_field_recognises_submission() {
        let request = Request::post()
            .body_param("_qf__f1", "")
            .body_param("name", "Ann");
        let mut form = Form::builder()
            .id("f1")
            .method("post")
            .request(request)
            .build()
            .unwrap();
        form.add(form.root(), NodeDef::text("name")).unwrap();

        assert!(form.is_submitted());
        assert!(form.data_reason().track_var_found);
        let values = form.values();
        assert_eq!(values.get("name"), Some(&Value::from("Ann")));
        assert!(!values.contains_key("_qf__f1"));
    }

    #[test]
    fn test_other_form_submission_is_ignored() {
        let request = Request::post().body_param("_qf__other", "").body_param("name", "Ann");
        let form = Form::builder().id("f1").request(request).build().unwrap();
        assert!(!form.is_submitted());
    }

    #[test]
    fn test_untracked_get_form() {
        let request = Request::get().query_param("q", "rust");
        let mut form = Form::builder()
            .id("search")
            .method("GET")
            .track_submit(false)
            .request(request)
            .build()
            .unwrap();
        let q = form.add(form.root(), NodeDef::text("q")).unwrap();
        assert!(form.is_submitted());
        assert!(form.data_reason().get_not_empty);
        assert_eq!(form.value(q), Some(Value::from("rust")));
    }

    #[test]
    fn test_missing_id_disables_tracking() {
        let form = Form::builder().track_submit(true).build().unwrap();
        assert!(!form.tracks_submit());
        assert!(!form.form_id().is_empty());
    }

    #[test]
    fn test_submit_manually_replaces_sources() {
        let mut form = Form::builder().id("f").build().unwrap();
        let name = form.add(form.root(), NodeDef::text("name")).unwrap();
        form.add_data_source(ArrayDataSource::new(json!({"name": "default"})));
        assert_eq!(form.value(name), Some(Value::from("default")));
        assert!(!form.is_submitted());

        form.submit_manually(ArrayDataSource::submitted(json!({"name": "sent"})));
        assert!(form.is_submitted());
        assert!(form.data_reason().manual_submit);
        assert_eq!(form.data_sources().len(), 1);
        assert_eq!(form.value(name), Some(Value::from("sent")));
    }

    #[test]
    fn test_observers() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let seen = Arc::new(AtomicUsize::new(0));
        let mut form = Form::builder().id("f").build().unwrap();
        let counter = Arc::clone(&seen);
        let handle = form.on_node_added(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        form.add(form.root(), NodeDef::text("a")).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        // Detached subtrees do not notify until attached to the form.
        let fieldset = form.create(NodeDef::fieldset()).unwrap();
        form.add(fieldset, NodeDef::text("b")).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        form.append_child(form.root(), fieldset).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        assert!(form.remove_observer(handle));
        assert!(!form.remove_observer(handle));
        form.add(form.root(), NodeDef::text("c")).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
