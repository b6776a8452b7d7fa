use tracing::{debug, info};

use super::{strip_internal, DataReason, Form, TRACK_ID_PREFIX};
use crate::attributes::Attributes;
use crate::container::ContainerState;
use crate::datasource::SubmitDataSource;
use crate::definition::NodeDef;
use crate::elements;
use crate::error::Result;
use crate::ids::{IdAllocator, IdOptions, IdSource, SharedIds};
use crate::node::{Filter, NodeData, NodeKey, NodeKind, Payload};
use crate::request::{Method, Request};

/// Configures and creates a [`Form`].
#[derive(Debug, Clone)]
pub struct FormBuilder {
    id: Option<String>,
    method: Method,
    action: String,
    attributes: Vec<(String, String)>,
    track_submit: bool,
    request: Option<Request>,
    ids: IdSource,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    /// Creates a builder for a POST form with submit tracking.
    pub fn new() -> Self {
        Self {
            id: None,
            method: Method::Post,
            action: String::new(),
            attributes: Vec::new(),
            track_submit: true,
            request: None,
            ids: IdSource::default(),
        }
    }

    /// Sets the form id. Without an id, submit tracking is disabled.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the method; anything other than `get` means POST.
    #[must_use]
    pub fn method(mut self, method: &str) -> Self {
        self.method = Method::parse(method);
        self
    }

    /// Sets the action URL.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Adds an attribute to the form element.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Enables or disables recognising submissions by the tracking field.
    #[must_use]
    pub fn track_submit(mut self, track: bool) -> Self {
        self.track_submit = track;
        self
    }

    /// The request that triggered this form's construction.
    #[must_use]
    pub fn request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Uses a private id allocator with these options.
    #[must_use]
    pub fn id_options(mut self, options: IdOptions) -> Self {
        self.ids = IdSource::Owned(IdAllocator::with_options(options));
        self
    }

    /// Draws ids from an allocator shared with other forms.
    #[must_use]
    pub fn shared_ids(mut self, ids: SharedIds) -> Self {
        self.ids = IdSource::Shared(ids);
        self
    }

    /// Creates the form, detecting whether the request submitted it.
    pub fn build(self) -> Result<Form> {
        let Self {
            id,
            method,
            action,
            attributes,
            track_submit,
            request,
            mut ids,
        } = self;
        let track_submit = track_submit && id.is_some();
        let id = match id {
            Some(id) => {
                ids.reserve(&id)?;
                id
            }
            None => ids.generate(""),
        };

        let mut attrs = Attributes::watching(elements::watched_attributes(NodeKind::Form));
        for (key, value) in attributes {
            attrs.insert_raw(&key, value);
        }
        attrs.insert_raw("id", id.as_str());
        attrs.insert_raw("method", method.as_str());
        attrs.insert_raw("action", action);
        let mut root = NodeData::new(NodeKind::Form, attrs, Payload::Container(ContainerState::new()));
        root.filters.push(Filter::new(strip_internal));

        let mut form = Form {
            nodes: vec![root],
            root: NodeKey(0),
            method,
            ids,
            datasources: Vec::new(),
            track_submit,
            reason: DataReason::default(),
            observers: Vec::new(),
            next_observer: 0,
            next_rule: 0,
        };

        let track_var = form.track_var_name();
        if let Some(request) = request {
            let payload = request.payload(method);
            form.reason = DataReason {
                track_var_found: payload.contains_key(track_var.as_str()),
                get_not_empty: method == Method::Get && !request.query.is_empty(),
                post_not_empty: method == Method::Post
                    && (!request.body.is_empty() || !request.files.is_empty()),
                manual_submit: false,
            };
            let submitted = if track_submit {
                form.reason.track_var_found
            } else {
                form.reason.get_not_empty || form.reason.post_not_empty
            };
            if submitted {
                info!(form_id = %id, %method, "form submission detected");
                form.datasources.push(Box::new(SubmitDataSource::new(&request, method)));
            } else {
                debug!(form_id = %id, reason = ?form.reason, "request does not submit this form");
            }
        }

        if track_submit {
            let tracker = NodeDef::hidden(track_var)
                .id(format!("{TRACK_ID_PREFIX}{id}"))
                .value("");
            form.add(form.root, tracker)?;
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;

    #[test]
    fn test_method_defaults_to_post() {
        let form = Form::builder().id("a").method("PUT").build().unwrap();
        assert_eq!(form.method(), Method::Post);
        let form = Form::builder().id("b").method("get").build().unwrap();
        assert_eq!(form.method(), Method::Get);
        assert_eq!(form.attribute(form.root(), "method"), Some("get"));
    }

    #[test]
    fn test_invalid_form_id() {
        let err = Form::builder().id("my form").build().unwrap_err();
        assert!(matches!(err, FormError::InvalidId(_)));
    }

    #[test]
    fn test_tracking_field_is_added() {
        let form = Form::builder().id("login").build().unwrap();
        let tracker = form.get_element_by_id("qf:login").unwrap();
        assert_eq!(form.name(tracker), Some("_qf__login"));
        assert!(form.values().is_empty());
    }
}
