//! # oxide-formtree
//!
//! Server-side HTML form trees with data binding and composable validation.
//!
//! This crate provides:
//! - A [`Form`] owning a tree of elements, fieldsets, groups and repeats
//! - Value binding from ordered data sources (request payload, defaults)
//! - Value aggregation into nested maps following `a[b][]` naming
//! - Validation rules chained with `and_`/`or_`, run on the server and
//!   exported to the browser
//! - A [`Renderer`] visitor; concrete renderers live in
//!   `oxide-formtree-render`
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_formtree::{ArrayDataSource, Form, NodeDef, Rule, Value};
//! use serde_json::json;
//!
//! let mut form = Form::builder().id("signup").build()?;
//! let name = form.add(form.root(), NodeDef::text("name").label("Name"))?;
//! form.add_rule(name, Rule::required("Please enter your name")?)?;
//!
//! // Data normally comes from the request the form was built with.
//! form.submit_manually(ArrayDataSource::submitted(json!({"name": "Ann"})));
//!
//! assert!(form.validate());
//! assert_eq!(form.values().get("name"), Some(&Value::from("Ann")));
//! # Ok::<(), oxide_formtree::FormError>(())
//! ```
//!
//! ## Groups and repeats
//!
//! ```rust
//! use oxide_formtree::{ArrayDataSource, Form, NodeDef, Value};
//! use serde_json::json;
//!
//! let mut form = Form::builder().id("order").track_submit(false).build()?;
//! form.add_data_source(ArrayDataSource::new(json!({
//!     "address": {"city": "Oslo"},
//!     "item": {"0": "pen", "1": "ink"},
//! })));
//! let address = form.add(form.root(), NodeDef::group("address"))?;
//! let city = form.add(address, NodeDef::text("city"))?;
//! assert_eq!(form.name(city), Some("address[city]"));
//!
//! form.add(form.root(), NodeDef::repeat(NodeDef::fieldset().child(NodeDef::text("item"))))?;
//!
//! let values = form.values();
//! assert_eq!(values.get_path("address[city]"), Some(&Value::from("Oslo")));
//! assert_eq!(values.get_path("item[1]"), Some(&Value::from("ink")));
//! # Ok::<(), oxide_formtree::FormError>(())
//! ```

mod attributes;
mod container;
pub mod datasource;
mod definition;
mod elements;
mod error;
mod form;
pub mod ids;
mod node;
pub mod registry;
pub mod render;
pub mod request;
pub mod rules;
pub mod value;
mod view;

pub use attributes::{AttrWrite, Attributes};
pub use datasource::{ArrayDataSource, DataSource, SubmitDataSource};
pub use definition::NodeDef;
pub use elements::{upload_error_message, CustomElement, FileState, SelectOption};
pub use error::{FormError, Result};
pub use form::{
    DataReason, Form, FormBuilder, ObserverHandle, INTERNAL_PREFIX, TRACK_ID_PREFIX,
    TRACK_VAR_PREFIX,
};
pub use ids::{IdAllocator, IdOptions, SharedIds};
pub use node::{ButtonType, Filter, InputType, NodeKey, NodeKind, ScalarFilter};
pub use registry::Registry;
pub use render::{ClientRule, JavascriptBuilder, Renderer};
pub use request::{Method, Request, UploadedFile};
pub use rules::{CompareOp, Operand, Rule, RuleId, RunMode};
pub use value::{Key, Value, ValueMap};
pub use view::NodeView;
