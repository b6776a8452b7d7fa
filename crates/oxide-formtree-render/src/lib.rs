//! # oxide-formtree-render
//!
//! Renderers for [`oxide_formtree`] forms.
//!
//! This crate provides:
//! - [`DefaultRenderer`]: HTML through per-id and per-kind templates
//! - [`CallbackRenderer`]: HTML with element blocks produced by closures
//! - [`ArrayRenderer`]: a serializable structure, also available as JSON
//! - [`StubRenderer`]: errors, hidden fields and the required flag only
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_formtree::{ArrayDataSource, Form, NodeDef, Rule};
//! use oxide_formtree_render::{DefaultRenderer, RenderOptions};
//! use serde_json::json;
//!
//! let mut form = Form::builder().id("contact").build().unwrap();
//! form.submit_manually(ArrayDataSource::submitted(json!({"email": "nope"})));
//! let root = form.root();
//! let email = form
//!     .add(root, NodeDef::email("email").label("Email"))
//!     .unwrap();
//! form.add_rule(email, Rule::email("Invalid address")).unwrap();
//! assert!(!form.validate());
//!
//! let mut renderer = DefaultRenderer::with_options(RenderOptions::new().group_errors(true));
//! form.render(&mut renderer);
//! assert!(renderer.html().contains("Invalid address"));
//! assert!(renderer.html().contains(r#"value="nope""#));
//! ```
//!
//! ## Templates
//!
//! Templates use `{id}`, `{label}`, `{element}`, `{error}` placeholders for
//! elements and `{content}` for containers. Sections wrapped in
//! `<qf:label>`, `<qf:error>` and `<qf:required>` are dropped when the node
//! has no label, no error or is not required.

mod array;
mod callback;
mod default;
mod error;
mod options;
mod stub;
mod template;
pub mod widgets;

pub use array::{ArrayRenderer, ElementArray, FormArray};
pub use callback::{CallbackRenderer, ElementCallback};
pub use default::DefaultRenderer;
pub use error::{RenderError, Result};
pub use options::RenderOptions;
pub use stub::StubRenderer;
