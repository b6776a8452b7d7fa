//! Template-based HTML renderer.

use std::fmt;

use ironhtml::typed::Element;
use ironhtml_elements::{Div, Li, Script, Ul, P};
use tracing::debug;

use oxide_formtree::{JavascriptBuilder, NodeKind, NodeView, Renderer};

use crate::options::RenderOptions;
use crate::template;
use crate::widgets::{attributes_html, element_html, html_escape};

/// Renders a form to HTML through string templates.
///
/// Every element is rendered with the template found for its id or kind
/// (see [`RenderOptions`]); containers wrap the blocks of their children.
/// The result is available once [`Renderer::finish_form`] ran.
///
/// ```
/// use oxide_formtree::{Form, NodeDef, Rule};
/// use oxide_formtree_render::DefaultRenderer;
///
/// let mut form = Form::builder().id("login").build().unwrap();
/// let root = form.root();
/// let user = form.add(root, NodeDef::text("user").label("User")).unwrap();
/// form.add_rule(user, Rule::required("Enter a user").unwrap()).unwrap();
///
/// let mut renderer = DefaultRenderer::new();
/// form.render(&mut renderer);
/// let html = renderer.html();
/// assert!(html.contains(r#"<label for="user">User</label>"#));
/// assert!(html.contains("denotes required fields"));
/// ```
#[derive(Debug, Default)]
pub struct DefaultRenderer {
    options: RenderOptions,
    stack: Vec<Vec<String>>,
    /// Errors of elements inside each open group whose template has no
    /// `{error}` slot; shown by the group.
    group_stack: Vec<Vec<String>>,
    hidden: Vec<String>,
    errors: Vec<String>,
    has_required: bool,
    javascript: JavascriptBuilder,
    html: String,
}

impl DefaultRenderer {
    /// Creates a renderer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer with the given options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Mutable access to the options, applied from the next render on.
    pub fn options_mut(&mut self) -> &mut RenderOptions {
        &mut self.options
    }

    /// The markup of the last rendered form.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Consumes the renderer, returning the markup of the last rendered form.
    pub fn into_html(self) -> String {
        self.html
    }

    /// Client rules collected during the last render.
    pub fn javascript(&self) -> &JavascriptBuilder {
        &self.javascript
    }

    /// Records the required flag and error of a node, returning the error to
    /// show next to it.
    pub(crate) fn track<'a>(&mut self, view: &NodeView<'a>) -> Option<&'a str> {
        if view.is_required() && !view.is_frozen() {
            self.has_required = true;
        }
        let error = view.error()?;
        if self.options.group_errors {
            self.errors.push(html_escape(error));
            None
        } else {
            Some(error)
        }
    }

    /// Keeps an error whose template cannot show it: the enclosing group
    /// shows it, or the list above the form when there is none.
    fn defer_error(&mut self, message: String) {
        match self.group_stack.last_mut() {
            Some(collected) => collected.push(message),
            None => self.errors.push(message),
        }
    }

    pub(crate) fn push_block(&mut self, block: String) {
        match self.stack.last_mut() {
            Some(blocks) => blocks.push(block),
            None => self.stack.push(vec![block]),
        }
    }

    fn element_block(&mut self, view: &NodeView<'_>) -> String {
        let mut error = self.track(view).map(html_escape);
        let kind = kind_name(view);
        let template = self
            .options
            .template(view.id(), kind, !self.group_stack.is_empty())
            .to_string();
        if !template.contains("{error}") {
            if let Some(message) = error.take() {
                self.defer_error(message);
            }
        }
        let label = view.label().map(html_escape);
        let element = element_html(view);
        let id = html_escape(view.id());
        template::fill(
            &template,
            &[
                ("label", label.is_some()),
                ("error", error.is_some()),
                ("required", view.is_required() && !view.is_frozen()),
            ],
            &[
                ("id", id.as_str()),
                ("label", label.as_deref().unwrap_or_default()),
                ("element", element.as_str()),
                ("error", error.as_deref().unwrap_or_default()),
            ],
        )
    }

    fn join_blocks(&self, blocks: &[String]) -> String {
        let indent = self.options.indent.repeat(self.stack.len());
        blocks
            .iter()
            .map(|block| format!("{indent}{block}"))
            .collect::<Vec<_>>()
            .join(&self.options.line_break)
    }

    /// Wraps the blocks of a finished container. `collected` holds errors
    /// of grouped elements, shown after the container's own error.
    fn close_container(&mut self, view: &NodeView<'_>, collected: Vec<String>) {
        let blocks = self.stack.pop().unwrap_or_default();
        let content = self.join_blocks(&blocks);
        let template = self
            .options
            .template(view.id(), kind_name(view), false)
            .to_string();
        let messages: Vec<String> = self
            .track(view)
            .map(html_escape)
            .into_iter()
            .chain(collected)
            .collect();
        let error = if messages.is_empty() {
            None
        } else if template.contains("{error}") {
            Some(messages.join("<br />"))
        } else {
            for message in messages {
                self.defer_error(message);
            }
            None
        };
        let label = view.label().map(html_escape);
        let id = html_escape(view.id());
        let block = template::fill(
            &template,
            &[
                ("label", label.is_some()),
                ("error", error.is_some()),
                ("required", view.is_required()),
            ],
            &[
                ("id", id.as_str()),
                ("label", label.as_deref().unwrap_or_default()),
                ("content", content.as_str()),
                ("error", error.as_deref().unwrap_or_default()),
            ],
        );
        self.push_block(block);
    }

    fn errors_html(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        Element::<Div>::new()
            .class("errors")
            .child::<P, _>(|p| p.text(&self.options.errors_prefix))
            .child::<Ul, _>(|ul| {
                ul.children(self.errors.iter(), |error, li: Element<Li>| li.raw(error))
            })
            .when(!self.options.errors_suffix.is_empty(), |d| {
                d.child::<P, _>(|p| p.text(&self.options.errors_suffix))
            })
            .render()
    }

    fn script_html(&self) -> String {
        if self.javascript.is_empty() {
            return String::new();
        }
        let id = self.javascript.form_id().replace('\\', "\\\\").replace('"', "\\\"");
        let json = self.javascript.to_json().to_string().replace("</", "<\\/");
        let code = format!(
            "window.formtreeRules = window.formtreeRules || {{}};\
             window.formtreeRules[\"{id}\"] = {json};"
        );
        Element::<Script>::new()
            .attr("type", "text/javascript")
            .raw(&code)
            .render()
    }
}

impl Renderer for DefaultRenderer {
    fn start_form(&mut self, _form: &NodeView<'_>) {
        self.stack = vec![Vec::new()];
        self.group_stack.clear();
        self.hidden.clear();
        self.errors.clear();
        self.has_required = false;
        self.javascript = JavascriptBuilder::new();
        self.html.clear();
    }

    fn finish_form(&mut self, form: &NodeView<'_>) {
        if let Some(error) = form.error() {
            self.errors.insert(0, html_escape(error));
        }
        let blocks = self.stack.pop().unwrap_or_default();
        let content = self.join_blocks(&blocks);
        let hidden = self.hidden.join(&self.options.line_break);
        let attributes = attributes_html(form.attributes().iter());
        let errors = self.errors_html();
        let javascript = self.script_html();
        let show_note = self.has_required && !self.options.required_note.is_empty();
        self.html = template::fill(
            self.options.template(form.id(), "form", false),
            &[("reqnote", show_note)],
            &[
                ("attributes", attributes.as_str()),
                ("errors", errors.as_str()),
                ("hidden", hidden.as_str()),
                ("content", content.as_str()),
                ("reqnote", self.options.required_note.as_str()),
                ("javascript", javascript.as_str()),
            ],
        );
        debug!(form_id = %form.id(), bytes = self.html.len(), "rendered form html");
    }

    fn start_container(&mut self, _container: &NodeView<'_>) {
        self.stack.push(Vec::new());
    }

    fn finish_container(&mut self, container: &NodeView<'_>) {
        self.close_container(container, Vec::new());
    }

    fn start_group(&mut self, _group: &NodeView<'_>) {
        self.stack.push(Vec::new());
        self.group_stack.push(Vec::new());
    }

    fn finish_group(&mut self, group: &NodeView<'_>) {
        let collected = self.group_stack.pop().unwrap_or_default();
        self.close_container(group, collected);
    }

    fn render_element(&mut self, element: &NodeView<'_>) {
        let block = self.element_block(element);
        self.push_block(block);
    }

    fn render_hidden(&mut self, element: &NodeView<'_>) {
        let html = element_html(element);
        if self.options.group_hiddens {
            self.hidden.push(html);
        } else {
            self.push_block(html);
        }
    }

    fn javascript_builder(&mut self) -> Option<&mut JavascriptBuilder> {
        Some(&mut self.javascript)
    }
}

impl fmt::Display for DefaultRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

/// Template lookup key of a node: custom elements use their own type name.
pub(crate) fn kind_name<'a>(view: &NodeView<'a>) -> &'a str {
    match view.kind() {
        NodeKind::Custom => view.custom_type().unwrap_or("custom"),
        kind => kind.type_name(),
    }
}
