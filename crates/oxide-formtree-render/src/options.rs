//! Configuration of the HTML renderer.

use std::collections::HashMap;

use crate::error::Result;
use crate::template;

/// Default template for elements outside groups.
pub const ELEMENT_TEMPLATE: &str = "<div class=\"row\">\
<p class=\"label\"><qf:required><span class=\"required\">*</span></qf:required>\
<qf:label><label for=\"{id}\">{label}</label></qf:label></p>\
<div class=\"element<qf:error> error</qf:error>\">\
<qf:error><span class=\"error\">{error}</span><br /></qf:error>{element}</div></div>";

/// Default template for elements inside a group.
pub const GROUP_ELEMENT_TEMPLATE: &str =
    "<qf:label><label for=\"{id}\">{label}</label></qf:label>{element}";

/// Default template for groups.
pub const GROUP_TEMPLATE: &str = "<div class=\"row\">\
<p class=\"label\"><qf:required><span class=\"required\">*</span></qf:required>\
<qf:label><label>{label}</label></qf:label></p>\
<div class=\"element group<qf:error> error</qf:error>\" id=\"{id}\">\
<qf:error><span class=\"error\">{error}</span><br /></qf:error>{content}</div></div>";

/// Default template for fieldsets.
pub const FIELDSET_TEMPLATE: &str = "<fieldset id=\"{id}\">\
<qf:label><legend id=\"{id}-legend\">{label}</legend></qf:label>{content}</fieldset>";

/// Default template for repeats.
pub const REPEAT_TEMPLATE: &str =
    "<div class=\"repeat\" id=\"{id}\"><qf:label><p>{label}</p></qf:label>{content}</div>";

/// Default template for the form itself.
pub const FORM_TEMPLATE: &str = "<div class=\"quickform\">{errors}<form{attributes}>\
<div>{hidden}{content}</div></form>\
<qf:reqnote><div class=\"reqnote\">{reqnote}</div></qf:reqnote></div>{javascript}";

/// Options of [`DefaultRenderer`](crate::DefaultRenderer).
///
/// Templates are looked up by element id first, then by the element's kind
/// (`"text"`, `"select"`, `"group"`, ...), then fall back to the defaults
/// above.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Inserted between rendered blocks.
    pub line_break: String,
    /// Prefix repeated once per nesting level.
    pub indent: String,
    /// Show all errors in a list above the form instead of next to elements.
    pub group_errors: bool,
    /// Emit hidden elements together at the start of the form.
    pub group_hiddens: bool,
    /// Shown below a form with required elements; empty disables it.
    pub required_note: String,
    /// Heading of the grouped error list.
    pub errors_prefix: String,
    /// Text below the grouped error list.
    pub errors_suffix: String,
    by_id: HashMap<String, String>,
    by_kind: HashMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            line_break: "\n".to_string(),
            indent: String::new(),
            group_errors: false,
            group_hiddens: true,
            required_note: "<em>*</em> denotes required fields.".to_string(),
            errors_prefix: "Invalid information entered:".to_string(),
            errors_suffix: "Please correct these fields.".to_string(),
            by_id: HashMap::new(),
            by_kind: HashMap::new(),
        }
    }
}

impl RenderOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to group errors above the form.
    #[must_use]
    pub fn group_errors(mut self, group: bool) -> Self {
        self.group_errors = group;
        self
    }

    /// Builder method to collect hidden elements.
    #[must_use]
    pub fn group_hiddens(mut self, group: bool) -> Self {
        self.group_hiddens = group;
        self
    }

    /// Builder method to set the required note.
    #[must_use]
    pub fn required_note(mut self, note: impl Into<String>) -> Self {
        self.required_note = note.into();
        self
    }

    /// Builder method to set the line break.
    #[must_use]
    pub fn line_break(mut self, line_break: impl Into<String>) -> Self {
        self.line_break = line_break.into();
        self
    }

    /// Builder method to set the indent.
    #[must_use]
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Sets the template for one element id.
    pub fn set_template_for_id(
        &mut self,
        id: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<()> {
        let id = id.into();
        let template = template.into();
        template::check_sections(&template)?;
        self.by_id.insert(id, template);
        Ok(())
    }

    /// Sets the template for a kind of node.
    ///
    /// Container templates must contain `{content}`; element templates must
    /// contain `{element}`.
    pub fn set_template_for_kind(
        &mut self,
        kind: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<()> {
        let kind = kind.into();
        let template = template.into();
        template::check(&kind, &template, required_placeholder(&kind))?;
        self.by_kind.insert(kind, template);
        Ok(())
    }

    pub(crate) fn template(&self, id: &str, kind: &str, in_group: bool) -> &str {
        if let Some(template) = self.by_id.get(id).or_else(|| self.by_kind.get(kind)) {
            return template;
        }
        match kind {
            "form" => FORM_TEMPLATE,
            "fieldset" => FIELDSET_TEMPLATE,
            "group" => GROUP_TEMPLATE,
            "repeat" => REPEAT_TEMPLATE,
            _ if in_group => GROUP_ELEMENT_TEMPLATE,
            _ => ELEMENT_TEMPLATE,
        }
    }
}

fn required_placeholder(kind: &str) -> &'static str {
    match kind {
        "form" | "fieldset" | "group" | "repeat" => "{content}",
        _ => "{element}",
    }
}
