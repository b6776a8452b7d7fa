//! HTML markup of single elements.
//!
//! Widgets read everything from a [`NodeView`]: attributes are emitted in
//! the order they were set, values come from the element state. Frozen
//! elements render their value as text, followed by hidden inputs carrying
//! the value when the freeze is persistent.

use ironhtml::typed::Element;
use ironhtml_elements::Code;

use oxide_formtree::{ButtonType, InputType, NodeKind, NodeView, SelectOption};

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders attributes as ` key="value"` pairs.
pub fn attributes_html<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    attrs
        .into_iter()
        .map(|(k, v)| format!(r#" {k}="{}""#, html_escape(v)))
        .collect()
}

/// Markup of an element, honouring its frozen state.
///
/// Containers have no markup of their own here; their templates wrap the
/// markup of their children.
pub fn element_html(view: &NodeView<'_>) -> String {
    if view.is_frozen() {
        return frozen_html(view);
    }
    let attrs = attributes_html(view.attributes().iter());
    match view.kind() {
        NodeKind::Input(_)
        | NodeKind::Checkbox
        | NodeKind::Radio
        | NodeKind::File
        | NodeKind::Button(ButtonType::Submit | ButtonType::Reset | ButtonType::InputButton) => {
            format!("<input{attrs} />")
        }
        // Button and static content is markup.
        NodeKind::Button(ButtonType::Button) => {
            format!("<button{attrs}>{}</button>", view.content().unwrap_or_default())
        }
        NodeKind::Static => static_html(view),
        NodeKind::Textarea => format!(
            "<textarea{attrs}>{}</textarea>",
            html_escape(view.text_value().unwrap_or_default())
        ),
        NodeKind::Select => {
            let options: String = view
                .options()
                .iter()
                .map(|option| option_html(view, option))
                .collect();
            format!("<select{attrs}>{options}</select>")
        }
        NodeKind::Custom => view.custom_html().unwrap_or_default(),
        NodeKind::Form | NodeKind::Fieldset | NodeKind::Group | NodeKind::Repeat => String::new(),
    }
}

fn static_html(view: &NodeView<'_>) -> String {
    let content = view.content().unwrap_or_default();
    match view.tag() {
        Some(tag) => {
            let attrs = attributes_html(view.attributes().iter().filter(|(k, _)| *k != "name"));
            format!("<{tag}{attrs}>{content}</{tag}>")
        }
        None => content.to_string(),
    }
}

fn option_html(view: &NodeView<'_>, option: &SelectOption) -> String {
    match option {
        SelectOption::Item {
            text,
            value,
            attributes,
        } => {
            let selected = if view.is_selected(value) {
                r#" selected="selected""#
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{selected}{}>{}</option>"#,
                html_escape(value),
                attributes_html(attributes.iter()),
                html_escape(text)
            )
        }
        SelectOption::Group {
            label,
            attributes,
            options,
        } => {
            let inner: String = options.iter().map(|o| option_html(view, o)).collect();
            format!(
                r#"<optgroup label="{}"{}>{inner}</optgroup>"#,
                html_escape(label),
                attributes_html(attributes.iter())
            )
        }
    }
}

/// Markup of a frozen element.
pub fn frozen_html(view: &NodeView<'_>) -> String {
    let text = match view.kind() {
        NodeKind::Checkbox => {
            let mark = if view.is_checked() { "[x]" } else { "[ ]" };
            Element::<Code>::new().text(mark).render()
        }
        NodeKind::Radio => {
            let mark = if view.is_checked() { "(x)" } else { "( )" };
            Element::<Code>::new().text(mark).render()
        }
        NodeKind::Select => selected_texts(view, view.options()).join("<br />"),
        NodeKind::Textarea => html_escape(view.text_value().unwrap_or_default())
            .replace('\n', "<br />"),
        NodeKind::Input(InputType::Password) => {
            if view.raw_value().is_some_and(|v| !v.is_empty()) {
                "********".to_string()
            } else {
                "&nbsp;".to_string()
            }
        }
        NodeKind::Custom => view.custom_html().unwrap_or_default(),
        _ => match view.raw_value() {
            Some(value) if !value.is_empty() => html_escape(&value.to_string()),
            _ => "&nbsp;".to_string(),
        },
    };
    if view.is_persistent_freeze() {
        format!("{text}{}", persistent_hidden(view))
    } else {
        text
    }
}

fn selected_texts(view: &NodeView<'_>, options: &[SelectOption]) -> Vec<String> {
    let mut texts = Vec::new();
    for option in options {
        match option {
            SelectOption::Item { text, value, .. } if view.is_selected(value) => {
                texts.push(html_escape(text));
            }
            SelectOption::Item { .. } => {}
            SelectOption::Group { options, .. } => texts.extend(selected_texts(view, options)),
        }
    }
    texts
}

/// Hidden inputs carrying a frozen element's value.
fn persistent_hidden(view: &NodeView<'_>) -> String {
    let (Some(name), Some(value)) = (view.name(), view.raw_value()) else {
        return String::new();
    };
    value
        .scalars()
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let id = if i == 0 {
                format!(r#" id="{}""#, html_escape(view.id()))
            } else {
                String::new()
            };
            format!(
                r#"<input type="hidden" name="{}" value="{}"{id} />"#,
                html_escape(name),
                html_escape(v)
            )
        })
        .collect()
}
