//! Declarative node definitions.
//!
//! A [`NodeDef`] describes a node (and, for containers, its children) before
//! it exists; [`Form::create`](crate::Form::create) turns it into arena nodes.

use crate::elements::{CustomElement, SelectOption};
use crate::node::{ButtonType, InputType, NodeKind};
use crate::value::Value;

/// Kind-specific configuration of a definition.
#[derive(Debug)]
pub(crate) enum DefKind {
    Input(InputType),
    Textarea,
    Checkbox,
    Radio,
    Select {
        options: Vec<SelectOption>,
        intrinsic_validation: bool,
    },
    Button {
        kind: ButtonType,
        content: Option<String>,
    },
    Static {
        content: Option<String>,
        tag: Option<String>,
    },
    File {
        messages: Vec<(u8, String)>,
    },
    Custom(Box<dyn CustomElement>),
    Fieldset,
    Group,
    Repeat {
        index_field: Option<String>,
        indexes: Vec<String>,
    },
}

/// Description of a node to create.
#[derive(Debug)]
pub struct NodeDef {
    pub(crate) shape: DefKind,
    pub(crate) name: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) label: Option<String>,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) value: Option<Value>,
    pub(crate) children: Vec<NodeDef>,
}

impl NodeDef {
    fn new(shape: DefKind, name: Option<String>) -> Self {
        Self {
            shape,
            name,
            id: None,
            label: None,
            attributes: Vec::new(),
            value: None,
            children: Vec::new(),
        }
    }

    /// An `<input>` of the given type.
    pub fn input(input_type: InputType, name: impl Into<String>) -> Self {
        Self::new(DefKind::Input(input_type), Some(name.into()))
    }

    /// A text input.
    pub fn text(name: impl Into<String>) -> Self {
        Self::input(InputType::Text, name)
    }

    /// A password input.
    pub fn password(name: impl Into<String>) -> Self {
        Self::input(InputType::Password, name)
    }

    /// An e-mail input.
    pub fn email(name: impl Into<String>) -> Self {
        Self::input(InputType::Email, name)
    }

    /// A hidden input.
    pub fn hidden(name: impl Into<String>) -> Self {
        Self::input(InputType::Hidden, name)
    }

    /// A `<textarea>`.
    pub fn textarea(name: impl Into<String>) -> Self {
        Self::new(DefKind::Textarea, Some(name.into()))
    }

    /// A checkbox submitting `1` when checked.
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(DefKind::Checkbox, Some(name.into()))
    }

    /// A radio button submitting `value` when checked.
    pub fn radio(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(DefKind::Radio, Some(name.into())).attr("value", value)
    }

    /// A `<select>`.
    pub fn select(name: impl Into<String>) -> Self {
        Self::new(
            DefKind::Select {
                options: Vec::new(),
                intrinsic_validation: true,
            },
            Some(name.into()),
        )
    }

    /// A button of the given type.
    pub fn button_of(kind: ButtonType, name: impl Into<String>) -> Self {
        Self::new(
            DefKind::Button {
                kind,
                content: None,
            },
            Some(name.into()),
        )
    }

    /// A `<button>` element.
    pub fn button(name: impl Into<String>) -> Self {
        Self::button_of(ButtonType::Button, name)
    }

    /// A submit button.
    pub fn submit(name: impl Into<String>) -> Self {
        Self::button_of(ButtonType::Submit, name)
    }

    /// A reset button.
    pub fn reset(name: impl Into<String>) -> Self {
        Self::button_of(ButtonType::Reset, name)
    }

    /// Static content.
    pub fn static_content(content: impl Into<String>) -> Self {
        Self::new(
            DefKind::Static {
                content: Some(content.into()),
                tag: None,
            },
            None,
        )
    }

    /// A file upload.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(DefKind::File { messages: Vec::new() }, Some(name.into()))
    }

    /// An application-defined element.
    pub fn custom(name: impl Into<String>, element: impl CustomElement + 'static) -> Self {
        Self::new(DefKind::Custom(Box::new(element)), Some(name.into()))
    }

    /// A fieldset.
    pub fn fieldset() -> Self {
        Self::new(DefKind::Fieldset, None)
    }

    /// A group prefixing its children's names with `name`.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(DefKind::Group, Some(name.into()))
    }

    /// A group that does not affect its children's names.
    pub fn anonymous_group() -> Self {
        Self::new(DefKind::Group, None)
    }

    /// A repeat of `prototype`, typically a fieldset or a group.
    pub fn repeat(prototype: NodeDef) -> Self {
        Self::new(
            DefKind::Repeat {
                index_field: None,
                indexes: Vec::new(),
            },
            None,
        )
        .child(prototype)
    }

    /// The kind of node this definition creates.
    pub fn kind(&self) -> NodeKind {
        match &self.shape {
            DefKind::Input(t) => NodeKind::Input(*t),
            DefKind::Textarea => NodeKind::Textarea,
            DefKind::Checkbox => NodeKind::Checkbox,
            DefKind::Radio => NodeKind::Radio,
            DefKind::Select { .. } => NodeKind::Select,
            DefKind::Button { kind, .. } => NodeKind::Button(*kind),
            DefKind::Static { .. } => NodeKind::Static,
            DefKind::File { .. } => NodeKind::File,
            DefKind::Custom(_) => NodeKind::Custom,
            DefKind::Fieldset => NodeKind::Fieldset,
            DefKind::Group => NodeKind::Group,
            DefKind::Repeat { .. } => NodeKind::Repeat,
        }
    }

    /// The element name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Builder method to set an explicit id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method to set the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder method to add an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder method to disable the element.
    #[must_use]
    pub fn disabled(self) -> Self {
        self.attr("disabled", "disabled")
    }

    /// Builder method to set the initial value.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder method to add a child (containers only).
    #[must_use]
    pub fn child(mut self, child: NodeDef) -> Self {
        self.children.push(child);
        self
    }

    /// Builder method to add several children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = NodeDef>) -> Self {
        self.children.extend(children);
        self
    }

    /// Adds a child in place.
    pub fn push_child(&mut self, child: NodeDef) {
        self.children.push(child);
    }

    /// The prototype of a repeat definition.
    pub fn prototype_mut(&mut self) -> Option<&mut NodeDef> {
        match self.shape {
            DefKind::Repeat { .. } => self.children.first_mut(),
            _ => None,
        }
    }

    /// Builder method to add a select option.
    #[must_use]
    pub fn option(self, text: impl Into<String>, value: impl Into<String>) -> Self {
        self.select_option(SelectOption::item(text, value))
    }

    /// Builder method to add a prepared option or option group.
    #[must_use]
    pub fn select_option(mut self, option: SelectOption) -> Self {
        if let DefKind::Select { options, .. } = &mut self.shape {
            options.push(option);
        }
        self
    }

    /// Builder method to add `(value, text)` options.
    #[must_use]
    pub fn options<V, T, I>(self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, T)>,
        V: Into<String>,
        T: Into<String>,
    {
        options
            .into_iter()
            .fold(self, |def, (value, text)| def.option(text, value))
    }

    /// Builder method to allow several selected options.
    #[must_use]
    pub fn multiple(self) -> Self {
        self.attr("multiple", "multiple")
    }

    /// Builder method to accept submitted values that match no option.
    #[must_use]
    pub fn intrinsic_validation(mut self, enabled: bool) -> Self {
        if let DefKind::Select {
            intrinsic_validation,
            ..
        } = &mut self.shape
        {
            *intrinsic_validation = enabled;
        }
        self
    }

    /// Builder method to set button or static content.
    #[must_use]
    pub fn content(mut self, text: impl Into<String>) -> Self {
        match &mut self.shape {
            DefKind::Button { content, .. } | DefKind::Static { content, .. } => {
                *content = Some(text.into());
            }
            _ => {}
        }
        self
    }

    /// Builder method to wrap static content in a tag.
    #[must_use]
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        if let DefKind::Static { tag, .. } = &mut self.shape {
            *tag = Some(name.into());
        }
        self
    }

    /// Builder method to override the message of an upload error code.
    #[must_use]
    pub fn upload_message(mut self, code: u8, message: impl Into<String>) -> Self {
        if let DefKind::File { messages } = &mut self.shape {
            messages.push((code, message.into()));
        }
        self
    }

    /// Builder method to set the field whose submitted keys give the
    /// repeat indexes.
    #[must_use]
    pub fn index_field(mut self, field: impl Into<String>) -> Self {
        if let DefKind::Repeat { index_field, .. } = &mut self.shape {
            *index_field = Some(field.into());
        }
        self
    }

    /// Builder method to set the repeat indexes explicitly.
    #[must_use]
    pub fn indexes<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        if let DefKind::Repeat { indexes, .. } = &mut self.shape {
            *indexes = values.into_iter().map(Into::into).collect();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(NodeDef::text("a").kind(), NodeKind::Input(InputType::Text));
        assert_eq!(NodeDef::submit("go").kind(), NodeKind::Button(ButtonType::Submit));
        assert_eq!(NodeDef::repeat(NodeDef::fieldset()).kind(), NodeKind::Repeat);
        assert!(NodeDef::static_content("x").name().is_none());
    }

    #[test]
    fn test_options_builder() {
        let def = NodeDef::select("s").options([("1", "One"), ("2", "Two")]);
        match def.shape {
            DefKind::Select { options, .. } => assert_eq!(options.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
