//! HTML renderer delegating element markup to closures.

use std::collections::HashMap;
use std::fmt;

use oxide_formtree::{JavascriptBuilder, NodeView, Renderer};

use crate::default::{kind_name, DefaultRenderer};
use crate::options::RenderOptions;

/// Produces the whole block of one element.
pub type ElementCallback = Box<dyn Fn(&NodeView<'_>) -> String + Send + Sync>;

/// A [`DefaultRenderer`] whose element blocks can be produced by closures.
///
/// A callback is looked up by element id, then by kind; elements without one
/// fall back to the templates. Containers, hidden fields and the form itself
/// always use templates.
#[derive(Default)]
pub struct CallbackRenderer {
    inner: DefaultRenderer,
    by_id: HashMap<String, ElementCallback>,
    by_kind: HashMap<String, ElementCallback>,
    fallback: Option<ElementCallback>,
}

impl fmt::Debug for CallbackRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRenderer")
            .field("inner", &self.inner)
            .field("ids", &self.by_id.keys().collect::<Vec<_>>())
            .field("kinds", &self.by_kind.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl CallbackRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            inner: DefaultRenderer::with_options(options),
            ..Self::default()
        }
    }

    /// Renders the element with this id through `callback`.
    #[must_use]
    pub fn for_id(
        mut self,
        id: impl Into<String>,
        callback: impl Fn(&NodeView<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.by_id.insert(id.into(), Box::new(callback));
        self
    }

    /// Renders elements of this kind (`"text"`, `"select"`, ...) through
    /// `callback`.
    #[must_use]
    pub fn for_kind(
        mut self,
        kind: impl Into<String>,
        callback: impl Fn(&NodeView<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.by_kind.insert(kind.into(), Box::new(callback));
        self
    }

    /// Renders every other element through `callback` instead of templates.
    #[must_use]
    pub fn fallback(
        mut self,
        callback: impl Fn(&NodeView<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.fallback = Some(Box::new(callback));
        self
    }

    pub fn html(&self) -> &str {
        self.inner.html()
    }

    pub fn into_html(self) -> String {
        self.inner.into_html()
    }
}

impl Renderer for CallbackRenderer {
    fn start_form(&mut self, form: &NodeView<'_>) {
        self.inner.start_form(form);
    }

    fn finish_form(&mut self, form: &NodeView<'_>) {
        self.inner.finish_form(form);
    }

    fn start_container(&mut self, container: &NodeView<'_>) {
        self.inner.start_container(container);
    }

    fn finish_container(&mut self, container: &NodeView<'_>) {
        self.inner.finish_container(container);
    }

    fn start_group(&mut self, group: &NodeView<'_>) {
        self.inner.start_group(group);
    }

    fn finish_group(&mut self, group: &NodeView<'_>) {
        self.inner.finish_group(group);
    }

    fn render_element(&mut self, element: &NodeView<'_>) {
        let callback = self
            .by_id
            .get(element.id())
            .or_else(|| self.by_kind.get(kind_name(element)))
            .or(self.fallback.as_ref());
        match callback {
            Some(callback) => {
                let block = callback(element);
                // Errors still reach the grouped list and the required note.
                let _ = self.inner.track(element);
                self.inner.push_block(block);
            }
            None => self.inner.render_element(element),
        }
    }

    fn render_hidden(&mut self, element: &NodeView<'_>) {
        self.inner.render_hidden(element);
    }

    fn javascript_builder(&mut self) -> Option<&mut JavascriptBuilder> {
        self.inner.javascript_builder()
    }
}

impl fmt::Display for CallbackRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::element_html;
    use oxide_formtree::{Form, NodeDef};

    #[test]
    fn test_callbacks_by_id_kind_and_fallback() {
        let mut form = Form::builder().id("cb").track_submit(false).build().unwrap();
        let root = form.root();
        form.add(root, NodeDef::text("a").id("a")).unwrap();
        form.add(root, NodeDef::text("b").id("b")).unwrap();
        form.add(root, NodeDef::textarea("c").id("c")).unwrap();

        let mut renderer = CallbackRenderer::new()
            .for_id("a", |view| format!("<i>{}</i>", view.id()))
            .for_kind("text", |view| format!("<u>{}</u>", element_html(view)));
        form.render(&mut renderer);
        let html = renderer.html();
        assert!(html.contains("<i>a</i>"));
        assert!(html.contains("<u><input"));
        assert!(html.contains("<textarea"));
        assert!(html.contains(r#"class="row""#));

        let mut renderer = CallbackRenderer::new().fallback(|view| format!("[{}]", view.id()));
        form.render(&mut renderer);
        assert!(renderer.html().contains("[a]"));
        assert!(renderer.html().contains("[c]"));
    }
}
