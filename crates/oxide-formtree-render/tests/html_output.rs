//! End-to-end rendering of validated forms.

use oxide_formtree::{ArrayDataSource, Form, NodeDef, Rule};
use oxide_formtree_render::{ArrayRenderer, DefaultRenderer, RenderOptions, StubRenderer};
use serde_json::json;

fn submitted(id: &str, data: serde_json::Value) -> Form {
    let mut form = Form::builder()
        .id(id)
        .track_submit(false)
        .build()
        .unwrap_or_else(|e| panic!("Failed to build form {id}: {e}"));
    form.submit_manually(ArrayDataSource::submitted(data));
    form
}

#[test]
fn test_repeat_renders_every_index() {
    let mut form = submitted("items", json!({"title": ["Pen", ""]}));
    let root = form.root();
    form.add(
        root,
        NodeDef::repeat(NodeDef::fieldset().child(NodeDef::text("title").id("title").label("Title"))),
    )
    .unwrap();
    let title = form.get_element_by_id("title").unwrap();
    form.add_rule(title, Rule::required("Title needed").unwrap())
        .unwrap();
    assert!(!form.validate());

    let mut renderer = DefaultRenderer::new();
    form.render(&mut renderer);
    let html = renderer.html();
    assert!(html.contains(r#"name="title[0]""#));
    assert!(html.contains(r#"name="title[1]""#));
    assert!(html.contains(r#"value="Pen""#));
    assert_eq!(html.matches("Title needed").count(), 1);
    assert!(html.find(r#"name="title[0]""#) < html.find("Title needed"));
}

#[test]
fn test_frozen_form_shows_values_as_text() {
    let mut form = submitted(
        "frozen",
        json!({"name": "Ann <admin>", "color": "g", "agree": "1"}),
    );
    let root = form.root();
    let name = form.add(root, NodeDef::text("name")).unwrap();
    let color = form
        .add(
            root,
            NodeDef::select("color").options([("r", "Red"), ("g", "Green")]),
        )
        .unwrap();
    let agree = form.add(root, NodeDef::checkbox("agree")).unwrap();
    for key in [name, color, agree] {
        form.toggle_frozen(key, Some(true)).unwrap();
    }
    form.persistent_freeze(color, Some(true)).unwrap();

    let mut renderer = DefaultRenderer::new();
    form.render(&mut renderer);
    let html = renderer.html();
    assert!(html.contains("Ann &lt;admin&gt;"));
    assert!(!html.contains(r#"<input type="text""#));
    assert!(html.contains("Green"));
    assert!(!html.contains("<select"));
    assert!(html.contains(r#"<input type="hidden" name="color" value="g""#));
    assert!(!html.contains(r#"name="name" value"#));
    assert!(html.contains("[x]"));
}

#[test]
fn test_required_note_only_with_required_elements() {
    let mut form = submitted("note", json!({}));
    let root = form.root();
    let a = form.add(root, NodeDef::text("a")).unwrap();

    let mut renderer = DefaultRenderer::new();
    form.render(&mut renderer);
    assert!(!renderer.html().contains("reqnote"));

    form.add_rule(a, Rule::required("Needed").unwrap()).unwrap();
    form.render(&mut renderer);
    assert!(renderer.html().contains(r#"<div class="reqnote">"#));
    assert!(renderer.html().contains(r#"<span class="required">*</span>"#));

    let mut quiet = DefaultRenderer::with_options(RenderOptions::new().required_note(""));
    form.render(&mut quiet);
    assert!(!quiet.html().contains("reqnote"));
}

#[test]
fn test_renderers_agree_on_errors() {
    let mut form = submitted("agree", json!({"user": {"email": "x"}}));
    let root = form.root();
    let user = form.add(root, NodeDef::group("user")).unwrap();
    let email = form.add(user, NodeDef::email("email").id("email")).unwrap();
    form.add_rule(email, Rule::email("Bad email")).unwrap();
    assert!(!form.validate());

    let mut stub = StubRenderer::new();
    form.render(&mut stub);
    assert_eq!(stub.errors(), &[("email".to_string(), "Bad email".to_string())]);

    let mut array = ArrayRenderer::new().group_errors(true);
    form.render(&mut array);
    assert_eq!(
        array.array().errors.get("email").map(String::as_str),
        Some("Bad email")
    );

    let mut html = DefaultRenderer::new();
    form.render(&mut html);
    assert!(html.html().contains(r#"name="user[email]""#));
    assert!(html.html().contains("Bad email"));
}
