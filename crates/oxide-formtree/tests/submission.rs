//! Tests for submission detection and request data.

mod common;
use common::*;

use oxide_formtree::{Form, NodeDef, Request, Rule, UploadedFile, Value};

#[test]
fn test_tracked_post_form_round_trip() {
    let request = Request::post()
        .body_param("_qf__f1", "")
        .body_param("name", "Ann");
    let mut form = Form::builder()
        .id("f1")
        .method("post")
        .track_submit(true)
        .request(request)
        .build()
        .unwrap();
    let root = form.root();
    add(&mut form, root, NodeDef::text("name"));

    assert!(form.is_submitted());
    let values = form.values();
    assert_eq!(values.get("name"), Some(&Value::from("Ann")));
    assert!(!values.contains_key("_qf__f1"));
    assert!(values.keys().all(|k| !k.to_string().starts_with("_qf")));

    // The tracking field is rendered with the name the next request has to
    // carry.
    let tracker = form.get_element_by_id("qf:f1").unwrap();
    assert_eq!(form.name(tracker), Some(form.track_var_name().as_str()));
}

#[test]
fn test_tracked_form_ignores_requests_without_its_field() {
    let request = Request::post().body_param("name", "Ann");
    let mut form = Form::builder()
        .id("f1")
        .request(request)
        .build()
        .unwrap();
    let root = form.root();
    let name = add(&mut form, root, NodeDef::text("name").value("default"));
    assert!(!form.is_submitted());
    assert!(!form.validate());
    assert_eq!(form.value(name), Some(Value::from("default")));
}

#[test]
fn test_urlencoded_body_with_nested_names() {
    let request = Request::post()
        .urlencoded_body("_qf__shop=&item%5Bname%5D=Pen&tags%5B%5D=a&tags%5B%5D=b+c");
    let mut form = Form::builder()
        .id("shop")
        .request(request)
        .build()
        .unwrap();
    let root = form.root();
    let item = add(&mut form, root, NodeDef::group("item"));
    let name = add(&mut form, item, NodeDef::text("name"));
    let tags = add(
        &mut form,
        root,
        NodeDef::select("tags")
            .multiple()
            .options([("a", "A"), ("b c", "B C")]),
    );

    assert!(form.is_submitted());
    assert_eq!(form.value(name), Some(Value::from("Pen")));
    assert_eq!(form.name(tags), Some("tags[]"));
    assert_eq!(form.value(tags), Some(Value::list(["a", "b c"])));
}

#[test]
fn test_get_forms_read_the_query() {
    let request = Request::get().query_string("q=rust&page=2");
    let mut form = Form::builder()
        .id("search")
        .method("get")
        .track_submit(false)
        .request(request)
        .build()
        .unwrap();
    let root = form.root();
    let q = add(&mut form, root, NodeDef::text("q"));
    assert!(form.data_reason().get_not_empty);
    assert_eq!(form.value(q), Some(Value::from("rust")));
}

#[test]
fn test_uploads_and_their_errors() {
    let ok = UploadedFile::new("cv.pdf", "application/pdf", 1024).tmp_name("/tmp/php1");
    let request = Request::post()
        .body_param("_qf__up", "")
        .file("cv", &ok)
        .file("photo", &UploadedFile::failed(2))
        .file("extra", &UploadedFile::failed(4));
    let mut form = Form::builder().id("up").request(request).build().unwrap();
    let root = form.root();
    let cv = add(&mut form, root, NodeDef::file("cv"));
    let photo = add(
        &mut form,
        root,
        NodeDef::file("photo").upload_message(2, "Photo too big"),
    );
    let extra = add(&mut form, root, NodeDef::file("extra"));

    let value = form.value(cv).and_then(Value::into_map).unwrap();
    assert_eq!(value.get("name"), Some(&Value::from("cv.pdf")));
    assert_eq!(form.value(photo), None);

    assert!(!form.validate());
    assert_eq!(form.error(cv), None);
    assert_eq!(form.error(photo), Some("Photo too big"));
    assert_eq!(form.error(extra), None);
}

#[test]
fn test_required_file_without_upload() {
    let request = Request::post()
        .body_param("_qf__up2", "")
        .file("cv", &UploadedFile::failed(4));
    let mut form = Form::builder().id("up2").request(request).build().unwrap();
    let root = form.root();
    let cv = add(&mut form, root, NodeDef::file("cv"));
    form.add_rule(cv, Rule::required("Attach your CV").unwrap())
        .unwrap();
    assert!(!form.validate());
    assert_eq!(form.error(cv), Some("Attach your CV"));
}

#[test]
fn test_buttons_only_have_a_value_when_used() {
    let request = Request::post()
        .body_param("_qf__btn", "")
        .body_param("save", "Save");
    let mut form = Form::builder().id("btn").request(request).build().unwrap();
    let root = form.root();
    let save = add(&mut form, root, NodeDef::submit("save").attr("value", "Save"));
    let delete = add(&mut form, root, NodeDef::submit("delete").attr("value", "Delete"));
    assert_eq!(form.value(save), Some(Value::from("Save")));
    assert_eq!(form.value(delete), None);
}
