#![allow(dead_code)]

use oxide_formtree::{ArrayDataSource, Form, NodeDef, NodeKey};

/// An untracked form, so no hidden tracking field shows up in values.
pub fn form(id: &str) -> Form {
    Form::builder()
        .id(id)
        .track_submit(false)
        .build()
        .unwrap_or_else(|e| panic!("Failed to build form {id}: {e}"))
}

/// A form submitted manually with `data`.
pub fn submitted(id: &str, data: serde_json::Value) -> Form {
    let mut form = form(id);
    form.submit_manually(ArrayDataSource::submitted(data));
    form
}

pub fn add(form: &mut Form, parent: NodeKey, def: NodeDef) -> NodeKey {
    let what = format!("{def:?}");
    form.add(parent, def)
        .unwrap_or_else(|e| panic!("Failed to add {what}: {e}"))
}

/// Ids of every node under `key`, in document order.
pub fn ids_under(form: &Form, key: NodeKey) -> Vec<String> {
    form.descendants(key)
        .into_iter()
        .filter_map(|k| form.id(k).map(str::to_string))
        .collect()
}
