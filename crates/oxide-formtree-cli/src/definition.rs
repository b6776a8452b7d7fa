//! JSON form definitions.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value as Json;

use oxide_formtree::RunMode;

/// A whole form.
///
/// ```json
/// {
///   "id": "signup",
///   "method": "post",
///   "elements": [
///     {"type": "text", "name": "user", "label": "User",
///      "rules": [{"type": "required", "message": "Pick a user name"}]},
///     {"type": "select", "name": "plan", "options": {"free": "Free", "pro": "Pro"}}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormDefinition {
    pub id: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Recognise submissions by the hidden tracking field.
    #[serde(default = "default_true")]
    pub track_submit: bool,
    /// Default values, consulted after submitted data.
    #[serde(default)]
    pub defaults: Option<Json>,
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
}

/// One element or container.
///
/// Keys other than the ones below (`options`, `multiple`, `content`,
/// `index_field`, ...) are handed to the registry constructor of `type`.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub value: Option<Json>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// Children of containers; for repeats, the prototype's children.
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
    #[serde(flatten)]
    pub config: serde_json::Map<String, Json>,
}

/// A rule attached to the enclosing element.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub config: Json,
    #[serde(default)]
    pub mode: ModeDefinition,
}

/// Where a rule runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeDefinition {
    #[default]
    Server,
    Client,
    ClientOnBlur,
    Both,
}

impl From<ModeDefinition> for RunMode {
    fn from(mode: ModeDefinition) -> Self {
        match mode {
            ModeDefinition::Server => Self::Server,
            ModeDefinition::Client => Self::Client,
            ModeDefinition::ClientOnBlur => Self::ClientOnBlur,
            ModeDefinition::Both => Self::Both,
        }
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_definition() {
        let def: FormDefinition = serde_json::from_value(json!({
            "id": "f",
            "elements": [
                {"type": "select", "name": "s", "options": ["a", "b"], "multiple": true,
                 "rules": [{"type": "required", "message": "Pick", "mode": "both"}]},
                {"type": "fieldset", "label": "Box", "elements": [{"type": "text", "name": "t"}]}
            ]
        }))
        .unwrap();
        assert!(def.track_submit);
        assert_eq!(def.elements.len(), 2);
        let select = &def.elements[0];
        assert_eq!(select.kind, "select");
        assert_eq!(select.config.get("multiple"), Some(&json!(true)));
        assert!(select.config.contains_key("options"));
        assert!(!select.config.contains_key("rules"));
        assert_eq!(select.rules[0].mode, ModeDefinition::Both);
        assert_eq!(def.elements[1].elements[0].name.as_deref(), Some("t"));
    }

    #[test]
    fn test_unknown_form_keys_are_rejected() {
        let parsed: Result<FormDefinition, _> =
            serde_json::from_value(json!({"id": "f", "element": []}));
        assert!(parsed.is_err());
    }
}
