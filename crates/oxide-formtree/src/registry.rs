//! Type-name registry for elements and rules.
//!
//! Declarative form definitions (see the `formtree` CLI) refer to element and
//! rule types by name. A [`Registry`] maps those names to constructors taking
//! a JSON configuration. The built-in types are registered by
//! [`Registry::new`]; applications add their own with
//! [`Registry::register_element`] and [`Registry::register_check`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;
use tracing::debug;

use crate::definition::NodeDef;
use crate::elements::SelectOption;
use crate::error::{FormError, Result};
use crate::form::Form;
use crate::node::NodeKey;
use crate::rules::{
    Callback, Check, Compare, CompareOp, Each, Email, Empty, Length, Nonempty, Operand, Pattern,
    Required, Rule,
};
use crate::value::Value;

/// Builds an element definition from an optional name and a configuration.
pub type ElementConstructor = Arc<dyn Fn(Option<&str>, &Json) -> Result<NodeDef> + Send + Sync>;

/// Builds a check from a configuration.
pub type CheckConstructor = Arc<dyn Fn(&CheckArgs<'_>) -> Result<Box<dyn Check>> + Send + Sync>;

/// A predicate callable by name from `callback` rules.
pub type NamedCallback = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// What a check constructor gets to work with.
pub struct CheckArgs<'a> {
    pub registry: &'a Registry,
    pub form: &'a Form,
    pub owner: NodeKey,
    pub config: &'a Json,
}

/// Maps type names to element and rule constructors.
#[derive(Clone)]
pub struct Registry {
    elements: HashMap<String, ElementConstructor>,
    checks: HashMap<String, CheckConstructor>,
    callbacks: HashMap<String, NamedCallback>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut elements: Vec<&String> = self.elements.keys().collect();
        elements.sort();
        let mut checks: Vec<&String> = self.checks.keys().collect();
        checks.sort();
        f.debug_struct("Registry")
            .field("elements", &elements)
            .field("checks", &checks)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding the built-in element and rule types.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin_elements();
        registry.register_builtin_checks();
        registry
    }

    /// A registry without any types.
    pub fn empty() -> Self {
        Self {
            elements: HashMap::new(),
            checks: HashMap::new(),
            callbacks: HashMap::new(),
        }
    }

    /// Registers (or replaces) an element type.
    pub fn register_element(
        &mut self,
        type_name: impl Into<String>,
        constructor: impl Fn(Option<&str>, &Json) -> Result<NodeDef> + Send + Sync + 'static,
    ) {
        self.elements.insert(type_name.into(), Arc::new(constructor));
    }

    /// Registers (or replaces) a rule type.
    pub fn register_check(
        &mut self,
        type_name: impl Into<String>,
        constructor: impl Fn(&CheckArgs<'_>) -> Result<Box<dyn Check>> + Send + Sync + 'static,
    ) {
        self.checks.insert(type_name.into(), Arc::new(constructor));
    }

    /// Registers a predicate for `callback` and `notcallback` rules.
    pub fn register_callback(
        &mut self,
        name: impl Into<String>,
        callback: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) {
        self.callbacks.insert(name.into(), Arc::new(callback));
    }

    /// Whether an element constructor is registered under `type_name`.
    pub fn has_element_type(&self, type_name: &str) -> bool {
        self.elements.contains_key(type_name)
    }

    /// Whether a rule constructor is registered under `type_name`.
    pub fn has_rule_type(&self, type_name: &str) -> bool {
        self.checks.contains_key(type_name)
    }

    /// Creates an element definition by type name.
    pub fn create_element(&self, type_name: &str, name: Option<&str>, config: &Json) -> Result<NodeDef> {
        let constructor = self
            .elements
            .get(type_name)
            .ok_or_else(|| FormError::UnknownElementType(type_name.to_string()))?;
        debug!(type_name, ?name, "creating element from registry");
        constructor(name, config)
    }

    /// Creates a check by type name.
    pub fn create_check(
        &self,
        type_name: &str,
        form: &Form,
        owner: NodeKey,
        config: &Json,
    ) -> Result<Box<dyn Check>> {
        let constructor = self
            .checks
            .get(type_name)
            .ok_or_else(|| FormError::UnknownRuleType(type_name.to_string()))?;
        constructor(&CheckArgs {
            registry: self,
            form,
            owner,
            config,
        })
    }

    /// Creates a rule bound to `owner`. The rule still has to be attached
    /// with [`Form::add_rule`].
    pub fn create_rule(
        &self,
        type_name: &str,
        form: &Form,
        owner: NodeKey,
        message: impl Into<String>,
        config: &Json,
    ) -> Result<Rule> {
        let check = self.create_check(type_name, form, owner, config)?;
        Ok(Rule::from_boxed(message.into(), check)?.for_owner(owner))
    }

    fn callback(&self, name: &str) -> Result<NamedCallback> {
        self.callbacks
            .get(name)
            .cloned()
            .ok_or_else(|| invalid("callback", format!("no callback registered as {name:?}")))
    }

    fn register_builtin_elements(&mut self) {
        use crate::node::InputType;

        for (type_name, input_type) in [
            ("text", InputType::Text),
            ("password", InputType::Password),
            ("email", InputType::Email),
            ("hidden", InputType::Hidden),
            ("number", InputType::Number),
            ("search", InputType::Search),
            ("tel", InputType::Tel),
            ("url", InputType::Url),
        ] {
            self.register_element(type_name, move |name, _| {
                Ok(NodeDef::input(input_type, required_name(type_name, name)?))
            });
        }
        self.register_element("textarea", |name, _| {
            Ok(NodeDef::textarea(required_name("textarea", name)?))
        });
        self.register_element("checkbox", |name, _| {
            Ok(NodeDef::checkbox(required_name("checkbox", name)?))
        });
        self.register_element("radio", |name, config| {
            let value = config_str(config, "value").unwrap_or_else(|| "1".to_string());
            Ok(NodeDef::radio(required_name("radio", name)?, value))
        });
        self.register_element("select", |name, config| {
            let mut def = NodeDef::select(required_name("select", name)?);
            if let Some(options) = config.get("options") {
                for option in parse_options(options)? {
                    def = def.select_option(option);
                }
            }
            if config_bool(config, "multiple") {
                def = def.multiple();
            }
            if let Some(enabled) = config.get("intrinsic_validation").and_then(Json::as_bool) {
                def = def.intrinsic_validation(enabled);
            }
            Ok(def)
        });
        for type_name in ["button", "submit", "reset"] {
            self.register_element(type_name, move |name, config| {
                let name = required_name(type_name, name)?;
                let mut def = match type_name {
                    "submit" => NodeDef::submit(name),
                    "reset" => NodeDef::reset(name),
                    _ => NodeDef::button(name),
                };
                if let Some(content) = config_str(config, "content") {
                    def = def.content(content);
                }
                Ok(def)
            });
        }
        self.register_element("static", |name, config| {
            let mut def = NodeDef::static_content(config_str(config, "content").unwrap_or_default());
            if let Some(tag) = config_str(config, "tag") {
                def = def.tag(tag);
            }
            if let Some(name) = name {
                def = def.attr("name", name);
            }
            Ok(def)
        });
        self.register_element("file", |name, config| {
            let mut def = NodeDef::file(required_name("file", name)?);
            if let Some(messages) = config.get("messages").and_then(Json::as_object) {
                for (code, message) in messages {
                    let code: u8 = code
                        .parse()
                        .map_err(|_| FormError::InvalidArgument(format!("upload error code {code:?}")))?;
                    def = def.upload_message(code, message.as_str().unwrap_or_default());
                }
            }
            Ok(def)
        });
        self.register_element("fieldset", |_, _| Ok(NodeDef::fieldset()));
        self.register_element("group", |name, _| {
            Ok(name.map_or_else(NodeDef::anonymous_group, NodeDef::group))
        });
        self.register_element("repeat", |_, config| {
            let mut def = NodeDef::repeat(NodeDef::fieldset());
            if let Some(field) = config_str(config, "index_field") {
                def = def.index_field(field);
            }
            if let Some(indexes) = config.get("indexes").and_then(Json::as_array) {
                def = def.indexes(indexes.iter().filter_map(json_scalar));
            }
            Ok(def)
        });
    }

    fn register_builtin_checks(&mut self) {
        self.register_check("required", |_| Ok(Box::new(Required)));
        self.register_check("nonempty", |args| {
            let min = config_usize(args.config, "min").unwrap_or(1);
            Ok(Box::new(Nonempty::new(min)))
        });
        self.register_check("empty", |_| Ok(Box::new(Empty)));
        self.register_check("length", |args| {
            let check = match args.config {
                Json::Number(_) => Length::exactly(config_usize(args.config, "").unwrap_or(0))?,
                Json::Array(bounds) => match bounds.as_slice() {
                    [min, max] => Length::between(as_usize(min)?, as_usize(max)?)?,
                    _ => return Err(invalid("length", "expected [min, max]")),
                },
                config => {
                    let min = config_usize(config, "min").unwrap_or(0);
                    match config_usize(config, "max") {
                        Some(max) => Length::between(min, max)?,
                        None => Length::min(min),
                    }
                }
            };
            Ok(Box::new(check))
        });
        self.register_check("minlength", |args| {
            let min = config_usize(args.config, "min")
                .ok_or_else(|| invalid("minlength", "expected a minimum length"))?;
            Ok(Box::new(Length::min(min)))
        });
        self.register_check("maxlength", |args| {
            let max = config_usize(args.config, "max")
                .ok_or_else(|| invalid("maxlength", "expected a maximum length"))?;
            Ok(Box::new(Length::max(max)))
        });
        self.register_check("regex", |args| {
            Ok(Box::new(Pattern::matching(&pattern_config("regex", args.config)?)?))
        });
        self.register_check("notregex", |args| {
            Ok(Box::new(Pattern::not_matching(&pattern_config("notregex", args.config)?)?))
        });
        self.register_check("email", |_| Ok(Box::new(Email)));
        self.register_check("callback", |args| callback_check(args, false));
        self.register_check("notcallback", |args| callback_check(args, true));
        self.register_check("compare", |args| {
            let operator = config_str(args.config, "operator").unwrap_or_else(|| "==".to_string());
            let op = CompareOp::parse(&operator)
                .ok_or_else(|| invalid("compare", format!("unknown operator {operator:?}")))?;
            let operand = if let Json::String(id) = args.config {
                Operand::Element(args.form.require_element_by_id(id)?)
            } else if let Some(id) = config_str(args.config, "element") {
                Operand::Element(args.form.require_element_by_id(&id)?)
            } else if let Some(literal) = args.config.get("value").and_then(json_scalar) {
                Operand::Literal(literal)
            } else {
                return Err(invalid("compare", "expected an element id or a value"));
            };
            Ok(Box::new(Compare::new(op, operand)))
        });
        self.register_check("each", |args| {
            let rule = config_str(args.config, "rule")
                .ok_or_else(|| invalid("each", "expected a template rule name"))?;
            let template_config = args.config.get("config").unwrap_or(&Json::Null);
            let template =
                args.registry
                    .create_check(&rule, args.form, args.owner, template_config)?;
            Ok(Box::new(Each::new(template)?))
        });
    }
}

fn invalid(rule: &str, message: impl Into<String>) -> FormError {
    FormError::InvalidRuleConfig {
        rule: rule.to_string(),
        message: message.into(),
    }
}

fn required_name<'a>(type_name: &str, name: Option<&'a str>) -> Result<&'a str> {
    name.ok_or_else(|| FormError::InvalidArgument(format!("element type {type_name:?} needs a name")))
}

/// Scalar JSON as text: strings as is, numbers in decimal, booleans as
/// `"1"`/`""`.
fn json_scalar(json: &Json) -> Option<String> {
    match Value::from_json(json)? {
        Value::Str(s) => Some(s),
        Value::Map(_) => None,
    }
}

fn config_str(config: &Json, key: &str) -> Option<String> {
    config.get(key).and_then(json_scalar)
}

fn config_bool(config: &Json, key: &str) -> bool {
    config.get(key).is_some_and(|v| v.as_bool().unwrap_or(false) || *v == "1")
}

/// A number given directly or under `key`.
fn config_usize(config: &Json, key: &str) -> Option<usize> {
    let value = match config {
        Json::Number(_) => config,
        _ => config.get(key)?,
    };
    as_usize(value).ok()
}

fn as_usize(json: &Json) -> Result<usize> {
    json.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| FormError::InvalidArgument(format!("expected a non-negative integer, got {json}")))
}

fn pattern_config(rule: &str, config: &Json) -> Result<String> {
    match config {
        Json::String(pattern) => Ok(pattern.clone()),
        _ => config_str(config, "pattern").ok_or_else(|| invalid(rule, "expected a pattern")),
    }
}

fn callback_check(args: &CheckArgs<'_>, negate: bool) -> Result<Box<dyn Check>> {
    let rule = if negate { "notcallback" } else { "callback" };
    let name = match args.config {
        Json::String(name) => name.clone(),
        config => config_str(config, "callback")
            .ok_or_else(|| invalid(rule, "expected a callback name"))?,
    };
    let predicate = args.registry.callback(&name)?;
    let mut check = Callback::new(move |value| predicate(value));
    if negate {
        check = check.negated();
    }
    if let Some(client) = config_str(args.config, "client") {
        check = check.client_function(client);
    }
    Ok(Box::new(check))
}

/// Options as `[value, text]` pairs, `{"value", "text"}` objects, optgroups
/// `{"label", "options"}`, plain strings, or a `{value: text}` object whose
/// nested objects and arrays become optgroups.
fn parse_options(json: &Json) -> Result<Vec<SelectOption>> {
    match json {
        Json::Array(items) => items.iter().map(parse_option).collect(),
        Json::Object(map) => map
            .iter()
            .map(|(key, text)| match text {
                Json::Array(_) | Json::Object(_) => {
                    Ok(SelectOption::group(key.clone(), parse_options(text)?))
                }
                text => Ok(SelectOption::item(json_scalar(text).unwrap_or_default(), key.clone())),
            })
            .collect(),
        other => Err(FormError::InvalidArgument(format!("invalid select options {other}"))),
    }
}

fn parse_option(json: &Json) -> Result<SelectOption> {
    let option = match json {
        Json::Array(pair) => match pair.as_slice() {
            [value, text] => SelectOption::item(
                json_scalar(text).unwrap_or_default(),
                json_scalar(value).unwrap_or_default(),
            ),
            _ => return Err(FormError::InvalidArgument(format!("invalid option {json}"))),
        },
        Json::Object(_) if json.get("options").is_some() => SelectOption::group(
            config_str(json, "label").unwrap_or_default(),
            parse_options(&json["options"])?,
        ),
        Json::Object(_) => {
            let value = config_str(json, "value").unwrap_or_default();
            let text = config_str(json, "text").unwrap_or_else(|| value.clone());
            let mut option = SelectOption::item(text, value);
            if config_bool(json, "disabled") {
                option = option.disabled();
            }
            if config_bool(json, "selected") {
                option = option.selected();
            }
            option
        }
        scalar => {
            let text = json_scalar(scalar).unwrap_or_default();
            SelectOption::item(text.clone(), text)
        }
    };
    Ok(option)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::ArrayDataSource;
    use crate::node::NodeKind;
    use serde_json::json;

    fn form() -> Form {
        Form::builder().id("reg").track_submit(false).build().unwrap()
    }

    #[test]
    fn test_unknown_types() {
        let registry = Registry::new();
        assert!(registry.has_element_type("select"));
        assert!(!registry.has_element_type("date"));
        assert!(registry.has_rule_type("compare"));
        assert!(!registry.has_rule_type("uppercase"));
        let err = registry.create_element("date", Some("d"), &Json::Null).unwrap_err();
        assert_eq!(err, FormError::UnknownElementType("date".to_string()));

        let form = form();
        let err = registry
            .create_rule("uppercase", &form, form.root(), "x", &Json::Null)
            .unwrap_err();
        assert_eq!(err, FormError::UnknownRuleType("uppercase".to_string()));
    }

    #[test]
    fn test_builtin_elements() {
        let registry = Registry::new();
        let def = registry.create_element("password", Some("pw"), &Json::Null).unwrap();
        assert_eq!(def.kind(), NodeKind::Input(crate::node::InputType::Password));
        assert!(registry.create_element("text", None, &Json::Null).is_err());
        let def = registry.create_element("group", None, &Json::Null).unwrap();
        assert!(def.name().is_none());
    }

    #[test]
    fn test_select_options_from_config() {
        let registry = Registry::new();
        let mut form = form();
        let def = registry
            .create_element(
                "select",
                Some("size"),
                &json!({
                    "options": [
                        ["s", "Small"],
                        {"value": "m", "text": "Medium", "disabled": true},
                        {"label": "Big", "options": {"l": "Large", "xl": "Huge"}},
                    ],
                }),
            )
            .unwrap();
        let size = form.add(form.root(), def).unwrap();
        form.set_value(size, Some(Value::from("m"))).unwrap();
        assert_eq!(form.value(size), None);
        form.set_value(size, Some(Value::from("xl"))).unwrap();
        assert_eq!(form.value(size), Some(Value::from("xl")));
        assert_eq!(form.view(size).unwrap().options().len(), 3);
    }

    #[test]
    fn test_rules_from_config() {
        let mut registry = Registry::new();
        registry.register_callback("is_even", |value| {
            value
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .is_some_and(|n| n % 2 == 0)
        });
        let mut form = form();
        form.submit_manually(ArrayDataSource::submitted(json!({
            "pass": "secret",
            "confirm": "other",
            "count": "3",
        })));
        let pass = form.add(form.root(), NodeDef::password("pass").id("pass")).unwrap();
        let confirm = form.add(form.root(), NodeDef::password("confirm")).unwrap();
        let count = form.add(form.root(), NodeDef::text("count")).unwrap();

        let rule = registry
            .create_rule("compare", &form, confirm, "Must match", &json!({"element": "pass"}))
            .unwrap();
        form.add_rule(confirm, rule).unwrap();
        let rule = registry
            .create_rule("callback", &form, count, "Must be even", &json!("is_even"))
            .unwrap();
        form.add_rule(count, rule).unwrap();
        let rule = registry
            .create_rule("length", &form, pass, "4 to 10", &json!([4, 10]))
            .unwrap();
        form.add_rule(pass, rule).unwrap();

        assert!(!form.validate());
        assert_eq!(form.error(confirm), Some("Must match"));
        assert_eq!(form.error(count), Some("Must be even"));
        assert_eq!(form.error(pass), None);
    }

    #[test]
    fn test_rule_config_errors() {
        let registry = Registry::new();
        let form = form();
        let root = form.root();
        assert!(matches!(
            registry.create_rule("required", &form, root, "", &Json::Null),
            Err(FormError::EmptyRequiredMessage)
        ));
        assert!(matches!(
            registry.create_rule("callback", &form, root, "x", &json!("missing")),
            Err(FormError::InvalidRuleConfig { .. })
        ));
        assert!(matches!(
            registry.create_rule("each", &form, root, "x", &json!({"rule": "required"})),
            Err(FormError::InvalidRuleConfig { .. })
        ));
        assert!(matches!(
            registry.create_rule("compare", &form, root, "x", &json!({"element": "nope"})),
            Err(FormError::NotFound(_))
        ));
    }
}
