//! Validation rules.
//!
//! A [`Rule`] is an immutable combinator tree whose leaves pair a [`Check`]
//! with the node it validates and the message recorded when it fails.
//! Chaining with [`Rule::and_`] and [`Rule::or_`] builds new trees; nothing
//! is rewritten in place.
//!
//! # Example
//!
//! ```ignore
//! let rule = Rule::required("Enter a nickname")?
//!     .and_(Rule::min_length("At least 3 characters", 3))?;
//! form.add_rule(nickname, rule)?;
//! ```

mod callback;
mod compare;
mod each;
mod length;
mod nonempty;
mod pattern;

use std::fmt;

pub use callback::Callback;
pub use compare::{Compare, CompareOp, Operand};
pub use each::Each;
pub use length::Length;
pub use nonempty::{Empty, Nonempty, Required};
pub use pattern::{Email, Pattern};

use crate::error::{FormError, Result};
use crate::form::Form;
use crate::node::{NodeKey, NodeKind};
use crate::value::Value;

/// Where a rule is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Only by [`Form::validate`].
    #[default]
    Server,
    /// Only in the browser, on submit.
    Client,
    /// Only in the browser, on submit and when the field loses focus.
    ClientOnBlur,
    /// Both on the server and in the browser.
    Both,
}

impl RunMode {
    /// Whether the server-side validation runs the rule.
    pub fn on_server(self) -> bool {
        matches!(self, Self::Server | Self::Both)
    }

    /// Whether the rule is exported to client-side validation.
    pub fn on_client(self) -> bool {
        !matches!(self, Self::Server)
    }

    /// Whether the client re-checks the field on blur.
    pub fn on_blur(self) -> bool {
        matches!(self, Self::ClientOnBlur)
    }
}

/// Identifies a rule attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) u64);

/// A predicate over a node's value.
pub trait Check: Send + Sync + fmt::Debug {
    /// Registry name of the check.
    fn name(&self) -> &'static str;

    /// Returns whether the owner's value passes.
    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool;

    /// Client-side descriptor, `None` if the check cannot run in a browser.
    fn javascript(&self, _ctx: &ClientContext<'_>) -> Option<String> {
        None
    }

    /// Rejects owner kinds the check cannot validate.
    fn check_owner(&self, _kind: NodeKind) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Whether this is the "required" check.
    fn is_required(&self) -> bool {
        false
    }

    /// Clones into a new box.
    fn clone_box(&self) -> Box<dyn Check>;
}

impl Clone for Box<dyn Check> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Access to the tree while a check runs.
pub struct RuleContext<'a> {
    form: &'a Form,
    owner: NodeKey,
    errors: &'a mut Vec<(NodeKey, String)>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(form: &'a Form, owner: NodeKey, errors: &'a mut Vec<(NodeKey, String)>) -> Self {
        Self {
            form,
            owner,
            errors,
        }
    }

    /// The node being validated.
    pub fn owner(&self) -> NodeKey {
        self.owner
    }

    /// The form holding the owner.
    pub fn form(&self) -> &'a Form {
        self.form
    }

    /// Kind of the owner.
    pub fn kind(&self) -> Option<NodeKind> {
        self.form.kind(self.owner)
    }

    /// The owner's filtered value.
    pub fn value(&self) -> Option<Value> {
        self.form.value(self.owner)
    }

    /// Another node's filtered value.
    pub fn value_of(&self, key: NodeKey) -> Option<Value> {
        self.form.value(key)
    }

    /// Records an error on another node, typically a descendant of a
    /// container owner. The first error recorded for a node wins.
    pub fn set_error(&mut self, key: NodeKey, message: impl Into<String>) {
        self.errors.push((key, message.into()));
    }

    /// A context validating `owner` instead, sharing recorded errors.
    pub fn for_owner(&mut self, owner: NodeKey) -> RuleContext<'_> {
        RuleContext {
            form: self.form,
            owner,
            errors: &mut *self.errors,
        }
    }
}

/// Access to the tree while building client-side descriptors.
#[derive(Clone, Copy)]
pub struct ClientContext<'a> {
    form: &'a Form,
    owner: NodeKey,
}

impl<'a> ClientContext<'a> {
    pub(crate) fn new(form: &'a Form, owner: NodeKey) -> Self {
        Self { form, owner }
    }

    /// The node being validated.
    pub fn owner(&self) -> NodeKey {
        self.owner
    }

    /// The form holding the owner.
    pub fn form(&self) -> &'a Form {
        self.form
    }

    /// A context for another owner.
    pub fn for_owner(&self, owner: NodeKey) -> Self {
        Self {
            form: self.form,
            owner,
        }
    }

    /// Quoted reference to the owner: its id, or the ids of its leaves for
    /// a container.
    pub fn owner_ref(&self) -> String {
        self.node_ref(self.owner)
    }

    /// Quoted reference to any node.
    pub fn node_ref(&self, key: NodeKey) -> String {
        if self.form.kind(key).is_some_and(NodeKind::is_container) {
            let ids: Vec<serde_json::Value> = self
                .form
                .leaves(key)
                .into_iter()
                .filter_map(|leaf| self.form.id(leaf))
                .map(serde_json::Value::from)
                .collect();
            serde_json::Value::Array(ids).to_string()
        } else {
            quote(self.form.id(key).unwrap_or_default())
        }
    }
}

/// JSON-quotes a string for use in a descriptor.
pub fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[derive(Debug, Clone)]
struct Leaf {
    owner: Option<NodeKey>,
    message: String,
    check: Box<dyn Check>,
}

#[derive(Debug, Clone)]
enum Chain {
    Leaf(Leaf),
    And(Box<Chain>, Box<Chain>),
    Or(Box<Chain>, Box<Chain>),
}

enum Verdict {
    Pass,
    /// The first failing leaf's owner and message.
    Fail(Option<(NodeKey, String)>),
}

impl Chain {
    fn root(&self) -> &Leaf {
        match self {
            Self::Leaf(leaf) => leaf,
            Self::And(left, _) | Self::Or(left, _) => left.root(),
        }
    }

    fn root_mut(&mut self) -> &mut Leaf {
        match self {
            Self::Leaf(leaf) => leaf,
            Self::And(left, _) | Self::Or(left, _) => left.root_mut(),
        }
    }

    fn leaves(&self) -> Vec<&Leaf> {
        match self {
            Self::Leaf(leaf) => vec![leaf],
            Self::And(l, r) | Self::Or(l, r) => {
                let mut leaves = l.leaves();
                leaves.extend(r.leaves());
                leaves
            }
        }
    }

    fn bind_unowned(&mut self, owner: NodeKey) {
        match self {
            Self::Leaf(leaf) => {
                leaf.owner.get_or_insert(owner);
            }
            Self::And(l, r) | Self::Or(l, r) => {
                l.bind_unowned(owner);
                r.bind_unowned(owner);
            }
        }
    }

    fn eval(&self, form: &Form, fallback: NodeKey, errors: &mut Vec<(NodeKey, String)>) -> Verdict {
        match self {
            Self::Leaf(leaf) => {
                let owner = leaf.owner.unwrap_or(fallback);
                let mut ctx = RuleContext::new(form, owner, errors);
                if leaf.check.validate_owner(&mut ctx) {
                    Verdict::Pass
                } else if leaf.message.is_empty() {
                    Verdict::Fail(None)
                } else {
                    Verdict::Fail(Some((owner, leaf.message.clone())))
                }
            }
            Self::And(left, right) => match left.eval(form, fallback, errors) {
                Verdict::Pass => right.eval(form, fallback, errors),
                failed => failed,
            },
            Self::Or(left, right) => match left.eval(form, fallback, errors) {
                Verdict::Pass => Verdict::Pass,
                Verdict::Fail(first) => match right.eval(form, fallback, errors) {
                    Verdict::Pass => Verdict::Pass,
                    Verdict::Fail(second) => Verdict::Fail(first.or(second)),
                },
            },
        }
    }

    fn javascript(&self, form: &Form, fallback: NodeKey) -> Option<String> {
        match self {
            Self::Leaf(leaf) => {
                let owner = leaf.owner.unwrap_or(fallback);
                leaf.check.javascript(&ClientContext::new(form, owner))
            }
            Self::And(l, r) => Some(format!(
                "and({}, {})",
                l.javascript(form, fallback)?,
                r.javascript(form, fallback)?
            )),
            Self::Or(l, r) => Some(format!(
                "or({}, {})",
                l.javascript(form, fallback)?,
                r.javascript(form, fallback)?
            )),
        }
    }
}

/// What running a rule produced.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) passed: bool,
    /// Errors to record, in priority order.
    pub(crate) errors: Vec<(NodeKey, String)>,
}

/// A validation rule, possibly chained with others.
#[derive(Debug, Clone)]
pub struct Rule {
    chain: Chain,
}

impl Rule {
    /// Creates a rule from a check.
    ///
    /// A "required" check needs a non-empty message.
    pub fn new(message: impl Into<String>, check: impl Check + 'static) -> Result<Self> {
        Self::from_boxed(message.into(), Box::new(check))
    }

    /// Creates a rule from a boxed check.
    pub fn from_boxed(message: String, check: Box<dyn Check>) -> Result<Self> {
        if check.is_required() && message.is_empty() {
            return Err(FormError::EmptyRequiredMessage);
        }
        Ok(Self {
            chain: Chain::Leaf(Leaf {
                owner: None,
                message,
                check,
            }),
        })
    }

    /// Requires a non-empty value.
    pub fn required(message: impl Into<String>) -> Result<Self> {
        Self::new(message, Required)
    }

    /// Requires at least `min` non-empty values.
    pub fn nonempty(message: impl Into<String>, min: usize) -> Self {
        Self::leaf(message, Box::new(Nonempty::new(min)))
    }

    /// Requires an empty value.
    pub fn empty(message: impl Into<String>) -> Self {
        Self::leaf(message, Box::new(Empty))
    }

    /// Requires a length between `min` and `max` characters.
    pub fn length(message: impl Into<String>, min: usize, max: usize) -> Result<Self> {
        Ok(Self::leaf(message, Box::new(Length::between(min, max)?)))
    }

    /// Requires at least `min` characters.
    pub fn min_length(message: impl Into<String>, min: usize) -> Self {
        Self::leaf(message, Box::new(Length::min(min)))
    }

    /// Requires at most `max` characters.
    pub fn max_length(message: impl Into<String>, max: usize) -> Self {
        Self::leaf(message, Box::new(Length::max(max)))
    }

    /// Requires the value to match a regular expression.
    pub fn regex(message: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self::leaf(message, Box::new(Pattern::matching(pattern)?)))
    }

    /// Requires the value not to match a regular expression.
    pub fn not_regex(message: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self::leaf(message, Box::new(Pattern::not_matching(pattern)?)))
    }

    /// Requires a syntactically valid e-mail address.
    pub fn email(message: impl Into<String>) -> Self {
        Self::leaf(message, Box::new(Email))
    }

    /// Runs a closure on the value.
    pub fn callback(
        message: impl Into<String>,
        f: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::leaf(message, Box::new(Callback::new(f)))
    }

    /// Passes when the closure returns `false`.
    pub fn not_callback(
        message: impl Into<String>,
        f: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::leaf(message, Box::new(Callback::new(f).negated()))
    }

    /// Compares the value with another element or a literal.
    pub fn compare(message: impl Into<String>, op: CompareOp, operand: Operand) -> Self {
        Self::leaf(message, Box::new(Compare::new(op, operand)))
    }

    /// Applies a check to every leaf of a container.
    pub fn each(message: impl Into<String>, template: impl Check + 'static) -> Result<Self> {
        Ok(Self::leaf(message, Box::new(Each::new(Box::new(template))?)))
    }

    fn leaf(message: impl Into<String>, check: Box<dyn Check>) -> Self {
        Self {
            chain: Chain::Leaf(Leaf {
                owner: None,
                message: message.into(),
                check,
            }),
        }
    }

    /// Binds the rule to a node. Rules added with [`Form::add_rule`] are
    /// bound to the node they are added to; binding explicitly is needed for
    /// chained rules validating another node.
    #[must_use]
    pub fn for_owner(mut self, owner: NodeKey) -> Self {
        self.chain.root_mut().owner = Some(owner);
        self
    }

    /// The node the rule validates, once bound.
    pub fn owner(&self) -> Option<NodeKey> {
        self.chain.root().owner
    }

    /// Message recorded on the owner when the rule fails.
    pub fn message(&self) -> &str {
        &self.chain.root().message
    }

    /// Registry name of the root check.
    pub fn name(&self) -> &'static str {
        self.chain.root().check.name()
    }

    /// Whether the rule marks its owner as required.
    pub fn is_required(&self) -> bool {
        self.chain.root().check.is_required()
    }

    /// Chains a rule that must also pass.
    ///
    /// `a.or_(b).and_(c)` binds as `a or (b and c)`.
    pub fn and_(self, other: Rule) -> Result<Self> {
        if other.is_required() {
            return Err(FormError::RequiredRuleChain("and_"));
        }
        let chain = match self.chain {
            Chain::Or(left, right) => Chain::Or(left, Box::new(Chain::And(right, Box::new(other.chain)))),
            chain => Chain::And(Box::new(chain), Box::new(other.chain)),
        };
        Ok(Self { chain })
    }

    /// Chains an alternative rule.
    pub fn or_(self, other: Rule) -> Result<Self> {
        if self.is_required() || other.is_required() {
            return Err(FormError::RequiredRuleChain("or_"));
        }
        Ok(Self {
            chain: Chain::Or(Box::new(self.chain), Box::new(other.chain)),
        })
    }

    pub(crate) fn bind(&mut self, owner: NodeKey) {
        self.chain.root_mut().owner = Some(owner);
        self.chain.bind_unowned(owner);
    }

    /// Checks every leaf against its owner's kind.
    pub(crate) fn check_owners(&self, form: &Form, fallback: NodeKey) -> Result<()> {
        for leaf in self.chain.leaves() {
            let owner = leaf.owner.unwrap_or(fallback);
            let kind = form.kind(owner).ok_or(FormError::UnknownNode(owner.0))?;
            leaf.check
                .check_owner(kind)
                .map_err(|reason| FormError::IncompatibleOwner {
                    rule: leaf.check.name().to_string(),
                    owner: form.describe(owner),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Runs the rule tree.
    pub(crate) fn evaluate(&self, form: &Form, fallback: NodeKey) -> Outcome {
        let mut errors = Vec::new();
        let verdict = self.chain.eval(form, fallback, &mut errors);
        let passed = match verdict {
            Verdict::Pass => true,
            Verdict::Fail(failed) => {
                errors.extend(failed);
                let root = self.chain.root();
                if !root.message.is_empty() {
                    errors.push((root.owner.unwrap_or(fallback), root.message.clone()));
                }
                false
            }
        };
        Outcome { passed, errors }
    }

    /// Client-side descriptor for the whole chain, `None` if any part has no
    /// client-side counterpart.
    pub fn javascript(&self, form: &Form, fallback: NodeKey) -> Option<String> {
        self.chain.javascript(form, fallback)
    }

    /// Owners of every leaf in the chain.
    pub(crate) fn owners(&self, fallback: NodeKey) -> Vec<NodeKey> {
        let mut owners: Vec<NodeKey> = Vec::new();
        for leaf in self.chain.leaves() {
            let owner = leaf.owner.unwrap_or(fallback);
            if !owners.contains(&owner) {
                owners.push(owner);
            }
        }
        owners
    }
}

/// Scalars of an optional value; absent values have none.
pub(crate) fn scalars(value: Option<&Value>) -> Vec<&str> {
    value.map(Value::scalars).unwrap_or_default()
}
