//! Error types for the form tree.
//!
//! Only structural (programmer) errors live here. A rule that rejects the
//! submitted data is not an error: it records a message on the node and the
//! validating call returns `false`.

use thiserror::Error;

/// Structural errors raised by tree mutation, rule composition and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// An explicitly supplied id contains whitespace or is empty.
    #[error("invalid element id {0:?}: ids must be non-empty and contain no whitespace")]
    InvalidId(String),

    /// The referenced node, child or element does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The node key does not belong to this form.
    #[error("unknown node key {0}")]
    UnknownNode(usize),

    /// A container operation was attempted on a leaf element.
    #[error("element {0:?} is not a container")]
    NotAContainer(String),

    /// Attaching the node would make a container its own ancestor.
    #[error("cannot append {child:?} to {parent:?}: it would become its own ancestor")]
    Cycle { parent: String, child: String },

    /// The form root can never be attached to another container.
    #[error("the form root cannot be added to a container")]
    RootNotAttachable,

    /// A rule was attached to a node kind it cannot validate.
    #[error("rule {rule:?} cannot be attached to {owner:?}: {reason}")]
    IncompatibleOwner {
        rule: String,
        owner: String,
        reason: String,
    },

    /// A "required" rule was used as an `or_()` operand or `and_()` argument.
    #[error("{0}(): cannot chain a \"required\" rule this way")]
    RequiredRuleChain(&'static str),

    /// A "required" rule was given an empty error message.
    #[error("\"required\" rule cannot have an empty error message")]
    EmptyRequiredMessage,

    /// Rule configuration could not be interpreted.
    #[error("invalid configuration for rule {rule:?}: {message}")]
    InvalidRuleConfig { rule: String, message: String },

    /// A watched attribute that may not be changed after construction.
    #[error("attribute {0:?} is read-only")]
    ReadOnlyAttribute(String),

    /// A watched attribute that may never be removed.
    #[error("required attribute {0:?} cannot be removed")]
    RequiredAttribute(String),

    /// The registry has no element type with this name.
    #[error("element type {0:?} is not known")]
    UnknownElementType(String),

    /// The registry has no rule type with this name.
    #[error("rule type {0:?} is not known")]
    UnknownRuleType(String),

    /// Generic invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for form tree operations.
pub type Result<T> = std::result::Result<T, FormError>;
