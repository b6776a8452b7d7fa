use std::fmt;
use std::sync::Arc;

use super::{quote, Check, ClientContext, RuleContext};
use crate::value::Value;

type Predicate = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// Validates the owner's value with a closure.
///
/// Without a client-side function name the rule only runs on the server.
#[derive(Clone)]
pub struct Callback {
    predicate: Predicate,
    negate: bool,
    client_function: Option<String>,
}

impl Callback {
    /// Wraps a predicate.
    pub fn new(f: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(f),
            negate: false,
            client_function: None,
        }
    }

    /// Passes when the predicate returns `false`.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Name of a browser-side function implementing the same check.
    #[must_use]
    pub fn client_function(mut self, name: impl Into<String>) -> Self {
        self.client_function = Some(name.into());
        self
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("negate", &self.negate)
            .field("client_function", &self.client_function)
            .finish_non_exhaustive()
    }
}

impl Check for Callback {
    fn name(&self) -> &'static str {
        if self.negate {
            "notcallback"
        } else {
            "callback"
        }
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        let value = ctx.value();
        (self.predicate)(value.as_ref()) != self.negate
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        let function = self.client_function.as_deref()?;
        Some(format!(
            "{}({}, {})",
            self.name(),
            ctx.owner_ref(),
            quote(function)
        ))
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(self.clone())
    }
}
