//! Presence checks: `nonempty`, `required` and `empty`.

use super::{Check, ClientContext, RuleContext};
use crate::value::Value;

fn filled(value: &Value) -> bool {
    !value.is_empty()
}

/// Passes when the value is not empty.
///
/// Multi-valued owners need at least `min` non-empty values; containers need
/// at least `min` non-empty leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonempty {
    min: usize,
}

impl Nonempty {
    /// Creates the check; `min` below 1 is treated as 1.
    pub fn new(min: usize) -> Self {
        Self { min: min.max(1) }
    }

    /// Minimum number of non-empty values.
    pub fn min(&self) -> usize {
        self.min
    }

    fn count_filled(&self, ctx: &RuleContext<'_>) -> usize {
        let owner = ctx.owner();
        let form = ctx.form();
        if form.kind(owner).is_some_and(|k| k.is_container()) {
            return form
                .leaves(owner)
                .into_iter()
                .filter(|leaf| form.value(*leaf).is_some_and(|v| filled(&v)))
                .count();
        }
        match ctx.value() {
            None => 0,
            Some(Value::Str(s)) => usize::from(!s.is_empty()),
            Some(Value::Map(m)) => m.values().filter(|v| filled(v)).count(),
        }
    }
}

impl Default for Nonempty {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Check for Nonempty {
    fn name(&self) -> &'static str {
        "nonempty"
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        self.count_filled(ctx) >= self.min
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        Some(format!("nonempty({}, {})", ctx.owner_ref(), self.min))
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(*self)
    }
}

/// A non-empty check that also marks its owner as required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Required;

impl Check for Required {
    fn name(&self) -> &'static str {
        "required"
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        Nonempty::new(1).validate_owner(ctx)
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        Nonempty::new(1).javascript(ctx)
    }

    fn is_required(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(*self)
    }
}

/// Passes when the value is absent or empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

impl Check for Empty {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        match ctx.value() {
            None => true,
            Some(Value::Str(s)) => s.is_empty(),
            Some(Value::Map(m)) => !m.values().any(filled),
        }
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        Some(format!("empty({})", ctx.owner_ref()))
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(*self)
    }
}
