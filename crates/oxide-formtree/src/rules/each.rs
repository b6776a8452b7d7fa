use super::{Check, ClientContext, RuleContext};
use crate::error::{FormError, Result};
use crate::node::NodeKind;

/// Applies a template check to every leaf of a container.
///
/// Leaves are visited depth-first and the first failing leaf fails the
/// whole check.
#[derive(Debug, Clone)]
pub struct Each {
    template: Box<dyn Check>,
}

impl Each {
    /// Wraps a template; "required" cannot be used as one since it already
    /// knows how to validate containers.
    pub fn new(template: Box<dyn Check>) -> Result<Self> {
        if template.is_required() {
            return Err(FormError::InvalidRuleConfig {
                rule: "each".to_string(),
                message: "cannot use \"required\" as a template".to_string(),
            });
        }
        Ok(Self { template })
    }
}

impl Check for Each {
    fn name(&self) -> &'static str {
        "each"
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        let leaves = ctx.form().leaves(ctx.owner());
        leaves
            .into_iter()
            .all(|leaf| self.template.validate_owner(&mut ctx.for_owner(leaf)))
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        let leaves = ctx.form().leaves(ctx.owner());
        let callbacks = leaves
            .into_iter()
            .map(|leaf| self.template.javascript(&ctx.for_owner(leaf)))
            .collect::<Option<Vec<_>>>()?;
        Some(format!("each([{}])", callbacks.join(", ")))
    }

    fn check_owner(&self, kind: NodeKind) -> std::result::Result<(), String> {
        if !kind.is_container() {
            return Err("each rules validate containers only".to_string());
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(self.clone())
    }
}
