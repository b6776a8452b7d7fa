use super::{scalars, Check, ClientContext, RuleContext};
use crate::error::{FormError, Result};
use crate::node::NodeKind;

/// Checks the character count of every non-empty scalar of the value.
///
/// Empty values pass; pair with a required rule to reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    name: &'static str,
    min: usize,
    max: Option<usize>,
}

impl Length {
    /// Length between `min` and `max` inclusive.
    pub fn between(min: usize, max: usize) -> Result<Self> {
        if max < min || max == 0 {
            return Err(FormError::InvalidRuleConfig {
                rule: "length".to_string(),
                message: format!("invalid bounds {min}..={max}"),
            });
        }
        Ok(Self {
            name: "length",
            min,
            max: Some(max),
        })
    }

    /// Exact length.
    pub fn exactly(len: usize) -> Result<Self> {
        Self::between(len, len)
    }

    /// At least `min` characters.
    pub fn min(min: usize) -> Self {
        Self {
            name: "minlength",
            min,
            max: None,
        }
    }

    /// At most `max` characters.
    pub fn max(max: usize) -> Self {
        Self {
            name: "maxlength",
            min: 0,
            max: Some(max),
        }
    }

    fn accepts(&self, s: &str) -> bool {
        let len = s.chars().count();
        len == 0 || (len >= self.min && self.max.map_or(true, |max| len <= max))
    }
}

impl Check for Length {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        let value = ctx.value();
        scalars(value.as_ref()).into_iter().all(|s| self.accepts(s))
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        let max = self.max.map_or_else(|| "null".to_string(), |m| m.to_string());
        Some(format!("length({}, {}, {max})", ctx.owner_ref(), self.min))
    }

    fn check_owner(&self, kind: NodeKind) -> std::result::Result<(), String> {
        if kind.is_container() {
            return Err("length rules validate single elements only".to_string());
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let len = Length::between(2, 4).unwrap();
        assert!(len.accepts(""));
        assert!(!len.accepts("a"));
        assert!(len.accepts("ab"));
        assert!(len.accepts("ærø"));
        assert!(!len.accepts("abcde"));
        assert!(Length::between(5, 2).is_err());
        assert!(Length::between(0, 0).is_err());
    }

    #[test]
    fn test_open_bounds() {
        assert!(Length::min(3).accepts("abcdefgh"));
        assert!(!Length::min(3).accepts("ab"));
        assert!(!Length::max(3).accepts("abcd"));
    }
}
