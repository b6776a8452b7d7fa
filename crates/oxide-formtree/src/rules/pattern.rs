//! Regular expression checks.

use std::sync::LazyLock;

use regex::Regex;

use super::{quote, scalars, Check, ClientContext, RuleContext};
use crate::error::{FormError, Result};
use crate::node::NodeKind;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static pattern")
});

fn single_elements_only(kind: NodeKind) -> std::result::Result<(), String> {
    if kind.is_container() {
        return Err("pattern rules validate single elements only".to_string());
    }
    Ok(())
}

/// Matches every non-empty scalar against a regular expression.
///
/// Patterns may be given bare (`^\d+$`) or delimited with flags
/// (`/^abc$/i`).
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    negate: bool,
}

impl Pattern {
    /// Values must match.
    pub fn matching(pattern: &str) -> Result<Self> {
        Ok(Self {
            source: pattern.to_string(),
            regex: compile(pattern)?,
            negate: false,
        })
    }

    /// Values must not match.
    pub fn not_matching(pattern: &str) -> Result<Self> {
        Ok(Self {
            negate: true,
            ..Self::matching(pattern)?
        })
    }

    fn accepts(&self, s: &str) -> bool {
        s.is_empty() || self.regex.is_match(s) != self.negate
    }
}

/// Compiles a bare or `/delimited/flags` pattern.
fn compile(pattern: &str) -> Result<Regex> {
    let invalid = |message: String| FormError::InvalidRuleConfig {
        rule: "regex".to_string(),
        message,
    };
    let translated = match pattern.strip_prefix('/').and_then(|p| p.rsplit_once('/')) {
        Some((body, flags)) => {
            let mut inline = String::new();
            for flag in flags.chars() {
                match flag {
                    'i' | 'm' | 's' | 'x' => inline.push(flag),
                    'u' => {}
                    other => return Err(invalid(format!("unsupported flag {other:?}"))),
                }
            }
            if inline.is_empty() {
                body.to_string()
            } else {
                format!("(?{inline}){body}")
            }
        }
        None => pattern.to_string(),
    };
    Regex::new(&translated).map_err(|e| invalid(e.to_string()))
}

impl Check for Pattern {
    fn name(&self) -> &'static str {
        if self.negate {
            "notregex"
        } else {
            "regex"
        }
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        let value = ctx.value();
        scalars(value.as_ref()).into_iter().all(|s| self.accepts(s))
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        Some(format!(
            "{}({}, {})",
            self.name(),
            ctx.owner_ref(),
            quote(&self.source)
        ))
    }

    fn check_owner(&self, kind: NodeKind) -> std::result::Result<(), String> {
        single_elements_only(kind)
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(self.clone())
    }
}

/// Checks for a syntactically valid e-mail address.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Check for Email {
    fn name(&self) -> &'static str {
        "email"
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        let value = ctx.value();
        scalars(value.as_ref())
            .into_iter()
            .all(|s| s.is_empty() || EMAIL.is_match(s))
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        Some(format!("email({})", ctx.owner_ref()))
    }

    fn check_owner(&self, kind: NodeKind) -> std::result::Result<(), String> {
        single_elements_only(kind)
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_patterns() {
        let p = Pattern::matching("/^abc$/i").unwrap();
        assert!(p.accepts("ABC"));
        assert!(!p.accepts("abcd"));
        assert!(p.accepts(""));

        assert!(Pattern::matching("/x/q").is_err());
        assert!(Pattern::matching("(").is_err());
    }

    #[test]
    fn test_negated() {
        let p = Pattern::not_matching(r"\d").unwrap();
        assert!(p.accepts("abc"));
        assert!(!p.accepts("a1"));
        assert_eq!(p.name(), "notregex");
    }

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL.is_match("test@example.com"));
        assert!(EMAIL.is_match("user.name+tag@example.co.uk"));
        assert!(!EMAIL.is_match("invalid"));
        assert!(!EMAIL.is_match("@example.com"));
    }
}
