use std::cmp::Ordering;

use super::{quote, Check, ClientContext, RuleContext};
use crate::node::{NodeKey, NodeKind};
use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`, numeric when both sides are numbers.
    Eq,
    /// `!=`
    Ne,
    /// `===`, always a string comparison.
    Identical,
    /// `!==`
    NotIdentical,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Parses an operator token.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "==" | "eq" => Self::Eq,
            "!=" | "<>" | "ne" => Self::Ne,
            "===" => Self::Identical,
            "!==" => Self::NotIdentical,
            "<" | "lt" => Self::Lt,
            "<=" | "lte" => Self::Le,
            ">" | "gt" => Self::Gt,
            ">=" | "gte" => Self::Ge,
            _ => return None,
        })
    }

    /// The operator token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Identical => "===",
            Self::NotIdentical => "!==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq | Self::Identical => ordering == Ordering::Equal,
            Self::Ne | Self::NotIdentical => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// The value of another element.
    Element(NodeKey),
    /// A fixed value.
    Literal(String),
}

/// Compares the owner's value with an operand.
#[derive(Debug, Clone)]
pub struct Compare {
    op: CompareOp,
    operand: Operand,
}

impl Compare {
    /// Creates the check.
    pub fn new(op: CompareOp, operand: Operand) -> Self {
        Self { op, operand }
    }

    fn compare(&self, left: &str, right: &str) -> bool {
        let ordering = match self.op {
            CompareOp::Identical | CompareOp::NotIdentical => left.cmp(right),
            _ => match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
                (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Less),
                _ => left.cmp(right),
            },
        };
        self.op.holds(ordering)
    }
}

fn scalar(value: Option<Value>) -> String {
    match value {
        Some(Value::Str(s)) => s,
        _ => String::new(),
    }
}

impl Check for Compare {
    fn name(&self) -> &'static str {
        "compare"
    }

    fn validate_owner(&self, ctx: &mut RuleContext<'_>) -> bool {
        let left = scalar(ctx.value());
        let right = match &self.operand {
            Operand::Element(key) => scalar(ctx.value_of(*key)),
            Operand::Literal(s) => s.clone(),
        };
        self.compare(&left, &right)
    }

    fn javascript(&self, ctx: &ClientContext<'_>) -> Option<String> {
        let operand = match &self.operand {
            Operand::Element(key) => ctx.node_ref(*key),
            Operand::Literal(s) => format!("{{\"literal\": {}}}", quote(s)),
        };
        Some(format!(
            "compare({}, {}, {operand})",
            ctx.owner_ref(),
            quote(self.op.as_str())
        ))
    }

    fn check_owner(&self, kind: NodeKind) -> std::result::Result<(), String> {
        if kind.is_container() {
            return Err("compare rules validate single elements only".to_string());
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Check> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(op: CompareOp, right: &str) -> Compare {
        Compare::new(op, Operand::Literal(right.to_string()))
    }

    #[test]
    fn test_numeric_comparison() {
        assert!(literal(CompareOp::Eq, "10").compare("10.0", "10"));
        assert!(!literal(CompareOp::Identical, "10").compare("10.0", "10"));
        assert!(literal(CompareOp::Gt, "9").compare("10", "9"));
        assert!(literal(CompareOp::Le, "9").compare("9", "9"));
    }

    #[test]
    fn test_string_fallback() {
        assert!(literal(CompareOp::Lt, "b").compare("a", "b"));
        assert!(literal(CompareOp::Ne, "b").compare("a", "b"));
    }

    #[test]
    fn test_operator_tokens() {
        for token in ["==", "!=", "===", "!==", "<", "<=", ">", ">="] {
            assert_eq!(CompareOp::parse(token).map(CompareOp::as_str), Some(token));
        }
        assert!(CompareOp::parse("~").is_none());
    }
}
