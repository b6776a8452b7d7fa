//! Template substitution.
//!
//! Templates are plain strings with `{name}` placeholders and optional
//! sections delimited by `<qf:name>` and `</qf:name>`. A section is kept
//! (without its markers) when its condition holds and removed otherwise.

use crate::error::{RenderError, Result};

/// Section names understood by the default renderer.
pub const SECTIONS: &[&str] = &["label", "error", "required", "reqnote"];

/// Checks that `template` closes every known section and contains
/// `placeholder`.
pub fn check(slot: &str, template: &str, placeholder: &'static str) -> Result<()> {
    check_sections(template)?;
    if !template.contains(placeholder) {
        return Err(RenderError::MissingPlaceholder {
            slot: slot.to_string(),
            placeholder,
        });
    }
    Ok(())
}

/// Checks that `template` closes every known section it opens.
pub fn check_sections(template: &str) -> Result<()> {
    for name in SECTIONS {
        let open = format!("<qf:{name}>");
        let close = format!("</qf:{name}>");
        let mut rest = template;
        while let Some(start) = rest.find(&open) {
            let after = &rest[start + open.len()..];
            let Some(end) = after.find(&close) else {
                return Err(RenderError::UnclosedSection((*name).to_string()));
            };
            rest = &after[end + close.len()..];
        }
    }
    Ok(())
}

/// Resolves sections, then substitutes placeholders in a single pass so that
/// substituted text is never scanned again.
pub fn fill(template: &str, sections: &[(&str, bool)], values: &[(&str, &str)]) -> String {
    let mut text = template.to_string();
    for (name, keep) in sections {
        text = resolve_section(&text, name, *keep);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let replaced = tail.find('}').and_then(|end| {
            let key = &tail[1..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (end, *value))
        });
        if let Some((end, value)) = replaced {
            out.push_str(value);
            rest = &tail[end + 1..];
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn resolve_section(text: &str, name: &str, keep: bool) -> String {
    let open = format!("<qf:{name}>");
    let close = format!("</qf:{name}>");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(&close) else {
            break;
        };
        out.push_str(&rest[..start]);
        if keep {
            out.push_str(&after[..end]);
        }
        rest = &after[end + close.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_and_placeholders() {
        let tpl = "<qf:label><label>{label}</label></qf:label>{element}<qf:error>!</qf:error>";
        let html = fill(
            tpl,
            &[("label", true), ("error", false)],
            &[("label", "Name"), ("element", "<input>")],
        );
        assert_eq!(html, "<label>Name</label><input>");
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let html = fill("{a}{b}", &[], &[("a", "{b}"), ("b", "x")]);
        assert_eq!(html, "{b}x");
        assert_eq!(fill("{unknown}", &[], &[]), "{unknown}");
    }

    #[test]
    fn test_check() {
        assert!(check("element", "<div>{element}</div>", "{element}").is_ok());
        assert!(matches!(
            check("element", "<div></div>", "{element}"),
            Err(RenderError::MissingPlaceholder { .. })
        ));
        assert!(matches!(
            check("element", "<qf:error>{element}", "{element}"),
            Err(RenderError::UnclosedSection(_))
        ));
    }
}
