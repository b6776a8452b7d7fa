use std::fmt;

use crate::attributes::Attributes;
use crate::value::Value;

/// An application-defined leaf element.
///
/// The node keeps the common data (attributes, rules, filters, error); the
/// implementation decides how the value is stored and rendered.
pub trait CustomElement: Send + Sync + fmt::Debug {
    /// Type name used by renderers and error messages.
    fn type_name(&self) -> &str;

    /// The unfiltered value.
    fn raw_value(&self, attributes: &Attributes) -> Option<Value>;

    /// Stores a value coming from code or a data source.
    fn set_value(&mut self, attributes: &mut Attributes, value: Option<Value>);

    /// Whether the element can be frozen.
    fn is_freezable(&self) -> bool {
        true
    }

    /// Markup for the element itself.
    fn html(&self, attributes: &Attributes) -> String;
}
