//! Parameter collectors.
//!
//! While a statement is formatted, every bindable literal is handed to the
//! active collector, which registers the value and returns the placeholder
//! text that stands for it. Parameters are kept in an append-only vector in
//! emission order.

use crate::rules::DialectRules;
use relmap_core::naming::to_snake_case;
use relmap_core::{BindingStyle, SqlType, Value};
use std::fmt;

/// One bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// 0-based emission order
    pub index: usize,
    /// Placeholder name, for named binding
    pub name: Option<String>,
    pub value: Value,
    pub sql_type: Option<SqlType>,
}

pub trait ParameterCollector: fmt::Debug {
    /// Register `value` and return its placeholder text.
    ///
    /// `hint` is the nearest property path or column the literal is compared
    /// with or assigned to, if any.
    fn collect(
        &mut self,
        value: Value,
        sql_type: Option<SqlType>,
        hint: Option<&str>,
        rules: &dyn DialectRules,
    ) -> String;

    fn parameters(&self) -> &[Parameter];

    fn into_parameters(self: Box<Self>) -> Vec<Parameter>;
}

/// A fresh collector for `binding`.
pub fn collector_for(binding: BindingStyle) -> Box<dyn ParameterCollector> {
    match binding {
        BindingStyle::Indexed => Box::new(IndexedCollector::default()),
        BindingStyle::Named { merge } => Box::new(NamedCollector::new(merge)),
        BindingStyle::Inline => Box::new(InlineCollector),
    }
}

/// Positional placeholders in the dialect's syntax (`?`, `$1`, `?1`).
#[derive(Debug, Default)]
pub struct IndexedCollector {
    parameters: Vec<Parameter>,
}

impl ParameterCollector for IndexedCollector {
    fn collect(
        &mut self,
        value: Value,
        sql_type: Option<SqlType>,
        _hint: Option<&str>,
        rules: &dyn DialectRules,
    ) -> String {
        let index = self.parameters.len();
        self.parameters.push(Parameter {
            index,
            name: None,
            value,
            sql_type,
        });
        rules.placeholder(index + 1)
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn into_parameters(self: Box<Self>) -> Vec<Parameter> {
        self.parameters
    }
}

/// `:name` placeholders.
///
/// The name derives from the hint; clashing names get a numeric suffix
/// (`name`, `name1`, `name2`). With `merge`, a literal whose base name and
/// value equal an earlier parameter's reuses that parameter.
#[derive(Debug, Default)]
pub struct NamedCollector {
    merge: bool,
    parameters: Vec<Parameter>,
    /// Base name of each parameter, parallel to `parameters`
    bases: Vec<String>,
}

impl NamedCollector {
    pub fn new(merge: bool) -> Self {
        Self {
            merge,
            ..Self::default()
        }
    }

    fn is_taken(&self, name: &str) -> bool {
        self.parameters
            .iter()
            .any(|p| p.name.as_deref() == Some(name))
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.is_taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.is_taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

impl ParameterCollector for NamedCollector {
    fn collect(
        &mut self,
        value: Value,
        sql_type: Option<SqlType>,
        hint: Option<&str>,
        _rules: &dyn DialectRules,
    ) -> String {
        let base = base_name(hint);
        if self.merge {
            let existing = self
                .parameters
                .iter()
                .zip(&self.bases)
                .find(|(p, b)| **b == base && p.value == value)
                .and_then(|(p, _)| p.name.clone());
            if let Some(name) = existing {
                tracing::trace!(name = %name, "merge parameter");
                return format!(":{}", name);
            }
        }
        let name = self.unique_name(&base);
        self.parameters.push(Parameter {
            index: self.parameters.len(),
            name: Some(name.clone()),
            value,
            sql_type,
        });
        self.bases.push(base);
        format!(":{}", name)
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn into_parameters(self: Box<Self>) -> Vec<Parameter> {
        self.parameters
    }
}

/// Literals rendered as dialect literal text; nothing is bound.
#[derive(Debug, Default)]
pub struct InlineCollector;

impl ParameterCollector for InlineCollector {
    fn collect(
        &mut self,
        value: Value,
        _sql_type: Option<SqlType>,
        _hint: Option<&str>,
        rules: &dyn DialectRules,
    ) -> String {
        rules.literal(&value)
    }

    fn parameters(&self) -> &[Parameter] {
        &[]
    }

    fn into_parameters(self: Box<Self>) -> Vec<Parameter> {
        Vec::new()
    }
}

/// `geoLocation.latitude` -> `geo_location_latitude`; `param` without a hint.
fn base_name(hint: Option<&str>) -> String {
    let name: String = hint
        .unwrap_or_default()
        .split(['.', '$'])
        .filter(|s| !s.is_empty())
        .map(to_snake_case)
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        "param".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialects::{Generic, Postgres};

    #[test]
    fn indexed_placeholders_follow_the_dialect() {
        let mut collector = IndexedCollector::default();
        assert_eq!(collector.collect(Value::Int(1), None, None, &Postgres), "$1");
        assert_eq!(collector.collect(Value::Int(2), None, None, &Postgres), "$2");
        assert_eq!(collector.collect(Value::Int(3), None, None, &Generic), "?");
        let indices: Vec<_> = collector.parameters().iter().map(|p| p.index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn named_collisions_get_suffixes() {
        let mut collector = NamedCollector::new(false);
        assert_eq!(collector.collect(Value::Int(1), None, Some("name"), &Generic), ":name");
        assert_eq!(collector.collect(Value::Int(1), None, Some("name"), &Generic), ":name1");
        assert_eq!(collector.collect(Value::Int(2), None, Some("name"), &Generic), ":name2");
        assert_eq!(collector.collect(Value::Int(2), None, None, &Generic), ":param");
        assert_eq!(collector.parameters().len(), 4);
    }

    #[test]
    fn merge_reuses_equal_values_only() {
        let mut collector = NamedCollector::new(true);
        let a = collector.collect(Value::Text("x".into()), None, Some("name"), &Generic);
        let b = collector.collect(Value::Text("x".into()), None, Some("name"), &Generic);
        let c = collector.collect(Value::Text("y".into()), None, Some("name"), &Generic);
        let d = collector.collect(Value::Text("y".into()), None, Some("name"), &Generic);
        assert_eq!((a.as_str(), b.as_str()), (":name", ":name"));
        assert_eq!((c.as_str(), d.as_str()), (":name1", ":name1"));
        assert_eq!(collector.parameters().len(), 2);
    }

    #[test]
    fn merge_requires_the_same_base_name() {
        let mut collector = NamedCollector::new(true);
        collector.collect(Value::Int(1), None, Some("a"), &Generic);
        collector.collect(Value::Int(1), None, Some("b"), &Generic);
        assert_eq!(collector.parameters().len(), 2);
    }

    #[test]
    fn base_names_come_from_property_paths() {
        assert_eq!(base_name(Some("geoLocation.latitude")), "geo_location_latitude");
        assert_eq!(base_name(Some("GEO_LOCATION$LATITUDE")), "geo_location_latitude");
        assert_eq!(base_name(Some("first name")), "firstname");
        assert_eq!(base_name(Some("")), "param");
        assert_eq!(base_name(None), "param");
    }

    #[test]
    fn inline_binds_nothing() {
        let mut collector = InlineCollector;
        assert_eq!(
            collector.collect(Value::Text("John Doe".into()), None, Some("name"), &Generic),
            "'John Doe'"
        );
        assert_eq!(collector.collect(Value::Bool(true), None, None, &Generic), "TRUE");
        assert!(collector.parameters().is_empty());
    }
}
