//! Fact-model oracle
//!
//! The analyzer never owns field metadata. It asks a [`FactOracle`] for the
//! declared type of a `(fact type, field)` pair and for any enumeration bound
//! to it. [`FactModel`] is a static, document-backed implementation.
//!
//! ```yaml
//! facts:
//!   Driver:
//!     age: { type: Integer }
//!     name: { type: String }
//!     licensed: { type: Boolean }
//!   Policy:
//!     kind: { type: String, values: [basic, standard, premium] }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only lookup of field metadata
///
/// Implementations must tolerate concurrent reads; the analyzer never mutates.
pub trait FactOracle {
    /// Declared base type, or `None` for a free-format field
    fn type_of(&self, fact_type: &str, field: &str) -> Option<DeclaredType>;

    /// Enumerated values bound to the field; empty if none
    fn enum_values_of(&self, fact_type: &str, field: &str) -> Vec<String>;
}

impl<T: FactOracle + ?Sized> FactOracle for &T {
    fn type_of(&self, fact_type: &str, field: &str) -> Option<DeclaredType> {
        (**self).type_of(fact_type, field)
    }

    fn enum_values_of(&self, fact_type: &str, field: &str) -> Vec<String> {
        (**self).enum_values_of(fact_type, field)
    }
}

/// Base type as reported by the fact model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeclaredType {
    String,
    Numeric,
    Boolean,
    Date,
    /// A type name the analyzer does not understand (kept for diagnostics)
    Other(String),
}

impl From<String> for DeclaredType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "String" => DeclaredType::String,
            "Numeric" | "Integer" | "Long" | "Short" | "Byte" | "Double" | "Float"
            | "BigDecimal" | "BigInteger" => DeclaredType::Numeric,
            "Boolean" => DeclaredType::Boolean,
            "Date" => DeclaredType::Date,
            _ => DeclaredType::Other(name),
        }
    }
}

impl From<&str> for DeclaredType {
    fn from(name: &str) -> Self {
        DeclaredType::from(name.to_string())
    }
}

impl From<DeclaredType> for String {
    fn from(t: DeclaredType) -> Self {
        match t {
            DeclaredType::String => "String".into(),
            DeclaredType::Numeric => "Numeric".into(),
            DeclaredType::Boolean => "Boolean".into(),
            DeclaredType::Date => "Date".into(),
            DeclaredType::Other(name) => name,
        }
    }
}

/// Field metadata entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Omitted means free-format
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<DeclaredType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Static fact model loaded from a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactModel {
    #[serde(default)]
    pub facts: BTreeMap<String, BTreeMap<String, FieldDefinition>>,
}

impl FactModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field registration
    pub fn with_field(
        mut self,
        fact_type: &str,
        field: &str,
        typ: Option<DeclaredType>,
        values: &[&str],
    ) -> Self {
        self.facts.entry(fact_type.to_string()).or_default().insert(
            field.to_string(),
            FieldDefinition {
                typ,
                values: values.iter().map(|v| v.to_string()).collect(),
            },
        );
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml)
            .map_err(|e| Error::TableParse(format!("Failed to parse fact model: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::TableParse(format!("Failed to parse fact model: {}", e)))
    }

    /// Load a `.json`, `.yaml` or `.yml` fact model
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    fn field(&self, fact_type: &str, field: &str) -> Option<&FieldDefinition> {
        self.facts.get(fact_type)?.get(field)
    }
}

impl FactOracle for FactModel {
    fn type_of(&self, fact_type: &str, field: &str) -> Option<DeclaredType> {
        self.field(fact_type, field)?.typ.clone()
    }

    fn enum_values_of(&self, fact_type: &str, field: &str) -> Vec<String> {
        self.field(fact_type, field)
            .map(|f| f.values.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_names() {
        assert_eq!(DeclaredType::from("Integer"), DeclaredType::Numeric);
        assert_eq!(DeclaredType::from("BigDecimal"), DeclaredType::Numeric);
        assert_eq!(DeclaredType::from("Date"), DeclaredType::Date);
        assert_eq!(
            DeclaredType::from("Address"),
            DeclaredType::Other("Address".into())
        );
    }

    #[test]
    fn test_fact_model_from_yaml() {
        let model = FactModel::from_yaml(
            r#"
facts:
  Driver:
    age: { type: Integer }
    nickname: {}
  Policy:
    kind: { type: String, values: [basic, premium] }
"#,
        )
        .unwrap();

        assert_eq!(model.type_of("Driver", "age"), Some(DeclaredType::Numeric));
        assert_eq!(model.type_of("Driver", "nickname"), None);
        assert_eq!(model.type_of("Driver", "missing"), None);
        assert_eq!(model.type_of("Nobody", "age"), None);
        assert_eq!(
            model.enum_values_of("Policy", "kind"),
            vec!["basic", "premium"]
        );
        assert!(model.enum_values_of("Driver", "age").is_empty());
    }

    #[test]
    fn test_builder() {
        let model = FactModel::new().with_field(
            "Driver",
            "licensed",
            Some(DeclaredType::Boolean),
            &[],
        );
        let oracle: &dyn FactOracle = &model;
        assert_eq!(
            oracle.type_of("Driver", "licensed"),
            Some(DeclaredType::Boolean)
        );
    }
}
