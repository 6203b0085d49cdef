//! Field type resolution
//!
//! Classifies a condition column so the right value detector can be built.
//! Resolution never fails: anything that cannot be classified is free-format.

use crate::oracle::{DeclaredType, FactOracle};
use crate::table::{ConditionColumn, Pattern};
use serde::{Deserialize, Serialize};

/// Semantic type of a condition column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    String,
    Numeric,
    Date,
    Enumerated(Vec<String>),
    FreeFormat,
}

impl FieldType {
    /// Cell tag expected for this type (enumerations hold strings)
    pub fn cell_type_name(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::String | FieldType::Enumerated(_) => "string",
            FieldType::Numeric => "numeric",
            FieldType::Date => "date",
            FieldType::FreeFormat => "any",
        }
    }
}

/// Resolve the type of `column` on `pattern`
///
/// Order: limited entry forces boolean; a column value list or oracle
/// enumeration forces enumerated; otherwise the declared base type.
pub fn resolve<O: FactOracle + ?Sized>(
    pattern: &Pattern,
    column: &ConditionColumn,
    oracle: &O,
) -> FieldType {
    if column.limited_entry {
        return FieldType::Boolean;
    }

    let mut values = column.declared_values();
    if values.is_empty() {
        values = oracle.enum_values_of(&pattern.fact_type, &column.field);
    }
    if !values.is_empty() {
        return FieldType::Enumerated(values);
    }

    match oracle.type_of(&pattern.fact_type, &column.field) {
        Some(DeclaredType::String) => FieldType::String,
        Some(DeclaredType::Numeric) => FieldType::Numeric,
        Some(DeclaredType::Boolean) => FieldType::Boolean,
        Some(DeclaredType::Date) => FieldType::Date,
        Some(DeclaredType::Other(name)) => {
            tracing::debug!(
                fact_type = %pattern.fact_type,
                field = %column.field,
                declared = %name,
                "unrecognized field type, treating as free-format"
            );
            FieldType::FreeFormat
        }
        None => FieldType::FreeFormat,
    }
}
