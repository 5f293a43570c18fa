//! Declared data shapes for synthetic records.
//!
//! A [`SchemaDefinition`] is an ordered list of [`FieldSpec`]s. Definitions
//! are checked when constructed, so a registry never holds a schema that
//! could fail to produce a required field.
//!
//! ## Example schema file
//!
//! ```yaml
//! name: /api/users
//! fields:
//!   - name: name
//!     type: string
//!     generator: { faker: full_name }
//!   - name: email
//!     type: email
//!     generator: { faker: email }
//!   - name: nickname
//!     type: string
//!     required: false
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};

/// Value shape accepted by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Email,
    Integer,
    Number,
    Boolean,
    Uuid,
    Any,
}

impl FieldKind {
    /// Check a non-null value against this kind.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            FieldKind::Any => Ok(()),
            FieldKind::String => expect_kind(value.is_string(), "a string", value),
            FieldKind::Integer => expect_kind(value.is_i64() || value.is_u64(), "an integer", value),
            FieldKind::Number => expect_kind(value.is_number(), "a number", value),
            FieldKind::Boolean => expect_kind(value.is_boolean(), "a boolean", value),
            FieldKind::Email => {
                let text = value
                    .as_str()
                    .ok_or_else(|| format!("expected an email string, got {}", type_name(value)))?;
                match text.split_once('@') {
                    Some((local, domain))
                        if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
                    {
                        Ok(())
                    }
                    _ => Err(format!("'{}' is not a valid email address", text)),
                }
            }
            FieldKind::Uuid => {
                let text = value
                    .as_str()
                    .ok_or_else(|| format!("expected a UUID string, got {}", type_name(value)))?;
                uuid::Uuid::parse_str(text)
                    .map(|_| ())
                    .map_err(|e| format!("'{}' is not a valid UUID: {}", text, e))
            }
        }
    }
}

fn expect_kind(ok: bool, wanted: &str, value: &Value) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(format!("expected {}, got {}", wanted, type_name(value)))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Default value producer for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "faker", rename_all = "snake_case")]
pub enum Generator {
    FullName,
    FirstName,
    LastName,
    Username,
    Email,
    Password {
        #[serde(default = "default_password_length")]
        length: usize,
    },
    Phone,
    City,
    Country,
    Word,
    Sentence,
    Uuid,
    CreditCard,
    Integer {
        #[serde(default)]
        min: i64,
        #[serde(default = "default_integer_max")]
        max: i64,
    },
    Constant {
        value: Value,
    },
}

fn default_password_length() -> usize {
    12
}

fn default_integer_max() -> i64 {
    100
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub generator: Option<Generator>,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, kind: FieldKind, generator: Generator) -> Self {
        Self {
            name: name.into(),
            kind,
            generator: Some(generator),
            required: true,
        }
    }

    /// A nullable field; without a generator it defaults to `null`.
    pub fn optional(name: impl Into<String>, kind: FieldKind, generator: Option<Generator>) -> Self {
        Self {
            name: name.into(),
            kind,
            generator,
            required: false,
        }
    }

    /// Check a value (override or generated) against this field.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            if self.required {
                return Err("field is required and must not be null".to_string());
            }
            return Ok(());
        }
        self.kind.check(value)
    }
}

/// A named record shape with a forbid-extra-fields policy
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    name: String,
    fields: Vec<FieldSpec>,
}

impl SchemaDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::InvalidDefinition {
                schema: name,
                reason: "schema name must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(SchemaError::InvalidDefinition {
                    schema: name,
                    reason: "field name must not be empty".to_string(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::InvalidDefinition {
                    schema: name,
                    reason: format!("field '{}' is declared more than once", field.name),
                });
            }
            if field.required && field.generator.is_none() {
                return Err(SchemaError::InvalidDefinition {
                    schema: name,
                    reason: format!("required field '{}' has no generator", field.name),
                });
            }
        }

        Ok(Self { name, fields })
    }

    /// Derive a new schema carrying every field of `self` followed by `extra`.
    pub fn extend(&self, name: impl Into<String>, extra: Vec<FieldSpec>) -> SchemaResult<Self> {
        let mut fields = self.fields.clone();
        fields.extend(extra);
        Self::new(name, fields)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
