use fake::faker::address::en::{CityName, CountryName};
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::internet::en::{Password, SafeEmail, Username};
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::adapters::schema_registry::SchemaRegistry;
use crate::domain::record::GeneratedRecord;
use crate::domain::schema::Generator;
use crate::error::{FieldIssue, SchemaError, SchemaResult};

/// Per-test fixture parameters: a schema name plus the values that matter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureParams {
    pub schema: String,
    #[serde(default)]
    pub body: Map<String, Value>,
}

impl FixtureParams {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            body: Map::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.body.insert(field.into(), value);
        self
    }
}

/// Builds schema-valid records from partial overrides
#[derive(Debug, Clone)]
pub struct DataFactory {
    registry: Arc<SchemaRegistry>,
}

impl DataFactory {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Build a record for `schema`.
    ///
    /// Overridden fields keep their literal value; every other field is
    /// generated. Keys outside the schema fail the build before anything is
    /// generated.
    pub fn build(&self, schema: &str, overrides: &Map<String, Value>) -> SchemaResult<GeneratedRecord> {
        let definition = self.registry.lookup(schema)?;

        let mut extra: Vec<String> = overrides
            .keys()
            .filter(|key| !definition.contains(key))
            .cloned()
            .collect();
        if !extra.is_empty() {
            extra.sort();
            return Err(SchemaError::UnexpectedField {
                schema: schema.to_string(),
                extra,
            });
        }

        let mut values = Vec::with_capacity(definition.fields().len());
        let mut issues = Vec::new();
        for field in definition.fields() {
            let value = match overrides.get(&field.name) {
                Some(value) => value.clone(),
                None => field.generator.as_ref().map(generate).unwrap_or(Value::Null),
            };
            if let Err(reason) = field.check(&value) {
                issues.push(FieldIssue {
                    field: field.name.clone(),
                    reason,
                });
            }
            values.push((field.name.clone(), value));
        }

        if !issues.is_empty() {
            return Err(SchemaError::Validation {
                schema: schema.to_string(),
                issues,
            });
        }

        tracing::debug!(
            "Built '{}' record ({} overridden, {} generated)",
            schema,
            overrides.len(),
            values.len() - overrides.len()
        );
        Ok(GeneratedRecord::new(schema, values))
    }

    pub fn build_params(&self, params: &FixtureParams) -> SchemaResult<GeneratedRecord> {
        self.build(&params.schema, &params.body)
    }

    /// Build with no overrides
    pub fn build_default(&self, schema: &str) -> SchemaResult<GeneratedRecord> {
        self.build(schema, &Map::new())
    }
}

/// Produce one value from a generator
pub fn generate(generator: &Generator) -> Value {
    match generator {
        // Personal
        Generator::FullName => json!(Name().fake::<String>()),
        Generator::FirstName => json!(FirstName().fake::<String>()),
        Generator::LastName => json!(LastName().fake::<String>()),
        Generator::Username => json!(Username().fake::<String>()),

        // Contact and credentials
        Generator::Email => json!(SafeEmail().fake::<String>()),
        Generator::Phone => json!(PhoneNumber().fake::<String>()),
        Generator::Password { length } => {
            let length = (*length).max(1);
            json!(Password(length..length + 1).fake::<String>())
        }
        Generator::CreditCard => json!(CreditCardNumber().fake::<String>()),

        // Address
        Generator::City => json!(CityName().fake::<String>()),
        Generator::Country => json!(CountryName().fake::<String>()),

        // Text
        Generator::Word => json!(Word().fake::<String>()),
        Generator::Sentence => json!(Sentence(1..10).fake::<String>()),

        // Identifiers and numbers
        Generator::Uuid => json!(uuid::Uuid::new_v4().to_string()),
        Generator::Integer { min, max } => {
            let (low, high) = if min <= max { (*min, *max) } else { (*max, *min) };
            json!(rand::thread_rng().gen_range(low..=high))
        }
        Generator::Constant { value } => value.clone(),
    }
}
