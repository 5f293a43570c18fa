use std::collections::HashMap;
use std::path::Path;

use crate::config::schema::{load_schema_dir, SchemaConfig};
use crate::domain::schema::{FieldKind, FieldSpec, Generator, SchemaDefinition};
use crate::error::{SchemaError, SchemaResult};

/// Registry key of the public user shape
pub const PUBLIC_USER_SCHEMA: &str = "/api/users";
/// Registry key of the premium user shape
pub const PREMIUM_USER_SCHEMA: &str = "premium";

/// Read-only table of schema definitions.
///
/// Built once at startup and shared (usually behind an `Arc`) with every
/// [`DataFactory`](crate::adapters::data_factory::DataFactory). There is no
/// registration after construction.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaDefinition>,
}

impl SchemaRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = SchemaDefinition>,
    ) -> SchemaResult<Self> {
        let mut schemas = HashMap::new();
        for definition in definitions {
            let name = definition.name().to_string();
            if schemas.insert(name.clone(), definition).is_some() {
                return Err(SchemaError::DuplicateSchema(name));
            }
        }
        Ok(Self { schemas })
    }

    /// The user schemas shipped with the crate.
    pub fn builtin() -> SchemaResult<Self> {
        Self::from_definitions(builtin_definitions()?)
    }

    /// Builtin schemas overlaid with every schema file in `dir`.
    ///
    /// A file may replace a builtin of the same name. Two files declaring the
    /// same name is an error. `extends` may name a builtin or another file.
    pub fn load_dir(dir: impl AsRef<Path>) -> SchemaResult<Self> {
        let mut registry = Self::builtin()?;
        let configs = load_schema_dir(dir.as_ref())?;

        let mut declared = std::collections::HashSet::new();
        for config in &configs {
            if !declared.insert(config.name.clone()) {
                return Err(SchemaError::DuplicateSchema(config.name.clone()));
            }
        }

        registry.resolve_configs(configs)?;
        tracing::info!(
            "Loaded schema registry with {} schemas from {}",
            registry.len(),
            dir.as_ref().display()
        );
        Ok(registry)
    }

    /// Insert configs whose parents are known, repeating until all are placed.
    fn resolve_configs(&mut self, mut pending: Vec<SchemaConfig>) -> SchemaResult<()> {
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();

            for config in pending {
                let parent = match &config.extends {
                    None => None,
                    Some(parent) => match self.schemas.get(parent) {
                        Some(definition) => Some(definition.clone()),
                        None => {
                            deferred.push(config);
                            continue;
                        }
                    },
                };

                let definition = match parent {
                    Some(parent) => parent.extend(config.name.clone(), config.fields)?,
                    None => SchemaDefinition::new(config.name.clone(), config.fields)?,
                };
                self.schemas.insert(config.name, definition);
            }

            if deferred.len() == before {
                let config = &deferred[0];
                return Err(SchemaError::InvalidDefinition {
                    schema: config.name.clone(),
                    reason: format!(
                        "extends unknown schema '{}'",
                        config.extends.as_deref().unwrap_or_default()
                    ),
                });
            }
            pending = deferred;
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> SchemaResult<&SchemaDefinition> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn builtin_definitions() -> SchemaResult<Vec<SchemaDefinition>> {
    let public = SchemaDefinition::new(
        PUBLIC_USER_SCHEMA,
        vec![
            FieldSpec::required("name", FieldKind::String, Generator::FullName),
            FieldSpec::required("email", FieldKind::Email, Generator::Email),
            FieldSpec::required(
                "password",
                FieldKind::String,
                Generator::Password { length: 12 },
            ),
        ],
    )?;

    let premium = public.extend(
        PREMIUM_USER_SCHEMA,
        vec![
            FieldSpec::required("subscription_id", FieldKind::String, Generator::Uuid),
            FieldSpec::optional("credit_card", FieldKind::String, Some(Generator::CreditCard)),
        ],
    )?;

    Ok(vec![public, premium])
}
