//! Schema files.
//!
//! Every `*.json`, `*.yaml`, `*.yml` or `*.toml` file in a schema directory
//! holds one [`SchemaConfig`]:
//!
//! ```yaml
//! name: premium-trial
//! description: Premium user on a trial plan
//! extends: premium
//! fields:
//!   - name: trial_days
//!     type: integer
//!     generator: { faker: integer, min: 7, max: 30 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::schema::FieldSpec;
use crate::error::{SchemaError, SchemaResult};

/// One schema as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of a schema whose fields come first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// Read every schema file in `dir`, in path order.
pub fn load_schema_dir(dir: &Path) -> SchemaResult<Vec<SchemaConfig>> {
    if !dir.is_dir() {
        return Err(SchemaError::Load {
            path: dir.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let pattern = format!("{}/*", dir.display());
    let entries = glob::glob(&pattern).map_err(|e| SchemaError::Load {
        path: pattern.clone(),
        reason: e.to_string(),
    })?;

    let mut configs = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if let Some(config) = load_schema_file(&path)? {
                    configs.push(config);
                }
            }
            Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
        }
    }
    Ok(configs)
}

/// Parse one schema file; files with other extensions yield `None`.
pub fn load_schema_file(path: &Path) -> SchemaResult<Option<SchemaConfig>> {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if matches!(ext, "json" | "yaml" | "yml" | "toml") => ext,
        _ => return Ok(None),
    };

    let load_error = |reason: String| SchemaError::Load {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let config: SchemaConfig = match ext {
        "json" => serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?,
        "toml" => toml::from_str(&content).map_err(|e| load_error(e.to_string()))?,
        _ => serde_yaml::from_str(&content).map_err(|e| load_error(e.to_string()))?,
    };

    tracing::debug!("Loaded schema '{}' from {}", config.name, path.display());
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FieldKind, Generator};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_loads_all_formats_and_skips_others() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{ "name": "a", "fields": [{ "name": "id", "type": "uuid", "generator": { "faker": "uuid" } }] }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.toml"),
            r#"
name = "b"

[[fields]]
name = "age"
type = "integer"
generator = { faker = "integer", min = 18, max = 65 }
"#,
        )
        .unwrap();
        fs::write(dir.path().join("c.yml"), "name: c\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let configs = load_schema_dir(dir.path()).unwrap();
        let names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        assert_eq!(configs[0].fields[0].kind, FieldKind::Uuid);
        assert_eq!(
            configs[1].fields[0].generator,
            Some(Generator::Integer { min: 18, max: 65 })
        );
        assert!(configs[2].fields.is_empty());
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let err = load_schema_dir(dir.path()).unwrap_err();
        assert!(matches!(&err, SchemaError::Load { path, .. } if path.ends_with("bad.json")));
    }

    #[test]
    fn test_missing_dir() {
        let err = load_schema_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, SchemaError::Load { .. }));
    }
}
