use thiserror::Error;

use crate::config::{ApiSettings, ResourceSettings, RetrySettings, Settings};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Collect every problem in `settings` rather than stopping at the first.
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_api(&settings.api) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_retry(&settings.retry) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_resource(&settings.resource) {
            errors.extend(e);
        }

        if let Some(dir) = &settings.schemas_dir {
            if dir.is_empty() {
                errors.push(ValidationError::InvalidValue {
                    field: "schemas_dir".to_string(),
                    reason: "must not be empty when set".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_api(api: &ApiSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if api.timeout_secs == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if api.excerpt_limit == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "api.excerpt_limit".to_string(),
                reason: "Excerpt limit must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_retry(retry: &RetrySettings) -> Result<(), Vec<ValidationError>> {
        if retry.attempts == 0 {
            return Err(vec![ValidationError::InvalidValue {
                field: "retry.attempts".to_string(),
                reason: "At least one attempt is required".to_string(),
            }]);
        }
        Ok(())
    }

    fn validate_resource(resource: &ResourceSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if resource.create_url.is_empty() {
            errors.push(ValidationError::MissingField("resource.create_url".to_string()));
        }

        if resource.delete_url.is_empty() {
            errors.push(ValidationError::MissingField("resource.delete_url".to_string()));
        } else if !resource.delete_url.contains("{id}") {
            errors.push(ValidationError::InvalidValue {
                field: "resource.delete_url".to_string(),
                reason: "must contain an '{id}' placeholder".to_string(),
            });
        }

        if resource.id_field.is_empty() {
            errors.push(ValidationError::MissingField("resource.id_field".to_string()));
        }

        for (field, status) in [
            ("resource.create_status", resource.create_status),
            ("resource.delete_status", resource.delete_status),
        ] {
            if !(100..=599).contains(&status) {
                errors.push(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("{} is not an HTTP status code", status),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
