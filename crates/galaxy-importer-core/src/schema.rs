//! JSON Schema validation for collection descriptor documents

use crate::error::{Error, Result};
use jsonschema::Validator;
use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Name of the bundled `meta/pattern.json` schema
pub const PATTERN_SCHEMA: &str = "pattern";

/// Embedded schema files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../schemas/"]
#[prefix = ""]
struct EmbeddedSchemas;

/// Schema validator with pre-compiled schemas
#[derive(Debug)]
pub struct SchemaValidator {
    /// Compiled schemas by name
    schemas: HashMap<String, Validator>,
}

impl SchemaValidator {
    /// Create a new schema validator with embedded schemas
    pub fn new() -> Result<Self> {
        let mut schemas = HashMap::new();

        for file in EmbeddedSchemas::iter() {
            if !file.ends_with(".schema.json") {
                continue;
            }
            let name = file.trim_end_matches(".schema.json").to_string();
            debug!("Loading embedded schema: {}", name);

            if let Some(content) = EmbeddedSchemas::get(&file) {
                let json_str = std::str::from_utf8(&content.data).map_err(|_| {
                    Error::invalid_config(format!("Invalid UTF-8 in schema: {}", file))
                })?;
                let schema_value: Value = serde_json::from_str(json_str)?;
                let compiled = compile(&name, &schema_value)?;
                schemas.insert(name, compiled);
            }
        }

        if schemas.is_empty() {
            debug!("No embedded schemas found, using fallback schemas");
            Self::load_fallback_schemas(&mut schemas)?;
        }

        Ok(Self { schemas })
    }

    /// Validate JSON value against a schema
    pub fn validate(&self, value: &Value, schema_name: &str) -> Result<()> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| Error::schema_not_found(schema_name))?;

        let errors: Vec<String> = schema
            .iter_errors(value)
            .map(|e| {
                let path = e.instance_path().to_string();
                if path.is_empty() {
                    format!("  - {}", e)
                } else {
                    format!("  - {}: {}", path, e)
                }
            })
            .collect();

        if !errors.is_empty() {
            return Err(Error::schema_validation(errors));
        }

        Ok(())
    }

    /// Minimal pattern schema for when the embedded ones aren't available
    fn load_fallback_schemas(schemas: &mut HashMap<String, Validator>) -> Result<()> {
        let pattern_schema = serde_json::json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["name", "title", "description", "short_description", "tags", "aap_resources"],
            "properties": {
                "name": { "type": "string", "pattern": "^[a-z][a-z0-9_]*$" },
                "title": { "type": "string" },
                "description": { "type": "string" },
                "short_description": { "type": "string" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "aap_resources": {
                    "type": "object",
                    "required": ["controller_job_templates"],
                    "properties": {
                        "controller_job_templates": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["name", "playbook"]
                            }
                        }
                    }
                }
            }
        });

        schemas.insert(
            PATTERN_SCHEMA.to_string(),
            compile(PATTERN_SCHEMA, &pattern_schema)?,
        );
        Ok(())
    }
}

fn compile(name: &str, schema: &Value) -> Result<Validator> {
    jsonschema::validator_for(schema)
        .map_err(|e| Error::invalid_config(format!("Failed to compile schema {}: {}", name, e)))
}
