//! Schema declarations loaded from YAML
//!
//! ```yaml
//! schemas:
//!   base:
//!     fields:
//!       token: [{ name: isLength, message: "is too short", params: [{ min: 8 }] }]
//!   signup:
//!     extends: base
//!     fields:
//!       age: [{ name: isOptional, params: [18] }, { name: isInt }]
//! ```

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ConfigError;
use crate::core::schema::{SchemaBuilder, ValidatorSchema};

/// Declarations of one schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    /// Name of the parent schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Members in declaration order; arrays are rule chains
    #[serde(default)]
    pub fields: IndexMap<String, Value>,
}

/// Complete schema file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaDeclaration>,
}

impl SchemaConfig {
    /// Load declarations from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&content)?)
    }

    /// Load declarations from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Names of all declared schemas, in file order
    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Builder for `name` with its ancestors already attached
    ///
    /// Custom validators can be added to the returned builder before
    /// building.
    pub fn builder(&self, name: &str) -> Result<SchemaBuilder, ConfigError> {
        self.builder_with_chain(name, &mut Vec::new())
    }

    /// Build the schema `name`
    pub fn schema(&self, name: &str) -> Result<ValidatorSchema, ConfigError> {
        self.builder(name)?.build()
    }

    fn builder_with_chain(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<SchemaBuilder, ConfigError> {
        if chain.iter().any(|visited| visited == name) {
            chain.push(name.to_string());
            return Err(ConfigError::InheritanceCycle {
                chain: std::mem::take(chain),
            });
        }
        let declaration = self
            .schemas
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSchema {
                name: name.to_string(),
            })?;
        chain.push(name.to_string());

        let mut builder = declaration
            .fields
            .iter()
            .fold(SchemaBuilder::new(), |builder, (field, value)| {
                builder.declare(field.clone(), value.clone())
            });

        if let Some(parent) = &declaration.extends {
            let parent = self.builder_with_chain(parent, chain)?.build()?;
            builder = builder.extends(&parent);
        }

        chain.pop();
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
schemas:
  base:
    fields:
      token: [{ name: isLength, params: [{ min: 8 }] }]
  signup:
    extends: base
    fields:
      age: [{ name: isOptional, params: [18] }, { name: isInt }]
      email: [{ name: isEmail, message: "is not an email" }]
"#;

    #[test]
    fn test_parse_keeps_declaration_order() {
        let config = SchemaConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.schema_names(), vec!["base", "signup"]);
        let signup = &config.schemas["signup"];
        assert_eq!(signup.fields.keys().collect::<Vec<_>>(), vec!["age", "email"]);
    }

    #[test]
    fn test_schema_resolves_extends() {
        let config = SchemaConfig::from_yaml_str(YAML).unwrap();
        let schema = config.schema("signup").unwrap();
        assert_eq!(schema.names(), vec!["age", "email", "token"]);
    }

    #[test]
    fn test_unknown_schema() {
        let config = SchemaConfig::from_yaml_str(YAML).unwrap();
        let err = config.schema("login").unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownSchema {
                name: "login".to_string()
            }
        );
    }

    #[test]
    fn test_inheritance_cycle() {
        let config = SchemaConfig::from_yaml_str(
            "schemas:\n  a: { extends: b }\n  b: { extends: a }\n",
        )
        .unwrap();
        let err = config.schema("a").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InheritanceCycle {
                chain: vec!["a".into(), "b".into(), "a".into()]
            }
        );
    }

    #[test]
    fn test_non_rule_element_in_file() {
        let config = SchemaConfig::from_yaml_str(
            "schemas:\n  s:\n    fields:\n      age: [{ name: isInt }, 42]\n",
        )
        .unwrap();
        let err = config.schema("s").unwrap_err();
        assert!(matches!(err, ConfigError::NonRuleElement { index: 1, .. }));
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let err = SchemaConfig::from_yaml_str("schemas: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_yaml_serialization() {
        let config = SchemaConfig::from_yaml_str(YAML).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = SchemaConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.schema_names(), config.schema_names());
    }
}
