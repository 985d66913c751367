use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::document::{Info, SecurityRequirement, ServerObject, Tag};

pub const DEFAULT_OPENAPI_VERSION: &str = "3.1.0";

fn default_openapi() -> String {
    DEFAULT_OPENAPI_VERSION.to_string()
}

/// Top-level fields merged verbatim into a generated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default = "default_openapi")]
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<ServerObject>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
    /// Copied to `components.securitySchemes`
    #[serde(default)]
    pub security_schemes: BTreeMap<String, Value>,
}

impl DocumentMetadata {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: default_openapi(),
            info: Info::new(title, version),
            servers: Vec::new(),
            tags: Vec::new(),
            security: Vec::new(),
            security_schemes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.servers.push(ServerObject {
            url: url.into(),
            description: None,
        });
        self
    }

    #[must_use]
    pub fn tag(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        self.tags.push(Tag {
            name: name.into(),
            description,
        });
        self
    }

    /// Load metadata from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata file {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON metadata {}", path.display()))
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML metadata {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_metadata_defaults_version() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "info:\n  title: Pets\n  version: 1.0.0\n  license:\n    name: MIT\nservers:\n  - url: http://localhost:8080"
        )
        .unwrap();
        let meta = DocumentMetadata::from_file(file.path()).unwrap();
        assert_eq!(meta.openapi, "3.1.0");
        assert_eq!(meta.info.title, "Pets");
        assert_eq!(meta.info.extra["license"]["name"], "MIT");
        assert_eq!(meta.servers[0].url, "http://localhost:8080");
    }

    #[test]
    fn test_json_metadata() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"openapi":"3.1.1","info":{{"title":"T","version":"2"}},"securitySchemes":{{"bearer":{{"type":"http","scheme":"bearer"}}}}}}"#
        )
        .unwrap();
        let meta = DocumentMetadata::from_file(file.path()).unwrap();
        assert_eq!(meta.openapi, "3.1.1");
        assert!(meta.security_schemes.contains_key("bearer"));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(DocumentMetadata::from_file("/definitely/not/here.yaml").is_err());
    }
}
