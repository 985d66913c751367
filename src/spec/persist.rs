use anyhow::{Context, Result};
use std::path::Path;

use super::document::SpecDocument;

/// Serialization used when writing a document to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` select YAML; anything else JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            other => Err(format!("unknown document format `{other}` (expected json or yaml)")),
        }
    }
}

/// Render a document as pretty JSON or YAML text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_document(document: &SpecDocument, format: DocumentFormat) -> Result<String> {
    match format {
        DocumentFormat::Json => {
            serde_json::to_string_pretty(document).context("Failed to serialize document as JSON")
        }
        DocumentFormat::Yaml => {
            serde_yaml::to_string(document).context("Failed to serialize document as YAML")
        }
    }
}

/// Write a document to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_document(document: &SpecDocument, path: impl AsRef<Path>, format: DocumentFormat) -> Result<()> {
    let path = path.as_ref();
    let text = render_document(document, format)?;
    std::fs::write(path, text).with_context(|| format!("Failed to write document to {}", path.display()))?;
    tracing::info!(path = %path.display(), format = ?format, "Document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{generate_from_routes, DocumentMetadata};

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("api.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("api.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("api.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("api")), DocumentFormat::Json);
    }

    #[test]
    fn test_write_json_and_yaml() {
        let doc = generate_from_routes(&DocumentMetadata::new("T", "1"), &[]).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("api.json");
        write_document(&doc, &json_path, DocumentFormat::Json).unwrap();
        let back: SpecDocument = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(back, doc);

        let yaml_path = dir.path().join("api.yaml");
        write_document(&doc, &yaml_path, DocumentFormat::Yaml).unwrap();
        let text = std::fs::read_to_string(&yaml_path).unwrap();
        assert!(text.contains("openapi: 3.1.0"));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let doc = generate_from_routes(&DocumentMetadata::new("T", "1"), &[]).unwrap();
        assert!(write_document(&doc, "/no/such/dir/api.json", DocumentFormat::Json).is_err());
    }
}
