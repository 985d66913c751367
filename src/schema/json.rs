use jsonschema::Validator;
use serde_json::Value;

use super::core::{Issue, Schema, SchemaType, ValidationError};

/// Schema backed by a hand-written JSON Schema document.
///
/// Validation reports every violation the document finds and passes the
/// value through unchanged. The projected Rust type is `serde_json::Value`.
pub struct JsonSchema {
    document: Value,
    validator: Validator,
}

impl JsonSchema {
    /// Compile a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid JSON Schema.
    pub fn new(document: Value) -> anyhow::Result<Self> {
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| anyhow::anyhow!("invalid JSON Schema: {e}"))?;
        Ok(Self {
            document,
            validator,
        })
    }

    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }
}

impl std::fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

/// Collect every violation reported by a compiled validator, keyed by the
/// JSON pointer of the offending value.
pub(crate) fn collect_issues(validator: &Validator, value: &Value) -> Vec<Issue> {
    validator
        .iter_errors(value)
        .map(|e| Issue::new(e.instance_path().as_str(), e.to_string()))
        .collect()
}

impl Schema for JsonSchema {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let issues = collect_issues(&self.validator, value);
        if issues.is_empty() {
            Ok(value.clone())
        } else {
            Err(ValidationError { issues })
        }
    }

    fn describe(&self) -> Value {
        self.document.clone()
    }
}

impl SchemaType for JsonSchema {
    type Output = Value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_schema() -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_value_passes_through() {
        let out = id_schema().validate(&json!({ "id": "1" })).unwrap();
        assert_eq!(out, json!({ "id": "1" }));
    }

    #[test]
    fn test_invalid_value_reports_issue() {
        let err = id_schema().validate(&json!({ "id": 1 })).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "/id");
    }

    #[test]
    fn test_nested_issue_paths() {
        let schema = JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        }))
        .unwrap();
        let err = schema.validate(&json!({ "tags": ["a", 2, "c", false] })).unwrap_err();
        let paths: Vec<&str> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["/tags/1", "/tags/3"]);
    }

    #[test]
    fn test_missing_required_reports_issue() {
        let err = id_schema().validate(&json!({})).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_invalid_document_rejected() {
        assert!(JsonSchema::new(json!({ "type": 12 })).is_err());
    }

    #[test]
    fn test_describe_returns_document() {
        assert_eq!(id_schema().describe()["required"], json!(["id"]));
    }
}
