use jsonschema::Validator;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;

use super::core::{Issue, Schema, SchemaType, ValidationError};
use super::json::collect_issues;

/// Schema derived from a Rust type.
///
/// The JSON Schema comes from `schemars`, so the type is the single source of
/// truth for validation, documentation and the handler-facing shape.
/// Validation first checks the document (collecting every issue), then
/// deserializes into `T` and serializes back; any normalization `T`'s
/// `Deserialize` performs is therefore visible in the output. Outputs must
/// deserialize back into the same `T`, since typed handlers read them again.
pub struct Typed<T> {
    document: Result<Value, String>,
    validator: OnceCell<Result<Validator, String>>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Typed<T>
where
    T: schemars::JsonSchema + DeserializeOwned + Serialize,
{
    #[must_use]
    pub fn new() -> Self {
        let document = serde_json::to_value(schemars::schema_for!(T)).map_err(|e| e.to_string());
        Self {
            document,
            validator: OnceCell::new(),
            _type: PhantomData,
        }
    }

    fn validator(&self) -> Result<&Validator, ValidationError> {
        let compiled = self.validator.get_or_init(|| match &self.document {
            Ok(doc) => jsonschema::validator_for(doc).map_err(|e| e.to_string()),
            Err(e) => Err(e.clone()),
        });
        compiled
            .as_ref()
            .map_err(|e| ValidationError::single("", format!("schema could not be compiled: {e}")))
    }
}

impl<T> Default for Typed<T>
where
    T: schemars::JsonSchema + DeserializeOwned + Serialize,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self {
            document: self.document.clone(),
            validator: OnceCell::new(),
            _type: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typed")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T> Schema for Typed<T>
where
    T: schemars::JsonSchema + DeserializeOwned + Serialize,
{
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let issues = collect_issues(self.validator()?, value);
        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }
        let parsed: T = serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::single("", e.to_string()))?;
        serde_json::to_value(&parsed).map_err(|e| ValidationError {
            issues: vec![Issue::new("", format!("could not re-encode value: {e}"))],
        })
    }

    fn describe(&self) -> Value {
        self.document.clone().unwrap_or(Value::Bool(true))
    }
}

impl<T> SchemaType for Typed<T>
where
    T: schemars::JsonSchema + DeserializeOwned + Serialize + Send + 'static,
{
    type Output = T;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Deserializer};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
    struct Pet {
        id: i64,
        name: String,
        tag: Option<String>,
    }

    fn upper<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        String::deserialize(d).map(|s| s.to_uppercase())
    }

    #[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
    struct Code {
        #[serde(deserialize_with = "upper")]
        code: String,
    }

    #[test]
    fn test_describe_lists_required_fields() {
        let doc = Typed::<Pet>::new().describe();
        let required = doc["required"].as_array().unwrap();
        assert!(required.contains(&json!("id")));
        assert!(required.contains(&json!("name")));
        assert!(!required.contains(&json!("tag")));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = Typed::<Pet>::new()
            .validate(&json!({ "id": "one", "name": "Sabo" }))
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "/id");
    }

    #[test]
    fn test_deserialize_normalization_is_applied() {
        let out = Typed::<Code>::new().validate(&json!({ "code": "abc" })).unwrap();
        assert_eq!(out, json!({ "code": "ABC" }));
    }

    #[test]
    fn test_clone_revalidates() {
        let schema = Typed::<Pet>::new();
        let cloned = schema.clone();
        assert!(cloned.validate(&json!({ "id": 1, "name": "Sabo" })).is_ok());
    }
}
