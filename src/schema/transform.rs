use serde_json::Value;

use super::core::{Schema, SchemaType, ValidationError};

/// Schema that applies a conversion to the output of an inner schema.
///
/// Built with [`SchemaExt::transform`](super::SchemaExt::transform). The
/// description is the inner schema's; the projected type is unchanged, so
/// the conversion must keep the value deserializable into it.
pub struct Transformed<S, F> {
    inner: S,
    f: F,
}

impl<S, F> Transformed<S, F> {
    pub(crate) fn new(inner: S, f: F) -> Self {
        Self { inner, f }
    }
}

impl<S, F> Schema for Transformed<S, F>
where
    S: Schema,
    F: Fn(Value) -> Value + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        self.inner.validate(value).map(&self.f)
    }

    fn describe(&self) -> Value {
        self.inner.describe()
    }
}

impl<S, F> SchemaType for Transformed<S, F>
where
    S: SchemaType,
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    type Output = S::Output;
}

#[cfg(test)]
mod tests {
    use crate::schema::{JsonSchema, Schema, SchemaExt};
    use serde_json::{json, Value};

    #[test]
    fn test_transform_runs_after_validation() {
        let schema = JsonSchema::new(json!({ "type": "string" }))
            .unwrap()
            .transform(|v| match v {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            });
        assert_eq!(schema.validate(&json!("abc")).unwrap(), json!("ABC"));
        assert!(schema.validate(&json!(1)).is_err());
        assert_eq!(schema.describe(), json!({ "type": "string" }));
    }
}
