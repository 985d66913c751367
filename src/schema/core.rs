use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::transform::Transformed;

/// One failed constraint inside a validated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// JSON pointer to the offending value (empty for the root)
    pub path: String,
    /// Human readable description of the failure
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validation failure carrying every issue the schema reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// Create an error holding a single issue.
    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue::new(path, message)],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "validation failed"),
            [only] if only.path.is_empty() => write!(f, "validation failed: {}", only.message),
            [only] => write!(f, "validation failed at {}: {}", only.path, only.message),
            many => {
                write!(f, "validation failed with {} issues", many.len())?;
                for issue in many {
                    if issue.path.is_empty() {
                        write!(f, "; {}", issue.message)?;
                    } else {
                        write!(f, "; {}: {}", issue.path, issue.message)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Pluggable validator/transformer/describer for one value shape.
///
/// `validate` returns the value the rest of the request pipeline should see,
/// which lets a schema normalize input (trim, case-fold, fill defaults) as
/// well as reject it. `describe` returns a JSON Schema document used when
/// generating the API description.
pub trait Schema: Send + Sync {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError>;

    fn describe(&self) -> Value;
}

/// A [`Schema`] whose validated output deserializes into a known Rust type.
///
/// The associated `Output` type is what the type projection hands to typed
/// handlers; it has no runtime cost of its own.
pub trait SchemaType: Schema + Sized + 'static {
    type Output: DeserializeOwned + Send + 'static;
}

/// Shared, type-erased schema handle stored in route declarations.
pub type SchemaRef = Arc<dyn Schema>;

impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        (**self).validate(value)
    }

    fn describe(&self) -> Value {
        (**self).describe()
    }
}

/// Combinators available on every schema.
pub trait SchemaExt: Schema + Sized {
    /// Run `f` on the validated output before it replaces the inbound value.
    fn transform<F>(self, f: F) -> Transformed<Self, F>
    where
        F: Fn(Value) -> Value + Send + Sync,
    {
        Transformed::new(self, f)
    }
}

impl<S: Schema + Sized> SchemaExt for S {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_single_issue_with_path() {
        let err = ValidationError::single("/id", "expected string");
        assert_eq!(err.to_string(), "validation failed at /id: expected string");
    }

    #[test]
    fn test_display_many_issues() {
        let err = ValidationError {
            issues: vec![Issue::new("/a", "bad"), Issue::new("", "worse")],
        };
        assert_eq!(
            err.to_string(),
            "validation failed with 2 issues; /a: bad; worse"
        );
    }
}
