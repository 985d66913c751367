use regex::Regex;
use serde_json::{Map, Value};

use super::core::RouterError;

/// Canonical form used for route identity: leading slash, no trailing slash
/// (except the root itself).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Compiled matcher for a `:name` style path template.
#[derive(Debug, Clone)]
pub(crate) struct PathMatcher {
    regex: Regex,
    param_names: Vec<String>,
}

impl PathMatcher {
    /// Compile `/pets/:id` into `^/pets/([^/]+)/?$` with parameter `id`.
    pub(crate) fn compile(path: &str) -> Result<Self, RouterError> {
        let normalized = normalize_path(path);
        if normalized == "/" {
            let regex = Regex::new(r"^/?$").map_err(|e| RouterError::invalid(path, e.to_string()))?;
            return Ok(Self {
                regex,
                param_names: Vec::new(),
            });
        }

        let mut pattern = String::with_capacity(normalized.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(normalized.matches(':').count());

        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            pattern.push('/');
            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(RouterError::invalid(
                        path,
                        format!("parameter segment `{segment}` must be `:` followed by a word"),
                    ));
                }
                if param_names.iter().any(|p| p == name) {
                    return Err(RouterError::invalid(path, format!("parameter `{name}` appears twice")));
                }
                pattern.push_str("([^/]+)");
                param_names.push(name.to_string());
            } else {
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push_str("/?$");
        let regex = Regex::new(&pattern).map_err(|e| RouterError::invalid(path, e.to_string()))?;
        Ok(Self { regex, param_names })
    }

    /// Match a request path, returning decoded parameters on success.
    pub(crate) fn matches(&self, path: &str) -> Option<Map<String, Value>> {
        let captures = self.regex.captures(path)?;
        let params = self
            .param_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let raw = captures.get(i + 1)?.as_str();
                let decoded = urlencoding::decode(raw)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                Some((name.clone(), Value::String(decoded)))
            })
            .collect();
        Some(params)
    }

    #[must_use]
    pub(crate) fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_path("pets/"), "/pets");
        assert_eq!(normalize_path("/pets/:id"), "/pets/:id");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_match_params_and_trailing_slash() {
        let m = PathMatcher::compile("/pets/:petId/toys/:toy_id").unwrap();
        assert_eq!(m.param_names(), ["petId", "toy_id"]);
        let params = m.matches("/pets/7/toys/ball%20red/").unwrap();
        assert_eq!(Value::Object(params), json!({ "petId": "7", "toy_id": "ball red" }));
        assert!(m.matches("/pets/7/toys").is_none());
        assert!(m.matches("/pets/7/toys/a/b").is_none());
    }

    #[test]
    fn test_literal_segments_are_escaped() {
        let m = PathMatcher::compile("/v1.0/items").unwrap();
        assert!(m.matches("/v1.0/items").is_some());
        assert!(m.matches("/v1x0/items").is_none());
    }

    #[test]
    fn test_root() {
        let m = PathMatcher::compile("/").unwrap();
        assert!(m.matches("/").is_some());
        assert!(m.matches("/x").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        assert!(PathMatcher::compile("/pets/:").is_err());
        assert!(PathMatcher::compile("/pets/:id-x").is_err());
        assert!(PathMatcher::compile("/a/:id/b/:id").is_err());
    }
}
