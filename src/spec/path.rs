use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)]
static PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\w+)").unwrap());

/// Translate a router path (`/pets/:id/`) into an OpenAPI path (`/pets/{id}`).
///
/// `:name` becomes `{name}`, a trailing slash is trimmed and a leading slash
/// is ensured. The root stays `/`.
#[must_use]
pub fn to_openapi_path(path: &str) -> String {
    let templated = PARAM.replace_all(path, "{$1}");
    let trimmed = templated.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Parameter names in a router path template, in order of appearance.
#[must_use]
pub fn template_params(path: &str) -> Vec<String> {
    PARAM
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}
