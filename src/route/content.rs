use std::collections::BTreeMap;
use std::fmt;

use crate::schema::SchemaRef;

/// Media types a route can declare schemas for.
///
/// Declaration order is priority order: when several are declared the first
/// one wins for type projection and for requests without a usable
/// `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
    ApplicationJson,
    MultipartFormData,
    TextPlain,
    TextHtml,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::ApplicationJson,
        ContentType::MultipartFormData,
        ContentType::TextPlain,
        ContentType::TextHtml,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::ApplicationJson => "application/json",
            ContentType::MultipartFormData => "multipart/form-data",
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
        }
    }

    /// Full response header line; the HTTP layer only accepts static strings.
    #[must_use]
    pub fn header_line(self) -> &'static str {
        match self {
            ContentType::ApplicationJson => "Content-Type: application/json",
            ContentType::MultipartFormData => "Content-Type: multipart/form-data",
            ContentType::TextPlain => "Content-Type: text/plain; charset=utf-8",
            ContentType::TextHtml => "Content-Type: text/html; charset=utf-8",
        }
    }

    /// Parse a `Content-Type` header value, ignoring parameters and case.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str().eq_ignore_ascii_case(essence))
    }

    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, ContentType::TextPlain | ContentType::TextHtml)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schemas keyed by media type, iterated in priority order.
#[derive(Clone, Default)]
pub struct Content {
    entries: BTreeMap<ContentType, SchemaRef>,
}

impl Content {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) the schema for one media type.
    pub fn insert(&mut self, content_type: ContentType, schema: SchemaRef) {
        self.entries.insert(content_type, schema);
    }

    #[must_use]
    pub fn with(mut self, content_type: ContentType, schema: SchemaRef) -> Self {
        self.insert(content_type, schema);
        self
    }

    #[must_use]
    pub fn get(&self, content_type: ContentType) -> Option<&SchemaRef> {
        self.entries.get(&content_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContentType, &SchemaRef)> {
        self.entries.iter().map(|(ct, s)| (*ct, s))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Highest priority declared media type.
    #[must_use]
    pub fn preferred(&self) -> Option<(ContentType, &SchemaRef)> {
        self.iter().next()
    }

    /// Schema for an inbound `Content-Type` header.
    ///
    /// A header naming a declared media type selects that schema. A missing or
    /// undeclared header falls back to the preferred entry.
    #[must_use]
    pub fn select(&self, header: Option<&str>) -> Option<(ContentType, &SchemaRef)> {
        header
            .and_then(ContentType::from_header)
            .and_then(|ct| self.get(ct).map(|s| (ct, s)))
            .or_else(|| self.preferred())
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::JsonSchema;
    use serde_json::json;
    use std::sync::Arc;

    fn schema(ty: &str) -> SchemaRef {
        Arc::new(JsonSchema::new(json!({ "type": ty })).unwrap())
    }

    #[test]
    fn test_priority_order() {
        let content = Content::new()
            .with(ContentType::TextHtml, schema("string"))
            .with(ContentType::ApplicationJson, schema("object"));
        let order: Vec<_> = content.iter().map(|(ct, _)| ct).collect();
        assert_eq!(order, vec![ContentType::ApplicationJson, ContentType::TextHtml]);
        assert_eq!(content.preferred().unwrap().0, ContentType::ApplicationJson);
    }

    #[test]
    fn test_select_by_header() {
        let content = Content::new()
            .with(ContentType::ApplicationJson, schema("object"))
            .with(ContentType::TextPlain, schema("string"));
        assert_eq!(
            content.select(Some("text/plain; charset=utf-8")).unwrap().0,
            ContentType::TextPlain
        );
        assert_eq!(
            content.select(Some("application/xml")).unwrap().0,
            ContentType::ApplicationJson
        );
        assert_eq!(content.select(None).unwrap().0, ContentType::ApplicationJson);
        assert!(Content::new().select(Some("text/plain")).is_none());
    }

    #[test]
    fn test_from_header_is_case_insensitive() {
        assert_eq!(
            ContentType::from_header("Application/JSON"),
            Some(ContentType::ApplicationJson)
        );
        assert_eq!(ContentType::from_header(""), None);
    }
}
