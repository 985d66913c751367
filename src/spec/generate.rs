use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use super::document::{
    Components, MediaType, Operation, Parameter, ParameterLocation, PathItem, RequestBody,
    ResponseObject, SpecDocument,
};
use super::metadata::DocumentMetadata;
use super::path::{template_params, to_openapi_path};
use crate::route::{Content, Method, RouteSpec};
use crate::router::RouterRoute;
use crate::schema::{object_properties, SchemaRef};
use crate::server::Server;

/// Route declaration that cannot be described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The route declares no responses at all
    MissingResponses { method: Method, path: String },
    /// A response key is not an HTTP status code (100-599)
    InvalidStatusCode {
        method: Method,
        path: String,
        status: u16,
    },
    /// A params, query or headers schema is not an object schema
    ParameterSchemaNotObject {
        method: Method,
        path: String,
        location: ParameterLocation,
    },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::MissingResponses { method, path } => {
                write!(f, "{method} {path} declares no responses")
            }
            GenerateError::InvalidStatusCode {
                method,
                path,
                status,
            } => write!(f, "{method} {path} declares invalid status code {status}"),
            GenerateError::ParameterSchemaNotObject {
                method,
                path,
                location,
            } => write!(
                f,
                "{method} {path}: {location} parameter schema must describe an object"
            ),
        }
    }
}

impl std::error::Error for GenerateError {}

/// Collects `$defs` from every described schema into `components.schemas`.
#[derive(Default)]
struct SchemaCollector {
    schemas: BTreeMap<String, Value>,
}

const LOCAL_REF_PREFIXES: [&str; 2] = ["#/$defs/", "#/definitions/"];

impl SchemaCollector {
    /// Describe a schema for embedding in the document.
    fn embed(&mut self, schema: &SchemaRef) -> Value {
        let mut doc = schema.describe();
        if let Value::Object(map) = &mut doc {
            map.remove("$schema");
            for section in ["$defs", "definitions"] {
                if let Some(Value::Object(defs)) = map.remove(section) {
                    for (name, mut def) in defs {
                        rewrite_refs(&mut def);
                        if let Some(existing) = self.schemas.get(&name) {
                            if *existing != def {
                                warn!(schema = %name, "Conflicting component schema, later one kept");
                            }
                        }
                        self.schemas.insert(name, def);
                    }
                }
            }
        }
        rewrite_refs(&mut doc);
        doc
    }
}

fn rewrite_refs(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get_mut("$ref") {
                if let Some(name) = LOCAL_REF_PREFIXES
                    .iter()
                    .find_map(|prefix| reference.strip_prefix(prefix))
                {
                    *reference = format!("#/components/schemas/{name}");
                }
            }
            map.values_mut().for_each(rewrite_refs);
        }
        Value::Array(items) => items.iter_mut().for_each(rewrite_refs),
        _ => {}
    }
}

/// Resolve a component reference so parameter schemas can be expanded.
fn resolve_component<'a>(schema: &'a Value, components: &'a BTreeMap<String, Value>) -> &'a Value {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix("#/components/schemas/"))
        .and_then(|name| components.get(name))
        .unwrap_or(schema)
}

fn content_map(content: &Content, collector: &mut SchemaCollector) -> BTreeMap<String, MediaType> {
    content
        .iter()
        .map(|(ct, schema)| {
            (
                ct.as_str().to_string(),
                MediaType {
                    schema: collector.embed(schema),
                },
            )
        })
        .collect()
}

fn parameters(
    route: &RouterRoute,
    location: ParameterLocation,
    schema: Option<&SchemaRef>,
    collector: &mut SchemaCollector,
) -> Result<Vec<Parameter>, GenerateError> {
    let Some(schema) = schema else {
        return Ok(Vec::new());
    };
    let doc = collector.embed(schema);
    let object = resolve_component(&doc, &collector.schemas).clone();
    let Some((properties, required)) = object_properties(&object) else {
        let is_bare_object = matches!(&object, Value::Bool(true))
            || object.get("type").and_then(Value::as_str) == Some("object");
        return if is_bare_object {
            Ok(Vec::new())
        } else {
            Err(GenerateError::ParameterSchemaNotObject {
                method: route.method,
                path: route.path.clone(),
                location,
            })
        };
    };
    Ok(properties
        .into_iter()
        .map(|(name, mut schema)| {
            let description = schema
                .as_object_mut()
                .and_then(|s| s.remove("description"))
                .and_then(|d| d.as_str().map(str::to_string));
            Parameter {
                required: location == ParameterLocation::Path || required.contains(&name),
                name,
                location,
                description,
                schema,
            }
        })
        .collect())
}

fn operation(route: &RouterRoute, collector: &mut SchemaCollector) -> Result<Operation, GenerateError> {
    let spec: &RouteSpec = &route.schema;
    if spec.responses.is_empty() {
        return Err(GenerateError::MissingResponses {
            method: route.method,
            path: route.path.clone(),
        });
    }

    let request = &spec.request;
    let mut params = parameters(route, ParameterLocation::Path, request.params.as_ref(), collector)?;
    for name in template_params(&route.path) {
        if !params.iter().any(|p| p.name == name) {
            debug!(method = %route.method, path = %route.path, param = %name, "Undeclared path parameter described as string");
            params.push(Parameter {
                name,
                location: ParameterLocation::Path,
                required: true,
                description: None,
                schema: serde_json::json!({ "type": "string" }),
            });
        }
    }
    params.extend(parameters(route, ParameterLocation::Query, request.query.as_ref(), collector)?);
    params.extend(parameters(route, ParameterLocation::Header, request.headers.as_ref(), collector)?);

    let request_body = (!request.body.is_empty()).then(|| RequestBody {
        content: content_map(&request.body, collector),
        required: true,
    });

    let mut responses = BTreeMap::new();
    for (status, response) in &spec.responses {
        if !(100..=599).contains(status) {
            return Err(GenerateError::InvalidStatusCode {
                method: route.method,
                path: route.path.clone(),
                status: *status,
            });
        }
        responses.insert(
            status.to_string(),
            ResponseObject {
                description: response.description.clone(),
                content: content_map(&response.content, collector),
            },
        );
    }

    Ok(Operation {
        operation_id: spec.operation_id.clone(),
        summary: spec.summary.clone(),
        description: spec.description.clone(),
        tags: spec.tags.clone(),
        deprecated: spec.deprecated,
        parameters: params,
        request_body,
        responses,
    })
}

/// Build a document from an explicit route list.
///
/// Routes are processed in order; a later route with the same method and
/// path replaces the earlier operation.
///
/// # Errors
///
/// Returns the first [`GenerateError`]; no partial document is produced.
pub fn generate_from_routes(
    metadata: &DocumentMetadata,
    routes: &[RouterRoute],
) -> Result<SpecDocument, GenerateError> {
    let mut collector = SchemaCollector::default();
    let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();

    for route in routes {
        let path = to_openapi_path(&route.path);
        let operation = operation(route, &mut collector)?;
        let slot = paths.entry(path.clone()).or_default().slot(route.method);
        if slot.is_some() {
            warn!(method = %route.method, path = %path, "Operation replaced by later route");
        }
        debug!(method = %route.method, path = %path, "Operation described");
        *slot = Some(operation);
    }

    info!(
        paths = paths.len(),
        operations = routes.len(),
        schemas = collector.schemas.len(),
        "Document generated"
    );

    Ok(SpecDocument {
        openapi: metadata.openapi.clone(),
        info: metadata.info.clone(),
        servers: metadata.servers.clone(),
        tags: metadata.tags.clone(),
        security: metadata.security.clone(),
        paths,
        components: Components {
            schemas: collector.schemas,
            security_schemes: metadata.security_schemes.clone(),
        },
    })
}

/// Build a document from every route aggregated by `server`.
///
/// # Errors
///
/// Returns the first [`GenerateError`]; no partial document is produced.
pub fn generate(metadata: &DocumentMetadata, server: &Server) -> Result<SpecDocument, GenerateError> {
    generate_from_routes(metadata, server.routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::JsonSchema;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_defs_hoisted_and_refs_rewritten() {
        let schema: SchemaRef = Arc::new(
            JsonSchema::new(json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "array",
                "items": { "$ref": "#/$defs/Pet" },
                "$defs": {
                    "Pet": { "type": "object", "properties": { "owner": { "$ref": "#/$defs/Owner" } } },
                    "Owner": { "type": "string" }
                }
            }))
            .unwrap(),
        );
        let mut collector = SchemaCollector::default();
        let doc = collector.embed(&schema);
        assert_eq!(doc, json!({ "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }));
        assert_eq!(
            collector.schemas["Pet"]["properties"]["owner"]["$ref"],
            "#/components/schemas/Owner"
        );
        assert!(collector.schemas.contains_key("Owner"));
    }

    #[test]
    fn test_external_refs_untouched() {
        let mut value = json!({ "$ref": "https://example.com/pet.json" });
        rewrite_refs(&mut value);
        assert_eq!(value["$ref"], "https://example.com/pet.json");
    }
}
