//! Pet store demo: serves a small typed API, or writes its OpenAPI document.
//!
//! ```bash
//! petstore serve --addr 127.0.0.1:8080
//! petstore spec --output openapi.yaml
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use schemaroute::logging::{init_logging, LogConfig};
use schemaroute::middleware::{BodyParser, ProblemErrorHandler, TracingMiddleware};
use schemaroute::route::{status, ResponseSpec, RouteSchema, RouteSpec};
use schemaroute::router::Router;
use schemaroute::schema::Typed;
use schemaroute::server::Server;
use schemaroute::spec::{self, DocumentFormat, DocumentMetadata};
use schemaroute::typed::Reply;

#[derive(Parser)]
#[command(name = "petstore")]
#[command(about = "Pet store built on schemaroute", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the pet store API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080", env = "PETSTORE_ADDR")]
        addr: String,
    },
    /// Write the generated OpenAPI document
    Spec {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// json or yaml; defaults to the output file extension
        #[arg(short, long)]
        format: Option<DocumentFormat>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct Pet {
    id: i64,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
}

fn trimmed<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    String::deserialize(d).map(|s| s.trim().to_string())
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct NewPet {
    #[serde(deserialize_with = "trimmed")]
    #[schemars(length(min = 1))]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct PetPath {
    pet_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 100))]
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Problem {
    message: String,
}

#[derive(Default)]
struct Store {
    next_id: i64,
    pets: BTreeMap<i64, Pet>,
}

type SharedStore = Arc<Mutex<Store>>;

fn lock(store: &SharedStore) -> Result<std::sync::MutexGuard<'_, Store>> {
    store.lock().map_err(|_| anyhow!("pet store lock poisoned"))
}

fn pets_router(store: &SharedStore) -> Result<Router> {
    let mut router = Router::new();

    let list = Arc::clone(store);
    router.get(
        "/v1/pets",
        RouteSchema::new()
            .operation_id("listPets")
            .summary("List pets")
            .tag("pets")
            .query(Typed::<ListQuery>::new())
            .response(status::OK, ResponseSpec::new("Pets in the store").json(Typed::<Vec<Pet>>::new())),
        move |req| {
            let store = lock(&list)?;
            let pets: Vec<Pet> = store
                .pets
                .values()
                .filter(|p| req.query.tag.is_none() || p.tag == req.query.tag)
                .take(req.query.limit.unwrap_or(usize::MAX))
                .cloned()
                .collect();
            Reply::new(status::OK, pets)
        },
    )?;

    let create = Arc::clone(store);
    router.post(
        "/v1/pets",
        RouteSchema::new()
            .operation_id("createPet")
            .summary("Add a pet")
            .tag("pets")
            .json_body(Typed::<NewPet>::new())
            .response(status::CREATED, ResponseSpec::new("The new pet").json(Typed::<Pet>::new())),
        move |req| {
            let mut store = lock(&create)?;
            store.next_id += 1;
            let pet = Pet {
                id: store.next_id,
                name: req.body.name,
                tag: req.body.tag,
            };
            store.pets.insert(pet.id, pet.clone());
            Reply::new(status::CREATED, pet)
        },
    )?;

    let fetch = Arc::clone(store);
    router.get(
        "/v1/pets/:petId",
        RouteSchema::new()
            .operation_id("getPet")
            .summary("Get a pet by id")
            .tag("pets")
            .params(Typed::<PetPath>::new())
            .response(status::OK, ResponseSpec::new("The pet").json(Typed::<Pet>::new()))
            .response(status::NOT_FOUND, ResponseSpec::new("No such pet").json(Typed::<Problem>::new())),
        move |req| {
            let store = lock(&fetch)?;
            match store.pets.get(&req.params.pet_id) {
                Some(pet) => Reply::new(status::OK, pet.clone()),
                None => Reply::new(
                    status::NOT_FOUND,
                    Problem {
                        message: format!("pet {} not found", req.params.pet_id),
                    },
                ),
            }
        },
    )?;

    let remove = Arc::clone(store);
    router.delete(
        "/v1/pets/:petId",
        RouteSchema::new()
            .operation_id("deletePet")
            .summary("Remove a pet")
            .tag("pets")
            .params(Typed::<PetPath>::new())
            .response(status::NO_CONTENT, ResponseSpec::new("Removed")),
        move |req| {
            lock(&remove)?.pets.remove(&req.params.pet_id);
            Reply::new(status::NO_CONTENT, serde_json::Value::Null)
        },
    )?;

    Ok(router)
}

fn metadata() -> DocumentMetadata {
    DocumentMetadata::new("Pet Store", env!("CARGO_PKG_VERSION"))
        .server("http://localhost:8080")
        .tag("pets", Some("Everything about pets".to_string()))
}

fn build_server() -> Result<(Server, Arc<OnceCell<serde_json::Value>>)> {
    let store = SharedStore::default();
    let document = Arc::new(OnceCell::new());

    let mut docs = Router::new();
    let served = Arc::clone(&document);
    docs.get(
        "/openapi.json",
        RouteSpec::new()
            .summary("This document")
            .response(200, schemaroute::route::ResponseDoc::new("OpenAPI document")),
        move |_req| {
            let doc = served.get().cloned().unwrap_or(serde_json::Value::Null);
            Ok(Reply::json(200, doc))
        },
    )?;

    let mut server = Server::new();
    server
        .use_middleware(Arc::new(TracingMiddleware))?
        .use_middleware(Arc::new(BodyParser))?
        .use_error_handler(Arc::new(ProblemErrorHandler))?
        .use_routers([pets_router(&store)?, docs])?;
    Ok((server, document))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;

    let (mut server, document) = build_server()?;
    let generated = spec::generate(&metadata(), &server)?;

    match cli.command {
        Commands::Serve { addr } => {
            let value = serde_json::to_value(&generated)?;
            if document.set(value).is_err() {
                tracing::warn!("OpenAPI document already set");
            }
            let bound = server.listen(addr.as_str())?;
            println!("petstore listening on http://{bound}");
            loop {
                std::thread::park();
            }
        }
        Commands::Spec { output, format } => match output {
            Some(path) => {
                let format = format.unwrap_or_else(|| DocumentFormat::from_path(&path));
                spec::write_document(&generated, &path, format)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            None => {
                print!("{}", spec::render_document(&generated, format.unwrap_or_default())?);
            }
        },
    }
    Ok(())
}
