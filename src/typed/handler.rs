use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use super::contract::{ReplyFor, RequestFor, RouteContract, TypedRequest};
use crate::dispatcher::{Flow, Request, RequestPart, RouteError};
use crate::middleware::{header_object, Middleware};
use crate::route::RouteSpec;

/// Terminal chain step that calls a typed handler.
///
/// Runs after validation, so each part already has its transformed shape and
/// only needs deserializing into the projected type.
pub(crate) struct TypedHandler<S, F> {
    headers_doc: Option<Value>,
    handler: F,
    _contract: PhantomData<fn() -> S>,
}

impl<S, F> TypedHandler<S, F> {
    pub(crate) fn new(spec: &RouteSpec, handler: F) -> Self {
        Self {
            headers_doc: spec.request.headers.as_ref().map(|s| s.describe()),
            handler,
            _contract: PhantomData,
        }
    }
}

fn project<T: DeserializeOwned>(part: RequestPart, value: Value) -> Result<T, RouteError> {
    serde_json::from_value(value)
        .map_err(|e| RouteError::Handler(anyhow::anyhow!("could not read {part} as declared type: {e}")))
}

impl<S, F> Middleware for TypedHandler<S, F>
where
    S: RouteContract + 'static,
    F: Fn(RequestFor<S>) -> anyhow::Result<ReplyFor<S>> + Send + Sync + 'static,
{
    fn handle(&self, req: &mut Request) -> Result<Flow, RouteError> {
        let headers = header_object(&req.headers, self.headers_doc.as_ref());
        let typed = TypedRequest {
            request_id: req.request_id,
            method: req.method.clone(),
            path: req.path.clone(),
            params: project(RequestPart::Params, req.params.clone())?,
            query: project(RequestPart::Query, req.query.clone())?,
            headers: project(RequestPart::Headers, headers)?,
            body: project(RequestPart::Body, req.body.clone())?,
            locals: req.locals.clone(),
        };
        let reply = (self.handler)(typed)?;
        Ok(Flow::Respond(reply.into_response()))
    }
}
