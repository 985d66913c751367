use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::project::{Dictionary, PickContent, Projection, Unknown};
use super::reply::{Reply, Unchecked};
use crate::ids::RequestId;
use crate::route::{RouteSchema, RouteSpec};

/// A route declaration with statically known handler types.
pub trait RouteContract: Sized {
    type Params: DeserializeOwned + Send + 'static;
    type Query: DeserializeOwned + Send + 'static;
    type Headers: DeserializeOwned + Send + 'static;
    type Body: DeserializeOwned + Send + 'static;
    /// Type-level response list checked by [`Reply::new`]
    type Responses;

    fn into_spec(self) -> RouteSpec;
}

impl<P, Q, H, B, R> RouteContract for RouteSchema<P, Q, H, B, R>
where
    P: Projection<Dictionary>,
    Q: Projection<Dictionary>,
    H: Projection<Dictionary>,
    B: PickContent,
    <P as Projection<Dictionary>>::Output: DeserializeOwned + Send + 'static,
    <Q as Projection<Dictionary>>::Output: DeserializeOwned + Send + 'static,
    <H as Projection<Dictionary>>::Output: DeserializeOwned + Send + 'static,
    B::Output: DeserializeOwned + Send + 'static,
{
    type Params = <P as Projection<Dictionary>>::Output;
    type Query = <Q as Projection<Dictionary>>::Output;
    type Headers = <H as Projection<Dictionary>>::Output;
    type Body = B::Output;
    type Responses = R;

    fn into_spec(self) -> RouteSpec {
        RouteSchema::into_spec(self)
    }
}

/// Erased declarations may carry schemas whose outputs are not strings, so
/// every part is handed over as JSON.
impl RouteContract for RouteSpec {
    type Params = Unknown;
    type Query = Unknown;
    type Headers = Unknown;
    type Body = Unknown;
    type Responses = Unchecked;

    fn into_spec(self) -> RouteSpec {
        self
    }
}

/// Request as a typed handler sees it, after validation and transformation.
#[derive(Debug, Clone)]
pub struct TypedRequest<P, Q, H, B> {
    pub request_id: RequestId,
    pub method: http::Method,
    pub path: String,
    pub params: P,
    pub query: Q,
    pub headers: H,
    pub body: B,
    /// Values left by earlier middleware
    pub locals: Map<String, Value>,
}

/// Handler input type projected from a route declaration.
pub type RequestFor<S> = TypedRequest<
    <S as RouteContract>::Params,
    <S as RouteContract>::Query,
    <S as RouteContract>::Headers,
    <S as RouteContract>::Body,
>;

/// Handler output type projected from a route declaration.
pub type ReplyFor<S> = Reply<<S as RouteContract>::Responses>;
