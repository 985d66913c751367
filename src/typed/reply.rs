use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;

use super::project::PickContent;
use crate::dispatcher::Response;
use crate::route::{Code, ContentType};

/// Empty response list.
pub struct Nil;

/// Response list node: head entry `H`, remaining entries `T`.
pub struct Cons<H, T>(PhantomData<fn() -> (H, T)>);

/// Response entry for status `S` with content slots `C`.
pub struct Status<const S: u16, C>(PhantomData<fn() -> C>);

/// Index: the entry is the head of the list.
pub struct Here;

/// Index: the entry is somewhere in the tail.
pub struct There<I>(PhantomData<fn() -> I>);

/// Look up the entry for status `S` in a response list.
///
/// `I` is inferred and only exists to keep the two impls from overlapping.
/// A status that is not declared has no impl and fails to compile.
pub trait HasStatus<const S: u16, I> {
    type Body;
    const CONTENT_TYPE: Option<ContentType>;
}

impl<const S: u16, C, Rest> HasStatus<S, Here> for Cons<Status<S, C>, Rest>
where
    C: PickContent,
{
    type Body = C::Output;
    const CONTENT_TYPE: Option<ContentType> = C::CONTENT_TYPE;
}

impl<const S: u16, const OTHER: u16, C, Rest, I> HasStatus<S, There<I>> for Cons<Status<OTHER, C>, Rest>
where
    Rest: HasStatus<S, I>,
{
    type Body = Rest::Body;
    const CONTENT_TYPE: Option<ContentType> = Rest::CONTENT_TYPE;
}

/// Response list of routes declared without static typing.
pub struct Unchecked;

/// A handler's reply, checked against the response list `R`.
pub struct Reply<R> {
    status: u16,
    content_type: Option<ContentType>,
    body: Value,
    _responses: PhantomData<fn() -> R>,
}

impl<R> Reply<R> {
    /// Reply with a declared status and the body type declared for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn new<const S: u16, I>(_code: Code<S>, body: <R as HasStatus<S, I>>::Body) -> anyhow::Result<Self>
    where
        R: HasStatus<S, I>,
        <R as HasStatus<S, I>>::Body: Serialize,
    {
        Ok(Self {
            status: S,
            content_type: <R as HasStatus<S, I>>::CONTENT_TYPE,
            body: serde_json::to_value(body)?,
            _responses: PhantomData,
        })
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    pub(crate) fn into_response(self) -> Response {
        Response::from_value(self.status, self.content_type, &self.body)
    }
}

impl Reply<Unchecked> {
    /// Reply with any status and body, for routes without static typing.
    #[must_use]
    pub fn dynamic(status: u16, content_type: Option<ContentType>, body: Value) -> Self {
        Self {
            status,
            content_type,
            body,
            _responses: PhantomData,
        }
    }

    /// JSON reply for routes without static typing.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::dynamic(status, Some(ContentType::ApplicationJson), body)
    }
}

impl<R> std::fmt::Debug for Reply<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("body", &self.body)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::status;
    use crate::typed::{Declared, Slots, Unset};
    use serde_json::json;

    type Responses = Cons<
        Status<200, Slots<Declared<Vec<String>>>>,
        Cons<Status<404, Slots<Unset, Unset, Declared<String>>>, Cons<Status<204, Slots>, Nil>>,
    >;

    #[test]
    fn test_reply_head_entry() {
        let reply = Reply::<Responses>::new(status::OK, vec!["a".to_string()]).unwrap();
        assert_eq!(reply.status(), 200);
        assert_eq!(reply.content_type(), Some(ContentType::ApplicationJson));
        assert_eq!(reply.body(), &json!(["a"]));
    }

    #[test]
    fn test_reply_tail_entry() {
        let reply = Reply::<Responses>::new(status::NOT_FOUND, "gone".to_string()).unwrap();
        assert_eq!(reply.status(), 404);
        assert_eq!(reply.content_type(), Some(ContentType::TextPlain));
    }

    #[test]
    fn test_reply_without_content() {
        let reply = Reply::<Responses>::new(status::NO_CONTENT, Value::Null).unwrap();
        assert_eq!(reply.content_type(), None);
        let response = reply.into_response();
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_dynamic_reply() {
        let reply = Reply::json(201, json!({ "id": 1 }));
        assert_eq!(reply.status(), 201);
        assert_eq!(reply.into_response().body_json(), Some(json!({ "id": 1 })));
    }
}
