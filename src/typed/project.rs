use std::collections::HashMap;
use std::marker::PhantomData;

use crate::route::ContentType;

/// Marker for a part the route did not declare.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unset;

/// Marker for a part declared with a schema whose output is `T`.
pub struct Declared<T>(PhantomData<fn() -> T>);

/// Fallback for undeclared params, query and headers: raw string pairs.
pub type Dictionary = HashMap<String, String>;

/// Fallback for an undeclared body.
pub type Unknown = serde_json::Value;

/// Resolve a marker to the handler-facing type, or `Fallback` when unset.
pub trait Projection<Fallback> {
    type Output;
}

impl<F> Projection<F> for Unset {
    type Output = F;
}

impl<T, F> Projection<F> for Declared<T> {
    type Output = T;
}

/// Per-media-type slots: JSON, multipart, plain text, HTML.
pub struct Slots<J = Unset, M = Unset, T = Unset, X = Unset>(PhantomData<fn() -> (J, M, T, X)>);

/// Pick the highest priority declared slot.
///
/// The impls are disjoint on the leading `Unset`s, so exactly one applies to
/// any combination of markers.
pub trait PickContent {
    type Output;
    const CONTENT_TYPE: Option<ContentType>;
}

impl<J, M, T, X> PickContent for Slots<Declared<J>, M, T, X> {
    type Output = J;
    const CONTENT_TYPE: Option<ContentType> = Some(ContentType::ApplicationJson);
}

impl<M, T, X> PickContent for Slots<Unset, Declared<M>, T, X> {
    type Output = M;
    const CONTENT_TYPE: Option<ContentType> = Some(ContentType::MultipartFormData);
}

impl<T, X> PickContent for Slots<Unset, Unset, Declared<T>, X> {
    type Output = T;
    const CONTENT_TYPE: Option<ContentType> = Some(ContentType::TextPlain);
}

impl<X> PickContent for Slots<Unset, Unset, Unset, Declared<X>> {
    type Output = X;
    const CONTENT_TYPE: Option<ContentType> = Some(ContentType::TextHtml);
}

impl PickContent for Slots<Unset, Unset, Unset, Unset> {
    type Output = Unknown;
    const CONTENT_TYPE: Option<ContentType> = None;
}
