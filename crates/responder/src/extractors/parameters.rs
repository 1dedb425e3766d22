//! Include and filter parameters extractor.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::request::{RequestContext, RequestParameters};
use crate::state::ResponderState;

/// The relations and fields requested through the configured query
/// parameters (`with` and `only` by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Included(pub RequestParameters);

impl Included {
    /// Relations to include.
    pub fn relations(&self) -> &[String] {
        self.0.relations()
    }

    /// Fields to keep.
    pub fn fields(&self) -> &[String] {
        self.0.fields()
    }
}

impl<S> FromRequestParts<S> for Included
where
    ResponderState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = ResponderState::from_ref(state);
        let request = RequestContext::from_uri(&parts.uri);
        Ok(Self(RequestParameters::from_config(&request, state.config())))
    }
}
