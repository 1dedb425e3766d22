//! Request scope extractor.
//!
//! Captures the request's query string and the shared [`ResponderState`] so
//! handlers can resolve contracts against the current request.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::ResponderResult;
use crate::request::{RequestContext, RequestParameters};
use crate::service::Responder;
use crate::state::ResponderState;

/// Axum extractor giving handlers access to per-request resolution.
///
/// # Example
///
/// ```rust,ignore
/// use responder::{JsonResponse, ResponderResult, extractors::RequestScope};
///
/// async fn index(scope: RequestScope) -> ResponderResult<JsonResponse> {
///     scope.responder()?.success(json!([])).respond(StatusCode::OK)
/// }
/// ```
#[derive(Clone)]
pub struct RequestScope {
    state: ResponderState,
    request: RequestContext,
}

impl RequestScope {
    /// Creates a scope for `request`.
    pub fn new(state: ResponderState, request: RequestContext) -> Self {
        Self { state, request }
    }

    /// The captured request.
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// The shared state.
    pub fn state(&self) -> &ResponderState {
        &self.state
    }

    /// Relations and fields the request asked for.
    pub fn parameters(&self) -> RequestParameters {
        RequestParameters::from_config(&self.request, self.state.config())
    }

    /// Resolves contract `C` for this request.
    pub fn resolve<C: ?Sized + 'static>(&self) -> ResponderResult<Box<C>> {
        self.state.resolve::<C>(&self.request)
    }

    /// Resolves the responder service for this request.
    pub fn responder(&self) -> ResponderResult<Responder> {
        self.state.responder(&self.request)
    }
}

impl<S> FromRequestParts<S> for RequestScope
where
    ResponderState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(
            ResponderState::from_ref(state),
            RequestContext::from_uri(&parts.uri),
        ))
    }
}
