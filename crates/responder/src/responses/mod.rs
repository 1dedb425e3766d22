//! Response building for the responder pipeline.
//!
//! - [`factory`] - the response factory contract and the host base factories
//! - [`errors`] - error bodies and error message lookup
//! - [`subsetting`] - field subsetting for the filter-fields parameter

pub mod errors;
pub mod factory;
pub mod subsetting;

pub use errors::{ErrorFactory, ErrorMessageResolver, MessageCatalog, SerializedErrorFactory};
pub use factory::{
    FullStackResponseFactory, JsonEncoding, JsonResponse, MicroResponseFactory, ResponseFactory,
    base_name, layers,
};
pub use subsetting::apply_fields;
