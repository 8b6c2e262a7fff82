//! Validated service types.

mod endpoint;

pub use endpoint::{DEFAULT_ENDPOINT, EndpointUrl};
