//! Building and sending the single request an invocation makes.

pub mod body;
pub mod executor;
pub mod request;

pub use executor::{execute, ResponseRecord};
pub use request::{build_request, PreparedRequest, RequestRecord};
