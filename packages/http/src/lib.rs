//! # stencil-http
//!
//! The network boundary used by stencil runners.
//!
//! Requests are plain data ([`HttpRequest`]) handed to an [`HttpExecutor`].
//! Production code uses [`ReqwestExecutor`], a blocking reqwest client.
//! Tests can swap in `mock::MockExecutor` (enabled with the `test-utils`
//! feature) to avoid real network calls.
//!
//! ```ignore
//! use stencil_http::{HttpExecutor, HttpRequest, ReqwestExecutor};
//!
//! let executor = ReqwestExecutor::with_default_timeout()?;
//! let response = executor.execute(&HttpRequest::get("https://example.com/health"))?;
//! assert!(response.is_success());
//! ```

pub mod error;
pub mod executor;
pub mod types;

pub use error::Error;
#[cfg(any(test, feature = "test-utils"))]
pub use executor::mock;
pub use executor::{HttpExecutor, ReqwestExecutor, DEFAULT_TIMEOUT};
pub use types::{HttpRequest, HttpResponse, Method};
