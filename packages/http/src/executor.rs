//! HTTP execution abstraction.
//!
//! The runner never talks to reqwest directly; it goes through
//! [`HttpExecutor`] so that tests can substitute a mock.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use tracing::debug;

use crate::error::Result;
use crate::types::{Body, HttpRequest, HttpResponse};

/// Default client timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs one HTTP exchange.
///
/// An `Ok` response means the exchange completed, whatever its status code.
/// `Err` is reserved for exchanges that did not complete.
pub trait HttpExecutor: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking reqwest client.
///
/// Redirects are not followed: the status the server answered with is the
/// status reported back.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self> {
        Self::new(DEFAULT_TIMEOUT)
    }

    fn prepare(&self, request: &HttpRequest) -> Result<RequestBuilder> {
        let url = url::Url::parse(&request.url)?;
        let mut builder = self.client.request(request.method.into(), url);

        for (name, value) in &request.headers {
            builder = builder.header(
                HeaderName::try_from(name.as_str())?,
                HeaderValue::try_from(value.as_str())?,
            );
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        Ok(match &request.body {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Text(text)) => builder.body(text.clone()),
            None => builder,
        })
    }
}

/// Convert a completed reqwest exchange into a plain response.
///
/// Header values that are not valid UTF-8 are dropped.
fn into_response(response: Response) -> Result<HttpResponse> {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();

    Ok(HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        headers,
        body_text: response.text()?,
    })
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(request = %request, "sending");
        let response = into_response(self.prepare(request)?.send()?)?;
        debug!(status = response.status, "received");
        Ok(response)
    }
}

/// In-process executor for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    use super::HttpExecutor;
    use crate::error::{Error, Result};
    use crate::types::{HttpRequest, HttpResponse};

    #[derive(Default)]
    struct State {
        by_path: HashMap<String, HttpResponse>,
        fallback: Option<HttpResponse>,
        failure: Option<String>,
        seen: Vec<HttpRequest>,
    }

    /// Answers from a table keyed by URL path and remembers every request
    /// it was handed.
    ///
    /// Clones share state, so a test can keep one handle and give the
    /// other to a runner. Unknown paths get a 404.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        state: Arc<Mutex<State>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        pub fn with_response(self, path: impl Into<String>, response: HttpResponse) -> Self {
            self.state().by_path.insert(path.into(), response);
            self
        }

        /// Answer requests to `path` with an empty body and the given status.
        pub fn with_status(self, path: impl Into<String>, status: u16) -> Self {
            self.with_response(path, HttpResponse::with_status(status))
        }

        /// Response for paths with no entry of their own.
        pub fn with_default_response(self, response: HttpResponse) -> Self {
            self.state().fallback = Some(response);
            self
        }

        /// Fail every request as if the exchange never completed.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            self.state().failure = Some(message.into());
            self
        }

        pub fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.state().seen.clone()
        }

        pub fn clear_recorded(&self) {
            self.state().seen.clear();
        }
    }

    impl HttpExecutor for MockExecutor {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            let mut state = self.state();
            state.seen.push(request.clone());

            if let Some(message) = &state.failure {
                return Err(Error::other(message.clone()));
            }

            let key = request.path().unwrap_or_else(|| request.url.clone());
            let response = state
                .by_path
                .get(&key)
                .or(state.fallback.as_ref())
                .cloned()
                .unwrap_or_else(|| HttpResponse::with_status(404));
            Ok(response)
        }
    }
}
