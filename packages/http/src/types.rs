//! Plain-data request and response types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Request methods a generator may use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::PATCH => http::Method::PATCH,
            Method::HEAD => http::Method::HEAD,
            Method::OPTIONS => http::Method::OPTIONS,
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    /// Serialized as JSON with a JSON content type.
    Json(serde_json::Value),
    /// Sent verbatim.
    Text(String),
}

/// One request, as data. Executors turn it into a wire exchange.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HttpRequest {
    #[serde(default)]
    pub method: Method,

    /// Absolute URL of the request
    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_body(mut self, body: impl Serialize) -> Result<Self, serde_json::Error> {
        self.body = Some(Body::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn with_json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    pub fn with_text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Text(body.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// The path component of the URL, or `None` if the URL does not parse.
    pub fn path(&self) -> Option<String> {
        url::Url::parse(&self.url).ok().map(|u| u.path().to_string())
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A completed exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase, or `Unknown` for unassigned codes.
    pub status_text: String,
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body_text: String,
}

impl HttpResponse {
    /// A response with no headers and no body.
    pub fn with_status(status: u16) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();
        Self {
            status,
            status_text,
            headers: HashMap::new(),
            body_text: String::new(),
        }
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 400 and above.
    ///
    /// The threshold is numeric: 1xx-3xx, including codes without an
    /// assigned meaning such as 399, are not errors.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// 4xx.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// 5xx.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builders() {
        let request = HttpRequest::post("http://localhost/items")
            .with_header("Authorization", "Bearer t")
            .with_query("page", "2")
            .with_json_body(serde_json::json!({"name": "x"}));

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers["Authorization"], "Bearer t");
        assert_eq!(request.query["page"], "2");
        assert_eq!(
            request.body,
            Some(Body::Json(serde_json::json!({"name": "x"})))
        );
        assert_eq!(request.to_string(), "POST http://localhost/items");
    }

    #[test]
    fn request_path() {
        assert_eq!(
            HttpRequest::get("http://127.0.0.1:8080/a/b?x=1").path(),
            Some("/a/b".to_string())
        );
        assert_eq!(HttpRequest::get("not a url").path(), None);
    }

    #[test]
    fn error_threshold_is_numeric() {
        for status in [100, 200, 204, 301, 399] {
            assert!(!HttpResponse::with_status(status).is_error(), "{status}");
        }
        for status in [400, 401, 404, 500, 503] {
            assert!(HttpResponse::with_status(status).is_error(), "{status}");
        }
    }

    #[test]
    fn status_text_for_unassigned_code() {
        assert_eq!(HttpResponse::with_status(404).status_text, "Not Found");
        assert_eq!(HttpResponse::with_status(399).status_text, "Unknown");
    }

    #[test]
    fn response_json() {
        let mut response = HttpResponse::with_status(200);
        response.body_text = r#"{"ok":true}"#.to_string();
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn method_serde_uppercase() {
        let json = serde_json::to_string(&Method::PATCH).unwrap();
        assert_eq!(json, "\"PATCH\"");
        let method: Method = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(method, Method::DELETE);
    }
}
