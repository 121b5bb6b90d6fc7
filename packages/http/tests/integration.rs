use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stencil_http::{Error, HttpExecutor, HttpRequest, HttpResponse, ReqwestExecutor};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct Template {
    name: String,
    files: u32,
}

/// The executor is blocking, so it runs off the async test runtime.
async fn send(request: HttpRequest) -> HttpResponse {
    tokio::task::spawn_blocking(move || {
        let executor = ReqwestExecutor::with_default_timeout().unwrap();
        executor.execute(&request).unwrap()
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_get_json() {
    let server = MockServer::start().await;
    let template = Template {
        name: "cli".to_string(),
        files: 4,
    };

    Mock::given(method("GET"))
        .and(path("/templates/cli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&template))
        .mount(&server)
        .await;

    let response = send(HttpRequest::get(format!("{}/templates/cli", server.uri()))).await;

    assert!(response.is_success());
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.json::<Template>().unwrap(), template);
}

#[tokio::test]
async fn test_error_status_is_still_a_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/templates/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such template"))
        .mount(&server)
        .await;

    let response = send(HttpRequest::get(format!(
        "{}/templates/missing",
        server.uri()
    )))
    .await;

    assert_eq!(response.status, 404);
    assert_eq!(response.body_text, "no such template");
    assert!(response.is_client_error());
}

#[tokio::test]
async fn test_post_sends_headers_query_and_json() {
    let server = MockServer::start().await;
    let template = Template {
        name: "service".to_string(),
        files: 9,
    };

    Mock::given(method("POST"))
        .and(path("/templates"))
        .and(header("Authorization", "Bearer s3cret"))
        .and(query_param("overwrite", "true"))
        .and(body_json(&template))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let request = HttpRequest::post(format!("{}/templates", server.uri()))
        .with_header("Authorization", "Bearer s3cret")
        .with_query("overwrite", "true")
        .with_body(&template)
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status, 201);
    server.verify().await;
}

#[tokio::test]
async fn test_put_text_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/files/README.md"))
        .and(body_string("# widget\n"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = send(
        HttpRequest::put(format!("{}/files/README.md", server.uri())).with_text_body("# widget\n"),
    )
    .await;

    assert_eq!(response.status, 204);
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/templates"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/v2/templates"))
        .mount(&server)
        .await;

    let response = send(HttpRequest::get(format!("{}/v1/templates", server.uri()))).await;

    assert_eq!(response.status, 302);
    assert_eq!(
        response.headers.get("location").map(String::as_str),
        Some("/v2/templates")
    );
    assert!(!response.is_error());
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/templates/cli"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = send(HttpRequest::delete(format!("{}/templates/cli", server.uri()))).await;

    assert!(response.is_server_error());
    assert_eq!(response.status_text, "Service Unavailable");
}

#[test]
fn test_connection_refused_is_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let executor = ReqwestExecutor::new(std::time::Duration::from_secs(2)).unwrap();
    let err = executor
        .execute(&HttpRequest::get(format!("http://127.0.0.1:{}/x", port)))
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}
