use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stencil::{
    CancelToken, Error, Generator, HttpRequest, Method, Mode, Runner, RunnerConfig,
    SimulatedBackend,
};
use stencil_http::mock::MockExecutor;

struct Case {
    method: Method,
    path: &'static str,
    status: u16,
    ok: bool,
}

#[tokio::test]
async fn test_requests_are_real_in_simulate_mode() {
    let cases = [
        Case {
            method: Method::GET,
            path: "/a",
            status: 200,
            ok: true,
        },
        Case {
            method: Method::POST,
            path: "/b",
            status: 200,
            ok: true,
        },
        Case {
            method: Method::PATCH,
            path: "/c",
            status: 399,
            ok: true,
        },
        Case {
            method: Method::GET,
            path: "/d",
            status: 401,
            ok: false,
        },
        Case {
            method: Method::POST,
            path: "/e",
            status: 500,
            ok: false,
        },
    ];

    for case in cases {
        let server = MockServer::start().await;
        Mock::given(method(case.method.as_str()))
            .and(path(case.path))
            .respond_with(ResponseTemplate::new(case.status))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}{}", server.uri(), case.path);
        let req_method = case.method;

        let (outcome, results, mode) = tokio::task::spawn_blocking(move || {
            let mut run = Runner::simulated().unwrap();
            let outcome = run.request(HttpRequest::new(req_method, url));
            (outcome, run.results(), run.mode())
        })
        .await
        .unwrap();

        assert_eq!(mode, Mode::Simulate);
        match outcome {
            Ok(response) => {
                assert!(case.ok, "{} should have failed", case.path);
                assert_eq!(response.status, case.status);
            }
            Err(Error::Request { status, .. }) => {
                assert!(!case.ok, "{} should have succeeded", case.path);
                assert_eq!(status, Some(case.status));
            }
            Err(other) => panic!("unexpected error for {}: {other:?}", case.path),
        }

        assert_eq!(results.requests.len(), 1);
        let record = &results.requests[0];
        assert_eq!(record.request.path().as_deref(), Some(case.path));
        assert_eq!(record.request.method, case.method);
        assert_eq!(record.response.as_ref().unwrap().status, case.status);

        server.verify().await;
    }
}

#[tokio::test]
async fn test_request_step_in_generator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/repos", server.uri());

    let results = tokio::task::spawn_blocking(move || {
        let mut g = Generator::named("publish");
        g.request(HttpRequest::post(url).with_json_body(json!({"name": "widget"})));

        let mut run = Runner::simulated().unwrap();
        run.with(g);
        run.run().unwrap();
        run.results()
    })
    .await
    .unwrap();

    assert_eq!(results.requests.len(), 1);
    let response = results.requests[0].response.as_ref().unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({"id": 7}));
}

#[tokio::test]
async fn test_failed_request_stops_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/health", server.uri());

    let (err, results) = tokio::task::spawn_blocking(move || {
        let mut g = Generator::named("check");
        g.request(HttpRequest::get(url));
        g.run_fn(|r| r.file(stencil::File::new("never.txt", "")));

        let mut run = Runner::simulated().unwrap();
        run.with(g);
        let err = run.run().unwrap_err();
        (err, run.results())
    })
    .await
    .unwrap();

    assert_eq!(err.status(), Some(503));
    assert!(results.files.is_empty());
    assert_eq!(results.requests.len(), 1);
}

#[test]
fn test_transport_failure_is_logged_without_response() {
    let http = MockExecutor::new().fail_with("connection refused");
    let mut run = Runner::from_parts(
        RunnerConfig::simulate(),
        SimulatedBackend,
        Arc::new(http.clone()),
    );

    let err = run
        .request(HttpRequest::get("http://localhost/unreachable"))
        .unwrap_err();
    match err {
        Error::Request { status, message, .. } => {
            assert_eq!(status, None);
            assert!(message.contains("connection refused"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let res = run.results();
    assert_eq!(res.requests.len(), 1);
    assert!(res.requests[0].response.is_none());
    assert_eq!(http.recorded_requests().len(), 1);
}

#[test]
fn test_request_through_mock_executor() {
    let http = MockExecutor::new()
        .with_status("/ok", 204)
        .with_status("/gone", 410);
    let mut run = Runner::from_parts(
        RunnerConfig::simulate(),
        SimulatedBackend,
        Arc::new(http.clone()),
    );

    let ok = run.request(HttpRequest::delete("http://api.test/ok")).unwrap();
    assert_eq!(ok.status, 204);

    let err = run.request(HttpRequest::get("http://api.test/gone")).unwrap_err();
    assert_eq!(err.status(), Some(410));

    let paths: Vec<_> = run
        .results()
        .requests
        .iter()
        .map(|r| r.request.path().unwrap())
        .collect();
    assert_eq!(paths, vec!["/ok", "/gone"]);
    assert_eq!(http.recorded_requests().len(), 2);
}

#[test]
fn test_cancelled_request_is_not_sent() {
    let http = MockExecutor::new();
    let token = CancelToken::new();
    let mut run = Runner::from_parts(
        RunnerConfig::simulate(),
        SimulatedBackend,
        Arc::new(http.clone()),
    );
    run.with_cancel(token.clone());

    token.cancel();
    let err = run.request(HttpRequest::get("http://api.test/x")).unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert!(http.recorded_requests().is_empty());
    assert!(run.results().requests.is_empty());
}
