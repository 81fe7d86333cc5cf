mod common;

use std::sync::{Arc, Mutex};

use ::http::{Method, Request, StatusCode};
use common::*;
use strata_gateway::*;
use strata_query::PaginationConfig;

// ── Dispatch ────────────────────────────────────────────────────

#[test]
fn operators_reach_the_backend() {
    let mux = build(GatewayConfig::default());
    let response = mux.handle(post(
        "/api/users/list?_order_by=name,-age&_filter=age+%3E+21&_fields=name,age&_fts=john&_limit=10&_offset=20",
        r#"{"parent":"org-1"}"#,
    ));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let echo = echo(&response);
    assert_eq!(echo.parent.as_deref(), Some("org-1"));
    assert_eq!(echo.sorting.as_deref(), Some("name,-age"));
    assert_eq!(echo.fields, Some(vec!["age".to_string(), "name".to_string()]));
    let filter = echo.filter.unwrap();
    assert!(filter.starts_with("age > "), "{filter}");
    assert_eq!(echo.search.as_deref(), Some("john"));
    assert_eq!(echo.limit, Some(10));
    assert_eq!(echo.offset, Some(20));
}

#[test]
fn missing_operators_leave_request_untouched() {
    let mux = build(GatewayConfig::default());
    let echo = echo(&mux.handle(post("/api/users/list", "")));
    assert_eq!(echo.parent.as_deref(), Some(""));
    assert_eq!(echo.sorting, None);
    assert_eq!(echo.limit, None);
}

#[test]
fn inapplicable_operators_are_ignored() {
    let mux = build(GatewayConfig::default());
    let response = mux.handle(post(
        "/api/users/get?_order_by=name&_limit=5&_fields=name",
        r#"{"id":"u-1"}"#,
    ));
    assert_eq!(response.status(), StatusCode::OK);
    let echo = echo(&response);
    assert_eq!(echo.id.as_deref(), Some("u-1"));
    assert_eq!(echo.fields, Some(vec!["name".to_string()]));
    assert_eq!(echo.sorting, None);
    assert_eq!(echo.limit, None);
}

#[test]
fn limit_clamped_to_configured_max() {
    let mut config = GatewayConfig::default();
    config.pagination = PaginationConfig {
        default_limit: 10,
        max_limit: 50,
    };
    let mux = build(config);
    let clamped = echo(&mux.handle(post("/api/users/list?_limit=500", "")));
    assert_eq!(clamped.limit, Some(50));
    let defaulted = echo(&mux.handle(post("/api/users/list?_limit=0", "")));
    assert_eq!(defaulted.limit, Some(10));
}

#[test]
fn metadata_headers_forwarded() {
    let mux = build(GatewayConfig::default());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/users/get")
        .header("x-meta-tenant", "acme")
        .header("x-request-id", "not-forwarded")
        .body(br#"{"id":"u-1"}"#.to_vec())
        .unwrap();
    let echo = echo(&mux.handle(req));
    assert_eq!(echo.metadata, vec![("tenant".to_string(), "acme".to_string())]);
}

#[test]
fn custom_metadata_prefix() {
    let mut config = GatewayConfig::default();
    config.mux.metadata_prefix = "grpc-metadata-".into();
    let mux = build(config);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/users/get")
        .header("grpc-metadata-user", "ann")
        .header("x-meta-tenant", "acme")
        .body(Vec::new())
        .unwrap();
    let echo = echo(&mux.handle(req));
    assert_eq!(echo.metadata, vec![("user".to_string(), "ann".to_string())]);
}

#[test]
fn metadata_prefix_is_case_insensitive() {
    let mut config = GatewayConfig::default();
    config.mux.metadata_prefix = "X-Meta-".into();
    let mux = build(config);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/users/get")
        .header("X-Meta-Tenant", "acme")
        .body(Vec::new())
        .unwrap();
    let echo = echo(&mux.handle(req));
    assert_eq!(echo.metadata, vec![("tenant".to_string(), "acme".to_string())]);
}

#[test]
fn interceptor_can_be_disabled() {
    let mut config = GatewayConfig::default();
    config.dial.collection_operators = false;
    let mux = build(config);
    let response = mux.handle(post("/api/users/list?_filter=((&_order_by=name", ""));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(echo(&response).sorting, None);
}

// ── Errors ──────────────────────────────────────────────────────

#[test]
fn syntax_error_is_bad_request() {
    let mux = build(GatewayConfig::default());
    let response = mux.handle(post("/api/users/list?_filter=name+==&_order_by=name", ""));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(&response);
    assert_eq!(body["code"], "invalid_argument");
    assert!(
        body["error"].as_str().unwrap().contains("filter"),
        "{}",
        body["error"]
    );
}

#[test]
fn deeply_nested_filter_is_bad_request() {
    let mux = build(GatewayConfig::default());
    let depth = 5_000;
    let uri = format!(
        "/api/users/list?_filter={}a+==+1{}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let response = mux.handle(post(&uri, ""));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(&response);
    assert_eq!(body["code"], "invalid_argument");
    assert!(
        body["error"].as_str().unwrap().contains("nested too deeply"),
        "{}",
        body["error"]
    );
}

#[test]
fn negative_limit_is_bad_request() {
    let mux = build(GatewayConfig::default());
    let response = mux.handle(post("/api/users/list?_limit=-5", ""));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn undecodable_body_is_bad_request() {
    let mux = build(GatewayConfig::default());
    let response = mux.handle(post("/api/users/list", "{not json"));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(&response);
    assert!(body["error"].as_str().unwrap().starts_with("decode request"));
}

#[test]
fn backend_status_passed_through() {
    let mux = build(GatewayConfig::default());
    let response = mux.handle(post("/api/users/list", r#"{"parent":"missing"}"#));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_body(&response)["code"], "not_found");
}

#[test]
fn unknown_route_is_not_found() {
    let mux = build(GatewayConfig::default());
    for uri in ["/api/users/delete", "/api/usersx/list", "/elsewhere"] {
        let response = mux.handle(post(uri, ""));
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = error_body(&response);
        assert_eq!(body["code"], "not_found");
    }
}

#[test]
fn wrong_method_is_unimplemented() {
    let mux = build(GatewayConfig::default());
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/users/list")
        .body(Vec::new())
        .unwrap();
    let response = mux.handle(req);
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

// ── Registration ────────────────────────────────────────────────

#[test]
fn register_receives_server_address() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut config = GatewayConfig::default();
    config.server_address = "users-backend:50051".into();
    let mux = Gateway::new(config)
        .register("/v1/users/", recording_routes(Arc::clone(&seen)))
        .build()
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["users-backend:50051".to_string()]);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/v1/users?_order_by=name")
        .body(Vec::new())
        .unwrap();
    let response = mux.handle(req);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(echo(&response).sorting.as_deref(), Some("name"));
}

#[test]
fn longest_prefix_wins() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mux = Gateway::new(GatewayConfig::default())
        .register("/api", recording_routes(Arc::clone(&seen)))
        .register("/api/users", users_routes)
        .build()
        .unwrap();
    let response = mux.handle(post("/api/users/get", r#"{"id":"u-2"}"#));
    assert_eq!(echo(&response).id.as_deref(), Some("u-2"));
}

#[test]
fn failed_registration_aborts_build() {
    let result = Gateway::new(GatewayConfig::default())
        .register("/api/users", |_ctx: &RegisterContext| {
            Err(Status::unavailable("backend unreachable"))
        })
        .build();
    match result {
        Err(GatewayError::Register { prefix, source }) => {
            assert_eq!(prefix, "/api/users");
            assert_eq!(source.code, Code::Unavailable);
        }
        Err(other) => panic!("expected Register, got {:?}", other),
        Ok(_) => panic!("expected Register error, got a mux"),
    }
}

#[test]
fn duplicate_routes_rejected() {
    let result = Gateway::new(GatewayConfig::default())
        .register("/api/users", users_routes)
        .register("/api/users/", users_routes)
        .build();
    match result {
        Err(GatewayError::DuplicateRoute { method, path }) => {
            assert_eq!(method, Method::POST);
            assert_eq!(path, "/api/users/list");
        }
        Err(other) => panic!("expected DuplicateRoute, got {:?}", other),
        Ok(_) => panic!("expected DuplicateRoute error, got a mux"),
    }
}
