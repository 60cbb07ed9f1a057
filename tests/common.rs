#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::SET_COOKIE;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde_json::Value;
use sessiontron::config::{extract_config, ConfigV1};
use sessiontron::routes::create_router;
use sessiontron::startup::build_state;
use tower::ServiceExt;

pub const COOKIE_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
logging:
  level: "debug"
  format: "console"
session:
  id_location:
    type: cookie
    name: SESSION_ID
  default_expiry_in_s: 60
store:
  enabled: true
  type: memory
  purge_interval_in_s: 1
"#;

pub const HEADER_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
logging:
  level: "debug"
  format: "console"
session:
  id_location:
    type: header
    name: X-Session-Id
store:
  enabled: true
  type: memory
"#;

pub const DISABLED_STORE_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
logging:
  level: "info"
  format: "console"
store:
  enabled: false
"#;

pub fn load_test_config(yaml: &str) -> ConfigV1 {
    extract_config(Figment::new().merge(Yaml::string(yaml)))
        .expect("Failed to parse test config YAML")
}

pub async fn build_app(yaml: &str) -> Router {
    let state = build_state(Arc::new(load_test_config(yaml)))
        .await
        .expect("failed to build application state");
    create_router(state)
}

pub fn request(
    method: Method,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("failed to build request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("request should complete")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// All Set-Cookie values of a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().expect("Set-Cookie not valid UTF-8").to_string())
        .collect()
}

/// The `name=value` part of the first Set-Cookie, ready for a `Cookie` request header.
pub fn cookie_from(response: &Response<Body>) -> String {
    let set_cookie = set_cookies(response)
        .into_iter()
        .next()
        .expect("Set-Cookie header missing");
    set_cookie
        .split(';')
        .next()
        .expect("Set-Cookie has a name=value pair")
        .to_string()
}

pub fn assert_status(response: &Response<Body>, status: StatusCode) {
    assert_eq!(response.status(), status, "unexpected status for response");
}
