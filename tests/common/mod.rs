//! A mock engine REST API serving canned responses and recording every request.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use camunda::{Client, ClientConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// A request received by the mock engine.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Bytes,
}

impl Recorded {
    /// The request body decoded as JSON; `Null` for empty or non-JSON bodies.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Query parameters in the order they were sent.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.query.as_deref().unwrap_or_default().as_bytes())
            .into_owned()
            .collect()
    }
}

#[derive(Clone)]
enum Body {
    Json(Value),
    Text(String),
    Empty,
}

#[derive(Clone)]
struct Route {
    status: StatusCode,
    body: Body,
    delay: Duration,
}

#[derive(Default)]
struct Shared {
    routes: Mutex<HashMap<(Method, String), Route>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockEngine {
    shared: Arc<Shared>,
    base_url: String,
}

impl MockEngine {
    pub async fn start() -> MockEngine {
        let shared = Arc::new(Shared::default());
        let app = Router::new().fallback(respond).with_state(shared.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockEngine {
            shared,
            base_url: format!("http://{}/engine-rest", addr),
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_base_url(self.base_url.clone())
            .with_request_timeout(Duration::from_secs(5))
    }

    pub fn client(&self) -> Client {
        Client::from_config(self.config()).unwrap()
    }

    /// Answer `method path` with a JSON body.
    pub fn on(&self, method: Method, path: &str, body: Value) -> &Self {
        self.reply(method, path, StatusCode::OK, Body::Json(body), Duration::ZERO)
    }

    /// Answer `method path` with a JSON body after `delay`.
    pub fn on_delayed(&self, method: Method, path: &str, body: Value, delay: Duration) -> &Self {
        self.reply(method, path, StatusCode::OK, Body::Json(body), delay)
    }

    /// Answer `method path` with a plain text body.
    pub fn on_text(&self, method: Method, path: &str, body: &str) -> &Self {
        self.reply(method, path, StatusCode::OK, Body::Text(body.to_owned()), Duration::ZERO)
    }

    /// Answer `method path` with `204 No Content`.
    pub fn on_empty(&self, method: Method, path: &str) -> &Self {
        self.reply(method, path, StatusCode::NO_CONTENT, Body::Empty, Duration::ZERO)
    }

    /// Answer `method path` with an engine error body.
    pub fn on_error(&self, method: Method, path: &str, status: StatusCode, message: &str) -> &Self {
        let body = json!({"type": "InvalidRequestException", "message": message});
        self.reply(method, path, status, Body::Json(body), Duration::ZERO)
    }

    fn reply(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        body: Body,
        delay: Duration,
    ) -> &Self {
        let route = Route {
            status,
            body,
            delay,
        };
        self.shared
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_owned()), route);
        self
    }

    /// The only recorded request to `method path`.
    pub fn single(&self, method: Method, path: &str) -> Recorded {
        let matching: Vec<_> = self
            .requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect();
        assert_eq!(matching.len(), 1, "requests to {} {}: {:?}", method, path, self.requests());
        matching.into_iter().next().unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    /// The first recorded request to `method path`.
    pub fn request(&self, method: Method, path: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .find(|request| request.method == method && request.path == path)
    }

    /// Wait until a request to `method path` arrived.
    pub async fn wait_for(&self, method: Method, path: &str) -> Recorded {
        for _ in 0..200 {
            if let Some(request) = self.request(method.clone(), path) {
                return request;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no {} {} request received", method, path);
    }
}

async fn respond(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    shared.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body,
    });

    let route = shared
        .routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_owned()))
        .cloned();
    let Some(route) = route else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"type": "RestException", "message": "no mock route"})),
        )
            .into_response();
    };
    tokio::time::sleep(route.delay).await;
    match route.body {
        Body::Json(body) => (route.status, Json(body)).into_response(),
        Body::Text(body) => (route.status, body).into_response(),
        Body::Empty => route.status.into_response(),
    }
}
