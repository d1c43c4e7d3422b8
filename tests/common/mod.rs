//! Shared fakes and mock origins for integration testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use edge_router::assets::{AssetStore, MemoryAssetStore};
use edge_router::render::AppRenderer;
use edge_router::upstream::{FetchError, Fetcher};
use edge_router::{Bindings, ExecutionContext};

/// What a recorded outbound request looked like.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Scripted fetch outcome.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Respond {
        status: u16,
        headers: Vec<(&'static str, &'static str)>,
        body: &'static str,
    },
    Fail(FetchError),
    Hang,
}

/// Fetcher that records every call and replays one scripted outcome.
#[derive(Debug)]
pub struct RecordingFetcher {
    outcome: FetchOutcome,
    calls: Mutex<Vec<RecordedRequest>>,
}

impl RecordingFetcher {
    pub fn new(outcome: FetchOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn responding(status: u16, body: &'static str) -> Arc<Self> {
        Self::new(FetchOutcome::Respond {
            status,
            headers: Vec::new(),
            body,
        })
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response, FetchError> {
        let (parts, body) = request.into_parts();
        self.calls.lock().unwrap().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        });

        match &self.outcome {
            FetchOutcome::Respond {
                status,
                headers,
                body,
            } => {
                let mut response = Response::new(Body::from(*body));
                *response.status_mut() = StatusCode::from_u16(*status).unwrap();
                for (name, value) in headers {
                    response
                        .headers_mut()
                        .append(*name, value.parse().unwrap());
                }
                Ok(response)
            }
            FetchOutcome::Fail(err) => Err(err.clone()),
            FetchOutcome::Hang => std::future::pending().await,
        }
    }
}

/// Renderer that counts invocations and echoes the path it was given.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: AtomicUsize,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppRenderer for RecordingRenderer {
    async fn render(&self, request: Request<Body>, _env: &Bindings, _ctx: &ExecutionContext) -> Response {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut response = Response::new(Body::from(format!("rendered {}", request.uri().path())));
        *response.status_mut() = StatusCode::IM_A_TEAPOT;
        response
            .headers_mut()
            .insert("x-rendered-by", "app".parse().unwrap());
        response
    }
}

/// Renderer that delegates to a shared `RecordingRenderer`.
#[derive(Debug)]
pub struct SharedRenderer(pub Arc<RecordingRenderer>);

#[async_trait]
impl AppRenderer for SharedRenderer {
    async fn render(&self, request: Request<Body>, env: &Bindings, ctx: &ExecutionContext) -> Response {
        self.0.render(request, env, ctx).await
    }
}

pub const DOCS_ORIGIN: &str = "https://docs-origin.example.net";

/// Bindings over the given fakes with the docs origin set.
pub fn bindings(
    store: MemoryAssetStore,
    fetcher: Arc<RecordingFetcher>,
    renderer: Arc<dyn AppRenderer>,
) -> Bindings {
    let assets: Arc<dyn AssetStore> = Arc::new(store);
    Bindings::new(assets, fetcher, renderer, Some(Url::parse(DOCS_ORIGIN).unwrap()))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("host", "www.example.com")
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Start a programmable mock origin. Each accepted request's request line is
/// recorded before `f` produces the `(status, body)` reply.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Arc<Mutex<Vec<String>>>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let log = seen.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let head = String::from_utf8_lossy(&buf);
                        if let Some(line) = head.lines().next() {
                            log.lock().unwrap().push(line.to_string());
                        }

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

/// Start a mock origin that always replies `200` with `body`.
pub async fn start_mock_backend(body: &'static str) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    start_programmable_backend(move || async move { (200, body.to_string()) }).await
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
