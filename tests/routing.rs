//! Routing behavior driven through fake bindings.
//!
//! Every test builds an `EdgeRouter` from configuration and routes requests
//! against a memory asset store, a recording fetcher and a recording renderer.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Request, StatusCode};

use common::{
    bindings, body_string, get, FetchOutcome, RecordingFetcher, RecordingRenderer, SharedRenderer,
    DOCS_ORIGIN,
};
use edge_router::assets::cache::CachePolicy;
use edge_router::assets::MemoryAssetStore;
use edge_router::render::{GateRule, GatedRenderer};
use edge_router::upstream::FetchError;
use edge_router::{EdgeConfig, EdgeRouter, ExecutionContext, RoutingDecision};

fn store() -> MemoryAssetStore {
    let mut store = MemoryAssetStore::new(CachePolicy::default());
    store.insert_with_headers(
        "/_app/immutable/entry.3f2a.js",
        "console.log('entry')",
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/javascript")),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=31536000, immutable"),
            ),
            (header::ETAG, HeaderValue::from_static("\"entry-3f2a\"")),
        ],
    );
    store.insert("/docs/app.js", "docs bundle");
    store.insert("/favicon.ico", vec![0u8, 1, 2, 3]);
    store
}

fn router() -> EdgeRouter {
    EdgeRouter::from_config(&EdgeConfig::default())
}

#[tokio::test]
async fn test_static_asset_served_with_stored_headers() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router()
        .route(get("/_app/immutable/entry.3f2a.js"), &env, &ctx)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/javascript");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(response.headers()[header::ETAG], "\"entry-3f2a\"");
    assert_eq!(body_string(response).await, "console.log('entry')");
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_static_asset_served_for_any_method() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let request = Request::post("/favicon.ico")
        .header("host", "www.example.com")
        .body(Body::from("ignored"))
        .unwrap();
    let response = router().route(request, &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], &[0u8, 1, 2, 3]);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_static_conditional_get_returns_not_modified() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let env = bindings(store(), fetcher, RecordingRenderer::new());
    let (ctx, _cancel) = ExecutionContext::new();

    let request = Request::get("/_app/immutable/entry.3f2a.js")
        .header("host", "www.example.com")
        .header(header::IF_NONE_MATCH, "\"entry-3f2a\"")
        .body(Body::empty())
        .unwrap();
    let response = router().route(request, &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn test_docs_request_proxied_once_to_rewritten_url() {
    let fetcher = RecordingFetcher::new(FetchOutcome::Respond {
        status: 200,
        headers: vec![("x-docs-version", "42"), ("content-type", "text/html")],
        body: "<h1>Guide</h1>",
    });
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/docs/guide/setup?lang=en"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-docs-version"], "42");
    assert_eq!(body_string(response).await, "<h1>Guide</h1>");

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].uri, format!("{DOCS_ORIGIN}/guide/setup?lang=en"));
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_docs_upstream_status_passed_through() {
    let fetcher = RecordingFetcher::responding(404, "no such page");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/docs/nope"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "no such page");
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_docs_request_headers_prepared() {
    let fetcher = RecordingFetcher::responding(200, "ok");
    let env = bindings(store(), fetcher.clone(), RecordingRenderer::new());
    let (ctx, _cancel) = ExecutionContext::new();

    let request = Request::post("/docs/search")
        .header("host", "www.example.com")
        .header(header::COOKIE, "session=secret")
        .header(header::AUTHORIZATION, "Bearer token")
        .header(header::CONNECTION, "keep-alive")
        .header(header::ACCEPT, "application/json")
        .body(Body::from("q=edge"))
        .unwrap();
    router().route(request, &env, &ctx).await;

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    let sent = &calls[0];
    assert_eq!(sent.method, "POST");
    assert_eq!(&sent.body[..], b"q=edge");
    assert_eq!(sent.headers[header::ACCEPT], "application/json");
    assert_eq!(sent.headers["x-forwarded-host"], "www.example.com");
    assert!(sent.headers.get(header::COOKIE).is_none());
    assert!(sent.headers.get(header::AUTHORIZATION).is_none());
    assert!(sent.headers.get(header::CONNECTION).is_none());
    assert!(sent.headers.get(header::HOST).is_none());
}

#[tokio::test]
async fn test_docs_response_policy_headers_stripped() {
    let fetcher = RecordingFetcher::new(FetchOutcome::Respond {
        status: 200,
        headers: vec![("set-cookie", "tracker=1"), ("content-type", "text/html")],
        body: "docs",
    });
    let env = bindings(store(), fetcher, RecordingRenderer::new());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/docs"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
}

#[tokio::test]
async fn test_app_render_called_once_and_returned_verbatim() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/dashboard/projects"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.headers()["x-rendered-by"], "app");
    assert_eq!(body_string(response).await, "rendered /dashboard/projects");
    assert_eq!(renderer.call_count(), 1);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_lookalike_docs_prefix_goes_to_app() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    router().route(get("/docsify"), &env, &ctx).await;

    assert_eq!(renderer.call_count(), 1);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_static_takes_priority_over_docs() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/docs/app.js"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "docs bundle");
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_missing_static_candidate_falls_through() {
    let fetcher = RecordingFetcher::responding(200, "docs image");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    // Under the docs prefix: next in line is the docs proxy.
    let response = router().route(get("/docs/diagram.png"), &env, &ctx).await;
    assert_eq!(body_string(response).await, "docs image");
    assert_eq!(fetcher.call_count(), 1);

    // Elsewhere: the application renderer.
    let response = router().route(get("/_app/missing.js"), &env, &ctx).await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(renderer.call_count(), 1);
}

#[tokio::test]
async fn test_docs_fetch_failure_is_bad_gateway_without_retry() {
    let fetcher = RecordingFetcher::new(FetchOutcome::Fail(FetchError::Connect(
        "connection refused".to_string(),
    )));
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/docs/missing-page"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_docs_fetch_timeout_is_gateway_timeout() {
    let fetcher = RecordingFetcher::new(FetchOutcome::Fail(FetchError::Timeout(
        Duration::from_secs(15),
    )));
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/docs/slow"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_cancellation_abandons_docs_fetch() {
    let fetcher = RecordingFetcher::new(FetchOutcome::Hang);
    let env = bindings(store(), fetcher.clone(), RecordingRenderer::new());
    let (ctx, cancel) = ExecutionContext::new();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let response = tokio::time::timeout(
        Duration::from_secs(2),
        router().route(get("/docs/hanging"), &env, &ctx),
    )
    .await
    .expect("cancelled route should resolve");
    canceller.await.unwrap();

    assert_eq!(response.status().as_u16(), 499);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_oversized_docs_body_rejected_before_fetch() {
    let mut config = EdgeConfig::default();
    config.security.max_body_size = 8;
    let router = EdgeRouter::from_config(&config);

    let fetcher = RecordingFetcher::responding(200, "ok");
    let env = bindings(store(), fetcher.clone(), RecordingRenderer::new());
    let (ctx, _cancel) = ExecutionContext::new();

    let request = Request::post("/docs/upload")
        .header("host", "www.example.com")
        .body(Body::from("far more than eight bytes"))
        .unwrap();
    let response = router.route(request, &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_host_rejected() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let request = Request::get("/docs/guide")
        .header("host", "bad host name")
        .body(Body::empty())
        .unwrap();
    let response = router().route(request, &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_docs_disabled_without_origin() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let mut env = bindings(store(), fetcher.clone(), renderer.clone());
    env.docs_origin = None;
    let (ctx, _cancel) = ExecutionContext::new();

    router().route(get("/docs/guide"), &env, &ctx).await;

    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(renderer.call_count(), 1);
}

#[tokio::test]
async fn test_docs_host_routes_whole_site() {
    let mut config = EdgeConfig::default();
    config.docs.host = Some("docs.example.com".to_string());
    let router = EdgeRouter::from_config(&config);

    let fetcher = RecordingFetcher::responding(200, "docs home");
    let env = bindings(store(), fetcher.clone(), RecordingRenderer::new());

    let request = Request::get("/getting-started")
        .header("host", "docs.example.com")
        .body(Body::empty())
        .unwrap();
    let decision = router.decide(&request, &env).await.unwrap();

    assert_eq!(
        decision,
        RoutingDecision::ProxyDocs(format!("{DOCS_ORIGIN}/getting-started").parse().unwrap())
    );
}

#[tokio::test]
async fn test_decision_is_deterministic() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let env = bindings(store(), fetcher, RecordingRenderer::new());
    let router = router();

    for uri in ["/_app/immutable/entry.3f2a.js", "/docs/intro", "/settings", "/docs/app.js"] {
        let first = router.decide(&get(uri), &env).await.unwrap();
        let second = router.decide(&get(uri), &env).await.unwrap();
        assert_eq!(first, second, "decision for {uri} changed between calls");
    }

    assert_eq!(
        router.decide(&get("/settings"), &env).await.unwrap(),
        RoutingDecision::RenderApp
    );
    assert_eq!(
        router.decide(&get("/docs/app.js"), &env).await.unwrap().kind(),
        "static"
    );
}

#[tokio::test]
async fn test_dot_segments_normalized_before_classification() {
    let fetcher = RecordingFetcher::responding(200, "docs");
    let renderer = RecordingRenderer::new();
    let env = bindings(store(), fetcher.clone(), renderer.clone());

    let decision = router().decide(&get("/docs/../settings"), &env).await.unwrap();
    assert_eq!(decision, RoutingDecision::RenderApp);
}

fn gated_env(renderer: Arc<RecordingRenderer>) -> edge_router::Bindings {
    let gated = GatedRenderer::new(
        SharedRenderer(renderer),
        vec![GateRule::new("/admin/audit-log", "org:audit_logs:read")],
        HeaderName::from_static("x-user-permissions"),
    );
    bindings(store(), RecordingFetcher::responding(200, "docs"), Arc::new(gated))
}

#[tokio::test]
async fn test_gated_page_denied_without_permission() {
    let renderer = RecordingRenderer::new();
    let env = gated_env(renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let request = Request::get("/admin/audit-log/2024")
        .header("host", "www.example.com")
        .header("x-user-permissions", "org:billing:read")
        .body(Body::empty())
        .unwrap();
    let response = router().route(request, &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "private, no-store");
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn test_gated_page_rendered_with_permission() {
    let renderer = RecordingRenderer::new();
    let env = gated_env(renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let request = Request::get("/admin/audit-log")
        .header("host", "www.example.com")
        .header("x-user-permissions", "org:billing:read, org:audit_logs:read")
        .body(Body::empty())
        .unwrap();
    let response = router().route(request, &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(renderer.call_count(), 1);
}

#[tokio::test]
async fn test_ungated_page_passes_through_gate() {
    let renderer = RecordingRenderer::new();
    let env = gated_env(renderer.clone());
    let (ctx, _cancel) = ExecutionContext::new();

    let response = router().route(get("/admin/audit-logger"), &env, &ctx).await;

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(renderer.call_count(), 1);
}

#[tokio::test]
async fn test_gate_holds_for_non_canonical_spellings() {
    for uri in ["/admin/%61udit-log", "//admin/audit-log", "/admin//audit-log"] {
        let renderer = RecordingRenderer::new();
        let env = gated_env(renderer.clone());
        let (ctx, _cancel) = ExecutionContext::new();

        let response = router().route(get(uri), &env, &ctx).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri} bypassed the gate");
        assert_eq!(renderer.call_count(), 0, "{uri} reached the renderer");
    }
}
