use super::*;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

#[derive(Clone)]
struct HelloState {
    hits: Arc<AtomicUsize>,
    status: StatusCode,
    body: &'static str,
}

async fn handle_hello(State(state): State<HelloState>) -> impl axum::response::IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

async fn spawn_hello_server(
    status: StatusCode,
    body: &'static str,
) -> anyhow::Result<(String, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let hits = Arc::new(AtomicUsize::new(0));
    let state = HelloState {
        hits: hits.clone(),
        status,
        body,
    };
    let app = Router::new()
        .route(HELLO_PATH, get(handle_hello))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), hits))
}

async fn mounted_view(server_url: &str) -> GreetingView {
    let api = HttpGreetingApi::new(server_url).expect("api");
    let mut view = GreetingView::new();
    mount(&api, &mut view).await;
    view
}

#[tokio::test]
async fn mount_displays_backend_message() {
    let (server_url, _hits) = spawn_hello_server(StatusCode::OK, r#"{"message":"hello"}"#)
        .await
        .expect("spawn server");

    let view = mounted_view(&server_url).await;
    assert!(view.is_settled());
    assert_eq!(view.display(), "hello");
}

#[tokio::test]
async fn mount_issues_exactly_one_request() {
    let (server_url, hits) = spawn_hello_server(StatusCode::OK, r#"{"message":"hello"}"#)
        .await
        .expect("spawn server");

    let _view = mounted_view(&server_url).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_2xx_status_falls_back() {
    let (server_url, _hits) =
        spawn_hello_server(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":"hello"}"#)
            .await
            .expect("spawn server");

    let view = mounted_view(&server_url).await;
    assert_eq!(view.display(), FALLBACK_GREETING);
}

#[tokio::test]
async fn unreachable_backend_falls_back() {
    // Bind to grab a free port, then drop the listener so connects are refused.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let view = mounted_view(&format!("http://{addr}")).await;
    assert!(view.is_settled());
    assert_eq!(view.display(), FALLBACK_GREETING);
}

#[tokio::test]
async fn non_json_body_falls_back() {
    let (server_url, _hits) = spawn_hello_server(StatusCode::OK, "<html>nope</html>")
        .await
        .expect("spawn server");

    let view = mounted_view(&server_url).await;
    assert_eq!(view.display(), FALLBACK_GREETING);
}

#[tokio::test]
async fn missing_message_field_displays_absence_not_fallback() {
    let (server_url, _hits) = spawn_hello_server(StatusCode::OK, "{}")
        .await
        .expect("spawn server");

    let view = mounted_view(&server_url).await;
    assert!(view.is_settled());
    assert_eq!(view.display(), "");
}

#[tokio::test]
async fn heading_is_invariant_across_outcomes() {
    let mut view = GreetingView::new();
    assert_eq!(view.title(), VIEW_TITLE);

    view.apply(FetchOutcome::Failed);
    assert_eq!(view.title(), VIEW_TITLE);

    let (server_url, _hits) = spawn_hello_server(StatusCode::OK, r#"{"message":"hi"}"#)
        .await
        .expect("spawn server");
    let view = mounted_view(&server_url).await;
    assert_eq!(view.title(), VIEW_TITLE);
}

#[test]
fn outcome_applies_at_most_once() {
    let mut view = GreetingView::new();
    assert!(view.apply(FetchOutcome::Greeting(Some("first".to_string()))));
    assert!(!view.apply(FetchOutcome::Failed));
    assert_eq!(view.display(), "first");
}

#[test]
fn dismissed_view_ignores_late_outcome() {
    let mut view = GreetingView::new();
    view.dismiss();
    assert!(!view.apply(FetchOutcome::Greeting(Some("late".to_string()))));
    assert_eq!(view.display(), "");
    assert!(!view.is_settled());
}

#[test]
fn invalid_server_url_is_rejected() {
    let err = HttpGreetingApi::new("not a url").expect_err("must fail");
    assert!(matches!(err, FetchError::InvalidServerUrl(_)));
}

struct ScriptedApi {
    response: GreetingResponse,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl GreetingApi for ScriptedApi {
    async fn fetch_greeting(&self) -> Result<GreetingResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

#[tokio::test]
async fn mount_fetches_once_through_the_api_seam() {
    let calls = Arc::new(AtomicUsize::new(0));
    let api = ScriptedApi {
        response: GreetingResponse {
            message: Some("scripted".to_string()),
        },
        calls: calls.clone(),
    };

    let mut view = GreetingView::new();
    mount(&api, &mut view).await;

    assert_eq!(view.display(), "scripted");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
