use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use task_tracker::task::web::create_tasks_page_router;
use task_tracker::web::health_check_handler;
use tower::ServiceExt;

/// Create a router for testing web endpoints.
/// This function creates a minimal router with just the routes that need no database.
fn create_test_router() -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(create_tasks_page_router())
}

async fn get(uri: &str) -> (StatusCode, String, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = create_test_router().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .map(|value| value.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_text = std::str::from_utf8(&body).unwrap().to_string();
    (status, content_type, body_text)
}

#[tokio::test]
async fn can_check_health_endpoint() {
    let (status, _, body) = get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn can_render_task_page() {
    let (status, content_type, body) = get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("<title>Task Tracker</title>"));
    assert!(body.contains(r#"<input type="text" id="apiUrl" value="/tasks">"#));
    assert!(body.contains(r#"<form id="taskForm">"#));
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let (status, _, _) = get("/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
