use askama::Template;
use axum::{Router, response::Html, routing::get};

use crate::web::WebError;

/// Path the page's script calls unless the user points it elsewhere.
const DEFAULT_API_URL: &str = "/tasks";

#[derive(Template)]
#[template(path = "tasks.html")]
struct TasksPageTemplate {
    api_url: String,
}

impl TasksPageTemplate {
    pub fn new(api_url: String) -> Self {
        Self { api_url }
    }
}

/// Handler for the / endpoint that serves the task list page.
#[tracing::instrument]
pub async fn tasks_page_handler() -> Result<Html<String>, WebError> {
    let template = TasksPageTemplate::new(DEFAULT_API_URL.to_string());
    template.render().map(Html).map_err(WebError::from)
}

/// Creates and returns the router for the browser page.
pub fn create_tasks_page_router() -> Router {
    Router::new().route("/", get(tasks_page_handler))
}
