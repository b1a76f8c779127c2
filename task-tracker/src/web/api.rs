use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::task::Task;
use crate::task::api::{ErrorResponse, TaskPayload, TaskState, create_task_router};

/// OpenAPI document for the JSON endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::list_tasks_handler,
        crate::task::api::get_task_handler,
        crate::task::api::create_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
    ),
    components(schemas(Task, TaskPayload, ErrorResponse)),
    tags((name = "Tasks", description = "Create, read, update and delete tasks"))
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints, plus the Swagger UI.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    create_task_router(task_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
