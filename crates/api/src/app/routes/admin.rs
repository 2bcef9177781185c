use axum::{Json, response::IntoResponse};

/// GET /admin/moderation - requires both the admin and moderator roles
pub async fn moderation_queue() -> impl IntoResponse {
    Json(serde_json::json!({ "queue": [] }))
}
