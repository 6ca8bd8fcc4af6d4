//! services/api/src/web/memoir.rs
//!
//! CRUD endpoints for titled memoir entries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use journal_core::domain::{MemoirEntry, MemoirEntryUpdate, NewMemoirEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{bad_request, port_failure, HandlerError, MessageResponse};
use crate::web::state::AppState;

const MAX_TITLE_CHARS: usize = 200;

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MemoirResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemoirEntry> for MemoirResponse {
    fn from(m: MemoirEntry) -> Self {
        Self {
            id: m.id,
            title: m.title,
            content: m.content,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateMemoirRequest {
    pub title: String,
    pub content: String,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateMemoirRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

fn valid_title(title: String) -> Result<String, HandlerError> {
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(bad_request(format!(
            "Title must be 1 to {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

fn valid_content(content: String) -> Result<String, HandlerError> {
    if content.trim().is_empty() {
        return Err(bad_request("Content must not be empty"));
    }
    Ok(content)
}

/// GET /api/memoir-entries - Most recently created first
#[utoipa::path(
    get,
    path = "/api/memoir-entries",
    responses((status = 200, description = "Memoir entries", body = Vec<MemoirResponse>))
)]
pub async fn list_memoirs_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<MemoirResponse>>, HandlerError> {
    let memoirs = state
        .db
        .list_memoir_entries(user_id)
        .await
        .map_err(|e| port_failure("list memoirs", e))?;
    Ok(Json(memoirs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/memoir-entries/{id}",
    params(("id" = Uuid, Path, description = "Memoir id")),
    responses(
        (status = 200, description = "The memoir", body = MemoirResponse),
        (status = 404, description = "No such memoir")
    )
)]
pub async fn get_memoir_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemoirResponse>, HandlerError> {
    let memoir = state
        .db
        .get_memoir_entry(user_id, id)
        .await
        .map_err(|e| port_failure("load memoir", e))?;
    Ok(Json(memoir.into()))
}

#[utoipa::path(
    post,
    path = "/api/memoir-entries",
    request_body = CreateMemoirRequest,
    responses(
        (status = 201, description = "Memoir created", body = MemoirResponse),
        (status = 400, description = "Missing title or content")
    )
)]
pub async fn create_memoir_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateMemoirRequest>,
) -> Result<(StatusCode, Json<MemoirResponse>), HandlerError> {
    let new_memoir = NewMemoirEntry {
        title: valid_title(req.title)?,
        content: valid_content(req.content)?,
    };
    let memoir = state
        .db
        .create_memoir_entry(user_id, new_memoir)
        .await
        .map_err(|e| port_failure("create memoir", e))?;
    Ok((StatusCode::CREATED, Json(memoir.into())))
}

#[utoipa::path(
    put,
    path = "/api/memoir-entries/{id}",
    params(("id" = Uuid, Path, description = "Memoir id")),
    request_body = UpdateMemoirRequest,
    responses(
        (status = 200, description = "Memoir updated", body = MemoirResponse),
        (status = 404, description = "No such memoir")
    )
)]
pub async fn update_memoir_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMemoirRequest>,
) -> Result<Json<MemoirResponse>, HandlerError> {
    let update = MemoirEntryUpdate {
        title: req.title.map(valid_title).transpose()?,
        content: req.content.map(valid_content).transpose()?,
    };
    let memoir = state
        .db
        .update_memoir_entry(user_id, id, update)
        .await
        .map_err(|e| port_failure("update memoir", e))?;
    Ok(Json(memoir.into()))
}

#[utoipa::path(
    delete,
    path = "/api/memoir-entries/{id}",
    params(("id" = Uuid, Path, description = "Memoir id")),
    responses(
        (status = 200, description = "Memoir deleted", body = MessageResponse),
        (status = 404, description = "No such memoir")
    )
)]
pub async fn delete_memoir_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HandlerError> {
    state
        .db
        .delete_memoir_entry(user_id, id)
        .await
        .map_err(|e| port_failure("delete memoir", e))?;
    Ok(Json(MessageResponse::new("Memoir deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::test_state;

    fn memoir(title: &str, content: &str) -> Json<CreateMemoirRequest> {
        Json(CreateMemoirRequest {
            title: title.to_string(),
            content: content.to_string(),
        })
    }

    #[tokio::test]
    async fn memoir_lifecycle() {
        let state = test_state();
        let user = Extension(Uuid::new_v4());

        let (status, Json(created)) =
            create_memoir_handler(State(state.clone()), user.clone(), memoir("  어린 시절 ", "바닷가 마을"))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.title, "어린 시절");

        let Json(updated) = update_memoir_handler(
            State(state.clone()),
            user.clone(),
            Path(created.id),
            Json(UpdateMemoirRequest {
                content: Some("산골 마을".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "어린 시절");
        assert_eq!(updated.content, "산골 마을");
        assert!(updated.updated_at >= created.updated_at);

        delete_memoir_handler(State(state.clone()), user.clone(), Path(created.id))
            .await
            .unwrap();
        let Json(remaining) = list_memoirs_handler(State(state), user).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let state = test_state();
        let err = create_memoir_handler(State(state), Extension(Uuid::new_v4()), memoir(" ", "body"))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_someone_elses_memoir_is_not_found() {
        let state = test_state();
        let (_, Json(created)) =
            create_memoir_handler(State(state.clone()), Extension(Uuid::new_v4()), memoir("t", "c"))
                .await
                .unwrap();
        let err = delete_memoir_handler(State(state), Extension(Uuid::new_v4()), Path(created.id))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
