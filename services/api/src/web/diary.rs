//! services/api/src/web/diary.rs
//!
//! Diary entry CRUD, search and the AI analysis attached to each entry.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use journal_core::domain::{
    AnalysisResult, DiaryAnalysis, DiaryEntry, DiaryEntryUpdate, Emotion, NewDiaryEntry,
};
use journal_core::ports::{DiaryAnalysisService, PortError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{bad_request, port_failure, HandlerError, MessageResponse};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntryResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    /// One of `happy`, `sad`, `angry`, `peaceful`, `excited`.
    pub emotion: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<DiaryEntry> for DiaryEntryResponse {
    fn from(e: DiaryEntry) -> Self {
        Self {
            id: e.id,
            date: e.date,
            emotion: e.emotion.as_str().to_string(),
            content: e.content,
            created_at: e.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiaryEntryRequest {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub emotion: String,
    pub content: String,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiaryEntryRequest {
    pub date: Option<NaiveDate>,
    pub emotion: Option<String>,
    pub content: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct EmotionAnalysisResponse {
    pub primary: String,
    pub secondary: Vec<String>,
    pub confidence: f64,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub diary_entry_id: Uuid,
    pub emotion_analysis: EmotionAnalysisResponse,
    pub sentiment_score: i32,
    pub themes: Vec<String>,
    pub keywords: Vec<String>,
    pub suggestions: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DiaryAnalysis> for AnalysisResponse {
    fn from(a: DiaryAnalysis) -> Self {
        let AnalysisResult {
            primary_emotion,
            secondary_emotions,
            confidence,
            sentiment_score,
            themes,
            keywords,
            suggestions,
            summary,
        } = a.result;
        Self {
            id: a.id,
            diary_entry_id: a.diary_entry_id,
            emotion_analysis: EmotionAnalysisResponse {
                primary: primary_emotion,
                secondary: secondary_emotions,
                confidence,
            },
            sentiment_score,
            themes,
            keywords,
            suggestions,
            summary,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn parse_emotion(raw: &str) -> Result<Emotion, HandlerError> {
    raw.parse::<Emotion>().map_err(bad_request)
}

fn non_empty(content: String) -> Result<String, HandlerError> {
    if content.trim().is_empty() {
        return Err(bad_request("Content must not be empty"));
    }
    Ok(content)
}

fn analysis_service(state: &AppState) -> Result<Arc<dyn DiaryAnalysisService>, HandlerError> {
    state.analysis.clone().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "Diary analysis is not configured".to_string(),
    ))
}

/// Runs the analysis; a failing model is reported as a bad gateway.
async fn run_analysis(
    service: &dyn DiaryAnalysisService,
    entry: &DiaryEntry,
) -> Result<AnalysisResult, HandlerError> {
    service
        .analyze(&entry.content, entry.emotion)
        .await
        .map_err(|e| {
            error!("Diary analysis failed for entry {}: {}", entry.id, e);
            (
                StatusCode::BAD_GATEWAY,
                "Failed to analyze the diary entry".to_string(),
            )
        })
}

fn to_responses(entries: Vec<DiaryEntry>) -> Json<Vec<DiaryEntryResponse>> {
    Json(entries.into_iter().map(Into::into).collect())
}

//=========================================================================================
// Entry Handlers
//=========================================================================================

/// GET /api/diary-entries - All of the caller's entries, newest date first
#[utoipa::path(
    get,
    path = "/api/diary-entries",
    responses((status = 200, description = "Diary entries", body = Vec<DiaryEntryResponse>))
)]
pub async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<DiaryEntryResponse>>, HandlerError> {
    let entries = state
        .db
        .list_diary_entries(user_id)
        .await
        .map_err(|e| port_failure("list diary entries", e))?;
    Ok(to_responses(entries))
}

/// GET /api/diary-entries/{id}
#[utoipa::path(
    get,
    path = "/api/diary-entries/{id}",
    params(("id" = Uuid, Path, description = "Diary entry id")),
    responses(
        (status = 200, description = "The entry", body = DiaryEntryResponse),
        (status = 404, description = "No such entry")
    )
)]
pub async fn get_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<DiaryEntryResponse>, HandlerError> {
    let entry = state
        .db
        .get_diary_entry(user_id, id)
        .await
        .map_err(|e| port_failure("load diary entry", e))?;
    Ok(Json(entry.into()))
}

/// POST /api/diary-entries
#[utoipa::path(
    post,
    path = "/api/diary-entries",
    request_body = CreateDiaryEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = DiaryEntryResponse),
        (status = 400, description = "Unknown emotion or empty content")
    )
)]
pub async fn create_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateDiaryEntryRequest>,
) -> Result<(StatusCode, Json<DiaryEntryResponse>), HandlerError> {
    let new_entry = NewDiaryEntry {
        date: req.date.unwrap_or_else(|| state.clock.today()),
        emotion: parse_emotion(&req.emotion)?,
        content: non_empty(req.content)?,
    };
    let entry = state
        .db
        .create_diary_entry(user_id, new_entry)
        .await
        .map_err(|e| port_failure("create diary entry", e))?;
    info!("User {} wrote diary entry {}", user_id, entry.id);
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// PUT /api/diary-entries/{id}
#[utoipa::path(
    put,
    path = "/api/diary-entries/{id}",
    params(("id" = Uuid, Path, description = "Diary entry id")),
    request_body = UpdateDiaryEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = DiaryEntryResponse),
        (status = 404, description = "No such entry")
    )
)]
pub async fn update_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDiaryEntryRequest>,
) -> Result<Json<DiaryEntryResponse>, HandlerError> {
    let update = DiaryEntryUpdate {
        date: req.date,
        emotion: req.emotion.as_deref().map(parse_emotion).transpose()?,
        content: req.content.map(non_empty).transpose()?,
    };
    let entry = state
        .db
        .update_diary_entry(user_id, id, update)
        .await
        .map_err(|e| port_failure("update diary entry", e))?;
    Ok(Json(entry.into()))
}

/// DELETE /api/diary-entries/{id} - Removes the entry and its analysis
#[utoipa::path(
    delete,
    path = "/api/diary-entries/{id}",
    params(("id" = Uuid, Path, description = "Diary entry id")),
    responses(
        (status = 200, description = "Entry deleted", body = MessageResponse),
        (status = 404, description = "No such entry")
    )
)]
pub async fn delete_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HandlerError> {
    state
        .db
        .delete_diary_entry(user_id, id)
        .await
        .map_err(|e| port_failure("delete diary entry", e))?;
    Ok(Json(MessageResponse::new("Diary entry deleted")))
}

/// GET /api/diary-entries/search/{query} - Case-insensitive content search
#[utoipa::path(
    get,
    path = "/api/diary-entries/search/{query}",
    params(("query" = String, Path, description = "Text to look for")),
    responses((status = 200, description = "Matching entries", body = Vec<DiaryEntryResponse>))
)]
pub async fn search_entries_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(query): Path<String>,
) -> Result<Json<Vec<DiaryEntryResponse>>, HandlerError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(bad_request("Search query must not be empty"));
    }
    let entries = state
        .db
        .search_diary_entries(user_id, query)
        .await
        .map_err(|e| port_failure("search diary entries", e))?;
    Ok(to_responses(entries))
}

//=========================================================================================
// Analysis Handlers
//=========================================================================================

/// GET /api/diary-entries/{id}/analysis
#[utoipa::path(
    get,
    path = "/api/diary-entries/{id}/analysis",
    params(("id" = Uuid, Path, description = "Diary entry id")),
    responses(
        (status = 200, description = "The stored analysis", body = AnalysisResponse),
        (status = 404, description = "Entry or analysis not found")
    )
)]
pub async fn get_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisResponse>, HandlerError> {
    let analysis = state
        .db
        .get_diary_analysis(user_id, id)
        .await
        .map_err(|e| port_failure("load analysis", e))?;
    Ok(Json(analysis.into()))
}

/// POST /api/diary-entries/{id}/analysis - Analyze an entry for the first time
#[utoipa::path(
    post,
    path = "/api/diary-entries/{id}/analysis",
    params(("id" = Uuid, Path, description = "Diary entry id")),
    responses(
        (status = 201, description = "Analysis stored", body = AnalysisResponse),
        (status = 404, description = "No such entry"),
        (status = 409, description = "The entry already has an analysis"),
        (status = 502, description = "The analysis model failed"),
        (status = 503, description = "Analysis is not configured")
    )
)]
pub async fn create_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<AnalysisResponse>), HandlerError> {
    let service = analysis_service(&state)?;
    let entry = state
        .db
        .get_diary_entry(user_id, id)
        .await
        .map_err(|e| port_failure("load diary entry", e))?;

    // Skip the model call when the result could not be stored anyway.
    match state.db.get_diary_analysis(user_id, id).await {
        Ok(_) => {
            return Err((
                StatusCode::CONFLICT,
                "This entry has already been analyzed".to_string(),
            ))
        }
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(port_failure("load analysis", e)),
    }

    let result = run_analysis(service.as_ref(), &entry).await?;
    let analysis = state
        .db
        .create_diary_analysis(user_id, id, result)
        .await
        .map_err(|e| port_failure("store analysis", e))?;
    info!("Stored analysis {} for diary entry {}", analysis.id, id);
    Ok((StatusCode::CREATED, Json(analysis.into())))
}

/// PUT /api/diary-entries/{id}/analysis - Re-run the analysis and replace it
#[utoipa::path(
    put,
    path = "/api/diary-entries/{id}/analysis",
    params(("id" = Uuid, Path, description = "Diary entry id")),
    responses(
        (status = 200, description = "Analysis replaced", body = AnalysisResponse),
        (status = 404, description = "Entry or analysis not found"),
        (status = 502, description = "The analysis model failed"),
        (status = 503, description = "Analysis is not configured")
    )
)]
pub async fn regenerate_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisResponse>, HandlerError> {
    let service = analysis_service(&state)?;
    let entry = state
        .db
        .get_diary_entry(user_id, id)
        .await
        .map_err(|e| port_failure("load diary entry", e))?;
    state
        .db
        .get_diary_analysis(user_id, id)
        .await
        .map_err(|e| port_failure("load analysis", e))?;

    let result = run_analysis(service.as_ref(), &entry).await?;
    let analysis = state
        .db
        .update_diary_analysis(user_id, id, result)
        .await
        .map_err(|e| port_failure("store analysis", e))?;
    Ok(Json(analysis.into()))
}

/// DELETE /api/diary-entries/{id}/analysis
#[utoipa::path(
    delete,
    path = "/api/diary-entries/{id}/analysis",
    params(("id" = Uuid, Path, description = "Diary entry id")),
    responses(
        (status = 200, description = "Analysis deleted", body = MessageResponse),
        (status = 404, description = "Entry or analysis not found")
    )
)]
pub async fn delete_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HandlerError> {
    state
        .db
        .delete_diary_analysis(user_id, id)
        .await
        .map_err(|e| port_failure("delete analysis", e))?;
    Ok(Json(MessageResponse::new("Analysis deleted")))
}
