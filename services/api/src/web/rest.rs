//! services/api/src/web/rest.rs
//!
//! Shared pieces of the REST layer: the master definition for the OpenAPI
//! specification, the common message payload and the mapping from port errors
//! to HTTP responses.

use axum::http::StatusCode;
use journal_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::web::{auth, diary, memoir, period, stats};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        auth::get_preferences_handler,
        auth::update_preferences_handler,
        auth::update_menu_preferences_handler,
        diary::list_entries_handler,
        diary::get_entry_handler,
        diary::create_entry_handler,
        diary::update_entry_handler,
        diary::delete_entry_handler,
        diary::search_entries_handler,
        diary::get_analysis_handler,
        diary::create_analysis_handler,
        diary::regenerate_analysis_handler,
        diary::delete_analysis_handler,
        memoir::list_memoirs_handler,
        memoir::get_memoir_handler,
        memoir::create_memoir_handler,
        memoir::update_memoir_handler,
        memoir::delete_memoir_handler,
        period::list_records_handler,
        period::get_record_handler,
        period::create_record_handler,
        period::update_record_handler,
        period::delete_record_handler,
        period::cycle_summary_handler,
        period::calendar_handler,
        stats::journal_stats_handler,
    ),
    components(schemas(MessageResponse)),
    tags(
        (name = "Journal API", description = "Diary, memoir and period tracking endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payloads and Error Mapping
//=========================================================================================

/// The error half of every handler result.
pub type HandlerError = (StatusCode, String);

/// A plain confirmation message.
#[derive(Serialize, ToSchema, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Maps a port failure to a status code, logging anything unexpected.
pub fn port_failure(action: &str, e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(msg) => {
            error!("Failed to {}: {}", action, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", action),
            )
        }
    }
}

pub fn bad_request(msg: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_statuses() {
        let status = |e| port_failure("test", e).0;
        assert_eq!(status(PortError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(PortError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(status(PortError::Unauthorized), StatusCode::UNAUTHORIZED);

        let (code, body) = port_failure("load things", PortError::Unexpected("boom".into()));
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Failed to load things");
    }

    #[test]
    fn openapi_document_lists_the_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/period-records/summary"));
        assert!(doc.paths.paths.contains_key("/api/diary-entries/{id}/analysis"));
    }
}
