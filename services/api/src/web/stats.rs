//! services/api/src/web/stats.rs

use axum::{extract::State, Extension, Json};
use journal_core::stats::{compute_journal_stats, JournalStats};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{port_failure, HandlerError};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema, Debug)]
pub struct EmotionCount {
    pub emotion: String,
    pub count: usize,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JournalStatsResponse {
    pub total_diary_entries: usize,
    pub total_memoir_entries: usize,
    pub current_streak: u32,
    pub entries_this_month: usize,
    pub emotion_distribution: Vec<EmotionCount>,
}

impl From<JournalStats> for JournalStatsResponse {
    fn from(s: JournalStats) -> Self {
        Self {
            total_diary_entries: s.total_diary_entries,
            total_memoir_entries: s.total_memoir_entries,
            current_streak: s.current_streak,
            entries_this_month: s.entries_this_month,
            emotion_distribution: s
                .emotion_distribution
                .into_iter()
                .map(|(emotion, count)| EmotionCount {
                    emotion: emotion.as_str().to_string(),
                    count,
                })
                .collect(),
        }
    }
}

/// GET /api/stats - Writing statistics for the caller
#[utoipa::path(
    get,
    path = "/api/stats",
    responses((status = 200, description = "Journal statistics", body = JournalStatsResponse))
)]
pub async fn journal_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<JournalStatsResponse>, HandlerError> {
    let entries = state
        .db
        .list_diary_entries(user_id)
        .await
        .map_err(|e| port_failure("list diary entries", e))?;
    let memoirs = state
        .db
        .list_memoir_entries(user_id)
        .await
        .map_err(|e| port_failure("list memoirs", e))?;

    let stats = compute_journal_stats(&entries, memoirs.len(), state.clock.today());
    Ok(Json(stats.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{test_state, today};
    use chrono::Duration;
    use journal_core::domain::{Emotion, NewDiaryEntry, NewMemoirEntry};

    #[tokio::test]
    async fn stats_reflect_the_callers_journal() {
        let state = test_state();
        let user = Uuid::new_v4();
        for (days_ago, emotion) in [(0, Emotion::Happy), (1, Emotion::Happy), (3, Emotion::Sad)] {
            state
                .db
                .create_diary_entry(
                    user,
                    NewDiaryEntry {
                        date: today() - Duration::days(days_ago),
                        emotion,
                        content: "entry".to_string(),
                    },
                )
                .await
                .unwrap();
        }
        state
            .db
            .create_memoir_entry(
                user,
                NewMemoirEntry {
                    title: "t".to_string(),
                    content: "c".to_string(),
                },
            )
            .await
            .unwrap();

        let Json(stats) = journal_stats_handler(State(state), Extension(user)).await.unwrap();
        assert_eq!(stats.total_diary_entries, 3);
        assert_eq!(stats.total_memoir_entries, 1);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.entries_this_month, 3);
        let happy = stats
            .emotion_distribution
            .iter()
            .find(|c| c.emotion == "happy")
            .unwrap();
        assert_eq!(happy.count, 2);
    }
}
