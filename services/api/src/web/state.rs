//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::config::Config;
use chrono::{DateTime, Utc};
use journal_core::emotion::{EmotionSample, EmotionScore, EmotionTracker};
use journal_core::ports::{Clock, DatabaseService, DiaryAnalysisService};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    /// `None` when no API key is configured; analysis endpoints then answer 503.
    pub analysis: Option<Arc<dyn DiaryAnalysisService>>,
    pub clock: Arc<dyn Clock>,
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single live-emotion WebSocket connection.
pub struct SessionState {
    pub user_id: Uuid,
    pub tracker: EmotionTracker,
    /// The last text scored, so identical resends do not skew the history.
    pub last_text: Option<String>,
}

impl SessionState {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            tracker: EmotionTracker::new(),
            last_text: None,
        }
    }

    /// Scores a content update. Returns the new sample, if one was recorded.
    pub fn observe(&mut self, text: &str, at: DateTime<Utc>) -> Option<EmotionSample> {
        if self.last_text.as_deref() == Some(text) {
            return None;
        }
        self.last_text = Some(text.to_string());
        self.tracker.observe(text, at)
    }

    pub fn current(&self) -> Option<EmotionScore> {
        self.tracker.current_dominant()
    }

    pub fn reset(&mut self) {
        self.tracker.clear();
        self.last_text = None;
    }
}
