//! Shared fixtures for handler tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use journal_core::domain::{AnalysisResult, Emotion};
use journal_core::ports::{DiaryAnalysisService, PortError, PortResult};
use std::sync::Arc;
use tracing::Level;

use crate::adapters::{FixedClock, InMemoryStore};
use crate::config::{Config, StorageBackend};
use crate::web::state::AppState;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        storage: StorageBackend::Memory,
        log_level: Level::INFO,
        openai_api_key: None,
        analysis_model: "gpt-4o".to_string(),
        token_ttl_days: 7,
        cors_origin: "http://localhost:5173".to_string(),
    }
}

/// Echoes the picked emotion back, or fails when `fail` is set.
pub struct StubAnalysis {
    pub fail: bool,
}

#[async_trait]
impl DiaryAnalysisService for StubAnalysis {
    async fn analyze(&self, content: &str, emotion: Emotion) -> PortResult<AnalysisResult> {
        if self.fail {
            return Err(PortError::Unexpected("model unavailable".to_string()));
        }
        Ok(AnalysisResult {
            primary_emotion: emotion.label().to_string(),
            secondary_emotions: vec![],
            confidence: 0.9,
            sentiment_score: 40,
            themes: vec!["일상".to_string()],
            keywords: content.split_whitespace().take(2).map(str::to_string).collect(),
            suggestions: "잘 쉬세요.".to_string(),
            summary: content.chars().take(10).collect(),
        })
    }
}

fn state_with(analysis: Option<Arc<dyn DiaryAnalysisService>>) -> Arc<AppState> {
    Arc::new(AppState {
        db: Arc::new(InMemoryStore::new()),
        config: Arc::new(test_config()),
        analysis,
        clock: Arc::new(FixedClock(today())),
    })
}

/// State without an analysis service.
pub fn test_state() -> Arc<AppState> {
    state_with(None)
}

pub fn test_state_with_analysis(fail: bool) -> Arc<AppState> {
    state_with(Some(Arc::new(StubAnalysis { fail })))
}
