//! crates/journal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    AnalysisResult, DiaryAnalysis, DiaryEntry, DiaryEntryUpdate, Emotion, MemoirEntry,
    MemoirEntryUpdate, NewDiaryEntry, NewMemoirEntry, NewPeriodRecord, PeriodRecord,
    PeriodRecordUpdate, PreferencesUpdate, User, UserCredentials, UserPreferences,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The record store. Every per-record operation is scoped to its owner, so a
/// record belonging to another user behaves exactly like a missing one.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    async fn update_preferences(
        &self,
        user_id: Uuid,
        update: PreferencesUpdate,
    ) -> PortResult<UserPreferences>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owner of a live token; expired or unknown tokens are `Unauthorized`.
    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Diary ---
    /// Newest date first.
    async fn list_diary_entries(&self, user_id: Uuid) -> PortResult<Vec<DiaryEntry>>;

    async fn get_diary_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<DiaryEntry>;

    async fn create_diary_entry(&self, user_id: Uuid, entry: NewDiaryEntry)
        -> PortResult<DiaryEntry>;

    async fn update_diary_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: DiaryEntryUpdate,
    ) -> PortResult<DiaryEntry>;

    /// Also removes the entry's analysis, if any.
    async fn delete_diary_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()>;

    /// Case-insensitive substring match on the content, newest date first.
    async fn search_diary_entries(&self, user_id: Uuid, query: &str)
        -> PortResult<Vec<DiaryEntry>>;

    // --- Diary Analysis ---
    async fn get_diary_analysis(&self, user_id: Uuid, entry_id: Uuid)
        -> PortResult<DiaryAnalysis>;

    /// Fails with `Conflict` when the entry already has an analysis.
    async fn create_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        result: AnalysisResult,
    ) -> PortResult<DiaryAnalysis>;

    async fn update_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        result: AnalysisResult,
    ) -> PortResult<DiaryAnalysis>;

    async fn delete_diary_analysis(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()>;

    // --- Memoir ---
    /// Most recently created first.
    async fn list_memoir_entries(&self, user_id: Uuid) -> PortResult<Vec<MemoirEntry>>;

    async fn get_memoir_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<MemoirEntry>;

    async fn create_memoir_entry(
        &self,
        user_id: Uuid,
        entry: NewMemoirEntry,
    ) -> PortResult<MemoirEntry>;

    async fn update_memoir_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: MemoirEntryUpdate,
    ) -> PortResult<MemoirEntry>;

    async fn delete_memoir_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()>;

    // --- Period Records ---
    /// No particular order; ordering is the cycle engine's job.
    async fn list_period_records(&self, user_id: Uuid) -> PortResult<Vec<PeriodRecord>>;

    async fn get_period_record(&self, user_id: Uuid, record_id: Uuid)
        -> PortResult<PeriodRecord>;

    async fn create_period_record(
        &self,
        user_id: Uuid,
        record: NewPeriodRecord,
    ) -> PortResult<PeriodRecord>;

    async fn update_period_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        update: PeriodRecordUpdate,
    ) -> PortResult<PeriodRecord>;

    async fn delete_period_record(&self, user_id: Uuid, record_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait DiaryAnalysisService: Send + Sync {
    /// Analyzes diary text together with the emotion its author picked.
    async fn analyze(&self, content: &str, emotion: Emotion) -> PortResult<AnalysisResult>;
}

/// Supplies "today" as a calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
