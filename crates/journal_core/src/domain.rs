//! crates/journal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Users and Authentication
//=========================================================================================

/// Represents a user - used throughout the app.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub username: String,
    pub hashed_password: String,
}

/// Which parts of the journal a user has switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPreferences {
    pub use_diary: bool,
    pub use_memoir: bool,
    pub use_period_tracker: bool,
    pub menu_configured: bool,
    pub show_install_prompt: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            use_diary: false,
            use_memoir: false,
            use_period_tracker: false,
            menu_configured: false,
            show_install_prompt: true,
        }
    }
}

/// A partial update of [`UserPreferences`]; `None` leaves the field untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferencesUpdate {
    pub use_diary: Option<bool>,
    pub use_memoir: Option<bool>,
    pub use_period_tracker: Option<bool>,
    pub menu_configured: Option<bool>,
    pub show_install_prompt: Option<bool>,
}

impl UserPreferences {
    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(v) = update.use_diary {
            self.use_diary = v;
        }
        if let Some(v) = update.use_memoir {
            self.use_memoir = v;
        }
        if let Some(v) = update.use_period_tracker {
            self.use_period_tracker = v;
        }
        if let Some(v) = update.menu_configured {
            self.menu_configured = v;
        }
        if let Some(v) = update.show_install_prompt {
            self.show_install_prompt = v;
        }
    }
}

// Represents a login token issued to a client
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Diary
//=========================================================================================

/// The fixed set of emotions a diary entry can be tagged with, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Peaceful,
    Excited,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Peaceful,
        Emotion::Excited,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Peaceful => "peaceful",
            Emotion::Excited => "excited",
        }
    }

    /// The Korean label shown next to the emotion picker.
    pub fn label(self) -> &'static str {
        match self {
            Emotion::Happy => "행복해요",
            Emotion::Sad => "슬퍼요",
            Emotion::Angry => "화나요",
            Emotion::Peaceful => "평온해요",
            Emotion::Excited => "그냥 그래",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("unknown emotion '{}'", s))
    }
}

/// A single dated diary entry.
#[derive(Debug, Clone)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub emotion: Emotion,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDiaryEntry {
    pub date: NaiveDate,
    pub emotion: Emotion,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct DiaryEntryUpdate {
    pub date: Option<NaiveDate>,
    pub emotion: Option<Emotion>,
    pub content: Option<String>,
}

impl DiaryEntry {
    pub fn apply(&mut self, update: DiaryEntryUpdate) {
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(emotion) = update.emotion {
            self.emotion = emotion;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
    }
}

/// The structured result returned by the AI completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub primary_emotion: String,
    pub secondary_emotions: Vec<String>,
    /// In `0.0..=1.0`.
    pub confidence: f64,
    /// In `-100..=100`.
    pub sentiment_score: i32,
    pub themes: Vec<String>,
    pub keywords: Vec<String>,
    pub suggestions: String,
    pub summary: String,
}

/// A stored analysis. At most one exists per diary entry.
#[derive(Debug, Clone)]
pub struct DiaryAnalysis {
    pub id: Uuid,
    pub diary_entry_id: Uuid,
    pub user_id: Uuid,
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//=========================================================================================
// Memoir
//=========================================================================================

/// A longer-form, titled journal entry.
#[derive(Debug, Clone)]
pub struct MemoirEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMemoirEntry {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct MemoirEntryUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl MemoirEntry {
    pub fn apply(&mut self, update: MemoirEntryUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        self.updated_at = now;
    }
}

//=========================================================================================
// Period Tracking
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Light,
    Medium,
    Heavy,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Flow::Light => "light",
            Flow::Medium => "medium",
            Flow::Heavy => "heavy",
        }
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Flow::Light),
            "medium" => Ok(Flow::Medium),
            "heavy" => Ok(Flow::Heavy),
            other => Err(format!("unknown flow '{}'", other)),
        }
    }
}

/// What a period record observes. Each kind carries only its own fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Start { flow: Option<Flow> },
    End,
    Symptom { symptoms: Vec<String> },
    Mood { mood: String },
}

impl Observation {
    /// The wire/storage name of the record type.
    pub fn kind(&self) -> &'static str {
        match self {
            Observation::Start { .. } => "start",
            Observation::End => "end",
            Observation::Symptom { .. } => "symptom",
            Observation::Mood { .. } => "mood",
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Observation::Start { .. })
    }
}

/// One user observation on one date.
#[derive(Debug, Clone)]
pub struct PeriodRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub observation: Observation,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPeriodRecord {
    pub date: NaiveDate,
    pub observation: Observation,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PeriodRecordUpdate {
    pub date: Option<NaiveDate>,
    pub observation: Option<Observation>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

impl PeriodRecord {
    pub fn apply(&mut self, update: PeriodRecordUpdate) {
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(observation) = update.observation {
            self.observation = observation;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_round_trips_through_its_name() {
        for emotion in Emotion::ALL {
            assert_eq!(emotion.as_str().parse::<Emotion>(), Ok(emotion));
        }
        assert!("bored".parse::<Emotion>().is_err());
    }

    #[test]
    fn preferences_update_only_touches_given_fields() {
        let mut prefs = UserPreferences::default();
        prefs.apply(PreferencesUpdate {
            use_memoir: Some(true),
            ..Default::default()
        });
        assert!(prefs.use_memoir);
        assert!(!prefs.use_diary);
        assert!(prefs.show_install_prompt);
    }

    #[test]
    fn period_update_can_clear_notes() {
        let mut record = PeriodRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            observation: Observation::End,
            notes: Some("tired".to_string()),
            created_at: Utc::now(),
        };
        record.apply(PeriodRecordUpdate {
            notes: Some(None),
            ..Default::default()
        });
        assert_eq!(record.notes, None);
        assert_eq!(record.observation.kind(), "end");
    }
}
