//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use journal_core::domain::{
    AnalysisResult, DiaryAnalysis, DiaryEntry, DiaryEntryUpdate, Emotion, Flow, MemoirEntry,
    MemoirEntryUpdate, NewDiaryEntry, NewMemoirEntry, NewPeriodRecord, Observation,
    PeriodRecord, PeriodRecordUpdate, PreferencesUpdate, User, UserCredentials, UserPreferences,
};
use journal_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    error!("❌ DB error: {:?}", e);
    PortError::Unexpected(e.to_string())
}

fn not_found_or(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        other => unexpected(other),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "user_id, username, hashed_password, use_diary, use_memoir, \
     use_period_tracker, menu_configured, show_install_prompt, created_at";

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    username: String,
    hashed_password: String,
    use_diary: bool,
    use_memoir: bool,
    use_period_tracker: bool,
    menu_configured: bool,
    show_install_prompt: bool,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn preferences(&self) -> UserPreferences {
        UserPreferences {
            use_diary: self.use_diary,
            use_memoir: self.use_memoir,
            use_period_tracker: self.use_period_tracker,
            menu_configured: self.menu_configured,
            show_install_prompt: self.show_install_prompt,
        }
    }

    fn to_domain(self) -> User {
        User {
            preferences: self.preferences(),
            user_id: self.user_id,
            username: self.username,
            created_at: self.created_at,
        }
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            username: self.username,
            hashed_password: self.hashed_password,
        }
    }
}

const DIARY_COLUMNS: &str = "id, user_id, date, emotion, content, created_at";

#[derive(FromRow)]
struct DiaryRecord {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    emotion: String,
    content: String,
    created_at: DateTime<Utc>,
}
impl DiaryRecord {
    fn to_domain(self) -> PortResult<DiaryEntry> {
        Ok(DiaryEntry {
            emotion: self.emotion.parse::<Emotion>().map_err(PortError::Unexpected)?,
            id: self.id,
            user_id: self.user_id,
            date: self.date,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

const ANALYSIS_COLUMNS: &str = "id, diary_entry_id, user_id, primary_emotion, \
     secondary_emotions, confidence, sentiment_score, themes, keywords, suggestions, summary, \
     created_at, updated_at";

#[derive(FromRow)]
struct AnalysisRecord {
    id: Uuid,
    diary_entry_id: Uuid,
    user_id: Uuid,
    primary_emotion: String,
    secondary_emotions: Vec<String>,
    confidence: f64,
    sentiment_score: i32,
    themes: Vec<String>,
    keywords: Vec<String>,
    suggestions: String,
    summary: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl AnalysisRecord {
    fn to_domain(self) -> DiaryAnalysis {
        DiaryAnalysis {
            id: self.id,
            diary_entry_id: self.diary_entry_id,
            user_id: self.user_id,
            result: AnalysisResult {
                primary_emotion: self.primary_emotion,
                secondary_emotions: self.secondary_emotions,
                confidence: self.confidence,
                sentiment_score: self.sentiment_score,
                themes: self.themes,
                keywords: self.keywords,
                suggestions: self.suggestions,
                summary: self.summary,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const MEMOIR_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

#[derive(FromRow)]
struct MemoirRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl MemoirRecord {
    fn to_domain(self) -> MemoirEntry {
        MemoirEntry {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PERIOD_COLUMNS: &str = "id, user_id, date, record_type, flow, symptoms, mood, notes, created_at";

#[derive(FromRow)]
struct PeriodRow {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    record_type: String,
    flow: Option<String>,
    symptoms: Option<Vec<String>>,
    mood: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}
impl PeriodRow {
    fn to_domain(self) -> PortResult<PeriodRecord> {
        let observation = match self.record_type.as_str() {
            "start" => Observation::Start {
                flow: self
                    .flow
                    .as_deref()
                    .map(str::parse::<Flow>)
                    .transpose()
                    .map_err(PortError::Unexpected)?,
            },
            "end" => Observation::End,
            "symptom" => Observation::Symptom {
                symptoms: self.symptoms.unwrap_or_default(),
            },
            "mood" => Observation::Mood {
                mood: self.mood.unwrap_or_default(),
            },
            other => {
                return Err(PortError::Unexpected(format!(
                    "Unknown period record type '{}'",
                    other
                )))
            }
        };
        Ok(PeriodRecord {
            id: self.id,
            user_id: self.user_id,
            date: self.date,
            observation,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

/// Splits an observation into its `(record_type, flow, symptoms, mood)` columns.
fn observation_columns(
    observation: &Observation,
) -> (&'static str, Option<&'static str>, Option<Vec<String>>, Option<String>) {
    match observation {
        Observation::Start { flow } => ("start", flow.map(Flow::as_str), None, None),
        Observation::End => ("end", None, None, None),
        Observation::Symptom { symptoms } => ("symptom", None, Some(symptoms.clone()), None),
        Observation::Mood { mood } => ("mood", None, None, Some(mood.clone())),
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- User Management ---
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (user_id, username, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                info!("🔒 Username already taken: {}", username);
                PortError::Conflict(format!("Username {} is taken", username))
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE user_id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("User {} not found", username)))?;
        Ok(record.to_credentials())
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        update: PreferencesUpdate,
    ) -> PortResult<UserPreferences> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET
                use_diary = COALESCE($2, use_diary),
                use_memoir = COALESCE($3, use_memoir),
                use_period_tracker = COALESCE($4, use_period_tracker),
                menu_configured = COALESCE($5, menu_configured),
                show_install_prompt = COALESCE($6, show_install_prompt)
             WHERE user_id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(update.use_diary)
        .bind(update.use_memoir)
        .bind(update.use_period_tracker)
        .bind(update.menu_configured)
        .bind(update.show_install_prompt)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("User {} not found", user_id)))?;
        Ok(record.preferences())
    }

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1 OR expires_at <= NOW()")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Diary ---
    async fn list_diary_entries(&self, user_id: Uuid) -> PortResult<Vec<DiaryEntry>> {
        let records = sqlx::query_as::<_, DiaryRecord>(&format!(
            "SELECT {} FROM diary_entries WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
            DIARY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(DiaryRecord::to_domain).collect()
    }

    async fn get_diary_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<DiaryEntry> {
        sqlx::query_as::<_, DiaryRecord>(&format!(
            "SELECT {} FROM diary_entries WHERE id = $1 AND user_id = $2",
            DIARY_COLUMNS
        ))
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("Diary entry {} not found", entry_id)))?
        .to_domain()
    }

    async fn create_diary_entry(
        &self,
        user_id: Uuid,
        entry: NewDiaryEntry,
    ) -> PortResult<DiaryEntry> {
        sqlx::query_as::<_, DiaryRecord>(&format!(
            "INSERT INTO diary_entries (id, user_id, date, emotion, content)
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            DIARY_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(entry.date)
        .bind(entry.emotion.as_str())
        .bind(&entry.content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn update_diary_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: DiaryEntryUpdate,
    ) -> PortResult<DiaryEntry> {
        let mut entry = self.get_diary_entry(user_id, entry_id).await?;
        entry.apply(update);
        sqlx::query(
            "UPDATE diary_entries SET date = $1, emotion = $2, content = $3
             WHERE id = $4 AND user_id = $5",
        )
        .bind(entry.date)
        .bind(entry.emotion.as_str())
        .bind(&entry.content)
        .bind(entry_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(entry)
    }

    async fn delete_diary_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        // analyses go with the entry via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM diary_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Diary entry {} not found", entry_id)));
        }
        Ok(())
    }

    async fn search_diary_entries(
        &self,
        user_id: Uuid,
        query: &str,
    ) -> PortResult<Vec<DiaryEntry>> {
        let pattern = format!(
            "%{}%",
            query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        let records = sqlx::query_as::<_, DiaryRecord>(&format!(
            "SELECT {} FROM diary_entries WHERE user_id = $1 AND content ILIKE $2
             ORDER BY date DESC, created_at DESC",
            DIARY_COLUMNS
        ))
        .bind(user_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(DiaryRecord::to_domain).collect()
    }

    // --- Diary Analysis ---
    async fn get_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> PortResult<DiaryAnalysis> {
        let record = sqlx::query_as::<_, AnalysisRecord>(&format!(
            "SELECT {} FROM diary_analyses WHERE diary_entry_id = $1 AND user_id = $2",
            ANALYSIS_COLUMNS
        ))
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("No analysis for entry {}", entry_id)))?;
        Ok(record.to_domain())
    }

    async fn create_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        result: AnalysisResult,
    ) -> PortResult<DiaryAnalysis> {
        // ownership check first so another user's entry reads as missing
        self.get_diary_entry(user_id, entry_id).await?;

        let record = sqlx::query_as::<_, AnalysisRecord>(&format!(
            "INSERT INTO diary_analyses (id, diary_entry_id, user_id, primary_emotion,
                secondary_emotions, confidence, sentiment_score, themes, keywords, suggestions, summary)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            ANALYSIS_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(entry_id)
        .bind(user_id)
        .bind(&result.primary_emotion)
        .bind(&result.secondary_emotions)
        .bind(result.confidence)
        .bind(result.sentiment_score)
        .bind(&result.themes)
        .bind(&result.keywords)
        .bind(&result.suggestions)
        .bind(&result.summary)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("Entry {} already has an analysis", entry_id))
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn update_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        result: AnalysisResult,
    ) -> PortResult<DiaryAnalysis> {
        let record = sqlx::query_as::<_, AnalysisRecord>(&format!(
            "UPDATE diary_analyses SET primary_emotion = $3, secondary_emotions = $4,
                confidence = $5, sentiment_score = $6, themes = $7, keywords = $8,
                suggestions = $9, summary = $10, updated_at = NOW()
             WHERE diary_entry_id = $1 AND user_id = $2 RETURNING {}",
            ANALYSIS_COLUMNS
        ))
        .bind(entry_id)
        .bind(user_id)
        .bind(&result.primary_emotion)
        .bind(&result.secondary_emotions)
        .bind(result.confidence)
        .bind(result.sentiment_score)
        .bind(&result.themes)
        .bind(&result.keywords)
        .bind(&result.suggestions)
        .bind(&result.summary)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("No analysis for entry {}", entry_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_diary_analysis(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let result =
            sqlx::query("DELETE FROM diary_analyses WHERE diary_entry_id = $1 AND user_id = $2")
                .bind(entry_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("No analysis for entry {}", entry_id)));
        }
        Ok(())
    }

    // --- Memoir ---
    async fn list_memoir_entries(&self, user_id: Uuid) -> PortResult<Vec<MemoirEntry>> {
        let records = sqlx::query_as::<_, MemoirRecord>(&format!(
            "SELECT {} FROM memoir_entries WHERE user_id = $1 ORDER BY created_at DESC",
            MEMOIR_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_memoir_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<MemoirEntry> {
        let record = sqlx::query_as::<_, MemoirRecord>(&format!(
            "SELECT {} FROM memoir_entries WHERE id = $1 AND user_id = $2",
            MEMOIR_COLUMNS
        ))
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("Memoir entry {} not found", entry_id)))?;
        Ok(record.to_domain())
    }

    async fn create_memoir_entry(
        &self,
        user_id: Uuid,
        entry: NewMemoirEntry,
    ) -> PortResult<MemoirEntry> {
        let record = sqlx::query_as::<_, MemoirRecord>(&format!(
            "INSERT INTO memoir_entries (id, user_id, title, content) VALUES ($1, $2, $3, $4)
             RETURNING {}",
            MEMOIR_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_memoir_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: MemoirEntryUpdate,
    ) -> PortResult<MemoirEntry> {
        let record = sqlx::query_as::<_, MemoirRecord>(&format!(
            "UPDATE memoir_entries SET title = COALESCE($3, title),
                content = COALESCE($4, content), updated_at = NOW()
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            MEMOIR_COLUMNS
        ))
        .bind(entry_id)
        .bind(user_id)
        .bind(update.title)
        .bind(update.content)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("Memoir entry {} not found", entry_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_memoir_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM memoir_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Memoir entry {} not found", entry_id)));
        }
        Ok(())
    }

    // --- Period Records ---
    async fn list_period_records(&self, user_id: Uuid) -> PortResult<Vec<PeriodRecord>> {
        let rows = sqlx::query_as::<_, PeriodRow>(&format!(
            "SELECT {} FROM period_records WHERE user_id = $1",
            PERIOD_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        rows.into_iter().map(PeriodRow::to_domain).collect()
    }

    async fn get_period_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> PortResult<PeriodRecord> {
        sqlx::query_as::<_, PeriodRow>(&format!(
            "SELECT {} FROM period_records WHERE id = $1 AND user_id = $2",
            PERIOD_COLUMNS
        ))
        .bind(record_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or(format!("Period record {} not found", record_id)))?
        .to_domain()
    }

    async fn create_period_record(
        &self,
        user_id: Uuid,
        record: NewPeriodRecord,
    ) -> PortResult<PeriodRecord> {
        let (record_type, flow, symptoms, mood) = observation_columns(&record.observation);
        sqlx::query_as::<_, PeriodRow>(&format!(
            "INSERT INTO period_records (id, user_id, date, record_type, flow, symptoms, mood, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PERIOD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(record.date)
        .bind(record_type)
        .bind(flow)
        .bind(symptoms)
        .bind(mood)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn update_period_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        update: PeriodRecordUpdate,
    ) -> PortResult<PeriodRecord> {
        let mut record = self.get_period_record(user_id, record_id).await?;
        record.apply(update);

        let (record_type, flow, symptoms, mood) = observation_columns(&record.observation);
        sqlx::query(
            "UPDATE period_records SET date = $3, record_type = $4, flow = $5, symptoms = $6,
                mood = $7, notes = $8
             WHERE id = $1 AND user_id = $2",
        )
        .bind(record_id)
        .bind(user_id)
        .bind(record.date)
        .bind(record_type)
        .bind(flow)
        .bind(symptoms)
        .bind(mood)
        .bind(&record.notes)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record)
    }

    async fn delete_period_record(&self, user_id: Uuid, record_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM period_records WHERE id = $1 AND user_id = $2")
            .bind(record_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Period record {} not found", record_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(record_type: &str) -> PeriodRow {
        PeriodRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            record_type: record_type.to_string(),
            flow: None,
            symptoms: None,
            mood: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn period_rows_map_to_observations() {
        let mut start = row("start");
        start.flow = Some("heavy".to_string());
        assert_eq!(
            start.to_domain().unwrap().observation,
            Observation::Start { flow: Some(Flow::Heavy) }
        );

        let mut symptom = row("symptom");
        symptom.symptoms = Some(vec!["cramps".to_string()]);
        let observation = symptom.to_domain().unwrap().observation;
        assert_eq!(observation_columns(&observation).2, Some(vec!["cramps".to_string()]));

        assert!(row("spotting").to_domain().is_err());
    }

    #[test]
    fn unknown_flow_is_rejected() {
        let mut start = row("start");
        start.flow = Some("torrential".to_string());
        assert!(matches!(start.to_domain(), Err(PortError::Unexpected(_))));
    }
}
