//! services/api/src/adapters/memory.rs
//!
//! A process-local implementation of the `DatabaseService` port. The store is
//! created once at startup, injected through `AppState`, and starts empty on
//! every restart. Used for `STORAGE_BACKEND=memory` and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use journal_core::domain::{
    AnalysisResult, AuthSession, DiaryAnalysis, DiaryEntry, DiaryEntryUpdate, MemoirEntry,
    MemoirEntryUpdate, NewDiaryEntry, NewMemoirEntry, NewPeriodRecord, PeriodRecord,
    PeriodRecordUpdate, PreferencesUpdate, User, UserCredentials, UserPreferences,
};
use journal_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    passwords: HashMap<Uuid, String>,
    sessions: HashMap<String, AuthSession>,
    diary: HashMap<Uuid, DiaryEntry>,
    /// Keyed by diary entry id.
    analyses: HashMap<Uuid, DiaryAnalysis>,
    memoirs: HashMap<Uuid, MemoirEntry>,
    period: HashMap<Uuid, PeriodRecord>,
}

impl Tables {
    fn owned_diary(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<&DiaryEntry> {
        self.diary
            .get(&entry_id)
            .filter(|e| e.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("Diary entry {} not found", entry_id)))
    }
}

/// An in-memory adapter that implements the `DatabaseService` port.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(entries: &mut [DiaryEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

#[async_trait]
impl DatabaseService for InMemoryStore {
    // --- User Management ---
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == username) {
            return Err(PortError::Conflict(format!("Username {} is taken", username)));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            preferences: UserPreferences::default(),
            created_at: Utc::now(),
        };
        t.passwords.insert(user.user_id, hashed_password.to_string());
        t.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let t = self.tables.read().await;
        let user = t
            .users
            .values()
            .find(|u| u.username == username)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))?;
        let hashed_password = t
            .passwords
            .get(&user.user_id)
            .cloned()
            .ok_or_else(|| PortError::Unexpected("User without password".to_string()))?;
        Ok(UserCredentials {
            user_id: user.user_id,
            username: user.username.clone(),
            hashed_password,
        })
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        update: PreferencesUpdate,
    ) -> PortResult<UserPreferences> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.preferences.apply(update);
        Ok(user.preferences)
    }

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        t.sessions.retain(|_, s| s.expires_at > now);
        t.sessions.insert(
            token.to_string(),
            AuthSession {
                token: token.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        let mut t = self.tables.write().await;
        let session = t.sessions.get(token).map(|s| (s.user_id, s.expires_at));
        match session {
            Some((user_id, expires_at)) if expires_at > Utc::now() => Ok(user_id),
            Some(_) => {
                t.sessions.remove(token);
                Err(PortError::Unauthorized)
            }
            None => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        self.tables.write().await.sessions.remove(token);
        Ok(())
    }

    // --- Diary ---
    async fn list_diary_entries(&self, user_id: Uuid) -> PortResult<Vec<DiaryEntry>> {
        let mut entries: Vec<DiaryEntry> = self
            .tables
            .read()
            .await
            .diary
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut entries);
        Ok(entries)
    }

    async fn get_diary_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<DiaryEntry> {
        self.tables.read().await.owned_diary(user_id, entry_id).cloned()
    }

    async fn create_diary_entry(
        &self,
        user_id: Uuid,
        entry: NewDiaryEntry,
    ) -> PortResult<DiaryEntry> {
        let entry = DiaryEntry {
            id: Uuid::new_v4(),
            user_id,
            date: entry.date,
            emotion: entry.emotion,
            content: entry.content,
            created_at: Utc::now(),
        };
        self.tables.write().await.diary.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_diary_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: DiaryEntryUpdate,
    ) -> PortResult<DiaryEntry> {
        let mut t = self.tables.write().await;
        t.owned_diary(user_id, entry_id)?;
        let entry = t
            .diary
            .get_mut(&entry_id)
            .ok_or_else(|| PortError::NotFound(format!("Diary entry {} not found", entry_id)))?;
        entry.apply(update);
        Ok(entry.clone())
    }

    async fn delete_diary_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.write().await;
        t.owned_diary(user_id, entry_id)?;
        t.diary.remove(&entry_id);
        t.analyses.remove(&entry_id);
        Ok(())
    }

    async fn search_diary_entries(
        &self,
        user_id: Uuid,
        query: &str,
    ) -> PortResult<Vec<DiaryEntry>> {
        let needle = query.to_lowercase();
        let mut entries: Vec<DiaryEntry> = self
            .tables
            .read()
            .await
            .diary
            .values()
            .filter(|e| e.user_id == user_id && e.content.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        newest_first(&mut entries);
        Ok(entries)
    }

    // --- Diary Analysis ---
    async fn get_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> PortResult<DiaryAnalysis> {
        let t = self.tables.read().await;
        t.owned_diary(user_id, entry_id)?;
        t.analyses
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("No analysis for entry {}", entry_id)))
    }

    async fn create_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        result: AnalysisResult,
    ) -> PortResult<DiaryAnalysis> {
        let mut t = self.tables.write().await;
        t.owned_diary(user_id, entry_id)?;
        if t.analyses.contains_key(&entry_id) {
            return Err(PortError::Conflict(format!(
                "Entry {} already has an analysis",
                entry_id
            )));
        }
        let now = Utc::now();
        let analysis = DiaryAnalysis {
            id: Uuid::new_v4(),
            diary_entry_id: entry_id,
            user_id,
            result,
            created_at: now,
            updated_at: now,
        };
        t.analyses.insert(entry_id, analysis.clone());
        Ok(analysis)
    }

    async fn update_diary_analysis(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        result: AnalysisResult,
    ) -> PortResult<DiaryAnalysis> {
        let mut t = self.tables.write().await;
        t.owned_diary(user_id, entry_id)?;
        let analysis = t
            .analyses
            .get_mut(&entry_id)
            .ok_or_else(|| PortError::NotFound(format!("No analysis for entry {}", entry_id)))?;
        analysis.result = result;
        analysis.updated_at = Utc::now();
        Ok(analysis.clone())
    }

    async fn delete_diary_analysis(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.write().await;
        t.owned_diary(user_id, entry_id)?;
        t.analyses
            .remove(&entry_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("No analysis for entry {}", entry_id)))
    }

    // --- Memoir ---
    async fn list_memoir_entries(&self, user_id: Uuid) -> PortResult<Vec<MemoirEntry>> {
        let mut entries: Vec<MemoirEntry> = self
            .tables
            .read()
            .await
            .memoirs
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn get_memoir_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<MemoirEntry> {
        self.tables
            .read()
            .await
            .memoirs
            .get(&entry_id)
            .filter(|e| e.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Memoir entry {} not found", entry_id)))
    }

    async fn create_memoir_entry(
        &self,
        user_id: Uuid,
        entry: NewMemoirEntry,
    ) -> PortResult<MemoirEntry> {
        let now = Utc::now();
        let entry = MemoirEntry {
            id: Uuid::new_v4(),
            user_id,
            title: entry.title,
            content: entry.content,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.memoirs.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_memoir_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: MemoirEntryUpdate,
    ) -> PortResult<MemoirEntry> {
        let mut t = self.tables.write().await;
        let entry = t
            .memoirs
            .get_mut(&entry_id)
            .filter(|e| e.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("Memoir entry {} not found", entry_id)))?;
        entry.apply(update, Utc::now());
        Ok(entry.clone())
    }

    async fn delete_memoir_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.write().await;
        if !t.memoirs.get(&entry_id).is_some_and(|e| e.user_id == user_id) {
            return Err(PortError::NotFound(format!("Memoir entry {} not found", entry_id)));
        }
        t.memoirs.remove(&entry_id);
        Ok(())
    }

    // --- Period Records ---
    async fn list_period_records(&self, user_id: Uuid) -> PortResult<Vec<PeriodRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .period
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_period_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> PortResult<PeriodRecord> {
        self.tables
            .read()
            .await
            .period
            .get(&record_id)
            .filter(|r| r.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Period record {} not found", record_id)))
    }

    async fn create_period_record(
        &self,
        user_id: Uuid,
        record: NewPeriodRecord,
    ) -> PortResult<PeriodRecord> {
        let record = PeriodRecord {
            id: Uuid::new_v4(),
            user_id,
            date: record.date,
            observation: record.observation,
            notes: record.notes,
            created_at: Utc::now(),
        };
        self.tables.write().await.period.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_period_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        update: PeriodRecordUpdate,
    ) -> PortResult<PeriodRecord> {
        let mut t = self.tables.write().await;
        let record = t
            .period
            .get_mut(&record_id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("Period record {} not found", record_id)))?;
        record.apply(update);
        Ok(record.clone())
    }

    async fn delete_period_record(&self, user_id: Uuid, record_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.write().await;
        if !t.period.get(&record_id).is_some_and(|r| r.user_id == user_id) {
            return Err(PortError::NotFound(format!("Period record {} not found", record_id)));
        }
        t.period.remove(&record_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use journal_core::domain::{Emotion, Observation};

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            primary_emotion: "기쁨".to_string(),
            secondary_emotions: vec![],
            confidence: 0.9,
            sentiment_score: 70,
            themes: vec![],
            keywords: vec![],
            suggestions: "좋아요".to_string(),
            summary: "좋은 하루".to_string(),
        }
    }

    async fn entry(store: &InMemoryStore, user_id: Uuid, date: &str, content: &str) -> DiaryEntry {
        store
            .create_diary_entry(
                user_id,
                NewDiaryEntry {
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                    emotion: Emotion::Happy,
                    content: content.to_string(),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = InMemoryStore::new();
        store.create_user("haru", "hash").await.unwrap();
        let err = store.create_user("haru", "other").await.unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));

        let creds = store.get_user_by_username("haru").await.unwrap();
        assert_eq!(creds.hashed_password, "hash");
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let store = InMemoryStore::new();
        let user = store.create_user("haru", "hash").await.unwrap();

        store
            .create_auth_session("live", user.user_id, Utc::now() + Duration::days(1))
            .await
            .unwrap();
        store
            .create_auth_session("stale", user.user_id, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(store.validate_auth_session("live").await.unwrap(), user.user_id);
        assert!(matches!(
            store.validate_auth_session("stale").await,
            Err(PortError::Unauthorized)
        ));

        store.delete_auth_session("live").await.unwrap();
        assert!(store.validate_auth_session("live").await.is_err());
    }

    #[tokio::test]
    async fn new_sessions_sweep_out_expired_ones() {
        let store = InMemoryStore::new();
        let user = store.create_user("haru", "hash").await.unwrap();

        for i in 0..3 {
            store
                .create_auth_session(&format!("old-{}", i), user.user_id, Utc::now() - Duration::hours(1))
                .await
                .unwrap();
        }
        store
            .create_auth_session("fresh", user.user_id, Utc::now() + Duration::days(7))
            .await
            .unwrap();

        let tables = store.tables.read().await;
        assert_eq!(tables.sessions.len(), 1);
        assert!(tables.sessions.contains_key("fresh"));
    }

    #[tokio::test]
    async fn entries_are_scoped_to_their_owner() {
        let store = InMemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let e = entry(&store, alice, "2024-01-01", "hello").await;

        assert!(store.get_diary_entry(alice, e.id).await.is_ok());
        assert!(matches!(
            store.get_diary_entry(bob, e.id).await,
            Err(PortError::NotFound(_))
        ));
        assert!(store.delete_diary_entry(bob, e.id).await.is_err());
        assert!(store.list_diary_entries(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_newest_first() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        entry(&store, user, "2024-01-01", "Walked in the Park").await;
        entry(&store, user, "2024-01-05", "park again").await;
        entry(&store, user, "2024-01-03", "stayed home").await;

        let found = store.search_diary_entries(user, "PARK").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].content, "park again");
    }

    #[tokio::test]
    async fn second_analysis_is_a_conflict() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        let e = entry(&store, user, "2024-01-01", "hello").await;

        store.create_diary_analysis(user, e.id, sample_result()).await.unwrap();
        let err = store
            .create_diary_analysis(user, e.id, sample_result())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));

        // deleting the entry takes its analysis with it
        store.delete_diary_entry(user, e.id).await.unwrap();
        assert!(store.tables.read().await.analyses.is_empty());
    }

    #[tokio::test]
    async fn period_records_update_in_place() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        let record = store
            .create_period_record(
                user,
                NewPeriodRecord {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    observation: Observation::End,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let updated = store
            .update_period_record(
                user,
                record.id,
                PeriodRecordUpdate {
                    observation: Some(Observation::Mood { mood: "calm".to_string() }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.observation.kind(), "mood");
        assert_eq!(store.list_period_records(user).await.unwrap().len(), 1);
    }
}
