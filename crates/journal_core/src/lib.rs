pub mod cycle;
pub mod domain;
pub mod emotion;
pub mod ports;
pub mod stats;

pub use cycle::{
    classify_calendar_day, compute_cycle_summary, compute_mood_frequencies,
    compute_symptom_frequencies, month_calendar, CalendarDay, CycleSummary, DayCategory,
    Frequency,
};
pub use domain::{
    AnalysisResult, AuthSession, DiaryAnalysis, DiaryEntry, Emotion, Flow, MemoirEntry,
    Observation, PeriodRecord, User, UserCredentials, UserPreferences,
};
pub use emotion::{EmotionSample, EmotionScore, EmotionTracker};
pub use ports::{Clock, DatabaseService, DiaryAnalysisService, PortError, PortResult};
pub use stats::{compute_journal_stats, JournalStats};
