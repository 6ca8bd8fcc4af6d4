//! crates/journal_core/src/stats.rs
//!
//! Writing statistics for the overview page.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

use crate::domain::{DiaryEntry, Emotion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStats {
    pub total_diary_entries: usize,
    pub total_memoir_entries: usize,
    /// Consecutive days with a diary entry, ending today or yesterday.
    pub current_streak: u32,
    pub entries_this_month: usize,
    /// Entry count per emotion, in `Emotion::ALL` order.
    pub emotion_distribution: Vec<(Emotion, usize)>,
}

pub fn compute_journal_stats(
    entries: &[DiaryEntry],
    memoir_count: usize,
    today: NaiveDate,
) -> JournalStats {
    let dates: BTreeSet<NaiveDate> = entries.iter().map(|e| e.date).collect();

    let mut cursor = if dates.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|d| dates.contains(d))
    };
    let mut current_streak = 0;
    while let Some(d) = cursor.filter(|d| dates.contains(d)) {
        current_streak += 1;
        cursor = d.checked_sub_signed(Duration::days(1));
    }

    let entries_this_month = entries
        .iter()
        .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
        .count();

    let emotion_distribution = Emotion::ALL
        .into_iter()
        .map(|emotion| (emotion, entries.iter().filter(|e| e.emotion == emotion).count()))
        .collect();

    JournalStats {
        total_diary_entries: entries.len(),
        total_memoir_entries: memoir_count,
        current_streak,
        entries_this_month,
        emotion_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(date: &str, emotion: Emotion) -> DiaryEntry {
        DiaryEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            emotion,
            content: "오늘의 일기".to_string(),
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
    }

    #[test]
    fn streak_counts_back_from_today() {
        let entries = vec![
            entry("2024-03-03", Emotion::Happy),
            entry("2024-03-02", Emotion::Sad),
            entry("2024-03-02", Emotion::Happy),
            entry("2024-03-01", Emotion::Happy),
            entry("2024-02-28", Emotion::Angry),
        ];
        let stats = compute_journal_stats(&entries, 2, today());

        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.entries_this_month, 4);
        assert_eq!(stats.total_diary_entries, 5);
        assert_eq!(stats.total_memoir_entries, 2);
        assert_eq!(stats.emotion_distribution[0], (Emotion::Happy, 3));
        assert_eq!(stats.emotion_distribution[4], (Emotion::Excited, 0));
    }

    #[test]
    fn streak_may_end_yesterday() {
        let entries = vec![entry("2024-03-02", Emotion::Peaceful), entry("2024-03-01", Emotion::Happy)];
        assert_eq!(compute_journal_stats(&entries, 0, today()).current_streak, 2);
    }

    #[test]
    fn gap_breaks_the_streak() {
        let entries = vec![entry("2024-03-01", Emotion::Happy)];
        assert_eq!(compute_journal_stats(&entries, 0, today()).current_streak, 0);
        assert_eq!(compute_journal_stats(&[], 0, today()).current_streak, 0);
    }
}
