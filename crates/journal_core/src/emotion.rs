//! crates/journal_core/src/emotion.rs
//!
//! Live keyword-based emotion scoring for diary text as it is typed. This is
//! feedback for the writer only; nothing here is persisted or fed to the AI
//! analysis.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::domain::Emotion;

/// Texts shorter than this (in characters) are not scored.
pub const MIN_TEXT_CHARS: usize = 10;

/// Samples kept by an [`EmotionTracker`].
pub const HISTORY_CAPACITY: usize = 20;

/// Samples aggregated by [`EmotionTracker::current_dominant`].
pub const DOMINANT_WINDOW: usize = 5;

/// Trigger substrings per emotion, in `Emotion::ALL` order.
const LEXICON: [(Emotion, &[&str]); 5] = [
    (Emotion::Happy, &["행복", "기쁘", "기뻐", "좋았", "즐거", "웃"]),
    (Emotion::Sad, &["슬프", "슬퍼", "우울", "눈물", "외로", "속상"]),
    (Emotion::Angry, &["화나", "화가", "짜증", "분노", "열받", "억울"]),
    (Emotion::Peaceful, &["평온", "편안", "차분", "여유", "잔잔", "고요"]),
    (Emotion::Excited, &["설레", "두근", "신나", "기대", "흥분"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionScore {
    pub emotion: Emotion,
    pub intensity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionSample {
    pub at: DateTime<Utc>,
    pub emotion: Emotion,
    pub intensity: u32,
}

/// Occurrences of `needle` in `haystack`, overlapping matches included.
fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .char_indices()
        .filter(|(i, _)| haystack[*i..].starts_with(needle))
        .count() as u32
}

/// Intensity of every emotion in `text`, in declaration order.
pub fn intensities(text: &str) -> [EmotionScore; 5] {
    LEXICON.map(|(emotion, keywords)| EmotionScore {
        emotion,
        intensity: keywords.iter().map(|k| count_occurrences(text, k)).sum(),
    })
}

/// The dominant emotion of `text`.
///
/// `None` when the text is too short or no keyword matched. Ties go to the
/// emotion declared first.
pub fn score_text(text: &str) -> Option<EmotionScore> {
    if text.chars().count() < MIN_TEXT_CHARS {
        return None;
    }
    intensities(text)
        .into_iter()
        .filter(|s| s.intensity > 0)
        .fold(None, |best: Option<EmotionScore>, s| match best {
            Some(b) if b.intensity >= s.intensity => Some(b),
            _ => Some(s),
        })
}

/// Bounded history of samples for one writing session.
#[derive(Debug, Clone, Default)]
pub struct EmotionTracker {
    history: VecDeque<EmotionSample>,
}

impl EmotionTracker {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Scores `text` and records the result, dropping the oldest sample once full.
    pub fn observe(&mut self, text: &str, at: DateTime<Utc>) -> Option<EmotionSample> {
        let score = score_text(text)?;
        let sample = EmotionSample {
            at,
            emotion: score.emotion,
            intensity: score.intensity,
        };
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        Some(sample)
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &EmotionSample> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Summed intensity per emotion over the most recent samples; ties go to
    /// the emotion seen first within that window.
    pub fn current_dominant(&self) -> Option<EmotionScore> {
        let skip = self.history.len().saturating_sub(DOMINANT_WINDOW);
        let mut totals: Vec<EmotionScore> = Vec::new();

        for sample in self.history.iter().skip(skip) {
            match totals.iter_mut().find(|t| t.emotion == sample.emotion) {
                Some(t) => t.intensity += sample.intensity,
                None => totals.push(EmotionScore {
                    emotion: sample.emotion,
                    intensity: sample.intensity,
                }),
            }
        }

        totals
            .into_iter()
            .fold(None, |best: Option<EmotionScore>, s| match best {
                Some(b) if b.intensity >= s.intensity => Some(b),
                _ => Some(s),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn repeated_keyword_adds_to_intensity() {
        let score = score_text("오늘은 행복했고 내일도 행복할 거야").unwrap();
        assert_eq!(score, EmotionScore { emotion: Emotion::Happy, intensity: 2 });
    }

    #[test]
    fn overlapping_occurrences_are_counted() {
        assert_eq!(count_occurrences("웃웃웃", "웃웃"), 2);
        assert_eq!(count_occurrences("abc", ""), 0);
    }

    #[test]
    fn short_or_neutral_text_has_no_score() {
        assert_eq!(score_text("행복"), None);
        assert_eq!(score_text("오늘은 회의가 세 개나 있었다"), None);
    }

    #[test]
    fn ties_go_to_the_first_declared_emotion() {
        // one sad keyword, one happy keyword
        let score = score_text("눈물이 났지만 그래도 웃었다").unwrap();
        assert_eq!(score.emotion, Emotion::Happy);
        assert_eq!(score.intensity, 1);
    }

    #[test]
    fn history_is_bounded_and_drops_oldest() {
        let mut tracker = EmotionTracker::new();
        let t0 = Utc::now();
        for i in 0..25 {
            tracker
                .observe("오늘 너무 짜증나는 하루였다", t0 + Duration::seconds(i))
                .unwrap();
        }
        assert_eq!(tracker.len(), HISTORY_CAPACITY);
        assert_eq!(tracker.history().next().unwrap().at, t0 + Duration::seconds(5));
    }

    #[test]
    fn current_dominant_only_looks_at_the_last_five() {
        let mut tracker = EmotionTracker::new();
        let now = Utc::now();
        for _ in 0..10 {
            tracker.observe("슬프고 우울하고 외로운 밤", now);
        }
        for _ in 0..5 {
            tracker.observe("마음이 평온하고 편안하다", now);
        }

        let dominant = tracker.current_dominant().unwrap();
        assert_eq!(dominant.emotion, Emotion::Peaceful);
        assert_eq!(dominant.intensity, 10);
    }

    #[test]
    fn current_dominant_ties_go_to_first_seen() {
        let mut tracker = EmotionTracker::new();
        let now = Utc::now();
        tracker.observe("내일 여행이 너무 설레는 밤", now);
        tracker.observe("오늘은 정말 행복한 날이었다", now);

        assert_eq!(tracker.current_dominant().unwrap().emotion, Emotion::Excited);
        tracker.clear();
        assert_eq!(tracker.current_dominant(), None);
    }

    #[test]
    fn unscored_text_leaves_history_untouched() {
        let mut tracker = EmotionTracker::new();
        assert!(tracker.observe("짧다", Utc::now()).is_none());
        assert!(tracker.is_empty());
    }
}
