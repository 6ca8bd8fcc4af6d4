//! crates/journal_core/src/cycle.rs
//!
//! Cycle statistics derived from a user's period log: average cycle length,
//! next-period and ovulation estimates, symptom/mood tallies and the
//! per-day calendar classification.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{HashMap, HashSet};

use crate::domain::{Observation, PeriodRecord};

/// Days between the estimated ovulation and the next period start.
pub const OVULATION_OFFSET_DAYS: i64 = 14;

/// Period length reported in every summary. Not derived from `end` records.
pub const DEFAULT_PERIOD_LENGTH_DAYS: i64 = 5;

/// How many symptoms the symptom table keeps.
pub const TOP_SYMPTOMS: usize = 5;

/// Predictions computed from at least two period starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle_length: i64,
    pub period_length: i64,
    pub last_period: NaiveDate,
    pub next_period: NaiveDate,
    pub ovulation: NaiveDate,
    /// Day gaps between consecutive starts, oldest first.
    pub gaps: Vec<i64>,
    /// Number of complete cycles observed.
    pub count: usize,
    pub min_cycle: i64,
    pub max_cycle: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequency {
    pub label: String,
    pub count: usize,
}

/// How the calendar renders one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCategory {
    Today,
    Period,
    PredictedNext,
    Fertile,
    None,
}

impl DayCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DayCategory::Today => "today",
            DayCategory::Period => "period",
            DayCategory::PredictedNext => "predictedNext",
            DayCategory::Fertile => "fertile",
            DayCategory::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub category: DayCategory,
}

fn start_dates(records: &[PeriodRecord]) -> Vec<NaiveDate> {
    let mut starts: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.observation.is_start())
        .map(|r| r.date)
        .collect();
    starts.sort();
    starts
}

/// Integer mean rounded half up, like `Math.round` on the average.
fn rounded_mean(values: &[i64]) -> i64 {
    let n = values.len() as i64;
    let sum: i64 = values.iter().sum();
    (2 * sum + n).div_euclid(2 * n)
}

/// Compute the cycle summary for an unordered record list.
///
/// Returns `None` while fewer than two period starts are logged, or when the
/// prediction falls outside the representable date range; callers render that
/// as "needs more data", never as a zero-filled summary.
pub fn compute_cycle_summary(records: &[PeriodRecord]) -> Option<CycleSummary> {
    let starts = start_dates(records);
    if starts.len() < 2 {
        return None;
    }

    let gaps: Vec<i64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();

    let cycle_length = rounded_mean(&gaps);
    let last_period = *starts.last()?;
    let next_period = last_period.checked_add_signed(Duration::days(cycle_length))?;
    let ovulation = next_period.checked_sub_signed(Duration::days(OVULATION_OFFSET_DAYS))?;

    Some(CycleSummary {
        cycle_length,
        period_length: DEFAULT_PERIOD_LENGTH_DAYS,
        last_period,
        next_period,
        ovulation,
        count: gaps.len(),
        min_cycle: gaps.iter().copied().min()?,
        max_cycle: gaps.iter().copied().max()?,
        gaps,
    })
}

/// Counts labels, keeping the order in which each label first appeared.
#[derive(Default)]
struct Tally {
    order: Vec<Frequency>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.order[i].count += 1,
            None => {
                self.index.insert(label.to_string(), self.order.len());
                self.order.push(Frequency {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    /// Highest count first; the stable sort keeps first-seen order among ties.
    fn into_sorted(self) -> Vec<Frequency> {
        let mut out = self.order;
        out.sort_by(|a, b| b.count.cmp(&a.count));
        out
    }
}

/// The five most frequent symptoms across all symptom records.
pub fn compute_symptom_frequencies(records: &[PeriodRecord]) -> Vec<Frequency> {
    let mut tally = Tally::default();
    for record in records {
        if let Observation::Symptom { symptoms } = &record.observation {
            let mut seen = HashSet::new();
            for symptom in symptoms.iter().filter(|s| !s.is_empty()) {
                // a record holds a set; a repeated label counts once
                if seen.insert(symptom.as_str()) {
                    tally.add(symptom);
                }
            }
        }
    }
    let mut out = tally.into_sorted();
    out.truncate(TOP_SYMPTOMS);
    out
}

/// Every logged mood with its count, most frequent first.
pub fn compute_mood_frequencies(records: &[PeriodRecord]) -> Vec<Frequency> {
    let mut tally = Tally::default();
    for record in records {
        if let Observation::Mood { mood } = &record.observation {
            if !mood.is_empty() {
                tally.add(mood);
            }
        }
    }
    tally.into_sorted()
}

fn classify(
    date: NaiveDate,
    starts: &HashSet<NaiveDate>,
    summary: Option<&CycleSummary>,
    today: NaiveDate,
) -> DayCategory {
    if date == today {
        return DayCategory::Today;
    }
    if starts.contains(&date) {
        return DayCategory::Period;
    }
    match summary {
        Some(s) if s.next_period == date => DayCategory::PredictedNext,
        Some(s) if s.ovulation == date => DayCategory::Fertile,
        _ => DayCategory::None,
    }
}

/// Classify one calendar day.
///
/// Precedence: today, logged period start, predicted next start, estimated
/// ovulation, nothing.
pub fn classify_calendar_day(
    date: NaiveDate,
    records: &[PeriodRecord],
    summary: Option<&CycleSummary>,
    today: NaiveDate,
) -> DayCategory {
    let starts: HashSet<NaiveDate> = start_dates(records).into_iter().collect();
    classify(date, &starts, summary, today)
}

/// Classify every day of a month. `None` for an invalid year/month.
pub fn month_calendar(
    year: i32,
    month: u32,
    records: &[PeriodRecord],
    summary: Option<&CycleSummary>,
    today: NaiveDate,
) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let starts: HashSet<NaiveDate> = start_dates(records).into_iter().collect();

    Some(
        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|date| CalendarDay {
                date,
                category: classify(date, &starts, summary, today),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Flow;
    use chrono::Utc;
    use uuid::Uuid;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(date: &str, observation: Observation) -> PeriodRecord {
        record_on(day(date), observation)
    }

    fn record_on(date: NaiveDate, observation: Observation) -> PeriodRecord {
        PeriodRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date,
            observation,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn start(date: &str) -> PeriodRecord {
        record(date, Observation::Start { flow: Some(Flow::Medium) })
    }

    fn symptoms(date: &str, labels: &[&str]) -> PeriodRecord {
        record(
            date,
            Observation::Symptom {
                symptoms: labels.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn mood(date: &str, label: &str) -> PeriodRecord {
        record(date, Observation::Mood { mood: label.to_string() })
    }

    #[test]
    fn regular_cycle_predicts_next_period_and_ovulation() {
        let records = vec![start("2024-01-01"), start("2024-01-29"), start("2024-02-26")];
        let summary = compute_cycle_summary(&records).unwrap();

        assert_eq!(summary.gaps, vec![28, 28]);
        assert_eq!(summary.cycle_length, 28);
        assert_eq!(summary.last_period, day("2024-02-26"));
        assert_eq!(summary.next_period, day("2024-03-25"));
        assert_eq!(summary.ovulation, day("2024-03-11"));
        assert_eq!(summary.period_length, 5);
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn single_gap_across_month_end() {
        let records = vec![start("2024-01-01"), start("2024-01-30")];
        let summary = compute_cycle_summary(&records).unwrap();

        assert_eq!(summary.gaps, vec![29]);
        assert_eq!(summary.cycle_length, 29);
        assert_eq!(summary.next_period, day("2024-02-28"));
    }

    #[test]
    fn fewer_than_two_starts_is_insufficient_data() {
        assert_eq!(compute_cycle_summary(&[]), None);
        assert_eq!(compute_cycle_summary(&[start("2024-01-01")]), None);

        // non-start records never count toward the history
        let records = vec![
            start("2024-01-01"),
            record("2024-01-05", Observation::End),
            mood("2024-01-07", "calm"),
        ];
        assert_eq!(compute_cycle_summary(&records), None);
    }

    #[test]
    fn input_order_does_not_matter() {
        let ordered = vec![start("2024-01-01"), start("2024-01-27"), start("2024-02-25")];
        let shuffled = vec![start("2024-02-25"), start("2024-01-01"), start("2024-01-27")];

        assert_eq!(compute_cycle_summary(&ordered), compute_cycle_summary(&shuffled));
    }

    #[test]
    fn mean_rounds_half_up() {
        // gaps 28 and 29 average to 28.5
        let records = vec![start("2024-01-01"), start("2024-01-29"), start("2024-02-27")];
        let summary = compute_cycle_summary(&records).unwrap();

        assert_eq!(summary.gaps, vec![28, 29]);
        assert_eq!(summary.cycle_length, 29);
        assert_eq!(summary.min_cycle, 28);
        assert_eq!(summary.max_cycle, 29);
        assert_eq!(summary.next_period, summary.last_period + Duration::days(29));
        assert_eq!(summary.ovulation, summary.next_period - Duration::days(14));
    }

    #[test]
    fn prediction_past_the_last_date_is_no_summary() {
        let records = vec![
            record_on(NaiveDate::MAX - Duration::days(40), Observation::Start { flow: None }),
            record_on(NaiveDate::MAX - Duration::days(10), Observation::Start { flow: None }),
        ];
        assert_eq!(compute_cycle_summary(&records), None);

        let today = NaiveDate::MAX - Duration::days(5);
        assert_eq!(
            classify_calendar_day(NaiveDate::MAX, &records, None, today),
            DayCategory::None
        );
    }

    #[test]
    fn symptom_counts_match_record_count() {
        let records = vec![
            symptoms("2024-01-02", &["cramps", "headache"]),
            symptoms("2024-01-03", &["cramps"]),
            symptoms("2024-01-04", &["cramps", "cramps"]),
        ];
        let freq = compute_symptom_frequencies(&records);

        assert_eq!(freq[0], Frequency { label: "cramps".into(), count: 3 });
        assert_eq!(freq[1], Frequency { label: "headache".into(), count: 1 });
    }

    #[test]
    fn symptom_table_keeps_top_five_with_first_seen_ties() {
        let records = vec![
            symptoms("2024-01-01", &["a", "b", "c", "d", "e", "f"]),
            symptoms("2024-01-02", &["f"]),
        ];
        let labels: Vec<String> = compute_symptom_frequencies(&records)
            .into_iter()
            .map(|f| f.label)
            .collect();

        assert_eq!(labels, vec!["f", "a", "b", "c", "d"]);
    }

    #[test]
    fn moods_are_not_truncated() {
        let records: Vec<PeriodRecord> = ["calm", "sad", "calm", "tired", "happy", "angry", "low"]
            .iter()
            .map(|m| mood("2024-01-01", m))
            .collect();
        let freq = compute_mood_frequencies(&records);

        assert_eq!(freq.len(), 6);
        assert_eq!(freq[0], Frequency { label: "calm".into(), count: 2 });
        assert_eq!(freq[1].label, "sad");
    }

    #[test]
    fn today_wins_over_logged_start() {
        let records = vec![start("2024-01-01"), start("2024-01-29")];
        let summary = compute_cycle_summary(&records);
        let today = day("2024-01-29");

        assert_eq!(
            classify_calendar_day(today, &records, summary.as_ref(), today),
            DayCategory::Today
        );
        assert_eq!(
            classify_calendar_day(day("2024-01-01"), &records, summary.as_ref(), today),
            DayCategory::Period
        );
    }

    #[test]
    fn predicted_days_need_a_summary() {
        let records = vec![start("2024-01-01"), start("2024-01-29")];
        let summary = compute_cycle_summary(&records).unwrap();
        let today = day("2024-02-01");

        assert_eq!(
            classify_calendar_day(summary.next_period, &records, Some(&summary), today),
            DayCategory::PredictedNext
        );
        assert_eq!(
            classify_calendar_day(summary.ovulation, &records, Some(&summary), today),
            DayCategory::Fertile
        );
        assert_eq!(
            classify_calendar_day(summary.next_period, &records, None, today),
            DayCategory::None
        );
    }

    #[test]
    fn month_calendar_covers_every_day() {
        let records = vec![start("2024-01-01"), start("2024-01-29")];
        let summary = compute_cycle_summary(&records);
        let days = month_calendar(2024, 2, &records, summary.as_ref(), day("2024-02-10")).unwrap();

        assert_eq!(days.len(), 29);
        let by_date = |d: &str| days.iter().find(|c| c.date == day(d)).unwrap().category;
        assert_eq!(by_date("2024-02-10"), DayCategory::Today);
        assert_eq!(by_date("2024-02-12"), DayCategory::Fertile);
        assert_eq!(by_date("2024-02-26"), DayCategory::PredictedNext);
        assert_eq!(by_date("2024-02-27"), DayCategory::None);

        assert!(month_calendar(2024, 13, &records, None, day("2024-02-10")).is_none());
    }
}
