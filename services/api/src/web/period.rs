//! services/api/src/web/period.rs
//!
//! Period record CRUD plus the derived cycle summary and month calendar.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use journal_core::cycle::{
    compute_cycle_summary, compute_mood_frequencies, compute_symptom_frequencies, month_calendar,
    CycleSummary, Frequency,
};
use journal_core::domain::{
    Flow, NewPeriodRecord, Observation, PeriodRecord, PeriodRecordUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::rest::{bad_request, port_failure, HandlerError, MessageResponse};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecordResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    /// One of `start`, `end`, `symptom`, `mood`.
    #[serde(rename = "type")]
    pub record_type: String,
    pub flow: Option<String>,
    pub symptoms: Vec<String>,
    pub mood: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PeriodRecord> for PeriodRecordResponse {
    fn from(r: PeriodRecord) -> Self {
        let record_type = r.observation.kind().to_string();
        let (flow, symptoms, mood) = match r.observation {
            Observation::Start { flow } => (flow.map(|f| f.as_str().to_string()), vec![], None),
            Observation::End => (None, vec![], None),
            Observation::Symptom { symptoms } => (None, symptoms, None),
            Observation::Mood { mood } => (None, vec![], Some(mood)),
        };
        Self {
            id: r.id,
            date: r.date,
            record_type,
            flow,
            symptoms,
            mood,
            notes: r.notes,
            created_at: r.created_at,
        }
    }
}

/// Fields that do not belong to the record type are ignored.
#[derive(Deserialize, ToSchema)]
pub struct CreatePeriodRecordRequest {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub record_type: String,
    pub flow: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub mood: Option<String>,
    pub notes: Option<String>,
}

/// A partial update. An empty `notes` string clears the notes.
#[derive(Deserialize, ToSchema, Default)]
pub struct UpdatePeriodRecordRequest {
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub flow: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub mood: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummaryResponse {
    pub cycle_length: i64,
    pub period_length: i64,
    pub last_period: NaiveDate,
    pub next_period: NaiveDate,
    pub ovulation: NaiveDate,
    pub gaps: Vec<i64>,
    pub count: usize,
    pub min_cycle: i64,
    pub max_cycle: i64,
}

impl From<CycleSummary> for CycleSummaryResponse {
    fn from(s: CycleSummary) -> Self {
        Self {
            cycle_length: s.cycle_length,
            period_length: s.period_length,
            last_period: s.last_period,
            next_period: s.next_period,
            ovulation: s.ovulation,
            gaps: s.gaps,
            count: s.count,
            min_cycle: s.min_cycle,
            max_cycle: s.max_cycle,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct FrequencyResponse {
    pub label: String,
    pub count: usize,
}

impl From<Frequency> for FrequencyResponse {
    fn from(f: Frequency) -> Self {
        Self {
            label: f.label,
            count: f.count,
        }
    }
}

/// `summary` is null until at least two period starts are logged.
#[derive(Serialize, ToSchema, Debug)]
pub struct PeriodSummaryResponse {
    pub summary: Option<CycleSummaryResponse>,
    pub symptoms: Vec<FrequencyResponse>,
    pub moods: Vec<FrequencyResponse>,
}

#[derive(Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// Defaults to the current year.
    pub year: Option<i32>,
    /// 1-12, defaults to the current month.
    pub month: Option<u32>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CalendarDayResponse {
    pub date: NaiveDate,
    /// One of `today`, `period`, `predictedNext`, `fertile`, `none`.
    pub category: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDayResponse>,
}

//=========================================================================================
// Observation Building
//=========================================================================================

fn parse_flow(raw: &str) -> Result<Flow, HandlerError> {
    raw.parse::<Flow>().map_err(bad_request)
}

fn clean_symptoms(symptoms: Vec<String>) -> Vec<String> {
    symptoms
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Builds the observation for `kind` from the fields that apply to it.
fn build_observation(
    kind: &str,
    flow: Option<Flow>,
    symptoms: Vec<String>,
    mood: Option<String>,
) -> Result<Observation, HandlerError> {
    match kind {
        "start" => Ok(Observation::Start { flow }),
        "end" => Ok(Observation::End),
        "symptom" => Ok(Observation::Symptom {
            symptoms: clean_symptoms(symptoms),
        }),
        "mood" => {
            let mood = mood
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .ok_or_else(|| bad_request("A mood record needs a mood"))?;
            Ok(Observation::Mood { mood })
        }
        other => Err(bad_request(format!("unknown record type '{}'", other))),
    }
}

/// Combines an update with the current observation. Fields the update omits
/// are carried over when they still apply. `None` when nothing changes.
fn merge_observation(
    current: &Observation,
    req: &UpdatePeriodRecordRequest,
) -> Result<Option<Observation>, HandlerError> {
    if req.record_type.is_none() && req.flow.is_none() && req.symptoms.is_none() && req.mood.is_none()
    {
        return Ok(None);
    }

    let kind = req.record_type.as_deref().unwrap_or(current.kind());
    let flow = match (&req.flow, current) {
        (Some(raw), _) => Some(parse_flow(raw)?),
        (None, Observation::Start { flow }) => *flow,
        (None, _) => None,
    };
    let symptoms = match (&req.symptoms, current) {
        (Some(given), _) => given.clone(),
        (None, Observation::Symptom { symptoms }) => symptoms.clone(),
        (None, _) => vec![],
    };
    let mood = match (&req.mood, current) {
        (Some(given), _) => Some(given.clone()),
        (None, Observation::Mood { mood }) => Some(mood.clone()),
        (None, _) => None,
    };

    build_observation(kind, flow, symptoms, mood).map(Some)
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

async fn load_records(state: &AppState, user_id: Uuid) -> Result<Vec<PeriodRecord>, HandlerError> {
    state
        .db
        .list_period_records(user_id)
        .await
        .map_err(|e| port_failure("list period records", e))
}

//=========================================================================================
// Record Handlers
//=========================================================================================

/// GET /api/period-records - Newest date first
#[utoipa::path(
    get,
    path = "/api/period-records",
    responses((status = 200, description = "Period records", body = Vec<PeriodRecordResponse>))
)]
pub async fn list_records_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<PeriodRecordResponse>>, HandlerError> {
    let mut records = load_records(&state, user_id).await?;
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/period-records/{id}",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "The record", body = PeriodRecordResponse),
        (status = 404, description = "No such record")
    )
)]
pub async fn get_record_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<PeriodRecordResponse>, HandlerError> {
    let record = state
        .db
        .get_period_record(user_id, id)
        .await
        .map_err(|e| port_failure("load period record", e))?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/api/period-records",
    request_body = CreatePeriodRecordRequest,
    responses(
        (status = 201, description = "Record created", body = PeriodRecordResponse),
        (status = 400, description = "Unknown type or flow, or a mood record without a mood")
    )
)]
pub async fn create_record_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreatePeriodRecordRequest>,
) -> Result<(StatusCode, Json<PeriodRecordResponse>), HandlerError> {
    let flow = req.flow.as_deref().map(parse_flow).transpose()?;
    let observation = build_observation(
        &req.record_type,
        flow,
        req.symptoms.unwrap_or_default(),
        req.mood,
    )?;
    let new_record = NewPeriodRecord {
        date: req.date,
        observation,
        notes: clean_notes(req.notes),
    };
    let record = state
        .db
        .create_period_record(user_id, new_record)
        .await
        .map_err(|e| port_failure("create period record", e))?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    put,
    path = "/api/period-records/{id}",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body = UpdatePeriodRecordRequest,
    responses(
        (status = 200, description = "Record updated", body = PeriodRecordResponse),
        (status = 400, description = "Invalid type, flow or mood"),
        (status = 404, description = "No such record")
    )
)]
pub async fn update_record_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePeriodRecordRequest>,
) -> Result<Json<PeriodRecordResponse>, HandlerError> {
    let current = state
        .db
        .get_period_record(user_id, id)
        .await
        .map_err(|e| port_failure("load period record", e))?;

    let update = PeriodRecordUpdate {
        date: req.date,
        observation: merge_observation(&current.observation, &req)?,
        notes: req.notes.map(|n| clean_notes(Some(n))),
    };
    let record = state
        .db
        .update_period_record(user_id, id, update)
        .await
        .map_err(|e| port_failure("update period record", e))?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/api/period-records/{id}",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record deleted", body = MessageResponse),
        (status = 404, description = "No such record")
    )
)]
pub async fn delete_record_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HandlerError> {
    state
        .db
        .delete_period_record(user_id, id)
        .await
        .map_err(|e| port_failure("delete period record", e))?;
    Ok(Json(MessageResponse::new("Period record deleted")))
}

//=========================================================================================
// Derived Views
//=========================================================================================

/// GET /api/period-records/summary - Cycle statistics and symptom/mood tallies
#[utoipa::path(
    get,
    path = "/api/period-records/summary",
    responses((status = 200, description = "Cycle summary", body = PeriodSummaryResponse))
)]
pub async fn cycle_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<PeriodSummaryResponse>, HandlerError> {
    let records = load_records(&state, user_id).await?;
    Ok(Json(PeriodSummaryResponse {
        summary: compute_cycle_summary(&records).map(Into::into),
        symptoms: compute_symptom_frequencies(&records)
            .into_iter()
            .map(Into::into)
            .collect(),
        moods: compute_mood_frequencies(&records)
            .into_iter()
            .map(Into::into)
            .collect(),
    }))
}

/// GET /api/period-records/calendar - Day categories for one month
#[utoipa::path(
    get,
    path = "/api/period-records/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar month", body = CalendarResponse),
        (status = 400, description = "Invalid year or month")
    )
)]
pub async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, HandlerError> {
    let today = state.clock.today();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let records = load_records(&state, user_id).await?;
    let summary = compute_cycle_summary(&records);
    let days = month_calendar(year, month, &records, summary.as_ref(), today)
        .ok_or_else(|| bad_request(format!("Invalid month {}-{}", year, month)))?;

    Ok(Json(CalendarResponse {
        year,
        month,
        days: days
            .into_iter()
            .map(|d| CalendarDayResponse {
                date: d.date,
                category: d.category.as_str().to_string(),
            })
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{test_state, today};

    fn create(date: &str, record_type: &str) -> CreatePeriodRecordRequest {
        CreatePeriodRecordRequest {
            date: date.parse().unwrap(),
            record_type: record_type.to_string(),
            flow: None,
            symptoms: None,
            mood: None,
            notes: None,
        }
    }

    async fn add(state: &Arc<AppState>, user: Uuid, req: CreatePeriodRecordRequest) -> PeriodRecordResponse {
        let (_, Json(record)) = create_record_handler(State(state.clone()), Extension(user), Json(req))
            .await
            .unwrap();
        record
    }

    #[test]
    fn irrelevant_fields_are_dropped() {
        let obs = build_observation("end", Some(Flow::Heavy), vec!["cramps".into()], Some("calm".into()))
            .unwrap();
        assert_eq!(obs, Observation::End);

        let obs = build_observation("symptom", None, vec![" cramps ".into(), "".into()], None).unwrap();
        assert_eq!(obs, Observation::Symptom { symptoms: vec!["cramps".into()] });
    }

    #[test]
    fn mood_record_needs_a_mood() {
        assert!(build_observation("mood", None, vec![], Some("  ".into())).is_err());
        assert!(build_observation("spotting", None, vec![], None).is_err());
    }

    #[test]
    fn merge_keeps_current_fields_of_the_same_kind() {
        let current = Observation::Start { flow: Some(Flow::Light) };

        let untouched = merge_observation(&current, &UpdatePeriodRecordRequest::default()).unwrap();
        assert_eq!(untouched, None);

        let req = UpdatePeriodRecordRequest {
            notes: Some("n".into()),
            record_type: Some("start".into()),
            ..Default::default()
        };
        assert_eq!(merge_observation(&current, &req).unwrap(), Some(current.clone()));

        let req = UpdatePeriodRecordRequest {
            record_type: Some("end".into()),
            ..Default::default()
        };
        assert_eq!(merge_observation(&current, &req).unwrap(), Some(Observation::End));

        let req = UpdatePeriodRecordRequest {
            flow: Some("gushing".into()),
            ..Default::default()
        };
        assert_eq!(merge_observation(&current, &req).unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn summary_needs_two_starts() {
        let state = test_state();
        let user = Uuid::new_v4();
        add(&state, user, create("2024-01-01", "start")).await;

        let Json(resp) = cycle_summary_handler(State(state.clone()), Extension(user)).await.unwrap();
        assert!(resp.summary.is_none());

        add(&state, user, create("2024-01-29", "start")).await;
        let mut symptom = create("2024-01-30", "symptom");
        symptom.symptoms = Some(vec!["cramps".into(), "headache".into()]);
        add(&state, user, symptom).await;

        let Json(resp) = cycle_summary_handler(State(state), Extension(user)).await.unwrap();
        let summary = resp.summary.unwrap();
        assert_eq!(summary.cycle_length, 28);
        assert_eq!(summary.next_period, "2024-02-26".parse::<NaiveDate>().unwrap());
        assert_eq!(summary.ovulation, "2024-02-12".parse::<NaiveDate>().unwrap());
        assert_eq!(resp.symptoms.len(), 2);
        assert!(resp.moods.is_empty());
    }

    #[tokio::test]
    async fn update_switches_type_and_clears_notes() {
        let state = test_state();
        let user = Uuid::new_v4();
        let mut req = create("2024-02-01", "start");
        req.flow = Some("heavy".into());
        req.notes = Some("first day".into());
        let record = add(&state, user, req).await;
        assert_eq!(record.flow.as_deref(), Some("heavy"));

        let Json(updated) = update_record_handler(
            State(state),
            Extension(user),
            Path(record.id),
            Json(UpdatePeriodRecordRequest {
                record_type: Some("mood".into()),
                mood: Some("calm".into()),
                notes: Some(String::new()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.record_type, "mood");
        assert_eq!(updated.mood.as_deref(), Some("calm"));
        assert_eq!(updated.flow, None);
        assert_eq!(updated.notes, None);
    }

    #[tokio::test]
    async fn calendar_defaults_to_the_current_month() {
        let state = test_state();
        let user = Uuid::new_v4();
        add(&state, user, create("2024-02-14", "start")).await;
        add(&state, user, create("2024-03-13", "start")).await;

        let Json(cal) = calendar_handler(
            State(state.clone()),
            Extension(user),
            Query(CalendarQuery { year: None, month: None }),
        )
        .await
        .unwrap();
        assert_eq!((cal.year, cal.month), (2024, 3));
        assert_eq!(cal.days.len(), 31);

        let category = |d: u32| cal.days[(d - 1) as usize].category.as_str();
        assert_eq!(category(13), "period");
        assert_eq!(category(today().day()), "today");
        assert_eq!(category(1), "none");

        let bad = calendar_handler(
            State(state),
            Extension(user),
            Query(CalendarQuery { year: Some(2024), month: Some(13) }),
        )
        .await
        .unwrap_err();
        assert_eq!(bad.0, StatusCode::BAD_REQUEST);
    }
}
