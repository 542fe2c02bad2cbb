// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db::{ActivityCursor, ActivityQuery};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityInput, EmissionFactors, WeeklyStats};
use crate::services::{aggregation, TipSource};
use crate::time_utils::offset_from_minutes;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Notice shown alongside general (non-personalized) tips.
pub const FALLBACK_NOTICE: &str = "Using general suggestions";

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", post(log_activity).get(get_activities))
        .route("/api/activities/seed", post(seed_activities))
        .route("/api/stats/weekly", get(get_weekly_stats))
        .route("/api/tips", post(get_tips))
        .route("/api/factors", get(get_factors))
}

// ─── Time Zone ───────────────────────────────────────────────

#[derive(Deserialize)]
struct TzQuery {
    /// Client offset from UTC in minutes east (e.g. 60 for UTC+1)
    tz_offset: Option<i32>,
}

impl TzQuery {
    fn offset(&self) -> Result<FixedOffset> {
        let minutes = self.tz_offset.unwrap_or(0);
        offset_from_minutes(minutes).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid 'tz_offset' parameter: {}", minutes))
        })
    }

    fn now(&self) -> Result<DateTime<FixedOffset>> {
        Ok(Utc::now().with_timezone(&self.offset()?))
    }
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogActivityResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub activity: Activity,
}

/// Log a new activity for the current user.
async fn log_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<ActivityInput>, JsonRejection>,
) -> Result<(StatusCode, Json<LogActivityResponse>)> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let activity = state
        .activity_logger
        .log_activity(&user.user_id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(LogActivityResponse { activity })))
}

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Only activities strictly before this instant (RFC3339)
    before: Option<String>,
    /// Opaque position returned as `nextCursor` by the previous page
    cursor: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    50
}

const MAX_LIMIT: u32 = 100;
const CURSOR_PARTS: usize = 3;

fn parse_before_timestamp(before: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    before
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    AppError::BadRequest(
                        "Invalid 'before' parameter: must be RFC3339 datetime".to_string(),
                    )
                })
        })
        .transpose()
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<ActivityCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor = || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            // Document IDs are opaque, so only the first two separators count.
            let parts: Vec<&str> = decoded_str.splitn(CURSOR_PARTS, ':').collect();
            if parts.len() != CURSOR_PARTS || parts[2].is_empty() {
                return Err(invalid_cursor());
            }

            let seconds = parts[0].parse::<i64>().map_err(|_| invalid_cursor())?;
            let nanos = parts[1].parse::<u32>().map_err(|_| invalid_cursor())?;
            let date = DateTime::from_timestamp(seconds, nanos).ok_or_else(invalid_cursor)?;

            Ok(ActivityCursor {
                date,
                id: parts[2].to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(cursor: &ActivityCursor) -> String {
    let payload = format!(
        "{}:{}:{}",
        cursor.date.timestamp(),
        cursor.date.timestamp_subsec_nanos(),
        cursor.id
    );
    URL_SAFE_NO_PAD.encode(payload)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown[]"))]
    pub activities: Vec<Activity>,
    /// Pass as `cursor` to fetch the next page; absent on the last page.
    pub next_cursor: Option<String>,
}

/// Get the user's activity history, newest first.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    params: std::result::Result<Query<ActivitiesQuery>, QueryRejection>,
) -> Result<Json<ActivitiesResponse>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let limit = params.limit.clamp(1, MAX_LIMIT);
    let before = parse_before_timestamp(params.before.as_deref())?;
    let after = parse_cursor(params.cursor.as_deref())?;

    tracing::debug!(
        user_id = %user.user_id,
        before = ?before,
        cursor = ?params.cursor,
        limit,
        "Fetching activities"
    );

    // Fetch one extra item to determine if another page is available.
    let mut activities = state
        .store
        .list_activities(
            &user.user_id,
            ActivityQuery {
                since: None,
                before,
                after,
                limit: Some(limit.saturating_add(1)),
            },
        )
        .await?;

    let has_more = activities.len() > limit as usize;
    if has_more {
        activities.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        activities
            .last()
            .and_then(ActivityCursor::from_activity)
            .map(|cursor| encode_cursor(&cursor))
    } else {
        None
    };

    Ok(Json(ActivitiesResponse {
        activities,
        next_cursor,
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SeedResponse {
    pub count: usize,
}

/// Insert the demo data set for the current user.
async fn seed_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    tz: std::result::Result<Query<TzQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<SeedResponse>)> {
    let Query(tz) = tz.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let now = tz.now()?;
    let today_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(now.timezone()).single())
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Cannot resolve local midnight")))?
        .with_timezone(&Utc);

    let count = state
        .activity_logger
        .seed_activities(&user.user_id, today_start)
        .await?;

    Ok((StatusCode::CREATED, Json(SeedResponse { count })))
}

// ─── Stats ───────────────────────────────────────────────────

/// Days of history loaded for the weekly stats (two windows plus slack for
/// the client's time zone).
const STATS_LOOKBACK_DAYS: i64 = 2 * aggregation::WINDOW_DAYS + 1;

/// Get the weekly dashboard statistics.
async fn get_weekly_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    tz: std::result::Result<Query<TzQuery>, QueryRejection>,
) -> Result<Json<WeeklyStats>> {
    let Query(tz) = tz.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let now = tz.now()?;

    let activities = state
        .store
        .list_activities(
            &user.user_id,
            ActivityQuery {
                since: Some(now.with_timezone(&Utc) - Duration::days(STATS_LOOKBACK_DAYS)),
                ..Default::default()
            },
        )
        .await?;

    let stats = aggregation::aggregate(&activities, &now);

    tracing::debug!(
        user_id = %user.user_id,
        total = stats.total_emissions,
        logs = stats.total_logs,
        "Computed weekly stats"
    );

    Ok(Json(stats))
}

// ─── Tips ────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TipsBody {
    #[serde(default)]
    previous_tips: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TipsApiResponse {
    pub tips: Vec<String>,
    pub from_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Get reduction tips for the user's recent activities.
async fn get_tips(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Option<Json<TipsBody>>,
) -> Result<Json<TipsApiResponse>> {
    let Json(body) = body.unwrap_or_default();

    let activities = state
        .store
        .list_activities(
            &user.user_id,
            ActivityQuery {
                limit: Some(crate::services::tips::DEFAULT_SUMMARY_LIMIT as u32),
                ..Default::default()
            },
        )
        .await?;

    let selection = state
        .tips_service
        .suggest(&activities, &body.previous_tips)
        .await;

    let from_fallback = selection.source == TipSource::General;

    Ok(Json(TipsApiResponse {
        tips: selection.tips,
        from_fallback,
        notice: from_fallback.then(|| FALLBACK_NOTICE.to_string()),
    }))
}

// ─── Factors ─────────────────────────────────────────────────

/// Get the active emission factor table.
async fn get_factors(State(state): State<Arc<AppState>>) -> Result<Json<EmissionFactors>> {
    let factors = state
        .factors
        .get_factors(&state.config.factors_version)
        .await?;

    Ok(Json(factors.as_ref().clone()))
}
