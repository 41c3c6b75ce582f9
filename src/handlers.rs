use crate::errors::{AppError, StorageError};
use crate::models::{
    ApiResponse, CheckinRecord, CheckinRequest, CheckinStore, CheckinUpdate, HealthResponse,
    RetroactiveCheckinRequest, StatsResponse, TOTAL_DAYS,
};
use crate::state::AppState;
use crate::stats::build_stats;
use crate::ui::render_index;
use axum::{extract::State, response::Html, Json};
use chrono::Local;
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let store = load_store(&state, "failed to load check-in data").await?;
    Ok(Html(render_index(&store, &build_stats(&store))))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: now_iso(),
    })
}

pub async fn get_checkins(State(state): State<AppState>) -> Result<Json<ApiResponse>, AppError> {
    let store = load_store(&state, "failed to load check-in data").await?;
    Ok(Json(ApiResponse::with_data(store, "check-in data loaded")))
}

pub async fn add_checkin(
    State(state): State<AppState>,
    Json(payload): Json<CheckinRequest>,
) -> Result<Json<ApiResponse>, AppError> {
    let mut store = load_store(&state, "check-in failed").await?;
    if store.contains_key(&payload.date) {
        return Err(AppError::bad_request(format!(
            "day {} is already checked in",
            payload.date
        )));
    }

    insert_record(&mut store, payload.date.clone(), payload.timestamp, None)
        .map_err(|err| AppError::storage("check-in failed", err))?;
    save_store(&state, &store, "check-in failed").await?;

    info!(date = %payload.date, "checked in");
    Ok(Json(ApiResponse::with_data(store, "checked in")))
}

pub async fn replace_checkins(
    State(state): State<AppState>,
    Json(payload): Json<CheckinUpdate>,
) -> Result<Json<ApiResponse>, AppError> {
    save_store(&state, &payload.data, "failed to update check-in data").await?;

    info!(records = payload.data.len(), "check-in data replaced");
    Ok(Json(ApiResponse::message("check-in data updated")))
}

pub async fn reset_checkins(State(state): State<AppState>) -> Result<Json<ApiResponse>, AppError> {
    save_store(&state, &CheckinStore::new(), "failed to reset check-in data").await?;

    info!("check-in data reset");
    Ok(Json(ApiResponse::message("check-in data reset")))
}

pub async fn retroactive_checkin(
    State(state): State<AppState>,
    Json(payload): Json<RetroactiveCheckinRequest>,
) -> Result<Json<ApiResponse>, AppError> {
    if !state.config.password_matches(&payload.password) {
        warn!(date = %payload.date, "retroactive check-in refused: wrong password");
        return Err(AppError::unauthorized(
            "incorrect password, retroactive check-in not allowed",
        ));
    }

    let mut store = load_store(&state, "retroactive check-in failed").await?;
    if store.contains_key(&payload.date) {
        return Err(AppError::bad_request(format!(
            "day {} is already checked in",
            payload.date
        )));
    }
    let day = parse_day(&payload.date)?;

    insert_record(&mut store, payload.date.clone(), payload.timestamp, Some(true))
        .map_err(|err| AppError::storage("retroactive check-in failed", err))?;
    save_store(&state, &store, "retroactive check-in failed").await?;

    info!(day, "retroactive check-in recorded");
    Ok(Json(ApiResponse::with_data(
        store,
        format!("day {day} retroactively checked in"),
    )))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let store = load_store(&state, "failed to compute stats").await?;
    Ok(Json(StatsResponse {
        success: true,
        stats: build_stats(&store),
    }))
}

async fn load_store(state: &AppState, context: &str) -> Result<CheckinStore, AppError> {
    state
        .storage
        .load()
        .await
        .map_err(|err| AppError::storage(context, err))
}

async fn save_store(state: &AppState, store: &CheckinStore, context: &str) -> Result<(), AppError> {
    state
        .storage
        .save(store)
        .await
        .map_err(|err| AppError::storage(context, err))
}

fn insert_record(
    store: &mut CheckinStore,
    date: String,
    timestamp: i64,
    retroactive: Option<bool>,
) -> Result<(), StorageError> {
    let record = CheckinRecord {
        date: date.clone(),
        timestamp,
        created_at: now_iso(),
        is_retroactive: retroactive,
    };
    store.insert(date, record.to_value()?);
    Ok(())
}

fn parse_day(date: &str) -> Result<u32, AppError> {
    let day: i64 = date
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request(format!("invalid day {date:?}, expected a number")))?;
    if !(1..=i64::from(TOTAL_DAYS)).contains(&day) {
        return Err(AppError::bad_request(format!(
            "day out of range, only days 1-{TOTAL_DAYS} can be checked in"
        )));
    }
    Ok(day as u32)
}

fn now_iso() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
