//! # 여행 목록/경로 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/trips?upcoming=true` → 사용자의 여행 목록 (upcoming이면 오늘 이후 출발만)
//! - `GET /api/v1/trips/{id}/routes`   → 일자별 경로 (지도 표시용)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::CurrentIdentity,
    models::{normalize_calendar_date, TripListing},
    routes::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct TripListQuery {
    #[serde(default)]
    pub upcoming: bool,
}

/// 시작일이 `today` 이후인 여행만 남깁니다. 시작일을 모르는 여행은 뺍니다.
pub fn upcoming_only(trips: Vec<TripListing>, today: NaiveDate) -> Vec<TripListing> {
    trips
        .into_iter()
        .filter(|trip| {
            trip.start_date
                .as_deref()
                .and_then(normalize_calendar_date)
                .is_some_and(|start| start >= today)
        })
        .collect()
}

pub async fn list_trips(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Query(query): Query<TripListQuery>,
) -> Result<Json<Value>, AppError> {
    let mut trips = state.trip_api.list_trips(&user.email).await?;
    if query.upcoming {
        trips = upcoming_only(trips, Utc::now().date_naive());
    }
    Ok(Json(json!({ "trips": trips })))
}

pub async fn trip_routes(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(trip_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let routes = state.trip_api.fetch_routes(&trip_id, &user.email).await?;
    Ok(Json(json!({ "routes": routes })))
}
