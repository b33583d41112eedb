//! # 날씨 라우트 핸들러
//!
//! - `GET /api/v1/weather?location=&start_date=&days=` → 일자별 예보 요약
//!
//! 예보 API는 5일치까지만 주므로 그 뒤의 날은 결과에서 빠집니다.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

use crate::{error::AppError, models::WeatherReport, routes::AppState};

/// 한 번에 요약하는 최대 일수
const MAX_FORECAST_DAYS: u32 = 16;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub days: Option<u32>,
}

pub async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, AppError> {
    if query.location.trim().is_empty() {
        return Err(AppError::validation("location", "Location is required"));
    }

    let start = query.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let days = query.days.unwrap_or(5).clamp(1, MAX_FORECAST_DAYS);
    if start.checked_add_days(Days::new(u64::from(days))).is_none() {
        return Err(AppError::validation("start_date", "Start date is out of range"));
    }
    let report = state.weather.report(&query.location, start, days).await?;
    Ok(Json(report))
}
