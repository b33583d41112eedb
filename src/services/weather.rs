//! # 날씨 예보 조회
//!
//! 도시 이름으로 5일/3시간 예보를 가져와 여행 일자별로 요약합니다.
//! 도시 이름은 `city::city_candidates` 순서대로 시도하며, 404일 때만 다음 후보로 넘어갑니다.

use std::time::Duration;

use chrono::{Days, NaiveDate};

use crate::{
    error::SyncError,
    models::{DailyForecast, ForecastEntry, ForecastResponse, TemperatureBand, WeatherReport},
    services::{
        city::{city_candidates, extract_city_name, DEFAULT_STRATEGIES},
        envelope::unwrap_provider_response,
    },
};

/// 켈빈 → 섭씨
const KELVIN_OFFSET: f64 = 273.15;

#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// 검색어 하나로 예보를 요청합니다.
    async fn fetch(&self, query: &str) -> Result<Vec<ForecastEntry>, SyncError> {
        let response = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[("q", query), ("appid", self.api_key.as_str())])
            .send()
            .await?;
        let status = response.status().as_u16();
        let raw = response.bytes().await?;
        let value = unwrap_provider_response(status, &raw, None)?;

        let forecast: ForecastResponse =
            serde_json::from_value(value).map_err(|e| SyncError::RemoteCallFailed {
                status,
                message: format!("Unexpected forecast format: {}", e),
            })?;
        Ok(forecast.list)
    }

    /// 후보 검색어를 차례로 시도해 처음 찾은 예보를 돌려줍니다.
    ///
    /// 반환값은 (실제로 찾은 검색어, 예보 목록)입니다.
    pub async fn forecast(&self, location: &str) -> Result<(String, Vec<ForecastEntry>), SyncError> {
        let candidates = city_candidates(location, &DEFAULT_STRATEGIES);

        for query in &candidates {
            match self.fetch(query).await {
                Ok(entries) => return Ok((query.clone(), entries)),
                Err(e) if e.status() == Some(404) => {
                    tracing::debug!(query = %query, "City not found, trying next candidate");
                }
                Err(e) => return Err(e),
            }
        }

        Err(SyncError::RemoteCallFailed {
            status: 404,
            message: format!("No forecast found for \"{}\"", location.trim()),
        })
    }

    /// 예보를 찾아 여행 일자별로 요약합니다.
    pub async fn report(
        &self,
        location: &str,
        start_date: NaiveDate,
        days: u32,
    ) -> Result<WeatherReport, SyncError> {
        let (resolved_query, entries) = self.forecast(location).await?;
        Ok(WeatherReport {
            location: extract_city_name(location),
            resolved_query,
            days: summarize_forecast(&entries, start_date, days),
        })
    }
}

/// 3시간 단위 예보를 하루 단위로 요약합니다.
///
/// 예보 범위 밖이라 항목이 하나도 없는 날은 결과에서 빠집니다.
/// 달력 범위를 넘는 날도 마찬가지입니다.
pub fn summarize_forecast(
    entries: &[ForecastEntry],
    start_date: NaiveDate,
    days: u32,
) -> Vec<DailyForecast> {
    (0..days)
        .filter_map(|offset| {
            let date = start_date.checked_add_days(Days::new(u64::from(offset)))?;
            let key = date.format("%Y-%m-%d").to_string();
            let day: Vec<&ForecastEntry> = entries
                .iter()
                .filter(|e| e.dt_txt.as_deref().is_some_and(|dt| dt.starts_with(&key)))
                .collect();
            if day.is_empty() {
                return None;
            }

            let count = day.len() as f64;
            let temps: Vec<f64> = day.iter().map(|e| e.main.temp - KELVIN_OFFSET).collect();
            let temp_min = temps.iter().copied().fold(f64::INFINITY, f64::min).round() as i32;
            let temp_max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max).round() as i32;
            let wind_avg = (day.iter().map(|e| e.wind.speed).sum::<f64>() / count * 10.0).round() / 10.0;
            let humidity_avg = (day.iter().map(|e| e.main.humidity).sum::<f64>() / count).round() as i32;
            let max_pop = day.iter().map(|e| e.pop).fold(0.0, f64::max);

            Some(DailyForecast {
                date: key,
                day_number: offset + 1,
                temp_min_c: temp_min,
                temp_max_c: temp_max,
                wind_avg,
                humidity_avg,
                precipitation_chance: (max_pop * 100.0).round() as i32,
                condition: day
                    .iter()
                    .find_map(|e| e.weather.first())
                    .map(|c| c.main.clone()),
                band: TemperatureBand::from_max_celsius(temp_max),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn entry(dt: &str, celsius: f64, humidity: f64, wind: f64, pop: f64, main: &str) -> serde_json::Value {
        json!({
            "dt_txt": dt,
            "main": { "temp": celsius + KELVIN_OFFSET, "humidity": humidity },
            "wind": { "speed": wind },
            "pop": pop,
            "weather": [{ "main": main }]
        })
    }

    #[test]
    fn summarizes_each_trip_day() {
        let response: ForecastResponse = serde_json::from_value(json!({
            "list": [
                entry("2024-07-01 09:00:00", 18.0, 50.0, 2.0, 0.1, "Clouds"),
                entry("2024-07-01 15:00:00", 27.6, 70.0, 4.0, 0.45, "Rain"),
                entry("2024-07-02 12:00:00", 5.0, 80.0, 1.0, 0.0, "Clear"),
            ]
        }))
        .unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let days = summarize_forecast(&response.list, start, 3);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-07-01");
        assert_eq!(days[0].temp_min_c, 18);
        assert_eq!(days[0].temp_max_c, 28);
        assert_eq!(days[0].wind_avg, 3.0);
        assert_eq!(days[0].humidity_avg, 60);
        assert_eq!(days[0].precipitation_chance, 45);
        assert_eq!(days[0].condition.as_deref(), Some("Clouds"));
        assert_eq!(days[0].band, TemperatureBand::Warm);
        assert_eq!(days[1].day_number, 2);
        assert_eq!(days[1].band, TemperatureBand::Cold);
    }

    #[test]
    fn days_past_the_calendar_end_are_skipped() {
        let days = summarize_forecast(&[], NaiveDate::MAX, 5);
        assert!(days.is_empty());
    }

    #[test]
    fn temperature_bands_use_inclusive_upper_bounds() {
        assert_eq!(TemperatureBand::from_max_celsius(10), TemperatureBand::Cold);
        assert_eq!(TemperatureBand::from_max_celsius(20), TemperatureBand::Cool);
        assert_eq!(TemperatureBand::from_max_celsius(25), TemperatureBand::Mild);
        assert_eq!(TemperatureBand::from_max_celsius(30), TemperatureBand::Warm);
        assert_eq!(TemperatureBand::from_max_celsius(31), TemperatureBand::Hot);
    }

    #[tokio::test]
    async fn falls_back_to_next_candidate_on_not_found() {
        let router = Router::new().route(
            "/forecast",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                if q.get("q").map(String::as_str) == Some("Paris,France") {
                    Json(json!({ "list": [entry("2024-07-01 12:00:00", 22.0, 40.0, 3.0, 0.0, "Clear")] }))
                        .into_response()
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "cod": "404", "message": "city not found" })))
                        .into_response()
                }
            }),
        );
        let base = spawn_stub(router).await;
        let client = WeatherClient::new(base, "key", Duration::from_secs(5)).unwrap();

        let (query, entries) = client.forecast("Paris, Ile-de-France, France").await.unwrap();
        assert_eq!(query, "Paris,France");
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn other_failures_stop_the_search() {
        let router = Router::new().route(
            "/forecast",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid API key" }))) }),
        );
        let base = spawn_stub(router).await;
        let client = WeatherClient::new(base, "bad", Duration::from_secs(5)).unwrap();

        let err = client.forecast("Paris, France").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn all_candidates_missing_is_not_found() {
        let router = Router::new().route(
            "/forecast",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "message": "city not found" }))) }),
        );
        let base = spawn_stub(router).await;
        let client = WeatherClient::new(base, "key", Duration::from_secs(5)).unwrap();

        let err = client.forecast("Atlantis").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
