//! # 날씨 예보 모델
//!
//! 외부 예보 API(`/forecast?q=`)의 3시간 단위 항목과,
//! 그것을 하루 단위로 요약한 결과입니다.

use serde::{Deserialize, Serialize};

/// 예보 API 응답 본문
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

/// 3시간 단위 예보 한 건
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    /// "2024-07-01 12:00:00" 형식
    pub dt_txt: Option<String>,
    pub main: ForecastMain,
    #[serde(default)]
    pub wind: ForecastWind,
    /// 강수 확률 (0.0 ~ 1.0)
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<ForecastCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMain {
    /// 켈빈 온도
    pub temp: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastWind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastCondition {
    pub main: String,
}

/// 최고 기온에 따른 기온 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Cold,
    Cool,
    Mild,
    Warm,
    Hot,
}

impl TemperatureBand {
    /// 최고 기온(°C)으로 구간을 정합니다.
    pub fn from_max_celsius(max: i32) -> Self {
        match max {
            i32::MIN..=10 => TemperatureBand::Cold,
            11..=20 => TemperatureBand::Cool,
            21..=25 => TemperatureBand::Mild,
            26..=30 => TemperatureBand::Warm,
            _ => TemperatureBand::Hot,
        }
    }
}

/// 하루치 예보 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    /// "YYYY-MM-DD"
    pub date: String,
    pub day_number: u32,
    pub temp_min_c: i32,
    pub temp_max_c: i32,
    /// 평균 풍속 (m/s, 소수 첫째 자리)
    pub wind_avg: f64,
    /// 평균 습도 (%)
    pub humidity_avg: i32,
    /// 최대 강수 확률 (%)
    pub precipitation_chance: i32,
    pub condition: Option<String>,
    pub band: TemperatureBand,
}

/// `GET /api/v1/weather` 응답
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub location: String,
    /// 실제로 예보를 찾은 검색어 (후보 중 하나)
    pub resolved_query: String,
    pub days: Vec<DailyForecast>,
}
