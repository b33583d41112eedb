//! # 원격 여행 API 데이터 타입
//!
//! 원격 여행 관리 API가 주고받는 JSON 형태를 그대로 옮긴 구조체들입니다.
//! 필드 이름은 API 계약을 따르므로 snake_case와 camelCase가 섞여 있습니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /trips/{id}` 응답의 `trip` 객체
///
/// API가 돌려주는 필드 중 초안에 필요한 것만 읽습니다.
/// 모든 필드가 비어 있을 수 있으므로 Option으로 받습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteTrip {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub start_city: Option<String>,
    pub end_city: Option<String>,
    /// 날짜만 오기도 하고 시각이 붙어 오기도 합니다.
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub duration: Option<u32>,
    pub status: Option<String>,
}

impl RemoteTrip {
    /// 초안을 만들 수 있는 여행인지: id나 출발 도시 중 하나는 있어야 합니다.
    pub fn is_usable(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.id) || present(&self.start_city)
    }
}

/// `GET /trips/{id}/itinerary` 응답의 활동 하나
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteActivity {
    #[serde(deserialize_with = "required_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub day_number: Option<u32>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub current_city: Option<String>,
}

/// `GET /trips?user_id=` 응답의 여행 목록 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripListing {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub start_city: Option<String>,
    pub end_city: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub duration: Option<u32>,
    pub status: Option<String>,
}

/// 저장 요청의 `trip` 부분
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDetailsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub start_city: String,
    pub end_city: String,
    /// "YYYY-MM-DD" 또는 빈 문자열
    pub start_date: String,
    pub duration: u32,
    /// 헤더와 별도로 본문에도 식별자를 넣습니다. (API 계약)
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// 기존 여행 수정 요청의 활동 변경 한 건
///
/// `#[serde(untagged)]`: enum 이름 없이 안쪽 필드만 JSON으로 나갑니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityChange {
    /// 서버에 있는 활동 삭제: `{ "id": "...", "_deleted": true }`
    Delete {
        id: String,
        #[serde(rename = "_deleted")]
        deleted: bool,
    },
    /// 새 활동 또는 수정된 활동
    Upsert {
        id: String,
        name: String,
        description: String,
        address: String,
        day_number: u32,
        #[serde(rename = "_new")]
        is_new: bool,
        #[serde(rename = "_modified")]
        is_modified: bool,
    },
}

/// `PUT /trips/{id}` 요청 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripUpdatePayload {
    pub trip: TripDetailsPayload,
    pub activities: Vec<ActivityChange>,
}

/// 새 여행 생성 요청의 장소 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// 새 여행 생성 요청의 하루 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EverydayRow {
    pub id: String,
    pub current_city: String,
    pub day_number: u32,
    pub start_location: String,
}

/// 하루와 장소를 잇는 관계 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EverydayLocationRow {
    pub everyday_id: String,
    pub location_id: String,
}

/// `POST /trips` 요청 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripCreatePayload {
    pub trip: TripDetailsPayload,
    pub locations: Vec<LocationRow>,
    pub everyday: Vec<EverydayRow>,
    pub everyday_locations: Vec<EverydayLocationRow>,
}

/// 저장 요청. 이미 저장된 여행이면 수정, 아니면 생성입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SavePayload {
    Update {
        trip_id: String,
        body: TripUpdatePayload,
    },
    Create(TripCreatePayload),
}

impl SavePayload {
    /// 요청에 담긴 여행 정보
    pub fn trip(&self) -> &TripDetailsPayload {
        match self {
            SavePayload::Update { body, .. } => &body.trip,
            SavePayload::Create(body) => &body.trip,
        }
    }
}

/// 저장 성공 응답에서 꺼낸 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveReceipt {
    pub trip_id: String,
    pub message: Option<String>,
}

/// `PUT /user/preferences` 요청 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesPayload {
    pub weather: String,
    pub environment: String,
    pub activity: String,
}

/// `PUT /user/profile` 요청 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub username: String,
}

/// `GET /routes?trip_id=` 응답의 하루 경로
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_id: Option<String>,
    #[serde(deserialize_with = "required_u32")]
    pub day_number: u32,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub waypoints: Vec<String>,
    /// 인코딩된 경로 polyline (지도 SDK가 해석)
    pub polyline: String,
    /// "db"(캐시) 또는 "generated"
    pub source: Option<String>,
}

// ── 느슨한 역직렬화 헬퍼 ──
// MySQL 백엔드는 ID를 숫자로, 일수를 문자열로 돌려주는 경우가 있어
// 문자열/숫자를 모두 받아들입니다.

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_u32(value: Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    value_to_string(Value::deserialize(deserializer)?)
        .ok_or_else(|| serde::de::Error::custom("expected a string or number id"))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(value_to_u32(Value::deserialize(deserializer)?))
}

fn required_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    value_to_u32(Value::deserialize(deserializer)?)
        .ok_or_else(|| serde::de::Error::custom("expected a day number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numeric_ids_and_string_durations() {
        let trip: RemoteTrip = serde_json::from_value(json!({
            "id": 42,
            "start_city": "Paris",
            "duration": "3"
        }))
        .unwrap();
        assert_eq!(trip.id.as_deref(), Some("42"));
        assert_eq!(trip.duration, Some(3));
        assert!(trip.title.is_none());
    }

    #[test]
    fn activity_changes_serialize_with_underscore_flags() {
        let delete = serde_json::to_value(ActivityChange::Delete {
            id: "a1".into(),
            deleted: true,
        })
        .unwrap();
        assert_eq!(delete, json!({ "id": "a1", "_deleted": true }));

        let upsert = serde_json::to_value(ActivityChange::Upsert {
            id: "new-1".into(),
            name: "Louvre".into(),
            description: "Rue de Rivoli".into(),
            address: "Rue de Rivoli".into(),
            day_number: 2,
            is_new: true,
            is_modified: false,
        })
        .unwrap();
        assert_eq!(upsert["_new"], json!(true));
        assert_eq!(upsert["day_number"], json!(2));
    }
}
