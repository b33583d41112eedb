//! # 초안 편집 요청 모델
//!
//! 편집 페이지가 게이트웨이로 보내는 요청 본문들입니다.
//! 모든 `day`는 1부터 시작하는 일차입니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 화면에 보이는 waypoint 입력 필드 한 줄
///
/// `id`가 초안의 waypoint와 일치하면 그 waypoint를 갱신하고,
/// 없거나 일치하지 않으면 새 waypoint가 됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointField {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// `POST /drafts/{id}/active-day`
#[derive(Debug, Deserialize)]
pub struct ActiveDayRequest {
    pub day: u32,
    /// 떠나는 날의 입력 필드. 생략하면 반영할 것이 없다는 뜻입니다.
    #[serde(default)]
    pub fields: Option<Vec<WaypointField>>,
}

/// `POST /drafts/{id}/days`
#[derive(Debug, Deserialize)]
pub struct RegenerateDaysRequest {
    pub count: u32,
    pub start_date: Option<NaiveDate>,
    /// 활동이 남아 있는 날을 잘라내도 되는지 사용자 확인 여부
    #[serde(default)]
    pub confirm_truncate: bool,
}

/// `POST /drafts/{id}/days/{day}/waypoints`
#[derive(Debug, Deserialize)]
pub struct AddWaypointRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// `PATCH /drafts/{id}/days/{day}/waypoints/{waypoint_id}`
#[derive(Debug, Deserialize)]
pub struct EditWaypointRequest {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// `PATCH /drafts/{id}` (여행 정보 패널)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDetailsRequest {
    pub title: Option<String>,
    pub start_city: Option<String>,
    pub end_city: Option<String>,
    pub start_date: Option<NaiveDate>,
}

/// `POST /drafts/{id}/save`
#[derive(Debug, Default, Deserialize)]
pub struct SaveDraftRequest {
    /// 현재 보고 있는 날의 입력 필드. 저장 전에 먼저 반영됩니다.
    #[serde(default)]
    pub fields: Option<Vec<WaypointField>>,
}
