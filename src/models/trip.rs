//! # 여행 초안(Draft) 모델
//!
//! 편집 중인 여행 한 건을 메모리에 표현하는 구조체들입니다.
//!
//! ## 소유 관계
//! ```text
//! TripDraft 1 ── N DayDraft (day_number 순서, 1부터 연속)
//! DayDraft  1 ── N Waypoint (삽입 순서대로 표시)
//! ```
//! 초안은 편집 세션 하나가 끝나면 사라지며, 여러 초안이 엔티티를 공유하지 않습니다.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// 로컬에서 만든 waypoint의 임시 ID 접두사
///
/// 원격 API는 이 접두사로 시작하는 ID를 "아직 저장되지 않은 항목"으로 취급합니다.
pub const TEMP_ID_PREFIX: &str = "new-";

/// 하루 일정 안의 방문지/활동 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    /// 서버가 부여한 ID, 또는 `new-`로 시작하는 임시 토큰
    pub id: String,
    pub name: String,
    pub address: String,
    /// 로컬에서 추가되어 아직 동기화되지 않음
    pub is_new: bool,
    /// 동기화 이후 이름/주소가 바뀜
    pub is_modified: bool,
    /// 삭제 표시. 다음 동기화가 성공할 때까지 메모리에 남습니다.
    pub is_deleted: bool,
}

impl Waypoint {
    /// 새 임시 ID로 로컬 waypoint를 만듭니다.
    pub fn new_local(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::now_v7()),
            name: name.into(),
            address: address.into(),
            is_new: true,
            is_modified: false,
            is_deleted: false,
        }
    }

    /// 서버에서 읽어온 waypoint
    pub fn from_server(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            is_new: false,
            is_modified: false,
            is_deleted: false,
        }
    }

    /// 서버가 부여한 ID를 가지고 있는지 여부
    pub fn has_server_id(&self) -> bool {
        !self.id.starts_with(TEMP_ID_PREFIX)
    }
}

/// 여행의 하루
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDraft {
    /// 1부터 시작하는 일차
    pub day_number: u32,
    pub destination_city: String,
    pub waypoints: Vec<Waypoint>,
}

impl DayDraft {
    pub fn empty(day_number: u32) -> Self {
        Self {
            day_number,
            destination_city: String::new(),
            waypoints: Vec::new(),
        }
    }

    /// 삭제 표시되지 않은 waypoint (표시 순서)
    pub fn live_waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().filter(|w| !w.is_deleted)
    }

    pub fn has_live_waypoints(&self) -> bool {
        self.live_waypoints().next().is_some()
    }

    pub fn find(&self, waypoint_id: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == waypoint_id)
    }
}

/// 편집 중인 여행 한 건
///
/// 불변식: `days.len() == duration_days`, `days[i].day_number == i + 1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDraft {
    /// 원격 저장소의 여행 ID. 아직 저장된 적이 없으면 None
    pub trip_id: Option<String>,
    pub title: String,
    pub start_city: String,
    pub end_city: String,
    pub start_date: Option<NaiveDate>,
    pub duration_days: u32,
    pub days: Vec<DayDraft>,
    /// 일정을 줄이면서 잘려 나간 날에 있던, 서버 ID를 가진 waypoint들
    /// 삭제를 서버에 알려야 하므로 다음 동기화까지 보관합니다.
    #[serde(default)]
    pub removed_with_days: Vec<Waypoint>,
}

impl TripDraft {
    /// 아무 날도 없는 빈 초안
    pub fn empty() -> Self {
        Self {
            trip_id: None,
            title: String::new(),
            start_city: String::new(),
            end_city: String::new(),
            start_date: None,
            duration_days: 0,
            days: Vec::new(),
            removed_with_days: Vec::new(),
        }
    }

    /// 1부터 시작하는 일차로 하루를 찾습니다.
    pub fn day(&self, day_number: u32) -> Option<&DayDraft> {
        let index = (day_number as usize).checked_sub(1)?;
        self.days.get(index)
    }

    pub fn day_mut(&mut self, day_number: u32) -> Option<&mut DayDraft> {
        let index = (day_number as usize).checked_sub(1)?;
        self.days.get_mut(index)
    }

    /// 삭제 표시되지 않은 활동의 총 개수 (요약 카드에 표시)
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|d| d.live_waypoints().count()).sum()
    }

    /// 제목이 비어 있을 때 쓰는 기본 제목
    pub fn default_title(start_city: &str) -> String {
        format!("Trip to {}", start_city)
    }
}

/// 날짜 문자열에서 시각 부분을 떼어내고 달력 날짜만 남깁니다.
///
/// 원격 API는 `2024-07-01`, `2024-07-01T00:00:00`, `2024-07-01 09:30:00`,
/// `Mon, 01 Jul 2024 00:00:00 GMT` 같은 형식을 섞어서 돌려줍니다.
pub fn normalize_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // "YYYY-MM-DD" 로 시작하는 형식: 앞 10글자만 봅니다.
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.date_naive())
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_time_of_day_from_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 1);
        assert_eq!(normalize_calendar_date("2024-07-01"), expected);
        assert_eq!(normalize_calendar_date("2024-07-01T18:45:00.000Z"), expected);
        assert_eq!(normalize_calendar_date("2024-07-01 09:30:00"), expected);
        assert_eq!(normalize_calendar_date("Mon, 01 Jul 2024 00:00:00 GMT"), expected);
        assert_eq!(normalize_calendar_date("  "), None);
        assert_eq!(normalize_calendar_date("next tuesday"), None);
    }

    #[test]
    fn local_waypoints_use_temporary_ids() {
        let local = Waypoint::new_local("Louvre", "Rue de Rivoli");
        assert!(local.id.starts_with(TEMP_ID_PREFIX));
        assert!(local.is_new);
        assert!(!local.has_server_id());

        let remote = Waypoint::from_server("a1b2", "Louvre", "Rue de Rivoli");
        assert!(remote.has_server_id());
        assert!(!remote.is_new);
    }

    #[test]
    fn activity_count_skips_deleted_waypoints() {
        let mut day = DayDraft::empty(1);
        day.waypoints.push(Waypoint::from_server("1", "A", ""));
        let mut gone = Waypoint::from_server("2", "B", "");
        gone.is_deleted = true;
        day.waypoints.push(gone);

        let mut draft = TripDraft::empty();
        draft.days.push(day);
        draft.duration_days = 1;

        assert_eq!(draft.activity_count(), 1);
        assert!(draft.day(0).is_none());
        assert_eq!(draft.day(1).map(|d| d.day_number), Some(1));
    }
}
