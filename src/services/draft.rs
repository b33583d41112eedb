//! # 여행 초안 저장소 (Draft Itinerary Store)
//!
//! 편집 페이지 하나가 소유하는 `DraftSession`과, 그 위의 편집 연산들입니다.
//!
//! ## 상태 흐름
//! ```text
//! load_trip ──▶ DraftSession ──(set_active_day / add / remove / edit / regenerate_days)──┐
//!                    ▲                                                                  │
//!                    └──────────────── mark_synced ◀── save (build_save_payload) ◀──────┘
//! ```
//!
//! 모든 `day` 인자는 1부터 시작하는 일차입니다.
//! 렌더러는 이 상태를 읽기만 하고, 바꾸는 것은 여기 있는 연산들뿐입니다.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::{
    error::AppError,
    models::{
        normalize_calendar_date, ActivityChange, DayDraft, EverydayLocationRow, EverydayRow,
        LocationRow, RemoteActivity, RemoteTrip, SavePayload, TripCreatePayload,
        TripDetailsPayload, TripDraft, TripUpdatePayload, UpdateDetailsRequest, Waypoint,
        WaypointField,
    },
    services::{panel::Panel, sync::TripApi},
};

/// 한 번에 계획할 수 있는 최대 일수
pub const MAX_TRIP_DAYS: u32 = 365;

/// 새로 만드는 여행의 초기 상태
const NEW_TRIP_STATUS: &str = "Planning";

/// `remove_waypoint`의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Removal {
    /// 서버에 있던 항목: 삭제 표시만 하고 다음 저장 때 서버에 알림
    MarkedDeleted,
    /// 아직 저장된 적 없는 항목: 바로 제거
    Dropped,
}

/// 불러온 초안과, 사용자에게 보여줄 경고(있다면)
#[derive(Debug)]
pub struct LoadedDraft {
    pub draft: TripDraft,
    pub notice: Option<String>,
}

/// 편집 페이지 하나의 상태
///
/// 여러 페이지가 같은 초안을 공유하지 않습니다.
/// 레지스트리가 세션마다 Mutex를 씌워 연산을 한 번에 하나씩 실행합니다.
#[derive(Debug, Clone)]
pub struct DraftSession {
    pub draft: TripDraft,
    /// 현재 보고 있는 일차 (1부터)
    pub active_day: u32,
    pub panel: Panel,
    /// 이 초안을 연 사용자 식별자
    pub owner: String,
}

/// 원격 API에서 여행을 불러와 초안을 만듭니다.
///
/// 여행 정보 조회가 실패하면 에러를 돌려주고 아무것도 만들지 않습니다.
/// 일정(itinerary) 조회만 실패하면 빈 일정으로 초안을 만들고 경고를 붙입니다.
pub async fn load_trip(api: &TripApi, trip_id: &str, identity: &str) -> Result<LoadedDraft, AppError> {
    let trip = api.fetch_trip(trip_id, identity).await?;

    let (activities, notice) = match api.fetch_itinerary(trip_id, identity).await {
        Ok(activities) => (activities, None),
        Err(e) => {
            tracing::warn!(trip_id, error = %e, "Itinerary fetch failed, continuing with empty days");
            (
                Vec::new(),
                Some("Trip details loaded, but the itinerary could not be loaded.".to_string()),
            )
        }
    };

    let mut draft = draft_from_remote(&trip, &activities);
    if draft.trip_id.is_none() {
        draft.trip_id = Some(trip_id.to_string());
    }
    Ok(LoadedDraft { draft, notice })
}

/// 원격 여행 정보와 활동 목록으로 초안을 조립합니다.
pub fn draft_from_remote(trip: &RemoteTrip, activities: &[RemoteActivity]) -> TripDraft {
    let start_city = non_blank(trip.start_city.as_deref()).unwrap_or_default();
    let end_city = non_blank(trip.end_city.as_deref()).unwrap_or_default();
    let title = non_blank(trip.title.as_deref())
        .unwrap_or_else(|| TripDraft::default_title(&start_city));

    // day_number가 없으면 1일차로 봅니다. 최대 일수를 넘는 활동은 버립니다.
    let mut grouped: BTreeMap<u32, Vec<&RemoteActivity>> = BTreeMap::new();
    for activity in activities {
        let day = activity.day_number.filter(|d| *d > 0).unwrap_or(1);
        if day > MAX_TRIP_DAYS {
            tracing::warn!(id = %activity.id, day, "Activity is past the last allowed day, skipping");
            continue;
        }
        grouped.entry(day).or_default().push(activity);
    }

    let declared = trip.duration.unwrap_or(1).clamp(1, MAX_TRIP_DAYS);
    let highest = grouped.keys().next_back().copied().unwrap_or(1);
    let duration_days = declared.max(highest);
    if duration_days != declared {
        tracing::warn!(
            declared,
            highest,
            "Itinerary has activities past the trip duration, extending days"
        );
    }

    let fallback_city = if end_city.is_empty() { start_city.clone() } else { end_city.clone() };
    let days = (1..=duration_days)
        .map(|day_number| {
            let day_activities = grouped.get(&day_number).map(Vec::as_slice).unwrap_or(&[]);
            let destination_city = day_activities
                .iter()
                .find_map(|a| non_blank(a.current_city.as_deref()))
                .unwrap_or_else(|| fallback_city.clone());
            let waypoints = day_activities
                .iter()
                .map(|a| {
                    let address = non_blank(a.address.as_deref())
                        .or_else(|| non_blank(a.description.as_deref()))
                        .unwrap_or_default();
                    Waypoint::from_server(a.id.clone(), a.name.clone().unwrap_or_default(), address)
                })
                .collect();
            DayDraft {
                day_number,
                destination_city,
                waypoints,
            }
        })
        .collect();

    TripDraft {
        trip_id: trip.id.clone(),
        title,
        start_city,
        end_city,
        start_date: trip
            .start_date
            .as_deref()
            .and_then(normalize_calendar_date)
            .filter(|date| validate_start_date(*date).is_ok()),
        duration_days,
        days,
        removed_with_days: Vec::new(),
    }
}

/// 최대 일수만큼 이어지는 날짜를 모두 표현할 수 있는 시작일인지 확인합니다.
pub fn validate_start_date(start_date: NaiveDate) -> Result<(), AppError> {
    match start_date.checked_add_days(Days::new(u64::from(MAX_TRIP_DAYS))) {
        Some(_) => Ok(()),
        None => Err(AppError::validation("start_date", "Start date is out of range")),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl DraftSession {
    /// 빈 초안으로 새 세션을 엽니다. (계획 페이지의 첫 단계)
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            draft: TripDraft::empty(),
            active_day: 1,
            panel: Panel::SelectingTrip,
            owner: owner.into(),
        }
    }

    /// 불러온 초안으로 세션을 엽니다. (편집 페이지)
    pub fn from_loaded(draft: TripDraft, owner: impl Into<String>) -> Self {
        Self {
            draft,
            active_day: 1,
            panel: Panel::ItineraryEditing,
            owner: owner.into(),
        }
    }

    fn day_mut(&mut self, day: u32) -> Result<&mut DayDraft, AppError> {
        self.draft.day_mut(day).ok_or(AppError::NotFound)
    }

    /// 현재 일차의 입력 필드를 초안에 반영하고 다른 날로 전환합니다.
    ///
    /// `fields`가 None이면 반영할 것이 없다는 뜻이고, 전환만 합니다.
    pub fn set_active_day(
        &mut self,
        day: u32,
        fields: Option<&[WaypointField]>,
    ) -> Result<(), AppError> {
        if self.draft.day(day).is_none() {
            return Err(AppError::validation(
                "day",
                format!("Day {} is not part of this trip", day),
            ));
        }

        if let Some(fields) = fields {
            let previous = self.active_day;
            if self.draft.day(previous).is_some() {
                self.apply_fields(previous, fields)?;
            }
        }

        self.active_day = day;
        Ok(())
    }

    /// 화면의 입력 필드 목록으로 하루의 waypoint를 다시 만듭니다.
    ///
    /// - id가 일치하는 항목: 이름/주소를 갱신하고, 바뀌었으면 `is_modified`
    /// - 일치하지 않는 필드: 이름이 있으면 새 waypoint, 비어 있으면 무시
    /// - 필드에 없는 항목: 이미 삭제 표시된 것은 그대로 두고,
    ///   서버 항목은 삭제 표시, 로컬 항목은 제거
    pub fn apply_fields(&mut self, day: u32, fields: &[WaypointField]) -> Result<(), AppError> {
        let day = self.day_mut(day)?;
        let mut previous = std::mem::take(&mut day.waypoints);
        let mut rebuilt = Vec::with_capacity(fields.len());

        for field in fields {
            let name = field.name.trim();
            let address = field.address.trim();
            let matched = field.id.as_deref().and_then(|id| {
                previous
                    .iter()
                    .position(|w| w.id == id && !w.is_deleted)
            });

            match matched {
                Some(index) => {
                    let mut waypoint = previous.remove(index);
                    if waypoint.name != name || waypoint.address != address {
                        waypoint.name = name.to_string();
                        waypoint.address = address.to_string();
                        waypoint.is_modified = true;
                    }
                    rebuilt.push(waypoint);
                }
                None if name.is_empty() => {}
                None => rebuilt.push(Waypoint::new_local(name, address)),
            }
        }

        for mut leftover in previous {
            if leftover.is_deleted {
                rebuilt.push(leftover);
            } else if !leftover.is_new {
                leftover.is_deleted = true;
                rebuilt.push(leftover);
            }
        }

        day.waypoints = rebuilt;
        Ok(())
    }

    /// 하루에 새 waypoint를 추가하고 추가된 항목을 돌려줍니다.
    pub fn add_waypoint(&mut self, day: u32, name: &str, address: &str) -> Result<Waypoint, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Activity name is required"));
        }

        let waypoint = Waypoint::new_local(name, address.trim());
        self.day_mut(day)?.waypoints.push(waypoint.clone());
        tracing::debug!(day, id = %waypoint.id, "Waypoint added");
        Ok(waypoint)
    }

    /// waypoint를 지웁니다.
    ///
    /// 한 번도 저장되지 않은 항목(`is_new`)은 바로 제거하고,
    /// 서버에 있는 항목은 삭제 표시만 해서 다음 저장 때 서버에 알립니다.
    pub fn remove_waypoint(&mut self, day: u32, waypoint_id: &str) -> Result<Removal, AppError> {
        let day_draft = self.day_mut(day)?;
        let is_new = day_draft
            .find(waypoint_id)
            .ok_or(AppError::NotFound)?
            .is_new;

        if is_new {
            day_draft.waypoints.retain(|w| w.id != waypoint_id);
            return Ok(Removal::Dropped);
        }
        for waypoint in day_draft.waypoints.iter_mut().filter(|w| w.id == waypoint_id) {
            waypoint.is_deleted = true;
        }
        Ok(Removal::MarkedDeleted)
    }

    /// 이름/주소를 직접 고칩니다. (활동 카드의 편집 버튼)
    pub fn edit_waypoint(
        &mut self,
        day: u32,
        waypoint_id: &str,
        name: Option<&str>,
        address: Option<&str>,
    ) -> Result<Waypoint, AppError> {
        let waypoint = self
            .day_mut(day)?
            .waypoints
            .iter_mut()
            .find(|w| w.id == waypoint_id && !w.is_deleted)
            .ok_or(AppError::NotFound)?;

        if let Some(name) = name.map(str::trim) {
            if name.is_empty() {
                return Err(AppError::validation("name", "Activity name is required"));
            }
            if waypoint.name != name {
                waypoint.name = name.to_string();
                waypoint.is_modified = true;
            }
        }
        if let Some(address) = address.map(str::trim) {
            if waypoint.address != address {
                waypoint.address = address.to_string();
                waypoint.is_modified = true;
            }
        }

        Ok(waypoint.clone())
    }

    /// 여행 일수를 바꿉니다.
    ///
    /// 기존 날은 위치 그대로 유지하고, 늘어난 날은 빈 날로 채웁니다.
    /// 줄일 때 활동이 남아 있는 날이 잘리면 `confirm_truncate` 없이는 거절합니다.
    /// 잘린 날의 서버 항목은 삭제 표시해서 `removed_with_days`에 보관합니다.
    pub fn regenerate_days(
        &mut self,
        count: u32,
        start_date: Option<NaiveDate>,
        confirm_truncate: bool,
    ) -> Result<(), AppError> {
        if count == 0 {
            return Err(AppError::validation("duration", "A trip needs at least one day"));
        }
        if count > MAX_TRIP_DAYS {
            return Err(AppError::validation(
                "duration",
                format!("A trip can be at most {} days", MAX_TRIP_DAYS),
            ));
        }

        if let Some(start_date) = start_date {
            validate_start_date(start_date)?;
        }

        let keep = count as usize;
        if self.draft.days.len() > keep && !confirm_truncate {
            let occupied: Vec<String> = self.draft.days[keep..]
                .iter()
                .filter(|d| d.has_live_waypoints())
                .map(|d| d.day_number.to_string())
                .collect();
            if !occupied.is_empty() {
                return Err(AppError::validation(
                    "duration",
                    format!(
                        "Days {} still have activities. Confirm to remove them.",
                        occupied.join(", ")
                    ),
                ));
            }
        }

        if self.draft.days.len() > keep {
            for day in self.draft.days.drain(keep..) {
                let removed = day
                    .waypoints
                    .into_iter()
                    .filter(|w| !w.is_new)
                    .map(|mut w| {
                        w.is_deleted = true;
                        w
                    });
                self.draft.removed_with_days.extend(removed);
            }
        }

        let fallback_city = if self.draft.end_city.is_empty() {
            self.draft.start_city.clone()
        } else {
            self.draft.end_city.clone()
        };
        for day_number in (self.draft.days.len() as u32 + 1)..=count {
            let mut day = DayDraft::empty(day_number);
            day.destination_city = fallback_city.clone();
            self.draft.days.push(day);
        }

        self.draft.duration_days = count;
        if start_date.is_some() {
            self.draft.start_date = start_date;
        }
        if self.active_day > count || self.active_day == 0 {
            self.active_day = 1;
        }
        Ok(())
    }

    /// 여행 정보 패널의 값을 반영합니다. 보낸 필드만 바뀝니다.
    pub fn update_details(&mut self, request: &UpdateDetailsRequest) -> Result<(), AppError> {
        if let Some(start_date) = request.start_date {
            validate_start_date(start_date)?;
        }
        if let Some(start_city) = request.start_city.as_deref().map(str::trim) {
            if start_city.is_empty() {
                return Err(AppError::validation("start_city", "Start city is required"));
            }
            self.draft.start_city = start_city.to_string();
        }
        if let Some(end_city) = request.end_city.as_deref() {
            self.draft.end_city = end_city.trim().to_string();
        }
        if let Some(title) = request.title.as_deref() {
            self.draft.title = title.trim().to_string();
        }
        if self.draft.title.is_empty() && !self.draft.start_city.is_empty() {
            self.draft.title = TripDraft::default_title(&self.draft.start_city);
        }
        if request.start_date.is_some() {
            self.draft.start_date = request.start_date;
        }
        Ok(())
    }

    fn trip_details(&self, identity: &str) -> Result<TripDetailsPayload, AppError> {
        let draft = &self.draft;
        if draft.start_city.trim().is_empty() {
            return Err(AppError::validation("start_city", "Start city is required"));
        }
        if draft.duration_days == 0 {
            return Err(AppError::validation("duration", "A trip needs at least one day"));
        }

        Ok(TripDetailsPayload {
            id: draft.trip_id.clone(),
            title: if draft.title.is_empty() {
                TripDraft::default_title(&draft.start_city)
            } else {
                draft.title.clone()
            },
            start_city: draft.start_city.clone(),
            end_city: draft.end_city.clone(),
            start_date: draft
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            duration: draft.duration_days,
            user_id: identity.to_string(),
            status: None,
        })
    }

    /// 이미 저장된 여행의 수정 요청을 만듭니다.
    ///
    /// 변경된 항목만 담습니다. 한 번도 저장되지 않은 채 지워진 항목은 보내지 않습니다.
    pub fn build_update_payload(&self, trip_id: &str, identity: &str) -> Result<TripUpdatePayload, AppError> {
        let trip = self.trip_details(identity)?;
        let mut activities = Vec::new();

        for day in &self.draft.days {
            for waypoint in &day.waypoints {
                if waypoint.is_deleted {
                    if waypoint.has_server_id() && !waypoint.is_new {
                        activities.push(ActivityChange::Delete {
                            id: waypoint.id.clone(),
                            deleted: true,
                        });
                    }
                } else if waypoint.is_new || waypoint.is_modified {
                    activities.push(ActivityChange::Upsert {
                        id: waypoint.id.clone(),
                        name: waypoint.name.clone(),
                        description: waypoint.address.clone(),
                        address: waypoint.address.clone(),
                        day_number: day.day_number,
                        is_new: waypoint.is_new,
                        is_modified: waypoint.is_modified,
                    });
                }
            }
        }

        activities.extend(
            self.draft
                .removed_with_days
                .iter()
                .filter(|w| w.has_server_id())
                .map(|w| ActivityChange::Delete {
                    id: w.id.clone(),
                    deleted: true,
                }),
        );

        Ok(TripUpdatePayload {
            trip: TripDetailsPayload {
                id: Some(trip_id.to_string()),
                ..trip
            },
            activities,
        })
    }

    /// 아직 저장된 적 없는 여행의 생성 요청을 만듭니다.
    pub fn build_create_payload(&self, identity: &str) -> Result<TripCreatePayload, AppError> {
        let trip = TripDetailsPayload {
            status: Some(NEW_TRIP_STATUS.to_string()),
            ..self.trip_details(identity)?
        };

        let mut locations = Vec::new();
        let mut everyday = Vec::new();
        let mut everyday_locations = Vec::new();

        for day in &self.draft.days {
            let day_id = format!("day-{}", day.day_number);
            let mut first_stop = None;

            for waypoint in day.live_waypoints() {
                first_stop.get_or_insert_with(|| waypoint.name.clone());
                locations.push(LocationRow {
                    id: waypoint.id.clone(),
                    name: waypoint.name.clone(),
                    address: waypoint.address.clone(),
                });
                everyday_locations.push(EverydayLocationRow {
                    everyday_id: day_id.clone(),
                    location_id: waypoint.id.clone(),
                });
            }

            everyday.push(EverydayRow {
                id: day_id,
                current_city: if day.destination_city.is_empty() {
                    self.draft.start_city.clone()
                } else {
                    day.destination_city.clone()
                },
                day_number: day.day_number,
                start_location: first_stop.unwrap_or_else(|| self.draft.start_city.clone()),
            });
        }

        Ok(TripCreatePayload {
            trip,
            locations,
            everyday,
            everyday_locations,
        })
    }

    /// 저장 요청을 만듭니다. 여행 ID가 있으면 수정, 없으면 생성입니다.
    pub fn build_save_payload(&self, identity: &str) -> Result<SavePayload, AppError> {
        match self.draft.trip_id.as_deref() {
            Some(trip_id) => Ok(SavePayload::Update {
                trip_id: trip_id.to_string(),
                body: self.build_update_payload(trip_id, identity)?,
            }),
            None => Ok(SavePayload::Create(self.build_create_payload(identity)?)),
        }
    }

    /// 저장 성공 후 호출합니다.
    ///
    /// 삭제 표시된 항목을 지우고 `is_new`/`is_modified`를 내립니다.
    /// 임시 ID는 그대로 남습니다. 서버 ID가 필요하면 초안을 다시 불러와야 합니다.
    pub fn mark_synced(&mut self, trip_id: &str) {
        self.draft.trip_id = Some(trip_id.to_string());
        self.draft.removed_with_days.clear();
        for day in &mut self.draft.days {
            day.waypoints.retain(|w| !w.is_deleted);
            for waypoint in &mut day.waypoints {
                waypoint.is_new = false;
                waypoint.is_modified = false;
            }
        }
    }

    /// 저장 후 서버에서 다시 불러온 초안으로 교체합니다.
    /// 보고 있던 일차와 패널 단계는 유지합니다.
    pub fn replace_draft(&mut self, draft: TripDraft) {
        self.draft = draft;
        if self.draft.day(self.active_day).is_none() {
            self.active_day = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn field(id: Option<&str>, name: &str) -> WaypointField {
        WaypointField {
            id: id.map(str::to_string),
            name: name.to_string(),
            address: String::new(),
        }
    }

    fn fields_of(day: &DayDraft) -> Vec<WaypointField> {
        day.live_waypoints()
            .map(|w| WaypointField {
                id: Some(w.id.clone()),
                name: w.name.clone(),
                address: w.address.clone(),
            })
            .collect()
    }

    /// 서버 항목 두 개가 1일차에 있는 2일짜리 여행
    fn loaded_session() -> DraftSession {
        let trip = RemoteTrip {
            id: Some("t1".into()),
            title: None,
            start_city: Some("Paris".into()),
            end_city: Some("Lyon".into()),
            start_date: Some("2024-07-01T00:00:00.000Z".into()),
            duration: Some(2),
            status: None,
        };
        let activities = vec![
            RemoteActivity {
                id: "a1".into(),
                day_number: Some(1),
                name: Some("Louvre".into()),
                address: Some("Rue de Rivoli".into()),
                ..Default::default()
            },
            RemoteActivity {
                id: "a2".into(),
                day_number: Some(1),
                name: Some("Orsay".into()),
                ..Default::default()
            },
        ];
        DraftSession::from_loaded(draft_from_remote(&trip, &activities), "a@example.com")
    }

    #[test]
    fn builds_draft_from_remote_data() {
        let session = loaded_session();
        let draft = &session.draft;

        assert_eq!(draft.title, "Trip to Paris");
        assert_eq!(draft.start_date, Some(date(2024, 7, 1)));
        assert_eq!(draft.duration_days, 2);
        assert_eq!(draft.days.len(), 2);
        assert_eq!(draft.days[0].waypoints.len(), 2);
        assert_eq!(draft.days[1].destination_city, "Lyon");
        assert!(draft.days[0].waypoints.iter().all(|w| !w.is_new));
    }

    #[test]
    fn activities_past_duration_extend_the_trip() {
        let trip = RemoteTrip {
            start_city: Some("Rome".into()),
            duration: Some(1),
            ..Default::default()
        };
        let activities = vec![
            RemoteActivity {
                id: "x".into(),
                day_number: Some(3),
                name: Some("Colosseum".into()),
                current_city: Some("Rome".into()),
                ..Default::default()
            },
            RemoteActivity {
                id: "y".into(),
                day_number: None,
                name: Some("Pantheon".into()),
                ..Default::default()
            },
        ];

        let draft = draft_from_remote(&trip, &activities);
        assert_eq!(draft.duration_days, 3);
        assert_eq!(draft.days.len(), 3);
        assert_eq!(draft.days[0].waypoints[0].name, "Pantheon");
        assert_eq!(draft.days[2].waypoints[0].id, "x");
    }

    #[test]
    fn activities_past_the_day_limit_are_skipped() {
        let trip = RemoteTrip {
            start_city: Some("Rome".into()),
            duration: Some(2),
            ..Default::default()
        };
        let activities = vec![
            RemoteActivity {
                id: "far".into(),
                day_number: Some(100_000),
                name: Some("Nowhere".into()),
                ..Default::default()
            },
            RemoteActivity {
                id: "max".into(),
                day_number: Some(u32::MAX),
                name: Some("Nowhere".into()),
                ..Default::default()
            },
            RemoteActivity {
                id: "ok".into(),
                day_number: Some(2),
                name: Some("Trevi".into()),
                ..Default::default()
            },
        ];

        let draft = draft_from_remote(&trip, &activities);
        assert_eq!(draft.duration_days, 2);
        assert_eq!(draft.days.len(), 2);
        assert_eq!(draft.activity_count(), 1);
        assert_eq!(draft.days[1].waypoints[0].id, "ok");
    }

    #[test]
    fn start_dates_near_the_calendar_limit_are_rejected() {
        let mut session = DraftSession::new("a@example.com");
        let err = session
            .regenerate_days(3, Some(NaiveDate::MAX), false)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "start_date"));
        assert!(session.draft.days.is_empty());

        let err = session
            .update_details(&UpdateDetailsRequest {
                start_date: Some(NaiveDate::MAX - Days::new(10)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "start_date"));
        assert_eq!(session.draft.start_date, None);
    }

    #[test]
    fn added_waypoint_survives_switching_days() {
        let mut session = DraftSession::new("a@example.com");
        session.regenerate_days(3, Some(date(2024, 7, 1)), false).unwrap();

        let added = session.add_waypoint(1, "Eiffel Tower", "").unwrap();
        let visible = fields_of(session.draft.day(1).unwrap());
        session.set_active_day(2, Some(&visible)).unwrap();
        session.set_active_day(1, Some(&[])).unwrap();

        let day = session.draft.day(1).unwrap();
        let waypoint = day.find(&added.id).unwrap();
        assert_eq!(waypoint.name, "Eiffel Tower");
        assert!(waypoint.is_new);
        assert_eq!(session.active_day, 1);
    }

    #[test]
    fn switching_without_fields_flushes_nothing() {
        let mut session = loaded_session();
        session.add_waypoint(1, "Eiffel Tower", "").unwrap();
        session.set_active_day(2, None).unwrap();
        assert_eq!(session.draft.day(1).unwrap().waypoints.len(), 3);
    }

    #[test]
    fn flush_updates_adds_and_marks_missing_server_items() {
        let mut session = loaded_session();
        session.remove_waypoint(1, "a2").unwrap();

        let fields = vec![
            WaypointField {
                id: Some("a1".into()),
                name: "Louvre Museum".into(),
                address: "Rue de Rivoli".into(),
            },
            field(None, "Notre-Dame"),
            field(None, "  "),
        ];
        session.set_active_day(2, Some(&fields)).unwrap();

        let day = session.draft.day(1).unwrap();
        let louvre = day.find("a1").unwrap();
        assert_eq!(louvre.name, "Louvre Museum");
        assert!(louvre.is_modified);
        assert!(day.find("a2").unwrap().is_deleted);
        let names: Vec<&str> = day.live_waypoints().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Louvre Museum", "Notre-Dame"]);

        // 필드에서 빠진 서버 항목은 삭제 표시
        session.set_active_day(1, Some(&[])).unwrap();
        session.set_active_day(2, Some(&[])).unwrap();
        let day = session.draft.day(1).unwrap();
        assert!(day.find("a1").unwrap().is_deleted);
        assert!(!day.has_live_waypoints());
    }

    #[test]
    fn remove_distinguishes_server_and_local_items() {
        let mut session = loaded_session();
        let local = session.add_waypoint(1, "Sainte-Chapelle", "").unwrap();

        assert_eq!(session.remove_waypoint(1, "a1").unwrap(), Removal::MarkedDeleted);
        assert_eq!(session.remove_waypoint(1, &local.id).unwrap(), Removal::Dropped);
        assert!(session.draft.day(1).unwrap().find(&local.id).is_none());
        assert!(session.draft.day(1).unwrap().find("a1").unwrap().is_deleted);
        assert!(matches!(session.remove_waypoint(1, "missing"), Err(AppError::NotFound)));
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut session = loaded_session();
        let err = session.add_waypoint(1, "   ", "somewhere").unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "name"));
        assert!(session.add_waypoint(9, "Louvre", "").is_err());
    }

    #[test]
    fn edit_sets_modified_only_on_change() {
        let mut session = loaded_session();
        let same = session.edit_waypoint(1, "a1", Some("Louvre"), None).unwrap();
        assert!(!same.is_modified);
        let changed = session.edit_waypoint(1, "a1", None, Some("Paris 1er")).unwrap();
        assert!(changed.is_modified);
        assert_eq!(changed.address, "Paris 1er");
    }

    #[test]
    fn regenerate_preserves_days_by_position() {
        let mut session = loaded_session();
        session.regenerate_days(4, None, false).unwrap();

        assert_eq!(session.draft.duration_days, 4);
        assert_eq!(session.draft.days.len(), 4);
        assert_eq!(session.draft.days[0].waypoints.len(), 2);
        assert!(session.draft.days[3].waypoints.is_empty());
        assert_eq!(
            session.draft.days.iter().map(|d| d.day_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(session.draft.start_date, Some(date(2024, 7, 1)));
    }

    #[test]
    fn regenerate_refuses_silent_truncation() {
        let mut session = loaded_session();
        session.regenerate_days(3, None, false).unwrap();
        session.add_waypoint(3, "Lyon old town", "").unwrap();
        session.set_active_day(3, None).unwrap();

        let err = session.regenerate_days(1, None, false).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref message, .. } if message.contains('3')));
        assert_eq!(session.draft.days.len(), 3);

        session.regenerate_days(1, None, true).unwrap();
        assert_eq!(session.draft.days.len(), 1);
        assert_eq!(session.active_day, 1);
        // 잘린 날에 로컬 항목만 있었으므로 보관할 것이 없음
        assert!(session.draft.removed_with_days.is_empty());

        assert!(session.regenerate_days(0, None, true).is_err());
    }

    #[test]
    fn truncated_server_items_are_deleted_on_save() {
        let trip = RemoteTrip {
            id: Some("t2".into()),
            start_city: Some("Rome".into()),
            duration: Some(2),
            ..Default::default()
        };
        let activities = vec![RemoteActivity {
            id: "s9".into(),
            day_number: Some(2),
            name: Some("Vatican".into()),
            ..Default::default()
        }];
        let mut session = DraftSession::from_loaded(draft_from_remote(&trip, &activities), "a@example.com");
        session.regenerate_days(1, None, true).unwrap();

        let payload = session.build_update_payload("t2", "a@example.com").unwrap();
        assert_eq!(
            payload.activities,
            vec![ActivityChange::Delete {
                id: "s9".into(),
                deleted: true
            }]
        );
    }

    #[test]
    fn update_payload_contains_only_changes() {
        let mut session = loaded_session();
        session.remove_waypoint(1, "a2").unwrap();
        let added = session.add_waypoint(2, "Fourvière", "Lyon 5e").unwrap();
        let dropped = session.add_waypoint(2, "Temp", "").unwrap();
        session.remove_waypoint(2, &dropped.id).unwrap();

        let payload = session.build_update_payload("t1", "a@example.com").unwrap();
        assert_eq!(payload.trip.user_id, "a@example.com");
        assert_eq!(payload.activities.len(), 2);
        assert!(payload
            .activities
            .contains(&ActivityChange::Delete { id: "a2".into(), deleted: true }));
        assert!(payload.activities.iter().any(|c| matches!(
            c,
            ActivityChange::Upsert { id, day_number: 2, is_new: true, .. } if *id == added.id
        )));
    }

    #[test]
    fn create_payload_links_days_and_locations() {
        let mut session = DraftSession::new("a@example.com");
        session
            .update_details(&UpdateDetailsRequest {
                start_city: Some("Tokyo".into()),
                ..Default::default()
            })
            .unwrap();
        session.regenerate_days(2, Some(date(2024, 7, 1)), false).unwrap();
        let stop = session.add_waypoint(1, "Senso-ji", "Asakusa").unwrap();

        let SavePayload::Create(payload) = session.build_save_payload("a@example.com").unwrap() else {
            panic!("expected a create payload");
        };
        assert_eq!(payload.trip.title, "Trip to Tokyo");
        assert_eq!(payload.trip.status.as_deref(), Some("Planning"));
        assert_eq!(payload.trip.start_date, "2024-07-01");
        assert_eq!(payload.locations.len(), 1);
        assert_eq!(payload.everyday.len(), 2);
        assert_eq!(payload.everyday[0].start_location, "Senso-ji");
        assert_eq!(payload.everyday[1].start_location, "Tokyo");
        assert_eq!(payload.everyday[1].current_city, "Tokyo");
        assert_eq!(
            payload.everyday_locations,
            vec![EverydayLocationRow {
                everyday_id: "day-1".into(),
                location_id: stop.id,
            }]
        );
    }

    #[test]
    fn save_requires_start_city() {
        let mut session = DraftSession::new("a@example.com");
        session.regenerate_days(1, None, false).unwrap();
        let err = session.build_save_payload("a@example.com").unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "start_city"));
    }

    #[test]
    fn mark_synced_purges_deletions_and_clears_flags() {
        let mut session = loaded_session();
        session.remove_waypoint(1, "a1").unwrap();
        session.add_waypoint(2, "Fourvière", "").unwrap();
        session.mark_synced("t1");

        assert!(session.draft.day(1).unwrap().find("a1").is_none());
        let day2 = session.draft.day(2).unwrap();
        assert!(day2.waypoints.iter().all(|w| !w.is_new && !w.is_modified));
        let payload = session.build_update_payload("t1", "a@example.com").unwrap();
        assert!(payload.activities.is_empty());
    }

    fn trip_router(saved: Arc<Mutex<Option<Value>>>) -> Router {
        Router::new()
            .route(
                "/trips/{id}",
                get(|| async {
                    Json(json!({
                        "statusCode": 200,
                        "body": json!({ "trip": {
                            "id": 5, "title": "", "start_city": "Paris", "end_city": "Nice",
                            "start_date": "2024-07-01 00:00:00", "duration": "3"
                        }}).to_string()
                    }))
                })
                .put(move |Json(body): Json<Value>| {
                    let saved = saved.clone();
                    async move {
                        *saved.lock().unwrap() = Some(body);
                        Json(json!({ "message": "Trip updated" }))
                    }
                }),
            )
            .route(
                "/trips/{id}/itinerary",
                get(|| async {
                    Json(json!({ "activities": [
                        { "id": 11, "day_number": 2, "name": "Promenade", "address": "Nice" }
                    ]}))
                }),
            )
    }

    #[tokio::test]
    async fn load_then_save_round_trips_trip_shape() {
        let saved = Arc::new(Mutex::new(None));
        let base = spawn_stub(trip_router(saved.clone())).await;
        let api = TripApi::new(base, Duration::from_secs(5)).unwrap();

        let loaded = load_trip(&api, "5", "a@example.com").await.unwrap();
        assert!(loaded.notice.is_none());
        let session = DraftSession::from_loaded(loaded.draft, "a@example.com");
        assert_eq!(session.draft.title, "Trip to Paris");

        let payload = session.build_save_payload("a@example.com").unwrap();
        let receipt = api.save_trip(&payload, "a@example.com").await.unwrap();
        assert_eq!(receipt.trip_id, "5");

        let body = saved.lock().unwrap().clone().unwrap();
        assert_eq!(body["trip"]["start_city"], json!("Paris"));
        assert_eq!(body["trip"]["end_city"], json!("Nice"));
        assert_eq!(body["trip"]["duration"], json!(3));
        assert_eq!(body["trip"]["start_date"], json!("2024-07-01"));
        assert_eq!(session.draft.days.len(), 3);
        assert_eq!(body["activities"], json!([]));
    }

    #[tokio::test]
    async fn failed_trip_fetch_produces_no_draft() {
        let router = Router::new().route(
            "/trips/{id}",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))) }),
        );
        let base = spawn_stub(router).await;
        let api = TripApi::new(base, Duration::from_secs(5)).unwrap();

        let err = load_trip(&api, "5", "a@example.com").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Sync(crate::error::SyncError::RemoteCallFailed { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn trip_response_without_a_trip_produces_no_draft() {
        let router = Router::new().route(
            "/trips/{id}",
            get(|| async { Json(json!({ "message": "Trip not found" })) }),
        );
        let base = spawn_stub(router).await;
        let api = TripApi::new(base, Duration::from_secs(5)).unwrap();

        let err = load_trip(&api, "5", "a@example.com").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Sync(crate::error::SyncError::RemoteCallFailed { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn itinerary_failure_still_loads_trip_with_notice() {
        let router = Router::new()
            .route(
                "/trips/{id}",
                get(|| async { Json(json!({ "trip": { "id": "9", "start_city": "Oslo", "duration": 2 } })) }),
            )
            .route(
                "/trips/{id}/itinerary",
                get(|| async {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "db down" })))
                }),
            );
        let base = spawn_stub(router).await;
        let api = TripApi::new(base, Duration::from_secs(5)).unwrap();

        let loaded = load_trip(&api, "9", "a@example.com").await.unwrap();
        assert!(loaded.notice.is_some());
        assert_eq!(loaded.draft.days.len(), 2);
        assert_eq!(loaded.draft.activity_count(), 0);
    }
}
