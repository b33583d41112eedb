//! # 초안 편집 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST   /api/v1/drafts`                                → 빈 초안 열기 (계획 페이지)
//! - `POST   /api/v1/drafts/load/{trip_id}`                 → 저장된 여행으로 초안 열기 (편집 페이지)
//! - `GET    /api/v1/drafts/{id}`                           → 초안 조회
//! - `PATCH  /api/v1/drafts/{id}`                           → 여행 정보 수정
//! - `DELETE /api/v1/drafts/{id}`                           → 초안 닫기
//! - `POST   /api/v1/drafts/{id}/days`                      → 일수 변경
//! - `POST   /api/v1/drafts/{id}/active-day`                → 보고 있는 날 전환
//! - `POST   /api/v1/drafts/{id}/days/{day}/waypoints`      → 활동 추가
//! - `PATCH  /api/v1/drafts/{id}/days/{day}/waypoints/{wid}` → 활동 수정
//! - `DELETE /api/v1/drafts/{id}/days/{day}/waypoints/{wid}` → 활동 삭제
//! - `POST   /api/v1/drafts/{id}/panel`                     → 패널 단계 이동
//! - `POST   /api/v1/drafts/{id}/save`                      → 원격 저장
//! - `GET    /api/v1/drafts/{id}/fragments/...`             → HTML 조각
//!
//! 모든 요청은 로그인이 필요하며, 다른 사용자의 초안은 404로 보입니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::CurrentIdentity,
    models::{
        ActiveDayRequest, AddWaypointRequest, EditWaypointRequest, RegenerateDaysRequest,
        SaveDraftRequest, TripDraft, UpdateDetailsRequest,
    },
    routes::AppState,
    services::{
        draft::{self, DraftSession},
        panel::{Panel, PanelAction},
        render::NoticeKind,
    },
};

/// 초안 응답 본문
#[derive(Debug, Serialize)]
pub struct DraftView {
    pub draft_id: String,
    pub draft: TripDraft,
    pub active_day: u32,
    pub panel: Panel,
}

impl DraftView {
    fn of(draft_id: &str, session: &DraftSession) -> Self {
        Self {
            draft_id: draft_id.to_string(),
            draft: session.draft.clone(),
            active_day: session.active_day,
            panel: session.panel,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PanelRequest {
    pub action: PanelAction,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivitiesQuery {
    pub day: Option<u32>,
}

/// 알림이 있으면 HTML 조각으로도 렌더링해 둡니다.
fn notice_fragment(
    state: &AppState,
    kind: NoticeKind,
    notice: Option<&str>,
) -> Result<Option<String>, AppError> {
    notice
        .map(|message| state.renderer.render_notice(kind, message))
        .transpose()
}

/// 원격 호출 실패에는 에러 알림 조각을 붙입니다. 다른 에러는 그대로 돌려줍니다.
fn with_error_notice(state: &AppState, err: AppError) -> AppError {
    let AppError::Sync(ref sync) = err else {
        return err;
    };
    match state.renderer.render_notice(NoticeKind::Error, &sync.user_message()) {
        Ok(notice_html) => AppError::WithNotice {
            source: Box::new(err),
            notice_html,
        },
        Err(render_err) => {
            tracing::error!(error = %render_err, "Error notice could not be rendered");
            err
        }
    }
}

pub async fn create_draft(
    State(state): State<AppState>,
    user: CurrentIdentity,
) -> Result<(StatusCode, Json<DraftView>), AppError> {
    let session = DraftSession::new(&user.email);
    let view_source = session.clone();
    let id = state.drafts.open(session).await;
    Ok((StatusCode::CREATED, Json(DraftView::of(&id, &view_source))))
}

/// 여행을 불러와 초안을 엽니다. 불러오기에 실패하면 아무것도 등록하지 않습니다.
pub async fn load_draft(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(trip_id): Path<String>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let loaded = draft::load_trip(&state.trip_api, &trip_id, &user.email)
        .await
        .map_err(|e| with_error_notice(&state, e))?;
    let session = DraftSession::from_loaded(loaded.draft, &user.email);
    let view_source = session.clone();
    let id = state.drafts.open(session).await;
    tracing::info!(%trip_id, draft_id = %id, "Trip loaded into draft");

    let notice_html = notice_fragment(&state, NoticeKind::Warning, loaded.notice.as_deref())?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "draft": DraftView::of(&id, &view_source),
            "notice": loaded.notice,
            "notice_html": notice_html,
        })),
    ))
}

pub async fn get_draft(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
) -> Result<Json<DraftView>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let session = session.lock().await;
    Ok(Json(DraftView::of(&id, &session)))
}

pub async fn update_details(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
    Json(req): Json<UpdateDetailsRequest>,
) -> Result<Json<DraftView>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let mut session = session.lock().await;
    session.update_details(&req)?;
    Ok(Json(DraftView::of(&id, &session)))
}

pub async fn close_draft(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.drafts.close(&id, &user.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn regenerate_days(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
    Json(req): Json<RegenerateDaysRequest>,
) -> Result<Json<DraftView>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let mut session = session.lock().await;
    session.regenerate_days(req.count, req.start_date, req.confirm_truncate)?;
    Ok(Json(DraftView::of(&id, &session)))
}

pub async fn set_active_day(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
    Json(req): Json<ActiveDayRequest>,
) -> Result<Json<DraftView>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let mut session = session.lock().await;
    session.set_active_day(req.day, req.fields.as_deref())?;
    Ok(Json(DraftView::of(&id, &session)))
}

pub async fn add_waypoint(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path((id, day)): Path<(String, u32)>,
    Json(req): Json<AddWaypointRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let waypoint = session.lock().await.add_waypoint(day, &req.name, &req.address)?;
    Ok((StatusCode::CREATED, Json(json!({ "waypoint": waypoint }))))
}

pub async fn edit_waypoint(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path((id, day, waypoint_id)): Path<(String, u32, String)>,
    Json(req): Json<EditWaypointRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let waypoint = session.lock().await.edit_waypoint(
        day,
        &waypoint_id,
        req.name.as_deref(),
        req.address.as_deref(),
    )?;
    Ok(Json(json!({ "waypoint": waypoint })))
}

pub async fn remove_waypoint(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path((id, day, waypoint_id)): Path<(String, u32, String)>,
) -> Result<Json<Value>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let removal = session.lock().await.remove_waypoint(day, &waypoint_id)?;
    Ok(Json(json!({ "removal": removal })))
}

pub async fn move_panel(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
    Json(req): Json<PanelRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let mut session = session.lock().await;
    session.panel = session.panel.apply(req.action)?;
    Ok(Json(json!({ "panel": session.panel })))
}

/// 초안을 원격 API에 저장합니다.
///
/// 1. 보고 있는 날의 입력 필드를 먼저 반영
/// 2. 수정/생성 요청을 만들어 한 번 전송
/// 3. 성공하면 서버에서 다시 불러와 서버 ID로 맞춤.
///    다시 불러오기가 실패하면 로컬에서만 동기화 완료 처리
///
/// 저장이 실패하면 초안은 그대로 남아 다시 시도할 수 있습니다.
pub async fn save_draft(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
    Json(req): Json<SaveDraftRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let mut session = session.lock().await;

    if let Some(fields) = req.fields.as_deref() {
        let active = session.active_day;
        if session.draft.day(active).is_none() {
            return Err(AppError::BadRequest(
                "Choose a trip duration before saving activities".to_string(),
            ));
        }
        session.apply_fields(active, fields)?;
    }

    let payload = session.build_save_payload(&user.email)?;
    let receipt = state
        .trip_api
        .save_trip(&payload, &user.email)
        .await
        .map_err(|e| with_error_notice(&state, e.into()))?;

    let notice = match draft::load_trip(&state.trip_api, &receipt.trip_id, &user.email).await {
        Ok(reloaded) if reloaded.notice.is_none() => {
            session.replace_draft(reloaded.draft);
            None
        }
        _ => {
            tracing::warn!(trip_id = %receipt.trip_id, "Saved trip could not be reloaded");
            session.mark_synced(&receipt.trip_id);
            Some("Trip saved, but the latest copy could not be reloaded.".to_string())
        }
    };

    let notice_html = match notice.as_deref() {
        Some(message) => notice_fragment(&state, NoticeKind::Warning, Some(message))?,
        None => notice_fragment(&state, NoticeKind::Success, Some("Trip saved successfully!"))?,
    };

    Ok(Json(json!({
        "trip_id": receipt.trip_id,
        "message": receipt.message,
        "draft": DraftView::of(&id, &session),
        "notice": notice,
        "notice_html": notice_html,
    })))
}

pub async fn day_tabs_fragment(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let session = session.lock().await;
    let html = state.renderer.render_day_tabs(
        &session.draft.days,
        session.draft.start_date,
        session.active_day,
    )?;
    Ok(Html(html))
}

/// `?day=`가 없으면 보고 있는 날을 렌더링합니다.
pub async fn activities_fragment(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Html<String>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let session = session.lock().await;
    let day = session
        .draft
        .day(query.day.unwrap_or(session.active_day))
        .ok_or(AppError::NotFound)?;
    Ok(Html(state.renderer.render_activity_list(day)?))
}

pub async fn summary_fragment(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let session = state.drafts.get(&id, &user.email).await?;
    let session = session.lock().await;
    Ok(Html(state.renderer.render_trip_summary(&session.draft)?))
}
