//! # 설정 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/settings` → 로컬 설정 조회
//! - `PUT    /api/v1/settings` → 로컬 설정 저장 (여행 취향은 원격 API에도 전달)
//! - `DELETE /api/v1/settings` → 모든 로컬 데이터 지우기 (화면 테마만 유지)
//! - `PUT    /api/v1/profile`  → 사용자 이름 변경 (원격)

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::{CurrentIdentity, TabId},
    models::{ProfilePayload, UpdateProfileRequest, UpdateSettingsRequest},
    routes::AppState,
    services::settings as local_settings,
};

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let settings = local_settings::load_settings(&state.pool).await?;
    Ok(Json(json!({ "settings": settings })))
}

/// 로컬 저장은 항상 먼저 끝납니다.
/// 원격 전달이 실패해도 로컬 값은 유지하고, 응답에 `notice`로 알립니다.
pub async fn update_settings(
    State(state): State<AppState>,
    TabId(tab): TabId,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>, AppError> {
    let settings = local_settings::save_settings(&state.pool, &req).await?;

    let mut preferences_synced = false;
    let mut notice = None;
    if local_settings::touches_preferences(&req) {
        if let Some(identity) = state.identity.get_identity(&tab).await? {
            let payload = local_settings::preferences_payload(&settings);
            match state.trip_api.update_preferences(&payload, &identity).await {
                Ok(_) => preferences_synced = true,
                Err(e) => {
                    tracing::warn!(error = %e, "Preferences saved locally but not remotely");
                    notice = Some(format!("Preferences saved on this device only: {}", e));
                }
            }
        }
    }

    Ok(Json(json!({
        "settings": settings,
        "preferences_synced": preferences_synced,
        "notice": notice,
    })))
}

pub async fn clear_all_data(
    State(state): State<AppState>,
    TabId(tab): TabId,
) -> Result<Json<Value>, AppError> {
    let removed = local_settings::clear_all_data(&state.identity, &tab).await?;
    Ok(Json(json!({ "removed": removed })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentIdentity,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::validation("username", "Username is required"));
    }

    let payload = ProfilePayload {
        username: username.to_string(),
    };
    let updated = state.trip_api.update_profile(&payload, &user.email).await?;
    Ok(Json(json!({ "profile": updated })))
}
