//! # 식별자 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/identity`          → 저장된 식별자 조회 (없으면 null)
//! - `POST   /api/v1/identity`          → 외부 로그인 후 식별자 기록
//! - `DELETE /api/v1/identity`          → 로그아웃
//! - `PUT    /api/v1/identity/remember` → "로그인 상태 유지" 토글
//!
//! 모든 요청은 `X-Tab-Id` 헤더로 탭을 구분합니다. (없으면 "default")

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppError,
    middleware::TabId,
    models::{IdentityResponse, RememberLoginRequest, SignInRequest},
    routes::AppState,
    services::settings,
};

pub async fn get_identity(
    State(state): State<AppState>,
    TabId(tab): TabId,
) -> Result<Json<IdentityResponse>, AppError> {
    let identity = state.identity.get_identity(&tab).await?;
    Ok(Json(IdentityResponse { identity }))
}

pub async fn sign_in(
    State(state): State<AppState>,
    TabId(tab): TabId,
    Json(req): Json<SignInRequest>,
) -> Result<Json<IdentityResponse>, AppError> {
    let identity = state.identity.remember(&tab, &req.email, req.remember).await?;
    Ok(Json(IdentityResponse {
        identity: Some(identity),
    }))
}

pub async fn sign_out(
    State(state): State<AppState>,
    TabId(tab): TabId,
) -> Result<StatusCode, AppError> {
    state.identity.forget(&tab).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_remember_login(
    State(state): State<AppState>,
    TabId(tab): TabId,
    Json(req): Json<RememberLoginRequest>,
) -> Result<StatusCode, AppError> {
    settings::set_remember_login(&state.identity, &tab, req.enabled).await?;
    Ok(StatusCode::NO_CONTENT)
}
