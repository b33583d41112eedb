//! # 라우트 핸들러 모듈
//!
//! 계획 페이지들이 호출하는 HTTP 핸들러와 공유 상태(`AppState`)를 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `identity`: 로그인/로그아웃, 로그인 상태 유지
//! - `settings`: 로컬 설정, 프로필
//! - `trips`: 여행 목록, 일자별 경로
//! - `weather`: 날씨 예보 요약
//! - `drafts`: 초안 편집, 저장, HTML 조각

pub mod drafts;
pub mod health;
pub mod identity;
pub mod settings;
pub mod trips;
pub mod weather;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use sqlx::SqlitePool;

use crate::services::{
    identity::IdentityHolder, registry::DraftRegistry, render::Renderer, sync::TripApi,
    weather::WeatherClient,
};

pub use health::health_check;

/// 애플리케이션 공유 상태
///
/// 모든 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 필드는 모두 clone이 싼 타입(Pool, Client, Arc)입니다.
#[derive(Clone)]
pub struct AppState {
    /// 지속 저장소 (SQLite)
    pub pool: SqlitePool,
    pub identity: IdentityHolder,
    /// 원격 여행 API
    pub trip_api: TripApi,
    pub weather: WeatherClient,
    pub renderer: Arc<Renderer>,
    /// 열려 있는 초안 세션들
    pub drafts: Arc<DraftRegistry>,
    /// 인증이 필요할 때 안내할 로그인 페이지
    pub login_url: String,
}

/// `/api/v1` 아래에 붙는 라우터
///
/// axum 0.8부터 경로 파라미터는 `{id}` 형식입니다.
pub fn api_router(state: AppState) -> Router {
    let draft_routes = Router::new()
        .route("/drafts", post(drafts::create_draft))
        .route("/drafts/load/{trip_id}", post(drafts::load_draft))
        .route(
            "/drafts/{id}",
            get(drafts::get_draft)
                .patch(drafts::update_details)
                .delete(drafts::close_draft),
        )
        .route("/drafts/{id}/days", post(drafts::regenerate_days))
        .route("/drafts/{id}/active-day", post(drafts::set_active_day))
        .route("/drafts/{id}/days/{day}/waypoints", post(drafts::add_waypoint))
        .route(
            "/drafts/{id}/days/{day}/waypoints/{waypoint_id}",
            patch(drafts::edit_waypoint).delete(drafts::remove_waypoint),
        )
        .route("/drafts/{id}/panel", post(drafts::move_panel))
        .route("/drafts/{id}/save", post(drafts::save_draft))
        .route("/drafts/{id}/fragments/tabs", get(drafts::day_tabs_fragment))
        .route("/drafts/{id}/fragments/activities", get(drafts::activities_fragment))
        .route("/drafts/{id}/fragments/summary", get(drafts::summary_fragment));

    Router::new()
        .merge(draft_routes)
        .route(
            "/identity",
            get(identity::get_identity)
                .post(identity::sign_in)
                .delete(identity::sign_out),
        )
        .route("/identity/remember", put(identity::set_remember_login))
        .route(
            "/settings",
            get(settings::get_settings)
                .put(settings::update_settings)
                .delete(settings::clear_all_data),
        )
        .route("/profile", put(settings::update_profile))
        .route("/trips", get(trips::list_trips))
        .route("/trips/{id}/routes", get(trips::trip_routes))
        .route("/weather", get(weather::forecast))
        .route("/health", get(health_check))
        .with_state(state)
}
