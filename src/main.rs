//! # tripdraft 게이트웨이 진입점
//!
//! 이 파일은 여행 일정 초안 게이트웨이의 **시작점(entry point)**입니다.
//! 계획/편집 페이지는 이 게이트웨이를 통해 초안을 편집하고,
//! 게이트웨이가 원격 여행 API와 날씨 API를 대신 호출합니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 지속 저장소(SQLite) 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. 원격 API 클라이언트와 렌더러 준비
//! 6. 유휴 세션 정리 작업 시작
//! 7. API 라우터 설정
//! 8. HTTP 서버 시작

// ── 모듈 선언 ──
// Rust에서는 파일 시스템 구조가 곧 모듈 구조입니다.
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

// 테스트에서만 컴파일되는 공용 도우미 (메모리 DB, 가짜 원격 서버)
#[cfg(test)]
mod test_support;

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use axum::Router;
use config::Config;
use routes::AppState;
use services::{
    identity::IdentityHolder, registry::DraftRegistry, render::Renderer,
    session_store::SessionStore, sync::TripApi, weather::WeatherClient,
};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},          // CORS(Cross-Origin Resource Sharing) 설정
    services::{ServeDir, ServeFile}, // 정적 페이지 서빙
    trace::TraceLayer,               // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// #[tokio::main]: 비동기 런타임(Tokio)을 만들고 main을 그 안에서 실행합니다.
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 게이트웨이, tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripdraft=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting tripdraft gateway on {}:{}", config.host, config.port);
    tracing::info!("Trip API: {}", config.trip_api_url);

    // ── 4단계: 지속 저장소 연결 풀 생성 ──
    // 브라우저 localStorage에 해당하는 키-값 테이블 하나만 씁니다.
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    // sqlx::migrate!는 컴파일 타임에 ./migrations 폴더의 SQL 파일들을 포함시킵니다.
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 원격 API 클라이언트와 렌더러 ──
    // 원격 호출은 한 번만 시도하고, 제한 시간을 넘기면 실패로 처리합니다.
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let trip_api = TripApi::new(config.trip_api_url.clone(), timeout)?;
    let weather = WeatherClient::new(
        config.weather_api_url.clone(),
        config.weather_api_key.clone(),
        timeout,
    )?;
    if config.weather_api_key.is_empty() {
        tracing::warn!("WEATHER_API_KEY is not set, forecast lookups will be rejected");
    }

    // ── 7단계: 애플리케이션 상태(State) 생성 ──
    // 탭 세션 저장소는 메모리에만 있으므로 재시작하면 비워집니다.
    let tab_sessions = Arc::new(SessionStore::new());
    let drafts = Arc::new(DraftRegistry::new());
    let state = AppState {
        identity: IdentityHolder::new(pool.clone(), tab_sessions.clone()),
        pool,
        trip_api,
        weather,
        renderer: Arc::new(Renderer::new()?),
        drafts: drafts.clone(),
        login_url: config.login_url.clone(),
    };

    // ── 8단계: 유휴 세션 정리 ──
    // 닫힌 탭은 알려주지 않으므로, 오래 쓰이지 않은 초안과 탭 세션을 주기적으로 지웁니다.
    let max_idle = Duration::from_secs(config.session_idle_minutes * 60);
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(max_idle / 4);
        loop {
            sweep.tick().await;
            drafts.evict_idle(max_idle).await;
            let tabs = tab_sessions.evict_idle(max_idle).await;
            if tabs > 0 {
                tracing::debug!(tabs, "Idle tab sessions evicted");
            }
        }
    });

    // ── 9단계: CORS 미들웨어 설정 ──
    // 계획 페이지는 다른 출처에서 열릴 수 있으므로 모두 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 10단계: 라우터 조립 ──
    // API는 /api/v1 아래에 두고, 정적 페이지 디렉토리가 있으면 나머지 경로를 그쪽으로 보냅니다.
    let api_routes = routes::api_router(state);
    let static_dir = config
        .frontend_dist
        .as_deref()
        .filter(|dir| Path::new(dir).exists());

    let app = match static_dir {
        Some(dir) => {
            tracing::info!("Serving planning pages from {}", dir);
            let serve_dir = ServeDir::new(dir)
                .not_found_service(ServeFile::new(Path::new(dir).join("index.html")));

            Router::new()
                .nest("/api/v1", api_routes)
                .fallback_service(serve_dir)
                .layer(cors)
                .layer(TraceLayer::new_for_http())
        }
        None => {
            tracing::warn!("FRONTEND_DIST not set or missing, serving API only");

            Router::new()
                .nest("/api/v1", api_routes)
                .layer(cors)
                .layer(TraceLayer::new_for_http())
        }
    };

    // ── 11단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
