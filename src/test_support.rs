//! 테스트 공용 도우미

use axum::Router;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// 마이그레이션을 적용한 메모리 SQLite 풀
///
/// 메모리 DB는 연결마다 따로 생기므로 연결을 하나로 제한합니다.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// 원격 API를 흉내 내는 서버를 띄우고 기본 URL을 돌려줍니다.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
