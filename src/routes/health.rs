//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok" }`
//!
//! 계획 페이지가 게이트웨이가 떠 있는지 확인할 때 씁니다.
//! 원격 여행 API의 상태는 확인하지 않습니다.

use axum::Json;
use serde_json::{json, Value};

/// `GET /health`: 게이트웨이 상태를 확인합니다.
///
/// State도 Extractor도 필요 없는 가장 단순한 핸들러라 실패하지 않습니다.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}
