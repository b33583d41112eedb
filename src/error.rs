//! # 에러 처리 모듈
//!
//! 게이트웨이에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 에러는 세 갈래로 나뉩니다:
//! - **인증 필요** (`AuthRequired`): 저장된 사용자 식별자가 없음. 로그인 페이지로 보내야 합니다.
//! - **원격 호출 실패** (`SyncError`): 여행 API나 날씨 API가 2xx가 아니거나 본문을 해석할 수 없음
//! - **검증 실패** (`Validation`): 폼 필드 규칙 위반. 해당 필드 옆에 표시됩니다.
//!
//! `IntoResponse` 구현이 모든 에러를 `{ "error": { "code", "message", ... } }` JSON으로 바꿉니다.
//! 에러는 요청을 시작한 핸들러에서 끝나며, 프로세스를 멈추게 하는 에러는 없습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// 원격 호출(여행 API, 날씨 API) 에러
///
/// 재시도는 하지 않습니다. 한 번 호출하고 실패하면 그대로 돌려주고,
/// 다시 시도할지는 사용자가 결정합니다.
#[derive(Debug, Error)]
pub enum SyncError {
    /// 2xx가 아닌 응답, 또는 해석할 수 없는 응답 본문
    /// `status`는 HTTP 상태 코드(봉투 안의 statusCode가 있으면 그 값)입니다.
    #[error("Remote call failed ({status}): {message}")]
    RemoteCallFailed { status: u16, message: String },

    /// 요청 자체를 보내지 못함 (DNS, 연결 거부, 타임아웃 등)
    /// #[from]: reqwest::Error → SyncError::Transport 자동 변환
    #[error("Remote call could not be completed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SyncError {
    /// 화면에 보여줄 메시지. 전송 실패의 내부 사정은 숨깁니다.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::RemoteCallFailed { message, .. } => message.clone(),
            SyncError::Transport(_) => "The trip service could not be reached".to_string(),
        }
    }

    /// 원격 서버가 돌려준 HTTP 상태 코드 (전송 실패면 None)
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::RemoteCallFailed { status, .. } => Some(*status),
            SyncError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// 게이트웨이의 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 초안/일자/waypoint를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 저장된 사용자 식별자가 없음 (HTTP 401)
    /// 호출한 페이지는 `login_url`로 이동해야 합니다.
    #[error("Authentication required")]
    AuthRequired { login_url: String },

    /// 폼 필드 검증 실패 (HTTP 422)
    /// `field`는 문제가 된 입력 필드 이름입니다. (예: "name", "duration")
    #[error("Validation failed on {field}: {message}")]
    Validation { field: String, message: String },

    /// 원격 호출 실패 (HTTP 502)
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// 지속 저장소(SQLite) 오류 (HTTP 500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTML 조각 렌더링 오류 (HTTP 500)
    #[error("Render error: {0}")]
    Render(#[from] minijinja::Error),

    /// 화면 알림 조각이 붙은 에러
    /// 상태 코드와 본문은 `source`를 따르고, 본문에 `notice_html`이 추가됩니다.
    #[error("{source}")]
    WithNotice {
        source: Box<AppError>,
        notice_html: String,
    },
}

impl AppError {
    /// 검증 실패 에러를 만드는 헬퍼
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// (상태 코드, 에러 코드, 메시지, 추가 필드)
    ///
    /// 내부 에러(Database, Render)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn parts(&self) -> (StatusCode, &'static str, String, Value) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string(), json!({})),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), json!({}))
            }
            AppError::AuthRequired { login_url } => (
                StatusCode::UNAUTHORIZED,
                "auth_required",
                "Please sign in to continue".to_string(),
                json!({ "login_url": login_url }),
            ),
            AppError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                message.clone(),
                json!({ "field": field }),
            ),
            AppError::Sync(e) => {
                // 원격 실패는 사용자에게 알림으로 보여줘야 하므로 메시지를 그대로 전달합니다.
                tracing::warn!("Remote call failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "remote_call_failed",
                    e.user_message(),
                    json!({ "upstream_status": e.status() }),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A storage error occurred".to_string(),
                    json!({}),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "render_error",
                    "A rendering error occurred".to_string(),
                    json!({}),
                )
            }
            AppError::WithNotice {
                source,
                notice_html,
            } => {
                let (status, code, message, mut extra) = source.parts();
                if let Value::Object(fields) = &mut extra {
                    fields.insert("notice_html".to_string(), json!(notice_html));
                }
                (status, code, message, extra)
            }
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    fn into_response(self) -> Response {
        let (status, code, message, extra) = self.parts();

        // 결과: { "error": { "code": "...", "message": "...", ...extra } }
        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let (Some(target), Value::Object(fields)) = (error.as_object_mut(), extra) {
            target.extend(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
