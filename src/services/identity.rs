//! # 세션 식별자 보관소 (Session Identity Holder)
//!
//! 로그인한 사용자의 식별자(실제로는 이메일)를 읽고 씁니다.
//! 식별자는 두 저장 공간 중 하나에 `userEmail` 키로 저장됩니다:
//! - 지속 저장소 (SQLite): "로그인 상태 유지"를 선택한 경우
//! - 탭 세션 저장소 (메모리): 그 탭에서만 유효
//!
//! 읽을 때는 지속 저장소를 먼저 보고, 없으면 탭 세션 저장소를 봅니다.
//! 검증, 갱신, 만료 처리는 없습니다. 인증 자체는 외부 ID 제공자가 담당합니다.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{db, error::AppError, services::session_store::SessionStore};

/// 두 저장 공간에서 공통으로 쓰는 식별자 키
pub const IDENTITY_KEY: &str = "userEmail";

#[derive(Clone)]
pub struct IdentityHolder {
    pool: SqlitePool,
    sessions: Arc<SessionStore>,
}

impl IdentityHolder {
    pub fn new(pool: SqlitePool, sessions: Arc<SessionStore>) -> Self {
        Self { pool, sessions }
    }

    /// 저장된 식별자를 찾습니다. 지속 저장소 → 탭 세션 저장소 순서로,
    /// 비어 있지 않은 첫 번째 값을 돌려줍니다.
    pub async fn get_identity(&self, tab: &str) -> Result<Option<String>, AppError> {
        let durable = db::get_item(&self.pool, IDENTITY_KEY).await?;
        if let Some(identity) = durable.filter(|v| !v.trim().is_empty()) {
            return Ok(Some(identity));
        }

        Ok(self
            .sessions
            .get(tab, IDENTITY_KEY)
            .await
            .filter(|v| !v.trim().is_empty()))
    }

    /// 식별자가 반드시 있어야 하는 작업에서 호출합니다.
    /// 없으면 `AuthRequired`를 돌려주고, 페이지는 `login_url`로 이동합니다.
    pub async fn require_identity(&self, tab: &str, login_url: &str) -> Result<String, AppError> {
        match self.get_identity(tab).await? {
            Some(identity) => Ok(identity),
            None => {
                tracing::debug!(tab, "No identity stored, sign-in required");
                Err(AppError::AuthRequired {
                    login_url: login_url.to_string(),
                })
            }
        }
    }

    /// 외부 인증이 끝난 뒤 식별자를 기록합니다.
    ///
    /// `durable`이 false면 지속 저장소의 이전 값을 지웁니다.
    /// 지속 저장소가 먼저 읽히므로 남겨두면 새 로그인이 가려집니다.
    pub async fn remember(&self, tab: &str, identity: &str, durable: bool) -> Result<String, AppError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(AppError::validation("email", "Email is required"));
        }
        if !identity.contains('@') {
            return Err(AppError::validation("email", "Please enter a valid email address"));
        }

        if durable {
            db::set_item(&self.pool, IDENTITY_KEY, identity).await?;
        } else {
            db::remove_item(&self.pool, IDENTITY_KEY).await?;
            self.sessions.set(tab, IDENTITY_KEY, identity).await;
        }
        tracing::info!(durable, "Identity stored");

        Ok(identity.to_string())
    }

    /// 로그아웃: 두 저장 공간 모두에서 식별자를 지웁니다.
    pub async fn forget(&self, tab: &str) -> Result<(), AppError> {
        db::remove_item(&self.pool, IDENTITY_KEY).await?;
        self.sessions.remove(tab, IDENTITY_KEY).await;
        Ok(())
    }

    /// "로그인 상태 유지"를 끈 경우: 지속 저장소의 식별자를 탭 세션으로 옮깁니다.
    pub async fn demote_to_session(&self, tab: &str) -> Result<(), AppError> {
        if let Some(identity) = db::get_item(&self.pool, IDENTITY_KEY).await? {
            db::remove_item(&self.pool, IDENTITY_KEY).await?;
            self.sessions.set(tab, IDENTITY_KEY, &identity).await;
        }
        Ok(())
    }

    /// "로그인 상태 유지"를 켠 경우: 탭 세션의 식별자를 지속 저장소로 옮깁니다.
    pub async fn promote_to_durable(&self, tab: &str) -> Result<(), AppError> {
        if let Some(identity) = self.sessions.remove(tab, IDENTITY_KEY).await {
            db::set_item(&self.pool, IDENTITY_KEY, &identity).await?;
        }
        Ok(())
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
