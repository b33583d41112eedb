//! 열려 있는 초안 세션 목록
//!
//! 세션마다 자기 Mutex를 가지므로 서로 다른 초안은 동시에 편집할 수 있고,
//! 한 초안에 대한 연산은 한 번에 하나씩 실행됩니다.
//!
//! 탭을 닫으면 DELETE 요청이 오지 않으므로, 오래 쓰이지 않은 세션은
//! `evict_idle`로 정리합니다. (main에서 주기적으로 호출)

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError},
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{error::AppError, services::draft::DraftSession};

pub type SharedSession = Arc<Mutex<DraftSession>>;

struct Entry {
    owner: String,
    session: SharedSession,
    /// 마지막으로 조회된 시각
    touched: std::sync::Mutex<Instant>,
}

impl Entry {
    fn touch(&self) {
        *self.touched.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }
}

#[derive(Default)]
pub struct DraftRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 세션을 등록하고 새 초안 ID를 돌려줍니다.
    pub async fn open(&self, session: DraftSession) -> String {
        let id = Uuid::now_v7().to_string();
        let entry = Entry {
            owner: session.owner.clone(),
            session: Arc::new(Mutex::new(session)),
            touched: std::sync::Mutex::new(Instant::now()),
        };
        self.sessions.write().await.insert(id.clone(), entry);
        tracing::debug!(draft_id = %id, "Draft session opened");
        id
    }

    /// 초안 세션을 찾습니다. 다른 사용자의 초안은 없는 것으로 취급합니다.
    pub async fn get(&self, id: &str, owner: &str) -> Result<SharedSession, AppError> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(id)
            .filter(|entry| entry.owner == owner)
            .ok_or(AppError::NotFound)?;
        entry.touch();
        Ok(entry.session.clone())
    }

    pub async fn close(&self, id: &str, owner: &str) -> Result<(), AppError> {
        self.get(id, owner).await?;
        self.sessions.write().await.remove(id);
        let remaining = self.open_count().await;
        tracing::debug!(draft_id = %id, remaining, "Draft session closed");
        Ok(())
    }

    /// `max_idle` 이상 조회되지 않은 세션을 지우고, 지운 개수를 돌려줍니다.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle_for() < max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle draft sessions evicted");
        }
        evicted
    }

    pub async fn open_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_private_to_their_owner() {
        let registry = DraftRegistry::new();
        let id = registry.open(DraftSession::new("a@example.com")).await;

        assert!(registry.get(&id, "a@example.com").await.is_ok());
        assert!(matches!(
            registry.get(&id, "b@example.com").await,
            Err(AppError::NotFound)
        ));
        assert!(registry.close(&id, "b@example.com").await.is_err());

        registry.close(&id, "a@example.com").await.unwrap();
        assert_eq!(registry.open_count().await, 0);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_and_used_ones_kept() {
        let registry = DraftRegistry::new();
        let used = registry.open(DraftSession::new("a@example.com")).await;
        let abandoned = registry.open(DraftSession::new("a@example.com")).await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        registry.get(&used, "a@example.com").await.unwrap();

        assert_eq!(registry.evict_idle(Duration::from_millis(40)).await, 1);
        assert!(registry.get(&used, "a@example.com").await.is_ok());
        assert!(matches!(
            registry.get(&abandoned, "a@example.com").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn nothing_is_evicted_within_the_idle_window() {
        let registry = DraftRegistry::new();
        registry.open(DraftSession::new("a@example.com")).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(registry.open_count().await, 1);
    }
}
