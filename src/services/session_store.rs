//! # 탭 세션 저장소
//!
//! 브라우저의 sessionStorage에 해당하는 메모리 저장소입니다.
//! 탭 ID(`X-Tab-Id` 헤더)마다 키-값 공간이 따로 있으며,
//! 프로세스가 끝나면 함께 사라집니다.
//!
//! 브라우저 탭이 닫혀도 서버는 알 수 없으므로,
//! 오래 쓰이지 않은 탭 공간은 `evict_idle`로 정리합니다.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

#[derive(Debug)]
struct TabSpace {
    items: HashMap<String, String>,
    touched: Instant,
}

impl Default for TabSpace {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            touched: Instant::now(),
        }
    }
}

/// 탭별 키-값 저장소
///
/// 바깥 맵의 키는 탭 ID, 안쪽 맵은 그 탭의 키-값입니다.
#[derive(Debug, Default)]
pub struct SessionStore {
    tabs: RwLock<HashMap<String, TabSpace>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 값을 읽습니다. 읽기도 탭을 사용한 것으로 칩니다.
    pub async fn get(&self, tab: &str, key: &str) -> Option<String> {
        let mut tabs = self.tabs.write().await;
        let space = tabs.get_mut(tab)?;
        space.touched = Instant::now();
        space.items.get(key).cloned()
    }

    pub async fn set(&self, tab: &str, key: &str, value: &str) {
        let mut tabs = self.tabs.write().await;
        let space = tabs.entry(tab.to_string()).or_default();
        space.touched = Instant::now();
        space.items.insert(key.to_string(), value.to_string());
    }

    pub async fn remove(&self, tab: &str, key: &str) -> Option<String> {
        let mut tabs = self.tabs.write().await;
        let removed = tabs.get_mut(tab).and_then(|space| space.items.remove(key));
        // 빈 탭 공간은 정리합니다.
        if tabs.get(tab).is_some_and(|space| space.items.is_empty()) {
            tabs.remove(tab);
        }
        removed
    }

    /// 한 탭의 모든 값을 지웁니다.
    pub async fn clear_tab(&self, tab: &str) {
        self.tabs.write().await.remove(tab);
    }

    /// `max_idle` 이상 쓰이지 않은 탭 공간을 지우고, 지운 개수를 돌려줍니다.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut tabs = self.tabs.write().await;
        let before = tabs.len();
        tabs.retain(|_, space| space.touched.elapsed() < max_idle);
        before - tabs.len()
    }
}
