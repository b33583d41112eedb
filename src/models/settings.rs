//! # 로컬 설정 모델
//!
//! 설정 화면에서 바꾸는 값들입니다. 지속 저장소에 키별로 저장됩니다.

use serde::{Deserialize, Serialize};

/// 지속 저장소에 보관하는 사용자 설정 전체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    /// 선호 날씨 (warm, cold, ...)
    pub weather: String,
    /// 선호 환경 (city, nature, ...)
    pub environment: String,
    /// 선호 활동 (relaxing, adventure, ...)
    pub activity: String,
    pub dark_mode: bool,
    /// small, medium, large
    pub font_size: String,
    pub email_notifications: bool,
    pub browser_notifications: bool,
    pub remember_login: bool,
    pub data_collection: bool,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            weather: "warm".to_string(),
            environment: "city".to_string(),
            activity: "relaxing".to_string(),
            dark_mode: false,
            font_size: "medium".to_string(),
            email_notifications: true,
            browser_notifications: true,
            remember_login: true,
            data_collection: true,
        }
    }
}

/// `PUT /api/v1/settings` 요청 본문. 보낸 필드만 바뀝니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub weather: Option<String>,
    pub environment: Option<String>,
    pub activity: Option<String>,
    pub dark_mode: Option<bool>,
    pub font_size: Option<String>,
    pub email_notifications: Option<bool>,
    pub browser_notifications: Option<bool>,
    pub data_collection: Option<bool>,
}

/// `PUT /api/v1/profile` 요청 본문
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
}
