//! # 로컬 설정
//!
//! 설정 화면의 값들을 지속 저장소에 키별로 읽고 씁니다.
//! 키 이름은 계획 페이지들이 쓰던 이름(`darkMode`, `fontSize` 등)을 그대로 씁니다.

use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    models::{LocalSettings, PreferencesPayload, UpdateSettingsRequest},
    services::identity::IdentityHolder,
};

const WEATHER: &str = "weather";
const ENVIRONMENT: &str = "environment";
const ACTIVITY: &str = "activity";
const DARK_MODE: &str = "darkMode";
const FONT_SIZE: &str = "fontSize";
const EMAIL_NOTIFICATIONS: &str = "emailNotifications";
const BROWSER_NOTIFICATIONS: &str = "browserNotifications";
const REMEMBER_LOGIN: &str = "rememberLogin";
const DATA_COLLECTION: &str = "dataCollection";

const FONT_SIZES: [&str; 3] = ["small", "medium", "large"];

async fn read_string(pool: &SqlitePool, key: &str, default: String) -> Result<String, AppError> {
    Ok(db::get_item(pool, key)
        .await?
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default))
}

/// "true"/"false" 문자열로 저장됩니다. 알아볼 수 없는 값이면 기본값
async fn read_flag(pool: &SqlitePool, key: &str, default: bool) -> Result<bool, AppError> {
    Ok(db::get_item(pool, key)
        .await?
        .and_then(|v| v.parse().ok())
        .unwrap_or(default))
}

pub async fn load_settings(pool: &SqlitePool) -> Result<LocalSettings, AppError> {
    let defaults = LocalSettings::default();
    Ok(LocalSettings {
        weather: read_string(pool, WEATHER, defaults.weather).await?,
        environment: read_string(pool, ENVIRONMENT, defaults.environment).await?,
        activity: read_string(pool, ACTIVITY, defaults.activity).await?,
        dark_mode: read_flag(pool, DARK_MODE, defaults.dark_mode).await?,
        font_size: read_string(pool, FONT_SIZE, defaults.font_size).await?,
        email_notifications: read_flag(pool, EMAIL_NOTIFICATIONS, defaults.email_notifications)
            .await?,
        browser_notifications: read_flag(
            pool,
            BROWSER_NOTIFICATIONS,
            defaults.browser_notifications,
        )
        .await?,
        remember_login: read_flag(pool, REMEMBER_LOGIN, defaults.remember_login).await?,
        data_collection: read_flag(pool, DATA_COLLECTION, defaults.data_collection).await?,
    })
}

/// 보낸 필드만 저장하고, 저장 후의 전체 설정을 돌려줍니다.
///
/// `remember_login`은 식별자 이동이 따르므로 `set_remember_login`으로만 바꿉니다.
pub async fn save_settings(
    pool: &SqlitePool,
    request: &UpdateSettingsRequest,
) -> Result<LocalSettings, AppError> {
    if let Some(size) = request.font_size.as_deref() {
        if !FONT_SIZES.contains(&size) {
            return Err(AppError::validation(
                "font_size",
                "Font size must be small, medium or large",
            ));
        }
    }

    let strings = [
        (WEATHER, &request.weather),
        (ENVIRONMENT, &request.environment),
        (ACTIVITY, &request.activity),
        (FONT_SIZE, &request.font_size),
    ];
    for (key, value) in strings {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            db::set_item(pool, key, value).await?;
        }
    }

    let flags = [
        (DARK_MODE, request.dark_mode),
        (EMAIL_NOTIFICATIONS, request.email_notifications),
        (BROWSER_NOTIFICATIONS, request.browser_notifications),
        (DATA_COLLECTION, request.data_collection),
    ];
    for (key, value) in flags {
        if let Some(value) = value {
            db::set_item(pool, key, &value.to_string()).await?;
        }
    }

    load_settings(pool).await
}

/// 요청에 여행 취향 필드가 하나라도 있는지
pub fn touches_preferences(request: &UpdateSettingsRequest) -> bool {
    request.weather.is_some() || request.environment.is_some() || request.activity.is_some()
}

/// 원격 API로 보낼 여행 취향
pub fn preferences_payload(settings: &LocalSettings) -> PreferencesPayload {
    PreferencesPayload {
        weather: settings.weather.clone(),
        environment: settings.environment.clone(),
        activity: settings.activity.clone(),
    }
}

/// "로그인 상태 유지" 토글
///
/// 끄면 지속 저장소의 식별자를 이 탭의 세션 저장소로 옮기고,
/// 켜면 반대로 옮깁니다.
pub async fn set_remember_login(
    identity: &IdentityHolder,
    tab: &str,
    enabled: bool,
) -> Result<(), AppError> {
    db::set_item(identity.pool(), REMEMBER_LOGIN, &enabled.to_string()).await?;
    if enabled {
        identity.promote_to_durable(tab).await
    } else {
        identity.demote_to_session(tab).await
    }
}

/// "모든 데이터 지우기"
///
/// 두 저장 공간을 모두 비우지만 화면 테마(`darkMode`)는 남깁니다.
/// 식별자도 지워지므로 이후 요청은 다시 로그인해야 합니다.
pub async fn clear_all_data(identity: &IdentityHolder, tab: &str) -> Result<u64, AppError> {
    let removed = db::clear_items_except(identity.pool(), &[DARK_MODE]).await?;
    identity.sessions().clear_tab(tab).await;
    tracing::info!(removed, "Local data cleared");
    Ok(removed)
}
