use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, routes::AppState};

/// Header carrying the page's tab id (partitions the session-scoped store)
pub const TAB_HEADER: &str = "x-tab-id";
pub const DEFAULT_TAB: &str = "default";

#[derive(Debug, Clone)]
pub struct TabId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for TabId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tab = parts
            .headers
            .get(TAB_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_TAB);

        Ok(TabId(tab.to_string()))
    }
}

/// Signed-in user. Rejects with 401 `auth_required` when no identity is stored.
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    pub email: String,
    pub tab: String,
}

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TabId(tab) = TabId::from_request_parts(parts, state).await?;
        let email = state.identity.require_identity(&tab, &state.login_url).await?;

        Ok(CurrentIdentity { email, tab })
    }
}
