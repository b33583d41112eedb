use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    /// true면 지속 저장소, false면 탭 세션 저장소에 기록
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Deserialize)]
pub struct RememberLoginRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub identity: Option<String>,
}
