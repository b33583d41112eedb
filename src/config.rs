//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 게이트웨이 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: 지속 저장소(SQLite) 경로
//! - `TRIP_API_URL`: 원격 여행 관리 API의 기본 URL
//! - `WEATHER_API_URL`: 날씨 예보 API의 기본 URL
//! - `WEATHER_API_KEY`: 날씨 예보 API 키
//! - `LOGIN_URL`: 인증이 필요할 때 안내할 로그인 페이지 경로
//! - `REQUEST_TIMEOUT_SECS`: 원격 호출 한 번의 제한 시간(초)
//! - `SESSION_IDLE_MINUTES`: 쓰이지 않은 초안/탭 세션을 정리하기까지의 시간(분)
//! - `FRONTEND_DIST`: 계획 페이지 정적 파일 디렉토리
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호

use std::env;

/// 원격 여행 API 기본값 (페이지에 내장되어 있던 운영 엔드포인트)
const DEFAULT_TRIP_API_URL: &str = "https://af6zo8cu88.execute-api.us-east-2.amazonaws.com/Prod";
/// OpenWeatherMap 2.5 API 기본값
const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5";

// #[derive(Debug, Clone)]: 설정은 서버 시작 시 한 번 읽어 여러 곳에서 복제해 씁니다.
#[derive(Debug, Clone)]
/// 게이트웨이 전체 설정을 담는 구조체
pub struct Config {
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/tripdraft.db?mode=rwc")
    pub database_url: String,
    /// 원격 여행 API 기본 URL (끝의 `/`는 제거된 상태)
    pub trip_api_url: String,
    /// 날씨 예보 API 기본 URL
    pub weather_api_url: String,
    /// 날씨 예보 API 키. 없으면 빈 문자열로 호출합니다.
    pub weather_api_key: String,
    /// 로그인 페이지 경로. 인증 필요 에러 응답에 포함됩니다.
    pub login_url: String,
    /// 원격 호출 제한 시간(초)
    pub request_timeout_secs: u64,
    /// 이 시간(분) 동안 쓰이지 않은 초안 세션과 탭 세션은 정리됩니다.
    pub session_idle_minutes: u64,
    /// 정적 페이지 디렉토리 (선택)
    pub frontend_dist: Option<String>,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러

            // trim_end_matches('/'): "https://x/Prod/" → "https://x/Prod"
            // 경로를 이어붙일 때 `//`가 생기지 않게 합니다.
            trip_api_url: env::var("TRIP_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRIP_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            weather_api_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            weather_api_key: env::var("WEATHER_API_KEY").unwrap_or_default(),
            login_url: env::var("LOGIN_URL").unwrap_or_else(|_| "/login/login.html".to_string()),

            // 숫자 변환 실패 시 기본값 사용
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            session_idle_minutes: env::var("SESSION_IDLE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|minutes| *minutes > 0)
                .unwrap_or(120),

            // .ok(): Result → Option. 설정되지 않았으면 None
            frontend_dist: env::var("FRONTEND_DIST").ok().filter(|v| !v.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }
}
