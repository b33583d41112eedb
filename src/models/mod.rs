//! # 데이터 모델 모듈
//!
//! 게이트웨이에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `trip`: 편집 중인 여행 초안 (TripDraft, DayDraft, Waypoint)
//! - `draft`: 초안 편집 요청 본문
//! - `remote`: 원격 여행 API의 요청/응답 형태
//! - `weather`: 날씨 예보와 하루 요약
//! - `settings`: 로컬 설정
//! - `identity`: 로그인/로그아웃 요청

pub mod draft;
pub mod identity;
pub mod remote;
pub mod settings;
pub mod trip;
pub mod weather;

pub use draft::*;
pub use identity::*;
pub use remote::*;
pub use settings::*;
pub use trip::*;
pub use weather::*;
