//! # 서비스 계층
//!
//! 라우트 핸들러에서 분리한 비즈니스 로직입니다.
//! - `session_store`, `identity`: 식별자 보관 (탭 세션 저장소 + 지속 저장소)
//! - `envelope`, `sync`: 원격 여행 API 호출과 응답 봉투 풀기
//! - `draft`, `registry`, `panel`: 편집 중인 초안과 그 세션들
//! - `render`: HTML 조각 렌더링
//! - `city`, `weather`: 도시 이름 후보와 날씨 예보
//! - `settings`: 로컬 설정

pub mod city;
pub mod draft;
pub mod envelope;
pub mod identity;
pub mod panel;
pub mod registry;
pub mod render;
pub mod session_store;
pub mod settings;
pub mod sync;
pub mod weather;
