//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! SQLite와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 게이트웨이가 SQLite에 보관하는 것은 지속 키-값 저장소 하나뿐입니다.
//! 여행 데이터 자체는 원격 API가 소유합니다.

pub mod storage;

pub use storage::*;
