//! 공통 유틸리티 모듈
//!
//! 표시 형식 변환과 입력 검증 함수를 포함합니다.

pub mod formatting;
pub mod validation;

pub use formatting::*;
pub use validation::*;
