//! # HLWatch Core
//!
//! Hyperliquid 지갑 모니터링 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 구성 요소를 제공합니다:
//! - 포지션 / 현물 보유 지표 타입
//! - 포트폴리오 집계 계산
//! - 관대한 숫자 파싱 유틸리티
//! - 로깅 인프라

pub mod domain;
pub mod logging;
pub mod types;

pub use domain::*;
pub use logging::*;
pub use types::*;
