//! Hyperliquid 정보 API 연결 및 지표 계산.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `InfoClient`: 공개 info 엔드포인트 POST 조회 (쿼리별 타임아웃)
//! - `PriceCache`: TTL 기반 마크 가격 스냅샷 캐시 (주입식 시계)
//! - 포지션/현물 지표 계산기 (레코드 단위 에러 격리)

pub mod client;
pub mod error;
pub mod holdings;
pub mod positions;
pub mod price_cache;
pub mod types;

pub use client::*;
pub use error::*;
pub use holdings::*;
pub use positions::*;
pub use price_cache::*;
pub use types::*;
