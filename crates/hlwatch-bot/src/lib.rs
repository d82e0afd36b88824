//! Hyperliquid 지갑 감시 텔레그램 봇 바이너리.
//!
//! 이 crate는 독립 실행형 봇 데몬을 제공합니다:
//! - 텔레그램 명령 처리 (/open_trades, /spot, /asset, /help)
//! - Hyperliquid info API 조회 결과를 리포트 메시지로 변환
//! - 단일 채팅 ID 기반 접근 제어

pub mod config;
pub mod error;
pub mod handler;

pub use config::BotConfig;
pub use error::{BotError, Result};
pub use handler::WalletMonitor;
