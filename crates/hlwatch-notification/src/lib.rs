//! # HLWatch Notification
//!
//! 텔레그램 명령 봇과 리포트 포맷팅.
//!
//! # 텔레그램 봇 명령어
//!
//! 봇 명령어 핸들러를 통해 다음 명령어를 지원합니다:
//! - `/open_trades` - 미결제 파생상품 포지션
//! - `/spot` - 현물 보유 현황
//! - `/asset` - 자산 요약
//! - `/help` - 도움말
//!
//! 설정된 채팅 하나에서만 명령을 받으며, 다른 채팅의 명령에는 거부
//! 응답을 보냅니다.

pub mod bot_handler;
pub mod report;
pub mod types;

pub use bot_handler::*;
pub use report::*;
pub use types::*;
