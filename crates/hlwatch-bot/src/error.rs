//! 에러 타입 정의.

use std::fmt;

use hlwatch_exchange::ExchangeError;

/// 봇 에러 타입
#[derive(Debug)]
pub enum BotError {
    /// 설정 에러
    Config(String),
    /// 거래소 API 에러
    Exchange(ExchangeError),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Exchange(e) => write!(f, "Exchange error: {}", e),
        }
    }
}

impl std::error::Error for BotError {}

impl From<ExchangeError> for BotError {
    fn from(err: ExchangeError) -> Self {
        Self::Exchange(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, BotError>;
