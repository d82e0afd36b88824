//! 환경변수 기반 설정 모듈.

use std::fmt;

use crate::Result;

/// 봇 전체 설정
#[derive(Clone)]
pub struct BotConfig {
    /// 텔레그램 봇 토큰
    pub telegram_bot_token: String,
    /// 명령을 허용할 채팅 ID
    pub telegram_chat_id: i64,
    /// 감시할 지갑 주소
    pub wallet_address: String,
    /// Hyperliquid API 베이스 URL
    pub api_base_url: String,
    /// 가격 캐시 TTL (초)
    pub price_cache_ttl_secs: u64,
    /// 가격/현물 조회 타임아웃 (초)
    pub info_timeout_secs: u64,
    /// 포지션 조회 타임아웃 (초)
    pub positions_timeout_secs: u64,
}

impl BotConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN").map_err(|_| {
            crate::error::BotError::Config(
                "TELEGRAM_BOT_TOKEN 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        let telegram_chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .map_err(|_| {
                crate::error::BotError::Config(
                    "TELEGRAM_CHAT_ID 환경변수가 설정되지 않았습니다".to_string(),
                )
            })?
            .parse::<i64>()
            .map_err(|_| {
                crate::error::BotError::Config("TELEGRAM_CHAT_ID는 숫자여야 합니다".to_string())
            })?;

        let wallet_address = std::env::var("WALLET_ADDRESS").map_err(|_| {
            crate::error::BotError::Config(
                "WALLET_ADDRESS 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        Ok(Self {
            telegram_bot_token,
            telegram_chat_id,
            wallet_address,
            api_base_url: std::env::var("HYPERLIQUID_API_URL")
                .unwrap_or_else(|_| hlwatch_exchange::DEFAULT_BASE_URL.to_string()),
            price_cache_ttl_secs: env_var_parse("PRICE_CACHE_TTL_SECS", 10),
            info_timeout_secs: env_var_parse("INFO_TIMEOUT_SECS", 5),
            positions_timeout_secs: env_var_parse("POSITIONS_TIMEOUT_SECS", 10),
        })
    }
}

// 봇 토큰이 로그에 남지 않도록 Debug 출력에서 가린다.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_bot_token", &"***")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("wallet_address", &self.wallet_address)
            .field("api_base_url", &self.api_base_url)
            .field("price_cache_ttl_secs", &self.price_cache_ttl_secs)
            .field("info_timeout_secs", &self.info_timeout_secs)
            .field("positions_timeout_secs", &self.positions_timeout_secs)
            .finish()
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
