//! 현물 보유 지표.

use crate::types::{Percentage, Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// 현물 잔고의 달러 표시 통화 심볼. 가격은 항상 1.0으로 고정됩니다.
pub const STABLECOIN: &str = "USDC";

/// 단일 현물 보유의 파생 지표.
///
/// 매 조회마다 새로 계산되는 스냅샷이며 저장되지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct SpotHolding {
    /// 코인 심볼
    pub coin: String,
    /// 총 보유 수량
    pub total: Quantity,
    /// 진입 가격 (`entry_notional / total`, total이 0이면 0)
    pub entry_price: Price,
    /// 현재 가격
    pub current_price: Price,
    /// 취득 시점 명목 가치 (USD)
    pub entry_notional: Decimal,
    /// 현재 가치 (`total × current_price`)
    pub current_value: Decimal,
    /// 미실현 손익 (USDC는 항상 0)
    pub unrealized_pnl: Decimal,
    /// 진입 명목 가치 대비 수익률(%) (USDC는 항상 0)
    pub roe: Percentage,
    /// 스냅샷 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl SpotHolding {
    /// 달러 표시 스테이블코인 보유인지 확인합니다.
    pub fn is_stablecoin(&self) -> bool {
        self.coin == STABLECOIN
    }
}
