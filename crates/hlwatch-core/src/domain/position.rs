//! 파생상품 포지션 지표.
//!
//! 이 모듈은 업스트림 계정 상태에서 파생된 포지션 스냅샷 타입을 정의합니다:
//! - `PositionSide` - 포지션 방향
//! - `PositionMetrics` - 포지션별 파생 지표

use crate::types::{DecimalExt, Percentage, Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 포지션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    /// 롱 (size > 0)
    Long,
    /// 숏 (size < 0)
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// 단일 파생상품 포지션의 파생 지표.
///
/// 매 조회마다 새로 계산되는 스냅샷이며 저장되지 않습니다.
/// 불변 조건: `size != 0` (사이즈 0인 입력은 계산 단계에서 제외됩니다).
#[derive(Debug, Clone, Serialize)]
pub struct PositionMetrics {
    /// 코인 심볼
    pub symbol: String,
    /// 부호 있는 포지션 사이즈 (양수 = 롱, 음수 = 숏)
    pub size: Quantity,
    /// 평균 진입 가격
    pub entry_price: Price,
    /// 현재 가격 (마크 가격)
    pub current_price: Price,
    /// 현재 명목 가치 (`|size| × current_price`)
    pub position_value: Decimal,
    /// 진입 시점 명목 가치 (`|size| × entry_price`)
    pub entry_value: Decimal,
    /// 레버리지 (없거나 유효하지 않으면 1.0)
    pub leverage: Decimal,
    /// 사용 중인 마진 (`position_value / leverage`, 레버리지 0이면 0)
    pub margin_used: Decimal,
    /// 청산 가격
    pub liquidation_price: Price,
    /// 미실현 손익
    pub unrealized_pnl: Decimal,
    /// 스냅샷 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl PositionMetrics {
    /// 포지션 방향을 반환합니다.
    pub fn side(&self) -> PositionSide {
        if self.size.is_positive() {
            PositionSide::Long
        } else {
            PositionSide::Short
        }
    }

    /// 진입 가치 대비 손익률(%)을 반환합니다. 진입 가치가 0이면 0입니다.
    pub fn pnl_pct(&self) -> Percentage {
        if self.entry_value.is_zero() {
            return Decimal::ZERO;
        }
        (self.unrealized_pnl / self.entry_value) * Decimal::ONE_HUNDRED
    }

    /// 진입가 대비 현재가 변동률(%)을 반환합니다. 진입가가 0이면 0입니다.
    pub fn price_change_pct(&self) -> Percentage {
        if self.entry_price.is_zero() {
            return Decimal::ZERO;
        }
        ((self.current_price - self.entry_price) / self.entry_price) * Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(size: Decimal) -> PositionMetrics {
        PositionMetrics {
            symbol: "BTC".to_string(),
            size,
            entry_price: dec!(60000),
            current_price: dec!(61000),
            position_value: size.abs() * dec!(61000),
            entry_value: size.abs() * dec!(60000),
            leverage: dec!(2),
            margin_used: size.abs() * dec!(61000) / dec!(2),
            liquidation_price: dec!(50000),
            unrealized_pnl: dec!(1500),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_side_from_size_sign() {
        assert_eq!(sample(dec!(1.5)).side(), PositionSide::Long);
        assert_eq!(sample(dec!(-1.5)).side(), PositionSide::Short);
    }

    #[test]
    fn test_pnl_pct() {
        let pos = sample(dec!(1.5));
        // 1500 / 90000 * 100
        assert_eq!(pos.pnl_pct().round_dp_away(2), dec!(1.67));
    }

    #[test]
    fn test_pnl_pct_zero_entry_value() {
        let mut pos = sample(dec!(1.5));
        pos.entry_value = Decimal::ZERO;
        assert_eq!(pos.pnl_pct(), Decimal::ZERO);
    }

    #[test]
    fn test_price_change_pct_zero_entry() {
        let mut pos = sample(dec!(1));
        pos.entry_price = Decimal::ZERO;
        assert_eq!(pos.price_change_pct(), Decimal::ZERO);
    }

    #[test]
    fn test_side_display() {
        assert_eq!(PositionSide::Long.to_string(), "LONG");
        assert_eq!(PositionSide::Short.to_string(), "SHORT");
    }
}
