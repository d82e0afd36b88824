//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 모든 금액 계산은 이진 부동소수점 대신 `rust_decimal::Decimal`을 사용합니다.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 보유 수량을 위한 타입.
pub type Quantity = Decimal;

/// 퍼센트 타입 (1.0 = 1%).
pub type Percentage = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 양수인지 확인합니다 (0 제외).
    fn is_positive(&self) -> bool;

    /// 음수인지 확인합니다.
    fn is_negative(&self) -> bool;

    /// 지정된 소수점 자릿수로 반올림합니다 (사사오입).
    fn round_dp_away(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn is_positive(&self) -> bool {
        *self > Decimal::ZERO
    }

    fn is_negative(&self) -> bool {
        *self < Decimal::ZERO
    }

    fn round_dp_away(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sign_checks() {
        // 같은 이름의 inherent 메서드가 트레이트 메서드를 가리므로 명시적으로 호출한다.
        assert!(DecimalExt::is_positive(&dec!(0.01)));
        assert!(!DecimalExt::is_positive(&Decimal::ZERO));
        assert!(DecimalExt::is_negative(&dec!(-3)));
        assert!(!DecimalExt::is_negative(&Decimal::ZERO));
    }

    #[test]
    fn test_round_dp_away() {
        assert_eq!(dec!(1.005).round_dp_away(2), dec!(1.01));
        assert_eq!(dec!(-1.005).round_dp_away(2), dec!(-1.01));
        assert_eq!(dec!(1.6666).round_dp_away(2), dec!(1.67));
    }
}
