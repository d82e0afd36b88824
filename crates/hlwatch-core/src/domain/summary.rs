//! 포트폴리오 집계 계산.
//!
//! 이미 계산된 포지션/현물 지표를 계좌 단위 요약으로 결합합니다.
//! 핵심 규칙:
//! - 파생상품 현재 가치 = Σ진입 가치 + Σ손익
//! - 파생상품 총자산 = 출금 가능 금액 + Σ마진 + Σ손익
//! - 출금 가능 금액이 미상이면 (조회 실패) 0으로 대체하지 않고 `None`을
//!   전파합니다. 파생되는 총자산 역시 `None`이 됩니다.

use rust_decimal::Decimal;
use serde::Serialize;

use super::holding::SpotHolding;
use super::position::PositionMetrics;
use crate::types::Percentage;

/// 계좌 단위 포트폴리오 요약.
///
/// 요청마다 새로 집계되는 일회성 구조체입니다.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    /// 포지션 진입 명목 가치 합
    pub perps_entry_value: Decimal,
    /// 포지션 미실현 손익 합
    pub perps_pnl: Decimal,
    /// 현재 포지션 명목 가치 (진입 가치 + 손익)
    pub perps_current_value: Decimal,
    /// 사용 중인 마진 합
    pub perps_margin_used: Decimal,
    /// 마진 사용률(%) (현재 가치가 0 이하이면 0)
    pub perps_margin_pct: Percentage,
    /// 출금 가능 금액 (조회 실패 시 None)
    pub withdrawable: Option<Decimal>,
    /// 파생상품 계좌 총자산 (출금 가능 금액이 미상이면 None)
    pub total_perps_equity: Option<Decimal>,
    /// 현물 총 가치
    pub spot_total_value: Decimal,
    /// USDC 보유 가치
    pub spot_usdc_value: Decimal,
    /// USDC 제외 현물 가치
    pub spot_non_usdc_value: Decimal,
    /// 현물 미실현 손익 합
    pub spot_pnl: Decimal,
    /// 현물 배분 비율(%)
    pub spot_allocation_pct: Percentage,
    /// 총자산 (파생상품 총자산 + 현물 총 가치, 미상이면 None)
    pub total_equity: Option<Decimal>,
}

/// 포트폴리오 요약을 집계합니다.
///
/// 순수 함수이며 입력 목록을 변경하지 않습니다.
///
/// # Arguments
///
/// * `positions` - 계산이 끝난 포지션 지표 목록
/// * `holdings` - 계산이 끝난 현물 보유 지표 목록
/// * `withdrawable` - 출금 가능 금액 (조회 실패 시 `None`)
///
/// # Returns
///
/// 집계된 [`PortfolioSummary`]
///
/// 배분 비율의 분모는 포지션 **명목 가치** + USDC 제외 현물 가치입니다.
/// 총자산 계산이 사용하는 파생상품 **총자산**과 기준이 다르지만, 원 시스템의
/// 산식을 그대로 따릅니다.
pub fn aggregate_portfolio(
    positions: &[PositionMetrics],
    holdings: &[SpotHolding],
    withdrawable: Option<Decimal>,
) -> PortfolioSummary {
    let perps_entry_value: Decimal = positions.iter().map(|p| p.entry_value).sum();
    let perps_pnl: Decimal = positions.iter().map(|p| p.unrealized_pnl).sum();
    let perps_current_value = perps_entry_value + perps_pnl;
    let perps_margin_used: Decimal = positions.iter().map(|p| p.margin_used).sum();

    let perps_margin_pct = if perps_current_value > Decimal::ZERO {
        perps_margin_used / perps_current_value * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let total_perps_equity = withdrawable.map(|w| w + perps_margin_used + perps_pnl);

    let spot_total_value: Decimal = holdings.iter().map(|h| h.current_value).sum();
    let spot_usdc_value: Decimal = holdings
        .iter()
        .filter(|h| h.is_stablecoin())
        .map(|h| h.current_value)
        .sum();
    let spot_non_usdc_value: Decimal = holdings
        .iter()
        .filter(|h| !h.is_stablecoin())
        .map(|h| h.current_value)
        .sum();
    let spot_pnl: Decimal = holdings.iter().map(|h| h.unrealized_pnl).sum();

    let total_equity = total_perps_equity.map(|equity| equity + spot_total_value);

    let allocation_base = perps_current_value + spot_non_usdc_value;
    let spot_allocation_pct = if allocation_base > Decimal::ZERO {
        spot_non_usdc_value / allocation_base * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    PortfolioSummary {
        perps_entry_value,
        perps_pnl,
        perps_current_value,
        perps_margin_used,
        perps_margin_pct,
        withdrawable,
        total_perps_equity,
        spot_total_value,
        spot_usdc_value,
        spot_non_usdc_value,
        spot_pnl,
        spot_allocation_pct,
        total_equity,
    }
}
