//! 현물 보유 자산 지표 계산.
//!
//! `spotClearinghouseState`의 `balances` 목록을 [`SpotHolding`]으로
//! 변환합니다. USDC는 항상 액면가 1달러로 고정하고, 통합 토큰(UBTC 등)은
//! 자체 심볼 가격이 없을 때만 기초 자산 심볼로 재조회합니다.

use crate::types::{PriceTable, SkipReason, SkippedRecord, SpotBalance};
use chrono::{DateTime, Utc};
use hlwatch_core::domain::{SpotHolding, STABLECOIN};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// 통합 토큰 심볼을 기초 자산 심볼로 변환합니다.
///
/// 가격 테이블이 자체 심볼 가격을 제공하지 않을 때만 사용하는
/// 폴백 조회용입니다.
fn unified_base(coin: &str) -> Option<&'static str> {
    match coin {
        "UBTC" => Some("BTC"),
        "UETH" => Some("ETH"),
        "USOL" => Some("SOL"),
        "UFART" => Some("FARTCOIN"),
        _ => None,
    }
}

/// 현물 계산 결과.
#[derive(Debug, Default)]
pub struct HoldingEvaluation {
    /// 계산에 성공한 보유 자산
    pub holdings: Vec<SpotHolding>,
    /// 건너뛴 레코드
    pub skipped: Vec<SkippedRecord>,
}

impl HoldingEvaluation {
    /// 계산 결과 요약을 로그로 남깁니다.
    pub fn log_summary(&self) {
        debug!(
            parsed = self.holdings.len(),
            skipped = self.skipped.len(),
            "holding evaluation complete"
        );
    }
}

/// 원시 잔고 목록을 보유 자산 지표로 변환합니다.
///
/// # Arguments
///
/// * `entries` - `balances` 원소 목록 (원시 JSON)
/// * `prices` - 마크 가격 테이블
/// * `now` - 스냅샷 타임스탬프
pub fn evaluate_holdings(
    entries: &[serde_json::Value],
    prices: &PriceTable,
    now: DateTime<Utc>,
) -> HoldingEvaluation {
    let mut evaluation = HoldingEvaluation::default();

    for (index, entry) in entries.iter().enumerate() {
        match evaluate_balance(entry, prices, now) {
            Ok(holding) => evaluation.holdings.push(holding),
            Err(reason) => {
                let coin = entry
                    .pointer("/coin")
                    .and_then(|v| v.as_str())
                    .map(String::from);

                warn!(
                    index,
                    coin = coin.as_deref(),
                    reason = ?reason,
                    "skipping malformed balance entry"
                );
                evaluation.skipped.push(SkippedRecord {
                    index,
                    coin,
                    reason,
                });
            }
        }
    }

    evaluation
}

fn evaluate_balance(
    entry: &serde_json::Value,
    prices: &PriceTable,
    now: DateTime<Utc>,
) -> Result<SpotHolding, SkipReason> {
    let balance: SpotBalance = serde_json::from_value(entry.clone())
        .map_err(|e| SkipReason::Malformed(e.to_string()))?;

    let coin = balance
        .coin
        .filter(|c| !c.is_empty())
        .ok_or(SkipReason::MissingCoin)?;

    let total = balance.total.or_zero();
    let entry_ntl = balance.entry_ntl.or_zero();

    let (current_price, entry_price, unrealized_pnl, roe) = if coin == STABLECOIN {
        // 스테이블코인은 액면가로 고정해 반올림 노이즈를 차단한다
        (Decimal::ONE, Decimal::ONE, Decimal::ZERO, Decimal::ZERO)
    } else {
        let mut current_price = prices.get(&coin).copied().unwrap_or(Decimal::ZERO);
        if current_price.is_zero() {
            if let Some(base) = unified_base(&coin) {
                current_price = prices.get(base).copied().unwrap_or(Decimal::ZERO);
            }
        }

        let entry_price = if total > Decimal::ZERO {
            entry_ntl / total
        } else {
            Decimal::ZERO
        };
        let unrealized_pnl = total * current_price - entry_ntl;
        let roe = if entry_ntl.is_zero() {
            Decimal::ZERO
        } else {
            unrealized_pnl / entry_ntl * Decimal::ONE_HUNDRED
        };

        (current_price, entry_price, unrealized_pnl, roe)
    };

    Ok(SpotHolding {
        coin,
        total,
        entry_price,
        current_price,
        entry_notional: entry_ntl,
        current_value: total * current_price,
        unrealized_pnl,
        roe,
        timestamp: now,
    })
}
