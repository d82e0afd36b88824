//! 파생상품 포지션 지표 계산.
//!
//! `clearinghouseState`의 `assetPositions` 목록을 레코드 단위로 해석해
//! [`PositionMetrics`]로 변환합니다. 잘못된 레코드 하나가 전체 리포트를
//! 중단시키지 않도록 레코드별로 격리하며, 건너뛴 레코드는 사유와 함께
//! 결과에 보존합니다.

use crate::types::{AssetPosition, PriceTable, SkipReason, SkippedRecord};
use chrono::{DateTime, Utc};
use hlwatch_core::domain::PositionMetrics;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// 포지션 계산 결과.
#[derive(Debug, Default)]
pub struct PositionEvaluation {
    /// 계산에 성공한 포지션 지표
    pub positions: Vec<PositionMetrics>,
    /// 건너뛴 레코드
    pub skipped: Vec<SkippedRecord>,
}

impl PositionEvaluation {
    /// 계산 결과 요약을 로그로 남깁니다.
    pub fn log_summary(&self) {
        debug!(
            parsed = self.positions.len(),
            skipped = self.skipped.len(),
            "position evaluation complete"
        );
    }
}

/// 원시 포지션 목록을 지표로 변환합니다.
///
/// # Arguments
///
/// * `entries` - `assetPositions` 원소 목록 (원시 JSON)
/// * `prices` - 마크 가격 테이블
/// * `now` - 스냅샷 타임스탬프
///
/// 현재 가격은 3단계 폴백으로 결정합니다:
/// 가격 테이블 → 레코드의 내장 `markPx` → 진입 가격.
/// 값 비교가 아니라 필드 존재 여부로 다음 단계로 넘어갑니다.
pub fn evaluate_positions(
    entries: &[serde_json::Value],
    prices: &PriceTable,
    now: DateTime<Utc>,
) -> PositionEvaluation {
    let mut evaluation = PositionEvaluation::default();

    for (index, entry) in entries.iter().enumerate() {
        match evaluate_entry(entry, prices, now) {
            Ok(metrics) => evaluation.positions.push(metrics),
            Err(reason) => {
                let coin = entry
                    .pointer("/position/coin")
                    .and_then(|v| v.as_str())
                    .map(String::from);

                match &reason {
                    // 사이즈 0은 정상적인 청산 상태라 조용히 제외한다
                    SkipReason::ZeroSize => {
                        debug!(index, coin = coin.as_deref(), "skipping flat position")
                    }
                    _ => warn!(
                        index,
                        coin = coin.as_deref(),
                        reason = ?reason,
                        "skipping malformed position entry"
                    ),
                }

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

fn evaluate_entry(
    entry: &serde_json::Value,
    prices: &PriceTable,
    now: DateTime<Utc>,
) -> Result<PositionMetrics, SkipReason> {
    let wrapper: AssetPosition = serde_json::from_value(entry.clone())
        .map_err(|e| SkipReason::Malformed(e.to_string()))?;
    let data = wrapper.position.ok_or(SkipReason::MissingPosition)?;

    let coin = data
        .coin
        .filter(|c| !c.is_empty())
        .ok_or(SkipReason::MissingCoin)?;

    let size = data.szi.or_zero();
    if size.is_zero() {
        return Err(SkipReason::ZeroSize);
    }

    let entry_price = data.entry_px.or_zero();
    let current_price = prices
        .get(&coin)
        .copied()
        .or_else(|| data.mark_px.value())
        .unwrap_or(entry_price);

    let position_value = size.abs() * current_price;
    let entry_value = size.abs() * entry_price;
    let leverage = data.leverage.or(Decimal::ONE);
    let margin_used = if leverage.is_zero() {
        Decimal::ZERO
    } else {
        position_value / leverage
    };

    Ok(PositionMetrics {
        symbol: coin,
        size,
        entry_price,
        current_price,
        position_value,
        entry_value,
        leverage,
        margin_used,
        liquidation_price: data.liquidation_px.or_zero(),
        unrealized_pnl: data.unrealized_pnl.or_zero(),
        timestamp: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlwatch_core::domain::PositionSide;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn btc_entry() -> serde_json::Value {
        json!({
            "type": "oneWay",
            "position": {
                "coin": "BTC",
                "szi": "1.5",
                "entryPx": "60000",
                "liquidationPx": "50000",
                "unrealizedPnl": "1500",
                "leverage": {"type": "cross", "value": 2}
            }
        })
    }

    fn prices(pairs: &[(&str, Decimal)]) -> PriceTable {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn test_btc_position_metrics() {
        let table = prices(&[("BTC", dec!(61000))]);
        let result = evaluate_positions(&[btc_entry()], &table, Utc::now());

        assert!(result.skipped.is_empty());
        let pos = &result.positions[0];
        assert_eq!(pos.symbol, "BTC");
        assert_eq!(pos.current_price, dec!(61000));
        assert_eq!(pos.position_value, dec!(91500));
        assert_eq!(pos.entry_value, dec!(90000));
        assert_eq!(pos.margin_used, dec!(45750));
        assert_eq!(pos.side(), PositionSide::Long);
        assert_eq!(pos.liquidation_price, dec!(50000));
        assert_eq!(pos.unrealized_pnl, dec!(1500));
    }

    #[test]
    fn test_zero_size_position_dropped() {
        let entry = json!({"position": {"coin": "ETH", "szi": "0.0"}});
        let result = evaluate_positions(&[entry], &PriceTable::new(), Utc::now());

        assert!(result.positions.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, SkipReason::ZeroSize);
        assert_eq!(result.skipped[0].coin.as_deref(), Some("ETH"));
    }

    #[test]
    fn test_missing_size_treated_as_zero() {
        let entry = json!({"position": {"coin": "ETH", "entryPx": "3000"}});
        let result = evaluate_positions(&[entry], &PriceTable::new(), Utc::now());

        assert!(result.positions.is_empty());
        assert_eq!(result.skipped[0].reason, SkipReason::ZeroSize);
    }

    #[test]
    fn test_missing_position_subrecord_skipped() {
        let result =
            evaluate_positions(&[json!({"type": "oneWay"})], &PriceTable::new(), Utc::now());
        assert_eq!(result.skipped[0].reason, SkipReason::MissingPosition);
    }

    #[test]
    fn test_non_mapping_position_skipped() {
        let entry = json!({"position": "oops"});
        let result = evaluate_positions(&[entry], &PriceTable::new(), Utc::now());
        assert!(matches!(result.skipped[0].reason, SkipReason::Malformed(_)));
    }

    #[test]
    fn test_missing_coin_skipped() {
        let entry = json!({"position": {"szi": "1.0"}});
        let result = evaluate_positions(&[entry], &PriceTable::new(), Utc::now());
        assert_eq!(result.skipped[0].reason, SkipReason::MissingCoin);
    }

    #[test]
    fn test_fallback_uses_embedded_mark_price() {
        let entry = json!({
            "position": {"coin": "NEW", "szi": "2", "entryPx": "10", "markPx": "12"}
        });
        let result = evaluate_positions(&[entry], &PriceTable::new(), Utc::now());

        let pos = &result.positions[0];
        assert_eq!(pos.current_price, dec!(12));
        assert_eq!(pos.position_value, dec!(24));
    }

    #[test]
    fn test_fallback_uses_entry_price_last() {
        let entry = json!({"position": {"coin": "NEW", "szi": "2", "entryPx": "10"}});
        let result = evaluate_positions(&[entry], &PriceTable::new(), Utc::now());
        assert_eq!(result.positions[0].current_price, dec!(10));
    }

    #[test]
    fn test_price_table_beats_embedded_mark_price() {
        let entry = json!({
            "position": {"coin": "BTC", "szi": "1", "entryPx": "60000", "markPx": "59000"}
        });
        let table = prices(&[("BTC", dec!(61000))]);
        let result = evaluate_positions(&[entry], &table, Utc::now());
        assert_eq!(result.positions[0].current_price, dec!(61000));
    }

    #[test]
    fn test_zero_leverage_margin_is_zero() {
        let entry = json!({
            "position": {"coin": "BTC", "szi": "1", "entryPx": "60000", "leverage": "0"}
        });
        let table = prices(&[("BTC", dec!(61000))]);
        let result = evaluate_positions(&[entry], &table, Utc::now());

        let pos = &result.positions[0];
        assert_eq!(pos.leverage, Decimal::ZERO);
        assert_eq!(pos.margin_used, Decimal::ZERO);
    }

    #[test]
    fn test_missing_leverage_defaults_to_one() {
        let entry = json!({"position": {"coin": "BTC", "szi": "1", "entryPx": "60000"}});
        let table = prices(&[("BTC", dec!(61000))]);
        let result = evaluate_positions(&[entry], &table, Utc::now());

        let pos = &result.positions[0];
        assert_eq!(pos.leverage, Decimal::ONE);
        assert_eq!(pos.margin_used, dec!(61000));
    }

    #[test]
    fn test_short_position_keeps_signed_size() {
        let entry = json!({"position": {"coin": "ETH", "szi": "-4", "entryPx": "3000"}});
        let table = prices(&[("ETH", dec!(2900))]);
        let result = evaluate_positions(&[entry], &table, Utc::now());

        let pos = &result.positions[0];
        assert_eq!(pos.size, dec!(-4));
        assert_eq!(pos.side(), PositionSide::Short);
        assert_eq!(pos.position_value, dec!(11600));
        assert_eq!(pos.entry_value, dec!(12000));
    }

    #[test]
    fn test_one_bad_record_does_not_abort_the_rest() {
        let entries = vec![json!("garbage"), btc_entry()];
        let table = prices(&[("BTC", dec!(61000))]);
        let result = evaluate_positions(&entries, &table, Utc::now());

        assert_eq!(result.positions.len(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].index, 0);
        assert!(matches!(result.skipped[0].reason, SkipReason::Malformed(_)));
    }
}
