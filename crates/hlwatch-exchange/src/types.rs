//! Hyperliquid info API 응답 타입.
//!
//! 업스트림 응답은 필드가 빠지거나 형태가 달라질 수 있으므로 모든 숫자
//! 필드는 [`LenientDecimal`]로 받고, 목록 원소는 `serde_json::Value`로
//! 유지했다가 레코드 단위로 역직렬화합니다 (한 레코드의 오류가 전체
//! 응답을 무효화하지 않도록).

use hlwatch_core::types::LenientDecimal;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// 가격 테이블: 심볼 → 마크 가격.
///
/// `allMids` 응답에서 파싱되며, 스냅샷 전체가 한 번에 교체됩니다.
pub type PriceTable = HashMap<String, Decimal>;

/// `clearinghouseState` 응답.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearinghouseState {
    /// 파생상품 포지션 목록 (레코드 단위로 파싱)
    #[serde(default)]
    pub asset_positions: Vec<serde_json::Value>,
    /// 교차 마진 요약
    #[serde(default)]
    pub cross_margin_summary: Option<CrossMarginSummary>,
}

/// 교차 마진 요약.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrossMarginSummary {
    /// 계좌 가치 (출금 가능 금액으로 사용)
    pub account_value: LenientDecimal,
}

/// `assetPositions` 원소.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetPosition {
    /// 포지션 서브레코드
    #[serde(default)]
    pub position: Option<PositionData>,
}

/// 포지션 서브레코드. 모든 필드는 없거나 형식이 달라도 허용됩니다.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionData {
    /// 코인 심볼
    pub coin: Option<String>,
    /// 부호 있는 사이즈
    pub szi: LenientDecimal,
    /// 평균 진입 가격
    pub entry_px: LenientDecimal,
    /// 내장 마크 가격 (가격 테이블에 없는 심볼의 폴백)
    pub mark_px: LenientDecimal,
    /// 레버리지 (`{"type": "cross", "value": N}` 형태)
    pub leverage: LenientDecimal,
    /// 청산 가격
    pub liquidation_px: LenientDecimal,
    /// 미실현 손익
    pub unrealized_pnl: LenientDecimal,
}

/// `spotClearinghouseState` 응답.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotClearinghouseState {
    /// 현물 잔고 목록 (레코드 단위로 파싱)
    #[serde(default)]
    pub balances: Vec<serde_json::Value>,
}

/// 현물 잔고 레코드.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpotBalance {
    /// 코인 심볼
    pub coin: Option<String>,
    /// 총 보유 수량
    pub total: LenientDecimal,
    /// 취득 시점 명목 가치 (USD)
    pub entry_ntl: LenientDecimal,
}

/// 계산 단계에서 건너뛴 레코드.
///
/// 건너뛴 사유를 로그가 아닌 값으로 보존해 테스트와 호출부가 직접
/// 검사할 수 있게 합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// 원본 목록에서의 위치
    pub index: usize,
    /// 코인 심볼 (추출 가능했던 경우)
    pub coin: Option<String>,
    /// 건너뛴 사유
    pub reason: SkipReason,
}

/// 레코드를 건너뛴 사유.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// 레코드 역직렬화 실패 (객체가 아니거나 필드 형식이 다름)
    Malformed(String),
    /// position 서브레코드 없음
    MissingPosition,
    /// 코인 심볼 없음
    MissingCoin,
    /// 사이즈가 정확히 0 (청산된 포지션)
    ZeroSize,
}
