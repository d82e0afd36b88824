//! 텔레그램 리포트 포맷팅.
//!
//! 계산이 끝난 지표를 Markdown 리포트 문자열로 만드는 순수 함수들입니다.
//! 네트워크나 시계에 접근하지 않으며, 같은 입력에는 항상 같은 문자열을
//! 반환합니다.

use chrono::{DateTime, Utc};
use hlwatch_core::domain::{PortfolioSummary, PositionMetrics, PositionSide, SpotHolding};
use hlwatch_core::types::DecimalExt;
use rust_decimal::Decimal;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// 빈 포지션 목록 안내 문구.
pub const NO_POSITIONS_TEXT: &str = "ℹ️ No open positions found";
/// 빈 현물 목록 안내 문구.
pub const NO_HOLDINGS_TEXT: &str = "ℹ️ No spot holdings found";

/// 소수점 자릿수를 고정한 문자열을 만듭니다 (중간값은 0에서 먼 쪽으로).
fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_away(dp);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(dp);
    rounded.to_string()
}

/// 정수부에 천 단위 구분 기호를 넣습니다.
fn group_thousands(formatted: &str) -> String {
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted, None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// 달러 금액: 소수 둘째 자리, 천 단위 구분.
fn money(value: Decimal) -> String {
    group_thousands(&fixed(value, 2))
}

/// 부호를 항상 표기하는 달러 금액.
fn money_signed(value: Decimal) -> String {
    let text = money(value);
    if text.starts_with('-') {
        text
    } else {
        format!("+{}", text)
    }
}

/// 부호를 항상 표기하는 고정 소수점 숫자 (구분 기호 없음).
fn signed(value: Decimal, dp: u32) -> String {
    let text = fixed(value, dp);
    if text.starts_with('-') {
        text
    } else {
        format!("+{}", text)
    }
}

/// 지갑 주소를 `0x1234...abcd` 형태로 줄입니다.
fn short_wallet(address: &str) -> String {
    if address.len() > 10 && address.is_ascii() {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

/// 미결제 포지션 리포트를 만듭니다.
///
/// 목록이 비어 있으면 안내 문구 한 줄만 반환합니다.
pub fn format_positions(wallet_address: &str, positions: &[PositionMetrics]) -> String {
    if positions.is_empty() {
        return NO_POSITIONS_TEXT.to_string();
    }

    let total_entry_value: Decimal = positions.iter().map(|p| p.entry_value).sum();
    let total_pnl: Decimal = positions.iter().map(|p| p.unrealized_pnl).sum();
    let current_position_size = total_entry_value + total_pnl;
    let total_margin_used: Decimal = positions.iter().map(|p| p.margin_used).sum();
    let margin_usage_pct = if current_position_size > Decimal::ZERO {
        total_margin_used / current_position_size * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let long_pnl: Decimal = positions
        .iter()
        .filter(|p| p.side() == PositionSide::Long)
        .map(|p| p.unrealized_pnl)
        .sum();
    let short_pnl: Decimal = positions
        .iter()
        .filter(|p| p.side() == PositionSide::Short)
        .map(|p| p.unrealized_pnl)
        .sum();

    let mut lines = vec![
        format!("📊 *Portfolio Overview - {}*", short_wallet(wallet_address)),
        format!(
            "Last updated: {}",
            positions[0].timestamp.format(TIMESTAMP_FORMAT)
        ),
        String::new(),
        format!(
            "• Current Position Size: ${}",
            money(current_position_size)
        ),
        format!(
            "• Margin Usage: ${} ({}%)",
            money(total_margin_used),
            fixed(margin_usage_pct, 1)
        ),
        format!("• Long PnL: ${}", money_signed(long_pnl)),
        format!("• Short PnL: ${}", money_signed(short_pnl)),
        format!("• Unrealized PnL: ${}", money_signed(total_pnl)),
        String::new(),
        "🔹 *Open Positions*".to_string(),
        String::new(),
    ];

    for (idx, pos) in positions.iter().enumerate() {
        let pnl_emoji = if pos.unrealized_pnl >= Decimal::ZERO {
            "🟢"
        } else {
            "🔴"
        };

        lines.push(format!("*{}. {}* ({})", idx + 1, pos.symbol, pos.side()));
        lines.push(format!(
            "Size: {} (${})",
            fixed(pos.size.abs(), 4),
            money(pos.position_value)
        ));
        lines.push(format!(
            "Entry: ${} (${})",
            fixed(pos.entry_price, 2),
            money(pos.entry_value)
        ));
        lines.push(format!(
            "Current: ${} ({}%)",
            fixed(pos.current_price, 2),
            signed(pos.price_change_pct(), 2)
        ));
        lines.push(format!("Leverage: {}x", fixed(pos.leverage, 1)));
        lines.push(format!("Liq Price: ${}", fixed(pos.liquidation_price, 2)));
        lines.push(format!(
            "PnL: {} ${} ({}%)",
            pnl_emoji,
            money_signed(pos.unrealized_pnl),
            signed(pos.pnl_pct(), 2)
        ));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// 현물 보유 리포트를 만듭니다.
///
/// 상세 내역은 고정폭 표로 렌더링합니다.
pub fn format_holdings(wallet_address: &str, holdings: &[SpotHolding]) -> String {
    if holdings.is_empty() {
        return NO_HOLDINGS_TEXT.to_string();
    }

    let total_value: Decimal = holdings.iter().map(|h| h.current_value).sum();
    let total_pnl: Decimal = holdings.iter().map(|h| h.unrealized_pnl).sum();

    let mut lines = vec![
        format!("💰 *Spot Holdings - {}*", short_wallet(wallet_address)),
        format!(
            "Last updated: {}",
            holdings[0].timestamp.format(TIMESTAMP_FORMAT)
        ),
        String::new(),
        format!("• Total Value: ${}", money(total_value)),
        format!("• Unrealized PnL: ${}", money_signed(total_pnl)),
        String::new(),
        "🔹 *Detailed Holdings*".to_string(),
        String::new(),
        format!(
            "`{:<6} {:<12} {:<8} {:<8} {:<12} {:<12} {:<8}`",
            "Coin", "Balance", "Entry", "Current", "Value (USD)", "PnL", "ROE%"
        ),
    ];

    for holding in holdings {
        let pnl_emoji = if holding.unrealized_pnl >= Decimal::ZERO {
            "🟢"
        } else {
            "🔴"
        };

        lines.push(format!(
            "`{:<6} {:<12} {:<8} {:<8} {:<12} {} {:<12} {:<8}`",
            holding.coin,
            fixed(holding.total, 4),
            fixed(holding.entry_price, 2),
            fixed(holding.current_price, 2),
            fixed(holding.current_value, 2),
            pnl_emoji,
            signed(holding.unrealized_pnl, 2),
            signed(holding.roe, 2),
        ));
    }

    lines.join("\n")
}

/// 자산 요약 리포트를 만듭니다.
///
/// 출금 가능 금액 조회가 실패한 경우 해당 항목은 `Failed to fetch`로,
/// 거기서 파생되는 총자산 항목들은 `N/A`로 표기합니다. 0으로 대체해
/// 틀린 금액을 보여 주지 않습니다.
pub fn format_summary(
    wallet_address: &str,
    summary: &PortfolioSummary,
    generated_at: DateTime<Utc>,
) -> String {
    let total_equity = match summary.total_equity {
        Some(value) => format!("${}", money(value)),
        None => "N/A".to_string(),
    };
    let total_perps_equity = match summary.total_perps_equity {
        Some(value) => format!("${}", money(value)),
        None => "N/A".to_string(),
    };
    let withdrawable = match summary.withdrawable {
        Some(value) => format!("${}", money(value)),
        None => "Failed to fetch".to_string(),
    };

    let lines = vec![
        format!("📈 *Asset Summary - {}*", short_wallet(wallet_address)),
        format!("Last updated: {}", generated_at.format(TIMESTAMP_FORMAT)),
        String::new(),
        format!("• Total Equity: {}", total_equity),
        String::new(),
        "🔹 *Perps Account*".to_string(),
        format!("• Total Perps Equity: {}", total_perps_equity),
        format!(
            "• Open Trades Size: ${}",
            money(summary.perps_current_value)
        ),
        format!(
            "• Margin Usage: {}% (${})",
            fixed(summary.perps_margin_pct, 1),
            money(summary.perps_margin_used)
        ),
        format!("• Unrealized PnL: ${}", money_signed(summary.perps_pnl)),
        format!("• Withdrawable: {}", withdrawable),
        String::new(),
        "🔹 *Spot Holdings*".to_string(),
        format!("• Spot Equity: ${}", money(summary.spot_total_value)),
        format!(
            "• Holdings: ${} ({}% of total Portfolio)",
            money(summary.spot_non_usdc_value),
            fixed(summary.spot_allocation_pct, 1)
        ),
        format!("• USDC: ${}", money(summary.spot_usdc_value)),
        format!("• Spot PnL: ${}", money_signed(summary.spot_pnl)),
    ];

    lines.join("\n")
}
