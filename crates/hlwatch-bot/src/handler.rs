//! 명령 처리기: 지갑 데이터 조회와 리포트 생성을 잇는 계층.
//!
//! [`WalletMonitor`]는 텔레그램 명령 하나를 Hyperliquid 조회 →
//! 지표 계산 → 리포트 문자열 파이프라인으로 처리합니다. 조회가
//! 실패하면 에러를 로그로 남기고 사용자에게는 안내 문구만 보냅니다.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, warn};

use hlwatch_core::aggregate_portfolio;
use hlwatch_exchange::{
    evaluate_holdings, evaluate_positions, ExchangeResult, InfoClient, InfoConfig, PriceCache,
};
use hlwatch_notification::{
    format_holdings, format_positions, format_summary, CommandResponse, NotificationResult,
    WalletCommandHandler,
};

use crate::{BotConfig, Result};

/// 조회 실패 시 사용자에게 보내는 안내 문구.
const POSITIONS_FAILED_TEXT: &str = "⚠️ Failed to fetch data. Please try again later.";
const SPOT_FAILED_TEXT: &str = "⚠️ Failed to fetch spot data. Please try again later.";
const SUMMARY_FAILED_TEXT: &str = "⚠️ Failed to fetch some data. Please try again later.";

/// 지갑 하나를 감시하는 명령 처리기.
pub struct WalletMonitor {
    client: Arc<InfoClient>,
    cache: PriceCache,
}

impl WalletMonitor {
    /// 새 모니터를 생성합니다.
    pub fn new(client: Arc<InfoClient>, cache: PriceCache) -> Self {
        Self { client, cache }
    }

    /// 설정에서 클라이언트와 가격 캐시를 구성합니다.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let info_config = InfoConfig::new(&config.wallet_address)
            .with_base_url(&config.api_base_url)
            .with_timeouts(config.info_timeout_secs, config.positions_timeout_secs);
        let client = Arc::new(InfoClient::new(info_config)?);
        let cache = PriceCache::new(Arc::clone(&client), config.price_cache_ttl_secs);

        Ok(Self::new(client, cache))
    }

    /// 파생상품 포지션 리포트를 생성합니다.
    async fn open_trades_report(&self) -> ExchangeResult<String> {
        let prices = self.cache.get_prices().await;
        let state = self.client.fetch_clearinghouse_state().await?;

        let evaluation = evaluate_positions(&state.asset_positions, &prices, Utc::now());
        evaluation.log_summary();

        Ok(format_positions(
            self.client.wallet_address(),
            &evaluation.positions,
        ))
    }

    /// 현물 보유 리포트를 생성합니다.
    async fn spot_report(&self) -> ExchangeResult<String> {
        let prices = self.cache.get_prices().await;
        let state = self.client.fetch_spot_state().await?;

        let evaluation = evaluate_holdings(&state.balances, &prices, Utc::now());
        evaluation.log_summary();

        Ok(format_holdings(
            self.client.wallet_address(),
            &evaluation.holdings,
        ))
    }

    /// 파생상품과 현물을 합친 자산 요약 리포트를 생성합니다.
    ///
    /// 출금 가능 금액 조회만 실패한 경우에는 요약을 포기하지 않고
    /// 해당 항목을 `None`으로 남겨 `N/A` 표기로 이어지게 합니다.
    async fn asset_report(&self) -> ExchangeResult<String> {
        let prices = self.cache.get_prices().await;
        let now = Utc::now();

        let clearinghouse = self.client.fetch_clearinghouse_state().await?;
        let positions = evaluate_positions(&clearinghouse.asset_positions, &prices, now);
        positions.log_summary();

        let spot = self.client.fetch_spot_state().await?;
        let holdings = evaluate_holdings(&spot.balances, &prices, now);
        holdings.log_summary();

        let withdrawable = match self.client.fetch_withdrawable().await {
            Ok(value) => Some(value),
            Err(e) if e.is_retryable() => {
                warn!("출금 가능 금액 조회 실패 (재시도 가능): {}", e);
                None
            }
            Err(e) => {
                error!("출금 가능 금액 조회 실패: {}", e);
                None
            }
        };

        let summary = aggregate_portfolio(&positions.positions, &holdings.holdings, withdrawable);

        Ok(format_summary(self.client.wallet_address(), &summary, now))
    }
}

#[async_trait]
impl WalletCommandHandler for WalletMonitor {
    async fn handle_open_trades(&self) -> NotificationResult<CommandResponse> {
        match self.open_trades_report().await {
            Ok(report) => Ok(CommandResponse::markdown(report)),
            Err(e) => {
                error!("포지션 리포트 생성 실패: {}", e);
                Ok(CommandResponse::plain(POSITIONS_FAILED_TEXT))
            }
        }
    }

    async fn handle_spot(&self) -> NotificationResult<CommandResponse> {
        match self.spot_report().await {
            Ok(report) => Ok(CommandResponse::markdown(report)),
            Err(e) => {
                error!("현물 리포트 생성 실패: {}", e);
                Ok(CommandResponse::plain(SPOT_FAILED_TEXT))
            }
        }
    }

    async fn handle_asset(&self) -> NotificationResult<CommandResponse> {
        match self.asset_report().await {
            Ok(report) => Ok(CommandResponse::markdown(report)),
            Err(e) => {
                error!("자산 요약 리포트 생성 실패: {}", e);
                Ok(CommandResponse::plain(SUMMARY_FAILED_TEXT))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn monitor_for(server: &ServerGuard) -> WalletMonitor {
        let config = InfoConfig::new("0xadd5647a27987d3b5447cea68e2aaa56e9b522f3")
            .with_base_url(server.url());
        let client = Arc::new(InfoClient::new(config).unwrap());
        let cache = PriceCache::new(Arc::clone(&client), 10);
        WalletMonitor::new(client, cache)
    }

    /// 조회가 모두 실패하면 마크다운 없는 안내 문구만 돌려준다.
    #[tokio::test]
    async fn test_open_trades_failure_returns_plain_notice() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/info")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let monitor = monitor_for(&server);
        let response = monitor.handle_open_trades().await.unwrap();

        assert_eq!(response.text, POSITIONS_FAILED_TEXT);
        assert!(response.parse_mode.is_none());
    }

    /// 현물 조회 성공 시 마크다운 리포트를 돌려준다.
    #[tokio::test]
    async fn test_spot_command_renders_markdown_report() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/info")
            .match_body(Matcher::PartialJson(json!({"type": "allMids"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"UBTC": "61000"}).to_string())
            .create_async()
            .await;
        server
            .mock("POST", "/info")
            .match_body(Matcher::PartialJson(
                json!({"type": "spotClearinghouseState"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "balances": [
                        {"coin": "USDC", "total": "2500.0", "entryNtl": "0.0"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let monitor = monitor_for(&server);
        let response = monitor.handle_spot().await.unwrap();

        assert_eq!(response.parse_mode.as_deref(), Some("Markdown"));
        assert!(response.text.contains("💰 *Spot Holdings - 0xadd5...22f3*"));
        assert!(response.text.contains("USDC"));
    }

    /// 자산 요약은 출금 가능 금액까지 포함해 집계한다.
    #[tokio::test]
    async fn test_asset_summary_includes_withdrawable() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/info")
            .match_body(Matcher::PartialJson(json!({"type": "allMids"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"BTC": "61000"}).to_string())
            .create_async()
            .await;
        // 포지션 조회와 출금 가능 금액 조회가 같은 엔드포인트를 공유한다.
        server
            .mock("POST", "/info")
            .match_body(Matcher::PartialJson(json!({"type": "clearinghouseState"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "assetPositions": [],
                    "crossMarginSummary": {"accountValue": "20000.5"}
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("POST", "/info")
            .match_body(Matcher::PartialJson(
                json!({"type": "spotClearinghouseState"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "balances": [
                        {"coin": "USDC", "total": "2500.0", "entryNtl": "0.0"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let monitor = monitor_for(&server);
        let response = monitor.handle_asset().await.unwrap();

        assert!(response.text.contains("📈 *Asset Summary - 0xadd5...22f3*"));
        assert!(response.text.contains("• Withdrawable: $20,000.50"));
        assert!(response.text.contains("• Total Equity: $23,000.50"));
    }
}
