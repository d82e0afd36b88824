//! Hyperliquid info API 클라이언트.
//!
//! 모든 조회는 `POST <base>/info`에 `{"type": ...}` 본문을 보내는 공개
//! 엔드포인트입니다. 인증과 서명이 없으며, 쿼리 종류별로 타임아웃만
//! 다릅니다 (포지션 조회 10초, 나머지 5초).

use crate::error::{ExchangeError, ExchangeResult};
use crate::types::{ClearinghouseState, PriceTable, SpotClearinghouseState};
use hlwatch_core::types::coerce_decimal;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

/// 기본 info API 베이스 URL.
pub const DEFAULT_BASE_URL: &str = "https://api.hyperliquid.xyz";

/// info API 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct InfoConfig {
    /// API 베이스 URL
    pub base_url: String,
    /// 조회 대상 지갑 주소
    pub wallet_address: String,
    /// 가격/잔고/출금액 조회 타임아웃 (초)
    pub info_timeout_secs: u64,
    /// 포지션 조회 타임아웃 (초)
    pub positions_timeout_secs: u64,
}

impl InfoConfig {
    /// 새 설정 생성.
    pub fn new(wallet_address: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            wallet_address: wallet_address.into(),
            info_timeout_secs: 5,
            positions_timeout_secs: 10,
        }
    }

    /// 베이스 URL을 설정합니다.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 타임아웃을 설정합니다.
    pub fn with_timeouts(mut self, info_secs: u64, positions_secs: u64) -> Self {
        self.info_timeout_secs = info_secs;
        self.positions_timeout_secs = positions_secs;
        self
    }
}

/// Hyperliquid info API 클라이언트.
#[derive(Debug, Clone)]
pub struct InfoClient {
    config: InfoConfig,
    client: Client,
}

impl InfoClient {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: InfoConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.info_timeout_secs))
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// 조회 대상 지갑 주소를 반환합니다.
    pub fn wallet_address(&self) -> &str {
        &self.config.wallet_address
    }

    fn info_url(&self) -> String {
        format!("{}/info", self.config.base_url.trim_end_matches('/'))
    }

    fn info_timeout(&self) -> Duration {
        Duration::from_secs(self.config.info_timeout_secs)
    }

    /// info 엔드포인트 POST 요청.
    async fn post_info<T: for<'de> Deserialize<'de>>(
        &self,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> ExchangeResult<T> {
        let url = self.info_url();
        debug!(query = %payload["type"], "POST {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ExchangeError::ParseError(e.to_string())
            })
        } else if status.as_u16() == 429 {
            Err(ExchangeError::RateLimited)
        } else {
            Err(ExchangeError::ApiError {
                code: status.as_u16() as i32,
                message: body,
            })
        }
    }

    /// 전체 마크 가격 테이블 조회 (`allMids`).
    ///
    /// 값은 숫자 문자열로 도착하며, 해석할 수 없는 항목은 버립니다.
    pub async fn fetch_all_mids(&self) -> ExchangeResult<PriceTable> {
        let raw: HashMap<String, serde_json::Value> = self
            .post_info(json!({"type": "allMids"}), self.info_timeout())
            .await?;

        let table: PriceTable = raw
            .iter()
            .filter_map(|(symbol, value)| coerce_decimal(value).map(|d| (symbol.clone(), d)))
            .collect();

        Ok(table)
    }

    /// 파생상품 계정 상태 조회 (`clearinghouseState`).
    pub async fn fetch_clearinghouse_state(&self) -> ExchangeResult<ClearinghouseState> {
        self.post_info(
            json!({"type": "clearinghouseState", "user": self.config.wallet_address}),
            Duration::from_secs(self.config.positions_timeout_secs),
        )
        .await
    }

    /// 현물 잔고 조회 (`spotClearinghouseState`).
    pub async fn fetch_spot_state(&self) -> ExchangeResult<SpotClearinghouseState> {
        self.post_info(
            json!({"type": "spotClearinghouseState", "user": self.config.wallet_address}),
            self.info_timeout(),
        )
        .await
    }

    /// 출금 가능 금액 조회.
    ///
    /// `clearinghouseState`를 짧은 타임아웃으로 다시 조회해
    /// `crossMarginSummary.accountValue`를 읽습니다. 필드가 없으면 0으로
    /// 해석하고, 전송 실패만 에러가 됩니다.
    pub async fn fetch_withdrawable(&self) -> ExchangeResult<Decimal> {
        let state: ClearinghouseState = self
            .post_info(
                json!({"type": "clearinghouseState", "user": self.config.wallet_address}),
                self.info_timeout(),
            )
            .await?;

        Ok(state
            .cross_margin_summary
            .map(|summary| summary.account_value.or_zero())
            .unwrap_or(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    fn client_for(server: &mockito::ServerGuard) -> InfoClient {
        let config = InfoConfig::new("0xadd5647a27987d3b5447cea68e2aaa56e9b522f3")
            .with_base_url(server.url());
        InfoClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_all_mids_parses_numeric_strings() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/info")
            .match_body(Matcher::Json(json!({"type": "allMids"})))
            .with_status(200)
            .with_body(r#"{"BTC": "61000", "@1": "2.5", "BROKEN": "abc"}"#)
            .create_async()
            .await;

        let table = client_for(&server).fetch_all_mids().await.unwrap();

        assert_eq!(table.get("BTC"), Some(&dec!(61000)));
        assert_eq!(table.get("@1"), Some(&dec!(2.5)));
        assert!(!table.contains_key("BROKEN"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/info")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let err = client_for(&server).fetch_all_mids().await.unwrap_err();
        assert!(matches!(err, ExchangeError::ApiError { code: 500, .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/info")
            .with_status(429)
            .create_async()
            .await;

        let err = client_for(&server).fetch_all_mids().await.unwrap_err();
        assert!(matches!(err, ExchangeError::RateLimited));
    }

    #[tokio::test]
    async fn test_fetch_withdrawable_reads_account_value() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/info")
            .match_body(Matcher::PartialJson(json!({"type": "clearinghouseState"})))
            .with_status(200)
            .with_body(r#"{"crossMarginSummary": {"accountValue": "20000.5"}}"#)
            .create_async()
            .await;

        let withdrawable = client_for(&server).fetch_withdrawable().await.unwrap();
        assert_eq!(withdrawable, dec!(20000.5));
    }

    #[tokio::test]
    async fn test_fetch_withdrawable_missing_summary_is_zero() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/info")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let withdrawable = client_for(&server).fetch_withdrawable().await.unwrap();
        assert_eq!(withdrawable, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/info")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let err = client_for(&server).fetch_all_mids().await.unwrap_err();
        assert!(matches!(err, ExchangeError::ParseError(_)));
    }
}
