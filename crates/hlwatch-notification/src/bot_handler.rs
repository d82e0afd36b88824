//! 텔레그램 봇 명령어 핸들러.
//!
//! 사용자로부터 명령어를 수신하고 처리합니다.
//! - `/open_trades` - 미결제 파생상품 포지션 조회
//! - `/spot` - 현물 보유 현황 조회
//! - `/asset` - 자산 요약 조회
//! - `/help` - 도움말
//!
//! 조회 명령은 먼저 진행 중 안내 메시지를 보내고, 데이터가 준비되면
//! 같은 메시지를 결과로 수정합니다.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::types::{CommandResponse, NotificationError, NotificationResult};

/// 텔레그램 Bot API 기본 주소.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// 허용되지 않은 채팅에 보내는 거부 응답.
pub const UNAUTHORIZED_TEXT: &str = "❌ Unauthorized access.";

/// 텔레그램 봇 업데이트 응답.
#[derive(Debug, Deserialize)]
struct TelegramUpdates {
    ok: bool,
    result: Vec<TelegramUpdate>,
}

/// 개별 업데이트.
#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

/// 메시지 정보.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TelegramMessage {
    message_id: i64,
    chat: TelegramChat,
    text: Option<String>,
    date: i64,
}

/// 채팅 정보.
#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// `sendMessage` 응답.
#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    result: Option<SentMessage>,
}

/// 전송된 메시지 정보.
#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// 텔레그램 봇 설정.
#[derive(Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// 명령을 허용하는 유일한 채팅 ID
    pub chat_id: i64,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id,
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// 봇 명령어 타입.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// 미결제 포지션
    OpenTrades,
    /// 현물 보유
    Spot,
    /// 자산 요약
    Asset,
    /// 도움말
    Help,
}

impl BotCommand {
    /// 텍스트에서 명령어 파싱.
    ///
    /// `/명령어@봇이름` 형식도 허용합니다. 명령어가 아니거나 모르는
    /// 명령어면 `None`을 반환합니다.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        // /명령어 형식 확인
        if !text.starts_with('/') {
            return None;
        }

        let parts: Vec<&str> = text[1..].split_whitespace().collect();
        let command = parts
            .first()
            .map(|s| s.split('@').next().unwrap_or(s).to_lowercase());

        match command.as_deref() {
            Some("open_trades") => Some(BotCommand::OpenTrades),
            Some("spot") => Some(BotCommand::Spot),
            Some("asset") => Some(BotCommand::Asset),
            Some("help") | Some("start") => Some(BotCommand::Help),
            _ => None,
        }
    }

    /// 데이터 조회 전에 먼저 보내는 진행 중 안내 문구.
    pub fn interim_text(&self) -> Option<&'static str> {
        match self {
            BotCommand::OpenTrades => Some("🔄 Fetching positions..."),
            BotCommand::Spot => Some("🔄 Fetching spot holdings..."),
            BotCommand::Asset => Some("🔄 Fetching asset summary..."),
            BotCommand::Help => None,
        }
    }
}

/// 지갑 조회 명령어 핸들러 trait.
///
/// 각 명령어의 실제 데이터 조회와 리포트 생성을 구현합니다.
#[async_trait]
pub trait WalletCommandHandler: Send + Sync {
    /// 미결제 포지션 조회.
    async fn handle_open_trades(&self) -> NotificationResult<CommandResponse>;

    /// 현물 보유 조회.
    async fn handle_spot(&self) -> NotificationResult<CommandResponse>;

    /// 자산 요약 조회.
    async fn handle_asset(&self) -> NotificationResult<CommandResponse>;
}

/// 텔레그램 봇 핸들러.
///
/// Long polling으로 업데이트를 수신하고 명령어를 처리합니다.
pub struct TelegramBotHandler<H: WalletCommandHandler> {
    config: TelegramConfig,
    client: reqwest::Client,
    handler: Arc<H>,
    last_update_id: RwLock<i64>,
    api_base: String,
}

impl<H: WalletCommandHandler> TelegramBotHandler<H> {
    /// 새 봇 핸들러 생성.
    pub fn new(config: TelegramConfig, handler: Arc<H>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            handler,
            last_update_id: RwLock::new(0),
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// Bot API 베이스 주소를 변경합니다.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.config.bot_token, method)
    }

    /// 봇 폴링 시작.
    ///
    /// 무한 루프로 업데이트를 수신합니다.
    pub async fn start_polling(&self) {
        info!("텔레그램 봇 폴링 시작");

        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        if let Err(e) = self.process_update(update).await {
                            error!("업데이트 처리 실패: {}", e);
                        }
                    }
                }
                Err(e) => {
                    error!("업데이트 폴링 실패: {}", e);
                    // 에러 발생 시 잠시 대기
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// 업데이트 폴링.
    async fn poll_updates(&self) -> NotificationResult<Vec<TelegramUpdate>> {
        let last_id = *self.last_update_id.read().await;

        let url = self.api_url("getUpdates");
        let params = serde_json::json!({
            "offset": last_id + 1,
            "timeout": 30,
            "allowed_updates": ["message"],
        });

        let response = self
            .client
            .post(&url)
            .json(&params)
            .timeout(Duration::from_secs(35))
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        let body = response
            .text()
            .await
            .map_err(NotificationError::NetworkError)?;
        let updates: TelegramUpdates = serde_json::from_str(&body)?;

        if !updates.ok {
            return Err(NotificationError::SendFailed(
                "텔레그램 API 응답 실패".to_string(),
            ));
        }

        // 마지막 업데이트 ID 갱신
        if let Some(last) = updates.result.last() {
            *self.last_update_id.write().await = last.update_id;
        }

        Ok(updates.result)
    }

    /// 개별 업데이트 처리.
    async fn process_update(&self, update: TelegramUpdate) -> NotificationResult<()> {
        let Some(message) = update.message else {
            return Ok(());
        };

        let chat_id = message.chat.id;
        let Some(text) = message.text else {
            return Ok(());
        };

        // 모르는 명령어와 일반 텍스트는 조용히 무시한다
        let Some(command) = BotCommand::parse(&text) else {
            debug!(chat_id = chat_id, text = %text, "명령어가 아닌 메시지 무시");
            return Ok(());
        };

        // 설정된 채팅 하나에서만 명령을 허용한다
        if chat_id != self.config.chat_id {
            warn!(
                chat_id = chat_id,
                command = ?command,
                "허용되지 않은 채팅에서 명령 수신"
            );
            self.send_message(chat_id, UNAUTHORIZED_TEXT, None).await?;
            return Ok(());
        }

        debug!(chat_id = chat_id, command = ?command, "명령어 수신");

        match command.interim_text() {
            Some(interim) => {
                // 진행 중 메시지를 먼저 보내고, 결과가 나오면 수정한다
                let message_id = self.send_message(chat_id, interim, None).await?;
                let response = self.execute_command(command).await?;
                self.edit_message(chat_id, message_id, &response).await
            }
            None => {
                let response = self.execute_command(command).await?;
                self.send_response(chat_id, &response).await
            }
        }
    }

    /// 명령어 실행.
    async fn execute_command(&self, command: BotCommand) -> NotificationResult<CommandResponse> {
        match command {
            BotCommand::OpenTrades => self.handler.handle_open_trades().await,
            BotCommand::Spot => self.handler.handle_spot().await,
            BotCommand::Asset => self.handler.handle_asset().await,
            BotCommand::Help => Ok(self.help_message()),
        }
    }

    /// 도움말 메시지 생성.
    fn help_message(&self) -> CommandResponse {
        CommandResponse::markdown(
            "🤖 *Hyperliquid Wallet Monitor*\n\n\
             Available commands:\n\n\
             /open_trades - 📊 Open derivatives positions\n\
             /spot - 💰 Spot holdings\n\
             /asset - 📈 Asset summary\n\
             /help - ❓ Help",
        )
    }

    /// 메시지 전송. 전송된 메시지 ID를 반환합니다.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> NotificationResult<i64> {
        let mut params = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        if let Some(mode) = parse_mode {
            params["parse_mode"] = serde_json::json!(mode);
        }

        let url = self.api_url("sendMessage");
        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            // 요청 한도 제한 확인
            if status.as_u16() == 429 {
                warn!("Telegram rate limited");
                return Err(NotificationError::RateLimited(60));
            }

            let body = response.text().await.unwrap_or_default();
            error!("응답 전송 실패: {} - {}", status, body);
            return Err(NotificationError::SendFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(NotificationError::NetworkError)?;
        let sent: SendMessageResponse = serde_json::from_str(&body)?;

        match sent.result {
            Some(message) if sent.ok => {
                debug!(chat_id = chat_id, message_id = message.message_id, "응답 전송 완료");
                Ok(message.message_id)
            }
            _ => Err(NotificationError::SendFailed(
                "sendMessage 응답에 result가 없습니다".to_string(),
            )),
        }
    }

    /// 응답 메시지 전송.
    async fn send_response(
        &self,
        chat_id: i64,
        response: &CommandResponse,
    ) -> NotificationResult<()> {
        self.send_message(chat_id, &response.text, response.parse_mode.as_deref())
            .await
            .map(|_| ())
    }

    /// 전송된 메시지를 결과 텍스트로 수정합니다.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        response: &CommandResponse,
    ) -> NotificationResult<()> {
        let mut params = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": response.text,
            "disable_web_page_preview": true,
        });
        if let Some(mode) = &response.parse_mode {
            params["parse_mode"] = serde_json::json!(mode);
        }

        let url = self.api_url("editMessageText");
        let api_response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        if api_response.status().is_success() {
            debug!(chat_id = chat_id, message_id = message_id, "응답 수정 완료");
            Ok(())
        } else {
            let status = api_response.status();
            let body = api_response.text().await.unwrap_or_default();
            error!("응답 수정 실패: {} - {}", status, body);
            Err(NotificationError::SendFailed(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    }
}
