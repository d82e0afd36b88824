//! Hyperliquid 지갑 감시 봇 CLI.

use std::sync::Arc;

use clap::Parser;
use hlwatch_bot::{BotConfig, WalletMonitor};
use hlwatch_core::logging::{init_logging, LogConfig, LogFormat};
use hlwatch_notification::{TelegramBotHandler, TelegramConfig};

#[derive(Parser)]
#[command(name = "hlwatch")]
#[command(about = "Hyperliquid wallet watcher Telegram bot", long_about = None)]
#[command(version)]
struct Cli {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화 (RUST_LOG가 설정되어 있으면 CLI 인자보다 우선)
    let log_format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Pretty);
    init_logging(LogConfig::new(&cli.log_level).with_format(log_format))?;

    tracing::info!("Hyperliquid 지갑 감시 봇 시작");

    // 설정 로드
    let config = BotConfig::from_env()?;
    tracing::info!(
        wallet = %config.wallet_address,
        chat_id = config.telegram_chat_id,
        "설정 로드 완료"
    );

    // 지갑 모니터 구성 (info 클라이언트 + 가격 캐시)
    let monitor = Arc::new(WalletMonitor::from_config(&config)?);

    // 텔레그램 봇 구동
    let telegram = TelegramConfig::new(config.telegram_bot_token.clone(), config.telegram_chat_id);
    let bot = TelegramBotHandler::new(telegram, monitor);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("종료 신호 수신, 봇 종료 중...");
        }
        _ = bot.start_polling() => {}
    }

    tracing::info!("Hyperliquid 지갑 감시 봇 종료");

    Ok(())
}
