//! 알림 타입 및 에러 정의.

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 명령어 응답 데이터.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// 응답 텍스트
    pub text: String,
    /// 파싱 모드 (없으면 일반 텍스트)
    pub parse_mode: Option<String>,
}

impl CommandResponse {
    /// Markdown 형식 응답 생성.
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some("Markdown".to_string()),
        }
    }

    /// 일반 텍스트 응답 생성.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
        }
    }
}
