//! 애플리케이션 설정 구조체.
//!
//! 서버 URL, 재연결 정책, 타이핑 디바운스, 알림 만료 시간, 표시 옵션 등
//! 런타임 설정을 정의한다. JSON 파일([`crate::config_manager`])과 CLI 인자로 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 타이핑 디바운스 설정
    #[serde(default)]
    pub typing: TypingConfig,
    /// 에러 알림 설정
    #[serde(default)]
    pub notice: NoticeConfig,
    /// 표시 설정
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            typing: TypingConfig::default(),
            notice: NoticeConfig::default(),
            ui: UiConfig::default(),
        }
    }

    /// 타이핑 정지 판정까지의 무입력 시간
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.typing.quiet_period_ms)
    }

    /// 에러 알림 자동 제거 시간
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice.ttl_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 서버 설정
// ============================================================

/// 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 서버 기본 URL (http/https, ws/wss 모두 허용)
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Socket.IO 엔드포인트 경로
    #[serde(default = "default_socket_path")]
    pub path: String,
    /// 연결 끊김 시 자동 재연결
    #[serde(default = "default_true")]
    pub reconnect: bool,
    /// 재연결 최대 대기 시간 (초, exponential backoff 상한)
    #[serde(default = "default_max_retry_secs")]
    pub max_retry_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            path: default_socket_path(),
            reconnect: true,
            max_retry_secs: default_max_retry_secs(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_socket_path() -> String {
    "/socket.io/".to_string()
}

fn default_max_retry_secs() -> u64 {
    30
}

// ============================================================
// 타이핑 / 알림 설정
// ============================================================

/// 타이핑 디바운스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingConfig {
    /// 마지막 키 입력 후 typing=false 전송까지의 시간 (ms)
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
        }
    }
}

fn default_quiet_period_ms() -> u64 {
    1_000
}

/// 에러 알림 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// 알림 자동 제거 시간 (ms)
    #[serde(default = "default_notice_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_notice_ttl_ms(),
        }
    }
}

fn default_notice_ttl_ms() -> u64 {
    5_000
}

// ============================================================
// 표시 설정
// ============================================================

/// 표시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// 상담원 연결 제안을 거절할 때 전송하는 문구
    #[serde(default = "default_decline_phrase")]
    pub decline_phrase: String,
    /// 메시지 본문 HTML 이스케이프 여부
    #[serde(default = "default_true")]
    pub escape_html: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            decline_phrase: default_decline_phrase(),
            escape_html: true,
        }
    }
}

fn default_decline_phrase() -> String {
    "Non merci, continuons la discussion".to_string()
}

fn default_true() -> bool {
    true
}
