//! 연결 상태 모델.

use serde::{Deserialize, Serialize};

/// 채널 연결 상태
///
/// 연결 관리자만 변경하며, 전송 계층 라이프사이클 콜백에서만 전환된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// 연결 시도 중
    Connecting,
    /// 연결됨
    Connected,
    /// 연결 끊김
    Disconnected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
        }
    }
}
