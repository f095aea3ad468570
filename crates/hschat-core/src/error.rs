//! HS Chat 핵심 에러 타입.
//!
//! 어댑터 crate와 세션 crate는 모두 `CoreError`를 반환한다.
//! 세션에서 발생하는 어떤 에러도 세션 자체를 종료시키지 않는다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 네트워크 에러 (연결 실패, 핸드셰이크 실패)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 와이어 프로토콜 위반 (잘못된 Engine.IO/Socket.IO 프레임)
    #[error("프로토콜 에러: {0}")]
    Protocol(String),

    /// 전송 채널이 닫혔거나 아직 열리지 않음
    #[error("전송 채널 에러: {0}")]
    Transport(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
