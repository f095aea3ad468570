//! 채팅 메시지 모델.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 메시지 작성자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// 사용자
    User,
    /// 자동 응답 어시스턴트
    Assistant,
}

impl Sender {
    /// 표시 계층에서 쓰는 역할 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// 채팅 메시지 (생성 후 불변)
///
/// `timestamp`는 표시용 메타데이터이며 로그 순서에는 영향을 주지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 원문 내용
    pub content: String,
    /// 작성자
    pub sender: Sender,
    /// 작성 시각
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// 사용자 메시지 생성
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::User,
            timestamp,
        }
    }

    /// 어시스턴트 메시지 생성
    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::Assistant,
            timestamp,
        }
    }
}

/// 서버 타임스탬프 파싱
///
/// RFC 3339와 오프셋 없는 ISO-8601(로컬 시각으로 해석)을 허용한다.
/// 해석할 수 없으면 `None`.
pub fn parse_server_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 표시용 시각 문자열 (HH:MM, 로컬 시간대)
pub fn display_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}
