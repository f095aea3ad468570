//! 채널 이벤트 모델.
//!
//! 서버 → 클라이언트(`InboundEvent`), 클라이언트 → 서버(`OutboundEvent`)
//! 이름 있는 이벤트와 페이로드. 수신 페이로드의 잘못된 필드는 에러로
//! 전파하지 않고 필드마다 기본값으로 복구한다. 페이로드 자체가 객체가
//! 아니면 전체 기본값을 쓴다.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::handoff::{HandoffKind, HandoffOffer};
use crate::models::lenient;
use crate::models::message::parse_server_timestamp;
use crate::models::suggestion::ProductSuggestion;

/// 수신 이벤트 이름
pub mod names {
    pub const MESSAGE: &str = "message";
    pub const SUGGESTIONS: &str = "suggestions";
    pub const ERROR: &str = "error";
    pub const TYPING_STATUS: &str = "typing_status";
    pub const TYPING: &str = "typing";
    pub const GET_SUGGESTIONS: &str = "get_suggestions";
}

/// `message` 이벤트 페이로드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// 판별값 (`human_contact`, `human_contact_offer`, 그 외)
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub whatsapp_link: Option<String>,
    /// 숫자로 오면 텍스트로 변환
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone_number: Option<String>,
}

/// `message` 페이로드 라우팅 결과
#[derive(Debug, Clone, PartialEq)]
pub enum MessageRoute {
    /// 상담원 연결 흐름으로
    Handoff(HandoffOffer),
    /// 메시지 렌더러로 (어시스턴트 메시지)
    Assistant {
        content: String,
        timestamp: Option<DateTime<Utc>>,
    },
}

impl MessagePayload {
    /// 서버 타임스탬프 (해석 불가 시 `None`)
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_server_timestamp)
    }

    /// `type` 판별값에 따라 목적지 결정
    pub fn route(self, now: DateTime<Utc>) -> MessageRoute {
        let timestamp = self.parsed_timestamp();
        let content = self.content.unwrap_or_default();

        match self.kind.as_deref().and_then(HandoffKind::from_type) {
            Some(kind) => MessageRoute::Handoff(HandoffOffer {
                kind,
                content,
                contact_link: self.whatsapp_link.unwrap_or_default(),
                phone_number: match kind {
                    HandoffKind::DirectContact => Some(self.phone_number.unwrap_or_default()),
                    HandoffKind::OfferToContact => None,
                },
                timestamp: timestamp.unwrap_or(now),
            }),
            None => MessageRoute::Assistant { content, timestamp },
        }
    }
}

/// `suggestions` 이벤트 페이로드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionsPayload {
    #[serde(default)]
    pub products: Option<Vec<ProductSuggestion>>,
}

/// `error` 이벤트 페이로드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
}

/// `typing_status` 이벤트 페이로드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypingStatusPayload {
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub typing: bool,
}

/// 서버 → 클라이언트 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Message(MessagePayload),
    Suggestions(SuggestionsPayload),
    Error(ErrorPayload),
    TypingStatus(TypingStatusPayload),
    /// 구독하지 않은 이벤트
    Unknown { name: String, data: Value },
}

impl InboundEvent {
    /// 이름과 JSON 데이터로부터 이벤트 디코딩
    ///
    /// 실패하지 않는다: 형식이 맞지 않는 필드는 기본값으로 대체된다.
    pub fn decode(name: &str, data: Value) -> Self {
        match name {
            names::MESSAGE => InboundEvent::Message(decode_lenient(name, data)),
            names::SUGGESTIONS => InboundEvent::Suggestions(decode_suggestions(data)),
            names::ERROR => InboundEvent::Error(decode_error(data)),
            names::TYPING_STATUS => InboundEvent::TypingStatus(decode_lenient(name, data)),
            _ => {
                debug!("구독하지 않은 이벤트: {name}");
                InboundEvent::Unknown {
                    name: name.to_string(),
                    data,
                }
            }
        }
    }
}

fn decode_lenient<T>(name: &str, data: Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    match serde_json::from_value(data) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("'{name}' 페이로드 디코딩 실패, 기본값 사용: {e}");
            T::default()
        }
    }
}

/// 상품 목록은 항목 단위로 복구한다 (한 항목이 깨져도 나머지는 표시).
fn decode_suggestions(data: Value) -> SuggestionsPayload {
    let products = match data.get("products") {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .cloned()
                .map(|item| {
                    let metadata = item.get("metadata").cloned().unwrap_or(Value::Null);
                    ProductSuggestion {
                        metadata: decode_lenient::<Option<_>>("suggestions.metadata", metadata),
                    }
                })
                .collect(),
        ),
        _ => None,
    };
    SuggestionsPayload { products }
}

/// 서버가 문자열만 보내는 경우도 메시지로 취급
fn decode_error(data: Value) -> ErrorPayload {
    match data {
        Value::String(message) => ErrorPayload {
            message: Some(message),
        },
        other => decode_lenient(names::ERROR, other),
    }
}

/// 클라이언트 → 서버 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// 사용자 메시지
    Message {
        content: String,
        timestamp: DateTime<Utc>,
    },
    /// 타이핑 시작/정지
    Typing { typing: bool },
    /// 상품 제안 요청
    GetSuggestions { preferences: Value },
}

impl OutboundEvent {
    pub fn message(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        OutboundEvent::Message {
            content: content.into(),
            timestamp,
        }
    }

    /// 와이어 이벤트 이름
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Message { .. } => names::MESSAGE,
            OutboundEvent::Typing { .. } => names::TYPING,
            OutboundEvent::GetSuggestions { .. } => names::GET_SUGGESTIONS,
        }
    }

    /// 와이어 페이로드 (JSON)
    pub fn payload(&self) -> Value {
        match self {
            OutboundEvent::Message { content, timestamp } => serde_json::json!({
                "content": content,
                "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
            OutboundEvent::Typing { typing } => serde_json::json!({ "typing": typing }),
            OutboundEvent::GetSuggestions { preferences } => {
                serde_json::json!({ "preferences": preferences })
            }
        }
    }
}
