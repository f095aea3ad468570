//! Engine.IO v4 / Socket.IO v4 텍스트 프레임 코덱.
//!
//! WebSocket 텍스트 프레임 하나가 Engine.IO 패킷 하나에 대응한다.
//! Engine.IO `4`(message) 패킷의 본문이 Socket.IO 패킷이다.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                    ping / pong
//! 40 / 40{"sid":".."}                                      socket connect
//! 41                                                       socket disconnect
//! 42["message",{"content":"Bonjour"}]                      socket event
//! 44{"message":"Not authorized"}                           connect_error
//! ```

use hschat_core::error::CoreError;
use serde::Deserialize;
use serde_json::Value;

/// 네임스페이스 연결 요청 (기본 네임스페이스)
pub const SOCKET_CONNECT: &str = "40";
/// 네임스페이스 연결 해제
pub const SOCKET_DISCONNECT: &str = "41";

/// Engine.IO open 핸드셰이크
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    #[serde(default)]
    pub sid: String,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            sid: String::new(),
            ping_interval: default_ping_interval(),
            ping_timeout: default_ping_timeout(),
        }
    }
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

/// Engine.IO 패킷
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// Socket.IO 패킷
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, data: Value },
    Ack { id: u64, data: Value },
    ConnectError(Value),
}

/// 텍스트 프레임 디코딩
pub fn decode(frame: &str) -> Result<EnginePacket, CoreError> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| CoreError::Protocol("빈 프레임".to_string()))?;
    let body = chars.as_str();

    match kind {
        '0' => {
            let handshake = if body.is_empty() {
                Handshake::default()
            } else {
                serde_json::from_str(body)
                    .map_err(|e| CoreError::Protocol(format!("핸드셰이크 파싱 실패: {e}")))?
            };
            Ok(EnginePacket::Open(handshake))
        }
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(body.to_string())),
        '3' => Ok(EnginePacket::Pong(body.to_string())),
        '4' => decode_socket(body).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(CoreError::Protocol(format!(
            "알 수 없는 Engine.IO 패킷 타입: {other}"
        ))),
    }
}

fn decode_socket(body: &str) -> Result<SocketPacket, CoreError> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| CoreError::Protocol("빈 Socket.IO 패킷".to_string()))?;
    let rest = skip_namespace(chars.as_str());

    // ack id: JSON 앞의 숫자열
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    let (ack_id, json) = rest.split_at(digits);
    let ack_id = ack_id.parse::<u64>().ok();

    match kind {
        '0' => Ok(SocketPacket::Connect(parse_optional(json)?)),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => {
            let Value::Array(mut items) = parse_json(json)? else {
                return Err(CoreError::Protocol("이벤트 본문이 배열이 아님".to_string()));
            };
            if items.is_empty() {
                return Err(CoreError::Protocol("이벤트 이름 누락".to_string()));
            }
            let name = match items.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(CoreError::Protocol(format!(
                        "이벤트 이름이 문자열이 아님: {other}"
                    )))
                }
            };
            let data = if items.is_empty() {
                Value::Null
            } else {
                items.swap_remove(0)
            };
            Ok(SocketPacket::Event { name, data })
        }
        '3' => {
            let id = ack_id.ok_or_else(|| CoreError::Protocol("ack id 누락".to_string()))?;
            let data = match parse_json(json)? {
                Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
                Value::Array(_) => Value::Null,
                other => other,
            };
            Ok(SocketPacket::Ack { id, data })
        }
        '4' => Ok(SocketPacket::ConnectError(
            parse_optional(json)?.unwrap_or(Value::Null),
        )),
        '5' | '6' => Err(CoreError::Protocol(
            "바이너리 Socket.IO 패킷은 지원하지 않음".to_string(),
        )),
        other => Err(CoreError::Protocol(format!(
            "알 수 없는 Socket.IO 패킷 타입: {other}"
        ))),
    }
}

/// `/ns,` 접두사 제거
fn skip_namespace(rest: &str) -> &str {
    if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        }
    } else {
        rest
    }
}

fn parse_json(json: &str) -> Result<Value, CoreError> {
    serde_json::from_str(json).map_err(|e| CoreError::Protocol(format!("JSON 파싱 실패: {e}")))
}

fn parse_optional(json: &str) -> Result<Option<Value>, CoreError> {
    if json.is_empty() {
        Ok(None)
    } else {
        parse_json(json).map(Some)
    }
}

/// 이벤트 프레임 인코딩: `42["name",data]`
pub fn encode_event(name: &str, data: &Value) -> Result<String, CoreError> {
    let body = serde_json::to_string(&serde_json::json!([name, data]))?;
    Ok(format!("42{body}"))
}

/// ping에 대한 pong 프레임
pub fn encode_pong(probe: &str) -> String {
    format!("3{probe}")
}
