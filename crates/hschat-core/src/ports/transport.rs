//! 전송 채널 포트.
//!
//! 구현: `hschat-network` crate (Socket.IO over tokio-tungstenite)

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::CoreError;
use crate::models::event::OutboundEvent;

/// 전송 계층에서 올라오는 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// 채널 연결됨 (핸드셰이크 완료)
    Connect,
    /// 채널 끊김
    Disconnect { reason: String },
    /// 이름 있는 서버 이벤트
    Event {
        name: String,
        data: serde_json::Value,
    },
}

/// 송신 핸들
///
/// 송신은 fire-and-forget: 응답을 기다리지 않고, 재시도하지 않는다.
/// 연결이 끊긴 상태의 송신은 조용히 버려진다.
pub trait ChatTransport: Send + Sync {
    /// 이벤트 송신
    fn emit(&self, event: &OutboundEvent) -> Result<(), CoreError>;

    /// 채널 종료 요청
    fn close(&self);
}

/// 열린 채널 (송신 핸들 + 수신 이벤트 스트림)
pub struct Channel {
    pub transport: Arc<dyn ChatTransport>,
    pub events: mpsc::Receiver<TransportEvent>,
}

/// 채널 생성기
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    /// 채널을 열고 수신 이벤트를 구독
    ///
    /// 연결 수립은 비동기로 진행되며, 결과는 `TransportEvent::Connect` /
    /// `TransportEvent::Disconnect`로 전달된다.
    async fn open(&self) -> Result<Channel, CoreError>;
}
