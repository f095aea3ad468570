//! 연결 관리자.
//!
//! 채널 라이프사이클을 3상태 연결 표시로 옮기고, 송신을 대행한다.
//! 상태는 전송 계층 라이프사이클 이벤트(와 `connect()` 호출)로만 바뀐다.

use hschat_core::error::CoreError;
use hschat_core::models::connection::ConnectionState;
use hschat_core::models::event::{InboundEvent, OutboundEvent};
use hschat_core::models::view::{StatusStyle, StatusView};
use hschat_core::ports::transport::{ChannelConnector, ChatTransport, TransportEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 수신 이벤트 분배 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// 연결 상태가 바뀜
    Status(StatusView),
    /// 상태 변화 없는 라이프사이클 이벤트
    Unchanged,
    /// 이름 있는 서버 이벤트
    Inbound(InboundEvent),
}

/// 연결 관리자
pub struct ConnectionManager {
    state: ConnectionState,
    transport: Option<Arc<dyn ChatTransport>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            transport: None,
        }
    }

    /// 채널 열기
    ///
    /// 상태를 `Connecting`으로 바꾸고 수신 이벤트 스트림을 돌려준다.
    /// 실패하면 `Disconnected`로 되돌린다.
    pub async fn connect(
        &mut self,
        connector: &dyn ChannelConnector,
    ) -> Result<mpsc::Receiver<TransportEvent>, CoreError> {
        self.state = ConnectionState::Connecting;
        match connector.open().await {
            Ok(channel) => {
                info!("채널 열림, 연결 대기 중");
                self.transport = Some(channel.transport);
                Ok(channel.events)
            }
            Err(e) => {
                warn!("채널 열기 실패: {e}");
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    /// 전송 이벤트 분배
    pub fn dispatch(&mut self, event: TransportEvent) -> Dispatch {
        match event {
            TransportEvent::Connect => self.transition(ConnectionState::Connected),
            TransportEvent::Disconnect { reason } => {
                debug!("연결 끊김: {reason}");
                self.transition(ConnectionState::Disconnected)
            }
            TransportEvent::Event { name, data } => {
                Dispatch::Inbound(InboundEvent::decode(&name, data))
            }
        }
    }

    fn transition(&mut self, next: ConnectionState) -> Dispatch {
        if self.state == next {
            return Dispatch::Unchanged;
        }
        info!("연결 상태: {} → {next}", self.state);
        self.state = next;
        Dispatch::Status(status_view(next))
    }

    /// fire-and-forget 송신 (실패는 로그만 남김)
    pub fn send(&self, event: &OutboundEvent) {
        let Some(transport) = &self.transport else {
            debug!("채널 없음, '{}' 이벤트 버림", event.name());
            return;
        };
        if let Err(e) = transport.emit(event) {
            warn!("'{}' 이벤트 송신 실패: {e}", event.name());
        }
    }

    /// 채널 닫기 (상태는 이후 도착하는 `Disconnect`로 바뀐다)
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.close();
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn status(&self) -> StatusView {
        status_view(self.state)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 상태 → 표시 (라벨, 아이콘, 스타일)
pub fn status_view(state: ConnectionState) -> StatusView {
    let (label, icon, style) = match state {
        ConnectionState::Connecting => ("Connexion...", "spinner", StatusStyle::Warning),
        ConnectionState::Connected => ("Connecté", "check-circle", StatusStyle::Success),
        ConnectionState::Disconnected => ("Déconnecté", "exclamation-circle", StatusStyle::Danger),
    };
    StatusView {
        state,
        label: label.to_string(),
        icon: icon.to_string(),
        style,
    }
}
