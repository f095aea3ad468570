//! 테스트 더블.
//!
//! 송신 이벤트를 기록하는 전송 채널, 렌더 명령을 기록하는 표시 표면,
//! 테스트가 수신 이벤트를 밀어 넣을 수 있는 채널 생성기.

use async_trait::async_trait;
use hschat_core::error::CoreError;
use hschat_core::models::event::OutboundEvent;
use hschat_core::models::view::RenderOp;
use hschat_core::ports::surface::DisplaySurface;
use hschat_core::ports::transport::{Channel, ChannelConnector, ChatTransport, TransportEvent};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 송신 기록 전송 채널
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundEvent>>,
    fail: AtomicBool,
    closed: AtomicBool,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutboundEvent> {
        self.sent.lock().clone()
    }

    pub fn take_sent(&self) -> Vec<OutboundEvent> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// 이후 송신을 실패시킴
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl ChatTransport for RecordingTransport {
    fn emit(&self, event: &OutboundEvent) -> Result<(), CoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Transport("테스트 송신 실패".to_string()));
        }
        self.sent.lock().push(event.clone());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// 렌더 명령 기록 표면
#[derive(Default)]
pub struct RecordingSurface {
    ops: Mutex<Vec<RenderOp>>,
}

impl RecordingSurface {
    pub fn ops(&self) -> Vec<RenderOp> {
        self.ops.lock().clone()
    }

    pub fn take_ops(&self) -> Vec<RenderOp> {
        std::mem::take(&mut *self.ops.lock())
    }
}

impl DisplaySurface for RecordingSurface {
    fn apply(&self, op: &RenderOp) {
        self.ops.lock().push(op.clone());
    }
}

/// 테스트 쪽 채널 손잡이
pub struct ChannelHandle {
    pub transport: Arc<RecordingTransport>,
    pub events: mpsc::Sender<TransportEvent>,
}

impl ChannelHandle {
    /// 이름 있는 서버 이벤트 밀어 넣기
    pub async fn push(&self, name: &str, data: Value) {
        let _ = self
            .events
            .send(TransportEvent::Event {
                name: name.to_string(),
                data,
            })
            .await;
    }

    pub async fn push_lifecycle(&self, event: TransportEvent) {
        let _ = self.events.send(event).await;
    }
}

/// 채널을 한 번만 열어 주는 생성기
pub struct FakeConnector {
    channel: Mutex<Option<Channel>>,
}

impl FakeConnector {
    pub fn new() -> (Self, ChannelHandle) {
        let transport = Arc::new(RecordingTransport::default());
        let (tx, rx) = mpsc::channel(64);
        let connector = Self {
            channel: Mutex::new(Some(Channel {
                transport: transport.clone(),
                events: rx,
            })),
        };
        (connector, ChannelHandle { transport, events: tx })
    }

    /// 항상 실패하는 생성기
    pub fn failing() -> Self {
        Self {
            channel: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChannelConnector for FakeConnector {
    async fn open(&self) -> Result<Channel, CoreError> {
        self.channel
            .lock()
            .take()
            .ok_or_else(|| CoreError::Network("테스트 채널 없음".to_string()))
    }
}
