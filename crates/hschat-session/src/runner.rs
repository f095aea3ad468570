//! 세션 실행기.
//!
//! 수신 이벤트, 사용자 명령, 다음 타이머를 `tokio::select!`로 다중화해
//! 세션에 순서대로 넣는다. 명령 채널이 닫히면 채널을 닫고 종료한다.

use hschat_core::error::CoreError;
use hschat_core::ports::transport::{ChannelConnector, TransportEvent};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::command::SessionCommand;
use crate::session::ChatSession;

pub struct SessionRunner {
    session: ChatSession,
}

impl SessionRunner {
    pub fn new(session: ChatSession) -> Self {
        Self { session }
    }

    /// 연결 후 명령 채널이 닫힐 때까지 실행, 종료된 세션을 돌려준다.
    pub async fn run(
        mut self,
        connector: &dyn ChannelConnector,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> Result<ChatSession, CoreError> {
        let mut events = self.session.connect(connector).await?;
        let mut events_open = true;

        loop {
            let deadline = self.session.next_deadline().map(Instant::from_std);

            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => self.session.handle_transport(event, now()),
                    None => {
                        warn!("수신 채널 닫힘");
                        events_open = false;
                        self.session.handle_transport(
                            TransportEvent::Disconnect { reason: "channel closed".to_string() },
                            now(),
                        );
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => {
                        debug!("명령: {command:?}");
                        self.session.handle_command(command, now());
                    }
                    None => {
                        info!("명령 채널 닫힘, 세션 종료");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.session.poll_timers(now());
                }
            }
        }

        self.session.close();
        Ok(self.session)
    }
}

/// tokio 시계 기준 현재 시각 (테스트에서 시간 정지 가능)
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeConnector, RecordingSurface};
    use hschat_core::config::AppConfig;
    use hschat_core::models::connection::ConnectionState;
    use hschat_core::models::event::OutboundEvent;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn session() -> ChatSession {
        ChatSession::new(&AppConfig::default(), Arc::new(RecordingSurface::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn typing_stop_fires_on_timer() {
        let (connector, channel) = FakeConnector::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = tokio::spawn(async move {
            SessionRunner::new(session()).run(&connector, rx).await
        });

        channel.push_lifecycle(TransportEvent::Connect).await;
        tx.send(SessionCommand::Keystroke('a')).unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        drop(tx);

        let session = runner.await.unwrap().unwrap();
        assert_eq!(
            channel.transport.sent(),
            vec![
                OutboundEvent::Typing { typing: true },
                OutboundEvent::Typing { typing: false },
            ]
        );
        assert!(!session.is_typing());
        assert!(channel.transport.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn notice_expires_on_timer() {
        let (connector, channel) = FakeConnector::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = tokio::spawn(async move {
            SessionRunner::new(session()).run(&connector, rx).await
        });

        channel.push("error", json!({ "message": "Erreur" })).await;
        tokio::time::sleep(Duration::from_secs(6)).await;
        drop(tx);

        let session = runner.await.unwrap().unwrap();
        assert!(session.log().is_empty());
        assert!(session.latest_notice().is_none());
    }

    #[tokio::test]
    async fn closed_event_stream_marks_disconnected() {
        let (connector, channel) = FakeConnector::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = tokio::spawn(async move {
            SessionRunner::new(session()).run(&connector, rx).await
        });

        channel.push_lifecycle(TransportEvent::Connect).await;
        drop(channel);
        tokio::task::yield_now().await;
        drop(tx);

        let session = runner.await.unwrap().unwrap();
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn open_failure_is_returned() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let result = SessionRunner::new(session())
            .run(&FakeConnector::failing(), rx)
            .await;
        assert!(result.is_err());
    }
}
