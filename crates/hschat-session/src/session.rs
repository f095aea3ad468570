//! 채팅 세션.
//!
//! 컴포넌트를 묶는 최상위 상태 머신. 전송 이벤트, 사용자 명령, 타이머를
//! 받아 상태를 바꾸고, 핸들러가 끝날 때마다 쌓인 렌더 명령을 표시 표면에
//! 적용한다. 어떤 입력도 세션을 종료시키지 않는다.

use chrono::{DateTime, Utc};
use hschat_core::config::AppConfig;
use hschat_core::error::CoreError;
use hschat_core::models::connection::ConnectionState;
use hschat_core::models::event::{InboundEvent, MessageRoute, OutboundEvent};
use hschat_core::models::message::ChatMessage;
use hschat_core::models::view::{EntryId, EntryView, RenderOp};
use hschat_core::ports::surface::DisplaySurface;
use hschat_core::ports::transport::{ChannelConnector, TransportEvent};
use hschat_suggestion::presenter::present_panel;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::command::SessionCommand;
use crate::connection::{ConnectionManager, Dispatch};
use crate::display_log::DisplayLog;
use crate::format::Formatter;
use crate::handoff::{HandoffFlow, HandoffResponse};
use crate::notice::ErrorSurface;
use crate::renderer::MessageRenderer;
use crate::typing::TypingCoordinator;

/// 채팅 세션
pub struct ChatSession {
    connection: ConnectionManager,
    typing: TypingCoordinator,
    renderer: MessageRenderer,
    handoff: HandoffFlow,
    notices: ErrorSurface,
    log: DisplayLog,
    input: String,
    surface: Arc<dyn DisplaySurface>,
}

impl ChatSession {
    pub fn new(config: &AppConfig, surface: Arc<dyn DisplaySurface>) -> Self {
        Self {
            connection: ConnectionManager::new(),
            typing: TypingCoordinator::new(config.quiet_period()),
            renderer: MessageRenderer::new(Formatter::new(config.ui.escape_html)),
            handoff: HandoffFlow::new(config.ui.decline_phrase.clone()),
            notices: ErrorSurface::new(config.notice_ttl()),
            log: DisplayLog::new(),
            input: String::new(),
            surface,
        }
    }

    /// 채널 열기
    ///
    /// 성공하면 수신 이벤트 스트림을 돌려준다. 이후 연결/끊김은
    /// [`handle_transport`](Self::handle_transport)로 들어오는 라이프사이클
    /// 이벤트가 결정한다.
    pub async fn connect(
        &mut self,
        connector: &dyn ChannelConnector,
    ) -> Result<mpsc::Receiver<TransportEvent>, CoreError> {
        let result = self.connection.connect(connector).await;
        self.log.push_op(RenderOp::SetStatus {
            status: self.connection.status(),
        });
        self.flush();
        result
    }

    /// 전송 이벤트 처리
    pub fn handle_transport(&mut self, event: TransportEvent, now: Instant) {
        match self.connection.dispatch(event) {
            Dispatch::Status(status) => self.log.push_op(RenderOp::SetStatus { status }),
            Dispatch::Unchanged => {}
            Dispatch::Inbound(inbound) => self.handle_inbound(inbound, now),
        }
        self.flush();
    }

    fn handle_inbound(&mut self, event: InboundEvent, now: Instant) {
        let wall = Utc::now();
        match event {
            InboundEvent::Message(payload) => {
                match payload.route(wall) {
                    MessageRoute::Handoff(offer) => {
                        debug!("상담원 연결 제안: {:?}", offer.kind);
                        let view = self.handoff.present(&offer, self.renderer.formatter());
                        self.log.append(EntryView::Handoff(view));
                    }
                    MessageRoute::Assistant { content, timestamp } => {
                        self.renderer.receive(&content, timestamp, wall, &mut self.log);
                    }
                }
                self.renderer.hide_indicator(&mut self.log);
            }
            InboundEvent::Suggestions(payload) => {
                match present_panel(payload.products.as_deref(), wall) {
                    Some(panel) => {
                        self.log.append(EntryView::SuggestionPanel(panel));
                    }
                    None => debug!("빈 제안 목록, 패널 생략"),
                }
            }
            InboundEvent::Error(payload) => {
                let message = payload.message.unwrap_or_default();
                warn!("서버 에러: {message}");
                self.notices.show(message, now, &mut self.log);
            }
            InboundEvent::TypingStatus(payload) => {
                if payload.typing {
                    self.renderer.show_indicator(&mut self.log);
                } else {
                    self.renderer.hide_indicator(&mut self.log);
                }
            }
            InboundEvent::Unknown { name, .. } => debug!("처리하지 않는 이벤트 무시: {name}"),
        }
    }

    /// 사용자 명령 처리
    pub fn handle_command(&mut self, command: SessionCommand, now: Instant) {
        match command {
            SessionCommand::Keystroke(c) => {
                self.input.push(c);
                if let Some(event) = self.typing.on_keystroke(now) {
                    self.connection.send(&event);
                }
            }
            SessionCommand::Submit => self.submit_input(),
            SessionCommand::SubmitText(text) => {
                self.input = text;
                self.submit_input();
            }
            SessionCommand::Activate { entry, action } => self.activate(entry, action),
            SessionCommand::DismissNotice(id) => {
                self.notices.dismiss(id, &mut self.log);
            }
            SessionCommand::RequestSuggestions(preferences) => {
                self.connection
                    .send(&OutboundEvent::GetSuggestions { preferences });
            }
        }
        self.flush();
    }

    fn submit_input(&mut self) {
        let wall: DateTime<Utc> = Utc::now();
        if let Some(event) = self.renderer.submit(&self.input, wall, &mut self.log) {
            self.input.clear();
            self.connection.send(&event);
        }
    }

    fn activate(&mut self, entry: EntryId, action: usize) {
        let Some(EntryView::Handoff(view)) = self.log.get(entry) else {
            warn!("상담원 연결 카드가 아님: {entry}");
            return;
        };
        let Some(action) = view.actions.get(action) else {
            warn!("없는 버튼: {entry} / {action}");
            return;
        };
        match HandoffFlow::resolve(action) {
            HandoffResponse::Open(url) => self.log.push_op(RenderOp::OpenExternal { url }),
            HandoffResponse::Submit(phrase) => {
                self.input = phrase;
                self.submit_input();
            }
        }
    }

    /// 만료된 타이머 처리
    pub fn poll_timers(&mut self, now: Instant) {
        if let Some(event) = self.typing.poll(now) {
            self.connection.send(&event);
        }
        self.notices.poll(now, &mut self.log);
        self.flush();
    }

    /// 가장 이른 대기 타이머
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.typing.next_deadline(), self.notices.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// 채널 닫기
    pub fn close(&mut self) {
        self.connection.close();
    }

    fn flush(&mut self) {
        for op in self.log.drain_ops() {
            self.surface.apply(&op);
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn log(&self) -> &DisplayLog {
        &self.log
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.renderer.history()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_active()
    }

    pub fn typing_indicator(&self) -> Option<EntryId> {
        self.renderer.indicator()
    }

    /// 가장 최근 상담원 연결 카드
    pub fn latest_handoff(&self) -> Option<EntryId> {
        self.log
            .entries()
            .iter()
            .rev()
            .find(|e| matches!(e.entry, EntryView::Handoff(_)))
            .map(|e| e.id)
    }

    /// 가장 최근 알림
    pub fn latest_notice(&self) -> Option<EntryId> {
        self.notices.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ChannelHandle, FakeConnector, RecordingSurface};
    use assert_matches::assert_matches;
    use hschat_core::models::view::{HandoffAction, StatusStyle};
    use serde_json::{json, Value};
    use std::time::Duration;

    struct Fixture {
        session: ChatSession,
        surface: Arc<RecordingSurface>,
        channel: ChannelHandle,
        _events: mpsc::Receiver<TransportEvent>,
    }

    async fn connected() -> Fixture {
        let surface = Arc::new(RecordingSurface::default());
        let mut session = ChatSession::new(&AppConfig::default(), surface.clone());
        let (connector, channel) = FakeConnector::new();
        let events = session.connect(&connector).await.unwrap();
        session.handle_transport(TransportEvent::Connect, Instant::now());
        surface.take_ops();
        Fixture {
            session,
            surface,
            channel,
            _events: events,
        }
    }

    fn event(name: &str, data: Value) -> TransportEvent {
        TransportEvent::Event {
            name: name.to_string(),
            data,
        }
    }

    fn type_text(session: &mut ChatSession, text: &str, now: Instant) {
        for c in text.chars() {
            session.handle_command(SessionCommand::Keystroke(c), now);
        }
    }

    #[tokio::test]
    async fn connect_shows_connecting_then_connected() {
        let surface = Arc::new(RecordingSurface::default());
        let mut session = ChatSession::new(&AppConfig::default(), surface.clone());
        let (connector, _channel) = FakeConnector::new();
        let _events = session.connect(&connector).await.unwrap();
        session.handle_transport(TransportEvent::Connect, Instant::now());

        let labels: Vec<_> = surface
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                RenderOp::SetStatus { status } => Some(status.label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["Connexion...", "Connecté"]);
        assert_eq!(session.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn failed_connect_shows_disconnected() {
        let surface = Arc::new(RecordingSurface::default());
        let mut session = ChatSession::new(&AppConfig::default(), surface.clone());
        assert!(session.connect(&FakeConnector::failing()).await.is_err());
        assert_matches!(
            surface.ops().last(),
            Some(RenderOp::SetStatus { status }) if status.style == StatusStyle::Danger
        );
    }

    #[tokio::test]
    async fn submit_sends_message_and_shows_indicator() {
        let mut f = connected().await;
        let now = Instant::now();
        type_text(&mut f.session, "Salam", now);
        f.session.handle_command(SessionCommand::Submit, now);

        let sent = f.channel.transport.sent();
        assert_eq!(sent[0], OutboundEvent::Typing { typing: true });
        assert_matches!(&sent[1], OutboundEvent::Message { content, .. } if content == "Salam");
        assert_eq!(f.session.input(), "");
        assert!(f.session.typing_indicator().is_some());
        assert!(f.surface.ops().contains(&RenderOp::ClearInput));
    }

    #[tokio::test]
    async fn blank_submit_sends_nothing() {
        let mut f = connected().await;
        f.session
            .handle_command(SessionCommand::SubmitText("   ".to_string()), Instant::now());
        assert!(f.channel.transport.sent().is_empty());
        assert!(f.session.log().is_empty());
    }

    #[tokio::test]
    async fn typing_stop_after_quiet_period() {
        let mut f = connected().await;
        let t0 = Instant::now();
        type_text(&mut f.session, "abcde", t0);
        assert_eq!(f.session.next_deadline(), Some(t0 + Duration::from_secs(1)));

        f.session.poll_timers(t0 + Duration::from_millis(999));
        f.session.poll_timers(t0 + Duration::from_secs(1));
        f.session.poll_timers(t0 + Duration::from_secs(2));

        assert_eq!(
            f.channel.transport.sent(),
            vec![
                OutboundEvent::Typing { typing: true },
                OutboundEvent::Typing { typing: false },
            ]
        );
    }

    #[tokio::test]
    async fn message_without_type_hides_indicator() {
        let mut f = connected().await;
        let now = Instant::now();
        f.session.handle_transport(event("typing_status", json!({ "typing": true })), now);
        assert!(f.session.typing_indicator().is_some());

        f.session
            .handle_transport(event("message", json!({ "content": "**Prix** 120 MAD" })), now);

        assert!(f.session.typing_indicator().is_none());
        assert_eq!(f.session.messages().len(), 1);
        assert!(!f
            .session
            .log()
            .entries()
            .iter()
            .any(|e| e.entry == EntryView::TypingIndicator));
    }

    #[tokio::test]
    async fn handoff_message_hides_indicator_and_appends_card() {
        let mut f = connected().await;
        let now = Instant::now();
        f.session.handle_transport(event("typing_status", json!({ "typing": true })), now);
        f.session.handle_transport(
            event(
                "message",
                json!({
                    "type": "human_contact",
                    "content": "Voici nos coordonnées",
                    "whatsapp_link": "https://wa.me/212600000000",
                    "phone_number": "+212600000000"
                }),
            ),
            now,
        );

        assert!(f.session.typing_indicator().is_none());
        assert!(f.session.messages().is_empty());
        let id = f.session.latest_handoff().unwrap();
        f.surface.take_ops();

        f.session
            .handle_command(SessionCommand::Activate { entry: id, action: 1 }, now);
        assert_eq!(
            f.surface.ops(),
            vec![RenderOp::OpenExternal {
                url: "tel:+212600000000".to_string()
            }]
        );
        assert!(f.channel.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn decline_matches_typed_phrase() {
        let mut declined = connected().await;
        let now = Instant::now();
        declined.session.handle_transport(
            event(
                "message",
                json!({ "type": "human_contact_offer", "content": "Besoin d'un conseiller ?" }),
            ),
            now,
        );
        let id = declined.session.latest_handoff().unwrap();
        let Some(EntryView::Handoff(view)) = declined.session.log().get(id) else {
            panic!("expected handoff card");
        };
        let decline = view
            .actions
            .iter()
            .position(|a| matches!(a, HandoffAction::Decline { .. }))
            .unwrap();
        declined
            .session
            .handle_command(SessionCommand::Activate { entry: id, action: decline }, now);

        let mut typed = connected().await;
        typed.session.handle_command(
            SessionCommand::SubmitText("Non merci, continuons la discussion".to_string()),
            now,
        );

        let content_of = |f: &Fixture| match f.channel.transport.sent().as_slice() {
            [OutboundEvent::Message { content, .. }] => content.clone(),
            other => panic!("unexpected sends: {other:?}"),
        };
        assert_eq!(content_of(&declined), content_of(&typed));
        assert_eq!(declined.session.messages()[0].content, typed.session.messages()[0].content);
    }

    #[tokio::test]
    async fn activate_on_non_handoff_is_ignored() {
        let mut f = connected().await;
        let now = Instant::now();
        f.session.handle_command(SessionCommand::SubmitText("Salam".to_string()), now);
        let message_id = f.session.log().entries()[0].id;
        f.surface.take_ops();

        f.session
            .handle_command(SessionCommand::Activate { entry: message_id, action: 0 }, now);
        f.session
            .handle_command(SessionCommand::Activate { entry: EntryId(999), action: 0 }, now);
        assert!(f.surface.ops().is_empty());
    }

    #[tokio::test]
    async fn empty_suggestions_render_nothing() {
        let mut f = connected().await;
        let now = Instant::now();
        f.session.handle_transport(event("suggestions", json!({ "products": [] })), now);
        f.session.handle_transport(event("suggestions", json!({})), now);
        assert!(f.session.log().is_empty());
    }

    #[tokio::test]
    async fn suggestions_panel_defaults_price() {
        let mut f = connected().await;
        f.session.handle_transport(
            event(
                "suggestions",
                json!({ "products": [{ "metadata": { "name": "Sellou" } }] }),
            ),
            Instant::now(),
        );
        assert_matches!(
            &f.session.log().entries()[0].entry,
            EntryView::SuggestionPanel(panel) if panel.cards[0].price_text == "0 MAD"
        );
    }

    #[tokio::test]
    async fn error_notice_expires() {
        let mut f = connected().await;
        let t = Instant::now();
        f.session
            .handle_transport(event("error", json!({ "message": "Erreur serveur" })), t);
        let id = f.session.latest_notice().unwrap();

        f.session.poll_timers(t + Duration::from_millis(4_900));
        assert!(f.session.log().get(id).is_some());

        f.session.poll_timers(t + Duration::from_secs(5));
        assert!(f.session.log().get(id).is_none());
        assert!(f.surface.ops().contains(&RenderOp::Remove { id }));
    }

    #[tokio::test]
    async fn dismissed_notice_is_not_removed_twice() {
        let mut f = connected().await;
        let t = Instant::now();
        f.session.handle_transport(event("error", json!("Erreur")), t);
        let id = f.session.latest_notice().unwrap();

        f.session.handle_command(SessionCommand::DismissNotice(id), t);
        f.session.handle_command(SessionCommand::DismissNotice(id), t);
        f.session.poll_timers(t + Duration::from_secs(5));

        let removes = f
            .surface
            .ops()
            .into_iter()
            .filter(|op| matches!(op, RenderOp::Remove { .. }))
            .count();
        assert_eq!(removes, 1);
    }

    #[tokio::test]
    async fn suggestion_request_is_sent() {
        let mut f = connected().await;
        f.session.handle_command(
            SessionCommand::RequestSuggestions(json!({ "budget": "premium" })),
            Instant::now(),
        );
        assert_eq!(
            f.channel.transport.sent(),
            vec![OutboundEvent::GetSuggestions {
                preferences: json!({ "budget": "premium" })
            }]
        );
    }

    #[tokio::test]
    async fn disconnect_updates_status_only() {
        let mut f = connected().await;
        f.session.handle_transport(
            TransportEvent::Disconnect {
                reason: "ping timeout".to_string(),
            },
            Instant::now(),
        );
        assert_eq!(f.session.connection_state(), ConnectionState::Disconnected);
        assert!(f.session.log().is_empty());
        assert_matches!(
            f.surface.ops().as_slice(),
            [RenderOp::SetStatus { status }] if status.label == "Déconnecté"
        );
    }
}
