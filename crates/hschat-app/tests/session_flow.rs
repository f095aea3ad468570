//! 세션 흐름 통합 테스트.
//!
//! 기록용 전송 채널 + 기록용 표시 표면으로 세션 전체 대화 흐름 검증.

use hschat_core::config::AppConfig;
use hschat_core::models::connection::ConnectionState;
use hschat_core::models::event::OutboundEvent;
use hschat_core::models::message::Sender;
use hschat_core::models::view::{EntryView, HandoffAction, RenderOp};
use hschat_core::ports::transport::TransportEvent;
use hschat_session::command::SessionCommand;
use hschat_session::session::ChatSession;
use hschat_session::testing::{ChannelHandle, FakeConnector, RecordingSurface};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

struct Harness {
    session: ChatSession,
    surface: Arc<RecordingSurface>,
    channel: ChannelHandle,
    _events: mpsc::Receiver<TransportEvent>,
}

async fn start(config: AppConfig) -> Harness {
    let surface = Arc::new(RecordingSurface::default());
    let mut session = ChatSession::new(&config, surface.clone());
    let (connector, channel) = FakeConnector::new();
    let events = session.connect(&connector).await.unwrap();
    session.handle_transport(TransportEvent::Connect, Instant::now());
    Harness {
        session,
        surface,
        channel,
        _events: events,
    }
}

fn server_event(name: &str, data: Value) -> TransportEvent {
    TransportEvent::Event {
        name: name.to_string(),
        data,
    }
}

fn type_line(session: &mut ChatSession, text: &str, now: Instant) {
    for c in text.chars() {
        session.handle_command(SessionCommand::Keystroke(c), now);
    }
    session.handle_command(SessionCommand::Submit, now);
}

#[tokio::test]
async fn full_conversation() {
    let mut h = start(AppConfig::default()).await;
    let t0 = Instant::now();

    // 1. 사용자 입력 → typing 시작 + 메시지 전송 + 타이핑 표시
    type_line(&mut h.session, "Je cherche des gâteaux", t0);
    assert!(h.session.typing_indicator().is_some());

    // 2. 서버 타이핑 상태 → 표시 교체 (여전히 1개)
    h.session
        .handle_transport(server_event("typing_status", json!({ "typing": true })), t0);
    let indicators = h
        .session
        .log()
        .entries()
        .iter()
        .filter(|e| e.entry == EntryView::TypingIndicator)
        .count();
    assert_eq!(indicators, 1);

    // 3. 어시스턴트 응답 → 포맷 + 타이핑 표시 제거
    h.session.handle_transport(
        server_event(
            "message",
            json!({
                "type": "text",
                "content": "**Cornes de gazelle**\nProduit: Cornes de gazelle | 150 MAD",
                "timestamp": "2026-03-01T10:15:00.123456"
            }),
        ),
        t0,
    );
    assert!(h.session.typing_indicator().is_none());

    // 4. 상품 제안
    h.session.handle_transport(
        server_event(
            "suggestions",
            json!({ "products": [
                { "metadata": { "name": "Cornes de gazelle", "category": "Pâtisserie", "price": 150, "price_tier": "premium" } },
                { "metadata": {} }
            ]}),
        ),
        t0,
    );

    // 5. 정적 구간 후 typing 정지
    h.session.poll_timers(t0 + Duration::from_secs(1));

    let sent = h.channel.transport.sent();
    assert_eq!(sent.first(), Some(&OutboundEvent::Typing { typing: true }));
    assert_eq!(sent.last(), Some(&OutboundEvent::Typing { typing: false }));
    assert_eq!(sent.len(), 3);

    let kinds: Vec<_> = h
        .session
        .log()
        .entries()
        .iter()
        .map(|e| match &e.entry {
            EntryView::Message(m) => m.sender.as_str(),
            EntryView::SuggestionPanel(_) => "panel",
            EntryView::Handoff(_) => "handoff",
            EntryView::TypingIndicator => "typing",
            EntryView::Notice(_) => "notice",
        })
        .collect();
    assert_eq!(kinds, ["user", "assistant", "panel"]);

    let Some(EntryView::Message(reply)) = h.session.log().entries().get(1).map(|e| &e.entry)
    else {
        panic!("expected assistant message");
    };
    assert_eq!(
        reply.html,
        "<strong>Cornes de gazelle</strong><br><strong>Produit: Cornes de gazelle </strong>| <span class=\"price\">150 MAD</span>"
    );
    assert_eq!(reply.time, "10:15");

    let Some(EntryView::SuggestionPanel(panel)) =
        h.session.log().entries().get(2).map(|e| &e.entry)
    else {
        panic!("expected panel");
    };
    assert_eq!(panel.cards[0].price_text, "150 MAD");
    assert_eq!(panel.cards[1].name, "Produit");
    assert_eq!(panel.cards[1].price_text, "0 MAD");
    assert_eq!(panel.cards[1].tier_label, "économique");
}

#[tokio::test]
async fn handoff_offer_decline_round_trip() {
    let mut h = start(AppConfig::default()).await;
    let now = Instant::now();

    h.session.handle_transport(
        server_event(
            "message",
            json!({
                "type": "human_contact_offer",
                "content": "Souhaitez-vous parler à un conseiller ?",
                "whatsapp_link": "https://wa.me/212600000000"
            }),
        ),
        now,
    );
    let card = h.session.latest_handoff().unwrap();
    let Some(EntryView::Handoff(view)) = h.session.log().get(card) else {
        panic!("expected handoff");
    };
    assert_eq!(view.title, "Besoin d'aide supplémentaire ?");
    let decline = view
        .actions
        .iter()
        .position(|a| matches!(a, HandoffAction::Decline { .. }))
        .unwrap();

    // 수락 → 외부 링크
    h.surface.take_ops();
    h.session
        .handle_command(SessionCommand::Activate { entry: card, action: 0 }, now);
    assert_eq!(
        h.surface.take_ops(),
        vec![RenderOp::OpenExternal {
            url: "https://wa.me/212600000000".to_string()
        }]
    );

    // 거절 → 일반 메시지로 전송, 제안 카드는 로그에 남음
    h.session
        .handle_command(SessionCommand::Activate { entry: card, action: decline }, now);
    let last = h.session.messages().last().unwrap();
    assert_eq!(last.sender, Sender::User);
    assert_eq!(last.content, "Non merci, continuons la discussion");
    assert!(h.session.log().get(card).is_some());
    assert!(matches!(
        h.channel.transport.sent().last(),
        Some(OutboundEvent::Message { content, .. }) if content == "Non merci, continuons la discussion"
    ));
}

#[tokio::test]
async fn configured_decline_phrase_is_used() {
    let mut config = AppConfig::default();
    config.ui.decline_phrase = "Non, merci".to_string();
    let mut h = start(config).await;
    let now = Instant::now();

    h.session.handle_transport(
        server_event("message", json!({ "type": "human_contact_offer", "content": "?" })),
        now,
    );
    let card = h.session.latest_handoff().unwrap();
    h.session
        .handle_command(SessionCommand::Activate { entry: card, action: 1 }, now);
    assert_eq!(h.session.messages()[0].content, "Non, merci");
}

#[tokio::test]
async fn errors_and_disconnects_never_end_session() {
    let mut h = start(AppConfig::default()).await;
    let t = Instant::now();

    h.session.handle_transport(server_event("error", json!({ "message": "Service indisponible" })), t);
    h.session.handle_transport(server_event("error", json!(42)), t);
    h.session.handle_transport(server_event("message", json!("pas un objet")), t);
    h.session.handle_transport(server_event("inconnu", json!({})), t);
    h.session.handle_transport(
        TransportEvent::Disconnect {
            reason: "transport close".to_string(),
        },
        t,
    );
    assert_eq!(h.session.connection_state(), ConnectionState::Disconnected);

    // 끊긴 동안의 전송도 로그에는 남는다
    h.channel.transport.fail_sends(true);
    type_line(&mut h.session, "Allo ?", t);
    assert_eq!(h.session.messages().last().unwrap().content, "Allo ?");

    h.session.handle_transport(TransportEvent::Connect, t);
    assert_eq!(h.session.connection_state(), ConnectionState::Connected);

    // 알림 2개 모두 만료
    h.session.poll_timers(t + Duration::from_secs(5));
    assert!(h.session.latest_notice().is_none());
    assert!(!h
        .session
        .log()
        .entries()
        .iter()
        .any(|e| matches!(e.entry, EntryView::Notice(_))));
}

#[tokio::test]
async fn sessions_are_independent() {
    let mut a = start(AppConfig::default()).await;
    let b = start(AppConfig::default()).await;
    type_line(&mut a.session, "Salam", Instant::now());

    assert_eq!(a.session.messages().len(), 1);
    assert!(b.session.messages().is_empty());
    assert!(b.channel.transport.sent().is_empty());
    assert!(b.surface.ops().iter().all(|op| matches!(op, RenderOp::SetStatus { .. })));
}
