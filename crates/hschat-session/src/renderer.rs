//! 메시지 렌더러.
//!
//! 사용자 전송(낙관적 에코)과 어시스턴트 수신 메시지를 표시 로그에 추가하고
//! 타이핑 표시를 관리한다.

use chrono::{DateTime, Utc};
use hschat_core::models::event::OutboundEvent;
use hschat_core::models::message::{display_time, ChatMessage};
use hschat_core::models::view::{EntryId, EntryView, MessageView, RenderOp};
use tracing::debug;

use crate::display_log::DisplayLog;
use crate::format::Formatter;

/// 메시지 렌더러
#[derive(Debug, Default)]
pub struct MessageRenderer {
    formatter: Formatter,
    history: Vec<ChatMessage>,
    indicator: Option<EntryId>,
}

impl MessageRenderer {
    pub fn new(formatter: Formatter) -> Self {
        Self {
            formatter,
            history: Vec::new(),
            indicator: None,
        }
    }

    /// 사용자 입력 전송
    ///
    /// 공백뿐인 입력은 무시한다. 그 외에는 사용자 메시지를 추가하고 입력창을
    /// 비운 뒤 타이핑 표시를 띄우고, 보낼 `message` 이벤트를 돌려준다.
    pub fn submit(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
        log: &mut DisplayLog,
    ) -> Option<OutboundEvent> {
        let content = text.trim();
        if content.is_empty() {
            debug!("빈 입력 무시");
            return None;
        }

        self.append(ChatMessage::user(content, now), log);
        log.push_op(RenderOp::ClearInput);
        self.show_indicator(log);
        Some(OutboundEvent::message(content, now))
    }

    /// 어시스턴트 메시지 수신 (서버 시각이 없으면 `now`)
    pub fn receive(
        &mut self,
        content: &str,
        timestamp: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        log: &mut DisplayLog,
    ) -> EntryId {
        self.append(ChatMessage::assistant(content, timestamp.unwrap_or(now)), log)
    }

    fn append(&mut self, message: ChatMessage, log: &mut DisplayLog) -> EntryId {
        let id = log.append(EntryView::Message(MessageView {
            sender: message.sender,
            html: self.formatter.format(&message.content, message.sender),
            time: display_time(message.timestamp),
        }));
        self.history.push(message);
        id
    }

    /// 타이핑 표시 (기존 표시는 먼저 제거)
    pub fn show_indicator(&mut self, log: &mut DisplayLog) -> EntryId {
        self.hide_indicator(log);
        let id = log.append(EntryView::TypingIndicator);
        self.indicator = Some(id);
        id
    }

    /// 타이핑 표시 제거 (없으면 no-op)
    pub fn hide_indicator(&mut self, log: &mut DisplayLog) -> bool {
        match self.indicator.take() {
            Some(id) => log.remove(id),
            None => false,
        }
    }

    pub fn indicator(&self) -> Option<EntryId> {
        self.indicator
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// 지금까지 표시된 메시지 (삽입 순서)
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}
