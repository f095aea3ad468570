//! 렌더 뷰 모델.
//!
//! 세션이 만들어내는 순수 렌더 명령(`RenderOp`)과 그 안에 담기는 뷰 구조체.
//! 표시 표면(`DisplaySurface`)은 이 값을 받아 실제 화면에 적용한다.

use serde::Serialize;

use crate::models::connection::ConnectionState;
use crate::models::handoff::HandoffKind;
use crate::models::message::Sender;

/// 표시 로그 항목 ID (삽입 순서대로 단조 증가)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntryId(pub u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 표시 로그 항목
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryView {
    /// 채팅 메시지
    Message(MessageView),
    /// 상품 제안 패널
    SuggestionPanel(SuggestionPanelView),
    /// 상담원 연결 카드
    Handoff(HandoffView),
    /// 타이핑 표시 (동시에 최대 1개)
    TypingIndicator,
    /// 자동 만료 에러 알림
    Notice(NoticeView),
}

impl EntryView {
    /// 제거 가능한 일시 항목인지
    pub fn is_transient(&self) -> bool {
        matches!(self, EntryView::TypingIndicator | EntryView::Notice(_))
    }
}

/// 메시지 뷰
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub sender: Sender,
    /// 포맷 파이프라인을 거친 본문 (HTML 조각)
    pub html: String,
    /// HH:MM
    pub time: String,
}

/// 상품 제안 패널 뷰
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionPanelView {
    pub title: String,
    pub cards: Vec<SuggestionCardView>,
    pub time: String,
}

/// 상품 카드 뷰 (누락 필드는 기본값으로 채워짐)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionCardView {
    pub name: String,
    pub category: String,
    /// 예: "120 MAD"
    pub price_text: String,
    pub tier_label: String,
}

/// 상담원 연결 카드 뷰
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoffView {
    pub kind: HandoffKind,
    pub title: String,
    pub icon: String,
    /// 본문 (이스케이프 처리됨)
    pub content_html: String,
    pub actions: Vec<HandoffAction>,
    pub time: String,
}

/// 상담원 연결 카드의 버튼
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HandoffAction {
    /// 외부 링크 열기 (메신저)
    OpenLink { label: String, url: String },
    /// 전화 걸기 (`tel:` URI)
    Dial { label: String, uri: String },
    /// 거절: 정해진 문구를 사용자 메시지로 전송
    Decline { label: String, phrase: String },
}

impl HandoffAction {
    pub fn label(&self) -> &str {
        match self {
            HandoffAction::OpenLink { label, .. }
            | HandoffAction::Dial { label, .. }
            | HandoffAction::Decline { label, .. } => label,
        }
    }
}

/// 에러 알림 뷰
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeView {
    pub message: String,
}

/// 연결 상태 표시 스타일
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusStyle {
    Success,
    Warning,
    Danger,
}

/// 연결 상태 표시 뷰
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub state: ConnectionState,
    pub label: String,
    pub icon: String,
    pub style: StatusStyle,
}

/// 표시 표면에 적용할 렌더 명령
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOp {
    /// 로그 끝에 항목 추가
    Append { id: EntryId, entry: EntryView },
    /// 일시 항목 제거
    Remove { id: EntryId },
    /// 연결 상태 표시 갱신
    SetStatus { status: StatusView },
    /// 입력창 비우기
    ClearInput,
    /// 외부 링크/URI 열기 요청
    OpenExternal { url: String },
}
