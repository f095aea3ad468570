//! 사용자 명령.
//!
//! 입력창 키 입력, 전송, 카드 버튼 클릭 등 표시 표면에서 올라오는 동작.

use hschat_core::models::view::EntryId;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// 입력창에 글자 하나 입력 (타이핑 디바운스 경로)
    Keystroke(char),
    /// 입력창 내용 전송 (Enter)
    Submit,
    /// 입력창을 주어진 문구로 채우고 바로 전송
    SubmitText(String),
    /// 상담원 연결 카드의 `action`번째 버튼
    Activate { entry: EntryId, action: usize },
    /// 알림 닫기
    DismissNotice(EntryId),
    /// 상품 제안 요청
    RequestSuggestions(Value),
}
