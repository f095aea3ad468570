//! 상담원 연결(handoff) 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `message` 페이로드의 `type` 판별값: 직접 연결
pub const HUMAN_CONTACT: &str = "human_contact";
/// `message` 페이로드의 `type` 판별값: 연결 제안
pub const HUMAN_CONTACT_OFFER: &str = "human_contact_offer";

/// 상담원 연결 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandoffKind {
    /// 연락처 즉시 제공 (메신저 링크 + 전화)
    DirectContact,
    /// 연결 여부를 사용자에게 묻는 제안
    OfferToContact,
}

impl HandoffKind {
    /// `type` 판별값으로부터 변환
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            HUMAN_CONTACT => Some(HandoffKind::DirectContact),
            HUMAN_CONTACT_OFFER => Some(HandoffKind::OfferToContact),
            _ => None,
        }
    }
}

/// 서버가 보낸 상담원 연결 제안 (일회성, 재조회 없음)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffOffer {
    pub kind: HandoffKind,
    pub content: String,
    /// 외부 메신저 연락 링크
    pub contact_link: String,
    /// 전화번호 (DirectContact 전용)
    pub phone_number: Option<String>,
    pub timestamp: DateTime<Utc>,
}
