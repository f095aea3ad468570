//! 상담원 연결 흐름.
//!
//! 서버의 연결 제안(`human_contact`, `human_contact_offer`)을 카드로 보여주고
//! 버튼 동작을 결정한다. 응답 여부는 기억하지 않는다.

use hschat_core::models::handoff::{HandoffKind, HandoffOffer};
use hschat_core::models::message::display_time;
use hschat_core::models::view::{HandoffAction, HandoffView};

use crate::format::Formatter;

pub const DIRECT_TITLE: &str = "Contact avec un conseiller";
pub const OFFER_TITLE: &str = "Besoin d'aide supplémentaire ?";

const DIRECT_ICON: &str = "headset";
const OFFER_ICON: &str = "question-circle";

const LABEL_MESSENGER: &str = "Discuter sur WhatsApp";
const LABEL_CALL: &str = "Appeler";
const LABEL_ACCEPT: &str = "Oui, contacter un conseiller";
const LABEL_DECLINE: &str = "Non, continuons";

/// 버튼 동작 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffResponse {
    /// 외부 링크/URI 열기
    Open(String),
    /// 문구를 일반 사용자 메시지로 전송
    Submit(String),
}

/// 상담원 연결 카드 생성기
#[derive(Debug, Clone)]
pub struct HandoffFlow {
    decline_phrase: String,
}

impl HandoffFlow {
    pub fn new(decline_phrase: impl Into<String>) -> Self {
        Self {
            decline_phrase: decline_phrase.into(),
        }
    }

    /// 제안 → 카드 뷰
    pub fn present(&self, offer: &HandoffOffer, formatter: &Formatter) -> HandoffView {
        let (title, icon, actions) = match offer.kind {
            HandoffKind::DirectContact => (
                DIRECT_TITLE,
                DIRECT_ICON,
                vec![
                    HandoffAction::OpenLink {
                        label: LABEL_MESSENGER.to_string(),
                        url: offer.contact_link.clone(),
                    },
                    HandoffAction::Dial {
                        label: LABEL_CALL.to_string(),
                        uri: format!("tel:{}", offer.phone_number.as_deref().unwrap_or_default()),
                    },
                ],
            ),
            HandoffKind::OfferToContact => (
                OFFER_TITLE,
                OFFER_ICON,
                vec![
                    HandoffAction::OpenLink {
                        label: LABEL_ACCEPT.to_string(),
                        url: offer.contact_link.clone(),
                    },
                    HandoffAction::Decline {
                        label: LABEL_DECLINE.to_string(),
                        phrase: self.decline_phrase.clone(),
                    },
                ],
            ),
        };

        HandoffView {
            kind: offer.kind,
            title: title.to_string(),
            icon: icon.to_string(),
            content_html: formatter.plain(&offer.content),
            actions,
            time: display_time(offer.timestamp),
        }
    }

    /// 버튼 → 동작
    pub fn resolve(action: &HandoffAction) -> HandoffResponse {
        match action {
            HandoffAction::OpenLink { url, .. } => HandoffResponse::Open(url.clone()),
            HandoffAction::Dial { uri, .. } => HandoffResponse::Open(uri.clone()),
            HandoffAction::Decline { phrase, .. } => HandoffResponse::Submit(phrase.clone()),
        }
    }
}
