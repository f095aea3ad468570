//! 제안 프레젠터.
//!
//! ProductSuggestion → UI 표시용 카드 데이터 변환.

use chrono::{DateTime, Utc};
use hschat_core::models::message::display_time;
use hschat_core::models::suggestion::{ProductMetadata, ProductSuggestion};
use hschat_core::models::view::{SuggestionCardView, SuggestionPanelView};
use serde_json::Value;
use tracing::debug;

/// 패널 제목
pub const PANEL_TITLE: &str = "Suggestions de produits";
/// 이름이 없을 때
pub const DEFAULT_NAME: &str = "Produit";
/// 가격 통화
pub const CURRENCY: &str = "MAD";

/// 상품 목록 → 패널 (목록이 없거나 비어 있으면 `None`)
pub fn present_panel(
    products: Option<&[ProductSuggestion]>,
    now: DateTime<Utc>,
) -> Option<SuggestionPanelView> {
    let products = products.filter(|p| !p.is_empty())?;
    debug!("제안 패널 생성: {}개 상품", products.len());

    Some(SuggestionPanelView {
        title: PANEL_TITLE.to_string(),
        cards: products.iter().map(present_card).collect(),
        time: display_time(now),
    })
}

/// 상품 한 건 → 카드
pub fn present_card(product: &ProductSuggestion) -> SuggestionCardView {
    let empty = ProductMetadata::default();
    let metadata = product.metadata.as_ref().unwrap_or(&empty);

    SuggestionCardView {
        name: non_empty(metadata.name.as_deref()).unwrap_or(DEFAULT_NAME).to_string(),
        category: metadata.category.clone().unwrap_or_default(),
        price_text: format!("{} {CURRENCY}", format_price(metadata.price.as_ref())),
        tier_label: metadata
            .price_tier
            .clone()
            .unwrap_or_default()
            .label()
            .to_string(),
    }
}

/// 가격 표시 문자열 (정수면 소수점 없이, 없거나 해석 불가면 "0")
fn format_price(price: Option<&Value>) -> String {
    match price {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
            Some(v) => format!("{v}"),
            None => n.to_string(),
        },
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "0".to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
