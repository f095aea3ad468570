//! 메시지 본문 포맷 파이프라인.
//!
//! 어시스턴트 메시지에만 적용되며 순서가 고정되어 있다:
//! 굵게 → 줄바꿈 → MAD 가격 → dirhams 가격 → 상품 라벨.
//! 어떤 입력에도 실패하지 않는다.

use hschat_core::models::message::Sender;
use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("정적 정규식"));
static PRICE_MAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?\s*MAD)").expect("정적 정규식"));
static PRICE_DIRHAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?\s*dirhams)").expect("정적 정규식"));
static PRODUCT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Produit: ([^|]+)").expect("정적 정규식"));

const PRICE_SPAN: &str = r#"<span class="price">${1}</span>"#;

/// 본문 포맷터
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    escape_html: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self { escape_html: true }
    }
}

impl Formatter {
    pub fn new(escape_html: bool) -> Self {
        Self { escape_html }
    }

    /// 작성자에 따라 본문 포맷
    pub fn format(&self, content: &str, sender: Sender) -> String {
        let text = self.plain(content);
        match sender {
            Sender::User => text,
            Sender::Assistant => highlight(&text),
        }
    }

    /// 이스케이프만 적용 (상담원 연결 카드 본문 등)
    pub fn plain(&self, content: &str) -> String {
        if self.escape_html {
            escape_html(content)
        } else {
            content.to_string()
        }
    }
}

/// 강조/가격/상품 라벨 마크업
pub fn highlight(content: &str) -> String {
    let text = BOLD.replace_all(content, "<strong>${1}</strong>");
    let text = text.replace('\n', "<br>");
    let text = PRICE_MAD.replace_all(&text, PRICE_SPAN);
    let text = PRICE_DIRHAMS.replace_all(&text, PRICE_SPAN);
    PRODUCT_LABEL
        .replace_all(&text, "<strong>Produit: ${1}</strong>")
        .into_owned()
}

/// HTML 특수문자 이스케이프
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        let text = "Bonjour, comment puis-je vous aider ?";
        assert_eq!(highlight(text), text);
        assert_eq!(Formatter::default().format(text, Sender::Assistant), text);
    }

    #[test]
    fn bold_and_price() {
        assert_eq!(
            highlight("**Prix** 120 MAD"),
            r#"<strong>Prix</strong> <span class="price">120 MAD</span>"#
        );
    }

    #[test]
    fn bold_is_non_greedy() {
        assert_eq!(
            highlight("**a** et **b**"),
            "<strong>a</strong> et <strong>b</strong>"
        );
    }

    #[test]
    fn bold_does_not_cross_lines() {
        assert_eq!(highlight("**a\nb**"), "**a<br>b**");
    }

    #[test]
    fn newlines_become_breaks() {
        assert_eq!(highlight("un\ndeux"), "un<br>deux");
    }

    #[test]
    fn decimal_price_without_space() {
        assert_eq!(highlight("89.5MAD"), r#"<span class="price">89.5MAD</span>"#);
    }

    #[test]
    fn dirhams_case_insensitive() {
        assert_eq!(
            highlight("environ 45 Dirhams"),
            r#"environ <span class="price">45 Dirhams</span>"#
        );
    }

    #[test]
    fn product_label_stops_at_pipe() {
        assert_eq!(
            highlight("Produit: Cornes de gazelle | Catégorie: Pâtisserie"),
            "<strong>Produit: Cornes de gazelle </strong>| Catégorie: Pâtisserie"
        );
    }

    #[test]
    fn pipeline_order_is_fixed() {
        // 상품 라벨이 가격 span 바깥을 감싼다
        assert_eq!(
            highlight("Produit: Chebakia 30 MAD"),
            r#"<strong>Produit: Chebakia <span class="price">30 MAD</span></strong>"#
        );
    }

    #[test]
    fn user_messages_are_not_highlighted() {
        let formatter = Formatter::default();
        assert_eq!(formatter.format("**moi** 10 MAD", Sender::User), "**moi** 10 MAD");
    }

    #[test]
    fn markup_is_escaped_before_pipeline() {
        let formatter = Formatter::default();
        assert_eq!(
            formatter.format("<b>**x**</b>", Sender::Assistant),
            "&lt;b&gt;<strong>x</strong>&lt;/b&gt;"
        );
    }

    #[test]
    fn escaping_can_be_disabled() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.plain("<i>ok</i>"), "<i>ok</i>");
    }

    #[test]
    fn unbalanced_markers_never_fail() {
        assert_eq!(highlight("**"), "**");
        assert_eq!(highlight("***"), "***");
        assert_eq!(highlight("MAD"), "MAD");
        assert_eq!(highlight(""), "");
    }
}
