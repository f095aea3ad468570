//! 터미널 표시 표면.
//!
//! 렌더 명령을 한 줄씩 stdout에 출력한다. 터미널은 이미 출력한 줄을 지울 수
//! 없으므로 타이핑 표시 제거는 출력하지 않고, 알림 제거만 짧게 알린다.
//! 최근 상담원 연결 카드와 알림을 기억해 입력 명령(`/open`, `/dismiss`)이
//! 참조할 수 있게 한다.

use hschat_core::models::message::Sender;
use hschat_core::models::view::{
    EntryId, EntryView, HandoffAction, HandoffView, MessageView, RenderOp, StatusStyle, StatusView,
    SuggestionPanelView,
};
use hschat_core::ports::surface::DisplaySurface;
use parking_lot::Mutex;
use std::io::Write;

const BOLD: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[22m";
const DIM: &str = "\x1b[2m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// 입력 명령이 참조하는 최근 항목
#[derive(Debug, Default, Clone)]
pub struct Latest {
    pub handoff: Option<(EntryId, Vec<HandoffAction>)>,
    pub notices: Vec<EntryId>,
}

pub struct TerminalSurface {
    color: bool,
    latest: Mutex<Latest>,
}

impl TerminalSurface {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            latest: Mutex::new(Latest::default()),
        }
    }

    pub fn latest(&self) -> Latest {
        self.latest.lock().clone()
    }

    /// 렌더 명령 → 출력 문자열 (출력할 것이 없으면 `None`)
    pub fn render(&self, op: &RenderOp) -> Option<String> {
        let mut latest = self.latest.lock();
        match op {
            RenderOp::Append { id, entry } => match entry {
                EntryView::Message(view) => Some(self.message(view)),
                EntryView::SuggestionPanel(panel) => Some(self.panel(panel)),
                EntryView::Handoff(view) => {
                    latest.handoff = Some((*id, view.actions.clone()));
                    Some(self.handoff(view))
                }
                EntryView::TypingIndicator => {
                    Some(self.paint(DIM, "Assistant est en train d'écrire..."))
                }
                EntryView::Notice(notice) => {
                    latest.notices.push(*id);
                    let message = sanitize(&notice.message);
                    Some(self.paint(RED, &format!("! {message} (/dismiss)")))
                }
            },
            RenderOp::Remove { id } => {
                let before = latest.notices.len();
                latest.notices.retain(|n| n != id);
                (latest.notices.len() != before).then(|| self.paint(DIM, "(notification fermée)"))
            }
            RenderOp::SetStatus { status } => Some(self.status(status)),
            RenderOp::ClearInput => None,
            RenderOp::OpenExternal { url } => Some(format!("-> Ouvrir: {}", sanitize(url))),
        }
    }

    fn message(&self, view: &MessageView) -> String {
        let who = match view.sender {
            Sender::User => "Vous",
            Sender::Assistant => "Assistant",
        };
        format!("[{}] {}: {}", view.time, self.paint(BOLD, who), self.markup(&view.html))
    }

    fn panel(&self, panel: &SuggestionPanelView) -> String {
        let mut out = self.paint(BOLD, &format!("== {} ({}) ==", panel.title, panel.time));
        for card in &panel.cards {
            out.push_str(&format!("\n  * {}", sanitize(&card.name)));
            if !card.category.is_empty() {
                out.push_str(&format!(" ({})", sanitize(&card.category)));
            }
            out.push_str(&format!(
                " : {} [{}]",
                self.paint(YELLOW, &sanitize(&card.price_text)),
                sanitize(&card.tier_label)
            ));
        }
        out
    }

    fn handoff(&self, view: &HandoffView) -> String {
        let mut out = self.paint(BOLD, &format!("== {} ({}) ==", view.title, view.time));
        out.push('\n');
        out.push_str(&self.markup(&view.content_html));
        for (i, action) in view.actions.iter().enumerate() {
            out.push_str(&format!("\n  [{}] {}", i + 1, sanitize(action.label())));
        }
        out.push_str(&self.paint(DIM, "\n  (/open <n>, /decline)"));
        out
    }

    fn status(&self, status: &StatusView) -> String {
        let color = match status.style {
            StatusStyle::Success => GREEN,
            StatusStyle::Warning => YELLOW,
            StatusStyle::Danger => RED,
        };
        self.paint(color, &format!("* {}", status.label))
    }

    /// 본문 HTML 조각 → 터미널 텍스트
    ///
    /// 서버 문자열의 제어 문자는 표면 자체의 ANSI 코드를 넣기 전에 지운다.
    fn markup(&self, html: &str) -> String {
        let (bold, bold_off, price, price_off) = if self.color {
            (BOLD, BOLD_OFF, YELLOW, RESET)
        } else {
            ("", "", "", "")
        };
        let text = sanitize(html)
            .replace("<br>", "\n")
            .replace("<strong>", bold)
            .replace("</strong>", bold_off)
            .replace(r#"<span class="price">"#, price)
            .replace("</span>", price_off);
        unescape(&text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// 줄바꿈과 탭을 제외한 제어 문자(C0, DEL, C1) 제거
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect()
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

impl DisplaySurface for TerminalSurface {
    fn apply(&self, op: &RenderOp) {
        if let Some(text) = self.render(op) {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{text}");
            let _ = stdout.flush();
        }
    }
}
