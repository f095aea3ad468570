//! 표시 로그.
//!
//! 삽입 순서가 곧 표시 순서인 추가 전용 로그. 항목이 추가/제거될 때마다
//! 대응하는 [`RenderOp`]을 큐에 쌓고, 세션이 핸들러 끝에서 한꺼번에
//! 표시 표면으로 내보낸다.

use hschat_core::models::view::{EntryId, EntryView, RenderOp};
use tracing::debug;

/// 로그 항목
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: EntryId,
    pub entry: EntryView,
}

/// 추가 전용 표시 로그
#[derive(Debug, Default)]
pub struct DisplayLog {
    entries: Vec<LogEntry>,
    next_id: u64,
    pending: Vec<RenderOp>,
}

impl DisplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 로그 끝에 항목 추가
    pub fn append(&mut self, entry: EntryView) -> EntryId {
        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.pending.push(RenderOp::Append {
            id,
            entry: entry.clone(),
        });
        self.entries.push(LogEntry { id, entry });
        id
    }

    /// 일시 항목 제거
    ///
    /// 이미 제거됐거나 일시 항목이 아니면 아무 일도 하지 않고 `false`.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        if !self.entries[pos].entry.is_transient() {
            debug!("영구 항목 제거 요청 무시: {id}");
            return false;
        }
        self.entries.remove(pos);
        self.pending.push(RenderOp::Remove { id });
        true
    }

    /// 로그와 무관한 렌더 명령 (상태 표시, 입력창 비우기 등)
    pub fn push_op(&mut self, op: RenderOp) {
        self.pending.push(op);
    }

    /// 쌓인 렌더 명령 꺼내기
    pub fn drain_ops(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.pending)
    }

    pub fn get(&self, id: EntryId) -> Option<&EntryView> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.entry)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
