//! 에러 알림.
//!
//! 서버 `error` 이벤트 → 닫을 수 있는 알림. 만료 시간이 지나면 자동 제거.

use hschat_core::models::view::{EntryId, EntryView, NoticeView};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::display_log::DisplayLog;

/// 표시 중인 알림
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientNotice {
    pub id: EntryId,
    pub message: String,
    pub created_at: Instant,
}

/// 자동 만료 알림 관리
#[derive(Debug)]
pub struct ErrorSurface {
    ttl: Duration,
    live: Vec<TransientNotice>,
}

impl ErrorSurface {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            live: Vec::new(),
        }
    }

    /// 알림 표시
    pub fn show(
        &mut self,
        message: impl Into<String>,
        now: Instant,
        log: &mut DisplayLog,
    ) -> EntryId {
        let message = message.into();
        let id = log.append(EntryView::Notice(NoticeView {
            message: message.clone(),
        }));
        debug!("알림 표시 {id}: {message}");
        self.live.push(TransientNotice {
            id,
            message,
            created_at: now,
        });
        id
    }

    /// 알림 닫기 (이미 제거된 알림이면 no-op)
    pub fn dismiss(&mut self, id: EntryId, log: &mut DisplayLog) -> bool {
        let before = self.live.len();
        self.live.retain(|n| n.id != id);
        if self.live.len() == before {
            return false;
        }
        log.remove(id)
    }

    /// 만료된 알림 제거, 제거한 개수 반환
    pub fn poll(&mut self, now: Instant, log: &mut DisplayLog) -> usize {
        let ttl = self.ttl;
        let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.live)
            .into_iter()
            .partition(|n| now >= n.created_at + ttl);
        self.live = live;
        for notice in &expired {
            log.remove(notice.id);
        }
        expired.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.live.iter().map(|n| n.created_at + self.ttl).min()
    }

    /// 가장 최근 알림
    pub fn latest(&self) -> Option<EntryId> {
        self.live.last().map(|n| n.id)
    }
}
