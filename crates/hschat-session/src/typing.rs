//! 타이핑 디바운스.
//!
//! 연속 키 입력(burst) 하나당 `typing: true`는 최대 한 번,
//! 마지막 입력 후 정적 구간이 지나면 `typing: false`를 정확히 한 번 보낸다.

use hschat_core::models::event::OutboundEvent;
use std::time::{Duration, Instant};
use tracing::trace;

/// 타이핑 상태
#[derive(Debug, Clone)]
pub struct TypingCoordinator {
    active: bool,
    deadline: Option<Instant>,
    quiet_period: Duration,
}

impl TypingCoordinator {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            active: false,
            deadline: None,
            quiet_period,
        }
    }

    /// 키 입력 처리
    ///
    /// burst 시작이면 `typing: true` 이벤트를 돌려준다.
    /// 정지 타이머는 항상 다시 건다.
    pub fn on_keystroke(&mut self, now: Instant) -> Option<OutboundEvent> {
        self.deadline = Some(now + self.quiet_period);
        if self.active {
            return None;
        }
        self.active = true;
        trace!("타이핑 시작");
        Some(OutboundEvent::Typing { typing: true })
    }

    /// 정지 타이머 만료 확인
    pub fn poll(&mut self, now: Instant) -> Option<OutboundEvent> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.active = false;
        trace!("타이핑 정지");
        Some(OutboundEvent::Typing { typing: false })
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for TypingCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_millis(1_000))
    }
}
