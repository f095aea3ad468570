//! 표시 표면 포트.
//!
//! 구현: `hschat-app` crate (터미널 표면)

use crate::models::view::RenderOp;

/// 렌더 명령을 실제 화면에 적용하는 표면
pub trait DisplaySurface: Send + Sync {
    fn apply(&self, op: &RenderOp);
}
