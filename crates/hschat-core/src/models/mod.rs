//! HS Chat 도메인 모델.
//!
//! 서버-클라이언트 간 주고받는 와이어 페이로드와
//! 표시 표면에 전달되는 렌더 뷰 구조체를 정의한다.

pub mod connection;
pub mod event;
pub mod handoff;
pub mod lenient;
pub mod message;
pub mod suggestion;
pub mod view;
