//! # hschat-session
//!
//! 클라이언트 측 채팅 세션 상태 머신.
//! 연결 상태, 타이핑 디바운스, 메시지 순서/렌더링, 상담원 연결 흐름,
//! 자동 만료 에러 알림을 관리한다.
//!
//! 상태 머신([`session::ChatSession`])은 I/O를 하지 않는 동기 코드이며
//! 모든 시간은 호출자가 넘기는 `Instant`로만 흐른다. 실제 채널/타이머와의
//! 연결은 [`runner::SessionRunner`]가 담당한다.
//!
//! ## 구조
//!
//! - [`connection`]: 채널 라이프사이클 → 연결 상태 표시, 수신 이벤트 분배
//! - [`typing`]: 키 입력 → typing 시작/정지 이벤트 디바운스
//! - [`format`]: 어시스턴트 메시지 포맷 파이프라인
//! - [`display_log`]: 추가 전용 표시 로그 + 렌더 명령 큐
//! - [`renderer`]: 메시지 전송/수신 렌더링, 타이핑 표시
//! - [`handoff`]: 상담원 연결 카드와 버튼 동작
//! - [`notice`]: 자동 만료 에러 알림
//! - [`command`]: 사용자 명령

pub mod command;
pub mod connection;
pub mod display_log;
pub mod format;
pub mod handoff;
pub mod notice;
pub mod renderer;
pub mod runner;
pub mod session;
pub mod typing;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
