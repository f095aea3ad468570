//! 포트 인터페이스 (trait).
//!
//! 세션 코어와 외부 협력자(전송 채널, 표시 표면) 사이의 경계.
//! 어댑터 crate가 이 trait들을 구현하며, `hschat-app`에서 와이어링한다.

pub mod surface;
pub mod transport;
