//! # hschat-suggestion
//!
//! 상품 제안 패널.
//! 서버 `suggestions` 이벤트의 상품 목록을 카드 뷰로 변환하고
//! (누락 필드는 기본값으로 채움), `get_suggestions` 요청을 만든다.

pub mod presenter;
pub mod request;
