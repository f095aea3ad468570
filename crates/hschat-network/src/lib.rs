//! # hschat-network
//!
//! 채팅 서버와의 양방향 채널 어댑터.
//! Socket.IO v4(Engine.IO v4) 텍스트 프레이밍을 WebSocket 위에서 구현하며,
//! 연결이 끊기면 exponential backoff로 재연결한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use hschat_core::ports::transport::ChannelConnector;
//! use hschat_network::ws_client::WsConnector;
//!
//! let connector = WsConnector::new(&config.server)?;
//! let channel = connector.open().await?;
//! ```

pub mod codec;
pub mod ws_client;
