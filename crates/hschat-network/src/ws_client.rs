//! WebSocket 채널 클라이언트.
//!
//! `tokio-tungstenite` 기반 Socket.IO 채널. `ChannelConnector` / `ChatTransport`
//! 포트 구현. 연결이 끊기면 exponential backoff로 재연결한다.

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use hschat_core::config::ServerConfig;
use hschat_core::error::CoreError;
use hschat_core::models::event::OutboundEvent;
use hschat_core::ports::transport::{Channel, ChannelConnector, ChatTransport, TransportEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::codec::{self, EnginePacket, Handshake, SocketPacket};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 수신 이벤트 채널 용량
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 송신 태스크로 보내는 명령
#[derive(Debug)]
enum Outgoing {
    Frame(String),
    Close,
}

/// 세션(연결 1회) 종료 사유
#[derive(Debug)]
enum SessionEnd {
    /// 클라이언트가 종료 요청 또는 수신 측이 사라짐
    ClientClosed,
    /// 연결 유실
    Lost(String),
}

/// Socket.IO 엔드포인트 URL 생성
///
/// `http→ws`, `https→wss`로 바꾸고 `EIO=4&transport=websocket` 쿼리를 붙인다.
pub fn socket_url(base_url: &str, path: &str) -> Result<String, CoreError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| CoreError::Config(format!("서버 URL 파싱 실패: {base_url}: {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(CoreError::Config(format!(
                "지원하지 않는 URL 스킴: {other}"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| CoreError::Config(format!("URL 스킴 변경 실패: {base_url}")))?;

    let path = if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    };
    url.set_path(&path);
    url.set_query(Some("EIO=4&transport=websocket"));

    Ok(url.to_string())
}

/// WebSocket 채널 생성기: `ChannelConnector` 포트 구현
pub struct WsConnector {
    url: String,
    reconnect: bool,
    max_retry_secs: u64,
}

impl WsConnector {
    /// 서버 설정으로 생성
    pub fn new(server: &ServerConfig) -> Result<Self, CoreError> {
        Ok(Self {
            url: socket_url(&server.url, &server.path)?,
            reconnect: server.reconnect,
            max_retry_secs: server.max_retry_secs.max(1),
        })
    }

    /// 접속 대상 URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChannelConnector for WsConnector {
    async fn open(&self) -> Result<Channel, CoreError> {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));

        info!("채널 열기: {}", self.url);

        tokio::spawn(connection_loop(
            self.url.clone(),
            self.reconnect,
            self.max_retry_secs,
            out_rx,
            event_tx,
            connected.clone(),
        ));

        Ok(Channel {
            transport: Arc::new(WsTransport { out_tx, connected }),
            events: event_rx,
        })
    }
}

/// WebSocket 송신 핸들: `ChatTransport` 포트 구현
pub struct WsTransport {
    out_tx: mpsc::UnboundedSender<Outgoing>,
    connected: Arc<AtomicBool>,
}

impl ChatTransport for WsTransport {
    fn emit(&self, event: &OutboundEvent) -> Result<(), CoreError> {
        if !self.connected.load(Ordering::Acquire) {
            debug!("연결되지 않음, '{}' 송신 버림", event.name());
            return Ok(());
        }

        let frame = codec::encode_event(event.name(), &event.payload())?;
        self.out_tx
            .send(Outgoing::Frame(frame))
            .map_err(|_| CoreError::Transport("송신 태스크 종료됨".to_string()))
    }

    fn close(&self) {
        let _ = self.out_tx.send(Outgoing::Close);
    }
}

/// 연결 + 재연결 루프
async fn connection_loop(
    url: String,
    reconnect: bool,
    max_retry_secs: u64,
    mut out_rx: mpsc::UnboundedReceiver<Outgoing>,
    event_tx: mpsc::Sender<TransportEvent>,
    connected: Arc<AtomicBool>,
) {
    let mut retry_delay = 1u64;
    // 끊김을 이미 알렸는지 (재시도 실패마다 중복 통지하지 않음)
    let mut down_announced = false;

    loop {
        let reason = match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((ws, _)) => {
                debug!("WebSocket 연결 수립");
                retry_delay = 1;
                down_announced = false;
                match run_session(ws, &mut out_rx, &event_tx, &connected).await {
                    SessionEnd::ClientClosed => {
                        info!("채널 종료 (클라이언트 요청)");
                        return;
                    }
                    SessionEnd::Lost(reason) => reason,
                }
            }
            Err(e) => format!("연결 실패: {e}"),
        };

        let was_connected = connected.swap(false, Ordering::AcqRel);
        if was_connected || !down_announced {
            warn!("채널 끊김: {reason}");
            down_announced = true;
            if event_tx
                .send(TransportEvent::Disconnect { reason })
                .await
                .is_err()
            {
                return;
            }
        }

        if !reconnect {
            info!("재연결 비활성화, 채널 루프 종료");
            return;
        }

        warn!("재연결 대기: {retry_delay}초");
        if !wait_backoff(Duration::from_secs(retry_delay), &mut out_rx).await {
            return;
        }
        retry_delay = (retry_delay * 2).min(max_retry_secs);
    }
}

/// 재연결 대기. 대기 중 송신 요청은 버리고, 종료 요청이 오면 `false`.
async fn wait_backoff(delay: Duration, out_rx: &mut mpsc::UnboundedReceiver<Outgoing>) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            outgoing = out_rx.recv() => match outgoing {
                Some(Outgoing::Frame(_)) => debug!("연결 끊김 상태, 프레임 버림"),
                Some(Outgoing::Close) | None => return false,
            },
        }
    }
}

/// 연결 1회분 처리: 핸드셰이크, ping/pong, 이벤트 전달, 송신
async fn run_session(
    ws: WsStream,
    out_rx: &mut mpsc::UnboundedReceiver<Outgoing>,
    event_tx: &mpsc::Sender<TransportEvent>,
    connected: &AtomicBool,
) -> SessionEnd {
    let (mut write, mut read) = ws.split();
    let mut handshake = Handshake::default();
    let mut last_seen = Instant::now();

    loop {
        let idle_limit = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);

        tokio::select! {
            incoming = read.next() => {
                last_seen = Instant::now();
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let step = handle_frame(
                            text.as_str(),
                            &mut handshake,
                            &mut write,
                            event_tx,
                            connected,
                        )
                        .await;
                        if let Some(end) = step {
                            return end;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        return SessionEnd::Lost("서버가 WebSocket을 닫음".to_string());
                    }
                    Some(Ok(_)) => {} // Ping/Pong/Binary 프레임은 무시
                    Some(Err(e)) => return SessionEnd::Lost(format!("수신 에러: {e}")),
                    None => return SessionEnd::Lost("스트림 종료".to_string()),
                }
            }
            outgoing = out_rx.recv() => match outgoing {
                Some(Outgoing::Frame(frame)) => {
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        return SessionEnd::Lost(format!("송신 에러: {e}"));
                    }
                }
                Some(Outgoing::Close) | None => {
                    let _ = write.send(Message::Text(codec::SOCKET_DISCONNECT.to_string().into())).await;
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::ClientClosed;
                }
            },
            _ = tokio::time::sleep_until(last_seen + idle_limit) => {
                return SessionEnd::Lost("ping 타임아웃".to_string());
            }
        }
    }
}

/// 수신 프레임 하나 처리. 세션을 끝내야 하면 `Some`.
async fn handle_frame(
    text: &str,
    handshake: &mut Handshake,
    write: &mut SplitSink<WsStream, Message>,
    event_tx: &mpsc::Sender<TransportEvent>,
    connected: &AtomicBool,
) -> Option<SessionEnd> {
    let packet = match codec::decode(text) {
        Ok(packet) => packet,
        Err(e) => {
            warn!("프레임 무시: {e}");
            return None;
        }
    };

    let reply = match packet {
        EnginePacket::Open(open) => {
            debug!("Engine.IO 핸드셰이크: sid={}", open.sid);
            *handshake = open;
            Some(codec::SOCKET_CONNECT.to_string())
        }
        EnginePacket::Ping(probe) => Some(codec::encode_pong(&probe)),
        EnginePacket::Close => return Some(SessionEnd::Lost("Engine.IO close".to_string())),
        EnginePacket::Message(SocketPacket::Connect(_)) => {
            connected.store(true, Ordering::Release);
            info!("채널 연결됨");
            return forward(event_tx, TransportEvent::Connect).await;
        }
        EnginePacket::Message(SocketPacket::Event { name, data }) => {
            return forward(event_tx, TransportEvent::Event { name, data }).await;
        }
        EnginePacket::Message(SocketPacket::Disconnect) => {
            return Some(SessionEnd::Lost("서버가 소켓 연결 해제".to_string()));
        }
        EnginePacket::Message(SocketPacket::ConnectError(detail)) => {
            return Some(SessionEnd::Lost(format!("연결 거부: {detail}")));
        }
        EnginePacket::Message(SocketPacket::Ack { id, .. }) => {
            debug!("ack 수신 무시: {id}");
            None
        }
        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => None,
    };

    if let Some(frame) = reply {
        if let Err(e) = write.send(Message::Text(frame.into())).await {
            return Some(SessionEnd::Lost(format!("송신 에러: {e}")));
        }
    }
    None
}

async fn forward(
    event_tx: &mpsc::Sender<TransportEvent>,
    event: TransportEvent,
) -> Option<SessionEnd> {
    if event_tx.send(event).await.is_err() {
        debug!("이벤트 수신 측 종료");
        return Some(SessionEnd::ClientClosed);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_url_becomes_ws_socket_url() {
        let url = socket_url("http://localhost:5000", "/socket.io/").unwrap();
        assert_eq!(url, "ws://localhost:5000/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn https_url_becomes_wss_and_path_gets_trailing_slash() {
        let url = socket_url("https://chat.hs-traiteur.ma", "/socket.io").unwrap();
        assert_eq!(
            url,
            "wss://chat.hs-traiteur.ma/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn unsupported_scheme_is_config_error() {
        assert!(matches!(
            socket_url("ftp://example.com", "/socket.io/"),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            socket_url("not a url", "/socket.io/"),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn emit_while_disconnected_is_dropped() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let transport = WsTransport {
            out_tx,
            connected: Arc::new(AtomicBool::new(false)),
        };

        transport
            .emit(&OutboundEvent::Typing { typing: true })
            .unwrap();
        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn emit_while_connected_queues_encoded_frame() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let transport = WsTransport {
            out_tx,
            connected: Arc::new(AtomicBool::new(true)),
        };

        transport
            .emit(&OutboundEvent::Typing { typing: true })
            .unwrap();
        match out_rx.try_recv().unwrap() {
            Outgoing::Frame(frame) => assert_eq!(frame, r#"42["typing",{"typing":true}]"#),
            Outgoing::Close => panic!("expected frame"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_reports_disconnect_once() {
        let connector = WsConnector::new(&ServerConfig {
            url: "http://127.0.0.1:1".to_string(),
            reconnect: false,
            ..ServerConfig::default()
        })
        .unwrap();

        let mut channel = connector.open().await.unwrap();
        let event = channel.events.recv().await.unwrap();
        assert!(matches!(event, TransportEvent::Disconnect { .. }));
        // 재연결 비활성화 → 루프 종료 후 채널 닫힘
        assert!(channel.events.recv().await.is_none());
    }
}
