//! # hschat-app
//!
//! HS Chat 터미널 클라이언트 진입점.
//! 설정 로드, 로깅 초기화, 세션 조립, stdin 입력 루프.

mod input;
mod terminal;

use anyhow::Result;
use clap::Parser;
use hschat_core::config::AppConfig;
use hschat_core::config_manager::{ConfigManager, ConfigOverrides};
use hschat_network::ws_client::WsConnector;
use hschat_session::command::SessionCommand;
use hschat_session::runner::SessionRunner;
use hschat_session::session::ChatSession;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::input::{parse_line, to_commands, UserInput, HELP};
use crate::terminal::TerminalSurface;

/// HS Chat 터미널 클라이언트
///
/// 상품 추천 어시스턴트와 실시간 채팅
#[derive(Parser, Debug)]
#[command(name = "hschat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 서버 URL 지정 (기본: 설정 파일 또는 http://localhost:5000)
    #[arg(long, short = 's')]
    server: Option<String>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 연결이 끊겨도 재연결하지 않음
    #[arg(long)]
    no_reconnect: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 로그는 stderr로 (채팅 화면은 stdout)
    let log_filter = format!(
        "hschat={},hschat_app={},hschat_core={},hschat_network={},hschat_session={},hschat_suggestion={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("HS Chat 클라이언트 시작");

    let config = load_config(&args);
    let connector = WsConnector::new(&config.server)?;
    info!("서버: {}", connector.url());

    let surface = Arc::new(TerminalSurface::new(std::io::stdout().is_terminal()));
    let session = ChatSession::new(&config, surface.clone());

    println!("{HELP}");
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_input(command_tx, surface));

    tokio::select! {
        result = SessionRunner::new(session).run(&connector, command_rx) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C, 종료");
        }
    }

    info!("HS Chat 클라이언트 종료");
    Ok(())
}

/// 설정 파일 로드 + CLI 인자 덮어쓰기
///
/// 설정 파일을 읽을 수 없으면 기본 설정으로 계속한다.
fn load_config(args: &Args) -> AppConfig {
    let overrides = ConfigOverrides {
        server_url: args.server.clone(),
        reconnect: args.no_reconnect.then_some(false),
    };
    match ConfigManager::open(args.config.clone()) {
        Ok(manager) => {
            info!("설정 파일: {}", manager.path().display());
            manager.resolve(&overrides)
        }
        Err(e) => {
            warn!("설정 로드 실패, 기본 설정 사용: {e}");
            let mut config = AppConfig::default_config();
            overrides.apply(&mut config);
            config
        }
    }
}

/// stdin 줄 → 세션 명령. `/quit` 또는 EOF에서 송신 채널을 닫아 세션을 끝낸다.
async fn read_input(
    commands: mpsc::UnboundedSender<SessionCommand>,
    surface: Arc<TerminalSurface>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("입력 읽기 실패: {e}");
                break;
            }
        };

        let input = parse_line(&line);
        match input {
            UserInput::Quit => break,
            UserInput::Help => println!("{HELP}"),
            _ => {}
        }

        match to_commands(input, &surface.latest()) {
            Ok(batch) => {
                for command in batch {
                    if commands.send(command).is_err() {
                        return;
                    }
                }
            }
            Err(message) => println!("{message}"),
        }
    }
}
