//! 설정 파일 관리.
//!
//! `config.json`을 플랫폼 설정 디렉토리(또는 지정 경로)에서 읽고 쓴다.
//! CLI 인자는 파일 값 위에 [`ConfigOverrides`]로 덮어쓴다.

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_FILE_NAME: &str = "config.json";

/// 파일에 저장하지 않는 실행 시점 덮어쓰기 값
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub reconnect: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.server_url {
            config.server.url = url.clone();
        }
        if let Some(reconnect) = self.reconnect {
            config.server.reconnect = reconnect;
        }
    }
}

/// 설정 관리자
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AppConfig,
    path: PathBuf,
}

impl ConfigManager {
    /// 설정 열기 (경로가 없으면 플랫폼 기본 경로)
    ///
    /// 파일이 없으면 기본 설정으로 새로 만든다.
    pub fn open(path: Option<PathBuf>) -> Result<Self, CoreError> {
        let path = path.unwrap_or_else(Self::default_path);
        ensure_parent(&path)?;

        let config = if path.exists() {
            read_config(&path)?
        } else {
            let config = AppConfig::default_config();
            write_config(&path, &config)?;
            info!("기본 설정 파일 생성: {}", path.display());
            config
        };

        Ok(Self { config, path })
    }

    /// 플랫폼 기본 설정 파일 경로
    ///
    /// - macOS: `~/Library/Application Support/ma.hs.hschat/config.json`
    /// - Linux: `~/.config/hschat/config.json`
    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("ma", "hs", "hschat") {
            Some(dirs) => dirs.config_dir().join(CONFIG_FILE_NAME),
            None => {
                warn!("홈 디렉토리 없음, 현재 디렉토리에 설정 저장");
                PathBuf::from(CONFIG_FILE_NAME)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일에서 읽은 설정
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 덮어쓰기 값을 반영한 실행 설정
    pub fn resolve(&self, overrides: &ConfigOverrides) -> AppConfig {
        let mut config = self.config.clone();
        overrides.apply(&mut config);
        config
    }
}

fn ensure_parent(path: &Path) -> Result<(), CoreError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|e| file_error("디렉토리 생성", dir, e))
        }
        _ => Ok(()),
    }
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let text = fs::read_to_string(path).map_err(|e| file_error("읽기", path, e))?;
    serde_json::from_str(&text).map_err(|e| file_error("파싱", path, e))
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    let text = serde_json::to_string_pretty(config)?;
    fs::write(path, text).map_err(|e| file_error("저장", path, e))
}

fn file_error(action: &str, path: &Path, e: impl std::fmt::Display) -> CoreError {
    CoreError::Config(format!("설정 파일 {action} 실패: {}: {e}", path.display()))
}
