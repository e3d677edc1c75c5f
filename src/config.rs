// パス: src/config.rs
// 役割: 環境変数からワークスペースと履歴の設定を組み立てる
// 意図: 環境の参照を差し替え可能にし、テストでプロセス環境を書き換えずに済ませる
// 関連ファイル: src/session.rs, src/history.rs, src/bin/baapan.rs
//! セッション設定。
//!
//! | 変数 | 意味 |
//! |---|---|
//! | `BAAPAN_WS_PATH` | 設定時はそのワークスペースを再利用し、終了時も残す |
//! | `BAAPAN_REPL_HISTORY` | 空文字列で履歴無効、それ以外はそのパス |
//! | `BAAPAN_REPL_HISTORY_SIZE` | 正の整数で履歴上限、それ以外は 1000 |
//! | `BAAPAN_NPM` | 実行するパッケージマネージャ |

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::ConfigError;
use crate::history::DEFAULT_HISTORY_SIZE;
use crate::installer::NpmCli;

pub const WORKSPACE_PATH_VAR: &str = "BAAPAN_WS_PATH";
pub const HISTORY_PATH_VAR: &str = "BAAPAN_REPL_HISTORY";
pub const HISTORY_SIZE_VAR: &str = "BAAPAN_REPL_HISTORY_SIZE";
pub const NPM_PROGRAM_VAR: &str = "BAAPAN_NPM";

const WORKSPACES_DIR: &str = ".baapan";
const DEFAULT_HISTORY_FILE: &str = ".baapan_repl_history";

/// ワークスペースの場所と寿命。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    pub path: PathBuf,
    pub persistent: bool,
}

/// 履歴の保存先と上限。`path` が `None` なら永続化しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySettings {
    pub path: Option<PathBuf>,
    pub max_entries: usize,
}

impl HistorySettings {
    pub fn disabled() -> Self {
        Self {
            path: None,
            max_entries: DEFAULT_HISTORY_SIZE,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub workspace: WorkspaceSettings,
    pub history: HistorySettings,
    pub npm_program: String,
}

impl SessionConfig {
    /// プロセス環境とホームディレクトリから構築する。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_workspace(None)
    }

    /// CLI などで指定されたワークスペースを `BAAPAN_WS_PATH` より優先して構築する。
    ///
    /// 指定があればホームディレクトリは使い捨てワークスペースのために要求されない。
    pub fn from_env_with_workspace(workspace: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_lookup(
            with_workspace_override(|key| env::var_os(key), workspace),
            home_dir(),
        )
    }

    /// 任意の環境参照関数から構築する。
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let workspace = match lookup(WORKSPACE_PATH_VAR).filter(|v| !v.is_empty()) {
            Some(path) => WorkspaceSettings {
                path: PathBuf::from(path),
                persistent: true,
            },
            None => {
                let home = home.clone().ok_or(ConfigError::NoHomeDirectory {
                    what: "workspace",
                })?;
                WorkspaceSettings {
                    path: ephemeral_workspace_path(&home),
                    persistent: false,
                }
            }
        };

        let max_entries = lookup(HISTORY_SIZE_VAR)
            .and_then(|v| v.to_str().and_then(|s| s.trim().parse::<i64>().ok()))
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_HISTORY_SIZE);

        let history_path = match lookup(HISTORY_PATH_VAR) {
            Some(value) if value.is_empty() => None,
            Some(value) => Some(PathBuf::from(value)),
            None => home.map(|h| h.join(DEFAULT_HISTORY_FILE)),
        };

        let npm_program = lookup(NPM_PROGRAM_VAR)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_else(|| NpmCli::DEFAULT_PROGRAM.to_string());

        Ok(Self {
            workspace,
            history: HistorySettings {
                path: history_path,
                max_entries,
            },
            npm_program,
        })
    }
}

/// `workspace` があれば [`WORKSPACE_PATH_VAR`] の参照結果をそれで置き換える。
pub fn with_workspace_override<F>(
    lookup: F,
    workspace: Option<PathBuf>,
) -> impl Fn(&str) -> Option<OsString>
where
    F: Fn(&str) -> Option<OsString>,
{
    move |key: &str| match &workspace {
        Some(path) if key == WORKSPACE_PATH_VAR => Some(path.clone().into_os_string()),
        _ => lookup(key),
    }
}

/// `~/.baapan/workspace_<pid>_<millis>` 形式の使い捨てパス。
pub fn ephemeral_workspace_path(home: &std::path::Path) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    home.join(WORKSPACES_DIR)
        .join(format!("workspace_{}_{}", process::id(), millis))
}

/// ホームディレクトリを環境変数から決定する。
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
