// パス: src/errors.rs
// 役割: ロード・ワークスペース・設定の各エラー型と Result エイリアスを定義する
// 意図: 呼び出し元が失敗の種類で分岐できるよう、分類ごとに列挙子を分ける
// 関連ファイル: src/interceptor.rs, src/workspace.rs, src/config.rs
//! エラー型の定義。
//!
//! ロード要求の失敗は必ず発行元へ伝搬する（[`LoadError`]）。
//! ワークスペース破棄と履歴 I/O の失敗だけは呼び出し側が明示的に破棄してよい。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// モジュールのロード要求で発生しうるエラー種別。
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid module reference: {reference:?}")]
    InvalidReference { reference: String },
    #[error("could not derive absolute path of module: {reference}")]
    UnresolvableCaller { reference: String },
    #[error("Cannot find module '{reference}'")]
    ModuleNotFound {
        reference: String,
        searched: Vec<PathBuf>,
    },
    #[error("invalid package manifest {path}: {source}")]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to install module '{package}': {message}")]
    InstallationFailed { package: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("load hook is not installed")]
    HookNotInstalled,
    #[error("load hook is poisoned by an earlier panic")]
    HookPoisoned,
    #[error("load hook was retired when its session finished")]
    HookRetired,
}

impl LoadError {
    pub fn invalid_reference(reference: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
        }
    }

    pub fn not_found(reference: impl Into<String>, searched: Vec<PathBuf>) -> Self {
        Self::ModuleNotFound {
            reference: reference.into(),
            searched,
        }
    }

    pub fn installation_failed(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InstallationFailed {
            package: package.into(),
            message: message.into(),
        }
    }

    /// ネイティブローダの「モジュールが見つからない」系の失敗かどうか。
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ModuleNotFound { .. })
    }
}

/// ロード要求の結果を表す型。
pub type LoadResult<T> = Result<T, LoadError>;

/// ワークスペースの作成・初期化・破棄で発生しうるエラー種別。
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to destroy workspace {path}: {source}")]
    Destroy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to initialize workspace {path} as a project: {message}")]
    ProjectInit { path: PathBuf, message: String },
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// 環境変数からセッション設定を組み立てる際のエラー。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory for the default {what}")]
    NoHomeDirectory { what: &'static str },
}

/// セッション全体の起動・終了で発生しうるエラー。
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error("load hook is already installed for this process")]
    HookAlreadyInstalled,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
