// パス: src/installer.rs
// 役割: 外部パッケージマネージャ（npm）をサブプロセスとして呼び出すブリッジ
// 意図: インストール失敗の判定だけを担い、再試行方針はインターセプタ側に残す
// 関連ファイル: src/interceptor.rs, src/workspace.rs, tests/test_support.rs
//! パッケージインストーラのブリッジ。
//!
//! [`PackageManager`] は外部 CLI との境界で、テストでは偽実装に差し替える。
//! [`InstallerBridge`] は結果を [`LoadError::InstallationFailed`] へ変換するだけで、
//! 内部で再試行はしない。

use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, info};

use crate::classifier::is_top_level_package;
use crate::errors::{LoadError, LoadResult};

/// 1 回のサブプロセス実行結果。永続化せず、その場で消費される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl InstallOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    fn from_output(output: &Output) -> Self {
        if output.status.success() {
            return Self::succeeded();
        }
        let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(stdout.trim());
        }
        if message.is_empty() {
            message = format!("exited with {}", output.status);
        }
        Self::failed(message)
    }
}

/// 作業ディレクトリを指定して外部パッケージマネージャを実行する境界。
pub trait PackageManager {
    /// `dir` をインストール可能なプロジェクトとして初期化する。
    fn init_project(&self, dir: &Path) -> InstallOutcome;

    /// `package`（トップレベル名）と推移的依存を `dir` の依存キャッシュへ入れる。
    fn install(&self, package: &str, dir: &Path) -> InstallOutcome;
}

/// `npm` 実行ファイルを呼び出す標準実装。
#[derive(Debug, Clone)]
pub struct NpmCli {
    program: String,
    scope: String,
}

impl NpmCli {
    pub const DEFAULT_PROGRAM: &'static str = "npm";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            scope: "baapan".into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[&str], dir: &Path) -> InstallOutcome {
        debug!(program = %self.program, ?args, cwd = %dir.display(), "spawning package manager");
        match Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()
        {
            Ok(output) => InstallOutcome::from_output(&output),
            Err(err) => InstallOutcome::failed(format!("failed to spawn {}: {}", self.program, err)),
        }
    }
}

impl Default for NpmCli {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl PackageManager for NpmCli {
    fn init_project(&self, dir: &Path) -> InstallOutcome {
        self.run(&["init", "-y", "--scope", &self.scope], dir)
    }

    fn install(&self, package: &str, dir: &Path) -> InstallOutcome {
        self.run(&["install", "--silent", package], dir)
    }
}

/// ワークスペースへのインストールを同期実行するブリッジ。
pub struct InstallerBridge {
    manager: Box<dyn PackageManager + Send>,
}

impl InstallerBridge {
    pub fn new(manager: impl PackageManager + Send + 'static) -> Self {
        Self {
            manager: Box::new(manager),
        }
    }

    pub fn manager(&self) -> &dyn PackageManager {
        self.manager.as_ref()
    }

    /// `package` を `workspace` へインストールする。
    ///
    /// `package` はトップレベルのパッケージ名でなければならない。
    /// 外部プロセスが非ゼロで終了した場合は [`LoadError::InstallationFailed`] を返す。
    pub fn install(&self, package: &str, workspace: &Path) -> LoadResult<InstallOutcome> {
        if !is_top_level_package(package) {
            return Err(LoadError::invalid_reference(package));
        }
        info!("Fetching and installing module '{}' from npm...", package);
        let outcome = self.manager.install(package, workspace);
        if !outcome.success {
            let message = outcome
                .message
                .unwrap_or_else(|| "installer exited unsuccessfully".into());
            return Err(LoadError::installation_failed(package, message));
        }
        info!("Done!");
        Ok(outcome)
    }
}

impl fmt::Debug for InstallerBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerBridge").finish_non_exhaustive()
    }
}
