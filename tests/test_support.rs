// パス: tests/test_support.rs
// 役割: 統合テスト共通の偽パッケージマネージャとフィクスチャを提供する
// 意図: 実際の npm を呼ばずにインストール経路と呼び出し回数を検証できるようにする
// 関連ファイル: tests/interceptor.rs, tests/session.rs, tests/hook.rs
#![allow(dead_code)]
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use baapan::config::{HistorySettings, SessionConfig, WorkspaceSettings};
use baapan::installer::{InstallOutcome, PackageManager};
use baapan::interceptor::LoadInterceptor;
use baapan::session;
use baapan::workspace::Workspace;

/// インストール時の振る舞い。
#[derive(Debug, Clone)]
pub enum InstallMode {
    /// `node_modules/<pkg>/index.js` と追加ファイルを書き出す。
    Succeed { extra_files: Vec<String> },
    /// 非ゼロ終了を模した失敗を返す。
    Fail(String),
}

#[derive(Debug, Default)]
struct Calls {
    inits: usize,
    installs: Vec<String>,
}

/// 呼び出し履歴を共有する偽の npm。クローンは同じ履歴を参照する。
#[derive(Debug, Clone)]
pub struct FakeNpm {
    mode: InstallMode,
    calls: Arc<Mutex<Calls>>,
}

impl FakeNpm {
    pub fn succeeding() -> Self {
        Self::with_mode(InstallMode::Succeed {
            extra_files: Vec::new(),
        })
    }

    /// パッケージ直下に `files` も書き出す成功モード。
    pub fn succeeding_with(files: &[&str]) -> Self {
        Self::with_mode(InstallMode::Succeed {
            extra_files: files.iter().map(|f| f.to_string()).collect(),
        })
    }

    pub fn failing(message: &str) -> Self {
        Self::with_mode(InstallMode::Fail(message.to_string()))
    }

    fn with_mode(mode: InstallMode) -> Self {
        Self {
            mode,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    pub fn installs(&self) -> Vec<String> {
        self.calls.lock().unwrap().installs.clone()
    }

    pub fn inits(&self) -> usize {
        self.calls.lock().unwrap().inits
    }
}

impl PackageManager for FakeNpm {
    fn init_project(&self, dir: &Path) -> InstallOutcome {
        self.calls.lock().unwrap().inits += 1;
        match fs::write(dir.join("package.json"), r#"{"name":"@baapan/workspace"}"#) {
            Ok(()) => InstallOutcome::succeeded(),
            Err(e) => InstallOutcome::failed(e.to_string()),
        }
    }

    fn install(&self, package: &str, dir: &Path) -> InstallOutcome {
        self.calls.lock().unwrap().installs.push(package.to_string());
        match &self.mode {
            InstallMode::Fail(message) => InstallOutcome::failed(message.clone()),
            InstallMode::Succeed { extra_files } => {
                let pkg_dir = dir.join("node_modules").join(package);
                fs::create_dir_all(&pkg_dir).unwrap();
                fs::write(pkg_dir.join("index.js"), "module.exports = {}").unwrap();
                for file in extra_files {
                    let path = pkg_dir.join(file);
                    fs::create_dir_all(path.parent().unwrap()).unwrap();
                    fs::write(path, "").unwrap();
                }
                InstallOutcome::succeeded()
            }
        }
    }
}

/// 一時ディレクトリ上にワークスペースと作業ディレクトリを用意するフィクスチャ。
pub struct Sandbox {
    pub dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create sandbox"),
        }
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.dir.path().join("ws")
    }

    /// 利用者のプロジェクトに見立てたカレントディレクトリ。
    pub fn project_dir(&self) -> PathBuf {
        let dir = self.dir.path().join("project");
        fs::create_dir_all(&dir).expect("create project dir");
        dir
    }

    /// 用意済みワークスペースを持つインターセプタ。
    pub fn interceptor(&self, npm: &FakeNpm) -> LoadInterceptor {
        let settings = WorkspaceSettings {
            path: self.workspace_path(),
            persistent: false,
        };
        let workspace: Workspace =
            session::prepare_workspace(&settings, npm).expect("prepare workspace");
        session::build_interceptor(workspace, npm.clone(), &self.project_dir())
    }

    pub fn config(&self, persistent: bool, history: HistorySettings) -> SessionConfig {
        SessionConfig {
            workspace: WorkspaceSettings {
                path: self.workspace_path(),
                persistent,
            },
            history,
            npm_program: "npm".into(),
        }
    }

    /// REPL 入力と同等の発行元（プロジェクト直下の仮想ファイル）。
    pub fn issuer(&self) -> PathBuf {
        self.project_dir().join("[repl]")
    }
}
