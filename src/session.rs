// パス: src/session.rs
// 役割: ワークスペース準備・フック据え付け・履歴配線・終了時の片付けを束ねる
// 意図: 片付けを 1 度だけ、保留中のロードが無い時点で実行することを所有権で保証する
// 関連ファイル: src/config.rs, src/hook.rs, src/repl/cmd.rs, tests/session.rs
//! セッションのライフサイクル。

use std::env;
use std::fmt;
use std::path::Path;

use tracing::info;

use crate::config::{SessionConfig, WorkspaceSettings};
use crate::errors::{SessionError, SessionResult, WorkspaceResult};
use crate::history::SessionHistory;
use crate::hook::{self, GlobalHook};
use crate::installer::{InstallerBridge, PackageManager};
use crate::interceptor::{LoadInterceptor, ModuleLoader};
use crate::resolver::FsResolver;
use crate::search_path::{ancestor_module_dirs, SearchPaths};
use crate::workspace::{SwitchOptions, Workspace};

/// ワークスペースを用意する。永続でなければ既存のものを先に破棄する。
pub fn prepare_workspace(
    settings: &WorkspaceSettings,
    manager: &dyn PackageManager,
) -> WorkspaceResult<Workspace> {
    let mut workspace = Workspace::new(&settings.path, settings.persistent);
    workspace.switch_to(
        manager,
        SwitchOptions {
            clean_up_first: !settings.persistent,
        },
    )?;
    Ok(workspace)
}

/// `cwd` から上の `node_modules` を引き継いだインターセプタを組み立てる。
pub fn build_interceptor(
    workspace: Workspace,
    manager: impl PackageManager + Send + 'static,
    cwd: &Path,
) -> LoadInterceptor {
    let mut search_paths = SearchPaths::new();
    for dir in ancestor_module_dirs(cwd) {
        search_paths.append_once(dir);
    }
    let mut interceptor = LoadInterceptor::new(workspace, InstallerBridge::new(manager), FsResolver)
        .with_search_paths(search_paths);
    interceptor.register_workspace();
    interceptor
}

/// 1 回の対話セッション。
pub struct Session {
    loader: Box<dyn ModuleLoader + Send>,
    history: Option<SessionHistory>,
    cleanup: ExitCleanup,
}

impl Session {
    /// プロセス全体のロードフックを据え付けてセッションを開始する。
    pub fn start<M>(config: &SessionConfig, manager: M) -> SessionResult<Self>
    where
        M: PackageManager + Send + 'static,
    {
        let workspace = prepare_workspace(&config.workspace, &manager)?;
        let cleanup = ExitCleanup::new(workspace.clone());
        let cwd = env::current_dir()?;
        let interceptor = build_interceptor(workspace, manager, &cwd);
        if hook::install(interceptor).is_err() {
            return Err(SessionError::HookAlreadyInstalled);
        }
        Ok(Self {
            loader: Box::new(GlobalHook),
            history: open_history(config),
            cleanup: cleanup.retiring_hook(),
        })
    }

    /// グローバルフックを使わず、セッション固有のローダで開始する。
    pub fn start_isolated<M>(config: &SessionConfig, manager: M, cwd: &Path) -> SessionResult<Self>
    where
        M: PackageManager + Send + 'static,
    {
        let workspace = prepare_workspace(&config.workspace, &manager)?;
        let cleanup = ExitCleanup::new(workspace.clone());
        let interceptor = build_interceptor(workspace, manager, cwd);
        Ok(Self {
            loader: Box::new(interceptor),
            history: open_history(config),
            cleanup,
        })
    }

    pub fn loader(&mut self) -> &mut dyn ModuleLoader {
        self.loader.as_mut()
    }

    pub fn history(&self) -> Option<&SessionHistory> {
        self.history.as_ref()
    }

    /// 入力受理イベント。履歴が無効なら何もしない。
    pub fn accept_line(&mut self, line: &str) {
        if let Some(history) = self.history.as_mut() {
            history.on_line_accepted(line);
        }
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.cleanup.workspace.as_ref().map(Workspace::root)
    }

    /// 終了処理を明示的に実行する。
    ///
    /// [`Session::start`] で開始した場合はグローバルフックも退役し、
    /// 以降の [`hook::require`] は [`LoadError::HookRetired`] で失敗する。
    ///
    /// [`LoadError::HookRetired`]: crate::errors::LoadError::HookRetired
    pub fn finish(mut self) {
        self.cleanup.run();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("history", &self.history)
            .field("cleanup", &self.cleanup)
            .finish_non_exhaustive()
    }
}

fn open_history(config: &SessionConfig) -> Option<SessionHistory> {
    config
        .history
        .path
        .as_ref()
        .map(|path| SessionHistory::open(path, config.history.max_entries))
}

/// 終了時に 1 度だけ走るワークスペースの片付け。
#[derive(Debug)]
struct ExitCleanup {
    workspace: Option<Workspace>,
    retire_hook: bool,
}

impl ExitCleanup {
    fn new(workspace: Workspace) -> Self {
        Self {
            workspace: Some(workspace),
            retire_hook: false,
        }
    }

    // グローバルフックは片付け済みのワークスペースを指し続けるので、先に退役させる。
    fn retiring_hook(mut self) -> Self {
        self.retire_hook = true;
        self
    }

    fn run(&mut self) {
        let Some(mut workspace) = self.workspace.take() else {
            return;
        };
        if self.retire_hook {
            hook::retire();
        }
        if workspace.is_persistent() {
            info!("Workspace {} preserved!", workspace.root().display());
        } else {
            info!("Cleaning up workspace...");
            workspace.destroy_best_effort();
        }
    }
}

impl Drop for ExitCleanup {
    fn drop(&mut self) {
        self.run();
    }
}
