// パス: src/workspace.rs
// 役割: セッション専用のプロジェクトディレクトリの作成・初期化・破棄を担う
// 意図: 片付けの失敗がワークスペースの利用可否を妨げない順序を一箇所で保証する
// 関連ファイル: src/installer.rs, src/session.rs, tests/workspace.rs
//! ワークスペース管理。
//!
//! ワークスペースはセッション開始時に 1 度だけ用意され、
//! `persistent` でなければセッション終了時に破棄される。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{WorkspaceError, WorkspaceResult};
use crate::installer::PackageManager;

/// プロジェクト記述子のファイル名。
pub const PROJECT_DESCRIPTOR: &str = "package.json";
/// 依存キャッシュのディレクトリ名。
pub const MODULES_DIR: &str = "node_modules";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceState {
    Uninitialized,
    Initialized,
}

/// `switch_to` の動作オプション。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchOptions {
    pub clean_up_first: bool,
}

/// 1 セッション分のプライベートなプロジェクトルート。
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    persistent: bool,
    state: WorkspaceState,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, persistent: bool) -> Self {
        Self {
            root: root.into(),
            persistent,
            state: WorkspaceState::Uninitialized,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn state(&self) -> WorkspaceState {
        self.state
    }

    /// 依存キャッシュ（`node_modules`）の絶対パス。
    pub fn modules_dir(&self) -> PathBuf {
        self.root.join(MODULES_DIR)
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(PROJECT_DESCRIPTOR)
    }

    /// ディレクトリツリーを用意する。既に存在してもエラーにしない。
    pub fn create(&self) -> WorkspaceResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| WorkspaceError::Create {
            path: self.root.clone(),
            source,
        })
    }

    /// 記述子が無ければ初期化コマンドを実行し、依存キャッシュを必ず用意する。
    ///
    /// 記述子が既にあるワークスペース（外部で作られたもの）でも
    /// `node_modules` だけは作成する。
    pub fn initialize_as_project(&mut self, manager: &dyn PackageManager) -> WorkspaceResult<()> {
        let descriptor = self.descriptor_path();
        match fs::metadata(&descriptor) {
            Ok(_) => debug!(path = %descriptor.display(), "project descriptor already present"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("Initializing workspace...");
                let outcome = manager.init_project(&self.root);
                if !outcome.success {
                    return Err(WorkspaceError::ProjectInit {
                        path: self.root.clone(),
                        message: outcome.message.unwrap_or_default(),
                    });
                }
            }
            Err(source) => {
                return Err(WorkspaceError::Create {
                    path: descriptor,
                    source,
                })
            }
        }
        let modules = self.modules_dir();
        fs::create_dir_all(&modules).map_err(|source| WorkspaceError::Create {
            path: modules,
            source,
        })?;
        self.state = WorkspaceState::Initialized;
        Ok(())
    }

    /// 必要なら既存ワークスペースを破棄し、作成と初期化を必ず実行する。
    ///
    /// 破棄の失敗（存在しなかった場合など）は握り潰してログに残すだけにする。
    pub fn switch_to(
        &mut self,
        manager: &dyn PackageManager,
        options: SwitchOptions,
    ) -> WorkspaceResult<()> {
        if options.clean_up_first {
            if let Err(err) = self.destroy() {
                debug!(error = %err, "ignoring failed clean-up before switching workspace");
            }
        }
        info!("Creating workspace...");
        self.create()?;
        self.initialize_as_project(manager)?;
        info!("Workspace loaded!");
        Ok(())
    }

    /// ディレクトリツリーを再帰的に削除する。失敗はそのまま返す。
    pub fn destroy(&mut self) -> WorkspaceResult<()> {
        fs::remove_dir_all(&self.root).map_err(|source| WorkspaceError::Destroy {
            path: self.root.clone(),
            source,
        })?;
        self.state = WorkspaceState::Uninitialized;
        Ok(())
    }

    /// セッション終了時の片付け。失敗は debug ログに残して捨てる。
    pub fn destroy_best_effort(&mut self) {
        if let Err(err) = self.destroy() {
            debug!(error = %err, "ignoring failed workspace clean-up");
        }
    }
}
