// パス: src/interceptor.rs
// 役割: ロード要求を分類→ネイティブ試行→インストール→1 回だけ再試行する状態機械
// 意図: インストール可能な参照の「見つからない」失敗だけを回復経路へ回し、その他の失敗は無加工で返す
// 関連ファイル: src/classifier.rs, src/installer.rs, src/resolver.rs, src/hook.rs
//! ロードインターセプタ。
//!
//! 1 要求あたりの遷移:
//!
//! ```text
//! Requested → Classified → NativeAttempt ─┬→ Satisfied
//!                                         └→ NeedsInstall → Installing → RetryAttempt ─┬→ Satisfied
//!                                                                                      └→ Failed
//! ```
//!
//! 2 回目の試行結果は最終結果で、再インストールは行わない。

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::classifier::{classify, ModuleClassification, ModuleKind};
use crate::errors::LoadResult;
use crate::installer::InstallerBridge;
use crate::resolver::{LoadTarget, LoadedModule, ModuleLocation, ModuleResolver};
use crate::search_path::SearchPaths;
use crate::workspace::Workspace;

/// 1 要求の処理段階。ログ出力用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Classified,
    NativeAttempt,
    NeedsInstall,
    Installing,
    RetryAttempt,
    Satisfied,
    Failed,
}

impl LoadPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            LoadPhase::Classified => "classified",
            LoadPhase::NativeAttempt => "native-attempt",
            LoadPhase::NeedsInstall => "needs-install",
            LoadPhase::Installing => "installing",
            LoadPhase::RetryAttempt => "retry-attempt",
            LoadPhase::Satisfied => "satisfied",
            LoadPhase::Failed => "failed",
        }
    }
}

/// ローダの現在状態のスナップショット。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderInfo {
    pub workspace_root: PathBuf,
    pub persistent: bool,
    pub search_paths: Vec<PathBuf>,
}

/// REPL などの呼び出し側から見たロード入口。
pub trait ModuleLoader {
    /// `issuer` は要求を発行したファイル。相対参照の基準になる。
    fn require(&mut self, reference: &str, issuer: Option<&Path>) -> LoadResult<LoadedModule>;

    fn info(&self) -> LoadResult<LoaderInfo>;
}

pub struct LoadInterceptor {
    workspace: Workspace,
    installer: InstallerBridge,
    resolver: Box<dyn ModuleResolver + Send>,
    search_paths: SearchPaths,
    workspace_registered: bool,
}

impl LoadInterceptor {
    pub fn new(
        workspace: Workspace,
        installer: InstallerBridge,
        resolver: impl ModuleResolver + Send + 'static,
    ) -> Self {
        Self {
            workspace,
            installer,
            resolver: Box::new(resolver),
            search_paths: SearchPaths::new(),
            workspace_registered: false,
        }
    }

    /// 既存の探索パス（利用者のプロジェクトの `node_modules` など）を引き継ぐ。
    pub fn with_search_paths(mut self, search_paths: SearchPaths) -> Self {
        self.search_paths = search_paths;
        self.workspace_registered = false;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    /// ワークスペースの依存キャッシュを最優先の探索パスとして 1 度だけ登録する。
    ///
    /// 登録が行われた場合に `true` を返す。
    pub fn register_workspace(&mut self) -> bool {
        if self.workspace_registered {
            return false;
        }
        self.workspace_registered = true;
        self.search_paths.prepend_once(self.workspace.modules_dir())
    }

    /// 1 件のロード要求を処理する。
    pub fn load(&mut self, reference: &str, issuer: Option<&Path>) -> LoadResult<LoadedModule> {
        let classification = classify(reference, issuer)?;
        trace_phase(&classification, LoadPhase::Classified);
        self.register_workspace();

        trace_phase(&classification, LoadPhase::NativeAttempt);
        let attempt = self.resolver.resolve(native_target(&classification, &self.search_paths));
        match attempt {
            Ok(location) => {
                trace_phase(&classification, LoadPhase::Satisfied);
                Ok(loaded(&classification, location, false))
            }
            Err(err) if err.is_not_found() && classification.is_installable() => {
                trace_phase(&classification, LoadPhase::NeedsInstall);
                self.install_and_retry(&classification)
            }
            Err(err) => {
                trace_phase(&classification, LoadPhase::Failed);
                Err(err)
            }
        }
    }

    fn install_and_retry(
        &mut self,
        classification: &ModuleClassification,
    ) -> LoadResult<LoadedModule> {
        trace_phase(classification, LoadPhase::Installing);
        if let Err(err) = self
            .installer
            .install(classification.resolved(), self.workspace.root())
        {
            trace_phase(classification, LoadPhase::Failed);
            return Err(err);
        }

        trace_phase(classification, LoadPhase::RetryAttempt);
        let target = self.workspace.modules_dir().join(classification.reference());
        match self.resolver.resolve(LoadTarget::File(&target)) {
            Ok(location) => {
                trace_phase(classification, LoadPhase::Satisfied);
                Ok(loaded(classification, location, true))
            }
            Err(err) => {
                trace_phase(classification, LoadPhase::Failed);
                Err(err)
            }
        }
    }
}

impl ModuleLoader for LoadInterceptor {
    fn require(&mut self, reference: &str, issuer: Option<&Path>) -> LoadResult<LoadedModule> {
        self.load(reference, issuer)
    }

    fn info(&self) -> LoadResult<LoaderInfo> {
        Ok(LoaderInfo {
            workspace_root: self.workspace.root().to_path_buf(),
            persistent: self.workspace.is_persistent(),
            search_paths: self.search_paths.iter().map(Path::to_path_buf).collect(),
        })
    }
}

impl fmt::Debug for LoadInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadInterceptor")
            .field("workspace", &self.workspace)
            .field("search_paths", &self.search_paths)
            .field("workspace_registered", &self.workspace_registered)
            .finish_non_exhaustive()
    }
}

fn native_target<'a>(
    classification: &'a ModuleClassification,
    search_paths: &'a SearchPaths,
) -> LoadTarget<'a> {
    match classification.kind() {
        ModuleKind::Local => LoadTarget::File(
            classification
                .local_path()
                .unwrap_or_else(|| Path::new(classification.resolved())),
        ),
        ModuleKind::BuiltIn => LoadTarget::BuiltIn(classification.reference()),
        ModuleKind::Scoped | ModuleKind::Ordinary => LoadTarget::Package {
            specifier: classification.reference(),
            search_paths,
        },
    }
}

fn loaded(
    classification: &ModuleClassification,
    location: ModuleLocation,
    installed: bool,
) -> LoadedModule {
    LoadedModule {
        reference: classification.reference().to_string(),
        kind: classification.kind(),
        location,
        installed,
    }
}

fn trace_phase(classification: &ModuleClassification, phase: LoadPhase) {
    debug!(
        reference = classification.reference(),
        kind = classification.kind().label(),
        phase = phase.as_str(),
        "load request"
    );
}
