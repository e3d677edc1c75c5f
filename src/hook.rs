// パス: src/hook.rs
// 役割: プロセス全体で共有されるロード入口にインターセプタを 1 度だけ据え付ける
// 意図: どこから発行されたロード要求も同じ分類・インストール経路を通るようにする
// 関連ファイル: src/interceptor.rs, src/session.rs, tests/hook.rs
//! プロセス全体のロードフック。
//!
//! 据え付け状態はプロセススコープで保持し、二重の据え付けは拒否する。
//! 単一スレッドの協調的な実行を前提にしており、ミューテックスは
//! 要求同士が交錯しないことを型で表すためのもの。

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::errors::{LoadError, LoadResult};
use crate::interceptor::{LoadInterceptor, LoaderInfo, ModuleLoader};
use crate::resolver::LoadedModule;

static ACTIVE_LOADER: OnceCell<Mutex<LoadInterceptor>> = OnceCell::new();
static RETIRED: AtomicBool = AtomicBool::new(false);

/// 旧来ヘルパ使用時の警告文。
pub const DEPRECATION_NOTICE: &str =
    "use of 'baapan()' is deprecated! You can now directly use 'require()' instead.";

/// REPL 入力を発行元とみなすときの仮想ファイル名。
pub const REPL_ISSUER: &str = "[repl]";

/// インターセプタをプロセスのロード入口として据え付ける。
///
/// 既に据え付け済みの場合は受け取ったインターセプタをそのまま返す。
pub fn install(interceptor: LoadInterceptor) -> Result<(), LoadInterceptor> {
    ACTIVE_LOADER
        .set(Mutex::new(interceptor))
        .map_err(|rejected| match rejected.into_inner() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        })
}

pub fn is_installed() -> bool {
    ACTIVE_LOADER.get().is_some()
}

/// セッション終了時にフックを退役させる。以降のロード要求は失敗する。
///
/// 据え付けはプロセスで 1 度きりなので、退役後に再び据え付けることはできない。
pub fn retire() {
    if is_installed() {
        RETIRED.store(true, Ordering::SeqCst);
    }
}

pub fn is_retired() -> bool {
    RETIRED.load(Ordering::SeqCst)
}

fn active() -> LoadResult<MutexGuard<'static, LoadInterceptor>> {
    if is_retired() {
        return Err(LoadError::HookRetired);
    }
    ACTIVE_LOADER
        .get()
        .ok_or(LoadError::HookNotInstalled)?
        .lock()
        .map_err(|_| LoadError::HookPoisoned)
}

/// 据え付け済みのインターセプタ経由でロードする。
pub fn require(reference: &str, issuer: Option<&Path>) -> LoadResult<LoadedModule> {
    active()?.load(reference, issuer)
}

/// 据え付け済みインターセプタの状態を取得する。
pub fn info() -> LoadResult<LoaderInfo> {
    active()?.info()
}

/// 旧来の手動ロード用ヘルパ。通常の [`require`] にそのまま委譲する。
#[deprecated(note = "use `require` instead; loads now install missing packages automatically")]
pub fn load(reference: &str) -> LoadResult<LoadedModule> {
    warn!("{}", DEPRECATION_NOTICE);
    let issuer = repl_issuer();
    require(reference, Some(&issuer))
}

/// カレントディレクトリ直下の仮想ファイルを REPL の発行元とする。
pub fn repl_issuer() -> PathBuf {
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(REPL_ISSUER)
}

/// [`ModuleLoader`] としてグローバルフックを扱うためのハンドル。
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalHook;

impl ModuleLoader for GlobalHook {
    fn require(&mut self, reference: &str, issuer: Option<&Path>) -> LoadResult<LoadedModule> {
        require(reference, issuer)
    }

    fn info(&self) -> LoadResult<LoaderInfo> {
        info()
    }
}
