// パス: src/lib.rs
// 役割: Crate root wiring modules and exports
// 意図: Expose the loader, workspace and session building blocks to the binary and tests
// 関連ファイル: src/session.rs, src/interceptor.rs, src/errors.rs
//! baapan (Rust) ルートモジュール
//!
//! 目的:
//! - 対話セッション中に未インストールのパッケージをその場で取得してロードする。
//! - 取得先は使い捨て（または永続指定）のワークスペースに閉じ込める。
//!
//! 方針:
//! - コメント/ドキュメントは日本語、識別子は英語。
//! - 分類は純粋関数、副作用（ファイル・サブプロセス）はトレイトの裏に置く。
//! - パブリックAPIは最小限。

pub mod classifier;
pub mod config;
pub mod errors;
pub mod history;
pub mod hook;
pub mod installer;
pub mod interceptor;
pub mod logging;
pub mod repl;
pub mod resolver;
pub mod search_path;
pub mod session;
pub mod workspace;

// 便利な再エクスポート（利用側が頻繁に触る型のみ）
pub use crate::classifier::{classify, ModuleClassification, ModuleKind};
pub use crate::config::SessionConfig;
pub use crate::errors::*;
pub use crate::installer::{InstallOutcome, InstallerBridge, NpmCli, PackageManager};
pub use crate::interceptor::{LoadInterceptor, LoaderInfo, ModuleLoader};
pub use crate::resolver::{FsResolver, LoadedModule, ModuleLocation};
pub use crate::session::Session;
pub use crate::workspace::Workspace;
