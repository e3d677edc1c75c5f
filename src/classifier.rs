// パス: src/classifier.rs
// 役割: ロード要求の参照文字列を Local / BuiltIn / Scoped / Ordinary に分類する
// 意図: インストール可否の判定を副作用のない純粋関数に閉じ込める
// 関連ファイル: src/interceptor.rs, src/installer.rs, tests/classifier.rs
//! 参照文字列の分類器。
//!
//! 判定順序:
//! 1. 空文字列 → [`LoadError::InvalidReference`]
//! 2. パス区切りで始まる → `Local`（そのまま絶対パス）
//! 3. `.` で始まる → `Local`（発行元ファイルのディレクトリ基準）
//! 4. `@` で始まる → `Scoped`（先頭 2 セグメントのみをパッケージ名とする）
//! 5. それ以外 → 先頭セグメントが組み込みなら `BuiltIn`、そうでなければ `Ordinary`
//!
//! インストール対象は常にトップレベルのパッケージ名であり、
//! `package/submodule` のようなサブパスが単独でインストールされることはない。

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;

use crate::errors::{LoadError, LoadResult};

/// 組み込みモジュールを明示する接頭辞。
pub const BUILTIN_SCHEME: &str = "node:";

static BUILTIN_MODULES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "assert",
        "async_hooks",
        "buffer",
        "child_process",
        "cluster",
        "console",
        "constants",
        "crypto",
        "dgram",
        "diagnostics_channel",
        "dns",
        "domain",
        "events",
        "fs",
        "http",
        "http2",
        "https",
        "inspector",
        "module",
        "net",
        "os",
        "path",
        "perf_hooks",
        "process",
        "punycode",
        "querystring",
        "readline",
        "repl",
        "stream",
        "string_decoder",
        "sys",
        "timers",
        "tls",
        "trace_events",
        "tty",
        "url",
        "util",
        "v8",
        "vm",
        "wasi",
        "worker_threads",
        "zlib",
    ]
    .into_iter()
    .collect()
});

// 組み込みモジュールが公開しているサブパス。これ以外の `fs/...` は存在しない。
static BUILTIN_SUBPATHS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "assert/strict",
        "dns/promises",
        "fs/promises",
        "inspector/promises",
        "path/posix",
        "path/win32",
        "readline/promises",
        "stream/consumers",
        "stream/promises",
        "stream/web",
        "timers/promises",
        "util/types",
    ]
    .into_iter()
    .collect()
});

// `node:` 付きでしか参照できない組み込みモジュール。
static SCHEME_ONLY_MODULES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["sea", "sqlite", "test", "test/reporters"]
        .into_iter()
        .collect()
});

/// 参照の種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Local,
    BuiltIn,
    Scoped,
    Ordinary,
}

impl ModuleKind {
    /// サードパーティ（レジストリから取得可能）な種類かどうか。
    pub const fn is_installable(self) -> bool {
        matches!(self, ModuleKind::Scoped | ModuleKind::Ordinary)
    }

    pub const fn label(self) -> &'static str {
        match self {
            ModuleKind::Local => "local",
            ModuleKind::BuiltIn => "builtin",
            ModuleKind::Scoped => "scoped",
            ModuleKind::Ordinary => "package",
        }
    }
}

/// 1 回のロード要求に対する分類結果。生成後は不変。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleClassification {
    kind: ModuleKind,
    reference: String,
    resolved: String,
}

impl ModuleClassification {
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// 要求時の参照文字列（サブパスを含む）。
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// `Local` では絶対パス、それ以外ではパッケージ識別子。
    pub fn resolved(&self) -> &str {
        &self.resolved
    }

    pub fn is_installable(&self) -> bool {
        self.kind.is_installable()
    }

    /// `Local` の場合の解決済み絶対パス。
    pub fn local_path(&self) -> Option<&Path> {
        match self.kind {
            ModuleKind::Local => Some(Path::new(&self.resolved)),
            _ => None,
        }
    }
}

/// 参照文字列を分類する。
///
/// `issuer` は要求を発行したファイルで、`.` 始まりの相対参照を解決するときにのみ使う。
/// 相対参照で `issuer` が与えられない場合は [`LoadError::UnresolvableCaller`] で失敗する。
///
/// # Examples
/// ```
/// use std::path::Path;
/// use baapan::classifier::{classify, ModuleKind};
///
/// let c = classify("@scope/pkg/deep/path", None).unwrap();
/// assert_eq!(c.kind(), ModuleKind::Scoped);
/// assert_eq!(c.resolved(), "@scope/pkg");
///
/// let c = classify("./utils", Some(Path::new("/proj/app.js"))).unwrap();
/// assert_eq!(c.resolved(), "/proj/utils");
/// ```
pub fn classify(reference: &str, issuer: Option<&Path>) -> LoadResult<ModuleClassification> {
    if reference.is_empty() || reference.contains('\0') {
        return Err(LoadError::invalid_reference(reference));
    }

    let (kind, resolved) = if starts_with_separator(reference) || Path::new(reference).is_absolute()
    {
        (ModuleKind::Local, reference.to_string())
    } else if reference.starts_with('.') {
        let issuer = issuer.ok_or_else(|| LoadError::UnresolvableCaller {
            reference: reference.to_string(),
        })?;
        let base = issuer.parent().unwrap_or_else(|| Path::new(""));
        let joined = normalize_lexically(&base.join(reference));
        (ModuleKind::Local, joined.to_string_lossy().into_owned())
    } else if reference.starts_with('@') {
        (ModuleKind::Scoped, scoped_package_name(reference)?)
    } else if let Some(name) = reference.strip_prefix(BUILTIN_SCHEME) {
        if name.is_empty() {
            return Err(LoadError::invalid_reference(reference));
        }
        (ModuleKind::BuiltIn, reference.to_string())
    } else {
        let first = first_segment(reference);
        if first.is_empty() {
            return Err(LoadError::invalid_reference(reference));
        }
        if is_builtin(first) {
            (ModuleKind::BuiltIn, first.to_string())
        } else {
            (ModuleKind::Ordinary, first.to_string())
        }
    };

    Ok(ModuleClassification {
        kind,
        reference: reference.to_string(),
        resolved,
    })
}

/// 先頭セグメントが組み込みモジュール名かどうか。
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_MODULES.contains(name)
}

/// 組み込みとして実在する指定子かどうか。`node:` 接頭辞も受け付ける。
///
/// 分類は先頭セグメントだけで `BuiltIn` とするので、`fs/bogus` のような
/// 実在しないサブパスはここで弾かれる。
pub fn is_builtin_specifier(specifier: &str) -> bool {
    match specifier.strip_prefix(BUILTIN_SCHEME) {
        Some(bare) => {
            is_builtin(bare)
                || BUILTIN_SUBPATHS.contains(bare)
                || SCHEME_ONLY_MODULES.contains(bare)
        }
        None => is_builtin(specifier) || BUILTIN_SUBPATHS.contains(specifier),
    }
}

/// 参照がトップレベルのパッケージ名そのもの（サブパスなし）かどうか。
pub fn is_top_level_package(identifier: &str) -> bool {
    let expected = if identifier.starts_with('@') {
        scoped_package_name(identifier).ok()
    } else {
        Some(first_segment(identifier).to_string())
    };
    expected.as_deref() == Some(identifier) && !identifier.is_empty()
}

fn starts_with_separator(reference: &str) -> bool {
    reference.chars().next().is_some_and(std::path::is_separator)
}

fn first_segment(reference: &str) -> &str {
    reference.split('/').next().unwrap_or_default()
}

// `@scope` 単体や `@/name` はパッケージ名として成立しない。
fn scoped_package_name(reference: &str) -> LoadResult<String> {
    let mut segments = reference.split('/');
    let scope = segments.next().unwrap_or_default();
    let name = segments.next().unwrap_or_default();
    if scope.len() < 2 || name.is_empty() {
        return Err(LoadError::invalid_reference(reference));
    }
    Ok(format!("{}/{}", scope, name))
}

/// `.` と `..` をファイルシステムに触れずに畳み込む。
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
