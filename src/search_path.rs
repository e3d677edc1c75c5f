// パス: src/search_path.rs
// 役割: パッケージ探索に使う node_modules ディレクトリの順序付き集合
// 意図: 共有の探索パスを明示的な値として持ち回り、重複挿入で順序が変わらないようにする
// 関連ファイル: src/interceptor.rs, src/resolver.rs, src/session.rs

use std::path::{Path, PathBuf};

/// 重複のない順序付き探索パス。先頭ほど優先される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    entries: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最優先の位置へ追加する。既に含まれていれば何もしない。
    ///
    /// 追加した場合に `true` を返す。
    pub fn prepend_once(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.entries.insert(0, path);
        true
    }

    /// 最後尾へ追加する。既に含まれていれば何もしない。
    pub fn append_once(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.entries.push(path);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|p| p == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `dir` とその祖先それぞれの `node_modules` を近い順に列挙する。
pub fn ancestor_module_dirs(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .filter(|p| p.file_name().map_or(true, |name| name != "node_modules"))
        .map(|p| p.join("node_modules"))
        .collect()
}
