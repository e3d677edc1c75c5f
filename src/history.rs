// パス: src/history.rs
// 役割: 受理された入力行の履歴をファイルへ永続化する
// 意図: 履歴 I/O の失敗でセッションが止まらないよう、失敗は記録だけして捨てる
// 関連ファイル: src/config.rs, src/repl/cmd.rs, tests/session.rs
//! セッション履歴。
//!
//! 書き込みは追記ではなく、メモリ上の履歴全体で毎回ファイルを書き直す。
//! 同じディレクトリの一時ファイルへ書いてから置き換えるため、
//! 読み手からは直前の内容か新しい内容のどちらかしか見えない。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

/// 履歴件数の既定上限。
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// 履歴ファイルを読み込み、空でない行をトリムしてファイル順に返す。
///
/// 読み込みに失敗した場合（ファイルが無い、権限が無いなど）は空を返す。
pub fn load(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unreadable history file");
            Vec::new()
        }
    }
}

/// ファイルに裏付けられた入力履歴。
#[derive(Debug, Clone)]
pub struct SessionHistory {
    path: PathBuf,
    entries: Vec<String>,
    max_entries: usize,
}

impl SessionHistory {
    /// 既存の履歴を読み込んで構築する。上限を超える古い行は落とす。
    pub fn open(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        let max_entries = max_entries.max(1);
        let mut entries = load(&path);
        if entries.len() > max_entries {
            entries.drain(..entries.len() - max_entries);
        }
        Self {
            path,
            entries,
            max_entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// 入力受理イベント。履歴へ追加し、ファイル全体を書き直す。
    pub fn on_line_accepted(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.entries.len() == self.max_entries {
            self.entries.remove(0);
        }
        self.entries.push(trimmed.to_string());
        if let Err(err) = self.rewrite() {
            debug!(path = %self.path.display(), error = %err, "ignoring failed history write");
        }
    }

    /// メモリ上の履歴でファイルを置き換える。
    pub fn rewrite(&self) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        let mut tmp = NamedTempFile::new_in(&parent)?;
        for entry in &self.entries {
            writeln!(tmp, "{}", entry)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}
