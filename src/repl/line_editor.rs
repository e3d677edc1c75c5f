// パス: src/repl/line_editor.rs
// 役割: 標準入力からプロンプト付きで 1 行ずつ読み取る
// 意図: 端末の種類に依存しない最小限の行入力を REPL へ提供する
// 関連ファイル: src/repl/cmd.rs
use std::io::{self, BufRead, Write};

/// 行入力が返す結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Line(String),
    Eof,
}

/// 任意のリーダーから読み取る行エディタ。既定は標準入力。
pub struct LineEditor<R: BufRead = io::StdinLock<'static>> {
    input: R,
}

impl LineEditor {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> LineEditor<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// プロンプトを出力し、改行を除いた 1 行を取得する。
    pub fn read_line<W: Write>(&mut self, prompt: &str, out: &mut W) -> io::Result<ReadResult> {
        write!(out, "{}", prompt)?;
        out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadResult::Eof);
        }
        if line.ends_with('\n') {
            line.pop();
        }
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(ReadResult::Line(line))
    }
}
