// パス: src/repl/mod.rs
// 役割: REPL module facade and re-exports
// 意図: Expose interactive entry points without leaking internals
// 関連ファイル: src/repl/cmd.rs, src/session.rs, src/bin/baapan.rs
//! 対話環境を構成するモジュール群をまとめたファサード。
//!
//! - `cmd`: メインループとコマンド解釈
//! - `line_editor`: プロンプト付きの行入力
//! - `printer`: ユーザー向けの表示ロジック
//! - `util`: 入力文からのロード呼び出し抽出

pub mod cmd;
mod line_editor;
mod printer;
mod util;

pub use cmd::run_repl;
