// パス: src/repl/cmd.rs
// 役割: REPL のメインループとコマンド解釈、ロード要求の発行
// 意図: 入力行を受理イベントとロード要求へ変換し、失敗しても次の入力へ進めるようにする
// 関連ファイル: src/session.rs, src/interceptor.rs, src/repl/util.rs
//! REPL のコマンド処理。
//! 評価器は接続しておらず、入力文中の `require` 呼び出しだけを順に実行する。

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::hook::{DEPRECATION_NOTICE, REPL_ISSUER};
use crate::interceptor::ModuleLoader;
use crate::resolver::LoadedModule;
use crate::session::Session;

use super::line_editor::{LineEditor, ReadResult};
use super::printer::{render_help, write_module, write_search_paths, write_workspace};
use super::util::{extract_load_calls, LoadCall};

const BANNER: &str = "baapan REPL (Rust) :: require('pkg') で未インストールのパッケージも取得 :: :help でヘルプ";

/// 標準入出力で対話セッションを実行する。
pub fn run_repl(session: &mut Session) -> io::Result<()> {
    let mut editor = LineEditor::stdin();
    let issuer = issuer_in(&env::current_dir()?);
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    run_repl_with(session, &mut editor, &issuer, &mut stdout, &mut stderr)
}

pub(crate) trait ReplLineSource {
    fn read_line<W: Write>(&mut self, prompt: &str, out: &mut W) -> io::Result<ReadResult>;
}

impl<R: BufRead> ReplLineSource for LineEditor<R> {
    fn read_line<W: Write>(&mut self, prompt: &str, out: &mut W) -> io::Result<ReadResult> {
        LineEditor::read_line(self, prompt, out)
    }
}

/// 行ソースと発行元ファイルを指定して REPL ループを回す。
pub(crate) fn run_repl_with<S, W, E>(
    session: &mut Session,
    source: &mut S,
    issuer: &Path,
    out: &mut W,
    err: &mut E,
) -> io::Result<()>
where
    S: ReplLineSource,
    W: Write,
    E: Write,
{
    writeln!(out, "{}", BANNER)?;
    loop {
        let line = match source.read_line("> ", out) {
            Ok(ReadResult::Line(line)) => line,
            Ok(ReadResult::Eof) => {
                writeln!(out)?;
                break;
            }
            Err(e) => {
                writeln!(err, "入力エラー: {}", e)?;
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        session.accept_line(input);

        match parse_repl_command(input) {
            ReplCommand::Quit => break,
            ReplCommand::Help => render_help(out)?,
            cmd => {
                let msgs = execute(session.loader(), cmd, issuer);
                dispatch_messages(msgs, out, err)?;
            }
        }
    }
    Ok(())
}

/// 対話セッションがユーザーへ返す応答メッセージのカテゴリ。
#[derive(Debug)]
pub(crate) enum ReplMsg {
    Out(String),
    Err(String),
    Module(LoadedModule),
}

fn dispatch_messages<W: Write, E: Write>(
    msgs: Vec<ReplMsg>,
    out: &mut W,
    err: &mut E,
) -> io::Result<()> {
    for msg in msgs {
        match msg {
            ReplMsg::Out(s) => writeln!(out, "{}", s)?,
            ReplMsg::Err(s) => writeln!(err, "{}", s)?,
            ReplMsg::Module(m) => write_module(out, &m)?,
        }
    }
    Ok(())
}

/// 解釈済みコマンドを実行し、出力メッセージを返す。
pub(crate) fn execute(loader: &mut dyn ModuleLoader, cmd: ReplCommand, issuer: &Path) -> Vec<ReplMsg> {
    match cmd {
        ReplCommand::Require(reference) => vec![require_one(loader, &reference, issuer)],
        ReplCommand::LegacyLoad(reference) => vec![
            ReplMsg::Err(DEPRECATION_NOTICE.into()),
            require_one(loader, &reference, issuer),
        ],
        ReplCommand::Statement(src) => exec_statement(loader, &src, issuer),
        ReplCommand::Workspace => render_info(loader, |buf, info| write_workspace(buf, info)),
        ReplCommand::Paths => render_info(loader, |buf, info| write_search_paths(buf, info)),
        ReplCommand::Help | ReplCommand::Quit => Vec::new(),
        ReplCommand::Invalid(s) => vec![ReplMsg::Err(format!(
            "エラー: コマンド形式が不正です: {}",
            s
        ))],
    }
}

fn require_one(loader: &mut dyn ModuleLoader, reference: &str, issuer: &Path) -> ReplMsg {
    match loader.require(reference, Some(issuer)) {
        Ok(module) => ReplMsg::Module(module),
        Err(e) => ReplMsg::Err(format!("Error: {}", e)),
    }
}

// 失敗したロード以降はその文の残りを実行しない。
fn exec_statement(loader: &mut dyn ModuleLoader, src: &str, issuer: &Path) -> Vec<ReplMsg> {
    let calls = extract_load_calls(src);
    if calls.is_empty() {
        return vec![ReplMsg::Out(
            "(require 呼び出しが見つかりません。評価器は接続されていません)".into(),
        )];
    }
    let mut msgs = Vec::new();
    for call in calls {
        let reference = match call {
            LoadCall::Require(reference) => reference,
            LoadCall::Legacy(reference) => {
                msgs.push(ReplMsg::Err(DEPRECATION_NOTICE.into()));
                reference
            }
        };
        let msg = require_one(loader, &reference, issuer);
        let failed = matches!(msg, ReplMsg::Err(_));
        msgs.push(msg);
        if failed {
            break;
        }
    }
    msgs
}

fn render_info<F>(loader: &dyn ModuleLoader, render: F) -> Vec<ReplMsg>
where
    F: FnOnce(&mut Vec<u8>, &crate::interceptor::LoaderInfo) -> io::Result<()>,
{
    let info = match loader.info() {
        Ok(info) => info,
        Err(e) => return vec![ReplMsg::Err(format!("Error: {}", e))],
    };
    let mut buf = Vec::new();
    if let Err(e) = render(&mut buf, &info) {
        return vec![ReplMsg::Err(format!("Error: {}", e))];
    }
    let text = String::from_utf8_lossy(&buf);
    vec![ReplMsg::Out(text.trim_end().to_string())]
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// REPL が解釈できるトップレベルコマンドの集合。
pub(crate) enum ReplCommand {
    /// `:help` / `:h`
    Help,
    /// `:quit` / `:q`
    Quit,
    /// `:require REF`
    Require(String),
    /// `:load REF`（旧来の `baapan()` 相当）
    LegacyLoad(String),
    /// `:workspace`
    Workspace,
    /// `:paths`
    Paths,
    /// コマンド以外の入力。文中の `require` 呼び出しを実行する。
    Statement(String),
    Invalid(String),
}

/// 生の入力文字列を `ReplCommand` 列挙に解析する。
pub(crate) fn parse_repl_command(input: &str) -> ReplCommand {
    let s = input.trim();
    match s {
        ":help" | ":h" => return ReplCommand::Help,
        ":quit" | ":q" | ".exit" => return ReplCommand::Quit,
        ":workspace" => return ReplCommand::Workspace,
        ":paths" => return ReplCommand::Paths,
        _ => {}
    }
    if let Some(rest) = s.strip_prefix(":require ") {
        return reference_command(s, rest, ReplCommand::Require);
    }
    if let Some(rest) = s.strip_prefix(":load ") {
        return reference_command(s, rest, ReplCommand::LegacyLoad);
    }
    if s.starts_with(':') {
        return ReplCommand::Invalid(s.to_string());
    }
    ReplCommand::Statement(s.to_string())
}

fn reference_command(raw: &str, rest: &str, ctor: fn(String) -> ReplCommand) -> ReplCommand {
    let reference = rest.trim().trim_matches(|c: char| c == '\'' || c == '"');
    if reference.is_empty() {
        return ReplCommand::Invalid(raw.to_string());
    }
    ctor(reference.to_string())
}

/// `dir` 直下の仮想ファイルを REPL 入力の発行元とする。
pub(crate) fn issuer_in(dir: &Path) -> PathBuf {
    dir.join(REPL_ISSUER)
}
