// パス: src/bin/baapan.rs
// 役割: Binary entrypoint that prepares a session and launches the REPL
// 意図: Offer a CLI executable whose missing packages are fetched on first use
// 関連ファイル: src/session.rs, src/config.rs, src/repl/cmd.rs
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use baapan::config::{HistorySettings, SessionConfig};
use baapan::installer::NpmCli;
use baapan::session::Session;
use baapan::{logging, repl};

#[derive(Debug, Parser)]
#[command(name = "baapan", version, about = "require() で足りないパッケージをその場で取得する REPL")]
struct Cli {
    /// 永続ワークスペースとして使うディレクトリ（BAAPAN_WS_PATH より優先）
    #[arg(long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// 入力履歴を保存しない
    #[arg(long)]
    no_history: bool,

    /// パッケージマネージャの実行ファイル（BAAPAN_NPM より優先）
    #[arg(long, value_name = "PROGRAM")]
    npm: Option<String>,

    /// ログを詳細にする（-vv で trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 警告以上のみ表示する
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn apply(&self, config: &mut SessionConfig) {
        if self.no_history {
            config.history = HistorySettings::disabled();
        }
        if let Some(program) = &self.npm {
            config.npm_program = program.clone();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet));

    let mut config = match SessionConfig::from_env_with_workspace(cli.workspace.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    let npm = NpmCli::new(config.npm_program.clone());
    let mut session = match Session::start(&config, npm) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let outcome = repl::run_repl(&mut session);
    session.finish();
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
