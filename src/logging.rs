// パス: src/logging.rs
// 役割: tracing のグローバルサブスクライバを初期化する
// 意図: ワークスペース操作やインストールの進捗を stderr へ一貫した形式で出す
// 関連ファイル: src/bin/baapan.rs, src/session.rs

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// `-v` / `-q` の指定回数から既定レベルを決める。
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::WARN;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// サブスクライバを登録する。`RUST_LOG` があればそちらを優先する。
///
/// 既に登録済みの場合は何もしない。
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
