// パス: tests/hook.rs
// 役割: プロセス全体のロードフックの据え付けと委譲を検証
// 意図: 据え付けは 1 度だけで、以降の要求はすべて同じインターセプタを通ることを保証する
// 関連ファイル: src/hook.rs, src/session.rs
//! フックはプロセス単位の状態なので、このバイナリのテストは 1 つにまとめる。

#[path = "test_support.rs"]
mod support;

use baapan::config::HistorySettings;
use baapan::errors::{LoadError, SessionError};
use baapan::hook;
use baapan::session::Session;
use support::{FakeNpm, Sandbox};

#[test]
#[allow(deprecated)]
fn hook_lifecycle() {
    assert!(!hook::is_installed());
    hook::retire();
    assert!(!hook::is_retired());
    assert!(matches!(
        hook::require("fs", None),
        Err(LoadError::HookNotInstalled)
    ));

    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let config = sandbox.config(false, HistorySettings::disabled());
    let mut session = Session::start(&config, npm.clone()).unwrap();
    assert!(hook::is_installed());

    // 2 つ目のセッションは別のワークスペースでも拒否される
    let other = Sandbox::new();
    let other_config = other.config(false, HistorySettings::disabled());
    assert!(matches!(
        Session::start(&other_config, FakeNpm::succeeding()),
        Err(SessionError::HookAlreadyInstalled)
    ));

    // セッションのローダとフック直接呼び出しは同じ状態を共有する
    let via_session = session.loader().require("left-pad", None).unwrap();
    assert!(via_session.installed);
    let via_hook = hook::require("left-pad", None).unwrap();
    assert!(!via_hook.installed);
    assert_eq!(via_session.location, via_hook.location);

    // 旧来ヘルパは警告のうえ通常のロードへ委譲する
    let legacy = hook::load("is-odd").unwrap();
    assert!(legacy.installed);
    assert_eq!(
        npm.installs(),
        vec!["left-pad".to_string(), "is-odd".to_string()]
    );

    let info = hook::info().unwrap();
    assert_eq!(info.workspace_root, sandbox.workspace_path());
    assert_eq!(
        info.search_paths.first(),
        Some(&sandbox.workspace_path().join("node_modules"))
    );

    session.finish();
    assert!(!sandbox.workspace_path().exists());

    // 終了後は削除済みのワークスペースへ委譲しない
    assert!(hook::is_retired());
    assert!(matches!(
        hook::require("fs", None),
        Err(LoadError::HookRetired)
    ));
    assert!(matches!(hook::info(), Err(LoadError::HookRetired)));
}
