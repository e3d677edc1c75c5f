// パス: tests/interceptor.rs
// 役割: 分類・ネイティブ試行・インストール・再試行の遷移を統合的に検証
// 意図: インストールが必要な場合にだけ、ちょうど 1 回だけ起きることを保証する
// 関連ファイル: src/interceptor.rs, src/installer.rs, src/resolver.rs
use std::fs;

#[path = "test_support.rs"]
mod support;

use baapan::classifier::ModuleKind;
use baapan::errors::LoadError;
use baapan::resolver::ModuleLocation;
use support::{FakeNpm, Sandbox};

// 正常系: 未インストールのパッケージは 1 度だけ取得され、2 回目は既存を使う
#[test]
fn missing_package_is_installed_once_then_reused() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);
    let issuer = sandbox.issuer();

    let first = interceptor.load("lodash", Some(&issuer)).unwrap();
    assert!(first.installed);
    assert_eq!(first.kind, ModuleKind::Ordinary);
    assert_eq!(
        first.file().unwrap(),
        sandbox.workspace_path().join("node_modules/lodash/index.js")
    );

    let second = interceptor.load("lodash", Some(&issuer)).unwrap();
    assert!(!second.installed);
    assert_eq!(npm.installs(), vec!["lodash".to_string()]);
}

// 正常系: スコープ付きのサブパス参照はトップレベルだけをインストールし、サブパスへ再試行する
#[test]
fn scoped_subpath_installs_top_level_only() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding_with(&["sub.js"]);
    let mut interceptor = sandbox.interceptor(&npm);

    let module = interceptor
        .load("@foo/bar/sub", Some(&sandbox.issuer()))
        .unwrap();
    assert_eq!(module.kind, ModuleKind::Scoped);
    assert_eq!(
        module.location,
        ModuleLocation::File(sandbox.workspace_path().join("node_modules/@foo/bar/sub.js"))
    );
    assert_eq!(npm.installs(), vec!["@foo/bar".to_string()]);
}

// 異常系: ローカル参照の欠落はインストールせずそのまま失敗する
#[test]
fn missing_local_file_never_installs() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);

    let err = interceptor
        .load("./utils", Some(&sandbox.issuer()))
        .unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
    assert_eq!(err.to_string(), "Cannot find module './utils'");
    assert!(npm.installs().is_empty());
}

// 正常系: 発行元基準で解決されたローカルファイルは拡張子補完つきで見つかる
#[test]
fn local_file_resolves_relative_to_issuer() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);
    fs::write(sandbox.project_dir().join("utils.js"), "").unwrap();

    let module = interceptor
        .load("./utils", Some(&sandbox.issuer()))
        .unwrap();
    assert_eq!(module.kind, ModuleKind::Local);
    assert_eq!(module.file().unwrap(), sandbox.project_dir().join("utils.js"));
}

// 正常系: 組み込みモジュールはワークスペースに関係なく解決される
#[test]
fn builtins_never_install() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);

    for reference in ["fs", "node:path", "fs/promises"] {
        let module = interceptor.load(reference, None).unwrap();
        assert_eq!(module.kind, ModuleKind::BuiltIn, "{reference}");
    }
    assert!(npm.installs().is_empty());
}

// 異常系: 実在しない組み込みサブパスはネイティブ試行で失敗し、インストールへ回らない
#[test]
fn unknown_builtin_fails_without_install() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);

    for reference in ["fs/bogus", "node:bogus", "path/nope/deeper"] {
        let err = interceptor.load(reference, None).unwrap_err();
        assert!(err.is_not_found(), "{reference}: {err:?}");
        assert_eq!(err.to_string(), format!("Cannot find module '{reference}'"));
    }
    assert!(matches!(
        interceptor.load("node:", None),
        Err(LoadError::InvalidReference { .. })
    ));
    assert!(npm.installs().is_empty());
}

// 異常系: インストール失敗は終端で、再試行されない
#[test]
fn installation_failure_is_terminal() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::failing("npm ERR! 404 Not Found");
    let mut interceptor = sandbox.interceptor(&npm);

    let err = interceptor.load("left-pad", None).unwrap_err();
    match err {
        LoadError::InstallationFailed { package, message } => {
            assert_eq!(package, "left-pad");
            assert!(message.contains("404"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(npm.installs().len(), 1);
}

// 異常系: インストール後もサブパスが無ければ失敗し、インストールは 1 回だけ
#[test]
fn missing_subpath_after_install_fails_without_second_install() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);

    let err = interceptor.load("@foo/bar/missing", None).unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
    assert_eq!(npm.installs(), vec!["@foo/bar".to_string()]);
}

// 正常系: 利用者のプロジェクトに既にあるパッケージはインストールしない
#[test]
fn package_in_project_node_modules_is_used_as_is() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let pkg = sandbox.project_dir().join("node_modules/chalk");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("index.js"), "").unwrap();
    let mut interceptor = sandbox.interceptor(&npm);

    let module = interceptor.load("chalk", None).unwrap();
    assert!(!module.installed);
    assert_eq!(module.file().unwrap(), pkg.join("index.js"));
    assert!(npm.installs().is_empty());
}

// 境界: ワークスペースの探索パスは先頭に 1 度だけ登録される
#[test]
fn workspace_search_path_is_registered_once_at_front() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);
    let before = interceptor.search_paths().len();

    assert!(!interceptor.register_workspace());
    interceptor.load("fs", None).unwrap();
    assert_eq!(interceptor.search_paths().len(), before);
    assert_eq!(
        interceptor.search_paths().iter().next().unwrap(),
        sandbox.workspace_path().join("node_modules")
    );
}

// 異常系: 不正な参照は分類段階で拒否される
#[test]
fn invalid_reference_is_rejected_before_resolution() {
    let sandbox = Sandbox::new();
    let npm = FakeNpm::succeeding();
    let mut interceptor = sandbox.interceptor(&npm);

    for reference in ["", "@scope", "a\0b"] {
        let err = interceptor.load(reference, None).unwrap_err();
        assert!(
            matches!(err, LoadError::InvalidReference { .. }),
            "{reference:?}: {err:?}"
        );
    }
    assert!(npm.installs().is_empty());
}
