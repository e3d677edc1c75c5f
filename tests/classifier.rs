// パス: tests/classifier.rs
// 役割: 参照文字列の分類規則を公開 API 越しに検証
// 意図: インストール対象の判定と、ファイルシステム非依存であることを固定する
// 関連ファイル: src/classifier.rs
use std::path::Path;

use baapan::classifier::{classify, is_builtin, ModuleKind};
use baapan::errors::LoadError;

fn kind_of(reference: &str) -> ModuleKind {
    classify(reference, Some(Path::new("/proj/app.js")))
        .unwrap()
        .kind()
}

#[test]
fn kinds_follow_leading_characters() {
    assert_eq!(kind_of("./a"), ModuleKind::Local);
    assert_eq!(kind_of("../a"), ModuleKind::Local);
    assert_eq!(kind_of("/abs/a"), ModuleKind::Local);
    assert_eq!(kind_of("@foo/bar"), ModuleKind::Scoped);
    assert_eq!(kind_of("node:fs"), ModuleKind::BuiltIn);
    assert_eq!(kind_of("fs"), ModuleKind::BuiltIn);
    assert_eq!(kind_of("child_process"), ModuleKind::BuiltIn);
    assert_eq!(kind_of("lodash/fp"), ModuleKind::Ordinary);
}

// 不変条件: インストール可能なのはスコープ付きと通常パッケージだけ
#[test]
fn only_packages_are_installable() {
    for reference in ["./a", "/a", "fs", "node:path", "@foo/bar", "lodash"] {
        let c = classify(reference, Some(Path::new("/proj/app.js"))).unwrap();
        let expected = matches!(c.kind(), ModuleKind::Scoped | ModuleKind::Ordinary);
        assert_eq!(c.is_installable(), expected, "{reference}");
    }
}

#[test]
fn resolved_identifier_is_the_top_level_package() {
    let c = classify("@foo/bar/sub/deep", None).unwrap();
    assert_eq!(c.reference(), "@foo/bar/sub/deep");
    assert_eq!(c.resolved(), "@foo/bar");

    let c = classify("lodash/fp/map", None).unwrap();
    assert_eq!(c.resolved(), "lodash");
}

#[test]
fn relative_reference_uses_issuer_directory() {
    let c = classify("../lib/x", Some(Path::new("/proj/src/index.js"))).unwrap();
    assert_eq!(c.local_path(), Some(Path::new("/proj/lib/x")));
    assert!(!c.is_installable());
}

#[test]
fn relative_reference_without_issuer_is_unresolvable() {
    assert!(matches!(
        classify("./a", None),
        Err(LoadError::UnresolvableCaller { .. })
    ));
}

// 分類は存在確認をしない
#[test]
fn classification_is_stable_for_missing_targets() {
    let issuer = Path::new("/definitely/not/here/app.js");
    let a = classify("./nothing", Some(issuer)).unwrap();
    let b = classify("./nothing", Some(issuer)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn builtin_table_covers_common_modules() {
    for name in ["fs", "path", "http", "crypto", "os", "util"] {
        assert!(is_builtin(name), "{name}");
    }
    assert!(!is_builtin("lodash"));
}
