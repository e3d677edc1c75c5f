// パス: src/repl/printer.rs
// 役割: REPL のヘルプとロード結果の表示を担う
// 意図: 対話時の出力形式を一箇所にまとめる
// 関連ファイル: src/repl/cmd.rs, src/resolver.rs

use std::io::{self, Write};

use crate::interceptor::LoaderInfo;
use crate::resolver::{LoadedModule, ModuleLocation};

const HELP_TEXT: &str = concat!(
    "利用可能なコマンド:\n",
    "  :help              ヘルプ（本メッセージ）\n",
    "  :require REF       モジュールをロード（未インストールなら取得）\n",
    "  :load REF          旧来の baapan() ヘルパ（非推奨）\n",
    "  :workspace         ワークスペースの場所を表示\n",
    "  :paths             パッケージ探索パスを表示\n",
    "  :quit              終了\n",
    "\n",
    "文中の require('x') 呼び出しも順にロードされます。\n",
    "例:\n",
    "  > const _ = require('lodash')\n",
    "  > require('@foo/bar/sub')     -- @foo/bar だけをインストール\n",
    "  > require('./utils')          -- カレントディレクトリ基準\n",
);

/// ヘルプメッセージを任意のライターへ描画する。
pub(crate) fn render_help<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(HELP_TEXT.as_bytes())
}

/// ロード済みモジュールを 1 行で書き出す。
pub(crate) fn write_module<W: Write>(out: &mut W, module: &LoadedModule) -> io::Result<()> {
    let suffix = if module.installed { " (installed)" } else { "" };
    match &module.location {
        ModuleLocation::BuiltIn(name) => {
            writeln!(out, "[{}] {}", module.kind.label(), name)
        }
        ModuleLocation::File(path) => writeln!(
            out,
            "[{}] {} -> {}{}",
            module.kind.label(),
            module.reference,
            path.display(),
            suffix
        ),
    }
}

pub(crate) fn write_workspace<W: Write>(out: &mut W, info: &LoaderInfo) -> io::Result<()> {
    let lifetime = if info.persistent {
        "persistent"
    } else {
        "ephemeral"
    };
    writeln!(out, "{} ({})", info.workspace_root.display(), lifetime)
}

pub(crate) fn write_search_paths<W: Write>(out: &mut W, info: &LoaderInfo) -> io::Result<()> {
    for (idx, path) in info.search_paths.iter().enumerate() {
        writeln!(out, "  {}. {}", idx + 1, path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_help, write_module, write_search_paths};
    use crate::classifier::ModuleKind;
    use crate::interceptor::LoaderInfo;
    use crate::resolver::{LoadedModule, ModuleLocation};
    use std::path::PathBuf;

    fn render(module: &LoadedModule) -> String {
        let mut buf = Vec::new();
        write_module(&mut buf, module).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn render_help_outputs_expected_text() {
        let mut buf = Vec::new();
        render_help(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), super::HELP_TEXT);
    }

    #[test]
    fn modules_render_kind_and_location() {
        let builtin = LoadedModule {
            reference: "node:fs".into(),
            kind: ModuleKind::BuiltIn,
            location: ModuleLocation::BuiltIn("fs".into()),
            installed: false,
        };
        assert_eq!(render(&builtin), "[builtin] fs\n");

        let installed = LoadedModule {
            reference: "lodash".into(),
            kind: ModuleKind::Ordinary,
            location: ModuleLocation::File(PathBuf::from("/ws/node_modules/lodash/index.js")),
            installed: true,
        };
        assert_eq!(
            render(&installed),
            "[package] lodash -> /ws/node_modules/lodash/index.js (installed)\n"
        );
    }

    #[test]
    fn search_paths_are_numbered() {
        let info = LoaderInfo {
            workspace_root: PathBuf::from("/ws"),
            persistent: false,
            search_paths: vec![PathBuf::from("/ws/node_modules"), PathBuf::from("/node_modules")],
        };
        let mut buf = Vec::new();
        write_search_paths(&mut buf, &info).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "  1. /ws/node_modules\n  2. /node_modules\n"
        );
    }
}
