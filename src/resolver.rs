// パス: src/resolver.rs
// 役割: 加工前の「ネイティブ」ロード処理（CommonJS 風のファイル解決）を提供する
// 意図: インターセプタが差し替え可能な単一メソッドの境界越しにロードを試みられるようにする
// 関連ファイル: src/interceptor.rs, src/search_path.rs, tests/interceptor.rs
//! ネイティブリゾルバ。
//!
//! [`ModuleResolver::resolve`] が唯一の入口で、インターセプタは同じ入口を
//! 初回試行と再試行の両方に使う。[`FsResolver`] は次の順で解決する。
//!
//! - ファイルそのもの
//! - 拡張子補完（`.js` `.json` `.node` `.cjs` `.mjs`）
//! - ディレクトリの `package.json` の `main`
//! - ディレクトリの `index.*`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::classifier::{is_builtin_specifier, ModuleKind, BUILTIN_SCHEME};
use crate::errors::{LoadError, LoadResult};
use crate::search_path::SearchPaths;

const EXTENSIONS: &[&str] = &["js", "json", "node", "cjs", "mjs"];
const INDEX_STEM: &str = "index";
const MANIFEST: &str = "package.json";

/// ネイティブロードの対象。
#[derive(Debug, Clone, Copy)]
pub enum LoadTarget<'a> {
    /// 組み込みモジュール名。
    BuiltIn(&'a str),
    /// 絶対パス（`Local` 参照、または再試行時のインストール先）。
    File(&'a Path),
    /// 探索パスを順に辿るパッケージ参照（サブパスを含みうる）。
    Package {
        specifier: &'a str,
        search_paths: &'a SearchPaths,
    },
}

/// モジュールの実体の所在。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleLocation {
    BuiltIn(String),
    File(PathBuf),
}

/// ロードに成功したモジュール。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub reference: String,
    pub kind: ModuleKind,
    pub location: ModuleLocation,
    /// インストール後の再試行で解決されたかどうか。
    pub installed: bool,
}

impl LoadedModule {
    pub fn file(&self) -> Option<&Path> {
        match &self.location {
            ModuleLocation::File(path) => Some(path),
            ModuleLocation::BuiltIn(_) => None,
        }
    }
}

/// 共有のロード入口。
pub trait ModuleResolver {
    fn resolve(&self, target: LoadTarget<'_>) -> LoadResult<ModuleLocation>;
}

/// ファイルシステム上で解決する標準リゾルバ。
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResolver;

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    main: Option<String>,
}

impl ModuleResolver for FsResolver {
    fn resolve(&self, target: LoadTarget<'_>) -> LoadResult<ModuleLocation> {
        match target {
            LoadTarget::BuiltIn(name) => {
                if !is_builtin_specifier(name) {
                    return Err(LoadError::not_found(name, Vec::new()));
                }
                let bare = name.strip_prefix(BUILTIN_SCHEME).unwrap_or(name);
                Ok(ModuleLocation::BuiltIn(bare.to_string()))
            }
            LoadTarget::File(path) => match resolve_path(path)? {
                Some(found) => Ok(ModuleLocation::File(found)),
                None => Err(LoadError::not_found(
                    path.to_string_lossy(),
                    vec![path.to_path_buf()],
                )),
            },
            LoadTarget::Package {
                specifier,
                search_paths,
            } => {
                let mut searched = Vec::with_capacity(search_paths.len());
                for dir in search_paths.iter() {
                    let candidate = dir.join(specifier);
                    if let Some(found) = resolve_path(&candidate)? {
                        return Ok(ModuleLocation::File(found));
                    }
                    searched.push(dir.to_path_buf());
                }
                Err(LoadError::not_found(specifier, searched))
            }
        }
    }
}

fn resolve_path(path: &Path) -> LoadResult<Option<PathBuf>> {
    if let Some(found) = resolve_as_file(path) {
        return Ok(Some(found));
    }
    if path.is_dir() {
        return resolve_as_directory(path);
    }
    Ok(None)
}

fn resolve_as_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let name = path.file_name()?.to_string_lossy().into_owned();
    EXTENSIONS
        .iter()
        .map(|ext| path.with_file_name(format!("{}.{}", name, ext)))
        .find(|candidate| candidate.is_file())
}

fn resolve_as_directory(dir: &Path) -> LoadResult<Option<PathBuf>> {
    let manifest_path = dir.join(MANIFEST);
    match fs::read_to_string(&manifest_path) {
        Ok(text) => {
            let manifest: PackageManifest =
                serde_json::from_str(&text).map_err(|source| LoadError::InvalidManifest {
                    path: manifest_path.clone(),
                    source,
                })?;
            if let Some(main) = manifest.main.filter(|m| !m.trim().is_empty()) {
                let entry = dir.join(main);
                if let Some(found) = resolve_as_file(&entry) {
                    return Ok(Some(found));
                }
                if let Some(found) = resolve_index(&entry) {
                    return Ok(Some(found));
                }
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(LoadError::Io(err)),
    }
    Ok(resolve_index(dir))
}

fn resolve_index(dir: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", INDEX_STEM, ext)))
        .find(|candidate| candidate.is_file())
}
