//! File discovery adapter for the binary: walks the project honoring
//! ignore files and maps extensions onto language tags. Library callers
//! are free to feed the pipeline their own iterator instead.

use crate::error::{EngineError, Result};
use crate::model::{Language, SourceFile};
use crate::util::normalize_path;
use ignore::WalkBuilder;
use std::path::Path;

/// Extension → language tag, matching the analyzer routing: plain
/// JavaScript is served by the TypeScript analyzer and grammar.
pub fn language_for_extension(ext: &str) -> Option<Language> {
    match ext {
        "go" => Some(Language::Go),
        "py" | "pyw" => Some(Language::Python),
        "ts" | "mts" | "cts" => Some(Language::Typescript),
        "tsx" | "jsx" => Some(Language::TypescriptReact),
        "js" | "mjs" | "cjs" => Some(Language::Typescript),
        "java" => Some(Language::Java),
        "cs" => Some(Language::CSharp),
        "swift" => Some(Language::Swift),
        "rs" => Some(Language::Rust),
        "ml" | "mli" => Some(Language::Ocaml),
        _ => None,
    }
}

/// Build a `SourceFile` from a tag the collaborator supplied. Unknown tags
/// are rejected before any row is written.
pub fn source_file_with_tag(
    abs_path: &Path,
    rel_path: &str,
    tag: &str,
) -> Result<SourceFile> {
    let language = Language::from_tag(tag)
        .ok_or_else(|| EngineError::Unsupported(format!("unknown language tag: {tag}")))?;
    Ok(SourceFile {
        abs_path: abs_path.to_path_buf(),
        rel_path: rel_path.to_string(),
        language,
    })
}

/// Walk `root`, honoring .gitignore and hidden-file conventions, returning
/// every file with a supported extension.
pub fn scan_project(root: &Path, no_ignore: bool) -> Result<Vec<SourceFile>> {
    let root = std::fs::canonicalize(root)
        .map_err(|err| EngineError::Extraction(format!("resolve {}: {err}", root.display())))?;
    let mut files = Vec::new();

    let mut builder = WalkBuilder::new(&root);
    builder.hidden(true).follow_links(false);
    if no_ignore {
        builder.git_ignore(false).git_global(false).git_exclude(false);
    }

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("walk: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let Some(language) = language_for_extension(&ext.to_lowercase()) else {
            continue;
        };
        let Ok(rel) = path.strip_prefix(&root) else {
            continue;
        };
        files.push(SourceFile {
            abs_path: path.to_path_buf(),
            rel_path: normalize_path(rel),
            language,
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_map() {
        assert_eq!(language_for_extension("go"), Some(Language::Go));
        assert_eq!(language_for_extension("tsx"), Some(Language::TypescriptReact));
        assert_eq!(language_for_extension("js"), Some(Language::Typescript));
        assert_eq!(language_for_extension("ml"), Some(Language::Ocaml));
        assert_eq!(language_for_extension("txt"), None);
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = source_file_with_tag(Path::new("/tmp/a.zig"), "a.zig", "zig").unwrap_err();
        assert!(matches!(err, EngineError::Unsupported(_)));
    }
}
