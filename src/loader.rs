//! Directory loading: register every template file under a root directory
//!
//! Files become registry entries named after their relative path: the
//! extension is stripped, path separators become `.`, and a single leading
//! `.` is dropped, so `components/timestamp.html` registers as
//! `components.timestamp` and `home.html` as `home`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::{Registry, RenderFn};
use crate::error::CompileError;
use crate::template::Template;

/// Extension loaded when none is configured
pub const DEFAULT_EXTENSION: &str = ".html";

/// Errors raised while loading a template directory
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem failure on an existing path
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template file failed to compile
    #[error("failed to compile {path}: {source}")]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
}

/// Walk `root` and register every matching file as a compiled template
///
/// A missing `root` completes as a no-op; this is distinct from an existing
/// but unreadable path, which is an [`LoadError::Io`]. Matching files are
/// compiled with the single `data` parameter and registered under their
/// derived key, overwriting existing entries. Directory entries are visited
/// in name order, so repeated loads register deterministically.
///
/// The first read or compile failure aborts the remaining walk; entries
/// registered before the failure are kept (no rollback).
pub fn load_dir(
    registry: &mut Registry<RenderFn>,
    root: impl AsRef<Path>,
    recursive: bool,
    extension: &str,
) -> Result<(), LoadError> {
    let root = root.as_ref();
    if !root.exists() {
        log::debug!("template root {} does not exist, skipping", root.display());
        return Ok(());
    }

    let mut files = Vec::new();
    collect_files(root, PathBuf::new(), recursive, &mut files)?;

    for relative in files {
        let rel_str = relative
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        if !rel_str.ends_with(extension) {
            continue;
        }
        let Some(key) = derive_key(&rel_str, extension) else {
            log::debug!("skipping {}: empty registry key", rel_str);
            continue;
        };

        let path = root.join(&relative);
        let source = fs::read_to_string(&path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        })?;
        let template = Template::compile(&source).map_err(|e| LoadError::Compile {
            path: path.clone(),
            source: e,
        })?;

        log::debug!("registered template `{}` from {}", key, path.display());
        registry.register(key, template.into());
    }
    Ok(())
}

/// Collect relative file paths under `dir`, each directory's entries sorted
/// by name
fn collect_files(
    dir: &Path,
    prefix: PathBuf,
    recursive: bool,
    out: &mut Vec<PathBuf>,
) -> Result<(), LoadError> {
    let read_dir = fs::read_dir(dir).map_err(|e| LoadError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut entries: Vec<_> = read_dir
        .collect::<Result<_, _>>()
        .map_err(|e| LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let file_type = entry.file_type().map_err(|e| LoadError::Io {
            path: entry.path(),
            source: e,
        })?;
        let relative = prefix.join(entry.file_name());
        if file_type.is_dir() {
            if recursive {
                collect_files(&entry.path(), relative, recursive, out)?;
            }
        } else {
            out.push(relative);
        }
    }
    Ok(())
}

/// Derive a registry key from an extension-matched relative path
///
/// Returns `None` when nothing remains after stripping, e.g. a file named
/// exactly like the extension.
fn derive_key(relative: &str, extension: &str) -> Option<String> {
    let stripped = relative.strip_suffix(extension).unwrap_or(relative);
    let dotted = stripped.replace(['/', '\\'], ".");
    let key = dotted.strip_prefix('.').unwrap_or(&dotted);
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
