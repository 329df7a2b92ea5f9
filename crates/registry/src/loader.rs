//! Loads apps from spec files and directories.
//!
//! A file is decoded with the format its extension names. A directory is one
//! logical app: every spec file directly inside it is decoded on its own and
//! the fragments are merged. Either way the result is validated before it is
//! returned.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clic_engine::{ProviderRegistry, assemble_app, decode_app, decode_app_with_format};
use clic_types::{App, SpecError, SpecPolicy};
use clic_util::SpecFormat;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("no spec files (.json, .yaml, .yml) found in {}", .0.display())]
    EmptyDirectory(PathBuf),
    #[error("{}: {source}", .path.display())]
    Spec { path: PathBuf, source: SpecError },
    #[error(transparent)]
    Invalid(#[from] SpecError),
}

impl LoadError {
    /// The spec error behind this failure, if any.
    pub fn spec_error(&self) -> Option<&SpecError> {
        match self {
            Self::Spec { source, .. } | Self::Invalid(source) => Some(source),
            Self::Io { .. } | Self::EmptyDirectory(_) => None,
        }
    }
}

/// Loads, merges and validates the app at `path` (a spec file or a directory
/// of spec files).
pub fn load_app(path: impl AsRef<Path>, registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<App, LoadError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let fragments = if metadata.is_dir() {
        spec_files_in(path)?
            .iter()
            .map(|file| load_fragment(file, registry, policy))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        vec![load_fragment(path, registry, policy)?]
    };

    debug!(path = %path.display(), fragments = fragments.len(), "loaded spec fragments");
    Ok(assemble_app(fragments, policy)?)
}

/// Decodes, resolves and validates an app from raw bytes, sniffing the format.
pub fn load_app_from_bytes(bytes: &[u8], registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<App, SpecError> {
    let app = decode_app(bytes, registry, policy)?;
    assemble_app(vec![app], policy)
}

/// Spec files directly inside `dir`, sorted by file name.
pub fn spec_files_in(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry_path = entry.map_err(io_error)?.path();
        if !entry_path.is_file() {
            continue;
        }
        if SpecFormat::from_path(&entry_path).is_ok() {
            files.push(entry_path);
        } else {
            debug!(path = %entry_path.display(), "skipping non-spec file");
        }
    }
    if files.is_empty() {
        return Err(LoadError::EmptyDirectory(dir.to_path_buf()));
    }
    files.sort_by(|left, right| left.file_name().cmp(&right.file_name()));
    Ok(files)
}

fn load_fragment(path: &Path, registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<App, LoadError> {
    let with_path = |source: SpecError| LoadError::Spec {
        path: path.to_path_buf(),
        source,
    };
    let format = SpecFormat::from_path(path).map_err(|error| with_path(error.into()))?;
    let content = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), format = %format, "decoding spec file");
    decode_app_with_format(&content, format, registry, policy).map_err(with_path)
}

#[cfg(test)]
mod tests {
    use clic_types::{ErrorKind, MergeConflict};

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn load(path: &Path) -> Result<App, LoadError> {
        load_app(path, &ProviderRegistry::with_defaults(), &SpecPolicy::default())
    }

    #[test]
    fn loads_single_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "app.yml", "name: app\ndescription: d\ncommands:\n  - name: x\n    description: d\n    noop: {}\n");
        let app = load(&path).unwrap();
        assert_eq!(app.leaf_paths(), vec![vec!["x".to_string()]]);
    }

    #[test]
    fn extension_wins_over_content() {
        let dir = tempfile::tempdir().unwrap();
        // Valid JSON is also valid YAML, so a .yaml file holding JSON loads.
        let path = write(dir.path(), "app.yaml", r#"{"name":"app","description":"d"}"#);
        assert!(load(&path).is_ok());

        let path = write(dir.path(), "app.json", "name: app\ndescription: d\n");
        let error = load(&path).unwrap_err();
        assert!(error.spec_error().is_some_and(SpecError::is_decode_error));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "app.toml", "name = 'app'");
        let error = load(&path).unwrap_err();
        assert_eq!(error.spec_error().map(SpecError::kind), Some(ErrorKind::UnsupportedExtension));
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load(&dir.path().join("absent.json")), Err(LoadError::Io { .. })));
    }

    #[test]
    fn merges_directory_fragments_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", r#"{"name":"app","description":"d","commands":[{"name":"second","description":"d","noop":{}}]}"#);
        write(dir.path(), "a.yaml", "name: app\ndescription: d\ncommands:\n  - name: first\n    description: d\n    noop: {}\n");
        write(dir.path(), "README.md", "not a spec");
        fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "c.json", r#"{"name":"other"}"#);

        let app = load(dir.path()).unwrap();
        let names: Vec<_> = app.commands.iter().map(|command| command.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn directory_fragments_must_agree_on_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"name":"app","description":"d"}"#);
        write(dir.path(), "b.json", r#"{"name":"tool","description":"d"}"#);
        let error = load(dir.path()).unwrap_err();
        assert!(matches!(
            error.spec_error(),
            Some(SpecError::MergeConflict(MergeConflict::NameMismatch { .. }))
        ));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "nothing here");
        assert!(matches!(load(dir.path()), Err(LoadError::EmptyDirectory(_))));
    }

    #[test]
    fn fragment_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"name":"app","description":"d","commands":[{"name":"x","description":"d","bogus":{}}]}"#);
        let message = load(dir.path()).unwrap_err().to_string();
        assert!(message.contains("a.json") && message.contains("bogus"), "{message}");
    }

    #[test]
    fn bytes_are_sniffed_and_validated() {
        let registry = ProviderRegistry::with_defaults();
        let policy = SpecPolicy::default();
        assert!(load_app_from_bytes(b"name: app\ndescription: d\n", &registry, &policy).is_ok());
        assert_eq!(load_app_from_bytes(b"", &registry, &policy).unwrap_err(), SpecError::EmptyInput);
        assert_eq!(
            load_app_from_bytes(b"name: app\n", &registry, &policy).unwrap_err().kind(),
            ErrorKind::InvalidAppSpec
        );
    }
}
