use crate::rewrite::Rewriter;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Utf8 { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether changed files are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    /// Report what would change without touching the file
    Check,
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileOutcome should be checked for changes"]
pub enum FileOutcome {
    Unchanged { file: PathBuf },
    Rewritten {
        file: PathBuf,
        original: String,
        updated: String,
    },
    /// Check mode found unsorted classes
    WouldRewrite {
        file: PathBuf,
        original: String,
        updated: String,
    },
}

impl FileOutcome {
    pub fn file(&self) -> &Path {
        match self {
            FileOutcome::Unchanged { file }
            | FileOutcome::Rewritten { file, .. }
            | FileOutcome::WouldRewrite { file, .. } => file,
        }
    }

    pub fn is_changed(&self) -> bool {
        !matches!(self, FileOutcome::Unchanged { .. })
    }

    /// Original and updated contents when the file changed (or would).
    pub fn contents(&self) -> Option<(&str, &str)> {
        match self {
            FileOutcome::Unchanged { .. } => None,
            FileOutcome::Rewritten {
                original, updated, ..
            }
            | FileOutcome::WouldRewrite {
                original, updated, ..
            } => Some((original.as_str(), updated.as_str())),
        }
    }
}

/// Sort the classes in one file, writing it back only if its bytes change.
pub fn process_file(
    path: &Path,
    rewriter: &Rewriter,
    mode: WriteMode,
) -> Result<FileOutcome, FileError> {
    let bytes = fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let original = String::from_utf8(bytes).map_err(|_| FileError::Utf8 {
        path: path.to_path_buf(),
    })?;

    let updated = rewriter.rewrite(&original);
    if updated == original {
        return Ok(FileOutcome::Unchanged {
            file: path.to_path_buf(),
        });
    }

    if mode == WriteMode::Check {
        return Ok(FileOutcome::WouldRewrite {
            file: path.to_path_buf(),
            original,
            updated,
        });
    }

    atomic_write(path, updated.as_bytes()).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("rewrote {}", path.display());

    Ok(FileOutcome::Rewritten {
        file: path.to_path_buf(),
        original,
        updated,
    })
}

/// Atomic file write: tempfile + fsync + rename, keeping the original permissions.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Same directory keeps the rename on one filesystem.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let permissions = fs::metadata(path)?.permissions();
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;

    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::LangConfig;
    use crate::order::OrderSource;
    use crate::sorter::SortOptions;

    fn html_rewriter() -> Rewriter {
        Rewriter::new(
            Some(&LangConfig::pattern(r#"class="([^"]+)""#)),
            OrderSource::canonical(["flex", "m-2", "p-4"]),
            SortOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rewrites_unsorted_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.html");
        fs::write(&file_path, r#"<div class="p-4 flex m-2">content</div>"#).unwrap();

        let outcome = process_file(&file_path, &html_rewriter(), WriteMode::Write).unwrap();

        assert!(matches!(outcome, FileOutcome::Rewritten { .. }));
        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, r#"<div class="flex m-2 p-4">content</div>"#);
    }

    #[test]
    fn test_unchanged_file_is_not_written() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.html");
        fs::write(&file_path, "<div>no classes here</div>").unwrap();
        let before = fs::metadata(&file_path).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        let outcome = process_file(&file_path, &html_rewriter(), WriteMode::Write).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::Unchanged {
                file: file_path.clone()
            }
        );
        let after = fs::metadata(&file_path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_check_mode_leaves_file_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.html");
        let input = r#"<div class="p-4 flex">content</div>"#;
        fs::write(&file_path, input).unwrap();

        let outcome = process_file(&file_path, &html_rewriter(), WriteMode::Check).unwrap();

        assert!(outcome.is_changed());
        assert_eq!(
            outcome.contents().unwrap().1,
            r#"<div class="flex p-4">content</div>"#
        );
        assert_eq!(fs::read_to_string(&file_path).unwrap(), input);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = process_file(
            &temp_dir.path().join("nope.html"),
            &html_rewriter(),
            WriteMode::Write,
        );
        assert!(matches!(result, Err(FileError::Read { .. })));
    }

    #[test]
    fn test_binary_file_is_a_utf8_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("blob.html");
        fs::write(&file_path, [0xff, 0xfe, 0x00]).unwrap();

        let result = process_file(&file_path, &html_rewriter(), WriteMode::Write);
        assert!(matches!(result, Err(FileError::Utf8 { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.html");
        fs::write(&file_path, r#"<i class="p-4 flex">"#).unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o644)).unwrap();

        let outcome = process_file(&file_path, &html_rewriter(), WriteMode::Write).unwrap();

        assert!(outcome.is_changed());
        let mode = fs::metadata(&file_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
