//! Upload storage and the shared result slot
//!
//! Inputs are staged into the storage directory while they are parsed and
//! removed afterwards. The result workbook always lives at the same path
//! inside that directory; each run overwrites it.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::PipelineError;

/// An input copied into storage for the duration of one run
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// File name as submitted
    pub original_name: String,
    /// Where the copy lives inside storage
    pub path: PathBuf,
}

/// Result of a download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Delivered { path: PathBuf, bytes: u64 },
    /// No run has produced a result yet
    NotFound { expected: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    output_file: String,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>, output_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            output_file: output_file.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fixed location of the result workbook
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_file)
    }

    /// Create the storage directory if needed
    pub fn ensure_root(&self) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.root).map_err(|e| PipelineError::io(&self.root, e))
    }

    /// First free path for `name`, appending `_1`, `_2`, ... before the extension
    pub fn available_path(&self, name: &str) -> PathBuf {
        let candidate = self.root.join(name);
        if !candidate.exists() {
            return candidate;
        }

        let as_path = Path::new(name);
        let stem = as_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let ext = as_path.extension().map(|e| e.to_string_lossy().into_owned());

        (1..)
            .map(|n| match &ext {
                Some(ext) => self.root.join(format!("{}_{}.{}", stem, n, ext)),
                None => self.root.join(format!("{}_{}", stem, n)),
            })
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }

    /// Copy `source` into storage
    pub fn stage(&self, source: &Path) -> Result<StagedFile, PipelineError> {
        self.ensure_root()?;

        let original_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PipelineError::io(source, "not a file path"))?;
        let path = self.available_path(&original_name);

        fs::copy(source, &path).map_err(|e| PipelineError::io(source, e))?;
        log::debug!("Staged {} as {}", source.display(), path.display());

        Ok(StagedFile {
            original_name,
            path,
        })
    }

    /// Remove a staged input
    pub fn discard(&self, staged: &StagedFile) -> Result<(), PipelineError> {
        fs::remove_file(&staged.path).map_err(|e| PipelineError::io(&staged.path, e))?;
        log::debug!("Removed staged file {}", staged.path.display());
        Ok(())
    }

    /// Copy the result workbook to `dest`
    ///
    /// `dest` may be a directory, in which case the result keeps its file
    /// name. A missing result is reported as [`DownloadOutcome::NotFound`].
    pub fn download(&self, dest: &Path) -> Result<DownloadOutcome, PipelineError> {
        let source = self.output_path();
        if !source.is_file() {
            return Ok(DownloadOutcome::NotFound { expected: source });
        }

        let target = if dest.is_dir() {
            dest.join(&self.output_file)
        } else {
            dest.to_path_buf()
        };

        // Copying a file onto itself would truncate it
        let same_file = match (source.canonicalize(), target.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        let bytes = if same_file {
            fs::metadata(&source)
                .map_err(|e| PipelineError::io(&source, e))?
                .len()
        } else {
            fs::copy(&source, &target).map_err(|e| PipelineError::io(&target, e))?
        };

        log::info!("Result delivered to {} ({} bytes)", target.display(), bytes);
        Ok(DownloadOutcome::Delivered {
            path: target,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_before_any_run_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("media"), "horas_por_cpf.xlsx");

        let outcome = storage.download(dir.path()).unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::NotFound {
                expected: dir.path().join("media").join("horas_por_cpf.xlsx"),
            }
        );
    }

    #[test]
    fn test_download_into_directory_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("media"), "horas_por_cpf.xlsx");
        fs::create_dir_all(storage.root()).unwrap();
        fs::write(storage.output_path(), b"result").unwrap();
        let dest = dir.path().join("downloads");
        fs::create_dir_all(&dest).unwrap();

        let outcome = storage.download(&dest).unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Delivered {
                path: dest.join("horas_por_cpf.xlsx"),
                bytes: 6,
            }
        );
        assert_eq!(fs::read(dest.join("horas_por_cpf.xlsx")).unwrap(), b"result");
    }

    #[test]
    fn test_download_onto_itself_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path(), "horas_por_cpf.xlsx");
        fs::write(storage.output_path(), b"result").unwrap();

        storage.download(&storage.output_path()).unwrap();
        assert_eq!(fs::read(storage.output_path()).unwrap(), b"result");
    }

    #[test]
    fn test_stage_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("turma.xlsx");
        fs::write(&source, b"data").unwrap();
        let storage = Storage::new(dir.path().join("media"), "horas_por_cpf.xlsx");

        let staged = storage.stage(&source).unwrap();
        assert_eq!(staged.original_name, "turma.xlsx");
        assert_eq!(staged.path, dir.path().join("media").join("turma.xlsx"));
        assert!(staged.path.exists());

        storage.discard(&staged).unwrap();
        assert!(!staged.path.exists());
        assert!(source.exists());
    }

    #[test]
    fn test_stage_avoids_name_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("turma.xlsx");
        fs::write(&source, b"data").unwrap();
        let storage = Storage::new(dir.path().join("media"), "horas_por_cpf.xlsx");

        let first = storage.stage(&source).unwrap();
        let second = storage.stage(&source).unwrap();
        let third = storage.stage(&source).unwrap();
        assert_eq!(second.path, dir.path().join("media").join("turma_1.xlsx"));
        assert_eq!(third.path, dir.path().join("media").join("turma_2.xlsx"));
        assert_ne!(first.path, second.path);
    }

    #[test]
    fn test_stage_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path(), "horas_por_cpf.xlsx");
        let err = storage.stage(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
