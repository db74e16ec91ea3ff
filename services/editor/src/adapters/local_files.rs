//! services/editor/src/adapters/local_files.rs
//!
//! The filesystem-backed `FileHost`: "save as" writes into a fixed directory and
//! "open" reads any path the user picked.

use async_trait::async_trait;
use bytes::Bytes;
use retro_editor_core::ports::{FileHandle, FileHost, OpenedFile, PortError, PortResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Debug)]
pub struct LocalFileAdapter {
    save_dir: PathBuf,
}

impl LocalFileAdapter {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    /// Only bare file names are accepted so a save can never leave `save_dir`.
    fn target(&self, file_name: &str) -> PortResult<PathBuf> {
        let name = file_name.trim();
        let is_bare = !name.is_empty()
            && name != "."
            && name != ".."
            && Path::new(name).file_name().map(|n| n == name).unwrap_or(false)
            && !name.contains(['/', '\\']);
        if !is_bare {
            return Err(PortError::Unexpected(format!(
                "'{}' is not a valid file name",
                file_name
            )));
        }
        Ok(self.save_dir.join(name))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> PortError {
    match e.kind() {
        ErrorKind::NotFound => PortError::NotFound(path.display().to_string()),
        _ => PortError::Unexpected(format!("{}: {}", path.display(), e)),
    }
}

#[async_trait]
impl FileHost for LocalFileAdapter {
    async fn save(&self, file_name: &str, bytes: Bytes) -> PortResult<()> {
        let path = self.target(file_name)?;
        tokio::fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|e| io_error(&self.save_dir, e))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| io_error(&path, e))?;
        info!(path = %path.display(), bytes = bytes.len(), "File written.");
        Ok(())
    }

    async fn open(&self, handle: &FileHandle) -> PortResult<OpenedFile> {
        let path = &handle.0;
        let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(OpenedFile {
            name,
            bytes: Bytes::from(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_writes_into_save_dir_and_open_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = LocalFileAdapter::new(dir.path().join("nested"));

        adapter
            .save("notes.txt", Bytes::from_static(b"abc\ndef"))
            .await
            .unwrap();
        let opened = adapter
            .open(&FileHandle(dir.path().join("nested").join("notes.txt")))
            .await
            .unwrap();

        assert_eq!(opened.name, "notes.txt");
        assert_eq!(&opened.bytes[..], b"abc\ndef");
    }

    #[tokio::test]
    async fn save_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = LocalFileAdapter::new(dir.path());

        for name in ["", "..", "../escape.txt", "sub/dir.txt", "a\\b.txt"] {
            let err = adapter.save(name, Bytes::new()).await.unwrap_err();
            assert!(matches!(err, PortError::Unexpected(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = LocalFileAdapter::new(dir.path());

        let err = adapter
            .open(&FileHandle(dir.path().join("nope.txt")))
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::NotFound(_)));
    }
}
