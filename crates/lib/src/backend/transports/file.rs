//! Local JSON file transport

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    Result,
    backend::{DocumentTransport, PersistenceError},
};

/// Keeps the document in a file on local disk.
///
/// A missing file reads as no document. Writes go to a sibling temporary
/// file first and are renamed into place, so a crash mid-write leaves the
/// previous document intact.
#[derive(Debug, Clone)]
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn file_io(source: std::io::Error) -> crate::Error {
    PersistenceError::FileIo { source }.into()
}

#[async_trait]
impl DocumentTransport for FileTransport {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(file_io(e)),
        }
    }

    async fn store(&self, contents: String) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(file_io)?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, contents).await.map_err(file_io)?;
        tokio::fs::rename(&temp, &self.path).await.map_err(file_io)
    }
}
