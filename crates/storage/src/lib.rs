//! BlogSmith artifact storage infrastructure adapter.
//!
//! Implements the [`pipeline::ArtifactStore`] trait on the local filesystem:
//! every artifact is a single file directly inside one output directory.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Directory creation, path resolution and file I/O live
//! here. The [`pipeline`] crate sees only [`pipeline::ArtifactStore`].

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use pipeline::{ArtifactError, ArtifactStore};
use tracing::debug;

/// Writes artifacts into a fixed output directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `name` to an absolute path inside the output directory.
    ///
    /// `name` must be a single plain file name; separators, `.` and `..` are
    /// rejected so artifacts cannot land outside the directory.
    fn resolve(&self, name: &str) -> Result<PathBuf, ArtifactError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(ArtifactError::InvalidName(name.to_owned())),
        }
        std::path::absolute(self.root.join(name)).map_err(|e| ArtifactError::Io {
            path: name.to_owned(),
            message: e.to_string(),
        })
    }

    async fn write(&self, name: &str, contents: &[u8]) -> Result<PathBuf, ArtifactError> {
        let path = self.resolve(name)?;
        let io_error = |e: std::io::Error| ArtifactError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(io_error)?;
        tokio::fs::write(&path, contents).await.map_err(io_error)?;

        debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
        Ok(path)
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn write_text(&self, name: &str, contents: &str) -> Result<PathBuf, ArtifactError> {
        self.write(name, contents.as_bytes()).await
    }

    async fn write_json(
        &self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<PathBuf, ArtifactError> {
        let encoded = serde_json::to_string_pretty(value).map_err(|e| ArtifactError::Encode {
            name: name.to_owned(),
            message: e.to_string(),
        })?;
        self.write(name, encoded.as_bytes()).await
    }
}
