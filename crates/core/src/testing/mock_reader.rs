//! Mock metadata reader for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::AudioError;
use crate::media::{ArtifactMetadata, ArtworkInfo, AudioFormat, TagSet};
use crate::probe::MetadataReader;

use super::fixtures;

/// Mock implementation of the MetadataReader trait.
///
/// Existing files read as a well-formed file of the format their extension
/// names, unless a path has scripted metadata or a scripted failure.
///
/// # Example
///
/// ```rust,ignore
/// use soundsmith_core::testing::MockMetadataReader;
///
/// let reader = MockMetadataReader::new();
/// reader.set_tags("/music/a.flac", TagSet::new().with("artist", "Foo")).await;
/// reader.set_failure("/music/b.flac", "Invalid data found").await;
/// ```
#[derive(Debug)]
pub struct MockMetadataReader {
    /// Pre-configured metadata by path.
    metadata: Arc<RwLock<HashMap<PathBuf, ArtifactMetadata>>>,
    /// Paths that fail to parse, with the reason.
    failures: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Recorded reads, in order.
    reads: Arc<RwLock<Vec<PathBuf>>>,
}

impl Default for MockMetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetadataReader {
    /// Create a new mock reader.
    pub fn new() -> Self {
        Self {
            metadata: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            reads: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the metadata returned for `path`.
    pub async fn set_metadata(&self, path: impl Into<PathBuf>, metadata: ArtifactMetadata) {
        let path = path.into();
        self.failures.write().await.remove(&path);
        self.metadata.write().await.insert(path, metadata);
    }

    /// Set the tags returned for `path`, keeping everything else.
    pub async fn set_tags(&self, path: impl Into<PathBuf>, tags: TagSet) {
        let path = path.into();
        let mut metadata = self.current(&path).await;
        metadata.tags = tags;
        self.set_metadata(path, metadata).await;
    }

    /// Set the artwork returned for `path`, keeping everything else.
    pub async fn set_artwork(&self, path: impl Into<PathBuf>, artwork: Option<ArtworkInfo>) {
        let path = path.into();
        let mut metadata = self.current(&path).await;
        metadata.artwork = artwork;
        self.set_metadata(path, metadata).await;
    }

    /// Make reads of `path` fail with `ProbeFailed`.
    pub async fn set_failure(&self, path: impl Into<PathBuf>, reason: &str) {
        self.failures
            .write()
            .await
            .insert(path.into(), reason.to_string());
    }

    /// Get all paths read so far.
    pub async fn recorded_reads(&self) -> Vec<PathBuf> {
        self.reads.read().await.clone()
    }

    async fn current(&self, path: &Path) -> ArtifactMetadata {
        if let Some(metadata) = self.metadata.read().await.get(path) {
            return metadata.clone();
        }
        default_for(path)
    }
}

/// Well-formed metadata for the format named by the extension; unknown
/// extensions read as FLAC.
fn default_for(path: &Path) -> ArtifactMetadata {
    fixtures::metadata_for(AudioFormat::from_path(path).unwrap_or(AudioFormat::Flac))
}

#[async_trait]
impl MetadataReader for MockMetadataReader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read(&self, path: &Path) -> Result<ArtifactMetadata, AudioError> {
        self.reads.write().await.push(path.to_path_buf());

        if let Some(reason) = self.failures.read().await.get(path) {
            return Err(AudioError::probe_failed(path, reason.clone()));
        }
        if tokio::fs::metadata(path).await.is_err() {
            return Err(AudioError::probe_failed(path, "No such file or directory"));
        }
        Ok(self.current(path).await)
    }
}
