//! Post-execution verification.
//!
//! A tool exiting with status 0 proves nothing about the file it wrote. The
//! [`Verifier`] re-reads the artifact with a [`MetadataReader`] and only then
//! hands out a [`MediaArtifact`].

mod tags;

pub use tags::{compare_joined_tags, compare_tags};

use tags::adopt_requested_splits;

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AudioError;
use crate::media::{ArtifactMetadata, AudioFormat, MediaArtifact, TagSet};
use crate::metrics;
use crate::probe::MetadataReader;

/// Turns paths into verified [`MediaArtifact`]s.
#[derive(Clone)]
pub struct Verifier {
    reader: Arc<dyn MetadataReader>,
}

impl Verifier {
    pub fn new(reader: Arc<dyn MetadataReader>) -> Self {
        Self { reader }
    }

    /// Checks that `path` exists, parses, and is really `expected`.
    pub async fn verify(&self, path: &Path, expected: AudioFormat) -> Result<MediaArtifact, AudioError> {
        let outcome = self.inspect(path, expected).await;
        let label = match &outcome {
            Ok(_) => "accepted",
            Err(Rejection::Missing) => "missing",
            Err(Rejection::Unreadable(_)) => "unreadable",
            Err(Rejection::WrongFormat(_)) => "wrong_format",
            Err(Rejection::Other(_)) => "error",
        };
        metrics::VERIFICATIONS.with_label_values(&[label]).inc();

        match outcome {
            Ok(metadata) => {
                debug!(path = %path.display(), format = %expected, "Artifact verified");
                Ok(MediaArtifact::new(path.to_path_buf(), expected, metadata))
            }
            Err(rejection) => {
                let err = rejection.into_error(path);
                warn!(path = %path.display(), error = %err, "Artifact rejected");
                Err(err)
            }
        }
    }

    /// Like [`Verifier::verify`], and additionally requires every requested
    /// field to carry exactly the requested values, in order.
    ///
    /// Formats that join repeated fields with `;` are compared in joined form.
    /// A match then reports the requested value lists rather than the split
    /// reading.
    pub async fn verify_tags(
        &self,
        path: &Path,
        expected: AudioFormat,
        requested: &TagSet,
    ) -> Result<MediaArtifact, AudioError> {
        let mut artifact = self.verify(path, expected).await?;

        let mismatched = if expected.keeps_repeated_fields() {
            compare_tags(requested, artifact.tags())
        } else {
            compare_joined_tags(requested, artifact.tags())
        };
        if mismatched.is_empty() {
            if !expected.keeps_repeated_fields() {
                adopt_requested_splits(requested, artifact.tags_mut());
            }
            return Ok(artifact);
        }

        metrics::VERIFICATIONS.with_label_values(&["tag_mismatch"]).inc();
        warn!(
            path = %path.display(),
            fields = %mismatched.join(", "),
            "Written tags differ from the requested tags"
        );
        Err(AudioError::ValidationFailed {
            path: path.to_path_buf(),
            reason: "Expected value does not match actual value".to_string(),
            mismatched_fields: mismatched,
        })
    }

    /// The same check applied to a source file before any tool runs.
    ///
    /// Failures are reported as `InvalidInput`.
    pub async fn validate_input(&self, path: &Path, declared: AudioFormat) -> Result<MediaArtifact, AudioError> {
        self.verify(path, declared).await.map_err(|e| match e {
            AudioError::ValidationFailed { path, reason, .. } => AudioError::InvalidInput { path, reason },
            other => other,
        })
    }

    async fn inspect(&self, path: &Path, expected: AudioFormat) -> Result<ArtifactMetadata, Rejection> {
        if tokio::fs::metadata(path).await.is_err() {
            return Err(Rejection::Missing);
        }

        let metadata = self.reader.read(path).await.map_err(|e| match e {
            AudioError::ProbeFailed { reason, .. } => Rejection::Unreadable(reason),
            other => Rejection::Other(other),
        })?;

        if !expected.matches(&metadata) {
            return Err(Rejection::WrongFormat(format!(
                "expected {} but found container \"{}\" with codec \"{}\"",
                expected,
                metadata.container,
                metadata.codec.as_deref().unwrap_or("none")
            )));
        }
        Ok(metadata)
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("reader", &self.reader.name())
            .finish()
    }
}

enum Rejection {
    Missing,
    Unreadable(String),
    WrongFormat(String),
    Other(AudioError),
}

impl Rejection {
    fn into_error(self, path: &Path) -> AudioError {
        match self {
            Self::Missing => AudioError::validation_failed(path, "file does not exist"),
            Self::Unreadable(reason) => {
                AudioError::validation_failed(path, format!("file cannot be parsed: {}", reason))
            }
            Self::WrongFormat(reason) => AudioError::validation_failed(path, reason),
            Self::Other(err) => err,
        }
    }
}
