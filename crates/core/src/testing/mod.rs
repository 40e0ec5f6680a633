//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the process runner and the
//! metadata reader, allowing converters and taggers to be exercised without
//! any of the external tools installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use soundsmith_core::testing::{fixtures, MockOutcome};
//!
//! let (ctx, runner, reader) = fixtures::mock_context();
//!
//! // Configure mock responses
//! runner.push_outcome(MockOutcome::Exit { code: 1, stderr: "boom".into() }).await;
//! reader.set_tags("/music/a.flac", TagSet::new().with("artist", "Foo")).await;
//!
//! // Use ctx with a converter or tagger...
//! ```

mod mock_reader;
mod mock_runner;

pub use mock_reader::MockMetadataReader;
pub use mock_runner::{MockOutcome, MockRunner};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use super::{MockMetadataReader, MockRunner};
    use crate::config::Config;
    use crate::context::ToolContext;
    use crate::media::{ArtifactMetadata, AudioFormat, TagSet};

    /// Create an empty file named `name` in `dir`.
    pub fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Err(e) = std::fs::write(&path, b"") {
            panic!("failed to create fixture {}: {}", path.display(), e);
        }
        path
    }

    /// Metadata of a well-formed three minute stereo file of `format`.
    pub fn metadata_for(format: AudioFormat) -> ArtifactMetadata {
        let (container, codec, bitrate) = match format {
            AudioFormat::Flac => ("flac", "flac", 900),
            AudioFormat::Mp3 => ("mp3", "mp3", 320),
            AudioFormat::Alac => ("mov,mp4,m4a,3gp,3g2,mj2", "alac", 850),
            AudioFormat::Wav => ("wav", "pcm_s16le", 1411),
            AudioFormat::Ogg => ("ogg", "vorbis", 256),
        };
        ArtifactMetadata {
            container: container.to_string(),
            codec: Some(codec.to_string()),
            duration_secs: 180.0,
            sample_rate: Some(44_100),
            channels: Some(2),
            bitrate_kbps: Some(bitrate),
            tags: TagSet::new(),
            artwork: None,
        }
    }

    /// A context with default configuration on top of fresh mocks.
    pub fn mock_context() -> (ToolContext, Arc<MockRunner>, Arc<MockMetadataReader>) {
        let runner = Arc::new(MockRunner::new());
        let reader = Arc::new(MockMetadataReader::new());
        let ctx = match ToolContext::new(Config::default(), runner.clone(), reader.clone()) {
            Ok(ctx) => ctx,
            Err(e) => panic!("default configuration rejected: {}", e),
        };
        (ctx, runner, reader)
    }
}
