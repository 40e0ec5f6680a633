//! Media descriptions shared by every component: formats, tag sets and
//! artifacts.

mod artifact;
mod format;
mod tags;

pub use artifact::{ArtifactMetadata, ArtworkInfo, AudioFile, MediaArtifact};
pub use format::AudioFormat;
pub use tags::{normalize_field, TagSet, VALUE_SEPARATOR};
