pub mod command;
pub mod config;
pub mod context;
pub mod converter;
pub mod error;
pub mod manipulator;
pub mod media;
pub mod metrics;
pub mod probe;
pub mod process;
pub mod tagger;
pub mod testing;
pub mod verifier;

pub use command::{ArgGroup, Command, CommandBuilder, TagOperation, Tool};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, EncodingConfig, LoggingConfig, ProcessConfig, ToolsConfig,
};
pub use context::ToolContext;
pub use converter::{
    AlacOptions, Converter, FlacConverter, LameOptions, Mp3Encoding, Mp3Method, PreviewClipper,
    PreviewOptions, Transcoder, WavConverter,
};
pub use error::AudioError;
pub use manipulator::Manipulator;
pub use media::{
    ArtifactMetadata, ArtworkInfo, AudioFile, AudioFormat, MediaArtifact, TagSet,
};
pub use probe::{MetadataReader, ToolMetadataReader};
pub use process::{EnvironmentOverrides, ExecutionResult, Executor, ProcessRunner, SystemRunner};
pub use tagger::{tagger_for, FlacTagger, M4aTagger, Mp3Tagger, Tagger};
pub use verifier::{compare_joined_tags, compare_tags, Verifier};
