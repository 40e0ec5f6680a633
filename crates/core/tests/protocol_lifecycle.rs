//! Compose, execute, verify lifecycle tests.
//!
//! These tests drive the public API with the mock runner and reader:
//! - Commands reach the runner exactly as composed
//! - Exit status 0 is not enough; artifacts are re-read
//! - Runner failures surface as typed errors
//! - Tag writes are verified against every requested value

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use soundsmith_core::{
    testing::{fixtures, MockMetadataReader, MockOutcome, MockRunner},
    AudioError, AudioFormat, Config, Manipulator, PreviewOptions, TagSet, Tool, ToolContext,
    Transcoder,
};

/// Test helper bundling a context with its mocks.
struct TestHarness {
    ctx: ToolContext,
    runner: Arc<MockRunner>,
    reader: Arc<MockMetadataReader>,
    dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        let runner = Arc::new(MockRunner::new());
        let reader = Arc::new(MockMetadataReader::new());
        let ctx = ToolContext::new(config, runner.clone(), reader.clone())
            .expect("Failed to create context");
        Self {
            ctx,
            runner,
            reader,
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn file(&self, name: &str) -> PathBuf {
        fixtures::touch(self.dir.path(), name)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    async fn tools(&self) -> Vec<Tool> {
        self.runner
            .recorded_commands()
            .await
            .iter()
            .map(|c| c.tool())
            .collect()
    }
}

#[tokio::test]
async fn test_convert_then_tag() {
    let h = TestHarness::new();
    let source = h.file("track.flac");
    let target = h.path("out/track.mp3");
    let tags = TagSet::new()
        .with("artist", "Foo")
        .with("artist", "Bar")
        .with("title", "Song");
    h.reader.set_tags(&target, tags.clone()).await;

    let artifact = assert_ok!(Transcoder::new(h.ctx.clone()).convert(&source, &target).await);
    assert_eq!(artifact.format(), AudioFormat::Mp3);
    assert_eq!(artifact.path(), target);

    let manipulator = assert_ok!(Manipulator::open(&target, h.ctx.clone()));
    let tagged = assert_ok!(manipulator.write_tags(&tags).await);
    assert_eq!(tagged.tags().get("artist").unwrap(), ["Foo", "Bar"]);

    assert_eq!(h.tools().await, [Tool::Sox, Tool::Ffmpeg, Tool::Ffmpeg]);
}

#[tokio::test]
async fn test_zero_exit_with_bad_output_is_rejected() {
    let h = TestHarness::new();
    let source = h.file("track.wav");
    let target = h.path("track.flac");
    h.reader
        .set_metadata(&target, fixtures::metadata_for(AudioFormat::Wav))
        .await;

    let err = assert_err!(Transcoder::new(h.ctx.clone()).convert(&source, &target).await);
    assert!(matches!(err, AudioError::ValidationFailed { .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_missing_output_is_rejected() {
    let h = TestHarness::new();
    h.runner.set_create_outputs(false).await;
    let source = h.file("track.flac");

    let err = assert_err!(
        Transcoder::new(h.ctx.clone())
            .convert(&source, &h.path("track.ogg"))
            .await
    );
    match err {
        AudioError::ValidationFailed { reason, .. } => assert_eq!(reason, "file does not exist"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_runner_failures_are_typed() {
    let h = TestHarness::new();
    let source = h.file("track.flac");
    let transcoder = Transcoder::new(h.ctx.clone());

    h.runner.push_outcome(MockOutcome::Timeout).await;
    let err = assert_err!(transcoder.convert(&source, &h.path("a.wav")).await);
    assert!(matches!(err, AudioError::ProcessTimeout { timeout_secs: 600, .. }));
    assert!(!err.is_recoverable());

    h.runner.push_outcome(MockOutcome::NotFound).await;
    let err = assert_err!(transcoder.convert(&source, &h.path("b.wav")).await);
    assert!(matches!(err, AudioError::ToolNotFound { tool: Tool::Sox, .. }));

    h.runner
        .push_outcome(MockOutcome::Exit {
            code: 2,
            stderr: "sox FAIL formats: can't open input file".to_string(),
        })
        .await;
    let err = assert_err!(transcoder.convert(&source, &h.path("c.wav")).await);
    assert!(err.to_string().contains("can't open input file"));
    assert_eq!(err.execution_result().unwrap().exit_code(), Some(2));
}

#[tokio::test]
async fn test_tag_mismatch_names_fields() {
    let h = TestHarness::new();
    let file = h.file("track.flac");
    h.reader
        .set_tags(
            &file,
            TagSet::new()
                .with("artist", "Foo")
                .with("artist", "Baz")
                .with("album", "Album"),
        )
        .await;

    let requested = TagSet::new()
        .with("artist", "Foo")
        .with("artist", "Bar")
        .with("album", "Album");
    let err = assert_err!(
        assert_ok!(Manipulator::open(&file, h.ctx.clone()))
            .write_tags(&requested)
            .await
    );
    assert_eq!(err.mismatched_fields(), ["artist"]);
}

#[tokio::test]
async fn test_configured_programs_and_timeout_reach_runner() {
    let mut config = Config::default();
    config.tools.sox = "/opt/sox/bin/sox".into();
    config.process.timeout_secs = 5;
    let h = TestHarness::with_config(config);
    let source = h.file("track.flac");

    h.runner.push_outcome(MockOutcome::Timeout).await;
    let err = assert_err!(
        Transcoder::new(h.ctx.clone())
            .preview(&source, &h.path("clip.mp3"), &PreviewOptions::default())
            .await
    );
    assert!(matches!(err, AudioError::ProcessTimeout { timeout_secs: 5, .. }));

    let commands = h.runner.recorded_commands().await;
    assert_eq!(commands[0].program(), std::path::Path::new("/opt/sox/bin/sox"));
}

#[tokio::test]
async fn test_paths_are_single_tokens() {
    let h = TestHarness::new();
    let source = h.file("My Album; rm -rf ~ $(x).flac");
    let target = h.path("out 'quoted' \"dir\".wav");

    assert_ok!(Transcoder::new(h.ctx.clone()).convert(&source, &target).await);

    let argv = h.runner.recorded_commands().await[0].argv();
    assert!(argv.contains(&source.clone().into_os_string()));
    assert!(argv.contains(&target.clone().into_os_string()));
}
