//! MP3 tagging with ffmpeg.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::command::{CommandBuilder, Tool};
use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::{AudioFormat, TagSet};

use super::traits::Tagger;
use super::{ensure_exists, record};

/// Rewrites ID3 tags by stream-copying the file with ffmpeg.
///
/// ffmpeg cannot edit in place, so every edit writes a hidden sibling file
/// that replaces the original once the run succeeds. Multi-valued fields are
/// joined with `;`.
#[derive(Debug, Clone)]
pub struct Mp3Tagger {
    ctx: ToolContext,
}

/// Hidden sibling of `file` with a unique name and the same extension.
fn temp_sibling(file: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(file.file_name().unwrap_or_default());
    name.push(format!(".{}.mp3", Uuid::new_v4().simple()));
    file.with_file_name(name)
}

impl Mp3Tagger {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    async fn rewrite<F>(&self, operation: &str, file: &Path, configure: F) -> Result<(), AudioError>
    where
        F: FnOnce(&mut CommandBuilder) + Send,
    {
        let result = self.rewrite_inner(file, configure).await;
        record(AudioFormat::Mp3, operation, &result);
        result
    }

    async fn rewrite_inner<F>(&self, file: &Path, configure: F) -> Result<(), AudioError>
    where
        F: FnOnce(&mut CommandBuilder) + Send,
    {
        ensure_exists(file).await?;
        let temp = temp_sibling(file);

        let mut ffmpeg = self.ctx.command(Tool::Ffmpeg);
        ffmpeg.flag("-y").input(file);
        configure(&mut ffmpeg);
        // Without bitexact the muxer adds its own `encoder` frame.
        ffmpeg
            .option("-c", "copy")
            .option("-id3v2_version", "3")
            .option("-fflags", "+bitexact")
            .output(&temp);
        let command = ffmpeg.compose()?;

        let outcome = match self.ctx.execute(&command).await {
            Ok(_) => tokio::fs::rename(&temp, file).await.map_err(AudioError::from),
            Err(e) => Err(e),
        };

        if outcome.is_err() {
            match tokio::fs::remove_file(&temp).await {
                Ok(()) => debug!(temp = %temp.display(), "Removed temporary file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    temp = %temp.display(),
                    error = %e,
                    "Failed to remove temporary file"
                ),
            }
        }
        outcome
    }
}

#[async_trait]
impl Tagger for Mp3Tagger {
    fn format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Drops global metadata and the attached picture stream.
    async fn remove_all_tags(&self, file: &Path) -> Result<(), AudioError> {
        self.rewrite("remove_all_tags", file, |ffmpeg| {
            ffmpeg.option("-map", "0:a").remove_all();
        })
        .await
    }

    async fn remove_tags(&self, file: &Path, fields: &[String]) -> Result<(), AudioError> {
        if fields.is_empty() {
            return ensure_exists(file).await;
        }
        self.rewrite("remove_tags", file, |ffmpeg| {
            ffmpeg.option("-map", "0").remove_fields(fields);
        })
        .await
    }

    async fn append_tags(&self, file: &Path, tags: &TagSet) -> Result<(), AudioError> {
        if tags.is_empty() {
            return ensure_exists(file).await;
        }
        self.rewrite("append_tags", file, |ffmpeg| {
            ffmpeg.option("-map", "0").add_tags(tags);
        })
        .await
    }

    /// Replaces any embedded pictures with `image`.
    async fn write_artwork(&self, file: &Path, image: &Path) -> Result<(), AudioError> {
        ensure_exists(image).await?;
        self.rewrite("write_artwork", file, |ffmpeg| {
            ffmpeg
                .extra_input(image)
                .option("-map", "0:a")
                .option("-map", "1:0")
                .option("-metadata:s:v", "title=Album cover")
                .option("-metadata:s:v", "comment=Cover (front)");
        })
        .await
    }

    async fn remove_artwork(&self, file: &Path) -> Result<(), AudioError> {
        self.rewrite("remove_artwork", file, |ffmpeg| {
            ffmpeg.option("-map", "0:a");
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockOutcome};
    use tempfile::TempDir;

    fn strings(argv: Vec<OsString>) -> Vec<String> {
        argv.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_temp_sibling_is_hidden_and_unique() {
        let file = Path::new("/music/track.mp3");
        let a = temp_sibling(file);
        let b = temp_sibling(file);
        assert_ne!(a, b);
        assert_eq!(a.parent(), file.parent());
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".track.mp3."));
        assert!(name.ends_with(".mp3"));
    }

    #[tokio::test]
    async fn test_write_tags_rewrites_through_temp_file() {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, reader) = fixtures::mock_context();
        let file = fixtures::touch(dir.path(), "a.mp3");
        let tags = TagSet::new()
            .with("artist", "Foo")
            .with("artist", "Bar")
            .with("album", "Baz");
        reader.set_tags(&file, tags.clone()).await;

        Mp3Tagger::new(ctx).write_tags(&file, &tags).await.unwrap();

        let commands = runner.recorded_commands().await;
        assert_eq!(commands.len(), 2);

        let clear = strings(commands[0].argv());
        assert!(clear.windows(2).any(|w| w == ["-map_metadata", "-1"]));
        assert!(clear.windows(2).any(|w| w == ["-map", "0:a"]));

        let write = strings(commands[1].argv());
        assert!(write.windows(2).any(|w| w == ["-metadata", "artist=Foo;Bar"]));
        assert!(write.windows(2).any(|w| w == ["-metadata", "album=Baz"]));
        assert!(write.windows(2).any(|w| w == ["-c", "copy"]));

        let temp = commands[1].output_path().unwrap();
        assert_ne!(temp, file);
        assert_eq!(temp.parent(), file.parent());
        assert_eq!(dir_entries(dir.path()), ["a.mp3"]);
    }

    #[tokio::test]
    async fn test_write_tags_keeps_separator_inside_single_value() {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, reader) = fixtures::mock_context();
        let file = fixtures::touch(dir.path(), "a.mp3");
        // The reader splits the stored "AC;DC" like any joined value.
        reader
            .set_tags(&file, TagSet::new().with("artist", "AC").with("artist", "DC"))
            .await;

        let tags = TagSet::new().with("artist", "AC;DC");
        let artifact = Mp3Tagger::new(ctx).write_tags(&file, &tags).await.unwrap();
        assert_eq!(artifact.tags(), &tags);

        let write = strings(runner.recorded_commands().await[1].argv());
        assert!(write.windows(2).any(|w| w == ["-metadata", "artist=AC;DC"]));
    }

    #[tokio::test]
    async fn test_failed_run_removes_temp_and_keeps_original() {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, _) = fixtures::mock_context();
        let file = dir.path().join("a.mp3");
        std::fs::write(&file, b"original").unwrap();
        runner
            .push_outcome(MockOutcome::Exit {
                code: 1,
                stderr: "Invalid data found when processing input".to_string(),
            })
            .await;
        runner.set_create_outputs_on_failure(true).await;

        let err = Mp3Tagger::new(ctx)
            .remove_all_tags(&file)
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::ProcessFailed { .. }));
        assert_eq!(dir_entries(dir.path()), ["a.mp3"]);
        assert_eq!(std::fs::read(&file).unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_remove_all_tags_drops_picture_stream() {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, _) = fixtures::mock_context();
        let file = fixtures::touch(dir.path(), "a.mp3");

        Mp3Tagger::new(ctx).remove_all_tags(&file).await.unwrap();

        let argv = strings(runner.recorded_commands().await[0].argv());
        let maps: Vec<&str> = argv
            .windows(2)
            .filter(|w| w[0] == "-map")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(maps, ["0:a"]);
        assert!(argv.windows(2).any(|w| w == ["-map_metadata", "-1"]));
        assert!(argv.windows(2).any(|w| w == ["-fflags", "+bitexact"]));
    }

    #[tokio::test]
    async fn test_write_artwork_maps_picture_stream() {
        let dir = TempDir::new().unwrap();
        let (ctx, runner, _) = fixtures::mock_context();
        let file = fixtures::touch(dir.path(), "a.mp3");
        let image = fixtures::touch(dir.path(), "cover.jpg");

        Mp3Tagger::new(ctx).write_artwork(&file, &image).await.unwrap();

        let argv = strings(runner.recorded_commands().await[0].argv());
        let expected = [
            "-y".to_string(),
            "-i".to_string(),
            file.display().to_string(),
            "-i".to_string(),
            image.display().to_string(),
        ];
        assert_eq!(argv[..5], expected);
        assert!(argv.windows(4).any(|w| w == ["-map", "0:a", "-map", "1:0"]));
    }
}
