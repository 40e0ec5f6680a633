//! Tag and artwork editing.
//!
//! Each taggable format has one [`Tagger`]:
//!
//! - FLAC: `metaflac`, editing the file in place
//! - MP3: `ffmpeg` stream copy into a hidden sibling file, renamed over the
//!   original once the run succeeds
//! - ALAC (`.m4a`): `AtomicParsley --overWrite`
//!
//! WAV and Ogg files have no tagger.

mod flac;
mod m4a;
mod mp3;
mod traits;

pub use flac::FlacTagger;
pub use m4a::M4aTagger;
pub use mp3::Mp3Tagger;
pub use traits::Tagger;

use std::path::Path;

use crate::context::ToolContext;
use crate::error::AudioError;
use crate::media::AudioFormat;
use crate::metrics;

/// The tagger for `format`, or `None` when the format cannot be tagged.
pub fn tagger_for(format: AudioFormat, ctx: ToolContext) -> Option<Box<dyn Tagger>> {
    match format {
        AudioFormat::Flac => Some(Box::new(FlacTagger::new(ctx))),
        AudioFormat::Mp3 => Some(Box::new(Mp3Tagger::new(ctx))),
        AudioFormat::Alac => Some(Box::new(M4aTagger::new(ctx))),
        AudioFormat::Wav | AudioFormat::Ogg => None,
    }
}

/// Fails with `InvalidInput` unless `path` is an existing file.
pub(crate) async fn ensure_exists(path: &Path) -> Result<(), AudioError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(AudioError::invalid_input(path, "file does not exist")),
    }
}

/// Counts one tag edit.
pub(crate) fn record<T>(format: AudioFormat, operation: &str, result: &Result<T, AudioError>) {
    metrics::TAG_WRITES
        .with_label_values(&[format.extension(), operation, metrics::status_label(result)])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_tagger_for_formats() {
        let (ctx, _, _) = fixtures::mock_context();
        for format in AudioFormat::ALL {
            let tagger = tagger_for(format, ctx.clone());
            assert_eq!(tagger.is_some(), format.supports_tagging());
            if let Some(tagger) = tagger {
                assert_eq!(tagger.format(), format);
            }
        }
    }
}
