//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AudioError;

/// Bitrate strategy passed to lame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mp3Method {
    /// Constant bitrate.
    Cbr,
    /// Average bitrate.
    Abr,
    /// Variable bitrate.
    Vbr,
}

impl FromStr for Mp3Method {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cbr" => Ok(Self::Cbr),
            "abr" => Ok(Self::Abr),
            "vbr" => Ok(Self::Vbr),
            other => Err(AudioError::invalid_argument(format!(
                "unknown MP3 encoding method \"{}\" (expected cbr, abr or vbr)",
                other
            ))),
        }
    }
}

impl fmt::Display for Mp3Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cbr => "cbr",
            Self::Abr => "abr",
            Self::Vbr => "vbr",
        })
    }
}

/// MP3 encoding with its quality parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "quality", rename_all = "lowercase")]
pub enum Mp3Encoding {
    /// Constant bitrate in kbps.
    Cbr(u32),
    /// Average bitrate in kbps.
    Abr(u32),
    /// VBR quality, 0 (best) to 9 (smallest).
    Vbr(u8),
}

impl Mp3Encoding {
    /// Lowest and highest bitrates lame accepts, in kbps.
    pub const BITRATE_RANGE: (u32, u32) = (8, 320);

    /// Builds an encoding from a method name and a quality value, which is a
    /// bitrate for cbr/abr and a 0-9 level for vbr.
    pub fn from_parts(method: &str, quality: u32) -> Result<Self, AudioError> {
        let encoding = match method.parse::<Mp3Method>()? {
            Mp3Method::Cbr => Self::Cbr(quality),
            Mp3Method::Abr => Self::Abr(quality),
            Mp3Method::Vbr => Self::Vbr(u8::try_from(quality).unwrap_or(u8::MAX)),
        };
        encoding.validate()?;
        Ok(encoding)
    }

    pub fn method(&self) -> Mp3Method {
        match self {
            Self::Cbr(_) => Mp3Method::Cbr,
            Self::Abr(_) => Mp3Method::Abr,
            Self::Vbr(_) => Mp3Method::Vbr,
        }
    }

    /// Checks the quality value against the method's range.
    pub fn validate(&self) -> Result<(), AudioError> {
        let (low, high) = Self::BITRATE_RANGE;
        match *self {
            Self::Cbr(kbps) | Self::Abr(kbps) if !(low..=high).contains(&kbps) => {
                Err(AudioError::invalid_argument(format!(
                    "{} bitrate must be between {} and {} kbps, got {}",
                    self.method(),
                    low,
                    high,
                    kbps
                )))
            }
            Self::Vbr(level) if level > 9 => Err(AudioError::invalid_argument(format!(
                "vbr quality must be between 0 and 9, got {}",
                level
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for Mp3Encoding {
    fn default() -> Self {
        Self::Vbr(2)
    }
}

/// Options for WAV to MP3 encoding with lame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LameOptions {
    pub encoding: Mp3Encoding,
    /// Output sample rate in kHz (e.g., 44.1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resample_khz: Option<f64>,
    /// Input bit width (8, 16, 24 or 32).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitwidth: Option<u8>,
}

impl LameOptions {
    pub fn new(encoding: Mp3Encoding) -> Self {
        Self {
            encoding,
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), AudioError> {
        self.encoding.validate()?;
        if let Some(khz) = self.resample_khz {
            if !(khz.is_finite() && khz > 0.0) {
                return Err(AudioError::invalid_argument(format!(
                    "resample frequency must be positive, got {}",
                    khz
                )));
            }
        }
        if let Some(bits) = self.bitwidth {
            if ![8, 16, 24, 32].contains(&bits) {
                return Err(AudioError::invalid_argument(format!(
                    "bit width must be 8, 16, 24 or 32, got {}",
                    bits
                )));
            }
        }
        Ok(())
    }
}

/// Options for FLAC to ALAC conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlacOptions {
    /// Image embedded with AtomicParsley after the conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<PathBuf>,
}

/// Options for cutting a preview clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewOptions {
    /// Where the clip starts, in seconds.
    pub start_secs: f64,
    /// Trim the source to the clip; otherwise the whole track is kept.
    pub trim: bool,
    /// Clip length in seconds.
    pub clip_secs: u64,
    /// Fade-in length in seconds, if fading in.
    pub fade_in_secs: Option<f64>,
    /// Fade-out length in seconds, if fading out.
    pub fade_out_secs: Option<f64>,
}

impl PreviewOptions {
    pub const DEFAULT_CLIP_SECS: u64 = 90;
    pub const DEFAULT_FADE_SECS: f64 = 6.0;

    pub(crate) fn validate(&self) -> Result<(), AudioError> {
        if !(self.start_secs.is_finite() && self.start_secs >= 0.0) {
            return Err(AudioError::invalid_argument(format!(
                "preview start must be a non-negative number of seconds, got {}",
                self.start_secs
            )));
        }
        if self.clip_secs == 0 {
            return Err(AudioError::invalid_argument("preview clip length cannot be 0"));
        }
        for fade in [self.fade_in_secs, self.fade_out_secs].into_iter().flatten() {
            if !(fade.is_finite() && fade >= 0.0) {
                return Err(AudioError::invalid_argument(format!(
                    "fade length must be a non-negative number of seconds, got {}",
                    fade
                )));
            }
        }
        Ok(())
    }
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            start_secs: 0.0,
            trim: false,
            clip_secs: Self::DEFAULT_CLIP_SECS,
            fade_in_secs: None,
            fade_out_secs: None,
        }
    }
}

/// Steps of a conversion, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    Validating,
    Composing,
    Executing,
    Verifying,
    Done,
    Failed,
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::Composing => "composing",
            Self::Executing => "executing",
            Self::Verifying => "verifying",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("cbr".parse::<Mp3Method>().unwrap(), Mp3Method::Cbr);
        assert_eq!(" ABR ".parse::<Mp3Method>().unwrap(), Mp3Method::Abr);
        assert_eq!("vbr".parse::<Mp3Method>().unwrap(), Mp3Method::Vbr);

        let err = "flac".parse::<Mp3Method>().unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument { .. }));
    }

    #[test]
    fn test_encoding_from_parts() {
        assert_eq!(Mp3Encoding::from_parts("cbr", 320).unwrap(), Mp3Encoding::Cbr(320));
        assert_eq!(Mp3Encoding::from_parts("abr", 192).unwrap(), Mp3Encoding::Abr(192));
        assert_eq!(Mp3Encoding::from_parts("vbr", 0).unwrap(), Mp3Encoding::Vbr(0));

        assert!(Mp3Encoding::from_parts("vbr", 10).is_err());
        assert!(Mp3Encoding::from_parts("vbr", 4000).is_err());
        assert!(Mp3Encoding::from_parts("cbr", 0).is_err());
        assert!(Mp3Encoding::from_parts("cbr", 999).is_err());
        assert!(Mp3Encoding::from_parts("lossless", 2).is_err());
    }

    #[test]
    fn test_encoding_serde() {
        let json = serde_json::to_string(&Mp3Encoding::Cbr(256)).unwrap();
        assert_eq!(json, r#"{"method":"cbr","quality":256}"#);
    }

    #[test]
    fn test_lame_options_validation() {
        let mut options = LameOptions::new(Mp3Encoding::Vbr(2));
        assert!(options.validate().is_ok());

        options.bitwidth = Some(12);
        assert!(options.validate().is_err());

        options.bitwidth = Some(16);
        options.resample_khz = Some(-44.1);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_preview_defaults() {
        let options = PreviewOptions::default();
        assert_eq!(options.clip_secs, 90);
        assert!(!options.trim);
        assert!(options.fade_in_secs.is_none());
        assert!(options.validate().is_ok());

        let bad = PreviewOptions {
            start_secs: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
