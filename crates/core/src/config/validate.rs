use super::{types::Config, ConfigError};
use crate::command::Tool;
use crate::converter::Mp3Encoding;
use crate::process::is_utf8_locale;

/// Validate configuration
/// Currently validates:
/// - Process timeout is not 0
/// - Locale is UTF-8 capable
/// - No tool path is empty
/// - Default encoding parses
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.process.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "process.timeout_secs cannot be 0".to_string(),
        ));
    }

    if !is_utf8_locale(&config.process.locale) {
        return Err(ConfigError::ValidationError(format!(
            "process.locale must be a UTF-8 locale, got \"{}\"",
            config.process.locale
        )));
    }

    for tool in Tool::ALL {
        if config.tools.program(tool).as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "tools: path for {} cannot be empty",
                tool
            )));
        }
    }

    Mp3Encoding::from_parts(&config.encoding.method, config.encoding.quality)
        .map_err(|e| ConfigError::ValidationError(format!("encoding: {}", e)))?;

    Ok(())
}
