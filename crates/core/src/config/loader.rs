use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides, e.g. `SOUNDSMITH_PROCESS__TIMEOUT_SECS`.
pub const ENV_PREFIX: &str = "SOUNDSMITH_";

fn base() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(base().merge(Toml::file(path)))
}

/// Load configuration from an optional file; without one, defaults plus
/// environment overrides are used.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => extract(base()),
    }
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[process]
timeout_secs = 30

[tools]
sox = "/opt/sox/bin/sox"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.process.timeout_secs, 30);
        assert_eq!(config.process.locale, "C.UTF-8");
        assert_eq!(config.tools.sox, Path::new("/opt/sox/bin/sox"));
        assert_eq!(config.tools.lame, Path::new("lame"));
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.process.timeout_secs, 600);
        assert_eq!(config.encoding.method, "vbr");
        assert_eq!(config.encoding.quality, 2);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[process]
timeout_secs = "soon"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[process]
locale = "en_US.UTF-8"
sox_single_threaded = false

[logging]
json = true
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.process.locale, "en_US.UTF-8");
        assert!(!config.process.sox_single_threaded);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("soundsmith.toml", "[process]\ntimeout_secs = 30\n")?;
            jail.set_env("SOUNDSMITH_PROCESS__TIMEOUT_SECS", "45");
            jail.set_env("SOUNDSMITH_TOOLS__METAFLAC", "/usr/local/bin/metaflac");

            let config = load_config(Path::new("soundsmith.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.process.timeout_secs, 45);
            assert_eq!(config.tools.metaflac, Path::new("/usr/local/bin/metaflac"));
            Ok(())
        });
    }
}
