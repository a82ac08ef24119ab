//! Configuration loading from files.
//!
//! The YAML file is layered under `BLOGEN_`-prefixed environment variables,
//! so `BLOGEN_SITE__URL=https://staging.example.com` overrides `site.url`.

use std::path::Path;

use super::{BlogConfig, ConfigError};

/// Config file used when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "blogen.yaml";

const ENV_PREFIX: &str = "BLOGEN";

impl BlogConfig {
    /// Load the config from the command line argument, defaulting to `blogen.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file)
    }

    /// Load the config from a file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let config = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<BlogConfig>()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'site.title' must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
