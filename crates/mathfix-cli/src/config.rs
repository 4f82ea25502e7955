//! Configuration file loading for the CLI
//!
//! The configuration comes from the first of: the `--config` path, the
//! project file `mathfix/config.toml`, the platform config directory. When
//! none exists the defaults apply. The chosen source is kept with the
//! configuration so a run can report where its policy came from.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use mathfix::{MathfixError, config::AppConfig};

/// Project configuration file, relative to the working directory.
const LOCAL_CONFIG: &str = "mathfix/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for MathfixError {
    fn from(err: ConfigError) -> Self {
        MathfixError::Config(err.to_string())
    }
}

/// Where the configuration of a run was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// The project file `mathfix/config.toml`.
    Local(PathBuf),
    /// The platform config directory.
    System(PathBuf),
    /// No file; built-in defaults.
    Default,
}

impl ConfigSource {
    /// The file to read, `None` for the defaults.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Local(path) | Self::System(path) => Some(path),
            Self::Default => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{} (--config)", path.display()),
            Self::Local(path) => write!(f, "{} (project)", path.display()),
            Self::System(path) => write!(f, "{} (system)", path.display()),
            Self::Default => write!(f, "built-in defaults"),
        }
    }
}

/// A configuration together with the place it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    config: AppConfig,
    source: ConfigSource,
}

impl LoadedConfig {
    pub fn into_parts(self) -> (AppConfig, ConfigSource) {
        (self.config, self.source)
    }
}

/// Find and load the configuration for a run.
///
/// # Errors
///
/// Returns error if:
/// - An explicit path is given but the file doesn't exist
/// - The chosen file cannot be read or parsed
/// - The file parses but holds invalid values
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<LoadedConfig, MathfixError> {
    let source = match explicit_path {
        Some(path) => ConfigSource::Explicit(path.as_ref().to_path_buf()),
        None => discover(),
    };

    let config = match source.path() {
        Some(path) => load_config_file(path)?,
        None => AppConfig::default(),
    };

    let content = config.content();
    info!(
        source = source.to_string(),
        extensions:? = content.extensions(),
        on_error:? = content.on_error();
        "Configuration loaded"
    );

    Ok(LoadedConfig { config, source })
}

/// The first configuration file that exists, or the defaults.
fn discover() -> ConfigSource {
    let local = Path::new(LOCAL_CONFIG);
    if local.exists() {
        return ConfigSource::Local(local.to_path_buf());
    }

    let Some(dirs) = ProjectDirs::from("com", "mathfix", "mathfix") else {
        debug!("Could not determine platform-specific config directory");
        return ConfigSource::Default;
    };
    let system = dirs.config_dir().join("config.toml");
    if system.exists() {
        return ConfigSource::System(system);
    }

    debug!(path = system.display().to_string(); "No configuration file found");
    ConfigSource::Default
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
/// - Validation fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, MathfixError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;

    Ok(config)
}

/// Reject values that parse but cannot work.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let extensions = config.content().extensions();
    if extensions.is_empty() {
        return Err(ConfigError::Validation(
            "content.extensions must name at least one extension".to_string(),
        ));
    }
    if let Some(ext) = extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.starts_with('.'))
    {
        return Err(ConfigError::Validation(format!(
            "invalid extension `{ext}`, write extensions without the leading dot"
        )));
    }

    for (old, new) in config.fixes().renames() {
        for name in [old, new] {
            if !is_environment_name(name) {
                return Err(ConfigError::Validation(format!(
                    "invalid environment name `{name}` in fixes.rename"
                )));
            }
        }
    }

    Ok(())
}

/// Environment names are made of ASCII letters and `*`.
fn is_environment_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '*')
}
