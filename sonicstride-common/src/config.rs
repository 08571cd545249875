//! Configuration loading and root folder resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument / environment variable (resolved by the binary's CLI parser)
//! 2. TOML config file
//! 3. OS-dependent compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DATABASE_FILE: &str = "sonicstride.db";
const AUDIO_FILES_DIR: &str = "audio_files";
const MUSIC_DIR: &str = "files";

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load and parse a specific config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the platform config file if one exists.
    ///
    /// A missing file yields defaults; an unparsable one is logged and ignored.
    pub fn discover() -> Self {
        let Some(path) = default_config_file() else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }
}

/// Values supplied on the command line (or through their environment variables)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl ServerConfig {
    pub fn resolve(overrides: ConfigOverrides, file: TomlConfig) -> Self {
        Self {
            root_folder: overrides
                .root_folder
                .or(file.root_folder)
                .unwrap_or_else(default_root_folder),
            host: overrides
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    /// Asset store root for reusable audio files
    pub fn audio_files_dir(&self) -> PathBuf {
        self.root_folder.join(AUDIO_FILES_DIR)
    }

    /// Asset store root for uploaded experiment music
    pub fn music_dir(&self) -> PathBuf {
        self.root_folder.join(MUSIC_DIR)
    }
}

/// Locate the platform config file, if any
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("sonicstride").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/sonicstride/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/sonicstride (or /var/lib/sonicstride for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("sonicstride"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/sonicstride"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("sonicstride"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/sonicstride"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("sonicstride"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\sonicstride"))
    } else {
        PathBuf::from("./sonicstride_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file() {
        let file = TomlConfig::parse(
            r#"
            root_folder = "/srv/from-file"
            port = 6000
            log_level = "debug"
            "#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            port: Some(7000),
            ..Default::default()
        };

        let config = ServerConfig::resolve(overrides, file);
        assert_eq!(config.port, 7000);
        assert_eq!(config.root_folder, PathBuf::from("/srv/from-file"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let config = ServerConfig::resolve(ConfigOverrides::default(), TomlConfig::default());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.root_folder, default_root_folder());
        assert_eq!(config.bind_addr(), format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT));
    }

    #[test]
    fn test_derived_paths_live_under_root() {
        let config = ServerConfig::resolve(
            ConfigOverrides {
                root_folder: Some(PathBuf::from("/data/ss")),
                ..Default::default()
            },
            TomlConfig::default(),
        );
        assert_eq!(config.database_path(), PathBuf::from("/data/ss/sonicstride.db"));
        assert_eq!(config.audio_files_dir(), PathBuf::from("/data/ss/audio_files"));
        assert_eq!(config.music_dir(), PathBuf::from("/data/ss/files"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = TomlConfig::parse("port = \"not a number\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
