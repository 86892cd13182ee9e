//! Layered settings: command-line flags over an optional TOML file over defaults.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use pokedex_api::ApiConfig;
use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "pokedex.toml";

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("timeout_secs must be positive")]
    ZeroTimeout,
}

/// Contents of the settings file; every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) api: ApiSection,
    pub(crate) window: WindowSection,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ApiSection {
    pub(crate) base_url: Option<String>,
    pub(crate) collection: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowSection {
    pub(crate) title: Option<String>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) vsync: Option<bool>,
}

impl FileConfig {
    /// Parses settings from TOML text; `origin` only labels errors.
    pub(crate) fn parse(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Loads the explicit file, or the default file when it exists.
    ///
    /// A missing default file yields empty settings; a missing explicit file
    /// is an error.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents, &path),
            Err(error) if !required && error.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

/// Values supplied on the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) base_url: Option<String>,
    pub(crate) collection: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
}

/// Window options for the `browse` subcommand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct WindowSettings {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Pokédex".to_owned(),
            width: 1280,
            height: 800,
            vsync: true,
        }
    }
}

/// Fully resolved settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) api: ApiConfig,
    pub(crate) window: WindowSettings,
}

impl Settings {
    /// Merges flags over file values over defaults.
    pub(crate) fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();
        let timeout = match overrides.timeout_secs.or(file.api.timeout_secs) {
            Some(0) => return Err(ConfigError::ZeroTimeout),
            Some(seconds) => Duration::from_secs(seconds),
            None => defaults.timeout,
        };

        let api = ApiConfig {
            base_url: overrides
                .base_url
                .or(file.api.base_url)
                .unwrap_or(defaults.base_url),
            collection: overrides
                .collection
                .or(file.api.collection)
                .unwrap_or(defaults.collection),
            timeout,
        };

        let window_defaults = WindowSettings::default();
        let window = WindowSettings {
            title: file.window.title.unwrap_or(window_defaults.title),
            width: file.window.width.unwrap_or(window_defaults.width),
            height: file.window.height.unwrap_or(window_defaults.height),
            vsync: file.window.vsync.unwrap_or(window_defaults.vsync),
        };

        Ok(Self { api, window })
    }
}
