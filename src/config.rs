//! Runtime configuration: environment settings for the roster server and the
//! optional JSON file customizing the tier board.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::board::{TierBoard, seed_board};

/// Default location on disk where the board configuration is looked up.
const DEFAULT_BOARD_CONFIG_PATH: &str = "config/board.json";
/// Environment variable that overrides [`DEFAULT_BOARD_CONFIG_PATH`].
const BOARD_CONFIG_PATH_ENV: &str = "TIER_BOARD_CONFIG_PATH";
/// Directory holding the board cache when nothing else is configured.
const DEFAULT_CACHE_DIR: &str = ".tier-board";
/// Database used when `ROSTER_DB` is not set.
const DEFAULT_DATABASE: &str = "tier_board";
const DEFAULT_PORT: u16 = 8080;

/// Errors raised while interpreting the store connection string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The scheme matches no known backend.
    #[error("unsupported store scheme in `{0}`")]
    UnsupportedScheme(String),
    /// The backend exists but was compiled out.
    #[error("store `{url}` requires the `{feature}` feature")]
    FeatureDisabled { url: String, feature: &'static str },
}

/// Backend selected by the scheme of the store connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// `memory://`, a process-local table.
    Memory,
    /// `mongodb://` or `mongodb+srv://`.
    #[cfg(feature = "mongo-store")]
    Mongo { uri: String, database: String },
    /// `http://` or `https://` pointing at a CouchDB server.
    #[cfg(feature = "couch-store")]
    Couch { base_url: String, database: String },
}

impl StoreBackend {
    /// Pick the backend matching `url`.
    pub fn parse(url: &str, database: &str) -> Result<Self, ConfigError> {
        let (scheme, _) = url
            .split_once("://")
            .ok_or_else(|| ConfigError::UnsupportedScheme(url.to_owned()))?;

        match scheme.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "mongodb" | "mongodb+srv" => Self::mongo(url, database),
            "http" | "https" => Self::couch(url, database),
            _ => Err(ConfigError::UnsupportedScheme(url.to_owned())),
        }
    }

    #[cfg(feature = "mongo-store")]
    fn mongo(url: &str, database: &str) -> Result<Self, ConfigError> {
        Ok(StoreBackend::Mongo {
            uri: url.to_owned(),
            database: database.to_owned(),
        })
    }

    #[cfg(not(feature = "mongo-store"))]
    fn mongo(url: &str, _database: &str) -> Result<Self, ConfigError> {
        Err(ConfigError::FeatureDisabled {
            url: url.to_owned(),
            feature: "mongo-store",
        })
    }

    #[cfg(feature = "couch-store")]
    fn couch(url: &str, database: &str) -> Result<Self, ConfigError> {
        Ok(StoreBackend::Couch {
            base_url: url.to_owned(),
            database: database.to_owned(),
        })
    }

    #[cfg(not(feature = "couch-store"))]
    fn couch(url: &str, _database: &str) -> Result<Self, ConfigError> {
        Err(ConfigError::FeatureDisabled {
            url: url.to_owned(),
            feature: "couch-store",
        })
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            #[cfg(feature = "mongo-store")]
            StoreBackend::Mongo { .. } => "mongodb",
            #[cfg(feature = "couch-store")]
            StoreBackend::Couch { .. } => "couchdb",
        }
    }
}

/// Settings of the roster HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Store backend; `None` makes every roster request fail with a configuration error.
    pub store: Option<StoreBackend>,
    /// Shared secret gating writes; `None` rejects every write.
    pub admin_password: Option<String>,
    /// Listening port.
    pub port: u16,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, treating empty values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database = var("ROSTER_DB").unwrap_or_else(|| DEFAULT_DATABASE.to_owned());
        let store = var("DATABASE_URL")
            .or_else(|| var("NETLIFY_DATABASE_URL"))
            .and_then(|url| match StoreBackend::parse(&url, &database) {
                Ok(backend) => Some(backend),
                Err(err) => {
                    error!(error = %err, "ignoring store connection string");
                    None
                }
            });

        let port = var("PORT")
            .or_else(|| var("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            store,
            admin_password: var("ADMIN_PASSWORD"),
            port,
        }
    }
}

/// Settings of the tier board client.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Roster used when the cache is empty.
    pub seed: TierBoard,
    /// Directory of the file cache.
    pub cache_dir: PathBuf,
}

impl BoardConfig {
    /// Load the board configuration from disk, falling back to the built-in seed.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    /// Load the board configuration stored at `path`, with the same fallbacks as [`BoardConfig::load`].
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawBoardConfig>(&contents) {
                Ok(raw) => match Self::try_from(raw) {
                    Ok(config) => {
                        info!(
                            path = %path.display(),
                            players = config.seed.len(),
                            "loaded tier board config"
                        );
                        config
                    }
                    Err(err) => {
                        warn!(
                            path = %path.display(),
                            error = %err,
                            "invalid seed roster in config; falling back to defaults"
                        );
                        Self::default()
                    }
                },
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            seed: seed_board(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the file located at [`DEFAULT_BOARD_CONFIG_PATH`].
struct RawBoardConfig {
    #[serde(default)]
    seed: Option<TierBoard>,
    #[serde(default)]
    cache_dir: Option<PathBuf>,
}

impl TryFrom<RawBoardConfig> for BoardConfig {
    type Error = crate::board::BoardError;

    fn try_from(value: RawBoardConfig) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        let seed = match value.seed {
            Some(seed) => {
                seed.check_unique()?;
                seed
            }
            None => defaults.seed,
        };

        Ok(Self {
            seed,
            cache_dir: value.cache_dir.unwrap_or(defaults.cache_dir),
        })
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(BOARD_CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BOARD_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn picks_backend_from_scheme() {
        assert_eq!(
            StoreBackend::parse("memory://", "db"),
            Ok(StoreBackend::Memory)
        );
        assert!(matches!(
            StoreBackend::parse("postgres://localhost/db", "db"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(StoreBackend::parse("localhost", "db").is_err());
    }

    #[cfg(feature = "mongo-store")]
    #[test]
    fn mongo_urls_keep_database_name() {
        assert_eq!(
            StoreBackend::parse("mongodb+srv://cluster.example", "ranks"),
            Ok(StoreBackend::Mongo {
                uri: "mongodb+srv://cluster.example".into(),
                database: "ranks".into()
            })
        );
    }

    #[test]
    fn empty_values_count_as_missing() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", ""),
            ("DATABASE_URL", "  "),
            ("PORT", "not-a-port"),
        ]));
        assert_eq!(config.admin_password, None);
        assert_eq!(config.store, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn netlify_database_url_is_a_fallback() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("NETLIFY_DATABASE_URL", "memory://"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("SERVER_PORT", "9000"),
        ]));
        assert_eq!(config.store, Some(StoreBackend::Memory));
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn config_file_seed_must_be_unique() {
        let raw: RawBoardConfig =
            serde_json::from_str(r#"{"seed":{"1":["Anka"],"3":["Anka"]}}"#).unwrap();
        assert!(BoardConfig::try_from(raw).is_err());

        let raw: RawBoardConfig = serde_json::from_str(r#"{"cache_dir":"/tmp/x"}"#).unwrap();
        let config = BoardConfig::try_from(raw).unwrap();
        assert_eq!(config.seed, seed_board());
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let missing = BoardConfig::load_from(&dir.path().join("absent.json"));
        assert_eq!(missing.seed, seed_board());
        assert_eq!(missing.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));

        let duplicated = dir.path().join("duplicated.json");
        fs::write(&duplicated, r#"{"seed":{"1":["Anka","Anka"]},"cache_dir":"/tmp/x"}"#).unwrap();
        let config = BoardConfig::load_from(&duplicated);
        assert_eq!(config.seed, seed_board());
        assert_eq!(config.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
    }

    #[test]
    fn load_reads_the_file_named_by_the_environment() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let custom = dir.path().join("custom.json");
        fs::write(&custom, r#"{"seed":{"2":["Netto"]},"cache_dir":"cache"}"#).unwrap();

        // Only this test touches the override variable.
        unsafe { env::set_var(BOARD_CONFIG_PATH_ENV, &broken) };
        let fallback = BoardConfig::load();
        unsafe { env::set_var(BOARD_CONFIG_PATH_ENV, &custom) };
        let loaded = BoardConfig::load();
        unsafe { env::remove_var(BOARD_CONFIG_PATH_ENV) };

        assert_eq!(fallback.seed, seed_board());
        assert_eq!(fallback.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert_eq!(loaded.seed.len(), 1);
        assert_eq!(loaded.seed.player(crate::board::Tier::new(2).unwrap(), 0), Some("Netto"));
        assert_eq!(loaded.cache_dir, PathBuf::from("cache"));
    }
}
