//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_MAX_HITS: usize = 100;
pub const DEFAULT_WRITER_HEAP_BYTES: usize = 50_000_000;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    pub dir: String,
    #[serde(default = "default_writer_heap_bytes")]
    pub writer_heap_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,
}

fn default_writer_heap_bytes() -> usize {
    DEFAULT_WRITER_HEAP_BYTES
}

fn default_max_hits() -> usize {
    DEFAULT_MAX_HITS
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { max_hits: DEFAULT_MAX_HITS }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Loads `config.toml` and the environment overlay from `base_dir`.
    pub fn load_from(base_dir: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(base_dir, &env_name)
    }

    pub fn load_for_env(base_dir: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base_dir.to_path_buf() };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn index(&self) -> Result<IndexSettings> {
        self.get("index")
    }

    /// Index directory resolved against the directory the config was loaded from.
    pub fn index_dir(&self) -> Result<PathBuf> {
        Ok(resolve_with_base(&self.base_dir, self.index()?.dir))
    }

    /// Like `get`, but a missing key is `Ok(None)` rather than an error.
    pub fn get_optional<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.figment.extract_inner(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.missing() => Ok(None),
            Err(e) => Err(Error::InvalidConfig(format!("Failed to get '{}': {}", key, e))),
        }
    }

    /// Search settings; only a missing `[search]` table falls back to defaults.
    pub fn search(&self) -> Result<SearchSettings> {
        Ok(self.get_optional("search")?.unwrap_or_default())
    }

    fn validate(&self) -> Result<()> {
        if self.search()?.max_hits == 0 {
            return Err(Error::InvalidConfig("search.max_hits must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
