//! Configuration management for `beads_ready`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`BREADY_*`)
//! 3. Project config (.beads/config.yaml)
//! 4. User config (~/.config/bready/config.yaml)
//! 5. Defaults
//!
//! Also home to workspace discovery: finding the `.beads` directory and
//! picking which database or JSONL export inside it to read.

use crate::error::{ReadyError, Result};
use crate::model::DependencyType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Database filename used when metadata does not name one.
const DEFAULT_DB_FILENAME: &str = "beads.db";
/// Preferred JSONL export filename.
const DEFAULT_JSONL_FILENAME: &str = "issues.jsonl";
/// Legacy JSONL filename to fall back to.
const LEGACY_JSONL_FILENAME: &str = "beads.jsonl";
/// Busy timeout applied when nothing else is configured.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// Which dependency types hold back readiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessConfig {
    pub blocking_types: BTreeSet<DependencyType>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            blocking_types: BTreeSet::from([DependencyType::Blocks]),
        }
    }
}

impl ReadinessConfig {
    /// Build from a comma separated list such as `"blocks, waits-for"`.
    ///
    /// An empty list falls back to the default set; a workspace where
    /// nothing blocks is almost certainly a typo.
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        let blocking_types: BTreeSet<DependencyType> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();

        if blocking_types.is_empty() {
            warn!(value = list, "Empty blocking-types setting, using default");
            return Self::default();
        }
        Self { blocking_types }
    }

    #[must_use]
    pub fn is_blocking(&self, dep_type: &DependencyType) -> bool {
        self.blocking_types.contains(dep_type)
    }
}

/// Subset of `.beads/metadata.json` needed to find the database.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub jsonl_export: Option<String>,
}

impl Metadata {
    /// Load metadata.json from the beads directory. A missing file is empty metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(beads_dir: &Path) -> Result<Self> {
        let path = beads_dir.join("metadata.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let mut metadata: Self = serde_json::from_str(&contents)?;
        metadata.database = metadata.database.filter(|s| !s.trim().is_empty());
        metadata.jsonl_export = metadata.jsonl_export.filter(|s| !s.trim().is_empty());
        Ok(metadata)
    }
}

/// Discover the active `.beads` directory.
///
/// Honors `BEADS_DIR` when set, otherwise walks up from `start`.
///
/// # Errors
///
/// Returns `RepositoryNotFound` if no beads directory is found.
pub fn discover_beads_dir(start: &Path) -> Result<PathBuf> {
    let env_dir = env::var("BEADS_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    discover_beads_dir_with_env(start, env_dir.as_deref())
}

fn discover_beads_dir_with_env(start: &Path, env_override: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
        debug!(path = %path.display(), "BEADS_DIR is not a directory, ignoring");
    }

    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(".beads");
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            break;
        }
    }

    Err(ReadyError::RepositoryNotFound {
        path: start.join(".beads"),
    })
}

fn resolve_in(beads_dir: &Path, name: &str) -> PathBuf {
    let candidate = PathBuf::from(name);
    if candidate.is_absolute() {
        candidate
    } else {
        beads_dir.join(candidate)
    }
}

/// Pick the database file inside a beads directory.
///
/// Order: the `metadata.json` `database` entry (when that file exists),
/// `beads.db`, then the lexicographically first `*.db`.
///
/// # Errors
///
/// Returns `RepositoryNotFound` when no database file exists, or
/// `RepositoryUnavailable` when the directory exists but cannot be listed.
pub fn locate_database(beads_dir: &Path) -> Result<PathBuf> {
    let metadata = Metadata::load(beads_dir)?;
    if let Some(name) = metadata.database.as_deref() {
        let path = resolve_in(beads_dir, name);
        if path.is_file() {
            return Ok(path);
        }
        debug!(path = %path.display(), "Database named in metadata.json is missing");
    }

    let default = beads_dir.join(DEFAULT_DB_FILENAME);
    if default.is_file() {
        return Ok(default);
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(beads_dir)
        .map_err(|err| read_dir_error(beads_dir, &err))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "db"))
        .collect();
    candidates.sort();

    if candidates.len() > 1 {
        warn!(
            count = candidates.len(),
            chosen = %candidates[0].display(),
            "Multiple database files found, using the first"
        );
    }

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ReadyError::RepositoryNotFound {
            path: beads_dir.to_path_buf(),
        })
}

/// A missing directory means no repository; any other failure (permissions,
/// not a directory, I/O) is the repository being unreadable.
fn read_dir_error(dir: &Path, err: &io::Error) -> ReadyError {
    if err.kind() == io::ErrorKind::NotFound {
        ReadyError::RepositoryNotFound {
            path: dir.to_path_buf(),
        }
    } else {
        ReadyError::unavailable(format!("cannot list {}: {err}", dir.display()))
    }
}

/// Find the JSONL export in the beads directory.
///
/// Prefers the `metadata.json` entry, then `issues.jsonl`, then the legacy
/// `beads.jsonl`.
#[must_use]
pub fn discover_jsonl(beads_dir: &Path) -> Option<PathBuf> {
    if let Ok(Metadata {
        jsonl_export: Some(name),
        ..
    }) = Metadata::load(beads_dir)
    {
        let path = resolve_in(beads_dir, &name);
        if path.is_file() {
            return Some(path);
        }
    }

    [DEFAULT_JSONL_FILENAME, LEGACY_JSONL_FILENAME]
        .iter()
        .map(|name| beads_dir.join(name))
        .find(|path| path.is_file())
}

/// One source of configuration, flattened to dotted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        let mut flat = HashMap::new();
        flatten_yaml(&value, "", &mut flat);

        let mut layer = Self::default();
        for (key, value) in flat {
            layer.insert(&key, value);
        }
        Ok(layer)
    }

    /// Build a layer from `BREADY_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix("BREADY_") {
                for variant in env_key_variants(stripped) {
                    layer.insert(&variant, value.clone());
                }
            }
        }
        layer
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(normalize_key(key), value);
    }

    /// First non-empty value among `keys`.
    #[must_use]
    pub fn get(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.values.get(&normalize_key(key)))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

/// CLI overrides for config loading.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub jsonl: Option<PathBuf>,
    pub lock_timeout: Option<u64>,
    pub no_color: Option<bool>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.insert("db", path.to_string_lossy().to_string());
        }
        if let Some(path) = &self.jsonl {
            layer.insert("jsonl", path.to_string_lossy().to_string());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer.insert("lock-timeout", lock_timeout.to_string());
        }
        if let Some(no_color) = self.no_color {
            layer.insert("no-color", no_color.to_string());
        }

        layer
    }
}

/// Load user config (~/.config/bready/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("bready")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Load project config (.beads/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(beads_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&beads_dir.join("config.yaml"))
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("lock-timeout", DEFAULT_LOCK_TIMEOUT_MS.to_string());
    layer.insert("blocking-types", DependencyType::Blocks.to_string());
    layer
}

/// Load configuration with the documented precedence.
///
/// `beads_dir` is optional so that explicit `--db`/`--jsonl` paths work
/// outside any workspace.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(beads_dir: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    let project = match beads_dir {
        Some(dir) => load_project_config(dir)?,
        None => ConfigLayer::default(),
    };

    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        project,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

#[must_use]
pub fn readiness_config_from_layer(layer: &ConfigLayer) -> ReadinessConfig {
    layer
        .get(&["readiness.blocking-types", "blocking-types"])
        .map_or_else(ReadinessConfig::default, ReadinessConfig::from_list)
}

#[must_use]
pub fn db_override_from_layer(layer: &ConfigLayer) -> Option<PathBuf> {
    layer.get(&["db", "database"]).map(PathBuf::from)
}

#[must_use]
pub fn jsonl_override_from_layer(layer: &ConfigLayer) -> Option<PathBuf> {
    layer.get(&["jsonl"]).map(PathBuf::from)
}

/// Busy timeout for the SQLite adapter.
///
/// # Errors
///
/// Returns a config error if the value is not a whole number of milliseconds.
pub fn lock_timeout_from_layer(layer: &ConfigLayer) -> Result<Duration> {
    parse_millis(layer, "lock-timeout")
        .map(|ms| Duration::from_millis(ms.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS)))
}

/// Optional overall deadline for a query.
///
/// # Errors
///
/// Returns a config error if the value is not a whole number of milliseconds.
pub fn deadline_from_layer(layer: &ConfigLayer) -> Result<Option<Duration>> {
    Ok(parse_millis(layer, "deadline-ms")?
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis))
}

fn parse_millis(layer: &ConfigLayer, key: &str) -> Result<Option<u64>> {
    layer
        .get(&[key])
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| ReadyError::Config(format!("{key} must be milliseconds, got '{value}'")))
        })
        .transpose()
}

/// Whether to colorize terminal output.
#[must_use]
pub fn should_use_color(layer: &ConfigLayer) -> bool {
    if layer.get(&["no-color"]).and_then(parse_bool) == Some(true) {
        return false;
    }
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn env_key_variants(raw: &str) -> Vec<String> {
    let raw_lower = raw.to_lowercase();
    vec![raw_lower.replace('_', "-"), raw_lower.replacen('_', ".", 1)]
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
