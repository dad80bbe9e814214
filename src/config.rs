use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RhttpError, Result};
use crate::size::parse_size_bytes;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const DEFAULT_ACCEPT: &str = "*/*";
pub const DEFAULT_PRINT_LIMIT: usize = 100 * 1024;

/// Config as read from disk: every field is optional so files can be layered.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: Option<HistoryConfig>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HistoryConfig {
    pub dir: Option<PathBuf>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HttpConfig {
    pub timeout: Option<u64>,
    pub accept: Option<String>,
    pub print_limit: Option<String>,
}

/// Config with every default filled in.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub history: ResolvedHistoryConfig,
    pub http: ResolvedHttpConfig,
}

#[derive(Clone, Debug)]
pub struct ResolvedHistoryConfig {
    pub dir: PathBuf,
    pub limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedHttpConfig {
    pub timeout: u64,
    pub accept: String,
    /// `None` means no limit.
    pub print_limit: Option<usize>,
}

impl Default for ResolvedHttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            accept: DEFAULT_ACCEPT.to_string(),
            print_limit: Some(DEFAULT_PRINT_LIMIT),
        }
    }
}

impl ResolvedConfig {
    pub fn from_config(config: &Config, home: Option<&Path>) -> Result<Self> {
        let default_dir = match home {
            Some(home) => home.join(".rhttp").join("history"),
            None => PathBuf::from(".rhttp").join("history"),
        };
        let mut history = ResolvedHistoryConfig {
            dir: default_dir,
            limit: DEFAULT_LIST_LIMIT,
        };
        let mut http = ResolvedHttpConfig::default();

        if let Some(cfg) = &config.history {
            history.apply(cfg, home);
        }
        if let Some(cfg) = &config.http {
            http.apply(cfg)?;
        }
        Ok(Self { history, http })
    }
}

impl ResolvedHistoryConfig {
    fn apply(&mut self, cfg: &HistoryConfig, home: Option<&Path>) {
        if let Some(value) = cfg.dir.as_ref() {
            self.dir = expand_home(value, home);
        }
        if let Some(value) = cfg.limit.filter(|limit| *limit > 0) {
            self.limit = value;
        }
    }
}

impl ResolvedHttpConfig {
    fn apply(&mut self, cfg: &HttpConfig) -> Result<()> {
        if let Some(value) = cfg.timeout.filter(|secs| *secs > 0) {
            self.timeout = value;
        }
        if let Some(value) = cfg.accept.clone() {
            self.accept = value;
        }
        if let Some(value) = cfg.print_limit.as_deref() {
            self.print_limit = parse_size_bytes(value)?;
        }
        Ok(())
    }
}

/// Loads and merges every config file that exists, then `explicit` (which must exist).
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();
    for path in config_search_paths() {
        if !path.is_file() {
            continue;
        }
        log::debug!("Reading config {}", path.display());
        merge_config(&mut config, read_config_file(&path)?);
    }
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(RhttpError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        log::debug!("Reading config {}", path.display());
        merge_config(&mut config, read_config_file(path)?);
    }
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    toml::from_str(&contents)
        .map_err(|err| RhttpError::Config(format!("failed to parse {}: {}", path.display(), err)))
}

fn merge_config(base: &mut Config, other: Config) {
    merge_section(&mut base.history, other.history, HistoryConfig::merge);
    merge_section(&mut base.http, other.http, HttpConfig::merge);
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
    if let Some(other_section) = other {
        match base {
            Some(existing) => merge(existing, other_section),
            None => *base = Some(other_section),
        }
    }
}

impl HistoryConfig {
    fn merge(&mut self, other: HistoryConfig) {
        merge_opt(&mut self.dir, other.dir);
        merge_opt(&mut self.limit, other.limit);
    }
}

impl HttpConfig {
    fn merge(&mut self, other: HttpConfig) {
        merge_opt(&mut self.timeout, other.timeout);
        merge_opt(&mut self.accept, other.accept);
        merge_opt(&mut self.print_limit, other.print_limit);
    }
}

fn merge_opt<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(home) = home_dir() {
        if let Some(config_home) = config_home_dir(&home) {
            paths.push(config_home.join("rhttp").join("rhttp.toml"));
        }
        if let Some(appdata) = env::var_os("APPDATA") {
            paths.push(PathBuf::from(appdata).join("rhttp").join("rhttp.toml"));
        }
        paths.push(home.join(".rhttprc"));
    }

    if let Ok(cwd) = env::current_dir() {
        let mut dirs: Vec<&Path> = cwd.ancestors().collect();
        dirs.reverse();
        for dir in dirs {
            paths.push(dir.join(".rhttprc"));
            paths.push(dir.join("rhttp.toml"));
        }
    }

    paths
}

fn config_home_dir(home: &Path) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    Some(home.join(".config"))
}

pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_config() {
        let resolved = ResolvedConfig::from_config(&Config::default(), Some(Path::new("/home/u"))).unwrap();
        assert_eq!(resolved.history.dir, PathBuf::from("/home/u/.rhttp/history"));
        assert_eq!(resolved.history.limit, DEFAULT_LIST_LIMIT);
        assert_eq!(resolved.http, ResolvedHttpConfig::default());
    }

    #[test]
    fn later_files_override_earlier_fields() {
        let mut base: Config = toml::from_str("[http]\ntimeout = 5\naccept = \"text/plain\"\n").unwrap();
        let other: Config = toml::from_str("[http]\ntimeout = 9\n[history]\nlimit = 3\n").unwrap();
        merge_config(&mut base, other);

        let http = base.http.unwrap();
        assert_eq!(http.timeout, Some(9));
        assert_eq!(http.accept.as_deref(), Some("text/plain"));
        assert_eq!(base.history.unwrap().limit, Some(3));
    }

    #[test]
    fn history_dir_expands_tilde() {
        let config: Config = toml::from_str("[history]\ndir = \"~/records\"\n").unwrap();
        let resolved = ResolvedConfig::from_config(&config, Some(Path::new("/home/u"))).unwrap();
        assert_eq!(resolved.history.dir, PathBuf::from("/home/u/records"));
    }

    #[test]
    fn print_limit_accepts_unlimited() {
        let config: Config = toml::from_str("[http]\nprint_limit = \"unlimited\"\n").unwrap();
        let resolved = ResolvedConfig::from_config(&config, None).unwrap();
        assert_eq!(resolved.http.print_limit, None);
    }

    #[test]
    fn zero_values_keep_defaults() {
        let config: Config = toml::from_str("[http]\ntimeout = 0\n[history]\nlimit = 0\n").unwrap();
        let resolved = ResolvedConfig::from_config(&config, None).unwrap();
        assert_eq!(resolved.http.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(resolved.history.limit, DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn explicit_config_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        assert!(matches!(load_config(Some(&missing)), Err(RhttpError::Config(_))));
    }

    #[test]
    fn malformed_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[http\ntimeout = ").unwrap();
        assert!(matches!(read_config_file(&path), Err(RhttpError::Config(_))));
    }
}
