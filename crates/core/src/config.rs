//! Layered configuration: built-in defaults < `ark-index.toml` < `ARK_INDEX_*` env vars.
//!
//! [`BuildConfig`] is both the on-disk/env-loaded settings object and the
//! builder's invocation parameters — there is no separate "app config" type.

use crate::error::BuilderError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub force: bool,
    pub ark_dir: String,
    pub repo_root: PathBuf,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub max_file_kb: u64,
    pub max_files: usize,
    pub respect_gitignore: bool,
    pub follow_symlinks: bool,
    pub adapters: Vec<String>,
    pub verbose: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            force: false,
            ark_dir: ".ark/index".to_string(),
            repo_root: PathBuf::from("."),
            include_globs: vec!["**/*".to_string()],
            exclude_globs: Vec::new(),
            max_file_kb: 512,
            max_files: 50_000,
            respect_gitignore: true,
            follow_symlinks: false,
            adapters: Vec::new(),
            verbose: false,
        }
    }
}

/// On-disk shape of `ark-index.toml`. Every field optional; absent fields keep defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    force: Option<bool>,
    ark_dir: Option<String>,
    include_globs: Option<Vec<String>>,
    exclude_globs: Option<Vec<String>>,
    max_file_kb: Option<u64>,
    max_files: Option<usize>,
    respect_gitignore: Option<bool>,
    follow_symlinks: Option<bool>,
    adapters: Option<Vec<String>>,
    verbose: Option<bool>,
}

impl FileConfig {
    fn apply(self, cfg: &mut BuildConfig) {
        if let Some(v) = self.force {
            cfg.force = v;
        }
        if let Some(v) = self.ark_dir {
            cfg.ark_dir = v;
        }
        if let Some(v) = self.include_globs {
            cfg.include_globs = v;
        }
        if let Some(v) = self.exclude_globs {
            cfg.exclude_globs = v;
        }
        if let Some(v) = self.max_file_kb {
            cfg.max_file_kb = v;
        }
        if let Some(v) = self.max_files {
            cfg.max_files = v;
        }
        if let Some(v) = self.respect_gitignore {
            cfg.respect_gitignore = v;
        }
        if let Some(v) = self.follow_symlinks {
            cfg.follow_symlinks = v;
        }
        if let Some(v) = self.adapters {
            cfg.adapters = v;
        }
        if let Some(v) = self.verbose {
            cfg.verbose = v;
        }
    }
}

/// Load configuration for `repo_root`, given an optional explicit config path.
///
/// A missing config file is not an error. An unparseable one is
/// [`BuilderError::ConfigError`], fatal, raised before any discovery work starts.
pub fn load_config(repo_root: &Path, explicit_path: Option<&Path>) -> Result<BuildConfig, BuilderError> {
    let mut cfg = BuildConfig { repo_root: repo_root.to_path_buf(), ..BuildConfig::default() };

    let candidate = explicit_path.map(Path::to_path_buf).unwrap_or_else(|| repo_root.join("ark-index.toml"));
    if candidate.exists() {
        let text = std::fs::read_to_string(&candidate)
            .map_err(|source| BuilderError::ReadError { path: candidate.clone(), source })?;
        let parsed: FileConfig = toml::from_str(&text)
            .map_err(|e| BuilderError::ConfigError { path: candidate.clone(), message: e.to_string() })?;
        parsed.apply(&mut cfg);
    }

    apply_env_overrides(&mut cfg, &std::env::vars().collect())?;
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut BuildConfig, env: &HashMap<String, String>) -> Result<(), BuilderError> {
    const PREFIX: &str = "ARK_INDEX_";

    let parse_bool = |key: &str, raw: &str| -> Result<bool, BuilderError> {
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(BuilderError::ConfigError {
                path: PathBuf::from(format!("env:{key}")),
                message: format!("cannot parse '{raw}' as bool"),
            }),
        }
    };
    let parse_list = |raw: &str| -> Vec<String> {
        raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
    };

    if let Some(v) = env.get(&format!("{PREFIX}FORCE")) {
        cfg.force = parse_bool("FORCE", v)?;
    }
    if let Some(v) = env.get(&format!("{PREFIX}ARK_DIR")) {
        cfg.ark_dir = v.clone();
    }
    if let Some(v) = env.get(&format!("{PREFIX}INCLUDE_GLOBS")) {
        cfg.include_globs = parse_list(v);
    }
    if let Some(v) = env.get(&format!("{PREFIX}EXCLUDE_GLOBS")) {
        cfg.exclude_globs = parse_list(v);
    }
    if let Some(v) = env.get(&format!("{PREFIX}MAX_FILE_KB")) {
        cfg.max_file_kb = v.parse().map_err(|_| BuilderError::ConfigError {
            path: PathBuf::from("env:MAX_FILE_KB"),
            message: format!("cannot parse '{v}' as an integer"),
        })?;
    }
    if let Some(v) = env.get(&format!("{PREFIX}MAX_FILES")) {
        cfg.max_files = v.parse().map_err(|_| BuilderError::ConfigError {
            path: PathBuf::from("env:MAX_FILES"),
            message: format!("cannot parse '{v}' as an integer"),
        })?;
    }
    if let Some(v) = env.get(&format!("{PREFIX}RESPECT_GITIGNORE")) {
        cfg.respect_gitignore = parse_bool("RESPECT_GITIGNORE", v)?;
    }
    if let Some(v) = env.get(&format!("{PREFIX}FOLLOW_SYMLINKS")) {
        cfg.follow_symlinks = parse_bool("FOLLOW_SYMLINKS", v)?;
    }
    if let Some(v) = env.get(&format!("{PREFIX}ADAPTERS")) {
        cfg.adapters = parse_list(v);
    }
    if let Some(v) = env.get(&format!("{PREFIX}VERBOSE")) {
        cfg.verbose = parse_bool("VERBOSE", v)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_with_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.max_file_kb, 512);
        assert_eq!(cfg.include_globs, vec!["**/*".to_string()]);
        assert!(cfg.respect_gitignore);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ark-index.toml"), "max_file_kb = 64\nrespect_gitignore = false\n").unwrap();
        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.max_file_kb, 64);
        assert!(!cfg.respect_gitignore);
    }

    #[test]
    fn unparseable_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ark-index.toml"), "max_file_kb = [not valid").unwrap();
        let err = load_config(dir.path(), None).unwrap_err();
        assert!(matches!(err, BuilderError::ConfigError { .. }));
    }

    #[test]
    fn env_override_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ark-index.toml"), "max_file_kb = 64\n").unwrap();
        let mut cfg = load_config(dir.path(), None).unwrap();
        let mut env = HashMap::new();
        env.insert("ARK_INDEX_MAX_FILE_KB".to_string(), "128".to_string());
        apply_env_overrides(&mut cfg, &env).unwrap();
        assert_eq!(cfg.max_file_kb, 128);
    }

    #[test]
    fn invalid_env_bool_is_fatal() {
        let mut cfg = BuildConfig::default();
        let mut env = HashMap::new();
        env.insert("ARK_INDEX_RESPECT_GITIGNORE".to_string(), "maybe".to_string());
        assert!(apply_env_overrides(&mut cfg, &env).is_err());
    }
}
