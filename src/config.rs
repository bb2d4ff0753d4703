//! TOML configuration for the `trending` binary.
//!
//! ```toml
//! [db]
//! path = "./data/trending.sqlite"
//!
//! [input]
//! root = "./data/markdown"
//! include_globs = ["**/*.md"]
//! exclude_globs = []
//! follow_symlinks = false
//! ```

use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub input: InputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Where the daily Markdown listings live.
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.input.include_globs.is_empty() {
        anyhow::bail!("input.include_globs must contain at least one pattern");
    }

    for pattern in config
        .input
        .include_globs
        .iter()
        .chain(config.input.exclude_globs.iter())
    {
        Glob::new(pattern).with_context(|| format!("Invalid glob pattern: '{}'", pattern))?;
    }

    Ok(())
}
