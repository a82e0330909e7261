use std::path::{Path, PathBuf};
use std::env;
use std::fs;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::CompilerError;

const INDENT_VAR: &str = "JACK_INDENT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// One indentation unit of the trace.
    pub indent: String,
    /// Escape `<`, `>`, `&` and `"` in leaf text.
    pub escape: bool,
    /// Extension of source files picked up when analyzing a directory.
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent: String::from("\t"),
            escape: true,
            extension: String::from("jack"),
        }
    }
}

impl Config {
    /// Reads the config file if there is one, then applies `JACK_INDENT`.
    pub fn load() -> Result<Self, CompilerError> {
        let mut config = match Self::get_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Config::default(),
        };

        if let Ok(spaces) = env::var(INDENT_VAR) {
            config.indent = indent_from_env(&spaces)?;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CompilerError> {
        let contents = fs::read_to_string(path).map_err(|e| CompilerError::io(path, e))?;
        let config = serde_json::from_str(&contents).map_err(|e| CompilerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), CompilerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CompilerError::io(parent, e))?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| CompilerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, contents).map_err(|e| CompilerError::io(path, e))
    }

    /// `$JACK_CONFIG`, else `~/.jack-analyzer/config.json`.
    pub fn get_config_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var("JACK_CONFIG") {
            return Some(PathBuf::from(custom));
        }

        let home = if cfg!(windows) {
            env::var("USERPROFILE")
        } else {
            env::var("HOME")
        };

        home.ok()
            .map(|home| PathBuf::from(home).join(".jack-analyzer").join("config.json"))
    }
}

/// `JACK_INDENT` holds a number of spaces.
fn indent_from_env(value: &str) -> Result<String, CompilerError> {
    let width = value.trim().parse::<usize>().map_err(|e| CompilerError::Env {
        var: INDENT_VAR,
        message: format!("expected a number of spaces, got {:?}: {}", value, e),
    })?;
    Ok(" ".repeat(width))
}
