//! Configuration loading and parsing
//!
//! Loads `serval.toml`: per-rule severity overrides (accepting `"off"`,
//! `"warn"`, `"error"` and the numeric aliases `0`/`1`/`2`) and extra
//! pre-declared global identifier names. Resolution happens before analysis
//! starts; the engine itself only ever sees the resolved severity map and
//! global-name set.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::Error as _;

use crate::diagnostic::Severity;

pub const CONFIG_FILENAME: &str = "serval.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["include", "exclude", "globals", "rules"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}

/// A rule severity as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityValue {
    Off,
    Warn,
    Error,
}

impl SeverityValue {
    /// The diagnostic severity, or `None` for a disabled rule.
    pub fn to_severity(self) -> Option<Severity> {
        match self {
            SeverityValue::Off => None,
            SeverityValue::Warn => Some(Severity::Warning),
            SeverityValue::Error => Some(Severity::Error),
        }
    }
}

impl<'de> Deserialize<'de> for SeverityValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(0) => Ok(SeverityValue::Off),
            Raw::Number(1) => Ok(SeverityValue::Warn),
            Raw::Number(2) => Ok(SeverityValue::Error),
            Raw::Number(other) => Err(D::Error::custom(format!(
                "invalid severity {other}, expected 0, 1 or 2"
            ))),
            Raw::Name(name) => match name.as_str() {
                "off" => Ok(SeverityValue::Off),
                "warn" | "warning" => Ok(SeverityValue::Warn),
                "error" => Ok(SeverityValue::Error),
                other => Err(D::Error::custom(format!(
                    "invalid severity '{other}', expected 'off', 'warn' or 'error'"
                ))),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Extra global identifier names, merged with the built-in set.
    pub globals: Vec<String>,
    /// Per-rule severity overrides, keyed by rule name.
    pub rules: HashMap<String, SeverityValue>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    Ok(ConfigResult {
        warnings: detect_unknown_keys(&content),
        config,
    })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    for key in table.keys() {
        if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
            warnings.push(format!("Unknown config option: '{key}'"));
        }
    }

    warnings
}

pub fn load_config_or_default(start_dir: &Path) -> Config {
    find_config_file(start_dir)
        .and_then(|path| load_config(&path).ok())
        .unwrap_or_default()
}

pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path).unwrap_or_default(),
        None => ConfigResult::default(),
    }
}

/// The built-in global identifier names: the ECMAScript standard library
/// plus the host names shared by browsers and Node.
pub fn default_globals() -> HashSet<String> {
    const NAMES: &[&str] = &[
        // ECMAScript
        "Array",
        "ArrayBuffer",
        "BigInt",
        "Boolean",
        "DataView",
        "Date",
        "Error",
        "EvalError",
        "Function",
        "Intl",
        "JSON",
        "Map",
        "Math",
        "Number",
        "Object",
        "Promise",
        "Proxy",
        "RangeError",
        "ReferenceError",
        "Reflect",
        "RegExp",
        "Set",
        "String",
        "Symbol",
        "SyntaxError",
        "TypeError",
        "URIError",
        "WeakMap",
        "WeakRef",
        "WeakSet",
        "decodeURI",
        "decodeURIComponent",
        "encodeURI",
        "encodeURIComponent",
        "eval",
        "globalThis",
        "isFinite",
        "isNaN",
        "parseFloat",
        "parseInt",
        // shared host globals
        "AbortController",
        "Blob",
        "Buffer",
        "TextDecoder",
        "TextEncoder",
        "URL",
        "URLSearchParams",
        "clearImmediate",
        "clearInterval",
        "clearTimeout",
        "console",
        "crypto",
        "document",
        "exports",
        "fetch",
        "module",
        "navigator",
        "performance",
        "process",
        "queueMicrotask",
        "require",
        "setImmediate",
        "setInterval",
        "setTimeout",
        "structuredClone",
        "window",
    ];
    NAMES.iter().map(|s| s.to_string()).collect()
}
