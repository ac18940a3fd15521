//! Configuration file management for ais-decode.
//!
//! Reads/writes `~/.ais-decode/config.yaml` with reassembly, output, and
//! listener settings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use crate::types::AisError;

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub reassembly: ReassemblyConfig,
    pub output: OutputConfig,
    pub listen: ListenConfig,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReassemblyConfig {
    /// Evict an incomplete multi-sentence message after this many seconds
    /// without a new fragment. `None` keeps it until a conflict or end of input.
    pub idle_timeout_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub include_errors: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = AisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(AisError::Config(format!("unknown output format {other:?}"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reassembly: ReassemblyConfig {
                idle_timeout_secs: None,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                include_errors: false,
            },
            listen: ListenConfig {
                host: "0.0.0.0".into(),
                port: 10110,
            },
            log_level: "warn".into(),
        }
    }
}

/// Get the config directory path (`~/.ais-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".ais-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.ais-decode/config.yaml`.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

/// Load config from an explicit path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
            Config::default()
        }
    }
}

/// Save config to `~/.ais-decode/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, AisError> {
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save config to an explicit path, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), AisError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| AisError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| AisError::Config(e.to_string()))
}

/// Parse simple YAML-like config text. Unknown keys and bad values are ignored.
pub fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            if val.is_empty() {
                current_section = Some(key.to_string());
            } else {
                current_section = None;
                if key == "log_level" {
                    if let Some(v) = parse_string_value(val) {
                        config.log_level = v;
                    }
                }
            }
            continue;
        }

        let Some(section) = current_section.as_deref() else {
            continue;
        };
        match (section, key) {
            ("reassembly", "idle_timeout_secs") => {
                config.reassembly.idle_timeout_secs =
                    parse_float_value(val).filter(|v| *v > 0.0);
            }
            ("output", "format") => {
                if let Some(v) = parse_string_value(val) {
                    match v.parse() {
                        Ok(format) => config.output.format = format,
                        Err(e) => warn!(error = %e, "ignoring output.format"),
                    }
                }
            }
            ("output", "include_errors") => {
                if let Some(v) = parse_bool_value(val) {
                    config.output.include_errors = v;
                }
            }
            ("listen", "host") => {
                if let Some(v) = parse_string_value(val) {
                    config.listen.host = v;
                }
            }
            ("listen", "port") => {
                if let Ok(v) = val.parse::<u16>() {
                    config.listen.port = v;
                }
            }
            _ => {}
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

fn parse_bool_value(val: &str) -> Option<bool> {
    match val {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Serialize config to YAML-like text.
pub fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# ais-decode configuration".to_string(), String::new()];

    lines.push("reassembly:".into());
    match config.reassembly.idle_timeout_secs {
        Some(v) => lines.push(format!("  idle_timeout_secs: {v}")),
        None => lines.push("  idle_timeout_secs: null".into()),
    }
    lines.push(String::new());

    lines.push("output:".into());
    lines.push(format!("  format: {}", config.output.format));
    lines.push(format!("  include_errors: {}", config.output.include_errors));
    lines.push(String::new());

    lines.push("listen:".into());
    lines.push(format!("  host: \"{}\"", config.listen.host));
    lines.push(format!("  port: {}", config.listen.port));
    lines.push(String::new());

    lines.push(format!("log_level: \"{}\"", config.log_level));

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.reassembly.idle_timeout_secs.is_none());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.include_errors);
        assert_eq!(config.listen.port, 10110);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
reassembly:
  idle_timeout_secs: 30

output:
  format: json
  include_errors: true

listen:
  host: "127.0.0.1"
  port: 2000

log_level: "debug"
"#;
        let config = parse_config(text);
        assert_eq!(config.reassembly.idle_timeout_secs, Some(30.0));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.include_errors);
        assert_eq!(config.listen.host, "127.0.0.1");
        assert_eq!(config.listen.port, 2000);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_parse_config_null_and_bad_values() {
        let text = r#"
reassembly:
  idle_timeout_secs: null

output:
  format: xml
  include_errors: maybe

listen:
  port: 99999
"#;
        let config = parse_config(text);
        assert!(config.reassembly.idle_timeout_secs.is_none());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.include_errors);
        assert_eq!(config.listen.port, 10110);
    }

    #[test]
    fn test_zero_timeout_disables_eviction() {
        let config = parse_config("reassembly:\n  idle_timeout_secs: 0\n");
        assert!(config.reassembly.idle_timeout_secs.is_none());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert!(matches!("csv".parse::<OutputFormat>(), Err(AisError::Config(_))));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config {
            reassembly: ReassemblyConfig {
                idle_timeout_secs: Some(12.5),
            },
            output: OutputConfig {
                format: OutputFormat::Json,
                include_errors: true,
            },
            listen: ListenConfig {
                host: "::1".into(),
                port: 5000,
            },
            log_level: "ais_core=debug".into(),
        };
        let parsed = parse_config(&serialize_config(&config));
        assert_eq!(parsed, config);
    }
}
