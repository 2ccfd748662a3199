//! CLI configuration loaded from `cellc.toml` files.

use crate::{CliError, Result};
use cell_javascript::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "cellc.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub compile: CompileConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Names treated as globals on top of the ES and Node.js built-ins
    pub extra_builtins: Vec<String>,
    /// Reject cells that are not a single, simple expression
    pub expr: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl CliConfig {
    /// Load configuration from `path`, or from the home directory
    /// `.cellc.toml` overlaid with `cellc.toml` in the working directory.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let mut config = Self::default();
        let candidates = [
            dirs::home_dir().map(|home| home.join(format!(".{CONFIG_FILE_NAME}"))),
            Some(PathBuf::from(CONFIG_FILE_NAME)),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                tracing::debug!("loading configuration from {}", path.display());
                config = config.merge(Self::load_from_file(&path)?);
            }
        }
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            CliError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Overlay `other` on this configuration. Builtin lists accumulate, flags
    /// are taken from `other`.
    pub fn merge(mut self, other: Self) -> Self {
        for name in other.compile.extra_builtins {
            if !self.compile.extra_builtins.contains(&name) {
                self.compile.extra_builtins.push(name);
            }
        }
        self.compile.expr = other.compile.expr;
        self.output.pretty = other.output.pretty;
        self
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig::default().with_builtins(self.compile.extra_builtins.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_when_sections_are_missing() {
        let config: CliConfig = toml::from_str("[output]\npretty = true\n").unwrap();
        assert_eq!(config.compile, CompileConfig::default());
        assert!(config.output.pretty);
    }

    #[test]
    fn loads_from_an_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[compile]\nextra_builtins = [\"plot\", \"data\"]\nexpr = true").unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.compile.extra_builtins, vec!["plot", "data"]);
        assert!(config.compile.expr);

        let analyzer = config.analyzer_config();
        assert!(analyzer.is_builtin("plot"));
        assert!(analyzer.is_builtin("Math"));
    }

    #[test]
    fn malformed_files_are_config_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[compile\nexpr = ").unwrap();
        let err = CliConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn merge_accumulates_builtins() {
        let base = CliConfig {
            compile: CompileConfig {
                extra_builtins: vec!["a".into(), "b".into()],
                expr: true,
            },
            output: OutputConfig { pretty: true },
        };
        let overlay = CliConfig {
            compile: CompileConfig {
                extra_builtins: vec!["b".into(), "c".into()],
                expr: false,
            },
            ..Default::default()
        };
        let merged = base.merge(overlay);
        assert_eq!(merged.compile.extra_builtins, vec!["a", "b", "c"]);
        assert!(!merged.compile.expr);
        assert!(!merged.output.pretty);
    }
}
