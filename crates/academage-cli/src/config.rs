//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use academage_core::model::AgeEncoding;
use academage_core::norms::NormRegistry;

/// Top-level academage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademageConfig {
    /// Encoding used by `age` when none is given.
    #[serde(default = "default_encoding")]
    pub default_encoding: AgeEncoding,
    /// Directory of extra norm files layered over the built-in tables.
    #[serde(default)]
    pub norms_dir: Option<PathBuf>,
    /// Output directory for batch reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_encoding() -> AgeEncoding {
    AgeEncoding::Months
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./academage-results")
}

impl Default for AcademageConfig {
    fn default() -> Self {
        Self {
            default_encoding: default_encoding(),
            norms_dir: None,
            output_dir: default_output_dir(),
        }
    }
}

impl AcademageConfig {
    /// The built-in norm tables, plus `norms_dir` if one is configured.
    pub fn registry(&self) -> Result<NormRegistry> {
        match &self.norms_dir {
            Some(dir) => NormRegistry::with_directory(dir)
                .with_context(|| format!("failed to load norms from {}", dir.display())),
            None => Ok(NormRegistry::builtin().clone()),
        }
    }
}

/// Expand `${VAR_NAME}` references from the environment.
///
/// Unset variables expand to nothing. Expanded values are not expanded
/// again, and an unterminated `${` is kept as written.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `academage.toml` in the current directory
/// 2. `~/.config/academage/config.toml`
///
/// Environment variable overrides: `ACADEMAGE_NORMS_DIR`, `ACADEMAGE_ENCODING`.
pub fn load_config_from(path: Option<&Path>) -> Result<AcademageConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("academage.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<AcademageConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => AcademageConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("ACADEMAGE_NORMS_DIR") {
        config.norms_dir = Some(PathBuf::from(dir));
    }
    if let Ok(encoding) = std::env::var("ACADEMAGE_ENCODING") {
        config.default_encoding = encoding
            .parse()
            .map_err(|e: String| anyhow::anyhow!("ACADEMAGE_ENCODING: {}", e))?;
    }

    config.norms_dir = config.norms_dir.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("academage"))
}
