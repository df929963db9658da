//! Configuration schema for docweave.
//!
//! Read from a YAML file; every field is optional.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["docweave.yaml", ".docweave.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Spaces per indentation level (default: 4)
    #[serde(default = "default_indent_unit")]
    pub indent_unit: usize,
    /// Glob patterns for paths to skip (e.g., "**/Migrations/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Include `*.g.cs` and `*.Designer.cs` files (default: false)
    #[serde(default)]
    pub include_generated: bool,
    /// Write summaries for types (default: true)
    #[serde(default = "default_true")]
    pub document_structures: bool,
    /// Write summaries for methods and constructors (default: true)
    #[serde(default = "default_true")]
    pub document_methods: bool,
    /// Replace documentation that already exists instead of keeping it (default: false)
    #[serde(default)]
    pub regenerate_existing: bool,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_unit: default_indent_unit(),
            excluded_paths: Vec::new(),
            include_generated: false,
            document_structures: true,
            document_methods: true,
            regenerate_existing: false,
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config at `path`, or the first default-named file in `dir`,
    /// or the built-in defaults.
    pub fn load(path: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        let found = match path {
            Some(p) => Some(p.to_path_buf()),
            None => discover(dir),
        };

        let config = match found {
            Some(p) => {
                log::debug!("using config {}", p.display());
                Self::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("failed to load {}: {}", p.display(), e))?
            }
            None => {
                log::debug!("no config file found, using defaults");
                Self::default()
            }
        };

        validate(&config)?;
        Ok(config)
    }

    /// Compile `excluded_paths` into one matcher (`**` crosses directories).
    pub fn exclusion_set(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

/// Find a default-named config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Which summary generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Rule-based text derived from identifiers.
    #[default]
    Template,
    /// Remote service reached over HTTP.
    Http,
}

/// Settings for the summary generator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub kind: GeneratorKind,
    /// URL the http generator POSTs to
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Per-request timeout in milliseconds (default: 10000)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Maximum requests in flight (default: 8)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Environment variable holding a bearer token
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::Template,
            endpoint: None,
            timeout_ms: default_timeout(),
            concurrency: default_concurrency(),
            api_key_env: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_indent_unit() -> usize {
    4
}

fn default_timeout() -> u64 {
    10_000
}

fn default_concurrency() -> usize {
    8
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.indent_unit == 0 {
        anyhow::bail!("indent_unit must be at least 1");
    }

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    let generator = &config.generator;
    if generator.concurrency == 0 {
        anyhow::bail!("generator.concurrency must be at least 1");
    }
    if generator.kind == GeneratorKind::Http {
        match generator.endpoint.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
            Some(url) => anyhow::bail!("generator.endpoint {:?} is not an http(s) URL", url),
            None => anyhow::bail!("generator.kind is http but no endpoint is set"),
        }
    }

    Ok(())
}
