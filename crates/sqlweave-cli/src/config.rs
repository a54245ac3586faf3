use serde::Deserialize;
use sqlweave::dialect::{DIALECT_NAMES, DialectOptions};
use sqlweave::where_clause::{CompilerConfig, DEFAULT_POOL_CAPACITY};
use sqlweave::{Weaver, WeaverConfig};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// `None` when running on defaults because no file was found.
    pub config_path: Option<PathBuf>,
    pub file: ConfigFile,
}

impl ProjectConfig {
    /// Load the file named by `global.config`.
    ///
    /// A missing file is only an error when `--config` was given explicitly.
    pub fn load(global: &GlobalArgs) -> anyhow::Result<Self> {
        if !global.config_explicit && !global.config.exists() {
            let mut file = ConfigFile::default();
            file.apply_overrides(global)?;
            return Ok(Self {
                config_path: None,
                file,
            });
        }
        let mut loaded = Self::load_file(&global.config)?;
        loaded.file.apply_overrides(global)?;
        Ok(loaded)
    }

    pub fn load_file(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to load config file {}: {e}",
                config_path.display()
            )
        })?;

        Ok(Self {
            config_path: Some(config_path.to_path_buf()),
            file,
        })
    }

    pub fn weaver(&self) -> anyhow::Result<Weaver> {
        let options = DialectOptions::new()
            .standard_conforming_strings(self.file.postgres.standard_conforming_strings);
        let config = WeaverConfig::new()
            .compiler(CompilerConfig::new().pool_capacity(self.file.where_clause.pool_capacity));
        Ok(Weaver::by_name_with_options(&self.file.dialect, options)?.config(config))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default = "default_dialect")]
    pub dialect: String,

    #[serde(default)]
    pub postgres: PostgresConfig,

    #[serde(default, rename = "where")]
    pub where_clause: WhereConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            postgres: PostgresConfig::default(),
            where_clause: WhereConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostgresConfig {
    #[serde(default = "default_true")]
    pub standard_conforming_strings: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            standard_conforming_strings: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhereConfig {
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,
}

impl Default for WhereConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

fn default_dialect() -> String {
    "postgres".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn apply_overrides(&mut self, global: &GlobalArgs) -> anyhow::Result<()> {
        if let Some(dialect) = &global.dialect {
            self.dialect = dialect.clone();
            self.validate()?;
        }
        Ok(())
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.dialect = expand_env_vars(&self.dialect)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        let dialect = self.dialect.trim().to_ascii_lowercase();
        let known = DIALECT_NAMES.contains(&dialect.as_str())
            || matches!(dialect.as_str(), "postgresql" | "pg" | "sqlite3" | "sqlserver");
        if !known {
            anyhow::bail!(
                "unsupported dialect: {} (expected one of: {})",
                self.dialect,
                DIALECT_NAMES.join(", ")
            );
        }

        if self.where_clause.pool_capacity == 0 {
            anyhow::bail!("where.pool_capacity must be at least 1");
        }

        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
