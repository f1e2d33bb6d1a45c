use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;

use crate::parser::tables::DEFAULT_THRESHOLD;

const CONFIG_FILE: &str = "numerals.toml";
const ENV_PREFIX: &str = "NUMERALS";

/// Run settings: defaults, then `numerals.toml` (or `--config`), then
/// `NUMERALS_*` environment variables. CLI flags are applied on top by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Class attribute marking candidate tables.
    pub table_class: String,
    pub threshold: usize,
    /// Regex a link target must match to count as a catalog link.
    pub catalog_pattern: String,
    /// File names excluded from the corpus.
    pub skip: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            table_class: "MsoTableGrid".to_string(),
            threshold: DEFAULT_THRESHOLD,
            catalog_pattern: r"https?://www\.ethnologue\.com/".to_string(),
            skip: vec![
                "How-to-view-EN.htm".to_string(),
                "How-to-view-CH.htm".to_string(),
                "problem.html".to_string(),
            ],
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::new(CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let settings = Config::builder()
            .set_default("table_class", defaults.table_class)?
            .set_default("threshold", defaults.threshold as u64)?
            .set_default("catalog_pattern", defaults.catalog_pattern)?
            .set_default("skip", defaults.skip)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("skip"),
            )
            .build()
            .context("Failed to load settings")?
            .try_deserialize::<Settings>()
            .context("Invalid settings")?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_class.trim().is_empty() {
            bail!("table_class must not be empty");
        }
        if self.threshold == 0 {
            bail!("threshold must be at least 1");
        }
        self.catalog_regex()?;
        Ok(())
    }

    pub fn catalog_regex(&self) -> Result<Regex> {
        Regex::new(&self.catalog_pattern)
            .with_context(|| format!("Invalid catalog_pattern {:?}", self.catalog_pattern))
    }
}
