//! Credential configuration: a single API key in `~/.conjure/config.toml`.
//!
//! Environment variables override the file and suppress the first-run prompt.

use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Config {
    /// Loads configuration from file and environment.
    ///
    /// `CONJURE_API_KEY` or `ANTHROPIC_API_KEY` take precedence over the
    /// config file.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) => Self::load_from(&path).unwrap_or_else(|_| {
                info!("No config file found, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        };

        if let Ok(api_key) = std::env::var("CONJURE_API_KEY") {
            config.api_key = Some(api_key);
        } else if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
            config.api_key = Some(api_key);
        }

        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            info!("Loaded config from: {}", path.display());
            Ok(config)
        } else {
            Err(anyhow!("Config file not found"))
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved config to: {}", path.display());
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".conjure").join("config.toml"))
    }

    /// Guarantees a credential exists, prompting and persisting if absent.
    ///
    /// Called unconditionally before any API operation. The stored value is
    /// handed to the backend and never inspected elsewhere.
    pub fn ensure_configured() -> Result<Self> {
        let config = Self::load()?;
        if config.api_key.is_some() {
            return Ok(config);
        }

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        Self::prompt_and_store_with_io(&mut input, &mut output)
    }

    /// Forces re-entry of the credential, overwriting any stored value.
    pub fn reconfigure() -> Result<Self> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        Self::prompt_and_store_with_io(&mut input, &mut output)
    }

    /// Prompts for an API key on the given streams and persists it.
    pub fn prompt_and_store_with_io<R: BufRead, W: Write>(
        input: &mut R,
        output: &mut W,
    ) -> Result<Self> {
        loop {
            write!(output, "Anthropic API key: ")?;
            output.flush()?;

            let mut line = String::new();
            input.read_line(&mut line)?;
            let key = line.trim();

            if key.is_empty() {
                writeln!(output, "The API key cannot be empty.")?;
                continue;
            }

            let config = Config {
                api_key: Some(key.to_string()),
            };
            config.save()?;
            writeln!(output, "API key saved.")?;
            return Ok(config);
        }
    }
}
