//! Command-line arguments and layered configuration.
//!
//! Values are resolved in order: built-in defaults, an optional config file,
//! `MEMPOOL_`-prefixed environment variables, then command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use mempool_poller::{Output, Settings, DEFAULT_BASE_URL, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
use serde::Deserialize;

const ENV_PREFIX: &str = "MEMPOOL";

#[derive(Parser, Debug, Default)]
#[command(name = "mempool-watch")]
#[command(about = "Poll a mempool.space compatible API and print network statistics")]
pub struct Args {
    /// Path to a config file (TOML, JSON or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// API base URL, e.g. https://mempool.space
    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds between the end of one refresh and the start of the next
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Write every published snapshot to this JSON file
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Print the first snapshot and exit
    #[arg(long)]
    pub once: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatchConfig {
    pub base_url: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

impl WatchConfig {
    /// Resolve configuration from all layers, reading the process environment.
    pub fn load(args: &Args) -> Result<Self> {
        Self::load_with_env(args, None)
    }

    /// Like [`load`](Self::load), but with an explicit environment map.
    ///
    /// `None` reads the process environment.
    pub fn load_with_env(args: &Args, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("interval_secs", DEFAULT_INTERVAL.as_secs())?
            .set_default("timeout_secs", DEFAULT_TIMEOUT.as_secs())?;

        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.as_path()));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("base_url", args.base_url.clone())?
            .set_override_option("interval_secs", args.interval)?
            .set_override_option("timeout_secs", args.timeout)?
            .set_override_option(
                "output_file",
                args.output_file.as_ref().map(|p| p.display().to_string()),
            )?
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        if config.interval_secs == 0 {
            bail!("interval_secs must be greater than zero");
        }
        if config.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(config)
    }

    /// Convert into poller settings.
    pub fn into_settings(self) -> Settings {
        Settings {
            base_url: self.base_url,
            interval: Duration::from_secs(self.interval_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            outputs: self.output_file.into_iter().map(Output::file).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = WatchConfig::load_with_env(&Args::default(), no_env()).unwrap();

        assert_eq!(config.base_url, "https://mempool.space");
        assert_eq!(config.interval_secs, 300);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.output_file, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"https://mempool.example.org\"").unwrap();
        writeln!(file, "interval_secs = 60").unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = WatchConfig::load_with_env(&args, no_env()).unwrap();

        assert_eq!(config.base_url, "https://mempool.example.org");
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_env_overrides_file_and_flags_override_env() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "interval_secs = 60").unwrap();
        writeln!(file, "timeout_secs = 5").unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            timeout: Some(30),
            ..Default::default()
        };
        let config = WatchConfig::load_with_env(
            &args,
            env(&[("MEMPOOL_INTERVAL_SECS", "120"), ("MEMPOOL_TIMEOUT_SECS", "20")]),
        )
        .unwrap();

        assert_eq!(config.interval_secs, 120);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            config: Some(dir.path().join("absent.toml")),
            ..Default::default()
        };

        assert!(WatchConfig::load_with_env(&args, no_env()).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let args = Args {
            interval: Some(0),
            ..Default::default()
        };
        let err = WatchConfig::load_with_env(&args, no_env()).unwrap_err();
        assert!(err.to_string().contains("interval_secs"));
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "mempool-watch",
            "--base-url",
            "http://localhost:8999/",
            "-i",
            "30",
            "--output-file",
            "snapshot.json",
            "--once",
        ])
        .unwrap();

        assert_eq!(args.base_url.as_deref(), Some("http://localhost:8999/"));
        assert_eq!(args.interval, Some(30));
        assert!(args.once);

        let settings = WatchConfig::load_with_env(&args, no_env())
            .unwrap()
            .into_settings();
        assert_eq!(settings.base_url, "http://localhost:8999/");
        assert_eq!(settings.interval, Duration::from_secs(30));
        assert_eq!(settings.outputs.len(), 1);
    }
}
