// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::Config;

pub const LOG_ENV: &str = "GREFFE_LOG";

pub fn log_filter(config: &Config, env_value: Option<&str>) -> Result<EnvFilter> {
    match env_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("parse {LOG_ENV}={directives:?} -- unset it or use e.g. \"debug\"")),
        None => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("parse log.level {:?}", config.log_level())),
    }
}

pub fn setup_tracing(config: &Config) -> Result<PathBuf> {
    let path = config.log_file()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })?;

    let env_value = env::var(LOG_ENV).ok();
    let filter = log_filter(config, env_value.as_deref())?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;

    info!(path = %path.display(), "tracing initialized");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{log_filter, setup_tracing};
    use crate::config::Config;
    use anyhow::Result;

    fn config_with_log(dir: &std::path::Path, level: &str) -> Result<Config> {
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            format!(
                "version = 1\n[log]\nlevel = \"{level}\"\nfile = \"{}\"\n",
                dir.join("logs").join("greffe.log").display()
            ),
        )?;
        Config::load(&path)
    }

    #[test]
    fn env_directives_override_config_level() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = config_with_log(temp.path(), "warn")?;

        assert_eq!(log_filter(&config, None)?.to_string(), "warn");
        assert_eq!(log_filter(&config, Some("  "))?.to_string(), "warn");
        assert_eq!(log_filter(&config, Some("debug"))?.to_string(), "debug");
        assert!(log_filter(&config, Some("greffe=verbose")).is_err());
        Ok(())
    }

    #[test]
    fn setup_writes_to_the_configured_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = config_with_log(temp.path(), "info")?;

        let path = setup_tracing(&config)?;
        assert_eq!(path, temp.path().join("logs").join("greffe.log"));
        tracing::info!(list = "regions", "probe line");

        let written = std::fs::read_to_string(&path)?;
        assert!(written.contains("tracing initialized"));
        assert!(written.contains("probe line"));
        Ok(())
    }
}
