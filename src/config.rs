use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::client::ClientConfig;

pub(crate) const CREDENTIAL_FILE: &str = "kaggle.json";
pub(crate) const DEFAULT_PROGRAM: &str = "kaggle";

pub(crate) fn load_config(
    config_dir: Option<PathBuf>,
    work_dir: Option<PathBuf>,
) -> Result<ClientConfig> {
    let config_dir = config_dir.unwrap_or_else(default_config_dir);

    let work_dir = match work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let work_dir = absolutize(&work_dir)?;

    Ok(ClientConfig {
        config_dir,
        work_dir,
        program: DEFAULT_PROGRAM.to_string(),
    })
}

fn default_config_dir() -> PathBuf {
    // Same lookup the kaggle tool itself uses:
    // 1) KAGGLE_CONFIG_DIR (explicit)
    // 2) ~/.kaggle
    // 3) ./.kaggle when no home directory is known
    if let Ok(p) = std::env::var("KAGGLE_CONFIG_DIR") {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }

    match dirs::home_dir() {
        Some(home) => home.join(".kaggle"),
        None => PathBuf::from(".kaggle"),
    }
}

pub(crate) fn absolutize(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(dir))
}

/// Shallow credential check: the first line must mention both `username`
/// and `key`. `kaggle.json` is written on a single line by the Kaggle site.
pub(crate) fn credential_present(config_dir: &Path) -> bool {
    let path = config_dir.join(CREDENTIAL_FILE);
    match read_first_line(&path) {
        Ok(line) => line.contains("username") && line.contains("key"),
        Err(e) => {
            log::debug!("no usable credential at {}: {:#}", path.display(), e);
            false
        }
    }
}

fn read_first_line(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(line)
}
