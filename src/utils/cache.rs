use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use directories::ProjectDirs;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;

/// Fetches csv table sources. Local paths are read directly; http(s)
/// sources are downloaded once per ISO week into the project cache dir and
/// served from there afterwards.
pub struct TableCache {
    cache_dir: PathBuf,
    timeout_secs: u64,
}

impl TableCache {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let proj_dirs = ProjectDirs::from("org", "hubmap", "partonomy-tools")
            .context("Failed to determine project directories")?;

        let cache_dir = proj_dirs.cache_dir().join("tables");
        fs::create_dir_all(&cache_dir)?;

        Ok(TableCache {
            cache_dir,
            timeout_secs,
        })
    }

    pub fn get_text(&self, src: &str) -> Result<String> {
        if !(src.starts_with("http://") || src.starts_with("https://")) {
            return fs::read_to_string(src).with_context(|| format!("Failed to read {src}"));
        }

        let cache_path = self.get_cache_path(src);
        if self.is_cache_valid(&cache_path) {
            if let Ok(contents) = fs::read_to_string(&cache_path) {
                return Ok(contents);
            }
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        progress.set_message(format!("Downloading {src}..."));

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()?;
        let text = client.get(src).send()?.error_for_status()?.text()?;

        fs::write(&cache_path, &text)?;
        progress.finish_with_message("Table downloaded and cached");

        Ok(text)
    }

    fn get_cache_path(&self, src: &str) -> PathBuf {
        let stem: String = src
            .rsplit('/')
            .next()
            .unwrap_or(src)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            .collect();
        let now = Local::now();
        let year = now.year();
        let week = now.iso_week().week();
        self.cache_dir.join(format!("{stem}_{year}_w{week:02}"))
    }

    fn is_cache_valid(&self, path: &PathBuf) -> bool {
        if !path.exists() {
            return false;
        }

        match fs::metadata(path) {
            Ok(metadata) => {
                let modified = metadata.modified().ok();

                if let Some(modified) = modified {
                    if let Ok(modified) = modified.elapsed() {
                        return modified.as_secs() < 7 * 24 * 60 * 60;
                    }
                }
            }
            Err(_) => return false,
        }
        false
    }
}
