use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use jobwatch_engine::{ClientSettings, PollPolicy};
use jobwatch_logging::jw_info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "jobwatch.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: ClientSettings,
    pub policy: PollPolicy,
    /// Where completed results are kept between runs.
    pub store_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: ClientSettings::default(),
            policy: PollPolicy::default(),
            store_dir: PathBuf::from(".jobwatch"),
            log_file: None,
            verbose: false,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl AppConfig {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.backend.base_url = base_url;
        }
        if let Some(store_dir) = overrides.store_dir {
            self.store_dir = store_dir;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self.verbose |= overrides.verbose;
    }
}

/// Reads `path`, or `jobwatch.ron` in the working directory when present.
pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => read(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                read(default_path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

fn read(path: &Path) -> anyhow::Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("couldn't read config file at {}", path.display()))?;
    let config = ron::from_str(&content)
        .with_context(|| format!("couldn't parse config file at {}", path.display()))?;
    jw_info!("Loaded config from {:?}", path);
    Ok(config)
}
