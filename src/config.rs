use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use homedir::my_home;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";
const DB_FILE: &str = "chrome-data.db";

const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_SEARCH_LIMIT: usize = 50;
const DEFAULT_DOMAIN_LIMIT: usize = 20;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Database file. Defaults to `chrome-data.db` next to the config file.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Address the http server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Directory with the static dashboard.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,

    #[serde(default = "default_domain_limit")]
    pub default_domain_limit: usize,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            listen: default_listen(),
            public_dir: default_public_dir(),
            default_search_limit: DEFAULT_SEARCH_LIMIT,
            default_domain_limit: DEFAULT_DOMAIN_LIMIT,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            base_path: PathBuf::new(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PUBLIC_DIR)
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_domain_limit() -> usize {
    DEFAULT_DOMAIN_LIMIT
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Config {
    /// `$CDH_BASE_PATH`, or `~/.local/share/cdh`.
    pub fn base_path() -> anyhow::Result<PathBuf> {
        if let Ok(base_path) = std::env::var("CDH_BASE_PATH") {
            return Ok(PathBuf::from(base_path));
        }

        let home = my_home()
            .context("could not determine home directory")?
            .context("home directory path is empty")?;
        Ok(home.join(".local/share/cdh"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let base_path = Self::base_path()?;
        let mut config = Self::load_with(&base_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `config.yaml` from `base_path`, writing a default one first if
    /// there is none.
    pub fn load_with(base_path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;

        let config_path = base_path.join(CONFIG_FILE);
        if !config_path.exists() {
            log::info!("writing default config to {}", config_path.display());
            std::fs::write(&config_path, serde_yml::to_string(&Self::default())?)?;
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_path_buf();
        config.validate()?;

        Ok(config)
    }

    /// `DB_PATH` replaces the database file, `PORT` the port of `listen`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(db_path) = var("DB_PATH").filter(|v| !v.is_empty()) {
            self.db_path = Some(PathBuf::from(db_path));
        }

        if let Some(port) = var("PORT").filter(|v| !v.is_empty()) {
            let port: u16 = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port:?}"))?;
            let mut addr = self.listen_addr()?;
            addr.set_port(port);
            self.listen = addr.to_string();
        }

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_search_limit == 0 {
            bail!("default_search_limit must be greater than 0");
        }

        if self.default_domain_limit == 0 {
            bail!("default_domain_limit must be greater than 0");
        }

        self.listen_addr()?;

        Ok(())
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .with_context(|| format!("listen is not a socket address: {:?}", self.listen))
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.base_path.join(DB_FILE))
    }
}
