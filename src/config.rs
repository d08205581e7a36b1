//! Dashboard configuration

use std::path::PathBuf;

/// Where the dashboard reads its files from and where it listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Order data CSV file
    pub data_path: PathBuf,
    /// Image shown at the top of the sidebar
    pub logo_path: PathBuf,
    /// Socket address for the HTTP server
    pub listen_addr: String,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("main_data.csv")
}

fn default_logo_path() -> PathBuf {
    PathBuf::from("logo.png")
}

fn default_listen_addr() -> String {
    "0.0.0.0:8501".to_string()
}

impl DashboardConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    /// for keys that are unset or empty
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_path = var("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_path);

        let logo_path = var("LOGO_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_logo_path);

        let listen_addr = var("DASHBOARD_ADDR").unwrap_or_else(default_listen_addr);

        Self {
            data_path,
            logo_path,
            listen_addr,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            logo_path: default_logo_path(),
            listen_addr: default_listen_addr(),
        }
    }
}
