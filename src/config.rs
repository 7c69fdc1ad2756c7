//! Application configuration. Dataset path, server address.
//!
//! Read from `SALES_*` environment variables (a `.env` file is honoured) and,
//! optionally, the file named by `SALES_CONFIG`.

use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "sales_data_cleaned.csv";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// CSV with sale_time and purchaser_gender columns. Read from SALES_DATA_PATH.
    #[serde(default)]
    pub data_path: Option<String>,

    /// Bind address for the web server. Read from SALES_SERVER_ADDR.
    #[serde(default)]
    pub server_addr: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("SALES_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("SALES"));
        c.build()?.try_deserialize()
    }

    /// Dataset path. Defaults to `sales_data_cleaned.csv` in the working directory.
    pub fn data_path_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_path.as_deref().unwrap_or(DEFAULT_DATA_PATH))
    }

    pub fn server_addr_or_default(&self) -> String {
        self.server_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string())
    }
}
