use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub credentials_path: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub sheets_base_url: String,
    pub sheets_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub sink_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".to_string(),
            credentials_path: "./service-account.json".to_string(),
            spreadsheet_id: String::new(),
            sheet_name: "Attendance".to_string(),
            sheets_base_url: "https://sheets.googleapis.com".to_string(),
            sheets_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
            sink_timeout_seconds: 10,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("ATTENDANCE_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(token) = &self.sheets_token {
            if token.trim().is_empty() {
                self.sheets_token = None;
            }
        }
        while self.sheets_base_url.ends_with('/') {
            self.sheets_base_url.pop();
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.credentials_path = resolve_path(base, &self.credentials_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.spreadsheet_id.trim().is_empty() {
            return Err(anyhow!("spreadsheet_id must not be empty"));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(anyhow!("sheet_name must not be empty"));
        }
        if self.sheets_base_url.trim().is_empty() {
            return Err(anyhow!("sheets_base_url must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.sink_timeout_seconds == 0 {
            return Err(anyhow!("sink_timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ATTENDANCE_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("PORT") {
            if let Ok(port) = value.parse::<u16>() {
                self.bind_addr = format!("0.0.0.0:{}", port);
            }
        }
        if let Ok(value) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials_path = value;
        }
        if let Ok(value) = env::var("SPREADSHEET_ID") {
            self.spreadsheet_id = value;
        }
        if let Ok(value) = env::var("SHEET_NAME") {
            self.sheet_name = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_SHEETS_BASE_URL") {
            self.sheets_base_url = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_SHEETS_TOKEN") {
            self.sheets_token = Some(value);
        }
        if let Ok(value) = env::var("ATTENDANCE_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("ATTENDANCE_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("ATTENDANCE_SINK_TIMEOUT_SECONDS") {
            self.sink_timeout_seconds = value.parse().unwrap_or(self.sink_timeout_seconds);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
