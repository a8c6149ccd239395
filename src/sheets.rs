use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppConfig;

/// Durable log for attendance events. One row per event; the sink keeps its
/// record regardless of what happens to the pending queue afterwards.
#[async_trait]
pub trait AttendanceSink: Send + Sync {
    async fn append_row(&self, row: &[Value]) -> Result<()>;
    async fn ping(&self) -> Result<()>;
}

/// Google Sheets values API client. Appends each event as a row to a fixed
/// sheet tab.
pub struct SheetsLogger {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    token: String,
}

impl SheetsLogger {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let token = match &config.sheets_token {
            Some(token) => token.clone(),
            None => load_token(&config.credentials_path).await?,
        };
        info!(
            spreadsheet_id = %config.spreadsheet_id,
            sheet_name = %config.sheet_name,
            "spreadsheet logger ready"
        );
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.sheets_base_url.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            token,
        })
    }

    fn append_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}!A1:append",
            self.base_url, self.spreadsheet_id, self.sheet_name
        )
    }
}

#[async_trait]
impl AttendanceSink for SheetsLogger {
    async fn append_row(&self, row: &[Value]) -> Result<()> {
        let response = self
            .http
            .post(self.append_url())
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .context("sheets append request failed")?;
        check_status(response).await
    }

    async fn ping(&self) -> Result<()> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=spreadsheetId",
            self.base_url, self.spreadsheet_id
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("sheets ping request failed")?;
        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(256).collect();
    Err(anyhow!("sheets api returned {}: {}", status, snippet))
}

/// Reads the bearer token from the credentials file. Accepts either a JSON
/// document with an `access_token`/`token` field or a bare token. Token
/// refresh and OAuth flows live outside this process.
async fn load_token(path: &str) -> Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read credentials file {}", path))?;
    let token = match serde_json::from_str::<Value>(&content) {
        Ok(parsed) => parsed
            .get("access_token")
            .or_else(|| parsed.get("token"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("credentials file {} has no access_token field", path))?,
        Err(_) => content.trim().to_string(),
    };
    if token.is_empty() {
        return Err(anyhow!("credentials file {} is empty", path));
    }
    Ok(token)
}
