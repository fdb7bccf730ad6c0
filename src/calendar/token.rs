use crate::error::{auth_error, AppResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Google OAuth token endpoint
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this many seconds before the recorded expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token as persisted on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS > now
    }

    /// Build a stored token from a token endpoint response
    pub fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
        now: i64,
    ) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: now + response.expires_in.unwrap_or(3600),
        }
    }
}

/// Body returned by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Loads, refreshes and saves the OAuth token file
#[derive(Clone)]
pub struct TokenManager {
    path: PathBuf,
    client_id: String,
    client_secret: String,
    client: Client,
}

impl TokenManager {
    pub fn new(path: impl Into<PathBuf>, client_id: String, client_secret: String) -> Self {
        Self {
            path: path.into(),
            client_id,
            client_secret,
            client: Client::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token file
    pub fn load(&self) -> AppResult<StoredToken> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            auth_error(&format!(
                "No token at {} ({}). Run get_calendar_token first.",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| auth_error(&format!("Failed to parse token file: {}", e)))
    }

    /// Write the token file
    pub fn save(&self, token: &StoredToken) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(token)?)?;
        Ok(())
    }

    /// Get a valid access token, refreshing it if it has expired
    pub async fn access_token(&self) -> AppResult<String> {
        let token = self.load()?;
        let now = Utc::now().timestamp();

        if token.is_fresh(now) {
            debug!("Using stored access token");
            return Ok(token.access_token);
        }

        info!("Access token expired, refreshing");
        let refreshed = self.refresh(&token).await?;
        Ok(refreshed.access_token)
    }

    /// Refresh an expired token and persist the result
    async fn refresh(&self, token: &StoredToken) -> AppResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| auth_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        let refreshed =
            StoredToken::from_response(body, Some(refresh_token), Utc::now().timestamp());
        self.save(&refreshed)?;
        Ok(refreshed)
    }
}
