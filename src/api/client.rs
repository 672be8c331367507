use crate::api::error::ApiError;
use crate::api::types::BlockedRecord;
use crate::config::Config;
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Block-list endpoints of the dashboard API
#[async_trait]
pub trait BlocklistApi: Send + Sync {
  async fn get_blocked_users(&self, guild_id: &str) -> Result<Vec<BlockedRecord>, ApiError>;

  /// Create or overwrite the block for `record.user_id`, returning the stored record
  async fn add_blocked_user(
    &self,
    guild_id: &str,
    record: &BlockedRecord,
  ) -> Result<BlockedRecord, ApiError>;

  async fn delete_blocked_user(&self, guild_id: &str, user_id: &str) -> Result<(), ApiError>;
}

/// HTTP client for the dashboard API
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
  token: String,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    Self::with_token(&config.api.url, token)
  }

  fn with_token(url: &str, token: String) -> Result<Self> {
    let base = Url::parse(url).map_err(|e| eyre!("Invalid API url '{}': {}", url, e))?;
    if base.cannot_be_a_base() {
      return Err(eyre!("Invalid API url '{}': not a base url", url));
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("blockwatch/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base, token })
  }

  /// `{base}/guilds/{guild}/blocked[/{user}]`, with each id as its own path segment
  fn blocked_url(&self, guild_id: &str, user_id: Option<&str>) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().extend(["guilds", guild_id, "blocked"]);
      if let Some(user_id) = user_id {
        segments.push(user_id);
      }
    }
    url
  }

  async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.bearer_auth(&self.token).send().await?;
    let status = response.status();
    debug!(%status, url = %response.url(), "API response");

    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), body))
  }

  async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
      .map_err(|e| ApiError::unknown(format!("Failed to parse response: {}", e)))
  }
}

#[async_trait]
impl BlocklistApi for ApiClient {
  async fn get_blocked_users(&self, guild_id: &str) -> Result<Vec<BlockedRecord>, ApiError> {
    let url = self.blocked_url(guild_id, None);
    let response = self.send(self.http.get(url)).await?;
    Self::decode(response).await
  }

  async fn add_blocked_user(
    &self,
    guild_id: &str,
    record: &BlockedRecord,
  ) -> Result<BlockedRecord, ApiError> {
    let url = self.blocked_url(guild_id, None);
    let response = self.send(self.http.post(url).json(record)).await?;
    Self::decode(response).await
  }

  async fn delete_blocked_user(&self, guild_id: &str, user_id: &str) -> Result<(), ApiError> {
    let url = self.blocked_url(guild_id, Some(user_id));
    self.send(self.http.delete(url)).await?;
    Ok(())
  }
}
