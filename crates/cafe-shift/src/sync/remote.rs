use crate::schedule::RawShiftRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Body of a `getAllShifts` reply from the spreadsheet API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetAllShiftsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shifts: Option<Vec<RawShiftRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("spreadsheet API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("spreadsheet API answered with HTTP {0}")]
    Status(u16),
    #[error("spreadsheet API unavailable: {0}")]
    Unavailable(String),
}

/// Authoritative source of shift submissions.
#[async_trait]
pub trait ShiftSource: Send + Sync {
    async fn get_all_shifts(&self) -> Result<GetAllShiftsResponse, RemoteError>;
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    action: &'a str,
    params: Map<String, Value>,
}

/// Client for the spreadsheet-backed web app. Every call is a single POST
/// with no retry and no client-side timeout.
pub struct AppsScriptClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AppsScriptClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl fmt::Debug for AppsScriptClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppsScriptClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ShiftSource for AppsScriptClient {
    async fn get_all_shifts(&self) -> Result<GetAllShiftsResponse, RemoteError> {
        let request = ApiRequest {
            action: "getAllShifts",
            params: Map::new(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        Ok(response.json::<GetAllShiftsResponse>().await?)
    }
}
