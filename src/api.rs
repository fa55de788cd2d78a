//! HTTP client for the workout backend (catalog, templates, saves, quizzes)

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

use crate::exercises::CatalogEntry;
use crate::session::{SavePayload, TemplateExercise};
use crate::trivia::Question;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { status: StatusCode, url: String },
}

impl ApiError {
    /// Message suitable for a status line
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(e) if e.is_timeout() => {
                "Server took too long to respond. Please try again.".to_string()
            }
            ApiError::Http(_) => "Could not reach the server. Please try again.".to_string(),
            ApiError::Status { status, .. } => {
                format!("Server error ({}). Please try again.", status.as_u16())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /exercises`
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
        self.get_json("exercises").await
    }

    /// `GET /workout{id}/exerciseData`
    pub async fn fetch_template(&self, template_id: i64) -> Result<Vec<TemplateExercise>, ApiError> {
        self.get_json(&format!("workout{}/exerciseData", template_id)).await
    }

    /// `GET /quizzes`
    pub async fn fetch_quizzes(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json("quizzes").await
    }

    /// `POST /saveworkout`
    pub async fn save_workout(&self, payload: &SavePayload) -> Result<(), ApiError> {
        let url = self.url("saveworkout");
        let response = self.http.post(&url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "save rejected");
            return Err(ApiError::Status { status, url });
        }
        info!(name = %payload.name, exercises = payload.exercises.len(), "workout saved");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "request rejected");
            return Err(ApiError::Status { status, url });
        }
        Ok(response.json::<T>().await?)
    }
}
