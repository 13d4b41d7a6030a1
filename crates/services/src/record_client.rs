use std::env;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use review_core::model::{
    NewReview, RecordStatus, ReviewId, ReviewRecord, ScoreBreakdown, SessionSnapshot,
};

use crate::error::RecordClientError;

//
// ─── FINALIZE PAYLOAD ─────────────────────────────────────────────────────────
//

/// The single terminal write committing a session's results.
///
/// Built once by the engine in `ResultReady`; the record status is derived
/// from the frozen composite score. Serialized camelCase to match the Review
/// Record Service's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeUpdate {
    pub status: RecordStatus,
    pub scores: ScoreBreakdown,
    pub notes: String,
    pub session_snapshot: SessionSnapshot,
}

//
// ─── API CONTRACT ─────────────────────────────────────────────────────────────
//

/// Client contract for the Review Record Service.
#[async_trait]
pub trait ReviewRecordApi: Send + Sync {
    /// Fetch every scheduled review.
    ///
    /// # Errors
    ///
    /// Returns `RecordClientError` on transport failures or non-2xx
    /// responses.
    async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, RecordClientError>;

    /// Fetch one review by id.
    ///
    /// # Errors
    ///
    /// Returns `RecordClientError::HttpStatus` (404) if the record does not
    /// exist, or other client errors.
    async fn get_review(&self, id: ReviewId) -> Result<ReviewRecord, RecordClientError>;

    /// Schedule a new review.
    ///
    /// # Errors
    ///
    /// Returns `RecordClientError` on transport failures or non-2xx
    /// responses.
    async fn create_review(&self, review: &NewReview) -> Result<ReviewRecord, RecordClientError>;

    /// Commit a session's results to its record. Any non-2xx response is a
    /// finalize failure.
    ///
    /// # Errors
    ///
    /// Returns `RecordClientError` on transport failures or non-2xx
    /// responses.
    async fn finalize_review(
        &self,
        id: ReviewId,
        update: &FinalizeUpdate,
    ) -> Result<ReviewRecord, RecordClientError>;
}

//
// ─── HTTP CLIENT ──────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct RecordServiceConfig {
    pub base_url: String,
}

impl RecordServiceConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `REVIEW_API_BASE_URL`, defaulting to the local backend.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("REVIEW_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".into());
        Self { base_url }
    }
}

/// `reqwest`-backed implementation of the Review Record Service contract.
#[derive(Clone)]
pub struct HttpReviewRecordClient {
    client: Client,
    config: RecordServiceConfig,
}

impl HttpReviewRecordClient {
    #[must_use]
    pub fn new(config: RecordServiceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RecordServiceConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

fn check_status(response: Response) -> Result<Response, RecordClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(RecordClientError::HttpStatus(response.status()))
    }
}

#[async_trait]
impl ReviewRecordApi for HttpReviewRecordClient {
    async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, RecordClientError> {
        let response = self.client.get(self.endpoint("reviews")).send().await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn get_review(&self, id: ReviewId) -> Result<ReviewRecord, RecordClientError> {
        let response = self
            .client
            .get(self.endpoint(&format!("reviews/{id}")))
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn create_review(&self, review: &NewReview) -> Result<ReviewRecord, RecordClientError> {
        let response = self
            .client
            .post(self.endpoint("reviews"))
            .json(review)
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn finalize_review(
        &self,
        id: ReviewId,
        update: &FinalizeUpdate,
    ) -> Result<ReviewRecord, RecordClientError> {
        let response = self
            .client
            .put(self.endpoint(&format!("reviews/{id}")))
            .json(update)
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }
}
