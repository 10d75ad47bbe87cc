use futures_util::StreamExt;
use panel_logging::panel_debug;

use crate::types::{
    ClientError, ClientSettings, ExportKind, FeatureFlags, FeaturesBody, JobHandle, JobSnapshot,
    RecommendBody, Recommendation, ScrapePayload, SheetUploadOutcome, SheetUploadPayload,
    StatusBody, SubmitAck,
};

/// The five logical backend operations plus feature detection and the
/// crawler recommendation call. One HTTP request per operation; retry and
/// backoff live in the watch loop, never here.
#[async_trait::async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn health(&self) -> Result<(), ClientError>;
    async fn features(&self) -> Result<FeatureFlags, ClientError>;
    async fn submit(&self, payload: &ScrapePayload) -> Result<JobHandle, ClientError>;
    async fn status(&self, job_id: &str) -> Result<JobSnapshot, ClientError>;
    async fn download(&self, job_id: &str, kind: ExportKind) -> Result<Vec<u8>, ClientError>;
    async fn upload_to_sheet(
        &self,
        payload: &SheetUploadPayload,
    ) -> Result<SheetUploadOutcome, ClientError>;
    async fn recommend(&self, url: &str, intent: &str) -> Result<Recommendation, ClientError>;
}

/// reqwest-backed implementation against one configured base URL. The inner
/// client reuses connections across sequential calls within a session; it is
/// not designed for concurrent use by multiple sessions sharing an instance.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl HttpBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ClientError::BackendUnavailable(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }
}

#[async_trait::async_trait]
impl CatalogBackend for HttpBackend {
    async fn health(&self) -> Result<(), ClientError> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .timeout(self.settings.health_timeout)
            .send()
            .await
            .map_err(|err| ClientError::BackendUnavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::BackendUnavailable(
                response.status().to_string(),
            ));
        }
        Ok(())
    }

    async fn features(&self) -> Result<FeatureFlags, ClientError> {
        let response = self
            .client
            .get(self.endpoint("/features"))
            .timeout(self.settings.features_timeout)
            .send()
            .await
            .map_err(|err| ClientError::BackendUnavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::BackendUnavailable(
                response.status().to_string(),
            ));
        }
        let body: FeaturesBody = response
            .json()
            .await
            .map_err(|err| ClientError::BackendUnavailable(err.to_string()))?;
        Ok(FeatureFlags {
            google_sheets: body.google_sheets.enabled,
        })
    }

    async fn submit(&self, payload: &ScrapePayload) -> Result<JobHandle, ClientError> {
        let response = self
            .client
            .post(self.endpoint("/scrape"))
            .timeout(self.settings.submit_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| ClientError::SubmitFailed(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::SubmitFailed(format!("{status}: {body}")));
        }
        let ack: SubmitAck = response
            .json()
            .await
            .map_err(|err| ClientError::SubmitFailed(err.to_string()))?;
        match ack.job_id {
            Some(id) if !id.is_empty() => Ok(JobHandle { id }),
            _ => Err(ClientError::SubmitFailed("no job id returned".to_string())),
        }
    }

    async fn status(&self, job_id: &str) -> Result<JobSnapshot, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/jobs/{job_id}")))
            .timeout(self.settings.status_timeout)
            .send()
            .await
            .map_err(|err| ClientError::StatusFetchFailed(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::StatusFetchFailed(
                response.status().to_string(),
            ));
        }
        let body: StatusBody = response
            .json()
            .await
            .map_err(|err| ClientError::StatusFetchFailed(err.to_string()))?;
        Ok(body.into())
    }

    async fn download(&self, job_id: &str, kind: ExportKind) -> Result<Vec<u8>, ClientError> {
        let fail = |reason: String| ClientError::DownloadFailed {
            format: kind.tag().to_string(),
            reason,
        };
        let response = self
            .client
            .get(self.endpoint(&format!("/download/{job_id}/{}", kind.tag())))
            .timeout(self.settings.download_timeout)
            .send()
            .await
            .map_err(|err| fail(err.to_string()))?;
        if !response.status().is_success() {
            return Err(fail(response.status().to_string()));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| fail(err.to_string()))?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_download_bytes {
                return Err(fail(format!(
                    "artifact exceeds {} bytes",
                    self.settings.max_download_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        panel_debug!(
            "downloaded {} artifact for job {}: {} bytes",
            kind.tag(),
            job_id,
            bytes.len()
        );
        Ok(bytes)
    }

    async fn upload_to_sheet(
        &self,
        payload: &SheetUploadPayload,
    ) -> Result<SheetUploadOutcome, ClientError> {
        let response = self
            .client
            .post(self.endpoint("/google-sheets/upload"))
            .timeout(self.settings.sheet_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| ClientError::SheetUploadFailed(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::SheetUploadFailed(
                response.status().to_string(),
            ));
        }
        response
            .json()
            .await
            .map_err(|err| ClientError::SheetUploadFailed(err.to_string()))
    }

    async fn recommend(&self, url: &str, intent: &str) -> Result<Recommendation, ClientError> {
        let response = self
            .client
            .post(self.endpoint("/recommend"))
            .timeout(self.settings.recommend_timeout)
            .json(&serde_json::json!({ "url": url, "intent": intent }))
            .send()
            .await
            .map_err(|err| ClientError::RecommendFailed(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::RecommendFailed(response.status().to_string()));
        }
        let body: RecommendBody = response
            .json()
            .await
            .map_err(|err| ClientError::RecommendFailed(err.to_string()))?;
        if !body.success {
            return Err(ClientError::RecommendFailed(
                "backend reported failure".to_string(),
            ));
        }
        Ok(body.recommendation.unwrap_or_default())
    }
}
