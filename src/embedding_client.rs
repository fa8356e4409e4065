//! Thin HTTP client for the external embedding/enrollment microservice
//! contract (spec §6, "Embedding service contract"). The service itself
//! is out of scope; this module only implements the three calls the
//! Speaker Identity Service needs, each with a bounded deadline.
//!
//! `reqwest` is not a teacher dependency - it is enriched from
//! `arenkis-meeting-minutes` / `Damonbodine-meetingcoder`, both of which
//! call local HTTP services the same way.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct LabelSpeakerRequest<'a> {
    transcript_file: &'a str,
    speaker_id: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LabelSpeakerResponse {
    pub profile_updated: bool,
    pub embeddings_added: u32,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct EnrollSpeakerRequest<'a> {
    name: &'a str,
    audio_base64: &'a str,
    filename: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EnrollSpeakerResponse {
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub recording: Option<bool>,
    #[serde(default)]
    pub uptime_seconds: Option<f64>,
}

pub struct EmbeddingClient {
    base_url: String,
    client: reqwest::Client,
}

impl EmbeddingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn label_speaker(
        &self,
        transcript_file: &str,
        speaker_id: &str,
        name: &str,
    ) -> anyhow::Result<LabelSpeakerResponse> {
        let body = LabelSpeakerRequest {
            transcript_file,
            speaker_id,
            name,
        };
        let resp = tokio::time::timeout(
            Duration::from_secs(30),
            self.client
                .post(format!("{}/label-speaker", self.base_url))
                .json(&body)
                .send(),
        )
        .await??;
        Ok(resp.error_for_status()?.json().await?)
    }

    pub async fn enroll_speaker(
        &self,
        name: &str,
        audio_base64: &str,
        filename: &str,
    ) -> anyhow::Result<EnrollSpeakerResponse> {
        let body = EnrollSpeakerRequest {
            name,
            audio_base64,
            filename,
        };
        let resp = tokio::time::timeout(
            Duration::from_secs(120),
            self.client
                .post(format!("{}/enroll-speaker", self.base_url))
                .json(&body)
                .send(),
        )
        .await??;
        Ok(resp.error_for_status()?.json().await?)
    }

    pub async fn health(&self) -> anyhow::Result<HealthResponse> {
        let resp = tokio::time::timeout(
            Duration::from_secs(30),
            self.client.get(format!("{}/health", self.base_url)).send(),
        )
        .await??;
        Ok(resp.error_for_status()?.json().await?)
    }
}
