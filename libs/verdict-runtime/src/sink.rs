// Outbound score persistence. This crate computes scores; storing them is
// the collaborator's job.
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;
use verdict_common::types::{Language, ScoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub submission_id: Uuid,
    pub question_id: String,
    pub language: Language,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed_count: usize,
    pub total_count: usize,
    pub submitted_at: DateTime<Utc>,
}

impl ScoreSubmission {
    pub fn new(submission_id: Uuid, language: Language, score: &ScoreResult) -> Self {
        Self {
            submission_id,
            question_id: score.question_id.clone(),
            language,
            score: score.score,
            max_score: score.max_score,
            percentage: score.percentage,
            passed_count: score.passed_count,
            total_count: score.total_count,
            submitted_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ScoreSink: Send + Sync {
    async fn persist(&self, record: &ScoreSubmission) -> Result<()>;
}

/// Posts each record as JSON to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpScoreSink {
    http: reqwest::Client,
    url: String,
}

impl HttpScoreSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build score sink HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ScoreSink for HttpScoreSink {
    async fn persist(&self, record: &ScoreSubmission) -> Result<()> {
        self.http
            .post(&self.url)
            .json(record)
            .send()
            .await
            .context("Failed to reach score sink")?
            .error_for_status()
            .context("Score sink rejected submission")?;

        info!(
            submission_id = %record.submission_id,
            question_id = %record.question_id,
            score = record.score,
            "Score persisted"
        );
        Ok(())
    }
}
