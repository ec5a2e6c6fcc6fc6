/// Execution Client - Submit/Poll Access to the Sandbox Service
///
/// **Core Responsibility:**
/// Hand a complete program and its stdin to the external execution service
/// and bring back its decoded outputs and terminal status.
///
/// **Protocol:**
/// - `submit` posts base64 source and stdin and returns an opaque token
/// - `poll` fetches the job state for a token
/// - `await_result` submits, then polls on a fixed interval until the job is
///   terminal or the attempt budget runs out
///
/// **Boundaries:**
/// - Knows nothing about harnesses, test cases or scoring
/// - Never retries a failed submit; only the poll loop repeats
/// - Poll exhaustion is reported as `PollTimeout`, never as a
///   service-reported time limit
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;

/// Safety limits enforced before anything is sent to the service
pub const MAX_SOURCE_CODE_BYTES: usize = 1024 * 1024; // 1MB
pub const MAX_TEST_INPUT_BYTES: usize = 10 * 1024 * 1024; // 10MB

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RESULT_FIELDS: &str = "token,stdout,stderr,compile_output,message,status,time,memory";

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("execution service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("execution service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },
    #[error("malformed response from execution service: {0}")]
    Malformed(String),
    #[error("failed to decode {field}: {reason}")]
    Decode { field: &'static str, reason: String },
    #[error("{what} exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { what: &'static str, limit: usize },
    #[error("job {token} not finished after {attempts} polls")]
    PollTimeout { token: String, attempts: u32 },
}

/// Job state as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
    InternalError,
    ExecFormatError,
}

impl ExecutionStatus {
    /// Map a Judge0 status id. Unknown ids are treated as internal errors.
    pub fn from_id(id: u32) -> Self {
        match id {
            1 => ExecutionStatus::Queued,
            2 => ExecutionStatus::Processing,
            3 => ExecutionStatus::Accepted,
            4 => ExecutionStatus::WrongAnswer,
            5 => ExecutionStatus::TimeLimitExceeded,
            6 => ExecutionStatus::CompilationError,
            7..=12 => ExecutionStatus::RuntimeError,
            14 => ExecutionStatus::ExecFormatError,
            _ => ExecutionStatus::InternalError,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Queued | ExecutionStatus::Processing)
    }
}

/// Decoded job state.
///
/// Output fields are `None` when the service sent nothing for them, and
/// `Some("")` when the program ran and printed nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub token: String,
    pub status: ExecutionStatus,
    pub description: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    pub time_ms: Option<u64>,
    pub memory_kb: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SubmissionRequest {
    source_code: String,
    language_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    id: u32,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    compile_output: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<StatusBody>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    memory: Option<Value>,
}

/// Reject payloads the service should never see.
pub fn check_payload(source_code: &str, stdin: Option<&str>) -> Result<(), ExecutionError> {
    if source_code.len() > MAX_SOURCE_CODE_BYTES {
        return Err(ExecutionError::PayloadTooLarge {
            what: "source code",
            limit: MAX_SOURCE_CODE_BYTES,
        });
    }
    if stdin.map_or(0, str::len) > MAX_TEST_INPUT_BYTES {
        return Err(ExecutionError::PayloadTooLarge {
            what: "test input",
            limit: MAX_TEST_INPUT_BYTES,
        });
    }
    Ok(())
}

/// Decode one base64 field. The service wraps long values over several lines.
pub fn decode_field(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ExecutionError> {
    let Some(encoded) = value else {
        return Ok(None);
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ExecutionError::Decode {
            field,
            reason: e.to_string(),
        })?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

// `time` is seconds as a decimal string, `memory` is kilobytes.
fn parse_time_ms(value: Option<&Value>) -> Option<u64> {
    let seconds = match value? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    Some((seconds * 1000.0).round() as u64)
}

fn parse_memory_kb(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn into_result(token: &str, body: SubmissionResponse) -> Result<ExecutionResult, ExecutionError> {
    let status = body
        .status
        .ok_or_else(|| ExecutionError::Malformed(format!("job {} has no status", token)))?;
    Ok(ExecutionResult {
        token: token.to_string(),
        status: ExecutionStatus::from_id(status.id),
        description: status.description,
        stdout: decode_field("stdout", body.stdout.as_deref())?,
        stderr: decode_field("stderr", body.stderr.as_deref())?,
        compile_output: decode_field("compile_output", body.compile_output.as_deref())?,
        message: decode_field("message", body.message.as_deref())?,
        time_ms: parse_time_ms(body.time.as_ref()),
        memory_kb: parse_memory_kb(body.memory.as_ref()),
    })
}

/// A place programs can be run. The HTTP client is the production backend;
/// tests substitute in-memory ones.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn submit(
        &self,
        source_code: &str,
        language_id: u32,
        stdin: Option<&str>,
    ) -> Result<String, ExecutionError>;

    async fn poll(&self, token: &str) -> Result<ExecutionResult, ExecutionError>;

    fn poll_interval(&self) -> Duration;

    async fn await_result(
        &self,
        source_code: &str,
        language_id: u32,
        stdin: Option<&str>,
        max_attempts: u32,
    ) -> Result<ExecutionResult, ExecutionError> {
        let token = self.submit(source_code, language_id, stdin).await?;
        for attempt in 1..=max_attempts {
            let result = self.poll(&token).await?;
            if result.status.is_terminal() {
                debug!(token = %token, attempt, status = ?result.status, "Job finished");
                return Ok(result);
            }
            if attempt < max_attempts {
                tokio::time::sleep(self.poll_interval()).await;
            }
        }
        warn!(token = %token, attempts = max_attempts, "Gave up polling job");
        Err(ExecutionError::PollTimeout {
            token,
            attempts: max_attempts,
        })
    }
}

/// HTTP client for a Judge0-compatible execution service.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
}

impl SandboxClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        poll_interval: Duration,
    ) -> Result<Self, ExecutionError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            poll_interval,
        })
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self, ExecutionError> {
        Self::new(
            &config.service_url,
            config.api_key.clone(),
            config.poll_interval,
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("X-Auth-Token", key),
            None => request,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ExecutionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ExecutionError::Service {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ExecutionBackend for SandboxClient {
    #[tracing::instrument(skip(self, source_code, stdin))]
    async fn submit(
        &self,
        source_code: &str,
        language_id: u32,
        stdin: Option<&str>,
    ) -> Result<String, ExecutionError> {
        check_payload(source_code, stdin)?;

        let body = SubmissionRequest {
            source_code: general_purpose::STANDARD.encode(source_code),
            language_id,
            stdin: stdin.map(|s| general_purpose::STANDARD.encode(s)),
        };
        let url = format!("{}/submissions", self.base_url);
        let response = self
            .authorize(self.http.post(&url))
            .query(&[("base64_encoded", "true"), ("wait", "false")])
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::Malformed(e.to_string()))?;

        info!(token = %parsed.token, "Submitted job");
        Ok(parsed.token)
    }

    #[tracing::instrument(skip(self))]
    async fn poll(&self, token: &str) -> Result<ExecutionResult, ExecutionError> {
        let url = format!("{}/submissions/{}", self.base_url, token);
        let response = self
            .authorize(self.http.get(&url))
            .query(&[("base64_encoded", "true"), ("fields", RESULT_FIELDS)])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body: SubmissionResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::Malformed(e.to_string()))?;
        into_result(token, body)
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
