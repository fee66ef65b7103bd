//! Connection provisioning for the remote orchestration engine.
//!
//! [`provision`] runs once at process start.  It parses the
//! `host:port/namespace` connection string, reads the account secret from
//! its protected file, and asks the engine's director to create the named
//! business service.  The resulting [`EngineConnection`] is the single
//! handle every dispatch goes through.
//!
//! # Wire format
//!
//! ```text
//! POST http://{host}:{port}/api/{namespace}/director/services
//!      {"target": "<service>"}            → {"service_id": "<id>"}
//! POST http://{host}:{port}/api/{namespace}/services/{id}/invoke
//!      {"method": "<operation>", "argument": "<prompt>"} → {"result": "<reply>"}
//! ```
//!
//! Both requests carry HTTP basic auth with the configured username and the
//! secret.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::config::EngineConfig;

use super::client::{Engine, EngineError};

// ---------------------------------------------------------------------------
// ProvisionError
// ---------------------------------------------------------------------------

/// Startup failures.  Any of these leaves the process unable to serve.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The secret file could not be read.
    #[error("credential unavailable at {path}: {reason}")]
    CredentialUnavailable { path: PathBuf, reason: String },

    /// The connection string is not `host:port/namespace`.
    #[error("invalid connection string {0:?}: expected host:port/namespace")]
    InvalidConnectionString(String),

    /// The engine could not be reached or refused to create the service.
    #[error("connection refused by {target}: {reason}")]
    ConnectionRefused { target: String, reason: String },
}

// ---------------------------------------------------------------------------
// ConnectionString
// ---------------------------------------------------------------------------

/// Parsed `host:port/namespace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host: String,
    pub port: u16,
    pub namespace: String,
}

impl ConnectionString {
    /// URL of `/api/{namespace}/{segments…}` on the engine.
    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = Url::parse(&format!("http://{}:{}/", self.host, self.port)).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["api", self.namespace.as_str()])
            .extend(segments);
        Some(url)
    }
}

impl FromStr for ConnectionString {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProvisionError::InvalidConnectionString(s.to_string());

        let (authority, namespace) = s.trim().split_once('/').ok_or_else(invalid)?;
        let (host, port) = authority.rsplit_once(':').ok_or_else(invalid)?;
        let port: u16 = port.parse().map_err(|_| invalid())?;

        if host.is_empty() || namespace.is_empty() || namespace.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            port,
            namespace: namespace.to_string(),
        })
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.namespace)
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Username plus the secret read from disk.  Never logged.
#[derive(Clone)]
pub struct Credential {
    username: String,
    secret: String,
}

impl Credential {
    /// Read the first line of `path` as the secret for `username`.
    pub fn read(username: &str, path: &Path) -> Result<Self, ProvisionError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ProvisionError::CredentialUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let secret = content
            .lines()
            .next()
            .unwrap_or_default()
            .trim_end_matches(['\r', '\n'])
            .to_string();

        Ok(Self {
            username: username.to_string(),
            secret,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EngineConnection
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CreatedService {
    service_id: String,
}

#[derive(Deserialize)]
struct InvokeResult {
    result: String,
}

/// Authenticated handle to one business service on the engine.
#[derive(Debug)]
pub struct EngineConnection {
    client: reqwest::Client,
    target: ConnectionString,
    credential: Credential,
    service_id: String,
    operation: String,
}

impl EngineConnection {
    pub fn target(&self) -> &ConnectionString {
        &self.target
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }
}

/// Establish the process-wide engine connection.
///
/// # Errors
///
/// - [`ProvisionError::InvalidConnectionString`]: malformed `connection_string`.
/// - [`ProvisionError::CredentialUnavailable`]: the secret file cannot be read.
/// - [`ProvisionError::ConnectionRefused`]: the engine is unreachable or
///   rejected the service creation.
pub async fn provision(config: &EngineConfig) -> Result<EngineConnection, ProvisionError> {
    let target: ConnectionString = config.connection_string.parse()?;
    let credential = Credential::read(&config.username, &config.secret_path)?;

    let refused = |reason: String| ProvisionError::ConnectionRefused {
        target: target.to_string(),
        reason,
    };

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().map_err(|e| refused(e.to_string()))?;

    let url = target
        .endpoint(&["director", "services"])
        .ok_or_else(|| ProvisionError::InvalidConnectionString(config.connection_string.clone()))?;

    log::info!(
        "provisioning service {:?} on {} as {}",
        config.service,
        target,
        credential.username()
    );

    let response = client
        .post(url)
        .basic_auth(&credential.username, Some(&credential.secret))
        .json(&serde_json::json!({ "target": config.service }))
        .send()
        .await
        .map_err(|e| refused(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(refused(format!("HTTP {status}: {body}")));
    }

    let created: CreatedService = response
        .json()
        .await
        .map_err(|e| refused(format!("unexpected director response: {e}")))?;

    log::info!("service {:?} ready (id {})", config.service, created.service_id);

    Ok(EngineConnection {
        client,
        target,
        credential,
        service_id: created.service_id,
        operation: config.operation.clone(),
    })
}

#[async_trait]
impl Engine for EngineConnection {
    async fn ask(&self, prompt: &str) -> Result<String, EngineError> {
        let url = self
            .target
            .endpoint(&["services", self.service_id.as_str(), "invoke"])
            .ok_or_else(|| EngineError::Request(format!("bad engine address {}", self.target)))?;

        let response = self
            .client
            .post(url)
            .basic_auth(&self.credential.username, Some(&self.credential.secret))
            .json(&serde_json::json!({
                "method":   self.operation,
                "argument": prompt,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let invoked: InvokeResult = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        Ok(invoked.result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
