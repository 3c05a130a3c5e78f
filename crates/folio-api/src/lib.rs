// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod wire;

pub use wire::coerce_record;

use anyhow::{Context, Result, anyhow, bail};
use folio_app::Record;
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;
use wire::{ErrorEnvelope, UsersEnvelope, decode_records};

pub const USERS_PATH: &str = "api/users";
pub const HEALTH_PATH: &str = "api/test";

/// Shown when the backend rejects a request without saying why.
pub const GENERIC_FAILURE: &str = "Failed to fetch users.";

/// Why a records fetch produced no records. `Display` is the exact text shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Error fetching data: {0}")]
    Transport(String),
    /// Non-2xx response. `message` keeps the backend's `error` text for logs;
    /// users only ever see the status code.
    #[error("Error fetching data: HTTP error! status: {status}")]
    Status { status: u16, message: Option<String> },
    #[error("{}", .0.as_deref().unwrap_or(GENERIC_FAILURE))]
    Rejected(Option<String>),
    #[error("Error fetching data: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        // A trailing slash makes relative joins append instead of replace.
        let normalized = format!("{}/", trimmed.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn users_url(&self) -> Result<Url> {
        self.endpoint(USERS_PATH)
    }

    /// Loads the full record list. Either every record arrives or none do.
    pub fn fetch_records(&self) -> Result<Vec<Record>, FetchError> {
        let url = self
            .users_url()
            .map_err(|error| FetchError::Transport(format!("{error:#}")))?;
        info!(url = %url, "fetching records");
        let started = Instant::now();

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| FetchError::Transport(transport_detail(&error)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| FetchError::Transport(transport_detail(&error)))?;

        if !status.is_success() {
            let error = clean_error_response(status, &body);
            if let FetchError::Status { message, .. } = &error {
                warn!(
                    status = status.as_u16(),
                    detail = message.as_deref().unwrap_or(""),
                    "records request failed"
                );
            }
            return Err(error);
        }

        let envelope: UsersEnvelope = serde_json::from_str(&body)
            .map_err(|error| FetchError::Decode(format!("invalid response body: {error}")))?;
        if !envelope.success {
            let message = envelope.error.filter(|error| !error.is_empty());
            warn!(detail = message.as_deref().unwrap_or(""), "backend rejected request");
            return Err(FetchError::Rejected(message));
        }
        let data = envelope
            .data
            .ok_or_else(|| FetchError::Decode("response is missing data".to_owned()))?;
        let records = decode_records(data).map_err(FetchError::Decode)?;

        info!(
            count = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "records loaded"
        );
        Ok(records)
    }

    /// Hits the backend health endpoint and returns whatever it says.
    pub fn ping(&self) -> Result<String> {
        let url = self.endpoint(HEALTH_PATH)?;
        debug!(url = %url, "pinging backend");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        let body = response.text().context("read health response")?;
        if !status.is_success() {
            return Err(match clean_error_response(status, &body) {
                FetchError::Status {
                    status,
                    message: Some(message),
                } => anyhow!("health check failed with status {status}: {message}"),
                error => anyhow!(error),
            });
        }

        let message = serde_json::from_str::<String>(&body).unwrap_or(body);
        Ok(message.trim().to_owned())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("build {path} url from {}", self.base_url))
    }
}

fn transport_detail(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "request timed out".to_owned();
    }
    if error.is_connect() {
        return "could not connect to server".to_owned();
    }
    if error.is_decode() || error.is_body() {
        return format!("could not read response ({error})");
    }
    error.to_string()
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- start the backend or set [api].base_url ({})",
        base_url,
        transport_detail(&error)
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> FetchError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|error| !error.is_empty());
    FetchError::Status {
        status: status.as_u16(),
        message,
    }
}
