//! Bulk submission client for the external reporting store.
//!
//! One upload is one batch: every record from every sheet goes out in a
//! single `{"operation", "records"}` call, and the store is the transaction
//! boundary — no retry, no partial rollback here. Field-keyed validation
//! errors come back verbatim as data; transport and server failures surface
//! as a generic retry-suggesting [`RosterError::Transport`].

use crate::error::{RosterError, RosterResult};
use crate::types::DomainRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// What the store said about a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResponse {
    /// Batch accepted; the stored representations as returned.
    Stored(Vec<serde_json::Value>),
    /// Batch rejected with field-path-keyed messages, surfaced verbatim.
    Invalid(BTreeMap<String, Vec<String>>),
}

#[derive(Serialize)]
struct BatchPayload<'a> {
    operation: &'a str,
    records: &'a [DomainRecord],
}

pub struct SubmissionClient {
    base_url: String,
    token: String,
    http: reqwest::blocking::Client,
}

impl SubmissionClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Submit one batch of records under an operation tag.
    pub fn submit_batch(
        &self,
        records: &[DomainRecord],
        operation: &str,
    ) -> RosterResult<SubmissionResponse> {
        let payload = BatchPayload { operation, records };
        info!(records = records.len(), operation, "submitting batch");

        let response = self
            .http
            .post(format!("{}/records", self.base_url))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .map_err(|e| RosterError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| RosterError::Transport(e.to_string()))?;
        decode_submission_response(status, &body)
    }

    /// Fetch the stored records for one institution and period (the export
    /// flow's input leg).
    pub fn fetch_records(
        &self,
        institution_id: i64,
        period: &str,
    ) -> RosterResult<Vec<DomainRecord>> {
        let response = self
            .http
            .get(format!("{}/records", self.base_url))
            .bearer_auth(&self.token)
            .query(&[
                ("institution_id", institution_id.to_string()),
                ("report_period", period.to_string()),
            ])
            .send()
            .map_err(|e| RosterError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RosterError::Transport(format!(
                "store returned HTTP {}",
                response.status()
            )));
        }
        response
            .json::<Vec<DomainRecord>>()
            .map_err(|e| RosterError::Transport(e.to_string()))
    }
}

/// Classify a store response. Pure, so the taxonomy is testable offline.
///
/// 2xx → stored records; 400/422 with a field-keyed body → validation
/// failure (data, not an error); anything else → transport failure.
pub fn decode_submission_response(status: u16, body: &str) -> RosterResult<SubmissionResponse> {
    if (200..300).contains(&status) {
        let stored: Vec<serde_json::Value> = serde_json::from_str(body)
            .map_err(|e| RosterError::Transport(format!("malformed store response: {}", e)))?;
        return Ok(SubmissionResponse::Stored(stored));
    }
    if status == 400 || status == 422 {
        let errors: BTreeMap<String, Vec<String>> = serde_json::from_str(body)
            .map_err(|e| RosterError::Transport(format!("malformed validation response: {}", e)))?;
        return Ok(SubmissionResponse::Invalid(errors));
    }
    Err(RosterError::Transport(format!("store returned HTTP {}", status)))
}
