//! Upstream seam and response normalisation.
//!
//! The control plane talks to INE through the [`Upstream`] trait so tests can
//! substitute a canned upstream. Every raw reply goes through [`classify`],
//! which is the single place deciding between data, "not found" and failure.

use std::future::Future;

use ine_models::schema::function_path;
use serde_json::Value;

use crate::error::{IneError, IneResult};

pub mod http;

pub use http::{ClientConfig, HttpUpstream};

/// One GET against an upstream function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub function: &'static str,
    pub inputs: Vec<String>,
    pub query: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    #[must_use]
    pub const fn new(function: &'static str) -> Self {
        Self {
            function,
            inputs: Vec::new(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.inputs.push(input.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query.extend(query);
        self
    }

    /// Function path without base URL or language, used for logs and errors.
    #[must_use]
    pub fn path(&self) -> String {
        let inputs: Vec<&str> = self.inputs.iter().map(String::as_str).collect();
        function_path(self.function, &inputs)
    }
}

/// Raw upstream reply after transport-level retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Source of upstream replies.
pub trait Upstream: Send + Sync + 'static {
    /// Performs the request, retrying transient failures as configured.
    ///
    /// Returns the final status and body; only transport failures are errors.
    fn fetch(
        &self,
        request: &UpstreamRequest,
    ) -> impl Future<Output = IneResult<UpstreamResponse>> + Send;
}

/// Normalised upstream payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Found(Value),
    NotFound,
}

/// Keys that identify a real record; an object without any of them is a
/// status envelope.
const RECORD_KEYS: [&str; 2] = ["Id", "COD"];

/// Classifies a raw reply into data, "not found", or failure.
///
/// # Errors
/// Returns `IneError::Status` for non-success statuses other than 404 and
/// `IneError::Decode` for a non-empty body that is not JSON.
pub fn classify(path: &str, response: UpstreamResponse) -> IneResult<Payload> {
    if response.status == 404 {
        return Ok(Payload::NotFound);
    }
    if !(200..300).contains(&response.status) {
        return Err(IneError::Status {
            status: response.status,
            path: path.to_string(),
        });
    }
    let body = response.body.trim();
    if body.is_empty() {
        return Ok(Payload::NotFound);
    }
    let value: Value = serde_json::from_str(body).map_err(|err| IneError::decode(path, err))?;
    match value {
        Value::Null => Ok(Payload::NotFound),
        Value::Object(ref map) if !RECORD_KEYS.iter().any(|key| map.contains_key(*key)) => {
            tracing::debug!(path, body = %value, "upstream returned a status envelope");
            Ok(Payload::NotFound)
        }
        other => Ok(Payload::Found(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_and_records_are_found() {
        let array = classify("X", UpstreamResponse::ok(r#"[{"Id":1}]"#)).unwrap();
        assert_eq!(array, Payload::Found(json!([{"Id": 1}])));

        let empty = classify("X", UpstreamResponse::ok("[]")).unwrap();
        assert_eq!(empty, Payload::Found(json!([])));

        let record = classify("X", UpstreamResponse::ok(r#"{"COD":"IPC1"}"#)).unwrap();
        assert_eq!(record, Payload::Found(json!({"COD": "IPC1"})));
    }

    #[test]
    fn empty_bodies_envelopes_and_404_are_not_found() {
        for response in [
            UpstreamResponse::ok(""),
            UpstreamResponse::ok("  \n"),
            UpstreamResponse::ok("null"),
            UpstreamResponse::ok(r#"{"status":"El objeto no existe"}"#),
            UpstreamResponse::status(404),
        ] {
            assert_eq!(classify("X", response).unwrap(), Payload::NotFound);
        }
    }

    #[test]
    fn server_errors_and_garbage_are_failures() {
        let status = classify("DATOS_TABLA/1", UpstreamResponse::status(503)).unwrap_err();
        assert!(matches!(status, IneError::Status { status: 503, .. }));

        let garbage = classify("DATOS_TABLA/1", UpstreamResponse::ok("<html>")).unwrap_err();
        assert!(matches!(garbage, IneError::Decode { .. }));
    }

    #[test]
    fn request_path_includes_inputs() {
        let request = UpstreamRequest::new("DATOS_TABLA").with_input("50902");
        assert_eq!(request.path(), "DATOS_TABLA/50902");
    }
}
