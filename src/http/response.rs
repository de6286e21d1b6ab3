//! Response envelope, staged results and representation encoding.
//!
//! # Responsibilities
//! - Define the uniform `{status, message, payload?}` envelope
//! - Carry a handler's `(status, envelope)` to the response stage
//! - Negotiate and encode JSON or XML bodies
//!
//! # Design Decisions
//! - Handlers return `Staged` instead of writing bodies; the response stage
//!   picks it out of the response extensions after the inner call returns
//! - A missing `Accept` header means `*/*`

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::Term;

/// Message used whenever a request fails for reasons the client cannot act on.
pub const UNHANDLED_MESSAGE: &str = "there was an unfortunate error";

/// Uniform body shape for every outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "result")]
pub struct Envelope {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<Term>>,
}

impl Envelope {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.canonical_reason().unwrap_or_default().to_string(),
            message: message.into(),
            payload: None,
        }
    }
}

/// A handler's result, waiting to be encoded by the response stage.
#[derive(Debug, Clone)]
pub struct Staged {
    pub status: StatusCode,
    pub envelope: Envelope,
}

impl Staged {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope: Envelope::new(status, message),
        }
    }

    pub fn with_payload(status: StatusCode, message: impl Into<String>, payload: Vec<Term>) -> Self {
        let mut staged = Self::new(status, message);
        staged.envelope.payload = Some(payload);
        staged
    }

    /// The fixed 500 result used for panics and unstaged responses.
    pub fn unhandled() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNHANDLED_MESSAGE)
    }
}

/// Produces a bodyless response with the staged status that carries the
/// staged value as an extension.
impl IntoResponse for Staged {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[derive(Debug, Error)]
#[error("failed to encode {representation:?} body: {reason}")]
pub struct EncodeError {
    pub representation: Representation,
    pub reason: String,
}

/// Body formats the service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Json,
    Xml,
}

impl Representation {
    /// Pick a representation from the request's `Accept` header.
    ///
    /// Media ranges are tried in descending q-value order, ties keeping
    /// header order. Returns `None` when nothing acceptable is supported.
    pub fn negotiate(headers: &HeaderMap) -> Option<Self> {
        let Some(accept) = headers.get(header::ACCEPT) else {
            return Some(Self::Json);
        };
        let accept = accept.to_str().ok()?;
        if accept.trim().is_empty() {
            return Some(Self::Json);
        }

        let mut ranges: Vec<(f32, &str)> = accept
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let media = parts.next()?.trim();
                let quality = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((quality, media))
            })
            .filter(|(quality, _)| *quality > 0.0)
            .collect();
        ranges.sort_by(|a, b| b.0.total_cmp(&a.0));

        ranges
            .into_iter()
            .find_map(|(_, media)| Self::from_media_range(media))
    }

    fn from_media_range(media: &str) -> Option<Self> {
        match media.to_ascii_lowercase().as_str() {
            "application/json" | "application/*" | "*/*" => Some(Self::Json),
            "application/xml" => Some(Self::Xml),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Encode `envelope` in this representation.
    ///
    /// XML is lossier than JSON. Nested arrays flatten into repeated
    /// elements, so `[[1, 2]]` and `[1, 2]` encode the same. Object keys that
    /// are not valid XML names make encoding fail.
    pub fn encode(self, envelope: &Envelope) -> Result<Vec<u8>, EncodeError> {
        let encoded = match self {
            Self::Json => serde_json::to_vec(envelope).map_err(|e| e.to_string()),
            Self::Xml => quick_xml::se::to_string_with_root("result", envelope)
                .map(String::into_bytes)
                .map_err(|e| e.to_string()),
        };
        encoded.map_err(|reason| EncodeError {
            representation: self,
            reason,
        })
    }
}
