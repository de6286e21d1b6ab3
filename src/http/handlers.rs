//! Terminal handlers for suggestion lookups and term inserts.
//!
//! Both return a [`Staged`] result; encoding is left to the pipeline.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
};

use crate::http::response::Staged;
use crate::store::{PrefixStore, Term};

/// State shared by the handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: PrefixStore,
    /// Surface decode and insert failures instead of reporting success.
    pub strict_validation: bool,
}

/// `GET /?key=<prefix>`
///
/// A repeated `key` parameter uses its first value; a missing one means the
/// empty prefix.
pub async fn get_suggestions(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Staged {
    let prefix = match params {
        Ok(Query(pairs)) => first_value(pairs, "key").unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable query string, using empty prefix");
            String::new()
        }
    };

    match state.store.lookup_by_prefix(&prefix).await {
        Ok(terms) => {
            tracing::debug!(prefix = %prefix, matches = terms.len(), "Suggestions retrieved");
            Staged::with_payload(StatusCode::OK, "successful in retrieving results", terms)
        }
        Err(e) => {
            tracing::error!(prefix = %prefix, error = %e, "Error retrieving results");
            Staged::new(StatusCode::INTERNAL_SERVER_ERROR, "failure in retrieving results")
        }
    }
}

/// `POST /` with a `{"key": ..., "value": ...}` body.
pub async fn insert_term(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Staged {
    let decoded = body
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice::<Term>(&bytes).map_err(|e| e.to_string()));

    let Term { key, value } = match decoded {
        Ok(term) => term,
        Err(reason) if state.strict_validation => {
            tracing::warn!(error = %reason, "Rejecting undecodable request body");
            return Staged::new(StatusCode::BAD_REQUEST, "failure in decoding term");
        }
        Err(reason) => {
            tracing::error!(error = %reason, "Failed to decode request body, inserting default term");
            Term::default()
        }
    };

    if let Err(e) = state.store.insert(key.clone(), value).await {
        if state.strict_validation {
            tracing::error!(key = %key, error = %e, "Insert failed");
            return Staged::new(StatusCode::INTERNAL_SERVER_ERROR, "failure in inserting term");
        }
        tracing::error!(key = %key, error = %e, "Insert failed, not reported to caller");
    } else {
        tracing::debug!(key = %key, "Insertion complete");
    }

    Staged::new(StatusCode::OK, "successful insertion of term")
}

fn first_value(pairs: Vec<(String, String)>, name: &str) -> Option<String> {
    pairs
        .into_iter()
        .find_map(|(key, value)| (key == name).then_some(value))
}
