use reqwest::StatusCode;
use reqwest::header::{HeaderMap, SET_COOKIE};
use thiserror::Error;
use url::Url;

/// A failure at the HTTP layer.
///
/// This is the only error class the engine itself produces. It is caught at
/// exactly one boundary — [`run`](crate::run) converts it into
/// [`Outcome::Error`](gantry_types::Outcome::Error) — while
/// [`run_or_fail`](crate::run_or_fail) hands it to the caller unconverted.
/// Failures raised inside embedded effects are never intercepted anywhere.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection settings do not form a usable endpoint.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    Endpoint { endpoint: String, reason: String },

    /// The pooled HTTP client could not be built.
    #[error("could not prepare the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a usable response: connection refused,
    /// timeout, malformed response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but with a status the call does not accept.
    ///
    /// Carries the refusing response's status and headers, plus its session
    /// cookies as an opaque marker.
    #[error("{url} answered {status}")]
    Rejected {
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        session: Vec<String>,
    },
}

impl TransportError {
    /// The HTTP status of a refused response, when that is what failed.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Rejected { status, .. } => Some(*status),
            TransportError::Endpoint { .. }
            | TransportError::Client(_)
            | TransportError::Transport { .. } => None,
        }
    }

    pub(crate) fn refused(url: Url, status: StatusCode, headers: HeaderMap) -> Self {
        let session = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_owned))
            .collect();
        TransportError::Rejected {
            url,
            status,
            headers,
            session,
        }
    }
}
