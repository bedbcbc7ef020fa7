use std::convert::Infallible;

use gantry_types::{ConnectionSettings, Outcome, Route};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::error::TransportError;
use crate::interpret::{Flow, interpret};
use crate::program::Program;
use crate::template::{MAX_REDIRECTS, RequestTemplate};

/// The pooled connection manager for one top-level run.
///
/// reqwest fixes the redirect policy per client rather than per request, so
/// the manager holds two pooled clients: one following redirects for reads,
/// one with redirects disabled for writes (and for any template that turns
/// following off). Both are safe to share across concurrent branches; their
/// pools are released when the manager drops at the end of the run.
pub(crate) struct Connection {
    following: Client,
    direct: Client,
}

impl Connection {
    pub(crate) fn open() -> Result<Self, TransportError> {
        let following = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(TransportError::Client)?;
        let direct = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { following, direct })
    }

    /// GET `route` under `template`: the template supplies headers,
    /// timeout, redirect policy, and the status-acceptance predicate.
    pub(crate) async fn fetch(
        &self,
        template: &RequestTemplate,
        route: &Route,
    ) -> Result<Vec<u8>, TransportError> {
        let url = template.resolve(route);
        let client = if template.follows_redirects() {
            &self.following
        } else {
            &self.direct
        };
        debug!(%url, "GET");
        let response = client
            .get(url.clone())
            .headers(template.headers().clone())
            .timeout(template.timeout())
            .send()
            .await
            .map_err(|source| TransportError::Transport {
                url: url.clone(),
                source,
            })?;
        if template.accepts(response.status()) {
            read_body(url, response).await
        } else {
            Err(refused(url, &response))
        }
    }

    /// POST `payload` to `route` under `template`. Redirects are never
    /// followed and any status in [200, 400) counts as success, regardless
    /// of the template's own policy.
    pub(crate) async fn submit(
        &self,
        template: &RequestTemplate,
        route: &Route,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        let url = template.resolve(route);
        debug!(%url, bytes = payload.len(), "POST");
        let response = self
            .direct
            .post(url.clone())
            .headers(template.headers().clone())
            .timeout(template.timeout())
            .body(payload)
            .send()
            .await
            .map_err(|source| TransportError::Transport {
                url: url.clone(),
                source,
            })?;
        if submit_accepts(response.status()) {
            read_body(url, response).await
        } else {
            Err(refused(url, &response))
        }
    }
}

fn submit_accepts(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

fn refused(url: Url, response: &Response) -> TransportError {
    let status = response.status();
    warn!(%url, %status, "refused");
    TransportError::refused(url, status, response.headers().clone())
}

async fn read_body(url: Url, response: Response) -> Result<Vec<u8>, TransportError> {
    response
        .bytes()
        .await
        .map(|body| body.to_vec())
        .map_err(|source| TransportError::Transport { url, source })
}

/// Run `program` against the server described by `settings`.
///
/// Opens one pooled connection manager for the lifetime of the run, seeds
/// the request template from the settings (basic auth, 20-second response
/// timeout), and drives the program to completion. Transport failures are
/// caught here — and only here — into [`Outcome::Error`]; failures raised
/// inside embedded effects propagate to the caller unchanged.
pub async fn run<T>(settings: &ConnectionSettings, program: Program<T>) -> Outcome<TransportError, T>
where
    T: Send + 'static,
{
    match drive(settings, program).await {
        Ok(Flow::Value(value)) => Outcome::Value(value),
        Ok(Flow::Aborted) => Outcome::Disconnected,
        Err(error) => Outcome::Error(error),
    }
}

/// Like [`run`], but transport failures stay on the caller's error channel
/// instead of being folded into the outcome. The `Infallible` parameter of
/// the returned outcome proves its `Error` variant cannot occur: a
/// successful return is always `Value` or `Disconnected`.
pub async fn run_or_fail<T>(
    settings: &ConnectionSettings,
    program: Program<T>,
) -> Result<Outcome<Infallible, T>, TransportError>
where
    T: Send + 'static,
{
    match drive(settings, program).await? {
        Flow::Value(value) => Ok(Outcome::Value(value)),
        Flow::Aborted => Ok(Outcome::Disconnected),
    }
}

async fn drive<T>(
    settings: &ConnectionSettings,
    program: Program<T>,
) -> Result<Flow<T>, TransportError>
where
    T: Send + 'static,
{
    let template = RequestTemplate::for_settings(settings)?;
    let connection = Connection::open()?;
    interpret(&connection, template, program).await
}
