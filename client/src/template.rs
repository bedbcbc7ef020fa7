use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gantry_types::{ConnectionSettings, Route};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::TransportError;

/// How long to wait for a response before giving up on a call.
pub(crate) const RESPONSE_TIMEOUT: Duration = Duration::from_secs(20);

/// How many redirects a read call follows before failing.
pub(crate) const MAX_REDIRECTS: usize = 10;

/// The ambient shape of outbound requests: endpoint (scheme, host, port,
/// base path), headers including basic auth, response timeout, redirect
/// policy, and the status-acceptance predicate.
///
/// A template is owned by exactly one in-flight interpreter step. It is
/// never shared: a scoped sub-program gets a modified clone and the original
/// resumes untouched when the scope closes, and each branch of the
/// concurrency combinator gets its own clone, so no locking discipline
/// exists anywhere in the engine.
#[derive(Clone)]
pub struct RequestTemplate {
    endpoint: Url,
    headers: HeaderMap,
    timeout: Duration,
    follow_redirects: bool,
    accept: Arc<dyn Fn(StatusCode) -> bool + Send + Sync>,
}

impl RequestTemplate {
    /// Seed a template from connection settings: basic auth from the user
    /// and credential, the default response timeout, redirect following on,
    /// and 2xx acceptance.
    pub(crate) fn for_settings(settings: &ConnectionSettings) -> Result<Self, TransportError> {
        let raw = if settings.host.contains("://") {
            settings.host.clone()
        } else {
            format!("http://{}", settings.host)
        };
        let mut endpoint = Url::parse(&raw).map_err(|error| TransportError::Endpoint {
            endpoint: raw.clone(),
            reason: error.to_string(),
        })?;
        endpoint
            .set_port(Some(settings.port))
            .map_err(|()| TransportError::Endpoint {
                endpoint: raw,
                reason: "host does not take a port".to_owned(),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            basic_auth_value(&settings.user, &settings.credential)?,
        );

        Ok(Self {
            endpoint,
            headers,
            timeout: RESPONSE_TIMEOUT,
            follow_redirects: true,
            accept: Arc::new(|status: StatusCode| status.is_success()),
        })
    }

    /// Replace the base path under which routes are resolved.
    pub fn set_base_path(&mut self, path: &str) {
        self.endpoint.set_path(path);
    }

    /// Push additional segments onto the base path.
    pub fn push_base_path(&mut self, path: &str) {
        if let Ok(mut segments) = self.endpoint.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|piece| !piece.is_empty()));
        }
    }

    /// Insert or replace a header on every subsequent request.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Authenticate subsequent requests as a different identity.
    pub fn basic_auth(&mut self, user: &str, credential: &str) {
        if let Ok(value) = basic_auth_value(user, credential) {
            self.headers.insert(AUTHORIZATION, value);
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn set_follow_redirects(&mut self, follow: bool) {
        self.follow_redirects = follow;
    }

    /// Replace the predicate deciding which response statuses count as
    /// success for read calls.
    pub fn set_acceptance(&mut self, accept: impl Fn(StatusCode) -> bool + Send + Sync + 'static) {
        self.accept = Arc::new(accept);
    }

    /// The full URL for a route under this template: base path and route
    /// segments joined with single slashes, query parameters appended.
    pub(crate) fn resolve(&self, route: &Route) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(route.segments());
        }
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in route.query_pairs() {
                query.append_pair(key, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }

    pub(crate) fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn follows_redirects(&self) -> bool {
        self.follow_redirects
    }

    pub(crate) fn accepts(&self, status: StatusCode) -> bool {
        (self.accept)(status)
    }
}

impl fmt::Debug for RequestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTemplate")
            .field("endpoint", &self.endpoint)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("follow_redirects", &self.follow_redirects)
            .finish_non_exhaustive()
    }
}

fn basic_auth_value(user: &str, credential: &str) -> Result<HeaderValue, TransportError> {
    let token = STANDARD.encode(format!("{user}:{credential}"));
    let mut value =
        HeaderValue::from_str(&format!("Basic {token}")).map_err(|error| {
            TransportError::Endpoint {
                endpoint: user.to_owned(),
                reason: format!("credentials are not header-safe: {error}"),
            }
        })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::RequestTemplate;
    use gantry_types::{ConnectionSettings, Route};
    use reqwest::StatusCode;
    use reqwest::header::AUTHORIZATION;
    use std::time::Duration;

    fn template() -> RequestTemplate {
        let settings = ConnectionSettings::new("http://ci.example.com", 8080, "ops", "s3cret");
        RequestTemplate::for_settings(&settings).unwrap()
    }

    #[test]
    fn bare_hosts_default_to_http() {
        let settings = ConnectionSettings::new("ci.example.com", 8080, "ops", "s3cret");
        let template = RequestTemplate::for_settings(&settings).unwrap();
        let url = template.resolve(&Route::from("api/json"));
        assert_eq!(url.as_str(), "http://ci.example.com:8080/api/json");
    }

    #[test]
    fn seeds_basic_auth_and_default_timeout() {
        let template = template();
        let auth = template.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Basic b3BzOnMzY3JldA==");
        assert_eq!(template.timeout(), Duration::from_secs(20));
        assert!(template.follows_redirects());
        assert!(template.accepts(StatusCode::OK));
        assert!(!template.accepts(StatusCode::NOT_FOUND));
    }

    #[test]
    fn resolve_joins_with_single_slashes() {
        let mut template = template();
        template.set_base_path("/ci/");
        let url = template.resolve(&Route::from("/job/nightly/"));
        assert_eq!(url.path(), "/ci/job/nightly");
    }

    #[test]
    fn resolve_appends_query_parameters() {
        let template = template();
        let route = Route::from("api/json").query("tree", "jobs[name]").query("depth", "1");
        let url = template.resolve(&route);
        assert_eq!(url.query(), Some("tree=jobs%5Bname%5D&depth=1"));
    }

    #[test]
    fn resolve_without_query_leaves_none() {
        let template = template();
        let url = template.resolve(&Route::from("api/json"));
        assert_eq!(url.query(), None);
    }

    #[test]
    fn scoped_style_clone_leaves_the_original_untouched() {
        let template = template();
        let mut scoped = template.clone();
        scoped.push_base_path("teams/blue");
        scoped.set_timeout(Duration::from_secs(1));

        assert_eq!(scoped.resolve(&Route::from("status")).path(), "/teams/blue/status");
        assert_eq!(template.resolve(&Route::from("status")).path(), "/status");
        assert_eq!(template.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn acceptance_predicate_is_replaceable() {
        let mut template = template();
        template.set_acceptance(|status| status.as_u16() < 500);
        assert!(template.accepts(StatusCode::NOT_FOUND));
        assert!(!template.accepts(StatusCode::BAD_GATEWAY));
    }
}
