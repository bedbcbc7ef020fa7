use serde::{Deserialize, Serialize};

/// Where, and as whom, to reach the orchestration server.
///
/// Constructed once by the caller and read-only afterwards. The credential
/// doubles as a password where the server authenticates that way; no
/// distinction is made between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Host name, optionally carrying an explicit scheme
    /// (`https://ci.example.com`). Bare hosts are reached over `http`.
    pub host: String,
    pub port: u16,
    pub user: String,
    /// API token or password for the user.
    pub credential: String,
}

impl ConnectionSettings {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            credential: credential.into(),
        }
    }
}

/// A local development orchestrator.
impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::new("http://localhost", 8080, "anonymous", "")
    }
}
