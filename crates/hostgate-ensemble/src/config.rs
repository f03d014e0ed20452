//! Ensemble configuration value object and its TOML form.
//!
//! ```toml
//! [ensemble]
//! servers = ["zk1:2181", "zk2:2181"]
//! chroot_path = "/hostgate"
//! in_process = false
//! session_timeout = "4s"
//!
//! [ensemble.credentials]
//! user = "scheduler"
//! password = "secret"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EnsembleError, EnsembleResult};

/// Session timeout used when none is configured.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(4);

const DIGEST_SCHEME: &str = "digest";

/// An unresolved `host:port` ensemble server address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for ServerAddress {
    type Err = EnsembleError;

    fn from_str(s: &str) -> EnsembleResult<Self> {
        let invalid = || EnsembleError::InvalidAddress(s.to_string());
        let (host, port) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Authentication for ensemble sessions.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    scheme: String,
    user: String,
    password: String,
}

impl Credentials {
    /// Digest credentials (`user:password`).
    pub fn digest(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme: DIGEST_SCHEME.to_string(),
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Token presented when authenticating a session.
    pub fn authentication(&self) -> Vec<u8> {
        format!("{}:{}", self.user, self.password).into_bytes()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scheme", &self.scheme)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated ensemble configuration. Immutable; derive variants with the
/// `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsembleConfig {
    servers: Vec<ServerAddress>,
    chroot_path: Option<String>,
    in_process: bool,
    session_timeout: Duration,
    credentials: Option<Credentials>,
}

impl EnsembleConfig {
    /// Build a configuration. An empty server list is rejected before any
    /// other field is looked at.
    pub fn new(
        servers: Vec<ServerAddress>,
        chroot_path: Option<String>,
        in_process: bool,
        session_timeout: Duration,
        credentials: Option<Credentials>,
    ) -> EnsembleResult<Self> {
        if servers.is_empty() {
            return Err(EnsembleError::EmptyServers);
        }
        if let Some(path) = &chroot_path {
            if !path.starts_with('/') || (path.len() > 1 && path.ends_with('/')) {
                return Err(EnsembleError::InvalidChroot(path.clone()));
            }
        }

        Ok(Self {
            servers,
            chroot_path,
            in_process,
            session_timeout,
            credentials,
        })
    }

    /// Configuration with defaults: no chroot, not in-process,
    /// [`DEFAULT_SESSION_TIMEOUT`], no credentials.
    pub fn create(servers: Vec<ServerAddress>) -> EnsembleResult<Self> {
        Self::new(servers, None, false, DEFAULT_SESSION_TIMEOUT, None)
    }

    /// A copy of this configuration authenticating with `credentials`.
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..self.clone()
        }
    }

    pub fn servers(&self) -> &[ServerAddress] {
        &self.servers
    }

    pub fn chroot_path(&self) -> Option<&str> {
        self.chroot_path.as_deref()
    }

    /// Whether to run an embedded ensemble for testing.
    pub fn in_process(&self) -> bool {
        self.in_process
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// `host:port[,host:port...][/chroot]`
    pub fn connect_string(&self) -> String {
        let servers = self
            .servers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        match &self.chroot_path {
            Some(chroot) => format!("{servers}{chroot}"),
            None => servers,
        }
    }

    pub fn from_toml_str(content: &str) -> EnsembleResult<Self> {
        let file: EnsembleFile = toml::from_str(content)?;
        file.ensemble.into_config()
    }

    pub fn from_file(path: &Path) -> EnsembleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            servers = config.servers.len(),
            "loaded ensemble config"
        );
        Ok(config)
    }
}

// ── File form ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnsembleFile {
    ensemble: EnsembleSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct EnsembleSettings {
    servers: Vec<String>,
    chroot_path: Option<String>,
    in_process: bool,
    session_timeout: Option<String>,
    credentials: Option<CredentialSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialSettings {
    user: String,
    password: String,
}

impl EnsembleSettings {
    fn into_config(self) -> EnsembleResult<EnsembleConfig> {
        if self.servers.is_empty() {
            return Err(EnsembleError::EmptyServers);
        }
        let servers = self
            .servers
            .iter()
            .map(|s| s.parse())
            .collect::<EnsembleResult<Vec<ServerAddress>>>()?;
        let session_timeout = match &self.session_timeout {
            Some(raw) => {
                parse_duration(raw).ok_or_else(|| EnsembleError::InvalidTimeout(raw.clone()))?
            }
            None => DEFAULT_SESSION_TIMEOUT,
        };
        let credentials = self
            .credentials
            .map(|c| Credentials::digest(c.user, c.password));

        EnsembleConfig::new(
            servers,
            self.chroot_path,
            self.in_process,
            session_timeout,
            credentials,
        )
    }
}

/// Parse `"500ms"`, `"4s"`, `"2m"`, or a bare number of seconds.
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
