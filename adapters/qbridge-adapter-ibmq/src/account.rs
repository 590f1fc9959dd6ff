//! IBM Q account session.
//!
//! An [`AccountSession`] holds at most one active account. Devices share a
//! session through [`SharedSession`] so that connecting a second device with
//! the same token reuses the account already enabled.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{IbmqError, IbmqResult};

/// Default IBM Q authentication endpoint.
pub const DEFAULT_URL: &str = "https://auth.quantum-computing.ibm.com/api";

/// Default IBM Q jobs API, paired with [`DEFAULT_URL`].
pub const DEFAULT_API_URL: &str = "https://api.quantum-computing.ibm.com/api";

/// Section of the credentials file that holds the stored account.
const CREDENTIALS_SECTION: &str = "ibmq";

/// A session shared between devices.
pub type SharedSession = Arc<RwLock<AccountSession>>;

/// An enabled account.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub token: String,
    pub url: String,
}

impl Account {
    pub fn new(token: impl Into<String>, url: Option<String>) -> Self {
        Self {
            token: token.into(),
            url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
        }
    }

    /// Base URL for the jobs API.
    ///
    /// The default authentication URL pairs with [`DEFAULT_API_URL`]. Any
    /// other URL (from `IBMQX_URL` or the stored account) is taken to be
    /// the jobs API itself.
    pub fn api_endpoint(&self) -> &str {
        if self.url == DEFAULT_URL {
            DEFAULT_API_URL
        } else {
            &self.url
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .finish()
    }
}

/// What [`AccountSession::connect`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// No account was active; the given token was enabled.
    Enabled,
    /// A different account was active and has been replaced.
    Switched,
    /// The given token was already active.
    AlreadyActive,
    /// No token was given and an account was already active.
    Reused,
    /// No token was given; the stored account was loaded.
    Loaded,
}

#[derive(Debug, Default)]
pub struct AccountSession {
    active: Option<Account>,
    credentials_path: Option<PathBuf>,
}

impl AccountSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read stored credentials from `path` instead of `~/.qiskit/qiskitrc`.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    pub fn set_credentials_path(&mut self, path: impl Into<PathBuf>) {
        self.credentials_path = Some(path.into());
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }

    pub fn active(&self) -> Option<&Account> {
        self.active.as_ref()
    }

    /// `~/.qiskit/qiskitrc`.
    pub fn default_credentials_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qiskit").join("qiskitrc"))
    }

    /// Make `token` the active account.
    pub fn enable_account(&mut self, token: &str, url: Option<&str>) -> IbmqResult<&Account> {
        validate_token(token)?;
        if let Some(active) = &self.active {
            return Err(IbmqError::AccountError(format!(
                "An account is already in use ({}). Disable it first.",
                active.url
            )));
        }
        let account = Account::new(token, url.map(str::to_string));
        info!(url = %account.url, "Enabled IBM Q account");
        Ok(&*self.active.insert(account))
    }

    /// Forget the active account.
    pub fn disable_account(&mut self) -> IbmqResult<()> {
        match self.active.take() {
            Some(account) => {
                debug!(url = %account.url, "Disabled IBM Q account");
                Ok(())
            }
            None => Err(IbmqError::AccountError("No account is in use.".into())),
        }
    }

    /// Enable the account stored in the credentials file.
    pub fn load_account(&mut self) -> IbmqResult<&Account> {
        let path = self
            .credentials_path
            .clone()
            .or_else(Self::default_credentials_path)
            .ok_or_else(|| IbmqError::AccountError("Cannot locate the home directory".into()))?;
        let account = read_credentials(&path)?;
        validate_token(&account.token)?;
        info!(path = %path.display(), "Loaded stored IBM Q account");
        self.active = None;
        Ok(&*self.active.insert(account))
    }

    /// Make sure an account is active.
    ///
    /// With a token, the token becomes the active account unless it already
    /// is. Without one, an active account is reused, and failing that the
    /// stored account is loaded.
    pub fn connect(&mut self, token: Option<&str>, url: Option<&str>) -> IbmqResult<ConnectOutcome> {
        match (token.filter(|t| !t.is_empty()), &self.active) {
            (Some(token), None) => {
                self.enable_account(token, url)?;
                Ok(ConnectOutcome::Enabled)
            }
            (Some(token), Some(active)) if active.token == token => Ok(ConnectOutcome::AlreadyActive),
            (Some(token), Some(_)) => {
                self.disable_account()?;
                self.enable_account(token, url)?;
                Ok(ConnectOutcome::Switched)
            }
            (None, Some(_)) => Ok(ConnectOutcome::Reused),
            (None, None) => match self.load_account() {
                Ok(_) => Ok(ConnectOutcome::Loaded),
                Err(e) => {
                    debug!("No stored IBM Q account: {e}");
                    Err(IbmqError::NoAccount)
                }
            },
        }
    }
}

fn validate_token(token: &str) -> IbmqResult<()> {
    if token.is_empty() || token.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(IbmqError::InvalidToken);
    }
    Ok(())
}

/// Read the `[ibmq]` section of a qiskitrc-style file.
fn read_credentials(path: &Path) -> IbmqResult<Account> {
    let text = std::fs::read_to_string(path).map_err(|source| IbmqError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (token, url) = parse_credentials(&text);
    let token = token.ok_or_else(|| {
        IbmqError::AccountError(format!(
            "No token in the [{CREDENTIALS_SECTION}] section of {}",
            path.display()
        ))
    })?;
    Ok(Account::new(token, url))
}

fn parse_credentials(text: &str) -> (Option<String>, Option<String>) {
    let mut in_section = false;
    let mut token = None;
    let mut url = None;
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == CREDENTIALS_SECTION;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "token" => token = Some(value).filter(|v| !v.is_empty()),
            "url" => url = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }
    (token, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let text = "\
[other]
token = not-this-one

[ibmq]
token = abc123
url = https://example.com/api
verify = True
";
        let (token, url) = parse_credentials(text);
        assert_eq!(token.as_deref(), Some("abc123"));
        assert_eq!(url.as_deref(), Some("https://example.com/api"));
    }

    #[test]
    fn test_parse_credentials_without_section() {
        let (token, url) = parse_credentials("token = abc\n");
        assert!(token.is_none());
        assert!(url.is_none());
    }

    #[test]
    fn test_account_debug_redacts_token() {
        let account = Account::new("secret", None);
        let debug = format!("{account:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains(DEFAULT_URL));
    }

    #[test]
    fn test_api_endpoint_is_not_the_auth_url() {
        let account = Account::new("t", None);
        assert_eq!(account.url, DEFAULT_URL);
        assert_eq!(account.api_endpoint(), DEFAULT_API_URL);

        let custom = Account::new("t", Some("https://jobs.example.com/api".into()));
        assert_eq!(custom.api_endpoint(), "https://jobs.example.com/api");
    }

    #[test]
    fn test_enable_twice_requires_disable() {
        let mut session = AccountSession::new();
        session.enable_account("a", None).unwrap();
        assert!(matches!(
            session.enable_account("b", None),
            Err(IbmqError::AccountError(_))
        ));
        session.disable_account().unwrap();
        assert!(session.disable_account().is_err());
    }

    #[test]
    fn test_invalid_token() {
        let mut session = AccountSession::new();
        assert!(matches!(
            session.enable_account("has space", None),
            Err(IbmqError::InvalidToken)
        ));
        assert!(session.active().is_none());
    }

    #[test]
    fn test_connect_transitions() {
        let mut session = AccountSession::new();
        assert_eq!(
            session.connect(Some("a"), Some("https://u")).unwrap(),
            ConnectOutcome::Enabled
        );
        assert_eq!(session.active().unwrap().url, "https://u");
        assert_eq!(session.connect(Some("a"), None).unwrap(), ConnectOutcome::AlreadyActive);
        assert_eq!(session.connect(None, None).unwrap(), ConnectOutcome::Reused);
        assert_eq!(session.connect(Some("b"), None).unwrap(), ConnectOutcome::Switched);
        let active = session.active().unwrap();
        assert_eq!(active.token, "b");
        assert_eq!(active.url, DEFAULT_URL);
    }

    #[test]
    fn test_connect_without_anything() {
        let mut session = AccountSession::new().with_credentials_path("/nonexistent/qiskitrc");
        let err = session.connect(None, None).unwrap_err();
        assert!(matches!(err, IbmqError::NoAccount));
        assert_eq!(
            err.to_string(),
            "No active IBM Q account, and no IBM Q token provided."
        );
    }
}
