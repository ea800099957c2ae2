//! OAuth2 installed-app authentication for the Drive API.
//!
//! The client secret comes from `credentials.json`; the session token is
//! cached in `token.json` so the interactive step only happens once.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use reqwest::{Client, Url};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{DriveError, Result};
use crate::models::{ClientConfig, ClientSecretFile, StoredToken, TokenResponse};

/// Google Drive API scope.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Out-of-band redirect: the consent page shows the code for the operator to copy.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

const AUTH_STATE: &str = "state-token";

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_BUFFER: time::Duration = time::Duration::seconds(60);

/// Source of the one-time authorization code.
pub trait CodePrompt {
    /// Show `auth_url` to whoever can approve access and return the code they obtained.
    fn prompt_for_code(&mut self, auth_url: &str) -> Result<String>;
}

/// A code obtained ahead of time, for non-interactive runs.
pub struct StaticCode(pub String);

impl CodePrompt for StaticCode {
    fn prompt_for_code(&mut self, auth_url: &str) -> Result<String> {
        debug!(%auth_url, "using pre-supplied authorization code");
        Ok(self.0.trim().to_string())
    }
}

/// Read the OAuth client from a `credentials.json` document.
pub fn load_client_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DriveError::CredentialsFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ClientSecretFile = serde_json::from_str(&content)?;

    let config = file.installed.or(file.web).ok_or_else(|| {
        DriveError::InvalidCredentials("expected an \"installed\" or \"web\" client".to_string())
    })?;
    if config.client_id.is_empty() {
        return Err(DriveError::InvalidCredentials("client_id is empty".to_string()));
    }
    Ok(config)
}

/// Read a cached token. Any read or parse failure means "no usable token".
pub fn load_token<P: AsRef<Path>>(path: P) -> Option<StoredToken> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no cached token");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable token file");
            None
        }
    }
}

/// Persist a token, readable and writable by the owner only.
pub fn save_token<P: AsRef<Path>>(path: P, token: &StoredToken) -> Result<()> {
    let path = path.as_ref();
    let to_save_error = |source: std::io::Error| DriveError::TokenSave {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(to_save_error)?;
    let json = serde_json::to_vec_pretty(token)
        .map_err(|e| to_save_error(std::io::Error::other(e)))?;
    file.write_all(&json).map_err(to_save_error)?;

    // `mode` only applies on creation; tighten a pre-existing file as well.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(to_save_error)?;
    }

    info!(path = %path.display(), "saved token");
    Ok(())
}

/// Build the consent URL the operator has to open.
pub fn authorization_url(config: &ClientConfig) -> Result<String> {
    let url = Url::parse_with_params(
        &config.auth_uri,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", OOB_REDIRECT_URI),
            ("response_type", "code"),
            ("scope", DRIVE_SCOPE),
            ("access_type", "offline"),
            ("state", AUTH_STATE),
        ],
    )
    .map_err(|e| DriveError::InvalidCredentials(format!("bad auth_uri: {}", e)))?;
    Ok(url.into())
}

/// Exchange a one-time authorization code for a token.
pub async fn exchange_code(http: &Client, config: &ClientConfig, code: &str) -> Result<StoredToken> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("redirect_uri", OOB_REDIRECT_URI),
    ];

    let response = http
        .post(&config.token_uri)
        .form(&params)
        .send()
        .await
        .map_err(|e| DriveError::TokenExchange(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(DriveError::TokenExchange(format!("Status {}: {}", status, body)));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| DriveError::TokenExchange(e.to_string()))?;
    Ok(token.into_stored())
}

/// Load the cached session, or run the out-of-band authorization flow.
///
/// A cached token is trusted as-is. Without one, the authorization URL is
/// passed to `prompt`, the returned code is exchanged, and the resulting
/// token is written to `token_path`.
pub async fn load_or_authenticate<C, T, P>(
    credentials_path: C,
    token_path: T,
    prompt: &mut P,
) -> Result<Authenticator>
where
    C: AsRef<Path>,
    T: AsRef<Path>,
    P: CodePrompt + ?Sized,
{
    let config = load_client_config(credentials_path)?;

    if let Some(token) = load_token(&token_path) {
        debug!("using cached token");
        return Ok(Authenticator::new(config, token));
    }

    let auth_url = authorization_url(&config)?;
    let code = prompt.prompt_for_code(&auth_url)?;
    if code.is_empty() {
        return Err(DriveError::TokenExchange("empty authorization code".to_string()));
    }

    let http = Client::new();
    let token = exchange_code(&http, &config, &code).await?;
    save_token(&token_path, &token)?;

    Ok(Authenticator::with_client(config, token, http))
}

/// Authenticator for Google APIs holding the user's OAuth session.
#[derive(Clone)]
pub struct Authenticator {
    config: Arc<ClientConfig>,
    client: Client,
    token: Arc<RwLock<StoredToken>>,
}

impl Authenticator {
    pub fn new(config: ClientConfig, token: StoredToken) -> Self {
        Self::with_client(config, token, Client::new())
    }

    fn with_client(config: ClientConfig, token: StoredToken, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
            token: Arc::new(RwLock::new(token)),
        }
    }

    /// Get a usable access token, refreshing it when it is about to expire.
    pub async fn get_access_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if !token.expires_within(EXPIRY_BUFFER) || token.refresh_token.is_none() {
                return Ok(token.access_token.clone());
            }
        }

        let mut token = self.token.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if token.expires_within(EXPIRY_BUFFER) {
            if let Some(refresh_token) = token.refresh_token.clone() {
                *token = self.refresh(&refresh_token).await?;
            }
        }
        Ok(token.access_token.clone())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<StoredToken> {
        debug!("refreshing access token");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenRefresh(format!("Status {}: {}", status, body)));
        }

        let mut token = response.json::<TokenResponse>().await?.into_stored();
        // Refresh responses usually omit the refresh token; keep the one we had.
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }
}
