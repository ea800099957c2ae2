//! Tests for credential loading, token caching and the authorization flow.

use std::fs;
use std::path::Path;

use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::tempdir;

use drive_tree::auth::{load_client_config, load_or_authenticate, load_token, save_token};
use drive_tree::models::StoredToken;
use drive_tree::{CodePrompt, DriveError, Result};

/// Records the URL it was shown and answers with a fixed code.
struct RecordingPrompt {
    code: String,
    shown: Option<String>,
}

impl RecordingPrompt {
    fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            shown: None,
        }
    }
}

impl CodePrompt for RecordingPrompt {
    fn prompt_for_code(&mut self, auth_url: &str) -> Result<String> {
        self.shown = Some(auth_url.to_string());
        Ok(self.code.clone())
    }
}

fn write_credentials(path: &Path, token_uri: &str) {
    let doc = json!({"installed": {
        "client_id": "cid.apps.googleusercontent.com",
        "client_secret": "shh",
        "auth_uri": "https://accounts.example/o/oauth2/auth",
        "token_uri": token_uri
    }});
    fs::write(path, doc.to_string()).unwrap();
}

fn cached_token(access: &str) -> StoredToken {
    StoredToken {
        access_token: access.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expiry: None,
    }
}

mod client_config {
    use super::*;

    #[test]
    fn reads_installed_client() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        write_credentials(&path, "https://oauth2.example/token");

        let config = load_client_config(&path).unwrap();
        assert_eq!(config.client_id, "cid.apps.googleusercontent.com");
        assert_eq!(config.token_uri, "https://oauth2.example/token");
    }

    #[test]
    fn reads_web_client() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"web": {"client_id": "w", "client_secret": "s"}}"#).unwrap();

        assert_eq!(load_client_config(&path).unwrap().client_id, "w");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_client_config("/nonexistent/path/credentials.json");
        assert!(matches!(result, Err(DriveError::CredentialsFile { .. })));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not valid json").unwrap();

        assert!(matches!(load_client_config(&path), Err(DriveError::CredentialsParse(_))));
    }

    #[test]
    fn document_without_client_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"type": "service_account"}"#).unwrap();

        assert!(matches!(load_client_config(&path), Err(DriveError::InvalidCredentials(_))));
    }
}

mod token_file {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        let token = cached_token("abc");

        save_token(&path, &token).unwrap();

        assert_eq!(load_token(&path), Some(token));
    }

    #[cfg(unix)]
    #[test]
    fn saved_token_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        save_token(&path, &cached_token("abc")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_or_garbled_token_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        assert_eq!(load_token(&path), None);

        fs::write(&path, "garbage").unwrap();
        assert_eq!(load_token(&path), None);
    }
}

mod flow {
    use super::*;

    #[tokio::test]
    async fn cached_token_skips_authorization() {
        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        let token = dir.path().join("token.json");
        write_credentials(&credentials, "https://oauth2.example/token");
        save_token(&token, &cached_token("cached")).unwrap();

        let mut prompt = RecordingPrompt::new("unused");
        let auth = load_or_authenticate(&credentials, &token, &mut prompt).await.unwrap();

        assert!(prompt.shown.is_none());
        assert_eq!(auth.get_access_token().await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_prompting() {
        let dir = tempdir().unwrap();
        let mut prompt = RecordingPrompt::new("code");

        let result = load_or_authenticate(
            dir.path().join("credentials.json"),
            dir.path().join("token.json"),
            &mut prompt,
        )
        .await;

        assert!(result.is_err());
        assert!(prompt.shown.is_none());
    }

    #[tokio::test]
    async fn exchanges_code_and_persists_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "4/abc".into()),
                Matcher::UrlEncoded("client_id".into(), "cid.apps.googleusercontent.com".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "urn:ietf:wg:oauth:2.0:oob".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "access_token": "fresh",
                    "token_type": "Bearer",
                    "expires_in": 3599,
                    "refresh_token": "1//refresh"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        let token_path = dir.path().join("token.json");
        write_credentials(&credentials, &format!("{}/token", server.url()));

        let mut prompt = RecordingPrompt::new("4/abc");
        let auth = load_or_authenticate(&credentials, &token_path, &mut prompt)
            .await
            .unwrap();

        mock.assert_async().await;
        let shown = prompt.shown.unwrap();
        assert!(shown.starts_with("https://accounts.example/o/oauth2/auth?"));
        assert!(shown.contains("access_type=offline"));

        assert_eq!(auth.get_access_token().await.unwrap(), "fresh");
        let saved = load_token(&token_path).unwrap();
        assert_eq!(saved.access_token, "fresh");
        assert_eq!(saved.refresh_token.as_deref(), Some("1//refresh"));
        assert!(saved.expiry.is_some());
    }

    #[tokio::test]
    async fn failed_exchange_is_an_error_and_saves_nothing() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        let token_path = dir.path().join("token.json");
        write_credentials(&credentials, &format!("{}/token", server.url()));

        let mut prompt = RecordingPrompt::new("4/bad");
        let result = load_or_authenticate(&credentials, &token_path, &mut prompt).await;

        match result {
            Err(DriveError::TokenExchange(message)) => assert!(message.contains("invalid_grant")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("exchange should fail"),
        }
        assert!(!token_path.exists());
    }

    #[tokio::test]
    async fn empty_code_is_rejected() {
        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        write_credentials(&credentials, "https://oauth2.example/token");

        let mut prompt = RecordingPrompt::new("");
        let result =
            load_or_authenticate(&credentials, dir.path().join("token.json"), &mut prompt).await;

        assert!(matches!(result, Err(DriveError::TokenExchange(_))));
    }
}

mod refresh {
    use super::*;
    use drive_tree::auth::load_client_config;
    use drive_tree::Authenticator;
    use time::macros::datetime;

    #[tokio::test]
    async fn expired_token_is_refreshed_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
            ]))
            .with_status(200)
            .with_body(json!({"access_token": "renewed", "expires_in": 3600}).to_string())
            .expect(1)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        write_credentials(&credentials, &format!("{}/token", server.url()));
        let config = load_client_config(&credentials).unwrap();

        let mut token = cached_token("stale");
        token.expiry = Some(datetime!(2020-01-01 00:00:00 UTC));
        let auth = Authenticator::new(config, token);

        assert_eq!(auth.get_access_token().await.unwrap(), "renewed");
        assert_eq!(auth.get_access_token().await.unwrap(), "renewed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refresh_failure_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(401)
            .with_body("revoked")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        write_credentials(&credentials, &format!("{}/token", server.url()));
        let config = load_client_config(&credentials).unwrap();

        let mut token = cached_token("stale");
        token.expiry = Some(datetime!(2020-01-01 00:00:00 UTC));
        let auth = Authenticator::new(config, token);

        assert!(matches!(
            auth.get_access_token().await,
            Err(DriveError::TokenRefresh(_))
        ));
    }
}
