use super::{AuthError, AuthProvider, Session};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an Identity Toolkit error message to an [`AuthError`].
///
/// Messages are upper-case codes, sometimes followed by detail text
/// (`"WEAK_PASSWORD : Password should be at least 6 characters"`).
pub fn classify_error_code(message: &str) -> AuthError {
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_NOT_FOUND" | "USER_DISABLED" => AuthError::InvalidUser,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" | "MISSING_EMAIL"
        | "MISSING_PASSWORD" => AuthError::InvalidCredentials,
        "EMAIL_EXISTS" => AuthError::Collision,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        _ => AuthError::Unknown(message.to_string()),
    }
}

/// Email/password auth over the Firebase Identity Toolkit REST API.
pub struct FirebaseAuth {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl FirebaseAuth {
    pub fn new(client: reqwest::Client, api_key: SecretString) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_AUTH_BASE_URL)
    }

    /// Point at a different Identity Toolkit host (emulator, tests).
    pub fn with_base_url(client: reqwest::Client, api_key: SecretString, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self, method: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&format!("{}/v1/accounts:{}", self.base_url, method))
            .map_err(|e| AuthError::Unknown(format!("Invalid auth URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    async fn password_request(
        &self,
        method: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let body = serde_json::to_vec(&PasswordRequest {
            email,
            password: password.expose_secret(),
            return_secure_token: true,
        })
        .map_err(|e| AuthError::Unknown(e.to_string()))?;

        let response = self
            .client
            .post(self.endpoint(method)?)
            .header(CONTENT_TYPE, "application/json")
            .timeout(REQUEST_TIMEOUT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
                Ok(envelope) => classify_error_code(&envelope.error.message),
                Err(_) => AuthError::Unknown(format!("HTTP {}", status.as_u16())),
            };
            tracing::info!(method, status = status.as_u16(), error = %err, "Auth request rejected");
            return Err(err);
        }

        let parsed: PasswordResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::Unknown(format!("Malformed auth response: {e}")))?;

        tracing::info!(method, uid = %parsed.local_id, "Auth request succeeded");
        Ok(Session {
            uid: parsed.local_id,
            email: parsed.email.unwrap_or_else(|| email.to_string()),
            id_token: SecretString::from(parsed.id_token),
        })
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        self.password_request("signInWithPassword", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        self.password_request("signUp", email, password).await
    }
}
