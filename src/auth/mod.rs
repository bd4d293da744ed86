//! Sign-in and sign-up against a managed authentication backend.
//!
//! The app only talks to [`AuthProvider`]; [`FirebaseAuth`] is the concrete
//! backend used when an API key is configured.

mod firebase;

pub use firebase::{classify_error_code, FirebaseAuth, DEFAULT_AUTH_BASE_URL};

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// An authenticated user.
///
/// Custom Debug impl keeps the id token out of logs.
pub struct Session {
    pub uid: String,
    pub email: String,
    pub id_token: SecretString,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// Classified authentication failure.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No such account, or the account is disabled
    #[error("Unknown or disabled user")]
    InvalidUser,
    /// Wrong password or malformed email/password
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Sign-up with an email that already has an account
    #[error("Account already exists")]
    Collision,
    /// Sign-up password rejected as too weak
    #[error("Password too weak")]
    WeakPassword,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Authentication failed: {0}")]
    Unknown(String),
}

/// Which button the user pressed; messages differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignIn,
    SignUp,
}

/// Human-readable message for an auth failure.
pub fn friendly_message(err: &AuthError, action: AuthAction) -> &'static str {
    let is_sign_in = action == AuthAction::SignIn;
    match err {
        AuthError::InvalidUser if is_sign_in => {
            "We couldn't find an account with that email. Try signing up."
        }
        AuthError::InvalidUser => "This email isn't recognized.",
        AuthError::InvalidCredentials if is_sign_in => {
            "Incorrect email or password. Please try again."
        }
        AuthError::InvalidCredentials => "That doesn't look like a valid email or password.",
        AuthError::Collision => "An account with this email already exists. Try logging in.",
        AuthError::WeakPassword => "Password is too weak. Try at least 6-8 characters.",
        AuthError::Network(_) | AuthError::Unknown(_) if is_sign_in => {
            "Couldn't log in right now. Check your email/password or try again later."
        }
        AuthError::Network(_) | AuthError::Unknown(_) => {
            "Couldn't create your account. Please try again."
        }
    }
}

/// Email/password authentication capability.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError>;
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Session, AuthError>;
}
