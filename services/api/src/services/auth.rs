//! services/api/src/services/auth.rs
//!
//! Registration, login and session resolution on top of the `DatabaseService` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use study_cards_core::domain::{AuthSession, SessionUser, User};
use study_cards_core::ports::{DatabaseService, PortError};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("All fields are required")]
    MissingField,
    #[error("Email and password required")]
    MissingCredentials,
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Failed to hash password")]
    Hashing,
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),
}

/// Handles user accounts and server-side login sessions.
#[derive(Clone)]
pub struct AuthService {
    db: Arc<dyn DatabaseService>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(db: Arc<dyn DatabaseService>, session_ttl: Duration) -> Self {
        Self { db, session_ttl }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Creates a new account. Does not log the user in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingField);
        }

        match self.db.get_user_by_email(email).await {
            Ok(_) => return Err(AuthError::DuplicateEmail),
            Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                AuthError::Hashing
            })?
            .to_string();

        let user = self
            .db
            .create_user(username, email, &password_hash)
            .await
            .map_err(|e| match e {
                PortError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Port(other),
            })?;

        info!(user_id = %user.user_id, "Registered new user");
        Ok(user)
    }

    /// Verifies the credentials and opens a new session for the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let credentials = match self.db.get_user_by_email(email).await {
            Ok(credentials) => credentials,
            Err(PortError::NotFound(_)) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        let parsed_hash = PasswordHash::new(&credentials.hashed_password).map_err(|e| {
            warn!(user_id = %credentials.user_id, "Stored password hash is unreadable: {:?}", e);
            AuthError::InvalidCredentials
        })?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(AuthError::InvalidCredentials);
        }

        let session = AuthSession {
            id: Uuid::new_v4().to_string(),
            user_id: credentials.user_id,
            expires_at: Utc::now() + self.session_ttl,
        };
        self.db
            .create_auth_session(&session.id, session.user_id, session.expires_at)
            .await?;

        info!(user_id = %session.user_id, "User logged in");
        Ok(session)
    }

    /// Drops the session behind the cookie, if there is one.
    pub async fn logout(&self, session_id: Option<&str>) -> Result<(), AuthError> {
        if let Some(session_id) = session_id {
            self.db.delete_auth_session(session_id).await?;
        }
        Ok(())
    }

    /// Resolves a session cookie to the logged-in user.
    pub async fn current_user(&self, session_id: Option<&str>) -> Option<SessionUser> {
        let session_id = session_id?;
        match self.db.validate_auth_session(session_id).await {
            Ok(user) => Some(user),
            Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => None,
            Err(e) => {
                error!("Failed to validate auth session: {:?}", e);
                None
            }
        }
    }

    pub async fn is_authenticated(&self, session_id: Option<&str>) -> bool {
        self.current_user(session_id).await.is_some()
    }
}
