//! In-memory port implementations shared by the unit tests and the router tests.
//!
//! Compiled for `cfg(test)` and behind the `test-util` feature.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use study_cards_core::domain::{SessionUser, User, UserCredentials};
use study_cards_core::ports::{
    DatabaseService, PortError, PortResult, SpeechToTextService, TextGenerationService,
};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryDb {
    users: Mutex<Vec<UserCredentials>>,
    sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
    sessions_created: AtomicUsize,
}

impl MemoryDb {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(PortError::Conflict(email.to_string()));
        }
        let credentials = UserCredentials {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        users.push(credentials.clone());
        Ok(User {
            user_id: credentials.user_id,
            username: credentials.username,
            email: credentials.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<SessionUser> {
        let (user_id, expires_at) = self
            .sessions
            .lock()
            .unwrap()
            .get(session_id)
            .copied()
            .ok_or(PortError::Unauthorized)?;
        if expires_at <= Utc::now() {
            return Err(PortError::Unauthorized);
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| SessionUser {
                user_id: u.user_id,
                email: u.email.clone(),
                username: u.username.clone(),
            })
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }
}

/// Replies with a fixed text (or a network error) and counts the prompts it received.
pub struct ScriptedLlm {
    reply: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerationService for ScriptedLlm {
    async fn generate_text(&self, prompt: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| PortError::Network("connection reset".to_string()))
    }
}

/// Returns fixed segments and records the bytes and name of the file it was handed.
pub struct FakeStt {
    segments: Result<Vec<String>, String>,
    seen: Mutex<Option<(String, Vec<u8>)>>,
}

impl FakeStt {
    pub fn with_segments(segments: &[&str]) -> Self {
        Self {
            segments: Ok(segments.iter().map(|s| s.to_string()).collect()),
            seen: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            segments: Err(message.to_string()),
            seen: Mutex::new(None),
        }
    }

    pub fn seen(&self) -> Option<(String, Vec<u8>)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechToTextService for FakeStt {
    async fn transcribe_file(&self, path: &Path) -> PortResult<Vec<String>> {
        let bytes = std::fs::read(path).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        *self.seen.lock().unwrap() = Some((name, bytes));
        self.segments.clone().map_err(PortError::Unexpected)
    }
}
