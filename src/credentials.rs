//! Credential selection.
//!
//! The host decides where API keys come from. The generator only asks whether one
//! is chosen, asks the host to choose one, and reads it.

use crate::error::{AnimakerError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;

/// Environment variables checked for an API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Host capability for choosing and reading the API key.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns true if a credential has been chosen.
    async fn has_credential(&self) -> bool;

    /// Asks the user to choose a credential.
    async fn select_credential(&self) -> Result<()>;

    /// Returns the chosen credential, if any.
    async fn credential(&self) -> Option<String>;
}

/// A fixed credential, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    key: Option<String>,
}

impl StaticCredentials {
    /// Uses the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    /// No key; every job fails authentication.
    pub fn none() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn has_credential(&self) -> bool {
        self.key.is_some()
    }

    async fn select_credential(&self) -> Result<()> {
        Err(AnimakerError::Auth(
            "this credential is fixed and cannot be re-selected".into(),
        ))
    }

    async fn credential(&self) -> Option<String> {
        self.key.clone()
    }
}

/// Reads the key from `GOOGLE_API_KEY`, falling back to `API_KEY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    fn lookup() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn has_credential(&self) -> bool {
        Self::lookup().is_some()
    }

    async fn select_credential(&self) -> Result<()> {
        Err(AnimakerError::Auth(format!(
            "no API key selected. Set {} to a Gemini API key with Veo access \
             (billing: https://ai.google.dev/gemini-api/docs/billing)",
            API_KEY_ENV_VARS.join(" or ")
        )))
    }

    async fn credential(&self) -> Option<String> {
        Self::lookup()
    }
}

/// Asks for the key on the terminal and keeps it in memory.
///
/// Starts from an initial key (usually the environment's) if one is given.
#[derive(Debug, Default)]
pub struct PromptCredentials {
    key: RwLock<Option<String>>,
}

impl PromptCredentials {
    /// Creates a provider holding `initial` until the user picks another key.
    pub fn new(initial: Option<String>) -> Self {
        Self {
            key: RwLock::new(initial),
        }
    }

    /// Creates a provider seeded from the environment.
    pub fn from_env() -> Self {
        Self::new(EnvCredentials::lookup())
    }
}

#[async_trait]
impl CredentialProvider for PromptCredentials {
    async fn has_credential(&self) -> bool {
        self.key.read().await.is_some()
    }

    async fn select_credential(&self) -> Result<()> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(b"Enter a Google AI API key with Veo access: ")
            .await?;
        stderr.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        let key = line.trim();
        if key.is_empty() {
            return Err(AnimakerError::Auth("no API key entered".into()));
        }

        *self.key.write().await = Some(key.to_string());
        tracing::info!("API key selected");
        Ok(())
    }

    async fn credential(&self) -> Option<String> {
        self.key.read().await.clone()
    }
}
