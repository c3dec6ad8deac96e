pub mod prompt;

use keyring::Entry;

const SERVICE_NAME: &str = "coasterbook";
const TOKEN_KEY: &str = "github-token";

/// Environment variable name for providing a GitHub token without keyring
pub const ENV_TOKEN_VAR: &str = "COASTERBOOK_GH_TOKEN";

pub use prompt::{prompt_for_token, reprompt_for_token, resolve_token};

/// Trimmed token, or None when blank.
fn clean_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Check for a GitHub token in the COASTERBOOK_GH_TOKEN environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    std::env::var(ENV_TOKEN_VAR)
        .ok()
        .and_then(|val| clean_token(&val))
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Keyring unavailable: {0}")]
    KeyringUnavailable(String),
    #[error("Token not found in keyring")]
    TokenNotFound,
    #[error("Failed to store token: {0}")]
    StoreFailed(String),
}

fn entry() -> Result<Entry, CredentialError> {
    Entry::new(SERVICE_NAME, TOKEN_KEY).map_err(|e| CredentialError::KeyringUnavailable(e.to_string()))
}

fn get_token_sync() -> Result<String, CredentialError> {
    let password = entry()?.get_password().map_err(|e| match e {
        keyring::Error::NoEntry => CredentialError::TokenNotFound,
        _ => CredentialError::KeyringUnavailable(e.to_string()),
    })?;
    clean_token(&password).ok_or(CredentialError::TokenNotFound)
}

fn store_token_sync(token: &str) -> Result<(), CredentialError> {
    entry()?
        .set_password(token)
        .map_err(|e| CredentialError::StoreFailed(e.to_string()))
}

fn delete_token_sync() -> Result<(), CredentialError> {
    match entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(CredentialError::KeyringUnavailable(e.to_string())),
    }
}

/// Retrieve the token from the system keyring.
/// Uses spawn_blocking to prevent blocking the async runtime
pub async fn get_token() -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(get_token_sync)
        .await
        .map_err(|e| CredentialError::KeyringUnavailable(format!("Task join error: {}", e)))?
}

/// Store the token in the system keyring.
pub async fn store_token(token: String) -> Result<(), CredentialError> {
    tokio::task::spawn_blocking(move || store_token_sync(&token))
        .await
        .map_err(|e| CredentialError::KeyringUnavailable(format!("Task join error: {}", e)))?
}

/// Forget the stored token. Missing tokens are not an error.
pub async fn delete_token() -> Result<(), CredentialError> {
    tokio::task::spawn_blocking(delete_token_sync)
        .await
        .map_err(|e| CredentialError::KeyringUnavailable(format!("Task join error: {}", e)))?
}
