use anyhow::{Context, Result};

use super::{get_token, get_token_from_env, store_token, CredentialError, ENV_TOKEN_VAR};

/// Prompts user to enter GitHub personal access token
pub fn prompt_for_token() -> Result<String> {
    eprintln!("GitHub personal access token required.");
    eprintln!("Create one at: https://github.com/settings/personal-access-tokens");
    eprintln!("It needs read and write access to the contents of your data repository.");
    eprintln!();

    let token =
        rpassword::prompt_password("Enter token: ").context("Failed to read token from stdin")?;

    let token = token.trim();

    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    Ok(token.to_string())
}

/// Re-prompts for token when the existing one is rejected by GitHub
pub async fn reprompt_for_token() -> Result<String> {
    eprintln!();
    eprintln!("Your GitHub token was rejected (invalid or expired).");
    eprintln!("Please provide a new token.");
    eprintln!();

    let token = prompt_for_token()?;

    store_token(token.clone())
        .await
        .context("Failed to store new token in keyring")?;

    eprintln!("New token stored securely in system keyring.");

    Ok(token)
}

/// Find a token: the environment variable first, then the keyring, then
/// an interactive prompt whose answer is saved to the keyring.
pub async fn resolve_token() -> Result<String> {
    if let Some(token) = get_token_from_env() {
        log::debug!("using token from {}", ENV_TOKEN_VAR);
        return Ok(token);
    }

    match get_token().await {
        Ok(token) => Ok(token),
        Err(CredentialError::TokenNotFound) => {
            let token = prompt_for_token()?;

            store_token(token.clone())
                .await
                .context("Failed to store token in keyring")?;

            eprintln!("Token stored securely in system keyring.");

            Ok(token)
        }
        Err(CredentialError::KeyringUnavailable(msg)) => {
            anyhow::bail!(
                "System keyring unavailable. Set {} or configure a proxy_url instead.\n\
                Error: {}",
                ENV_TOKEN_VAR,
                msg
            );
        }
        Err(e) => {
            anyhow::bail!("Failed to access keyring: {}", e);
        }
    }
}
