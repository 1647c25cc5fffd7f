use std::future::Future;
use std::sync::OnceLock;

use regex::Regex;

use crate::auth::TokenProvider;
use crate::error::LouieApiError;

fn token_expiry_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)\bjwt\b|token\b.*\bexpired|invalid authentication credentials")
            .expect("token expiry regex must compile")
    })
}

/// Error text carries an expired/invalid credential signature.
pub fn has_token_expiry_signature(error_text: &str) -> bool {
    token_expiry_regex().is_match(error_text)
}

/// Only a 401 with a recognized signature is worth a refresh-and-replay.
pub fn is_token_expiry(status: u16, error_text: &str) -> bool {
    status == 401 && has_token_expiry_signature(error_text)
}

/// Runs `operation` with a fresh token, refreshing credentials and replaying
/// exactly once when it fails with a token-expiry 401.
pub async fn with_auth_retry<T, F, Fut>(
    tokens: &dyn TokenProvider,
    mut operation: F,
) -> Result<T, LouieApiError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, LouieApiError>>,
{
    let token = tokens.token()?;
    match operation(token).await {
        Err(error) if error.is_token_expiry() => {
            tracing::info!(%error, "token rejected, refreshing credentials and retrying once");
            tokens.refresh()?;
            operation(tokens.token()?).await
        }
        other => other,
    }
}
