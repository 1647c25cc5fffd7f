use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::StatusCode;

use louie_api::retry::{has_token_expiry_signature, is_token_expiry, with_auth_retry};
use louie_api::{LouieApiError, TokenProvider};

#[test]
fn retry_expiry_signatures_are_recognized() {
    assert!(has_token_expiry_signature("JWT signature has expired"));
    assert!(has_token_expiry_signature("token has expired"));
    assert!(has_token_expiry_signature("Token is expired, please login"));
    assert!(has_token_expiry_signature(
        r#"{"detail":"Invalid authentication credentials"}"#
    ));
}

#[test]
fn retry_requires_401_and_signature() {
    assert!(is_token_expiry(401, "jwt expired"));
    assert!(!is_token_expiry(403, "jwt expired"));
    assert!(!is_token_expiry(401, "user is not a member of this org"));
    assert!(!is_token_expiry(500, "token expired"));
}

struct CountingTokens {
    issued: AtomicUsize,
    refreshes: AtomicUsize,
}

impl CountingTokens {
    fn new() -> Self {
        Self {
            issued: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
        }
    }
}

impl TokenProvider for CountingTokens {
    fn token(&self) -> Result<String, LouieApiError> {
        let generation = self.refreshes.load(Ordering::Acquire);
        self.issued.fetch_add(1, Ordering::AcqRel);
        Ok(format!("token-{generation}"))
    }

    fn refresh(&self) -> Result<(), LouieApiError> {
        self.refreshes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[tokio::test]
async fn retry_replays_once_with_refreshed_token() {
    let tokens = CountingTokens::new();
    let mut seen = Vec::new();

    let result = with_auth_retry(&tokens, |token| {
        seen.push(token.clone());
        async move {
            if token == "token-0" {
                Err(LouieApiError::status(
                    StatusCode::UNAUTHORIZED,
                    r#"{"detail":"JWT expired"}"#,
                ))
            } else {
                Ok(token)
            }
        }
    })
    .await
    .expect("replay should succeed");

    assert_eq!(result, "token-1");
    assert_eq!(seen, vec!["token-0".to_owned(), "token-1".to_owned()]);
    assert_eq!(tokens.refreshes.load(Ordering::Acquire), 1);
}

#[tokio::test]
async fn retry_does_not_refresh_for_other_failures() {
    let tokens = CountingTokens::new();
    let attempts = AtomicUsize::new(0);

    let error = with_auth_retry(&tokens, |_token| {
        attempts.fetch_add(1, Ordering::AcqRel);
        async { Err::<(), _>(LouieApiError::status(StatusCode::UNAUTHORIZED, "not allowed")) }
    })
    .await
    .expect_err("non-expiry 401 propagates");

    assert_eq!(error.http_status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(attempts.load(Ordering::Acquire), 1);
    assert_eq!(tokens.refreshes.load(Ordering::Acquire), 0);
}

#[tokio::test]
async fn retry_surfaces_second_failure() {
    let tokens = CountingTokens::new();
    let attempts = AtomicUsize::new(0);

    let error = with_auth_retry(&tokens, |_token| {
        attempts.fetch_add(1, Ordering::AcqRel);
        async {
            Err::<(), _>(LouieApiError::status(
                StatusCode::UNAUTHORIZED,
                "token has expired",
            ))
        }
    })
    .await
    .expect_err("second expiry propagates");

    assert!(error.is_token_expiry());
    assert_eq!(attempts.load(Ordering::Acquire), 2);
}
