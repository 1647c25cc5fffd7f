//! Credential seam. Acquiring and refreshing tokens belongs to an external
//! identity provider; the transport only needs these two calls.

use std::sync::{Mutex, MutexGuard};

use crate::error::LouieApiError;

pub trait TokenProvider: Send + Sync {
    /// Current bearer token.
    fn token(&self) -> Result<String, LouieApiError>;

    /// Force a refresh so the next [`TokenProvider::token`] call returns a
    /// newly issued token.
    fn refresh(&self) -> Result<(), LouieApiError>;
}

/// Fixed bearer token. Refresh is a no-op, so a rejected token fails again on
/// replay and the error reaches the caller.
#[derive(Debug)]
pub struct StaticToken {
    token: Mutex<String>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(token.into()),
        }
    }

    /// Swap in a token obtained out of band.
    pub fn replace(&self, token: impl Into<String>) {
        *lock_unpoisoned(&self.token) = token.into();
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<String, LouieApiError> {
        let token = lock_unpoisoned(&self.token);
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(LouieApiError::MissingCredentials(
                "bearer token is empty".to_owned(),
            ));
        }
        Ok(trimmed.to_owned())
    }

    fn refresh(&self) -> Result<(), LouieApiError> {
        Ok(())
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
