//! Optional process-wide cursor for interactive use.
//!
//! Lifecycle:
//! - [`with_global`] builds the cursor from the environment on first use.
//! - [`install_global`] replaces it with an explicitly constructed cursor.
//! - [`reset_global`] drops it; the next [`with_global`] starts over.
//!
//! Library code should construct a [`Cursor`] and pass it around instead.

use std::sync::{Mutex, MutexGuard, OnceLock};

use louie_api::LouieApiError;

use crate::cursor::Cursor;

fn slot() -> MutexGuard<'static, Option<Cursor>> {
    static GLOBAL: OnceLock<Mutex<Option<Cursor>>> = OnceLock::new();
    let mutex = GLOBAL.get_or_init(|| Mutex::new(None));
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Run `f` against the global cursor, creating it from the environment if
/// none is installed. The lock is held for the duration of `f`.
pub fn with_global<T>(f: impl FnOnce(&mut Cursor) -> T) -> Result<T, LouieApiError> {
    let mut slot = slot();
    let cursor = match slot.take() {
        Some(cursor) => cursor,
        None => {
            tracing::debug!("initializing global cursor from environment");
            Cursor::from_env()?
        }
    };
    Ok(f(slot.insert(cursor)))
}

/// Replace the global cursor, returning the previous one.
pub fn install_global(cursor: Cursor) -> Option<Cursor> {
    slot().replace(cursor)
}

pub fn reset_global() -> Option<Cursor> {
    slot().take()
}
