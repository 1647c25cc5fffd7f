use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::LouieApiConfig;
use crate::error::LouieApiError;

pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_ORG: &str = "X-Graphistry-Org";
pub const HEADER_USER_AGENT: &str = "User-Agent";

/// Build a deterministic header map for an authenticated Louie request.
pub fn build_headers(
    config: &LouieApiConfig,
    token: &str,
) -> Result<BTreeMap<String, String>, LouieApiError> {
    let mut headers = BTreeMap::new();

    if token.trim().is_empty() {
        return Err(LouieApiError::MissingCredentials(
            "bearer token is empty".to_owned(),
        ));
    }

    headers.insert(
        HEADER_AUTHORIZATION.to_owned(),
        format!("Bearer {}", token.trim()),
    );

    if let Some(slug) = config
        .org_name
        .as_deref()
        .map(org_slug)
        .filter(|slug| !slug.is_empty())
    {
        headers.insert(HEADER_ORG.to_owned(), slug);
    }

    let ua = match config.user_agent.as_deref() {
        Some(explicit) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        _ => default_user_agent(),
    };
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

fn non_alphanumeric_run() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug regex must compile"))
}

/// Lowercase, collapse every non-alphanumeric run to one `-`, trim dashes.
pub fn org_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    non_alphanumeric_run()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_owned()
}

fn default_user_agent() -> String {
    format!("louie-rs/{}", env!("CARGO_PKG_VERSION"))
}
