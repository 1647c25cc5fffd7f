/// Default base URL for the hosted Louie service.
pub const DEFAULT_LOUIE_BASE_URL: &str = "https://den.louie.ai";

/// Trim a base URL, falling back to the default when blank.
///
/// Normalization rules:
/// 1) blank input resolves to [`DEFAULT_LOUIE_BASE_URL`]
/// 2) surrounding whitespace and trailing `/` are removed
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_LOUIE_BASE_URL
    } else {
        input.trim()
    };
    base.trim_end_matches('/').to_string()
}

/// Streaming chat endpoint. The trailing slash is part of the route.
pub fn chat_endpoint(base: &str) -> String {
    format!("{}/api/chat/", normalize_base_url(base))
}

pub fn threads_endpoint(base: &str) -> String {
    format!("{}/api/dthreads", normalize_base_url(base))
}

pub fn thread_endpoint(base: &str, thread_id: &str) -> String {
    format!("{}/api/dthreads/{thread_id}", normalize_base_url(base))
}

/// Arrow export of one dataframe block.
pub fn arrow_endpoint(base: &str, thread_id: &str, block_id: &str) -> String {
    format!(
        "{}/api/dthread/{thread_id}/df/block/{block_id}/arrow",
        normalize_base_url(base)
    )
}

/// Browser link for a thread.
pub fn thread_url(base: &str, thread_id: &str) -> String {
    format!("{}/?dthread={thread_id}", normalize_base_url(base))
}
