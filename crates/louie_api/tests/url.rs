use louie_api::url::{
    arrow_endpoint, chat_endpoint, normalize_base_url, thread_endpoint, thread_url,
    threads_endpoint, DEFAULT_LOUIE_BASE_URL,
};

#[test]
fn url_normalization_defaults_blank_base() {
    assert_eq!(normalize_base_url("  "), DEFAULT_LOUIE_BASE_URL);
}

#[test]
fn url_normalization_trims_trailing_slashes() {
    assert_eq!(
        normalize_base_url(" https://louie.example.com// "),
        "https://louie.example.com"
    );
}

#[test]
fn url_endpoints_share_normalized_base() {
    let base = "https://louie.example.com/";
    assert_eq!(chat_endpoint(base), "https://louie.example.com/api/chat/");
    assert_eq!(threads_endpoint(base), "https://louie.example.com/api/dthreads");
    assert_eq!(
        thread_endpoint(base, "D_1"),
        "https://louie.example.com/api/dthreads/D_1"
    );
    assert_eq!(
        arrow_endpoint(base, "D_1", "B_2"),
        "https://louie.example.com/api/dthread/D_1/df/block/B_2/arrow"
    );
    assert_eq!(thread_url(base, "D_1"), "https://louie.example.com/?dthread=D_1");
}
