use louie_api::request::DEFAULT_AGENT;
use louie_api::{ChatRequest, ShareMode};

fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.as_str())
}

#[test]
fn request_defaults_start_new_private_thread() {
    let request = ChatRequest::new("hello");
    let params = request.query_params();

    assert_eq!(param(&params, "query"), Some("hello"));
    assert_eq!(param(&params, "agent"), Some(DEFAULT_AGENT));
    assert_eq!(param(&params, "ignore_traces"), Some("true"));
    assert_eq!(param(&params, "share_mode"), Some("Private"));
    assert_eq!(param(&params, "dthread_id"), None);
}

#[test]
fn request_traces_are_sent_inverted() {
    let params = ChatRequest::new("q").with_traces(true).query_params();
    assert_eq!(param(&params, "ignore_traces"), Some("false"));
}

#[test]
fn request_blank_thread_id_means_new_thread() {
    let request = ChatRequest::new("q").with_thread_id("   ");
    assert_eq!(request.thread_id, None);

    let request = ChatRequest::new("q").with_thread_id("D_9");
    assert_eq!(param(&request.query_params(), "dthread_id"), Some("D_9"));
}

#[test]
fn request_blank_agent_falls_back_to_default() {
    let params = ChatRequest::new("q").with_agent(" ").query_params();
    assert_eq!(param(&params, "agent"), Some(DEFAULT_AGENT));

    let params = ChatRequest::new("q").with_agent("CodeAgent").query_params();
    assert_eq!(param(&params, "agent"), Some("CodeAgent"));
}

#[test]
fn share_mode_parses_case_insensitively() {
    assert_eq!(ShareMode::parse("PUBLIC"), Some(ShareMode::Public));
    assert_eq!(ShareMode::parse("org"), Some(ShareMode::Organization));
    assert_eq!("private".parse::<ShareMode>(), Ok(ShareMode::Private));
    assert!("everyone".parse::<ShareMode>().is_err());
    assert_eq!(ShareMode::Organization.to_string(), "Organization");
}
