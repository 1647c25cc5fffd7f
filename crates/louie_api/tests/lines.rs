use louie_api::LineBuffer;

#[test]
fn line_framing_drops_blank_lines_and_carriage_returns() {
    let lines = LineBuffer::split_all("{\"a\":1}\r\n\n   \n{\"b\":2}\n");
    assert_eq!(lines, vec!["{\"a\":1}".to_owned(), "{\"b\":2}".to_owned()]);
}

#[test]
fn line_framing_releases_only_complete_lines() {
    let mut buffer = LineBuffer::default();
    assert!(buffer.feed(b"{\"payload\":{\"id\":").is_empty());
    assert!(!buffer.is_empty_buffer());

    let lines = buffer.feed(b"\"B1\"}}\n{\"dthr");
    assert_eq!(lines, vec!["{\"payload\":{\"id\":\"B1\"}}".to_owned()]);
    assert!(!buffer.is_empty_buffer());
}

#[test]
fn line_framing_flushes_unterminated_tail_on_finish() {
    let mut buffer = LineBuffer::default();
    assert!(buffer.feed(b"{\"dthread_id\":\"D1\"}").is_empty());
    assert_eq!(buffer.finish(), Some("{\"dthread_id\":\"D1\"}".to_owned()));
    assert_eq!(buffer.finish(), None);
}

#[test]
fn line_framing_whitespace_tail_is_not_a_line() {
    let mut buffer = LineBuffer::default();
    assert!(buffer.feed(b"{}\n  ").len() == 1);
    assert!(buffer.is_empty_buffer());
    assert_eq!(buffer.finish(), None);
}
