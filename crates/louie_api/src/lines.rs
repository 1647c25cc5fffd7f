/// Incremental splitter for newline-delimited stream bodies.
///
/// Chunks arrive at arbitrary byte boundaries; only complete lines are
/// released. Blank lines are dropped and `\r\n` endings are normalized.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Feed arbitrary bytes and drain every complete, non-blank line.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();

        while let Some(split) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=split).collect();
            if let Some(line) = decode_line(&raw[..split]) {
                lines.push(line);
            }
        }

        lines
    }

    /// Release the trailing unterminated line, if any. Call once the body has
    /// ended.
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.buffer);
        decode_line(&raw)
    }

    /// Split a complete body in one shot.
    pub fn split_all(input: &str) -> Vec<String> {
        let mut buffer = Self::default();
        let mut lines = buffer.feed(input.as_bytes());
        lines.extend(buffer.finish());
        lines
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        None
    } else {
        Some(line.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::LineBuffer;

    #[test]
    fn multibyte_characters_split_across_chunks_survive() {
        let text = "{\"text\":\"héllo\"}\n".as_bytes();
        let split = text
            .iter()
            .position(|byte| *byte >= 0x80)
            .expect("multibyte char present")
            + 1;
        let mut buffer = LineBuffer::default();

        assert!(buffer.feed(&text[..split]).is_empty());
        let lines = buffer.feed(&text[split..]);
        assert_eq!(lines, vec!["{\"text\":\"héllo\"}".to_owned()]);
        assert!(buffer.is_empty_buffer());
    }
}
