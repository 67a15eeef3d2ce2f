//! Incremental server-sent-events decoder.
//!
//! Accumulates raw transport bytes and yields complete events. The
//! decoder carries no transport knowledge; callers feed it whatever
//! chunking the network produced and collect events as they complete.

/// One decoded SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, if the server sent one.
    pub event: Option<String>,
    /// Concatenated `data:` lines, newline-joined.
    pub data: String,
}

/// Streaming SSE frame decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: String,
    event_type: Option<String>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning any events completed by it.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; SSE payloads
    /// here are JSON and a corrupt frame fails downstream parsing.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            if let Some(event) = self.take_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }
        events
    }

    /// Flush any final event left unterminated when the stream closed.
    pub fn finish(mut self) -> Option<SseEvent> {
        let trailing: String = std::mem::take(&mut self.buf);
        let trailing = trailing.trim_end_matches(['\n', '\r']);
        if !trailing.is_empty() {
            self.take_line(trailing);
        }
        self.dispatch()
    }

    /// Process one complete line; a blank line dispatches the pending event.
    fn take_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        // Comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };

        match field {
            "data" => self.data_lines.push(value.to_string()),
            "event" => self.event_type = Some(value.to_string()),
            // id / retry are irrelevant here
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() && self.event_type.is_none() {
            return None;
        }
        let event = SseEvent {
            event: self.event_type.take(),
            data: std::mem::take(&mut self.data_lines).join("\n"),
        };
        if event.data.is_empty() {
            return None;
        }
        Some(event)
    }
}

/// Decode a complete SSE body in one pass.
pub fn decode_all(body: &[u8]) -> Vec<SseEvent> {
    let mut decoder = SseDecoder::new();
    let mut events = decoder.feed(body);
    if let Some(last) = decoder.finish() {
        events.push(last);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let events = decode_all(b"data: {\"a\":1}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"a\":1}");
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn test_multiple_events() {
        let events = decode_all(b"data: first\n\ndata: second\n\ndata: third\n\n");
        let data: Vec<_> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_event_type_and_multiline_data() {
        let events = decode_all(b"event: message\ndata: line1\ndata: line2\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("message"));
        assert_eq!(events[0].data, "line1\nline2");
    }

    #[test]
    fn test_crlf_line_endings() {
        let events = decode_all(b"data: hello\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "hello");
    }

    #[test]
    fn test_comments_and_ids_ignored() {
        let events = decode_all(b": keepalive\nid: 7\ndata: payload\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "payload");
    }

    #[test]
    fn test_unterminated_final_event_flushed() {
        let events = decode_all(b"data: first\n\ndata: last");
        let data: Vec<_> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["first", "last"]);
    }

    #[test]
    fn test_incremental_feed_across_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        let mut events = Vec::new();
        // Split mid-line and mid-event
        for chunk in [&b"data: {\"x\": "[..], &b"42}\n"[..], &b"\ndata: done\n\n"[..]] {
            events.extend(decoder.feed(chunk));
        }
        let data: Vec<_> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["{\"x\": 42}", "done"]);
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        assert!(decode_all(b"").is_empty());
        assert!(decode_all(b"\n\n\n").is_empty());
    }
}
