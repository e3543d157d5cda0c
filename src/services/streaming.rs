/// Incremental SSE parser that accumulates lines until a blank line, then yields the combined `data:` payload.
/// Multiple `data:` lines per event are joined by `\n`.
pub struct SseEventParser {
    buf: String,
    // data: lines of the event currently being read
    cur_data_lines: Vec<String>,
}

impl Default for SseEventParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SseEventParser {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(16 * 1024),
            cur_data_lines: Vec::with_capacity(4),
        }
    }

    /// Feed bytes and extract zero or more complete SSE event payloads (already joined).
    pub fn push_and_drain_events(&mut self, chunk: &[u8]) -> Vec<String> {
        let s = String::from_utf8_lossy(chunk);
        self.buf.push_str(&s);
        let mut out = Vec::new();

        while let Some(pos) = self.buf.find('\n') {
            let mut line = self.buf.drain(..=pos).collect::<String>();
            if line.ends_with('\n') {
                line.pop();
            }
            if line.ends_with('\r') {
                line.pop();
            }

            // Blank line => event terminator
            if line.is_empty() {
                if !self.cur_data_lines.is_empty() {
                    out.push(self.cur_data_lines.join("\n"));
                    self.cur_data_lines.clear();
                }
                continue;
            }

            // Only `data:` lines matter, `event:`/`id:`/comments are ignored
            if let Some(rest) = line.strip_prefix("data:") {
                self.cur_data_lines.push(rest.trim_start().to_string());
            }
        }

        out
    }

    /// Flush at end-of-stream (if the server doesn't send a final blank line).
    pub fn flush(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buf);
        if let Some(rest) = tail.trim_end_matches(['\r', '\n']).strip_prefix("data:") {
            self.cur_data_lines.push(rest.trim_start().to_string());
        }
        if self.cur_data_lines.is_empty() {
            return None;
        }
        let payload = self.cur_data_lines.join("\n");
        self.cur_data_lines.clear();
        Some(payload)
    }
}
