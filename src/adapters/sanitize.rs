//! Log sanitization for measurement values and key material.
//!
//! Tissue measurements are patient data. Call sites never format them into
//! log messages, and this module is the backstop: every formatted log line
//! passes through [`SanitizingMakeWriter`], which redacts
//! - named measurement assignments (`mean_radius=14.2`, `Worst Area: 2019`)
//! - bracketed numeric vectors of five or more values
//! - base64 / hex key material next to a secret-looking key
//!
//! Terminal colour escapes are stripped first, since the `fmt` layer puts
//! them between a field name, the `=` and the value. Input longer than the
//! configured limit (`CYTOSCAN_SANITIZE_MAX_BYTES`, default 16 KiB) is
//! truncated before scanning.

use std::io::{self, Write};
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<RedactionPatterns> = OnceLock::new();

/// Default cap on the bytes scanned per log line.
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const NUMBER: &str = r"-?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?";

struct Redaction {
    regex: Regex,
    replacement: &'static str,
}

struct RedactionPatterns {
    ansi: Regex,
    set: RegexSet,
    rules: Vec<Redaction>,
}

/// Longest prefix of `input` within `max_bytes` that ends on a char boundary,
/// and whether anything was cut.
fn clip(input: &str, max_bytes: usize) -> (&str, bool) {
    match (0..=max_bytes.min(input.len()))
        .rev()
        .find(|&i| input.is_char_boundary(i))
    {
        Some(end) if end < input.len() => (&input[..end], true),
        _ => (input, false),
    }
}

fn patterns() -> &'static RedactionPatterns {
    PATTERNS.get_or_init(|| {
        let measure = r"(?:radius|texture|perimeter|area|smoothness|compactness|concavity|concave[ _]points|symmetry|fractal[ _]dimension)";

        let rules: Vec<(String, &'static str)> = vec![
            (
                format!(r"(?i)\b(?:(?:mean|worst)[ _])?{measure}(?:[ _](?:error|se))?\s*[:=]\s*{NUMBER}"),
                "[REDACTED-MEASUREMENT]",
            ),
            (
                format!(r"\[\s*{NUMBER}(?:\s*,\s*{NUMBER}){{4,}}\s*,?\s*\]"),
                "[REDACTED-VECTOR]",
            ),
            (
                r"(?i)\b(?:seed|private[_-]?key|signing[_-]?key|secret|signature|sig|token)\b\s*[:=]\s*[A-Za-z0-9+/]{32,}={0,2}".to_string(),
                "[REDACTED-SECRET]",
            ),
            (r"\b[0-9a-fA-F]{32,}\b".to_string(), "[REDACTED-KEY]"),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| p.as_str())).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Redaction {
                regex: Regex::new(&pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        let ansi = Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("Valid regex");

        RedactionPatterns { ansi, set, rules }
    })
}

/// Redact measurements and key material from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    redact(input, DEFAULT_SANITIZE_MAX_BYTES)
}

fn redact(input: &str, limit: usize) -> String {
    let patterns = patterns();
    let plain = patterns.ansi.replace_all(input, "");
    let (scanned, clipped) = clip(&plain, limit);

    let mut out = patterns
        .set
        .matches(scanned)
        .into_iter()
        .fold(scanned.to_owned(), |text, idx| {
            let rule = &patterns.rules[idx];
            rule.regex.replace_all(&text, rule.replacement).into_owned()
        });

    if clipped {
        out += " [TRUNCATED]";
    }
    out
}

/// `MakeWriter` adapter: every writer it hands out redacts what passes through.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }

    /// Cap the bytes scanned per line; zero keeps the current cap.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        if max_bytes > 0 {
            self.max_bytes = max_bytes;
        }
        self
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for SanitizingMakeWriter<M> {
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            sink: self.inner.make_writer(),
            pending: Vec::new(),
            max_bytes: self.max_bytes,
        }
    }
}

/// Holds bytes until a full line is available, then writes it redacted.
pub struct SanitizingWriter<W: Write> {
    sink: W,
    pending: Vec<u8>,
    max_bytes: usize,
}

impl<W: Write> SanitizingWriter<W> {
    fn emit(&mut self, chunk: &[u8]) -> io::Result<()> {
        let (body, newline) = match chunk.split_last() {
            Some((&b'\n', body)) => (body, true),
            _ => (chunk, false),
        };
        let redacted = redact(&String::from_utf8_lossy(body), self.max_bytes);
        self.sink.write_all(redacted.as_bytes())?;
        if newline {
            self.sink.write_all(b"\n")?;
        }
        Ok(())
    }

    fn emit_complete_lines(&mut self) -> io::Result<()> {
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.emit(&line)?;
        }
        Ok(())
    }

    fn emit_rest(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let rest = std::mem::take(&mut self.pending);
        self.emit(&rest)
    }
}

impl<W: Write> Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.emit_complete_lines()?;

        // Output without newlines is force-flushed at twice the scan limit.
        if self.pending.len() > self.max_bytes.saturating_mul(2) {
            self.emit_rest()?;
            self.sink.write_all(b"\n")?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_complete_lines()?;
        self.emit_rest()?;
        self.sink.flush()
    }
}

impl<W: Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_redacts_named_measurements() {
        let s = sanitize("submitted mean_radius=14.2 worst_area=2019");
        assert!(!s.contains("14.2"));
        assert!(!s.contains("2019"));
        assert_eq!(s.matches("[REDACTED-MEASUREMENT]").count(), 2);

        let s = sanitize("Worst Area: 2019.0, Radius Error: 1.095");
        assert!(!s.contains("2019"));
        assert!(!s.contains("1.095"));

        let s = sanitize("mean concave points = .1471");
        assert!(s.contains("[REDACTED-MEASUREMENT]"));
    }

    #[test]
    fn test_redacts_vectors() {
        let s = sanitize("row [17.99, 10.38, 122.8, 1001, 0.1184, 0.2776]");
        assert!(s.contains("[REDACTED-VECTOR]"));
        assert!(!s.contains("122.8"));
    }

    #[test]
    fn test_leaves_operational_text_alone() {
        let line = "Loaded model assets n_neighbors=5 n_samples=569 scaler_kind=\"standard\"";
        assert_eq!(sanitize(line), line);
        // Short lists such as class labels are not vectors.
        assert_eq!(sanitize("classes [0, 1]"), "classes [0, 1]");
    }

    #[test]
    fn test_redacts_key_material() {
        let s = sanitize("seed=QWxhZGRpbjpvcGVuIHNlc2FtZSB3aXRoIGxvbmcgc2VjcmV0IHZhbHVl");
        assert!(s.contains("[REDACTED-SECRET]"));

        let s = sanitize("pub 0123456789abcdef0123456789abcdef");
        assert!(s.contains("[REDACTED-KEY]"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let s = redact("prefix mean radius=1.0 suffix", 10);
        assert!(s.ends_with("[TRUNCATED]"));
        assert!(s.starts_with("prefix"));
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let mut out = Vec::new();
        {
            let mut w = SanitizingWriter {
                sink: &mut out,
                pending: Vec::new(),
                max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
            };
            w.write_all(b"a mean_texture=10.38\nb ok\n").expect("Should write");
            w.write_all(b"partial worst_radius=25").expect("Should write");
            w.flush().expect("Should flush");
        }
        let text = String::from_utf8(out).expect("utf8");
        assert!(!text.contains("10.38"));
        assert!(!text.contains("25"));
        assert!(text.contains("b ok\n"));
    }

    #[test]
    fn test_strips_colour_codes_before_matching() {
        let s = sanitize("submitted \x1b[3mmean_radius\x1b[0m\x1b[2m=\x1b[0m14.2");
        assert_eq!(s, "submitted [REDACTED-MEASUREMENT]");
    }

    /// In-memory sink shared with the subscriber.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn log_through_fmt_layer(ansi: bool) -> String {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(ansi)
            .with_writer(SanitizingMakeWriter::new(move || sink.clone()))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(mean_radius = 14.2, worst_area = 2019.0, "submitted");
        });

        let bytes = captured.0.lock().expect("lock").clone();
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn test_fmt_layer_output_is_redacted() {
        for ansi in [true, false] {
            let line = log_through_fmt_layer(ansi);
            assert!(line.contains("submitted"), "{line:?}");
            assert!(!line.contains("14.2"), "{line:?}");
            assert!(!line.contains("2019"), "{line:?}");
            assert!(line.contains("[REDACTED-MEASUREMENT]"), "{line:?}");
        }
    }

    #[test]
    fn test_configured_limit_applies_to_writer() {
        let captured = Captured::default();
        let make = SanitizingMakeWriter::new({
            let sink = captured.clone();
            move || sink.clone()
        })
        .with_max_bytes(8);
        {
            let mut w = make.make_writer();
            w.write_all(b"0123456789abcdef\nnext\n").expect("Should write");
        }
        let text = String::from_utf8(captured.0.lock().expect("lock").clone()).expect("utf8");
        assert_eq!(text, "01234567 [TRUNCATED]\nnext\n");
    }
}
