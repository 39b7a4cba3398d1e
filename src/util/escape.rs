use std::fmt::Write;

/// Escapes invalid UTF-8 sequences in a byte string (instead of replacing with U+FFFD)
pub(crate) fn to_utf8(s: &[u8]) -> String {
    let mut out = String::with_capacity(s.len());
    for chunk in s.utf8_chunks() {
        out.push_str(&control_sequences(chunk.valid()));
        for byte in chunk.invalid() {
            let _ = write!(&mut out, "\\x{:02x}", byte);
        }
    }
    out
}

/// Escapes ASCII control sequences to avoid messing up your terminal
pub(crate) fn control_sequences(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch < ' ' {
            let _ = write!(&mut out, "\\x{:02x}", ch as u8);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Escapes text to be placed inside HTML
pub(crate) fn html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{to_utf8, control_sequences, html};

    #[test]
    fn escapes() {
        assert_eq!(control_sequences("/a\x1b[2J"), "/a\\x1b[2J");
        assert_eq!(to_utf8(b"ok\xff"), "ok\\xff");
        assert_eq!(html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }
}
