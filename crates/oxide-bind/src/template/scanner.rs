//! Splits SQL text into literal runs and `:name` markers.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Segment {
    Sql(String),
    Param(String),
}

enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Markers inside quotes, dollar-quoted bodies and comments are left alone,
/// as is the `::` cast.
pub(super) fn tokenize(sql: &str) -> Vec<Segment> {
    let bytes = sql.as_bytes();
    let mut segments = Vec::new();
    let mut state = State::Normal;
    let mut start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match &state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'-' if bytes.get(idx + 1) == Some(&b'-') => {
                    state = State::LineComment;
                    idx += 1;
                }
                b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, end)) = dollar_quote_start(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = end;
                    }
                }
                b':' if bytes.get(idx + 1) == Some(&b':') => idx += 1,
                b':' => {
                    if let Some(end) = scan_identifier(bytes, idx + 1) {
                        if start < idx {
                            segments.push(Segment::Sql(sql[start..idx].to_string()));
                        }
                        segments.push(Segment::Param(sql[idx + 1..end].to_string()));
                        start = end;
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::DollarQuoted(tag) => {
                if b == b'$' && closes_dollar_quote(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                let depth = *depth;
                if b == b'/' && bytes.get(idx + 1) == Some(&b'*') {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    if start < bytes.len() {
        segments.push(Segment::Sql(sql[start..].to_string()));
    }
    segments
}

/// For `$tag$` starting at `start`, returns the tag and the index of the
/// closing `$`. Positional `$1` placeholders are not quote openers.
fn dollar_quote_start(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while let Some(&b) = bytes.get(idx) {
        if b == b'$' {
            let tag = std::str::from_utf8(&bytes[start + 1..idx]).ok()?;
            if tag.starts_with(|c: char| c.is_ascii_digit()) {
                return None;
            }
            return Some((tag.to_string(), idx));
        }
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }
    None
}

fn closes_dollar_quote(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    bytes.get(idx + 1..end) == Some(tag.as_bytes()) && bytes.get(end) == Some(&b'$')
}

/// Returns the end of an identifier matching `[A-Za-z_][A-Za-z0-9_]*`.
fn scan_identifier(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes.get(start) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let mut idx = start + 1;
    while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
        idx += 1;
    }
    Some(idx)
}
