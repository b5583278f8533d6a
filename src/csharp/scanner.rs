//! Brace-aware scanning of C# source.
//!
//! [`code_mask`] returns a copy of the source in which comments and the
//! contents of string and character literals are blanked out, keeping byte
//! offsets and newlines. Searches then run on the mask and edits are applied
//! to the original text at the same offsets.

/// Blank out comments and literal contents, preserving length and newlines.
pub(crate) fn code_mask(text: &str) -> Vec<u8> {
    let src = text.as_bytes();
    let mut out = src.to_vec();
    let len = src.len();
    let mut i = 0;

    while i < len {
        match src[i] {
            b'/' if src.get(i + 1) == Some(&b'/') => {
                let end = find_from(src, i, b"\n").unwrap_or(len);
                blank(&mut out, i, end);
                i = end;
            }
            b'/' if src.get(i + 1) == Some(&b'*') => {
                let end = find_from(src, i + 2, b"*/").map_or(len, |p| p + 2);
                blank(&mut out, i, end);
                i = end;
            }
            b'@' | b'$' if verbatim_prefix_len(&src[i..]) > 0 => {
                let quote = i + verbatim_prefix_len(&src[i..]) - 1;
                let end = verbatim_end(src, quote + 1);
                blank(&mut out, quote + 1, end);
                i = end + 1;
            }
            b'"' => {
                let end = escaped_end(src, i + 1, b'"');
                blank(&mut out, i + 1, end);
                i = end + 1;
            }
            b'\'' => {
                let end = escaped_end(src, i + 1, b'\'');
                blank(&mut out, i + 1, end);
                i = end + 1;
            }
            _ => i += 1,
        }
    }

    out
}

/// Length of `@"`, `$@"` or `@$"` at the start of `rest`, or 0.
fn verbatim_prefix_len(rest: &[u8]) -> usize {
    if rest.starts_with(b"@\"") {
        2
    } else if rest.starts_with(b"$@\"") || rest.starts_with(b"@$\"") {
        3
    } else {
        0
    }
}

/// Index of the closing quote of a verbatim string body starting at `start`.
/// `""` is an escaped quote.
fn verbatim_end(src: &[u8], start: usize) -> usize {
    let mut j = start;
    while j < src.len() {
        if src[j] == b'"' {
            if src.get(j + 1) == Some(&b'"') {
                j += 2;
                continue;
            }
            return j;
        }
        j += 1;
    }
    src.len()
}

/// Index of the closing `delim` of a backslash-escaped literal starting at
/// `start`. An unterminated literal ends at the line break.
fn escaped_end(src: &[u8], start: usize, delim: u8) -> usize {
    let mut j = start;
    while j < src.len() {
        match src[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == delim => return j,
            _ => j += 1,
        }
    }
    src.len()
}

fn blank(out: &mut [u8], start: usize, end: usize) {
    let end = end.min(out.len());
    if start >= end {
        return;
    }
    for b in &mut out[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// First whole-identifier occurrence of `name` in `code` at or after `from`.
pub(crate) fn find_identifier(code: &[u8], name: &str, from: usize) -> Option<usize> {
    let needle = name.as_bytes();
    if needle.is_empty() {
        return None;
    }

    let mut start = from;
    while let Some(pos) = find_from(code, start, needle) {
        let before_ok = pos == 0 || !is_ident_byte(code[pos - 1]);
        let after = pos + needle.len();
        let after_ok = after >= code.len() || !is_ident_byte(code[after]);
        if before_ok && after_ok {
            return Some(pos);
        }
        start = pos + 1;
    }
    None
}

pub(crate) fn skip_whitespace(code: &[u8], mut i: usize) -> usize {
    while i < code.len() && code[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Index of the bracket closing the one at `open`.
pub(crate) fn matching_close(code: &[u8], open: usize) -> Option<usize> {
    let (open_b, close_b) = match code.get(open)? {
        b'{' => (b'{', b'}'),
        b'(' => (b'(', b')'),
        b'[' => (b'[', b']'),
        _ => return None,
    };

    let mut depth = 0usize;
    for (i, &b) in code.iter().enumerate().skip(open) {
        if b == open_b {
            depth += 1;
        } else if b == close_b {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Positions of `name(` call or declaration sites in `code`.
pub(crate) fn call_sites<'a>(code: &'a [u8], name: &'a str) -> impl Iterator<Item = usize> + 'a {
    let mut from = 0;
    std::iter::from_fn(move || {
        while let Some(pos) = find_identifier(code, name, from) {
            from = pos + 1;
            let next = skip_whitespace(code, pos + name.len());
            if code.get(next) == Some(&b'(') {
                return Some(pos);
            }
        }
        None
    })
}
