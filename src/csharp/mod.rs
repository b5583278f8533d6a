//! Text-level patching of C# scripts.
//!
//! Lookups ignore comments and string contents, so a brace or method name
//! inside either never moves an insertion point.

mod scanner;


use scanner::{call_sites, code_mask, find_identifier, matching_close, skip_whitespace};

/// Indentation used for an appended statement when the body has none to copy.
const DEFAULT_BODY_INDENT: &str = "        ";

/// Returns true if `name(` appears in code as a declaration or call.
pub fn has_method(text: &str, name: &str) -> bool {
    let code = code_mask(text);
    call_sites(&code, name).next().is_some()
}

/// Insert `snippet` on its own lines, after a blank line, just before the
/// closing brace of class `class_name`.
///
/// Returns `None` if the class or its closing brace is not found.
pub fn insert_before_class_end(text: &str, class_name: &str, snippet: &str) -> Option<String> {
    let code = code_mask(text);
    let (_, close) = class_body(&code, class_name)?;
    Some(insert_before_line_of(text, close, &format!("\n{}\n", snippet)))
}

/// Append `statement` at the end of the body of the first method named
/// `method_name`, indented like the body's last non-empty line.
///
/// Returns `None` if no such method body is found.
pub fn append_to_method_body(text: &str, method_name: &str, statement: &str) -> Option<String> {
    let code = code_mask(text);
    let (open, close) = method_body(&code, method_name)?;
    let indent = body_indent(text, open, close);
    Some(insert_before_line_of(
        text,
        close,
        &format!("\n{}{}\n", indent, statement),
    ))
}

/// Returns true if the body of method `method_name` calls `callee`.
pub fn method_calls(text: &str, method_name: &str, callee: &str) -> bool {
    let code = code_mask(text);
    match method_body(&code, method_name) {
        Some((open, close)) => call_sites(&code[open..=close], callee).next().is_some(),
        None => false,
    }
}

/// Offsets of the braces delimiting the body of `class <name>`.
fn class_body(code: &[u8], class_name: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(pos) = find_identifier(code, "class", from) {
        from = pos + 1;
        let name_start = skip_whitespace(code, pos + "class".len());
        if find_identifier(code, class_name, name_start) != Some(name_start) {
            continue;
        }
        let open = name_start + code[name_start..].iter().position(|b| *b == b'{')?;
        return Some((open, matching_close(code, open)?));
    }
    None
}

/// Offsets of the braces delimiting the first block body of method `name`.
fn method_body(code: &[u8], name: &str) -> Option<(usize, usize)> {
    for pos in call_sites(code, name) {
        let paren = skip_whitespace(code, pos + name.len());
        let Some(paren_close) = matching_close(code, paren) else {
            continue;
        };
        let open = skip_whitespace(code, paren_close + 1);
        if code.get(open) == Some(&b'{') {
            return Some((open, matching_close(code, open)?));
        }
    }
    None
}

/// Leading whitespace of the last non-empty body line that is not a lone
/// closing brace.
fn body_indent(text: &str, open: usize, close: usize) -> String {
    text[open + 1..close]
        .lines()
        .rev()
        .map(|line| {
            let trimmed = line.trim_start();
            (line, trimmed)
        })
        .find(|(_, trimmed)| !trimmed.is_empty() && !trimmed.starts_with('}'))
        .map(|(line, trimmed)| &line[..line.len() - trimmed.len()])
        .filter(|indent| !indent.is_empty())
        .unwrap_or(DEFAULT_BODY_INDENT)
        .to_string()
}

/// Insert `insertion` before the line holding offset `at`, or directly
/// before `at` when code precedes it on that line.
fn insert_before_line_of(text: &str, at: usize, insertion: &str) -> String {
    let line_start = text[..at].rfind('\n').map_or(0, |p| p + 1);
    let inline = !text[line_start..at].trim().is_empty();
    let split = if inline { at } else { line_start };

    let mut out = String::with_capacity(text.len() + insertion.len() + 1);
    out.push_str(&text[..split]);
    if inline {
        out.push('\n');
    }
    out.push_str(insertion);
    out.push_str(&text[split..]);
    out
}
