// SPDX-License-Identifier: PMPL-1.0-or-later

//! Brace-balanced block scanner for JS-like object literals
//!
//! Walks forward from an opening `{` and returns the offset of the brace that
//! closes it, skipping braces that appear inside `"..."`, `'...'`, template
//! literals (including nested `${...}` expressions) and comments.

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Code context with the number of currently open braces
    Code(usize),
    /// Inside a backtick template literal
    Template,
}

/// 1-based line number of a byte offset, for error messages.
pub fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Find the `}` matching the `{` at byte offset `open`.
pub fn find_block_end(text: &str, open: usize) -> Result<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        bail!("no opening brace at line {}", line_of(text, open));
    }

    let mut stack = vec![Frame::Code(1)];
    let mut i = open + 1;

    while i < bytes.len() {
        let b = bytes[i];
        let top = stack.len() - 1;
        let frame = stack[top];
        match frame {
            Frame::Template => match b {
                b'\\' => i += 1,
                b'`' => {
                    stack.pop();
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    stack.push(Frame::Code(1));
                    i += 1;
                }
                _ => {}
            },
            Frame::Code(depth) => match b {
                b'"' | b'\'' => i = skip_quoted(text, i)?,
                b'`' => stack.push(Frame::Template),
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let start = i;
                    i += 2;
                    loop {
                        if i + 1 >= bytes.len() {
                            bail!(
                                "unterminated comment starting at line {}",
                                line_of(text, start)
                            );
                        }
                        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                            i += 1;
                            break;
                        }
                        i += 1;
                    }
                }
                b'{' => stack[top] = Frame::Code(depth + 1),
                b'}' => {
                    if depth == 1 {
                        if stack.len() == 1 {
                            return Ok(i);
                        }
                        // end of a `${...}` interpolation
                        stack.pop();
                    } else {
                        stack[top] = Frame::Code(depth - 1);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    match stack.last() {
        Some(Frame::Template) => bail!(
            "unterminated template literal in block opened at line {}",
            line_of(text, open)
        ),
        _ => bail!("unclosed block opened at line {}", line_of(text, open)),
    }
}

/// Skip a single- or double-quoted string starting at `start`, returning the
/// offset of its closing quote. Plain strings may not span lines.
fn skip_quoted(text: &str, start: usize) -> Result<usize> {
    let bytes = text.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' => break,
            b if b == quote => return Ok(i),
            _ => {}
        }
        i += 1;
    }
    bail!("unterminated string literal at line {}", line_of(text, start))
}

/// True when `{<body>\n}` closes exactly on its final brace.
pub fn body_is_balanced(body: &str) -> Result<bool> {
    let block = format!("{{{}\n}}", body);
    let end = find_block_end(&block, 0)?;
    Ok(end == block.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_block() {
        let text = "{ a: 1 }, rest";
        assert_eq!(find_block_end(text, 0).unwrap(), 7);
    }

    #[test]
    fn test_nested_blocks() {
        let text = "{\n  inner: { x: 1 },\n}";
        assert_eq!(find_block_end(text, 0).unwrap(), text.len() - 1);
    }

    #[test]
    fn test_braces_in_strings_are_ignored() {
        let text = r#"{ a: "}", b: '{', c: "\"}" }"#;
        assert_eq!(find_block_end(text, 0).unwrap(), text.len() - 1);
    }

    #[test]
    fn test_template_interpolation() {
        let text = "{ t: `In ${state}, {not a brace} ${ {a:1}.a }` }";
        assert_eq!(find_block_end(text, 0).unwrap(), text.len() - 1);
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "{\n  // closing } here\n  /* and { here */\n  a: 1\n}";
        assert_eq!(find_block_end(text, 0).unwrap(), text.len() - 1);
    }

    #[test]
    fn test_unclosed_block_is_error() {
        let err = find_block_end("{\n  a: {\n", 0).unwrap_err();
        assert!(err.to_string().contains("line 1"), "got: {}", err);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(find_block_end("{ a: \"oops\n }", 0).is_err());
    }

    #[test]
    fn test_body_balance() {
        assert!(body_is_balanced("\n  label: \"A\"").unwrap());
        // body truncated before its nested block closed
        assert!(!body_is_balanced("\n  nested: {\n  a: 1").unwrap_or(false));
        // body that closes early
        assert!(!body_is_balanced("\n  a: 1\n}, {\n  b: 2").unwrap());
    }

    #[test]
    fn test_line_of() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 4), 3);
    }
}
