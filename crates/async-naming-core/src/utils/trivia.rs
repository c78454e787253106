//! Leading trivia scanning.
//!
//! `syn` discards ordinary comments, so the trivia in front of the first
//! token is recovered by lexing the start of the source text directly. The
//! scan stops at the first character that is neither whitespace nor part of
//! a comment and never looks past it.

use crate::cancel::{CancellationToken, Cancelled};
use crate::document::Trivia;

/// Collects the trivia preceding the first token of `source`.
///
/// For a source that holds no token at all this is the end-of-file trivia.
/// A leading byte order mark is skipped. An unterminated block comment
/// extends to the end of the source.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` is triggered while scanning.
pub fn leading_trivia(source: &str, cancel: &CancellationToken) -> Result<Vec<Trivia>, Cancelled> {
    let mut rest = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut trivia = Vec::new();

    loop {
        cancel.check()?;

        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() {
            let consumed = rest.len() - trimmed.len();
            trivia.push(Trivia::Whitespace(rest[..consumed].to_string()));
            rest = trimmed;
        }

        if rest.starts_with("//") {
            let end = rest.find('\n').unwrap_or(rest.len());
            trivia.push(line_comment(rest[..end].trim_end_matches('\r')));
            rest = &rest[end..];
        } else if rest.starts_with("/*") {
            let end = block_comment_end(rest);
            trivia.push(block_comment(&rest[..end]));
            rest = &rest[end..];
        } else {
            break;
        }
    }

    Ok(trivia)
}

fn line_comment(text: &str) -> Trivia {
    let is_doc = (text.starts_with("///") && !text.starts_with("////")) || text.starts_with("//!");
    if is_doc {
        Trivia::DocComment(text.to_string())
    } else {
        Trivia::LineComment(text.to_string())
    }
}

fn block_comment(text: &str) -> Trivia {
    let is_doc = (text.starts_with("/**") && !text.starts_with("/***") && text != "/**/")
        || text.starts_with("/*!");
    if is_doc {
        Trivia::DocComment(text.to_string())
    } else {
        Trivia::BlockComment(text.to_string())
    }
}

/// Byte length of the (possibly nested) block comment at the start of `text`.
fn block_comment_end(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth = depth.saturating_sub(1);
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }

    bytes.len()
}
