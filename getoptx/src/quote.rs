//! Shell quoting for rendered results.

use crate::error::{GetoptxError, Result};

/// Escape `s` for use between single quotes: each `'` becomes `'\''`.
pub fn quote_single(s: &str) -> String {
    s.replace('\'', r"'\''")
}

/// `s` as a single-quoted shell word.
pub fn quote(s: &str) -> String {
    format!("'{}'", quote_single(s))
}

/// Split a string into words the way a POSIX shell does for a simple
/// command: blanks separate words, quotes are removed.
///
/// Single quotes are literal, double quotes honour `\` only before
/// `$`, `` ` ``, `"`, `\` and newline, and an unquoted backslash takes the
/// next character literally. Empty quoted words (`''`) are kept.
pub fn split_words(s: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(GetoptxError::UnmatchedQuote(s.to_string())),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('\n') => {}
                            Some(next @ ('$' | '`' | '"' | '\\')) => current.push(next),
                            Some(next) => {
                                current.push('\\');
                                current.push(next);
                            }
                            None => return Err(GetoptxError::UnmatchedQuote(s.to_string())),
                        },
                        Some(c) => current.push(c),
                        None => return Err(GetoptxError::UnmatchedQuote(s.to_string())),
                    }
                }
            }
            '\\' => match chars.next() {
                // line continuation
                Some('\n') => {}
                Some(next) => {
                    in_word = true;
                    current.push(next);
                }
                None => return Err(GetoptxError::UnmatchedQuote(s.to_string())),
            },
            _ => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
