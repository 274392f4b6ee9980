//! POSIX-shell-like tokenization.
//!
//! Whitespace separates tokens, a backslash escapes the next character (also
//! inside quotes), and single or double quotes bound a literal run. An
//! unterminated quote runs to the end of the input. Empty tokens are never
//! produced, so `'' x` yields just `x`.

use crate::token::{Token, is_whitespace};

pub fn tokenize_gnu(src: &str, mark_eols: bool, out: &mut Vec<Token>) {
    let mut token = String::new();
    let mut chars = src.chars();

    while let Some(c) = chars.next() {
        // Consume runs of whitespace between tokens.
        if token.is_empty() && is_whitespace(c) {
            if mark_eols && c == '\n' {
                out.push(Token::EndOfLine);
            }
            continue;
        }

        if c == '\\' {
            match chars.next() {
                Some(escaped) => token.push(escaped),
                None => token.push('\\'),
            }
            continue;
        }

        if c == '"' || c == '\'' {
            while let Some(q) = chars.next() {
                if q == c {
                    break;
                }
                if q == '\\' {
                    if let Some(escaped) = chars.next() {
                        token.push(escaped);
                        continue;
                    }
                }
                token.push(q);
            }
            continue;
        }

        if is_whitespace(c) {
            out.push(Token::Text(std::mem::take(&mut token)));
            if mark_eols && c == '\n' {
                out.push(Token::EndOfLine);
            }
            continue;
        }

        token.push(c);
    }

    if !token.is_empty() {
        out.push(Token::Text(token));
    }
}
