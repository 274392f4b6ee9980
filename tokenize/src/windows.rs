//! Native Windows command-line tokenization.
//!
//! A three-state machine (initial, unquoted, quoted). A run of N backslashes
//! followed by a double quote emits N/2 backslashes, and when N is odd the
//! quote itself is emitted literally. Two consecutive quotes inside a quoted
//! run emit one literal quote. Whitespace outside quotes ends a token. An empty
//! quoted string yields an empty token.

use crate::token::{Token, is_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    Unquoted,
    Quoted,
}

fn is_separator(c: char) -> bool {
    is_whitespace(c) || c == '\0'
}

/// Appends the backslashes starting at `i` to `token` and returns the index
/// of the last character consumed.
fn parse_backslash(src: &[char], mut i: usize, token: &mut String) -> usize {
    let mut count = 0;
    while i < src.len() && src[i] == '\\' {
        i += 1;
        count += 1;
    }

    if i < src.len() && src[i] == '"' {
        token.extend(std::iter::repeat_n('\\', count / 2));
        if count % 2 == 0 {
            // The quote is left for the state machine.
            return i - 1;
        }
        token.push('"');
        return i;
    }

    token.extend(std::iter::repeat_n('\\', count));
    i - 1
}

pub fn tokenize_windows(src: &str, mark_eols: bool, out: &mut Vec<Token>) {
    let src: Vec<char> = src.chars().collect();
    let mut token = String::new();
    let mut state = State::Initial;
    let mut i = 0;

    while i < src.len() {
        match state {
            State::Initial => {
                while i < src.len() && is_separator(src[i]) {
                    if mark_eols && src[i] == '\n' {
                        out.push(Token::EndOfLine);
                    }
                    i += 1;
                }
                if i >= src.len() {
                    break;
                }
                while i < src.len() && !is_separator(src[i]) && src[i] != '"' && src[i] != '\\' {
                    token.push(src[i]);
                    i += 1;
                }
                if i >= src.len() || is_separator(src[i]) {
                    out.push(Token::Text(std::mem::take(&mut token)));
                    if mark_eols && i < src.len() && src[i] == '\n' {
                        out.push(Token::EndOfLine);
                    }
                } else if src[i] == '"' {
                    state = State::Quoted;
                } else {
                    i = parse_backslash(&src, i, &mut token);
                    state = State::Unquoted;
                }
            }
            State::Unquoted => {
                let c = src[i];
                if is_separator(c) {
                    out.push(Token::Text(std::mem::take(&mut token)));
                    if mark_eols && c == '\n' {
                        out.push(Token::EndOfLine);
                    }
                    state = State::Initial;
                } else if c == '"' {
                    state = State::Quoted;
                } else if c == '\\' {
                    i = parse_backslash(&src, i, &mut token);
                } else {
                    token.push(c);
                }
            }
            State::Quoted => {
                let c = src[i];
                if c == '"' {
                    if src.get(i + 1) == Some(&'"') {
                        token.push('"');
                        i += 1;
                    } else {
                        state = State::Unquoted;
                    }
                } else if c == '\\' {
                    i = parse_backslash(&src, i, &mut token);
                } else {
                    token.push(c);
                }
            }
        }
        i += 1;
    }

    if state != State::Initial {
        out.push(Token::Text(token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(src: &str) -> Vec<String> {
        let mut out = Vec::new();
        tokenize_windows(src, false, &mut out);
        crate::token::into_strings(out)
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(split("  cl.exe  /c  foo.c "), vec!["cl.exe", "/c", "foo.c"]);
    }

    #[test]
    fn test_backslashes_without_quote_are_literal() {
        assert_eq!(split(r"C:\dir\\file"), vec![r"C:\dir\\file"]);
    }

    #[test]
    fn test_backslash_quote_rules() {
        // Odd count: half the backslashes plus a literal quote.
        assert_eq!(split(r#"a\"b"#), vec![r#"a"b"#]);
        assert_eq!(split(r#"a\\\"b"#), vec![r#"a\"b"#]);
        // Even count: half the backslashes, the quote opens a quoted run.
        assert_eq!(split(r#"a\\"b c""#), vec![r"a\b c"]);
    }

    #[test]
    fn test_quoted_whitespace_and_doubled_quotes() {
        assert_eq!(split(r#""a b" c"#), vec!["a b", "c"]);
        assert_eq!(split(r#""say ""hi""""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn test_empty_quoted_string_is_a_token() {
        assert_eq!(split(r#""" x"#), vec!["", "x"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(split(r#"a "b c"#), vec!["a", "b c"]);
    }

    #[test]
    fn test_end_of_line_markers() {
        let mut out = Vec::new();
        tokenize_windows("a\nb \"c\"\n", true, &mut out);
        assert_eq!(
            out,
            vec![
                Token::text("a"),
                Token::EndOfLine,
                Token::text("b"),
                Token::text("c"),
                Token::EndOfLine,
            ]
        );
    }
}
