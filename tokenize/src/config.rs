//! Line-oriented config-file tokenization.
//!
//! Lines whose first non-blank character is `#` are comments. A backslash
//! directly before a newline (or `\r\n`) joins the line with the next one.
//! Each logical line is then split with the GNU rules.

use crate::gnu::tokenize_gnu;
use crate::token::{Token, is_whitespace};

pub fn tokenize_config(src: &str, mark_eols: bool, out: &mut Vec<Token>) {
    let src: Vec<char> = src.chars().collect();
    let mut cur = 0;

    while cur < src.len() {
        if is_whitespace(src[cur]) {
            while cur < src.len() && is_whitespace(src[cur]) {
                cur += 1;
            }
            continue;
        }

        if src[cur] == '#' {
            while cur < src.len() && src[cur] != '\n' {
                cur += 1;
            }
            continue;
        }

        let mut line = String::new();
        let mut start = cur;
        while cur < src.len() {
            if src[cur] == '\\' {
                if cur + 1 < src.len() {
                    cur += 1;
                    let crlf = src[cur] == '\r' && src.get(cur + 1) == Some(&'\n');
                    if src[cur] == '\n' || crlf {
                        line.extend(&src[start..cur - 1]);
                        if crlf {
                            cur += 1;
                        }
                        start = cur + 1;
                    }
                }
            } else if src[cur] == '\n' {
                break;
            }
            cur += 1;
        }
        line.extend(&src[start..cur.min(src.len())]);

        let before = out.len();
        tokenize_gnu(&line, false, out);
        if mark_eols && out.len() > before {
            out.push(Token::EndOfLine);
        }
    }
}
