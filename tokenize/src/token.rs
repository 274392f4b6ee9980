//! Tokens and the tokenizer selector.

use serde::{Deserialize, Serialize};

use crate::{config, gnu, windows};

/// One element of a tokenized command line.
///
/// Serializes as a plain string, or `null` for a line end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Text(String),
    /// Marks the end of a source line; only emitted when requested.
    EndOfLine,
}

impl Token {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::EndOfLine => None,
        }
    }

    pub fn is_end_of_line(&self) -> bool {
        matches!(self, Self::EndOfLine)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// The tokenization rules applied to response files and environment values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tokenizer {
    /// POSIX-shell-like quoting and backslash escapes.
    #[default]
    Gnu,
    /// Native Windows command-line rules.
    Windows,
    /// Line-oriented config files with comments and continuations.
    Config,
}

impl Tokenizer {
    /// Appends the tokens of `src` to `out`.
    pub fn tokenize(self, src: &str, mark_eols: bool, out: &mut Vec<Token>) {
        match self {
            Self::Gnu => gnu::tokenize_gnu(src, mark_eols, out),
            Self::Windows => windows::tokenize_windows(src, mark_eols, out),
            Self::Config => config::tokenize_config(src, mark_eols, out),
        }
    }

    /// Tokenizes `src` into plain strings, without line markers.
    pub fn tokenize_to_strings(self, src: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        self.tokenize(src, false, &mut tokens);
        into_strings(tokens)
    }
}

/// Drops line markers and unwraps the text of every token.
pub fn into_strings(tokens: Vec<Token>) -> Vec<String> {
    tokens
        .into_iter()
        .filter_map(|token| match token {
            Token::Text(s) => Some(s),
            Token::EndOfLine => None,
        })
        .collect()
}

pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_strings_drops_markers() {
        let tokens = vec![Token::text("a"), Token::EndOfLine, Token::text("b")];
        assert_eq!(into_strings(tokens), vec!["a", "b"]);
    }

    #[test]
    fn test_token_json_shape() {
        let tokens = vec![Token::text("-o"), Token::EndOfLine];
        let json = serde_json::to_string(&tokens).unwrap();
        assert_eq!(json, r#"["-o",null]"#);
        let back: Vec<Token> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tokens);
    }

    #[test]
    fn test_dispatch_uses_selected_rules() {
        let src = r#"a\\"b c""#;
        assert_eq!(Tokenizer::Gnu.tokenize_to_strings(src), vec![r"a\b c"]);
        assert_eq!(Tokenizer::Windows.tokenize_to_strings(src), vec![r"a\b c"]);
        assert_eq!(
            Tokenizer::Config.tokenize_to_strings("# note\nx y"),
            vec!["x", "y"]
        );
    }
}
