//! Response-file expansion.
//!
//! Every `@name` token is replaced by the tokens of the file `name`, and the
//! replacement is rescanned so nested response files expand as well. A stack
//! of `(file, end index)` records tracks which files the scan is currently
//! inside; a file already on the stack is never expanded again, which is what
//! stops `a.rsp -> b.rsp -> a.rsp` from looping.
//!
//! Failures are not fatal: an unreadable or recursive `@name` token is left in
//! place and the outcome is marked partial.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::encoding::decode_response_file;
use crate::token::{Token, Tokenizer, into_strings};

/// Why a `@name` token was left unexpanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionFailure {
    #[error("cannot read response file '{}': {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("recursive expansion of response file '{}'", path.display())]
    Recursive { path: PathBuf },
}

impl ExpansionFailure {
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. } | Self::Recursive { path } => path,
        }
    }
}

/// Result of an expansion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionOutcome {
    pub failures: Vec<ExpansionFailure>,
    /// Number of response files spliced in.
    pub expanded: usize,
}

impl ExpansionOutcome {
    /// `true` when every `@name` token was expanded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Settings for expanding response files.
#[derive(Debug, Clone)]
pub struct ExpansionContext {
    pub tokenizer: Tokenizer,
    /// Emit [`Token::EndOfLine`] markers for the lines of each file.
    pub mark_eols: bool,
    /// Resolve `@name` tokens found inside a file against that file's
    /// directory instead of the current directory.
    pub relative_names: bool,
    /// Directory for top-level relative names; the process working directory
    /// when unset.
    pub current_dir: Option<PathBuf>,
}

/// One file the scan is currently inside. The bottom record stands for the
/// original argument list and has no file.
#[derive(Debug)]
struct FileRecord {
    file: Option<PathBuf>,
    end: usize,
}

impl ExpansionContext {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            mark_eols: false,
            relative_names: true,
            current_dir: None,
        }
    }

    pub fn with_mark_eols(mut self, mark_eols: bool) -> Self {
        self.mark_eols = mark_eols;
        self
    }

    pub fn with_relative_names(mut self, relative_names: bool) -> Self {
        self.relative_names = relative_names;
        self
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Expands every `@name` token in `argv` in place.
    pub fn expand(&self, argv: &mut Vec<Token>) -> ExpansionOutcome {
        let mut outcome = ExpansionOutcome::default();
        let mut stack = vec![FileRecord {
            file: None,
            end: argv.len(),
        }];

        let mut i = 0;
        while i < argv.len() {
            while stack.len() > 1 && stack.last().is_some_and(|record| record.end == i) {
                stack.pop();
            }

            let Some(name) = argv[i].as_text().and_then(|text| text.strip_prefix('@')) else {
                i += 1;
                continue;
            };
            let path = self.resolve(name);

            let identity = match std::fs::canonicalize(&path) {
                Ok(identity) => identity,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "Leaving response file unexpanded");
                    outcome.failures.push(ExpansionFailure::Unreadable {
                        path,
                        reason: err.to_string(),
                    });
                    i += 1;
                    continue;
                }
            };

            if stack
                .iter()
                .any(|record| record.file.as_deref() == Some(identity.as_path()))
            {
                warn!(file = %path.display(), "Skipping recursive response file");
                outcome.failures.push(ExpansionFailure::Recursive { path });
                i += 1;
                continue;
            }

            let expanded = match self.read_file(&path) {
                Ok(expanded) => expanded,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "Leaving response file unexpanded");
                    outcome.failures.push(ExpansionFailure::Unreadable {
                        path,
                        reason: err.to_string(),
                    });
                    i += 1;
                    continue;
                }
            };

            debug!(file = %path.display(), tokens = expanded.len(), "Expanded response file");
            let count = expanded.len();
            for record in &mut stack {
                record.end = record.end + count - 1;
            }
            stack.push(FileRecord {
                file: Some(identity),
                end: i + count,
            });
            argv.splice(i..=i, expanded);
            outcome.expanded += 1;
        }

        outcome
    }

    /// Expands `args` (which carry no line markers) and returns plain strings.
    pub fn expand_strings(&self, args: Vec<String>) -> (Vec<String>, ExpansionOutcome) {
        let mut tokens: Vec<Token> = args.into_iter().map(Token::Text).collect();
        let outcome = self.expand(&mut tokens);
        (into_strings(tokens), outcome)
    }

    /// Reads and tokenizes one response file without expanding nested files.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the file cannot be read.
    pub fn read_file(&self, path: &Path) -> io::Result<Vec<Token>> {
        let bytes = std::fs::read(path)?;
        let text = decode_response_file(&bytes);
        let mut tokens = Vec::new();
        self.tokenizer.tokenize(&text, self.mark_eols, &mut tokens);

        if self.relative_names {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            for token in &mut tokens {
                if let Token::Text(text) = token {
                    if let Some(nested) = text.strip_prefix('@') {
                        if Path::new(nested).is_relative() {
                            *text = format!("@{}", base.join(nested).display());
                        }
                    }
                }
            }
        }
        Ok(tokens)
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.current_dir {
            Some(dir) => dir.join(path),
            None => match std::env::current_dir() {
                Ok(dir) => dir.join(path),
                Err(_) => path.to_path_buf(),
            },
        }
    }
}

/// Expands `args` with the default context for `tokenizer`.
pub fn expand_response_files(
    args: Vec<String>,
    tokenizer: Tokenizer,
) -> (Vec<String>, ExpansionOutcome) {
    ExpansionContext::new(tokenizer).expand_strings(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().filter_map(Token::as_text).collect()
    }

    #[test]
    fn test_tokens_without_at_are_untouched() {
        let ctx = ExpansionContext::new(Tokenizer::Gnu);
        let mut argv = vec![Token::text("prog"), Token::text("-O2"), Token::EndOfLine];
        let outcome = ctx.expand(&mut argv);
        assert!(outcome.is_complete());
        assert_eq!(outcome.expanded, 0);
        assert_eq!(argv.len(), 3);
    }

    #[test]
    fn test_missing_file_is_left_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
        let mut argv = vec![Token::text("prog"), Token::text("@missing.rsp"), Token::text("x")];
        let outcome = ctx.expand(&mut argv);
        assert!(!outcome.is_complete());
        assert!(matches!(
            outcome.failures.as_slice(),
            [ExpansionFailure::Unreadable { .. }]
        ));
        assert_eq!(texts(&argv), vec!["prog", "@missing.rsp", "x"]);
    }

    #[test]
    fn test_empty_file_removes_token() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.rsp"), "  \n").unwrap();
        let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
        let mut argv = vec![Token::text("@empty.rsp"), Token::text("@empty.rsp"), Token::text("y")];
        let outcome = ctx.expand(&mut argv);
        assert!(outcome.is_complete());
        assert_eq!(outcome.expanded, 2);
        assert_eq!(texts(&argv), vec!["y"]);
    }

    #[test]
    fn test_same_file_twice_in_sequence_is_not_recursion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.rsp"), "-a -b").unwrap();
        let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
        let mut argv = vec![Token::text("@f.rsp"), Token::text("@f.rsp")];
        let outcome = ctx.expand(&mut argv);
        assert!(outcome.is_complete());
        assert_eq!(texts(&argv), vec!["-a", "-b", "-a", "-b"]);
    }
}
