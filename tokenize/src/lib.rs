//! Command-line tokenizers and response-file expansion.
//!
//! Three tokenization styles are provided, selected through [`Tokenizer`]:
//!
//! - [`Tokenizer::Gnu`]: POSIX-shell-like quoting with backslash escapes.
//! - [`Tokenizer::Windows`]: the native Windows command-line rules.
//! - [`Tokenizer::Config`]: line-oriented config files with `#` comments and
//!   backslash line continuations.
//!
//! [`ExpansionContext`] replaces `@file` arguments with the tokens of the
//! named file, recursively, while refusing to expand a file from inside
//! itself.
//!
//! # Example
//!
//! ```
//! use cmdopt_tokenize::{Tokenizer, expand_response_files};
//!
//! let args = Tokenizer::Gnu.tokenize_to_strings(r#"-o "out dir/a.o" foo\ bar.c"#);
//! assert_eq!(args, vec!["-o", "out dir/a.o", "foo bar.c"]);
//!
//! // A missing response file is left in place and reported.
//! let (args, outcome) =
//!     expand_response_files(vec!["cc".into(), "@/nonexistent/cmdopt.rsp".into()], Tokenizer::Gnu);
//! assert_eq!(args, vec!["cc", "@/nonexistent/cmdopt.rsp"]);
//! assert!(!outcome.is_complete());
//! ```

mod config;
mod encoding;
mod expand;
mod gnu;
mod token;
mod windows;

pub use config::tokenize_config;
pub use encoding::decode_response_file;
pub use expand::{ExpansionContext, ExpansionFailure, ExpansionOutcome, expand_response_files};
pub use gnu::tokenize_gnu;
pub use token::{Token, Tokenizer, into_strings};
pub use windows::tokenize_windows;
