//! Command-line scanning and positional distribution for cmdopt registries.
//!
//! [`parse_command_line_options`] takes a [`Registry`](cmdopt_core::Registry)
//! populated with options and an argument list, and stores every recognised
//! value into the registry:
//!
//! 1. environment-variable tokens are merged and `@file` arguments expanded;
//! 2. the first bare argument may select a subcommand;
//! 3. each argument is matched exactly, then as a prefix or grouping option,
//!    then handed to sink options or reported with a suggestion;
//! 4. bare values are distributed over the positional options;
//! 5. required options that never occurred are reported.
//!
//! Errors accumulate, so one invocation reports every independent mistake.
//!
//! # Example
//!
//! ```
//! use cmdopt_core::{CliOption, Registry, ValueKind};
//! use cmdopt_parser::parse_args;
//!
//! let mut registry = Registry::new();
//! let name = registry.add_option(CliOption::opt("name", ValueKind::String).required());
//! let files = registry.add_option(CliOption::positional_list("files", ValueKind::String));
//!
//! let report = parse_args(&mut registry, ["prog", "-name=x", "a.c", "b.c"]);
//! assert!(report.success);
//! assert_eq!(registry.get_str(name), Some("x"));
//! assert_eq!(registry.get_strs(files), vec!["a.c", "b.c"]);
//! ```

mod error;
mod lookup;
mod occurrence;
mod parse;
mod positional;
mod scanner;
mod settings;

pub use error::{ParseError, Result, SettingsError};
pub use parse::{
    HelpRequest, ParseReport, parse_args, parse_command_line_options, parse_environment_options,
};
pub use positional::{PositionalPlan, PositionalValue};
pub use settings::{ParseSettings, ResponseFileSettings};
