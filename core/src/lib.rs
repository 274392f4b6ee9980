//! Option and subcommand model for the cmdopt command-line parser.
//!
//! This crate defines what a tool declares before parsing:
//!
//! - [`CliOption`]: a named, typed switch with value, occurrence and
//!   formatting rules, or an unnamed positional/consume-after/sink option.
//! - [`ValueKind`] / [`Value`]: the converter from command-line text to a
//!   typed value, and the stored result.
//! - [`SubCommand`]: a named bucket of options, plus the reserved top-level
//!   and "every subcommand" buckets.
//! - [`Registry`]: the context object owning all of the above, with the
//!   reset operations needed to parse more than once per process.
//!
//! Parsing itself lives in the `cmdopt-parser` crate.
//!
//! # Example
//!
//! ```
//! use cmdopt_core::*;
//!
//! let mut registry = Registry::new();
//! let build = registry.add_subcommand("build", "Build the project");
//! let jobs = registry.add_option(
//!     CliOption::opt("jobs", ValueKind::UInt)
//!         .alias("j")
//!         .desc("Number of parallel jobs")
//!         .init(Value::UInt(1))
//!         .sub(build),
//! );
//! let verbose = registry.add_option(CliOption::flag("v").grouping().all_subcommands());
//!
//! let sub = registry.subcommand(build).unwrap();
//! assert_eq!(sub.lookup("j"), Some(jobs));
//! assert_eq!(sub.lookup("v"), Some(verbose));
//! assert_eq!(registry.get_uint(jobs), Some(1));
//! assert!(registry.top_level().lookup("jobs").is_none());
//! ```

mod error;
mod option;
mod registry;
mod subcommand;
mod value;

pub use error::{RegistrationError, Result};
pub use option::{
    CliOption, Formatting, Membership, OptionId, Occurrences, Storage, ValueExpected, Visibility,
};
pub use registry::{Category, CategoryId, Registry, SubCommandId};
pub use subcommand::SubCommand;
pub use value::{ConversionError, ConvertFn, CustomConverter, EnumValue, Value, ValueKind};
