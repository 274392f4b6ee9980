//! Error types for parsing and for loading parse settings.
//!
//! [`ParseError`] describes one mistake in the user's command line. A parse
//! collects every such mistake before failing, so these are values in a list
//! rather than early returns. [`SettingsError`] covers the settings file.

use cmdopt_core::ConversionError;
use thiserror::Error;

/// One problem found while parsing a command line.
///
/// `option` fields hold the option as the user would type it (`-v`,
/// `--output`) or, for unnamed positionals, the value name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No exact, alias, grouped, prefixed or sink match.
    #[error("Unknown command line argument '{arg}'.{}", did_you_mean(suggestion))]
    UnknownArgument {
        arg: String,
        suggestion: Option<String>,
    },

    /// A bare first token that names no registered subcommand.
    #[error("Unknown subcommand '{name}'.{}", did_you_mean(suggestion))]
    UnknownSubCommand {
        name: String,
        suggestion: Option<String>,
    },

    /// The converter rejected the supplied text.
    #[error("for the {option} option: {source}")]
    InvalidValue {
        option: String,
        #[source]
        source: ConversionError,
    },

    /// A value-required option appeared last, or glued-only without a value.
    #[error("for the {option} option: requires a value!")]
    MissingValue { option: String },

    /// A value was supplied to an option that forbids one.
    #[error("for the {option} option: does not allow a value! '{value}' specified.")]
    ValueNotAllowed { option: String, value: String },

    /// A multi-valued option ran out of arguments.
    #[error("for the {option} option: not enough values!")]
    NotEnoughValues { option: String },

    /// An `Optional` option occurred more than once.
    #[error("for the {option} option: may only occur zero or one times!")]
    OccursMoreThanOnce { option: String },

    /// A `Required` option occurred more than once.
    #[error("for the {option} option: must occur exactly one time!")]
    MustOccurOnce { option: String },

    /// A `Required` or `OneOrMore` option never occurred.
    #[error("for the {option} option: must be specified at least once!")]
    MissingRequired { option: String },

    /// A value-required grouping option inside a multi-letter group.
    #[error("for the {option} option: may not occur within a group!")]
    ValueInGroup { option: String },

    /// An eats-args positional was named with an inline value.
    #[error(
        "for the {option} option: does not take a value; it consumes the arguments that follow it"
    )]
    EatsArgsWithValue { option: String },

    /// Fewer bare values than the positionals require.
    #[error(
        "Not enough positional command line arguments specified! Must specify at least {required} positional argument{}",
        plural(*required)
    )]
    NotEnoughPositionals { required: usize, provided: usize },

    /// More bare values than the positionals can hold.
    #[error(
        "Too many positional arguments specified! Can specify at most {max} positional argument{}",
        plural(*max)
    )]
    TooManyPositionals { max: usize, extra: String },

    /// A bounded positional declared after an unbounded one can never match.
    #[error("for the {option} option: can never match, because it follows an unlimited positional argument!")]
    UnreachablePositional { option: String },

    /// With a consume-after option, every positional must require a value.
    #[error(
        "for the {option} option: will never be matched, because it does not require a value and a ConsumeAfter option is active!"
    )]
    PositionalNotRequired { option: String },
}

impl ParseError {
    /// The nearest known name, when one was close enough to suggest.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::UnknownArgument { suggestion, .. } | Self::UnknownSubCommand { suggestion, .. } => {
                suggestion.as_deref()
            }
            _ => None,
        }
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" Did you mean '{name}'?"),
        None => String::new(),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Errors from reading or writing a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`SettingsError`].
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_argument_with_and_without_suggestion() {
        let with = ParseError::UnknownArgument {
            arg: "--verbsoe".to_string(),
            suggestion: Some("--verbose".to_string()),
        };
        assert_eq!(
            with.to_string(),
            "Unknown command line argument '--verbsoe'. Did you mean '--verbose'?"
        );
        assert_eq!(with.suggestion(), Some("--verbose"));

        let without = ParseError::UnknownArgument {
            arg: "--zzz".to_string(),
            suggestion: None,
        };
        assert_eq!(without.to_string(), "Unknown command line argument '--zzz'.");
        assert_eq!(without.suggestion(), None);
    }

    #[test]
    fn test_invalid_value_includes_converter_message() {
        let err = ParseError::InvalidValue {
            option: "--jobs".to_string(),
            source: ConversionError::InvalidUInt("x".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "for the --jobs option: 'x' value invalid for uint argument!"
        );
    }

    #[test]
    fn test_positional_count_messages() {
        let one = ParseError::NotEnoughPositionals {
            required: 1,
            provided: 0,
        };
        assert!(one.to_string().ends_with("at least 1 positional argument"));
        let many = ParseError::TooManyPositionals {
            max: 2,
            extra: "c".to_string(),
        };
        assert!(many.to_string().ends_with("at most 2 positional arguments"));
    }
}
