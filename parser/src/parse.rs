//! Parse entry points.

use std::io::Write;
use std::path::Path;

use cmdopt_core::{Occurrences, Registry, SubCommandId};
use cmdopt_tokenize::{ExpansionOutcome, Tokenizer};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::lookup::dashed;
use crate::scanner::{Scan, Scanner};
use crate::settings::ParseSettings;

/// Which help listing the command line asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpRequest {
    #[default]
    None,
    /// `--help` or `-h`.
    Normal,
    /// `--help-hidden`, which also lists hidden options.
    Hidden,
}

/// The result of a parse.
///
/// Option values live in the [`Registry`]; the report carries what the
/// caller needs to decide what to do next.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub success: bool,
    pub errors: Vec<ParseError>,
    pub help: HelpRequest,
    pub version_requested: bool,
    /// Response files that could not be expanded, if any.
    pub expansion: ExpansionOutcome,
}

impl ParseReport {
    /// Whether the caller should print help or version text instead of
    /// running.
    pub fn wants_info(&self) -> bool {
        self.help != HelpRequest::None || self.version_requested
    }
}

/// Parses `args` (program name first) into `registry`.
///
/// The tokens of `settings.env_var`, when set, are inserted after the
/// program name, and `@file` arguments are expanded per
/// `settings.response_files`. Every error is written to `errs` as
/// `<program>: <message>`. When the parse fails and
/// `settings.exit_on_error` is set, the process exits with status 1.
pub fn parse_command_line_options<I, W>(
    registry: &mut Registry,
    args: I,
    overview: &str,
    settings: &ParseSettings,
    errs: &mut W,
) -> ParseReport
where
    I: IntoIterator,
    I::Item: Into<String>,
    W: Write,
{
    let mut args: Vec<String> = args.into_iter().map(Into::into).collect();

    if let Some(var) = &settings.env_var {
        if let Ok(value) = std::env::var(var) {
            let extra = Tokenizer::Gnu.tokenize_to_strings(&value);
            debug!(env_var = %var, tokens = extra.len(), "Merging environment options");
            let at = args.len().min(1);
            args.splice(at..at, extra);
        }
    }

    run(registry, args, overview, settings, errs)
}

/// Parses only the shell-style tokens of the environment variable `env_var`,
/// with `program` standing in for the program name.
///
/// Nothing is parsed when the variable is unset, and the report is
/// successful.
pub fn parse_environment_options<W: Write>(
    registry: &mut Registry,
    program: &str,
    env_var: &str,
    overview: &str,
    settings: &ParseSettings,
    errs: &mut W,
) -> ParseReport {
    let Ok(value) = std::env::var(env_var) else {
        debug!(env_var, "Environment variable not set");
        return ParseReport {
            success: true,
            ..ParseReport::default()
        };
    };
    let mut args = vec![program.to_string()];
    args.extend(Tokenizer::Gnu.tokenize_to_strings(&value));

    let settings = ParseSettings {
        env_var: None,
        ..settings.clone()
    };
    run(registry, args, overview, &settings, errs)
}

/// Parses `args` without exiting and without printing anything.
pub fn parse_args<I>(registry: &mut Registry, args: I) -> ParseReport
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    parse_command_line_options(
        registry,
        args,
        "",
        &ParseSettings::non_exiting(),
        &mut std::io::sink(),
    )
}

fn run<W: Write>(
    registry: &mut Registry,
    mut args: Vec<String>,
    overview: &str,
    settings: &ParseSettings,
    errs: &mut W,
) -> ParseReport {
    let program = args
        .first()
        .map(|first| {
            Path::new(first)
                .file_name()
                .map_or_else(|| first.clone(), |name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    registry.set_program_name(&program);
    registry.set_overview(overview);

    let expansion = if settings.response_files.enabled {
        let (expanded, outcome) = settings.response_files.context().expand_strings(args);
        args = expanded;
        outcome
    } else {
        ExpansionOutcome::default()
    };

    let mut errors = Vec::new();
    let Scan { sub, plan, values } =
        Scanner::new(registry, &mut errors, settings.suggestions).scan(&args);

    let help = if registry.occurrences(registry.help_hidden_option()) > 0 {
        HelpRequest::Hidden
    } else if registry.occurrences(registry.help_option()) > 0 {
        HelpRequest::Normal
    } else {
        HelpRequest::None
    };
    let version_requested = registry.occurrences(registry.version_option()) > 0;
    let informational = help != HelpRequest::None || version_requested;

    match plan.check_count(&values) {
        Ok(()) => plan.distribute(registry, &values, &mut errors),
        Err(err) if !informational => errors.push(err),
        Err(_) => {}
    }

    if !informational {
        check_required(registry, sub, &mut errors);
    }

    let success = errors.is_empty();
    registry.set_had_errors(!success);
    for err in &errors {
        let _ = writeln!(errs, "{program}: {err}");
    }
    if !expansion.is_complete() {
        warn!(failures = expansion.failures.len(), "Some response files were not expanded");
    }
    debug!(
        program = %program,
        errors = errors.len(),
        help = ?help,
        version = version_requested,
        "Parsed command line"
    );

    if !success && settings.exit_on_error {
        let _ = errs.flush();
        std::process::exit(1);
    }

    ParseReport {
        success,
        errors,
        help,
        version_requested,
        expansion,
    }
}

/// Reports every required or one-or-more named option of `sub` that never
/// occurred.
fn check_required(registry: &Registry, sub: SubCommandId, errors: &mut Vec<ParseError>) {
    let Some(bucket) = registry.subcommand(sub) else {
        return;
    };
    let mut seen = Vec::new();
    for id in bucket.options().values() {
        if seen.contains(id) {
            continue;
        }
        seen.push(*id);
        let Some(option) = registry.option(*id) else {
            continue;
        };
        let needed = matches!(
            option.occurrences_flag(),
            Occurrences::Required | Occurrences::OneOrMore
        );
        if needed && option.num_occurrences() == 0 {
            errors.push(ParseError::MissingRequired {
                option: dashed(option.name()),
            });
        }
    }
}
