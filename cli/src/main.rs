use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cmdopt_parser::ParseSettings;
use cmdopt_tokenize::{ExpansionContext, Tokenizer, decode_response_file};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific syntax enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliSyntax {
    Gnu,
    Windows,
    Config,
}

impl From<CliSyntax> for Tokenizer {
    fn from(syntax: CliSyntax) -> Self {
        match syntax {
            CliSyntax::Gnu => Self::Gnu,
            CliSyntax::Windows => Self::Windows,
            CliSyntax::Config => Self::Config,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cmdopt")]
#[command(about = "Inspect command-line tokenization and response-file expansion")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Tokenize a file (or stdin with `-`) and print the tokens as JSON.
    Tokenize(TokenizeArgs),
    /// Expand `@file` arguments and print the resulting argument list as JSON.
    Expand(ExpandArgs),
}

#[derive(Debug, Args)]
struct TokenizeArgs {
    /// File to tokenize, or `-` for stdin.
    file: PathBuf,
    /// Quoting rules to apply.
    #[arg(long, default_value = "gnu")]
    syntax: CliSyntax,
    /// Emit `null` at the end of every source line.
    #[arg(long)]
    mark_eols: bool,
}

#[derive(Debug, Args)]
struct ExpandArgs {
    /// Quoting rules for response files (default: gnu, or the settings file).
    #[arg(long)]
    syntax: Option<CliSyntax>,
    /// Resolve nested `@file` names against the current directory instead of
    /// the including file's directory.
    #[arg(long)]
    no_relative: bool,
    /// YAML parse settings to take response-file options from.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Arguments to expand.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ExpandOutput {
    tokens: Vec<String>,
    complete: bool,
    failures: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Tokenize(args) => run_tokenize(args),
        Command::Expand(args) => run_expand(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays clean. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_tokenize(args: TokenizeArgs) -> Result<(), String> {
    let bytes = if args.file.to_str() == Some("-") {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        bytes
    } else {
        fs::read(&args.file)
            .map_err(|err| format!("Failed to read '{}': {err}", args.file.display()))?
    };

    let text = decode_response_file(&bytes);
    let mut tokens = Vec::new();
    Tokenizer::from(args.syntax).tokenize(&text, args.mark_eols, &mut tokens);
    debug!(tokens = tokens.len(), "Tokenized input");

    print_json(&tokens)
}

fn run_expand(args: ExpandArgs) -> Result<(), String> {
    let mut response_files = match &args.settings {
        Some(path) => {
            ParseSettings::load(path)
                .map_err(|err| format!("Failed to load settings '{}': {err}", path.display()))?
                .response_files
        }
        None => ParseSettings::default().response_files,
    };
    if let Some(syntax) = args.syntax {
        response_files.syntax = syntax.into();
    }
    if args.no_relative {
        response_files.relative_names = false;
    }

    let context: ExpansionContext = response_files.context();
    let (tokens, outcome) = context.expand_strings(args.args);

    let output = ExpandOutput {
        tokens,
        complete: outcome.is_complete(),
        failures: outcome.failures.iter().map(ToString::to_string).collect(),
    };
    print_json(&output)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{json}");
    Ok(())
}
