//! Parse settings.
//!
//! Controls the policy around a parse: whether failure exits the process,
//! which environment variable contributes extra arguments, how response
//! files are expanded, and whether unknown names get a suggestion.
//!
//! # Example YAML
//!
//! ```yaml
//! exit_on_error: false
//! env_var: CC_OPTIONS
//! response_files:
//!   enabled: true
//!   syntax: config
//!   relative_names: true
//! suggestions: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use cmdopt_tokenize::{ExpansionContext, Tokenizer};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How `@file` arguments are handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseFileSettings {
    /// Expand `@file` arguments at all.
    pub enabled: bool,
    /// Tokenizer applied to the contents of each file.
    pub syntax: Tokenizer,
    /// Resolve `@file` names found inside a file against that file's
    /// directory.
    pub relative_names: bool,
    /// Directory for top-level relative names; the working directory when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_dir: Option<PathBuf>,
}

impl Default for ResponseFileSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            syntax: Tokenizer::Gnu,
            relative_names: true,
            current_dir: None,
        }
    }
}

impl ResponseFileSettings {
    /// The expansion context these settings describe.
    pub fn context(&self) -> ExpansionContext {
        let ctx = ExpansionContext::new(self.syntax).with_relative_names(self.relative_names);
        match &self.current_dir {
            Some(dir) => ctx.with_current_dir(dir.clone()),
            None => ctx,
        }
    }
}

/// Settings for one call to
/// [`parse_command_line_options`](crate::parse_command_line_options).
///
/// # Examples
///
/// ```
/// # use cmdopt_parser::ParseSettings;
/// let settings: ParseSettings = serde_yaml::from_str("exit_on_error: false").unwrap();
/// assert!(!settings.exit_on_error);
/// assert!(settings.response_files.enabled);
/// assert!(settings.suggestions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSettings {
    /// Terminate the process with status 1 when the parse fails.
    pub exit_on_error: bool,
    /// Environment variable whose shell-style tokens are inserted after the
    /// program name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    pub response_files: ResponseFileSettings,
    /// Offer the nearest known name for unknown arguments.
    pub suggestions: bool,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            exit_on_error: true,
            env_var: None,
            response_files: ResponseFileSettings::default(),
            suggestions: true,
        }
    }
}

impl ParseSettings {
    /// Settings that report failure instead of exiting.
    pub fn non_exiting() -> Self {
        Self {
            exit_on_error: false,
            ..Self::default()
        }
    }

    pub fn with_env_var(mut self, name: &str) -> Self {
        self.env_var = Some(name.to_string());
        self
    }

    pub fn with_response_files(mut self, response_files: ResponseFileSettings) -> Self {
        self.response_files = response_files;
        self
    }

    /// Loads settings from a YAML file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SettingsError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::SettingsError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        Ok(settings)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SettingsError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::SettingsError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
