//! The option registry.
//!
//! A [`Registry`] is the explicit context object owned by the hosting
//! process. It owns every registered option and subcommand, hands out
//! [`OptionId`]/[`SubCommandId`] handles, and carries the scratch state of the
//! most recent parse (program name, overview text, active subcommand, error
//! flag).
//!
//! Options registered for every subcommand are fanned out at registration time
//! and recorded in a replay log, which is applied to every subcommand
//! registered afterwards.

use tracing::debug;

use crate::error::{RegistrationError, Result};
use crate::option::{CliOption, Membership, OptionId, ValueExpected, Visibility};
use crate::subcommand::SubCommand;
use crate::value::Value;

/// Handle to a subcommand bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubCommandId(pub(crate) usize);

impl SubCommandId {
    /// The bucket used when no subcommand is named on the command line.
    pub const TOP_LEVEL: Self = Self(0);
    /// The bucket mirrored into every subcommand.
    pub const ALL: Self = Self(1);

    pub fn is_reserved(self) -> bool {
        self == Self::TOP_LEVEL || self == Self::ALL
    }
}

/// Handle to an option category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(pub(crate) usize);

impl CategoryId {
    /// Category of options registered without one.
    pub const GENERAL: Self = Self(0);
    /// Category of the built-in help and version options.
    pub const GENERIC: Self = Self(1);
}

/// A named group of options, used by help renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub description: String,
}

/// Where an option lands inside a subcommand bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Named,
    Positional,
    Sink,
    ConsumeAfter,
}

impl Slot {
    fn of(option: &CliOption) -> Self {
        if option.is_consume_after() {
            Self::ConsumeAfter
        } else if option.is_positional() {
            Self::Positional
        } else if option.is_sink() {
            Self::Sink
        } else {
            Self::Named
        }
    }
}

/// Process-level owner of every option and subcommand.
#[derive(Debug)]
pub struct Registry {
    options: Vec<Option<CliOption>>,
    subcommands: Vec<Option<SubCommand>>,
    all_log: Vec<OptionId>,
    categories: Vec<Category>,
    active: Option<SubCommandId>,
    program_name: String,
    overview: String,
    had_errors: bool,
    help: OptionId,
    help_hidden: OptionId,
    version: OptionId,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry holding the reserved buckets and the built-in
    /// `help` (alias `h`), `help-hidden` and `version` options.
    pub fn new() -> Self {
        let mut registry = Self {
            options: Vec::new(),
            subcommands: vec![Some(SubCommand::new("", "")), Some(SubCommand::new("", ""))],
            all_log: Vec::new(),
            categories: Vec::new(),
            active: None,
            program_name: String::new(),
            overview: String::new(),
            had_errors: false,
            help: OptionId(0),
            help_hidden: OptionId(0),
            version: OptionId(0),
        };
        registry.seed();
        registry
    }

    fn seed(&mut self) {
        self.categories = vec![
            Category {
                name: "General options".to_string(),
                description: String::new(),
            },
            Category {
                name: "Generic Options".to_string(),
                description: String::new(),
            },
        ];
        let builtin = |name: &str, desc: &str| {
            CliOption::flag(name)
                .desc(desc)
                .value_expected(ValueExpected::Disallowed)
                .default_option()
                .all_subcommands()
                .category(CategoryId::GENERIC)
        };
        self.help = self.add_option(builtin("help", "Display available options").alias("h"));
        self.help_hidden = self.add_option(builtin("help-hidden", "Display all available options").hidden());
        self.version = self.add_option(builtin("version", "Display the version of this program"));
    }

    /// Registers an option.
    ///
    /// # Panics
    ///
    /// Panics when the declaration violates a registration invariant; see
    /// [`try_add_option`](Self::try_add_option).
    pub fn add_option(&mut self, option: CliOption) -> OptionId {
        match self.try_add_option(option) {
            Ok(id) => id,
            Err(err) => panic!("inconsistency in registered command-line options: {err}"),
        }
    }

    /// Registers an option, reporting contract violations instead of
    /// panicking.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name within a target subcommand, a second
    /// consume-after option, a grouping option whose name is not one
    /// character, an anonymous non-positional option, a multi-valued option
    /// that forbids values, or an unregistered target subcommand.
    pub fn try_add_option(&mut self, mut option: CliOption) -> Result<OptionId> {
        let slot = Slot::of(&option);
        if option.name.is_empty() && slot == Slot::Named {
            return Err(RegistrationError::MissingName);
        }
        if option.is_grouping() && option.name.chars().count() != 1 {
            return Err(RegistrationError::GroupingNameLength(option.name.clone()));
        }
        if option.multi_val > 0 && option.value_expected_flag() == ValueExpected::Disallowed {
            return Err(RegistrationError::MultiValueDisallowed(
                option.display_name().to_string(),
            ));
        }
        if option.categories.is_empty() {
            option.categories.push(CategoryId::GENERAL);
        }

        let targets = self.targets(&option)?;
        let names: Vec<String> = option.names().map(str::to_string).collect();
        for sub in &targets {
            self.check_link(*sub, &names, slot, option.default_option)?;
        }

        let id = OptionId(self.options.len());
        debug!(
            option = option.display_name(),
            subcommands = targets.len(),
            "Registering option"
        );
        let default_option = option.default_option;
        let for_all = option.membership == Membership::All;
        self.options.push(Some(option));
        for sub in targets {
            if let Some(bucket) = self.subcommands[sub.0].as_mut() {
                link(bucket, id, &names, slot, default_option);
            }
        }
        if for_all {
            self.all_log.push(id);
        }
        Ok(id)
    }

    fn targets(&self, option: &CliOption) -> Result<Vec<SubCommandId>> {
        match &option.membership {
            Membership::TopLevel => Ok(vec![SubCommandId::TOP_LEVEL]),
            Membership::Only(subs) => {
                for sub in subs {
                    if self.subcommand(*sub).is_none() {
                        return Err(RegistrationError::UnknownSubCommand(
                            option.display_name().to_string(),
                        ));
                    }
                }
                Ok(subs.clone())
            }
            Membership::All => Ok(self
                .subcommands
                .iter()
                .enumerate()
                .filter(|(_, sub)| sub.is_some())
                .map(|(index, _)| SubCommandId(index))
                .collect()),
        }
    }

    fn check_link(
        &self,
        sub: SubCommandId,
        names: &[String],
        slot: Slot,
        default_option: bool,
    ) -> Result<()> {
        let Some(bucket) = self.subcommand(sub) else {
            return Ok(());
        };
        for name in names {
            if let Some(existing) = bucket.lookup(name) {
                let existing_is_default = self
                    .option(existing)
                    .is_some_and(CliOption::is_default_option);
                if !default_option && !existing_is_default {
                    return Err(RegistrationError::DuplicateOption {
                        option: name.clone(),
                        subcommand: self.describe_subcommand(sub),
                    });
                }
            }
        }
        if slot == Slot::ConsumeAfter && bucket.consume_after.is_some() {
            return Err(RegistrationError::DuplicateConsumeAfter(
                self.describe_subcommand(sub),
            ));
        }
        Ok(())
    }

    fn describe_subcommand(&self, sub: SubCommandId) -> String {
        match sub {
            SubCommandId::TOP_LEVEL => "the top-level command".to_string(),
            SubCommandId::ALL => "every subcommand".to_string(),
            other => match self.subcommand(other) {
                Some(bucket) => format!("subcommand '{}'", bucket.name),
                None => "an unregistered subcommand".to_string(),
            },
        }
    }

    /// Unregisters an option, purging it from every subcommand.
    /// Returns the option with its final state.
    pub fn remove_option(&mut self, id: OptionId) -> Option<CliOption> {
        let option = self.options.get_mut(id.0)?.take()?;
        for bucket in self.subcommands.iter_mut().flatten() {
            bucket.forget(id);
        }
        self.all_log.retain(|existing| *existing != id);
        debug!(option = option.display_name(), "Unregistered option");
        Some(option)
    }

    /// Registers a named subcommand.
    ///
    /// # Panics
    ///
    /// Panics on an empty or duplicate name; see
    /// [`try_add_subcommand`](Self::try_add_subcommand).
    pub fn add_subcommand(&mut self, name: &str, description: &str) -> SubCommandId {
        match self.try_add_subcommand(name, description) {
            Ok(id) => id,
            Err(err) => panic!("inconsistency in registered command-line options: {err}"),
        }
    }

    /// Registers a named subcommand and mirrors every option registered for
    /// all subcommands into it.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty or already taken.
    pub fn try_add_subcommand(&mut self, name: &str, description: &str) -> Result<SubCommandId> {
        if name.is_empty() {
            return Err(RegistrationError::EmptySubCommandName);
        }
        if self.find_subcommand(name).is_some() {
            return Err(RegistrationError::DuplicateSubCommand(name.to_string()));
        }

        let mut bucket = SubCommand::new(name, description);
        for id in &self.all_log {
            if let Some(option) = self.option(*id) {
                let names: Vec<String> = option.names().map(str::to_string).collect();
                link(&mut bucket, *id, &names, Slot::of(option), option.default_option);
            }
        }

        let id = SubCommandId(self.subcommands.len());
        debug!(subcommand = name, replayed = self.all_log.len(), "Registering subcommand");
        self.subcommands.push(Some(bucket));
        Ok(id)
    }

    /// Unregisters a named subcommand. Reserved buckets cannot be removed.
    pub fn remove_subcommand(&mut self, id: SubCommandId) -> Option<SubCommand> {
        if id.is_reserved() {
            return None;
        }
        let bucket = self.subcommands.get_mut(id.0)?.take()?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(bucket)
    }

    /// Finds a named subcommand by exact name.
    pub fn find_subcommand(&self, name: &str) -> Option<SubCommandId> {
        self.registered_subcommands()
            .find(|(_, bucket)| bucket.name == name)
            .map(|(id, _)| id)
    }

    /// Named subcommands in registration order.
    pub fn registered_subcommands(&self) -> impl Iterator<Item = (SubCommandId, &SubCommand)> {
        self.subcommands
            .iter()
            .enumerate()
            .skip(2)
            .filter_map(|(index, bucket)| bucket.as_ref().map(|b| (SubCommandId(index), b)))
    }

    pub fn subcommand(&self, id: SubCommandId) -> Option<&SubCommand> {
        self.subcommands.get(id.0).and_then(Option::as_ref)
    }

    pub fn top_level(&self) -> &SubCommand {
        self.subcommand(SubCommandId::TOP_LEVEL)
            .unwrap_or_else(|| unreachable!("top-level bucket is never removed"))
    }

    /// Every option reachable from `sub`, in registration order.
    pub fn registered_options(&self, sub: SubCommandId) -> Vec<(OptionId, &CliOption)> {
        let Some(bucket) = self.subcommand(sub) else {
            return Vec::new();
        };
        bucket
            .option_ids()
            .into_iter()
            .filter_map(|id| self.option(id).map(|option| (id, option)))
            .collect()
    }

    /// Every registered option, in registration order.
    pub fn options(&self) -> impl Iterator<Item = (OptionId, &CliOption)> {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(index, option)| option.as_ref().map(|o| (OptionId(index), o)))
    }

    pub fn option(&self, id: OptionId) -> Option<&CliOption> {
        self.options.get(id.0).and_then(Option::as_ref)
    }

    pub fn option_mut(&mut self, id: OptionId) -> Option<&mut CliOption> {
        self.options.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn add_category(&mut self, name: &str, description: &str) -> CategoryId {
        self.categories.push(Category {
            name: name.to_string(),
            description: description.to_string(),
        });
        CategoryId(self.categories.len() - 1)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.0)
    }

    /// Marks every option of `sub` outside `keep` (and outside the generic
    /// category) as really hidden.
    pub fn hide_unrelated_options(&mut self, keep: &[CategoryId], sub: SubCommandId) {
        let Some(ids) = self.subcommand(sub).map(SubCommand::option_ids) else {
            return;
        };
        for id in ids {
            if let Some(option) = self.options.get_mut(id.0).and_then(Option::as_mut) {
                let related = option
                    .categories
                    .iter()
                    .any(|cat| *cat == CategoryId::GENERIC || keep.contains(cat));
                if !related {
                    option.set_visibility(Visibility::ReallyHidden);
                }
            }
        }
    }

    /// Restores every option to its unparsed state without unregistering
    /// anything, so the same registry can parse again.
    pub fn reset_all_option_occurrences(&mut self) {
        for option in self.options.iter_mut().flatten() {
            option.reset();
        }
        self.active = None;
        self.had_errors = false;
    }

    /// Unregisters every option, subcommand and category and re-seeds the
    /// built-ins. Handles obtained before the reset are invalid; slots are
    /// reused, so an old handle may name a newly registered entry.
    pub fn reset(&mut self) {
        self.options.clear();
        self.subcommands.truncate(2);
        for bucket in self.subcommands.iter_mut().flatten() {
            bucket.clear();
        }
        self.all_log.clear();
        self.active = None;
        self.program_name.clear();
        self.overview.clear();
        self.had_errors = false;
        self.seed();
    }

    pub fn active_subcommand(&self) -> Option<SubCommandId> {
        self.active
    }

    pub fn set_active_subcommand(&mut self, sub: Option<SubCommandId>) {
        self.active = sub;
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    pub fn set_program_name(&mut self, name: &str) {
        self.program_name = name.to_string();
    }

    pub fn overview(&self) -> &str {
        &self.overview
    }

    pub fn set_overview(&mut self, overview: &str) {
        self.overview = overview.to_string();
    }

    /// Whether the most recent parse failed.
    pub fn had_errors(&self) -> bool {
        self.had_errors
    }

    pub fn set_had_errors(&mut self, had_errors: bool) {
        self.had_errors = had_errors;
    }

    pub fn help_option(&self) -> OptionId {
        self.help
    }

    pub fn help_hidden_option(&self) -> OptionId {
        self.help_hidden
    }

    pub fn version_option(&self) -> OptionId {
        self.version
    }

    /// Current value of an option (last stored, or its initial value).
    pub fn value(&self, id: OptionId) -> Option<&Value> {
        self.option(id).and_then(CliOption::value)
    }

    pub fn values(&self, id: OptionId) -> &[Value] {
        self.option(id).map(CliOption::values).unwrap_or_default()
    }

    pub fn occurrences(&self, id: OptionId) -> usize {
        self.option(id).map_or(0, CliOption::num_occurrences)
    }

    pub fn get_bool(&self, id: OptionId) -> Option<bool> {
        self.value(id).and_then(Value::as_bool)
    }

    pub fn get_int(&self, id: OptionId) -> Option<i64> {
        self.value(id).and_then(Value::as_int)
    }

    pub fn get_uint(&self, id: OptionId) -> Option<u64> {
        self.value(id).and_then(Value::as_uint)
    }

    pub fn get_float(&self, id: OptionId) -> Option<f64> {
        self.value(id).and_then(Value::as_float)
    }

    pub fn get_str(&self, id: OptionId) -> Option<&str> {
        self.value(id).and_then(Value::as_str)
    }

    pub fn get_strs(&self, id: OptionId) -> Vec<&str> {
        self.values(id).iter().filter_map(Value::as_str).collect()
    }

    pub fn get_enum(&self, id: OptionId) -> Option<i64> {
        match self.value(id)? {
            Value::Enum { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// Adds `id` to `bucket` under `names` and in its slot. A default option never
/// displaces an existing name; any other option displaces a default one.
fn link(bucket: &mut SubCommand, id: OptionId, names: &[String], slot: Slot, default_option: bool) {
    for name in names {
        if default_option && bucket.options.contains_key(name) {
            continue;
        }
        bucket.options.insert(name.clone(), id);
    }
    match slot {
        Slot::Named => {}
        Slot::Positional => bucket.positionals.push(id),
        Slot::Sink => bucket.sinks.push(id),
        Slot::ConsumeAfter => bucket.consume_after = Some(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn test_new_registry_has_builtins_in_top_level() {
        let registry = Registry::new();
        let top = registry.top_level();
        assert_eq!(top.lookup("help"), Some(registry.help_option()));
        assert_eq!(top.lookup("h"), Some(registry.help_option()));
        assert_eq!(top.lookup("version"), Some(registry.version_option()));
        assert_eq!(registry.registered_subcommands().count(), 0);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = Registry::new();
        registry.add_option(CliOption::opt("out", ValueKind::String));
        let err = registry
            .try_add_option(CliOption::flag("x").alias("out"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateOption {
                option: "out".to_string(),
                subcommand: "the top-level command".to_string(),
            }
        );
    }

    #[test]
    #[should_panic(expected = "inconsistency in registered command-line options")]
    fn test_add_option_panics_on_duplicate() {
        let mut registry = Registry::new();
        registry.add_option(CliOption::flag("v"));
        registry.add_option(CliOption::flag("v"));
    }

    #[test]
    fn test_user_option_displaces_default_option() {
        let mut registry = Registry::new();
        let host = registry.add_option(CliOption::opt("h", ValueKind::String));
        let top = registry.top_level();
        assert_eq!(top.lookup("h"), Some(host));
        assert_eq!(top.lookup("help"), Some(registry.help_option()));
    }

    #[test]
    fn test_second_consume_after_is_rejected() {
        let mut registry = Registry::new();
        registry.add_option(CliOption::consume_after("args", ValueKind::String));
        let err = registry
            .try_add_option(CliOption::consume_after("more", ValueKind::String))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateConsumeAfter(_)));
    }

    #[test]
    fn test_grouping_requires_single_char() {
        let mut registry = Registry::new();
        let err = registry
            .try_add_option(CliOption::flag("ab").grouping())
            .unwrap_err();
        assert_eq!(err, RegistrationError::GroupingNameLength("ab".to_string()));
        assert!(registry.try_add_option(CliOption::flag("a").grouping()).is_ok());
    }

    #[test]
    fn test_anonymous_normal_option_is_rejected() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.try_add_option(CliOption::opt("", ValueKind::String)),
            Err(RegistrationError::MissingName)
        );
    }

    #[test]
    fn test_all_subcommands_fan_out_and_replay() {
        let mut registry = Registry::new();
        let build = registry.add_subcommand("build", "Build");
        let verbose = registry.add_option(CliOption::flag("verbose").all_subcommands());
        let test = registry.add_subcommand("test", "Test");

        for sub in [SubCommandId::TOP_LEVEL, build, test] {
            assert_eq!(
                registry.subcommand(sub).unwrap().lookup("verbose"),
                Some(verbose)
            );
        }
        // Built-ins registered before either subcommand are replayed too.
        assert_eq!(
            registry.subcommand(test).unwrap().lookup("help"),
            Some(registry.help_option())
        );
    }

    #[test]
    fn test_duplicate_subcommand_is_rejected() {
        let mut registry = Registry::new();
        registry.add_subcommand("build", "");
        assert_eq!(
            registry.try_add_subcommand("build", ""),
            Err(RegistrationError::DuplicateSubCommand("build".to_string()))
        );
        assert_eq!(
            registry.try_add_subcommand("", ""),
            Err(RegistrationError::EmptySubCommandName)
        );
    }

    #[test]
    fn test_remove_option_purges_everywhere() {
        let mut registry = Registry::new();
        let build = registry.add_subcommand("build", "");
        let jobs = registry.add_option(CliOption::opt("jobs", ValueKind::UInt).alias("j").all_subcommands());
        let removed = registry.remove_option(jobs).unwrap();
        assert_eq!(removed.name(), "jobs");
        assert!(registry.top_level().lookup("j").is_none());
        assert!(registry.subcommand(build).unwrap().lookup("jobs").is_none());

        let later = registry.add_subcommand("later", "");
        assert!(registry.subcommand(later).unwrap().lookup("jobs").is_none());
        assert!(registry.option(jobs).is_none());
    }

    #[test]
    fn test_option_for_unknown_subcommand_is_rejected() {
        let mut registry = Registry::new();
        let build = registry.add_subcommand("build", "");
        registry.remove_subcommand(build);
        assert!(matches!(
            registry.try_add_option(CliOption::flag("v").sub(build)),
            Err(RegistrationError::UnknownSubCommand(_))
        ));
    }

    #[test]
    fn test_reset_occurrences_keeps_registrations() {
        let mut registry = Registry::new();
        let level = registry.add_option(CliOption::opt("level", ValueKind::Int).init(Value::Int(1)));
        let option = registry.option_mut(level).unwrap();
        option.bump_occurrence(false);
        option.store(1, "3").unwrap();
        registry.set_active_subcommand(Some(SubCommandId::TOP_LEVEL));
        assert_eq!(registry.get_int(level), Some(3));

        registry.reset_all_option_occurrences();
        assert_eq!(registry.get_int(level), Some(1));
        assert_eq!(registry.occurrences(level), 0);
        assert!(registry.active_subcommand().is_none());
        assert_eq!(registry.top_level().lookup("level"), Some(level));
    }

    #[test]
    fn test_reset_unregisters_everything() {
        let mut registry = Registry::new();
        let opt = registry.add_option(CliOption::flag("x"));
        let sub = registry.add_subcommand("build", "");
        registry.set_program_name("tool");
        registry.reset();

        assert!(registry.option(opt).is_none());
        assert!(registry.subcommand(sub).is_none());
        assert!(registry.top_level().lookup("x").is_none());
        assert!(registry.top_level().lookup("help").is_some());
        assert_eq!(registry.program_name(), "");
        // The name is free again.
        registry.add_option(CliOption::flag("x"));
        registry.add_subcommand("build", "");
    }

    #[test]
    fn test_repeated_reset_reuses_slots() {
        let mut registry = Registry::new();
        let help = registry.help_option();
        for _ in 0..5 {
            registry.add_option(CliOption::flag("x"));
            registry.add_subcommand("build", "");
            registry.reset();
        }
        assert_eq!(registry.options.len(), 3);
        assert_eq!(registry.subcommands.len(), 2);
        assert_eq!(registry.help_option(), help);
        assert_eq!(registry.options().count(), 3);
    }

    #[test]
    fn test_sub_all_means_every_subcommand() {
        let mut registry = Registry::new();
        let early = registry.add_subcommand("early", "");
        let quiet = registry.add_option(CliOption::flag("q").sub(SubCommandId::ALL));
        let late = registry.add_subcommand("late", "");

        assert_eq!(registry.option(quiet).unwrap().membership(), &Membership::All);
        for sub in [SubCommandId::TOP_LEVEL, early, late] {
            assert_eq!(registry.subcommand(sub).unwrap().lookup("q"), Some(quiet));
        }
    }

    #[test]
    fn test_hide_unrelated_options_keeps_generic() {
        let mut registry = Registry::new();
        let codegen = registry.add_category("Codegen", "Code generation options");
        let march = registry.add_option(CliOption::opt("march", ValueKind::String).category(codegen));
        let other = registry.add_option(CliOption::flag("stats"));

        registry.hide_unrelated_options(&[codegen], SubCommandId::TOP_LEVEL);

        assert_eq!(registry.option(march).unwrap().visibility(), Visibility::Normal);
        assert_eq!(registry.option(other).unwrap().visibility(), Visibility::ReallyHidden);
        assert_eq!(
            registry.option(registry.help_option()).unwrap().visibility(),
            Visibility::Normal
        );
    }
}
