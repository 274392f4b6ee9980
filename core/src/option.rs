//! Option declarations and their per-parse state.
//!
//! A [`CliOption`] is built with one of the constructors ([`CliOption::flag`],
//! [`CliOption::opt`], [`CliOption::list`], [`CliOption::positional`], ...) and
//! a chain of modifiers, then handed to
//! [`Registry::add_option`](crate::Registry::add_option). After registration
//! the registry owns it; the parser records occurrences and values on it in
//! place.

use serde::{Deserialize, Serialize};

use crate::registry::{CategoryId, SubCommandId};
use crate::value::{ConversionError, Value, ValueKind};

/// Handle to an option owned by a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub(crate) usize);

impl OptionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether an option accepts a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueExpected {
    /// `-o` or `-o=value`.
    Optional,
    /// `-o value`, `-o=value`, or glued for prefix options.
    Required,
    /// `-o` only.
    Disallowed,
}

/// How many times an option may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Occurrences {
    /// Zero or one time.
    #[default]
    Optional,
    /// Exactly once.
    Required,
    ZeroOrMore,
    OneOrMore,
    /// Absorbs every positional value left once the ordinary positionals are
    /// satisfied.
    ConsumeAfter,
}

impl Occurrences {
    /// Required and one-or-more options need at least one value.
    pub fn requires_value(self) -> bool {
        matches!(self, Self::Required | Self::OneOrMore)
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }
}

/// How an option is spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Formatting {
    #[default]
    Normal,
    /// Bare value, matched by declaration order.
    Positional,
    /// Value may be glued to the name: `-Ipath`, `-I path`, `-I=path`.
    Prefix,
    /// Value is always glued to the name: `-Wl,foo`.
    AlwaysPrefix,
    /// Single-character switch combinable with others: `-abc`.
    Grouping,
}

impl Formatting {
    pub fn is_prefixed_or_grouping(self) -> bool {
        matches!(self, Self::Prefix | Self::AlwaysPrefix | Self::Grouping)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Visibility {
    #[default]
    Normal,
    /// Listed only by the hidden help listing.
    Hidden,
    /// Never listed and never suggested.
    ReallyHidden,
}

/// How successive occurrences are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Storage {
    /// The last occurrence wins.
    #[default]
    Single,
    /// Every occurrence is appended.
    List,
}

/// Which subcommands an option is registered in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Membership {
    /// The top-level (no subcommand) bucket.
    #[default]
    TopLevel,
    Only(Vec<SubCommandId>),
    /// Every subcommand, including the ones registered later.
    All,
}

/// A declared command-line option.
#[derive(Debug, Clone)]
pub struct CliOption {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: String,
    pub(crate) value_name: String,
    pub(crate) kind: ValueKind,
    pub(crate) value_expected: Option<ValueExpected>,
    pub(crate) occurrences: Occurrences,
    pub(crate) formatting: Formatting,
    pub(crate) visibility: Visibility,
    pub(crate) storage: Storage,
    pub(crate) comma_separated: bool,
    pub(crate) eats_args: bool,
    pub(crate) sink: bool,
    pub(crate) default_option: bool,
    pub(crate) multi_val: usize,
    pub(crate) initial: Option<Value>,
    pub(crate) membership: Membership,
    pub(crate) categories: Vec<CategoryId>,
    pub(crate) num_occurrences: usize,
    pub(crate) values: Vec<Value>,
    pub(crate) positions: Vec<usize>,
}

impl CliOption {
    fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: String::new(),
            value_name: String::new(),
            kind,
            value_expected: None,
            occurrences: Occurrences::Optional,
            formatting: Formatting::Normal,
            visibility: Visibility::Normal,
            storage: Storage::Single,
            comma_separated: false,
            eats_args: false,
            sink: false,
            default_option: false,
            multi_val: 0,
            initial: None,
            membership: Membership::TopLevel,
            categories: Vec::new(),
            num_occurrences: 0,
            values: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// A boolean switch, false unless given.
    pub fn flag(name: &str) -> Self {
        Self::new(name, ValueKind::Bool).init(Value::Bool(false))
    }

    /// A single-valued option; the last occurrence wins.
    pub fn opt(name: &str, kind: ValueKind) -> Self {
        Self::new(name, kind)
    }

    /// A multi-occurrence option collecting every value.
    pub fn list(name: &str, kind: ValueKind) -> Self {
        let mut option = Self::new(name, kind);
        option.storage = Storage::List;
        option.occurrences = Occurrences::ZeroOrMore;
        option
    }

    /// An unnamed positional taking at most one value.
    pub fn positional(value_name: &str, kind: ValueKind) -> Self {
        let mut option = Self::new("", kind);
        option.value_name = value_name.to_string();
        option.formatting = Formatting::Positional;
        option
    }

    /// An unnamed positional collecting any number of values.
    pub fn positional_list(value_name: &str, kind: ValueKind) -> Self {
        let mut option = Self::list("", kind);
        option.value_name = value_name.to_string();
        option.formatting = Formatting::Positional;
        option
    }

    /// Collects every value left once the positionals are satisfied.
    pub fn consume_after(value_name: &str, kind: ValueKind) -> Self {
        let mut option = Self::list("", kind);
        option.value_name = value_name.to_string();
        option.occurrences = Occurrences::ConsumeAfter;
        option
    }

    /// Receives every token that matches no other option.
    pub fn sink(value_name: &str) -> Self {
        let mut option = Self::list("", ValueKind::String);
        option.value_name = value_name.to_string();
        option.sink = true;
        option
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn desc(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn value_desc(mut self, value_name: &str) -> Self {
        self.value_name = value_name.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.occurrences = Occurrences::Required;
        self
    }

    pub fn occurrences(mut self, occurrences: Occurrences) -> Self {
        self.occurrences = occurrences;
        self
    }

    pub fn value_expected(mut self, value_expected: ValueExpected) -> Self {
        self.value_expected = Some(value_expected);
        self
    }

    pub fn formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn prefix(self) -> Self {
        self.formatting(Formatting::Prefix)
    }

    pub fn always_prefix(self) -> Self {
        self.formatting(Formatting::AlwaysPrefix)
    }

    pub fn grouping(self) -> Self {
        self.formatting(Formatting::Grouping)
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = Visibility::Hidden;
        self
    }

    pub fn really_hidden(mut self) -> Self {
        self.visibility = Visibility::ReallyHidden;
        self
    }

    pub fn comma_separated(mut self) -> Self {
        self.comma_separated = true;
        self
    }

    /// For positionals: once activated by name, claim every following token
    /// until another option is recognised.
    pub fn eats_args(mut self) -> Self {
        self.eats_args = true;
        self
    }

    /// Yield this option's names to a later, non-default option of the same
    /// name instead of failing registration.
    pub fn default_option(mut self) -> Self {
        self.default_option = true;
        self
    }

    /// Every occurrence consumes `count` values, all of which are kept.
    pub fn multi_val(mut self, count: usize) -> Self {
        self.multi_val = count;
        self.storage = Storage::List;
        self
    }

    /// Value reported while the option has not occurred; restored by reset.
    pub fn init(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Adds `sub` to the subcommands the option belongs to. Naming
    /// [`SubCommandId::ALL`] is the same as
    /// [`all_subcommands`](Self::all_subcommands).
    pub fn sub(mut self, sub: SubCommandId) -> Self {
        if sub == SubCommandId::ALL {
            return self.all_subcommands();
        }
        match &mut self.membership {
            Membership::All => {}
            Membership::Only(subs) => {
                if !subs.contains(&sub) {
                    subs.push(sub);
                }
            }
            Membership::TopLevel => self.membership = Membership::Only(vec![sub]),
        }
        self
    }

    pub fn all_subcommands(mut self) -> Self {
        self.membership = Membership::All;
        self
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Primary name followed by the aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .filter(|name| !name.is_empty())
            .chain(self.aliases.iter().map(String::as_str))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// The explicit value arity, or the kind's default.
    pub fn value_expected_flag(&self) -> ValueExpected {
        self.value_expected.unwrap_or(if self.kind.takes_value_by_default() {
            ValueExpected::Required
        } else {
            ValueExpected::Optional
        })
    }

    pub fn occurrences_flag(&self) -> Occurrences {
        self.occurrences
    }

    pub fn formatting_flag(&self) -> Formatting {
        self.formatting
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn storage(&self) -> Storage {
        self.storage
    }

    pub fn is_positional(&self) -> bool {
        self.formatting == Formatting::Positional
    }

    pub fn is_grouping(&self) -> bool {
        self.formatting == Formatting::Grouping
    }

    pub fn is_comma_separated(&self) -> bool {
        self.comma_separated
    }

    pub fn is_eats_args(&self) -> bool {
        self.eats_args
    }

    pub fn is_sink(&self) -> bool {
        self.sink
    }

    pub fn is_default_option(&self) -> bool {
        self.default_option
    }

    pub fn is_consume_after(&self) -> bool {
        self.occurrences == Occurrences::ConsumeAfter
    }

    pub fn multi_val_count(&self) -> usize {
        self.multi_val
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    pub fn initial(&self) -> Option<&Value> {
        self.initial.as_ref()
    }

    /// How many times the option has occurred during the current parse.
    pub fn num_occurrences(&self) -> usize {
        self.num_occurrences
    }

    /// The current value: the last one stored, or the initial value.
    pub fn value(&self) -> Option<&Value> {
        self.values.last().or(self.initial.as_ref())
    }

    /// Every value stored during the current parse, in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Argument index of every stored value.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Name used in diagnostics: the primary name, or the value name for
    /// unnamed options.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.value_name.is_empty() {
            &self.value_name
        } else {
            &self.description
        }
    }

    /// Counts one occurrence (unless `continuation` marks a further value of a
    /// multi-valued occurrence) and returns the new count.
    pub fn bump_occurrence(&mut self, continuation: bool) -> usize {
        if !continuation {
            self.num_occurrences += 1;
        }
        self.num_occurrences
    }

    /// Converts `text` and stores it, recording the argument `position`.
    pub fn store(&mut self, position: usize, text: &str) -> Result<(), ConversionError> {
        let value = self.kind.convert(text)?;
        match self.storage {
            Storage::Single => {
                self.values.clear();
                self.positions.clear();
            }
            Storage::List => {}
        }
        self.values.push(value);
        self.positions.push(position);
        Ok(())
    }

    /// Returns the option to its unparsed state.
    pub fn reset(&mut self) {
        self.num_occurrences = 0;
        self.values.clear();
        self.positions.clear();
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }
}
