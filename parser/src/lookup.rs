//! Resolving dash-prefixed arguments to options.
//!
//! Resolution runs in two stages. The exact stage splits the argument once on
//! `=` and looks the name up directly. The prefixed stage repeatedly drops the
//! last character of the argument until it names a prefix or grouping option;
//! whatever follows is a glued value, an `=value`, or more grouping options.
//! Both stages consult the active subcommand first and the top level second.

use cmdopt_core::{
    CliOption, Formatting, OptionId, Registry, SubCommand, SubCommandId, ValueExpected, Visibility,
};

/// An argument resolved to an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub id: OptionId,
    /// The name as it matched, used in diagnostics.
    pub name: String,
    pub value: Option<String>,
    /// Grouping options that came before `id` in the same argument.
    pub group: Vec<(OptionId, String)>,
}

impl Resolved {
    fn new(id: OptionId, name: &str, value: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            value: value.map(str::to_string),
            group: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup {
    Found(Resolved),
    /// An exact match that was dropped because the option forbids the inline
    /// value, and nothing else matched.
    ValueRejected { id: OptionId, name: String, value: String },
    /// A value-required grouping option in the middle of a group.
    ValueInGroup { id: OptionId, name: String },
    Unknown,
}

enum Exact {
    Found(Resolved),
    Rejected { id: OptionId, name: String, value: String },
    Missing,
}

/// `-x` for single-character names, `--name` otherwise.
pub(crate) fn dashed(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

/// The tables searched for `sub`: the subcommand itself, then the top level.
fn tables(registry: &Registry, sub: SubCommandId) -> Vec<&SubCommand> {
    let mut tables: Vec<&SubCommand> = registry.subcommand(sub).into_iter().collect();
    if sub != SubCommandId::TOP_LEVEL {
        tables.push(registry.top_level());
    }
    tables
}

/// Resolves `arg` (leading dashes already removed) in `sub`.
pub(crate) fn resolve(registry: &Registry, sub: SubCommandId, arg: &str) -> Lookup {
    let tables = tables(registry, sub);

    let mut rejected = None;
    for table in &tables {
        match exact(registry, table, arg) {
            Exact::Found(resolved) => return Lookup::Found(resolved),
            Exact::Rejected { id, name, value } => {
                rejected.get_or_insert(Lookup::ValueRejected { id, name, value });
            }
            Exact::Missing => {}
        }
    }

    for table in &tables {
        match prefixed(registry, table, arg) {
            Lookup::Unknown => {}
            other => return other,
        }
    }

    rejected.unwrap_or(Lookup::Unknown)
}

/// Exact lookup only, as used while an eats-args positional is active.
pub(crate) fn resolve_exact(registry: &Registry, sub: SubCommandId, arg: &str) -> Option<Resolved> {
    tables(registry, sub)
        .into_iter()
        .find_map(|table| match exact(registry, table, arg) {
            Exact::Found(resolved) => Some(resolved),
            _ => None,
        })
}

fn exact(registry: &Registry, table: &SubCommand, arg: &str) -> Exact {
    let Some((name, value)) = arg.split_once('=') else {
        return match table.lookup(arg) {
            Some(id) => Exact::Found(Resolved::new(id, arg, None)),
            None => Exact::Missing,
        };
    };

    let Some(id) = table.lookup(name) else {
        return Exact::Missing;
    };
    let Some(option) = registry.option(id) else {
        return Exact::Missing;
    };
    if option.formatting_flag() == Formatting::AlwaysPrefix {
        return Exact::Missing;
    }
    if option.value_expected_flag() == ValueExpected::Disallowed {
        return Exact::Rejected {
            id,
            name: name.to_string(),
            value: value.to_string(),
        };
    }
    Exact::Found(Resolved::new(id, name, Some(value)))
}

/// Finds the longest leading part of `arg` naming an option accepted by
/// `pred`, shortening one character at a time. Returns the option and the
/// byte length of the matched name.
fn find_by_shortening(
    registry: &Registry,
    table: &SubCommand,
    arg: &str,
    pred: fn(&CliOption) -> bool,
) -> Option<(OptionId, usize)> {
    let mut candidate = arg;
    loop {
        if let Some(id) = table.lookup(candidate) {
            if registry.option(id).is_some_and(pred) {
                return Some((id, candidate.len()));
            }
        }
        match candidate.char_indices().next_back() {
            Some((last, _)) if last > 0 => candidate = &candidate[..last],
            _ => return None,
        }
    }
}

fn prefixed(registry: &Registry, table: &SubCommand, arg: &str) -> Lookup {
    if arg.chars().count() < 2 {
        return Lookup::Unknown;
    }
    let Some((mut id, mut len)) = find_by_shortening(registry, table, arg, |option| {
        option.formatting_flag().is_prefixed_or_grouping()
    }) else {
        return Lookup::Unknown;
    };

    let mut rest = arg;
    let mut group = Vec::new();
    loop {
        let (name, tail) = rest.split_at(len);
        let Some(option) = registry.option(id) else {
            return Lookup::Unknown;
        };
        let formatting = option.formatting_flag();

        if tail.is_empty()
            || formatting == Formatting::AlwaysPrefix
            || (formatting == Formatting::Prefix && !tail.starts_with('='))
        {
            let value = (!tail.is_empty()).then_some(tail);
            let mut resolved = Resolved::new(id, name, value);
            resolved.group = group;
            return Lookup::Found(resolved);
        }
        if let Some(value) = tail.strip_prefix('=') {
            let mut resolved = Resolved::new(id, name, Some(value));
            resolved.group = group;
            return Lookup::Found(resolved);
        }

        // Only grouping options reach this point.
        if option.value_expected_flag() == ValueExpected::Required {
            return Lookup::ValueInGroup {
                id,
                name: name.to_string(),
            };
        }
        group.push((id, name.to_string()));
        rest = tail;
        match find_by_shortening(registry, table, rest, CliOption::is_grouping) {
            Some((next, next_len)) => {
                id = next;
                len = next_len;
            }
            None => return Lookup::Unknown,
        }
    }
}

/// The closest option name to `arg` in `sub`, spelled as the user would type
/// it. Really-hidden options are never offered.
///
/// For options that take a value, only the part before `=` is compared and
/// the value is carried over into the suggestion. Ties keep the name seen
/// first in registration order; candidates further than `max(2, len / 3)`
/// edits away are dropped.
pub(crate) fn nearest_option(registry: &Registry, sub: SubCommandId, arg: &str) -> Option<String> {
    if arg.is_empty() {
        return None;
    }
    let (head, value) = arg.split_once('=').unwrap_or((arg, ""));
    let table = registry.subcommand(sub)?;

    let mut best: Option<(usize, String)> = None;
    for (name, id) in table.options() {
        let Some(option) = registry.option(*id) else {
            continue;
        };
        if option.visibility() == Visibility::ReallyHidden {
            continue;
        }
        let permits_value = option.value_expected_flag() != ValueExpected::Disallowed;
        let flag = if permits_value { head } else { arg };
        let distance = strsim::levenshtein(name, flag);
        if best.as_ref().is_none_or(|(closest, _)| distance < *closest) {
            let suggestion = if value.is_empty() || !permits_value {
                dashed(name)
            } else {
                format!("{}={value}", dashed(name))
            };
            best = Some((distance, suggestion));
        }
    }

    let bound = (head.chars().count() / 3).max(2);
    best.filter(|(distance, _)| *distance <= bound)
        .map(|(_, suggestion)| suggestion)
}

/// The first registered subcommand within one edit of `name`.
pub(crate) fn nearest_subcommand(registry: &Registry, name: &str) -> Option<String> {
    registry
        .registered_subcommands()
        .map(|(_, sub)| sub.name())
        .find(|candidate| strsim::levenshtein(candidate, name) < 2)
        .map(str::to_string)
}
