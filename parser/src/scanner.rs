//! The argument scanner.
//!
//! One left-to-right pass over the expanded argument list. The first bare
//! argument may select a subcommand; after that each argument is either a
//! bare value, the `--` separator, or a dash-prefixed option. Values of
//! options are stored as they are found; bare values are collected for the
//! [`PositionalPlan`] to distribute afterwards. Mistakes are recorded and the
//! scan carries on.

use cmdopt_core::{Formatting, OptionId, Registry, SubCommandId, ValueExpected};
use tracing::debug;

use crate::error::ParseError;
use crate::lookup::{self, Lookup, Resolved};
use crate::occurrence::{add_comma_separated, add_occurrence, label};
use crate::positional::{PositionalPlan, PositionalValue};

/// What the scanner leaves for the later passes.
#[derive(Debug, Clone)]
pub(crate) struct Scan {
    pub sub: SubCommandId,
    pub plan: PositionalPlan,
    pub values: Vec<PositionalValue>,
}

pub(crate) struct Scanner<'a> {
    registry: &'a mut Registry,
    errors: &'a mut Vec<ParseError>,
    suggestions: bool,
    sub: SubCommandId,
    /// A named positional whose following bare arguments belong to it.
    active_positional: Option<OptionId>,
    dash_dash: bool,
    /// Whether the first argument could have been a subcommand name.
    maybe_subcommand: bool,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(
        registry: &'a mut Registry,
        errors: &'a mut Vec<ParseError>,
        suggestions: bool,
    ) -> Self {
        Self {
            registry,
            errors,
            suggestions,
            sub: SubCommandId::TOP_LEVEL,
            active_positional: None,
            dash_dash: false,
            maybe_subcommand: false,
        }
    }

    /// Scans `args`, where `args[0]` is the program name.
    pub(crate) fn scan(mut self, args: &[String]) -> Scan {
        let first = self.select_subcommand(args);
        self.registry.set_active_subcommand(Some(self.sub));

        let plan = PositionalPlan::new(self.registry, self.sub);
        self.errors.extend(plan.errors.iter().cloned());

        let mut values = Vec::new();
        let mut i = first;
        while i < args.len() {
            let arg = args[i].as_str();

            if self.dash_dash || arg == "-" || !arg.starts_with('-') {
                if let Some(active) = self.active_positional {
                    add_comma_separated(self.registry, self.errors, active, "", i, arg, false);
                } else if plan.accepts_values() {
                    values.push((arg.to_string(), i));
                    if plan.consume_after.is_some() && values.len() >= plan.required {
                        // Everything after the required positionals belongs to
                        // the consume-after option, dashes or not.
                        values.extend(
                            args.iter()
                                .enumerate()
                                .skip(i + 1)
                                .map(|(index, text)| (text.clone(), index)),
                        );
                        break;
                    }
                } else {
                    self.unknown(arg, i, None);
                }
                i += 1;
                continue;
            }

            if arg == "--" {
                self.dash_dash = true;
                i += 1;
                continue;
            }

            let body = arg.trim_start_matches('-');
            if let Some(active) = self.eats_args_positional() {
                match lookup::resolve_exact(self.registry, self.sub, body) {
                    Some(resolved) if self.is_positional(resolved.id) => {
                        self.handle(resolved, args, &mut i);
                    }
                    _ => {
                        add_comma_separated(self.registry, self.errors, active, "", i, arg, false);
                    }
                }
                i += 1;
                continue;
            }

            match lookup::resolve(self.registry, self.sub, body) {
                Lookup::Found(resolved) => self.handle(resolved, args, &mut i),
                Lookup::ValueRejected { id, name, value } => {
                    self.errors.push(ParseError::ValueNotAllowed {
                        option: label(self.registry, id, &name),
                        value,
                    });
                }
                Lookup::ValueInGroup { id, name } => {
                    self.errors.push(ParseError::ValueInGroup {
                        option: label(self.registry, id, &name),
                    });
                }
                Lookup::Unknown => {
                    let nearest = if self.suggestions {
                        lookup::nearest_option(self.registry, self.sub, body)
                    } else {
                        None
                    };
                    self.unknown(arg, i, nearest);
                }
            }
            i += 1;
        }

        Scan {
            sub: self.sub,
            plan,
            values,
        }
    }

    /// Picks the subcommand named by `args[1]`, if any, and returns the index
    /// of the first argument left to scan.
    fn select_subcommand(&mut self, args: &[String]) -> usize {
        let Some(candidate) = args.get(1) else {
            return 1;
        };
        if candidate.starts_with('-') || self.registry.registered_subcommands().next().is_none() {
            return 1;
        }
        self.maybe_subcommand = true;
        match self.registry.find_subcommand(candidate) {
            Some(sub) => {
                debug!(subcommand = %candidate, "Selected subcommand");
                self.sub = sub;
                2
            }
            None => 1,
        }
    }

    fn eats_args_positional(&self) -> Option<OptionId> {
        self.active_positional.filter(|id| {
            self.registry
                .option(*id)
                .is_some_and(|option| option.is_eats_args())
        })
    }

    fn is_positional(&self, id: OptionId) -> bool {
        self.registry
            .option(id)
            .is_some_and(|option| option.is_positional())
    }

    /// Acts on a resolved option: a named positional becomes the active one,
    /// anything else receives its value.
    fn handle(&mut self, resolved: Resolved, args: &[String], i: &mut usize) {
        let Resolved {
            id,
            name,
            value,
            group,
        } = resolved;

        for (grouped, grouped_name) in group {
            self.provide(grouped, &grouped_name, None, args, i);
        }

        if self.is_positional(id) {
            let eats_args = self
                .registry
                .option(id)
                .is_some_and(|option| option.is_eats_args());
            if eats_args && value.is_some() {
                self.errors.push(ParseError::EatsArgsWithValue {
                    option: label(self.registry, id, &name),
                });
            }
            self.active_positional = Some(id);
            return;
        }

        self.provide(id, &name, value, args, i);
    }

    /// Supplies a value to `id`, taking it from the following arguments when
    /// the option needs one and none was given inline.
    fn provide(
        &mut self,
        id: OptionId,
        name: &str,
        mut value: Option<String>,
        args: &[String],
        i: &mut usize,
    ) {
        let Some(option) = self.registry.option(id) else {
            return;
        };
        let expected = option.value_expected_flag();
        let always_prefix = option.formatting_flag() == Formatting::AlwaysPrefix;
        let mut remaining = option.multi_val_count();

        match expected {
            ValueExpected::Required if value.is_none() => {
                if *i + 1 >= args.len() || always_prefix {
                    self.errors.push(ParseError::MissingValue {
                        option: label(self.registry, id, name),
                    });
                    return;
                }
                *i += 1;
                value = Some(args[*i].clone());
            }
            ValueExpected::Disallowed => {
                if let Some(given) = &value {
                    self.errors.push(ParseError::ValueNotAllowed {
                        option: label(self.registry, id, name),
                        value: given.clone(),
                    });
                    return;
                }
            }
            _ => {}
        }

        if remaining == 0 {
            let text = value.as_deref().unwrap_or("");
            add_comma_separated(self.registry, self.errors, id, name, *i, text, false);
            return;
        }

        let mut continuation = false;
        if let Some(text) = value {
            if !add_comma_separated(self.registry, self.errors, id, name, *i, &text, false) {
                return;
            }
            remaining -= 1;
            continuation = true;
        }
        while remaining > 0 {
            if *i + 1 >= args.len() {
                self.errors.push(ParseError::NotEnoughValues {
                    option: label(self.registry, id, name),
                });
                return;
            }
            *i += 1;
            if !add_comma_separated(self.registry, self.errors, id, name, *i, &args[*i], continuation) {
                return;
            }
            continuation = true;
            remaining -= 1;
        }
    }

    /// Hands an unmatched argument to the sinks, or records it as unknown.
    fn unknown(&mut self, arg: &str, i: usize, nearest: Option<String>) {
        let sinks = self
            .registry
            .subcommand(self.sub)
            .map(|bucket| bucket.sinks().to_vec())
            .unwrap_or_default();
        if !sinks.is_empty() {
            for sink in sinks {
                add_occurrence(self.registry, self.errors, sink, "", i, arg, false);
            }
            return;
        }

        if i == 1 && self.maybe_subcommand {
            let suggestion = if self.suggestions {
                lookup::nearest_subcommand(self.registry, arg)
            } else {
                None
            };
            self.errors.push(ParseError::UnknownSubCommand {
                name: arg.to_string(),
                suggestion,
            });
        } else {
            self.errors.push(ParseError::UnknownArgument {
                arg: arg.to_string(),
                suggestion: nearest,
            });
        }
    }
}
