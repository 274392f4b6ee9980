//! Distribution of bare values over positional options.
//!
//! The scanner only collects bare values. Once it is done, a
//! [`PositionalPlan`] for the active subcommand checks the counts and hands
//! each value to a positional option in declaration order, or to the
//! consume-after option.

use cmdopt_core::{OptionId, Occurrences, Registry, SubCommandId};
use tracing::debug;

use crate::error::ParseError;
use crate::occurrence::{add_comma_separated, label};

/// A bare value and the argument index it came from.
pub type PositionalValue = (String, usize);

/// Positional layout of one subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalPlan {
    pub positionals: Vec<OptionId>,
    pub consume_after: Option<OptionId>,
    /// How many values the positionals need at minimum.
    pub required: usize,
    /// Some positional (or the consume-after option) takes any number of
    /// values.
    pub unbounded: bool,
    /// Declarations that can never receive a value.
    pub errors: Vec<ParseError>,
}

impl PositionalPlan {
    /// Computes the plan for `sub`.
    pub fn new(registry: &Registry, sub: SubCommandId) -> Self {
        let Some(bucket) = registry.subcommand(sub) else {
            return Self::default();
        };
        let mut plan = Self {
            positionals: bucket.positionals().to_vec(),
            consume_after: bucket.consume_after(),
            ..Self::default()
        };

        let mut unbounded_seen = false;
        for id in &plan.positionals {
            let Some(option) = registry.option(*id) else {
                continue;
            };
            let occurrences = option.occurrences_flag();
            if occurrences.requires_value() {
                plan.required += 1;
            } else if plan.consume_after.is_some() {
                if plan.positionals.len() > 1 {
                    plan.errors.push(ParseError::PositionalNotRequired {
                        option: label(registry, *id, ""),
                    });
                }
            } else if unbounded_seen && option.name().is_empty() {
                plan.errors.push(ParseError::UnreachablePositional {
                    option: label(registry, *id, ""),
                });
            }
            unbounded_seen |= occurrences.is_unbounded();
        }
        plan.unbounded = unbounded_seen || plan.consume_after.is_some();
        plan
    }

    /// Whether bare values have anywhere to go.
    pub fn accepts_values(&self) -> bool {
        !self.positionals.is_empty() || self.consume_after.is_some()
    }

    /// Checks the number of collected values against the plan.
    ///
    /// # Errors
    ///
    /// Fails with [`ParseError::NotEnoughPositionals`] below the minimum and
    /// with [`ParseError::TooManyPositionals`] when the positionals are
    /// bounded and the values outnumber them.
    pub fn check_count(&self, values: &[PositionalValue]) -> Result<(), ParseError> {
        if values.len() < self.required {
            return Err(ParseError::NotEnoughPositionals {
                required: self.required,
                provided: values.len(),
            });
        }
        if !self.unbounded && values.len() > self.positionals.len() {
            let extra = values
                .get(self.positionals.len())
                .map(|(text, _)| text.clone())
                .unwrap_or_default();
            return Err(ParseError::TooManyPositionals {
                max: self.positionals.len(),
                extra,
            });
        }
        Ok(())
    }

    /// Hands every value to its option. `values` must have passed
    /// [`check_count`](Self::check_count).
    pub fn distribute(
        &self,
        registry: &mut Registry,
        values: &[PositionalValue],
        errors: &mut Vec<ParseError>,
    ) {
        debug!(
            values = values.len(),
            positionals = self.positionals.len(),
            consume_after = self.consume_after.is_some(),
            "Distributing positional values"
        );
        match self.consume_after {
            None => self.distribute_bounded(registry, values, errors),
            Some(consume_after) => {
                self.distribute_with_consume_after(registry, consume_after, values, errors)
            }
        }
    }

    fn distribute_bounded(
        &self,
        registry: &mut Registry,
        values: &[PositionalValue],
        errors: &mut Vec<ParseError>,
    ) {
        let mut next = 0;
        let mut still_required = self.required;

        for &id in &self.positionals {
            let occurrences = occurrences_of(registry, id);
            if occurrences.requires_value() {
                if let Some((text, position)) = values.get(next) {
                    add_comma_separated(registry, errors, id, "", *position, text, false);
                }
                next += 1;
                still_required = still_required.saturating_sub(1);
            }

            // Take more values while later options can still be satisfied.
            let mut done = occurrences == Occurrences::Required;
            while !done && values.len().saturating_sub(next) > still_required {
                match occurrences {
                    Occurrences::Optional => done = true,
                    Occurrences::ZeroOrMore | Occurrences::OneOrMore => {}
                    Occurrences::Required | Occurrences::ConsumeAfter => break,
                }
                let (text, position) = &values[next];
                add_comma_separated(registry, errors, id, "", *position, text, false);
                next += 1;
            }
        }
    }

    fn distribute_with_consume_after(
        &self,
        registry: &mut Registry,
        consume_after: OptionId,
        values: &[PositionalValue],
        errors: &mut Vec<ParseError>,
    ) {
        let mut next = 0;
        for &id in &self.positionals {
            if occurrences_of(registry, id).requires_value() {
                if let Some((text, position)) = values.get(next) {
                    add_comma_separated(registry, errors, id, "", *position, text, false);
                    next += 1;
                }
            }
        }

        // A lone optional positional gets the first value; the rest go on.
        if let [only] = self.positionals.as_slice() {
            if next == 0 {
                if let Some((text, position)) = values.first() {
                    add_comma_separated(registry, errors, *only, "", *position, text, false);
                    next = 1;
                }
            }
        }

        for (text, position) in values.iter().skip(next) {
            add_comma_separated(registry, errors, consume_after, "", *position, text, false);
        }
    }
}

fn occurrences_of(registry: &Registry, id: OptionId) -> Occurrences {
    registry
        .option(id)
        .map(|option| option.occurrences_flag())
        .unwrap_or_default()
}
