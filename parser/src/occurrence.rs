//! Recording occurrences and storing converted values.

use cmdopt_core::{CliOption, OptionId, Occurrences, Registry};

use crate::error::ParseError;
use crate::lookup::dashed;

/// How `id` is named in diagnostics: the spelling the user typed, or the
/// value name of an unnamed option.
pub(crate) fn label(registry: &Registry, id: OptionId, name: &str) -> String {
    if !name.is_empty() {
        return dashed(name);
    }
    registry
        .option(id)
        .map(|option| option.display_name().to_string())
        .unwrap_or_default()
}

/// Counts one occurrence of `id` and stores `text` into it.
///
/// A `continuation` is a further value of a multi-valued occurrence and does
/// not count again. Exceeding the occurrence cap or failing conversion pushes
/// an error and returns `false`.
pub(crate) fn add_occurrence(
    registry: &mut Registry,
    errors: &mut Vec<ParseError>,
    id: OptionId,
    name: &str,
    position: usize,
    text: &str,
    continuation: bool,
) -> bool {
    let option_label = label(registry, id, name);
    let Some(option) = registry.option_mut(id) else {
        return false;
    };

    let count = option.bump_occurrence(continuation);
    match option.occurrences_flag() {
        Occurrences::Optional if count > 1 => {
            errors.push(ParseError::OccursMoreThanOnce {
                option: option_label,
            });
            return false;
        }
        Occurrences::Required if count > 1 => {
            errors.push(ParseError::MustOccurOnce {
                option: option_label,
            });
            return false;
        }
        _ => {}
    }

    match option.store(position, text) {
        Ok(()) => true,
        Err(source) => {
            errors.push(ParseError::InvalidValue {
                option: option_label,
                source,
            });
            false
        }
    }
}

/// Like [`add_occurrence`], but a comma-separated option turns every
/// comma-delimited piece of `text` into its own occurrence.
pub(crate) fn add_comma_separated(
    registry: &mut Registry,
    errors: &mut Vec<ParseError>,
    id: OptionId,
    name: &str,
    position: usize,
    text: &str,
    continuation: bool,
) -> bool {
    let split = registry
        .option(id)
        .is_some_and(CliOption::is_comma_separated);
    if !split {
        return add_occurrence(registry, errors, id, name, position, text, continuation);
    }
    text.split(',')
        .all(|piece| add_occurrence(registry, errors, id, name, position, piece, continuation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdopt_core::{Value, ValueKind};

    #[test]
    fn test_optional_cap_is_enforced_immediately() {
        let mut registry = Registry::new();
        let out = registry.add_option(CliOption::opt("o", ValueKind::String));
        let mut errors = Vec::new();

        assert!(add_occurrence(&mut registry, &mut errors, out, "o", 1, "a", false));
        assert!(!add_occurrence(&mut registry, &mut errors, out, "o", 3, "b", false));
        assert_eq!(
            errors,
            vec![ParseError::OccursMoreThanOnce {
                option: "-o".to_string()
            }]
        );
        assert_eq!(registry.get_str(out), Some("a"));
    }

    #[test]
    fn test_conversion_failure_is_reported() {
        let mut registry = Registry::new();
        let jobs = registry.add_option(CliOption::opt("jobs", ValueKind::UInt));
        let mut errors = Vec::new();

        assert!(!add_occurrence(&mut registry, &mut errors, jobs, "jobs", 1, "many", false));
        assert!(matches!(
            errors.as_slice(),
            [ParseError::InvalidValue { option, .. }] if option == "--jobs"
        ));
    }

    #[test]
    fn test_comma_pieces_are_separate_occurrences() {
        let mut registry = Registry::new();
        let libs = registry.add_option(CliOption::list("l", ValueKind::String).comma_separated());
        let mut errors = Vec::new();

        assert!(add_comma_separated(&mut registry, &mut errors, libs, "l", 1, "m,z,,c", false));
        assert!(errors.is_empty());
        assert_eq!(registry.occurrences(libs), 4);
        assert_eq!(registry.get_strs(libs), vec!["m", "z", "", "c"]);
    }

    #[test]
    fn test_continuation_does_not_count() {
        let mut registry = Registry::new();
        let point = registry.add_option(CliOption::opt("point", ValueKind::Int).multi_val(2));
        let mut errors = Vec::new();

        assert!(add_occurrence(&mut registry, &mut errors, point, "point", 1, "3", false));
        assert!(add_occurrence(&mut registry, &mut errors, point, "point", 2, "4", true));
        assert_eq!(registry.occurrences(point), 1);
        assert_eq!(registry.values(point), &[Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_label_for_unnamed_option() {
        let mut registry = Registry::new();
        let input = registry.add_option(CliOption::positional("input", ValueKind::String));
        assert_eq!(label(&registry, input, ""), "input");
        assert_eq!(label(&registry, input, "x"), "-x");
    }
}
