//! Subcommand buckets.
//!
//! Every registry holds two reserved buckets besides the named subcommands:
//! the top-level bucket (empty name) used when no subcommand is selected, and
//! the `All` bucket whose options are mirrored into every other bucket.

use indexmap::IndexMap;

use crate::option::OptionId;

/// A named, independently scoped set of options.
#[derive(Debug, Clone, Default)]
pub struct SubCommand {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) options: IndexMap<String, OptionId>,
    pub(crate) positionals: Vec<OptionId>,
    pub(crate) consume_after: Option<OptionId>,
    pub(crate) sinks: Vec<OptionId>,
}

impl SubCommand {
    pub(crate) fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Looks up an option by primary name or alias.
    pub fn lookup(&self, name: &str) -> Option<OptionId> {
        self.options.get(name).copied()
    }

    /// Name table in registration order. Aliases appear as separate entries.
    pub fn options(&self) -> &IndexMap<String, OptionId> {
        &self.options
    }

    /// Declared positional options in declaration order.
    pub fn positionals(&self) -> &[OptionId] {
        &self.positionals
    }

    pub fn consume_after(&self) -> Option<OptionId> {
        self.consume_after
    }

    pub fn sinks(&self) -> &[OptionId] {
        &self.sinks
    }

    /// Every distinct option reachable from this bucket, in registration order.
    pub fn option_ids(&self) -> Vec<OptionId> {
        let mut ids: Vec<OptionId> = Vec::new();
        let all = self
            .options
            .values()
            .chain(self.positionals.iter())
            .chain(self.consume_after.iter())
            .chain(self.sinks.iter());
        for id in all {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    pub(crate) fn forget(&mut self, id: OptionId) {
        self.options.retain(|_, existing| *existing != id);
        self.positionals.retain(|existing| *existing != id);
        self.sinks.retain(|existing| *existing != id);
        if self.consume_after == Some(id) {
            self.consume_after = None;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.options.clear();
        self.positionals.clear();
        self.consume_after = None;
        self.sinks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forget_purges_every_slot() {
        let mut sub = SubCommand::new("build", "Build things");
        let id = OptionId(3);
        sub.options.insert("out".to_string(), id);
        sub.options.insert("o".to_string(), id);
        sub.options.insert("v".to_string(), OptionId(4));
        sub.positionals.push(id);
        sub.consume_after = Some(id);
        sub.sinks.push(id);

        sub.forget(id);

        assert_eq!(sub.lookup("out"), None);
        assert_eq!(sub.lookup("o"), None);
        assert_eq!(sub.lookup("v"), Some(OptionId(4)));
        assert!(sub.positionals().is_empty());
        assert!(sub.consume_after().is_none());
        assert!(sub.sinks().is_empty());
    }

    #[test]
    fn test_option_ids_are_distinct_in_order() {
        let mut sub = SubCommand::new("", "");
        sub.options.insert("a".to_string(), OptionId(1));
        sub.options.insert("alpha".to_string(), OptionId(1));
        sub.options.insert("b".to_string(), OptionId(2));
        sub.positionals.push(OptionId(5));
        assert_eq!(sub.option_ids(), vec![OptionId(1), OptionId(2), OptionId(5)]);
    }
}
