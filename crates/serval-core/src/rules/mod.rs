//! Rule system for code analysis
//!
//! A [`Rule`] bundles immutable metadata with a `create` constructor that
//! produces fresh per-file listener state. Listeners declare the node kinds
//! they subscribe to, split into enter and exit phases; the dispatch engine
//! invokes them in rule registration order.

pub mod curly;
pub mod default_case_last;
pub mod eqeqeq;
pub mod no_debugger;
pub mod no_duplicate_case;
pub mod no_empty;
pub mod no_undef;
pub mod no_unused_vars;
pub mod no_use_before_define;
pub mod no_var;

use crate::context::RuleContext;
use crate::diagnostic::Severity;
use crate::syntax::{Node, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMeta {
    /// Unique key; registering another rule under the same name overwrites
    /// the prior entry.
    pub name: &'static str,
    pub description: &'static str,
    pub recommended: bool,
    pub default_severity: Severity,
}

pub trait Rule: Send + Sync {
    fn meta(&self) -> &RuleMeta;
    /// Fresh listener state for one file's analysis.
    fn create(&self) -> Box<dyn RuleListeners>;
}

/// Per-file listener state. Handlers are infallible by signature; an
/// internal invariant violation panics and aborts the file's analysis
/// instead of being folded into the diagnostics.
pub trait RuleListeners {
    fn enter_kinds(&self) -> &'static [NodeKind] {
        &[]
    }

    fn exit_kinds(&self) -> &'static [NodeKind] {
        &[]
    }

    fn on_enter(&mut self, _node: &Node, _ctx: &mut RuleContext<'_>) {}

    fn on_exit(&mut self, _node: &Node, _ctx: &mut RuleContext<'_>) {}
}

/// The rule registry: name → rule definition, in registration order.
///
/// Configure-once discipline: the registry is fully populated before any
/// analysis starts and is read-only afterwards, which is what makes
/// concurrent per-file analysis safe without locking.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule. A rule with an already-registered `meta.name`
    /// replaces the prior entry in place, keeping its registration slot.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        let name = rule.meta().name;
        match self.rules.iter().position(|r| r.meta().name == name) {
            Some(index) => self.rules[index] = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.meta().name == name)
            .map(|r| r.as_ref())
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// All built-in rules, in their canonical registration order.
pub fn built_in_rules() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    registry.register(Box::new(no_use_before_define::NoUseBeforeDefine::new()));
    registry.register(Box::new(no_undef::NoUndef::new()));
    registry.register(Box::new(no_unused_vars::NoUnusedVars::new()));
    registry.register(Box::new(no_debugger::NoDebugger::new()));
    registry.register(Box::new(no_var::NoVar::new()));
    registry.register(Box::new(no_empty::NoEmpty::new()));
    registry.register(Box::new(no_duplicate_case::NoDuplicateCase::new()));
    registry.register(Box::new(eqeqeq::Eqeqeq::new()));
    registry.register(Box::new(curly::Curly::new()));
    registry.register(Box::new(default_case_last::DefaultCaseLast::new()));

    registry
}

/// Declares the rule struct with its metadata and constructors.
#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        name = $rule_name:literal,
        description = $desc:literal,
        recommended = $recommended:literal,
        default_severity = $severity:ident
    ) => {
        pub struct $name {
            meta: $crate::rules::RuleMeta,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    meta: $crate::rules::RuleMeta {
                        name: $rule_name,
                        description: $desc,
                        recommended: $recommended,
                        default_severity: $crate::diagnostic::Severity::$severity,
                    },
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Rule;
    use crate::config::default_globals;
    use crate::diagnostic::Diagnostic;
    use crate::parser::ParsedFile;
    use crate::runner::{ActiveRule, RunParams, run_rules};

    /// Run a single rule over `code` the way the analysis engine would:
    /// default globals merged with the file's `/* globals */` directives,
    /// suppression directives honored.
    pub(crate) fn run_rule(rule: &dyn Rule, filename: &str, code: &str) -> Vec<Diagnostic> {
        let file = ParsedFile::from_source(filename, code);
        let tree = file.tree().expect("test source must parse");

        let mut globals = default_globals();
        globals.extend(file.file_globals().iter().cloned());

        run_rules(
            RunParams {
                tree,
                source: file.source(),
                lines: file.lines(),
                file_path: &file.metadata().filename,
                globals: &globals,
                directives: file.directives(),
            },
            vec![ActiveRule {
                id: rule.meta().name.to_string(),
                severity: rule.meta().default_severity,
                listeners: rule.create(),
            }],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopListeners;

    impl RuleListeners for NoopListeners {}

    declare_rule!(
        MacroTestRule,
        name = "macro-test",
        description = "Tests the declare_rule! macro",
        recommended = false,
        default_severity = Warning
    );

    impl Rule for MacroTestRule {
        fn meta(&self) -> &RuleMeta {
            &self.meta
        }

        fn create(&self) -> Box<dyn RuleListeners> {
            Box::new(NoopListeners)
        }
    }

    declare_rule!(
        OtherMacroRule,
        name = "macro-test",
        description = "Same name, different definition",
        recommended = true,
        default_severity = Error
    );

    impl Rule for OtherMacroRule {
        fn meta(&self) -> &RuleMeta {
            &self.meta
        }

        fn create(&self) -> Box<dyn RuleListeners> {
            Box::new(NoopListeners)
        }
    }

    #[test]
    fn declare_rule_macro_builds_metadata() {
        let rule = MacroTestRule::new();

        assert_eq!(rule.meta().name, "macro-test");
        assert_eq!(rule.meta().default_severity, Severity::Warning);
        assert!(!rule.meta().recommended);
    }

    #[test]
    fn registry_preserves_registration_order() {
        let registry = built_in_rules();
        let names: Vec<&str> = registry.rules().map(|r| r.meta().name).collect();

        assert_eq!(names[0], "no-use-before-define");
        assert!(names.contains(&"curly"));
        assert!(names.contains(&"no-unused-vars"));
        assert_eq!(names.len(), registry.len());
    }

    #[test]
    fn reregistering_a_name_overwrites_in_place() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(MacroTestRule::new()));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("macro-test").unwrap().meta().default_severity,
            Severity::Warning
        );

        registry.register(Box::new(OtherMacroRule::new()));
        assert_eq!(registry.len(), 1, "same name must not add a second entry");
        assert_eq!(
            registry.get("macro-test").unwrap().meta().default_severity,
            Severity::Error
        );
    }

    #[test]
    fn get_unknown_rule_returns_none() {
        let registry = built_in_rules();
        assert!(registry.get("does-not-exist").is_none());
    }

    #[test]
    fn built_in_rules_have_unique_names() {
        let registry = built_in_rules();
        let mut names: Vec<&str> = registry.rules().map(|r| r.meta().name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
