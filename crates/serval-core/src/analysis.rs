//! Analysis engine for code analysis and diagnostic generation
//!
//! An [`AnalysisEngine`] is configured once (rule registry, severity
//! overrides, global names) and is read-only afterwards; `analyze` builds an
//! independent scope model and diagnostics list per call, so many files can
//! be analyzed concurrently against one engine without locking.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::{Config, SeverityValue, default_globals};
use crate::diagnostic::Diagnostic;
use crate::fixes::{FixOutcome, apply_fixes};
use crate::parser::ParsedFile;
use crate::rules::{RuleRegistry, built_in_rules};
use crate::runner::{ActiveRule, RunParams, run_rules};

pub struct AnalysisEngine {
    registry: RuleRegistry,
    severity_overrides: HashMap<String, SeverityValue>,
    globals: HashSet<String>,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            registry: built_in_rules(),
            severity_overrides: HashMap::new(),
            globals: default_globals(),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        let mut engine = Self::new();
        engine.severity_overrides = config.rules.clone();
        engine.globals.extend(config.globals.iter().cloned());
        engine
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// For registering additional rules. Must happen before any concurrent
    /// `analyze` calls begin.
    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn analyze(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let directives = file.directives();
        let filename = &file.metadata().filename;

        // Structural failures surface as synthetic error diagnostics with no
        // rule id; a multi-file run stays resilient.
        for error in file.errors() {
            if directives.should_ignore(error.line, None) {
                continue;
            }
            diagnostics.push(Diagnostic::structural(
                error.message.clone(),
                filename.clone(),
                Some(error.line),
                Some(error.column + 1),
            ));
        }

        let Some(tree) = file.tree() else {
            debug!(file = %filename, "no tree, reporting parse failures only");
            return diagnostics;
        };

        let mut globals = self.globals.clone();
        globals.extend(file.file_globals().iter().cloned());

        let rule_diagnostics = run_rules(
            RunParams {
                tree,
                source: file.source(),
                lines: file.lines(),
                file_path: filename,
                globals: &globals,
                directives,
            },
            self.active_rules(),
        );

        debug!(
            file = %filename,
            count = rule_diagnostics.len(),
            "rule dispatch complete"
        );
        diagnostics.extend(rule_diagnostics);
        diagnostics
    }

    /// Analyze and fold the resulting fixes into a corrected source buffer.
    /// One deterministic pass; re-analyze the output to pick up diagnostics
    /// whose edits were skipped.
    pub fn analyze_and_fix(&self, file: &ParsedFile) -> (Vec<Diagnostic>, FixOutcome) {
        let diagnostics = self.analyze(file);
        let outcome = apply_fixes(file.source(), &diagnostics);
        (diagnostics, outcome)
    }

    fn active_rules(&self) -> Vec<ActiveRule> {
        self.registry
            .rules()
            .filter_map(|rule| {
                let meta = rule.meta();
                let severity = match self.severity_overrides.get(meta.name) {
                    Some(value) => value.to_severity()?,
                    None => meta.default_severity,
                };
                Some(ActiveRule {
                    id: meta.name.to_string(),
                    severity,
                    listeners: rule.create(),
                })
            })
            .collect()
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;

    fn analyze_source(code: &str) -> Vec<Diagnostic> {
        let engine = AnalysisEngine::new();
        let file = ParsedFile::from_source("test.js", code);
        engine.analyze(&file)
    }

    fn only_rule(name: &str) -> AnalysisEngine {
        let mut config = Config::default();
        let engine = AnalysisEngine::new();
        for rule in engine.registry().rules() {
            if rule.meta().name != name {
                config
                    .rules
                    .insert(rule.meta().name.to_string(), SeverityValue::Off);
            }
        }
        AnalysisEngine::with_config(&config)
    }

    #[test]
    fn analyze_reports_rule_diagnostics() {
        let diagnostics = analyze_source("var x = 1;\nconsole.log(x);\n");

        assert!(
            diagnostics
                .iter()
                .any(|d| d.rule_id.as_deref() == Some("no-var"))
        );
    }

    #[test]
    fn syntax_errors_become_structural_diagnostics() {
        let diagnostics = analyze_source("const = ;");

        assert!(!diagnostics.is_empty());
        assert!(diagnostics.iter().any(|d| d.rule_id.is_none()));
        assert!(diagnostics.iter().all(|d| d.rule_id.is_some() || d.is_error()));
    }

    #[test]
    fn disabled_rule_produces_no_diagnostics() {
        let mut config = Config::default();
        config
            .rules
            .insert("no-var".to_string(), SeverityValue::Off);
        let engine = AnalysisEngine::with_config(&config);
        let file = ParsedFile::from_source("test.js", "var x = 1;\nconsole.log(x);\n");

        let diagnostics = engine.analyze(&file);

        assert!(
            !diagnostics
                .iter()
                .any(|d| d.rule_id.as_deref() == Some("no-var"))
        );
    }

    #[test]
    fn severity_override_applies() {
        let mut config = Config::default();
        config
            .rules
            .insert("no-var".to_string(), SeverityValue::Warn);
        let engine = AnalysisEngine::with_config(&config);
        let file = ParsedFile::from_source("test.js", "var x = 1;\nconsole.log(x);\n");

        let diagnostics = engine.analyze(&file);
        let no_var = diagnostics
            .iter()
            .find(|d| d.rule_id.as_deref() == Some("no-var"))
            .expect("no-var diagnostic");

        assert_eq!(no_var.severity, Severity::Warning);
    }

    #[test]
    fn config_globals_reach_no_undef() {
        let mut config = Config::default();
        config.globals.push("injectedGlobal".to_string());
        let engine = AnalysisEngine::with_config(&config);
        let file = ParsedFile::from_source("test.js", "injectedGlobal();\n");

        let diagnostics = engine.analyze(&file);

        assert!(
            !diagnostics
                .iter()
                .any(|d| d.rule_id.as_deref() == Some("no-undef"))
        );
    }

    #[test]
    fn disable_line_suppresses_one_rule_only() {
        let diagnostics = analyze_source(
            "// serval-disable-next-line no-var\nvar x = 1;\nvar y = 2;\nconsole.log(x, y);\n",
        );

        let no_var_lines: Vec<usize> = diagnostics
            .iter()
            .filter(|d| d.rule_id.as_deref() == Some("no-var"))
            .map(|d| d.line.unwrap())
            .collect();

        assert_eq!(no_var_lines, vec![3], "only the unsuppressed line reports");
    }

    #[test]
    fn unused_binding_end_to_end() {
        let engine = only_rule("no-unused-vars");
        let file = ParsedFile::from_source("test.js", "const unused = 1\n");

        let diagnostics = engine.analyze(&file);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("never used"));
    }

    #[test]
    fn use_before_define_end_to_end() {
        let engine = only_rule("no-use-before-define");
        let file = ParsedFile::from_source("test.js", "call()\nconst call = function () {}\n");

        let diagnostics = engine.analyze(&file);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("used before it was defined"));
    }

    #[test]
    fn curly_fix_end_to_end() {
        let engine = only_rule("curly");
        let file = ParsedFile::from_source("test.js", "if (true)\n  console.log('x')\n");

        let (_, outcome) = engine.analyze_and_fix(&file);

        assert_eq!(outcome.applied_edits, 2);
        assert_eq!(outcome.output, "if (true) {\n  console.log('x')\n}\n");
    }

    #[test]
    fn registry_mut_allows_overriding_before_analysis() {
        let mut engine = AnalysisEngine::new();
        let before = engine.registry().len();
        engine
            .registry_mut()
            .register(Box::new(crate::rules::no_var::NoVar::new()));

        assert_eq!(engine.registry().len(), before, "re-register overwrites");
    }
}
