//! Inline comment directives for suppressing diagnostics
//!
//! Supports ESLint-style disable comments, scoped to a line or to the whole
//! file:
//! - `// serval-disable-line eqeqeq` - disable eqeqeq for the current line
//! - `// serval-disable-next-line eqeqeq` - disable eqeqeq for the next line
//! - `// serval-disable-next-line` - disable all rules for the next line
//! - `/* serval-disable */` - disable all rules for the whole file
//! - `// serval-disable-next-line eqeqeq, no-var` - disable multiple rules
//!
//! The `eslint-` prefixed spellings are honored as aliases. An unscoped
//! directive suppresses every rule for its line and wins over later scoped
//! directives on the same line.
//!
//! Suppression is applied at report time: a suppressed diagnostic is dropped
//! before it is queued or counted.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::parser::SourceComment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveMode {
    Line,
    NextLine,
    File,
}

const DIRECTIVE_KEYWORDS: &[(&str, DirectiveMode)] = &[
    ("serval-disable-next-line", DirectiveMode::NextLine),
    ("serval-disable-line", DirectiveMode::Line),
    ("serval-disable", DirectiveMode::File),
    ("eslint-disable-next-line", DirectiveMode::NextLine),
    ("eslint-disable-line", DirectiveMode::Line),
    ("eslint-disable", DirectiveMode::File),
];

#[derive(Debug, Clone, Default)]
struct Suppression {
    all: bool,
    rules: HashSet<String>,
}

impl Suppression {
    fn register(&mut self, rules: Option<HashSet<String>>) {
        match rules {
            // An unscoped directive wins; later scoped directives on the
            // same line cannot narrow it again.
            None => {
                self.all = true;
                self.rules.clear();
            }
            Some(rules) => {
                if !self.all {
                    self.rules.extend(rules);
                }
            }
        }
    }

    fn matches(&self, rule_id: Option<&str>) -> bool {
        if self.all {
            return true;
        }
        rule_id.is_some_and(|rule| self.rules.contains(rule))
    }
}

/// Suppression directives extracted from a file's comments, queried through
/// [`InlineDirectives::should_ignore`] when a diagnostic is reported.
#[derive(Debug, Clone, Default)]
pub struct InlineDirectives {
    file: Suppression,
    by_line: HashMap<usize, Suppression>,
}

impl InlineDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_comments(comments: &[SourceComment]) -> Self {
        let mut directives = Self::new();

        for comment in comments {
            let text = comment.text.trim();
            if text.is_empty() {
                continue;
            }

            for (keyword, mode) in DIRECTIVE_KEYWORDS {
                let Some(payload) = text.strip_prefix(keyword) else {
                    continue;
                };
                // Require a boundary so `serval-disable-block` is not read
                // as `serval-disable` with a payload.
                if !payload.is_empty() && !payload.starts_with(char::is_whitespace) {
                    continue;
                }
                let rules = parse_rule_list(payload.trim());
                match mode {
                    DirectiveMode::File => directives.file.register(rules),
                    DirectiveMode::Line => directives.register_line(comment.end_line, rules),
                    DirectiveMode::NextLine => {
                        directives.register_line(comment.end_line + 1, rules)
                    }
                }
                break;
            }
        }

        directives
    }

    fn register_line(&mut self, line: usize, rules: Option<HashSet<String>>) {
        if line == 0 {
            return;
        }
        self.by_line.entry(line).or_default().register(rules);
    }

    pub fn should_ignore(&self, line: usize, rule_id: Option<&str>) -> bool {
        if self.file.matches(rule_id) {
            return true;
        }
        self.by_line
            .get(&line)
            .is_some_and(|entry| entry.matches(rule_id))
    }

    pub fn is_empty(&self) -> bool {
        !self.file.all && self.file.rules.is_empty() && self.by_line.is_empty()
    }
}

fn rule_list_splitter() -> &'static Regex {
    static SPLITTER: OnceLock<Regex> = OnceLock::new();
    SPLITTER.get_or_init(|| Regex::new(r"[,\s]+").expect("valid rule list pattern"))
}

fn parse_rule_list(payload: &str) -> Option<HashSet<String>> {
    if payload.is_empty() {
        return None;
    }

    let rules: HashSet<String> = rule_list_splitter()
        .split(payload)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    if rules.is_empty() { None } else { Some(rules) }
}

const DIRECTIVE_COMMENT_MAX: usize = 16_384;

/// Global names declared by leading `/* globals a, b */` (or `global`)
/// comments. Scanning stops at the first non-comment token, so directives
/// buried in the file body are ignored.
pub fn leading_global_directives(source: &str) -> HashSet<String> {
    let mut globals = HashSet::new();
    let limit = source.len().min(DIRECTIVE_COMMENT_MAX);
    let mut index = 0;

    while index < limit {
        let rest = &source[index..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch.is_whitespace() {
            index += ch.len_utf8();
            continue;
        }

        if let Some(after) = rest.strip_prefix("/*") {
            let Some(end) = after.find("*/") else {
                break;
            };
            collect_globals_payload(after[..end].trim(), &mut globals);
            index += 2 + end + 2;
            continue;
        }

        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find('\n').unwrap_or(after.len());
            collect_globals_payload(after[..end].trim(), &mut globals);
            index += 2 + end;
            continue;
        }

        break;
    }

    globals
}

fn collect_globals_payload(content: &str, globals: &mut HashSet<String>) {
    for keyword in ["globals", "global"] {
        let Some(payload) = content.strip_prefix(keyword) else {
            continue;
        };
        if !payload.is_empty() && !payload.starts_with(char::is_whitespace) {
            continue;
        }
        for segment in payload.split(',') {
            let entry = segment.trim();
            if entry.is_empty() {
                continue;
            }
            // `name: writable` annotations keep only the name.
            let name = entry.split(':').next().unwrap_or(entry).trim();
            if !name.is_empty() {
                globals.insert(name.to_string());
            }
        }
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(text: &str, line: usize) -> SourceComment {
        SourceComment {
            text: text.to_string(),
            start_line: line,
            end_line: line,
        }
    }

    #[test]
    fn disable_next_line_with_specific_rule() {
        let directives =
            InlineDirectives::from_comments(&[comment(" serval-disable-next-line eqeqeq", 2)]);

        assert!(directives.should_ignore(3, Some("eqeqeq")));
        assert!(!directives.should_ignore(3, Some("no-var")));
        assert!(!directives.should_ignore(2, Some("eqeqeq")));
    }

    #[test]
    fn disable_line_with_specific_rule() {
        let directives =
            InlineDirectives::from_comments(&[comment(" serval-disable-line eqeqeq", 2)]);

        assert!(directives.should_ignore(2, Some("eqeqeq")));
        assert!(!directives.should_ignore(2, Some("no-var")));
    }

    #[test]
    fn disable_next_line_all_rules() {
        let directives =
            InlineDirectives::from_comments(&[comment(" serval-disable-next-line", 2)]);

        assert!(directives.should_ignore(3, Some("eqeqeq")));
        assert!(directives.should_ignore(3, Some("any-rule")));
        assert!(directives.should_ignore(3, None));
    }

    #[test]
    fn disable_multiple_rules() {
        let directives = InlineDirectives::from_comments(&[comment(
            " serval-disable-next-line eqeqeq, no-var",
            1,
        )]);

        assert!(directives.should_ignore(2, Some("eqeqeq")));
        assert!(directives.should_ignore(2, Some("no-var")));
        assert!(!directives.should_ignore(2, Some("no-empty")));
    }

    #[test]
    fn unscoped_wins_over_later_scoped_on_same_line() {
        let directives = InlineDirectives::from_comments(&[
            comment(" serval-disable-line", 4),
            comment(" serval-disable-line eqeqeq", 4),
        ]);

        assert!(directives.should_ignore(4, Some("eqeqeq")));
        assert!(directives.should_ignore(4, Some("no-var")));
    }

    #[test]
    fn file_wide_disable_suppresses_every_line() {
        let directives = InlineDirectives::from_comments(&[comment(" serval-disable", 1)]);

        assert!(directives.should_ignore(1, Some("eqeqeq")));
        assert!(directives.should_ignore(99, Some("no-var")));
        assert!(directives.should_ignore(99, None));
    }

    #[test]
    fn file_wide_disable_scoped_to_rule() {
        let directives = InlineDirectives::from_comments(&[comment(" serval-disable eqeqeq", 1)]);

        assert!(directives.should_ignore(42, Some("eqeqeq")));
        assert!(!directives.should_ignore(42, Some("no-var")));
        assert!(!directives.should_ignore(42, None));
    }

    #[test]
    fn eslint_aliases_are_honored() {
        let directives =
            InlineDirectives::from_comments(&[comment(" eslint-disable-next-line no-var", 1)]);

        assert!(directives.should_ignore(2, Some("no-var")));
    }

    #[test]
    fn similar_but_not_directive() {
        let directives = InlineDirectives::from_comments(&[
            comment(" serval-disable-block eqeqeq", 1),
            comment(" some serval-disable-next-line comment", 2),
        ]);

        assert!(directives.is_empty());
    }

    #[test]
    fn whitespace_and_comma_separated_rules() {
        let directives = InlineDirectives::from_comments(&[comment(
            " serval-disable-next-line   eqeqeq  ,  no-var",
            1,
        )]);

        assert!(directives.should_ignore(2, Some("eqeqeq")));
        assert!(directives.should_ignore(2, Some("no-var")));
    }

    #[test]
    fn multiline_comment_targets_line_after_its_end() {
        let directives = InlineDirectives::from_comments(&[SourceComment {
            text: " serval-disable-next-line eqeqeq ".to_string(),
            start_line: 1,
            end_line: 2,
        }]);

        assert!(directives.should_ignore(3, Some("eqeqeq")));
        assert!(!directives.should_ignore(2, Some("eqeqeq")));
    }

    #[test]
    fn leading_globals_block_comment() {
        let globals = leading_global_directives("/* globals foo, bar */\nfoo();\n");

        assert!(globals.contains("foo"));
        assert!(globals.contains("bar"));
        assert_eq!(globals.len(), 2);
    }

    #[test]
    fn leading_globals_with_writable_annotations() {
        let globals = leading_global_directives("/* global foo: writable, bar: readonly */\n");

        assert!(globals.contains("foo"));
        assert!(globals.contains("bar"));
    }

    #[test]
    fn globals_after_code_are_ignored() {
        let globals = leading_global_directives("const x = 1;\n/* globals late */\n");

        assert!(globals.is_empty());
    }

    #[test]
    fn line_comment_globals() {
        let globals = leading_global_directives("// globals alpha\nalpha();\n");

        assert!(globals.contains("alpha"));
    }

    #[test]
    fn no_directives_is_empty() {
        let directives = InlineDirectives::from_comments(&[comment(" ordinary comment", 1)]);

        assert!(directives.is_empty());
        assert!(!directives.should_ignore(1, Some("eqeqeq")));
    }
}
