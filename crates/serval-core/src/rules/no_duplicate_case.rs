//! no-duplicate-case: disallow duplicate case labels in switch statements.
//!
//! Case tests are compared by static evaluation over literals, no-expression
//! templates, simple unary expressions, and the `undefined` identifier; a
//! test that cannot be evaluated never participates in duplicate detection.

use std::collections::HashSet;

use crate::context::{Report, RuleContext};
use crate::declare_rule;
use crate::rules::{Rule, RuleListeners, RuleMeta};
use crate::syntax::{LiteralValue, Node, NodeData, NodeId, NodeKind, SyntaxTree};

declare_rule!(
    NoDuplicateCase,
    name = "no-duplicate-case",
    description = "Disallow duplicate case labels in switch statements.",
    recommended = true,
    default_severity = Error
);

impl Rule for NoDuplicateCase {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn create(&self) -> Box<dyn RuleListeners> {
        Box::new(Listeners)
    }
}

struct Listeners;

impl RuleListeners for Listeners {
    fn enter_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::SwitchStatement]
    }

    fn on_enter(&mut self, node: &Node, ctx: &mut RuleContext<'_>) {
        let NodeData::SwitchStatement { cases, .. } = &node.data else {
            return;
        };

        let tree = ctx.tree();
        let mut seen = HashSet::new();
        let mut has_default = false;

        for case in cases {
            let NodeData::SwitchCase { test, .. } = &tree.get(*case).data else {
                continue;
            };

            let Some(test) = test else {
                if has_default {
                    ctx.report(Report::new("Duplicate default clause.").on(*case));
                }
                has_default = true;
                continue;
            };

            let Some(key) = case_key(tree, *test) else {
                continue;
            };
            if !seen.insert(key) {
                ctx.report(Report::new("Duplicate case label.").on(*test));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum StaticValue {
    Number(f64),
    BigInt(String),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Regex(String),
}

fn case_key(tree: &SyntaxTree, test: NodeId) -> Option<String> {
    let value = evaluate_static(tree, test)?;
    Some(match value {
        StaticValue::Number(n) if n.is_nan() => "number:NaN".to_string(),
        StaticValue::Number(n) => format!("number:{n}"),
        StaticValue::BigInt(v) => format!("bigint:{v}"),
        StaticValue::Str(s) => format!("string:{s}"),
        StaticValue::Bool(b) => format!("boolean:{b}"),
        StaticValue::Null => "null".to_string(),
        StaticValue::Undefined => "undefined".to_string(),
        StaticValue::Regex(r) => format!("regex:{r}"),
    })
}

fn evaluate_static(tree: &SyntaxTree, node: NodeId) -> Option<StaticValue> {
    match &tree.get(node).data {
        NodeData::Literal { value } => Some(match value {
            LiteralValue::String(s) => StaticValue::Str(s.clone()),
            LiteralValue::Number(n) => StaticValue::Number(*n),
            LiteralValue::Boolean(b) => StaticValue::Bool(*b),
            LiteralValue::Null => StaticValue::Null,
            LiteralValue::BigInt(v) => StaticValue::BigInt(v.clone()),
            LiteralValue::Regex { pattern, flags } => {
                StaticValue::Regex(format!("{pattern}/{flags}"))
            }
        }),
        NodeData::TemplateLiteral {
            quasis,
            expressions,
        } => {
            if expressions.is_empty() && quasis.len() == 1 {
                Some(StaticValue::Str(quasis[0].clone()))
            } else {
                None
            }
        }
        NodeData::UnaryExpression { operator, argument } => {
            let value = evaluate_static(tree, *argument)?;
            match operator.as_str() {
                "+" => match value {
                    StaticValue::Number(n) => Some(StaticValue::Number(n)),
                    _ => None,
                },
                "-" => match value {
                    StaticValue::Number(n) => Some(StaticValue::Number(-n)),
                    StaticValue::BigInt(v) => Some(StaticValue::BigInt(format!("-{v}"))),
                    _ => None,
                },
                "~" => match value {
                    StaticValue::Number(n) => Some(StaticValue::Number(!to_int32(n) as f64)),
                    _ => None,
                },
                "!" => Some(StaticValue::Bool(!is_truthy(&value))),
                "void" => Some(StaticValue::Undefined),
                _ => None,
            }
        }
        NodeData::Identifier { name } if name == "undefined" => Some(StaticValue::Undefined),
        _ => None,
    }
}

fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value as i64 as i32
}

fn is_truthy(value: &StaticValue) -> bool {
    match value {
        StaticValue::Number(n) => *n != 0.0 && !n.is_nan(),
        StaticValue::BigInt(v) => v.trim_start_matches('-') != "0",
        StaticValue::Str(s) => !s.is_empty(),
        StaticValue::Bool(b) => *b,
        StaticValue::Null | StaticValue::Undefined => false,
        StaticValue::Regex(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn check(code: &str) -> Vec<String> {
        run_rule(&NoDuplicateCase::new(), "test.js", code)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn duplicate_number_label_is_reported() {
        let messages = check("switch (x) { case 1: break; case 2: break; case 1: break; }\nvar x;\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "Duplicate case label.");
    }

    #[test]
    fn duplicate_string_label_is_reported() {
        assert_eq!(
            check("switch (x) { case 'a': break; case 'a': break; }\nvar x;\n").len(),
            1
        );
    }

    #[test]
    fn distinct_labels_are_fine() {
        assert!(check("switch (x) { case 1: break; case '1': break; case true: break; }\nvar x;\n").is_empty());
    }

    #[test]
    fn template_literal_matches_string() {
        assert_eq!(
            check("switch (x) { case 'a': break; case `a`: break; }\nvar x;\n").len(),
            1
        );
    }

    #[test]
    fn negative_numbers_compare_by_value() {
        assert_eq!(
            check("switch (x) { case -1: break; case -1: break; }\nvar x;\n").len(),
            1
        );
    }

    #[test]
    fn single_default_is_fine() {
        assert!(check("switch (x) { default: break; case 1: break; }\nvar x;\n").is_empty());
    }

    #[test]
    fn dynamic_labels_are_not_compared() {
        assert!(check("switch (x) { case a: break; case a: break; }\nvar x, a;\n").is_empty());
    }

    #[test]
    fn undefined_identifier_is_static() {
        assert_eq!(
            check("switch (x) { case undefined: break; case void 0: break; }\nvar x;\n").len(),
            1
        );
    }
}
