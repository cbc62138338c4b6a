//! Plain text reporter with colored severity labels

use colored::Colorize;
use serval_core::diagnostic::{Diagnostic, Severity};

pub fn print(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("{}", "✓ No issues found".green());
        return;
    }

    for diagnostic in diagnostics {
        println!("{}", format_line(diagnostic));
    }
    println!("{}", summary(diagnostics));
}

fn format_line(diagnostic: &Diagnostic) -> String {
    let location = match (diagnostic.line, diagnostic.column) {
        (Some(line), Some(column)) => format!("{line}:{column}"),
        (Some(line), None) => format!("{line}:1"),
        _ => "?:?".to_string(),
    };
    let label = match diagnostic.severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warning => "WARNING".yellow().bold(),
    };
    let rule_suffix = diagnostic
        .rule_id
        .as_deref()
        .map(|rule| format!(" ({rule})"))
        .unwrap_or_default();

    format!(
        "{}:{}  {}{}  {}",
        diagnostic.file_path, location, label, rule_suffix, diagnostic.message
    )
}

fn summary(diagnostics: &[Diagnostic]) -> String {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;

    let mut parts = Vec::new();
    if errors > 0 {
        parts.push(format!("{errors} error{}", plural(errors)));
    }
    if warnings > 0 {
        parts.push(format!("{warnings} warning{}", plural(warnings)));
    }
    parts.join(", ")
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_line_includes_location_rule_and_message() {
        colored::control::set_override(false);
        let diagnostic = Diagnostic::new(
            "no-var",
            Severity::Error,
            "Unexpected var, use 'let' or 'const' instead.",
            "src/app.js",
            4,
            1,
        );

        let line = format_line(&diagnostic);

        assert!(line.starts_with("src/app.js:4:1"));
        assert!(line.contains("ERROR"));
        assert!(line.contains("(no-var)"));
        assert!(line.contains("Unexpected var"));
    }

    #[test]
    fn structural_diagnostic_has_no_rule_suffix() {
        colored::control::set_override(false);
        let diagnostic = Diagnostic::structural("Unexpected token", "broken.js", Some(1), None);

        let line = format_line(&diagnostic);

        assert!(!line.contains('('));
        assert!(line.contains("Unexpected token"));
    }

    #[test]
    fn summary_counts_errors_and_warnings() {
        let diagnostics = vec![
            Diagnostic::new("a", Severity::Error, "m", "f.js", 1, 1),
            Diagnostic::new("b", Severity::Warning, "m", "f.js", 2, 1),
            Diagnostic::new("c", Severity::Warning, "m", "f.js", 3, 1),
        ];

        assert_eq!(summary(&diagnostics), "1 error, 2 warnings");
    }
}
