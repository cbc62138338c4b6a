//! JSON reporter

use serde_json::json;
use serval_core::diagnostic::Diagnostic;

pub fn print(diagnostics: &[Diagnostic], total_files: usize) {
    println!("{}", render(diagnostics, total_files));
}

fn render(diagnostics: &[Diagnostic], total_files: usize) -> String {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;

    let payload = json!({
        "summary": {
            "files": total_files,
            "diagnostics": diagnostics.len(),
            "errors": errors,
            "warnings": warnings,
        },
        "diagnostics": diagnostics,
    });

    serde_json::to_string_pretty(&payload).expect("diagnostics serialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serval_core::diagnostic::Severity;

    #[test]
    fn render_includes_summary_and_diagnostics() {
        let diagnostics = vec![
            Diagnostic::new("no-var", Severity::Error, "msg", "a.js", 1, 1),
            Diagnostic::new("eqeqeq", Severity::Warning, "msg", "a.js", 2, 5),
        ];

        let output = render(&diagnostics, 3);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["summary"]["files"], 3);
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["summary"]["warnings"], 1);
        assert_eq!(value["diagnostics"][0]["ruleId"], "no-var");
    }

    #[test]
    fn structural_diagnostics_omit_rule_id() {
        let diagnostics = vec![Diagnostic::structural("broken", "a.js", Some(1), None)];

        let value: serde_json::Value =
            serde_json::from_str(&render(&diagnostics, 1)).unwrap();

        assert!(value["diagnostics"][0].get("ruleId").is_none());
        assert_eq!(value["diagnostics"][0]["severity"], "error");
    }
}
