//! Explain command - prints a rule's metadata

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serval_core::analysis::AnalysisEngine;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Rule name, e.g. no-unused-vars
    #[arg(value_name = "RULE")]
    pub rule: String,
}

impl ExplainArgs {
    pub fn run(&self) -> Result<()> {
        let engine = AnalysisEngine::new();
        let Some(rule) = engine.registry().get(&self.rule) else {
            anyhow::bail!("Unknown rule '{}'", self.rule);
        };

        let meta = rule.meta();
        println!("{}", meta.name.bold());
        println!("  {}", meta.description);
        println!("  default severity: {}", meta.default_severity.as_str());
        if meta.recommended {
            println!("  recommended: yes");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_rule_explains() {
        let args = ExplainArgs {
            rule: "no-unused-vars".to_string(),
        };

        assert!(args.run().is_ok());
    }

    #[test]
    fn unknown_rule_errors() {
        let args = ExplainArgs {
            rule: "no-such-rule".to_string(),
        };

        let error = args.run().unwrap_err();
        assert!(error.to_string().contains("no-such-rule"));
    }
}
