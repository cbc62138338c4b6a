//! serval CLI - command-line interface for the serval lint engine

mod commands;
mod output;

use clap::Parser;
use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "serval",
    author,
    version,
    about = "Fast JavaScript/TypeScript lint engine",
    long_about = "Serval analyzes JavaScript and TypeScript sources with a\n\
                  scope-aware rule engine and can apply rule-suggested fixes\n\
                  in place."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Explain(args) => args.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_check_command() {
        let cli = Cli::try_parse_from(["serval", "check", "./src"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.path.to_str().unwrap(), "./src");
                assert!(!args.fix);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn cli_parses_check_with_fix_and_format() {
        let cli = Cli::try_parse_from(["serval", "check", ".", "--fix", "--format", "json"])
            .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert!(args.fix);
                assert_eq!(args.format, "json");
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn cli_check_path_defaults_to_cwd() {
        let cli = Cli::try_parse_from(["serval", "check"]).unwrap();
        match cli.command {
            Commands::Check(args) => assert_eq!(args.path.to_str().unwrap(), "."),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn cli_parses_explain_command() {
        let cli = Cli::try_parse_from(["serval", "explain", "no-unused-vars"]).unwrap();
        match cli.command {
            Commands::Explain(args) => assert_eq!(args.rule, "no-unused-vars"),
            _ => panic!("Expected Explain command"),
        }
    }

    #[test]
    fn cli_version_is_set() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some("0.1.0"));
    }
}
