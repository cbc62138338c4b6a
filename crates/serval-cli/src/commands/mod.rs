mod check;
mod explain;

pub use check::CheckArgs;
pub use explain::ExplainArgs;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze JavaScript/TypeScript files for issues
    Check(CheckArgs),
    /// Show what a rule checks and its default severity
    Explain(ExplainArgs),
}
