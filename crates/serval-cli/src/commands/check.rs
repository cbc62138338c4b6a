//! Check command - analyzes JavaScript/TypeScript files for issues

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rayon::prelude::*;
use serval_core::analysis::AnalysisEngine;
use serval_core::config::load_config_or_default_with_warnings;
use serval_core::diagnostic::Diagnostic;
use serval_core::parser::ParsedFile;
use tracing::debug;
use walkdir::WalkDir;

const SUPPORTED_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to a file or directory to analyze
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Apply rule-suggested fixes and rewrite the files in place
    #[arg(long)]
    pub fix: bool,

    /// Output format for diagnostics (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();

        let config_result = load_config_or_default_with_warnings(&self.path);
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }

        let files = discover_files(&self.path)?;
        if files.is_empty() {
            println!("No JavaScript/TypeScript files found.");
            return Ok(());
        }

        // Configured once here; read-only for the parallel analysis below.
        let engine = AnalysisEngine::with_config(&config_result.config);

        let all_diagnostics: Vec<Diagnostic> = files
            .par_iter()
            .flat_map(|file| self.check_file(&engine, file))
            .collect();

        match self.format.as_str() {
            "json" => crate::output::json::print(&all_diagnostics, files.len()),
            _ => crate::output::text::print(&all_diagnostics),
        }

        let error_count = all_diagnostics.iter().filter(|d| d.is_error()).count();
        if error_count > 0 {
            process::exit(1);
        }

        Ok(())
    }

    fn check_file(&self, engine: &AnalysisEngine, path: &Path) -> Vec<Diagnostic> {
        let display_path = path.to_string_lossy();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => {
                let message = if error.kind() == std::io::ErrorKind::NotFound {
                    "File not found".to_string()
                } else {
                    error.to_string()
                };
                return vec![Diagnostic::structural(message, display_path, None, None)];
            }
        };

        let parsed = ParsedFile::from_source(&display_path, &content);

        if self.fix {
            let (diagnostics, outcome) = engine.analyze_and_fix(&parsed);
            if !outcome.changed() {
                return diagnostics;
            }
            debug!(file = %display_path, edits = outcome.applied_edits, "applying fixes");
            if let Err(error) = fs::write(path, &outcome.output) {
                return vec![Diagnostic::structural(
                    format!("Failed to write fixed file: {error}"),
                    display_path,
                    None,
                    None,
                )];
            }
            // Diagnostics whose edits were skipped (or that fixes did not
            // address) come back on the next pass over the fixed text.
            let fixed = ParsedFile::from_source(&display_path, &outcome.output);
            return engine.analyze(&fixed);
        }

        engine.analyze(&parsed)
    }

    fn configure_colors(&self) {
        let no_color_env = std::env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }
}

fn discover_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "node_modules" || (name.starts_with('.') && name != ".")
}
