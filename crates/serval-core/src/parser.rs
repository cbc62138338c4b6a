//! Parser module for JavaScript/TypeScript source code
//!
//! Integrates with SWC for parsing source files. The SWC AST is lowered into
//! the serval [`SyntaxTree`](crate::syntax::SyntaxTree) immediately after
//! parsing; nothing downstream of this module sees SWC types.

use std::collections::HashSet;

use swc_common::comments::SingleThreadedComments;
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap, Spanned};
use swc_ecma_parser::{EsSyntax, Syntax, TsSyntax, parse_file_as_module};

use crate::directives::{InlineDirectives, leading_global_directives};
use crate::syntax::SyntaxTree;
use crate::syntax::lower::lower_module;

pub use swc_ecma_ast::EsVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
}

pub fn detect_language(filename: &str) -> Language {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "ts" | "mts" | "cts" => Language::TypeScript,
        "tsx" => Language::Tsx,
        "jsx" => Language::Jsx,
        _ => Language::JavaScript,
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    /// 1-based line.
    pub line: usize,
    /// 0-based byte column.
    pub column: usize,
    /// 0-based byte offset of the failure.
    pub offset: usize,
    pub message: String,
}

/// A source comment, rebased to file lines. Comments feed the inline
/// suppression directives and are available to rules through
/// [`ParsedFile::comments`].
#[derive(Debug, Clone)]
pub struct SourceComment {
    /// Comment text without the `//` or `/* */` markers.
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Byte-offset to line/column mapping for one source file.
/// Lines are 1-based, columns 0-based.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (line_idx + 1, offset - self.line_starts[line_idx])
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.line_col(offset).0
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub filename: String,
    pub language: Language,
    pub line_count: usize,
    pub has_errors: bool,
}

pub struct ParseOutcome {
    pub tree: Option<SyntaxTree>,
    pub errors: Vec<ParseError>,
    pub comments: Vec<SourceComment>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.tree.is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A parsed source file: text, lowered tree, parse errors, comments, line
/// index, and the suppression directives extracted from its comments.
///
/// Each `ParsedFile` is self-contained; analyzing many files concurrently is
/// safe because nothing here is shared between files.
pub struct ParsedFile {
    source: String,
    metadata: FileMetadata,
    tree: Option<SyntaxTree>,
    errors: Vec<ParseError>,
    comments: Vec<SourceComment>,
    lines: LineIndex,
    directives: InlineDirectives,
    file_globals: HashSet<String>,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("metadata", &self.metadata)
            .field("has_tree", &self.tree.is_some())
            .field("error_count", &self.errors.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn from_source(filename: &str, source: &str) -> Self {
        let language = detect_language(filename);
        let parser = Parser::for_file(filename);
        let outcome = parser.parse_module_recovering(source);
        let lines = LineIndex::new(source);
        let directives = InlineDirectives::from_comments(&outcome.comments);
        let file_globals = leading_global_directives(source);

        let line_count = if source.is_empty() {
            0
        } else {
            source.lines().count()
        };

        let metadata = FileMetadata {
            filename: filename.to_string(),
            language,
            line_count,
            has_errors: outcome.has_errors(),
        };

        Self {
            source: source.to_string(),
            metadata,
            tree: outcome.tree,
            errors: outcome.errors,
            comments: outcome.comments,
            lines,
            directives,
            file_globals,
        }
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn tree(&self) -> Option<&SyntaxTree> {
        self.tree.as_ref()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn comments(&self) -> &[SourceComment] {
        &self.comments
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn directives(&self) -> &InlineDirectives {
        &self.directives
    }

    /// Global names declared by leading `/* globals ... */` comments.
    pub fn file_globals(&self) -> &HashSet<String> {
        &self.file_globals
    }

    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 || line_number > self.lines.line_count() {
            return None;
        }
        self.source.lines().nth(line_number - 1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParserBuilder {
    jsx: bool,
    typescript: bool,
    decorators: bool,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jsx(mut self, enabled: bool) -> Self {
        self.jsx = enabled;
        self
    }

    pub fn typescript(mut self, enabled: bool) -> Self {
        self.typescript = enabled;
        self
    }

    pub fn decorators(mut self, enabled: bool) -> Self {
        self.decorators = enabled;
        self
    }

    pub fn build(self) -> Parser {
        let syntax = if self.typescript {
            Syntax::Typescript(TsSyntax {
                tsx: self.jsx,
                decorators: self.decorators,
                ..Default::default()
            })
        } else {
            Syntax::Es(EsSyntax {
                jsx: self.jsx,
                decorators: self.decorators,
                ..Default::default()
            })
        };

        Parser { syntax }
    }
}

#[derive(Debug, Clone)]
pub struct Parser {
    syntax: Syntax,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            syntax: Syntax::Es(Default::default()),
        }
    }

    pub fn for_file(filename: &str) -> Self {
        match detect_language(filename) {
            Language::JavaScript => Self::new(),
            Language::TypeScript => Self::builder().typescript(true).build(),
            Language::Jsx => Self::builder().jsx(true).build(),
            Language::Tsx => Self::builder().typescript(true).jsx(true).build(),
        }
    }

    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    /// Parse a module, keeping the tree when SWC can recover. Recoverable
    /// syntax errors are returned alongside the tree; a fatal error yields
    /// no tree at all.
    pub fn parse_module_recovering(&self, code: &str) -> ParseOutcome {
        let source_map: Lrc<SourceMap> = Default::default();
        let fm = source_map
            .new_source_file(FileName::Custom("input.js".into()).into(), code.to_string());
        let base = fm.start_pos;
        let lines = LineIndex::new(code);

        let comments = SingleThreadedComments::default();
        let mut recovered_errors = Vec::new();

        let result = parse_file_as_module(
            &fm,
            self.syntax,
            EsVersion::latest(),
            Some(&comments),
            &mut recovered_errors,
        );

        let to_parse_error = |e: &swc_ecma_parser::error::Error| {
            let offset = e.span().lo.0.saturating_sub(base.0) as usize;
            let (line, column) = lines.line_col(offset.min(code.len()));
            ParseError {
                line,
                column,
                offset,
                message: e.kind().msg().to_string(),
            }
        };

        let mut errors: Vec<ParseError> = recovered_errors.iter().map(to_parse_error).collect();

        let source_comments = collect_comments(&comments, base, &lines, code);

        match result {
            Ok(module) => ParseOutcome {
                tree: Some(lower_module(&module, base)),
                errors,
                comments: source_comments,
            },
            Err(e) => {
                errors.push(to_parse_error(&e));
                ParseOutcome {
                    tree: None,
                    errors,
                    comments: source_comments,
                }
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_comments(
    comments: &SingleThreadedComments,
    base: swc_common::BytePos,
    lines: &LineIndex,
    code: &str,
) -> Vec<SourceComment> {
    let (leading, trailing) = comments.borrow_all();
    let mut all: Vec<swc_common::comments::Comment> = Vec::new();
    for list in leading.values() {
        all.extend(list.iter().cloned());
    }
    for list in trailing.values() {
        all.extend(list.iter().cloned());
    }
    drop(leading);
    drop(trailing);

    all.sort_by_key(|c| c.span.lo);
    all.dedup_by_key(|c| c.span.lo);

    all.into_iter()
        .map(|c| {
            let start = c.span.lo.0.saturating_sub(base.0) as usize;
            let end = c.span.hi.0.saturating_sub(base.0) as usize;
            SourceComment {
                text: c.text.to_string(),
                start_line: lines.line_of(start.min(code.len())),
                end_line: lines.line_of(end.min(code.len())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::NodeKind;

    #[test]
    fn parse_simple_variable_declaration() {
        let file = ParsedFile::from_source("test.js", "const x = 1;");

        assert!(file.tree().is_some());
        assert!(file.errors().is_empty());

        let tree = file.tree().unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.kind(root), NodeKind::Program);
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn tree_offsets_are_file_relative() {
        let code = "const x = 1;\nconst y = 2;";
        let file = ParsedFile::from_source("test.js", code);
        let tree = file.tree().unwrap();
        let root = tree.root().unwrap();

        let decls = tree.children(root);
        assert_eq!(decls.len(), 2);
        let first = tree.get(decls[0]);
        let second = tree.get(decls[1]);

        assert_eq!(&code[first.start..first.end], "const x = 1;");
        assert_eq!(&code[second.start..second.end], "const y = 2;");
    }

    #[test]
    fn invalid_syntax_produces_errors() {
        let file = ParsedFile::from_source("test.js", "const = ;");

        assert!(file.metadata().has_errors);
        assert!(!file.errors().is_empty());
        let error = &file.errors()[0];
        assert_eq!(error.line, 1);
        assert!(!error.message.is_empty());
    }

    #[test]
    fn parse_module_with_imports() {
        let file = ParsedFile::from_source("test.js", "import x from 'y';\nconsole.log(x);\n");

        assert!(file.tree().is_some());
        assert!(file.errors().is_empty());
    }

    #[test]
    fn typescript_type_annotations_parse() {
        let file = ParsedFile::from_source("example.ts", "const x: number = 1;");

        assert!(file.tree().is_some());
        assert!(file.errors().is_empty());
    }

    #[test]
    fn tsx_component_parses() {
        let file = ParsedFile::from_source("component.tsx", "const App = () => <div />;");

        assert!(file.tree().is_some());
    }

    #[test]
    fn comments_are_collected_with_lines() {
        let code = "// first\nconst x = 1; /* second */\n";
        let file = ParsedFile::from_source("test.js", code);

        let texts: Vec<&str> = file.comments().iter().map(|c| c.text.trim()).collect();
        assert!(texts.contains(&"first"));
        assert!(texts.contains(&"second"));

        let first = file
            .comments()
            .iter()
            .find(|c| c.text.trim() == "first")
            .unwrap();
        assert_eq!(first.start_line, 1);

        let second = file
            .comments()
            .iter()
            .find(|c| c.text.trim() == "second")
            .unwrap();
        assert_eq!(second.start_line, 2);
    }

    #[test]
    fn detect_language_from_extension() {
        assert_eq!(detect_language("file.js"), Language::JavaScript);
        assert_eq!(detect_language("file.mjs"), Language::JavaScript);
        assert_eq!(detect_language("file.cjs"), Language::JavaScript);
        assert_eq!(detect_language("file.jsx"), Language::Jsx);
        assert_eq!(detect_language("file.ts"), Language::TypeScript);
        assert_eq!(detect_language("file.mts"), Language::TypeScript);
        assert_eq!(detect_language("file.tsx"), Language::Tsx);
        assert_eq!(detect_language("unknown"), Language::JavaScript);
    }

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("ab\ncd\n\nef");

        assert_eq!(index.line_col(0), (1, 0));
        assert_eq!(index.line_col(1), (1, 1));
        assert_eq!(index.line_col(3), (2, 0));
        assert_eq!(index.line_col(6), (3, 0));
        assert_eq!(index.line_col(7), (4, 0));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn get_line_returns_line_text() {
        let file = ParsedFile::from_source("test.js", "const x = 1;\nconst y = 2;");

        assert_eq!(file.get_line(1), Some("const x = 1;"));
        assert_eq!(file.get_line(2), Some("const y = 2;"));
        assert_eq!(file.get_line(3), None);
        assert_eq!(file.get_line(0), None);
    }
}
