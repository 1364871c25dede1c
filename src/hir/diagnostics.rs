//! Diagnostics: advisory checks over a parsed document.
//!
//! Two checks live here: duplicate declarations (a warning, governed by
//! [`DuplicateCheck`]) and bracket balance (an error). Nothing else about
//! program correctness is validated.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::symbols::{Parse, Symbol, SymbolKind};
use crate::base::text::CodeChars;
use crate::base::{FileId, LineIndex, TextSize};
use crate::config::DuplicateCheck;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Unbalanced brackets.
    Error,
    /// Duplicate declarations.
    Warning,
}

/// A diagnostic message with location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub file: FileId,
    /// Start line (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed).
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub severity: Severity,
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug)]
pub struct RelatedInfo {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
    pub message: Arc<str>,
}

impl Diagnostic {
    fn new(file: FileId, line: u32, col: u32, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn error(file: FileId, line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, line, col, Severity::Error, message)
    }

    pub fn warning(file: FileId, line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, line, col, Severity::Warning, message)
    }

    pub fn with_span(mut self, end_line: u32, end_col: u32) -> Self {
        self.end_line = end_line;
        self.end_col = end_col;
        self
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

/// Diagnostic codes.
pub mod codes {
    /// A closing bracket with no matching opener.
    pub const UNEXPECTED_CLOSER: &str = "E0001";
    /// An opening bracket that is never closed.
    pub const UNCLOSED_BRACKET: &str = "E0002";
    /// Same name, owner and version declared twice.
    pub const DUPLICATE_DECLARATION: &str = "W0001";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a duplicate-declaration warning pointing back at the first one.
    pub fn duplicate_declaration(&mut self, symbol: &Symbol, existing: &Symbol) {
        let what = match symbol.version() {
            Some(v) => format!("'{}' (version \"{}\")", symbol.name, v),
            None => format!("'{}'", symbol.name),
        };
        self.add(
            Diagnostic::warning(
                symbol.file,
                symbol.start_line,
                symbol.start_col,
                format!("duplicate {}: {} is already declared", symbol.kind().display(), what),
            )
            .with_span(symbol.start_line, symbol.start_col + symbol.name.len() as u32)
            .with_code(codes::DUPLICATE_DECLARATION)
            .with_related(RelatedInfo {
                file: existing.file,
                line: existing.start_line,
                col: existing.start_col,
                message: Arc::from(format!("first declaration of '{}'", existing.name)),
            }),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// Groups that share a namespace for duplicate detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum KindFamily {
    Callable,
    Type,
    Value,
}

impl From<SymbolKind> for KindFamily {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Function | SymbolKind::Pipeline | SymbolKind::Method => KindFamily::Callable,
            SymbolKind::Class | SymbolKind::TypeAlias => KindFamily::Type,
            SymbolKind::Macro | SymbolKind::Constant => KindFamily::Value,
        }
    }
}

/// Report declarations that repeat an earlier (family, name, owner,
/// version) key.
pub fn check_duplicates(parse: &Parse, policy: DuplicateCheck, collector: &mut DiagnosticCollector) {
    if policy == DuplicateCheck::Off {
        return;
    }

    let mut seen: FxHashMap<(KindFamily, &str, Option<&str>, Option<&str>), &Symbol> =
        FxHashMap::default();
    for symbol in parse.all_symbols() {
        if symbol.version().is_none() && policy == DuplicateCheck::VersionedOnly {
            continue;
        }
        let key = (
            KindFamily::from(symbol.kind()),
            symbol.name.as_str(),
            symbol.owner(),
            symbol.version(),
        );
        match seen.get(&key) {
            Some(existing) => collector.duplicate_declaration(symbol, existing),
            None => {
                seen.insert(key, symbol);
            }
        }
    }
}

/// Report unbalanced `{}`, `()` and `[]` outside strings and `//` comments.
pub fn check_brackets(file: FileId, text: &str, collector: &mut DiagnosticCollector) {
    let lines = LineIndex::new(text);
    let at = |offset: usize| lines.line_col(TextSize::from(offset as u32));

    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = CodeChars::new(text).peekable();
    let mut in_comment = false;

    while let Some((i, c)) = chars.next() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        match c {
            '/' if matches!(chars.peek(), Some((_, '/'))) => in_comment = true,
            '{' | '(' | '[' => stack.push((c, i)),
            '}' | ')' | ']' => {
                let opener = match c {
                    '}' => '{',
                    ')' => '(',
                    _ => '[',
                };
                if stack.last().is_some_and(|&(open, _)| open == opener) {
                    stack.pop();
                } else {
                    let pos = at(i);
                    collector.add(
                        Diagnostic::error(file, pos.line, pos.col, format!("unexpected closing '{c}'"))
                            .with_span(pos.line, pos.col + 1)
                            .with_code(codes::UNEXPECTED_CLOSER),
                    );
                }
            }
            _ => {}
        }
    }

    for (open, i) in stack {
        let pos = at(i);
        collector.add(
            Diagnostic::error(file, pos.line, pos.col, format!("unclosed '{open}'"))
                .with_span(pos.line, pos.col + 1)
                .with_code(codes::UNCLOSED_BRACKET),
        );
    }
}

/// Run every check over one document.
pub fn check_file(file: FileId, text: &str, parse: &Parse, policy: DuplicateCheck) -> Vec<Diagnostic> {
    let mut collector = DiagnosticCollector::new();
    check_brackets(file, text, &mut collector);
    check_duplicates(parse, policy, &mut collector);
    collector.take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::parser::parse;

    fn diagnose(text: &str, policy: DuplicateCheck) -> Vec<Diagnostic> {
        let file = FileId::new(0);
        check_file(file, text, &parse(file, text), policy)
    }

    #[test]
    fn test_each_check_has_its_own_severity() {
        let text = "fn a() {}\nfn a() {}\nfn b() {\n";
        let file = FileId::new(0);
        let mut collector = DiagnosticCollector::new();
        check_duplicates(&parse(file, text), DuplicateCheck::All, &mut collector);
        check_brackets(file, text, &mut collector);

        assert_eq!(collector.warning_count(), 1);
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.diagnostics().len(), 2);
    }

    #[test]
    fn test_duplicate_versions_warn() {
        let text = "fn SQ3R(version: \"classic\") {}\nfn SQ3R(version: \"classic\") {}\nfn SQ3R(version: \"academic\") {}\n";
        let diags = diagnose(text, DuplicateCheck::VersionedOnly);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].start_line, 1);
        assert_eq!(diags[0].related[0].line, 0);
        assert_eq!(diags[0].code.as_deref(), Some(codes::DUPLICATE_DECLARATION));
    }

    #[test]
    fn test_unversioned_duplicates_follow_policy() {
        let text = "fn review() {}\nfn review() {}\n";

        assert!(diagnose(text, DuplicateCheck::VersionedOnly).is_empty());
        assert_eq!(diagnose(text, DuplicateCheck::All).len(), 1);
        assert!(diagnose(text, DuplicateCheck::Off).is_empty());
    }

    #[test]
    fn test_methods_of_different_owners_are_not_duplicates() {
        let text = "class A { fn run() {} }\nclass B { fn run() {} }\n";
        assert!(diagnose(text, DuplicateCheck::All).is_empty());
    }

    #[test]
    fn test_bracket_balance() {
        let mut collector = DiagnosticCollector::new();
        check_brackets(FileId::new(0), "fn a() {\n  b(]\n", &mut collector);

        let messages: Vec<_> = collector.diagnostics().iter().map(|d| d.message.to_string()).collect();
        assert_eq!(messages, vec!["unexpected closing ']'", "unclosed '{'", "unclosed '('"]);
        assert_eq!(collector.error_count(), 3);
    }

    #[test]
    fn test_brackets_in_strings_and_comments_ignored() {
        let mut collector = DiagnosticCollector::new();
        check_brackets(
            FileId::new(0),
            "fn a() { let s = \"{(\" } // stray }\n",
            &mut collector,
        );
        assert!(!collector.has_errors());
    }
}
