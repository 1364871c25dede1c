//! Completion context classification.
//!
//! Looks only at the text before the cursor (and, for parameter lists, the
//! rest of the cursor's line) and picks exactly one context. Checks run in
//! a fixed priority order and the first match wins.

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

use crate::base::text::{CodeChars, IDENT, trailing_ident, unclosed_braces};
use crate::hir::FN_RE;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("context pattern must compile")
}

static LABEL_RE: Lazy<Regex> = Lazy::new(|| compile(r#"@label\(\s*(?:"([^"]*))?$"#));

static CONTROL_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"\b(?:{})\s+(?:{IDENT})?$",
        CONTROL_KEYWORDS.join("|")
    ))
});

static TYPE_RE: Lazy<Regex> = Lazy::new(|| compile(&format!(r"(?::|->)\s*(?:{IDENT})?$")));

static VERSION_KEY_RE: Lazy<Regex> = Lazy::new(|| compile(r"\bversion\s*:\s*$"));

static VERSION_RE: Lazy<Regex> = Lazy::new(|| compile(r#"\bversion\s*:\s*"?([\w.\-]*)$"#));

static VERSION_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r#"({IDENT})\s*\([^()]*\bversion\s*:\s*"?[\w.\-]*$"#
    ))
});

static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?:\b(?:let|const)\s+|=\s*)(?:{IDENT})?$")));

/// Keywords after which a new statement begins.
pub const CONTROL_KEYWORDS: &[&str] = &["if", "else", "for", "while", "return", "step"];

/// Keywords that introduce a name being declared.
pub const DECLARATION_KEYWORDS: &[&str] = &[
    "let", "const", "fn", "class", "pipeline", "alias", "macro", "extends", "static",
];

/// Where the cursor sits, as far as completion is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionContext {
    /// Inside `@label(` or `@label("par`.
    Label { partial: SmolStr },
    /// Where a statement or call is expected.
    Call {
        partial: SmolStr,
        /// Nothing but whitespace or a brace precedes the partial word.
        statement_start: bool,
    },
    /// After a control keyword.
    Keyword { partial: SmolStr },
    /// After `:` or `->`.
    Type { partial: SmolStr },
    /// Naming an argument inside an open parameter list.
    Parameter {
        partial: SmolStr,
        function: Option<SmolStr>,
    },
    /// Inside `version: "`.
    Version {
        partial: SmolStr,
        function: Option<SmolStr>,
    },
    /// Naming or referencing a variable.
    Variable { partial: SmolStr },
    /// Nothing more specific applies.
    Intelligent { partial: SmolStr },
}

impl CompletionContext {
    /// Short stable name, recorded with accepted completions.
    pub fn tag(&self) -> &'static str {
        match self {
            CompletionContext::Label { .. } => "label",
            CompletionContext::Call { .. } => "call",
            CompletionContext::Keyword { .. } => "keyword",
            CompletionContext::Type { .. } => "type",
            CompletionContext::Parameter { .. } => "parameter",
            CompletionContext::Version { .. } => "version",
            CompletionContext::Variable { .. } => "variable",
            CompletionContext::Intelligent { .. } => "intelligent",
        }
    }

    /// The word being typed.
    pub fn partial(&self) -> &str {
        match self {
            CompletionContext::Label { partial }
            | CompletionContext::Call { partial, .. }
            | CompletionContext::Keyword { partial }
            | CompletionContext::Type { partial }
            | CompletionContext::Parameter { partial, .. }
            | CompletionContext::Version { partial, .. }
            | CompletionContext::Variable { partial }
            | CompletionContext::Intelligent { partial } => partial,
        }
    }

    /// Whether variable candidates are mixed into this context.
    pub fn wants_variables(&self) -> bool {
        !matches!(
            self,
            CompletionContext::Label { .. }
                | CompletionContext::Version { .. }
                | CompletionContext::Type { .. }
        )
    }
}

/// Classify with no knowledge of the text after the cursor.
pub fn classify(before: &str) -> CompletionContext {
    classify_at(before, "")
}

/// Classify the cursor given the text before and after it.
pub fn classify_at(before: &str, after: &str) -> CompletionContext {
    let line = current_line(before);
    let rest_of_line = after.split('\n').next().unwrap_or("");
    let partial = SmolStr::new(trailing_ident(line));
    let head = &line[..line.len() - partial.len()];

    let mut code = CodeChars::new(line);
    let open_paren = innermost_open_paren(&mut code);
    let in_string = code.in_string();

    if let Some(caps) = LABEL_RE.captures(line) {
        let partial = caps.get(1).map_or("", |m| m.as_str());
        return CompletionContext::Label {
            partial: SmolStr::new(partial),
        };
    }

    let version = VERSION_RE.captures(line);
    let in_arguments = open_paren.is_some() && !in_string && version.is_none() && rest_of_line.contains(')');

    if !in_string && !in_arguments && is_call_position(head) {
        let statement_start = head
            .trim_end()
            .chars()
            .last()
            .is_none_or(|c| c == '{' || c == '}');
        return CompletionContext::Call {
            partial,
            statement_start,
        };
    }

    if !in_string && CONTROL_RE.is_match(line) {
        return CompletionContext::Keyword { partial };
    }

    if !in_string && TYPE_RE.is_match(line) && !VERSION_KEY_RE.is_match(head) {
        return CompletionContext::Type { partial };
    }

    if in_arguments {
        let function = open_paren.and_then(|open| {
            let name = trailing_ident(line[..open].trim_end());
            (!name.is_empty()).then(|| SmolStr::new(name))
        });
        return CompletionContext::Parameter { partial, function };
    }

    if let Some(caps) = version {
        let function = VERSION_CALL_RE
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| SmolStr::new(m.as_str()));
        return CompletionContext::Version {
            partial: SmolStr::new(caps.get(1).map_or("", |m| m.as_str())),
            function,
        };
    }

    if !in_string && VARIABLE_RE.is_match(line) {
        return CompletionContext::Variable { partial };
    }

    CompletionContext::Intelligent { partial }
}

/// The last line of `before`.
pub(crate) fn current_line(before: &str) -> &str {
    before.rsplit('\n').next().unwrap_or("")
}

/// Name of the method whose body is open at the end of `before`.
///
/// Blocks that are not method bodies (a type body, an `if`) are skipped
/// outward until one opened directly by a `fn` header is found.
pub fn enclosing_function(before: &str) -> Option<SmolStr> {
    let headers: Vec<_> = FN_RE.captures_iter(before).collect();
    unclosed_braces(before).into_iter().rev().find_map(|brace| {
        let header = headers.iter().rev().find(|c| c.get(0).is_some_and(|m| m.end() <= brace))?;
        let between = &before[header.get(0)?.end()..brace];
        if between.contains(['{', '}']) {
            return None;
        }
        header.get(2).map(|m| SmolStr::new(m.as_str()))
    })
}

/// Offset of the innermost `(` still open at the end of the scan.
fn innermost_open_paren(code: &mut CodeChars<'_>) -> Option<usize> {
    let mut stack = Vec::new();
    for (i, c) in code.by_ref() {
        match c {
            '(' => stack.push(i),
            ')' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.pop()
}

/// `head` is the line up to the partial word.
fn is_call_position(head: &str) -> bool {
    let Some(last) = head.chars().last() else {
        return true;
    };
    if !(last.is_whitespace() || matches!(last, '{' | '}' | '(' | ')' | ',')) {
        return false;
    }

    let trimmed = head.trim_end();
    if trimmed.ends_with(':') || trimmed.ends_with("->") || trimmed.ends_with('=') {
        return false;
    }
    if trimmed.len() < head.len() {
        let word = trailing_ident(trimmed);
        if DECLARATION_KEYWORDS.contains(&word) || CONTROL_KEYWORDS.contains(&word) {
            return false;
        }
    }
    true
}
