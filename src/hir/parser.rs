//! Source parser: document text to symbol table and label index.
//!
//! There is no grammar and no syntax tree. Each construct family is found by
//! its own pattern; nesting is recovered only where it matters (type bodies)
//! with a quote-aware brace counter. The parser is total: text it does not
//! understand simply yields no symbols.
//!
//! Construct families are scanned in a fixed order (free functions,
//! pipelines, types with their methods, aliases, macros, constants), which
//! fixes the order of first encounter recorded in the symbol table.

use std::ops::Range;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use smol_str::SmolStr;
use tracing::trace;

use super::symbols::{LabelIndex, Parse, Symbol, SymbolDetail, SymbolRef, SymbolTable};
use crate::base::text::{self, IDENT};
use crate::base::{FileId, LineIndex, TextRange, TextSize};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("construct pattern must compile")
}

static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"\bclass\s+({IDENT})(?:\s+extends\s+({IDENT}))?"
    ))
});

/// `[static] fn name(params`: the parameter list may be unterminated.
pub(crate) static FN_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?:\b(static)\s+)?\bfn\s+({IDENT})\s*\(([^)]*)"
    ))
});

pub(crate) static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| compile(r#"\bversion\s*:\s*"([^"]*)""#));

static PIPELINE_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"\bpipeline\s+({IDENT})")));

static ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?m)^[ \t]*alias[ \t]+({IDENT})[ \t]*=[ \t]*(.*)$")));

static MACRO_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?m)^[ \t]*macro[ \t]+({IDENT})(?:[ \t]+(.*))?$")));

static CONST_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?m)^[ \t]*const[ \t]+({IDENT})[ \t]*=[ \t]*(.*)$")));

static LABEL_RE: Lazy<Regex> = Lazy::new(|| compile(r#"^@label\(\s*"([^"]*)"\s*\)$"#));

/// A type declaration's extent: the declaration itself and the text between
/// its braces.
#[derive(Debug, Clone)]
struct TypeBody {
    body: Range<usize>,
}

/// Parse one document.
pub fn parse(file: FileId, text: &str) -> Parse {
    let mut parser = Parser::new(file, text);
    parser.run();
    trace!(
        file = %file,
        symbols = parser.out.symbols.len(),
        "parsed document"
    );
    parser.out
}

struct Parser<'a> {
    file: FileId,
    text: &'a str,
    lines: LineIndex,
    out: Parse,
}

impl<'a> Parser<'a> {
    fn new(file: FileId, text: &'a str) -> Self {
        Self {
            file,
            text,
            lines: LineIndex::new(text),
            out: Parse {
                symbols: SymbolTable::new(),
                labels: LabelIndex::new(),
            },
        }
    }

    fn run(&mut self) {
        let bodies = type_bodies(self.text);

        self.functions();
        self.pipelines();
        self.types(&bodies);
        self.line_constructs();
    }

    fn functions(&mut self) {
        let nesting = Nesting::new(self.text);
        for caps in FN_RE.captures_iter(self.text) {
            let decl = caps.get(0).map_or(0, |m| m.start());
            if nesting.in_type(decl) {
                continue;
            }
            let version = version_of(&caps);
            self.declare(&caps, 2, decl, SymbolDetail::Function { version });
        }
    }

    fn pipelines(&mut self) {
        for caps in PIPELINE_RE.captures_iter(self.text) {
            let decl = caps.get(0).map_or(0, |m| m.start());
            self.declare(&caps, 1, decl, SymbolDetail::Pipeline);
        }
    }

    fn types(&mut self, bodies: &[TypeBody]) {
        for (caps, body) in CLASS_RE.captures_iter(self.text).zip(bodies) {
            let decl = caps.get(0).map_or(0, |m| m.start());
            let parent = caps.get(2).map(|m| SmolStr::new(m.as_str()));
            let Some(owner) = caps.get(1).map(|m| SmolStr::new(m.as_str())) else {
                continue;
            };
            self.declare(&caps, 1, decl, SymbolDetail::Class { parent });

            let body_text = &self.text[body.body.clone()];
            for method in FN_RE.captures_iter(body_text) {
                let decl = body.body.start + method.get(0).map_or(0, |m| m.start());
                let detail = SymbolDetail::Method {
                    owner: owner.clone(),
                    version: version_of(&method),
                    is_static: method.get(1).is_some(),
                };
                self.declare_at(&method, 2, body.body.start, decl, detail);
            }
        }
    }

    fn line_constructs(&mut self) {
        for caps in ALIAS_RE.captures_iter(self.text) {
            let decl = caps.get(0).map_or(0, |m| m.start());
            let target = literal(&caps, 2);
            self.declare(&caps, 1, decl, SymbolDetail::TypeAlias { target });
        }
        for caps in MACRO_RE.captures_iter(self.text) {
            let decl = caps.get(0).map_or(0, |m| m.start());
            let value = literal(&caps, 2);
            self.declare(&caps, 1, decl, SymbolDetail::Macro { value });
        }
        for caps in CONST_RE.captures_iter(self.text) {
            let decl = caps.get(0).map_or(0, |m| m.start());
            let value = literal(&caps, 2);
            self.declare(&caps, 1, decl, SymbolDetail::Constant { value });
        }
    }

    fn declare(&mut self, caps: &Captures<'_>, name_group: usize, decl: usize, detail: SymbolDetail) {
        self.declare_at(caps, name_group, 0, decl, detail);
    }

    /// Record a symbol whose captures were taken from `self.text[base..]`.
    fn declare_at(
        &mut self,
        caps: &Captures<'_>,
        name_group: usize,
        base: usize,
        decl: usize,
        detail: SymbolDetail,
    ) {
        let Some(name) = caps.get(name_group) else {
            return;
        };
        let start = base + name.start();
        let range = TextRange::at(TextSize::from(start as u32), TextSize::of(name.as_str()));
        let pos = self.lines.line_col(range.start());
        let (labels, doc) = leading_annotations(&self.text[..decl]);

        let symbol = Symbol {
            name: SmolStr::new(name.as_str()),
            detail,
            file: self.file,
            range,
            start_line: pos.line,
            start_col: pos.col,
            labels,
            doc,
        };
        trace!(name = %symbol.name, kind = symbol.kind().display(), "declared");

        let label_list: Vec<SmolStr> = symbol.labels.iter().cloned().collect();
        let name = symbol.name.clone();
        let index = self.out.symbols.add(symbol);
        for label in label_list {
            self.out.labels.insert(
                label,
                SymbolRef {
                    name: name.clone(),
                    index,
                },
            );
        }
    }
}

/// Bodies of every `class` declaration, in match order.
///
/// The body starts after the first `{` following the header (only
/// whitespace may sit in between) and ends at the matching `}`, or at the
/// end of the document if it is never closed. A header without a brace has
/// an empty body.
fn type_bodies(text: &str) -> Vec<TypeBody> {
    CLASS_RE
        .find_iter(text)
        .map(|m| {
            let rest = &text[m.end()..];
            let gap = rest.len() - rest.trim_start().len();
            if rest[gap..].starts_with('{') {
                let open = m.end() + gap;
                let close = text::matching_brace(text, open);
                TypeBody {
                    body: open + 1..close.max(open + 1),
                }
            } else {
                TypeBody {
                    body: m.end()..m.end(),
                }
            }
        })
        .collect()
}

/// Offsets of every `class` keyword and every `}` outside strings.
struct Nesting {
    classes: Vec<usize>,
    closers: Vec<usize>,
}

impl Nesting {
    fn new(text: &str) -> Self {
        Self {
            classes: CLASS_RE.find_iter(text).map(|m| m.start()).collect(),
            closers: text::CodeChars::new(text)
                .filter(|&(_, c)| c == '}')
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// A declaration at `offset` is still inside a type when the nearest
    /// `class` before it comes after the nearest `}` before it.
    fn in_type(&self, offset: usize) -> bool {
        let class = last_before(&self.classes, offset);
        let closer = last_before(&self.closers, offset);
        class.is_some_and(|c| closer.is_none_or(|b| c > b))
    }
}

fn last_before(sorted: &[usize], offset: usize) -> Option<usize> {
    let n = sorted.partition_point(|&p| p < offset);
    n.checked_sub(1).map(|i| sorted[i])
}

fn version_of(caps: &Captures<'_>) -> Option<SmolStr> {
    let params = caps.get(3)?.as_str();
    VERSION_RE
        .captures(params)
        .and_then(|v| v.get(1))
        .map(|v| SmolStr::new(v.as_str()))
}

fn literal(caps: &Captures<'_>, group: usize) -> SmolStr {
    let raw = caps.get(group).map_or("", |m| m.as_str());
    SmolStr::new(raw.trim().trim_end_matches(';').trim_end())
}

/// Labels and documentation attached to a declaration starting right after
/// `before`.
///
/// Lines are scanned upward from the declaration. Blank lines and `//`
/// comments are skipped, `@label("x")` lines accumulate labels (kept in
/// source order), the first `///` line found is the documentation, and any
/// other line ends the scan.
fn leading_annotations(before: &str) -> (IndexSet<SmolStr>, Option<SmolStr>) {
    let mut labels: Vec<SmolStr> = Vec::new();
    let mut doc = None;

    let mut lines = before.split('\n').rev();
    // Text on the declaration's own line, before the keyword.
    if let Some(own) = lines.next() {
        if !own.trim().is_empty() {
            return (IndexSet::new(), None);
        }
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = LABEL_RE.captures(line) {
            if let Some(value) = caps.get(1) {
                labels.push(SmolStr::new(value.as_str()));
            }
        } else if let Some(rest) = line.strip_prefix("///") {
            if doc.is_none() {
                doc = Some(SmolStr::new(rest.trim()));
            }
        } else if line.starts_with("//") {
            continue;
        } else {
            break;
        }
    }

    labels.reverse();
    (labels.into_iter().collect(), doc)
}
