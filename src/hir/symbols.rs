//! Symbols and per-document symbol tables.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use crate::base::{FileId, LineCol, TextRange};

/// The kind of a declared entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Pipeline,
    Class,
    Method,
    TypeAlias,
    Macro,
    Constant,
}

impl SymbolKind {
    /// Human-readable name, used in completion details and hovers.
    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Pipeline => "pipeline",
            SymbolKind::Class => "class",
            SymbolKind::Method => "method",
            SymbolKind::TypeAlias => "type alias",
            SymbolKind::Macro => "macro",
            SymbolKind::Constant => "constant",
        }
    }

    /// Kinds that are referenced with call syntax.
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            SymbolKind::Function | SymbolKind::Pipeline | SymbolKind::Method
        )
    }

    /// Kinds that are referenced by bare name.
    pub fn is_value_like(&self) -> bool {
        !self.is_callable()
    }
}

/// Kind-specific attributes of a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolDetail {
    Function {
        version: Option<SmolStr>,
    },
    Pipeline,
    Class {
        parent: Option<SmolStr>,
    },
    Method {
        owner: SmolStr,
        version: Option<SmolStr>,
        is_static: bool,
    },
    TypeAlias {
        target: SmolStr,
    },
    Macro {
        value: SmolStr,
    },
    Constant {
        value: SmolStr,
    },
}

impl SymbolDetail {
    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolDetail::Function { .. } => SymbolKind::Function,
            SymbolDetail::Pipeline => SymbolKind::Pipeline,
            SymbolDetail::Class { .. } => SymbolKind::Class,
            SymbolDetail::Method { .. } => SymbolKind::Method,
            SymbolDetail::TypeAlias { .. } => SymbolKind::TypeAlias,
            SymbolDetail::Macro { .. } => SymbolKind::Macro,
            SymbolDetail::Constant { .. } => SymbolKind::Constant,
        }
    }
}

/// One declared entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    pub detail: SymbolDetail,
    /// The file containing the declaration.
    pub file: FileId,
    /// Range of the declared name.
    pub range: TextRange,
    /// Position of the declared name.
    pub start_line: u32,
    pub start_col: u32,
    /// Labels from `@label("...")` annotations directly above the
    /// declaration, in source order.
    pub labels: IndexSet<SmolStr>,
    /// The closest `///` line above the declaration.
    pub doc: Option<SmolStr>,
}

impl Symbol {
    #[inline]
    pub fn kind(&self) -> SymbolKind {
        self.detail.kind()
    }

    pub fn position(&self) -> LineCol {
        LineCol::new(self.start_line, self.start_col)
    }

    pub fn version(&self) -> Option<&str> {
        match &self.detail {
            SymbolDetail::Function { version } | SymbolDetail::Method { version, .. } => {
                version.as_deref()
            }
            _ => None,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match &self.detail {
            SymbolDetail::Method { owner, .. } => Some(owner),
            _ => None,
        }
    }

    pub fn parent_type(&self) -> Option<&str> {
        match &self.detail {
            SymbolDetail::Class { parent } => parent.as_deref(),
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.detail, SymbolDetail::Method { is_static: true, .. })
    }

    /// The literal value of a macro or constant, or the target of an alias.
    pub fn literal_value(&self) -> Option<&str> {
        match &self.detail {
            SymbolDetail::Macro { value } | SymbolDetail::Constant { value } => Some(value),
            SymbolDetail::TypeAlias { target } => Some(target),
            _ => None,
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// True if the two symbols share at least one label.
    pub fn shares_label_with(&self, other: &Symbol) -> bool {
        self.labels.iter().any(|l| other.labels.contains(l))
    }
}

/// Narrow a name bucket by owner and version.
///
/// With an owner, symbols owned by that type win (further narrowed by
/// version when one is given). If no owned symbol survives, the whole bucket
/// is filtered by version when one is given, or returned as-is.
pub fn select<'a, I>(candidates: I, version: Option<&str>, owner: Option<&str>) -> Vec<&'a Symbol>
where
    I: IntoIterator<Item = &'a Symbol>,
{
    let bucket: Vec<&Symbol> = candidates.into_iter().collect();
    let version_matches = |s: &&Symbol| version.is_none_or(|v| s.version() == Some(v));

    if let Some(owner) = owner {
        let owned: Vec<&Symbol> = bucket
            .iter()
            .copied()
            .filter(|s| s.owner() == Some(owner))
            .filter(version_matches)
            .collect();
        if !owned.is_empty() {
            return owned;
        }
    }

    bucket.into_iter().filter(version_matches).collect()
}

/// A document's symbols, grouped by name in order of first encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    by_name: IndexMap<SmolStr, Vec<Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol to its name bucket. Returns the symbol's index within
    /// the bucket.
    pub fn add(&mut self, symbol: Symbol) -> usize {
        let bucket = self.by_name.entry(symbol.name.clone()).or_default();
        bucket.push(symbol);
        bucket.len() - 1
    }

    /// All symbols sharing `name`, in insertion order.
    pub fn bucket(&self, name: &str) -> &[Symbol] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The best match for `name`; see [`select`] for the precedence rules.
    pub fn find(&self, name: &str, version: Option<&str>, owner: Option<&str>) -> Option<&Symbol> {
        self.find_all(name, version, owner).into_iter().next()
    }

    /// Every match for `name`; see [`select`] for the precedence rules.
    pub fn find_all(&self, name: &str, version: Option<&str>, owner: Option<&str>) -> Vec<&Symbol> {
        select(self.bucket(name), version, owner)
    }

    pub fn get(&self, name: &str, index: usize) -> Option<&Symbol> {
        self.by_name.get(name)?.get(index)
    }

    /// Every symbol, bucket by bucket.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.by_name.values().flatten()
    }

    /// Declared names in order of first encounter.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Where a labelled symbol lives in its [`SymbolTable`]: name and index
/// within the name bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    pub name: SmolStr,
    pub index: usize,
}

/// Label → symbols carrying it, labels in order of first use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelIndex {
    by_label: IndexMap<SmolStr, Vec<SymbolRef>>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: SmolStr, symbol: SymbolRef) {
        self.by_label.entry(label).or_default().push(symbol);
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_label.keys().map(SmolStr::as_str)
    }

    pub fn refs(&self, label: &str) -> &[SymbolRef] {
        self.by_label.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of symbols carrying `label`.
    pub fn count(&self, label: &str) -> usize {
        self.refs(label).len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

/// The result of parsing one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parse {
    pub symbols: SymbolTable,
    pub labels: LabelIndex,
}

impl Parse {
    pub fn all_labels(&self) -> impl Iterator<Item = &str> {
        self.labels.labels()
    }

    pub fn symbols_by_label(&self, label: &str) -> Vec<&Symbol> {
        self.labels
            .refs(label)
            .iter()
            .filter_map(|r| self.symbols.get(&r.name, r.index))
            .collect()
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.all_symbols()
    }
}
