//! Name resolution: from a reference to its declarations.
//!
//! Resolution is workspace-wide and deliberately does not pick a winner
//! among overloads: when several declarations survive the owner/version
//! filters the caller gets all of them.

use smol_str::SmolStr;

use super::index::WorkspaceSnapshot;
use super::symbols::{Symbol, SymbolKind};

/// Which declarations a reference can point to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceShape {
    /// `name(...)`: functions, pipelines, methods.
    Call,
    /// A bare name: classes, aliases, macros, constants.
    Name,
}

impl ReferenceShape {
    pub fn admits(self, kind: SymbolKind) -> bool {
        match self {
            ReferenceShape::Call => kind.is_callable(),
            ReferenceShape::Name => kind.is_value_like(),
        }
    }
}

/// A reference to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionQuery {
    pub name: SmolStr,
    pub shape: ReferenceShape,
    /// `Owner.name`: prefer methods of this type.
    pub owner: Option<SmolStr>,
    /// `version: "..."` in the call's arguments.
    pub version: Option<SmolStr>,
}

impl DefinitionQuery {
    pub fn new(name: impl Into<SmolStr>, shape: ReferenceShape) -> Self {
        Self {
            name: name.into(),
            shape,
            owner: None,
            version: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<SmolStr>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<SmolStr>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Result of resolving a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Exactly one declaration.
    Found(Symbol),
    /// Several declarations; disambiguation is the caller's job.
    Ambiguous(Vec<Symbol>),
    NotFound,
}

impl ResolveResult {
    fn from_matches(mut matches: Vec<Symbol>) -> Self {
        match matches.len() {
            0 => ResolveResult::NotFound,
            1 => ResolveResult::Found(matches.remove(0)),
            _ => ResolveResult::Ambiguous(matches),
        }
    }

    /// The resolved symbol if unambiguous.
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            ResolveResult::Found(s) => Some(s),
            _ => None,
        }
    }

    /// Every candidate, however many.
    pub fn candidates(&self) -> &[Symbol] {
        match self {
            ResolveResult::Found(s) => std::slice::from_ref(s),
            ResolveResult::Ambiguous(all) => all,
            ResolveResult::NotFound => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ResolveResult::Ambiguous(_))
    }
}

/// Resolve `query` against every file of the snapshot.
pub fn resolve(snapshot: &WorkspaceSnapshot, query: &DefinitionQuery) -> ResolveResult {
    let matches = snapshot
        .find_all(
            &query.name,
            query.version.as_deref(),
            query.owner.as_deref(),
            |kind| query.shape.admits(kind),
        )
        .into_iter()
        .cloned()
        .collect();
    ResolveResult::from_matches(matches)
}
