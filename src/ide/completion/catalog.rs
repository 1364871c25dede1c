//! Fixed completion catalogs.
//!
//! Templates use `$1`, `$2`, … for cursor stops and `$0` for the final
//! cursor position.

/// A catalog entry: label, insertion template, one-line description.
pub type Entry = (&'static str, &'static str, &'static str);

pub const KEYWORDS: &[Entry] = &[
    ("fn", "fn ${1:name}($2) {\n    $0\n}", "declare a method"),
    ("pipeline", "pipeline ${1:Name} {\n    $0\n}", "declare a multi-step workflow"),
    ("class", "class ${1:Name} {\n    $0\n}", "declare a type"),
    ("extends", "extends ${1:Parent}", "inherit from another type"),
    ("static", "static fn ${1:name}($2) {\n    $0\n}", "declare a type-level method"),
    ("alias", "alias ${1:Name} = ${2:Type}", "declare a type alias"),
    ("macro", "macro ${1:NAME} $0", "declare a macro"),
    ("const", "const ${1:NAME} = $0", "declare a constant"),
    ("let", "let ${1:name} = $0", "declare a variable"),
    ("if", "if ${1:condition} {\n    $0\n}", "conditional"),
    ("else", "else {\n    $0\n}", "alternative branch"),
    ("for", "for ${1:item} in ${2:items} {\n    $0\n}", "loop over items"),
    ("while", "while ${1:condition} {\n    $0\n}", "loop while a condition holds"),
    ("return", "return $0", "return from the method"),
    ("step", "step ${1:name}($2)", "one step of a pipeline"),
    ("@label", "@label(\"$1\")", "classify the next declaration"),
];

pub const TYPES: &[Entry] = &[
    ("string", "string", "text value"),
    ("number", "number", "numeric value"),
    ("boolean", "boolean", "true or false"),
    ("duration", "duration", "length of time"),
    ("date", "date", "calendar date"),
    ("list", "list<$1>", "ordered collection"),
    ("map", "map<$1, $2>", "key/value collection"),
    ("text", "text", "long-form text"),
    ("note", "note", "captured note"),
    ("source", "source", "material being studied"),
    ("any", "any", "unconstrained value"),
    ("void", "void", "no value"),
];

pub const PARAMETERS: &[Entry] = &[
    ("version", "version: \"$1\"", "select an overload"),
    ("source", "source: $1", "material to work on"),
    ("topic", "topic: $1", "subject"),
    ("duration", "duration: $1", "time box"),
    ("goal", "goal: $1", "intended outcome"),
    ("level", "level: $1", "difficulty or depth"),
    ("notes", "notes: $1", "notes to use or produce"),
    ("input", "input: $1", "input value"),
    ("output", "output: $1", "output target"),
    ("options", "options: $1", "extra settings"),
];

pub const LABELS: &[&str] = &[
    "study",
    "reading",
    "writing",
    "memory",
    "review",
    "planning",
    "research",
    "focus",
    "analysis",
    "productivity",
];

pub const VERSIONS: &[&str] = &[
    "standard", "quick", "detailed", "beginner", "advanced", "v1", "v2",
];

/// Trigger word → canonical method names it suggests.
pub const SEMANTIC_MAP: &[(&str, &[&str])] = &[
    ("read", &["survey", "question", "read", "recite", "review"]),
    ("remember", &["spacedRepetition", "activeRecall"]),
    ("memor", &["spacedRepetition", "mnemonic"]),
    ("understand", &["feynman", "summarize", "explain"]),
    ("plan", &["setGoals", "schedule", "prioritize"]),
    ("write", &["outline", "draft", "revise"]),
    ("focus", &["pomodoro", "deepWork"]),
    ("test", &["practiceTest", "selfQuiz"]),
    ("exam", &["practiceTest", "reviewNotes"]),
    ("note", &["cornell", "summarize", "mindMap"]),
];

/// Substrings of validation-flavoured names, preferred inside `if`/`else`.
pub const VALIDATION_HINTS: &[&str] = &["valid", "check", "verify", "ensure", "assert", "confirm"];

/// Name prefixes of predicates, preferred inside `if`/`else`.
pub const PREDICATE_PREFIXES: &[&str] = &["is", "has", "can"];

/// Substrings of iteration-flavoured names, preferred inside `for`/`while`.
pub const ITERATION_HINTS: &[&str] = &["each", "all", "next", "iter", "process", "batch", "repeat"];

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    #[test]
    fn test_catalogs_have_unique_labels() {
        for catalog in [KEYWORDS, TYPES, PARAMETERS] {
            let labels: IndexSet<_> = catalog.iter().map(|(label, _, _)| label).collect();
            assert_eq!(labels.len(), catalog.len());
        }
        assert_eq!(LABELS.iter().collect::<IndexSet<_>>().len(), LABELS.len());
    }
}
