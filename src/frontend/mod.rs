//! Contract consumed from the source-language front end.  The front end owns
//! parsing, symbol resolution, and SymbolId assignment; this crate only
//! consumes its diagnostics and a depth-first visitation of its syntax tree.

pub mod tree_dump;

use std::fmt;

use serde::Deserialize;

use crate::file_format::location::RefKind;

/// Physical instantiation location of a node: where the token actually
/// occurs, with macro expansion already followed back to the physical
/// occurrence.  Synthesized and builtin nodes have none.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceLocation {
    pub path: String,
    pub lineno: u32,
    pub col: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}: {}", self.severity.as_str(), self.message)
    }
}

/// True iff the unit failed to compile: anything at or above error severity.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|diag| diag.severity >= Severity::Error)
}

/// The declaration a node refers to, as resolved by the front end.  `sym` may
/// be empty when the front end cannot assign a stable id; `loc` is absent
/// when the referenced declaration is itself synthetic.
#[derive(Clone, Debug)]
pub struct ReferencedDecl {
    pub sym: String,
    pub loc: Option<SourceLocation>,
}

/// One syntax-tree node as the front end exposes it to the visitor.
#[derive(Clone, Debug)]
pub struct Node {
    pub loc: Option<SourceLocation>,
    pub kind: RefKind,
    pub referenced: Option<ReferencedDecl>,
}

/// Whether the front end should descend into the visited node's children.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VisitResult {
    /// Skip the node's children and move on to its next sibling.
    Continue,
    /// Descend into the node's children.
    Recurse,
}

/// Callback contract for the front end's depth-first, pre-order traversal.
pub trait Visitor {
    fn visit(&mut self, node: &Node, parent: Option<&Node>) -> VisitResult;
}

/// A successfully parsed translation unit.
pub trait ParsedUnit {
    fn diagnostics(&self) -> &[Diagnostic];

    /// Drive `visitor` over every top-level node of the unit, descending
    /// according to the visitor's returned [`VisitResult`].
    fn visit_children(&self, visitor: &mut dyn Visitor);
}
