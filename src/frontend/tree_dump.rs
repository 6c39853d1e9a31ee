//! Front end adapter that consumes a syntax-tree dump rather than linking a
//! compiler into this process: the compiler front end is invoked as a
//! subprocess with the verbatim compiler arguments and emits a JSON document
//! on stdout describing its diagnostics and resolved syntax tree.
//!
//! Document shape:
//!
//! ```json
//! {
//!   "diagnostics": [{"severity": "warning", "message": "..."}],
//!   "nodes": [
//!     {"loc": "a.c:10:3", "kind": "call",
//!      "ref": {"sym": "c:@F@f#", "loc": "a.c:2:5"},
//!      "children": [...]}
//!   ]
//! }
//! ```
//!
//! `loc` strings are `path:line:col`; `loc` and `ref` are null/omitted for
//! nodes without a physical location or that reference nothing.

use std::fs::File;
use std::io::Read;
use std::process::Command;
use std::str::FromStr;

use serde::Deserialize;

use super::{Diagnostic, Node, ParsedUnit, ReferencedDecl, SourceLocation, VisitResult, Visitor};
use crate::errors::{IndexError, Result};
use crate::file_format::location::RefKind;

#[derive(Deserialize)]
struct DumpDocument {
    #[serde(default)]
    diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    nodes: Vec<DumpNode>,
}

#[derive(Deserialize)]
struct DumpNode {
    loc: Option<String>,
    kind: String,
    #[serde(rename = "ref")]
    referenced: Option<DumpRef>,
    #[serde(default)]
    children: Vec<DumpNode>,
}

#[derive(Deserialize)]
struct DumpRef {
    sym: String,
    loc: Option<String>,
}

fn parse_source_location(s: &str) -> Result<SourceLocation> {
    let mut fields = s.rsplitn(3, ':');
    let col = fields.next();
    let lineno = fields.next();
    let path = fields.next();
    match (path, lineno, col) {
        (Some(path), Some(lineno), Some(col)) if !path.is_empty() => {
            let lineno = lineno.parse().map_err(|_| {
                IndexError::front_end("parse tree dump", format!("bad line in '{}'", s))
            })?;
            let col = col.parse().map_err(|_| {
                IndexError::front_end("parse tree dump", format!("bad column in '{}'", s))
            })?;
            Ok(SourceLocation {
                path: path.to_string(),
                lineno,
                col,
            })
        }
        _ => Err(IndexError::front_end(
            "parse tree dump",
            format!("malformed location '{}'", s),
        )),
    }
}

/// A parsed tree-dump node plus its subtree.
struct TreeNode {
    node: Node,
    children: Vec<TreeNode>,
}

fn convert_node(dump: DumpNode) -> Result<TreeNode> {
    let loc = match dump.loc {
        Some(s) => Some(parse_source_location(&s)?),
        None => None,
    };
    let kind = RefKind::from_str(&dump.kind)
        .map_err(|e| IndexError::front_end("parse tree dump", e))?;
    let referenced = match dump.referenced {
        Some(r) => {
            let ref_loc = match r.loc {
                Some(s) => Some(parse_source_location(&s)?),
                None => None,
            };
            Some(ReferencedDecl {
                sym: r.sym,
                loc: ref_loc,
            })
        }
        None => None,
    };
    let children = dump
        .children
        .into_iter()
        .map(convert_node)
        .collect::<Result<Vec<TreeNode>>>()?;
    Ok(TreeNode {
        node: Node {
            loc,
            kind,
            referenced,
        },
        children,
    })
}

/// A translation unit reconstructed from a front end's tree dump.
pub struct TreeDumpUnit {
    diagnostics: Vec<Diagnostic>,
    nodes: Vec<TreeNode>,
}

impl TreeDumpUnit {
    pub fn from_str(raw: &str) -> Result<TreeDumpUnit> {
        let document: DumpDocument = serde_json::from_str(raw)
            .map_err(|e| IndexError::front_end("parse tree dump", e))?;
        let nodes = document
            .nodes
            .into_iter()
            .map(convert_node)
            .collect::<Result<Vec<TreeNode>>>()?;
        Ok(TreeDumpUnit {
            diagnostics: document.diagnostics,
            nodes,
        })
    }

    pub fn from_file(path: &str) -> Result<TreeDumpUnit> {
        let mut raw = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut raw))
            .map_err(|e| IndexError::front_end("read tree dump", format!("{}: {}", path, e)))?;
        TreeDumpUnit::from_str(&raw)
    }

    /// Spawn the front end with the verbatim compiler invocation and parse
    /// the tree dump from its stdout.  A front end that cannot be spawned or
    /// whose output does not parse is a front-end failure; a front end that
    /// produces a parseable dump gets to report compile problems through the
    /// document's own diagnostics.
    pub fn from_front_end(invocation: &[String]) -> Result<TreeDumpUnit> {
        let (command, args) = match invocation.split_first() {
            Some(split) => split,
            None => {
                return Err(IndexError::front_end(
                    "spawn front end",
                    "empty front end invocation",
                ))
            }
        };
        let output = Command::new(command)
            .args(args)
            .output()
            .map_err(|e| IndexError::front_end("spawn front end", format!("{}: {}", command, e)))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        match TreeDumpUnit::from_str(&stdout) {
            Ok(unit) => Ok(unit),
            Err(_) if !output.status.success() => Err(IndexError::front_end(
                "run front end",
                format!(
                    "{} exited with {} and produced no tree: {}",
                    command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            )),
            Err(e) => Err(e),
        }
    }
}

fn visit_nodes(nodes: &[TreeNode], parent: Option<&Node>, visitor: &mut dyn Visitor) {
    for tree_node in nodes {
        match visitor.visit(&tree_node.node, parent) {
            VisitResult::Recurse => {
                visit_nodes(&tree_node.children, Some(&tree_node.node), visitor)
            }
            VisitResult::Continue => {}
        }
    }
}

impl ParsedUnit for TreeDumpUnit {
    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn visit_children(&self, visitor: &mut dyn Visitor) {
        visit_nodes(&self.nodes, None, visitor);
    }
}
