//! Strict Python syntax model on top of tree-sitter.
//!
//! tree-sitter recovers from errors and always yields a tree, so a parse is
//! only accepted when the tree contains no `ERROR` or `MISSING` node. No
//! partial tree ever escapes a failed parse. Trees nested deeper than
//! [`MAX_NESTING_DEPTH`] are refused as well, since CPython rejects such
//! input and the detectors walk the tree recursively.

use crate::errors::SyntaxError;
use std::collections::BTreeSet;
use tree_sitter::{Node, Parser, Tree};

/// Deepest node nesting accepted by [`SyntaxTree::parse`].
pub const MAX_NESTING_DEPTH: usize = 1000;

/// A successfully parsed Python module together with its source text.
pub struct SyntaxTree {
    tree: Tree,
    source: String,
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.tree.root_node().kind())
            .field("bytes", &self.source.len())
            .finish()
    }
}

impl SyntaxTree {
    /// Parse `source` as a Python module, rejecting any syntax error.
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| SyntaxError::new(format!("failed to load Python grammar: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::new("parser produced no tree"))?;

        if let Some(err) = first_error(tree.root_node()) {
            return Err(err);
        }
        if let Some(err) = excessive_nesting(tree.root_node()) {
            return Err(err);
        }

        Ok(Self {
            tree,
            source: source.to_string(),
        })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Verbatim text of the 1-based line `line`, without its terminator.
    pub fn line_text(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|idx| self.source.lines().nth(idx))
            .unwrap_or("")
    }

    /// Verbatim text of the inclusive 1-based line range, joined with `\n`.
    pub fn lines_text(&self, start: usize, end: usize) -> String {
        if start == 0 || end < start {
            return String::new();
        }
        self.source
            .lines()
            .skip(start - 1)
            .take(end - start + 1)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Leading whitespace of the 1-based line `line`.
    pub fn indentation_of(&self, line: usize) -> &str {
        let text = self.line_text(line);
        let trimmed = text.trim_start_matches([' ', '\t']);
        &text[..text.len() - trimmed.len()]
    }

    /// All identifier names appearing in the module.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.walk(|node| {
            if node.kind() == "identifier" {
                names.insert(self.text(node).to_string());
            }
        });
        names
    }

    /// Pre-order, document-order traversal of every node.
    pub fn walk<'t>(&'t self, mut visit: impl FnMut(Node<'t>)) {
        let mut cursor = self.tree.walk();
        loop {
            visit(cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }
}

/// 1-based line of a node's first character.
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// 1-based line of a node's last character.
pub fn end_line_of(node: Node<'_>) -> usize {
    let end = node.end_position();
    // A node ending at column 0 ends on the previous line.
    if end.column == 0 && end.row > node.start_position().row {
        end.row
    } else {
        end.row + 1
    }
}

/// 1-based column of a node's first character.
pub fn column_of(node: Node<'_>) -> usize {
    node.start_position().column + 1
}

/// Named children of `node`, excluding comments.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// All children of `node`, named and anonymous.
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Returns true when `source` parses without syntax errors.
pub fn validate(source: &str) -> bool {
    SyntaxTree::parse(source).is_ok()
}

/// First `ERROR` or `MISSING` node in document order, only descending into
/// subtrees that contain one.
fn first_error(root: Node<'_>) -> Option<SyntaxError> {
    if !root.has_error() {
        return None;
    }
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(describe_error(node));
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Some(describe_error(root));
            }
        }
    }
}

fn excessive_nesting(root: Node<'_>) -> Option<SyntaxError> {
    let mut cursor = root.walk();
    let mut depth = 0usize;
    loop {
        if depth > MAX_NESTING_DEPTH {
            let node = cursor.node();
            let (line, column) = (line_of(node), column_of(node));
            return Some(SyntaxError::at(
                format!(
                    "nesting deeper than {MAX_NESTING_DEPTH} levels at line {line}, column {column}"
                ),
                line,
                column,
            ));
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
            depth -= 1;
        }
    }
}

fn describe_error(node: Node<'_>) -> SyntaxError {
    let line = line_of(node);
    let column = column_of(node);
    let message = if node.is_missing() {
        format!("missing \"{}\" at line {line}, column {column}", node.kind())
    } else {
        format!("invalid syntax at line {line}, column {column}")
    };
    SyntaxError::at(message, line, column)
}
