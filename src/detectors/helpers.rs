//! Helpers over tree-sitter-python node kinds shared by the detectors.

use crate::core::ast::{children, named_children};
use crate::core::SyntaxTree;
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Nodes that open a new name scope for statement-level analysis.
pub fn is_scope_boundary(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "function_definition" | "class_definition" | "lambda"
    )
}

/// Pre-order traversal of `node`'s subtree, `node` included.
///
/// `visit` returns `false` to skip a node's children.
pub fn visit_subtree<'t>(node: Node<'t>, visit: &mut impl FnMut(Node<'t>) -> bool) {
    if visit(node) {
        for child in children(node) {
            visit_subtree(child, visit);
        }
    }
}

/// Every identifier mentioned inside `node`, attribute names included.
pub fn identifiers_in(node: Node<'_>, tree: &SyntaxTree) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    visit_subtree(node, &mut |n| {
        if n.kind() == "identifier" {
            names.insert(tree.text(n).to_string());
        }
        true
    });
    names
}

/// Statements of a `block` node, comments excluded.
pub fn block_statements(block: Node<'_>) -> Vec<Node<'_>> {
    named_children(block)
}

/// The `:` token that ends a compound statement header.
pub fn header_colon(node: Node<'_>) -> Option<Node<'_>> {
    children(node).into_iter().find(|child| child.kind() == ":")
}

/// A statement consisting of a single string literal.
pub fn is_docstring_statement(stmt: Node<'_>) -> bool {
    if stmt.kind() != "expression_statement" {
        return false;
    }
    let parts = named_children(stmt);
    parts.len() == 1 && matches!(parts[0].kind(), "string" | "concatenated_string")
}

/// Expressions that evidently evaluate to `str`. Bytes literals do not count.
pub fn is_string_like(node: Node<'_>, tree: &SyntaxTree) -> bool {
    match node.kind() {
        "string" | "concatenated_string" => !is_bytes_literal(node, tree),
        "parenthesized_expression" => named_children(node)
            .first()
            .is_some_and(|inner| is_string_like(*inner, tree)),
        "call" => node
            .child_by_field_name("function")
            .is_some_and(|function| match function.kind() {
                "identifier" => matches!(tree.text(function), "str" | "repr" | "chr" | "format"),
                "attribute" => function
                    .child_by_field_name("object")
                    .is_some_and(|object| is_string_like(object, tree)),
                _ => false,
            }),
        "binary_operator" => {
            operator_kind(node) == Some("+")
                && (node
                    .child_by_field_name("left")
                    .is_some_and(|l| is_string_like(l, tree))
                    || node
                        .child_by_field_name("right")
                        .is_some_and(|r| is_string_like(r, tree)))
        }
        _ => false,
    }
}

/// A `b"..."` literal. tree-sitter-python parses bytes and text literals
/// as the same `string` node, so the prefix before the first quote decides.
pub fn is_bytes_literal(node: Node<'_>, tree: &SyntaxTree) -> bool {
    tree.text(node)
        .split(['"', '\''])
        .next()
        .is_some_and(|prefix| prefix.contains(['b', 'B']))
}

/// Kind of the `operator` field of a binary or augmented assignment node.
pub fn operator_kind(node: Node<'_>) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}

pub fn function_name<'t>(function: Node<'t>, tree: &'t SyntaxTree) -> &'t str {
    function
        .child_by_field_name("name")
        .map(|name| tree.text(name))
        .unwrap_or("<anonymous>")
}

/// Whether a `function_definition` sits directly in a class body.
pub fn is_method(function: Node<'_>) -> bool {
    let mut current = function.parent();
    if current.is_some_and(|p| p.kind() == "decorated_definition") {
        current = current.and_then(|p| p.parent());
    }
    current
        .filter(|p| p.kind() == "block")
        .and_then(|block| block.parent())
        .is_some_and(|owner| owner.kind() == "class_definition")
}

/// Every `function_definition` in the module, in document order.
pub fn functions(tree: &SyntaxTree) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    tree.walk(|node| {
        if node.kind() == "function_definition" {
            found.push(node);
        }
    });
    found
}

/// A fresh identifier based on `base` that does not occur in the module.
pub fn fresh_name(base: &str, taken: &BTreeSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Text of `line` from its start up to the 0-based byte `column`.
pub fn line_prefix(line: &str, column: usize) -> Option<&str> {
    line.get(..column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_of_kind<'t>(tree: &'t SyntaxTree, kind: &str) -> Node<'t> {
        let mut found = None;
        tree.walk(|node| {
            if found.is_none() && node.kind() == kind {
                found = Some(node);
            }
        });
        found.unwrap()
    }

    #[test]
    fn test_is_string_like() {
        let tree = SyntaxTree::parse("a = str(x)\nb = ', '.join(y)\nc = f(x)\n").unwrap();
        let rights: Vec<bool> = {
            let mut out = Vec::new();
            tree.walk(|node| {
                if node.kind() == "assignment" {
                    let right = node.child_by_field_name("right").unwrap();
                    out.push(is_string_like(right, &tree));
                }
            });
            out
        };
        assert_eq!(rights, vec![true, true, false]);
    }

    #[test]
    fn test_bytes_literals_are_not_string_like() {
        let source = "a = b\"\"\nb = rb'x'\nc = f\"{a}\"\nd = b\"\".join(y)\n";
        let tree = SyntaxTree::parse(source).unwrap();
        let mut rights = Vec::new();
        tree.walk(|node| {
            if node.kind() == "assignment" {
                let right = node.child_by_field_name("right").unwrap();
                rights.push(is_string_like(right, &tree));
            }
        });
        assert_eq!(rights, vec![false, false, true, false]);
    }

    #[test]
    fn test_docstring_statement() {
        let tree = SyntaxTree::parse("def f():\n    \"\"\"Doc.\"\"\"\n    return 1\n").unwrap();
        let function = first_of_kind(&tree, "function_definition");
        let body = function.child_by_field_name("body").unwrap();
        let statements = block_statements(body);
        assert!(is_docstring_statement(statements[0]));
        assert!(!is_docstring_statement(statements[1]));
    }

    #[test]
    fn test_is_method_sees_through_decorators() {
        let tree = SyntaxTree::parse(
            "class A:\n    @property\n    def x(self):\n        return 1\n\ndef g():\n    pass\n",
        )
        .unwrap();
        let found = functions(&tree);
        assert_eq!(found.len(), 2);
        assert!(is_method(found[0]));
        assert!(!is_method(found[1]));
    }

    #[test]
    fn test_fresh_name_avoids_collisions() {
        let taken: BTreeSet<String> = ["_r_parts".to_string(), "_r_parts_2".to_string()].into();
        assert_eq!(fresh_name("_r_parts", &taken), "_r_parts_3");
        assert_eq!(fresh_name("_s_parts", &taken), "_s_parts");
    }
}
